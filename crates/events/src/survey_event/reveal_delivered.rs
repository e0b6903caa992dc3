// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::RequestId;
use actix::Message;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Published by the confidential compute backend once a reveal request has
/// resolved. Plaintexts arrive in the order the handles were submitted with
/// the request; for an aggregate request that is `[sum, count]`. The backend
/// is untrusted infrastructure, so the registry revalidates the payload and
/// drops replays.
#[derive(Message, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[rtype(result = "()")]
pub struct RevealDelivered {
    pub request_id: RequestId,
    pub plaintexts: Vec<u64>,
}

impl Display for RevealDelivered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "request_id: {}, plaintexts: {} value(s)",
            self.request_id,
            self.plaintexts.len()
        )
    }
}
