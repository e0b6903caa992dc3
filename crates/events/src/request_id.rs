// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::SurveyId;
use core::fmt;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Identifier tagging one asynchronous aggregate-reveal request. Derived
/// from the (survey, question, request time) triple so two requests for
/// the same question at different times never collide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub [u8; 32]);

impl RequestId {
    pub fn derive(survey_id: SurveyId, question_index: usize, requested_at: i64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(survey_id.value().to_le_bytes());
        hasher.update((question_index as u64).to_le_bytes());
        hasher.update(requested_at.to_le_bytes());
        RequestId(hasher.finalize().into())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base58_string = bs58::encode(&self.0).into_string();
        write!(f, "req:{}", &base58_string[0..8])
    }
}
