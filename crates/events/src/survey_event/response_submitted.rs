// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{Principal, SurveyId};
use actix::Message;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Published after a respondent's ratings have been accepted. Carries no
/// rating material, only the fact that a submission happened.
#[derive(Message, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[rtype(result = "()")]
pub struct ResponseSubmitted {
    pub survey_id: SurveyId,
    pub respondent: Principal,
    pub timestamp: i64,
}

impl Display for ResponseSubmitted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "survey_id: {}, respondent: {}, timestamp: {}",
            self.survey_id, self.respondent, self.timestamp
        )
    }
}
