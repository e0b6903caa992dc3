// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{Principal, SurveyId};
use actix::Message;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

#[derive(Message, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[rtype(result = "()")]
pub struct SurveyCreated {
    pub survey_id: SurveyId,
    pub creator: Principal,
    pub title: String,
    pub closes_at: i64,
}

impl Display for SurveyCreated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "survey_id: {}, creator: {}, title: {:?}, closes_at: {}",
            self.survey_id, self.creator, self.title, self.closes_at
        )
    }
}
