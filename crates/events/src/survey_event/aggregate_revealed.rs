// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{RequestId, SurveyId};
use actix::Message;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// The only plaintext output the protocol ever publishes: a per-question
/// aggregate, never an individual rating.
#[derive(Message, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[rtype(result = "()")]
pub struct AggregateRevealed {
    pub survey_id: SurveyId,
    pub question_index: usize,
    pub request_id: RequestId,
    pub average: u64,
    pub count: u64,
}

impl Display for AggregateRevealed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "survey_id: {}, question_index: {}, average: {}, count: {}",
            self.survey_id, self.question_index, self.average, self.count
        )
    }
}
