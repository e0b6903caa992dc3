// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{RequestId, SurveyId};
use actix::Message;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

#[derive(Message, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[rtype(result = "()")]
pub struct AggregateRequested {
    pub survey_id: SurveyId,
    pub question_index: usize,
    pub request_id: RequestId,
}

impl Display for AggregateRequested {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "survey_id: {}, question_index: {}, request_id: {}",
            self.survey_id, self.question_index, self.request_id
        )
    }
}
