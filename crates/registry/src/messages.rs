// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{AggregateResult, RegistryError, StatusSnapshot, SurveyMeta};
use actix::Message;
use pulse_events::{Principal, RequestId, SurveyId};

//////////////////////////////////////////////////////////////////////////////
// Mutations
//////////////////////////////////////////////////////////////////////////////

#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<SurveyId, RegistryError>")]
pub struct CreateSurvey {
    pub creator: Principal,
    pub title: String,
    pub description: String,
    pub questions: Vec<String>,
    pub duration_secs: u64,
}

#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<(), RegistryError>")]
pub struct SubmitResponse {
    pub survey_id: SurveyId,
    pub respondent: Principal,
    pub ratings: Vec<u8>,
}

#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<(), RegistryError>")]
pub struct CloseSurvey {
    pub survey_id: SurveyId,
    pub caller: Principal,
}

#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<(), RegistryError>")]
pub struct PublishResults {
    pub survey_id: SurveyId,
    pub caller: Principal,
}

#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<RequestId, RegistryError>")]
pub struct RequestQuestionAggregate {
    pub survey_id: SurveyId,
    pub question_index: usize,
    pub caller: Principal,
}

//////////////////////////////////////////////////////////////////////////////
// Queries (read-only, side-effect-free)
//////////////////////////////////////////////////////////////////////////////

#[derive(Message, Clone, Debug)]
#[rtype(result = "Option<SurveyMeta>")]
pub struct GetSurvey {
    pub survey_id: SurveyId,
}

#[derive(Message, Clone, Debug)]
#[rtype(result = "Option<Vec<String>>")]
pub struct GetQuestions {
    pub survey_id: SurveyId,
}

#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<bool, RegistryError>")]
pub struct HasResponded {
    pub survey_id: SurveyId,
    pub respondent: Principal,
}

#[derive(Message, Clone, Debug)]
#[rtype(result = "Option<StatusSnapshot>")]
pub struct GetStatusSnapshot {
    pub survey_id: SurveyId,
}

#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<AggregateResult, RegistryError>")]
pub struct GetAggregate {
    pub survey_id: SurveyId,
    pub question_index: usize,
}
