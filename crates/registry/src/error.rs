// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use pulse_compute::ComputeError;
use thiserror::Error;

/// Every failure is scoped to one operation on one survey. Validation
/// errors are safe to retry with corrected input; state and authorization
/// errors require the caller to change course; `Backend` surfaces a
/// compute-backend failure without leaving partial registry state behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("survey not found")]
    SurveyNotFound,
    #[error("survey is not open")]
    SurveyNotActive,
    #[error("survey submission window has passed")]
    SurveyExpired,
    #[error("respondent has already responded to this survey")]
    DuplicateResponse,
    #[error("expected {expected} answers, got {got}")]
    AnswerCountMismatch { expected: usize, got: usize },
    #[error("rating {0} is outside the accepted range")]
    RatingOutOfRange(u8),
    #[error("caller is not the survey creator")]
    NotCreator,
    #[error("survey is still accepting responses")]
    SurveyStillActive,
    #[error("results have already been published")]
    AlreadyPublished,
    #[error("survey has no responses")]
    NoResponses,
    #[error("results have not been published")]
    ResultsNotPublished,
    #[error("question index out of bounds")]
    InvalidQuestionIndex,
    #[error("no responses recorded for this question")]
    NoResponsesForQuestion,
    #[error("aggregate reveal already requested for this question")]
    AggregateAlreadyRequested,
    #[error("aggregate already revealed for this question")]
    AggregateAlreadyRevealed,
    #[error("compute backend error: {0}")]
    Backend(#[from] ComputeError),
}
