// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::RegistryError;
use pulse_compute::CiphertextHandle;
use pulse_events::{Principal, RequestId, SurveyId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Accepted rating interval, inclusive on both ends.
pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Survey lifecycle. Transitions are strictly monotonic:
/// Open -> Closed -> Published. Natural expiry does not change the status;
/// it only stops submissions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurveyStatus {
    Open,
    Closed,
    Published,
}

impl fmt::Display for SurveyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SurveyStatus::Open => "Open",
            SurveyStatus::Closed => "Closed",
            SurveyStatus::Published => "Published",
        };
        write!(f, "{name}")
    }
}

/// Per-question aggregate reveal state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregateResult {
    NotRequested,
    Requested {
        request_id: RequestId,
    },
    Revealed {
        sum: u64,
        count: u64,
        /// sum / count, integer division. count > 0 is guaranteed by the
        /// request precondition.
        average: u64,
    },
}

impl AggregateResult {
    pub fn get_name(&self) -> String {
        match self {
            AggregateResult::NotRequested => "NotRequested",
            AggregateResult::Requested { .. } => "Requested",
            AggregateResult::Revealed { .. } => "Revealed",
        }
        .to_string()
    }
}

/// One survey record. Owned exclusively by the registry; all mutation goes
/// through the methods below so the lifecycle and ledger invariants hold at
/// every settled point.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Survey {
    id: SurveyId,
    creator: Principal,
    title: String,
    description: String,
    questions: Vec<String>,
    opened_at: i64,
    closes_at: i64,
    status: SurveyStatus,
    response_count: u64,
    respondents: HashSet<Principal>,
    /// One append-only ciphertext ledger per question, submission order.
    /// Each ledger's length equals response_count between submissions.
    ledgers: Vec<Vec<CiphertextHandle>>,
    aggregates: Vec<AggregateResult>,
}

impl Survey {
    pub fn create(
        id: SurveyId,
        creator: Principal,
        title: String,
        description: String,
        questions: Vec<String>,
        duration_secs: u64,
        now: i64,
    ) -> Result<Self, RegistryError> {
        if title.is_empty() {
            return Err(RegistryError::InvalidInput("title must not be empty".into()));
        }
        if questions.is_empty() {
            return Err(RegistryError::InvalidInput(
                "survey needs at least one question".into(),
            ));
        }
        if duration_secs == 0 {
            return Err(RegistryError::InvalidInput(
                "duration must be greater than zero".into(),
            ));
        }
        // closes_at = opened_at + duration, with no silent wrap for
        // durations past the timestamp range.
        let closes_at = i64::try_from(duration_secs)
            .ok()
            .and_then(|d| now.checked_add(d))
            .ok_or_else(|| {
                RegistryError::InvalidInput("duration overflows the submission window".into())
            })?;

        let ledgers = vec![Vec::new(); questions.len()];
        let aggregates = vec![AggregateResult::NotRequested; questions.len()];

        Ok(Self {
            id,
            creator,
            title,
            description,
            questions,
            opened_at: now,
            closes_at,
            status: SurveyStatus::Open,
            response_count: 0,
            respondents: HashSet::new(),
            ledgers,
            aggregates,
        })
    }

    pub fn id(&self) -> SurveyId {
        self.id
    }

    pub fn creator(&self) -> &Principal {
        &self.creator
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn closes_at(&self) -> i64 {
        self.closes_at
    }

    pub fn status(&self) -> SurveyStatus {
        self.status
    }

    pub fn response_count(&self) -> u64 {
        self.response_count
    }

    pub fn has_responded(&self, respondent: &Principal) -> bool {
        self.respondents.contains(respondent)
    }

    pub fn is_expired(&self, now: i64) -> bool {
        now > self.closes_at
    }

    /// Combined guard: still Open and within the submission window.
    pub fn is_active(&self, now: i64) -> bool {
        self.status == SurveyStatus::Open && !self.is_expired(now)
    }

    /// Submission preconditions, checked in a fixed order so every failure
    /// mode maps to exactly one error.
    pub fn validate_submission(
        &self,
        respondent: &Principal,
        ratings: &[u8],
        now: i64,
    ) -> Result<(), RegistryError> {
        if self.status != SurveyStatus::Open {
            return Err(RegistryError::SurveyNotActive);
        }
        if self.is_expired(now) {
            return Err(RegistryError::SurveyExpired);
        }
        if self.respondents.contains(respondent) {
            return Err(RegistryError::DuplicateResponse);
        }
        if ratings.len() != self.questions.len() {
            return Err(RegistryError::AnswerCountMismatch {
                expected: self.questions.len(),
                got: ratings.len(),
            });
        }
        for &rating in ratings {
            if !(MIN_RATING..=MAX_RATING).contains(&rating) {
                return Err(RegistryError::RatingOutOfRange(rating));
            }
        }
        Ok(())
    }

    /// Commit an already-validated, already-encrypted submission. Appends one
    /// handle to every question's ledger and counts the respondent exactly
    /// once.
    pub fn record_response(&mut self, respondent: Principal, handles: Vec<CiphertextHandle>) {
        debug_assert_eq!(handles.len(), self.questions.len());
        for (ledger, handle) in self.ledgers.iter_mut().zip(handles) {
            ledger.push(handle);
        }
        self.respondents.insert(respondent);
        self.response_count += 1;
    }

    /// Manual close by the creator, valid even while the submission window is
    /// still open. Only an Open survey can be closed; Published never moves
    /// backward.
    pub fn close(&mut self, caller: &Principal) -> Result<(), RegistryError> {
        if caller != &self.creator {
            return Err(RegistryError::NotCreator);
        }
        if self.status != SurveyStatus::Open {
            return Err(RegistryError::SurveyNotActive);
        }
        self.status = SurveyStatus::Closed;
        Ok(())
    }

    /// Freeze the survey for aggregation. Gates aggregate reveals so none can
    /// be requested mid-collection.
    pub fn publish(&mut self, caller: &Principal) -> Result<u64, RegistryError> {
        if caller != &self.creator {
            return Err(RegistryError::NotCreator);
        }
        match self.status {
            SurveyStatus::Published => return Err(RegistryError::AlreadyPublished),
            SurveyStatus::Open => return Err(RegistryError::SurveyStillActive),
            SurveyStatus::Closed => {}
        }
        if self.response_count == 0 {
            return Err(RegistryError::NoResponses);
        }
        self.status = SurveyStatus::Published;
        Ok(self.response_count)
    }

    /// Check every precondition for a per-question aggregate request and hand
    /// back the question's ledger. Bounds are validated here once; indexing
    /// past this point is infallible.
    pub fn validate_aggregate_request(
        &self,
        caller: &Principal,
        question_index: usize,
    ) -> Result<&[CiphertextHandle], RegistryError> {
        if caller != &self.creator {
            return Err(RegistryError::NotCreator);
        }
        if self.status != SurveyStatus::Published {
            return Err(RegistryError::ResultsNotPublished);
        }
        if question_index >= self.questions.len() {
            return Err(RegistryError::InvalidQuestionIndex);
        }
        let ledger = &self.ledgers[question_index];
        if ledger.is_empty() {
            return Err(RegistryError::NoResponsesForQuestion);
        }
        match &self.aggregates[question_index] {
            AggregateResult::NotRequested => Ok(ledger),
            AggregateResult::Requested { .. } => Err(RegistryError::AggregateAlreadyRequested),
            AggregateResult::Revealed { .. } => Err(RegistryError::AggregateAlreadyRevealed),
        }
    }

    pub fn mark_requested(&mut self, question_index: usize, request_id: RequestId) {
        self.aggregates[question_index] = AggregateResult::Requested { request_id };
    }

    /// Roll a question back to NotRequested after a failed or malformed
    /// reveal so the creator can retry.
    pub fn reset_aggregate(&mut self, question_index: usize) {
        self.aggregates[question_index] = AggregateResult::NotRequested;
    }

    /// Settle a delivered reveal. Rejects settlement of a question that is
    /// not awaiting one, which covers replayed callbacks.
    pub fn settle_reveal(
        &mut self,
        question_index: usize,
        sum: u64,
        count: u64,
    ) -> Result<u64, RegistryError> {
        match &self.aggregates[question_index] {
            AggregateResult::Requested { .. } => {}
            AggregateResult::Revealed { .. } => {
                return Err(RegistryError::AggregateAlreadyRevealed)
            }
            AggregateResult::NotRequested => return Err(RegistryError::ResultsNotPublished),
        }
        let average = sum / count;
        self.aggregates[question_index] = AggregateResult::Revealed {
            sum,
            count,
            average,
        };
        Ok(average)
    }

    pub fn aggregate(&self, question_index: usize) -> Result<&AggregateResult, RegistryError> {
        self.aggregates
            .get(question_index)
            .ok_or(RegistryError::InvalidQuestionIndex)
    }

    pub fn ledger(&self, question_index: usize) -> Option<&[CiphertextHandle]> {
        self.ledgers.get(question_index).map(|l| l.as_slice())
    }

    pub fn meta(&self) -> SurveyMeta {
        SurveyMeta {
            id: self.id,
            creator: self.creator.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            opened_at: self.opened_at,
            closes_at: self.closes_at,
            status: self.status,
            response_count: self.response_count,
        }
    }

    pub fn snapshot(&self, now: i64) -> StatusSnapshot {
        StatusSnapshot {
            status: self.status,
            active: self.is_active(now),
            seconds_remaining: (self.closes_at - now).max(0) as u64,
            response_count: self.response_count,
        }
    }
}

/// Read-only survey metadata for observers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyMeta {
    pub id: SurveyId,
    pub creator: Principal,
    pub title: String,
    pub description: String,
    pub opened_at: i64,
    pub closes_at: i64,
    pub status: SurveyStatus,
    pub response_count: u64,
}

/// Live view of a survey's submission window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub status: SurveyStatus,
    pub active: bool,
    pub seconds_remaining: u64,
    pub response_count: u64,
}
