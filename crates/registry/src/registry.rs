// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    AggregateResult, Clock, CloseSurvey, CreateSurvey, GetAggregate, GetQuestions,
    GetStatusSnapshot, GetSurvey, HasResponded, PublishResults, RegistryError,
    RequestQuestionAggregate, StatusSnapshot, SubmitResponse, Survey, SurveyMeta,
};
use actix::prelude::*;
use pulse_compute::{Capability, CiphertextHandle, ConfidentialCompute};
use pulse_events::{
    AggregateRequested, AggregateRevealed, EventBus, Principal, RequestId, ResponseSubmitted,
    ResultsPublished, RevealDelivered, Subscribe, SurveyClosed, SurveyCreated, SurveyEvent,
    SurveyId,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Identity the registry grants itself Compute capability under.
pub const REGISTRY_PRINCIPAL: &str = "survey-registry";

struct PendingReveal {
    survey_id: SurveyId,
    question_index: usize,
}

/// Sole authority over survey state. A single-writer actor: the mailbox
/// serializes every mutation, so two submissions to the same survey can
/// never race on the respondent set or the response count.
///
/// The pending table maps each in-flight reveal request back to its
/// (survey, question); it is populated when the request is issued and
/// consumed exactly once when the backend delivers, so replayed or unknown
/// callbacks fall through harmlessly.
pub struct SurveyRegistry {
    bus: Addr<EventBus<SurveyEvent>>,
    backend: Arc<dyn ConfidentialCompute>,
    clock: Arc<dyn Clock>,
    principal: Principal,
    next_id: u64,
    surveys: HashMap<SurveyId, Survey>,
    pending: HashMap<RequestId, PendingReveal>,
}

impl SurveyRegistry {
    pub fn new(
        bus: Addr<EventBus<SurveyEvent>>,
        backend: Arc<dyn ConfidentialCompute>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            bus,
            backend,
            clock,
            principal: Principal::new(REGISTRY_PRINCIPAL),
            next_id: 0,
            surveys: HashMap::new(),
            pending: HashMap::new(),
        }
    }

    /// Start the registry and subscribe it to backend reveal deliveries.
    pub fn attach(
        bus: &Addr<EventBus<SurveyEvent>>,
        backend: Arc<dyn ConfidentialCompute>,
        clock: Arc<dyn Clock>,
    ) -> Addr<Self> {
        let addr = SurveyRegistry::new(bus.clone(), backend, clock).start();
        bus.do_send(Subscribe::new(
            "RevealDelivered",
            addr.clone().recipient::<SurveyEvent>(),
        ));
        addr
    }

    fn emit(&self, event: impl Into<SurveyEvent>) {
        self.bus.do_send(event.into());
    }

    fn survey(&self, survey_id: SurveyId) -> Result<&Survey, RegistryError> {
        self.surveys
            .get(&survey_id)
            .ok_or(RegistryError::SurveyNotFound)
    }

    fn survey_mut(&mut self, survey_id: SurveyId) -> Result<&mut Survey, RegistryError> {
        self.surveys
            .get_mut(&survey_id)
            .ok_or(RegistryError::SurveyNotFound)
    }

    fn on_reveal_delivered(&mut self, data: RevealDelivered) {
        let Some(pending) = self.pending.remove(&data.request_id) else {
            // Unknown or already-settled request. The backend is untrusted
            // infrastructure, so replays are dropped rather than re-applied.
            warn!(request_id = %data.request_id, "dropping reveal for unknown request");
            return;
        };

        let Some(survey) = self.surveys.get_mut(&pending.survey_id) else {
            warn!(
                request_id = %data.request_id,
                survey_id = %pending.survey_id,
                "reveal delivered for missing survey"
            );
            return;
        };

        let (sum, count) = match data.plaintexts.as_slice() {
            [sum, count] if *count > 0 => (*sum, *count),
            other => {
                warn!(
                    request_id = %data.request_id,
                    values = other.len(),
                    "malformed reveal payload, reopening request"
                );
                survey.reset_aggregate(pending.question_index);
                return;
            }
        };

        match survey.settle_reveal(pending.question_index, sum, count) {
            Ok(average) => {
                info!(
                    survey_id = %pending.survey_id,
                    question_index = pending.question_index,
                    average,
                    count,
                    "aggregate revealed"
                );
                self.emit(AggregateRevealed {
                    survey_id: pending.survey_id,
                    question_index: pending.question_index,
                    request_id: data.request_id,
                    average,
                    count,
                });
            }
            Err(err) => {
                warn!(
                    survey_id = %pending.survey_id,
                    question_index = pending.question_index,
                    %err,
                    "ignoring reveal for settled aggregate"
                );
            }
        }
    }
}

impl Actor for SurveyRegistry {
    type Context = Context<Self>;
}

impl Handler<CreateSurvey> for SurveyRegistry {
    type Result = Result<SurveyId, RegistryError>;

    fn handle(&mut self, msg: CreateSurvey, _: &mut Self::Context) -> Self::Result {
        let now = self.clock.now();
        let survey_id = SurveyId::new(self.next_id + 1);

        let survey = Survey::create(
            survey_id,
            msg.creator.clone(),
            msg.title.clone(),
            msg.description,
            msg.questions,
            msg.duration_secs,
            now,
        )?;

        // Only bump the counter once the survey is fully validated; a
        // rejected create leaves no trace.
        self.next_id += 1;
        let closes_at = survey.closes_at();
        self.surveys.insert(survey_id, survey);

        info!(%survey_id, creator = %msg.creator, "survey created");
        self.emit(SurveyCreated {
            survey_id,
            creator: msg.creator,
            title: msg.title,
            closes_at,
        });

        Ok(survey_id)
    }
}

impl Handler<SubmitResponse> for SurveyRegistry {
    type Result = Result<(), RegistryError>;

    fn handle(&mut self, msg: SubmitResponse, _: &mut Self::Context) -> Self::Result {
        let now = self.clock.now();
        let survey = self.survey(msg.survey_id)?;
        survey.validate_submission(&msg.respondent, &msg.ratings, now)?;

        // Encrypt and annotate every rating before committing anything, so a
        // backend failure mid-submission leaves the survey untouched.
        let mut handles: Vec<CiphertextHandle> = Vec::with_capacity(msg.ratings.len());
        for &rating in &msg.ratings {
            let handle = self.backend.encrypt(rating as u64)?;
            self.backend
                .grant_access(handle, &self.principal, Capability::Compute)?;
            self.backend
                .grant_access(handle, &msg.respondent, Capability::Decrypt)?;
            handles.push(handle);
        }

        let survey = self.survey_mut(msg.survey_id)?;
        survey.record_response(msg.respondent.clone(), handles);

        self.emit(ResponseSubmitted {
            survey_id: msg.survey_id,
            respondent: msg.respondent,
            timestamp: now,
        });

        Ok(())
    }
}

impl Handler<CloseSurvey> for SurveyRegistry {
    type Result = Result<(), RegistryError>;

    fn handle(&mut self, msg: CloseSurvey, _: &mut Self::Context) -> Self::Result {
        let now = self.clock.now();
        let survey = self.survey_mut(msg.survey_id)?;
        survey.close(&msg.caller)?;

        info!(survey_id = %msg.survey_id, "survey closed");
        self.emit(SurveyClosed {
            survey_id: msg.survey_id,
            closed_at: now,
        });

        Ok(())
    }
}

impl Handler<PublishResults> for SurveyRegistry {
    type Result = Result<(), RegistryError>;

    fn handle(&mut self, msg: PublishResults, _: &mut Self::Context) -> Self::Result {
        let survey = self.survey_mut(msg.survey_id)?;
        let response_count = survey.publish(&msg.caller)?;

        info!(survey_id = %msg.survey_id, response_count, "results published");
        self.emit(ResultsPublished {
            survey_id: msg.survey_id,
            response_count,
        });

        Ok(())
    }
}

impl Handler<RequestQuestionAggregate> for SurveyRegistry {
    type Result = Result<RequestId, RegistryError>;

    fn handle(&mut self, msg: RequestQuestionAggregate, _: &mut Self::Context) -> Self::Result {
        let now = self.clock.now();
        let survey = self.survey(msg.survey_id)?;
        let ledger: Vec<CiphertextHandle> = survey
            .validate_aggregate_request(&msg.caller, msg.question_index)?
            .to_vec();

        // Left fold in submission order. Any order gives the same sum; a
        // fixed one keeps the request deterministic.
        let mut sum = ledger[0];
        for &handle in &ledger[1..] {
            sum = self.backend.homomorphic_add(sum, handle)?;
        }
        let count_handle = self.backend.encrypt(ledger.len() as u64)?;

        let request_id = RequestId::derive(msg.survey_id, msg.question_index, now);
        // Nothing is marked Requested until the backend accepts; a refusal
        // leaves the question at NotRequested so the creator can retry.
        self.backend
            .request_reveal(vec![sum, count_handle], request_id)?;

        let survey = self.survey_mut(msg.survey_id)?;
        survey.mark_requested(msg.question_index, request_id);
        self.pending.insert(
            request_id,
            PendingReveal {
                survey_id: msg.survey_id,
                question_index: msg.question_index,
            },
        );

        info!(
            survey_id = %msg.survey_id,
            question_index = msg.question_index,
            %request_id,
            "aggregate reveal requested"
        );
        self.emit(AggregateRequested {
            survey_id: msg.survey_id,
            question_index: msg.question_index,
            request_id,
        });

        Ok(request_id)
    }
}

impl Handler<SurveyEvent> for SurveyRegistry {
    type Result = ();

    fn handle(&mut self, msg: SurveyEvent, _: &mut Self::Context) -> Self::Result {
        if let SurveyEvent::RevealDelivered { data, .. } = msg {
            self.on_reveal_delivered(data);
        }
    }
}

impl Handler<GetSurvey> for SurveyRegistry {
    type Result = Option<SurveyMeta>;

    fn handle(&mut self, msg: GetSurvey, _: &mut Self::Context) -> Self::Result {
        self.surveys.get(&msg.survey_id).map(|s| s.meta())
    }
}

impl Handler<GetQuestions> for SurveyRegistry {
    type Result = Option<Vec<String>>;

    fn handle(&mut self, msg: GetQuestions, _: &mut Self::Context) -> Self::Result {
        self.surveys
            .get(&msg.survey_id)
            .map(|s| s.questions().to_vec())
    }
}

impl Handler<HasResponded> for SurveyRegistry {
    type Result = Result<bool, RegistryError>;

    fn handle(&mut self, msg: HasResponded, _: &mut Self::Context) -> Self::Result {
        Ok(self.survey(msg.survey_id)?.has_responded(&msg.respondent))
    }
}

impl Handler<GetStatusSnapshot> for SurveyRegistry {
    type Result = Option<StatusSnapshot>;

    fn handle(&mut self, msg: GetStatusSnapshot, _: &mut Self::Context) -> Self::Result {
        let now = self.clock.now();
        self.surveys.get(&msg.survey_id).map(|s| s.snapshot(now))
    }
}

impl Handler<GetAggregate> for SurveyRegistry {
    type Result = Result<AggregateResult, RegistryError>;

    fn handle(&mut self, msg: GetAggregate, _: &mut Self::Context) -> Self::Result {
        Ok(self
            .survey(msg.survey_id)?
            .aggregate(msg.question_index)?
            .clone())
    }
}
