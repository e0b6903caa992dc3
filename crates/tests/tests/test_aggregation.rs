// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::Result;
use pulse_compute::{Capability, CiphertextHandle, ComputeError};
use pulse_events::{
    Principal, RequestId, RevealDelivered, SurveyEvent, SurveyId, TakeEvents,
};
use pulse_logger::SimpleLogger;
use pulse_registry::{
    AggregateResult, CloseSurvey, GetAggregate, PublishResults, RegistryError,
    RequestQuestionAggregate, SubmitResponse, REGISTRY_PRINCIPAL,
};
use pulse_test_helpers::{rand_principal, sample_survey, RegistryRig};

fn init_tracing() -> tracing::subscriber::DefaultGuard {
    use tracing_subscriber::{fmt, EnvFilter};

    let subscriber = fmt()
        .with_env_filter(EnvFilter::new("info"))
        .with_test_writer()
        .finish();
    tracing::subscriber::set_default(subscriber)
}

/// Walk a survey all the way to the Published state with two responses:
/// alice answers [5, 4], bob answers [3, 3].
async fn published_survey(rig: &RegistryRig, creator: &Principal) -> Result<SurveyId> {
    let survey_id = rig.registry.send(sample_survey(creator, 3600)).await??;

    for (name, ratings) in [("alice", vec![5, 4]), ("bob", vec![3, 3])] {
        rig.registry
            .send(SubmitResponse {
                survey_id,
                respondent: Principal::new(name),
                ratings,
            })
            .await??;
    }

    rig.registry
        .send(CloseSurvey {
            survey_id,
            caller: creator.clone(),
        })
        .await??;
    rig.registry
        .send(PublishResults {
            survey_id,
            caller: creator.clone(),
        })
        .await??;

    Ok(survey_id)
}

#[actix::test]
async fn encrypted_ratings_round_trip_to_aggregate() -> Result<()> {
    let _guard = init_tracing();
    let rig = RegistryRig::new();
    let _logger = SimpleLogger::attach("pulse", rig.bus.clone());
    let creator = rand_principal("creator");

    let survey_id = published_survey(&rig, &creator).await?;

    let request_id = rig
        .registry
        .send(RequestQuestionAggregate {
            survey_id,
            question_index: 0,
            caller: creator.clone(),
        })
        .await??;

    // Create + 2 submissions + close + publish + request/delivery/reveal
    let events = rig.history.send(TakeEvents::new(8)).await?;
    let revealed = events
        .iter()
        .find_map(|e| match e {
            SurveyEvent::AggregateRevealed { data, .. } => Some(data.clone()),
            _ => None,
        })
        .expect("no AggregateRevealed event");

    assert_eq!(revealed.survey_id, survey_id);
    assert_eq!(revealed.question_index, 0);
    assert_eq!(revealed.request_id, request_id);
    // (5 + 3) / 2, integer division
    assert_eq!(revealed.average, 4);
    assert_eq!(revealed.count, 2);

    let aggregate = rig
        .registry
        .send(GetAggregate {
            survey_id,
            question_index: 0,
        })
        .await??;
    assert_eq!(
        aggregate,
        AggregateResult::Revealed {
            sum: 8,
            count: 2,
            average: 4
        }
    );

    // The second question is untouched until its own request
    let other = rig
        .registry
        .send(GetAggregate {
            survey_id,
            question_index: 1,
        })
        .await??;
    assert_eq!(other, AggregateResult::NotRequested);

    Ok(())
}

#[actix::test]
async fn each_question_aggregates_independently() -> Result<()> {
    let _guard = init_tracing();
    let rig = RegistryRig::new();
    let creator = rand_principal("creator");
    let survey_id = published_survey(&rig, &creator).await?;

    for question_index in [0, 1] {
        rig.registry
            .send(RequestQuestionAggregate {
                survey_id,
                question_index,
                caller: creator.clone(),
            })
            .await??;
    }

    // 5 lifecycle events plus (delivery, request, reveal) per question
    let _ = rig.history.send(TakeEvents::new(11)).await?;

    let q0 = rig
        .registry
        .send(GetAggregate {
            survey_id,
            question_index: 0,
        })
        .await??;
    let q1 = rig
        .registry
        .send(GetAggregate {
            survey_id,
            question_index: 1,
        })
        .await??;

    // q0: (5 + 3) / 2 == 4, q1: (4 + 3) / 2 == 3
    assert_eq!(
        q0,
        AggregateResult::Revealed {
            sum: 8,
            count: 2,
            average: 4
        }
    );
    assert_eq!(
        q1,
        AggregateResult::Revealed {
            sum: 7,
            count: 2,
            average: 3
        }
    );

    Ok(())
}

#[actix::test]
async fn aggregates_are_gated_until_publish() -> Result<()> {
    let _guard = init_tracing();
    let rig = RegistryRig::new();
    let creator = rand_principal("creator");
    let survey_id = rig.registry.send(sample_survey(&creator, 3600)).await??;

    rig.registry
        .send(SubmitResponse {
            survey_id,
            respondent: Principal::new("alice"),
            ratings: vec![5, 4],
        })
        .await??;

    // While still collecting, no aggregate may be requested
    let err = rig
        .registry
        .send(RequestQuestionAggregate {
            survey_id,
            question_index: 0,
            caller: creator.clone(),
        })
        .await?
        .unwrap_err();
    assert_eq!(err, RegistryError::ResultsNotPublished);

    rig.registry
        .send(CloseSurvey {
            survey_id,
            caller: creator.clone(),
        })
        .await??;

    // Closed but not yet published is still not enough
    let err = rig
        .registry
        .send(RequestQuestionAggregate {
            survey_id,
            question_index: 0,
            caller: creator.clone(),
        })
        .await?
        .unwrap_err();
    assert_eq!(err, RegistryError::ResultsNotPublished);

    Ok(())
}

#[actix::test]
async fn rerequesting_a_question_is_rejected() -> Result<()> {
    let _guard = init_tracing();
    let rig = RegistryRig::new();
    let creator = rand_principal("creator");
    let survey_id = published_survey(&rig, &creator).await?;

    // Hold delivery so the first request stays in flight
    rig.backend.set_hold_reveals(true);
    let request_id = rig
        .registry
        .send(RequestQuestionAggregate {
            survey_id,
            question_index: 0,
            caller: creator.clone(),
        })
        .await??;

    let aggregate = rig
        .registry
        .send(GetAggregate {
            survey_id,
            question_index: 0,
        })
        .await??;
    assert_eq!(aggregate, AggregateResult::Requested { request_id });

    let err = rig
        .registry
        .send(RequestQuestionAggregate {
            survey_id,
            question_index: 0,
            caller: creator.clone(),
        })
        .await?
        .unwrap_err();
    assert_eq!(err, RegistryError::AggregateAlreadyRequested);

    // Settle the held request by hand, then a re-request is still rejected
    rig.registry
        .send(SurveyEvent::from(RevealDelivered {
            request_id,
            plaintexts: vec![8, 2],
        }))
        .await?;

    let err = rig
        .registry
        .send(RequestQuestionAggregate {
            survey_id,
            question_index: 0,
            caller: creator,
        })
        .await?
        .unwrap_err();
    assert_eq!(err, RegistryError::AggregateAlreadyRevealed);

    Ok(())
}

#[actix::test]
async fn refused_reveal_leaves_the_question_retryable() -> Result<()> {
    let _guard = init_tracing();
    let rig = RegistryRig::new();
    let creator = rand_principal("creator");
    let survey_id = published_survey(&rig, &creator).await?;

    rig.backend.set_refuse_reveals(true);
    let err = rig
        .registry
        .send(RequestQuestionAggregate {
            survey_id,
            question_index: 0,
            caller: creator.clone(),
        })
        .await?
        .unwrap_err();
    assert_eq!(err, RegistryError::Backend(ComputeError::RevealRefused));

    // The failure must not leave the question stuck in Requested
    let aggregate = rig
        .registry
        .send(GetAggregate {
            survey_id,
            question_index: 0,
        })
        .await??;
    assert_eq!(aggregate, AggregateResult::NotRequested);

    rig.backend.set_refuse_reveals(false);
    rig.registry
        .send(RequestQuestionAggregate {
            survey_id,
            question_index: 0,
            caller: creator,
        })
        .await??;

    let _ = rig.history.send(TakeEvents::new(8)).await?;
    let aggregate = rig
        .registry
        .send(GetAggregate {
            survey_id,
            question_index: 0,
        })
        .await??;
    assert!(matches!(aggregate, AggregateResult::Revealed { .. }));

    Ok(())
}

#[actix::test]
async fn replayed_and_unknown_callbacks_are_ignored() -> Result<()> {
    let _guard = init_tracing();
    let rig = RegistryRig::new();
    let creator = rand_principal("creator");
    let survey_id = published_survey(&rig, &creator).await?;

    let request_id = rig
        .registry
        .send(RequestQuestionAggregate {
            survey_id,
            question_index: 0,
            caller: creator,
        })
        .await??;
    let _ = rig.history.send(TakeEvents::new(8)).await?;

    // A replay with different numbers must never re-apply
    rig.registry
        .send(SurveyEvent::from(RevealDelivered {
            request_id,
            plaintexts: vec![999, 1],
        }))
        .await?;

    // Callbacks for requests the registry never issued fall through
    rig.registry
        .send(SurveyEvent::from(RevealDelivered {
            request_id: RequestId::derive(survey_id, 7, 12345),
            plaintexts: vec![1, 1],
        }))
        .await?;

    let aggregate = rig
        .registry
        .send(GetAggregate {
            survey_id,
            question_index: 0,
        })
        .await??;
    assert_eq!(
        aggregate,
        AggregateResult::Revealed {
            sum: 8,
            count: 2,
            average: 4
        }
    );

    Ok(())
}

#[actix::test]
async fn malformed_reveal_reopens_the_request() -> Result<()> {
    let _guard = init_tracing();
    let rig = RegistryRig::new();
    let creator = rand_principal("creator");
    let survey_id = published_survey(&rig, &creator).await?;

    rig.backend.set_hold_reveals(true);
    let request_id = rig
        .registry
        .send(RequestQuestionAggregate {
            survey_id,
            question_index: 0,
            caller: creator.clone(),
        })
        .await??;

    // Deliver garbage for the in-flight request
    rig.registry
        .send(SurveyEvent::from(RevealDelivered {
            request_id,
            plaintexts: vec![1, 2, 3],
        }))
        .await?;

    let aggregate = rig
        .registry
        .send(GetAggregate {
            survey_id,
            question_index: 0,
        })
        .await??;
    assert_eq!(aggregate, AggregateResult::NotRequested);

    // The creator can retry now that the request was reopened
    rig.backend.set_hold_reveals(false);
    rig.registry
        .send(RequestQuestionAggregate {
            survey_id,
            question_index: 0,
            caller: creator,
        })
        .await??;

    Ok(())
}

#[actix::test]
async fn submissions_grant_compute_to_registry_and_decrypt_to_respondent() -> Result<()> {
    let _guard = init_tracing();
    let rig = RegistryRig::new();
    let creator = rand_principal("creator");
    let alice = Principal::new("alice");

    let survey_id = rig.registry.send(sample_survey(&creator, 3600)).await??;
    rig.registry
        .send(SubmitResponse {
            survey_id,
            respondent: alice.clone(),
            ratings: vec![5, 4],
        })
        .await??;

    // The mock allocates handles sequentially: alice's two ratings are 1, 2
    for raw in [1u64, 2] {
        let grants = rig.backend.grants_for(CiphertextHandle::new(raw));
        assert_eq!(
            grants,
            vec![
                (Principal::new(REGISTRY_PRINCIPAL), Capability::Compute),
                (alice.clone(), Capability::Decrypt),
            ]
        );
    }

    Ok(())
}
