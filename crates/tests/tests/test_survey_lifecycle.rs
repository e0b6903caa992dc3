// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::Result;
use pulse_events::{Event, Principal, SurveyEvent, SurveyId, TakeEvents};
use pulse_registry::{
    CloseSurvey, CreateSurvey, GetQuestions, GetStatusSnapshot, GetSurvey, HasResponded,
    PublishResults, RegistryError, SubmitResponse, SurveyStatus,
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

#[actix::test]
async fn survey_ids_are_monotonic_and_rejections_leave_no_trace() -> Result<()> {
    let _guard = init_tracing();
    let rig = RegistryRig::new();
    let creator = rand_principal("creator");

    let first = rig.registry.send(sample_survey(&creator, 3600)).await??;
    assert_eq!(first, SurveyId::new(1));

    // Empty title is rejected synchronously and must not consume an id
    let err = rig
        .registry
        .send(CreateSurvey {
            creator: creator.clone(),
            title: "".into(),
            description: "".into(),
            questions: vec!["Q".into()],
            duration_secs: 3600,
        })
        .await?
        .unwrap_err();
    assert!(matches!(err, RegistryError::InvalidInput(_)));

    let second = rig.registry.send(sample_survey(&creator, 3600)).await??;
    assert_eq!(second, SurveyId::new(2));

    Ok(())
}

#[actix::test]
async fn duplicate_response_is_rejected_and_not_counted() -> Result<()> {
    let _guard = init_tracing();
    let rig = RegistryRig::new();
    let creator = rand_principal("creator");
    let alice = Principal::new("alice");

    let survey_id = rig.registry.send(sample_survey(&creator, 3600)).await??;

    rig.registry
        .send(SubmitResponse {
            survey_id,
            respondent: alice.clone(),
            ratings: vec![4, 4],
        })
        .await??;

    let err = rig
        .registry
        .send(SubmitResponse {
            survey_id,
            respondent: alice.clone(),
            ratings: vec![4, 4],
        })
        .await?
        .unwrap_err();
    assert_eq!(err, RegistryError::DuplicateResponse);

    let snapshot = rig
        .registry
        .send(GetStatusSnapshot { survey_id })
        .await?
        .unwrap();
    assert_eq!(snapshot.response_count, 1);

    assert!(
        rig.registry
            .send(HasResponded {
                survey_id,
                respondent: alice
            })
            .await??
    );
    assert!(
        !rig.registry
            .send(HasResponded {
                survey_id,
                respondent: Principal::new("bob")
            })
            .await??
    );

    Ok(())
}

#[actix::test]
async fn submission_window_boundary_is_exact() -> Result<()> {
    let _guard = init_tracing();
    let rig = RegistryRig::starting_at(1_000);
    let creator = rand_principal("creator");

    let survey_id = rig.registry.send(sample_survey(&creator, 3600)).await??;
    // closes_at == 4600

    rig.clock.set(4_600);
    rig.registry
        .send(SubmitResponse {
            survey_id,
            respondent: Principal::new("alice"),
            ratings: vec![3, 3],
        })
        .await??;

    rig.clock.set(4_601);
    let err = rig
        .registry
        .send(SubmitResponse {
            survey_id,
            respondent: Principal::new("bob"),
            ratings: vec![3, 3],
        })
        .await?
        .unwrap_err();
    assert_eq!(err, RegistryError::SurveyExpired);

    let snapshot = rig
        .registry
        .send(GetStatusSnapshot { survey_id })
        .await?
        .unwrap();
    assert!(!snapshot.active);
    assert_eq!(snapshot.status, SurveyStatus::Open);
    assert_eq!(snapshot.seconds_remaining, 0);
    assert_eq!(snapshot.response_count, 1);

    Ok(())
}

#[actix::test]
async fn rating_boundaries_are_enforced_per_value() -> Result<()> {
    let _guard = init_tracing();
    let rig = RegistryRig::new();
    let creator = rand_principal("creator");
    let survey_id = rig.registry.send(sample_survey(&creator, 3600)).await??;

    for (ratings, expected) in [
        (vec![0, 3], RegistryError::RatingOutOfRange(0)),
        (vec![3, 6], RegistryError::RatingOutOfRange(6)),
        (
            vec![3],
            RegistryError::AnswerCountMismatch {
                expected: 2,
                got: 1,
            },
        ),
    ] {
        let err = rig
            .registry
            .send(SubmitResponse {
                survey_id,
                respondent: rand_principal("respondent"),
                ratings,
            })
            .await?
            .unwrap_err();
        assert_eq!(err, expected);
    }

    // Both extremes of the accepted interval pass
    rig.registry
        .send(SubmitResponse {
            survey_id,
            respondent: rand_principal("respondent"),
            ratings: vec![1, 5],
        })
        .await??;

    Ok(())
}

#[actix::test]
async fn close_and_publish_enforce_the_lifecycle() -> Result<()> {
    let _guard = init_tracing();
    let rig = RegistryRig::new();
    let creator = rand_principal("creator");
    let mallory = rand_principal("mallory");
    let survey_id = rig.registry.send(sample_survey(&creator, 3600)).await??;

    // Publish straight from Open is refused
    let err = rig
        .registry
        .send(PublishResults {
            survey_id,
            caller: creator.clone(),
        })
        .await?
        .unwrap_err();
    assert_eq!(err, RegistryError::SurveyStillActive);

    // Only the creator may close, even mid-window
    let err = rig
        .registry
        .send(CloseSurvey {
            survey_id,
            caller: mallory.clone(),
        })
        .await?
        .unwrap_err();
    assert_eq!(err, RegistryError::NotCreator);

    rig.registry
        .send(CloseSurvey {
            survey_id,
            caller: creator.clone(),
        })
        .await??;

    // Closed surveys no longer accept responses
    let err = rig
        .registry
        .send(SubmitResponse {
            survey_id,
            respondent: rand_principal("respondent"),
            ratings: vec![3, 3],
        })
        .await?
        .unwrap_err();
    assert_eq!(err, RegistryError::SurveyNotActive);

    // Publishing an empty survey is refused regardless of age
    let err = rig
        .registry
        .send(PublishResults {
            survey_id,
            caller: creator.clone(),
        })
        .await?
        .unwrap_err();
    assert_eq!(err, RegistryError::NoResponses);

    let meta = rig.registry.send(GetSurvey { survey_id }).await?.unwrap();
    assert_eq!(meta.status, SurveyStatus::Closed);
    assert_eq!(meta.creator, creator);

    Ok(())
}

#[actix::test]
async fn unknown_surveys_are_reported_distinctly() -> Result<()> {
    let _guard = init_tracing();
    let rig = RegistryRig::new();
    let ghost = SurveyId::new(99);

    let err = rig
        .registry
        .send(SubmitResponse {
            survey_id: ghost,
            respondent: rand_principal("respondent"),
            ratings: vec![3],
        })
        .await?
        .unwrap_err();
    assert_eq!(err, RegistryError::SurveyNotFound);

    assert!(rig.registry.send(GetSurvey { survey_id: ghost }).await?.is_none());
    assert!(rig
        .registry
        .send(GetQuestions { survey_id: ghost })
        .await?
        .is_none());

    Ok(())
}

#[actix::test]
async fn lifecycle_events_reach_observers_in_order() -> Result<()> {
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
    rig.registry
        .send(CloseSurvey {
            survey_id,
            caller: creator.clone(),
        })
        .await??;
    rig.registry
        .send(PublishResults {
            survey_id,
            caller: creator,
        })
        .await??;

    let events = rig.history.send(TakeEvents::new(4)).await?;
    let types: Vec<String> = events.iter().map(|e| e.event_type()).collect();
    assert_eq!(
        types,
        vec![
            "SurveyCreated",
            "ResponseSubmitted",
            "SurveyClosed",
            "ResultsPublished"
        ]
    );

    match &events[3] {
        SurveyEvent::ResultsPublished { data, .. } => {
            assert_eq!(data.survey_id, survey_id);
            assert_eq!(data.response_count, 1);
        }
        other => panic!("unexpected event: {other}"),
    }

    Ok(())
}
