// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use pulse_events::Principal;
use pulse_registry::CreateSurvey;
use rand::Rng;

/// A random respondent identity, unique per call with overwhelming
/// probability.
pub fn rand_principal(prefix: &str) -> Principal {
    let salt: u64 = rand::thread_rng().gen();
    Principal::new(format!("{prefix}-{salt:016x}"))
}

/// A two-question survey request with sane defaults for tests.
pub fn sample_survey(creator: &Principal, duration_secs: u64) -> CreateSurvey {
    CreateSurvey {
        creator: creator.clone(),
        title: "Quarterly pulse".into(),
        description: "How was this quarter?".into(),
        questions: vec![
            "How satisfied are you with your workload?".into(),
            "How would you rate team morale?".into(),
        ],
        duration_secs,
    }
}
