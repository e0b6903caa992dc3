// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod aggregate_requested;
mod aggregate_revealed;
mod response_submitted;
mod results_published;
mod reveal_delivered;
mod survey_closed;
mod survey_created;
mod test_event;

pub use aggregate_requested::*;
pub use aggregate_revealed::*;
pub use response_submitted::*;
pub use results_published::*;
pub use reveal_delivered::*;
pub use survey_closed::*;
pub use survey_created::*;
pub use test_event::*;

use crate::{Event, EventId, SurveyId};
use actix::Message;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to help define From traits for SurveyEvent
macro_rules! impl_from_event {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for SurveyEvent {
                fn from(data: $variant) -> Self {
                    SurveyEvent::$variant {
                        id: EventId::hash(data.clone()),
                        data,
                    }
                }
            }
        )*
    };
}

#[derive(Message, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[rtype(result = "()")]
pub enum SurveyEvent {
    SurveyCreated {
        id: EventId,
        data: SurveyCreated,
    },
    ResponseSubmitted {
        id: EventId,
        data: ResponseSubmitted,
    },
    SurveyClosed {
        id: EventId,
        data: SurveyClosed,
    },
    ResultsPublished {
        id: EventId,
        data: ResultsPublished,
    },
    AggregateRequested {
        id: EventId,
        data: AggregateRequested,
    },
    RevealDelivered {
        id: EventId,
        data: RevealDelivered,
    },
    AggregateRevealed {
        id: EventId,
        data: AggregateRevealed,
    },
    /// This is a test event to use in testing
    TestEvent {
        id: EventId,
        data: TestEvent,
    },
}

impl_from_event!(
    SurveyCreated,
    ResponseSubmitted,
    SurveyClosed,
    ResultsPublished,
    AggregateRequested,
    RevealDelivered,
    AggregateRevealed,
    TestEvent
);

impl SurveyEvent {
    /// The survey the event concerns, when it names one. RevealDelivered only
    /// carries a request id; the registry resolves it via its pending table.
    pub fn get_survey_id(&self) -> Option<SurveyId> {
        match self {
            SurveyEvent::SurveyCreated { data, .. } => Some(data.survey_id),
            SurveyEvent::ResponseSubmitted { data, .. } => Some(data.survey_id),
            SurveyEvent::SurveyClosed { data, .. } => Some(data.survey_id),
            SurveyEvent::ResultsPublished { data, .. } => Some(data.survey_id),
            SurveyEvent::AggregateRequested { data, .. } => Some(data.survey_id),
            SurveyEvent::RevealDelivered { .. } => None,
            SurveyEvent::AggregateRevealed { data, .. } => Some(data.survey_id),
            SurveyEvent::TestEvent { .. } => None,
        }
    }
}

impl Event for SurveyEvent {
    type Id = EventId;

    fn event_type(&self) -> String {
        match self {
            SurveyEvent::SurveyCreated { .. } => "SurveyCreated",
            SurveyEvent::ResponseSubmitted { .. } => "ResponseSubmitted",
            SurveyEvent::SurveyClosed { .. } => "SurveyClosed",
            SurveyEvent::ResultsPublished { .. } => "ResultsPublished",
            SurveyEvent::AggregateRequested { .. } => "AggregateRequested",
            SurveyEvent::RevealDelivered { .. } => "RevealDelivered",
            SurveyEvent::AggregateRevealed { .. } => "AggregateRevealed",
            SurveyEvent::TestEvent { .. } => "TestEvent",
        }
        .to_string()
    }

    fn event_id(&self) -> Self::Id {
        match self {
            SurveyEvent::SurveyCreated { id, .. } => id.clone(),
            SurveyEvent::ResponseSubmitted { id, .. } => id.clone(),
            SurveyEvent::SurveyClosed { id, .. } => id.clone(),
            SurveyEvent::ResultsPublished { id, .. } => id.clone(),
            SurveyEvent::AggregateRequested { id, .. } => id.clone(),
            SurveyEvent::RevealDelivered { id, .. } => id.clone(),
            SurveyEvent::AggregateRevealed { id, .. } => id.clone(),
            SurveyEvent::TestEvent { id, .. } => id.clone(),
        }
    }
}

impl fmt::Display for SurveyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurveyEvent::SurveyCreated { data, .. } => write!(f, "SurveyCreated({data})"),
            SurveyEvent::ResponseSubmitted { data, .. } => write!(f, "ResponseSubmitted({data})"),
            SurveyEvent::SurveyClosed { data, .. } => write!(f, "SurveyClosed({data})"),
            SurveyEvent::ResultsPublished { data, .. } => write!(f, "ResultsPublished({data})"),
            SurveyEvent::AggregateRequested { data, .. } => write!(f, "AggregateRequested({data})"),
            SurveyEvent::RevealDelivered { data, .. } => write!(f, "RevealDelivered({data})"),
            SurveyEvent::AggregateRevealed { data, .. } => write!(f, "AggregateRevealed({data})"),
            SurveyEvent::TestEvent { data, .. } => write!(f, "TestEvent({data})"),
        }
    }
}
