// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::ManualClock;
use actix::Addr;
use pulse_compute::MockBackend;
use pulse_events::{new_event_bus_with_history, EventBus, HistoryCollector, SurveyEvent};
use pulse_registry::SurveyRegistry;
use std::sync::Arc;

/// Fully wired registry system for tests: bus with history capture, mock
/// backend, manual clock, registry subscribed for reveal deliveries.
pub struct RegistryRig {
    pub bus: Addr<EventBus<SurveyEvent>>,
    pub history: Addr<HistoryCollector<SurveyEvent>>,
    pub backend: Arc<MockBackend>,
    pub clock: ManualClock,
    pub registry: Addr<SurveyRegistry>,
}

impl RegistryRig {
    pub fn new() -> Self {
        Self::starting_at(1_000)
    }

    pub fn starting_at(now: i64) -> Self {
        let (bus, history) = new_event_bus_with_history::<SurveyEvent>();
        let backend = Arc::new(MockBackend::new(bus.clone()));
        let clock = ManualClock::starting_at(now);
        let registry = SurveyRegistry::attach(&bus, backend.clone(), Arc::new(clock.clone()));
        Self {
            bus,
            history,
            backend,
            clock,
            registry,
        }
    }
}

impl Default for RegistryRig {
    fn default() -> Self {
        Self::new()
    }
}
