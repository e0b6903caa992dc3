// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{Capability, CiphertextHandle, ComputeError, ConfidentialCompute};
use actix::Addr;
use pulse_events::{EventBus, Principal, RequestId, RevealDelivered, SurveyEvent};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::debug;

#[derive(Default)]
struct MockState {
    next_handle: u64,
    plaintexts: HashMap<CiphertextHandle, u64>,
    grants: HashMap<CiphertextHandle, Vec<(Principal, Capability)>>,
}

/// Plaintext-backed stand-in for the real backend. Handles index into a
/// private side table; "homomorphic" addition is ordinary addition on that
/// table. Reveals are delivered asynchronously through the event bus, so
/// callers exercise the same request/callback split as against a real
/// coprocessor.
pub struct MockBackend {
    bus: Addr<EventBus<SurveyEvent>>,
    state: Mutex<MockState>,
    refuse_reveals: AtomicBool,
    hold_reveals: AtomicBool,
}

impl MockBackend {
    pub fn new(bus: Addr<EventBus<SurveyEvent>>) -> Self {
        Self {
            bus,
            state: Mutex::new(MockState::default()),
            refuse_reveals: AtomicBool::new(false),
            hold_reveals: AtomicBool::new(false),
        }
    }

    /// Make subsequent `request_reveal` calls fail, to exercise the
    /// caller's retry path.
    pub fn set_refuse_reveals(&self, refuse: bool) {
        self.refuse_reveals.store(refuse, Ordering::SeqCst);
    }

    /// Accept subsequent `request_reveal` calls but never deliver, to
    /// exercise requests that stay in flight.
    pub fn set_hold_reveals(&self, hold: bool) {
        self.hold_reveals.store(hold, Ordering::SeqCst);
    }

    /// Capability grants recorded for the given handle, in grant order.
    pub fn grants_for(&self, handle: CiphertextHandle) -> Vec<(Principal, Capability)> {
        let state = self.state.lock().expect("mock backend lock poisoned");
        state.grants.get(&handle).cloned().unwrap_or_default()
    }

    /// Test-only peek behind the encryption boundary.
    pub fn plaintext_of(&self, handle: CiphertextHandle) -> Option<u64> {
        let state = self.state.lock().expect("mock backend lock poisoned");
        state.plaintexts.get(&handle).copied()
    }

    fn alloc(state: &mut MockState, plaintext: u64) -> CiphertextHandle {
        state.next_handle += 1;
        let handle = CiphertextHandle::new(state.next_handle);
        state.plaintexts.insert(handle, plaintext);
        handle
    }
}

impl ConfidentialCompute for MockBackend {
    fn encrypt(&self, plaintext: u64) -> Result<CiphertextHandle, ComputeError> {
        let mut state = self.state.lock().expect("mock backend lock poisoned");
        let handle = Self::alloc(&mut state, plaintext);
        debug!(%handle, "encrypted value");
        Ok(handle)
    }

    fn homomorphic_add(
        &self,
        lhs: CiphertextHandle,
        rhs: CiphertextHandle,
    ) -> Result<CiphertextHandle, ComputeError> {
        let mut state = self.state.lock().expect("mock backend lock poisoned");
        let a = *state
            .plaintexts
            .get(&lhs)
            .ok_or(ComputeError::UnknownHandle(lhs))?;
        let b = *state
            .plaintexts
            .get(&rhs)
            .ok_or(ComputeError::UnknownHandle(rhs))?;
        Ok(Self::alloc(&mut state, a.wrapping_add(b)))
    }

    fn grant_access(
        &self,
        handle: CiphertextHandle,
        principal: &Principal,
        capability: Capability,
    ) -> Result<(), ComputeError> {
        let mut state = self.state.lock().expect("mock backend lock poisoned");
        if !state.plaintexts.contains_key(&handle) {
            return Err(ComputeError::UnknownHandle(handle));
        }
        state
            .grants
            .entry(handle)
            .or_default()
            .push((principal.clone(), capability));
        Ok(())
    }

    fn request_reveal(
        &self,
        handles: Vec<CiphertextHandle>,
        request_id: RequestId,
    ) -> Result<(), ComputeError> {
        if self.refuse_reveals.load(Ordering::SeqCst) {
            return Err(ComputeError::RevealRefused);
        }

        if self.hold_reveals.load(Ordering::SeqCst) {
            debug!(%request_id, "holding reveal, nothing will be delivered");
            return Ok(());
        }

        let plaintexts = {
            let state = self.state.lock().expect("mock backend lock poisoned");
            handles
                .iter()
                .map(|h| {
                    state
                        .plaintexts
                        .get(h)
                        .copied()
                        .ok_or(ComputeError::UnknownHandle(*h))
                })
                .collect::<Result<Vec<u64>, ComputeError>>()?
        };

        debug!(%request_id, count = plaintexts.len(), "delivering reveal");

        // do_send goes through the bus mailbox, so the plaintexts arrive on a
        // later turn, the same way a real coprocessor callback would.
        self.bus.do_send(SurveyEvent::from(RevealDelivered {
            request_id,
            plaintexts,
        }));

        Ok(())
    }
}
