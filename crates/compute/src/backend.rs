// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::CiphertextHandle;
use pulse_events::{Principal, RequestId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Access a principal can be granted on a ciphertext handle. An annotation
/// carried by the backend alongside the handle, not a cryptographic
/// operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// May use the handle as an operand in homomorphic computation.
    Compute,
    /// May ask the backend to decrypt the handle for themselves.
    Decrypt,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComputeError {
    #[error("unknown ciphertext handle {0}")]
    UnknownHandle(CiphertextHandle),
    #[error("backend refused the reveal request")]
    RevealRefused,
}

/// Capability surface of the confidential compute backend. The registry is
/// the only caller; everything cryptographic happens behind this seam.
///
/// `encrypt`, `homomorphic_add` and `grant_access` are synchronous handle
/// bookkeeping. `request_reveal` is the one true suspension point: it
/// returns as soon as the backend accepts the request, and the plaintexts
/// arrive later as a `RevealDelivered` event on the bus.
pub trait ConfidentialCompute: Send + Sync + 'static {
    fn encrypt(&self, plaintext: u64) -> Result<CiphertextHandle, ComputeError>;

    fn homomorphic_add(
        &self,
        lhs: CiphertextHandle,
        rhs: CiphertextHandle,
    ) -> Result<CiphertextHandle, ComputeError>;

    fn grant_access(
        &self,
        handle: CiphertextHandle,
        principal: &Principal,
        capability: Capability,
    ) -> Result<(), ComputeError>;

    fn request_reveal(
        &self,
        handles: Vec<CiphertextHandle>,
        request_id: RequestId,
    ) -> Result<(), ComputeError>;
}
