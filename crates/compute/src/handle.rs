// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Opaque reference to an encrypted value held by the confidential compute
/// backend. The registry only ever stores and forwards these; the plaintext
/// never leaves the backend except through a sanctioned aggregate reveal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CiphertextHandle(u64);

impl CiphertextHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for CiphertextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ct:{}", self.0)
    }
}
