// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::{
    fmt,
    hash::{DefaultHasher, Hash, Hasher},
};

/// Content-derived identifier for one published survey event; the bus keys
/// its duplicate filter on these. Domain-tagged so an event id can never
/// collide with another id family derived from the same payload bytes
/// (reveal request ids share the sha2 construction).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub [u8; 32]);

const DOMAIN_TAG: &[u8] = b"pulse:survey-event";

impl EventId {
    pub fn hash<T: Hash>(value: T) -> Self {
        let mut payload_hasher = DefaultHasher::new();
        value.hash(&mut payload_hasher);

        let mut hasher = Sha256::new();
        hasher.update(DOMAIN_TAG);
        hasher.update(payload_hasher.finish().to_le_bytes());
        EventId(hasher.finalize().into())
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base58_string = bs58::encode(&self.0).into_string();
        write!(f, "evt:{}", &base58_string[0..8])
    }
}
