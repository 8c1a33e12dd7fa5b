// Copyright 2026. The Nyx Wallet Community
//
// Redistribution and use in source and binary forms, with or without modification, are permitted provided that the
// following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice, this list of conditions and the following
// disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice, this list of conditions and the
// following disclaimer in the documentation and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its contributors may be used to endorse or promote
// products derived from this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES,
// INCLUDING, BUT NOT LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL,
// SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY,
// WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE
// USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

//! Persisted nonce-slot bookkeeping (§4.2 `allocateNonceSlot`/`generateNonce`, §8 P3). A nonce
//! slot's secret is derived deterministically from its index, so the slot itself never needs to
//! be stored — only two things do: the next free index, and, per slot, the one challenge it has
//! already signed. That second fact is what turns "nonce reuse" from a private-key leak into a
//! rejected request.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex,
    },
};

use crate::{error::KeyKeeperError, requests::NonceSlotId};

/// Backend for nonce-slot allocation and reuse tracking. A hardware keeper would persist the
/// last-signed-challenge table in the same durable store it keeps its seed in; [`InMemoryNonceStore`]
/// is the test double (and is also adequate for a keeper whose process never restarts mid-negotiation).
pub trait NonceStore: Send + Sync {
    /// Reserves the next unused slot index. Allocation never fails and never reuses an index.
    fn allocate(&self) -> NonceSlotId;

    /// Records that `slot` is about to sign `challenge`. Returns `Ok(())` the first time a slot is
    /// used, and every subsequent time it is asked to sign the *same* challenge again (§8 P3
    /// invariant 1, re-entry determinism). Returns [`KeyKeeperError::NonceSlotReused`] if the slot
    /// is asked to sign a *different* challenge than the one it already committed to (§8 P3
    /// invariant 2).
    fn record_use(&self, slot: NonceSlotId, challenge: &[u8]) -> Result<(), KeyKeeperError>;
}

#[derive(Default)]
pub struct InMemoryNonceStore {
    next: AtomicU64,
    used: Mutex<HashMap<u64, Vec<u8>>>,
}

impl InMemoryNonceStore {
    pub fn new() -> Self {
        InMemoryNonceStore {
            next: AtomicU64::new(0),
            used: Mutex::new(HashMap::new()),
        }
    }
}

impl NonceStore for InMemoryNonceStore {
    fn allocate(&self) -> NonceSlotId {
        NonceSlotId(self.next.fetch_add(1, Ordering::SeqCst))
    }

    fn record_use(&self, slot: NonceSlotId, challenge: &[u8]) -> Result<(), KeyKeeperError> {
        let mut used = self.used.lock().expect("nonce store mutex poisoned");
        match used.get(&slot.0) {
            Some(prior) if prior == challenge => Ok(()),
            Some(_) => Err(KeyKeeperError::NonceSlotReused(slot.0)),
            None => {
                used.insert(slot.0, challenge.to_vec());
                Ok(())
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn allocate_never_repeats_an_index() {
        let store = InMemoryNonceStore::new();
        let a = store.allocate();
        let b = store.allocate();
        assert_ne!(a, b);
    }

    #[test]
    fn signing_the_same_challenge_twice_is_idempotent() {
        let store = InMemoryNonceStore::new();
        let slot = store.allocate();
        assert!(store.record_use(slot, b"challenge-a").is_ok());
        assert!(store.record_use(slot, b"challenge-a").is_ok());
    }

    #[test]
    fn signing_a_different_challenge_is_rejected() {
        let store = InMemoryNonceStore::new();
        let slot = store.allocate();
        store.record_use(slot, b"challenge-a").unwrap();
        let result = store.record_use(slot, b"challenge-b");
        assert!(matches!(result, Err(KeyKeeperError::NonceSlotReused(_))));
    }
}
