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

//! The Parameter Store (§4.1, C1): a persistent typed key/value map per transaction id. The store
//! itself is indifferent to the meaning of a value — every key is addressed by [`TxParameterId`]
//! and every value travels as a length-prefixed `bincode` blob behind the [`Codec`] trait (§9
//! REDESIGN FLAGS "typed serializer per key").

pub mod memory;
pub mod sqlite;

use std::sync::Arc;

use nyx_common_types::{tx_id::TxId, TxParameterId};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::broadcast;

use crate::error::ParameterStoreError;

/// A typed encoder/decoder for one parameter value. The store only ever moves bytes; every caller
/// goes through `Codec::encode`/`decode` so a given [`TxParameterId`] always round-trips through
/// the same shape.
pub trait Codec<T> {
    fn encode(value: &T) -> Result<Vec<u8>, ParameterStoreError>;
    fn decode(bytes: &[u8]) -> Result<T, ParameterStoreError>;
}

/// The default codec: plain `bincode`, matching every other persisted type in this workspace.
pub struct BincodeCodec;

impl<T> Codec<T> for BincodeCodec
where
    T: Serialize + DeserializeOwned,
{
    fn encode(value: &T) -> Result<Vec<u8>, ParameterStoreError> {
        bincode::serialize(value).map_err(|e| ParameterStoreError::Codec(e.to_string()))
    }

    fn decode(bytes: &[u8]) -> Result<T, ParameterStoreError> {
        bincode::deserialize(bytes).map_err(|e| ParameterStoreError::Codec(e.to_string()))
    }
}

/// Backend for the raw byte storage behind [`ParameterStore`] (§9 REDESIGN FLAGS): a `*Backend`
/// trait plus a sqlite implementation and an in-memory double. Knows nothing about `T`; only
/// about `(TxId, SubTxId, TxParameterId) -> bytes`.
pub trait ParameterStoreBackend: Send + Sync {
    fn get_raw(&self, tx_id: TxId, sub_tx_id: u64, key: TxParameterId) -> Result<Option<Vec<u8>>, ParameterStoreError>;
    fn set_raw(&self, tx_id: TxId, sub_tx_id: u64, key: TxParameterId, value: Vec<u8>) -> Result<(), ParameterStoreError>;
    fn delete_raw(&self, tx_id: TxId, sub_tx_id: u64, key: TxParameterId) -> Result<(), ParameterStoreError>;
    /// Every `TxId` with at least one recorded parameter, for startup re-entry scans.
    fn known_tx_ids(&self) -> Result<Vec<TxId>, ParameterStoreError>;
}

/// One coalesced notification: "this key, for this tx, changed" (§4.1 observer contract). The
/// payload is deliberately not the new value — subscribers re-read through `get` if they care,
/// keeping the notification itself a plain wakeup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterChange {
    pub tx_id: TxId,
    pub key: TxParameterId,
}

/// `get<T>`/`set<T>`/`delete` (§4.1). Holds an `Arc<dyn ParameterStoreBackend>` rather than being
/// generic over the backend type, the same way [`nyx_key_manager::worker::ThreadedKeyKeeperHandle`]
/// holds its keeper — the negotiation driver only ever needs one concrete store per wallet
/// instance, so there is nothing to gain from monomorphizing the whole service stack over it.
#[derive(Clone)]
pub struct ParameterStore {
    backend: Arc<dyn ParameterStoreBackend>,
    observer: broadcast::Sender<ParameterChange>,
}

impl ParameterStore {
    pub fn new(backend: Arc<dyn ParameterStoreBackend>) -> Self {
        let (observer, _) = broadcast::channel(256);
        ParameterStore { backend, observer }
    }

    /// §4.1 observer contract: "subscribers are notified when a key in a curated 'interesting'
    /// subset changes". Best-effort: a lagging subscriber misses the oldest notifications rather
    /// than blocking the writer (`broadcast`'s usual semantics).
    pub fn subscribe(&self) -> broadcast::Receiver<ParameterChange> {
        self.observer.subscribe()
    }

    pub fn get<T: DeserializeOwned>(&self, tx_id: TxId, key: TxParameterId, sub_tx_id: u64) -> Result<Option<T>, ParameterStoreError> {
        match self.backend.get_raw(tx_id, sub_tx_id, key)? {
            Some(bytes) => Ok(Some(BincodeCodec::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// §4.1 `getMandatory`: the value, or `MissingParameter(key)`.
    pub fn get_mandatory<T: DeserializeOwned>(&self, tx_id: TxId, key: TxParameterId, sub_tx_id: u64) -> Result<T, ParameterStoreError> {
        self.get(tx_id, key, sub_tx_id)?.ok_or(ParameterStoreError::MissingParameter(key, tx_id))
    }

    pub fn set<T: Serialize>(&self, tx_id: TxId, key: TxParameterId, sub_tx_id: u64, value: &T) -> Result<(), ParameterStoreError> {
        let bytes = BincodeCodec::encode(value)?;
        self.backend.set_raw(tx_id, sub_tx_id, key, bytes)?;
        if key.is_observable() {
            // No subscribers is not an error: the notification is best-effort (§4.1).
            let _ = self.observer.send(ParameterChange { tx_id, key });
        }
        Ok(())
    }

    pub fn delete(&self, tx_id: TxId, key: TxParameterId, sub_tx_id: u64) -> Result<(), ParameterStoreError> {
        self.backend.delete_raw(tx_id, sub_tx_id, key)
    }

    /// Passthrough to the raw bytes, for callers (the wire codec in [`crate::record`]) that move
    /// a value between two parties without ever needing to decode it themselves.
    pub fn get_raw(&self, tx_id: TxId, key: TxParameterId, sub_tx_id: u64) -> Result<Option<Vec<u8>>, ParameterStoreError> {
        self.backend.get_raw(tx_id, sub_tx_id, key)
    }

    pub fn set_raw(&self, tx_id: TxId, key: TxParameterId, sub_tx_id: u64, bytes: Vec<u8>) -> Result<(), ParameterStoreError> {
        self.backend.set_raw(tx_id, sub_tx_id, key, bytes)?;
        if key.is_observable() {
            let _ = self.observer.send(ParameterChange { tx_id, key });
        }
        Ok(())
    }

    pub fn known_tx_ids(&self) -> Result<Vec<TxId>, ParameterStoreError> {
        self.backend.known_tx_ids()
    }
}

#[cfg(test)]
mod test {
    use nyx_core::Amount;

    use super::*;
    use crate::parameter_store::memory::InMemoryParameterStoreBackend;

    fn store() -> ParameterStore {
        ParameterStore::new(Arc::new(InMemoryParameterStoreBackend::new()))
    }

    #[test]
    fn missing_key_is_not_an_error() {
        let store = store();
        let value: Option<Amount> = store.get(TxId::new_random(), TxParameterId::Amount, 0).unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn get_mandatory_fails_when_absent() {
        let store = store();
        let tx_id = TxId::new_random();
        let result: Result<Amount, _> = store.get_mandatory(tx_id, TxParameterId::Amount, 0);
        assert!(matches!(result, Err(ParameterStoreError::MissingParameter(TxParameterId::Amount, id)) if id == tx_id));
    }

    #[test]
    fn set_then_get_round_trips() {
        let store = store();
        let tx_id = TxId::new_random();
        store.set(tx_id, TxParameterId::Amount, 0, &Amount(42)).unwrap();
        let value: Amount = store.get_mandatory(tx_id, TxParameterId::Amount, 0).unwrap();
        assert_eq!(value, Amount(42));
    }

    #[test]
    fn observable_key_notifies_subscribers() {
        let store = store();
        let mut rx = store.subscribe();
        let tx_id = TxId::new_random();
        store.set(tx_id, TxParameterId::Amount, 0, &Amount(1)).unwrap();
        let change = rx.try_recv().unwrap();
        assert_eq!(change, ParameterChange { tx_id, key: TxParameterId::Amount });
    }

    #[test]
    fn non_observable_key_does_not_notify() {
        let store = store();
        let mut rx = store.subscribe();
        let tx_id = TxId::new_random();
        store.set(tx_id, TxParameterId::PeerSignature, 0, &vec![1u8, 2, 3]).unwrap();
        assert!(rx.try_recv().is_err());
    }
}
