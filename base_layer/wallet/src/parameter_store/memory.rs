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

//! In-memory test double for [`super::ParameterStoreBackend`]: a plain `HashMap`-backed stand-in
//! for the sqlite backend, shipped alongside it for tests that don't need a database file.

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use nyx_common_types::{tx_id::TxId, TxParameterId};

use super::ParameterStoreBackend;
use crate::error::ParameterStoreError;

#[derive(Default)]
pub struct InMemoryParameterStoreBackend {
    values: Mutex<HashMap<(TxId, u64, TxParameterId), Vec<u8>>>,
}

impl InMemoryParameterStoreBackend {
    pub fn new() -> Self {
        InMemoryParameterStoreBackend { values: Mutex::new(HashMap::new()) }
    }
}

impl ParameterStoreBackend for InMemoryParameterStoreBackend {
    fn get_raw(&self, tx_id: TxId, sub_tx_id: u64, key: TxParameterId) -> Result<Option<Vec<u8>>, ParameterStoreError> {
        let values = self.values.lock().expect("parameter store mutex poisoned");
        Ok(values.get(&(tx_id, sub_tx_id, key)).cloned())
    }

    fn set_raw(&self, tx_id: TxId, sub_tx_id: u64, key: TxParameterId, value: Vec<u8>) -> Result<(), ParameterStoreError> {
        let mut values = self.values.lock().expect("parameter store mutex poisoned");
        values.insert((tx_id, sub_tx_id, key), value);
        Ok(())
    }

    fn delete_raw(&self, tx_id: TxId, sub_tx_id: u64, key: TxParameterId) -> Result<(), ParameterStoreError> {
        let mut values = self.values.lock().expect("parameter store mutex poisoned");
        values.remove(&(tx_id, sub_tx_id, key));
        Ok(())
    }

    fn known_tx_ids(&self) -> Result<Vec<TxId>, ParameterStoreError> {
        let values = self.values.lock().expect("parameter store mutex poisoned");
        let ids: HashSet<TxId> = values.keys().map(|(tx_id, _, _)| *tx_id).collect();
        Ok(ids.into_iter().collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn delete_then_get_is_none() {
        let backend = InMemoryParameterStoreBackend::new();
        let tx_id = TxId::new_random();
        backend.set_raw(tx_id, 0, TxParameterId::Amount, vec![1]).unwrap();
        backend.delete_raw(tx_id, 0, TxParameterId::Amount).unwrap();
        assert_eq!(backend.get_raw(tx_id, 0, TxParameterId::Amount).unwrap(), None);
    }

    #[test]
    fn known_tx_ids_deduplicates_across_keys() {
        let backend = InMemoryParameterStoreBackend::new();
        let tx_id = TxId::new_random();
        backend.set_raw(tx_id, 0, TxParameterId::Amount, vec![1]).unwrap();
        backend.set_raw(tx_id, 0, TxParameterId::Fee, vec![2]).unwrap();
        assert_eq!(backend.known_tx_ids().unwrap(), vec![tx_id]);
    }
}
