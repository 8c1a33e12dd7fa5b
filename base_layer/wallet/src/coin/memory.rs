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

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex,
    },
};

use nyx_key_manager::CoinId;
use nyx_common_types::tx_id::TxId;

use super::{Coin, CoinBackend, SpendStatus};
use crate::error::CoinStoreError;

#[derive(Default)]
pub struct InMemoryCoinBackend {
    coins: Mutex<HashMap<CoinId, Coin>>,
    next_id: AtomicU64,
}

impl InMemoryCoinBackend {
    pub fn new() -> Self {
        InMemoryCoinBackend::default()
    }
}

impl CoinBackend for InMemoryCoinBackend {
    fn insert(&self, coin: Coin) -> Result<(), CoinStoreError> {
        self.coins.lock().expect("coin store mutex poisoned").insert(coin.id, coin);
        Ok(())
    }

    fn get(&self, id: CoinId) -> Result<Option<Coin>, CoinStoreError> {
        Ok(self.coins.lock().expect("coin store mutex poisoned").get(&id).cloned())
    }

    fn all(&self) -> Result<Vec<Coin>, CoinStoreError> {
        Ok(self.coins.lock().expect("coin store mutex poisoned").values().cloned().collect())
    }

    fn set_status(&self, id: CoinId, status: SpendStatus, reserved_for: Option<TxId>) -> Result<(), CoinStoreError> {
        let mut coins = self.coins.lock().expect("coin store mutex poisoned");
        let coin = coins.get_mut(&id).ok_or(CoinStoreError::NotFound(id))?;
        coin.status = status;
        coin.reserved_for = reserved_for;
        Ok(())
    }

    fn next_coin_id(&self) -> Result<CoinId, CoinStoreError> {
        Ok(CoinId(self.next_id.fetch_add(1, Ordering::SeqCst)))
    }
}

#[cfg(test)]
mod test {
    use chrono::Utc;
    use nyx_common_types::{asset::AssetId, height::Height};
    use nyx_core::Amount;
    use nyx_common_types::types::{Commitment, CommitmentFactory, PrivateKey};

    use super::*;

    fn dummy_coin(id: CoinId, value: u64) -> Coin {
        Coin {
            id,
            commitment: CommitmentFactory::default().commit_value(&PrivateKey::default(), value),
            value: Amount(value),
            asset_id: AssetId::NATIVE,
            maturity: Height(0),
            status: SpendStatus::Available,
            reserved_for: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn reserve_then_release_round_trips_status() {
        let backend = InMemoryCoinBackend::new();
        let id = backend.next_coin_id().unwrap();
        backend.insert(dummy_coin(id, 100)).unwrap();
        let tx_id = TxId::new_random();
        backend.set_status(id, SpendStatus::Outgoing, Some(tx_id)).unwrap();
        assert_eq!(backend.get(id).unwrap().unwrap().status, SpendStatus::Outgoing);
        backend.set_status(id, SpendStatus::Available, None).unwrap();
        assert_eq!(backend.get(id).unwrap().unwrap().status, SpendStatus::Available);
    }

    #[test]
    fn setting_status_on_unknown_coin_fails() {
        let backend = InMemoryCoinBackend::new();
        assert!(matches!(backend.set_status(CoinId(99), SpendStatus::Spent, None), Err(CoinStoreError::NotFound(_))));
    }
}
