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

//! The coin table (§3 Coin model, §4.3, §6.4): every commitment the wallet owns, its amount,
//! asset id, maturity, and spend status.

pub mod memory;
pub mod selector;
pub mod sqlite;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use nyx_common_types::{asset::AssetId, height::Height, tx_id::TxId, types::Commitment};
use nyx_key_manager::CoinId;
use serde::{Deserialize, Serialize};

use crate::error::CoinStoreError;

/// §3 Coin model: `Outgoing` while reserved for an in-flight send, `Incoming` while a receiver-side
/// coin awaits its creating kernel's proof, `Spent`/`Available` once the chain settles the matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpendStatus {
    Available,
    Outgoing,
    Spent,
    Incoming,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub id: CoinId,
    pub commitment: Commitment,
    pub value: nyx_core::Amount,
    pub asset_id: AssetId,
    pub maturity: Height,
    pub status: SpendStatus,
    /// The negotiation this coin is reserved for while `status == Outgoing` (§3 invariant 1).
    pub reserved_for: Option<TxId>,
    pub created_at: DateTime<Utc>,
}

impl Coin {
    pub fn is_mature_at(&self, tip: Height) -> bool {
        tip.as_u64() >= self.maturity.as_u64()
    }
}

/// Backend behind [`CoinStore`] (§6.4 "coin table"). Every mutation is a single transactional call
/// to the wallet db (§5).
pub trait CoinBackend: Send + Sync {
    fn insert(&self, coin: Coin) -> Result<(), CoinStoreError>;
    fn get(&self, id: CoinId) -> Result<Option<Coin>, CoinStoreError>;
    fn all(&self) -> Result<Vec<Coin>, CoinStoreError>;
    fn set_status(&self, id: CoinId, status: SpendStatus, reserved_for: Option<TxId>) -> Result<(), CoinStoreError>;
    fn next_coin_id(&self) -> Result<CoinId, CoinStoreError>;
}

/// Facade over a [`CoinBackend`] (same `Arc<dyn Trait>` pattern as
/// [`crate::parameter_store::ParameterStore`] — see DESIGN.md).
#[derive(Clone)]
pub struct CoinStore {
    backend: Arc<dyn CoinBackend>,
}

impl CoinStore {
    pub fn new(backend: Arc<dyn CoinBackend>) -> Self {
        CoinStore { backend }
    }

    pub fn insert(&self, coin: Coin) -> Result<(), CoinStoreError> {
        self.backend.insert(coin)
    }

    pub fn all(&self) -> Result<Vec<Coin>, CoinStoreError> {
        self.backend.all()
    }

    pub fn available(&self, asset_id: AssetId, tip: Height) -> Result<Vec<Coin>, CoinStoreError> {
        Ok(self
            .backend
            .all()?
            .into_iter()
            .filter(|c| c.asset_id == asset_id && c.status == SpendStatus::Available && c.is_mature_at(tip))
            .collect())
    }

    /// §4.3 "selected coins are marked `Outgoing` atomically with recording them under
    /// `Inputs`". The parameter-store write happens in the output manager right after this call;
    /// this method only handles the coin-table half.
    pub fn reserve(&self, ids: &[CoinId], tx_id: TxId) -> Result<(), CoinStoreError> {
        for id in ids {
            self.backend.set_status(*id, SpendStatus::Outgoing, Some(tx_id))?;
        }
        Ok(())
    }

    /// §5 cancellation / failure rollback: "returns coins to Available".
    pub fn release(&self, ids: &[CoinId]) -> Result<(), CoinStoreError> {
        for id in ids {
            self.backend.set_status(*id, SpendStatus::Available, None)?;
        }
        Ok(())
    }

    pub fn mark_spent(&self, ids: &[CoinId]) -> Result<(), CoinStoreError> {
        for id in ids {
            self.backend.set_status(*id, SpendStatus::Spent, None)?;
        }
        Ok(())
    }

    /// §4.5 KernelConfirmation: "mark the receiver coins Available at that height".
    pub fn mark_available(&self, ids: &[CoinId]) -> Result<(), CoinStoreError> {
        for id in ids {
            self.backend.set_status(*id, SpendStatus::Available, None)?;
        }
        Ok(())
    }

    pub fn next_coin_id(&self) -> Result<CoinId, CoinStoreError> {
        self.backend.next_coin_id()
    }

    pub fn get(&self, id: CoinId) -> Result<Option<Coin>, CoinStoreError> {
        self.backend.get(id)
    }
}
