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

//! Sqlite-backed [`super::CoinBackend`], following the same `*Sql` row-struct pattern as
//! [`crate::parameter_store::sqlite`].

use diesel::prelude::*;
use chrono::{DateTime, Utc};
use nyx_common_types::{asset::AssetId, height::Height, tx_id::TxId, types::Commitment};
use nyx_key_manager::CoinId;
use tari_utilities::ByteArray;

use super::{Coin, CoinBackend, SpendStatus};
use crate::{error::CoinStoreError, storage::connection::SqliteConnectionPool, storage::schema::coins};

fn status_to_text(status: SpendStatus) -> &'static str {
    match status {
        SpendStatus::Available => "Available",
        SpendStatus::Outgoing => "Outgoing",
        SpendStatus::Spent => "Spent",
        SpendStatus::Incoming => "Incoming",
    }
}

fn status_from_text(text: &str) -> Option<SpendStatus> {
    match text {
        "Available" => Some(SpendStatus::Available),
        "Outgoing" => Some(SpendStatus::Outgoing),
        "Spent" => Some(SpendStatus::Spent),
        "Incoming" => Some(SpendStatus::Incoming),
        _ => None,
    }
}

#[derive(Queryable, Insertable)]
#[diesel(table_name = coins)]
struct CoinSql {
    id: i64,
    commitment: Vec<u8>,
    value: i64,
    asset_id: i64,
    maturity: i64,
    status: String,
    reserved_for: Option<Vec<u8>>,
    created_at: String,
}

impl CoinSql {
    fn from_coin(coin: &Coin) -> Self {
        CoinSql {
            id: coin.id.0 as i64,
            commitment: coin.commitment.as_bytes().to_vec(),
            value: coin.value.as_u64() as i64,
            asset_id: coin.asset_id.0 as i64,
            maturity: coin.maturity.as_u64() as i64,
            status: status_to_text(coin.status).to_string(),
            reserved_for: coin.reserved_for.map(|tx_id| tx_id.as_u128().to_be_bytes().to_vec()),
            created_at: coin.created_at.to_rfc3339(),
        }
    }

    fn into_coin(self) -> Result<Coin, CoinStoreError> {
        let commitment = Commitment::from_bytes(&self.commitment).map_err(|e| CoinStoreError::Backend(e.to_string()))?;
        let status = status_from_text(&self.status).ok_or_else(|| CoinStoreError::Backend(format!("unknown coin status: {}", self.status)))?;
        let reserved_for = match self.reserved_for {
            Some(bytes) => {
                let array: [u8; 16] = bytes.try_into().map_err(|_| CoinStoreError::Backend("malformed reserved_for tx id".into()))?;
                Some(TxId::from(u128::from_be_bytes(array)))
            },
            None => None,
        };
        let created_at: DateTime<Utc> = self
            .created_at
            .parse()
            .map_err(|e: chrono::ParseError| CoinStoreError::Backend(e.to_string()))?;
        Ok(Coin {
            id: CoinId(self.id as u64),
            commitment,
            value: nyx_core::Amount(self.value as u64),
            asset_id: AssetId(self.asset_id as u64),
            maturity: Height(self.maturity as u64),
            status,
            reserved_for,
            created_at,
        })
    }
}

/// A sqlite-backed coin table, one database file per wallet (§3 Coin model, §6.4 persisted state).
pub struct SqliteCoinBackend {
    connection_pool: SqliteConnectionPool,
}

impl SqliteCoinBackend {
    pub fn new(connection_pool: SqliteConnectionPool) -> Self {
        SqliteCoinBackend { connection_pool }
    }
}

impl CoinBackend for SqliteCoinBackend {
    fn insert(&self, coin: Coin) -> Result<(), CoinStoreError> {
        let mut conn = self.connection_pool.get().map_err(|e| CoinStoreError::Backend(e.to_string()))?;
        let row = CoinSql::from_coin(&coin);
        diesel::replace_into(coins::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| CoinStoreError::Backend(e.to_string()))?;
        Ok(())
    }

    fn get(&self, id: CoinId) -> Result<Option<Coin>, CoinStoreError> {
        let mut conn = self.connection_pool.get().map_err(|e| CoinStoreError::Backend(e.to_string()))?;
        let row = coins::table
            .filter(coins::id.eq(id.0 as i64))
            .first::<CoinSql>(&mut conn)
            .optional()
            .map_err(|e| CoinStoreError::Backend(e.to_string()))?;
        row.map(CoinSql::into_coin).transpose()
    }

    fn all(&self) -> Result<Vec<Coin>, CoinStoreError> {
        let mut conn = self.connection_pool.get().map_err(|e| CoinStoreError::Backend(e.to_string()))?;
        let rows = coins::table
            .load::<CoinSql>(&mut conn)
            .map_err(|e| CoinStoreError::Backend(e.to_string()))?;
        rows.into_iter().map(CoinSql::into_coin).collect()
    }

    fn set_status(&self, id: CoinId, status: SpendStatus, reserved_for: Option<TxId>) -> Result<(), CoinStoreError> {
        let mut conn = self.connection_pool.get().map_err(|e| CoinStoreError::Backend(e.to_string()))?;
        let reserved_for_bytes = reserved_for.map(|tx_id| tx_id.as_u128().to_be_bytes().to_vec());
        let affected = diesel::update(coins::table.filter(coins::id.eq(id.0 as i64)))
            .set((coins::status.eq(status_to_text(status)), coins::reserved_for.eq(reserved_for_bytes)))
            .execute(&mut conn)
            .map_err(|e| CoinStoreError::Backend(e.to_string()))?;
        if affected == 0 {
            return Err(CoinStoreError::NotFound(id));
        }
        Ok(())
    }

    fn next_coin_id(&self) -> Result<CoinId, CoinStoreError> {
        let mut conn = self.connection_pool.get().map_err(|e| CoinStoreError::Backend(e.to_string()))?;
        let max_id = coins::table
            .select(diesel::dsl::max(coins::id))
            .first::<Option<i64>>(&mut conn)
            .map_err(|e| CoinStoreError::Backend(e.to_string()))?;
        Ok(CoinId(max_id.unwrap_or(-1) as u64 + 1))
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use chrono::Utc;
    use nyx_common_types::types::{CommitmentFactory, PrivateKey};

    use super::*;
    use crate::coin::CoinStore;

    fn store() -> CoinStore {
        let path = nyx_test_utils::paths::create_temporary_data_path().join("wallet.sqlite3");
        let pool = SqliteConnectionPool::connect(path.to_str().unwrap()).unwrap();
        CoinStore::new(Arc::new(SqliteCoinBackend::new(pool)))
    }

    fn dummy_coin(id: CoinId, value: u64) -> Coin {
        Coin {
            id,
            commitment: CommitmentFactory::default().commit_value(&PrivateKey::default(), value),
            value: nyx_core::Amount(value),
            asset_id: AssetId::NATIVE,
            maturity: Height(0),
            status: SpendStatus::Available,
            reserved_for: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn insert_then_get_round_trips_through_sqlite() {
        let store = store();
        let id = store.next_coin_id().unwrap();
        store.insert(dummy_coin(id, 42)).unwrap();
        let coin = store.get(id).unwrap().unwrap();
        assert_eq!(coin.value, nyx_core::Amount(42));
        assert_eq!(coin.status, SpendStatus::Available);
    }

    #[test]
    fn reserve_persists_the_owning_tx_id() {
        let store = store();
        let id = store.next_coin_id().unwrap();
        store.insert(dummy_coin(id, 42)).unwrap();
        let tx_id = TxId::new_random();
        store.reserve(&[id], tx_id).unwrap();
        let coin = store.get(id).unwrap().unwrap();
        assert_eq!(coin.status, SpendStatus::Outgoing);
        assert_eq!(coin.reserved_for, Some(tx_id));
    }

    #[test]
    fn next_coin_id_increments_across_inserts() {
        let store = store();
        let first = store.next_coin_id().unwrap();
        store.insert(dummy_coin(first, 1)).unwrap();
        let second = store.next_coin_id().unwrap();
        assert!(second.0 > first.0);
    }
}
