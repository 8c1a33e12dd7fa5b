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

//! Sqlite-backed [`super::ParameterStoreBackend`]: a pooled connection plus one `*Sql` row type
//! per table.

use diesel::prelude::*;
use nyx_common_types::{tx_id::TxId, TxParameterId};
use strum::IntoEnumIterator;

use super::ParameterStoreBackend;
use crate::{error::ParameterStoreError, storage::connection::SqliteConnectionPool, storage::schema::parameter_values};

fn parameter_id_to_text(id: TxParameterId) -> String {
    format!("{:?}", id)
}

fn parameter_id_from_text(text: &str) -> Option<TxParameterId> {
    TxParameterId::iter().find(|id| parameter_id_to_text(*id) == text)
}

#[derive(Queryable, Insertable)]
#[diesel(table_name = parameter_values)]
struct ParameterValueSql {
    tx_id: Vec<u8>,
    sub_tx_id: i64,
    parameter_id: String,
    value: Vec<u8>,
}

/// A sqlite-backed parameter store, one database file per wallet (§4.1, §6.4 persisted state).
pub struct SqliteParameterStoreBackend {
    connection_pool: SqliteConnectionPool,
}

impl SqliteParameterStoreBackend {
    pub fn new(connection_pool: SqliteConnectionPool) -> Self {
        SqliteParameterStoreBackend { connection_pool }
    }
}

impl ParameterStoreBackend for SqliteParameterStoreBackend {
    fn get_raw(&self, tx_id: TxId, sub_tx_id: u64, key: TxParameterId) -> Result<Option<Vec<u8>>, ParameterStoreError> {
        let mut conn = self.connection_pool.get().map_err(|e| ParameterStoreError::Backend(e.to_string()))?;
        let row = parameter_values::table
            .filter(parameter_values::tx_id.eq(tx_id.as_u128().to_be_bytes().to_vec()))
            .filter(parameter_values::sub_tx_id.eq(sub_tx_id as i64))
            .filter(parameter_values::parameter_id.eq(parameter_id_to_text(key)))
            .select(parameter_values::value)
            .first::<Vec<u8>>(&mut conn)
            .optional()
            .map_err(|e| ParameterStoreError::Backend(e.to_string()))?;
        Ok(row)
    }

    fn set_raw(&self, tx_id: TxId, sub_tx_id: u64, key: TxParameterId, value: Vec<u8>) -> Result<(), ParameterStoreError> {
        let mut conn = self.connection_pool.get().map_err(|e| ParameterStoreError::Backend(e.to_string()))?;
        let row = ParameterValueSql {
            tx_id: tx_id.as_u128().to_be_bytes().to_vec(),
            sub_tx_id: sub_tx_id as i64,
            parameter_id: parameter_id_to_text(key),
            value,
        };
        diesel::replace_into(parameter_values::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| ParameterStoreError::Backend(e.to_string()))?;
        Ok(())
    }

    fn delete_raw(&self, tx_id: TxId, sub_tx_id: u64, key: TxParameterId) -> Result<(), ParameterStoreError> {
        let mut conn = self.connection_pool.get().map_err(|e| ParameterStoreError::Backend(e.to_string()))?;
        diesel::delete(
            parameter_values::table
                .filter(parameter_values::tx_id.eq(tx_id.as_u128().to_be_bytes().to_vec()))
                .filter(parameter_values::sub_tx_id.eq(sub_tx_id as i64))
                .filter(parameter_values::parameter_id.eq(parameter_id_to_text(key))),
        )
        .execute(&mut conn)
        .map_err(|e| ParameterStoreError::Backend(e.to_string()))?;
        Ok(())
    }

    fn known_tx_ids(&self) -> Result<Vec<TxId>, ParameterStoreError> {
        let mut conn = self.connection_pool.get().map_err(|e| ParameterStoreError::Backend(e.to_string()))?;
        let rows = parameter_values::table
            .select(parameter_values::tx_id)
            .distinct()
            .load::<Vec<u8>>(&mut conn)
            .map_err(|e| ParameterStoreError::Backend(e.to_string()))?;
        Ok(rows
            .into_iter()
            .filter_map(|bytes| {
                let array: [u8; 16] = bytes.try_into().ok()?;
                Some(TxId::from(u128::from_be_bytes(array)))
            })
            .collect())
    }
}

#[cfg(test)]
mod test {
    use nyx_core::Amount;

    use super::*;
    use crate::parameter_store::ParameterStore;
    use std::sync::Arc;

    fn store() -> ParameterStore {
        let path = nyx_test_utils::paths::create_temporary_data_path().join("wallet.sqlite3");
        let pool = SqliteConnectionPool::connect(path.to_str().unwrap()).unwrap();
        ParameterStore::new(Arc::new(SqliteParameterStoreBackend::new(pool)))
    }

    #[test]
    fn set_then_get_round_trips_through_sqlite() {
        let store = store();
        let tx_id = TxId::new_random();
        store.set(tx_id, TxParameterId::Amount, 0, &Amount(7)).unwrap();
        let value: Amount = store.get_mandatory(tx_id, TxParameterId::Amount, 0).unwrap();
        assert_eq!(value, Amount(7));
    }

    #[test]
    fn known_tx_ids_reflects_written_rows() {
        let store = store();
        let tx_id = TxId::new_random();
        store.set(tx_id, TxParameterId::Fee, 0, &Amount(1)).unwrap();
        assert_eq!(store.known_tx_ids().unwrap(), vec![tx_id]);
    }
}
