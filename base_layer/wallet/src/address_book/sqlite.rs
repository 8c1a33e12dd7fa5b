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

//! Sqlite-backed [`super::AddressBookBackend`], following the same `*Sql` row-struct pattern as
//! [`crate::parameter_store::sqlite`].

use diesel::prelude::*;
use chrono::{DateTime, Utc};
use nyx_common_types::address::{Address, WalletId};

use super::AddressBookBackend;
use crate::{error::AddressBookError, storage::connection::SqliteConnectionPool, storage::schema::addresses};

#[derive(Queryable, Insertable)]
#[diesel(table_name = addresses)]
struct AddressSql {
    wallet_id: Vec<u8>,
    is_owned: bool,
    created_at: String,
    expires_at: Option<String>,
    label: Option<String>,
}

impl AddressSql {
    fn from_address(address: &Address) -> Self {
        AddressSql {
            wallet_id: address.wallet_id.0.to_vec(),
            is_owned: address.is_owned,
            created_at: address.created_at.to_rfc3339(),
            expires_at: address.expires_at.map(|e| e.to_rfc3339()),
            label: address.label.clone(),
        }
    }

    fn into_address(self) -> Result<Address, AddressBookError> {
        let wallet_id_bytes: [u8; 32] = self.wallet_id.try_into().map_err(|_| AddressBookError::Backend("malformed wallet id".into()))?;
        let created_at: DateTime<Utc> = self.created_at.parse().map_err(|e: chrono::ParseError| AddressBookError::Backend(e.to_string()))?;
        let expires_at = self
            .expires_at
            .map(|text| text.parse::<DateTime<Utc>>())
            .transpose()
            .map_err(|e: chrono::ParseError| AddressBookError::Backend(e.to_string()))?;
        Ok(Address {
            wallet_id: WalletId(wallet_id_bytes),
            is_owned: self.is_owned,
            created_at,
            expires_at,
            label: self.label,
        })
    }
}

/// A sqlite-backed address book, one database file per wallet (§3 Address model, §6.4 persisted
/// state).
pub struct SqliteAddressBookBackend {
    connection_pool: SqliteConnectionPool,
}

impl SqliteAddressBookBackend {
    pub fn new(connection_pool: SqliteConnectionPool) -> Self {
        SqliteAddressBookBackend { connection_pool }
    }
}

impl AddressBookBackend for SqliteAddressBookBackend {
    fn get(&self, wallet_id: WalletId) -> Result<Option<Address>, AddressBookError> {
        let mut conn = self.connection_pool.get().map_err(|e| AddressBookError::Backend(e.to_string()))?;
        let row = addresses::table
            .filter(addresses::wallet_id.eq(wallet_id.0.to_vec()))
            .first::<AddressSql>(&mut conn)
            .optional()
            .map_err(|e| AddressBookError::Backend(e.to_string()))?;
        row.map(AddressSql::into_address).transpose()
    }

    fn upsert(&self, address: Address) -> Result<(), AddressBookError> {
        let mut conn = self.connection_pool.get().map_err(|e| AddressBookError::Backend(e.to_string()))?;
        let row = AddressSql::from_address(&address);
        diesel::replace_into(addresses::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| AddressBookError::Backend(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use chrono::Utc;

    use super::*;
    use crate::address_book::AddressBook;

    fn book() -> AddressBook {
        let path = nyx_test_utils::paths::create_temporary_data_path().join("wallet.sqlite3");
        let pool = SqliteConnectionPool::connect(path.to_str().unwrap()).unwrap();
        AddressBook::new(Arc::new(SqliteAddressBookBackend::new(pool)))
    }

    #[test]
    fn register_then_resolve_round_trips_through_sqlite() {
        let book = book();
        let wallet_id = WalletId([9u8; 32]);
        book.register_owned(Address::new_owned(wallet_id, Utc::now())).unwrap();
        let resolved = book.resolve_peer(wallet_id).unwrap();
        assert!(resolved.is_owned);
    }

    #[test]
    fn resolve_peer_auto_creates_an_unknown_address() {
        let book = book();
        let wallet_id = WalletId([11u8; 32]);
        let resolved = book.resolve_peer(wallet_id).unwrap();
        assert!(!resolved.is_owned);
        assert_eq!(book.is_owned(wallet_id).unwrap(), false);
    }

    #[test]
    fn expired_owned_address_is_rejected() {
        let book = book();
        let wallet_id = WalletId([13u8; 32]);
        let mut address = Address::new_owned(wallet_id, Utc::now());
        address.expires_at = Some(Utc::now() - chrono::Duration::seconds(1));
        book.register_owned(address).unwrap();
        assert!(matches!(book.check_not_expired_owned(wallet_id), Err(AddressBookError::ExpiredAddress(_))));
    }
}
