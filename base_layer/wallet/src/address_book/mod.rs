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

//! The address book (§3 Address model, §1 Non-goals: "no address book management beyond recording
//! a peer address on first contact", §3 supplement 3: auto-creation plus the expired-
//! owned-address rejection).

pub mod memory;
pub mod sqlite;

use std::sync::Arc;

use chrono::Utc;
use nyx_common_types::address::{Address, WalletId};

use crate::error::AddressBookError;

pub trait AddressBookBackend: Send + Sync {
    fn get(&self, wallet_id: WalletId) -> Result<Option<Address>, AddressBookError>;
    fn upsert(&self, address: Address) -> Result<(), AddressBookError>;
}

#[derive(Clone)]
pub struct AddressBook {
    backend: Arc<dyn AddressBookBackend>,
}

impl AddressBook {
    pub fn new(backend: Arc<dyn AddressBookBackend>) -> Self {
        AddressBook { backend }
    }

    pub fn register_owned(&self, address: Address) -> Result<(), AddressBookError> {
        self.backend.upsert(address)
    }

    /// §3 "sending to any peer address auto-creates an address book entry". Returns the existing
    /// or freshly-created entry, after checking the expired-owned-address invariant.
    pub fn resolve_peer(&self, wallet_id: WalletId) -> Result<Address, AddressBookError> {
        let now = Utc::now();
        match self.backend.get(wallet_id)? {
            Some(address) => {
                if address.is_owned && address.is_expired(now) {
                    return Err(AddressBookError::ExpiredAddress(wallet_id));
                }
                Ok(address)
            },
            None => {
                let address = Address::new_peer(wallet_id, now);
                self.backend.upsert(address.clone())?;
                Ok(address)
            },
        }
    }

    /// §3 invariant: "sending to an expired owned address is forbidden". Checked before a
    /// self-tx/owned-address negotiation is allowed to start.
    pub fn check_not_expired_owned(&self, wallet_id: WalletId) -> Result<(), AddressBookError> {
        let now = Utc::now();
        match self.backend.get(wallet_id)? {
            Some(address) if address.is_owned && address.is_expired(now) => Err(AddressBookError::ExpiredAddress(wallet_id)),
            _ => Ok(()),
        }
    }

    pub fn is_owned(&self, wallet_id: WalletId) -> Result<bool, AddressBookError> {
        Ok(self.backend.get(wallet_id)?.map(|a| a.is_owned).unwrap_or(false))
    }
}
