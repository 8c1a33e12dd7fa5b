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

use std::{collections::HashMap, sync::Mutex};

use nyx_common_types::address::{Address, WalletId};

use super::AddressBookBackend;
use crate::error::AddressBookError;

#[derive(Default)]
pub struct InMemoryAddressBookBackend {
    addresses: Mutex<HashMap<WalletId, Address>>,
}

impl InMemoryAddressBookBackend {
    pub fn new() -> Self {
        InMemoryAddressBookBackend::default()
    }
}

impl AddressBookBackend for InMemoryAddressBookBackend {
    fn get(&self, wallet_id: WalletId) -> Result<Option<Address>, AddressBookError> {
        Ok(self.addresses.lock().expect("address book mutex poisoned").get(&wallet_id).cloned())
    }

    fn upsert(&self, address: Address) -> Result<(), AddressBookError> {
        self.addresses.lock().expect("address book mutex poisoned").insert(address.wallet_id, address);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use chrono::Utc;

    use super::*;

    #[test]
    fn get_on_unknown_address_is_none() {
        let backend = InMemoryAddressBookBackend::new();
        assert_eq!(backend.get(WalletId([1u8; 32])).unwrap(), None);
    }

    #[test]
    fn upsert_then_get_round_trips() {
        let backend = InMemoryAddressBookBackend::new();
        let address = Address::new_owned(WalletId([2u8; 32]), Utc::now());
        backend.upsert(address.clone()).unwrap();
        assert_eq!(backend.get(address.wallet_id).unwrap(), Some(address));
    }
}
