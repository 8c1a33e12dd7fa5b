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

//! Fixtures for exercising a whole negotiation end to end against in-memory backends, shared
//! between this crate's own `#[cfg(test)]` modules and the integration tests under `tests/`.

use std::{iter, sync::Arc};

use async_trait::async_trait;
use nyx_common_types::{address::WalletId, height::Height, tx_id::TxId};
use nyx_key_manager::{AsyncKeyKeeper, KeyKeeper, MemoryKeyKeeper, ThreadedKeyKeeperHandle};
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use tokio::sync::Mutex;

use crate::{
    address_book::{memory::InMemoryAddressBookBackend, AddressBook},
    coin::{memory::InMemoryCoinBackend, CoinStore},
    config::NegotiationConfig,
    driver::NegotiationDriver,
    gateway::{Gateway, RegisterTxVerdict},
    output_manager::OutputManager,
    parameter_store::{memory::InMemoryParameterStoreBackend, ParameterStore},
    record::OutboundParameters,
};

pub fn random_string(len: usize) -> String {
    iter::repeat(()).map(|_| OsRng.sample(Alphanumeric) as char).take(len).collect()
}

pub fn in_memory_parameter_store() -> ParameterStore {
    ParameterStore::new(Arc::new(InMemoryParameterStoreBackend::new()))
}

pub fn in_memory_address_book() -> AddressBook {
    AddressBook::new(Arc::new(InMemoryAddressBookBackend::new()))
}

/// §5: the same `MemoryKeyKeeper` -> `ThreadedKeyKeeperHandle` wiring every sync [`KeyKeeper`] gets
/// its async shape from, seeded deterministically for reproducible test fixtures.
pub fn memory_key_keeper(seed: [u8; 32], wallet_id: WalletId) -> Arc<dyn AsyncKeyKeeper> {
    let keeper: Arc<dyn KeyKeeper> = Arc::new(MemoryKeyKeeper::new(seed, wallet_id));
    Arc::new(ThreadedKeyKeeperHandle::spawn(keeper))
}

pub fn in_memory_coin_store() -> CoinStore {
    CoinStore::new(Arc::new(InMemoryCoinBackend::new()))
}

pub fn output_manager_over(coins: CoinStore, seed: [u8; 32], wallet_id: WalletId) -> OutputManager {
    OutputManager::new(coins, memory_key_keeper(seed, wallet_id))
}

/// A [`Gateway`] double that loops back into the peer's own parameter store, standing in for the
/// P2P transport and node RPC client a real deployment would plug in here (§1 Non-goals).
/// `register_tx`/`confirm_kernel` write a canned verdict straight back onto the record rather than
/// doing anything with the finalized transaction itself.
pub struct LoopbackGateway {
    own_store: Mutex<Option<ParameterStore>>,
    peer_store: Mutex<Option<(WalletId, ParameterStore)>>,
    register_verdict: RegisterTxVerdict,
}

impl LoopbackGateway {
    pub fn new() -> Self {
        LoopbackGateway {
            own_store: Mutex::new(None),
            peer_store: Mutex::new(None),
            register_verdict: RegisterTxVerdict::Ok,
        }
    }

    pub fn with_register_verdict(verdict: RegisterTxVerdict) -> Self {
        LoopbackGateway {
            own_store: Mutex::new(None),
            peer_store: Mutex::new(None),
            register_verdict: verdict,
        }
    }

    /// Wires `registerTx`'s verdict (§4.6 "the verdict arrives as a parameter write") back onto
    /// the submitter's *own* record — the node replies to whoever called it, not to the peer.
    pub async fn bind_own_store(&self, store: ParameterStore) {
        *self.own_store.lock().await = Some(store);
    }

    /// Wires delivery so `send_tx_parameters` applies straight onto `peer_id`'s own record in
    /// `peer_store`, as if the peer's wallet were listening on the same process.
    pub async fn connect_peer(&self, peer_id: WalletId, peer_store: ParameterStore) {
        *self.peer_store.lock().await = Some((peer_id, peer_store));
    }
}

impl Default for LoopbackGateway {
    fn default() -> Self {
        LoopbackGateway::new()
    }
}

#[async_trait]
impl Gateway for LoopbackGateway {
    async fn send_tx_parameters(&self, _peer_id: WalletId, params: OutboundParameters) -> bool {
        match &*self.peer_store.lock().await {
            Some((_, peer_store)) => {
                let record = crate::record::TransactionRecord::new(peer_store.clone(), params.tx_id);
                record.apply(&params).is_ok()
            },
            None => false,
        }
    }

    async fn register_tx(&self, tx_id: TxId, _transaction: nyx_core::transaction_protocol::FinalizedSenderTransaction) {
        if let Some(own_store) = &*self.own_store.lock().await {
            let _ = own_store.set(tx_id, nyx_common_types::TxParameterId::TransactionRegistered, 0, &self.register_verdict);
        }
    }

    async fn confirm_kernel(&self, _kernel_id: Vec<u8>) {
        // no-op: the harness surfaces a kernel proof height through `set_kernel_proof_height`
        // and the caller writes it onto the record directly, matching how a real gateway would
        // only ever learn of it from the chain, never from this call.
    }

    async fn on_tip(&self, _height: Height) {}
}

/// One simulated wallet: its own parameter store, coin store, address book and driver, wired to a
/// [`LoopbackGateway`] shared with whatever peer it negotiates against. `coins` and `addresses` are
/// kept alongside the driver (rather than buried inside its private `OutputManager`) so a test can
/// seed a starting balance or register an owned peer address before driving a negotiation.
pub struct TestWallet {
    pub wallet_id: WalletId,
    pub store: ParameterStore,
    pub coins: CoinStore,
    pub addresses: AddressBook,
    pub driver: NegotiationDriver,
}

pub fn test_wallet(seed: [u8; 32], wallet_id: WalletId, gateway: Arc<dyn Gateway>) -> TestWallet {
    let store = in_memory_parameter_store();
    let coins = in_memory_coin_store();
    let outputs = output_manager_over(coins.clone(), seed, wallet_id);
    let addresses = in_memory_address_book();
    let key_keeper = memory_key_keeper(seed, wallet_id);
    let driver = NegotiationDriver::new(
        wallet_id,
        store.clone(),
        outputs,
        addresses.clone(),
        key_keeper,
        gateway,
        NegotiationConfig::default(),
    );
    TestWallet { wallet_id, store, coins, addresses, driver }
}
