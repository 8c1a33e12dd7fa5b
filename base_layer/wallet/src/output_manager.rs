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

//! Glues the coin table (C3) to the key keeper (C2) for the builder-facing half of §4.4: select
//! inputs, create a change output, mint the receiver's new outputs, and hand out a fresh nonce.
//! The negotiation driver owns everything past this point (building the invitation, the challenge,
//! calling `sign_sender`/`sign_receiver`) — this module never touches a challenge or a signature.

use std::sync::Arc;

use chrono::Utc;
use nyx_common_types::{asset::AssetId, height::Height, tx_id::TxId};
use nyx_core::{
    transaction_components::{OutputFeatures, TransactionInput, TransactionOutput, UnblindedOutput},
    Amount,
};
use nyx_key_manager::{AsyncKeyKeeper, CoinId, GenerateOutputsRequest, NonceSlotId, OutputSpec};
use nyx_common_types::types::PublicKey;

use crate::{
    coin::{selector, Coin, CoinStore, SpendStatus},
    error::OutputManagerError,
};

/// The result of §4.4 operations 1-2: coins reserved against `tx_id`, ready to become
/// [`TransactionInput`]s, plus however much change is left over.
#[derive(Debug, Clone)]
pub struct SelectedInputs {
    pub coin_ids: Vec<CoinId>,
    pub inputs: Vec<TransactionInput>,
    pub change: Amount,
}

/// One freshly minted output and the [`CoinId`] the key keeper derived its blinding factor from,
/// bundled so the caller can both commit it to the coin table and put it on the wire.
#[derive(Debug, Clone)]
pub struct MintedOutput {
    pub coin_id: CoinId,
    pub unblinded: UnblindedOutput,
}

impl MintedOutput {
    pub fn as_transaction_output(&self) -> TransactionOutput {
        self.unblinded.as_transaction_output()
    }
}

pub struct OutputManager {
    coins: CoinStore,
    key_keeper: Arc<dyn AsyncKeyKeeper>,
}

impl OutputManager {
    pub fn new(coins: CoinStore, key_keeper: Arc<dyn AsyncKeyKeeper>) -> Self {
        OutputManager { coins, key_keeper }
    }

    /// §4.4 op 1: "select a set of available, mature coins covering `amount + fee`", reserving
    /// them against `tx_id` in the same call (§3 invariant 1: a coin is never visible as available
    /// to two in-flight selections at once).
    pub fn select_inputs(&self, tx_id: TxId, asset_id: AssetId, amount: Amount, fee: Amount, tip: Height) -> Result<SelectedInputs, OutputManagerError> {
        let needed = amount.checked_add(fee).ok_or(OutputManagerError::NoInputs {
            needed: u64::MAX,
            asset_id: asset_id.0,
        })?;
        let available = self.coins.available(asset_id, tip)?;
        let selection = selector::select(&available, needed).map_err(|_| OutputManagerError::NoInputs {
            needed: needed.as_u64(),
            asset_id: asset_id.0,
        })?;
        let coin_ids: Vec<CoinId> = selection.coins.iter().map(|c| c.id).collect();
        self.coins.reserve(&coin_ids, tx_id)?;
        let inputs = selection
            .coins
            .iter()
            .map(|c| TransactionInput {
                commitment: c.commitment.clone(),
                asset_id: c.asset_id,
                maturity: c.maturity,
            })
            .collect();
        Ok(SelectedInputs {
            coin_ids,
            inputs,
            change: selection.change,
        })
    }

    /// §4.4 op 2: mint the change output for a sender-side selection. Returns `None` for an
    /// exact-amount selection (§3 "a zero-value change output is never created").
    pub async fn create_change_output(&self, scheme_height: Height, change: Amount, asset_id: AssetId) -> Result<Option<MintedOutput>, OutputManagerError> {
        if change == Amount::ZERO {
            return Ok(None);
        }
        let coin_id = self.coins.next_coin_id()?;
        let spec = OutputSpec {
            coin_id,
            value: change,
            features: OutputFeatures::DEFAULT,
            asset_id,
            maturity: Height(0),
        };
        let minted = self.mint(scheme_height, vec![spec]).await?;
        let output = minted.into_iter().next().ok_or_else(|| OutputManagerError::KeyKeeper(nyx_key_manager::KeyKeeperError::Unspecified))?;
        self.coins.insert(Coin {
            id: output.coin_id,
            commitment: output.unblinded.commit(),
            value: change,
            asset_id,
            maturity: Height(0),
            status: SpendStatus::Incoming,
            reserved_for: None,
            created_at: Utc::now(),
        })?;
        Ok(Some(output))
    }

    /// §4.4 op 4: mint the receiver's new output(s) for the amount(s) it is being paid, one coin
    /// id per amount (§3 Coin model). Left `Incoming` until `KernelConfirmation` (§4.5) marks it
    /// `Available`.
    pub async fn create_receiver_outputs(&self, scheme_height: Height, amounts: &[Amount], asset_id: AssetId, maturity: Height) -> Result<Vec<MintedOutput>, OutputManagerError> {
        let mut specs = Vec::with_capacity(amounts.len());
        for amount in amounts {
            let coin_id = self.coins.next_coin_id()?;
            specs.push(OutputSpec {
                coin_id,
                value: *amount,
                features: OutputFeatures::DEFAULT,
                asset_id,
                maturity,
            });
        }
        let minted = self.mint(scheme_height, specs).await?;
        for output in &minted {
            self.coins.insert(Coin {
                id: output.coin_id,
                commitment: output.unblinded.commit(),
                value: output.unblinded.value,
                asset_id,
                maturity,
                status: SpendStatus::Incoming,
                reserved_for: None,
                created_at: Utc::now(),
            })?;
        }
        Ok(minted)
    }

    async fn mint(&self, scheme_height: Height, specs: Vec<OutputSpec>) -> Result<Vec<MintedOutput>, OutputManagerError> {
        let coin_ids: Vec<CoinId> = specs.iter().map(|s| s.coin_id).collect();
        let outputs = self
            .key_keeper
            .generate_outputs(GenerateOutputsRequest { scheme_height }, specs)
            .await?;
        Ok(coin_ids
            .into_iter()
            .zip(outputs)
            .map(|(coin_id, unblinded)| MintedOutput { coin_id, unblinded })
            .collect())
    }

    /// §4.4 op 3: reserve a nonce slot and return its public point, ready to go into a
    /// `signSender`/`signReceiver` `initial = true` call (§4.2).
    pub async fn allocate_nonce(&self) -> Result<(NonceSlotId, PublicKey), OutputManagerError> {
        let slot = self.key_keeper.allocate_nonce_slot().await?;
        let nonce = self.key_keeper.generate_nonce(slot).await?;
        Ok((slot, nonce))
    }

    /// §5 cancellation / failure rollback: return reserved coins to `Available`.
    pub fn release_inputs(&self, coin_ids: &[CoinId]) -> Result<(), OutputManagerError> {
        Ok(self.coins.release(coin_ids)?)
    }

    pub fn mark_inputs_spent(&self, coin_ids: &[CoinId]) -> Result<(), OutputManagerError> {
        Ok(self.coins.mark_spent(coin_ids)?)
    }

    /// §4.5 KernelConfirmation: newly minted coins become spendable once the kernel is confirmed.
    pub fn mark_outputs_available(&self, coin_ids: &[CoinId]) -> Result<(), OutputManagerError> {
        Ok(self.coins.mark_available(coin_ids)?)
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use nyx_common_types::types::{CommitmentFactory, PrivateKey};
    use nyx_key_manager::{MemoryKeyKeeper, ThreadedKeyKeeperHandle};

    use super::*;
    use crate::coin::memory::InMemoryCoinBackend;

    fn manager() -> OutputManager {
        let coins = CoinStore::new(Arc::new(InMemoryCoinBackend::new()));
        let keeper: Arc<dyn nyx_key_manager::KeyKeeper> = Arc::new(MemoryKeyKeeper::new([7u8; 32], nyx_common_types::address::WalletId([1u8; 32])));
        let key_keeper: Arc<dyn AsyncKeyKeeper> = Arc::new(ThreadedKeyKeeperHandle::spawn(keeper));
        OutputManager::new(coins, key_keeper)
    }

    fn seed_coin(manager: &OutputManager, value: u64) -> CoinId {
        let id = manager.coins.next_coin_id().unwrap();
        manager
            .coins
            .insert(Coin {
                id,
                commitment: CommitmentFactory::default().commit_value(&PrivateKey::default(), value),
                value: Amount(value),
                asset_id: AssetId::NATIVE,
                maturity: Height(0),
                status: SpendStatus::Available,
                reserved_for: None,
                created_at: Utc::now(),
            })
            .unwrap();
        id
    }

    #[tokio::test]
    async fn select_inputs_reserves_the_chosen_coins() {
        let manager = manager();
        let id = seed_coin(&manager, 500);
        let tx_id = TxId::new_random();
        let selection = manager.select_inputs(tx_id, AssetId::NATIVE, Amount(100), Amount(10), Height(0)).unwrap();
        assert_eq!(selection.coin_ids, vec![id]);
        assert_eq!(selection.change, Amount(390));
        assert_eq!(manager.coins.get(id).unwrap().unwrap().status, SpendStatus::Outgoing);
    }

    #[tokio::test]
    async fn zero_change_mints_no_output() {
        let manager = manager();
        seed_coin(&manager, 110);
        let minted = manager.create_change_output(Height(0), Amount::ZERO, AssetId::NATIVE).await.unwrap();
        assert!(minted.is_none());
    }

    #[tokio::test]
    async fn change_output_is_inserted_as_incoming() {
        let manager = manager();
        let minted = manager.create_change_output(Height(0), Amount(50), AssetId::NATIVE).await.unwrap().unwrap();
        let coin = manager.coins.get(minted.coin_id).unwrap().unwrap();
        assert_eq!(coin.status, SpendStatus::Incoming);
        assert_eq!(coin.value, Amount(50));
    }

    #[tokio::test]
    async fn receiver_outputs_mint_one_coin_per_amount() {
        let manager = manager();
        let minted = manager
            .create_receiver_outputs(Height(0), &[Amount(10), Amount(20)], AssetId::NATIVE, Height(0))
            .await
            .unwrap();
        assert_eq!(minted.len(), 2);
        assert_ne!(minted[0].coin_id, minted[1].coin_id);
    }

    #[tokio::test]
    async fn insufficient_funds_surface_as_no_inputs() {
        let manager = manager();
        seed_coin(&manager, 5);
        let tx_id = TxId::new_random();
        let err = manager.select_inputs(tx_id, AssetId::NATIVE, Amount(100), Amount(10), Height(0)).unwrap_err();
        assert!(matches!(err, OutputManagerError::NoInputs { .. }));
    }
}
