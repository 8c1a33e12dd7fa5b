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

//! The transaction record (§3 "Transaction record"): a typed accessor layer over
//! [`crate::parameter_store::ParameterStore`] keyed by [`TxParameterId`]. Every field the state
//! machine reads or writes goes through one of these methods rather than a bare `get`/`set`, so
//! the key-to-type mapping is written exactly once.

use std::collections::HashMap;

use nyx_common_types::{
    address::WalletId,
    asset::AssetId,
    error::InternalFailureReason,
    height::Height,
    tx_id::TxId,
    types::{BlindingFactor, PublicKey, Signature},
    PublicStatus,
    Role,
    SubState,
    TxKind,
    TxParameterId,
    TxStatus,
};
use nyx_core::{transaction_components::{TransactionInput, TransactionOutput}, Amount};
use nyx_key_manager::{CoinId, NonceSlotId};

use crate::{error::ParameterStoreError, gateway::RegisterTxVerdict, parameter_store::ParameterStore};

const SUB_TX: u64 = 0;

/// §6.1: "each peer message is a set of (TxParameterID, serialized-bytes) pairs plus the TxId."
#[derive(Debug, Clone, Default)]
pub struct OutboundParameters {
    pub tx_id: TxId,
    pub values: HashMap<TxParameterId, Vec<u8>>,
}

impl OutboundParameters {
    pub fn new(tx_id: TxId) -> Self {
        OutboundParameters { tx_id, values: HashMap::new() }
    }
}

/// A typed view over one [`TxId`]'s slice of the parameter store (§3). Cheap to construct — it
/// holds only a cloned [`ParameterStore`] handle and the id, never a snapshot.
#[derive(Clone)]
pub struct TransactionRecord {
    store: ParameterStore,
    tx_id: TxId,
}

impl TransactionRecord {
    pub fn new(store: ParameterStore, tx_id: TxId) -> Self {
        TransactionRecord { store, tx_id }
    }

    pub fn tx_id(&self) -> TxId {
        self.tx_id
    }

    fn get<T: serde::de::DeserializeOwned>(&self, key: TxParameterId) -> Result<Option<T>, ParameterStoreError> {
        self.store.get(self.tx_id, key, SUB_TX)
    }

    fn set<T: serde::Serialize>(&self, key: TxParameterId, value: &T) -> Result<(), ParameterStoreError> {
        self.store.set(self.tx_id, key, SUB_TX, value)
    }

    pub fn amounts(&self) -> Result<Option<Vec<Amount>>, ParameterStoreError> {
        self.get(TxParameterId::Amount)
    }

    pub fn set_amounts(&self, amounts: &[Amount]) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::Amount, &amounts.to_vec())
    }

    pub fn total_amount(&self) -> Result<Amount, ParameterStoreError> {
        Ok(self.amounts()?.unwrap_or_default().into_iter().sum())
    }

    pub fn fee(&self) -> Result<Option<Amount>, ParameterStoreError> {
        self.get(TxParameterId::Fee)
    }

    pub fn set_fee(&self, fee: Amount) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::Fee, &fee)
    }

    pub fn asset_id(&self) -> Result<AssetId, ParameterStoreError> {
        Ok(self.get(TxParameterId::AssetId)?.unwrap_or(AssetId::NATIVE))
    }

    pub fn set_asset_id(&self, asset_id: AssetId) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::AssetId, &asset_id)
    }

    pub fn min_height(&self) -> Result<Option<Height>, ParameterStoreError> {
        self.get(TxParameterId::MinHeight)
    }

    pub fn set_min_height(&self, height: Height) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::MinHeight, &height)
    }

    pub fn max_height(&self) -> Result<Option<Height>, ParameterStoreError> {
        self.get(TxParameterId::MaxHeight)
    }

    pub fn set_max_height(&self, height: Height) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::MaxHeight, &height)
    }

    pub fn lifetime(&self) -> Result<Option<u64>, ParameterStoreError> {
        self.get(TxParameterId::Lifetime)
    }

    pub fn set_lifetime(&self, lifetime: u64) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::Lifetime, &lifetime)
    }

    pub fn is_sender(&self) -> Result<bool, ParameterStoreError> {
        Ok(self.get(TxParameterId::IsSender)?.unwrap_or(false))
    }

    pub fn set_is_sender(&self, is_sender: bool) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::IsSender, &is_sender)
    }

    pub fn my_id(&self) -> Result<Option<WalletId>, ParameterStoreError> {
        self.get(TxParameterId::MyId)
    }

    pub fn set_my_id(&self, id: WalletId) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::MyId, &id)
    }

    pub fn peer_id(&self) -> Result<Option<WalletId>, ParameterStoreError> {
        self.get(TxParameterId::PeerId)
    }

    pub fn set_peer_id(&self, id: WalletId) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::PeerId, &id)
    }

    /// §3 "optional MySecureWalletId": the SBBS identity public key this party signs payment
    /// confirmations with, recomputed on demand rather than required to be set.
    pub fn secure_wallet_id(&self) -> Result<Option<PublicKey>, ParameterStoreError> {
        self.get(TxParameterId::MySecureWalletId)
    }

    pub fn set_secure_wallet_id(&self, key: &PublicKey) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::MySecureWalletId, key)
    }

    /// §3 "optional PeerSecureWalletId": the peer's SBBS identity public key, carried one-way in
    /// the receiver's `InvitationConfirmation` so the sender can verify the payment proof (§4.4.9).
    pub fn peer_secure_wallet_id(&self) -> Result<Option<PublicKey>, ParameterStoreError> {
        self.get(TxParameterId::PeerSecureWalletId)
    }

    pub fn set_peer_secure_wallet_id(&self, key: &PublicKey) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::PeerSecureWalletId, key)
    }

    pub fn status(&self) -> Result<TxStatus, ParameterStoreError> {
        Ok(self.get(TxParameterId::Status)?.unwrap_or_default())
    }

    pub fn set_status(&self, status: TxStatus) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::Status, &status)
    }

    pub fn sub_state(&self) -> Result<SubState, ParameterStoreError> {
        Ok(self.get(TxParameterId::SubState)?.unwrap_or_default())
    }

    pub fn set_sub_state(&self, sub_state: SubState) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::SubState, &sub_state)
    }

    pub fn transaction_type(&self) -> Result<TxKind, ParameterStoreError> {
        Ok(self.get(TxParameterId::TransactionType)?.unwrap_or(TxKind::Simple))
    }

    pub fn set_transaction_type(&self, kind: TxKind) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::TransactionType, &kind)
    }

    pub fn role(&self, peer_is_owned: bool) -> Result<Role, ParameterStoreError> {
        Ok(match (self.is_sender()?, peer_is_owned) {
            (true, true) => Role::SelfTx,
            (true, false) => Role::Sender,
            (false, _) => Role::Receiver,
        })
    }

    pub fn create_time(&self) -> Result<Option<chrono::DateTime<chrono::Utc>>, ParameterStoreError> {
        self.get(TxParameterId::CreateTime)
    }

    pub fn set_create_time(&self, time: chrono::DateTime<chrono::Utc>) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::CreateTime, &time)
    }

    pub fn peer_max_height(&self) -> Result<Option<Height>, ParameterStoreError> {
        self.get(TxParameterId::PeerMaxHeight)
    }

    pub fn set_peer_max_height(&self, height: Height) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::PeerMaxHeight, &height)
    }

    pub fn peer_response_height(&self) -> Result<Option<Height>, ParameterStoreError> {
        self.get(TxParameterId::PeerResponseHeight)
    }

    pub fn set_peer_response_height(&self, height: Height) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::PeerResponseHeight, &height)
    }

    pub fn nonce_slot(&self) -> Result<Option<NonceSlotId>, ParameterStoreError> {
        Ok(self.get::<u64>(TxParameterId::NonceSlot)?.map(NonceSlotId))
    }

    pub fn set_nonce_slot(&self, slot: NonceSlotId) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::NonceSlot, &slot.0)
    }

    pub fn public_excess(&self) -> Result<Option<PublicKey>, ParameterStoreError> {
        self.get(TxParameterId::PublicExcess)
    }

    pub fn set_public_excess(&self, key: &PublicKey) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::PublicExcess, key)
    }

    pub fn public_nonce(&self) -> Result<Option<PublicKey>, ParameterStoreError> {
        self.get(TxParameterId::PublicNonce)
    }

    pub fn set_public_nonce(&self, key: &PublicKey) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::PublicNonce, key)
    }

    pub fn offset(&self) -> Result<Option<BlindingFactor>, ParameterStoreError> {
        self.get(TxParameterId::Offset)
    }

    pub fn set_offset(&self, offset: &BlindingFactor) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::Offset, offset)
    }

    pub fn partial_signature(&self) -> Result<Option<BlindingFactor>, ParameterStoreError> {
        self.get(TxParameterId::PartialSignature)
    }

    pub fn set_partial_signature(&self, s: &BlindingFactor) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::PartialSignature, s)
    }

    pub fn final_signature(&self) -> Result<Option<Signature>, ParameterStoreError> {
        self.get(TxParameterId::FinalSignature)
    }

    pub fn set_final_signature(&self, sig: &Signature) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::FinalSignature, sig)
    }

    pub fn inputs(&self) -> Result<Vec<TransactionInput>, ParameterStoreError> {
        Ok(self.get(TxParameterId::Inputs)?.unwrap_or_default())
    }

    pub fn set_inputs(&self, inputs: &[TransactionInput]) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::Inputs, &inputs.to_vec())
    }

    pub fn selected_coin_ids(&self) -> Result<Vec<CoinId>, ParameterStoreError> {
        Ok(self.get(TxParameterId::SelectedCoinIds)?.unwrap_or_default())
    }

    pub fn set_selected_coin_ids(&self, ids: &[CoinId]) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::SelectedCoinIds, &ids.to_vec())
    }

    pub fn receiver_coin_ids(&self) -> Result<Vec<CoinId>, ParameterStoreError> {
        Ok(self.get(TxParameterId::ReceiverCoinIds)?.unwrap_or_default())
    }

    pub fn set_receiver_coin_ids(&self, ids: &[CoinId]) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::ReceiverCoinIds, &ids.to_vec())
    }

    pub fn outputs(&self) -> Result<Vec<TransactionOutput>, ParameterStoreError> {
        Ok(self.get(TxParameterId::Outputs)?.unwrap_or_default())
    }

    pub fn set_outputs(&self, outputs: &[TransactionOutput]) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::Outputs, &outputs.to_vec())
    }

    pub fn change_output(&self) -> Result<Option<TransactionOutput>, ParameterStoreError> {
        self.get(TxParameterId::ChangeOutput)
    }

    pub fn set_change_output(&self, output: &TransactionOutput) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::ChangeOutput, output)
    }

    pub fn kernel_id(&self) -> Result<Option<Vec<u8>>, ParameterStoreError> {
        self.get(TxParameterId::KernelId)
    }

    pub fn set_kernel_id(&self, id: &[u8]) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::KernelId, &id.to_vec())
    }

    pub fn peer_public_excess(&self) -> Result<Option<PublicKey>, ParameterStoreError> {
        self.get(TxParameterId::PeerPublicExcess)
    }

    pub fn set_peer_public_excess(&self, key: &PublicKey) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::PeerPublicExcess, key)
    }

    pub fn peer_public_nonce(&self) -> Result<Option<PublicKey>, ParameterStoreError> {
        self.get(TxParameterId::PeerPublicNonce)
    }

    pub fn set_peer_public_nonce(&self, key: &PublicKey) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::PeerPublicNonce, key)
    }

    pub fn peer_signature(&self) -> Result<Option<BlindingFactor>, ParameterStoreError> {
        self.get(TxParameterId::PeerSignature)
    }

    pub fn set_peer_signature(&self, s: &BlindingFactor) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::PeerSignature, s)
    }

    pub fn peer_inputs(&self) -> Result<Vec<TransactionInput>, ParameterStoreError> {
        Ok(self.get(TxParameterId::PeerInputs)?.unwrap_or_default())
    }

    pub fn set_peer_inputs(&self, inputs: &[TransactionInput]) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::PeerInputs, &inputs.to_vec())
    }

    pub fn peer_outputs(&self) -> Result<Vec<TransactionOutput>, ParameterStoreError> {
        Ok(self.get(TxParameterId::PeerOutputs)?.unwrap_or_default())
    }

    pub fn set_peer_outputs(&self, outputs: &[TransactionOutput]) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::PeerOutputs, &outputs.to_vec())
    }

    pub fn peer_offset(&self) -> Result<Option<BlindingFactor>, ParameterStoreError> {
        self.get(TxParameterId::PeerOffset)
    }

    pub fn set_peer_offset(&self, offset: &BlindingFactor) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::PeerOffset, offset)
    }

    pub fn payment_confirmation(&self) -> Result<Option<Signature>, ParameterStoreError> {
        self.get(TxParameterId::PaymentConfirmation)
    }

    pub fn set_payment_confirmation(&self, sig: &Signature) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::PaymentConfirmation, sig)
    }

    pub fn transaction_registered(&self) -> Result<Option<RegisterTxVerdict>, ParameterStoreError> {
        self.get(TxParameterId::TransactionRegistered)
    }

    pub fn set_transaction_registered(&self, verdict: RegisterTxVerdict) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::TransactionRegistered, &verdict)
    }

    pub fn kernel_proof_height(&self) -> Result<Option<Height>, ParameterStoreError> {
        self.get(TxParameterId::KernelProofHeight)
    }

    pub fn set_kernel_proof_height(&self, height: Height) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::KernelProofHeight, &height)
    }

    /// §9 Open Question: "prefer to treat absence of the key (not the value) as 'never observed'"
    /// — `None` here means no sighting, distinct from a stored `Height(0)`.
    pub fn kernel_unconfirmed_height(&self) -> Result<Option<Height>, ParameterStoreError> {
        self.get(TxParameterId::KernelUnconfirmedHeight)
    }

    pub fn set_kernel_unconfirmed_height(&self, height: Height) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::KernelUnconfirmedHeight, &height)
    }

    pub fn direct_send_result(&self) -> Result<Option<bool>, ParameterStoreError> {
        self.get(TxParameterId::DirectSendResult)
    }

    pub fn set_direct_send_result(&self, delivered: bool) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::DirectSendResult, &delivered)
    }

    pub fn registration_attempts(&self) -> Result<u32, ParameterStoreError> {
        Ok(self.get(TxParameterId::RegistrationAttempts)?.unwrap_or(0))
    }

    pub fn set_registration_attempts(&self, attempts: u32) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::RegistrationAttempts, &attempts)
    }

    /// §9 final paragraph: the protocol version the peer advertised with its invitation, as seen
    /// from this record's side — always "the other party's version", mirroring `PeerMaxHeight`.
    pub fn peer_protocol_version(&self) -> Result<Option<u32>, ParameterStoreError> {
        self.get(TxParameterId::PeerProtocolVersion)
    }

    pub fn set_peer_protocol_version(&self, version: u32) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::PeerProtocolVersion, &version)
    }

    pub fn failure_reason(&self) -> Result<Option<InternalFailureReason>, ParameterStoreError> {
        self.get(TxParameterId::InternalFailureReason)
    }

    pub fn set_failure_reason(&self, reason: InternalFailureReason) -> Result<(), ParameterStoreError> {
        self.set(TxParameterId::InternalFailureReason, &reason)
    }

    pub fn public_status(&self) -> Result<PublicStatus, ParameterStoreError> {
        Ok(PublicStatus::derive(self.status()?, self.failure_reason()?))
    }

    /// §5 "a user-initiated cancel writes Status=Canceled"; also used by the driver's own
    /// rollback-on-failure path (§7 policy).
    pub fn fail(&self, reason: InternalFailureReason) -> Result<(), ParameterStoreError> {
        self.set_status(TxStatus::Failed)?;
        self.set_failure_reason(reason)
    }

    /// Gathers every key currently set for this record into one outbound wire message (§6.1).
    pub fn gather(&self, keys: &[TxParameterId]) -> Result<OutboundParameters, ParameterStoreError> {
        let mut values = HashMap::new();
        for key in keys {
            if let Some(bytes) = self.store.get_raw(self.tx_id, *key, SUB_TX)? {
                values.insert(*key, bytes);
            }
        }
        Ok(OutboundParameters { tx_id: self.tx_id, values })
    }

    /// §6.1 "receipt is idempotent with respect to the parameter store": writing the same bytes
    /// twice is a no-op in effect, and unknown ids are persisted but do not drive state (callers
    /// pass through whatever keys the message carried).
    pub fn apply(&self, params: &OutboundParameters) -> Result<(), ParameterStoreError> {
        for (key, bytes) in &params.values {
            self.store.set_raw(self.tx_id, *key, SUB_TX, bytes.clone())?;
        }
        Ok(())
    }
}
