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

//! The Negotiation Driver (§4.5, C5): the state machine that drives a [`TransactionRecord`] from
//! `Initial` to a terminal status, one `update()` call at a time. Every step re-derives its
//! working state from the parameter store rather than holding anything in memory across calls —
//! the driver itself is stateless except for the non-reentrancy guard below, so a restart can pick
//! up any in-flight negotiation exactly where it left off (§9 "coroutine-style control flow").

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use log::{debug, error, info, warn};
use nyx_common_types::{
    address::WalletId,
    asset::AssetId,
    error::InternalFailureReason,
    height::Height,
    tx_id::TxId,
    types::{Commitment, PublicKey},
    Role,
    SubState,
    TxKind,
    TxParameterId,
    TxStatus,
};
use nyx_core::{
    crypto,
    transaction_components::{KernelFeatures, TransactionKernel},
    transaction_protocol::{
        receiver::{ReceiverInvitation, ReceiverTransactionProtocol},
        sender::{FinalizedSenderTransaction, ReceiverReply, SenderInvitation, SenderTransactionContext, SenderTransactionProtocol},
        ProtocolError,
    },
    Amount,
};
use nyx_key_manager::{
    AsyncKeyKeeper,
    KeyKeeperError,
    PaymentProofInputs,
    SignReceiverRequest,
    SignSenderRequest,
};
use tari_utilities::ByteArray;
use tokio::sync::broadcast;

use crate::{
    address_book::AddressBook,
    config::NegotiationConfig,
    error::{OutputManagerError, ParameterStoreError, TransactionServiceError},
    gateway::{Gateway, RegisterTxVerdict},
    output_manager::OutputManager,
    parameter_store::{BincodeCodec, Codec, ParameterStore},
    record::{OutboundParameters, TransactionRecord},
};

/// The sub-transaction index every negotiation in this driver runs at. §3's data model reserves
/// room for multiple sub-transactions per `TxId`, but nothing this driver builds (`Simple` sends)
/// ever needs more than one.
const SUB_TX: u64 = 0;

/// §9 final paragraph: the version this build advertises. A peer advertising `>= PROTOCOL_VERSION`
/// is assumed to confirm registration itself through `TransactionRegistered`, so the receiver can
/// skip straight to `KernelConfirmation` instead of waiting on a dedicated registration notice.
pub const PROTOCOL_VERSION: u32 = 2;

/// Why [`NegotiationDriver::update`] should be called again (§4.5 "the caller drives the
/// machine"). None of these are errors — they describe what the driver is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextTrigger {
    /// A key keeper operation suspended (§4.2 `InProgress`); call `update` again once it resolves.
    KeyKeeperCompletion(TxId),
    /// Waiting on the peer to write the next set of parameters.
    PeerParamWrite,
    /// Waiting on the next tip change to re-check height/registration conditions.
    NextTip,
    /// No new information was needed; re-entry guard or a defensive no-op path was hit.
    Immediate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalStatus {
    Completed,
    Failed(InternalFailureReason),
    Canceled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Continue(NextTrigger),
    Done(TerminalStatus),
}

/// §3.2 supplement 6: ambient event plumbing for anything watching a negotiation's progress.
/// External consumers beyond this publish point are out of scope (§1 Non-goals).
#[derive(Debug, Clone)]
pub enum NegotiationEvent {
    NewTransaction(TxId),
    StateChanged(TxId, SubState),
    Completed(TxId),
    Failed(TxId, InternalFailureReason),
    Canceled(TxId),
}

/// Suspends the current `update()` call on a transient key-keeper `InProgress` (§4.2): any other
/// error is converted and propagated, any success unwraps to its value.
macro_rules! suspend_or {
    ($expr:expr, $tx_id:expr) => {
        match $expr {
            Ok(value) => value,
            Err(KeyKeeperError::InProgress) => return Ok(UpdateOutcome::Continue(NextTrigger::KeyKeeperCompletion($tx_id))),
            Err(err) => return Err(err.into()),
        }
    };
}

/// Same as [`suspend_or`] for calls that go through [`OutputManagerError`] rather than a bare
/// [`KeyKeeperError`].
macro_rules! suspend_output_or {
    ($expr:expr, $tx_id:expr) => {
        match $expr {
            Ok(value) => value,
            Err(OutputManagerError::KeyKeeper(KeyKeeperError::InProgress)) => {
                return Ok(UpdateOutcome::Continue(NextTrigger::KeyKeeperCompletion($tx_id)))
            },
            Err(err) => return Err(err.into()),
        }
    };
}

struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<TxId>>,
    tx_id: TxId,
}

impl<'a> Drop for InFlightGuard<'a> {
    fn drop(&mut self) {
        self.set.lock().expect("in-flight set mutex poisoned").remove(&self.tx_id);
    }
}

/// The negotiation driver (C5): wires the parameter store (C1), output manager (C3), key keeper
/// (C2), address book and gateway (C6) together into the state machine described in §4.5.
pub struct NegotiationDriver {
    my_wallet_id: WalletId,
    store: ParameterStore,
    outputs: OutputManager,
    addresses: AddressBook,
    key_keeper: Arc<dyn AsyncKeyKeeper>,
    gateway: Arc<dyn Gateway>,
    config: NegotiationConfig,
    events: broadcast::Sender<NegotiationEvent>,
    in_flight: Mutex<HashSet<TxId>>,
}

impl NegotiationDriver {
    pub fn new(
        my_wallet_id: WalletId,
        store: ParameterStore,
        outputs: OutputManager,
        addresses: AddressBook,
        key_keeper: Arc<dyn AsyncKeyKeeper>,
        gateway: Arc<dyn Gateway>,
        config: NegotiationConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(256);
        NegotiationDriver {
            my_wallet_id,
            store,
            outputs,
            addresses,
            key_keeper,
            gateway,
            config,
            events,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<NegotiationEvent> {
        self.events.subscribe()
    }

    fn record(&self, tx_id: TxId) -> TransactionRecord {
        TransactionRecord::new(self.store.clone(), tx_id)
    }

    fn publish(&self, event: NegotiationEvent) {
        let _ = self.events.send(event);
    }

    /// §4.5 Initial(sender): a fresh outbound negotiation. Synchronous — nothing here touches the
    /// key keeper or the gateway, only the record and the address book.
    #[allow(clippy::too_many_arguments)]
    pub fn create_send(
        &self,
        peer_id: WalletId,
        amounts: Vec<Amount>,
        fee: Amount,
        asset_id: AssetId,
        min_height: Height,
        lifetime: u64,
    ) -> Result<TxId, TransactionServiceError> {
        self.addresses.resolve_peer(peer_id)?;
        let tx_id = TxId::new_random();
        let record = self.record(tx_id);
        record.set_amounts(&amounts)?;
        record.set_fee(fee)?;
        record.set_asset_id(asset_id)?;
        record.set_min_height(min_height)?;
        record.set_max_height(min_height.saturating_add(lifetime))?;
        record.set_lifetime(lifetime)?;
        record.set_is_sender(true)?;
        record.set_my_id(self.my_wallet_id)?;
        record.set_peer_id(peer_id)?;
        record.set_create_time(Utc::now())?;
        record.set_status(TxStatus::Pending)?;
        record.set_sub_state(SubState::Initial)?;
        record.set_transaction_type(TxKind::Simple)?;
        self.publish(NegotiationEvent::NewTransaction(tx_id));
        Ok(tx_id)
    }

    /// §4.5 Initial(receiver, peer-initiated): a peer's `Invitation` arrived over the transport.
    /// `invitation_params` carries the sender's relabeled terms (§6.1); the transport-verified
    /// `peer_id` always wins over whatever identity the wire payload itself claims.
    pub fn receive_invitation(&self, invitation_params: OutboundParameters, peer_id: WalletId) -> Result<TxId, TransactionServiceError> {
        self.addresses.resolve_peer(peer_id)?;
        let tx_id = invitation_params.tx_id;
        let record = self.record(tx_id);
        record.apply(&invitation_params)?;
        record.set_peer_id(peer_id)?;
        record.set_my_id(self.my_wallet_id)?;
        record.set_create_time(Utc::now())?;
        record.set_transaction_type(TxKind::Simple)?;
        self.publish(NegotiationEvent::NewTransaction(tx_id));
        Ok(tx_id)
    }

    /// Generic ingestion point for any later peer message (the receiver's `InvitationConfirmation`
    /// reply, or a gateway-relayed registration/kernel notice modeled as a parameter write).
    pub fn apply_peer_message(&self, params: OutboundParameters) -> Result<(), TransactionServiceError> {
        let record = self.record(params.tx_id);
        record.apply(&params)?;
        Ok(())
    }

    /// §5 "a user-initiated cancel": only possible before the transaction has been handed to the
    /// gateway for registration (§4.5 `Registration`/`KernelConfirmation` are past the point of no
    /// return).
    pub fn cancel(&self, tx_id: TxId) -> Result<(), TransactionServiceError> {
        let record = self.record(tx_id);
        let sub_state = record.sub_state()?;
        if !matches!(sub_state, SubState::Initial | SubState::Invitation | SubState::InvitationConfirmation) {
            return Err(TransactionServiceError::CancellationNotPossible(tx_id));
        }
        let coin_ids = record.selected_coin_ids()?;
        if !coin_ids.is_empty() {
            self.outputs.release_inputs(&coin_ids)?;
        }
        record.set_status(TxStatus::Canceled)?;
        self.publish(NegotiationEvent::Canceled(tx_id));
        Ok(())
    }

    /// §4.5: advance `tx_id`'s state machine by one step. Re-entrant calls for a negotiation
    /// already mid-flight return immediately rather than racing themselves.
    pub async fn update(&self, tx_id: TxId, tip: Height) -> Result<UpdateOutcome, TransactionServiceError> {
        {
            let mut in_flight = self.in_flight.lock().expect("in-flight set mutex poisoned");
            if !in_flight.insert(tx_id) {
                return Ok(UpdateOutcome::Continue(NextTrigger::Immediate));
            }
        }
        let _guard = InFlightGuard {
            set: &self.in_flight,
            tx_id,
        };
        self.step(tx_id, tip).await
    }

    async fn step(&self, tx_id: TxId, tip: Height) -> Result<UpdateOutcome, TransactionServiceError> {
        let record = self.record(tx_id);
        let status = record.status()?;
        if status.is_terminal() {
            return Ok(UpdateOutcome::Done(self.terminal_status_of(&record)?));
        }

        let sub_state = record.sub_state()?;
        if sub_state != SubState::KernelConfirmation {
            if let Some(max_height) = record.max_height()? {
                if tip > max_height && record.transaction_registered()?.is_none() {
                    return self.terminal_failure(&record, InternalFailureReason::TransactionExpired);
                }
            }
        }

        let peer_is_owned = match record.peer_id()? {
            Some(peer_id) => self.addresses.is_owned(peer_id)?,
            None => false,
        };
        let role = record.role(peer_is_owned)?;

        debug!("tx {tx_id}: role={role:?} sub_state={sub_state:?}");

        match (role, sub_state) {
            (Role::Sender, SubState::Initial) => self.sender_initial(&record, tip).await,
            (Role::SelfTx, SubState::Initial) => self.self_tx_initial(&record, tip).await,
            (Role::Receiver, SubState::Initial) => self.receiver_initial(&record, tip).await,
            (Role::Sender, SubState::Invitation) => self.sender_on_invitation_reply(&record, tip).await,
            (Role::Receiver, SubState::InvitationConfirmation) => self.receiver_on_registration_notice(&record).await,
            (_, SubState::Registration) => self.on_registration_verdict(&record).await,
            (_, SubState::KernelConfirmation) => self.on_kernel_confirmation(&record).await,
            (role, sub_state) => {
                warn!("tx {tx_id}: no transition defined for role={role:?} sub_state={sub_state:?}");
                Ok(UpdateOutcome::Continue(NextTrigger::Immediate))
            },
        }
    }

    fn mandatory<T>(&self, value: Option<T>, key: TxParameterId, tx_id: TxId) -> Result<T, TransactionServiceError> {
        value.ok_or_else(|| ParameterStoreError::MissingParameter(key, tx_id).into())
    }

    fn put<T: serde::Serialize + serde::de::DeserializeOwned>(
        &self,
        outbound: &mut OutboundParameters,
        key: TxParameterId,
        value: &T,
    ) -> Result<(), TransactionServiceError> {
        outbound.values.insert(key, BincodeCodec::encode(value)?);
        Ok(())
    }

    fn build_sender_context(&self, record: &TransactionRecord) -> Result<SenderTransactionContext, TransactionServiceError> {
        let tx_id = record.tx_id();
        Ok(SenderTransactionContext {
            tx_id,
            amounts: self.mandatory(record.amounts()?, TxParameterId::Amount, tx_id)?,
            fee: self.mandatory(record.fee()?, TxParameterId::Fee, tx_id)?,
            asset_id: record.asset_id()?,
            min_height: self.mandatory(record.min_height()?, TxParameterId::MinHeight, tx_id)?,
            max_height: self.mandatory(record.max_height()?, TxParameterId::MaxHeight, tx_id)?,
            lifetime: self.mandatory(record.lifetime()?, TxParameterId::Lifetime, tx_id)?,
            inputs: record.inputs()?,
            change_output: record.change_output()?,
        })
    }

    /// Reconstructs the invitation the peer sent us, entirely from the relabeled fields `apply()`
    /// wrote into this record (§6.1: `PeerPublicExcess`/`PeerPublicNonce`/`PeerMaxHeight` carry the
    /// sender's `X_me`/`R_me`/proposed max height under the receiver's naming).
    fn build_sender_invitation_from_peer_fields(&self, record: &TransactionRecord) -> Result<SenderInvitation, TransactionServiceError> {
        let tx_id = record.tx_id();
        Ok(SenderInvitation {
            tx_id,
            amounts: self.mandatory(record.amounts()?, TxParameterId::Amount, tx_id)?,
            fee: self.mandatory(record.fee()?, TxParameterId::Fee, tx_id)?,
            asset_id: record.asset_id()?,
            min_height: self.mandatory(record.min_height()?, TxParameterId::MinHeight, tx_id)?,
            max_height: self.mandatory(record.peer_max_height()?, TxParameterId::PeerMaxHeight, tx_id)?,
            lifetime: record.lifetime()?.unwrap_or(0),
            public_excess: self.mandatory(record.peer_public_excess()?, TxParameterId::PeerPublicExcess, tx_id)?,
            public_nonce: self.mandatory(record.peer_public_nonce()?, TxParameterId::PeerPublicNonce, tx_id)?,
        })
    }

    /// §4.5 Initial(sender): select inputs, mint change, ask the key keeper for `(X_me, R_me,
    /// offset)`, and send the invitation.
    async fn sender_initial(&self, record: &TransactionRecord, tip: Height) -> Result<UpdateOutcome, TransactionServiceError> {
        let tx_id = record.tx_id();
        record.set_status(TxStatus::InProgress)?;

        let asset_id = record.asset_id()?;
        let fee = self.mandatory(record.fee()?, TxParameterId::Fee, tx_id)?;
        let total = record.total_amount()?;

        if record.selected_coin_ids()?.is_empty() {
            let selection = suspend_output_or!(self.outputs.select_inputs(tx_id, asset_id, total, fee, tip), tx_id);
            record.set_selected_coin_ids(&selection.coin_ids)?;
            record.set_inputs(&selection.inputs)?;

            if selection.change != Amount::ZERO {
                let minted = suspend_output_or!(self.outputs.create_change_output(Height(0), selection.change, asset_id).await, tx_id);
                if let Some(minted) = minted {
                    record.set_change_output(&minted.as_transaction_output())?;
                    record.set_receiver_coin_ids(&[minted.coin_id])?;
                }
            }
        }

        if record.nonce_slot()?.is_none() {
            let (slot, _nonce) = suspend_output_or!(self.outputs.allocate_nonce().await, tx_id);
            record.set_nonce_slot(slot)?;
        }
        let nonce_slot = self.mandatory(record.nonce_slot()?, TxParameterId::NonceSlot, tx_id)?;

        let response = suspend_or!(
            self.key_keeper
                .sign_sender(SignSenderRequest {
                    tx_id,
                    sub_tx_id: SUB_TX,
                    nonce_slot,
                    initial: true,
                    challenge: None,
                })
                .await,
            tx_id
        );
        record.set_public_excess(&response.public_excess)?;
        record.set_public_nonce(&response.public_nonce)?;
        record.set_offset(&response.offset)?;

        let sbbs_key = suspend_or!(self.key_keeper.derive_sbbs_key(self.my_wallet_id).await, tx_id);
        record.set_secure_wallet_id(&PublicKey::from_secret_key(&sbbs_key))?;

        let mut outbound = record.gather(&[
            TxParameterId::Amount,
            TxParameterId::Fee,
            TxParameterId::AssetId,
            TxParameterId::MinHeight,
            TxParameterId::Lifetime,
        ])?;
        self.put(&mut outbound, TxParameterId::IsSender, &false)?;
        self.put(&mut outbound, TxParameterId::PeerId, &self.my_wallet_id)?;
        let my_secure_wallet_id = self.mandatory(record.secure_wallet_id()?, TxParameterId::MySecureWalletId, tx_id)?;
        self.put(&mut outbound, TxParameterId::PeerSecureWalletId, &my_secure_wallet_id)?;
        self.put(&mut outbound, TxParameterId::PeerMaxHeight, &self.mandatory(record.max_height()?, TxParameterId::MaxHeight, tx_id)?)?;
        self.put(&mut outbound, TxParameterId::PeerProtocolVersion, &PROTOCOL_VERSION)?;
        self.put(&mut outbound, TxParameterId::PeerPublicExcess, &response.public_excess)?;
        self.put(&mut outbound, TxParameterId::PeerPublicNonce, &response.public_nonce)?;

        let peer_id = self.mandatory(record.peer_id()?, TxParameterId::PeerId, tx_id)?;
        let delivered = self.gateway.send_tx_parameters(peer_id, outbound).await;
        record.set_direct_send_result(delivered)?;
        if !delivered {
            warn!("tx {tx_id}: direct delivery of the invitation failed, continuing to wait for the peer");
        }

        record.set_sub_state(SubState::Invitation)?;
        self.publish(NegotiationEvent::StateChanged(tx_id, SubState::Invitation));
        Ok(UpdateOutcome::Continue(NextTrigger::NextTip))
    }

    /// §4.5 Invitation(sender): verify the receiver's reply, finalize the kernel, and submit for
    /// registration.
    async fn sender_on_invitation_reply(&self, record: &TransactionRecord, tip: Height) -> Result<UpdateOutcome, TransactionServiceError> {
        let tx_id = record.tx_id();

        let (peer_public_excess, peer_public_nonce, peer_signature, peer_offset) = match (
            record.peer_public_excess()?,
            record.peer_public_nonce()?,
            record.peer_signature()?,
            record.peer_offset()?,
        ) {
            (Some(x), Some(r), Some(s), Some(offset)) => (x, r, s, offset),
            _ => return Ok(UpdateOutcome::Continue(NextTrigger::PeerParamWrite)),
        };
        let peer_max_height = self.mandatory(record.peer_max_height()?, TxParameterId::PeerMaxHeight, tx_id)?;

        let reply = ReceiverReply {
            public_excess: peer_public_excess,
            public_nonce: peer_public_nonce,
            partial_signature: peer_signature,
            inputs: record.peer_inputs()?,
            outputs: record.peer_outputs()?,
            offset: peer_offset,
            max_height: peer_max_height,
            payment_confirmation: record.payment_confirmation()?,
        };

        let ctx = self.build_sender_context(record)?;
        let x_me = self.mandatory(record.public_excess()?, TxParameterId::PublicExcess, tx_id)?;
        let r_me = self.mandatory(record.public_nonce()?, TxParameterId::PublicNonce, tx_id)?;

        let max_height = match SenderTransactionProtocol::update_max_height(&ctx, peer_max_height, tip) {
            Ok(height) => height,
            Err(ProtocolError::MaxHeightIsUnacceptable(_, _)) => {
                return self.terminal_failure(record, InternalFailureReason::MaxHeightIsUnacceptable)
            },
            Err(_) => return self.terminal_failure(record, InternalFailureReason::InvalidTransaction),
        };

        if !SenderTransactionProtocol::is_peer_signature_valid(&ctx, &x_me, &r_me, max_height, &reply) {
            return self.terminal_failure(record, InternalFailureReason::InvalidPeerSignature);
        }

        let peer_secure_wallet_id = record.peer_secure_wallet_id()?;
        let payment_confirmation = reply.payment_confirmation.clone();
        let (payment_confirmation, peer_secure_wallet_id) = match (payment_confirmation, peer_secure_wallet_id) {
            (Some(proof), Some(key)) => (proof, key),
            _ => return self.terminal_failure(record, InternalFailureReason::NoPaymentProof),
        };
        let sender_public_key = self.mandatory(record.secure_wallet_id()?, TxParameterId::MySecureWalletId, tx_id)?;
        let x_agg = crypto::add_public_keys(&x_me, &reply.public_excess);
        let kernel_excess_bytes = Commitment::from_public_key(&x_agg).as_bytes().to_vec();
        if !ReceiverTransactionProtocol::is_payment_confirmation_valid(
            &payment_confirmation,
            &kernel_excess_bytes,
            ctx.total_amount(),
            &sender_public_key,
            &peer_secure_wallet_id,
        ) {
            return self.terminal_failure(record, InternalFailureReason::NoPaymentProof);
        }

        let nonce_slot = self.mandatory(record.nonce_slot()?, TxParameterId::NonceSlot, tx_id)?;
        let r_agg = crypto::add_public_keys(&r_me, &reply.public_nonce);
        let kernel_id = crypto::kernel_id(&x_agg, &r_agg, ctx.fee, ctx.min_height, max_height, ctx.asset_id);
        let challenge = crypto::kernel_challenge(&x_agg, &r_agg, &kernel_id);
        let response = suspend_or!(
            self.key_keeper
                .sign_sender(SignSenderRequest {
                    tx_id,
                    sub_tx_id: SUB_TX,
                    nonce_slot,
                    initial: false,
                    challenge: Some(challenge),
                })
                .await,
            tx_id
        );
        let s_me = self.mandatory(response.partial_signature, TxParameterId::PartialSignature, tx_id)?;

        let finalized = match SenderTransactionProtocol::finalize(&ctx, &x_me, &r_me, &s_me, &response.offset, max_height, &reply) {
            Ok(finalized) => finalized,
            Err(ProtocolError::InvalidPartialSignature) => {
                return self.terminal_failure(record, InternalFailureReason::InvalidKernelProof)
            },
            Err(_) => return self.terminal_failure(record, InternalFailureReason::InvalidTransaction),
        };

        record.set_final_signature(&finalized.kernel.excess_sig)?;
        record.set_inputs(&finalized.inputs)?;
        record.set_outputs(&finalized.outputs)?;
        record.set_max_height(max_height)?;
        record.set_kernel_id(&kernel_id)?;

        self.gateway.register_tx(tx_id, finalized).await;
        record.set_sub_state(SubState::Registration)?;
        self.publish(NegotiationEvent::StateChanged(tx_id, SubState::Registration));
        Ok(UpdateOutcome::Continue(NextTrigger::PeerParamWrite))
    }

    /// §4.5 Initial(receiver): verify the invitation, mint the receiver's outputs, sign, and reply.
    async fn receiver_initial(&self, record: &TransactionRecord, tip: Height) -> Result<UpdateOutcome, TransactionServiceError> {
        let tx_id = record.tx_id();
        record.set_status(TxStatus::InProgress)?;

        let invitation = self.build_sender_invitation_from_peer_fields(record)?;
        match ReceiverTransactionProtocol::verify_invitation(&invitation, tip) {
            ReceiverInvitation::Accepted => {},
            verdict => {
                warn!("tx {tx_id}: rejecting invitation: {verdict:?}");
                return self.terminal_failure(record, InternalFailureReason::InvalidTransaction);
            },
        }
        let max_height = invitation.max_height;

        if record.outputs()?.is_empty() {
            let minted = suspend_output_or!(
                self.outputs.create_receiver_outputs(Height(0), &invitation.amounts, invitation.asset_id, Height(0)).await,
                tx_id
            );
            let coin_ids: Vec<_> = minted.iter().map(|m| m.coin_id).collect();
            let tx_outputs: Vec<_> = minted.iter().map(|m| m.as_transaction_output()).collect();
            record.set_receiver_coin_ids(&coin_ids)?;
            record.set_outputs(&tx_outputs)?;
        }
        let minted_outputs = record.outputs()?;

        if record.nonce_slot()?.is_none() {
            let (slot, _nonce) = suspend_output_or!(self.outputs.allocate_nonce().await, tx_id);
            record.set_nonce_slot(slot)?;
        }
        let nonce_slot = self.mandatory(record.nonce_slot()?, TxParameterId::NonceSlot, tx_id)?;

        let peek = suspend_or!(
            self.key_keeper
                .sign_receiver(SignReceiverRequest {
                    tx_id,
                    sub_tx_id: SUB_TX,
                    nonce_slot,
                    initial: true,
                    challenge: None,
                    payment_proof_inputs: None,
                })
                .await,
            tx_id
        );
        record.set_public_excess(&peek.public_excess)?;
        record.set_public_nonce(&peek.public_nonce)?;
        record.set_offset(&peek.offset)?;

        let challenge = ReceiverTransactionProtocol::signing_challenge(&peek.public_excess, &peek.public_nonce, &invitation, max_height);
        let x_agg = crypto::add_public_keys(&peek.public_excess, &invitation.public_excess);
        let r_agg = crypto::add_public_keys(&peek.public_nonce, &invitation.public_nonce);
        let kernel_excess_bytes = Commitment::from_public_key(&x_agg).as_bytes().to_vec();
        let sender_public_key = self.mandatory(record.peer_secure_wallet_id()?, TxParameterId::PeerSecureWalletId, tx_id)?;

        // Both sides derive the same kernel id from the aggregated excess/nonce (§4.4.6); stored
        // up front so a new-proto peer (§9) can jump straight to KernelConfirmation below without
        // waiting on a registration notice that, for this protocol version, never arrives.
        record.set_kernel_id(&crypto::kernel_id(&x_agg, &r_agg, invitation.fee, invitation.min_height, max_height, invitation.asset_id))?;

        let response = suspend_or!(
            self.key_keeper
                .sign_receiver(SignReceiverRequest {
                    tx_id,
                    sub_tx_id: SUB_TX,
                    nonce_slot,
                    initial: false,
                    challenge: Some(challenge),
                    payment_proof_inputs: Some(PaymentProofInputs {
                        amount: invitation.amounts.iter().copied().sum(),
                        kernel_excess_bytes,
                        sender_public_key,
                    }),
                })
                .await,
            tx_id
        );
        let s_me = self.mandatory(response.partial_signature, TxParameterId::PartialSignature, tx_id)?;
        record.set_partial_signature(&s_me)?;
        if let Some(proof) = &response.payment_proof {
            record.set_payment_confirmation(proof)?;
        }

        let sbbs_key = suspend_or!(self.key_keeper.derive_sbbs_key(self.my_wallet_id).await, tx_id);
        let sbbs_public = PublicKey::from_secret_key(&sbbs_key);
        record.set_secure_wallet_id(&sbbs_public)?;

        let mut outbound = record.gather(&[TxParameterId::PaymentConfirmation])?;
        self.put(&mut outbound, TxParameterId::PeerProtocolVersion, &PROTOCOL_VERSION)?;
        self.put(&mut outbound, TxParameterId::PeerPublicExcess, &peek.public_excess)?;
        self.put(&mut outbound, TxParameterId::PeerPublicNonce, &peek.public_nonce)?;
        self.put(&mut outbound, TxParameterId::PeerSignature, &s_me)?;
        self.put(&mut outbound, TxParameterId::PeerOffset, &peek.offset)?;
        self.put(&mut outbound, TxParameterId::PeerMaxHeight, &max_height)?;
        self.put(&mut outbound, TxParameterId::PeerInputs, &Vec::<nyx_core::transaction_components::TransactionInput>::new())?;
        self.put(&mut outbound, TxParameterId::PeerOutputs, &minted_outputs)?;
        // §3 "optional PeerSecureWalletId": the sender needs this to verify the payment proof
        // above (§4.5 Invitation(sender)) — without it, `sender_on_invitation_reply` can never
        // find the receiver's SBBS key and every negotiation would fail `NoPaymentProof`.
        self.put(&mut outbound, TxParameterId::PeerSecureWalletId, &sbbs_public)?;

        let peer_id = self.mandatory(record.peer_id()?, TxParameterId::PeerId, tx_id)?;
        let delivered = self.gateway.send_tx_parameters(peer_id, outbound).await;
        record.set_direct_send_result(delivered)?;
        if !delivered {
            warn!("tx {tx_id}: direct delivery of the invitation confirmation failed, continuing to wait");
        }

        let peer_version = record.peer_protocol_version()?.unwrap_or(1);
        if peer_version >= PROTOCOL_VERSION {
            record.set_transaction_registered(RegisterTxVerdict::Ok)?;
            record.set_sub_state(SubState::KernelConfirmation)?;
            self.publish(NegotiationEvent::StateChanged(tx_id, SubState::KernelConfirmation));
        } else {
            record.set_sub_state(SubState::InvitationConfirmation)?;
            self.publish(NegotiationEvent::StateChanged(tx_id, SubState::InvitationConfirmation));
        }
        Ok(UpdateOutcome::Continue(NextTrigger::PeerParamWrite))
    }

    /// §4.5 InvitationConfirmation(receiver), old-protocol peers only: wait for an explicit
    /// registration notice rather than assuming it (§9 final paragraph).
    async fn receiver_on_registration_notice(&self, record: &TransactionRecord) -> Result<UpdateOutcome, TransactionServiceError> {
        let tx_id = record.tx_id();
        match record.transaction_registered()? {
            None => Ok(UpdateOutcome::Continue(NextTrigger::PeerParamWrite)),
            Some(RegisterTxVerdict::Ok) => {
                record.set_sub_state(SubState::KernelConfirmation)?;
                self.publish(NegotiationEvent::StateChanged(tx_id, SubState::KernelConfirmation));
                self.on_kernel_confirmation(record).await
            },
            Some(_) => self.terminal_failure(record, InternalFailureReason::FailedToRegister),
        }
    }

    /// §4.5 Registration: both `Sender` and `SelfTx` land here after submitting a finalized
    /// transaction. §7, §3.1: `InvalidContext` is transient only if the chain has never
    /// before reported seeing any version of this kernel.
    async fn on_registration_verdict(&self, record: &TransactionRecord) -> Result<UpdateOutcome, TransactionServiceError> {
        let tx_id = record.tx_id();
        let verdict = match record.transaction_registered()? {
            None => return Ok(UpdateOutcome::Continue(NextTrigger::PeerParamWrite)),
            Some(verdict) => verdict,
        };
        match verdict {
            RegisterTxVerdict::Ok => {
                record.set_sub_state(SubState::KernelConfirmation)?;
                self.publish(NegotiationEvent::StateChanged(tx_id, SubState::KernelConfirmation));
                self.on_kernel_confirmation(record).await
            },
            RegisterTxVerdict::InvalidContext if record.kernel_unconfirmed_height()?.is_none() => {
                let attempts = record.registration_attempts()? + 1;
                record.set_registration_attempts(attempts)?;
                if attempts >= self.config.max_registration_attempts {
                    return self.terminal_failure(record, InternalFailureReason::FailedToRegister);
                }
                let finalized = self.rebuild_finalized_transaction(record)?;
                self.gateway.register_tx(tx_id, finalized).await;
                Ok(UpdateOutcome::Continue(NextTrigger::NextTip))
            },
            _ => self.terminal_failure(record, InternalFailureReason::FailedToRegister),
        }
    }

    /// §4.5 KernelConfirmation: the last step for both `Sender`/`SelfTx` and `Receiver` — poll the
    /// gateway, and once a proof height lands, settle the coin table.
    async fn on_kernel_confirmation(&self, record: &TransactionRecord) -> Result<UpdateOutcome, TransactionServiceError> {
        let tx_id = record.tx_id();
        let kernel_id = self.mandatory(record.kernel_id()?, TxParameterId::KernelId, tx_id)?;
        self.gateway.confirm_kernel(kernel_id).await;

        match record.kernel_proof_height()? {
            Some(height) if height.as_u64() > 0 => {
                let selected = record.selected_coin_ids()?;
                if !selected.is_empty() {
                    self.outputs.mark_inputs_spent(&selected)?;
                }
                let received = record.receiver_coin_ids()?;
                if !received.is_empty() {
                    self.outputs.mark_outputs_available(&received)?;
                }
                record.set_status(TxStatus::Completed)?;
                self.publish(NegotiationEvent::Completed(tx_id));
                Ok(UpdateOutcome::Done(TerminalStatus::Completed))
            },
            _ => Ok(UpdateOutcome::Continue(NextTrigger::NextTip)),
        }
    }

    /// §4.5 Initial(self-tx): both halves of the negotiation run on one record, sharing a single
    /// nonce slot (§4.4.5: the sender-excess and receiver-excess domains never collide, so signing
    /// the same challenge twice from the same nonce is sound). `Peer*`-prefixed fields are reused
    /// purely as local storage for the receiver half — no peer is actually involved.
    async fn self_tx_initial(&self, record: &TransactionRecord, tip: Height) -> Result<UpdateOutcome, TransactionServiceError> {
        let tx_id = record.tx_id();
        record.set_status(TxStatus::InProgress)?;

        let asset_id = record.asset_id()?;
        let fee = self.mandatory(record.fee()?, TxParameterId::Fee, tx_id)?;
        let amounts = self.mandatory(record.amounts()?, TxParameterId::Amount, tx_id)?;
        let total = record.total_amount()?;
        let mut receiver_coin_ids = record.receiver_coin_ids()?;

        if record.selected_coin_ids()?.is_empty() {
            let selection = suspend_output_or!(self.outputs.select_inputs(tx_id, asset_id, total, fee, tip), tx_id);
            record.set_selected_coin_ids(&selection.coin_ids)?;
            record.set_inputs(&selection.inputs)?;
            if selection.change != Amount::ZERO {
                let minted = suspend_output_or!(self.outputs.create_change_output(Height(0), selection.change, asset_id).await, tx_id);
                if let Some(minted) = minted {
                    record.set_change_output(&minted.as_transaction_output())?;
                    receiver_coin_ids.push(minted.coin_id);
                }
            }
        }

        if record.peer_outputs()?.is_empty() {
            let minted = suspend_output_or!(self.outputs.create_receiver_outputs(Height(0), &amounts, asset_id, Height(0)).await, tx_id);
            for m in &minted {
                receiver_coin_ids.push(m.coin_id);
            }
            let tx_outputs: Vec<_> = minted.iter().map(|m| m.as_transaction_output()).collect();
            record.set_peer_outputs(&tx_outputs)?;
        }
        record.set_receiver_coin_ids(&receiver_coin_ids)?;

        if record.nonce_slot()?.is_none() {
            let (slot, _nonce) = suspend_output_or!(self.outputs.allocate_nonce().await, tx_id);
            record.set_nonce_slot(slot)?;
        }
        let nonce_slot = self.mandatory(record.nonce_slot()?, TxParameterId::NonceSlot, tx_id)?;

        let sender_peek = suspend_or!(
            self.key_keeper
                .sign_sender(SignSenderRequest {
                    tx_id,
                    sub_tx_id: SUB_TX,
                    nonce_slot,
                    initial: true,
                    challenge: None,
                })
                .await,
            tx_id
        );
        record.set_public_excess(&sender_peek.public_excess)?;
        record.set_public_nonce(&sender_peek.public_nonce)?;
        record.set_offset(&sender_peek.offset)?;

        let receiver_peek = suspend_or!(
            self.key_keeper
                .sign_receiver(SignReceiverRequest {
                    tx_id,
                    sub_tx_id: SUB_TX,
                    nonce_slot,
                    initial: true,
                    challenge: None,
                    payment_proof_inputs: None,
                })
                .await,
            tx_id
        );
        record.set_peer_public_excess(&receiver_peek.public_excess)?;
        record.set_peer_public_nonce(&receiver_peek.public_nonce)?;
        record.set_peer_offset(&receiver_peek.offset)?;

        let sbbs_key = suspend_or!(self.key_keeper.derive_sbbs_key(self.my_wallet_id).await, tx_id);
        let sbbs_public = PublicKey::from_secret_key(&sbbs_key);
        record.set_secure_wallet_id(&sbbs_public)?;
        record.set_peer_secure_wallet_id(&sbbs_public)?;

        let max_height = self.mandatory(record.max_height()?, TxParameterId::MaxHeight, tx_id)?;
        let min_height = self.mandatory(record.min_height()?, TxParameterId::MinHeight, tx_id)?;
        let x_agg = crypto::add_public_keys(&sender_peek.public_excess, &receiver_peek.public_excess);
        let r_agg = crypto::add_public_keys(&sender_peek.public_nonce, &receiver_peek.public_nonce);
        let kernel_id = crypto::kernel_id(&x_agg, &r_agg, fee, min_height, max_height, asset_id);
        let challenge = crypto::kernel_challenge(&x_agg, &r_agg, &kernel_id);
        let kernel_excess_bytes = Commitment::from_public_key(&x_agg).as_bytes().to_vec();

        let sender_final = suspend_or!(
            self.key_keeper
                .sign_sender(SignSenderRequest {
                    tx_id,
                    sub_tx_id: SUB_TX,
                    nonce_slot,
                    initial: false,
                    challenge: Some(challenge.clone()),
                })
                .await,
            tx_id
        );
        let receiver_final = suspend_or!(
            self.key_keeper
                .sign_receiver(SignReceiverRequest {
                    tx_id,
                    sub_tx_id: SUB_TX,
                    nonce_slot,
                    initial: false,
                    challenge: Some(challenge),
                    payment_proof_inputs: Some(PaymentProofInputs {
                        amount: total,
                        kernel_excess_bytes,
                        sender_public_key: sbbs_public,
                    }),
                })
                .await,
            tx_id
        );
        let s_me = self.mandatory(sender_final.partial_signature, TxParameterId::PartialSignature, tx_id)?;
        let s_peer = self.mandatory(receiver_final.partial_signature, TxParameterId::PeerSignature, tx_id)?;
        if let Some(proof) = &receiver_final.payment_proof {
            record.set_payment_confirmation(proof)?;
        }

        let ctx = self.build_sender_context(record)?;
        let reply = ReceiverReply {
            public_excess: receiver_peek.public_excess,
            public_nonce: receiver_peek.public_nonce,
            partial_signature: s_peer,
            inputs: vec![],
            outputs: record.peer_outputs()?,
            offset: receiver_peek.offset,
            max_height,
            payment_confirmation: receiver_final.payment_proof,
        };

        let finalized = match SenderTransactionProtocol::finalize(&ctx, &sender_peek.public_excess, &sender_peek.public_nonce, &s_me, &sender_peek.offset, max_height, &reply) {
            Ok(finalized) => finalized,
            Err(ProtocolError::InvalidPartialSignature) => {
                return self.terminal_failure(record, InternalFailureReason::InvalidKernelProof)
            },
            Err(_) => return self.terminal_failure(record, InternalFailureReason::InvalidTransaction),
        };

        record.set_final_signature(&finalized.kernel.excess_sig)?;
        record.set_inputs(&finalized.inputs)?;
        record.set_outputs(&finalized.outputs)?;
        record.set_kernel_id(&kernel_id)?;

        self.gateway.register_tx(tx_id, finalized).await;
        record.set_sub_state(SubState::Registration)?;
        self.publish(NegotiationEvent::StateChanged(tx_id, SubState::Registration));
        Ok(UpdateOutcome::Continue(NextTrigger::NextTip))
    }

    /// §7 policy: release any reserved coins and persist why the record failed. Never called for
    /// transport-only failures (`FailedToSendParameters`, §3.2) — those are handled by
    /// logging a warning and continuing, not by ending the record.
    fn terminal_failure(&self, record: &TransactionRecord, reason: InternalFailureReason) -> Result<UpdateOutcome, TransactionServiceError> {
        let tx_id = record.tx_id();
        error!("tx {tx_id}: terminal failure: {reason:?}");
        let coin_ids = record.selected_coin_ids()?;
        if !coin_ids.is_empty() {
            self.outputs.release_inputs(&coin_ids)?;
        }
        record.fail(reason)?;
        self.publish(NegotiationEvent::Failed(tx_id, reason));
        Ok(UpdateOutcome::Done(TerminalStatus::Failed(reason)))
    }

    fn terminal_status_of(&self, record: &TransactionRecord) -> Result<TerminalStatus, TransactionServiceError> {
        Ok(match record.status()? {
            TxStatus::Completed => TerminalStatus::Completed,
            TxStatus::Canceled => TerminalStatus::Canceled,
            TxStatus::Failed => {
                TerminalStatus::Failed(record.failure_reason()?.unwrap_or(InternalFailureReason::KeyKeeperError))
            },
            other => {
                info!("tx {}: terminal_status_of called on a non-terminal status {other:?}", record.tx_id());
                TerminalStatus::Failed(InternalFailureReason::KeyKeeperError)
            },
        })
    }

    /// §7 transient-retry path: re-derive a [`FinalizedSenderTransaction`] entirely from the
    /// persisted, already-merged record fields, for resubmission to the gateway.
    fn rebuild_finalized_transaction(&self, record: &TransactionRecord) -> Result<FinalizedSenderTransaction, TransactionServiceError> {
        let tx_id = record.tx_id();
        let x = crypto::add_public_keys(
            &self.mandatory(record.public_excess()?, TxParameterId::PublicExcess, tx_id)?,
            &self.mandatory(record.peer_public_excess()?, TxParameterId::PeerPublicExcess, tx_id)?,
        );
        let offset = crypto::add_private_keys(
            &self.mandatory(record.offset()?, TxParameterId::Offset, tx_id)?,
            &self.mandatory(record.peer_offset()?, TxParameterId::PeerOffset, tx_id)?,
        );
        let fee = self.mandatory(record.fee()?, TxParameterId::Fee, tx_id)?;
        let min_height = self.mandatory(record.min_height()?, TxParameterId::MinHeight, tx_id)?;
        let max_height = self.mandatory(record.max_height()?, TxParameterId::MaxHeight, tx_id)?;
        let asset_id = record.asset_id()?;
        let excess_sig = self.mandatory(record.final_signature()?, TxParameterId::FinalSignature, tx_id)?;

        let kernel = TransactionKernel {
            features: KernelFeatures::DEFAULT,
            fee,
            min_height,
            lock_height: max_height,
            asset_id,
            excess: Commitment::from_public_key(&x),
            excess_sig,
        };

        Ok(FinalizedSenderTransaction {
            kernel,
            inputs: record.inputs()?,
            outputs: record.outputs()?,
            offset,
        })
    }
}
