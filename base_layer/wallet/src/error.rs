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

//! One top-level error enum per service (§1 "Errors"): each `#[from]`-wraps the collaborators it
//! actually calls. None of these are the persisted [`nyx_common_types::InternalFailureReason`]
//! (§7) — that taxonomy is what a *record* remembers after it fails; these are what a *call* can
//! fail with on the way there. [`TransactionServiceError::as_failure_reason`] is the one bridge
//! between the two.

use nyx_common_types::{tx_id::TxId, InternalFailureReason, TxParameterId};
use nyx_key_manager::KeyKeeperError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParameterStoreError {
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("failed to encode/decode parameter value: {0}")]
    Codec(String),
    #[error("required parameter {0:?} was missing for tx {1}")]
    MissingParameter(TxParameterId, TxId),
}

#[derive(Debug, Error)]
pub enum CoinStoreError {
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("coin {0:?} was not found")]
    NotFound(nyx_key_manager::CoinId),
}

#[derive(Debug, Error)]
pub enum OutputManagerError {
    #[error(transparent)]
    CoinStore(#[from] CoinStoreError),
    #[error(transparent)]
    KeyKeeper(#[from] KeyKeeperError),
    #[error("no combination of available coins covers amount {needed} (asset {asset_id})")]
    NoInputs { needed: u64, asset_id: u64 },
}

#[derive(Debug, Error)]
pub enum AddressBookError {
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("address {0} is not known")]
    NotFound(nyx_common_types::address::WalletId),
    #[error("address {0} is an expired owned address and cannot originate or receive a negotiation")]
    ExpiredAddress(nyx_common_types::address::WalletId),
}

/// The error taxonomy a call into the transaction service/negotiation driver can fail with (§7).
/// Distinct from [`InternalFailureReason`]: most of these variants have a direct mapping via
/// [`TransactionServiceError::as_failure_reason`], used to persist why a record went `Failed`.
#[derive(Debug, Error)]
pub enum TransactionServiceError {
    #[error(transparent)]
    ParameterStore(#[from] ParameterStoreError),
    #[error(transparent)]
    OutputManager(#[from] OutputManagerError),
    #[error(transparent)]
    AddressBook(#[from] AddressBookError),
    #[error(transparent)]
    KeyKeeper(#[from] KeyKeeperError),
    #[error(transparent)]
    Protocol(#[from] nyx_core::transaction_protocol::ProtocolError),
    #[error("no inputs available to cover the requested amount and fee")]
    NoInputs,
    #[error("the negotiation was canceled")]
    Canceled,
    #[error("the peer's proposed max height is unacceptable")]
    MaxHeightIsUnacceptable,
    #[error("the peer's partial signature did not verify")]
    InvalidPeerSignature,
    #[error("no payment proof was received from the receiver")]
    NoPaymentProof,
    #[error("the final kernel excess signature did not verify")]
    InvalidKernelProof,
    #[error("failed to deliver the negotiation parameters to the peer")]
    FailedToSendParameters,
    #[error("the gateway failed to register the finished transaction with the chain")]
    FailedToRegister,
    #[error("the assembled transaction failed structural validation")]
    InvalidTransaction,
    #[error("the transaction expired before it could be completed")]
    TransactionExpired,
    #[error("not enough data was available to build a payment proof")]
    NotEnoughDataForProof,
    #[error("transaction {0} is unknown to this wallet")]
    UnknownTransaction(TxId),
    #[error("a cancel was requested for tx {0} but it has already been submitted for registration")]
    CancellationNotPossible(TxId),
    #[error("the sender's invitation failed basic sanity checks: {0}")]
    InvalidInvitation(String),
}

impl TransactionServiceError {
    /// Maps an error raised mid-negotiation onto the persisted [`InternalFailureReason`] taxonomy
    /// (§7). Not every variant here is terminal for the record (e.g. a transient
    /// [`KeyKeeperError::InProgress`] is a suspension signal, not a failure, and is handled by the
    /// driver before it ever reaches this mapping) — callers only pass through the errors that
    /// really do end the record.
    pub fn as_failure_reason(&self) -> InternalFailureReason {
        match self {
            TransactionServiceError::NoInputs | TransactionServiceError::OutputManager(OutputManagerError::NoInputs { .. }) => {
                InternalFailureReason::NoInputs
            },
            TransactionServiceError::Canceled => InternalFailureReason::Canceled,
            TransactionServiceError::MaxHeightIsUnacceptable => InternalFailureReason::MaxHeightIsUnacceptable,
            TransactionServiceError::InvalidPeerSignature => InternalFailureReason::InvalidPeerSignature,
            TransactionServiceError::NoPaymentProof => InternalFailureReason::NoPaymentProof,
            TransactionServiceError::InvalidKernelProof => InternalFailureReason::InvalidKernelProof,
            TransactionServiceError::FailedToSendParameters => InternalFailureReason::FailedToSendParameters,
            TransactionServiceError::FailedToRegister => InternalFailureReason::FailedToRegister,
            TransactionServiceError::InvalidTransaction => InternalFailureReason::InvalidTransaction,
            TransactionServiceError::TransactionExpired => InternalFailureReason::TransactionExpired,
            TransactionServiceError::NotEnoughDataForProof => InternalFailureReason::NotEnoughDataForProof,
            TransactionServiceError::KeyKeeper(KeyKeeperError::UserAbort) => InternalFailureReason::Canceled,
            _ => InternalFailureReason::KeyKeeperError,
        }
    }
}
