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

use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

/// A single slot in the per-negotiation parameter store (§4.1, §6.1). Every value either party
/// ever writes, reads or waits on is addressed by one of these ids; the store itself is generic
/// over the value bytes and knows nothing about their meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum TxParameterId {
    // --- negotiation terms (§3, §6.1) ---
    Amount,
    Fee,
    AssetId,
    MinHeight,
    MaxHeight,
    Lifetime,
    IsSender,
    MyId,
    PeerId,
    MySecureWalletId,
    PeerSecureWalletId,
    CreateTime,
    Status,
    SubState,
    TransactionType,
    PeerResponseHeight,
    PeerMaxHeight,
    PeerProtocolVersion,

    // --- local builder artefacts (§3, §4.4) ---
    NonceSlot,
    PublicExcess,
    PublicNonce,
    Offset,
    PartialSignature,
    FinalSignature,
    Inputs,
    Outputs,
    ChangeOutput,
    KernelId,
    SelectedCoinIds,
    ReceiverCoinIds,

    // --- peer-provided builder artefacts (§3, §4.4, §6.1) ---
    PeerPublicExcess,
    PeerPublicNonce,
    PeerSignature,
    PeerInputs,
    PeerOutputs,
    PeerOffset,

    // --- proofs and registration (§3, §4.4.9, §6.2) ---
    PaymentConfirmation,
    TransactionRegistered,
    KernelProofHeight,
    KernelUnconfirmedHeight,

    /// Whether the negotiation's parameters were ever delivered over a direct channel, or fell
    /// back to store-and-forward (§3.2).
    DirectSendResult,

    /// Why a record ended up `Failed` (§7); persisted so a restart can re-derive `PublicStatus`.
    InternalFailureReason,

    /// §7, §3.1: count of transient `InvalidContext` registration retries so far,
    /// bounded by `NegotiationConfig::max_registration_attempts`.
    RegistrationAttempts,
}

impl TxParameterId {
    /// The subset of ids an external observer (§4.1, §3) may read without being a party
    /// to the negotiation itself: enough to render a transaction list entry, never enough to
    /// reconstruct a partial signature or a blinding factor.
    pub fn is_observable(self) -> bool {
        matches!(
            self,
            TxParameterId::Amount
                | TxParameterId::Fee
                | TxParameterId::MinHeight
                | TxParameterId::PeerId
                | TxParameterId::MyId
                | TxParameterId::CreateTime
                | TxParameterId::IsSender
                | TxParameterId::Status
                | TxParameterId::TransactionType
                | TxParameterId::KernelId
                | TxParameterId::AssetId
        )
    }
}

impl fmt::Display for TxParameterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod test {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn only_a_small_subset_is_observable() {
        let observable: Vec<_> = TxParameterId::iter().filter(|id| id.is_observable()).collect();
        assert!(observable.contains(&TxParameterId::Amount));
        assert!(!observable.contains(&TxParameterId::PeerSignature));
        assert!(!observable.contains(&TxParameterId::PeerOffset));
    }
}
