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

use crate::error::InternalFailureReason;

/// Which side of the negotiation this wallet is playing for a given record (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Sender,
    Receiver,
    /// Sender and receiver both resolve to an owned address (a split, §4.5, GLOSSARY).
    SelfTx,
}

impl Role {
    pub fn is_sender(self) -> bool {
        matches!(self, Role::Sender | Role::SelfTx)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Sender => write!(f, "Sender"),
            Role::Receiver => write!(f, "Receiver"),
            Role::SelfTx => write!(f, "SelfTx"),
        }
    }
}

/// Top-level persisted status (§3): `Pending → InProgress → Registering → Completed | Failed |
/// Canceled`. Monotone except the explicit rollback to `Failed` (P5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TxStatus {
    #[default]
    Pending,
    InProgress,
    Registering,
    Completed,
    Failed,
    Canceled,
}

impl TxStatus {
    /// §3 invariant 4: status is terminal once in one of these three states.
    pub fn is_terminal(self) -> bool {
        matches!(self, TxStatus::Completed | TxStatus::Failed | TxStatus::Canceled)
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxStatus::Pending => write!(f, "Pending"),
            TxStatus::InProgress => write!(f, "InProgress"),
            TxStatus::Registering => write!(f, "Registering"),
            TxStatus::Completed => write!(f, "Completed"),
            TxStatus::Failed => write!(f, "Failed"),
            TxStatus::Canceled => write!(f, "Canceled"),
        }
    }
}

/// §9 REDESIGN FLAGS: "Prefer a tagged variant `TxKind` ... dispatched by a small table" in place
/// of the source's class-inheritance `UpdateImpl`. This workspace implements only `Simple`; the
/// other variants are named so the dispatch table in the wallet crate has somewhere to grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxKind {
    /// A two-party value transfer, including its degenerate self-tx/split case where `PeerId ==
    /// MyId` (§1, §4.5, GLOSSARY "Self-tx"). The only variant this workspace dispatches.
    Simple,
    AssetIssue,
    AssetRegister,
}

/// Sub-state of the negotiation state machine (§3, §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SubState {
    #[default]
    Initial,
    Invitation,
    InvitationConfirmation,
    Registration,
    KernelConfirmation,
}

impl fmt::Display for SubState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubState::Initial => write!(f, "Initial"),
            SubState::Invitation => write!(f, "Invitation"),
            SubState::InvitationConfirmation => write!(f, "InvitationConfirmation"),
            SubState::Registration => write!(f, "Registration"),
            SubState::KernelConfirmation => write!(f, "KernelConfirmation"),
        }
    }
}

/// The user-visible rendering of a record's status (§7). `Expired` is the public face of
/// `Failed(TransactionExpired)` — never persisted under that name, only ever derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PublicStatus {
    Pending,
    InProgress,
    Registering,
    Completed,
    Failed(InternalFailureReason),
    Canceled,
    Expired,
}

impl PublicStatus {
    pub fn derive(status: TxStatus, reason: Option<InternalFailureReason>) -> PublicStatus {
        match (status, reason) {
            (TxStatus::Pending, _) => PublicStatus::Pending,
            (TxStatus::InProgress, _) => PublicStatus::InProgress,
            (TxStatus::Registering, _) => PublicStatus::Registering,
            (TxStatus::Completed, _) => PublicStatus::Completed,
            (TxStatus::Canceled, _) => PublicStatus::Canceled,
            (TxStatus::Failed, Some(InternalFailureReason::TransactionExpired)) => PublicStatus::Expired,
            (TxStatus::Failed, Some(reason)) => PublicStatus::Failed(reason),
            (TxStatus::Failed, None) => PublicStatus::Failed(InternalFailureReason::KeyKeeperError),
        }
    }
}

impl fmt::Display for PublicStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublicStatus::Pending => write!(f, "Pending"),
            PublicStatus::InProgress => write!(f, "InProgress"),
            PublicStatus::Registering => write!(f, "Registering"),
            PublicStatus::Completed => write!(f, "Completed"),
            PublicStatus::Failed(reason) => write!(f, "Failed({reason})"),
            PublicStatus::Canceled => write!(f, "Canceled"),
            PublicStatus::Expired => write!(f, "Expired"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn expired_is_the_public_face_of_transaction_expired() {
        let public = PublicStatus::derive(TxStatus::Failed, Some(InternalFailureReason::TransactionExpired));
        assert_eq!(public, PublicStatus::Expired);
    }

    #[test]
    fn other_failures_stay_failed() {
        let public = PublicStatus::derive(TxStatus::Failed, Some(InternalFailureReason::NoInputs));
        assert_eq!(public, PublicStatus::Failed(InternalFailureReason::NoInputs));
    }

    #[test]
    fn terminal_states_are_recognised() {
        assert!(TxStatus::Completed.is_terminal());
        assert!(TxStatus::Failed.is_terminal());
        assert!(TxStatus::Canceled.is_terminal());
        assert!(!TxStatus::Registering.is_terminal());
    }
}
