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

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The reason a negotiation ended up in `Failed` (§7). Kept separate from the transport-level
/// error types in `core`/`wallet` so that it can be persisted and rendered to a user without
/// dragging in every crate's own error enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum InternalFailureReason {
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
    #[error("the key keeper reported an error")]
    KeyKeeperError,
}
