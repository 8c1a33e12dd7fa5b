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

//! The Gateway (C6, §4.6): "a pure output port; replies are delivered as parameter writes."
//! `nyx_wallet` never calls back into itself through this trait — a `Gateway` implementation lives
//! in whatever process/crate owns the P2P transport and the node RPC client, both out of scope
//! here (§1 Non-goals).

use async_trait::async_trait;
use nyx_common_types::{address::WalletId, height::Height, tx_id::TxId};

use crate::record::OutboundParameters;

/// §6.2 "as consumed": the node's verdict on a `registerTx` call, persisted as
/// `TxParameterId::TransactionRegistered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RegisterTxVerdict {
    Ok,
    InvalidInput,
    InvalidContext,
    LowFee,
    TooLarge,
}

#[async_trait]
pub trait Gateway: Send + Sync {
    /// `sendTxParameters(peerId, params) -> bool` (§4.6): `true` only if the direct channel
    /// accepted delivery; `false` triggers the store-and-forward fallback accounting
    /// (§3.2).
    async fn send_tx_parameters(&self, peer_id: WalletId, params: OutboundParameters) -> bool;

    /// `registerTx(txId, transaction)` (§4.6). The verdict itself arrives later as a
    /// `TransactionRegistered` parameter write, not as this call's return value.
    async fn register_tx(&self, tx_id: TxId, transaction: nyx_core::transaction_protocol::FinalizedSenderTransaction);

    /// `confirmKernel(kernelId)` (§4.6). Inclusion proof arrives as `KernelProofHeight` /
    /// `KernelUnconfirmedHeight` parameter writes.
    async fn confirm_kernel(&self, kernel_id: Vec<u8>);

    /// `onTip(height)` (§4.6): informational; drivers subscribe to tip changes independently
    /// through whatever mechanism the embedding application uses to call `update()`.
    async fn on_tip(&self, height: Height);
}
