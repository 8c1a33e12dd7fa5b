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

//! The request/response payloads for every §4.2 operation. Kept as plain data so the sync and
//! async traits ([`crate::keeper`], [`crate::async_keeper`]) share the exact same shapes.

use nyx_common_types::{
    asset::AssetId,
    height::Height,
    tx_id::TxId,
    types::{BlindingFactor, PublicKey, Signature},
};
use nyx_core::{transaction_components::OutputFeatures, Amount};
use serde::{Deserialize, Serialize};

/// Identifies one of the wallet's own coins (inputs or newly created outputs) to the key keeper.
/// Opaque outside this crate and the output manager that allocates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoinId(pub u64);

/// A persisted nonce reservoir index (§4.2 `allocateNonceSlot`, GLOSSARY "Nonce slot").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonceSlotId(pub u64);

/// `signSender` (§4.2). `initial = true` asks only for `(X_me, R_me, offset)` — the pre-commit
/// round before the peer's excess/nonce are known; `initial = false` asks for `s_me` as well,
/// binding against the aggregated `X`, `R` and the kernel id.
#[derive(Debug, Clone)]
pub struct SignSenderRequest {
    pub tx_id: TxId,
    pub sub_tx_id: u64,
    pub nonce_slot: NonceSlotId,
    pub initial: bool,
    /// Present only when `initial = false`: the challenge `c = H(X, R, fee, maxHeight)` built
    /// from both parties' aggregated excess/nonce (§4.4.8).
    pub challenge: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct SignSenderResponse {
    pub public_excess: PublicKey,
    pub public_nonce: PublicKey,
    pub offset: BlindingFactor,
    /// `None` when the request was `initial = true`.
    pub partial_signature: Option<BlindingFactor>,
}

/// The data needed to bind the receiver's payment-proof signature over `(amount, kernelId,
/// senderPeerId)` (§4.4.9, §6.3). Only present on the final (`initial = false`) `signReceiver`
/// call, once the sender's aggregated kernel excess is known.
#[derive(Debug, Clone)]
pub struct PaymentProofInputs {
    pub amount: Amount,
    pub kernel_excess_bytes: Vec<u8>,
    pub sender_public_key: PublicKey,
}

/// `signReceiver` (§4.2). Mirrors [`SignSenderRequest`]'s `initial` split: the receiver's excess
/// and nonce are a pure function of `(txId, subTxId)` and the nonce slot, so `initial = true`
/// peeks at `(X_me, R_me, offset)` without touching the nonce slot's single-use guarantee — the
/// caller needs `X_me` to build the aggregated challenge before it can ask for a signature at
/// all. `initial = false` produces the partial kernel signature and the payment-proof signature
/// together, binding the nonce slot to `challenge` (§8 P3).
#[derive(Debug, Clone)]
pub struct SignReceiverRequest {
    pub tx_id: TxId,
    pub sub_tx_id: u64,
    pub nonce_slot: NonceSlotId,
    pub initial: bool,
    /// Present only when `initial = false`.
    pub challenge: Option<Vec<u8>>,
    /// Present only when `initial = false`.
    pub payment_proof_inputs: Option<PaymentProofInputs>,
}

#[derive(Debug, Clone)]
pub struct SignReceiverResponse {
    pub public_excess: PublicKey,
    pub public_nonce: PublicKey,
    pub offset: BlindingFactor,
    /// `None` when the request was `initial = true`.
    pub partial_signature: Option<BlindingFactor>,
    /// `None` when the request was `initial = true`.
    pub payment_proof: Option<Signature>,
}

/// `signAssetKernel` (§4.2): analogous to `signSender`/`signReceiver` but for an asset control
/// kernel rather than a value-transfer kernel. Asset-issue/register transactions are themselves
/// out of scope (§1 Non-goals); this keeps the capability's shape for the one sub-case the
/// protocol does cover — an asset-denominated simple send (§8 scenario 6) still signs a regular
/// kernel through `signSender`/`signReceiver`, so this operation is unused by `Simple` sends and
/// exists only so the capability surface matches §4.2 in full.
#[derive(Debug, Clone)]
pub struct SignAssetKernelRequest {
    pub tx_id: TxId,
    pub nonce_slot: NonceSlotId,
    pub challenge: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct SignAssetKernelResponse {
    pub public_excess: PublicKey,
    pub public_nonce: PublicKey,
    pub partial_signature: BlindingFactor,
}

/// `generateOutputs` (§4.2): scheme height selects the range-proof/output version in use, mirrors
/// the chain's activation-height scheme versioning. The value of each output is chosen by the
/// caller (the coin selector, C3) and passed in here; the key keeper only ever derives the secret
/// blinding factor behind it, never the amount.
#[derive(Debug, Clone, Copy)]
pub struct GenerateOutputsRequest {
    pub scheme_height: Height,
}

/// One output to create, paired with the [`CoinId`] whose derived blinding factor will own it.
#[derive(Debug, Clone, Copy)]
pub struct OutputSpec {
    pub coin_id: CoinId,
    pub value: Amount,
    pub features: OutputFeatures,
    pub asset_id: AssetId,
    pub maturity: Height,
}
