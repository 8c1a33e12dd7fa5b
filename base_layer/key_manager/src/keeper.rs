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

//! The synchronous shape of the Key Keeper capability surface (§4.2). A concrete key keeper (a
//! hardware wallet driver, an in-memory test double, ...) implements this trait; [`super::worker`]
//! derives the asynchronous shape from it by running calls on a worker thread.

use nyx_common_types::{
    address::WalletId,
    types::{PrivateKey, PublicKey},
};
use nyx_core::transaction_components::UnblindedOutput;

use crate::{
    error::KeyKeeperError,
    requests::{
        CoinId,
        GenerateOutputsRequest,
        NonceSlotId,
        OutputSpec,
        SignAssetKernelRequest,
        SignAssetKernelResponse,
        SignReceiverRequest,
        SignReceiverResponse,
        SignSenderRequest,
        SignSenderResponse,
    },
};

/// One contract per §4.2 operation. Every method is `&self` (interior mutability for any
/// persisted nonce-slot state lives behind the implementation, not the trait) so a single keeper
/// instance can be shared between the reactor thread and [`super::worker::ThreadedKeyKeeper`]'s
/// background thread.
pub trait KeyKeeper: Send + Sync {
    /// `deriveSbbsKey(ownId) -> scalar` (§4.2): the key used to sign payment confirmations.
    fn derive_sbbs_key(&self, own_id: WalletId) -> Result<PrivateKey, KeyKeeperError>;

    /// `generatePublicKeys(coinIds, createCoinKey?) -> points[]` (§4.2).
    fn generate_public_keys(&self, coin_ids: &[CoinId], create_coin_key: bool) -> Result<Vec<PublicKey>, KeyKeeperError>;

    /// `generateOutputs(schemeHeight, coinIds) -> output blobs` (§4.2), one output per
    /// [`OutputSpec`]. Returns the full [`UnblindedOutput`] (value and blinding factor included):
    /// the caller owns what it just created and needs both halves for the coin table, while the
    /// commitment travelling to the peer is [`UnblindedOutput::as_transaction_output`].
    fn generate_outputs(&self, request: GenerateOutputsRequest, specs: &[OutputSpec]) -> Result<Vec<UnblindedOutput>, KeyKeeperError>;

    /// `signSender(inputs, outputs, nonceSlot, kernel, initial?) -> (X_me, R_me, s_me, offset)`
    /// (§4.2, §4.4.5).
    fn sign_sender(&self, request: SignSenderRequest) -> Result<SignSenderResponse, KeyKeeperError>;

    /// `signReceiver(inputs, outputs, kernel, walletIdKey, initial?) -> (X_me, R_me, s_me,
    /// paymentProof)` (§4.2, §4.4.5). Split the same way as `signSender`: the receiver needs its
    /// own `X_me`/`R_me` before it can build the aggregated challenge it signs against.
    fn sign_receiver(&self, request: SignReceiverRequest) -> Result<SignReceiverResponse, KeyKeeperError>;

    /// `signAssetKernel(...)` (§4.2): analogous to `signSender`, for asset control kernels.
    fn sign_asset_kernel(&self, request: SignAssetKernelRequest) -> Result<SignAssetKernelResponse, KeyKeeperError>;

    /// `allocateNonceSlot() -> index` (§4.2).
    fn allocate_nonce_slot(&self) -> Result<NonceSlotId, KeyKeeperError>;

    /// `generateNonce(slot) -> point` (§4.2).
    fn generate_nonce(&self, slot: NonceSlotId) -> Result<PublicKey, KeyKeeperError>;
}
