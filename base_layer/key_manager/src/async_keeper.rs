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

//! The asynchronous mirror of [`crate::keeper::KeyKeeper`] (§4.2, §5: "every operation has a
//! synchronous and an asynchronous shape"). [`crate::worker::ThreadedKeyKeeper`] is the only
//! implementation in this crate; a hardware keeper driver with its own native async I/O could
//! implement this directly instead of going through the worker thread.

use async_trait::async_trait;
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

/// Mirrors [`crate::keeper::KeyKeeper`] one-for-one. `InProgress` (§4.2) is not modeled as a
/// distinct return value here: an async caller simply awaits the future, and a device that wants
/// to report "still working" does so by not resolving the future yet, not by returning early.
#[async_trait]
pub trait AsyncKeyKeeper: Send + Sync {
    async fn derive_sbbs_key(&self, own_id: WalletId) -> Result<PrivateKey, KeyKeeperError>;

    async fn generate_public_keys(&self, coin_ids: Vec<CoinId>, create_coin_key: bool) -> Result<Vec<PublicKey>, KeyKeeperError>;

    async fn generate_outputs(&self, request: GenerateOutputsRequest, specs: Vec<OutputSpec>) -> Result<Vec<UnblindedOutput>, KeyKeeperError>;

    async fn sign_sender(&self, request: SignSenderRequest) -> Result<SignSenderResponse, KeyKeeperError>;

    async fn sign_receiver(&self, request: SignReceiverRequest) -> Result<SignReceiverResponse, KeyKeeperError>;

    async fn sign_asset_kernel(&self, request: SignAssetKernelRequest) -> Result<SignAssetKernelResponse, KeyKeeperError>;

    async fn allocate_nonce_slot(&self) -> Result<NonceSlotId, KeyKeeperError>;

    async fn generate_nonce(&self, slot: NonceSlotId) -> Result<PublicKey, KeyKeeperError>;
}
