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

//! The Key Keeper (§4.2, C2): a capability surface over scalars, points and signatures that never
//! exposes private material to its caller. Every operation here has a synchronous shape
//! ([`keeper::KeyKeeper`]) and an asynchronous one ([`async_keeper::AsyncKeyKeeper`]); the
//! [`worker::ThreadedKeyKeeper`] derives the async shape from any synchronous implementation by
//! running it on a dedicated worker thread (§5).

pub mod async_keeper;
pub mod error;
pub mod keeper;
pub mod memory;
pub mod nonce_store;
pub mod requests;
pub mod worker;

pub use async_keeper::AsyncKeyKeeper;
pub use error::KeyKeeperError;
pub use keeper::KeyKeeper;
pub use memory::MemoryKeyKeeper;
pub use requests::{
    CoinId,
    GenerateOutputsRequest,
    NonceSlotId,
    OutputSpec,
    PaymentProofInputs,
    SignAssetKernelRequest,
    SignReceiverRequest,
    SignReceiverResponse,
    SignSenderRequest,
    SignSenderResponse,
};
pub use worker::{ThreadedKeyKeeper, ThreadedKeyKeeperHandle};
