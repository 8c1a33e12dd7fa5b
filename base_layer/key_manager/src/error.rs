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

use thiserror::Error;

/// §4.2: "Each operation's status is one of `Ok | InProgress | UserAbort | Unspecified |
/// DeviceLost`". `Ok` is represented by `Result::Ok` at the call site; the four failure statuses
/// are the variants here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum KeyKeeperError {
    /// Not an error in the usual sense: the keeper has accepted the request but has not produced
    /// a result yet. The caller (the negotiation driver, §9) treats this as a suspension signal,
    /// not a failure, and exits until the matching completion arrives.
    #[error("the key keeper is still processing this request")]
    InProgress,
    #[error("the user aborted the operation on the key-keeping device")]
    UserAbort,
    #[error("the key keeper reported an unspecified failure")]
    Unspecified,
    #[error("the key-keeping device is not reachable")]
    DeviceLost,
    /// Not part of §4.2's status list: raised locally when a nonce slot is asked to sign a second,
    /// different challenge (§8 P3, invariant 2). Surfaced as `Unspecified` to anything outside
    /// this crate that only knows the four-status vocabulary.
    #[error("nonce slot {0} was already used for a different challenge")]
    NonceSlotReused(u64),
}

impl KeyKeeperError {
    /// Collapses [`KeyKeeperError::NonceSlotReused`] into the four-value status vocabulary the
    /// rest of the protocol expects (§4.2).
    pub fn as_status(&self) -> &'static str {
        match self {
            KeyKeeperError::InProgress => "InProgress",
            KeyKeeperError::UserAbort => "UserAbort",
            KeyKeeperError::Unspecified | KeyKeeperError::NonceSlotReused(_) => "Unspecified",
            KeyKeeperError::DeviceLost => "DeviceLost",
        }
    }
}
