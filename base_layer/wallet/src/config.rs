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

use std::time::Duration;

/// Tunables the negotiation driver and service facade need beyond the wire protocol itself
/// (§1 "Config", §3.1).
#[derive(Debug, Clone)]
pub struct NegotiationConfig {
    /// How long the driver waits for the gateway to confirm direct delivery of a message before
    /// treating it as a direct-send failure (§3.2).
    pub broadcast_timeout: Duration,
    /// How long the driver waits between polling the gateway for `KernelUnconfirmedHeight` while
    /// `SubState::Registration` is in flight (§4.5, §7).
    pub registration_poll_interval: Duration,
    /// Upper bound on transient `InvalidContext` retries during registration before the record is
    /// failed with `FailedToRegister` (§3.1).
    pub max_registration_attempts: u32,
    /// Retries attempted on the direct channel before falling back to store-and-forward
    /// accounting (§3.2).
    pub direct_send_retries: u32,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        NegotiationConfig {
            broadcast_timeout: Duration::from_secs(30),
            registration_poll_interval: Duration::from_secs(10),
            max_registration_attempts: 10,
            direct_send_retries: 3,
        }
    }
}
