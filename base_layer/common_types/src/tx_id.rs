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

use std::{
    fmt,
    fmt::Formatter,
    hash::{Hash, Hasher},
};

use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};

/// A 128-bit transaction identifier (§3), shared by both parties to a negotiation.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default)]
pub struct TxId(u128);

impl TxId {
    pub fn new_random() -> Self {
        let mut bytes = [0u8; 16];
        OsRng.fill_bytes(&mut bytes);
        TxId(u128::from_le_bytes(bytes))
    }

    pub fn as_u128(self) -> u128 {
        self.0
    }
}

impl Hash for TxId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl PartialEq for TxId {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for TxId {}

impl From<u128> for TxId {
    fn from(s: u128) -> Self {
        Self(s)
    }
}

impl From<TxId> for u128 {
    fn from(s: TxId) -> Self {
        s.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn random_ids_do_not_collide() {
        let a = TxId::new_random();
        let b = TxId::new_random();
        assert_ne!(a.as_u128(), b.as_u128());
    }

    #[test]
    fn round_trips_through_serde() {
        let id = TxId::new_random();
        let json = serde_json::to_string(&id).unwrap();
        let back: TxId = serde_json::from_str(&json).unwrap();
        assert_eq!(id.as_u128(), back.as_u128());
    }
}
