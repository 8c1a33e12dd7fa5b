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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tari_utilities::ByteArray;

use crate::types::PublicKey;

/// Opaque identifier for a counterparty wallet (§3). Distinct from the public excess carried in
/// the negotiation itself: a wallet can rotate keys without losing its address-book identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WalletId(pub [u8; 32]);

impl WalletId {
    pub fn from_public_key(pk: &PublicKey) -> Self {
        let bytes = pk.as_bytes();
        let mut id = [0u8; 32];
        let n = bytes.len().min(32);
        id[..n].copy_from_slice(&bytes[..n]);
        WalletId(id)
    }
}

impl fmt::Display for WalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// An entry in the address book (§3, §3.3): a counterparty or one of the wallet's own
/// addresses, with an optional expiry after which it is no longer eligible to originate or
/// receive a negotiation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub wallet_id: WalletId,
    /// `true` if this address is owned by this wallet instance (used to detect a self-tx, §4.5).
    pub is_owned: bool,
    pub created_at: DateTime<Utc>,
    /// `None` means the address never expires.
    pub expires_at: Option<DateTime<Utc>>,
    pub label: Option<String>,
}

impl Address {
    pub fn new_owned(wallet_id: WalletId, created_at: DateTime<Utc>) -> Self {
        Address {
            wallet_id,
            is_owned: true,
            created_at,
            expires_at: None,
            label: None,
        }
    }

    pub fn new_peer(wallet_id: WalletId, created_at: DateTime<Utc>) -> Self {
        Address {
            wallet_id,
            is_owned: false,
            created_at,
            expires_at: None,
            label: None,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|expiry| now >= expiry).unwrap_or(false)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn address_without_expiry_never_expires() {
        let addr = Address::new_peer(WalletId([1u8; 32]), Utc::now());
        assert!(!addr.is_expired(Utc::now() + chrono::Duration::days(365 * 50)));
    }

    #[test]
    fn address_with_past_expiry_is_expired() {
        let now = Utc::now();
        let mut addr = Address::new_peer(WalletId([2u8; 32]), now);
        addr.expires_at = Some(now - chrono::Duration::seconds(1));
        assert!(addr.is_expired(now));
    }
}
