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

use nyx_common_types::{asset::AssetId, height::Height};
use serde::{Deserialize, Serialize};

use tari_utilities::ByteArray;

use crate::{amount::Amount, crypto};
use nyx_common_types::types::{Commitment, PublicKey, Signature};

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct KernelFeatures: u8 {
        const DEFAULT = 0;
    }
}

/// The publicly verifiable artifact of a completed negotiation (§4.4.8, §6.3): the sum of every
/// input and output blinding factor, as a commitment to zero value, together with a Schnorr
/// signature over that excess proving knowledge of its private key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionKernel {
    pub features: KernelFeatures,
    pub fee: Amount,
    pub min_height: Height,
    pub lock_height: Height,
    pub asset_id: AssetId,
    /// `excess = sum(output blinding factors) - sum(input blinding factors)`, committed with a
    /// zero value component.
    pub excess: Commitment,
    /// `(R, s)` proving knowledge of the excess's discrete log, over the challenge built by
    /// [`crypto::kernel_challenge`] against this kernel's own id.
    pub excess_sig: Signature,
}

impl TransactionKernel {
    /// The excess as a group element rather than a commitment, for challenge rebuilding and
    /// signature verification. A zero-value Pedersen commitment and a plain public key are the
    /// same curve point, so this is a reinterpretation, not a cryptographic operation.
    pub fn public_excess(&self) -> Option<PublicKey> {
        PublicKey::from_bytes(self.excess.as_bytes()).ok()
    }

    /// The kernel's own id (§3 data model, §4.4.6): `H(X, R, fee, minHeight, maxHeight, assetId)`.
    pub fn kernel_id(&self) -> Option<Vec<u8>> {
        let public_excess = self.public_excess()?;
        Some(crypto::kernel_id(
            &public_excess,
            self.excess_sig.get_public_nonce(),
            self.fee,
            self.min_height,
            self.lock_height,
            self.asset_id,
        ))
    }

    /// Rebuilds the challenge this kernel's signature must have been produced over — `c = H(X, R,
    /// kernelId)` (§4.4.8 step 10, P6) — and checks it verifies against the public excess.
    pub fn verify(&self) -> bool {
        let Some(public_excess) = self.public_excess() else {
            return false;
        };
        let Some(kernel_id) = self.kernel_id() else {
            return false;
        };
        let challenge = crypto::kernel_challenge(&public_excess, self.excess_sig.get_public_nonce(), &kernel_id);
        self.excess_sig.verify_challenge(&public_excess, &challenge)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_features_round_trip() {
        let f = KernelFeatures::DEFAULT;
        let json = serde_json::to_string(&f).unwrap();
        let back: KernelFeatures = serde_json::from_str(&json).unwrap();
        assert_eq!(f, back);
    }
}
