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

use nyx_common_types::{asset::AssetId, height::Height, types::Commitment};
use serde::{Deserialize, Serialize};

/// A spendable reference to a previously created [`super::output::TransactionOutput`] (§3 Coin
/// model, §4.3). The protocol never needs more than the commitment to build or verify a
/// negotiation; anything else (script, proof) belongs to the chain layer and is out of scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub commitment: Commitment,
    pub asset_id: AssetId,
    /// The height this coin becomes spendable at; `0` for an ordinary (non-coinbase) output.
    pub maturity: Height,
}

impl TransactionInput {
    pub fn is_mature_at(&self, tip: Height) -> bool {
        tip.as_u64() >= self.maturity.as_u64()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use nyx_common_types::types::{Commitment, CommitmentFactory, PublicKey};

    fn dummy_commitment() -> Commitment {
        let (sk, _pk) = PublicKey::random_keypair(&mut rand::rngs::OsRng);
        CommitmentFactory::default().commit_value(&sk, 0)
    }

    #[test]
    fn maturity_gate() {
        let input = TransactionInput {
            commitment: dummy_commitment(),
            asset_id: AssetId::NATIVE,
            maturity: Height(100),
        };
        assert!(!input.is_mature_at(Height(50)));
        assert!(input.is_mature_at(Height(100)));
        assert!(input.is_mature_at(Height(200)));
    }
}
