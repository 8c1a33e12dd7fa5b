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

use crate::amount::Amount;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct OutputFeatures: u8 {
        const DEFAULT = 0;
        const COINBASE = 0b0000_0001;
    }
}

/// A new coin created by a negotiation (§3 Coin model, §4.3, §4.4). The committed value is never
/// visible on the wire; it is carried alongside the commitment only inside the party that knows
/// the blinding factor, for bookkeeping in the coin selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    pub commitment: Commitment,
    pub features: OutputFeatures,
    pub asset_id: AssetId,
    pub maturity: Height,
}

/// The plaintext value and blinding factor behind a [`TransactionOutput`], known only to its
/// owner (§3, §4.3). Never serialized onto the wire as a unit; the commitment is what travels.
#[derive(Debug, Clone)]
pub struct UnblindedOutput {
    pub value: Amount,
    pub blinding_factor: nyx_common_types::types::BlindingFactor,
    pub features: OutputFeatures,
    pub asset_id: AssetId,
    pub maturity: Height,
}

impl UnblindedOutput {
    pub fn commit(&self) -> Commitment {
        use nyx_common_types::types::CommitmentFactory;
        CommitmentFactory::default().commit_value(&self.blinding_factor, self.value.as_u64())
    }

    pub fn as_transaction_output(&self) -> TransactionOutput {
        TransactionOutput {
            commitment: self.commit(),
            features: self.features,
            asset_id: self.asset_id,
            maturity: self.maturity,
        }
    }
}
