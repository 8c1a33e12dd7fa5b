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

//! The two challenges the protocol ever hashes (§6.3): the kernel excess-signature challenge,
//! shared by both parties during negotiation, and the payment-confirmation challenge the
//! receiver signs once it has observed the kernel on chain (§4.4.9).

use digest::Digest;
use nyx_common_types::{
    asset::AssetId,
    height::Height,
    types::{ChallengeHasher, PrivateKey, PublicKey, KERNEL_CHALLENGE_LABEL, KERNEL_ID_LABEL, PAYMENT_CONFIRMATION_LABEL},
};
use tari_utilities::ByteArray;

use crate::amount::Amount;

/// `c = H(label || X || R || kernelId)`, where `X` is the public excess and `R` is the aggregated
/// public nonce (§4.4.8, P6). Binding the challenge to `kernelId` rather than recomputing a
/// separate subset of the kernel's fields here keeps the signed message and the kernel lookup key
/// in lockstep — a kernel differing in `assetId`, `minHeight` or `maxHeight` but nothing else
/// signs a different challenge, since `kernelId` already commits to all four.
pub fn kernel_challenge(public_excess: &PublicKey, public_nonce: &PublicKey, kernel_id: &[u8]) -> Vec<u8> {
    let mut hasher = ChallengeHasher::new();
    hasher.update(KERNEL_CHALLENGE_LABEL);
    hasher.update(public_excess.as_bytes());
    hasher.update(public_nonce.as_bytes());
    hasher.update(kernel_id);
    hasher.finalize().to_vec()
}

/// `kernelId = H(label || X || R || fee || minHeight || maxHeight || assetId)` (§3 data model,
/// §4.4.6). Distinct from [`kernel_challenge`]: the id addresses the kernel for node lookups
/// (`registerTx`/`confirmKernel`, §4.6), the challenge is what the excess signature is over.
pub fn kernel_id(
    public_excess: &PublicKey,
    public_nonce: &PublicKey,
    fee: Amount,
    min_height: Height,
    max_height: Height,
    asset_id: AssetId,
) -> Vec<u8> {
    let mut hasher = ChallengeHasher::new();
    hasher.update(KERNEL_ID_LABEL);
    hasher.update(public_excess.as_bytes());
    hasher.update(public_nonce.as_bytes());
    hasher.update(fee.as_u64().to_le_bytes());
    hasher.update(min_height.as_u64().to_le_bytes());
    hasher.update(max_height.as_u64().to_le_bytes());
    hasher.update(asset_id.0.to_le_bytes());
    hasher.finalize().to_vec()
}

/// `H(label || kernelId || amount || senderPk)` (§4.4.9, §6.3): the message the receiver signs
/// to produce a payment proof once the kernel is confirmed on chain.
pub fn payment_confirmation_challenge(kernel_excess_bytes: &[u8], amount: Amount, sender_public_key: &PublicKey) -> Vec<u8> {
    let mut hasher = ChallengeHasher::new();
    hasher.update(PAYMENT_CONFIRMATION_LABEL);
    hasher.update(kernel_excess_bytes);
    hasher.update(amount.as_u64().to_le_bytes());
    hasher.update(sender_public_key.as_bytes());
    hasher.finalize().to_vec()
}

/// `X_me + X_peer` (and, by the same operation, `R_me + R_peer`): the two parties' public
/// excesses/nonces are curve points that aggregate by simple point addition (§4.4.5-6).
pub fn add_public_keys(a: &PublicKey, b: &PublicKey) -> PublicKey {
    a + b
}

/// `s_me + s_peer`, aggregating the two partial signature scalars into the final kernel
/// signature scalar (§4.4.9).
pub fn add_private_keys(a: &PrivateKey, b: &PrivateKey) -> PrivateKey {
    a + b
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn kernel_and_payment_challenges_never_collide_on_the_same_bytes() {
        let (_sk, pk) = PublicKey::random_keypair(&mut rand::rngs::OsRng);
        let id = kernel_id(&pk, &pk, Amount(1), Height(1), Height(1), AssetId::NATIVE);
        let a = kernel_challenge(&pk, &pk, &id);
        let b = payment_confirmation_challenge(&pk.as_bytes().to_vec(), Amount(1), &pk);
        assert_ne!(a, b);
    }

    #[test]
    fn kernel_challenge_changes_with_the_kernel_id() {
        let (_sk, pk) = PublicKey::random_keypair(&mut rand::rngs::OsRng);
        let native = kernel_id(&pk, &pk, Amount(5), Height(1), Height(10), AssetId::NATIVE);
        let other = kernel_id(&pk, &pk, Amount(5), Height(1), Height(10), AssetId::from(7));
        assert_ne!(kernel_challenge(&pk, &pk, &native), kernel_challenge(&pk, &pk, &other));
    }

    #[test]
    fn kernel_id_changes_with_asset_id() {
        let (_sk, pk) = PublicKey::random_keypair(&mut rand::rngs::OsRng);
        let native = kernel_id(&pk, &pk, Amount(5), Height(1), Height(10), AssetId::NATIVE);
        let other = kernel_id(&pk, &pk, Amount(5), Height(1), Height(10), AssetId::from(7));
        assert_ne!(native, other);
    }

    #[test]
    fn public_key_aggregation_is_commutative() {
        let (_a_sk, a_pk) = PublicKey::random_keypair(&mut rand::rngs::OsRng);
        let (_b_sk, b_pk) = PublicKey::random_keypair(&mut rand::rngs::OsRng);
        assert_eq!(add_public_keys(&a_pk, &b_pk), add_public_keys(&b_pk, &a_pk));
    }
}
