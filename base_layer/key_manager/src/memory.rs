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

//! A software key keeper (§4.2): every scalar is derived deterministically from a master seed, so
//! nothing needs to be persisted except the seed itself and the nonce-slot reuse table
//! ([`crate::nonce_store`]). Suitable as the wallet's default keeper and as the test double for
//! anything that exercises the real negotiation crypto end to end.

use std::sync::Arc;

use blake2::{Blake2b512, Digest};
use nyx_common_types::{
    address::WalletId,
    types::{PrivateKey, PublicKey, Signature},
};
use nyx_core::crypto as protocol_crypto;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::{
    error::KeyKeeperError,
    keeper::KeyKeeper,
    nonce_store::{InMemoryNonceStore, NonceStore},
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

const DOMAIN_COIN: &[u8] = b"nyx/key-manager/coin/v1";
const DOMAIN_SBBS: &[u8] = b"nyx/key-manager/sbbs/v1";
const DOMAIN_SENDER_EXCESS: &[u8] = b"nyx/key-manager/sender-excess/v1";
const DOMAIN_SENDER_OFFSET: &[u8] = b"nyx/key-manager/sender-offset/v1";
const DOMAIN_RECEIVER_EXCESS: &[u8] = b"nyx/key-manager/receiver-excess/v1";
const DOMAIN_RECEIVER_OFFSET: &[u8] = b"nyx/key-manager/receiver-offset/v1";
const DOMAIN_ASSET_EXCESS: &[u8] = b"nyx/key-manager/asset-excess/v1";
const DOMAIN_NONCE: &[u8] = b"nyx/key-manager/nonce/v1";

/// Deterministic, seed-derived key keeper. Holds a 32-byte master seed and the own wallet id its
/// payment-proof key is bound to; everything else is re-derived on every call rather than stored.
pub struct MemoryKeyKeeper {
    seed: [u8; 32],
    own_wallet_id: WalletId,
    nonces: Arc<dyn NonceStore>,
}

impl MemoryKeyKeeper {
    pub fn new(seed: [u8; 32], own_wallet_id: WalletId) -> Self {
        MemoryKeyKeeper {
            seed,
            own_wallet_id,
            nonces: Arc::new(InMemoryNonceStore::new()),
        }
    }

    pub fn with_nonce_store(seed: [u8; 32], own_wallet_id: WalletId, nonces: Arc<dyn NonceStore>) -> Self {
        MemoryKeyKeeper { seed, own_wallet_id, nonces }
    }

    /// `ChaCha20Rng` seeded from `blake2b(seed || domain || id)`, then one scalar drawn from it.
    /// Same `(domain, id)` always yields the same scalar (§8 P3 invariant 1); different `domain`s
    /// can never collide because the label is hashed in before the id bytes.
    fn derive_scalar(&self, domain: &[u8], id: &[u8]) -> PrivateKey {
        let mut hasher = Blake2b512::new();
        hasher.update(domain);
        hasher.update(&self.seed);
        hasher.update(id);
        let digest = hasher.finalize();
        let mut rng_seed = [0u8; 32];
        rng_seed.copy_from_slice(&digest[..32]);
        let mut rng = ChaCha20Rng::from_seed(rng_seed);
        PrivateKey::random(&mut rng)
    }

    fn coin_scalar(&self, coin_id: CoinId) -> PrivateKey {
        self.derive_scalar(DOMAIN_COIN, &coin_id.0.to_le_bytes())
    }

    fn nonce_scalar(&self, slot: NonceSlotId) -> PrivateKey {
        self.derive_scalar(DOMAIN_NONCE, &slot.0.to_le_bytes())
    }

    fn tx_id_bytes(tx_id: nyx_common_types::tx_id::TxId, sub_tx_id: u64) -> Vec<u8> {
        let mut bytes = tx_id.as_u128().to_le_bytes().to_vec();
        bytes.extend_from_slice(&sub_tx_id.to_le_bytes());
        bytes
    }

    /// Signs `challenge` with `(excess, nonce)`, after registering the nonce slot's use — this is
    /// the one path every signing operation funnels through so P3 is enforced in exactly one
    /// place.
    fn sign_with_slot(&self, slot: NonceSlotId, excess: &PrivateKey, challenge: &[u8]) -> Result<PrivateKey, KeyKeeperError> {
        self.nonces.record_use(slot, challenge)?;
        let nonce = self.nonce_scalar(slot);
        let signature = Signature::sign_raw_uniform(excess, nonce, challenge).map_err(|_| KeyKeeperError::Unspecified)?;
        Ok(signature.get_signature().clone())
    }
}

impl KeyKeeper for MemoryKeyKeeper {
    fn derive_sbbs_key(&self, own_id: WalletId) -> Result<PrivateKey, KeyKeeperError> {
        Ok(self.derive_scalar(DOMAIN_SBBS, &own_id.0))
    }

    fn generate_public_keys(&self, coin_ids: &[CoinId], _create_coin_key: bool) -> Result<Vec<PublicKey>, KeyKeeperError> {
        Ok(coin_ids.iter().map(|id| PublicKey::from_secret_key(&self.coin_scalar(*id))).collect())
    }

    fn generate_outputs(&self, _request: GenerateOutputsRequest, specs: &[OutputSpec]) -> Result<Vec<nyx_core::transaction_components::UnblindedOutput>, KeyKeeperError> {
        Ok(specs
            .iter()
            .map(|spec| nyx_core::transaction_components::UnblindedOutput {
                value: spec.value,
                blinding_factor: self.coin_scalar(spec.coin_id),
                features: spec.features,
                asset_id: spec.asset_id,
                maturity: spec.maturity,
            })
            .collect())
    }

    fn sign_sender(&self, request: SignSenderRequest) -> Result<SignSenderResponse, KeyKeeperError> {
        let id_bytes = Self::tx_id_bytes(request.tx_id, request.sub_tx_id);
        let excess = self.derive_scalar(DOMAIN_SENDER_EXCESS, &id_bytes);
        let offset = self.derive_scalar(DOMAIN_SENDER_OFFSET, &id_bytes);
        let public_excess = PublicKey::from_secret_key(&excess);
        let public_nonce = PublicKey::from_secret_key(&self.nonce_scalar(request.nonce_slot));

        let partial_signature = match &request.challenge {
            None => None,
            Some(challenge) => Some(self.sign_with_slot(request.nonce_slot, &excess, challenge)?),
        };

        Ok(SignSenderResponse {
            public_excess,
            public_nonce,
            offset,
            partial_signature,
        })
    }

    fn sign_receiver(&self, request: SignReceiverRequest) -> Result<SignReceiverResponse, KeyKeeperError> {
        let id_bytes = Self::tx_id_bytes(request.tx_id, request.sub_tx_id);
        let excess = self.derive_scalar(DOMAIN_RECEIVER_EXCESS, &id_bytes);
        let offset = self.derive_scalar(DOMAIN_RECEIVER_OFFSET, &id_bytes);
        let public_excess = PublicKey::from_secret_key(&excess);
        let public_nonce = PublicKey::from_secret_key(&self.nonce_scalar(request.nonce_slot));

        if request.initial {
            return Ok(SignReceiverResponse {
                public_excess,
                public_nonce,
                offset,
                partial_signature: None,
                payment_proof: None,
            });
        }

        let challenge = request.challenge.ok_or(KeyKeeperError::Unspecified)?;
        let proof_inputs = request.payment_proof_inputs.ok_or(KeyKeeperError::Unspecified)?;
        let partial_signature = self.sign_with_slot(request.nonce_slot, &excess, &challenge)?;

        let sbbs_key = self.derive_sbbs_key(self.own_wallet_id)?;
        let payment_challenge = protocol_crypto::payment_confirmation_challenge(
            &proof_inputs.kernel_excess_bytes,
            proof_inputs.amount,
            &proof_inputs.sender_public_key,
        );
        let proof_nonce = PrivateKey::random(&mut rand::rngs::OsRng);
        let payment_proof = Signature::sign_raw_uniform(&sbbs_key, proof_nonce, &payment_challenge).map_err(|_| KeyKeeperError::Unspecified)?;

        Ok(SignReceiverResponse {
            public_excess,
            public_nonce,
            offset,
            partial_signature: Some(partial_signature),
            payment_proof: Some(payment_proof),
        })
    }

    fn sign_asset_kernel(&self, request: SignAssetKernelRequest) -> Result<SignAssetKernelResponse, KeyKeeperError> {
        let id_bytes = request.tx_id.as_u128().to_le_bytes();
        let excess = self.derive_scalar(DOMAIN_ASSET_EXCESS, &id_bytes);
        let public_excess = PublicKey::from_secret_key(&excess);
        let public_nonce = PublicKey::from_secret_key(&self.nonce_scalar(request.nonce_slot));
        let partial_signature = self.sign_with_slot(request.nonce_slot, &excess, &request.challenge)?;

        Ok(SignAssetKernelResponse {
            public_excess,
            public_nonce,
            partial_signature,
        })
    }

    fn allocate_nonce_slot(&self) -> Result<NonceSlotId, KeyKeeperError> {
        Ok(self.nonces.allocate())
    }

    fn generate_nonce(&self, slot: NonceSlotId) -> Result<PublicKey, KeyKeeperError> {
        Ok(PublicKey::from_secret_key(&self.nonce_scalar(slot)))
    }
}

#[cfg(test)]
mod test {
    use nyx_common_types::{asset::AssetId, height::Height, tx_id::TxId};
    use nyx_core::{transaction_components::OutputFeatures, Amount};

    use super::*;

    fn keeper() -> MemoryKeyKeeper {
        MemoryKeyKeeper::new([7u8; 32], WalletId([1u8; 32]))
    }

    #[test]
    fn derive_sbbs_key_is_deterministic() {
        let k = keeper();
        let id = WalletId([9u8; 32]);
        assert_eq!(k.derive_sbbs_key(id).unwrap(), k.derive_sbbs_key(id).unwrap());
    }

    #[test]
    fn different_coin_ids_derive_different_keys() {
        let k = keeper();
        let keys = k.generate_public_keys(&[CoinId(1), CoinId(2)], false).unwrap();
        assert_ne!(keys[0], keys[1]);
    }

    #[test]
    fn generate_outputs_round_trips_value_and_commitment() {
        let k = keeper();
        let spec = OutputSpec {
            coin_id: CoinId(42),
            value: Amount(1234),
            features: OutputFeatures::DEFAULT,
            asset_id: AssetId::NATIVE,
            maturity: Height(0),
        };
        let outputs = k.generate_outputs(GenerateOutputsRequest { scheme_height: Height(0) }, &[spec]).unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].value, Amount(1234));
        assert_eq!(outputs[0].as_transaction_output().commitment, outputs[0].commit());
    }

    #[test]
    fn sign_sender_initial_then_final_reuses_the_same_excess_and_nonce() {
        let k = keeper();
        let tx_id = TxId::new_random();
        let slot = k.allocate_nonce_slot().unwrap();
        let initial = k
            .sign_sender(SignSenderRequest { tx_id, sub_tx_id: 0, nonce_slot: slot, initial: true, challenge: None })
            .unwrap();
        assert!(initial.partial_signature.is_none());

        let final_response = k
            .sign_sender(SignSenderRequest {
                tx_id,
                sub_tx_id: 0,
                nonce_slot: slot,
                initial: false,
                challenge: Some(vec![1, 2, 3]),
            })
            .unwrap();
        assert_eq!(initial.public_excess, final_response.public_excess);
        assert_eq!(initial.public_nonce, final_response.public_nonce);
        assert!(final_response.partial_signature.is_some());
    }

    #[test]
    fn resigning_the_same_challenge_on_a_slot_is_idempotent() {
        let k = keeper();
        let tx_id = TxId::new_random();
        let slot = k.allocate_nonce_slot().unwrap();
        let request = |challenge: Vec<u8>| SignSenderRequest {
            tx_id,
            sub_tx_id: 0,
            nonce_slot: slot,
            initial: false,
            challenge: Some(challenge),
        };
        let first = k.sign_sender(request(vec![9, 9, 9])).unwrap();
        let second = k.sign_sender(request(vec![9, 9, 9])).unwrap();
        assert_eq!(first.partial_signature, second.partial_signature);
    }

    #[test]
    fn resigning_a_different_challenge_on_a_slot_is_rejected() {
        let k = keeper();
        let tx_id = TxId::new_random();
        let slot = k.allocate_nonce_slot().unwrap();
        let request = |challenge: Vec<u8>| SignSenderRequest {
            tx_id,
            sub_tx_id: 0,
            nonce_slot: slot,
            initial: false,
            challenge: Some(challenge),
        };
        k.sign_sender(request(vec![1])).unwrap();
        let result = k.sign_sender(request(vec![2]));
        assert!(matches!(result, Err(KeyKeeperError::NonceSlotReused(_))));
    }

    #[test]
    fn sign_receiver_initial_peek_does_not_consume_the_nonce_slot() {
        let k = keeper();
        let tx_id = TxId::new_random();
        let slot = k.allocate_nonce_slot().unwrap();
        let peek = k
            .sign_receiver(SignReceiverRequest {
                tx_id,
                sub_tx_id: 0,
                nonce_slot: slot,
                initial: true,
                challenge: None,
                payment_proof_inputs: None,
            })
            .unwrap();
        assert!(peek.partial_signature.is_none());
        assert!(peek.payment_proof.is_none());

        let sender_key = PublicKey::from_secret_key(&PrivateKey::random(&mut rand::rngs::OsRng));
        let final_response = k
            .sign_receiver(SignReceiverRequest {
                tx_id,
                sub_tx_id: 0,
                nonce_slot: slot,
                initial: false,
                challenge: Some(vec![1, 2, 3]),
                payment_proof_inputs: Some(crate::requests::PaymentProofInputs {
                    amount: Amount(5),
                    kernel_excess_bytes: vec![7, 7, 7],
                    sender_public_key: sender_key,
                }),
            })
            .unwrap();
        assert_eq!(peek.public_excess, final_response.public_excess);
        assert_eq!(peek.public_nonce, final_response.public_nonce);
        assert!(final_response.partial_signature.is_some());
        assert!(final_response.payment_proof.is_some());
    }

    #[test]
    fn sign_receiver_final_call_without_a_challenge_is_rejected() {
        let k = keeper();
        let tx_id = TxId::new_random();
        let slot = k.allocate_nonce_slot().unwrap();
        let result = k.sign_receiver(SignReceiverRequest {
            tx_id,
            sub_tx_id: 0,
            nonce_slot: slot,
            initial: false,
            challenge: None,
            payment_proof_inputs: None,
        });
        assert!(matches!(result, Err(KeyKeeperError::Unspecified)));
    }
}
