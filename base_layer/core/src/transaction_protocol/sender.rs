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

//! The sender's half of the negotiation (§4.4, §4.5 Initial/Invitation(sender)). This builder is
//! deliberately free of any key-keeper or parameter-store dependency: the negotiation driver
//! (in the wallet crate) asks the key keeper for `X_me`/`R_me`/`s_me`/offset and feeds them in
//! here, so this crate never needs to know how a scalar was produced, only how to combine it.

use nyx_common_types::{
    asset::AssetId,
    height::Height,
    tx_id::TxId,
    types::{Commitment, PrivateKey, PublicKey, Signature},
};

use crate::{
    amount::Amount,
    crypto,
    transaction_components::{KernelFeatures, TransactionInput, TransactionKernel, TransactionOutput},
    transaction_protocol::error::ProtocolError,
};

/// The wire message emitted at the end of the sender's `Initial` phase (§4.5, §6.1).
#[derive(Debug, Clone)]
pub struct SenderInvitation {
    pub tx_id: TxId,
    pub amounts: Vec<Amount>,
    pub fee: Amount,
    pub asset_id: AssetId,
    pub min_height: Height,
    pub max_height: Height,
    pub lifetime: u64,
    pub public_excess: PublicKey,
    pub public_nonce: PublicKey,
}

/// What the sender needs back from the receiver before it can finalize (§4.4.5 `initial=false`,
/// §6.1 `InvitationConfirmation`).
#[derive(Debug, Clone)]
pub struct ReceiverReply {
    pub public_excess: PublicKey,
    pub public_nonce: PublicKey,
    pub partial_signature: PrivateKey,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub offset: PrivateKey,
    pub max_height: Height,
    pub payment_confirmation: Option<Signature>,
}

/// The immutable plan for this negotiation: amounts, fee, asset, heights and the sender's own
/// inputs/change (§4.3, §4.4 operations 1-3). Built once by the coin selector and output manager
/// in the wallet crate, then handed to every `SenderTransactionProtocol` call.
#[derive(Debug, Clone)]
pub struct SenderTransactionContext {
    pub tx_id: TxId,
    pub amounts: Vec<Amount>,
    pub fee: Amount,
    pub asset_id: AssetId,
    pub min_height: Height,
    pub max_height: Height,
    pub lifetime: u64,
    pub inputs: Vec<TransactionInput>,
    pub change_output: Option<TransactionOutput>,
}

impl SenderTransactionContext {
    pub fn total_amount(&self) -> Amount {
        self.amounts.iter().copied().sum()
    }
}

/// The assembled, verified result of a finished sender-side negotiation (§4.4.10).
#[derive(Debug, Clone)]
pub struct FinalizedSenderTransaction {
    pub kernel: TransactionKernel,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub offset: PrivateKey,
}

/// Stateless operations over a [`SenderTransactionContext`] (§4.4 operations 3, 6-10). Kept as
/// free functions rather than a state-carrying struct: the negotiation driver is itself the
/// state machine (§4.5, §9 "coroutine-style control flow") and re-derives everything from the
/// parameter store on every `update()`, so there is no in-memory state here worth hiding.
pub struct SenderTransactionProtocol;

impl SenderTransactionProtocol {
    /// §4.5 Initial(sender): package the negotiation's public terms for the wire.
    pub fn build_invitation(ctx: &SenderTransactionContext, public_excess: PublicKey, public_nonce: PublicKey) -> SenderInvitation {
        SenderInvitation {
            tx_id: ctx.tx_id,
            amounts: ctx.amounts.clone(),
            fee: ctx.fee,
            asset_id: ctx.asset_id,
            min_height: ctx.min_height,
            max_height: ctx.max_height,
            lifetime: ctx.lifetime,
            public_excess,
            public_nonce,
        }
    }

    /// §4.4.7 `updateMaxHeight`: resolve to the lowest of the local proposal, the peer's
    /// counter-proposal and `minHeight + lifetime`; reject if that falls below the current tip.
    pub fn update_max_height(ctx: &SenderTransactionContext, peer_max_height: Height, current_tip: Height) -> Result<Height, ProtocolError> {
        let lifetime_bound = ctx.min_height.saturating_add(ctx.lifetime);
        let resolved = ctx.max_height.min(peer_max_height).min(lifetime_bound);
        if resolved < current_tip {
            return Err(ProtocolError::MaxHeightIsUnacceptable(resolved.as_u64(), current_tip.as_u64()));
        }
        Ok(resolved)
    }

    /// §4.4.8 `isPeerSignatureValid`: `s_peer · G == R_peer + c · X_peer`, `c = H(X, R, kernelId)`
    /// (P6).
    pub fn is_peer_signature_valid(
        ctx: &SenderTransactionContext,
        x_me: &PublicKey,
        r_me: &PublicKey,
        max_height: Height,
        reply: &ReceiverReply,
    ) -> bool {
        let x = crypto::add_public_keys(x_me, &reply.public_excess);
        let r = crypto::add_public_keys(r_me, &reply.public_nonce);
        let kernel_id = crypto::kernel_id(&x, &r, ctx.fee, ctx.min_height, max_height, ctx.asset_id);
        let challenge = crypto::kernel_challenge(&x, &r, &kernel_id);
        let candidate = Signature::new(reply.public_nonce.clone(), reply.partial_signature.clone());
        candidate.verify_challenge(&reply.public_excess, &challenge)
    }

    /// §4.4.6, §4.4.9, §4.4.10: build the kernel over the aggregated excess/nonce, aggregate the
    /// two partial signatures, verify the result, and assemble the finished transaction. Callers
    /// must have already checked [`Self::is_peer_signature_valid`] and
    /// [`Self::update_max_height`] — this does not re-derive `max_height`, it takes the already
    /// agreed value so the kernel challenge matches the one `is_peer_signature_valid` checked.
    pub fn finalize(
        ctx: &SenderTransactionContext,
        x_me: &PublicKey,
        r_me: &PublicKey,
        s_me: &PrivateKey,
        offset_me: &PrivateKey,
        max_height: Height,
        reply: &ReceiverReply,
    ) -> Result<FinalizedSenderTransaction, ProtocolError> {
        let x = crypto::add_public_keys(x_me, &reply.public_excess);
        let r = crypto::add_public_keys(r_me, &reply.public_nonce);
        let s = crypto::add_private_keys(s_me, &reply.partial_signature);
        let excess = Commitment::from_public_key(&x);
        let kernel = TransactionKernel {
            features: KernelFeatures::DEFAULT,
            fee: ctx.fee,
            min_height: ctx.min_height,
            lock_height: max_height,
            asset_id: ctx.asset_id,
            excess,
            excess_sig: Signature::new(r, s),
        };
        if !kernel.verify() {
            return Err(ProtocolError::InvalidPartialSignature);
        }
        let mut outputs = Vec::new();
        if let Some(change) = &ctx.change_output {
            outputs.push(change.clone());
        }
        outputs.extend(reply.outputs.iter().cloned());

        let mut inputs = ctx.inputs.clone();
        inputs.extend(reply.inputs.iter().cloned());

        let offset = crypto::add_private_keys(offset_me, &reply.offset);

        Ok(FinalizedSenderTransaction {
            kernel,
            inputs,
            outputs,
            offset,
        })
    }
}

#[cfg(test)]
mod test {
    use rand::rngs::OsRng;

    use super::*;

    fn ctx(fee: Amount, min_height: Height, max_height: Height, lifetime: u64) -> SenderTransactionContext {
        SenderTransactionContext {
            tx_id: TxId::new_random(),
            amounts: vec![Amount(1_000_000)],
            fee,
            asset_id: AssetId::NATIVE,
            min_height,
            max_height,
            lifetime,
            inputs: vec![],
            change_output: None,
        }
    }

    fn schnorr_partial(excess: &PrivateKey, nonce: &PrivateKey, challenge: &[u8]) -> PrivateKey {
        Signature::sign_raw_uniform(excess, nonce.clone(), challenge).unwrap().get_signature().clone()
    }

    #[test]
    fn happy_path_produces_a_valid_kernel() {
        let fee = Amount(100);
        let max_height = Height(1000);
        let c = ctx(fee, Height(100), max_height, 500);

        let (x_me_sk, x_me) = PublicKey::random_keypair(&mut OsRng);
        let (r_me_sk, r_me) = PublicKey::random_keypair(&mut OsRng);
        let (x_peer_sk, x_peer) = PublicKey::random_keypair(&mut OsRng);
        let (r_peer_sk, r_peer) = PublicKey::random_keypair(&mut OsRng);

        let x = crypto::add_public_keys(&x_me, &x_peer);
        let r = crypto::add_public_keys(&r_me, &r_peer);
        let kernel_id = crypto::kernel_id(&x, &r, fee, c.min_height, max_height, c.asset_id);
        let challenge = crypto::kernel_challenge(&x, &r, &kernel_id);

        let s_me = schnorr_partial(&x_me_sk, &r_me_sk, &challenge);
        let s_peer = schnorr_partial(&x_peer_sk, &r_peer_sk, &challenge);

        let reply = ReceiverReply {
            public_excess: x_peer,
            public_nonce: r_peer,
            partial_signature: s_peer,
            inputs: vec![],
            outputs: vec![],
            offset: PrivateKey::default(),
            max_height,
            payment_confirmation: None,
        };

        assert!(SenderTransactionProtocol::is_peer_signature_valid(&c, &x_me, &r_me, max_height, &reply));

        let finalized =
            SenderTransactionProtocol::finalize(&c, &x_me, &r_me, &s_me, &PrivateKey::default(), max_height, &reply).unwrap();
        assert!(finalized.kernel.verify());
    }

    #[test]
    fn tampered_partial_signature_is_rejected() {
        let fee = Amount(100);
        let max_height = Height(1000);
        let c = ctx(fee, Height(100), max_height, 500);

        let (x_me_sk, x_me) = PublicKey::random_keypair(&mut OsRng);
        let (r_me_sk, r_me) = PublicKey::random_keypair(&mut OsRng);
        let (x_peer_sk, x_peer) = PublicKey::random_keypair(&mut OsRng);
        let (r_peer_sk, r_peer) = PublicKey::random_keypair(&mut OsRng);

        let x = crypto::add_public_keys(&x_me, &x_peer);
        let r = crypto::add_public_keys(&r_me, &r_peer);
        let kernel_id = crypto::kernel_id(&x, &r, fee, c.min_height, max_height, c.asset_id);
        let challenge = crypto::kernel_challenge(&x, &r, &kernel_id);

        let _s_me = schnorr_partial(&x_me_sk, &r_me_sk, &challenge);
        let s_peer_honest = schnorr_partial(&x_peer_sk, &r_peer_sk, &challenge);
        let (tamper, _) = PublicKey::random_keypair(&mut OsRng);
        let s_peer = crypto::add_private_keys(&s_peer_honest, &tamper);

        let reply = ReceiverReply {
            public_excess: x_peer,
            public_nonce: r_peer,
            partial_signature: s_peer,
            inputs: vec![],
            outputs: vec![],
            offset: PrivateKey::default(),
            max_height,
            payment_confirmation: None,
        };

        assert!(!SenderTransactionProtocol::is_peer_signature_valid(&c, &x_me, &r_me, max_height, &reply));
    }

    #[test]
    fn max_height_below_tip_is_rejected() {
        let c = ctx(Amount(10), Height(100), Height(500), 50);
        let result = SenderTransactionProtocol::update_max_height(&c, Height(400), Height(1000));
        assert!(matches!(result, Err(ProtocolError::MaxHeightIsUnacceptable(_, _))));
    }

    #[test]
    fn max_height_resolves_to_the_tightest_bound() {
        let c = ctx(Amount(10), Height(100), Height(900), 50);
        // lifetime bound (150) < peer proposal (800) < local proposal (900)
        let resolved = SenderTransactionProtocol::update_max_height(&c, Height(800), Height(10)).unwrap();
        assert_eq!(resolved, Height(150));
    }
}
