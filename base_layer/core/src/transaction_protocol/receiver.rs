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

//! The receiver's half of the negotiation (§4.4.2, §4.5 Initial(receiver)). Mirrors
//! [`super::sender`]: free functions over data the wallet crate assembles via the key keeper and
//! output manager, so this crate never touches a private scalar directly.

use nyx_common_types::{
    tx_id::TxId,
    types::{PrivateKey, PublicKey, Signature},
};

use crate::{
    amount::Amount,
    crypto,
    transaction_components::{TransactionInput, TransactionOutput},
    transaction_protocol::sender::SenderInvitation,
};

/// The receiver's reply, built from [`ReceiverReply`] plus whatever the receiver contributes
/// (new outputs, and optionally inputs for a self-tx split). Kept separate from
/// `sender::ReceiverReply` only by name at the call site; same shape, reused directly.
pub type ReceiverReply = crate::transaction_protocol::sender::ReceiverReply;

/// What the receiver checked before it agreed to sign (§4.5 "verify invitation").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiverInvitation {
    Accepted,
    ZeroAmount,
    ZeroFee,
    MinHeightInThePast(u64),
}

pub struct ReceiverTransactionProtocol;

impl ReceiverTransactionProtocol {
    /// §4.5 Initial(receiver, peer-initiated): "verify invitation (amount>0, fee>0, min height
    /// sane, asset id recognised)". Asset-id recognition is a wallet-level policy (it needs the
    /// set of assets the wallet tracks), so only the amount/fee/height checks live here.
    pub fn verify_invitation(invitation: &SenderInvitation, current_tip: nyx_common_types::height::Height) -> ReceiverInvitation {
        if invitation.amounts.is_empty() || invitation.amounts.iter().any(|a| *a == Amount::ZERO) {
            return ReceiverInvitation::ZeroAmount;
        }
        if invitation.fee == Amount::ZERO {
            return ReceiverInvitation::ZeroFee;
        }
        if invitation.min_height.as_u64() > 0 && invitation.min_height < current_tip {
            return ReceiverInvitation::MinHeightInThePast(invitation.min_height.as_u64());
        }
        ReceiverInvitation::Accepted
    }

    /// §4.4.5 `signReceiver`: build the challenge over the aggregated excess/nonce and return a
    /// signed reply. `x_me`/`r_me`/`s_me`/`offset` are the key keeper's output for this
    /// negotiation; `outputs`/`inputs` are whatever the receiver is contributing (new coins, and
    /// for a self-tx, the inputs too).
    #[allow(clippy::too_many_arguments)]
    pub fn build_reply(
        invitation: &SenderInvitation,
        x_me: PublicKey,
        r_me: PublicKey,
        s_me: PrivateKey,
        offset: PrivateKey,
        inputs: Vec<TransactionInput>,
        outputs: Vec<TransactionOutput>,
        max_height: nyx_common_types::height::Height,
        payment_confirmation: Option<Signature>,
    ) -> ReceiverReply {
        ReceiverReply {
            public_excess: x_me,
            public_nonce: r_me,
            partial_signature: s_me,
            inputs,
            outputs,
            offset,
            max_height,
            payment_confirmation,
        }
    }

    /// §4.4.9, §6.3: the payment-proof challenge the receiver signs once it knows the sender's
    /// public key, binding `(kernelId, amount, senderPeerId)`.
    pub fn payment_confirmation_challenge(kernel_excess_bytes: &[u8], amount: Amount, sender_public_key: &PublicKey) -> Vec<u8> {
        crypto::payment_confirmation_challenge(kernel_excess_bytes, amount, sender_public_key)
    }

    /// §4.5 "validate the payment-proof signature": verify a payment confirmation was produced
    /// by `receiver_public_key` over `(kernelId, amount, senderPeerId)` (§4.4.9, §6.3, P7).
    pub fn is_payment_confirmation_valid(
        payment_confirmation: &Signature,
        kernel_excess_bytes: &[u8],
        amount: Amount,
        sender_public_key: &PublicKey,
        receiver_public_key: &PublicKey,
    ) -> bool {
        let challenge = crypto::payment_confirmation_challenge(kernel_excess_bytes, amount, sender_public_key);
        payment_confirmation.verify_challenge(receiver_public_key, &challenge)
    }

    /// The challenge this receiver must sign to produce `s_me` (§4.4.5): same shared challenge
    /// the sender will independently recompute in `isPeerSignatureValid`/`finalize`.
    pub fn signing_challenge(x_me: &PublicKey, r_me: &PublicKey, invitation: &SenderInvitation, max_height: nyx_common_types::height::Height) -> Vec<u8> {
        let x = crypto::add_public_keys(x_me, &invitation.public_excess);
        let r = crypto::add_public_keys(r_me, &invitation.public_nonce);
        let kernel_id = crypto::kernel_id(&x, &r, invitation.fee, invitation.min_height, max_height, invitation.asset_id);
        crypto::kernel_challenge(&x, &r, &kernel_id)
    }

    pub fn tx_id(invitation: &SenderInvitation) -> TxId {
        invitation.tx_id
    }
}

#[cfg(test)]
mod test {
    use nyx_common_types::{asset::AssetId, height::Height};
    use rand::rngs::OsRng;

    use super::*;

    fn invitation() -> SenderInvitation {
        let (_sk, pk) = PublicKey::random_keypair(&mut OsRng);
        SenderInvitation {
            tx_id: TxId::new_random(),
            amounts: vec![Amount(1000)],
            fee: Amount(10),
            asset_id: AssetId::NATIVE,
            min_height: Height(5),
            max_height: Height(100),
            lifetime: 100,
            public_excess: pk.clone(),
            public_nonce: pk,
        }
    }

    #[test]
    fn rejects_zero_amount() {
        let mut inv = invitation();
        inv.amounts = vec![Amount::ZERO];
        assert_eq!(ReceiverTransactionProtocol::verify_invitation(&inv, Height(0)), ReceiverInvitation::ZeroAmount);
    }

    #[test]
    fn rejects_zero_fee() {
        let mut inv = invitation();
        inv.fee = Amount::ZERO;
        assert_eq!(ReceiverTransactionProtocol::verify_invitation(&inv, Height(0)), ReceiverInvitation::ZeroFee);
    }

    #[test]
    fn rejects_min_height_in_the_past() {
        let inv = invitation();
        assert_eq!(
            ReceiverTransactionProtocol::verify_invitation(&inv, Height(50)),
            ReceiverInvitation::MinHeightInThePast(5)
        );
    }

    #[test]
    fn accepts_a_sane_invitation() {
        let inv = invitation();
        assert_eq!(ReceiverTransactionProtocol::verify_invitation(&inv, Height(1)), ReceiverInvitation::Accepted);
    }

    #[test]
    fn payment_confirmation_round_trips() {
        let (sender_sk, sender_pk) = PublicKey::random_keypair(&mut OsRng);
        let (receiver_sk, receiver_pk) = PublicKey::random_keypair(&mut OsRng);
        let _ = sender_sk;
        let kernel_bytes = vec![1u8, 2, 3];
        let amount = Amount(500);
        let challenge = ReceiverTransactionProtocol::payment_confirmation_challenge(&kernel_bytes, amount, &sender_pk);
        let nonce = PrivateKey::random(&mut OsRng);
        let sig = Signature::sign_raw_uniform(&receiver_sk, nonce, &challenge).unwrap();
        assert!(ReceiverTransactionProtocol::is_payment_confirmation_valid(
            &sig,
            &kernel_bytes,
            amount,
            &sender_pk,
            &receiver_pk
        ));
    }
}
