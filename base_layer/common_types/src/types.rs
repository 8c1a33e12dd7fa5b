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

//! Crypto primitives assumed available as black boxes (§6.3): a scalar field, a group with a
//! distinguished generator, a Pedersen commitment scheme and a Schnorr signature scheme. The
//! concrete instantiation is Ristretto255 via `tari_crypto`; nothing above this module should
//! depend on that choice.

use tari_crypto::{
    common::Blake256,
    ristretto::{
        pedersen::{PedersenCommitment, PedersenCommitmentFactory},
        RistrettoPublicKey,
        RistrettoSchnorr,
        RistrettoSecretKey,
    },
};

/// The secret scalar type: blinding factors, excesses, nonces and partial signatures are all
/// scalars.
pub type PrivateKey = RistrettoSecretKey;
pub type BlindingFactor = RistrettoSecretKey;

/// The group element type: public excesses and public nonces.
pub type PublicKey = RistrettoPublicKey;

/// `value * H + blinding * G`.
pub type Commitment = PedersenCommitment;
pub type CommitmentFactory = PedersenCommitmentFactory;

/// A Schnorr signature `(R, s)`.
pub type Signature = RistrettoSchnorr;

/// Hash function backing both the kernel challenge `c = H(X, R, kernelId)` and the payment
/// confirmation challenge `H("PaymentConfirmation" || kernelId || amount || senderPk)` (§6.3).
pub type ChallengeHasher = Blake256;

/// A 32-byte domain-separation tag, prepended to the message before hashing so that a kernel
/// challenge and a payment-confirmation challenge can never collide even given the same bytes.
pub const KERNEL_CHALLENGE_LABEL: &[u8] = b"nyx/kernel_challenge/v1";
pub const PAYMENT_CONFIRMATION_LABEL: &[u8] = b"nyx/payment_confirmation/v1";
pub const KERNEL_ID_LABEL: &[u8] = b"nyx/kernel_id/v1";
