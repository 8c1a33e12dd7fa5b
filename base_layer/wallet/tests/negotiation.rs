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

//! End-to-end negotiation runs driven entirely through [`nyx_wallet::test_utils`], one pair of
//! in-memory wallets exchanging parameters over a [`LoopbackGateway`] rather than a real
//! transport or chain.

use std::sync::Arc;

use chrono::Utc;
use nyx_common_types::{address::WalletId, asset::AssetId, height::Height, types::{CommitmentFactory, PrivateKey}};
use nyx_core::Amount;
use nyx_test_utils::unpack_enum;
use nyx_wallet::{
    coin::{Coin, SpendStatus},
    gateway::{Gateway, RegisterTxVerdict},
    record::TransactionRecord,
    test_utils::{test_wallet, LoopbackGateway, TestWallet},
    NextTrigger,
    TerminalStatus,
    UpdateOutcome,
};

fn seed_coin(wallet: &TestWallet, value: u64) -> nyx_key_manager::CoinId {
    let id = wallet.coins.next_coin_id().unwrap();
    wallet
        .coins
        .insert(Coin {
            id,
            commitment: CommitmentFactory::default().commit_value(&PrivateKey::default(), value),
            value: Amount(value),
            asset_id: AssetId::NATIVE,
            maturity: Height(0),
            status: SpendStatus::Available,
            reserved_for: None,
            created_at: Utc::now(),
        })
        .unwrap();
    id
}

/// Wires two freshly built wallets' loopback gateways to each other: each gateway's own record
/// writes (`registerTx`'s verdict) land on its own wallet, and each gateway's peer delivery lands
/// on the other wallet.
async fn connect(a: &TestWallet, gateway_a: &LoopbackGateway, b: &TestWallet, gateway_b: &LoopbackGateway) {
    gateway_a.bind_own_store(a.store.clone()).await;
    gateway_a.connect_peer(b.wallet_id, b.store.clone()).await;
    gateway_b.bind_own_store(b.store.clone()).await;
    gateway_b.connect_peer(a.wallet_id, a.store.clone()).await;
}

fn confirm_kernel(wallet: &TestWallet, tx_id: nyx_common_types::tx_id::TxId, height: u64) {
    TransactionRecord::new(wallet.store.clone(), tx_id).set_kernel_proof_height(Height(height)).unwrap();
}

#[tokio::test]
async fn two_party_happy_path_completes_on_both_sides() {
    let gateway_a = Arc::new(LoopbackGateway::new());
    let gateway_b = Arc::new(LoopbackGateway::new());
    let wallet_a = test_wallet([1u8; 32], WalletId([1u8; 32]), gateway_a.clone() as Arc<dyn Gateway>);
    let wallet_b = test_wallet([2u8; 32], WalletId([2u8; 32]), gateway_b.clone() as Arc<dyn Gateway>);
    connect(&wallet_a, &gateway_a, &wallet_b, &gateway_b).await;

    seed_coin(&wallet_a, 2_000);
    let tip = Height(1);
    let tx_id = wallet_a
        .driver
        .create_send(wallet_b.wallet_id, vec![Amount(1_000)], Amount(10), AssetId::NATIVE, Height(0), 100)
        .unwrap();

    // Sender: Initial -> Invitation, delivers straight onto B's store.
    assert_eq!(wallet_a.driver.update(tx_id, tip).await.unwrap(), UpdateOutcome::Continue(NextTrigger::NextTip));
    // Receiver: Initial -> KernelConfirmation (both sides advertise PROTOCOL_VERSION 2), replies onto A's store.
    assert_eq!(wallet_b.driver.update(tx_id, tip).await.unwrap(), UpdateOutcome::Continue(NextTrigger::PeerParamWrite));
    // Sender: Invitation -> Registration, registers against its own store via the loopback gateway.
    assert_eq!(wallet_a.driver.update(tx_id, tip).await.unwrap(), UpdateOutcome::Continue(NextTrigger::PeerParamWrite));
    // Sender: Registration -> KernelConfirmation.
    assert_eq!(wallet_a.driver.update(tx_id, tip).await.unwrap(), UpdateOutcome::Continue(NextTrigger::NextTip));

    confirm_kernel(&wallet_a, tx_id, 50);
    confirm_kernel(&wallet_b, tx_id, 50);

    assert_eq!(wallet_a.driver.update(tx_id, tip).await.unwrap(), UpdateOutcome::Done(TerminalStatus::Completed));
    assert_eq!(wallet_b.driver.update(tx_id, tip).await.unwrap(), UpdateOutcome::Done(TerminalStatus::Completed));

    // Change lands back with A, available once the kernel confirms.
    let change: Vec<_> = wallet_a.coins.all().unwrap().into_iter().filter(|c| c.status == SpendStatus::Available).collect();
    assert_eq!(change.len(), 1);
    assert_eq!(change[0].value, Amount(990));
    // B's new coin is available for the same amount the sender asked to pay.
    let received: Vec<_> = wallet_b.coins.all().unwrap().into_iter().filter(|c| c.status == SpendStatus::Available).collect();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].value, Amount(1_000));
}

#[tokio::test]
async fn asset_transfer_completes_for_a_non_native_asset() {
    let gateway_a = Arc::new(LoopbackGateway::new());
    let gateway_b = Arc::new(LoopbackGateway::new());
    let wallet_a = test_wallet([3u8; 32], WalletId([3u8; 32]), gateway_a.clone() as Arc<dyn Gateway>);
    let wallet_b = test_wallet([4u8; 32], WalletId([4u8; 32]), gateway_b.clone() as Arc<dyn Gateway>);
    connect(&wallet_a, &gateway_a, &wallet_b, &gateway_b).await;

    let asset_id = AssetId(7);
    let id = wallet_a.coins.next_coin_id().unwrap();
    wallet_a
        .coins
        .insert(Coin {
            id,
            commitment: CommitmentFactory::default().commit_value(&PrivateKey::default(), 500),
            value: Amount(500),
            asset_id,
            maturity: Height(0),
            status: SpendStatus::Available,
            reserved_for: None,
            created_at: Utc::now(),
        })
        .unwrap();

    let tip = Height(1);
    let tx_id = wallet_a.driver.create_send(wallet_b.wallet_id, vec![Amount(200)], Amount(5), asset_id, Height(0), 100).unwrap();

    wallet_a.driver.update(tx_id, tip).await.unwrap();
    wallet_b.driver.update(tx_id, tip).await.unwrap();
    wallet_a.driver.update(tx_id, tip).await.unwrap();
    wallet_a.driver.update(tx_id, tip).await.unwrap();

    confirm_kernel(&wallet_a, tx_id, 10);
    confirm_kernel(&wallet_b, tx_id, 10);

    assert_eq!(wallet_a.driver.update(tx_id, tip).await.unwrap(), UpdateOutcome::Done(TerminalStatus::Completed));
    assert_eq!(wallet_b.driver.update(tx_id, tip).await.unwrap(), UpdateOutcome::Done(TerminalStatus::Completed));

    let received: Vec<_> = wallet_b.coins.all().unwrap().into_iter().filter(|c| c.status == SpendStatus::Available).collect();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].asset_id, asset_id);
    assert_eq!(received[0].value, Amount(200));
}

#[tokio::test]
async fn self_tx_split_completes_in_one_record() {
    let gateway = Arc::new(LoopbackGateway::new());
    let wallet = test_wallet([5u8; 32], WalletId([5u8; 32]), gateway.clone() as Arc<dyn Gateway>);
    gateway.bind_own_store(wallet.store.clone()).await;

    // A self-tx targets one of the wallet's own addresses (§4.5 Role::SelfTx).
    wallet.addresses.register_owned(nyx_common_types::address::Address::new_owned(wallet.wallet_id, Utc::now())).unwrap();
    seed_coin(&wallet, 1_000);

    let tip = Height(1);
    let tx_id = wallet.driver.create_send(wallet.wallet_id, vec![Amount(300)], Amount(5), AssetId::NATIVE, Height(0), 100).unwrap();

    // SelfTx: Initial -> Registration, both halves signed from a single nonce slot.
    assert_eq!(wallet.driver.update(tx_id, tip).await.unwrap(), UpdateOutcome::Continue(NextTrigger::NextTip));
    // Registration -> KernelConfirmation, registered against its own store by the loopback gateway.
    assert_eq!(wallet.driver.update(tx_id, tip).await.unwrap(), UpdateOutcome::Continue(NextTrigger::NextTip));

    confirm_kernel(&wallet, tx_id, 20);
    assert_eq!(wallet.driver.update(tx_id, tip).await.unwrap(), UpdateOutcome::Done(TerminalStatus::Completed));

    let available: Vec<_> = wallet.coins.all().unwrap().into_iter().filter(|c| c.status == SpendStatus::Available).collect();
    // Change (695) plus the newly received split amount (300): the original 1000 minus the 5 fee.
    let total: u64 = available.iter().map(|c| c.value.as_u64()).sum();
    assert_eq!(total, 995);
}

#[tokio::test]
async fn tampered_peer_signature_is_rejected() {
    let gateway_a = Arc::new(LoopbackGateway::new());
    let gateway_b = Arc::new(LoopbackGateway::new());
    let wallet_a = test_wallet([6u8; 32], WalletId([6u8; 32]), gateway_a.clone() as Arc<dyn Gateway>);
    let wallet_b = test_wallet([7u8; 32], WalletId([7u8; 32]), gateway_b.clone() as Arc<dyn Gateway>);
    connect(&wallet_a, &gateway_a, &wallet_b, &gateway_b).await;

    seed_coin(&wallet_a, 2_000);
    let tip = Height(1);
    let tx_id = wallet_a
        .driver
        .create_send(wallet_b.wallet_id, vec![Amount(1_000)], Amount(10), AssetId::NATIVE, Height(0), 100)
        .unwrap();

    wallet_a.driver.update(tx_id, tip).await.unwrap();
    wallet_b.driver.update(tx_id, tip).await.unwrap();

    // Replace the partial signature B sent back with an unrelated scalar, simulating either
    // corruption in transit or an actively malicious peer (§4.5 "is_peer_signature_valid").
    let record = TransactionRecord::new(wallet_a.store.clone(), tx_id);
    record.set_peer_signature(&PrivateKey::default()).unwrap();

    let outcome = wallet_a.driver.update(tx_id, tip).await.unwrap();
    unpack_enum!(UpdateOutcome::Done(status) = outcome);
    unpack_enum!(TerminalStatus::Failed(reason) = status);
    assert_eq!(reason, nyx_common_types::InternalFailureReason::InvalidPeerSignature);

    // The coin reserved as an input is released back to Available on failure (§5 rollback).
    let coins = wallet_a.coins.all().unwrap();
    assert!(coins.iter().any(|c| c.status == SpendStatus::Available));
}

#[tokio::test]
async fn expired_negotiation_fails_before_registration() {
    let gateway_a = Arc::new(LoopbackGateway::new());
    let wallet_a = test_wallet([8u8; 32], WalletId([8u8; 32]), gateway_a.clone() as Arc<dyn Gateway>);
    gateway_a.bind_own_store(wallet_a.store.clone()).await;

    seed_coin(&wallet_a, 2_000);
    let peer_id = WalletId([9u8; 32]);
    // No peer ever connects; the negotiation should expire once the tip passes its max height.
    let tx_id = wallet_a.driver.create_send(peer_id, vec![Amount(1_000)], Amount(10), AssetId::NATIVE, Height(0), 10).unwrap();

    assert_eq!(wallet_a.driver.update(tx_id, Height(1)).await.unwrap(), UpdateOutcome::Continue(NextTrigger::NextTip));

    let outcome = wallet_a.driver.update(tx_id, Height(50)).await.unwrap();
    unpack_enum!(UpdateOutcome::Done(status) = outcome);
    unpack_enum!(TerminalStatus::Failed(reason) = status);
    assert_eq!(reason, nyx_common_types::InternalFailureReason::TransactionExpired);

    let coins = wallet_a.coins.all().unwrap();
    assert!(coins.iter().any(|c| c.status == SpendStatus::Available));
}

#[tokio::test]
async fn transient_invalid_context_is_retried_up_to_the_configured_limit() {
    let gateway_a = Arc::new(LoopbackGateway::with_register_verdict(RegisterTxVerdict::InvalidContext));
    let gateway_b = Arc::new(LoopbackGateway::new());
    let wallet_a = test_wallet([10u8; 32], WalletId([10u8; 32]), gateway_a.clone() as Arc<dyn Gateway>);
    let wallet_b = test_wallet([11u8; 32], WalletId([11u8; 32]), gateway_b.clone() as Arc<dyn Gateway>);
    connect(&wallet_a, &gateway_a, &wallet_b, &gateway_b).await;

    seed_coin(&wallet_a, 2_000);
    let tip = Height(1);
    let tx_id = wallet_a
        .driver
        .create_send(wallet_b.wallet_id, vec![Amount(1_000)], Amount(10), AssetId::NATIVE, Height(0), 100)
        .unwrap();

    wallet_a.driver.update(tx_id, tip).await.unwrap();
    wallet_b.driver.update(tx_id, tip).await.unwrap();
    // Invitation -> Registration: the first InvalidContext verdict is already waiting once this
    // returns, since `register_tx` writes synchronously through the loopback gateway.
    assert_eq!(wallet_a.driver.update(tx_id, tip).await.unwrap(), UpdateOutcome::Continue(NextTrigger::PeerParamWrite));

    // Every subsequent call resubmits and keeps retrying (§7 "transient only if the chain has
    // never reported seeing any version of this kernel") until the configured attempt limit.
    let mut last = wallet_a.driver.update(tx_id, tip).await.unwrap();
    for _ in 0..20 {
        if matches!(last, UpdateOutcome::Done(_)) {
            break;
        }
        last = wallet_a.driver.update(tx_id, tip).await.unwrap();
    }

    unpack_enum!(UpdateOutcome::Done(status) = last);
    unpack_enum!(TerminalStatus::Failed(reason) = status);
    assert_eq!(reason, nyx_common_types::InternalFailureReason::FailedToRegister);
}
