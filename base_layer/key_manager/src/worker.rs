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

//! Derives the asynchronous shape (§5, §4.2) from any synchronous [`KeyKeeper`): a single
//! background thread drains a FIFO of jobs and runs them one at a time against the wrapped
//! keeper, posting each result back through a one-shot channel. This is the same shape a real
//! hardware keeper driver has: one physical device, one in-flight request at a time, the calling
//! task just waits for its turn.

use std::{
    sync::{mpsc, Arc},
    thread,
};

use async_trait::async_trait;
use nyx_common_types::{
    address::WalletId,
    types::{PrivateKey, PublicKey},
};
use nyx_core::transaction_components::UnblindedOutput;
use tokio::sync::oneshot;

use crate::{
    async_keeper::AsyncKeyKeeper,
    error::KeyKeeperError,
    keeper::KeyKeeper,
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

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A dedicated worker thread that drains a FIFO of job closures, one at a time, for as long as
/// at least one [`ThreadedKeyKeeper`] clone (or the [`ThreadedKeyKeeperHandle`] built on top of
/// it) is alive.
#[derive(Clone)]
pub struct ThreadedKeyKeeper {
    jobs: mpsc::Sender<Job>,
}

impl ThreadedKeyKeeper {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel::<Job>();
        thread::Builder::new()
            .name("nyx-key-keeper".into())
            .spawn(move || {
                for job in rx {
                    job();
                }
            })
            .expect("failed to spawn key keeper worker thread");
        ThreadedKeyKeeper { jobs: tx }
    }

    fn submit<T, F>(&self, keeper_call: F) -> oneshot::Receiver<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let job: Job = Box::new(move || {
            let result = keeper_call();
            let _ = tx.send(result);
        });
        // The channel only closes once every `ThreadedKeyKeeper` clone (and the worker thread's
        // loop) has been dropped; a caller still holding one can always submit.
        let _ = self.jobs.send(job);
        rx
    }
}

macro_rules! recv_or_unspecified {
    ($rx:expr) => {
        $rx.await.unwrap_or(Err(KeyKeeperError::Unspecified))
    };
}

#[async_trait]
impl AsyncKeyKeeper for ThreadedKeyKeeperHandle {
    async fn derive_sbbs_key(&self, own_id: WalletId) -> Result<PrivateKey, KeyKeeperError> {
        let keeper = self.keeper.clone();
        let rx = self.worker.submit(move || keeper.derive_sbbs_key(own_id));
        recv_or_unspecified!(rx)
    }

    async fn generate_public_keys(&self, coin_ids: Vec<CoinId>, create_coin_key: bool) -> Result<Vec<PublicKey>, KeyKeeperError> {
        let keeper = self.keeper.clone();
        let rx = self.worker.submit(move || keeper.generate_public_keys(&coin_ids, create_coin_key));
        recv_or_unspecified!(rx)
    }

    async fn generate_outputs(&self, request: GenerateOutputsRequest, specs: Vec<OutputSpec>) -> Result<Vec<UnblindedOutput>, KeyKeeperError> {
        let keeper = self.keeper.clone();
        let rx = self.worker.submit(move || keeper.generate_outputs(request, &specs));
        recv_or_unspecified!(rx)
    }

    async fn sign_sender(&self, request: SignSenderRequest) -> Result<SignSenderResponse, KeyKeeperError> {
        let keeper = self.keeper.clone();
        let rx = self.worker.submit(move || keeper.sign_sender(request));
        recv_or_unspecified!(rx)
    }

    async fn sign_receiver(&self, request: SignReceiverRequest) -> Result<SignReceiverResponse, KeyKeeperError> {
        let keeper = self.keeper.clone();
        let rx = self.worker.submit(move || keeper.sign_receiver(request));
        recv_or_unspecified!(rx)
    }

    async fn sign_asset_kernel(&self, request: SignAssetKernelRequest) -> Result<SignAssetKernelResponse, KeyKeeperError> {
        let keeper = self.keeper.clone();
        let rx = self.worker.submit(move || keeper.sign_asset_kernel(request));
        recv_or_unspecified!(rx)
    }

    async fn allocate_nonce_slot(&self) -> Result<NonceSlotId, KeyKeeperError> {
        let keeper = self.keeper.clone();
        let rx = self.worker.submit(move || keeper.allocate_nonce_slot());
        recv_or_unspecified!(rx)
    }

    async fn generate_nonce(&self, slot: NonceSlotId) -> Result<PublicKey, KeyKeeperError> {
        let keeper = self.keeper.clone();
        let rx = self.worker.submit(move || keeper.generate_nonce(slot));
        recv_or_unspecified!(rx)
    }
}

/// The actual `AsyncKeyKeeper` handle: a worker thread plus the keeper clone each job closure
/// needs to capture. Kept distinct from [`ThreadedKeyKeeper`] so the bare queue handle can be
/// cloned into job closures without capturing the keeper `Arc` a second time per call.
#[derive(Clone)]
pub struct ThreadedKeyKeeperHandle {
    worker: ThreadedKeyKeeper,
    keeper: Arc<dyn KeyKeeper>,
}

impl ThreadedKeyKeeperHandle {
    pub fn spawn(keeper: Arc<dyn KeyKeeper>) -> Self {
        ThreadedKeyKeeperHandle {
            worker: ThreadedKeyKeeper::spawn(),
            keeper,
        }
    }
}

#[cfg(test)]
mod test {
    use nyx_common_types::{address::WalletId, tx_id::TxId};

    use super::*;
    use crate::memory::MemoryKeyKeeper;

    fn handle() -> ThreadedKeyKeeperHandle {
        let keeper: Arc<dyn KeyKeeper> = Arc::new(MemoryKeyKeeper::new([3u8; 32], WalletId([1u8; 32])));
        ThreadedKeyKeeperHandle::spawn(keeper)
    }

    #[tokio::test]
    async fn async_and_sync_shapes_agree() {
        let h = handle();
        let sync_keeper = MemoryKeyKeeper::new([3u8; 32], WalletId([1u8; 32]));
        let id = WalletId([9u8; 32]);
        assert_eq!(h.derive_sbbs_key(id).await.unwrap(), sync_keeper.derive_sbbs_key(id).unwrap());
    }

    #[tokio::test]
    async fn nonce_reuse_is_rejected_through_the_worker() {
        let h = handle();
        let tx_id = TxId::new_random();
        let slot = h.allocate_nonce_slot().await.unwrap();
        let request = |challenge: Vec<u8>| SignSenderRequest {
            tx_id,
            sub_tx_id: 0,
            nonce_slot: slot,
            initial: false,
            challenge: Some(challenge),
        };
        h.sign_sender(request(vec![1])).await.unwrap();
        let result = h.sign_sender(request(vec![2])).await;
        assert!(matches!(result, Err(KeyKeeperError::NonceSlotReused(_))));
    }
}
