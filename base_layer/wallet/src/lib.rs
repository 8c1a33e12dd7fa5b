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

//! Parameter store (C1), coin selector (C3), address book and negotiation driver (C5) for the
//! two-party transaction protocol, plus the gateway seam (C6) they submit finished transactions
//! through. [`nyx_key_manager`] (C2) is a sibling crate; this one wires it into the rest of the
//! negotiation rather than implementing any signing itself.

pub mod address_book;
pub mod coin;
pub mod config;
pub mod driver;
pub mod error;
pub mod gateway;
pub mod output_manager;
pub mod parameter_store;
pub mod record;
pub mod storage;
pub mod test_utils;

pub use address_book::{AddressBook, AddressBookBackend};
pub use config::NegotiationConfig;
pub use driver::{NegotiationDriver, NegotiationEvent, NextTrigger, TerminalStatus, UpdateOutcome, PROTOCOL_VERSION};
pub use error::{AddressBookError, CoinStoreError, OutputManagerError, ParameterStoreError, TransactionServiceError};
pub use gateway::{Gateway, RegisterTxVerdict};
pub use output_manager::{MintedOutput, OutputManager, SelectedInputs};
pub use parameter_store::{Codec, ParameterStore, ParameterStoreBackend};
pub use record::{OutboundParameters, TransactionRecord};
