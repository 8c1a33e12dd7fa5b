#![cfg_attr(not(debug_assertions), deny(unused_variables))]
#![cfg_attr(not(debug_assertions), deny(unused_imports))]
#![cfg_attr(not(debug_assertions), deny(dead_code))]
#![cfg_attr(not(debug_assertions), deny(unused_extern_crates))]
#![deny(unused_must_use)]
#![deny(unreachable_patterns)]
#![deny(unknown_lints)]
//! # Nyx Test Utilities
//!
//! Common test utilities shared across the workspace's crates: nothing here is specific to the
//! negotiation protocol, only generic enough to be worth factoring out of every crate's own test
//! modules.
//!
//! ## Modules
//!
//! - `futures` - utilities which make testing future-based/async code easier (§1 "Test tooling")
//! - `paths` - temporary-directory helpers for on-disk sqlite fixtures (§1 "Storage")
//! - `random` - random string generation for test fixtures
//! - `runtime` - a `tokio` multi-threaded runtime wrapper for tests that need to run the
//!   negotiation driver and a key keeper worker thread side by side
//! - `enums` - `unpack_enum!`, for asserting a value matches one `SubState`/`TxStatus` variant and
//!   extracting its fields in one step

pub mod enums;
pub mod futures;
pub mod paths;
pub mod random;
pub mod runtime;
