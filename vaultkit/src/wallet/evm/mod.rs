//! EVM wallet backed by an [`alloy`] local signer and JSON-RPC provider.
//!
//! See [`EvmWallet`] for construction and usage.

mod wallet;

pub use wallet::EvmWallet;
