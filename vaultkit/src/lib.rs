//! Vaultkit - ERC-4626 vault tools for on-chain AI agents
//!
//! This crate turns ERC-4626 vault operations (deposit, withdraw and the
//! read-only accessors) into agent-callable tools. Every operation is a
//! single contract call dispatched through an injected [`EvmClient`],
//! and every operation returns a uniform `Result` so callers pattern-match
//! on the outcome.
//!
//! # Architecture
//!
//! ```text
//! VaultkitConfig (TOML + env)
//!   → VaultRegistry (vault/token descriptors per chain)
//!   → EvmWallet (alloy signer + JSON-RPC, implements EvmClient)
//!     → VaultAdapter (one call per operation, VaultError on failure)
//!       → vault::tools / token::tools / wallet::tools → ToolBox
//! ```
//!
//! [`EvmClient`]: wallet::EvmClient

mod args;
pub mod config;
pub mod error;
pub mod prelude;
pub mod registry;
pub mod token;
pub mod tool;
pub mod vault;
pub mod wallet;

pub use args::Amount;
pub use error::{Error, Result, ToolError};

use std::sync::Arc;

use registry::VaultRegistry;
use tool::{ToolBox, ToolExecutionPolicy};
use wallet::EvmClient;

/// Build a [`ToolBox`] with every vault, ERC-20 and native token tool.
///
/// Reads run automatically; every tool that sends a transaction gets
/// `write_policy`.
#[must_use]
pub fn agent_toolbox(
    client: Arc<dyn EvmClient>,
    registry: Arc<VaultRegistry>,
    write_policy: ToolExecutionPolicy,
) -> ToolBox {
    let adapter = Arc::new(
        vault::VaultAdapter::new(Arc::clone(&client)).with_registry(Arc::clone(&registry)),
    );
    let erc20 = Arc::new(token::Erc20::new(Arc::clone(&client)).with_registry(registry));

    let mut toolbox = ToolBox::new();
    vault::tools::register(&mut toolbox, &adapter, write_policy);
    token::tools::register(&mut toolbox, &erc20, write_policy);
    wallet::tools::register(&mut toolbox, &client, write_policy);
    toolbox
}
