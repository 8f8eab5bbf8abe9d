//! Unified error types for vaultkit.
//!
//! This module ties the per-area errors together:
//! - Tool dispatch errors ([`ToolError`])
//! - Vault operation failures ([`VaultError`](crate::vault::VaultError))
//! - Wallet and RPC errors ([`WalletError`](crate::wallet::WalletError))
//! - Configuration loading errors ([`ConfigError`](crate::config::ConfigError))

use crate::config::ConfigError;
use crate::vault::VaultError;
use crate::wallet::WalletError;

/// Result type alias for vaultkit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for vaultkit.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Tool dispatch error.
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Vault operation failure.
    #[error(transparent)]
    Vault(#[from] VaultError),

    /// Wallet or RPC provider error.
    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error type for tool execution failures.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum ToolError {
    /// Error during tool execution.
    #[error("Execution error: {0}")]
    Execution(String),

    /// Invalid arguments provided to the tool.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Tool not found.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// Tool execution is forbidden by policy.
    #[error("Tool '{0}' is forbidden by policy")]
    Forbidden(String),

    /// Tool execution was denied by human confirmation.
    #[error("Tool '{0}' execution denied by confirmation")]
    ConfirmationDenied(String),
}

impl ToolError {
    /// Create an execution error.
    #[must_use]
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Create an invalid arguments error.
    #[must_use]
    pub fn invalid_args(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a forbidden error.
    #[must_use]
    pub fn forbidden(tool_name: impl Into<String>) -> Self {
        Self::Forbidden(tool_name.into())
    }

    /// Create a confirmation denied error.
    #[must_use]
    pub fn confirmation_denied(tool_name: impl Into<String>) -> Self {
        Self::ConfirmationDenied(tool_name.into())
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidArguments(err.to_string())
    }
}
