//! Error types for wallet operations.
//!
//! [`WalletError`] covers RPC provider communication, configuration and
//! transaction submission failures. It integrates into the crate-level
//! [`Error`](crate::Error) via `Error::Wallet`.

/// Error type for wallet operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum WalletError {
    /// RPC / provider error, including failed `eth_call`s.
    #[error("Provider error: {0}")]
    Provider(String),

    /// Invalid configuration (bad key, bad URL).
    #[error("Config error: {0}")]
    Config(String),

    /// Transaction submission, rejection or revert.
    #[error("Transaction error: {0}")]
    Transaction(String),
}

impl WalletError {
    /// Create a provider error.
    #[must_use]
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    /// Create a config error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a transaction error.
    #[must_use]
    pub fn transaction(msg: impl Into<String>) -> Self {
        Self::Transaction(msg.into())
    }

    /// The underlying message, without the category prefix.
    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            Self::Provider(msg) | Self::Config(msg) | Self::Transaction(msg) => msg,
        }
    }
}

impl From<WalletError> for crate::error::ToolError {
    fn from(e: WalletError) -> Self {
        Self::Execution(e.to_string())
    }
}
