//! Failure type shared by every vault operation.

use super::operation::OperationKind;
use crate::error::ToolError;
use crate::wallet::WalletError;

/// Categories of vault failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum VaultErrorKind {
    /// Malformed or missing request field; nothing was sent.
    Validation,
    /// Deposit or withdraw was rejected, reverted, or never submitted.
    Transaction,
    /// A read failed or returned data that could not be decoded.
    Read,
}

/// A failed vault operation.
///
/// Displays as `"<operation failure message>: <detail>"`, for example
/// `Failed to withdraw from vault: insufficient funds`.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{}: {message}", .operation.failure_message())]
#[non_exhaustive]
pub struct VaultError {
    /// The error kind.
    pub kind: VaultErrorKind,
    /// The operation that failed.
    pub operation: OperationKind,
    /// Description of what went wrong.
    pub message: String,
    /// The transport error, when the failure came from the wallet.
    #[source]
    pub source: Option<WalletError>,
}

impl VaultError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(operation: OperationKind, message: impl Into<String>) -> Self {
        Self {
            kind: VaultErrorKind::Validation,
            operation,
            message: message.into(),
            source: None,
        }
    }

    /// Wrap a failed transaction submission.
    #[must_use]
    pub fn transaction(operation: OperationKind, source: WalletError) -> Self {
        Self {
            kind: VaultErrorKind::Transaction,
            operation,
            message: source.detail().to_owned(),
            source: Some(source),
        }
    }

    /// Wrap a failed read call.
    #[must_use]
    pub fn read(operation: OperationKind, source: WalletError) -> Self {
        Self {
            kind: VaultErrorKind::Read,
            operation,
            message: source.detail().to_owned(),
            source: Some(source),
        }
    }

    /// Create a read error for return data that did not decode.
    #[must_use]
    pub fn decode(operation: OperationKind, message: impl Into<String>) -> Self {
        Self {
            kind: VaultErrorKind::Read,
            operation,
            message: message.into(),
            source: None,
        }
    }

    /// Check if this is a validation error.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        self.kind == VaultErrorKind::Validation
    }
}

impl From<VaultError> for ToolError {
    fn from(err: VaultError) -> Self {
        match err.kind {
            VaultErrorKind::Validation => Self::InvalidArguments(err.to_string()),
            VaultErrorKind::Transaction | VaultErrorKind::Read => Self::Execution(err.to_string()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn display_embeds_original_text() {
        let err = VaultError::transaction(
            OperationKind::Withdraw,
            WalletError::transaction("insufficient funds"),
        );
        assert_eq!(err.to_string(), "Failed to withdraw from vault: insufficient funds");
        let source = err.source().unwrap().downcast_ref::<WalletError>().unwrap();
        assert_eq!(source, &WalletError::transaction("insufficient funds"));
    }

    #[test]
    fn decode_errors_are_reads_without_source() {
        let err = VaultError::decode(OperationKind::GetSymbol, "buffer overrun");
        assert_eq!(err.kind, VaultErrorKind::Read);
        assert!(err.source().is_none());
        assert_eq!(err.to_string(), "Failed to fetch symbol: buffer overrun");
    }

    #[test]
    fn validation_maps_to_invalid_arguments() {
        let err = VaultError::validation(OperationKind::Deposit, "missing receiver");
        assert!(matches!(ToolError::from(err), ToolError::InvalidArguments(_)));

        let err = VaultError::read(OperationKind::GetOwner, WalletError::provider("timeout"));
        let tool_err = ToolError::from(err);
        assert!(matches!(tool_err, ToolError::Execution(_)));
        assert!(tool_err.to_string().contains("Failed to fetch owner: timeout"));
    }
}
