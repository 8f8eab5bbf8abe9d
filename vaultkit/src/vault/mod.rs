//! ERC-4626 vault operations.
//!
//! # Architecture
//!
//! ```text
//! OperationRequest (typed, validated)
//!   → VaultAdapter::execute()
//!       → ContractCall { vault, IERC4626, function, args }
//!       → EvmClient::send_transaction() | EvmClient::read()
//!   → OperationOutput | VaultError("<failure message>: <detail>")
//! ```
//!
//! [`tools`] exposes each operation as an agent tool.

mod adapter;
mod error;
mod operation;
pub mod tools;

pub use adapter::{INTERFACE, VaultAdapter};
pub use error::{VaultError, VaultErrorKind};
pub use operation::{
    DepositRequest, MaxWithdrawRequest, OperationKind, OperationOutput, OperationRequest,
    VaultQuery, WithdrawRequest,
};
