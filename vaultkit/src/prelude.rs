//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```rust,ignore
//! use vaultkit::prelude::*;
//! ```

pub use crate::config::{
    ConfigError, ConfigIssue, IssueLevel, TokenDescriptor, VaultDescriptor, VaultkitConfig,
};
pub use crate::error::{Error, Result, ToolError};
pub use crate::registry::VaultRegistry;
pub use crate::token::Erc20;
pub use crate::tool::{
    AlwaysDenyHandler, AutoApproveHandler, BoxedTool, ConfirmationHandler, DynTool, Tool,
    ToolBox, ToolCallResult, ToolConfirmationRequest, ToolConfirmationResponse, ToolDefinition,
    ToolExecutionPolicy,
};
pub use crate::vault::{
    DepositRequest, MaxWithdrawRequest, OperationKind, OperationOutput, OperationRequest,
    VaultAdapter, VaultError, VaultErrorKind, VaultQuery, WithdrawRequest,
};
pub use crate::wallet::{ContractCall, EvmChain, EvmClient, EvmWallet, WalletError};
pub use crate::agent_toolbox;
