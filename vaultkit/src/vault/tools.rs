//! Agent-callable tools for [`VaultAdapter`].
//!
//! Every tool wraps a shared `Arc<VaultAdapter>`. The vault is given as
//! `address`, either a `0x` address or a configured vault name. Party
//! addresses (`receiver`, `owner`, `holder`) default to the agent wallet.

#![allow(clippy::unnecessary_literal_bound)]

use std::sync::Arc;

use alloy::primitives::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::adapter::VaultAdapter;
use super::operation::{
    DepositRequest, MaxWithdrawRequest, OperationKind, OperationRequest, WithdrawRequest,
};
use crate::args::{self, Amount};
use crate::error::ToolError;
use crate::tool::{BoxedTool, DynTool, Tool, ToolBox, ToolDefinition, ToolExecutionPolicy};

const VAULT_PARAM: &str = "0x-prefixed ERC4626 vault address, or the name of a configured vault.";
const ASSETS_PARAM: &str =
    "Amount of underlying tokens in base units (integer, or decimal string for large values).";

/// Create all vault tools from a shared adapter.
pub fn create_tools(adapter: &Arc<VaultAdapter>) -> Vec<BoxedTool> {
    let mut tools: Vec<BoxedTool> = vec![
        Box::new(DepositTool(Arc::clone(adapter))),
        Box::new(WithdrawTool(Arc::clone(adapter))),
        Box::new(MaxWithdrawTool(Arc::clone(adapter))),
    ];
    tools.extend(OperationKind::ACCESSORS.into_iter().map(|kind| {
        Box::new(AccessorTool {
            kind,
            adapter: Arc::clone(adapter),
        }) as BoxedTool
    }));
    tools
}

/// Register the vault tools on `toolbox`.
///
/// Deposit and withdraw get `write_policy`; reads run without confirmation.
pub fn register(toolbox: &mut ToolBox, adapter: &Arc<VaultAdapter>, write_policy: ToolExecutionPolicy) {
    for tool in create_tools(adapter) {
        let policy = OperationKind::from_name(tool.name())
            .filter(|kind| kind.is_mutating())
            .map_or(ToolExecutionPolicy::Auto, |_| write_policy);
        toolbox.add_boxed_with_policy(tool, policy);
    }
}

/// Result of a deposit or withdraw.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionOutput {
    /// Operation that was submitted.
    pub operation: OperationKind,
    /// `0x` transaction hash.
    pub tx_hash: String,
    /// Checksummed vault address.
    pub vault: String,
    /// Chain the transaction was sent on.
    pub chain_id: u64,
}

/// Result of a read.
#[derive(Debug, Clone, Serialize)]
pub struct ReadOutput {
    /// Operation that was read.
    pub operation: OperationKind,
    /// The value; totals are numbers when they fit in `u64`.
    pub value: Value,
    /// Checksummed vault address.
    pub vault: String,
}

/// Arguments of the `deposit` tool.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DepositArgs {
    /// Vault address or name.
    pub address: String,
    /// Amount in base units.
    pub assets: Amount,
    /// Receiver of the shares; defaults to the wallet.
    #[serde(default)]
    pub receiver: Option<String>,
}

/// Deposit into a vault.
#[derive(Debug)]
pub struct DepositTool(Arc<VaultAdapter>);

impl DepositTool {
    /// Wrap a shared adapter.
    #[must_use]
    pub const fn new(adapter: Arc<VaultAdapter>) -> Self {
        Self(adapter)
    }
}

#[async_trait]
impl Tool for DepositTool {
    const NAME: &'static str = "deposit";
    type Args = DepositArgs;
    type Output = TransactionOutput;
    type Error = ToolError;

    fn description(&self) -> String {
        OperationKind::Deposit.description().to_owned()
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "address": { "type": "string", "description": VAULT_PARAM },
                "assets": { "type": ["integer", "string"], "description": ASSETS_PARAM },
                "receiver": {
                    "type": "string",
                    "description": "Receiver of the vault shares. Omit to use the agent's wallet."
                }
            },
            "required": ["address", "assets"],
            "additionalProperties": false
        })
    }

    async fn call(&self, args: DepositArgs) -> Result<TransactionOutput, ToolError> {
        let kind = OperationKind::Deposit;
        let request = DepositRequest {
            vault: self.0.resolve_vault(kind, &args.address)?,
            assets: args.assets.to_u256("assets")?,
            receiver: args::party_or("receiver", args.receiver.as_deref(), self.0.client().address())?,
        };
        let tx_hash = self.0.deposit(request).await?;
        Ok(transaction_output(&self.0, kind, request.vault, tx_hash))
    }
}

/// Arguments of the `withdraw` tool.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WithdrawArgs {
    /// Vault address or name.
    pub address: String,
    /// Amount in base units.
    pub assets: Amount,
    /// Receiver of the assets; defaults to the wallet.
    #[serde(default)]
    pub receiver: Option<String>,
    /// Owner of the burned shares; defaults to the wallet.
    #[serde(default)]
    pub owner: Option<String>,
}

/// Withdraw from a vault.
#[derive(Debug)]
pub struct WithdrawTool(Arc<VaultAdapter>);

impl WithdrawTool {
    /// Wrap a shared adapter.
    #[must_use]
    pub const fn new(adapter: Arc<VaultAdapter>) -> Self {
        Self(adapter)
    }
}

#[async_trait]
impl Tool for WithdrawTool {
    const NAME: &'static str = "withdraw";
    type Args = WithdrawArgs;
    type Output = TransactionOutput;
    type Error = ToolError;

    fn description(&self) -> String {
        OperationKind::Withdraw.description().to_owned()
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "address": { "type": "string", "description": VAULT_PARAM },
                "assets": { "type": ["integer", "string"], "description": ASSETS_PARAM },
                "receiver": {
                    "type": "string",
                    "description": "Receiver of the withdrawn assets. Omit to use the agent's wallet."
                },
                "owner": {
                    "type": "string",
                    "description": "Owner of the shares being burned. Omit to use the agent's wallet."
                }
            },
            "required": ["address", "assets"],
            "additionalProperties": false
        })
    }

    async fn call(&self, args: WithdrawArgs) -> Result<TransactionOutput, ToolError> {
        let kind = OperationKind::Withdraw;
        let wallet = self.0.client().address();
        let request = WithdrawRequest {
            vault: self.0.resolve_vault(kind, &args.address)?,
            assets: args.assets.to_u256("assets")?,
            receiver: args::party_or("receiver", args.receiver.as_deref(), wallet)?,
            owner: args::party_or("owner", args.owner.as_deref(), wallet)?,
        };
        let tx_hash = self.0.withdraw(request).await?;
        Ok(transaction_output(&self.0, kind, request.vault, tx_hash))
    }
}

/// Arguments of the `get_max_withdraw` tool.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MaxWithdrawArgs {
    /// Vault address or name.
    pub address: String,
    /// Account to query; defaults to the wallet.
    #[serde(default)]
    pub holder: Option<String>,
}

/// Query the maximum withdrawable amount.
#[derive(Debug)]
pub struct MaxWithdrawTool(Arc<VaultAdapter>);

impl MaxWithdrawTool {
    /// Wrap a shared adapter.
    #[must_use]
    pub const fn new(adapter: Arc<VaultAdapter>) -> Self {
        Self(adapter)
    }
}

#[async_trait]
impl Tool for MaxWithdrawTool {
    const NAME: &'static str = "get_max_withdraw";
    type Args = MaxWithdrawArgs;
    type Output = ReadOutput;
    type Error = ToolError;

    fn description(&self) -> String {
        OperationKind::GetMaxWithdraw.description().to_owned()
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "address": { "type": "string", "description": VAULT_PARAM },
                "holder": {
                    "type": "string",
                    "description": "Account whose withdrawal limit is queried. Omit to use the agent's wallet."
                }
            },
            "required": ["address"],
            "additionalProperties": false
        })
    }

    async fn call(&self, args: MaxWithdrawArgs) -> Result<ReadOutput, ToolError> {
        let kind = OperationKind::GetMaxWithdraw;
        let request = MaxWithdrawRequest {
            vault: self.0.resolve_vault(kind, &args.address)?,
            holder: args::party_or("holder", args.holder.as_deref(), self.0.client().address())?,
        };
        let value = self.0.max_withdraw(request).await?;
        Ok(ReadOutput {
            operation: kind,
            value: Value::String(value),
            vault: request.vault.to_checksum(None),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AccessorArgs {
    address: String,
}

/// One of the vault-only reads: owner, symbol, name, underlying token,
/// total assets, total supply.
#[derive(Debug)]
struct AccessorTool {
    kind: OperationKind,
    adapter: Arc<VaultAdapter>,
}

#[async_trait]
impl DynTool for AccessorTool {
    fn name(&self) -> &str {
        self.kind.name()
    }

    fn description(&self) -> String {
        self.kind.description().to_owned()
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            self.name(),
            self.description(),
            serde_json::json!({
                "type": "object",
                "properties": {
                    "address": { "type": "string", "description": VAULT_PARAM }
                },
                "required": ["address"],
                "additionalProperties": false
            }),
        )
    }

    async fn call_json(&self, args: Value) -> Result<Value, ToolError> {
        let args: AccessorArgs = args::from_json(args)?;
        let vault = self.adapter.resolve_vault(self.kind, &args.address)?;
        let request = OperationRequest::accessor(self.kind, vault)
            .ok_or_else(|| ToolError::execution(format!("{} is not a vault accessor", self.kind)))?;
        let output = self.adapter.execute(request).await?;

        Ok(serde_json::to_value(ReadOutput {
            operation: self.kind,
            value: output.to_json(),
            vault: vault.to_checksum(None),
        })?)
    }
}

fn transaction_output(
    adapter: &VaultAdapter,
    operation: OperationKind,
    vault: Address,
    tx_hash: String,
) -> TransactionOutput {
    TransactionOutput {
        operation,
        tx_hash,
        vault: vault.to_checksum(None),
        chain_id: adapter.client().chain_id(),
    }
}
