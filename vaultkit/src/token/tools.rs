//! Agent-callable ERC-20 tools.
//!
//! `token` is a `0x` address or a configured token symbol. Spenders may
//! also be given as a configured vault name.

#![allow(clippy::unnecessary_literal_bound)]

use std::sync::Arc;

use alloy::primitives::Address;
use alloy::primitives::utils::format_units;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::Erc20;
use crate::args::{self, Amount};
use crate::error::ToolError;
use crate::tool::{BoxedTool, DynTool, ToolBox, ToolDefinition, ToolExecutionPolicy};

/// Tools that submit a transaction.
const WRITE_TOOLS: [&str; 2] = ["approve", "token_transfer"];

const TOKEN_PARAM: &str = "ERC-20 contract address (0x-prefixed) or configured token symbol.";
const AMOUNT_PARAM: &str =
    "Amount in base units (integer, or decimal string for large values).";

/// Create the ERC-20 tools from a shared helper.
pub fn create_tools(erc20: &Arc<Erc20>) -> Vec<BoxedTool> {
    vec![
        Box::new(TokenBalanceTool(Arc::clone(erc20))),
        Box::new(TokenAllowanceTool(Arc::clone(erc20))),
        Box::new(ApproveTool(Arc::clone(erc20))),
        Box::new(TokenTransferTool(Arc::clone(erc20))),
    ]
}

/// Register the ERC-20 tools; `approve` and `token_transfer` get `write_policy`.
pub fn register(toolbox: &mut ToolBox, erc20: &Arc<Erc20>, write_policy: ToolExecutionPolicy) {
    for tool in create_tools(erc20) {
        let policy = if WRITE_TOOLS.contains(&tool.name()) {
            write_policy
        } else {
            ToolExecutionPolicy::Auto
        };
        toolbox.add_boxed_with_policy(tool, policy);
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BalanceArgs {
    token: String,
    #[serde(default)]
    holder: Option<String>,
}

/// Balance of any holder, defaulting to the agent wallet.
#[derive(Debug)]
struct TokenBalanceTool(Arc<Erc20>);

#[async_trait]
impl DynTool for TokenBalanceTool {
    fn name(&self) -> &str {
        "token_balance"
    }

    fn description(&self) -> String {
        String::from(
            "Get the ERC-20 token balance of an address in base units. \
             Also returns the token symbol and decimals. \
             Omit 'holder' to check the agent's own balance.",
        )
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            self.name(),
            self.description(),
            serde_json::json!({
                "type": "object",
                "properties": {
                    "token": {
                        "type": "string",
                        "description": TOKEN_PARAM
                    },
                    "holder": {
                        "type": "string",
                        "description": "Address to query. Omit for the agent's own balance."
                    }
                },
                "required": ["token"],
                "additionalProperties": false
            }),
        )
    }

    async fn call_json(&self, args: Value) -> Result<Value, ToolError> {
        let args: BalanceArgs = args::from_json(args)?;
        let token = resolve_token(&self.0, &args.token)?;
        let holder =
            args::party_or("holder", args.holder.as_deref(), self.0.client().address())?;

        let balance = self.0.balance_of(token, holder).await?;

        // Configured metadata first; on-chain lookup is best effort.
        let chain_id = self.0.client().chain_id();
        let (symbol, decimals) = match self.0.registry().token_at(token, chain_id) {
            Some(descriptor) => (Some(descriptor.symbol.clone()), Some(descriptor.decimals)),
            None => (
                self.0.symbol(token).await.ok(),
                self.0.decimals(token).await.ok(),
            ),
        };
        let formatted = decimals.and_then(|d| format_units(balance, d).ok());

        Ok(serde_json::json!({
            "token": token.to_checksum(None),
            "holder": holder.to_checksum(None),
            "balance": balance.to_string(),
            "formatted": formatted,
            "symbol": symbol,
            "decimals": decimals,
        }))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AllowanceArgs {
    token: String,
    spender: String,
    #[serde(default)]
    owner: Option<String>,
}

/// How much a spender may still pull from an owner.
#[derive(Debug)]
struct TokenAllowanceTool(Arc<Erc20>);

#[async_trait]
impl DynTool for TokenAllowanceTool {
    fn name(&self) -> &str {
        "token_allowance"
    }

    fn description(&self) -> String {
        String::from(
            "Get the amount of an ERC-20 token a spender may still transfer from an owner, \
             in base units. Use it to check whether a vault deposit needs an approval first. \
             Omit 'owner' to check the agent's own allowance.",
        )
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            self.name(),
            self.description(),
            serde_json::json!({
                "type": "object",
                "properties": {
                    "token": {
                        "type": "string",
                        "description": TOKEN_PARAM
                    },
                    "spender": {
                        "type": "string",
                        "description": "Spender address (0x-prefixed) or configured vault name."
                    },
                    "owner": {
                        "type": "string",
                        "description": "Owner address. Omit for the agent's own allowance."
                    }
                },
                "required": ["token", "spender"],
                "additionalProperties": false
            }),
        )
    }

    async fn call_json(&self, args: Value) -> Result<Value, ToolError> {
        let args: AllowanceArgs = args::from_json(args)?;
        let token = resolve_token(&self.0, &args.token)?;
        let spender = resolve_spender(&self.0, &args.spender)?;
        let owner = args::party_or("owner", args.owner.as_deref(), self.0.client().address())?;

        let allowance = self.0.allowance(token, owner, spender).await?;

        Ok(serde_json::json!({
            "token": token.to_checksum(None),
            "owner": owner.to_checksum(None),
            "spender": spender.to_checksum(None),
            "allowance": allowance.to_string(),
        }))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ApproveArgs {
    token: String,
    spender: String,
    amount: Amount,
}

/// Grant an allowance, typically to a vault before depositing.
#[derive(Debug)]
struct ApproveTool(Arc<Erc20>);

#[async_trait]
impl DynTool for ApproveTool {
    fn name(&self) -> &str {
        "approve"
    }

    fn description(&self) -> String {
        String::from(
            "Approve a spender to transfer an amount of an ERC-20 token from the agent's wallet. \
             Deposits into a vault need an approval of the vault for the underlying token first.",
        )
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            self.name(),
            self.description(),
            serde_json::json!({
                "type": "object",
                "properties": {
                    "token": {
                        "type": "string",
                        "description": TOKEN_PARAM
                    },
                    "spender": {
                        "type": "string",
                        "description": "Spender address (0x-prefixed) or configured vault name."
                    },
                    "amount": {
                        "type": ["integer", "string"],
                        "description": AMOUNT_PARAM
                    }
                },
                "required": ["token", "spender", "amount"],
                "additionalProperties": false
            }),
        )
    }

    async fn call_json(&self, args: Value) -> Result<Value, ToolError> {
        let args: ApproveArgs = args::from_json(args)?;
        let token = resolve_token(&self.0, &args.token)?;
        let spender = resolve_spender(&self.0, &args.spender)?;
        let amount = args.amount.to_u256("amount")?;

        let tx_hash = self.0.approve(token, spender, amount).await?;

        Ok(serde_json::json!({
            "tx_hash": tx_hash,
            "token": token.to_checksum(None),
            "spender": spender.to_checksum(None),
            "amount": amount.to_string(),
        }))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TransferArgs {
    token: String,
    to: String,
    amount: Amount,
}

/// Send tokens from the agent's wallet.
#[derive(Debug)]
struct TokenTransferTool(Arc<Erc20>);

#[async_trait]
impl DynTool for TokenTransferTool {
    fn name(&self) -> &str {
        "token_transfer"
    }

    fn description(&self) -> String {
        String::from(
            "Transfer an amount of an ERC-20 token from the agent's wallet to a recipient. \
             Returns the transaction hash.",
        )
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            self.name(),
            self.description(),
            serde_json::json!({
                "type": "object",
                "properties": {
                    "token": {
                        "type": "string",
                        "description": TOKEN_PARAM
                    },
                    "to": {
                        "type": "string",
                        "description": "Recipient address (0x-prefixed hex)."
                    },
                    "amount": {
                        "type": ["integer", "string"],
                        "description": AMOUNT_PARAM
                    }
                },
                "required": ["token", "to", "amount"],
                "additionalProperties": false
            }),
        )
    }

    async fn call_json(&self, args: Value) -> Result<Value, ToolError> {
        let args: TransferArgs = args::from_json(args)?;
        let token = resolve_token(&self.0, &args.token)?;
        let to = args::parse_address("to", &args.to)?;
        if to.is_zero() {
            return Err(ToolError::invalid_args("to must not be the zero address"));
        }
        let amount = args.amount.to_u256("amount")?;

        let tx_hash = self.0.transfer(token, to, amount).await?;

        Ok(serde_json::json!({
            "tx_hash": tx_hash,
            "token": token.to_checksum(None),
            "to": to.to_checksum(None),
            "amount": amount.to_string(),
        }))
    }
}

fn resolve_token(erc20: &Erc20, reference: &str) -> Result<Address, ToolError> {
    erc20
        .resolve(reference)
        .map_err(|e| ToolError::invalid_args(e.detail()))
}

/// A configured vault name, or else a `0x` address.
fn resolve_spender(erc20: &Erc20, reference: &str) -> Result<Address, ToolError> {
    let chain_id = erc20.client().chain_id();
    match erc20.registry().vault_address(reference, chain_id) {
        Some(vault) => Ok(vault),
        None => args::parse_address("spender", reference),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::clone_on_ref_ptr)]
mod tests {
    use std::sync::Mutex;

    use alloy::primitives::{Bytes, U256};
    use alloy::sol_types::SolValue;
    use serde_json::json;

    use super::*;
    use crate::config::{TokenDescriptor, VaultDescriptor};
    use crate::registry::VaultRegistry;
    use crate::tool::AutoApproveHandler;
    use crate::wallet::{ContractCall, EvmClient, WalletError};

    const SHR: Address = Address::new([0x5d; 20]);
    const VAULT: Address = Address::new([0x28; 20]);
    const WALLET: Address = Address::new([0xaa; 20]);

    #[derive(Debug, Default)]
    struct Client {
        calls: Mutex<Vec<ContractCall>>,
    }

    #[async_trait]
    impl EvmClient for Client {
        fn address(&self) -> Address {
            WALLET
        }

        fn chain_id(&self) -> u64 {
            5003
        }

        async fn send_transaction(&self, call: ContractCall) -> Result<String, WalletError> {
            self.calls.lock().unwrap().push(call);
            Ok("0xa11".into())
        }

        async fn read(&self, call: ContractCall) -> Result<Bytes, WalletError> {
            self.calls.lock().unwrap().push(call);
            Ok(Bytes::from(U256::from(1_500_000_000_000_000_000u128).abi_encode()))
        }

        async fn transfer(&self, _to: Address, _value: U256) -> Result<String, WalletError> {
            Err(WalletError::config("ERC-20 tools never send value"))
        }
    }

    fn toolbox() -> (ToolBox, Arc<Client>) {
        let client = Arc::new(Client::default());
        let registry = VaultRegistry::new()
            .with_vault(VaultDescriptor::new("SozuHausResidentVault", 5003, VAULT))
            .with_token(TokenDescriptor::new("SHR", "SozuHausResident", 18, 5003, SHR));
        let erc20 = Arc::new(Erc20::new(client.clone()).with_registry(Arc::new(registry)));
        let mut toolbox = ToolBox::new();
        register(&mut toolbox, &erc20, ToolExecutionPolicy::RequireConfirmation);
        (toolbox, client)
    }

    #[test]
    fn register_gates_only_writes() {
        let (toolbox, _) = toolbox();
        assert_eq!(
            toolbox.names(),
            vec!["approve", "token_allowance", "token_balance", "token_transfer"]
        );
        for name in toolbox.names() {
            let expected = if WRITE_TOOLS.contains(&name) {
                ToolExecutionPolicy::RequireConfirmation
            } else {
                ToolExecutionPolicy::Auto
            };
            assert_eq!(toolbox.policy(name), expected, "{name}");
        }
    }

    #[tokio::test]
    async fn allowance_defaults_owner_to_wallet() {
        let (toolbox, client) = toolbox();
        let out = toolbox
            .call(
                "token_allowance",
                json!({ "token": "SHR", "spender": "SozuHausResidentVault" }),
            )
            .await
            .unwrap();
        assert_eq!(out["allowance"], "1500000000000000000");
        assert_eq!(out["owner"], WALLET.to_checksum(None));
        assert_eq!(out["spender"], VAULT.to_checksum(None));

        let call = client.calls.lock().unwrap()[0].clone();
        assert_eq!(call.to, SHR);
        assert_eq!(call.function, "allowance(address,address)");
    }

    #[tokio::test]
    async fn token_transfer_submits_to_token_contract() {
        let (toolbox, client) = toolbox();
        let to = Address::new([0xbe; 20]);
        let out = toolbox
            .call_with(
                "token_transfer",
                json!({ "token": "SHR", "to": format!("{to:#x}"), "amount": 42 }),
                &AutoApproveHandler,
            )
            .await
            .unwrap();
        assert_eq!(out["tx_hash"], "0xa11");
        assert_eq!(out["amount"], "42");

        let call = client.calls.lock().unwrap()[0].clone();
        assert_eq!(call.to, SHR);
        assert_eq!(call.function, "transfer(address,uint256)");
    }

    #[tokio::test]
    async fn token_transfer_rejects_zero_recipient() {
        let (toolbox, client) = toolbox();
        let err = toolbox
            .call_with(
                "token_transfer",
                json!({ "token": "SHR", "to": format!("{:#x}", Address::ZERO), "amount": 1 }),
                &AutoApproveHandler,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
        assert!(client.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn balance_uses_configured_metadata() {
        let (toolbox, client) = toolbox();
        let out = toolbox
            .call("token_balance", json!({ "token": "SHR" }))
            .await
            .unwrap();
        assert_eq!(out["balance"], "1500000000000000000");
        assert_eq!(out["formatted"], "1.500000000000000000");
        assert_eq!(out["symbol"], "SHR");
        assert_eq!(out["holder"], WALLET.to_checksum(None));
        // Only balanceOf; metadata came from the registry.
        assert_eq!(client.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn approve_resolves_vault_spender() {
        let (toolbox, client) = toolbox();
        let out = toolbox
            .call_with(
                "approve",
                json!({ "token": "SHR", "spender": "SozuHausResidentVault", "amount": "1000" }),
                &AutoApproveHandler,
            )
            .await
            .unwrap();
        assert_eq!(out["tx_hash"], "0xa11");
        assert_eq!(out["spender"], VAULT.to_checksum(None));

        let call = client.calls.lock().unwrap()[0].clone();
        assert_eq!(call.to, SHR);
        assert_eq!(call.function, "approve(address,uint256)");
    }

    #[tokio::test]
    async fn unknown_token_is_invalid_arguments() {
        let (toolbox, _) = toolbox();
        let err = toolbox
            .call("token_balance", json!({ "token": "USDC" }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(ref m) if m.contains("unknown token 'USDC'")));
    }

    #[tokio::test]
    async fn approve_needs_confirmation() {
        let (toolbox, client) = toolbox();
        let err = toolbox
            .call("approve", json!({ "token": "SHR", "spender": "SozuHausResidentVault", "amount": 1 }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::ConfirmationDenied(_)));
        assert!(client.calls.lock().unwrap().is_empty());
    }
}
