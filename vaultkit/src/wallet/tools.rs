//! Agent-callable native token tools.

#![allow(clippy::unnecessary_literal_bound)]

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{EvmChain, EvmClient};
use crate::args::{self, Amount};
use crate::error::ToolError;
use crate::tool::{BoxedTool, DynTool, ToolBox, ToolDefinition, ToolExecutionPolicy};

/// Create the native token tools.
pub fn create_tools(client: &Arc<dyn EvmClient>) -> Vec<BoxedTool> {
    vec![Box::new(TransferTool(Arc::clone(client)))]
}

/// Register the native token tools; every one of them sends value, so all get `write_policy`.
pub fn register(
    toolbox: &mut ToolBox,
    client: &Arc<dyn EvmClient>,
    write_policy: ToolExecutionPolicy,
) {
    for tool in create_tools(client) {
        toolbox.add_boxed_with_policy(tool, write_policy);
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TransferArgs {
    to: String,
    amount: Amount,
}

/// Transfer native token to an address.
#[derive(Debug)]
struct TransferTool(Arc<dyn EvmClient>);

#[async_trait]
impl DynTool for TransferTool {
    fn name(&self) -> &str {
        "transfer"
    }

    fn description(&self) -> String {
        String::from(
            "Transfer the chain's native token (ETH, MNT) from the agent's wallet to a recipient. \
             Amount is in wei (1 ETH = 10^18 wei). Returns the transaction hash.",
        )
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            self.name(),
            self.description(),
            serde_json::json!({
                "type": "object",
                "properties": {
                    "to": {
                        "type": "string",
                        "description": "Recipient address (0x-prefixed hex)."
                    },
                    "amount": {
                        "type": ["integer", "string"],
                        "description": "Amount in wei (e.g. \"1000000000000000000\" for 1 ETH)."
                    }
                },
                "required": ["to", "amount"],
                "additionalProperties": false
            }),
        )
    }

    async fn call_json(&self, args: Value) -> Result<Value, ToolError> {
        let args: TransferArgs = args::from_json(args)?;
        let to = args::parse_address("to", &args.to)?;
        if to.is_zero() {
            return Err(ToolError::invalid_args("to must not be the zero address"));
        }
        let amount = args.amount.to_u256("amount")?;

        debug!(to = %to, amount = %amount, "native transfer");
        let tx_hash = self.0.transfer(to, amount).await?;
        let chain = EvmChain::from_id(self.0.chain_id());

        Ok(serde_json::json!({
            "tx_hash": tx_hash,
            "from": self.0.address().to_checksum(None),
            "to": to.to_checksum(None),
            "amount_wei": amount.to_string(),
            "chain": chain.name(),
        }))
    }
}
