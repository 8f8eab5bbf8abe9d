//! EVM wallet implementation on top of [`alloy`].
//!
//! [`EvmWallet`] pairs a [`PrivateKeySigner`] with a type-erased provider
//! and implements [`EvmClient`] so vault and token operations can submit
//! and read contract calls through it.

use std::sync::Arc;

use alloy::network::{Ethereum, TransactionBuilder};
use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use tracing::{debug, info};

use crate::wallet::{ContractCall, EvmChain, EvmClient, WalletError};

/// An EVM wallet the agent signs and reads with.
pub struct EvmWallet {
    /// Alloy local signer for EVM signing operations.
    signer: PrivateKeySigner,

    /// Type-erased JSON-RPC provider for on-chain communication.
    provider: Arc<DynProvider<Ethereum>>,

    /// The chain this wallet is connected to.
    chain: EvmChain,
}

impl std::fmt::Debug for EvmWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvmWallet")
            .field("address", &self.signer.address())
            .field("chain", &self.chain)
            .finish_non_exhaustive()
    }
}

impl EvmWallet {
    /// Create a wallet from a raw private key hex string (with or without `0x` prefix)
    /// and connect it to `rpc_url`.
    ///
    /// The chain is detected with `eth_chainId`.
    ///
    /// # Errors
    ///
    /// Returns an error if the private key is invalid or the RPC connection fails.
    pub async fn from_private_key(key: &str, rpc_url: &str) -> Result<Self, WalletError> {
        let key = key.trim();
        let key = key.strip_prefix("0x").unwrap_or(key);
        let signer: PrivateKeySigner = key
            .parse()
            .map_err(|e| WalletError::config(format!("invalid private key: {e}")))?;

        let provider: DynProvider<Ethereum> = ProviderBuilder::new()
            .wallet(signer.clone())
            .connect(rpc_url)
            .await
            .map_err(|e| {
                WalletError::provider(format!("RPC connection to '{rpc_url}' failed: {e}"))
            })?
            .erased();

        let chain_id = provider
            .get_chain_id()
            .await
            .map_err(|e| WalletError::provider(format!("failed to get chain ID: {e}")))?;
        let chain = EvmChain::from_id(chain_id);

        info!(
            address = %signer.address(),
            chain = %chain,
            "EVM wallet connected",
        );

        Ok(Self {
            signer,
            provider: Arc::new(provider),
            chain,
        })
    }

    /// Sign, send and wait for the receipt of `tx`. A reverted receipt is an error.
    async fn submit(&self, tx: TransactionRequest, label: &str) -> Result<String, WalletError> {
        let receipt = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| WalletError::transaction(e.to_string()))?
            .get_receipt()
            .await
            .map_err(|e| WalletError::transaction(format!("get_receipt failed: {e}")))?;

        let hash = format!("{:#x}", receipt.transaction_hash);
        if !receipt.status() {
            return Err(WalletError::transaction(format!(
                "transaction {hash} reverted"
            )));
        }

        info!(call = %label, tx_hash = %hash, "transaction confirmed");
        Ok(hash)
    }
}

#[async_trait]
impl EvmClient for EvmWallet {
    fn address(&self) -> Address {
        self.signer.address()
    }

    fn chain_id(&self) -> u64 {
        self.chain.id()
    }

    /// Sends the transaction and waits for its receipt.
    async fn send_transaction(&self, call: ContractCall) -> Result<String, WalletError> {
        let label = call.to_string();
        self.submit(call.into_transaction_request(), &label).await
    }

    async fn read(&self, call: ContractCall) -> Result<Bytes, WalletError> {
        debug!(call = %call, "eth_call");
        self.provider
            .call(call.into_transaction_request())
            .await
            .map_err(|e| WalletError::provider(e.to_string()))
    }

    async fn transfer(&self, to: Address, value: U256) -> Result<String, WalletError> {
        let tx = TransactionRequest::default().with_to(to).with_value(value);
        self.submit(tx, &format!("transfer {value} wei to {to}")).await
    }
}
