//! Wallet capability used to reach the chain.
//!
//! Vault and token operations never talk to a provider directly. They
//! build a [`ContractCall`] and hand it to an [`EvmClient`], which either
//! submits it as a transaction or executes it as a read-only `eth_call`.
//!
//! # Architecture
//!
//! ```text
//! ContractCall { to, interface, function, input }
//!   → EvmClient::send_transaction()  (deposit, withdraw, approve, token transfer)
//!   → EvmClient::read()              (every accessor)
//! EvmClient::transfer()              (native token, no calldata)
//!       └─ EvmWallet: alloy PrivateKeySigner + DynProvider
//! ```

use std::fmt;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use async_trait::async_trait;

mod error;
pub mod evm;
pub mod tools;

pub use error::WalletError;
pub use evm::EvmWallet;

/// Known EVM-compatible chains with their chain IDs and human-readable names.
///
/// # Examples
///
/// ```rust
/// use vaultkit::wallet::EvmChain;
///
/// let chain = EvmChain::from_id(5003);
/// assert_eq!(chain, EvmChain::MantleSepolia);
/// assert_eq!(chain.name(), "mantle-sepolia");
///
/// let chain = EvmChain::from_id(999);
/// assert_eq!(chain.name(), "evm-999");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EvmChain {
    /// Ethereum Mainnet (chain ID: 1).
    Ethereum,
    /// Sepolia Testnet (chain ID: 11155111).
    Sepolia,
    /// Optimism (chain ID: 10).
    Optimism,
    /// Polygon `PoS` (chain ID: 137).
    Polygon,
    /// Base (chain ID: 8453).
    Base,
    /// Arbitrum One (chain ID: 42161).
    Arbitrum,
    /// Mantle (chain ID: 5000).
    Mantle,
    /// Mantle Sepolia Testnet (chain ID: 5003).
    MantleSepolia,
    /// Custom chain with user-specified ID and name.
    Custom {
        /// Numeric chain ID.
        id: u64,
        /// Human-readable chain name.
        name: String,
    },
}

impl EvmChain {
    /// Get the numeric chain ID.
    #[must_use]
    pub const fn id(&self) -> u64 {
        match self {
            Self::Ethereum => 1,
            Self::Sepolia => 11_155_111,
            Self::Optimism => 10,
            Self::Polygon => 137,
            Self::Base => 8453,
            Self::Arbitrum => 42_161,
            Self::Mantle => 5000,
            Self::MantleSepolia => 5003,
            Self::Custom { id, .. } => *id,
        }
    }

    /// Get the human-readable chain name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Ethereum => "ethereum",
            Self::Sepolia => "sepolia",
            Self::Optimism => "optimism",
            Self::Polygon => "polygon",
            Self::Base => "base",
            Self::Arbitrum => "arbitrum",
            Self::Mantle => "mantle",
            Self::MantleSepolia => "mantle-sepolia",
            Self::Custom { name, .. } => name,
        }
    }

    /// Infer an [`EvmChain`] from a numeric chain ID.
    ///
    /// Unknown chain IDs produce [`EvmChain::Custom`] with a generic name.
    #[must_use]
    pub fn from_id(id: u64) -> Self {
        match id {
            1 => Self::Ethereum,
            10 => Self::Optimism,
            137 => Self::Polygon,
            5000 => Self::Mantle,
            5003 => Self::MantleSepolia,
            8453 => Self::Base,
            42_161 => Self::Arbitrum,
            11_155_111 => Self::Sepolia,
            _ => Self::Custom {
                id,
                name: format!("evm-{id}"),
            },
        }
    }
}

impl fmt::Display for EvmChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.id())
    }
}

/// One encoded contract call: target, interface, function and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    /// Contract the call is sent to.
    pub to: Address,
    /// Name of the ABI interface the function belongs to (e.g. `IERC4626`).
    pub interface: &'static str,
    /// Solidity function signature, e.g. `deposit(uint256,address)`.
    pub function: &'static str,
    /// ABI-encoded selector and ordered argument list.
    pub input: Bytes,
}

impl ContractCall {
    /// Encode a typed `sol!` call against `to`.
    #[must_use]
    pub fn new<C: SolCall>(to: Address, interface: &'static str, call: &C) -> Self {
        Self {
            to,
            interface,
            function: C::SIGNATURE,
            input: Bytes::from(call.abi_encode()),
        }
    }

    /// Bare function name without the parameter list.
    #[must_use]
    pub fn function_name(&self) -> &str {
        self.function
            .split_once('(')
            .map_or(self.function, |(name, _)| name)
    }

    /// The 4-byte function selector.
    #[must_use]
    pub fn selector(&self) -> Option<[u8; 4]> {
        self.input.get(..4).and_then(|s| s.try_into().ok())
    }

    /// Convert into an alloy [`TransactionRequest`].
    #[must_use]
    pub fn into_transaction_request(self) -> TransactionRequest {
        TransactionRequest::default()
            .with_to(self.to)
            .with_input(self.input)
    }
}

impl fmt::Display for ContractCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} @ {}", self.interface, self.function, self.to)
    }
}

/// The transport capability every on-chain operation goes through.
///
/// Implemented by [`EvmWallet`]. Tests and embedders can supply their own
/// implementation; the vault and token layers only depend on this trait.
#[async_trait]
pub trait EvmClient: Send + Sync + fmt::Debug {
    /// The address transactions are sent from.
    fn address(&self) -> Address;

    /// Numeric chain ID the client is connected to.
    fn chain_id(&self) -> u64;

    /// Submit `call` as a transaction and return the `0x`-prefixed hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be sent, is rejected, or reverts.
    async fn send_transaction(&self, call: ContractCall) -> Result<String, WalletError>;

    /// Execute `call` as a read-only `eth_call` and return the raw return data.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC call fails.
    async fn read(&self, call: ContractCall) -> Result<Bytes, WalletError>;

    /// Send `value` wei of the chain's native token to `to` and return the
    /// `0x`-prefixed hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be sent, is rejected, or reverts.
    async fn transfer(&self, to: Address, value: U256) -> Result<String, WalletError>;
}
