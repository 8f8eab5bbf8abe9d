//! The fixed set of vault operations and their typed requests and outputs.

use std::fmt;

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use super::error::VaultError;

/// Every operation the vault adapter exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Deposit assets into the vault.
    Deposit,
    /// Withdraw assets from the vault.
    Withdraw,
    /// Maximum amount a holder can withdraw.
    GetMaxWithdraw,
    /// Vault owner address.
    GetOwner,
    /// Vault share token symbol.
    GetSymbol,
    /// Vault share token name.
    GetName,
    /// Underlying asset token address.
    GetUnderlyingToken,
    /// Total assets managed by the vault.
    GetTotalAssets,
    /// Total supply of vault shares.
    GetTotalSupply,
}

impl OperationKind {
    /// All operations, writes first.
    pub const ALL: [Self; 9] = [
        Self::Deposit,
        Self::Withdraw,
        Self::GetMaxWithdraw,
        Self::GetOwner,
        Self::GetSymbol,
        Self::GetName,
        Self::GetUnderlyingToken,
        Self::GetTotalAssets,
        Self::GetTotalSupply,
    ];

    /// The single-field accessors that only need a vault address.
    pub const ACCESSORS: [Self; 6] = [
        Self::GetOwner,
        Self::GetSymbol,
        Self::GetName,
        Self::GetUnderlyingToken,
        Self::GetTotalAssets,
        Self::GetTotalSupply,
    ];

    /// Tool name of the operation.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdraw => "withdraw",
            Self::GetMaxWithdraw => "get_max_withdraw",
            Self::GetOwner => "get_owner",
            Self::GetSymbol => "get_symbol",
            Self::GetName => "get_name",
            Self::GetUnderlyingToken => "get_underlying_token",
            Self::GetTotalAssets => "get_total_assets",
            Self::GetTotalSupply => "get_total_supply",
        }
    }

    /// Look an operation up by its tool name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// The vault contract function the operation calls.
    #[must_use]
    pub const fn function(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdraw => "withdraw",
            Self::GetMaxWithdraw => "maxWithdraw",
            Self::GetOwner => "owner",
            Self::GetSymbol => "symbol",
            Self::GetName => "name",
            Self::GetUnderlyingToken => "asset",
            Self::GetTotalAssets => "totalAssets",
            Self::GetTotalSupply => "totalSupply",
        }
    }

    /// Whether the operation submits a transaction instead of reading.
    #[must_use]
    pub const fn is_mutating(self) -> bool {
        matches!(self, Self::Deposit | Self::Withdraw)
    }

    /// Description shown to the model.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Deposit => "Deposit an amount into the ERC4626 vault.",
            Self::Withdraw => "Withdraw an amount from the ERC4626 vault.",
            Self::GetMaxWithdraw => "Get the max withdrawal amount of an ERC4626 vault",
            Self::GetOwner => "Get the owner of an ERC4626 vault.",
            Self::GetSymbol => "Get the symbol of an ERC4626 vault.",
            Self::GetName => "Get the name of an ERC4626 vault.",
            Self::GetUnderlyingToken => "Get the underlying Token of an ERC4626 vault.",
            Self::GetTotalAssets => "Get the TotalAssets of an ERC4626 vault.",
            Self::GetTotalSupply => "Get the TotalSupply of an ERC4626 vault.",
        }
    }

    /// Prefix of the failure message, e.g. `Failed to withdraw from vault`.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::Deposit => "Failed to deposit into vault",
            Self::Withdraw => "Failed to withdraw from vault",
            Self::GetMaxWithdraw => "Failed to fetch max withdraw",
            Self::GetOwner => "Failed to fetch owner",
            Self::GetSymbol => "Failed to fetch symbol",
            Self::GetName => "Failed to fetch name",
            Self::GetUnderlyingToken => "Failed to fetch underlying token",
            Self::GetTotalAssets => "Failed to fetch total assets",
            Self::GetTotalSupply => "Failed to fetch total supply",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Deposit `assets` (base units) into `vault`, minting shares to `receiver`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositRequest {
    /// Vault contract address.
    pub vault: Address,
    /// Amount of underlying tokens, in base units.
    pub assets: U256,
    /// Receiver of the minted shares.
    pub receiver: Address,
}

/// Withdraw `assets` from `vault`, burning shares of `owner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawRequest {
    /// Vault contract address.
    pub vault: Address,
    /// Amount of underlying tokens, in base units.
    pub assets: U256,
    /// Receiver of the withdrawn assets.
    pub receiver: Address,
    /// Owner of the shares being burned.
    pub owner: Address,
}

/// Query how much `holder` can withdraw from `vault`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxWithdrawRequest {
    /// Vault contract address.
    pub vault: Address,
    /// Account whose withdrawal limit is queried.
    pub holder: Address,
}

/// A read that only needs the vault address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultQuery {
    /// Vault contract address.
    pub vault: Address,
}

/// One vault operation with exactly the fields it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationRequest {
    /// See [`DepositRequest`].
    Deposit(DepositRequest),
    /// See [`WithdrawRequest`].
    Withdraw(WithdrawRequest),
    /// See [`MaxWithdrawRequest`].
    GetMaxWithdraw(MaxWithdrawRequest),
    /// Vault owner.
    GetOwner(VaultQuery),
    /// Share token symbol.
    GetSymbol(VaultQuery),
    /// Share token name.
    GetName(VaultQuery),
    /// Underlying asset address.
    GetUnderlyingToken(VaultQuery),
    /// Total managed assets.
    GetTotalAssets(VaultQuery),
    /// Total share supply.
    GetTotalSupply(VaultQuery),
}

impl OperationRequest {
    /// Build the request for one of the vault-only [`OperationKind::ACCESSORS`].
    ///
    /// Returns `None` for operations that need more than a vault address.
    #[must_use]
    pub const fn accessor(kind: OperationKind, vault: Address) -> Option<Self> {
        let query = VaultQuery { vault };
        match kind {
            OperationKind::GetOwner => Some(Self::GetOwner(query)),
            OperationKind::GetSymbol => Some(Self::GetSymbol(query)),
            OperationKind::GetName => Some(Self::GetName(query)),
            OperationKind::GetUnderlyingToken => Some(Self::GetUnderlyingToken(query)),
            OperationKind::GetTotalAssets => Some(Self::GetTotalAssets(query)),
            OperationKind::GetTotalSupply => Some(Self::GetTotalSupply(query)),
            OperationKind::Deposit | OperationKind::Withdraw | OperationKind::GetMaxWithdraw => {
                None
            }
        }
    }

    /// The operation this request performs.
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::Deposit(_) => OperationKind::Deposit,
            Self::Withdraw(_) => OperationKind::Withdraw,
            Self::GetMaxWithdraw(_) => OperationKind::GetMaxWithdraw,
            Self::GetOwner(_) => OperationKind::GetOwner,
            Self::GetSymbol(_) => OperationKind::GetSymbol,
            Self::GetName(_) => OperationKind::GetName,
            Self::GetUnderlyingToken(_) => OperationKind::GetUnderlyingToken,
            Self::GetTotalAssets(_) => OperationKind::GetTotalAssets,
            Self::GetTotalSupply(_) => OperationKind::GetTotalSupply,
        }
    }

    /// The vault contract the request targets.
    #[must_use]
    pub const fn vault(&self) -> Address {
        match self {
            Self::Deposit(r) => r.vault,
            Self::Withdraw(r) => r.vault,
            Self::GetMaxWithdraw(r) => r.vault,
            Self::GetOwner(q)
            | Self::GetSymbol(q)
            | Self::GetName(q)
            | Self::GetUnderlyingToken(q)
            | Self::GetTotalAssets(q)
            | Self::GetTotalSupply(q) => q.vault,
        }
    }

    /// Reject malformed requests before anything is sent.
    ///
    /// # Errors
    ///
    /// Returns a validation [`VaultError`] when the vault or a party address is
    /// the zero address, or a deposit amount is zero.
    pub fn validate(&self) -> Result<(), VaultError> {
        let kind = self.kind();
        let require = |field: &str, address: Address| {
            if address.is_zero() {
                Err(VaultError::validation(
                    kind,
                    format!("{field} must be a non-zero address"),
                ))
            } else {
                Ok(())
            }
        };

        require("vault address", self.vault())?;
        match self {
            Self::Deposit(r) => {
                require("receiver", r.receiver)?;
                if r.assets.is_zero() {
                    return Err(VaultError::validation(
                        kind,
                        "deposit amount must be greater than zero",
                    ));
                }
            }
            Self::Withdraw(r) => {
                require("receiver", r.receiver)?;
                require("owner", r.owner)?;
            }
            Self::GetMaxWithdraw(r) => require("holder", r.holder)?,
            _ => {}
        }
        Ok(())
    }
}

/// Successful result of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutput {
    /// Hash of the submitted transaction.
    Transaction(String),
    /// Decoded value rendered as a string.
    Text(String),
    /// Decoded numeric amount.
    Amount(U256),
}

impl OperationOutput {
    /// Transaction hash, if this is a write result.
    #[must_use]
    pub fn tx_hash(&self) -> Option<&str> {
        match self {
            Self::Transaction(hash) => Some(hash),
            Self::Text(_) | Self::Amount(_) => None,
        }
    }

    /// Numeric amount, if this is a total.
    #[must_use]
    pub const fn amount(&self) -> Option<U256> {
        match self {
            Self::Amount(value) => Some(*value),
            Self::Transaction(_) | Self::Text(_) => None,
        }
    }

    /// JSON rendering: totals stay numbers while they fit in `u64`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Transaction(s) | Self::Text(s) => serde_json::Value::String(s.clone()),
            Self::Amount(value) => u64::try_from(*value).map_or_else(
                |_| serde_json::Value::String(value.to_string()),
                serde_json::Value::from,
            ),
        }
    }
}

impl fmt::Display for OperationOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transaction(s) | Self::Text(s) => f.write_str(s),
            Self::Amount(value) => write!(f, "{value}"),
        }
    }
}
