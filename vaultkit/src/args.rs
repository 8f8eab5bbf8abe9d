//! Argument parsing shared by the vault and token tools.

use alloy::primitives::{Address, U256};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ToolError;

/// A token amount in base units, given either as a JSON number or as a
/// decimal string for values beyond `u64`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    /// Small amounts.
    Number(u64),
    /// Decimal string, e.g. `"1000000000000000000000"`.
    Text(String),
}

impl Amount {
    /// Convert to [`U256`], naming `field` in the error.
    pub fn to_u256(&self, field: &str) -> Result<U256, ToolError> {
        match self {
            Self::Number(n) => Ok(U256::from(*n)),
            Self::Text(s) if s.trim().is_empty() => {
                Err(ToolError::invalid_args(format!("{field} must not be empty")))
            }
            Self::Text(s) => U256::from_str_radix(s.trim(), 10).map_err(|e| {
                ToolError::invalid_args(format!(
                    "{field} must be a non-negative integer in base units, got '{s}': {e}"
                ))
            }),
        }
    }
}

/// Parse a `0x` address, naming `field` in the error.
pub fn parse_address(field: &str, value: &str) -> Result<Address, ToolError> {
    value
        .trim()
        .parse()
        .map_err(|e| ToolError::invalid_args(format!("invalid {field} address '{value}': {e}")))
}

/// Parse an optional party address, falling back to `default`.
pub fn party_or(field: &str, value: Option<&str>, default: Address) -> Result<Address, ToolError> {
    value.map_or(Ok(default), |v| parse_address(field, v))
}

/// Decode tool arguments given as an object or a JSON-encoded string.
pub fn from_json<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    match args {
        Value::String(s) => Ok(serde_json::from_str(&s)?),
        other => Ok(serde_json::from_value(other)?),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn amounts_accept_numbers_and_strings() {
        let n: Amount = serde_json::from_value(serde_json::json!(1_000_000)).unwrap();
        assert_eq!(n.to_u256("assets").unwrap(), U256::from(1_000_000u64));

        let big: Amount =
            serde_json::from_value(serde_json::json!("1000000000000000000000000")).unwrap();
        assert_eq!(
            big.to_u256("assets").unwrap(),
            U256::from(10u64).pow(U256::from(24))
        );
    }

    #[test]
    fn malformed_amounts_are_invalid_arguments() {
        for bad in ["-1", "1.5", "ten", ""] {
            let err = Amount::Text(bad.into()).to_u256("assets").unwrap_err();
            assert!(matches!(err, ToolError::InvalidArguments(_)), "{bad}");
        }
        assert!(serde_json::from_value::<Amount>(serde_json::json!(-3)).is_err());
    }

    #[test]
    fn parties_default_to_wallet() {
        let wallet = Address::new([0xaa; 20]);
        assert_eq!(party_or("receiver", None, wallet).unwrap(), wallet);
        assert!(party_or("receiver", Some("nope"), wallet).is_err());
    }

    #[test]
    fn string_encoded_arguments_decode() {
        #[derive(Deserialize)]
        struct Args {
            address: String,
        }
        let args: Args = from_json(Value::String(r#"{"address":"x"}"#.into())).unwrap();
        assert_eq!(args.address, "x");
    }
}
