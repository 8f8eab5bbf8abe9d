//! ERC-4626 vault adapter.
//!
//! Each public method maps to exactly one vault contract function and one
//! [`EvmClient`] call. Deposit and withdraw go through the write path, every
//! other operation through the read path.

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;
use tracing::{debug, info, warn};

use super::error::VaultError;
use super::operation::{
    DepositRequest, MaxWithdrawRequest, OperationKind, OperationOutput, OperationRequest,
    VaultQuery, WithdrawRequest,
};
use crate::registry::VaultRegistry;
use crate::wallet::{ContractCall, EvmClient};

/// Interface name recorded on every vault [`ContractCall`].
pub const INTERFACE: &str = "IERC4626";

mod abi {
    alloy::sol! {
        function deposit(uint256 assets, address receiver) external returns (uint256);
        function withdraw(uint256 assets, address receiver, address owner) external returns (uint256);
        function maxWithdraw(address owner) external view returns (uint256);
        function owner() external view returns (address);
        function symbol() external view returns (string);
        function name() external view returns (string);
        function asset() external view returns (address);
        function totalAssets() external view returns (uint256);
        function totalSupply() external view returns (uint256);
    }
}

/// Performs vault operations through an injected [`EvmClient`].
///
/// The adapter keeps no state between calls; identical reads issue
/// identical contract calls.
#[derive(Debug, Clone)]
pub struct VaultAdapter {
    client: Arc<dyn EvmClient>,
    registry: Arc<VaultRegistry>,
}

impl VaultAdapter {
    /// Create an adapter with an empty registry.
    #[must_use]
    pub fn new(client: Arc<dyn EvmClient>) -> Self {
        Self {
            client,
            registry: Arc::default(),
        }
    }

    /// Use `registry` to resolve vault names.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<VaultRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// The transport this adapter calls through.
    #[must_use]
    pub fn client(&self) -> &Arc<dyn EvmClient> {
        &self.client
    }

    /// The registry used for name resolution.
    #[must_use]
    pub fn registry(&self) -> &VaultRegistry {
        &self.registry
    }

    /// Resolve a vault reference to an address.
    ///
    /// Accepts a `0x` address or the name of a vault configured for the
    /// client's chain.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the reference is neither.
    pub fn resolve_vault(
        &self,
        operation: OperationKind,
        reference: &str,
    ) -> Result<Address, VaultError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(VaultError::validation(operation, "vault address is required"));
        }
        if reference.starts_with("0x") || reference.starts_with("0X") {
            return reference.parse().map_err(|e| {
                VaultError::validation(operation, format!("invalid vault address '{reference}': {e}"))
            });
        }

        let chain_id = self.client.chain_id();
        self.registry
            .vault_address(reference, chain_id)
            .ok_or_else(|| {
                VaultError::validation(
                    operation,
                    format!("unknown vault '{reference}' on chain {chain_id}"),
                )
            })
    }

    /// Run any operation.
    ///
    /// # Errors
    ///
    /// Returns the [`VaultError`] of the dispatched operation.
    pub async fn execute(&self, request: OperationRequest) -> Result<OperationOutput, VaultError> {
        match request {
            OperationRequest::Deposit(r) => self.deposit(r).await.map(OperationOutput::Transaction),
            OperationRequest::Withdraw(r) => {
                self.withdraw(r).await.map(OperationOutput::Transaction)
            }
            OperationRequest::GetMaxWithdraw(r) => {
                self.max_withdraw(r).await.map(OperationOutput::Text)
            }
            OperationRequest::GetOwner(q) => self.owner(q).await.map(OperationOutput::Text),
            OperationRequest::GetSymbol(q) => self.symbol(q).await.map(OperationOutput::Text),
            OperationRequest::GetName(q) => self.name(q).await.map(OperationOutput::Text),
            OperationRequest::GetUnderlyingToken(q) => {
                self.underlying_token(q).await.map(OperationOutput::Text)
            }
            OperationRequest::GetTotalAssets(q) => {
                self.total_assets(q).await.map(OperationOutput::Amount)
            }
            OperationRequest::GetTotalSupply(q) => {
                self.total_supply(q).await.map(OperationOutput::Amount)
            }
        }
    }

    /// Deposit assets and return the transaction hash.
    ///
    /// # Errors
    ///
    /// Fails with `Failed to deposit into vault: ...`.
    pub async fn deposit(&self, request: DepositRequest) -> Result<String, VaultError> {
        OperationRequest::Deposit(request).validate()?;
        let call = abi::depositCall {
            assets: request.assets,
            receiver: request.receiver,
        };
        self.submit(OperationKind::Deposit, request.vault, &call).await
    }

    /// Withdraw assets and return the transaction hash.
    ///
    /// # Errors
    ///
    /// Fails with `Failed to withdraw from vault: ...`.
    pub async fn withdraw(&self, request: WithdrawRequest) -> Result<String, VaultError> {
        OperationRequest::Withdraw(request).validate()?;
        let call = abi::withdrawCall {
            assets: request.assets,
            receiver: request.receiver,
            owner: request.owner,
        };
        self.submit(OperationKind::Withdraw, request.vault, &call).await
    }

    /// Maximum amount `holder` can withdraw, as a decimal string.
    ///
    /// # Errors
    ///
    /// Fails with `Failed to fetch max withdraw: ...`.
    pub async fn max_withdraw(&self, request: MaxWithdrawRequest) -> Result<String, VaultError> {
        OperationRequest::GetMaxWithdraw(request).validate()?;
        let call = abi::maxWithdrawCall {
            owner: request.holder,
        };
        let amount = self
            .query(OperationKind::GetMaxWithdraw, request.vault, &call)
            .await?;
        Ok(amount.to_string())
    }

    /// Checksummed owner address.
    ///
    /// # Errors
    ///
    /// Fails with `Failed to fetch owner: ...`.
    pub async fn owner(&self, query: VaultQuery) -> Result<String, VaultError> {
        OperationRequest::GetOwner(query).validate()?;
        let owner = self
            .query(OperationKind::GetOwner, query.vault, &abi::ownerCall {})
            .await?;
        Ok(owner.to_checksum(None))
    }

    /// Share token symbol.
    ///
    /// # Errors
    ///
    /// Fails with `Failed to fetch symbol: ...`.
    pub async fn symbol(&self, query: VaultQuery) -> Result<String, VaultError> {
        OperationRequest::GetSymbol(query).validate()?;
        self.query(OperationKind::GetSymbol, query.vault, &abi::symbolCall {})
            .await
    }

    /// Share token name.
    ///
    /// # Errors
    ///
    /// Fails with `Failed to fetch name: ...`.
    pub async fn name(&self, query: VaultQuery) -> Result<String, VaultError> {
        OperationRequest::GetName(query).validate()?;
        self.query(OperationKind::GetName, query.vault, &abi::nameCall {})
            .await
    }

    /// Checksummed address of the underlying asset.
    ///
    /// # Errors
    ///
    /// Fails with `Failed to fetch underlying token: ...`.
    pub async fn underlying_token(&self, query: VaultQuery) -> Result<String, VaultError> {
        OperationRequest::GetUnderlyingToken(query).validate()?;
        let asset = self
            .query(OperationKind::GetUnderlyingToken, query.vault, &abi::assetCall {})
            .await?;
        Ok(asset.to_checksum(None))
    }

    /// Total assets managed by the vault, in base units.
    ///
    /// # Errors
    ///
    /// Fails with `Failed to fetch total assets: ...`.
    pub async fn total_assets(&self, query: VaultQuery) -> Result<U256, VaultError> {
        OperationRequest::GetTotalAssets(query).validate()?;
        self.query(OperationKind::GetTotalAssets, query.vault, &abi::totalAssetsCall {})
            .await
    }

    /// Total supply of vault shares, in base units.
    ///
    /// # Errors
    ///
    /// Fails with `Failed to fetch total supply: ...`.
    pub async fn total_supply(&self, query: VaultQuery) -> Result<U256, VaultError> {
        OperationRequest::GetTotalSupply(query).validate()?;
        self.query(OperationKind::GetTotalSupply, query.vault, &abi::totalSupplyCall {})
            .await
    }

    async fn submit<C: SolCall>(
        &self,
        kind: OperationKind,
        vault: Address,
        call: &C,
    ) -> Result<String, VaultError> {
        let call = ContractCall::new(vault, INTERFACE, call);
        debug!(operation = %kind, vault = %vault, function = call.function, "submitting vault transaction");

        match self.client.send_transaction(call).await {
            Ok(tx_hash) => {
                info!(operation = %kind, vault = %vault, tx_hash = %tx_hash, "vault transaction submitted");
                Ok(tx_hash)
            }
            Err(e) => {
                let err = VaultError::transaction(kind, e);
                warn!(operation = %kind, vault = %vault, error = %err, "vault transaction failed");
                Err(err)
            }
        }
    }

    async fn query<C: SolCall>(
        &self,
        kind: OperationKind,
        vault: Address,
        call: &C,
    ) -> Result<C::Return, VaultError> {
        let call = ContractCall::new(vault, INTERFACE, call);
        debug!(operation = %kind, vault = %vault, function = call.function, "reading vault");

        let data = self.client.read(call).await.map_err(|e| {
            let err = VaultError::read(kind, e);
            warn!(operation = %kind, vault = %vault, error = %err, "vault read failed");
            err
        })?;

        C::abi_decode_returns(&data).map_err(|e| {
            let err = VaultError::decode(
                kind,
                format!("could not decode {} return data: {e}", kind.function()),
            );
            warn!(operation = %kind, vault = %vault, error = %err, "vault read failed");
            err
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::clone_on_ref_ptr)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use alloy::primitives::Bytes;
    use alloy::sol_types::SolValue;
    use async_trait::async_trait;

    use super::*;
    use crate::config::VaultDescriptor;
    use crate::vault::VaultErrorKind;
    use crate::wallet::WalletError;

    const VAULT: Address = Address::new([0x28; 20]);
    const USER: Address = Address::new([0xaa; 20]);

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Path {
        Write,
        Read,
    }

    /// Records every call and answers from a queue of canned replies.
    #[derive(Debug, Default)]
    struct StubClient {
        calls: Mutex<Vec<(Path, ContractCall)>>,
        replies: Mutex<VecDeque<Result<Bytes, WalletError>>>,
    }

    impl StubClient {
        fn reply(self, reply: Result<Bytes, WalletError>) -> Self {
            self.replies.lock().unwrap().push_back(reply);
            self
        }

        fn returning<T: SolValue>(self, value: T) -> Self {
            self.reply(Ok(Bytes::from(value.abi_encode())))
        }

        fn failing(self, message: &str) -> Self {
            self.reply(Err(WalletError::transaction(message)))
        }

        fn calls(&self) -> Vec<(Path, ContractCall)> {
            self.calls.lock().unwrap().clone()
        }

        fn next(&self, path: Path, call: ContractCall) -> Result<Bytes, WalletError> {
            self.calls.lock().unwrap().push((path, call));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(WalletError::provider("no reply queued")))
        }
    }

    #[async_trait]
    impl EvmClient for StubClient {
        fn address(&self) -> Address {
            USER
        }

        fn chain_id(&self) -> u64 {
            5003
        }

        async fn send_transaction(&self, call: ContractCall) -> Result<String, WalletError> {
            let data = self.next(Path::Write, call)?;
            Ok(String::from_utf8_lossy(&data).into_owned())
        }

        async fn read(&self, call: ContractCall) -> Result<Bytes, WalletError> {
            self.next(Path::Read, call)
        }

        async fn transfer(&self, _to: Address, _value: U256) -> Result<String, WalletError> {
            Err(WalletError::config("vault operations never send value"))
        }
    }

    fn adapter(client: StubClient) -> (VaultAdapter, Arc<StubClient>) {
        let client = Arc::new(client);
        (VaultAdapter::new(client.clone()), client)
    }

    fn tx(hash: &str) -> Result<Bytes, WalletError> {
        Ok(Bytes::copy_from_slice(hash.as_bytes()))
    }

    /// A valid request for `kind` against `VAULT`.
    fn request_for(kind: OperationKind) -> OperationRequest {
        match kind {
            OperationKind::Deposit => OperationRequest::Deposit(DepositRequest {
                vault: VAULT,
                assets: U256::from(1),
                receiver: USER,
            }),
            OperationKind::Withdraw => OperationRequest::Withdraw(WithdrawRequest {
                vault: VAULT,
                assets: U256::from(1),
                receiver: USER,
                owner: USER,
            }),
            OperationKind::GetMaxWithdraw => OperationRequest::GetMaxWithdraw(MaxWithdrawRequest {
                vault: VAULT,
                holder: USER,
            }),
            _ => OperationRequest::accessor(kind, VAULT).unwrap(),
        }
    }

    mod writes {
        use super::*;

        #[tokio::test]
        async fn deposit_submits_and_returns_hash() {
            let (adapter, client) = adapter(StubClient::default().reply(tx("0xABC")));
            let hash = adapter
                .deposit(DepositRequest {
                    vault: VAULT,
                    assets: U256::from(333),
                    receiver: USER,
                })
                .await
                .unwrap();
            assert_eq!(hash, "0xABC");

            let calls = client.calls();
            assert_eq!(calls.len(), 1);
            let (path, call) = &calls[0];
            assert_eq!(*path, Path::Write);
            assert_eq!(call.to, VAULT);
            assert_eq!(call.interface, "IERC4626");
            assert_eq!(call.function, "deposit(uint256,address)");
            let decoded = abi::depositCall::abi_decode(&call.input).unwrap();
            assert_eq!(decoded.assets, U256::from(333));
            assert_eq!(decoded.receiver, USER);
        }

        #[tokio::test]
        async fn withdraw_passes_arguments_in_order() {
            let owner = Address::new([0xbb; 20]);
            let (adapter, client) = adapter(StubClient::default().reply(tx("0x01")));
            adapter
                .withdraw(WithdrawRequest {
                    vault: VAULT,
                    assets: U256::from(5),
                    receiver: USER,
                    owner,
                })
                .await
                .unwrap();

            let (_, call) = &client.calls()[0];
            assert_eq!(call.function, "withdraw(uint256,address,address)");
            let decoded = abi::withdrawCall::abi_decode(&call.input).unwrap();
            assert_eq!(decoded.receiver, USER);
            assert_eq!(decoded.owner, owner);
        }

        #[tokio::test]
        async fn withdraw_failure_embeds_transport_text() {
            let (adapter, _) = adapter(StubClient::default().failing("insufficient funds"));
            let err = adapter
                .withdraw(WithdrawRequest {
                    vault: VAULT,
                    assets: U256::from(5),
                    receiver: USER,
                    owner: USER,
                })
                .await
                .unwrap_err();
            assert_eq!(err.kind, VaultErrorKind::Transaction);
            assert_eq!(err.operation, OperationKind::Withdraw);
            assert_eq!(err.to_string(), "Failed to withdraw from vault: insufficient funds");
        }

        #[tokio::test]
        async fn invalid_deposit_sends_nothing() {
            let (adapter, client) = adapter(StubClient::default());
            let err = adapter
                .deposit(DepositRequest {
                    vault: VAULT,
                    assets: U256::ZERO,
                    receiver: USER,
                })
                .await
                .unwrap_err();
            assert!(err.is_validation());
            assert!(client.calls().is_empty());
        }
    }

    mod reads {
        use super::*;

        #[tokio::test]
        async fn symbol_decodes_string() {
            let (adapter, client) = adapter(StubClient::default().returning("SHR".to_string()));
            let symbol = adapter.symbol(VaultQuery { vault: VAULT }).await.unwrap();
            assert_eq!(symbol, "SHR");

            let (path, call) = &client.calls()[0];
            assert_eq!(*path, Path::Read);
            assert_eq!(call.function_name(), "symbol");
            assert_eq!(call.selector(), Some(abi::symbolCall::SELECTOR));
        }

        #[tokio::test]
        async fn total_assets_is_numeric() {
            let (adapter, _) = adapter(StubClient::default().returning(U256::from(1_000_000u64)));
            let total = adapter
                .total_assets(VaultQuery { vault: VAULT })
                .await
                .unwrap();
            assert_eq!(total, U256::from(1_000_000u64));
        }

        #[tokio::test]
        async fn total_supply_renders_as_number() {
            let (adapter, _) = adapter(StubClient::default().returning(U256::from(1_000_000u64)));
            let output = adapter
                .execute(OperationRequest::GetTotalSupply(VaultQuery { vault: VAULT }))
                .await
                .unwrap();
            assert_eq!(output.amount(), Some(U256::from(1_000_000u64)));
            assert_eq!(output.to_json(), serde_json::json!(1_000_000));
        }

        #[tokio::test]
        async fn max_withdraw_queries_holder() {
            let holder = Address::new([0xcc; 20]);
            let (adapter, client) = adapter(StubClient::default().returning(U256::from(42)));
            let max = adapter
                .max_withdraw(MaxWithdrawRequest {
                    vault: VAULT,
                    holder,
                })
                .await
                .unwrap();
            assert_eq!(max, "42");

            let (_, call) = &client.calls()[0];
            let decoded = abi::maxWithdrawCall::abi_decode(&call.input).unwrap();
            assert_eq!(decoded.owner, holder);
        }

        #[tokio::test]
        async fn addresses_are_checksummed() {
            let token = Address::new([0xab; 20]);
            let (adapter, client) = adapter(
                StubClient::default()
                    .returning(token)
                    .returning(USER),
            );
            let underlying = adapter
                .underlying_token(VaultQuery { vault: VAULT })
                .await
                .unwrap();
            assert_eq!(underlying, token.to_checksum(None));
            let owner = adapter.owner(VaultQuery { vault: VAULT }).await.unwrap();
            assert_eq!(owner, USER.to_checksum(None));

            let functions: Vec<_> = client.calls().iter().map(|(_, c)| c.function).collect();
            assert_eq!(functions, vec!["asset()", "owner()"]);
        }

        #[tokio::test]
        async fn garbage_return_data_is_a_read_error() {
            let (adapter, _) = adapter(StubClient::default().reply(Ok(Bytes::from_static(&[1, 2]))));
            let err = adapter
                .total_supply(VaultQuery { vault: VAULT })
                .await
                .unwrap_err();
            assert_eq!(err.kind, VaultErrorKind::Read);
            assert!(err.to_string().starts_with("Failed to fetch total supply: "));
        }

        #[tokio::test]
        async fn repeated_reads_issue_identical_calls() {
            let (adapter, client) = adapter(
                StubClient::default()
                    .returning("Vault Share".to_string())
                    .returning("Vault Share".to_string()),
            );
            let query = VaultQuery { vault: VAULT };
            let first = adapter.name(query).await.unwrap();
            let second = adapter.name(query).await.unwrap();
            assert_eq!(first, second);

            let calls = client.calls();
            assert_eq!(calls[0], calls[1]);
        }
    }

    mod dispatch {
        use super::*;

        #[tokio::test]
        async fn every_operation_takes_its_own_path() {
            for kind in OperationKind::ALL {
                let reply = match kind {
                    OperationKind::Deposit | OperationKind::Withdraw => tx("0xABC"),
                    OperationKind::GetSymbol | OperationKind::GetName => {
                        Ok(Bytes::from("SHR".to_string().abi_encode()))
                    }
                    OperationKind::GetOwner | OperationKind::GetUnderlyingToken => {
                        Ok(Bytes::from(USER.abi_encode()))
                    }
                    _ => Ok(Bytes::from(U256::from(7).abi_encode())),
                };
                let (adapter, client) = adapter(StubClient::default().reply(reply));

                let output = adapter.execute(request_for(kind)).await.unwrap();
                let calls = client.calls();
                assert_eq!(calls.len(), 1, "{kind}");
                let (path, call) = &calls[0];
                let expected = if kind.is_mutating() { Path::Write } else { Path::Read };
                assert_eq!(*path, expected, "{kind}");
                assert_eq!(call.function_name(), kind.function(), "{kind}");
                assert_eq!(call.to, VAULT);
                assert_eq!(output.tx_hash().is_some(), kind.is_mutating(), "{kind}");
            }
        }

        #[tokio::test]
        async fn failures_carry_operation_prefix() {
            for kind in OperationKind::ALL {
                let (adapter, client) =
                    adapter(StubClient::default().failing("execution reverted"));
                let err = adapter.execute(request_for(kind)).await.unwrap_err();
                assert_eq!(
                    err.to_string(),
                    format!("{}: execution reverted", kind.failure_message())
                );
                let expected = if kind.is_mutating() {
                    VaultErrorKind::Transaction
                } else {
                    VaultErrorKind::Read
                };
                assert_eq!(err.kind, expected, "{kind}");
                assert_eq!(client.calls().len(), 1, "{kind}");
            }
        }

        #[tokio::test]
        async fn write_failure_messages() {
            let (adapter, _) = adapter(StubClient::default().failing("nonce too low"));
            let err = adapter
                .execute(request_for(OperationKind::Deposit))
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), "Failed to deposit into vault: nonce too low");

            let (adapter, _) = super::adapter(StubClient::default().failing("bad holder"));
            let err = adapter
                .execute(request_for(OperationKind::GetMaxWithdraw))
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), "Failed to fetch max withdraw: bad holder");
        }
    }

    mod resolution {
        use super::*;

        fn named() -> VaultAdapter {
            let registry =
                VaultRegistry::new().with_vault(VaultDescriptor::new("SozuHausResidentVault", 5003, VAULT));
            VaultAdapter::new(Arc::new(StubClient::default())).with_registry(Arc::new(registry))
        }

        #[test]
        fn resolves_hex_addresses() {
            let adapter = named();
            let address = format!("{VAULT:#x}");
            assert_eq!(
                adapter.resolve_vault(OperationKind::GetName, &address).unwrap(),
                VAULT
            );
        }

        #[test]
        fn resolves_names_on_client_chain() {
            let adapter = named();
            assert_eq!(
                adapter
                    .resolve_vault(OperationKind::Deposit, "SozuHausResidentVault")
                    .unwrap(),
                VAULT
            );
        }

        #[test]
        fn rejects_unknown_and_malformed() {
            let adapter = named();
            let err = adapter
                .resolve_vault(OperationKind::Deposit, "OtherVault")
                .unwrap_err();
            assert!(err.is_validation());
            assert!(err.message.contains("unknown vault 'OtherVault' on chain 5003"));

            let err = adapter.resolve_vault(OperationKind::Deposit, "0x1234").unwrap_err();
            assert!(err.message.starts_with("invalid vault address"));

            assert!(adapter.resolve_vault(OperationKind::Deposit, "  ").is_err());
        }
    }
}
