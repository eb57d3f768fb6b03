//! Alloy-based EVM ledger.
//!
//! Signs `createLotNFT` with the wallet key, sends it over HTTP JSON-RPC and
//! waits for the receipt. The contract address and chain come from
//! configuration; nothing about the deployment is compiled in.

use crate::contract::createLotNFTCall;
use crate::{LedgerBinding, LedgerError, LedgerInterface};
use alloy_network::EthereumWallet;
use alloy_primitives::{Address, U256};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::SolCall;
use alloy_transport_http::Http;
use async_trait::async_trait;
use registry_types::{
	with_0x_prefix, ConfigSchema, Field, FieldType, LedgerReceipt, LogEntry, LotRequest, Schema,
	SecretString, ValidationError,
};
use std::sync::Arc;
use std::time::Duration;

/// Ledger implementation backed by an alloy HTTP provider with a local signer.
pub struct AlloyLedger {
	provider: Arc<dyn Provider<Http<reqwest::Client>> + Send + Sync>,
	contract: Address,
	receipt_timeout: Duration,
	confirmations: u64,
}

impl AlloyLedger {
	/// Builds the provider for `binding.rpc_url`, signing with `signer`.
	pub fn new(
		binding: &LedgerBinding,
		signer: PrivateKeySigner,
		poll_interval: Duration,
		confirmations: u64,
	) -> Result<Self, LedgerError> {
		let url: reqwest::Url = binding.rpc_url.parse().map_err(|e| {
			LedgerError::Configuration(format!("Invalid RPC URL {}: {}", binding.rpc_url, e))
		})?;

		let chain_signer = signer.with_chain_id(Some(binding.chain_id));
		let wallet = EthereumWallet::from(chain_signer);

		let provider = ProviderBuilder::new()
			.with_recommended_fillers()
			.wallet(wallet)
			.on_http(url);
		provider.client().set_poll_interval(poll_interval);

		Ok(Self {
			provider: Arc::new(provider),
			contract: binding.contract,
			receipt_timeout: binding.receipt_timeout,
			confirmations,
		})
	}

	fn calldata(request: &LotRequest) -> Vec<u8> {
		createLotNFTCall {
			grainType: request.grain_type.clone(),
			description: request.description.clone(),
			certificateUrl: request.certificate_url.clone(),
			weight: request.weight.clone(),
			latitude: request.latitude.clone(),
			longitude: request.longitude.clone(),
			temperature: U256::from(request.temperature),
			humidity: U256::from(request.humidity),
			status: request.status,
		}
		.abi_encode()
	}
}

/// Configuration schema for [`AlloyLedger`].
///
/// The binding itself (RPC URL, chain, contract) lives in the `[ledger]`
/// section; this table only tunes transport behaviour.
pub struct AlloyLedgerSchema;

impl ConfigSchema for AlloyLedgerSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![],
			vec![
				Field::new(
					"poll_interval_ms",
					FieldType::Integer {
						min: Some(100),
						max: Some(60_000),
					},
				),
				Field::new(
					"confirmations",
					FieldType::Integer {
						min: Some(1),
						max: Some(64),
					},
				),
			],
		);
		schema.validate(config)
	}
}

#[async_trait]
impl LedgerInterface for AlloyLedger {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(AlloyLedgerSchema)
	}

	async fn chain_id(&self) -> Result<u64, LedgerError> {
		self.provider
			.get_chain_id()
			.await
			.map_err(|e| LedgerError::Network(format!("Failed to get chain id: {}", e)))
	}

	async fn create_lot(&self, request: &LotRequest) -> Result<LedgerReceipt, LedgerError> {
		let tx = TransactionRequest::default()
			.to(self.contract)
			.input(Self::calldata(request).into());

		// The provider's wallet signs
		let pending_tx = self
			.provider
			.send_transaction(tx)
			.await
			.map_err(|e| LedgerError::Network(format!("Failed to send transaction: {}", e)))?;

		let tx_hash = *pending_tx.tx_hash();
		let hash_str = with_0x_prefix(&hex::encode(tx_hash));
		tracing::info!(tx_hash = %hash_str, contract = %self.contract, "Submitted lot transaction");

		let receipt = pending_tx
			.with_required_confirmations(self.confirmations)
			.with_timeout(Some(self.receipt_timeout))
			.get_receipt()
			.await
			.map_err(|e| {
				LedgerError::Network(format!("Failed to get receipt for {}: {}", hash_str, e))
			})?;

		let logs = receipt
			.inner
			.logs()
			.iter()
			.map(|log| LogEntry {
				address: log.inner.address,
				topics: log.inner.data.topics().to_vec(),
				data: log.inner.data.data.clone(),
			})
			.collect::<Vec<_>>();

		tracing::debug!(
			tx_hash = %hash_str,
			logs = logs.len(),
			success = receipt.status(),
			"Received lot receipt"
		);

		Ok(LedgerReceipt {
			tx_hash: receipt.transaction_hash,
			block_number: receipt.block_number.unwrap_or(0),
			success: receipt.status(),
			logs,
		})
	}
}

/// Builds an [`AlloyLedger`] from configuration.
///
/// Configuration parameters:
/// - `poll_interval_ms` (optional): receipt polling interval, default 1000
/// - `confirmations` (optional): confirmations to wait for, default 1
pub fn create_ledger(
	config: &toml::Value,
	binding: &LedgerBinding,
	signing_key: &SecretString,
) -> Result<Box<dyn crate::LedgerInterface>, LedgerError> {
	AlloyLedgerSchema
		.validate(config)
		.map_err(|e| LedgerError::Configuration(format!("Invalid configuration: {}", e)))?;

	let poll_interval_ms = config
		.get("poll_interval_ms")
		.and_then(|v| v.as_integer())
		.unwrap_or(1000) as u64;
	let confirmations = config
		.get("confirmations")
		.and_then(|v| v.as_integer())
		.unwrap_or(1) as u64;

	let signer: PrivateKeySigner = signing_key.with_exposed(|key| {
		key.parse()
			.map_err(|_| LedgerError::Configuration("Invalid signing key format".to_string()))
	})?;

	let ledger = AlloyLedger::new(
		binding,
		signer,
		Duration::from_millis(poll_interval_ms),
		confirmations,
	)?;
	Ok(Box::new(ledger))
}

/// Registry for the alloy ledger implementation.
pub struct Registry;

impl registry_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "evm_alloy";
	type Factory = crate::LedgerFactory;

	fn factory() -> Self::Factory {
		create_ledger
	}
}

impl crate::LedgerRegistry for Registry {}
