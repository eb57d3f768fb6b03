//! Ledger binding for the grain lot registry.
//!
//! The ledger is the contract layer that durably records a lot. The registry
//! performs exactly one write, `createLotNFT`, and reads the lot identifier
//! back from the typed mint event in the receipt.

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use registry_types::{
	ConfigSchema, ImplementationRegistry, LedgerReceipt, LotRequest, SecretString,
	SubmissionResult,
};
use std::time::Duration;
use thiserror::Error;

pub mod contract;
pub mod decode;

/// Re-export implementations
pub mod implementations {
	pub mod evm {
		pub mod alloy;
	}
}

/// Errors that can occur while talking to the ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
	/// The node could not be reached or rejected the request.
	#[error("Network error: {0}")]
	Network(String),
	/// The transaction was mined but reverted.
	#[error("Transaction reverted: {0}")]
	Reverted(String),
	/// The receipt did not carry the expected mint event.
	#[error("Lot event missing: {0}")]
	MissingEvent(String),
	/// A log matched the event signature but did not decode.
	#[error("Event decode failed: {0}")]
	EventDecode(String),
	/// The binding was configured incorrectly.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Static binding parameters shared by every ledger implementation.
#[derive(Debug, Clone)]
pub struct LedgerBinding {
	/// Chain the contract lives on.
	pub chain_id: u64,
	/// JSON-RPC endpoint of the ledger node.
	pub rpc_url: String,
	/// Lot contract address.
	pub contract: Address,
	/// Upper bound on waiting for a receipt.
	pub receipt_timeout: Duration,
}

/// Interface every ledger implementation provides.
#[async_trait]
pub trait LedgerInterface: Send + Sync {
	/// Schema of this implementation's configuration table.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Reads the chain id reported by the ledger node.
	async fn chain_id(&self) -> Result<u64, LedgerError>;

	/// Signs and sends `createLotNFT`, then waits for the receipt.
	async fn create_lot(&self, request: &LotRequest) -> Result<LedgerReceipt, LedgerError>;
}

/// Factory building a ledger from its configuration table, the binding, and
/// the wallet key it signs with.
pub type LedgerFactory = fn(
	&toml::Value,
	&LedgerBinding,
	&SecretString,
) -> Result<Box<dyn LedgerInterface>, LedgerError>;

/// Registry trait for ledger implementations.
pub trait LedgerRegistry: ImplementationRegistry<Factory = LedgerFactory> {}

/// All ledger implementations, as `(name, factory)` pairs.
pub fn get_all_implementations() -> Vec<(&'static str, LedgerFactory)> {
	use implementations::evm::alloy;

	vec![(alloy::Registry::NAME, alloy::Registry::factory())]
}

/// Service that registers lots through the configured ledger implementation.
pub struct LedgerService {
	implementation: Box<dyn LedgerInterface>,
	contract: Address,
}

impl LedgerService {
	/// Wraps an implementation bound to `contract`. Mint events from any
	/// other emitter are ignored.
	pub fn new(implementation: Box<dyn LedgerInterface>, contract: Address) -> Self {
		Self {
			implementation,
			contract,
		}
	}

	/// Address of the bound lot contract.
	pub fn contract(&self) -> Address {
		self.contract
	}

	/// Network metadata read used to confirm the node serves the expected chain.
	pub async fn chain_id(&self) -> Result<u64, LedgerError> {
		self.implementation.chain_id().await
	}

	/// Registers one lot and returns its decoded identifier.
	///
	/// Fails if the transaction reverts or if the receipt carries no mint
	/// event from the bound contract.
	pub async fn register_lot(&self, request: &LotRequest) -> Result<SubmissionResult, LedgerError> {
		let receipt = self.implementation.create_lot(request).await?;
		let tx_hash = hex::encode(receipt.tx_hash);

		if !receipt.success {
			return Err(LedgerError::Reverted(format!("0x{}", tx_hash)));
		}

		let lot_id: U256 = decode::decode_lot_id(&receipt, self.contract)?;
		tracing::info!(
			lot_id = %lot_id,
			tx_hash = %registry_types::truncate_id(&format!("0x{}", tx_hash)),
			block = receipt.block_number,
			"Lot registered"
		);

		Ok(SubmissionResult {
			lot_id: lot_id.to_string(),
			tx_hash: receipt.tx_hash,
			block_number: receipt.block_number,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::contract::Transfer;
	use alloy_sol_types::SolEvent;
	use registry_types::{LogEntry, B256};

	struct NoFields;

	impl ConfigSchema for NoFields {
		fn validate(
			&self,
			config: &toml::Value,
		) -> Result<(), registry_types::ValidationError> {
			registry_types::Schema::new(vec![], vec![]).validate(config)
		}
	}

	struct FixedLedger(LedgerReceipt);

	#[async_trait]
	impl LedgerInterface for FixedLedger {
		fn config_schema(&self) -> Box<dyn ConfigSchema> {
			Box::new(NoFields)
		}

		async fn chain_id(&self) -> Result<u64, LedgerError> {
			Ok(31337)
		}

		async fn create_lot(&self, _request: &LotRequest) -> Result<LedgerReceipt, LedgerError> {
			Ok(self.0.clone())
		}
	}

	fn request() -> LotRequest {
		LotRequest::new(
			&Default::default(),
			&Default::default(),
			Default::default(),
		)
	}

	fn mint_log(contract: Address, token_id: u64) -> LogEntry {
		let data = Transfer {
			from: Address::ZERO,
			to: Address::repeat_byte(0x11),
			tokenId: U256::from(token_id),
		}
		.encode_log_data();
		LogEntry {
			address: contract,
			topics: data.topics().to_vec(),
			data: data.data,
		}
	}

	#[tokio::test]
	async fn test_register_lot_decodes_token_id() {
		let contract = Address::repeat_byte(0x0c);
		let receipt = LedgerReceipt {
			tx_hash: B256::repeat_byte(0xaa),
			block_number: 7,
			success: true,
			logs: vec![mint_log(contract, 42)],
		};
		let service = LedgerService::new(Box::new(FixedLedger(receipt)), contract);

		let result = service.register_lot(&request()).await.unwrap();
		assert_eq!(result.lot_id, "42");
		assert_eq!(result.block_number, 7);
		assert_eq!(result.tx_hash, B256::repeat_byte(0xaa));
	}

	#[tokio::test]
	async fn test_reverted_receipt_is_an_error() {
		let contract = Address::repeat_byte(0x0c);
		let receipt = LedgerReceipt {
			tx_hash: B256::repeat_byte(0xbb),
			block_number: 7,
			success: false,
			logs: vec![mint_log(contract, 42)],
		};
		let service = LedgerService::new(Box::new(FixedLedger(receipt)), contract);

		let err = service.register_lot(&request()).await.unwrap_err();
		assert!(matches!(err, LedgerError::Reverted(hash) if hash.starts_with("0xbbbb")));
	}
}
