//! Wallet provider for the grain lot registry.
//!
//! A wallet grants the operator's account to the form and exposes the key
//! material the ledger binding signs with. Implementations register under a
//! configuration name and are built from their own TOML table.

use async_trait::async_trait;
use registry_types::{Address, ConfigSchema, ImplementationRegistry, SecretString};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod local;
}

/// Errors that can occur during wallet operations.
#[derive(Debug, Error)]
pub enum WalletError {
	/// The wallet refused or could not grant any account.
	#[error("No accounts available")]
	NoAccounts,
	/// Key material is missing or malformed.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	/// Implementation-specific failure.
	#[error("Implementation error: {0}")]
	Implementation(String),
}

/// Interface every wallet implementation provides.
#[async_trait]
pub trait WalletInterface: Send + Sync {
	/// Schema of this implementation's configuration table.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Requests the accounts the operator grants to the registry.
	///
	/// The first account is the one lots are registered from.
	async fn request_accounts(&self) -> Result<Vec<Address>, WalletError>;

	/// Private key for the ledger binding's signer, `0x`-prefixed.
	fn signing_key(&self) -> SecretString;
}

/// Factory building a wallet from its configuration table.
pub type WalletFactory = fn(&toml::Value) -> Result<Box<dyn WalletInterface>, WalletError>;

/// Registry trait for wallet implementations.
pub trait WalletRegistry: ImplementationRegistry<Factory = WalletFactory> {}

/// All wallet implementations, as `(name, factory)` pairs.
pub fn get_all_implementations() -> Vec<(&'static str, WalletFactory)> {
	use implementations::local;

	vec![(local::Registry::NAME, local::Registry::factory())]
}

/// Service wrapping the configured wallet implementation.
pub struct WalletService {
	implementation: Box<dyn WalletInterface>,
}

impl WalletService {
	/// Wraps the configured wallet implementation.
	pub fn new(implementation: Box<dyn WalletInterface>) -> Self {
		Self { implementation }
	}

	/// Returns the primary account: the first one the wallet grants.
	pub async fn primary_account(&self) -> Result<Address, WalletError> {
		let accounts = self.implementation.request_accounts().await?;
		let account = accounts.first().copied().ok_or(WalletError::NoAccounts)?;
		tracing::debug!(
			account = %account.to_checksum(None),
			granted = accounts.len(),
			"Wallet granted accounts"
		);
		Ok(account)
	}

	/// Key material for the ledger binding.
	pub fn signing_key(&self) -> SecretString {
		self.implementation.signing_key()
	}
}
