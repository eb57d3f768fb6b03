//! Local private-key wallet.
//!
//! Holds a single key from configuration and grants its address as the only
//! account. Suitable for a warehouse terminal with a dedicated operator key.

use crate::{WalletError, WalletInterface};
use alloy_primitives::Address;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use registry_types::{
	with_0x_prefix, without_0x_prefix, ConfigSchema, Field, FieldType, Schema, SecretString,
	ValidationError,
};

/// Wallet backed by one in-memory private key.
pub struct LocalWallet {
	signer: PrivateKeySigner,
	private_key: SecretString,
}

impl LocalWallet {
	/// Parses the key and derives the account address.
	pub fn new(private_key: &SecretString) -> Result<Self, WalletError> {
		let signer: PrivateKeySigner = private_key.with_exposed(|key| {
			key.parse()
				.map_err(|_| WalletError::InvalidKey("Invalid private key format".to_string()))
		})?;
		let private_key = private_key.with_exposed(|key| SecretString::new(with_0x_prefix(key)));

		Ok(Self {
			signer,
			private_key,
		})
	}
}

/// Configuration schema for [`LocalWallet`].
pub struct LocalWalletSchema;

impl ConfigSchema for LocalWalletSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![
				Field::new("private_key", FieldType::String).with_validator(|value| {
					let hex = without_0x_prefix(value.as_str().unwrap_or_default());
					if hex.len() != 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
						return Err("private_key must be 32 bytes of hex".to_string());
					}
					Ok(())
				}),
			],
			vec![],
		);
		schema.validate(config)
	}
}

#[async_trait]
impl WalletInterface for LocalWallet {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(LocalWalletSchema)
	}

	async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
		Ok(vec![self.signer.address()])
	}

	fn signing_key(&self) -> SecretString {
		self.private_key.clone()
	}
}

/// Builds a [`LocalWallet`] from configuration.
///
/// Configuration parameters:
/// - `private_key` (required): hex private key, usually `${REGISTRY_PRIVATE_KEY}`
pub fn create_wallet(config: &toml::Value) -> Result<Box<dyn WalletInterface>, WalletError> {
	LocalWalletSchema
		.validate(config)
		.map_err(|e| WalletError::InvalidKey(format!("Invalid configuration: {}", e)))?;

	let private_key = config
		.get("private_key")
		.and_then(|v| v.as_str())
		.map(SecretString::from)
		.ok_or_else(|| WalletError::InvalidKey("private_key is required".to_string()))?;

	Ok(Box::new(LocalWallet::new(&private_key)?))
}

/// Registry for the local wallet implementation.
pub struct Registry;

impl registry_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "local";
	type Factory = crate::WalletFactory;

	fn factory() -> Self::Factory {
		create_wallet
	}
}

impl crate::WalletRegistry for Registry {}
