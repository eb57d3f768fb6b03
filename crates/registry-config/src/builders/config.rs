//! Builder for test and development configurations.

use crate::{
	Config, DiagnosticsConfig, LedgerConfig, LocationConfig, QrConfig, RegistryConfig,
	WalletConfig,
};
use registry_types::{Address, SensorReadings};
use std::collections::HashMap;

/// Fluent builder producing a [`Config`] with defaults suitable for tests.
///
/// Implementation tables are left empty; tests inject collaborators directly.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
	receipt_timeout_seconds: u64,
	chain_id: u64,
	rpc_url: String,
	diagnostics: DiagnosticsConfig,
}

impl Default for ConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigBuilder {
	/// Starts from a local devnet on chain 31337 with every primary named
	/// `mock`.
	pub fn new() -> Self {
		Self {
			receipt_timeout_seconds: 30,
			chain_id: 31337,
			rpc_url: "http://localhost:8545".to_string(),
			diagnostics: DiagnosticsConfig::default(),
		}
	}

	/// Sets the chain the ledger must report.
	pub fn chain_id(mut self, chain_id: u64) -> Self {
		self.chain_id = chain_id;
		self
	}

	/// Enables the diagnostic probe against `url`.
	pub fn diagnostics_url(mut self, url: impl Into<String>) -> Self {
		self.diagnostics = DiagnosticsConfig {
			enabled: true,
			url: Some(url.into()),
		};
		self
	}

	/// Produces the configuration without running validation.
	pub fn build(self) -> Config {
		Config {
			registry: RegistryConfig {
				id: "test-registry".to_string(),
				receipt_timeout_seconds: self.receipt_timeout_seconds,
			},
			ledger: LedgerConfig {
				primary: "mock".to_string(),
				chain_id: self.chain_id,
				rpc_url: self.rpc_url,
				contract_address: Address::repeat_byte(0x0c),
				implementations: HashMap::from([(
					"mock".to_string(),
					toml::Value::Table(Default::default()),
				)]),
			},
			wallet: WalletConfig {
				primary: "mock".to_string(),
				implementations: HashMap::from([(
					"mock".to_string(),
					toml::Value::Table(Default::default()),
				)]),
			},
			location: LocationConfig {
				primary: "mock".to_string(),
				implementations: HashMap::from([(
					"mock".to_string(),
					toml::Value::Table(Default::default()),
				)]),
			},
			qr: QrConfig::default(),
			sensors: SensorReadings::default(),
			diagnostics: self.diagnostics,
			api: None,
		}
	}
}
