//! Configuration for the grain lot registry.
//!
//! Configuration is read from TOML. `${VAR}` and `${VAR:-default}` references
//! are substituted from the environment before parsing, which is how wallet
//! keys are supplied without writing them to disk.
//!
//! ## Modular Configuration Support
//!
//! A file may pull in others with `include = ["ledger.toml", "wallet.toml"]`.
//! Each top-level section must be defined in exactly one file.

mod loader;

#[cfg(feature = "testing")]
pub mod builders {
	pub mod config;
}

use regex::Regex;
use registry_types::{Address, SensorReadings};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("Configuration error: {0}")]
	Parse(String),
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message, drop the echoed input
		ConfigError::Parse(err.message().to_string())
	}
}

/// Root configuration of a registry instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Identity of this registry instance.
	pub registry: RegistryConfig,
	/// Lot contract and ledger node.
	pub ledger: LedgerConfig,
	/// Wallet providing the operator account and signer.
	pub wallet: WalletConfig,
	/// Source of the warehouse location.
	pub location: LocationConfig,
	/// QR rendering options.
	#[serde(default)]
	pub qr: QrConfig,
	/// Sensor values attached to every lot.
	#[serde(default)]
	pub sensors: SensorReadings,
	/// Optional diagnostic probe fired at mount.
	#[serde(default)]
	pub diagnostics: DiagnosticsConfig,
	/// HTTP API serving the order form.
	pub api: Option<ApiConfig>,
}

/// Identity of this registry instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistryConfig {
	/// Name used in logs, typically the warehouse id.
	pub id: String,
	/// How long to wait for a lot transaction to be mined.
	#[serde(default = "default_receipt_timeout_seconds")]
	pub receipt_timeout_seconds: u64,
}

fn default_receipt_timeout_seconds() -> u64 {
	120
}

/// Ledger binding: which node, which chain, which contract.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LedgerConfig {
	/// Implementation to use from `implementations`.
	pub primary: String,
	/// Chain the contract is deployed on. The node must report the same id.
	pub chain_id: u64,
	/// HTTP(S) JSON-RPC endpoint of the ledger node.
	pub rpc_url: String,
	/// Address of the lot contract.
	pub contract_address: Address,
	/// Implementation-specific tables.
	#[serde(default)]
	pub implementations: HashMap<String, toml::Value>,
}

/// Wallet selection.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WalletConfig {
	pub primary: String,
	pub implementations: HashMap<String, toml::Value>,
}

/// Location source selection.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocationConfig {
	pub primary: String,
	pub implementations: HashMap<String, toml::Value>,
}

/// QR rendering options.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QrConfig {
	/// Minimum width and height of the rendered symbol, in pixels.
	#[serde(default = "default_qr_min_dimension")]
	pub min_dimension: u32,
}

impl Default for QrConfig {
	fn default() -> Self {
		Self {
			min_dimension: default_qr_min_dimension(),
		}
	}
}

fn default_qr_min_dimension() -> u32 {
	200
}

/// Diagnostic probe settings. Disabled unless explicitly enabled with a URL.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DiagnosticsConfig {
	#[serde(default)]
	pub enabled: bool,
	pub url: Option<String>,
}

/// HTTP API settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	#[serde(default)]
	pub enabled: bool,
	#[serde(default = "default_api_host")]
	pub host: String,
	#[serde(default = "default_api_port")]
	pub port: u16,
	/// Request timeout in seconds. Submissions wait for the receipt, so this
	/// should exceed `registry.receipt_timeout_seconds`.
	#[serde(default = "default_api_timeout")]
	pub timeout_seconds: u64,
	/// Origins allowed by CORS. Empty means any origin.
	#[serde(default)]
	pub allowed_origins: Vec<String>,
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	3000
}

fn default_api_timeout() -> u64 {
	180
}

fn is_http_url(url: &str) -> bool {
	url.starts_with("http://") || url.starts_with("https://")
}

/// Resolves environment variables in a string.
///
/// Replaces `${VAR_NAME}` with the value of `VAR_NAME`, or with `default`
/// for `${VAR_NAME:-default}` when the variable is unset.
///
/// Input is limited to 1MB.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last_end = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match cap.get(2) {
				Some(default) => default.as_str().to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)))
				},
			},
		};

		result.push_str(&input[last_end..full_match.start()]);
		result.push_str(&value);
		last_end = full_match.end();
	}
	result.push_str(&input[last_end..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a file, following `include` directives.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
		let file_name = path.file_name().ok_or_else(|| {
			ConfigError::Validation(format!("Invalid path: {}", path.display()))
		})?;

		let mut loader = loader::ConfigLoader::new(base_dir);
		loader.load_config(file_name).await
	}

	/// Parses already-resolved TOML and validates it.
	pub(crate) fn from_resolved_str(s: &str) -> Result<Self, ConfigError> {
		let config: Config = toml::from_str(s)?;
		config.validate()?;
		Ok(config)
	}

	/// Returns the table configured for the primary wallet implementation.
	pub fn primary_wallet(&self) -> Result<&toml::Value, ConfigError> {
		primary_table("wallet", &self.wallet.primary, &self.wallet.implementations)
	}

	/// Returns the table configured for the primary ledger implementation.
	pub fn primary_ledger(&self) -> Result<&toml::Value, ConfigError> {
		primary_table("ledger", &self.ledger.primary, &self.ledger.implementations)
	}

	/// Returns the table configured for the primary location implementation.
	pub fn primary_location(&self) -> Result<&toml::Value, ConfigError> {
		primary_table(
			"location",
			&self.location.primary,
			&self.location.implementations,
		)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.registry.id.is_empty() {
			return Err(ConfigError::Validation("Registry ID cannot be empty".into()));
		}
		if self.registry.receipt_timeout_seconds == 0 {
			return Err(ConfigError::Validation(
				"receipt_timeout_seconds must be at least 1".into(),
			));
		}
		if self.registry.receipt_timeout_seconds > 3600 {
			return Err(ConfigError::Validation(
				"receipt_timeout_seconds cannot exceed 3600".into(),
			));
		}

		if self.ledger.chain_id == 0 {
			return Err(ConfigError::Validation(
				"Ledger chain_id must be greater than 0".into(),
			));
		}
		if !is_http_url(&self.ledger.rpc_url) {
			return Err(ConfigError::Validation(format!(
				"Ledger rpc_url must be an http(s) URL, got '{}'",
				self.ledger.rpc_url
			)));
		}
		if self.ledger.contract_address == Address::ZERO {
			return Err(ConfigError::Validation(
				"Ledger contract_address cannot be the zero address".into(),
			));
		}

		self.primary_ledger()?;
		self.primary_wallet()?;
		self.primary_location()?;

		if !(21..=4096).contains(&self.qr.min_dimension) {
			return Err(ConfigError::Validation(format!(
				"qr.min_dimension must be between 21 and 4096, got {}",
				self.qr.min_dimension
			)));
		}

		if self.diagnostics.enabled {
			match &self.diagnostics.url {
				Some(url) if is_http_url(url) => {},
				Some(url) => {
					return Err(ConfigError::Validation(format!(
						"diagnostics.url must be an http(s) URL, got '{}'",
						url
					)))
				},
				None => {
					return Err(ConfigError::Validation(
						"diagnostics.url is required when diagnostics are enabled".into(),
					))
				},
			}
		}

		if let Some(ref api) = self.api {
			if api.enabled && api.port == 0 {
				return Err(ConfigError::Validation(
					"API port must be greater than 0".into(),
				));
			}
		}

		Ok(())
	}
}

fn primary_table<'a>(
	section: &str,
	primary: &str,
	implementations: &'a HashMap<String, toml::Value>,
) -> Result<&'a toml::Value, ConfigError> {
	if primary.is_empty() {
		return Err(ConfigError::Validation(format!(
			"{} primary implementation cannot be empty",
			section
		)));
	}
	implementations.get(primary).ok_or_else(|| {
		ConfigError::Validation(format!(
			"Primary {} '{}' not found in implementations",
			section, primary
		))
	})
}

/// Parses configuration from a TOML string.
///
/// Environment variables are resolved and the result validated.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		Config::from_resolved_str(&resolved)
	}
}
