//! Assembles an [`OrderForm`] from configuration and implementation factories.
//!
//! Only the primary implementation of each collaborator is built. The ledger
//! factory receives the wallet's signing key so that transactions are signed
//! by the same account the form displays.

use crate::diagnostics::DiagnosticProbe;
use crate::{EventBus, FormSettings, OrderForm};
use registry_config::Config;
use registry_ledger::{LedgerBinding, LedgerError, LedgerInterface, LedgerService};
use registry_location::{LocationError, LocationInterface};
use registry_qr::SvgQrEncoder;
use registry_types::{ConfigSchema, SecretString};
use registry_wallet::{WalletError, WalletInterface, WalletService};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Timeout of the diagnostic probe's HTTP client.
const DIAGNOSTIC_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur while assembling a form.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Missing required component: {0}")]
	MissingComponent(String),
}

/// Factory functions for each collaborator, keyed by implementation name.
pub struct RegistryFactories<WF, LF, LOF> {
	pub wallet_factories: HashMap<String, WF>,
	pub ledger_factories: HashMap<String, LF>,
	pub location_factories: HashMap<String, LOF>,
}

/// Builder for an [`OrderForm`] with pluggable implementations.
pub struct RegistryBuilder {
	config: Config,
}

impl RegistryBuilder {
	/// Creates a builder over an already validated configuration.
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Builds the primary implementation of every collaborator and wires
	/// them into an unmounted form.
	///
	/// Each implementation's table is checked against its own schema after
	/// construction.
	pub fn build<WF, LF, LOF>(
		self,
		factories: RegistryFactories<WF, LF, LOF>,
	) -> Result<OrderForm, BuilderError>
	where
		WF: Fn(&toml::Value) -> Result<Box<dyn WalletInterface>, WalletError>,
		LF: Fn(
			&toml::Value,
			&LedgerBinding,
			&SecretString,
		) -> Result<Box<dyn LedgerInterface>, LedgerError>,
		LOF: Fn(&toml::Value) -> Result<Box<dyn LocationInterface>, LocationError>,
	{
		let config = &self.config;
		let config_error = |e: registry_config::ConfigError| BuilderError::Config(e.to_string());

		let wallet_impl = create_primary(
			"wallet",
			&config.wallet.primary,
			&factories.wallet_factories,
			|factory| {
				let table = config.primary_wallet().map_err(config_error)?;
				let wallet = factory(table).map_err(to_config)?;
				check_schema(wallet.config_schema().as_ref(), table)?;
				Ok(wallet)
			},
		)?;
		let wallet = WalletService::new(wallet_impl);

		let binding = LedgerBinding {
			chain_id: config.ledger.chain_id,
			rpc_url: config.ledger.rpc_url.clone(),
			contract: config.ledger.contract_address,
			receipt_timeout: Duration::from_secs(config.registry.receipt_timeout_seconds),
		};
		let signing_key = wallet.signing_key();
		let ledger_impl = create_primary(
			"ledger",
			&config.ledger.primary,
			&factories.ledger_factories,
			|factory| {
				let table = config.primary_ledger().map_err(config_error)?;
				let ledger = factory(table, &binding, &signing_key).map_err(to_config)?;
				check_schema(ledger.config_schema().as_ref(), table)?;
				Ok(ledger)
			},
		)?;
		let ledger = LedgerService::new(ledger_impl, config.ledger.contract_address);

		let location = create_primary(
			"location",
			&config.location.primary,
			&factories.location_factories,
			|factory| {
				let table = config.primary_location().map_err(config_error)?;
				let location = factory(table).map_err(to_config)?;
				check_schema(location.config_schema().as_ref(), table)?;
				Ok(location)
			},
		)?;

		let diagnostics = match (config.diagnostics.enabled, &config.diagnostics.url) {
			(true, Some(url)) => {
				let probe = DiagnosticProbe::new(url.clone(), DIAGNOSTIC_TIMEOUT)
					.map_err(|e| BuilderError::Config(format!("Diagnostic client: {}", e)))?;
				tracing::info!(component = "diagnostics", url = %url, "Loaded");
				Some(probe)
			},
			_ => None,
		};

		let qr = SvgQrEncoder::new(config.qr.min_dimension);

		Ok(OrderForm::new(
			FormSettings::from(config),
			Arc::new(wallet),
			Arc::new(ledger),
			Arc::from(location),
			Arc::new(qr),
			diagnostics,
			EventBus::new(1000),
		))
	}
}

fn to_config(e: impl std::fmt::Display) -> BuilderError {
	BuilderError::Config(e.to_string())
}

/// Validates an implementation's table against the schema it declares.
fn check_schema(schema: &dyn ConfigSchema, table: &toml::Value) -> Result<(), BuilderError> {
	schema
		.validate(table)
		.map_err(|e| BuilderError::Config(format!("Invalid configuration: {}", e)))
}

/// Looks up the primary factory and builds the implementation with it.
fn create_primary<F, T>(
	component: &str,
	primary: &str,
	factories: &HashMap<String, F>,
	build: impl FnOnce(&F) -> Result<T, BuilderError>,
) -> Result<T, BuilderError> {
	let factory = factories.get(primary).ok_or_else(|| {
		BuilderError::MissingComponent(format!(
			"No {} implementation named '{}'",
			component, primary
		))
	})?;

	match build(factory) {
		Ok(implementation) => {
			tracing::info!(component, implementation = %primary, "Loaded");
			Ok(implementation)
		},
		Err(e) => {
			tracing::error!(
				component,
				implementation = %primary,
				error = %e,
				"Failed to create implementation"
			);
			Err(e)
		},
	}
}
