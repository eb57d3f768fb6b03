//! Main entry point for the grain lot registry.
//!
//! `serve` mounts an order form and exposes it over the HTTP API until
//! interrupted. `register` mounts a form, registers a single lot from the
//! command line, prints its identifier and optionally writes the QR code.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::{Parser, Subcommand};
use registry_config::Config;
use registry_core::{OrderForm, RegistryBuilder, RegistryFactories};
use registry_types::{LotField, Readiness};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

mod server;

/// Command-line arguments for the registry.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Serve the order form over HTTP (default)
	Serve,
	/// Register one lot and print its identifier
	Register {
		#[arg(long)]
		grain_type: String,
		#[arg(long)]
		description: String,
		#[arg(long)]
		certificate_url: String,
		/// Weight in kilograms
		#[arg(long)]
		weight: String,
		/// Declared storage temperature
		#[arg(long, default_value = "1")]
		temperature: String,
		/// Declared storage humidity
		#[arg(long, default_value = "1")]
		humidity: String,
		/// Write the lot's QR code to this SVG file
		#[arg(long)]
		qr_out: Option<PathBuf>,
	},
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	tracing::info!("Started grain registry");

	let config = Config::from_file(&args.config).await?;
	tracing::info!("Loaded configuration [{}]", config.registry.id);

	let form = Arc::new(build_form(config.clone())?);
	spawn_event_logger(&form);

	let outcome = match args.command.unwrap_or(Command::Serve) {
		Command::Serve => serve(&config, &form).await,
		Command::Register {
			grain_type,
			description,
			certificate_url,
			weight,
			temperature,
			humidity,
			qr_out,
		} => {
			let fields = [
				(LotField::GrainType, grain_type),
				(LotField::Description, description),
				(LotField::CertificateUrl, certificate_url),
				(LotField::Weight, weight),
				(LotField::Temperature, temperature),
				(LotField::Humidity, humidity),
			];
			register(&form, fields, qr_out).await
		},
	};

	form.unmount().await;
	tracing::info!("Stopped grain registry");
	outcome
}

/// Builds the order form with every available implementation registered.
fn build_form(config: Config) -> Result<OrderForm, Box<dyn std::error::Error>> {
	let wallet_factories = registry_wallet::get_all_implementations()
		.into_iter()
		.map(|(name, factory)| (name.to_string(), factory))
		.collect::<HashMap<_, _>>();
	let ledger_factories = registry_ledger::get_all_implementations()
		.into_iter()
		.map(|(name, factory)| (name.to_string(), factory))
		.collect::<HashMap<_, _>>();
	let location_factories = registry_location::get_all_implementations()
		.into_iter()
		.map(|(name, factory)| (name.to_string(), factory))
		.collect::<HashMap<_, _>>();

	let factories = RegistryFactories {
		wallet_factories,
		ledger_factories,
		location_factories,
	};

	Ok(RegistryBuilder::new(config).build(factories)?)
}

/// Logs every form event at debug level.
fn spawn_event_logger(form: &OrderForm) {
	let mut events = form.event_bus().subscribe();
	tokio::spawn(async move {
		loop {
			match events.recv().await {
				Ok(event) => tracing::debug!(event = ?event, "Form event"),
				Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
					tracing::warn!(skipped, "Event logger lagged");
				},
				Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
			}
		}
	});
}

async fn serve(config: &Config, form: &Arc<OrderForm>) -> Result<(), Box<dyn std::error::Error>> {
	let api_config = match &config.api {
		Some(api) if api.enabled => api.clone(),
		_ => return Err("API is disabled; enable [api] to serve the order form".into()),
	};

	form.mount().await;

	tokio::select! {
		result = server::start_server(api_config, Arc::clone(form)) => {
			tracing::info!("API server finished");
			result
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received interrupt");
			Ok(())
		}
	}
}

async fn register(
	form: &Arc<OrderForm>,
	fields: [(LotField, String); 6],
	qr_out: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
	form.mount().await;

	let readiness = form.wait_ready().await;
	if readiness != Readiness::Ready {
		return Err(format!("Wallet not ready ({})", readiness).into());
	}

	for (field, value) in fields {
		form.on_field_change(field, value).await;
	}

	let result = form.submit().await?;
	println!("lot_id: {}", result.lot_id);
	println!("tx_hash: {}", result.tx_hash);
	println!("block: {}", result.block_number);

	let view = form.view().await;
	let Some(qr) = view.qr else {
		tracing::warn!(lot_id = %result.lot_id, "No QR code rendered");
		return Ok(());
	};
	println!("qr: {}", qr.data_uri);

	if let Some(path) = qr_out {
		let encoded = qr
			.data_uri
			.strip_prefix("data:image/svg+xml;base64,")
			.ok_or("Unexpected QR data URI")?;
		tokio::fs::write(&path, STANDARD.decode(encoded)?).await?;
		tracing::info!(path = %path.display(), "Wrote QR code");
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_register_arguments() {
		let args = Args::try_parse_from([
			"grain-registry",
			"--config",
			"site.toml",
			"register",
			"--grain-type",
			"Wheat",
			"--description",
			"Durum",
			"--certificate-url",
			"https://certs/1",
			"--weight",
			"500",
			"--qr-out",
			"lot.svg",
		])
		.unwrap();

		assert_eq!(args.config, PathBuf::from("site.toml"));
		match args.command {
			Some(Command::Register {
				grain_type,
				temperature,
				qr_out,
				..
			}) => {
				assert_eq!(grain_type, "Wheat");
				assert_eq!(temperature, "1");
				assert_eq!(qr_out, Some(PathBuf::from("lot.svg")));
			},
			other => panic!("unexpected command {:?}", other),
		}
	}

	#[test]
	fn test_serve_is_default() {
		let args = Args::try_parse_from(["grain-registry"]).unwrap();
		assert!(args.command.is_none());
		assert_eq!(args.log_level, "info");
	}

	#[tokio::test]
	async fn test_build_form_rejects_unknown_primary() {
		let config = registry_config::builders::config::ConfigBuilder::new().build();
		let err = build_form(config).err().unwrap();
		assert!(err.to_string().contains("mock"));
	}
}
