//! Location sources for the grain lot registry.
//!
//! A lot is stamped with the coordinates of the warehouse it was registered
//! at. The form reads one position at mount and never refreshes it.

use async_trait::async_trait;
use registry_types::{ConfigSchema, GeoReading, ImplementationRegistry};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod fixed;
	pub mod http;
}

/// Errors that can occur while reading a position.
#[derive(Debug, Error)]
pub enum LocationError {
	/// The position service could not be reached.
	#[error("Network error: {0}")]
	Network(String),
	/// The position service answered with something unusable.
	#[error("Invalid response: {0}")]
	InvalidResponse(String),
	/// The implementation was configured incorrectly.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Interface every location source provides.
#[async_trait]
pub trait LocationInterface: Send + Sync {
	/// Schema of this implementation's configuration table.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Reads the current position once.
	async fn current_position(&self) -> Result<GeoReading, LocationError>;
}

/// Factory building a location source from its configuration table.
pub type LocationFactory = fn(&toml::Value) -> Result<Box<dyn LocationInterface>, LocationError>;

/// Registry trait for location implementations.
pub trait LocationRegistry: ImplementationRegistry<Factory = LocationFactory> {}

/// All location implementations, as `(name, factory)` pairs.
pub fn get_all_implementations() -> Vec<(&'static str, LocationFactory)> {
	use implementations::{fixed, http};

	vec![
		(fixed::Registry::NAME, fixed::Registry::factory()),
		(http::Registry::NAME, http::Registry::factory()),
	]
}

/// Checks that a coordinate pair is on the globe.
pub(crate) fn check_coordinates(latitude: f64, longitude: f64) -> Result<(), LocationError> {
	if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
		return Err(LocationError::InvalidResponse(format!(
			"coordinates out of range: {}, {}",
			latitude, longitude
		)));
	}
	Ok(())
}
