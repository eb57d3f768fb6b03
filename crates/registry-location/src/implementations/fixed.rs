//! Fixed warehouse coordinates from configuration.

use crate::{check_coordinates, LocationError, LocationInterface};
use async_trait::async_trait;
use registry_types::{ConfigSchema, Field, FieldType, GeoReading, Schema, ValidationError};

/// Location source returning the configured coordinates.
pub struct FixedLocation {
	reading: GeoReading,
}

impl FixedLocation {
	/// Fails if the coordinates are not on the globe.
	pub fn new(latitude: f64, longitude: f64) -> Result<Self, LocationError> {
		check_coordinates(latitude, longitude)
			.map_err(|e| LocationError::Configuration(e.to_string()))?;
		Ok(Self {
			reading: GeoReading::from_degrees(latitude, longitude),
		})
	}
}

/// Configuration schema for [`FixedLocation`].
pub struct FixedLocationSchema;

impl ConfigSchema for FixedLocationSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![
				Field::new(
					"latitude",
					FieldType::Float {
						min: Some(-90.0),
						max: Some(90.0),
					},
				),
				Field::new(
					"longitude",
					FieldType::Float {
						min: Some(-180.0),
						max: Some(180.0),
					},
				),
			],
			vec![],
		);
		schema.validate(config)
	}
}

#[async_trait]
impl LocationInterface for FixedLocation {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(FixedLocationSchema)
	}

	async fn current_position(&self) -> Result<GeoReading, LocationError> {
		Ok(self.reading.clone())
	}
}

fn as_degrees(config: &toml::Value, key: &str) -> Option<f64> {
	config
		.get(key)
		.and_then(|v| v.as_float().or_else(|| v.as_integer().map(|i| i as f64)))
}

/// Builds a [`FixedLocation`] from configuration.
///
/// Configuration parameters:
/// - `latitude` (required): degrees, -90 to 90
/// - `longitude` (required): degrees, -180 to 180
pub fn create_location(
	config: &toml::Value,
) -> Result<Box<dyn LocationInterface>, LocationError> {
	FixedLocationSchema
		.validate(config)
		.map_err(|e| LocationError::Configuration(format!("Invalid configuration: {}", e)))?;

	let latitude = as_degrees(config, "latitude")
		.ok_or_else(|| LocationError::Configuration("latitude is required".into()))?;
	let longitude = as_degrees(config, "longitude")
		.ok_or_else(|| LocationError::Configuration("longitude is required".into()))?;

	Ok(Box::new(FixedLocation::new(latitude, longitude)?))
}

/// Registry for the fixed location implementation.
pub struct Registry;

impl registry_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "fixed";
	type Factory = crate::LocationFactory;

	fn factory() -> Self::Factory {
		create_location
	}
}

impl crate::LocationRegistry for Registry {}
