//! Position lookup over HTTP.
//!
//! Fetches a JSON document from a positioning service (a site GPS gateway or
//! an IP geolocation endpoint) and reads the coordinates from configurable
//! keys. Keys may be dotted paths into nested objects.

use crate::{check_coordinates, LocationError, LocationInterface};
use async_trait::async_trait;
use registry_types::{ConfigSchema, Field, FieldType, GeoReading, Schema, ValidationError};
use serde_json::Value;
use std::time::Duration;

/// Location source backed by a JSON HTTP endpoint.
pub struct HttpLocation {
	client: reqwest::Client,
	url: String,
	latitude_key: String,
	longitude_key: String,
}

impl HttpLocation {
	/// Builds the client. Coordinates are read from `latitude_key` and
	/// `longitude_key`, which may be dotted paths into nested objects.
	pub fn new(
		url: String,
		latitude_key: String,
		longitude_key: String,
		timeout: Duration,
	) -> Result<Self, LocationError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| LocationError::Configuration(format!("HTTP client: {}", e)))?;

		Ok(Self {
			client,
			url,
			latitude_key,
			longitude_key,
		})
	}
}

fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
	path.split('.')
		.try_fold(document, |value, segment| value.get(segment))
}

fn as_degrees(value: &Value) -> Option<f64> {
	match value {
		Value::Number(n) => n.as_f64(),
		Value::String(s) => s.trim().parse().ok(),
		_ => None,
	}
}

/// Reads a reading out of a position document.
pub(crate) fn parse_position(
	document: &Value,
	latitude_key: &str,
	longitude_key: &str,
) -> Result<GeoReading, LocationError> {
	let read = |key: &str| {
		lookup(document, key).and_then(as_degrees).ok_or_else(|| {
			LocationError::InvalidResponse(format!("missing or non-numeric '{}'", key))
		})
	};

	let latitude = read(latitude_key)?;
	let longitude = read(longitude_key)?;
	check_coordinates(latitude, longitude)?;

	Ok(GeoReading::from_degrees(latitude, longitude))
}

/// Configuration schema for [`HttpLocation`].
pub struct HttpLocationSchema;

impl ConfigSchema for HttpLocationSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![Field::new("url", FieldType::String).with_validator(|value| {
				match value.as_str() {
					Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
						Ok(())
					},
					_ => Err("url must be an http(s) URL".to_string()),
				}
			})],
			vec![
				Field::new("latitude_key", FieldType::String),
				Field::new("longitude_key", FieldType::String),
				Field::new(
					"timeout_seconds",
					FieldType::Integer {
						min: Some(1),
						max: Some(120),
					},
				),
			],
		);
		schema.validate(config)
	}
}

#[async_trait]
impl LocationInterface for HttpLocation {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(HttpLocationSchema)
	}

	async fn current_position(&self) -> Result<GeoReading, LocationError> {
		let response = self
			.client
			.get(&self.url)
			.send()
			.await
			.map_err(|e| LocationError::Network(e.to_string()))?
			.error_for_status()
			.map_err(|e| LocationError::Network(e.to_string()))?;

		let document: Value = response
			.json()
			.await
			.map_err(|e| LocationError::InvalidResponse(e.to_string()))?;

		parse_position(&document, &self.latitude_key, &self.longitude_key)
	}
}

/// Builds an [`HttpLocation`] from configuration.
///
/// Configuration parameters:
/// - `url` (required): endpoint returning a JSON document
/// - `latitude_key` (optional): path to the latitude, default `latitude`
/// - `longitude_key` (optional): path to the longitude, default `longitude`
/// - `timeout_seconds` (optional): request timeout, default 10
pub fn create_location(
	config: &toml::Value,
) -> Result<Box<dyn LocationInterface>, LocationError> {
	HttpLocationSchema
		.validate(config)
		.map_err(|e| LocationError::Configuration(format!("Invalid configuration: {}", e)))?;

	let get_str = |key: &str, default: &str| {
		config
			.get(key)
			.and_then(|v| v.as_str())
			.unwrap_or(default)
			.to_string()
	};
	let timeout_seconds = config
		.get("timeout_seconds")
		.and_then(|v| v.as_integer())
		.unwrap_or(10) as u64;

	let location = HttpLocation::new(
		get_str("url", ""),
		get_str("latitude_key", "latitude"),
		get_str("longitude_key", "longitude"),
		Duration::from_secs(timeout_seconds),
	)?;
	Ok(Box::new(location))
}

/// Registry for the HTTP location implementation.
pub struct Registry;

impl registry_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "http";
	type Factory = crate::LocationFactory;

	fn factory() -> Self::Factory {
		create_location
	}
}

impl crate::LocationRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_parse_flat_document() {
		let document = json!({ "latitude": 18.5204, "longitude": 73.8567 });
		let reading = parse_position(&document, "latitude", "longitude").unwrap();
		assert_eq!(reading, GeoReading::from_degrees(18.5204, 73.8567));
	}

	#[test]
	fn test_parse_nested_string_coordinates() {
		let document = json!({ "fix": { "lat": "-33.86", "lon": " 151.2 " } });
		let reading = parse_position(&document, "fix.lat", "fix.lon").unwrap();
		assert_eq!(reading.latitude, "-33.86");
		assert_eq!(reading.longitude, "151.2");
	}

	#[test]
	fn test_missing_key_is_invalid_response() {
		let document = json!({ "lat": 1.0 });
		let err = parse_position(&document, "lat", "lon").unwrap_err();
		assert!(err.to_string().contains("'lon'"));
	}

	#[test]
	fn test_out_of_range_is_invalid_response() {
		let document = json!({ "latitude": 10.0, "longitude": 200.0 });
		let err = parse_position(&document, "latitude", "longitude").unwrap_err();
		assert!(matches!(err, LocationError::InvalidResponse(_)));
	}

	#[test]
	fn test_factory_requires_http_url() {
		let config: toml::Value = toml::from_str("url = \"file:///tmp/pos.json\"").unwrap();
		assert!(create_location(&config).is_err());

		let config: toml::Value =
			toml::from_str("url = \"http://gps.local/fix\"\nlatitude_key = \"fix.lat\"").unwrap();
		assert!(create_location(&config).is_ok());
	}
}
