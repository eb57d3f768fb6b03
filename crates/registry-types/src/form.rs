//! Lot form types.
//!
//! The lot form is the operator-editable record describing one grain lot.
//! Values are kept exactly as entered; nothing here parses or range-checks
//! weights, temperatures, or humidity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a field name does not match any lot form field.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown lot form field: {0}")]
pub struct UnknownFieldError(pub String);

/// Names of the editable lot form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LotField {
	/// Grain type, e.g. "Wheat" or "Rice".
	GrainType,
	/// Free-text lot description.
	Description,
	/// URL of the grain certificate.
	CertificateUrl,
	/// Lot weight in kilograms.
	Weight,
	/// Declared storage temperature.
	Temperature,
	/// Declared storage humidity.
	Humidity,
}

impl LotField {
	/// Every field in display order.
	pub const ALL: [LotField; 6] = [
		LotField::GrainType,
		LotField::Description,
		LotField::CertificateUrl,
		LotField::Weight,
		LotField::Temperature,
		LotField::Humidity,
	];

	/// Wire name of the field.
	pub fn as_str(&self) -> &'static str {
		match self {
			LotField::GrainType => "grain_type",
			LotField::Description => "description",
			LotField::CertificateUrl => "certificate_url",
			LotField::Weight => "weight",
			LotField::Temperature => "temperature",
			LotField::Humidity => "humidity",
		}
	}
}

impl fmt::Display for LotField {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for LotField {
	type Err = UnknownFieldError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		LotField::ALL
			.into_iter()
			.find(|field| field.as_str() == s)
			.ok_or_else(|| UnknownFieldError(s.to_string()))
	}
}

/// Mutable lot record filled in by the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotForm {
	pub grain_type: String,
	pub description: String,
	pub certificate_url: String,
	pub weight_kg: String,
	pub declared_temperature: String,
	pub declared_humidity: String,
}

impl Default for LotForm {
	fn default() -> Self {
		Self {
			grain_type: String::new(),
			description: String::new(),
			certificate_url: String::new(),
			weight_kg: String::new(),
			declared_temperature: "1".to_string(),
			declared_humidity: "1".to_string(),
		}
	}
}

impl LotForm {
	/// Overwrites a single field. No other field is touched.
	pub fn set(&mut self, field: LotField, value: impl Into<String>) {
		*self.slot_mut(field) = value.into();
	}

	/// Returns the current value of a field.
	pub fn get(&self, field: LotField) -> &str {
		match field {
			LotField::GrainType => &self.grain_type,
			LotField::Description => &self.description,
			LotField::CertificateUrl => &self.certificate_url,
			LotField::Weight => &self.weight_kg,
			LotField::Temperature => &self.declared_temperature,
			LotField::Humidity => &self.declared_humidity,
		}
	}

	fn slot_mut(&mut self, field: LotField) -> &mut String {
		match field {
			LotField::GrainType => &mut self.grain_type,
			LotField::Description => &mut self.description,
			LotField::CertificateUrl => &mut self.certificate_url,
			LotField::Weight => &mut self.weight_kg,
			LotField::Temperature => &mut self.declared_temperature,
			LotField::Humidity => &mut self.declared_humidity,
		}
	}
}

/// A single device location reading.
///
/// Coordinates are stored as their decimal string form since they are
/// forwarded verbatim to the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoReading {
	pub latitude: String,
	pub longitude: String,
}

impl GeoReading {
	/// Builds a reading from numeric coordinates.
	pub fn from_degrees(latitude: f64, longitude: f64) -> Self {
		Self {
			latitude: latitude.to_string(),
			longitude: longitude.to_string(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_last_write_wins_and_other_fields_untouched() {
		let mut form = LotForm::default();
		let before = form.clone();

		form.set(LotField::Weight, "100");
		form.set(LotField::Weight, "250");

		assert_eq!(form.get(LotField::Weight), "250");
		for field in LotField::ALL {
			if field != LotField::Weight {
				assert_eq!(form.get(field), before.get(field), "{} changed", field);
			}
		}
	}

	#[test]
	fn test_every_field_is_addressable() {
		let mut form = LotForm::default();
		for (i, field) in LotField::ALL.into_iter().enumerate() {
			form.set(field, format!("value-{}", i));
		}
		for (i, field) in LotField::ALL.into_iter().enumerate() {
			assert_eq!(form.get(field), format!("value-{}", i));
		}
	}

	#[test]
	fn test_defaults() {
		let form = LotForm::default();
		assert!(form.grain_type.is_empty());
		assert_eq!(form.declared_temperature, "1");
		assert_eq!(form.declared_humidity, "1");
	}

	#[test]
	fn test_field_names_parse() {
		assert_eq!(
			"certificate_url".parse::<LotField>(),
			Ok(LotField::CertificateUrl)
		);
		assert_eq!(
			"gweight".parse::<LotField>(),
			Err(UnknownFieldError("gweight".to_string()))
		);
		for field in LotField::ALL {
			assert_eq!(field.as_str().parse::<LotField>(), Ok(field));
		}
	}

	#[test]
	fn test_geo_reading_from_degrees() {
		let reading = GeoReading::from_degrees(18.5204, 73.8567);
		assert_eq!(reading.latitude, "18.5204");
		assert_eq!(reading.longitude, "73.8567");
	}
}
