//! Validation of per-implementation configuration tables.
//!
//! Each collaborator implementation receives its own raw TOML table. Before
//! a factory builds anything it checks the table against a [`Schema`]:
//! required and optional fields, their types, numeric bounds, and optional
//! custom validators. Nested tables are validated recursively and error paths
//! are reported with dotted field names.

use thiserror::Error;

/// Errors produced while validating a configuration table.
#[derive(Debug, Error)]
pub enum ValidationError {
	/// A required field is absent.
	#[error("Missing required field: {0}")]
	MissingField(String),
	/// A field is present but its value was rejected.
	#[error("Invalid value for field '{field}': {message}")]
	InvalidValue { field: String, message: String },
	/// A field has the wrong TOML type.
	#[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
	TypeMismatch {
		field: String,
		expected: String,
		actual: String,
	},
}

/// Expected type of a configuration field.
#[derive(Debug)]
pub enum FieldType {
	String,
	/// Integer with optional inclusive bounds.
	Integer { min: Option<i64>, max: Option<i64> },
	/// Float with optional inclusive bounds. Integers are accepted too.
	Float { min: Option<f64>, max: Option<f64> },
	Boolean,
	/// Nested table with its own schema.
	Table(Schema),
}

/// Custom check run after the type check passes.
pub type FieldValidator = Box<dyn Fn(&toml::Value) -> Result<(), String> + Send + Sync>;

/// A named field in a [`Schema`].
pub struct Field {
	pub name: String,
	pub field_type: FieldType,
	pub validator: Option<FieldValidator>,
}

impl std::fmt::Debug for Field {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Field")
			.field("name", &self.name)
			.field("field_type", &self.field_type)
			.field("validator", &self.validator.is_some())
			.finish()
	}
}

impl Field {
	pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
		Self {
			name: name.into(),
			field_type,
			validator: None,
		}
	}

	/// Attaches a custom validator that returns an error message on failure.
	pub fn with_validator<F>(mut self, validator: F) -> Self
	where
		F: Fn(&toml::Value) -> Result<(), String> + Send + Sync + 'static,
	{
		self.validator = Some(Box::new(validator));
		self
	}

	fn check(&self, value: &toml::Value) -> Result<(), ValidationError> {
		validate_field_type(&self.name, value, &self.field_type)?;
		if let Some(validator) = &self.validator {
			validator(value).map_err(|message| ValidationError::InvalidValue {
				field: self.name.clone(),
				message,
			})?;
		}
		Ok(())
	}
}

/// Required and optional fields of a configuration table.
#[derive(Debug)]
pub struct Schema {
	pub required: Vec<Field>,
	pub optional: Vec<Field>,
}

impl Schema {
	pub fn new(required: Vec<Field>, optional: Vec<Field>) -> Self {
		Self { required, optional }
	}

	/// Validates a TOML value against this schema.
	///
	/// Unknown keys are ignored so that implementations can share a table
	/// with service-level settings.
	pub fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let table = config
			.as_table()
			.ok_or_else(|| ValidationError::TypeMismatch {
				field: "root".to_string(),
				expected: "table".to_string(),
				actual: config.type_str().to_string(),
			})?;

		for field in &self.required {
			let value = table
				.get(&field.name)
				.ok_or_else(|| ValidationError::MissingField(field.name.clone()))?;
			field.check(value)?;
		}

		for field in &self.optional {
			if let Some(value) = table.get(&field.name) {
				field.check(value)?;
			}
		}

		Ok(())
	}
}

fn type_mismatch(field_name: &str, expected: &str, value: &toml::Value) -> ValidationError {
	ValidationError::TypeMismatch {
		field: field_name.to_string(),
		expected: expected.to_string(),
		actual: value.type_str().to_string(),
	}
}

fn out_of_bounds<T: std::fmt::Display>(
	field_name: &str,
	value: T,
	min: Option<T>,
	max: Option<T>,
) -> Option<ValidationError>
where
	T: PartialOrd + Copy,
{
	if let Some(min) = min {
		if value < min {
			return Some(ValidationError::InvalidValue {
				field: field_name.to_string(),
				message: format!("Value {} is less than minimum {}", value, min),
			});
		}
	}
	if let Some(max) = max {
		if value > max {
			return Some(ValidationError::InvalidValue {
				field: field_name.to_string(),
				message: format!("Value {} is greater than maximum {}", value, max),
			});
		}
	}
	None
}

fn validate_field_type(
	field_name: &str,
	value: &toml::Value,
	expected_type: &FieldType,
) -> Result<(), ValidationError> {
	match expected_type {
		FieldType::String => {
			if !value.is_str() {
				return Err(type_mismatch(field_name, "string", value));
			}
		},
		FieldType::Integer { min, max } => {
			let int_val = value
				.as_integer()
				.ok_or_else(|| type_mismatch(field_name, "integer", value))?;
			if let Some(err) = out_of_bounds(field_name, int_val, *min, *max) {
				return Err(err);
			}
		},
		FieldType::Float { min, max } => {
			let float_val = value
				.as_float()
				.or_else(|| value.as_integer().map(|i| i as f64))
				.ok_or_else(|| type_mismatch(field_name, "float", value))?;
			if let Some(err) = out_of_bounds(field_name, float_val, *min, *max) {
				return Err(err);
			}
		},
		FieldType::Boolean => {
			if !value.is_bool() {
				return Err(type_mismatch(field_name, "boolean", value));
			}
		},
		FieldType::Table(schema) => {
			schema.validate(value).map_err(|e| match e {
				ValidationError::MissingField(f) => {
					ValidationError::MissingField(format!("{}.{}", field_name, f))
				},
				ValidationError::InvalidValue { field, message } => ValidationError::InvalidValue {
					field: format!("{}.{}", field_name, field),
					message,
				},
				ValidationError::TypeMismatch {
					field,
					expected,
					actual,
				} => ValidationError::TypeMismatch {
					field: format!("{}.{}", field_name, field),
					expected,
					actual,
				},
			})?;
		},
	}

	Ok(())
}

/// A configuration schema owned by an implementation.
pub trait ConfigSchema: Send + Sync {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError>;
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(s: &str) -> toml::Value {
		toml::from_str(s).unwrap()
	}

	#[test]
	fn test_missing_required_field() {
		let schema = Schema::new(vec![Field::new("private_key", FieldType::String)], vec![]);
		let err = schema.validate(&parse("other = 1")).unwrap_err();
		assert!(matches!(err, ValidationError::MissingField(f) if f == "private_key"));
	}

	#[test]
	fn test_float_bounds_accept_integers() {
		let schema = Schema::new(
			vec![Field::new(
				"latitude",
				FieldType::Float {
					min: Some(-90.0),
					max: Some(90.0),
				},
			)],
			vec![],
		);
		assert!(schema.validate(&parse("latitude = 45")).is_ok());
		assert!(schema.validate(&parse("latitude = 45.5")).is_ok());
		let err = schema.validate(&parse("latitude = 91.0")).unwrap_err();
		assert!(err.to_string().contains("greater than maximum"));
	}

	#[test]
	fn test_custom_validator_runs_on_optional_field() {
		let schema = Schema::new(
			vec![],
			vec![Field::new("url", FieldType::String).with_validator(|v| {
				match v.as_str() {
					Some(s) if s.starts_with("http") => Ok(()),
					_ => Err("url must be http(s)".to_string()),
				}
			})],
		);
		assert!(schema.validate(&parse("")).is_ok());
		assert!(schema.validate(&parse("url = \"https://x\"")).is_ok());
		let err = schema.validate(&parse("url = \"ftp://x\"")).unwrap_err();
		assert!(matches!(err, ValidationError::InvalidValue { .. }));
	}

	#[test]
	fn test_nested_table_errors_use_dotted_path() {
		let schema = Schema::new(
			vec![Field::new(
				"keys",
				FieldType::Table(Schema::new(
					vec![Field::new("lat", FieldType::String)],
					vec![],
				)),
			)],
			vec![],
		);
		let err = schema.validate(&parse("[keys]\nlon = \"x\"")).unwrap_err();
		assert!(matches!(err, ValidationError::MissingField(f) if f == "keys.lat"));
	}

	#[test]
	fn test_type_mismatch() {
		let schema = Schema::new(vec![Field::new("enabled", FieldType::Boolean)], vec![]);
		let err = schema.validate(&parse("enabled = \"yes\"")).unwrap_err();
		assert_eq!(
			err.to_string(),
			"Type mismatch for field 'enabled': expected boolean, got string"
		);
	}
}
