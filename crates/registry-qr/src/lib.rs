//! QR rendering for registered lots.
//!
//! Once a lot is on the ledger its identifier is printed as a QR code and
//! attached to the sacks. The artifact carries the rendered SVG as a
//! base64 `data:` URI so that any client can embed it without a second
//! request.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use qrcode::render::svg;
use qrcode::QrCode;
use registry_types::QrArtifact;
use thiserror::Error;

/// Errors that can occur while rendering a QR code.
#[derive(Debug, Error)]
pub enum QrError {
	/// The payload cannot be encoded (too long for any QR version).
	#[error("Encoding failed: {0}")]
	Encoding(String),
}

/// Renders a payload into a displayable QR artifact.
pub trait QrEncoder: Send + Sync {
	fn encode(&self, payload: &str) -> Result<QrArtifact, QrError>;
}

/// Encoder producing SVG images.
#[derive(Debug, Clone)]
pub struct SvgQrEncoder {
	min_dimension: u32,
}

impl SvgQrEncoder {
	/// `min_dimension` is the smallest edge length of the image, in pixels.
	pub fn new(min_dimension: u32) -> Self {
		Self { min_dimension }
	}
}

impl QrEncoder for SvgQrEncoder {
	fn encode(&self, payload: &str) -> Result<QrArtifact, QrError> {
		let code = QrCode::new(payload.as_bytes()).map_err(|e| QrError::Encoding(e.to_string()))?;

		let image = code
			.render::<svg::Color>()
			.min_dimensions(self.min_dimension, self.min_dimension)
			.build();

		tracing::debug!(payload, bytes = image.len(), "Rendered QR code");

		Ok(QrArtifact {
			payload: payload.to_string(),
			data_uri: format!("data:image/svg+xml;base64,{}", STANDARD.encode(image)),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn decode_svg(artifact: &QrArtifact) -> String {
		let encoded = artifact
			.data_uri
			.strip_prefix("data:image/svg+xml;base64,")
			.unwrap();
		String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap()
	}

	#[test]
	fn test_encodes_lot_id_as_svg_data_uri() {
		let artifact = SvgQrEncoder::new(200).encode("42").unwrap();

		assert_eq!(artifact.payload, "42");
		let svg = decode_svg(&artifact);
		assert!(svg.contains("<svg"));
		assert!(svg.contains("width=\""));
	}

	#[test]
	fn test_same_payload_renders_identically() {
		let encoder = SvgQrEncoder::new(200);
		assert_eq!(encoder.encode("7").unwrap(), encoder.encode("7").unwrap());
		assert_ne!(
			encoder.encode("7").unwrap().data_uri,
			encoder.encode("8").unwrap().data_uri
		);
	}

	#[test]
	fn test_oversized_payload_fails() {
		let payload = "9".repeat(8000);
		let err = SvgQrEncoder::new(200).encode(&payload).unwrap_err();
		assert!(matches!(err, QrError::Encoding(_)));
	}
}
