//! QR artifact type.

use serde::{Deserialize, Serialize};

/// Rendered QR code for a lot identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrArtifact {
	/// Text encoded in the symbol.
	pub payload: String,
	/// Image as a `data:` URI, ready to embed in an `<img>` tag.
	pub data_uri: String,
}
