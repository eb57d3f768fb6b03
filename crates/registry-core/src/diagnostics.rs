//! Opt-in diagnostic probe fired once at mount.
//!
//! The probe's response is logged and never used; its failures never reach
//! the operator.

use std::time::Duration;

/// A single configured endpoint the form pings once per mount.
#[derive(Clone)]
pub struct DiagnosticProbe {
	client: reqwest::Client,
	url: String,
}

impl DiagnosticProbe {
	/// Builds the probe and its HTTP client. Fails only if the client cannot
	/// be constructed.
	pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
		let client = reqwest::Client::builder().timeout(timeout).build()?;
		Ok(Self {
			client,
			url: url.into(),
		})
	}

	/// Endpoint the probe requests.
	pub fn url(&self) -> &str {
		&self.url
	}

	/// Sends one GET and logs the outcome.
	pub async fn fire(&self) {
		match self.client.get(&self.url).send().await {
			Ok(response) => {
				let status = response.status();
				let body = response.text().await.unwrap_or_default();
				tracing::debug!(
					url = %self.url,
					status = %status,
					bytes = body.len(),
					"Diagnostic probe answered"
				);
			},
			Err(e) => {
				tracing::warn!(url = %self.url, error = %e, "Diagnostic probe failed");
			},
		}
	}
}
