//! Rendered snapshot of the order form.

use crate::{LotForm, QrArtifact, Readiness, SubmissionResult};
use serde::{Deserialize, Serialize};

/// Banner shown once a lot has been registered and its QR code rendered.
pub const SUCCESS_BANNER: &str = "Grain Registered Successfully";

/// Side panel describing the warehouse conditions at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseLogs {
	pub latitude: String,
	pub longitude: String,
	pub date: String,
	pub time: String,
	pub temperature: String,
	pub humidity: String,
	/// Checksummed wallet account, if bound.
	pub user: Option<String>,
}

/// Everything the operator sees, as one serialisable value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormView {
	pub form: LotForm,
	pub logs: WarehouseLogs,
	pub readiness: Readiness,
	/// True while a registration is in flight; the submit action is disabled.
	pub submitting: bool,
	pub result: Option<SubmissionResult>,
	pub banner: Option<String>,
	pub qr: Option<QrArtifact>,
	/// Last user-visible failure, cleared on the next successful submit.
	pub error: Option<String>,
}
