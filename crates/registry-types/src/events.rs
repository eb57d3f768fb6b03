//! Events published by the order form.
//!
//! The form publishes one event per observable state change. Subscribers
//! (the service's logger, API clients) react to them without holding locks
//! on form state.

use crate::{LotField, SubmissionResult};
use serde::{Deserialize, Serialize};

/// Main event type for a form session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FormEvent {
	/// The form was mounted and background initialization started.
	Mounted,
	/// A single field was overwritten.
	FieldChanged { field: LotField, value: String },
	/// Device location was read.
	LocationAcquired { latitude: String, longitude: String },
	/// Wallet account and ledger network were bound.
	SessionReady { account: String, chain_id: u64 },
	/// Binding failed; submission stays disabled.
	SessionFailed { reason: String },
	/// A lot registration was sent to the ledger.
	SubmissionStarted,
	/// The ledger confirmed a lot registration.
	LotRegistered(SubmissionResult),
	/// The ledger rejected or failed a registration.
	SubmissionFailed { error: String },
	/// A QR code was rendered for a lot identifier.
	QrRendered { lot_id: String },
	/// QR rendering failed for a lot identifier.
	QrFailed { lot_id: String, error: String },
	/// The form was unmounted and its background work stopped.
	Unmounted,
}
