//! Core of the grain lot registry.
//!
//! Wires the wallet, ledger, location and QR collaborators into an
//! [`OrderForm`] and drives its lifecycle: mount, field edits, submission
//! and unmount.

use registry_ledger::LedgerError;
use registry_types::Readiness;
use registry_wallet::WalletError;
use thiserror::Error;

pub mod builder;
pub mod clock;
pub mod diagnostics;
pub mod event_bus;
pub mod form;

pub use builder::{BuilderError, RegistryBuilder, RegistryFactories};
pub use event_bus::EventBus;
pub use form::{FormSettings, OrderForm};

/// Errors surfaced by the order form.
///
/// Every variant renders as the message shown to the operator.
#[derive(Debug, Error)]
pub enum FormError {
	#[error("Wallet not ready ({0})")]
	NotReady(Readiness),
	#[error("A submission is already in progress")]
	SubmissionInFlight,
	#[error("Wallet error: {0}")]
	Wallet(#[from] WalletError),
	#[error("Ledger error: {0}")]
	Ledger(#[from] LedgerError),
	#[error("Ledger reports chain {actual}, expected {expected}")]
	ChainMismatch { expected: u64, actual: u64 },
	#[error("Submission task failed: {0}")]
	SubmissionTask(String),
}
