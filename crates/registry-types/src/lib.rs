//! Shared types for the grain lot registry.
//!
//! Every crate in the workspace speaks in these types: the lot form and its
//! fields, the wallet session, ledger receipts and their logs, QR artifacts,
//! form events, and the configuration schema primitives used to validate
//! per-implementation TOML tables.

/// Form events published on the event bus.
pub mod events;
/// Lot form record, field names, and geolocation readings.
pub mod form;
/// Ledger request and receipt types.
pub mod ledger;
/// QR artifact produced from a lot identifier.
pub mod qr;
/// Registry trait for self-registering implementations.
pub mod registry;
/// Zeroizing string wrapper for private keys.
pub mod secret_string;
/// Wallet session and readiness state.
pub mod session;
/// Small formatting helpers.
pub mod utils;
/// Configuration validation primitives.
pub mod validation;
/// Rendered snapshot of the order form.
pub mod view;

pub use alloy_primitives::{Address, Bytes, B256, U256};
pub use events::*;
pub use form::*;
pub use ledger::*;
pub use qr::*;
pub use registry::ImplementationRegistry;
pub use secret_string::SecretString;
pub use session::*;
pub use utils::{truncate_id, with_0x_prefix, without_0x_prefix};
pub use validation::*;
pub use view::*;
