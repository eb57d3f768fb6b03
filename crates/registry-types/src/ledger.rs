//! Ledger request and receipt types.
//!
//! These mirror the single write the registry performs against the lot
//! contract and the receipt it gets back. Receipts keep their raw logs so
//! that the lot identifier can be decoded against a typed event schema.

use crate::{Address, Bytes, GeoReading, LotForm, B256};
use serde::{Deserialize, Serialize};

/// Sensor values sent alongside every lot.
///
/// Warehouses without live sensors submit the configured constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorReadings {
	pub temperature: u64,
	pub humidity: u64,
	/// Initial lot status recorded by the contract.
	pub status: u8,
}

impl Default for SensorReadings {
	fn default() -> Self {
		Self {
			temperature: 10,
			humidity: 10,
			status: 0,
		}
	}
}

/// Arguments of one `createLotNFT` call, in contract order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotRequest {
	pub grain_type: String,
	pub description: String,
	pub certificate_url: String,
	pub weight: String,
	pub latitude: String,
	pub longitude: String,
	pub temperature: u64,
	pub humidity: u64,
	pub status: u8,
}

impl LotRequest {
	/// Assembles the request from the form, the location reading, and the sensors.
	pub fn new(form: &LotForm, geo: &GeoReading, sensors: SensorReadings) -> Self {
		Self {
			grain_type: form.grain_type.clone(),
			description: form.description.clone(),
			certificate_url: form.certificate_url.clone(),
			weight: form.weight_kg.clone(),
			latitude: geo.latitude.clone(),
			longitude: geo.longitude.clone(),
			temperature: sensors.temperature,
			humidity: sensors.humidity,
			status: sensors.status,
		}
	}
}

/// One log emitted while executing a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
	/// Contract that emitted the log.
	pub address: Address,
	/// Indexed topics; the first is the event signature hash.
	pub topics: Vec<B256>,
	/// ABI-encoded non-indexed data.
	pub data: Bytes,
}

/// Receipt of a mined ledger transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerReceipt {
	pub tx_hash: B256,
	pub block_number: u64,
	pub success: bool,
	pub logs: Vec<LogEntry>,
}

/// Outcome of a successful lot registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
	/// Token id of the minted lot, in decimal.
	pub lot_id: String,
	pub tx_hash: B256,
	pub block_number: u64,
}
