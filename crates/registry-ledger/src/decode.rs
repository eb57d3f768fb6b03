//! Named decoding of the lot identifier from a receipt.
//!
//! The identifier is the `tokenId` of the ERC-721 `Transfer` the lot contract
//! emits when it mints. Logs are matched by emitter, event signature and
//! mint origin rather than by position, so unrelated logs before or after the
//! mint do not affect the result.

use crate::contract::Transfer;
use crate::LedgerError;
use alloy_primitives::{Address, U256};
use alloy_sol_types::SolEvent;
use registry_types::LedgerReceipt;

/// Extracts the minted lot token id from a receipt.
///
/// Returns [`LedgerError::MissingEvent`] if no mint `Transfer` from
/// `contract` is present, and [`LedgerError::EventDecode`] if a log carries
/// the `Transfer` signature but does not match its schema.
pub fn decode_lot_id(receipt: &LedgerReceipt, contract: Address) -> Result<U256, LedgerError> {
	let candidates = receipt.logs.iter().filter(|log| {
		log.address == contract && log.topics.first() == Some(&Transfer::SIGNATURE_HASH)
	});

	for log in candidates {
		let event = Transfer::decode_raw_log(log.topics.iter().copied(), &log.data, true)
			.map_err(|e| LedgerError::EventDecode(e.to_string()))?;

		if event.from == Address::ZERO {
			return Ok(event.tokenId);
		}
	}

	Err(LedgerError::MissingEvent(format!(
		"no Transfer mint from {} among {} logs",
		contract.to_checksum(None),
		receipt.logs.len()
	)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use registry_types::{Bytes, LogEntry, B256};

	fn contract() -> Address {
		Address::repeat_byte(0x0c)
	}

	fn receipt(logs: Vec<LogEntry>) -> LedgerReceipt {
		LedgerReceipt {
			tx_hash: B256::ZERO,
			block_number: 1,
			success: true,
			logs,
		}
	}

	fn transfer_log(emitter: Address, from: Address, token_id: u64) -> LogEntry {
		let data = Transfer {
			from,
			to: Address::repeat_byte(0x22),
			tokenId: U256::from(token_id),
		}
		.encode_log_data();
		LogEntry {
			address: emitter,
			topics: data.topics().to_vec(),
			data: data.data,
		}
	}

	fn unrelated_log(emitter: Address) -> LogEntry {
		LogEntry {
			address: emitter,
			topics: vec![B256::repeat_byte(0x99), B256::repeat_byte(0x01)],
			data: Bytes::from(vec![0u8; 32]),
		}
	}

	#[test]
	fn test_mint_found_regardless_of_position() {
		let logs = vec![unrelated_log(contract()), transfer_log(contract(), Address::ZERO, 42)];
		assert_eq!(
			decode_lot_id(&receipt(logs), contract()).unwrap(),
			U256::from(42)
		);

		let logs = vec![transfer_log(contract(), Address::ZERO, 7), unrelated_log(contract())];
		assert_eq!(
			decode_lot_id(&receipt(logs), contract()).unwrap(),
			U256::from(7)
		);
	}

	#[test]
	fn test_transfers_between_holders_are_skipped() {
		let holder = Address::repeat_byte(0x33);
		let logs = vec![
			transfer_log(contract(), holder, 5),
			transfer_log(contract(), Address::ZERO, 6),
		];
		assert_eq!(
			decode_lot_id(&receipt(logs), contract()).unwrap(),
			U256::from(6)
		);
	}

	#[test]
	fn test_mint_from_other_contract_is_ignored() {
		let logs = vec![transfer_log(Address::repeat_byte(0x44), Address::ZERO, 9)];
		let err = decode_lot_id(&receipt(logs), contract()).unwrap_err();
		assert!(matches!(err, LedgerError::MissingEvent(_)));
	}

	#[test]
	fn test_empty_receipt_fails_explicitly() {
		let err = decode_lot_id(&receipt(vec![]), contract()).unwrap_err();
		assert!(err.to_string().contains("among 0 logs"));
	}

	#[test]
	fn test_malformed_transfer_is_a_decode_error() {
		// Signature matches, but the indexed tokenId topic is missing
		let log = LogEntry {
			address: contract(),
			topics: vec![Transfer::SIGNATURE_HASH, B256::ZERO],
			data: Bytes::new(),
		};
		let err = decode_lot_id(&receipt(vec![log]), contract()).unwrap_err();
		assert!(matches!(err, LedgerError::EventDecode(_)));
	}
}
