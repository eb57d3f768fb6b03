//! Wallet session and readiness state.

use crate::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity and network bound at mount time.
///
/// Held for the lifetime of a form; account or network changes are not
/// picked up until the form is mounted again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSession {
	/// First account granted by the wallet.
	pub account: Address,
	/// Chain id reported by the ledger node.
	pub chain_id: u64,
	/// Lot contract the ledger is bound to.
	pub contract: Address,
}

impl WalletSession {
	/// EIP-55 checksummed account, as shown to the operator.
	pub fn display_account(&self) -> String {
		self.account.to_checksum(None)
	}
}

/// Gate state of the wallet and ledger binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum Readiness {
	/// Not mounted yet.
	Idle,
	/// Binding in progress.
	Loading,
	/// Wallet and ledger are bound; submission is allowed.
	Ready,
	/// Binding failed; submission stays disabled.
	Failed(String),
}

impl Readiness {
	/// True only when a submission may proceed.
	pub fn is_ready(&self) -> bool {
		matches!(self, Readiness::Ready)
	}

	/// True once binding has either succeeded or failed.
	pub fn is_settled(&self) -> bool {
		matches!(self, Readiness::Ready | Readiness::Failed(_))
	}
}

impl fmt::Display for Readiness {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Readiness::Idle => write!(f, "not connected"),
			Readiness::Loading => write!(f, "connecting"),
			Readiness::Ready => write!(f, "ready"),
			Readiness::Failed(reason) => write!(f, "failed: {}", reason),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_readiness_serialization() {
		let json = serde_json::to_value(Readiness::Failed("no accounts".into())).unwrap();
		assert_eq!(json["state"], "failed");
		assert_eq!(json["reason"], "no accounts");

		let json = serde_json::to_value(Readiness::Ready).unwrap();
		assert_eq!(json["state"], "ready");
	}

	#[test]
	fn test_display_account_is_checksummed() {
		let session = WalletSession {
			account: "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266".parse().unwrap(),
			chain_id: 31337,
			contract: Address::ZERO,
		};
		assert_eq!(
			session.display_account(),
			"0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
		);
	}
}
