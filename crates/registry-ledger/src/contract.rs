//! Solidity bindings for the grain lot contract.
//!
//! Only the surface the registry touches is declared: the lot creation call
//! and the ERC-721 `Transfer` event the contract emits when it mints the lot
//! token.

use alloy_sol_types::sol;

sol! {
	/// Creates a lot and mints its token to the caller.
	function createLotNFT(
		string grainType,
		string description,
		string certificateUrl,
		string weight,
		string latitude,
		string longitude,
		uint256 temperature,
		uint256 humidity,
		uint8 status
	) external returns (uint256 tokenId);

	/// ERC-721 transfer. A mint is a transfer from the zero address.
	event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);
}
