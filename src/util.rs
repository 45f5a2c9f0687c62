//! Utility functions for Ethereum.

use ethereum_types::{H256, U256};
use sha3::{Digest, Keccak256};

use crate::error::{Error, Result};

/// Keccak-256 of `x`.
pub fn keccak256(x: &[u8]) -> H256 {
	H256::from_slice(Keccak256::digest(x).as_slice())
}

/// Lowercase hex with a `0x` prefix. Empty input yields `"0x"`.
pub fn to_hex(bytes: &[u8]) -> String {
	format!("0x{}", hex::encode(bytes))
}

/// Parses a `0x`-prefixed hex string into bytes.
pub fn from_hex(s: &str) -> Result<Vec<u8>> {
	let digits = s
		.strip_prefix("0x")
		.ok_or_else(|| Error::invalid_format(format!("missing 0x prefix: {:?}", s)))?;
	hex::decode(digits).map_err(|e| Error::invalid_format(format!("{:?}: {}", s, e)))
}

/// Parses a `0x`-prefixed hex string of exactly `N` bytes.
pub fn from_hex_fixed<const N: usize>(s: &str) -> Result<[u8; N]> {
	let bytes = from_hex(s)?;
	let mut out = [0_u8; N];
	if bytes.len() != N {
		return Err(Error::invalid_format(format!(
			"expected {} bytes, got {} in {:?}",
			N,
			bytes.len(),
			s
		)));
	}
	out.copy_from_slice(&bytes);
	Ok(out)
}

/// Quantity form: `0x` followed by hex digits without leading zeros.
pub fn u256_to_hex(value: &U256) -> String {
	let digits = hex::encode(u256_to_h256(*value));
	match digits.trim_start_matches('0') {
		"" => "0x0".to_owned(),
		trimmed => format!("0x{}", trimmed),
	}
}

pub fn u256_from_hex(s: &str) -> Result<U256> {
	let digits = s
		.strip_prefix("0x")
		.ok_or_else(|| Error::invalid_format(format!("missing 0x prefix: {:?}", s)))?;
	if digits.is_empty() || digits.len() > 64 {
		return Err(Error::invalid_format(format!("invalid quantity {:?}", s)));
	}
	let padded = if digits.len() % 2 == 1 {
		format!("0{}", digits)
	} else {
		digits.to_owned()
	};
	let bytes =
		hex::decode(padded).map_err(|e| Error::invalid_format(format!("{:?}: {}", s, e)))?;
	Ok(U256::from_big_endian(&bytes))
}

/// Right-aligns a big-endian integer into 32 bytes.
pub(crate) fn u256_to_h256(value: U256) -> H256 {
	let mut out = [0_u8; 32];
	value.to_big_endian(&mut out);
	H256::from(out)
}

#[cfg(test)]
mod tests {
	use super::*;
	use hex_literal::hex;

	#[test]
	fn test_keccak256() {
		assert_eq!(
			keccak256(&[]),
			H256::from(hex!(
				"c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
			))
		);
	}

	#[test]
	fn test_hex_bytes() {
		assert_eq!(to_hex(&[]), "0x");
		assert_eq!(to_hex(&[0x01, 0xab]), "0x01ab");
		assert_eq!(from_hex("0x01AB").unwrap(), vec![0x01, 0xab]);
		assert_eq!(from_hex("0x").unwrap(), Vec::<u8>::new());
		assert!(from_hex("01ab").is_err());
		assert!(from_hex("0x1ab").is_err());
		assert!(from_hex("0xzz").is_err());
	}

	#[test]
	fn test_hex_fixed() {
		assert_eq!(from_hex_fixed::<2>("0x0a0b").unwrap(), [0x0a, 0x0b]);
		assert!(from_hex_fixed::<20>("0x0a0b").is_err());
	}

	#[test]
	fn test_hex_quantity() {
		assert_eq!(u256_to_hex(&U256::zero()), "0x0");
		assert_eq!(u256_to_hex(&U256::from(5566)), "0x15be");
		assert_eq!(u256_from_hex("0x15be").unwrap(), U256::from(5566));
		assert_eq!(u256_from_hex("0x0").unwrap(), U256::zero());
		assert_eq!(u256_from_hex(&u256_to_hex(&U256::max_value())).unwrap(), U256::max_value());
		assert!(u256_from_hex("0x").is_err());
		assert!(u256_from_hex("5566").is_err());
		assert!(u256_from_hex("0x-1").is_err());
	}
}
