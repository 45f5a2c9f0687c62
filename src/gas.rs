//! Intrinsic gas schedule.

use ethereum_types::U256;

pub const TX_GAS: u64 = 21_000;
pub const TX_CREATE_GAS: u64 = 32_000;
pub const TX_DATA_ZERO_GAS: u64 = 4;
pub const TX_DATA_NON_ZERO_GAS: u64 = 16;
pub const ACCESS_LIST_ADDRESS_GAS: u64 = 2_400;
pub const ACCESS_LIST_STORAGE_KEY_GAS: u64 = 1_900;

/// Calldata cost: every zero byte and every non-zero byte is charged separately.
pub fn data_gas(data: &[u8]) -> U256 {
	let zeros = data.iter().filter(|b| **b == 0).count() as u64;
	let non_zeros = data.len() as u64 - zeros;
	U256::from(zeros) * TX_DATA_ZERO_GAS + U256::from(non_zeros) * TX_DATA_NON_ZERO_GAS
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn data_gas_counts_each_byte() {
		assert_eq!(data_gas(&[]), U256::zero());
		assert_eq!(data_gas(&[0x01, 0x02, 0x00]), U256::from(2 * 16 + 4));
		assert_eq!(data_gas(&[0x00; 10]), U256::from(40));
	}
}
