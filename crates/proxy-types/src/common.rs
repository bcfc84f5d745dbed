//! Common types used throughout the proxy.

// Re-export commonly used ethereum types
pub use alloy_primitives::{Address, U256};

/// Price expressed as an unsigned integer scaled by 10^18.
///
/// `0` means "no price available", not a literal zero valuation.
pub type Price = U256;

/// Timestamp (Unix seconds)
pub type Timestamp = u64;

/// One price unit, `1.0` at 18 decimals.
pub const PRICE_UNIT: Price = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Scales a whole number of price units to the 18-decimal fixed-point form.
///
/// Saturates instead of overflowing, which only matters for values far
/// outside any realistic price.
pub fn units(amount: u64) -> Price {
	U256::from(amount).saturating_mul(PRICE_UNIT)
}

/// Parses a decimal or `0x`-prefixed price string.
pub fn parse_price(value: &str) -> Result<Price, String> {
	let trimmed = value.trim();
	let parsed = match trimmed.strip_prefix("0x") {
		Some(hex) => U256::from_str_radix(hex, 16),
		None => U256::from_str_radix(trimmed, 10),
	};
	parsed.map_err(|e| format!("invalid price '{}': {}", value, e))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_price_unit() {
		assert_eq!(PRICE_UNIT, U256::from(10u64).pow(U256::from(18u64)));
		assert_eq!(units(1), PRICE_UNIT);
		assert_eq!(units(12), U256::from(12_000_000_000_000_000_000u128));
	}

	#[test]
	fn test_parse_price() {
		assert_eq!(parse_price("15000000000000000000").unwrap(), units(15));
		assert_eq!(parse_price(" 0x10 ").unwrap(), U256::from(16u64));
		assert!(parse_price("1.5").is_err());
	}
}
