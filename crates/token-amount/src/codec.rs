//! Decimal string <-> base unit codec.
//!
//! ```text
//! "1234.5", decimals = 3
//!   whole      = "1234"
//!   fractional = "5"  -> right-padded to "500"
//!   digits     = "1234500"  -> 1_234_500 base units
//! ```
//!
//! Fractional digits beyond `decimals` are truncated, never rounded.

use alloy_primitives::U256;

use crate::error::AmountError;

/// Largest number of decimal places any supported chain allows.
pub const MAX_DECIMALS: u8 = 18;

/// Convert a decimal string into integer base units.
///
/// The input must match `[0-9]*(\.[0-9]*)?`. An empty string (or `"."`)
/// decodes to zero, which callers treat as the "no initial supply" sentinel.
pub fn to_base_units(amount: &str, decimals: u8) -> Result<U256, AmountError> {
    if decimals > MAX_DECIMALS {
        return Err(AmountError::DecimalsOutOfRange(decimals));
    }

    let (whole, fractional) = amount.split_once('.').unwrap_or((amount, ""));

    if !whole.bytes().all(|b| b.is_ascii_digit())
        || !fractional.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(AmountError::InvalidFormat(amount.to_string()));
    }

    let places = decimals as usize;
    let mut digits = String::with_capacity(whole.len() + places);
    digits.push_str(whole);
    if fractional.len() >= places {
        digits.push_str(&fractional[..places]);
    } else {
        digits.push_str(fractional);
        digits.extend(std::iter::repeat('0').take(places - fractional.len()));
    }

    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Ok(U256::ZERO);
    }

    U256::from_str_radix(significant, 10).map_err(|_| AmountError::Overflow(amount.to_string()))
}

/// Format base units as a decimal string with trailing zeros trimmed.
///
/// `format_units(1_500_000, 6) == "1.5"`, `format_units(0, 9) == "0"`.
pub fn format_units(value: U256, decimals: u8) -> Result<String, AmountError> {
    if decimals > MAX_DECIMALS {
        return Err(AmountError::DecimalsOutOfRange(decimals));
    }

    let raw = value.to_string();
    let places = decimals as usize;
    if places == 0 {
        return Ok(raw);
    }

    let padded = if raw.len() <= places {
        format!("{}{}", "0".repeat(places + 1 - raw.len()), raw)
    } else {
        raw
    };

    let split = padded.len() - places;
    let (whole, fractional) = padded.split_at(split);
    let fractional = fractional.trim_end_matches('0');

    if fractional.is_empty() {
        Ok(whole.to_string())
    } else {
        Ok(format!("{whole}.{fractional}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(s: &str, decimals: u8) -> U256 {
        to_base_units(s, decimals).unwrap()
    }

    // -- Parsing ------------------------------------------------------------

    #[test]
    fn whole_number_is_scaled() {
        assert_eq!(units("1000000", 9), U256::from(1_000_000_000_000_000u64));
    }

    #[test]
    fn fractional_part_is_right_padded() {
        assert_eq!(units("1234.5", 3), U256::from(1_234_500u64));
    }

    #[test]
    fn excess_fraction_is_truncated() {
        assert_eq!(units("1.23456789", 2), U256::from(123u64));
        assert_eq!(units("0.999", 0), U256::ZERO);
    }

    #[test]
    fn zero_and_empty_are_the_no_supply_sentinel() {
        assert_eq!(units("0", 9), U256::ZERO);
        assert_eq!(units("", 9), U256::ZERO);
        assert_eq!(units(".", 9), U256::ZERO);
        assert_eq!(units("0.000", 18), U256::ZERO);
    }

    #[test]
    fn leading_dot_and_trailing_dot_are_accepted() {
        assert_eq!(units(".5", 1), U256::from(5u64));
        assert_eq!(units("5.", 1), U256::from(50u64));
    }

    #[test]
    fn eighteen_decimals_is_exact() {
        let value = units("1000000.000000000000000001", 18);
        let expected = U256::from(10u64).pow(U256::from(24u64)) + U256::from(1u64);
        assert_eq!(value, expected);
    }

    #[test]
    fn rejects_non_digits() {
        for bad in ["1e9", "-1", "1,000", "1.2.3", " 1", "0x10"] {
            assert!(
                matches!(to_base_units(bad, 6), Err(AmountError::InvalidFormat(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_decimals_above_eighteen() {
        assert_eq!(
            to_base_units("1", 19),
            Err(AmountError::DecimalsOutOfRange(19))
        );
    }

    #[test]
    fn rejects_values_above_u256() {
        let huge = "9".repeat(80);
        assert!(matches!(
            to_base_units(&huge, 0),
            Err(AmountError::Overflow(_))
        ));
    }

    // -- Formatting ---------------------------------------------------------

    #[test]
    fn format_trims_trailing_zeros() {
        assert_eq!(format_units(U256::from(1_500_000u64), 6).unwrap(), "1.5");
        assert_eq!(format_units(U256::from(2_000_000u64), 6).unwrap(), "2");
    }

    #[test]
    fn format_pads_small_values() {
        assert_eq!(format_units(U256::from(5u64), 9).unwrap(), "0.000000005");
        assert_eq!(format_units(U256::ZERO, 9).unwrap(), "0");
    }

    #[test]
    fn format_with_zero_decimals() {
        assert_eq!(format_units(U256::from(42u64), 0).unwrap(), "42");
    }

    #[test]
    fn round_trip_reproduces_canonical_value() {
        let cases = [
            ("1", 0, "1"),
            ("1000000", 9, "1000000"),
            ("0.5", 9, "0.5"),
            ("12.340", 6, "12.34"),
            ("007.25", 2, "7.25"),
            ("0.000000000000000001", 18, "0.000000000000000001"),
            ("123456789012345678901234567890", 18, "123456789012345678901234567890"),
        ];

        for (input, decimals, canonical) in cases {
            let value = to_base_units(input, decimals).unwrap();
            assert_eq!(
                format_units(value, decimals).unwrap(),
                canonical,
                "round trip of {input} with {decimals} decimals"
            );
        }
    }
}
