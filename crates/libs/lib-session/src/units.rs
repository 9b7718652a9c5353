//! # Ether / Wei Conversion
//!
//! Amounts typed by the user are decimal strings in ether; everything sent to or
//! read from a contract is an integer amount of wei (18 decimal places).
//!
//! - [`parse_ether`] - validate a decimal string and convert it to wei
//! - [`format_ether`] - render wei as the shortest exact decimal string
//!
//! ```rust
//! use lib_session::units::{format_ether, parse_ether};
//!
//! let wei = parse_ether("1.5").unwrap();
//! assert_eq!(wei.to_string(), "1500000000000000000");
//! assert_eq!(format_ether(wei), "1.5");
//! ```

use alloy_primitives::utils::{format_units, parse_units};
use alloy_primitives::U256;
use thiserror::Error;

/// Number of decimal places between ether and wei.
pub const ETHER_DECIMALS: u8 = 18;

/// Reasons an amount string is rejected before conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("amount must not be negative: {0}")]
    Negative(String),

    #[error("not a decimal number: {0}")]
    NotANumber(String),

    #[error("more than 18 decimal places: {0}")]
    TooManyDecimals(String),

    #[error("amount is too large: {0}")]
    Overflow(String),
}

/// Parse a non-negative decimal ether amount into wei.
///
/// Accepts an optional leading `+`, surrounding whitespace, and a missing
/// integer or fractional part (`".5"`, `"2."`). Trailing fractional zeros beyond
/// the 18th decimal are ignored; any other digit there is an error.
pub fn parse_ether(input: &str) -> Result<U256, AmountError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }
    if trimmed.starts_with('-') {
        return Err(AmountError::Negative(trimmed.to_string()));
    }

    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let (integer, fractional) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (integer.is_empty() && fractional.is_empty()) || !all_digits(integer) || !all_digits(fractional) {
        return Err(AmountError::NotANumber(trimmed.to_string()));
    }

    // parse_units truncates excess decimals instead of rejecting them
    let fractional = fractional.trim_end_matches('0');
    if fractional.len() > ETHER_DECIMALS as usize {
        return Err(AmountError::TooManyDecimals(trimmed.to_string()));
    }

    let integer = if integer.is_empty() { "0" } else { integer };
    let normalized = if fractional.is_empty() {
        integer.to_string()
    } else {
        format!("{}.{}", integer, fractional)
    };

    parse_units(&normalized, ETHER_DECIMALS)
        .map(|parsed| parsed.get_absolute())
        .map_err(|_| AmountError::Overflow(trimmed.to_string()))
}

/// Format wei as a decimal ether string without trailing zeros (`"1.5"`, `"0"`, `"2"`).
pub fn format_ether(wei: U256) -> String {
    match format_units(wei, ETHER_DECIMALS) {
        Ok(formatted) => trim_fraction(&formatted).to_string(),
        Err(e) => {
            tracing::warn!("Cannot format {} wei: {}", wei, e);
            wei.to_string()
        }
    }
}

fn trim_fraction(formatted: &str) -> &str {
    if !formatted.contains('.') {
        return formatted;
    }
    formatted.trim_end_matches('0').trim_end_matches('.')
}

/// Multiply a wei amount by an integer factor, failing on overflow.
pub fn scale_wei(wei: U256, factor: u64) -> Result<U256, AmountError> {
    wei.checked_mul(U256::from(factor))
        .ok_or_else(|| AmountError::Overflow(format!("{} x {}", format_ether(wei), factor)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ether() {
        assert_eq!(parse_ether("1.5").unwrap(), U256::from(1_500_000_000_000_000_000u64));
        assert_eq!(parse_ether("0.1").unwrap(), U256::from(100_000_000_000_000_000u64));
        assert_eq!(parse_ether("2").unwrap(), U256::from(2_000_000_000_000_000_000u64));
        assert_eq!(parse_ether(" .5 ").unwrap(), U256::from(500_000_000_000_000_000u64));
        assert_eq!(parse_ether("0.0").unwrap(), U256::ZERO);
        assert_eq!(parse_ether("0.000000000000000001").unwrap(), U256::from(1u64));
    }

    #[test]
    fn test_parse_ether_rejects_invalid_input() {
        assert_eq!(parse_ether(""), Err(AmountError::Empty));
        assert_eq!(parse_ether("   "), Err(AmountError::Empty));
        assert!(matches!(parse_ether("-1"), Err(AmountError::Negative(_))));
        assert!(matches!(parse_ether("abc"), Err(AmountError::NotANumber(_))));
        assert!(matches!(parse_ether("1.2.3"), Err(AmountError::NotANumber(_))));
        assert!(matches!(parse_ether("."), Err(AmountError::NotANumber(_))));
        assert!(matches!(parse_ether("1e18"), Err(AmountError::NotANumber(_))));
        assert!(matches!(
            parse_ether("0.0000000000000000001"),
            Err(AmountError::TooManyDecimals(_))
        ));
    }

    #[test]
    fn test_parse_ether_overflow() {
        let huge = "9".repeat(80);
        assert!(matches!(parse_ether(&huge), Err(AmountError::Overflow(_))));
    }

    #[test]
    fn test_format_ether() {
        assert_eq!(format_ether(U256::ZERO), "0");
        assert_eq!(format_ether(U256::from(1_500_000_000_000_000_000u64)), "1.5");
        assert_eq!(format_ether(U256::from(3_000_000_000_000_000_000u64)), "3");
        assert_eq!(format_ether(U256::from(1u64)), "0.000000000000000001");
    }

    #[test]
    fn test_amount_survives_conversion() {
        for amount in ["1.5", "0.1", "42", "0.123456789012345678", "1000000.25"] {
            let wei = parse_ether(amount).unwrap();
            assert_eq!(format_ether(wei), amount);
        }
    }

    #[test]
    fn test_trim_fraction() {
        assert_eq!(trim_fraction("1.500000000000000000"), "1.5");
        assert_eq!(trim_fraction("3.000000000000000000"), "3");
        assert_eq!(trim_fraction("100"), "100");
    }

    #[test]
    fn test_scale_wei() {
        let wei = parse_ether("0.5").unwrap();
        assert_eq!(format_ether(scale_wei(wei, 30).unwrap()), "15");
        assert!(scale_wei(U256::MAX, 2).is_err());
    }
}
