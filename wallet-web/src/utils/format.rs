//! # Formatting Utilities for Wallet Web
//!
//! Display helpers for addresses, balances and region codes.
//!
//! ## Functions
//!
//! - [`format_address`] - Shorten an address to a prefix and suffix
//! - [`truncate_address`] - Shorten a `0x` address for display
//! - [`format_balance`] - Render a cached balance with its unit
//! - [`format_town_code`] - Render an on-chain region code

use alloy_primitives::U256;

/// Shorten an address, keeping `prefix_len` leading and `suffix_len` trailing characters.
///
/// # Examples
///
/// ```rust
/// use wallet_web::utils::format::format_address;
///
/// let addr = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
/// assert_eq!(format_address(addr, 6, 4), "0x7099...79C8");
/// assert_eq!(format_address("0x1234", 6, 4), "0x1234");
/// ```
pub fn format_address(address: &str, prefix_len: usize, suffix_len: usize) -> String {
    let address_len = address.len();

    // Byte slicing below needs ASCII and enough characters
    if !address.is_ascii() || address_len <= prefix_len + suffix_len {
        return address.to_string();
    }

    let prefix = &address[..prefix_len];
    let suffix = &address[address_len - suffix_len..];

    format!("{}...{}", prefix, suffix)
}

/// Format a `0x` address as `0x1234...abcd`.
pub fn truncate_address(address: &str) -> String {
    format_address(address, 6, 4)
}

/// Cached balance with its unit, or a dash before the first refresh.
pub fn format_balance(value: Option<&str>, unit: &str) -> String {
    match value {
        Some(value) => format!("{} {}", value, unit),
        None => "-".to_string(),
    }
}

/// Region codes are seven digits; leading zeros are dropped on-chain.
pub fn format_town_code(code: U256) -> String {
    format!("{:0>7}", code.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_address() {
        let addr = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
        assert_eq!(truncate_address(addr), "0x7099...79C8");
        assert_eq!(truncate_address("short"), "short");
    }

    #[test]
    fn test_format_balance() {
        assert_eq!(format_balance(Some("1.5"), "ETH"), "1.5 ETH");
        assert_eq!(format_balance(None, "ETH"), "-");
    }

    #[test]
    fn test_format_town_code_pads_leading_zeros() {
        assert_eq!(format_town_code(U256::from(110_000u64)), "0110000");
        assert_eq!(format_town_code(U256::from(1_310_100u64)), "1310100");
    }
}
