//! Application constants

/// Unit shown next to ether-denominated balances.
pub const NATIVE_UNIT: &str = "ETH";

/// Unit shown next to PIYO coin balances.
pub const COIN_UNIT: &str = "PYC";

/// Placeholder option of the prefecture / municipality selects.
pub const SELECT_PLACEHOLDER: &str = "Please select";

pub const APP_TITLE: &str = "PIYO Bank";
