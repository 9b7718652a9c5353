//! # Session Configuration
//!
//! Tunables for the session controller, loaded from environment variables with
//! defaults. In the browser no environment is available, so the defaults apply.
//!
//! | Variable                          | Default          |
//! |-----------------------------------|------------------|
//! | `PIYO_REPAY_ALLOWANCE_MULTIPLIER` | `30`             |
//! | `PIYO_COIN_PURCHASE_AMOUNT`       | `0.1`            |
//! | `PIYO_RECEIPT_POLL_MS`            | `1000`           |
//! | `PIYO_CITY_CODE_URL`              | `city-code.csv`  |
//!
//! Use [`session_config()`] to access the global instance after [`init_config()`].

use std::env;
use std::sync::OnceLock;

use alloy_primitives::U256;

use crate::error::{Result, SessionError};
use crate::units::parse_ether;

/// Multiple of the loan amount granted as PIYO allowance before repaying.
pub const DEFAULT_REPAY_ALLOWANCE_MULTIPLIER: u64 = 30;

/// Ether sent by a single coin purchase.
pub const DEFAULT_COIN_PURCHASE_AMOUNT: &str = "0.1";

pub const DEFAULT_RECEIPT_POLL_MS: u32 = 1000;

pub const DEFAULT_CITY_CODE_URL: &str = "city-code.csv";

#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    pub repay_allowance_multiplier: u64,

    /// Decimal ether amount sent by `change2piyo`.
    pub coin_purchase_amount: String,

    /// Delay between receipt polls while waiting for a transaction to be mined.
    pub receipt_poll_interval_ms: u32,

    /// Location of the civic code CSV.
    pub city_code_url: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            repay_allowance_multiplier: DEFAULT_REPAY_ALLOWANCE_MULTIPLIER,
            coin_purchase_amount: DEFAULT_COIN_PURCHASE_AMOUNT.to_string(),
            receipt_poll_interval_ms: DEFAULT_RECEIPT_POLL_MS,
            city_code_url: DEFAULT_CITY_CODE_URL.to_string(),
        }
    }
}

impl SessionConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let repay_allowance_multiplier = match env::var("PIYO_REPAY_ALLOWANCE_MULTIPLIER") {
            Ok(raw) => raw.parse().map_err(|e| {
                SessionError::Config(format!(
                    "PIYO_REPAY_ALLOWANCE_MULTIPLIER must be a valid number: {}",
                    e
                ))
            })?,
            Err(_) => defaults.repay_allowance_multiplier,
        };

        let coin_purchase_amount = env::var("PIYO_COIN_PURCHASE_AMOUNT")
            .unwrap_or(defaults.coin_purchase_amount);

        let receipt_poll_interval_ms = match env::var("PIYO_RECEIPT_POLL_MS") {
            Ok(raw) => raw.parse().map_err(|e| {
                SessionError::Config(format!("PIYO_RECEIPT_POLL_MS must be a valid number: {}", e))
            })?,
            Err(_) => defaults.receipt_poll_interval_ms,
        };

        let city_code_url = env::var("PIYO_CITY_CODE_URL").unwrap_or(defaults.city_code_url);

        Ok(Self {
            repay_allowance_multiplier,
            coin_purchase_amount,
            receipt_poll_interval_ms,
            city_code_url,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.repay_allowance_multiplier == 0 {
            return Err(SessionError::Config(
                "PIYO_REPAY_ALLOWANCE_MULTIPLIER must be greater than 0".to_string(),
            ));
        }

        if self.coin_purchase_wei()?.is_zero() {
            return Err(SessionError::Config(
                "PIYO_COIN_PURCHASE_AMOUNT must be greater than 0".to_string(),
            ));
        }

        if self.receipt_poll_interval_ms == 0 {
            return Err(SessionError::Config(
                "PIYO_RECEIPT_POLL_MS must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Coin purchase amount in wei.
    pub fn coin_purchase_wei(&self) -> Result<U256> {
        parse_ether(&self.coin_purchase_amount).map_err(|e| {
            SessionError::Config(format!("PIYO_COIN_PURCHASE_AMOUNT is invalid: {}", e))
        })
    }
}

static CONFIG: OnceLock<SessionConfig> = OnceLock::new();

/// Initialize the global configuration. Call once at startup.
pub fn init_config() -> Result<()> {
    let config = SessionConfig::from_env()?;
    config.validate()?;

    CONFIG
        .set(config)
        .map_err(|_| SessionError::Config("Config has already been initialized".to_string()))
}

/// The global configuration, or the defaults if [`init_config()`] was never called.
pub fn session_config() -> &'static SessionConfig {
    CONFIG.get_or_init(SessionConfig::default)
}
