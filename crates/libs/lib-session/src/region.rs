//! Region codes for insurance agreements.
//!
//! A municipality's civic code is five digits followed by one check character.
//! Earthquake reports key regions by the five digits followed by `00`, which is
//! the code stored on-chain when an agreement is created.

use std::fmt;

use thiserror::Error;

/// Length of a civic code including its check character.
pub const CIVIC_CODE_LEN: usize = 6;

const REGION_SUFFIX: &str = "00";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionCodeError {
    #[error("no municipality selected")]
    Empty,

    #[error("civic code must be {CIVIC_CODE_LEN} characters, got {0:?}")]
    WrongLength(String),

    #[error("civic code must start with five digits, got {0:?}")]
    NotNumeric(String),
}

/// On-chain region code derived from a civic code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegionCode(String);

impl RegionCode {
    /// Validate a civic code and derive its region code.
    ///
    /// The check character itself is not verified; only its presence is.
    pub fn from_civic_code(civic_code: &str) -> Result<Self, RegionCodeError> {
        let code = civic_code.trim();
        if code.is_empty() {
            return Err(RegionCodeError::Empty);
        }
        if code.chars().count() != CIVIC_CODE_LEN {
            return Err(RegionCodeError::WrongLength(code.to_string()));
        }

        if !code.is_ascii() || !code[..CIVIC_CODE_LEN - 1].chars().all(|c| c.is_ascii_digit()) {
            return Err(RegionCodeError::NotNumeric(code.to_string()));
        }

        Ok(Self(truncate_and_pad(code)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value passed to `createContract(uint256)`.
    pub fn value(&self) -> u64 {
        // Seven ASCII digits always fit.
        self.0.parse().unwrap_or_default()
    }
}

impl fmt::Display for RegionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Drop the last character and append the region suffix. No validation.
fn truncate_and_pad(code: &str) -> String {
    let mut chars = code.chars();
    chars.next_back();
    format!("{}{}", chars.as_str(), REGION_SUFFIX)
}
