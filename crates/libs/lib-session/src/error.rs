//! # Session Error Handling
//!
//! [`SessionError`] is the single error type returned by the session controller.
//! Its variants follow the error taxonomy the panels surface to the user:
//!
//! - [`ProviderUnavailable`](SessionError::ProviderUnavailable) - no injected wallet,
//!   fatal to the whole session (blocking alert)
//! - [`UserRejected`](SessionError::UserRejected) - the user declined a prompt in the wallet
//! - [`ContractCall`](SessionError::ContractCall) - a call reverted, errored, or targeted a
//!   contract with no deployment on the current network
//!
//! Input validation failures ([`AmountError`], [`RegionCodeError`]) are raised before
//! anything is sent to the provider.
//!
//! ## Provider errors
//!
//! Gateways report failures as [`ProviderError`], mirroring the EIP-1193
//! `{ code, message }` shape. Code `4001` is the standard "user rejected request"
//! code and converts into [`SessionError::UserRejected`]; everything else becomes a
//! [`SessionError::ContractCall`].

use thiserror::Error;

use crate::region::RegionCodeError;
use crate::units::AmountError;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SessionError>;

/// EIP-1193 error code for a request the user rejected in the wallet UI.
pub const USER_REJECTED_CODE: i64 = 4001;

/// Error reported by a [`ProviderGateway`](crate::provider::ProviderGateway).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProviderError {
    /// Provider error code, when the provider supplied one.
    pub code: Option<i64>,
    pub message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: i64, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == Some(USER_REJECTED_CODE)
    }
}

/// Errors produced by the wallet session controller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// No injected wallet provider was found.
    #[error("Please install MetaMask.")]
    ProviderUnavailable,

    /// The user declined account access or a signature.
    #[error("{0}")]
    UserRejected(String),

    /// A contract call reverted or a read failed.
    #[error("{0}")]
    ContractCall(String),

    /// The amount field did not hold a valid non-negative decimal.
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    /// The civic code could not be turned into a region code.
    #[error("Invalid civic code: {0}")]
    InvalidCivicCode(#[from] RegionCodeError),

    /// An operation needed a connected session (or the session was reset mid-flight).
    #[error("Wallet session is not connected")]
    NotConnected,

    /// The operation is restricted to the insurance contract owner.
    #[error("Only the contract owner can perform this operation")]
    NotOwner,

    /// The panel does not offer the requested operation.
    #[error("{0} is not available on this panel")]
    UnsupportedOperation(String),

    /// The provider returned data that could not be decoded.
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// Invalid session configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SessionError {
    /// Text shown in the message dialog for a failed operation.
    pub fn user_message(&self) -> String {
        format!("Error: {}", self)
    }

    /// Whether the error ends the whole session rather than a single operation.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SessionError::ProviderUnavailable)
    }
}

impl From<ProviderError> for SessionError {
    fn from(err: ProviderError) -> Self {
        if err.is_user_rejection() {
            SessionError::UserRejected(err.message)
        } else {
            SessionError::ContractCall(err.message)
        }
    }
}

impl From<alloy_sol_types::Error> for SessionError {
    fn from(err: alloy_sol_types::Error) -> Self {
        SessionError::Decoding(err.to_string())
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::Decoding(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_rejection_maps_to_user_rejected() {
        let err: SessionError =
            ProviderError::with_code(4001, "MetaMask Tx Signature: User denied transaction signature.").into();
        assert_eq!(
            err,
            SessionError::UserRejected("MetaMask Tx Signature: User denied transaction signature.".to_string())
        );
    }

    #[test]
    fn test_other_provider_errors_map_to_contract_call() {
        let err: SessionError = ProviderError::with_code(-32603, "execution reverted").into();
        assert_eq!(err, SessionError::ContractCall("execution reverted".to_string()));
        assert_eq!(err.user_message(), "Error: execution reverted");
    }

    #[test]
    fn test_only_provider_unavailable_is_fatal() {
        assert!(SessionError::ProviderUnavailable.is_fatal());
        assert!(!SessionError::NotOwner.is_fatal());
    }
}
