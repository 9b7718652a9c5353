//! # Session Library
//!
//! Wallet session core for the PIYO dApp: provider connection, per-network
//! contract resolution, balance refresh and transaction dispatch for the deposit,
//! loan, insurance and coin purchase panels.
//!
//! Nothing here depends on the browser. The web app implements
//! [`ProviderGateway`] over `window.ethereum`; tests use an in-memory provider.

pub mod config;
pub mod contracts;
pub mod controller;
pub mod error;
pub mod panel;
pub mod provider;
pub mod reference;
pub mod region;
pub mod surface;
pub mod units;

// Re-export commonly used types
pub use config::{init_config, session_config, SessionConfig};
pub use contracts::{ContractDirectory, ContractHandle, ContractHandles, ContractKind};
pub use controller::{
    BalanceSnapshot, InsuranceBoard, SessionState, TransactionInput, TransactionResult,
    WalletSessionController,
};
pub use error::{ProviderError, Result, SessionError};
pub use panel::{Panel, PanelState};
pub use provider::{ListenerGuard, ProviderEvent, ProviderEventKind, ProviderGateway};
pub use surface::{BalanceField, OperationKind, SurfaceKind};
