//! # Contract Interfaces and Directory
//!
//! ABI definitions for the three deployed contracts and the per-network
//! directory that resolves their addresses.
//!
//! Deployment addresses come from build artifacts in the Truffle layout:
//!
//! ```json
//! { "contractName": "PiyoBank", "networks": { "5777": { "address": "0x..." } } }
//! ```
//!
//! Only `networks` is read; the ABI is compiled in through [`sol!`].

use std::collections::HashMap;
use std::fmt;

use alloy_primitives::Address;
use alloy_sol_types::sol;
use serde::Deserialize;

use crate::error::{Result, SessionError};

sol! {
    /// ERC-20 style PIYO coin.
    interface IPiyoCoin {
        function balanceOf(address account) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }

    /// Bank holding ether deposits and ether-collateralised PIYO loans.
    interface IPiyoBank {
        function ethBalance(address account) external view returns (uint256);
        function collateralEth(address account) external view returns (uint256);
        function deposit() external payable;
        function withdraw() external;
        function loan() external payable;
        function pay() external;
        function change2piyo() external payable;
    }

    /// Earthquake insurance keyed by region code.
    interface IDquake {
        function premium_balance(address account) external view returns (uint256);
        function contractOwner() external view returns (address);
        function getAgreementsLength() external view returns (uint256);
        function agreements(uint256 index) external view returns (address owner, uint256 town_code, bool live);
        function createContract(uint256 town_code) external payable;
        function withdrawContract() external;
        function exodusContract() external;
    }
}

/// The deployed contracts the session talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContractKind {
    Coin,
    Bank,
    Insurance,
}

impl ContractKind {
    pub const ALL: [ContractKind; 3] = [ContractKind::Coin, ContractKind::Bank, ContractKind::Insurance];

    /// Contract name used by the deployment artifacts.
    pub fn artifact_name(&self) -> &'static str {
        match self {
            ContractKind::Coin => "PiyoCoin",
            ContractKind::Bank => "PiyoBank",
            ContractKind::Insurance => "Dquake",
        }
    }
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.artifact_name())
    }
}

/// A contract resolved for one network. `address` is `None` when the contract
/// has no deployment there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractHandle {
    pub kind: ContractKind,
    pub network_id: u64,
    pub address: Option<Address>,
}

impl ContractHandle {
    pub fn is_resolved(&self) -> bool {
        self.address.is_some()
    }

    /// Address to dispatch to. An undeployed contract fails here, at dispatch time.
    pub fn dispatch_address(&self) -> Result<Address> {
        self.address.ok_or_else(|| {
            SessionError::ContractCall(format!(
                "{} is not deployed on network {}",
                self.kind, self.network_id
            ))
        })
    }
}

/// Handles for every contract kind on the connected network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractHandles {
    pub coin: ContractHandle,
    pub bank: ContractHandle,
    pub insurance: ContractHandle,
}

impl ContractHandles {
    pub fn get(&self, kind: ContractKind) -> &ContractHandle {
        match kind {
            ContractKind::Coin => &self.coin,
            ContractKind::Bank => &self.bank,
            ContractKind::Insurance => &self.insurance,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DeploymentArtifact {
    #[serde(default)]
    networks: HashMap<String, NetworkDeployment>,
}

#[derive(Debug, Deserialize)]
struct NetworkDeployment {
    address: Option<String>,
}

/// Deployed addresses per (contract kind, network id).
#[derive(Debug, Clone, Default)]
pub struct ContractDirectory {
    deployments: HashMap<(ContractKind, u64), Address>,
}

impl ContractDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory from deployment artifact JSON documents.
    pub fn from_artifacts<'a>(
        artifacts: impl IntoIterator<Item = (ContractKind, &'a str)>,
    ) -> Result<Self> {
        let mut directory = Self::new();

        for (kind, json) in artifacts {
            let artifact: DeploymentArtifact = serde_json::from_str(json)?;
            for (network, deployment) in artifact.networks {
                let network_id: u64 = network.parse().map_err(|_| {
                    SessionError::Decoding(format!("{}: invalid network id {:?}", kind, network))
                })?;
                let Some(raw) = deployment.address else {
                    continue;
                };
                let address: Address = raw.parse().map_err(|e| {
                    SessionError::Decoding(format!("{}: invalid address {:?}: {}", kind, raw, e))
                })?;
                directory.deployments.insert((kind, network_id), address);
            }
        }

        Ok(directory)
    }

    /// Record a deployment.
    pub fn with_deployment(mut self, kind: ContractKind, network_id: u64, address: Address) -> Self {
        self.deployments.insert((kind, network_id), address);
        self
    }

    /// Resolve one contract for a network. Missing deployments yield an unresolved handle.
    pub fn resolve(&self, kind: ContractKind, network_id: u64) -> ContractHandle {
        let address = self.deployments.get(&(kind, network_id)).copied();
        if address.is_none() {
            tracing::warn!("{} has no deployment on network {}", kind, network_id);
        }
        ContractHandle {
            kind,
            network_id,
            address,
        }
    }

    pub fn resolve_all(&self, network_id: u64) -> ContractHandles {
        ContractHandles {
            coin: self.resolve(ContractKind::Coin, network_id),
            bank: self.resolve(ContractKind::Bank, network_id),
            insurance: self.resolve(ContractKind::Insurance, network_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const BANK_ARTIFACT: &str = r#"{
        "contractName": "PiyoBank",
        "abi": [],
        "networks": {
            "5777": { "address": "0x5FbDB2315678afecb367f032d93F642f64180aa3" },
            "11155111": { "events": {} }
        }
    }"#;

    #[test]
    fn test_resolve_from_artifacts() {
        let directory = ContractDirectory::from_artifacts([
            (ContractKind::Bank, BANK_ARTIFACT),
            (ContractKind::Coin, r#"{ "networks": {} }"#),
        ])
        .unwrap();

        let bank = directory.resolve(ContractKind::Bank, 5777);
        assert_eq!(bank.address, Some(address!("5FbDB2315678afecb367f032d93F642f64180aa3")));

        // Listed network without an address
        assert!(!directory.resolve(ContractKind::Bank, 11155111).is_resolved());
        // Unknown network
        assert!(!directory.resolve(ContractKind::Coin, 5777).is_resolved());
    }

    #[test]
    fn test_unresolved_handle_fails_at_dispatch() {
        let handle = ContractDirectory::new().resolve(ContractKind::Insurance, 1);
        let err = handle.dispatch_address().unwrap_err();
        assert_eq!(
            err,
            SessionError::ContractCall("Dquake is not deployed on network 1".to_string())
        );
    }

    #[test]
    fn test_invalid_artifact_is_rejected() {
        let bad_address = r#"{ "networks": { "1": { "address": "0x1234" } } }"#;
        assert!(matches!(
            ContractDirectory::from_artifacts([(ContractKind::Coin, bad_address)]),
            Err(SessionError::Decoding(_))
        ));

        let bad_network = r#"{ "networks": { "mainnet": { "address": null } } }"#;
        assert!(ContractDirectory::from_artifacts([(ContractKind::Coin, bad_network)]).is_err());
    }
}
