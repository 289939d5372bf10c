use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::address::LedgerAddress;
use crate::error::{AddressError, MaturityError, RegistryError};
use crate::maturity::parse_maturity;

/// Network a bond is deployed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Testnet,
    Mainnet,
}

impl Environment {
    pub const ALL: [Environment; 2] = [Environment::Testnet, Environment::Mainnet];

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Testnet => "testnet",
            Environment::Mainnet => "mainnet",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "testnet" => Ok(Environment::Testnet),
            "mainnet" => Ok(Environment::Mainnet),
            _ => Err(RegistryError::UnknownEnvironment(s.to_string())),
        }
    }
}

/// One deployed bond vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BondDeployment {
    /// Human identifier, e.g. `BTC_Sep_24`.
    pub name: String,
    /// Address of the bond vault contract.
    pub contract_address: String,
    /// Address of the bond token the vault issues.
    pub bond_id: String,
    /// Published maturity, e.g. `27 Sept 2024, 08:00 GMT`.
    pub maturity_date: String,
    /// The same instant as `maturity_date`, in Unix epoch seconds.
    pub maturity_timestamp: u64,
}

impl BondDeployment {
    pub fn is_matured_at(&self, timestamp: u64) -> bool {
        self.maturity_timestamp <= timestamp
    }

    pub fn contract_address(&self) -> Result<LedgerAddress, AddressError> {
        LedgerAddress::parse(&self.contract_address)
    }

    pub fn bond_id(&self) -> Result<LedgerAddress, AddressError> {
        LedgerAddress::parse(&self.bond_id)
    }

    fn issues(&self) -> Vec<IssueKind> {
        let mut issues = Vec::new();

        if self.name.trim().is_empty() {
            issues.push(IssueKind::EmptyName);
        }
        if let Err(err) = self.contract_address() {
            issues.push(IssueKind::ContractAddress(err));
        }
        if let Err(err) = self.bond_id() {
            issues.push(IssueKind::BondId(err));
        }
        if self.bond_id == self.contract_address {
            issues.push(IssueKind::BondIdIsContract);
        }
        match parse_maturity(&self.maturity_date) {
            Ok(parsed) if parsed != self.maturity_timestamp => {
                issues.push(IssueKind::MaturityMismatch {
                    parsed,
                    recorded: self.maturity_timestamp,
                })
            }
            Ok(_) => {}
            Err(err) => issues.push(IssueKind::MaturityDate(err)),
        }

        issues
    }
}

/// Violated invariant of a single record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IssueKind {
    #[error("name is empty")]
    EmptyName,
    #[error("name is used more than once in this environment")]
    DuplicateName,
    #[error("contract_address: {0}")]
    ContractAddress(AddressError),
    #[error("bond_id: {0}")]
    BondId(AddressError),
    #[error("bond_id equals contract_address")]
    BondIdIsContract,
    #[error("maturity_date: {0}")]
    MaturityDate(MaturityError),
    #[error("maturity_date is {parsed} but maturity_timestamp is {recorded}")]
    MaturityMismatch { parsed: u64, recorded: u64 },
}

/// A validation finding, located by environment and record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub environment: Environment,
    /// Position of the record within its environment.
    pub index: usize,
    pub name: String,
    pub kind: IssueKind,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] `{}`: {}",
            self.environment, self.index, self.name, self.kind
        )
    }
}

/// The table of deployed bonds, grouped by environment.
///
/// On disk this is a TOML file with `[[testnet]]` and `[[mainnet]]` arrays of
/// [`BondDeployment`] tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeploymentManifest {
    #[serde(default)]
    pub testnet: Vec<BondDeployment>,
    #[serde(default)]
    pub mainnet: Vec<BondDeployment>,
}

impl DeploymentManifest {
    /// Parses a manifest from TOML text.
    ///
    /// Parsing does not validate; call [`DeploymentManifest::validate`].
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Parse`] when the text is not a manifest.
    pub fn from_toml_str(content: &str) -> Result<Self, RegistryError> {
        toml::from_str(content).map_err(|err| RegistryError::Parse(err.to_string()))
    }

    /// Reads a manifest from disk.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let content = fs::read_to_string(path)
            .map_err(|err| RegistryError::Io(format!("{}: {err}", path.display())))?;
        let manifest = Self::from_toml_str(&content)?;
        debug!(
            path = %path.display(),
            testnet = manifest.testnet.len(),
            mainnet = manifest.mainnet.len(),
            "loaded deployment manifest"
        );
        Ok(manifest)
    }

    /// Serializes the manifest back to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Encode`] if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, RegistryError> {
        toml::to_string(self).map_err(|err| RegistryError::Encode(err.to_string()))
    }

    pub fn deployments(&self, environment: Environment) -> &[BondDeployment] {
        match environment {
            Environment::Testnet => &self.testnet,
            Environment::Mainnet => &self.mainnet,
        }
    }

    /// Every record, testnet first.
    pub fn entries(&self) -> impl Iterator<Item = (Environment, &BondDeployment)> + '_ {
        Environment::ALL.into_iter().flat_map(move |environment| {
            self.deployments(environment)
                .iter()
                .map(move |deployment| (environment, deployment))
        })
    }

    pub fn find(&self, environment: Environment, name: &str) -> Option<&BondDeployment> {
        self.deployments(environment)
            .iter()
            .find(|deployment| deployment.name == name)
    }

    /// Records whose maturity is at or before `timestamp`.
    pub fn matured_at(&self, timestamp: u64) -> Vec<(Environment, &BondDeployment)> {
        self.entries()
            .filter(|(_, deployment)| deployment.is_matured_at(timestamp))
            .collect()
    }

    /// Records that have not matured by `timestamp`.
    pub fn pending_at(&self, timestamp: u64) -> Vec<(Environment, &BondDeployment)> {
        self.entries()
            .filter(|(_, deployment)| !deployment.is_matured_at(timestamp))
            .collect()
    }

    /// Checks every record and reports all violations found.
    pub fn validate(&self) -> Vec<Issue> {
        let mut issues = Vec::new();

        for environment in Environment::ALL {
            let mut seen = HashSet::new();

            for (index, deployment) in self.deployments(environment).iter().enumerate() {
                let mut kinds = deployment.issues();
                let name = deployment.name.trim();
                if !name.is_empty() && !seen.insert(name) {
                    kinds.push(IssueKind::DuplicateName);
                }

                issues.extend(kinds.into_iter().map(|kind| Issue {
                    environment,
                    index,
                    name: deployment.name.clone(),
                    kind,
                }));
            }
        }

        for issue in &issues {
            warn!(%issue, "invalid deployment record");
        }
        debug!(records = self.entries().count(), issues = issues.len(), "validated manifest");

        issues
    }
}
