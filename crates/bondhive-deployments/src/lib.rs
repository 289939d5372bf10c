//! Registry of deployed BondHive bonds.
//!
//! Each record ties a bond's name to the vault contract address, the bond id
//! (the address of the bond token the vault issues) and its maturity, per
//! network environment. Records are read from a TOML manifest and validated
//! against the ledger address format and the maturity date.

pub mod address;
pub mod error;
pub mod manifest;
pub mod maturity;

pub use address::LedgerAddress;
pub use error::{AddressError, MaturityError, RegistryError};
pub use manifest::{BondDeployment, DeploymentManifest, Environment, Issue, IssueKind};
pub use maturity::{format_maturity, parse_maturity};
