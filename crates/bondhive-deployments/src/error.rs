use thiserror::Error;

/// Errors raised while reading or querying a deployment manifest.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// I/O failure while reading the manifest.
    #[error("manifest io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("manifest parse error: {0}")]
    Parse(String),
    /// TOML serialization error.
    #[error("manifest encode error: {0}")]
    Encode(String),
    /// Environment name other than `testnet` or `mainnet`.
    #[error("unknown environment `{0}` (expected testnet or mainnet)")]
    UnknownEnvironment(String),
}

/// Errors raised while converting between maturity dates and timestamps.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MaturityError {
    #[error("expected `D Mon YYYY, HH:MM TZ`, got `{0}`")]
    Format(String),
    #[error("unknown month `{0}`")]
    Month(String),
    #[error("no such calendar date: {0}")]
    Date(String),
    #[error("invalid time of day `{0}`")]
    Time(String),
    #[error("unsupported timezone `{0}`")]
    Timezone(String),
    #[error("maturity precedes the unix epoch")]
    BeforeEpoch,
    #[error("timestamp {0} is out of range")]
    OutOfRange(u64),
}

/// Ledger address that failed to decode.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("expected 56 characters, got {0}")]
    Length(usize),
    #[error("not a contract strkey (`C...` with a valid checksum)")]
    NotContract,
}
