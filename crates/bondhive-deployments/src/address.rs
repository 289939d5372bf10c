use std::fmt;
use std::str::FromStr;

use stellar_strkey::Contract;

use crate::error::AddressError;

/// Length of every encoded ledger strkey.
pub const STRKEY_LEN: usize = 56;

/// A decoded contract address (`C...` strkey).
///
/// Both a vault's contract address and its bond id are contract addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LedgerAddress([u8; 32]);

impl LedgerAddress {
    /// Decodes and checksums a contract strkey.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError`] when the text is not a 56-character contract
    /// strkey with a valid checksum.
    pub fn parse(text: &str) -> Result<Self, AddressError> {
        if text.len() != STRKEY_LEN {
            return Err(AddressError::Length(text.len()));
        }
        Contract::from_string(text)
            .map(|contract| Self(contract.0))
            .map_err(|_| AddressError::NotContract)
    }

    /// Raw 32-byte contract hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for LedgerAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for LedgerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Contract(self.0).to_string())
    }
}
