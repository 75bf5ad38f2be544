//! Token metadata for the ledger's single asset.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default total supply assigned to the owner at initialization.
pub const DEFAULT_TOTAL_SUPPLY: u64 = 1_000_000;

/// Descriptive metadata for the asset tracked by the ledger.
///
/// The ledger itself only moves unsigned integer units; name and symbol
/// exist for display and reporting surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Human-readable asset name.
    pub name: String,
    /// Short ticker symbol.
    pub symbol: String,
}

impl TokenInfo {
    /// Create new token metadata.
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
        }
    }
}

impl Default for TokenInfo {
    fn default() -> Self {
        Self::new("Tokenbook", "TBK")
    }
}

impl fmt::Display for TokenInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.symbol)
    }
}
