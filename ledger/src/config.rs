//! Ledger configuration.

use serde::{Deserialize, Serialize};

use tokenbook_common::{AccountId, TokenInfo, DEFAULT_TOTAL_SUPPLY};

/// Configuration for seeding a ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Token metadata.
    pub token: TokenInfo,
    /// Account the entire supply is assigned to at initialization.
    pub owner: AccountId,
    /// Total supply, fixed for the ledger's lifetime.
    pub total_supply: u64,
    /// Log level.
    pub log_level: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            token: TokenInfo::default(),
            owner: AccountId::new("OWNER"),
            total_supply: DEFAULT_TOTAL_SUPPLY,
            log_level: "info".to_string(),
        }
    }
}

impl LedgerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(name) = std::env::var("TOKENBOOK_TOKEN_NAME") {
            config.token.name = name;
        }

        if let Ok(symbol) = std::env::var("TOKENBOOK_TOKEN_SYMBOL") {
            config.token.symbol = symbol;
        }

        if let Ok(owner) = std::env::var("TOKENBOOK_OWNER") {
            config.owner = AccountId::new(owner);
        }

        if let Ok(supply) = std::env::var("TOKENBOOK_TOTAL_SUPPLY") {
            if let Ok(supply) = supply.parse() {
                config.total_supply = supply;
            }
        }

        if let Ok(level) = std::env::var("TOKENBOOK_LOG_LEVEL") {
            config.log_level = level;
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !self.owner.is_valid() {
            return Err(format!("Invalid owner account: {:?}", self.owner.as_str()));
        }

        if self.token.name.is_empty() {
            return Err("Token name cannot be empty".to_string());
        }

        if self.token.symbol.is_empty() {
            return Err("Token symbol cannot be empty".to_string());
        }

        if self.total_supply == 0 {
            return Err("Total supply cannot be 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LedgerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.total_supply, 1_000_000);
    }

    #[test]
    fn test_invalid_config() {
        let mut config = LedgerConfig::default();
        config.owner = AccountId::new("not a valid id");
        assert!(config.validate().is_err());

        let mut config = LedgerConfig::default();
        config.total_supply = 0;
        assert!(config.validate().is_err());
    }
}
