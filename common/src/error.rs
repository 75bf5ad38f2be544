//! Error types for Tokenbook ledger operations.

use crate::AccountId;
use thiserror::Error;

/// Main error type for ledger operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Sender's balance is below the requested amount.
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: u64, available: u64 },

    /// Crediting would exceed the representable range. Unreachable under
    /// a conserved, bounded supply; a hit means the supply invariant is
    /// already broken.
    #[error("Balance overflow on {account}: {balance} + {amount}")]
    Overflow {
        account: AccountId,
        balance: u64,
        amount: u64,
    },

    /// Operation attempted before the ledger was initialized.
    #[error("Ledger not initialized")]
    NotInitialized,

    /// Initialize called on an already-seeded ledger.
    #[error("Ledger already initialized")]
    AlreadyInitialized,

    /// Malformed account identifier.
    #[error("Invalid account identifier: {0}")]
    InvalidAccount(String),
}

impl LedgerError {
    /// Check if this error indicates a defect rather than an ordinary,
    /// recoverable outcome.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            LedgerError::Overflow { .. }
                | LedgerError::NotInitialized
                | LedgerError::AlreadyInitialized
        )
    }

    /// Get error code for reporting surfaces.
    pub fn error_code(&self) -> &'static str {
        match self {
            LedgerError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            LedgerError::Overflow { .. } => "OVERFLOW",
            LedgerError::NotInitialized => "NOT_INITIALIZED",
            LedgerError::AlreadyInitialized => "ALREADY_INITIALIZED",
            LedgerError::InvalidAccount(_) => "INVALID_ACCOUNT",
        }
    }
}

/// Result type alias for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
