//! Tokenbook Common Types
//!
//! This crate contains shared types used across the Tokenbook ledger,
//! including account identifiers, token metadata, and error definitions.

pub mod error;
pub mod identifiers;
pub mod token;

pub use error::*;
pub use identifiers::*;
pub use token::*;
