//! Balance storage for the ledger.

use std::collections::HashMap;

use tokenbook_common::{AccountId, LedgerError, Result};

/// Owns the balance mapping and the immutable total-supply value.
///
/// Absent keys read as zero, so any identity can receive funds without
/// prior registration. The store performs no locking; the concurrency
/// discipline lives in [`crate::processor::TransferProcessor`].
#[derive(Debug)]
pub struct LedgerStore {
    /// Total supply, fixed at creation.
    total_supply: u64,
    /// Balances by account. Invariant: values sum to `total_supply`.
    balances: HashMap<AccountId, u64>,
}

impl LedgerStore {
    /// Create a store with the entire supply assigned to the owner.
    pub fn new(owner: AccountId, total_supply: u64) -> Self {
        let mut balances = HashMap::new();
        balances.insert(owner, total_supply);
        Self {
            total_supply,
            balances,
        }
    }

    /// Get the balance of an account. Zero for accounts never credited.
    pub fn balance_of(&self, account: &AccountId) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Get the total supply.
    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    /// Reduce an account's balance.
    pub(crate) fn debit(&mut self, account: &AccountId, amount: u64) -> Result<()> {
        let balance = self.balances.entry(account.clone()).or_insert(0);
        match balance.checked_sub(amount) {
            Some(next) => {
                *balance = next;
                Ok(())
            }
            None => Err(LedgerError::InsufficientBalance {
                required: amount,
                available: *balance,
            }),
        }
    }

    /// Increase an account's balance, implicitly creating it on first
    /// credit. Overflow is unreachable under a conserved, bounded supply
    /// but checked because debit and credit are not paired atomically
    /// by the store itself.
    pub(crate) fn credit(&mut self, account: &AccountId, amount: u64) -> Result<()> {
        let balance = self.balances.entry(account.clone()).or_insert(0);
        match balance.checked_add(amount) {
            Some(next) => {
                *balance = next;
                Ok(())
            }
            None => Err(LedgerError::Overflow {
                account: account.clone(),
                balance: *balance,
                amount,
            }),
        }
    }

    /// Sum of all balances.
    pub fn circulating(&self) -> u64 {
        self.balances.values().sum()
    }

    /// Verify the conservation invariant holds.
    pub fn verify_integrity(&self) -> bool {
        self.circulating() == self.total_supply
    }

    /// Number of accounts present in the mapping (zero-balance keys
    /// included; absent and zero are observably identical).
    pub fn account_count(&self) -> usize {
        self.balances.len()
    }
}
