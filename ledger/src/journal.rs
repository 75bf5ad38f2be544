//! Audit trail of applied transfers.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use tokenbook_common::{AccountId, TransferId};

/// A single applied transfer, as recorded in the journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRecord {
    /// Unique transfer ID.
    pub id: TransferId,
    /// Debited account.
    pub from: AccountId,
    /// Credited account.
    pub to: AccountId,
    /// Amount moved.
    pub amount: u64,
    /// Position in the mutation order.
    pub sequence: u64,
    /// When the transfer was recorded.
    pub recorded_at: DateTime<Utc>,
}

/// Journal of every applied transfer, indexed by transfer and by account.
///
/// Only successful transfers are recorded; a failed request leaves no
/// trace here.
#[derive(Debug, Default)]
pub struct TransferJournal {
    /// Records by transfer ID.
    records: DashMap<TransferId, TransferRecord>,
    /// Transfer IDs touching each account, in application order.
    records_by_account: DashMap<AccountId, Vec<TransferId>>,
}

impl TransferJournal {
    /// Create an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an applied transfer.
    pub fn record(&self, record: TransferRecord) {
        let id = record.id;

        self.records_by_account
            .entry(record.from.clone())
            .or_insert_with(Vec::new)
            .push(id);

        // Self-transfers are indexed once
        if record.to != record.from {
            self.records_by_account
                .entry(record.to.clone())
                .or_insert_with(Vec::new)
                .push(id);
        }

        self.records.insert(id, record);
    }

    /// Get a record by transfer ID.
    pub fn get(&self, id: &TransferId) -> Option<TransferRecord> {
        self.records.get(id).map(|r| r.clone())
    }

    /// Get all records touching an account, as sender or recipient.
    pub fn records_for_account(&self, account: &AccountId) -> Vec<TransferRecord> {
        self.records_by_account
            .get(account)
            .map(|ids| ids.iter().filter_map(|id| self.get(id)).collect())
            .unwrap_or_default()
    }

    /// Number of recorded transfers.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check whether the journal is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
