//! Transfer validation and execution.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{info, instrument, warn};

use tokenbook_common::{AccountId, LedgerError, Result, TokenInfo, TransferId};

use crate::event::{EventSink, TransferEvent};
use crate::journal::{TransferJournal, TransferRecord};
use crate::store::LedgerStore;

/// The only mutator of [`LedgerStore`].
///
/// Validates each transfer request against the ledger's invariants,
/// applies it as one atomic unit, records it in the journal, and
/// notifies every registered sink in mutation order. The store sits
/// behind a single read-write lock: transfers hold the write side for
/// the whole check-then-mutate sequence, queries take the read side and
/// therefore always observe a consistent snapshot.
pub struct TransferProcessor {
    /// Token metadata.
    token: TokenInfo,
    /// Balance store; `None` until `initialize`.
    store: RwLock<Option<LedgerStore>>,
    /// Audit trail of applied transfers.
    journal: TransferJournal,
    /// Observers, fixed at construction.
    sinks: Vec<Arc<dyn EventSink>>,
    /// Mutation-order counter; incremented under the write lock.
    sequence: AtomicU64,
}

impl TransferProcessor {
    /// Create an uninitialized processor with the given observers.
    pub fn new(token: TokenInfo, sinks: Vec<Arc<dyn EventSink>>) -> Self {
        Self {
            token,
            store: RwLock::new(None),
            journal: TransferJournal::new(),
            sinks,
            sequence: AtomicU64::new(0),
        }
    }

    /// Seed the ledger with the entire supply assigned to the owner.
    /// Called exactly once, before any other operation.
    #[instrument(skip(self))]
    pub fn initialize(&self, owner: &AccountId, total_supply: u64) -> Result<()> {
        if !owner.is_valid() {
            return Err(LedgerError::InvalidAccount(owner.to_string()));
        }

        let mut guard = self.store.write();
        if guard.is_some() {
            return Err(LedgerError::AlreadyInitialized);
        }
        *guard = Some(LedgerStore::new(owner.clone(), total_supply));

        info!(
            owner = %owner,
            total_supply,
            token = %self.token,
            "Ledger initialized"
        );

        Ok(())
    }

    /// Get the balance of an account. Zero for unknown accounts and for
    /// an uninitialized ledger; never fails.
    pub fn balance_of(&self, account: &AccountId) -> u64 {
        self.store
            .read()
            .as_ref()
            .map(|store| store.balance_of(account))
            .unwrap_or(0)
    }

    /// Get the total supply. Zero for an uninitialized ledger.
    pub fn total_supply(&self) -> u64 {
        self.store
            .read()
            .as_ref()
            .map(|store| store.total_supply())
            .unwrap_or(0)
    }

    /// Get the token metadata.
    pub fn token_info(&self) -> &TokenInfo {
        &self.token
    }

    /// Get the transfer journal.
    pub fn journal(&self) -> &TransferJournal {
        &self.journal
    }

    /// Check whether the ledger has been seeded.
    pub fn is_initialized(&self) -> bool {
        self.store.read().is_some()
    }

    /// Verify the conservation invariant holds.
    pub fn verify_integrity(&self) -> bool {
        self.store
            .read()
            .as_ref()
            .map(|store| store.verify_integrity())
            .unwrap_or(true)
    }

    /// Move `amount` units from `caller` to `recipient`.
    ///
    /// The caller identity is supplied by the authentication layer and
    /// trusted as-is. Zero-amount and self-transfers are valid no-ops on
    /// the balances and still produce a journal record and an event.
    /// Errors return with no partial mutation and no notification.
    #[instrument(skip(self))]
    pub fn transfer(
        &self,
        caller: &AccountId,
        recipient: &AccountId,
        amount: u64,
    ) -> Result<TransferId> {
        if !caller.is_valid() {
            return Err(LedgerError::InvalidAccount(caller.to_string()));
        }
        if !recipient.is_valid() {
            return Err(LedgerError::InvalidAccount(recipient.to_string()));
        }

        let mut guard = self.store.write();
        let store = guard.as_mut().ok_or(LedgerError::NotInitialized)?;

        // Check and mutation happen under one write-lock hold: no other
        // transfer can observe or touch these balances in between.
        let available = store.balance_of(caller);
        if available < amount {
            warn!(
                caller = %caller,
                required = amount,
                available,
                "Transfer rejected"
            );
            return Err(LedgerError::InsufficientBalance {
                required: amount,
                available,
            });
        }

        // Pre-flight the credit so a failure leaves no partial mutation.
        // A self-transfer cannot overflow: the debit frees the headroom.
        if caller != recipient {
            let recipient_balance = store.balance_of(recipient);
            if recipient_balance.checked_add(amount).is_none() {
                return Err(LedgerError::Overflow {
                    account: recipient.clone(),
                    balance: recipient_balance,
                    amount,
                });
            }
        }

        store.debit(caller, amount)?;
        store.credit(recipient, amount)?;

        let id = TransferId::new();
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let now = Utc::now();

        self.journal.record(TransferRecord {
            id,
            from: caller.clone(),
            to: recipient.clone(),
            amount,
            sequence,
            recorded_at: now,
        });

        let event = TransferEvent {
            id,
            from: caller.clone(),
            to: recipient.clone(),
            amount,
            sequence,
            emitted_at: now,
        };

        // Emitted while the write lock is still held, so sinks observe
        // events in the exact order mutations were applied. Delivery is
        // best-effort: a sink failure never rolls back the transfer.
        for sink in &self.sinks {
            if let Err(e) = sink.emit(&event) {
                warn!(transfer_id = %id, error = %e, "Event delivery failed");
            }
        }

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{ChannelSink, MemorySink};
    use proptest::prelude::*;

    fn owner() -> AccountId {
        AccountId::new("OWNER")
    }

    fn create_test_processor(total_supply: u64) -> (TransferProcessor, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let processor =
            TransferProcessor::new(TokenInfo::default(), vec![sink.clone() as Arc<dyn EventSink>]);
        processor.initialize(&owner(), total_supply).unwrap();
        (processor, sink)
    }

    #[test]
    fn test_initialization_assigns_supply_to_owner() {
        let (processor, sink) = create_test_processor(1000);

        assert_eq!(processor.balance_of(&owner()), 1000);
        assert_eq!(processor.total_supply(), 1000);
        assert!(processor.is_initialized());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_initialize_twice_fails() {
        let (processor, _sink) = create_test_processor(1000);

        let err = processor.initialize(&owner(), 1000).unwrap_err();
        assert_eq!(err, LedgerError::AlreadyInitialized);
        assert!(err.is_fatal());
    }

    #[test]
    fn test_transfer_before_initialize_fails() {
        let processor = TransferProcessor::new(TokenInfo::default(), Vec::new());

        let err = processor
            .transfer(&owner(), &AccountId::new("ALICE"), 1)
            .unwrap_err();
        assert_eq!(err, LedgerError::NotInitialized);
    }

    #[test]
    fn test_queries_before_initialize_return_zero() {
        let processor = TransferProcessor::new(TokenInfo::default(), Vec::new());

        assert_eq!(processor.balance_of(&owner()), 0);
        assert_eq!(processor.total_supply(), 0);
        assert!(!processor.is_initialized());
    }

    #[test]
    fn test_transfer_moves_balance_and_notifies() {
        let (processor, sink) = create_test_processor(1000);
        let alice = AccountId::new("ALICE");

        processor.transfer(&owner(), &alice, 50).unwrap();

        assert_eq!(processor.balance_of(&owner()), 950);
        assert_eq!(processor.balance_of(&alice), 50);

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].from, owner());
        assert_eq!(events[0].to, alice);
        assert_eq!(events[0].amount, 50);
    }

    #[test]
    fn test_transfer_chain() {
        let (processor, _sink) = create_test_processor(1000);
        let alice = AccountId::new("ALICE");
        let bob = AccountId::new("BOB");

        processor.transfer(&owner(), &alice, 50).unwrap();
        processor.transfer(&alice, &bob, 50).unwrap();

        assert_eq!(processor.balance_of(&alice), 0);
        assert_eq!(processor.balance_of(&bob), 50);
        assert!(processor.verify_integrity());
    }

    #[test]
    fn test_insufficient_balance_leaves_no_trace() {
        let (processor, sink) = create_test_processor(1000);
        let alice = AccountId::new("ALICE");

        let err = processor.transfer(&alice, &owner(), 1).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                required: 1,
                available: 0,
            }
        );

        assert_eq!(processor.balance_of(&owner()), 1000);
        assert!(sink.is_empty());
        assert!(processor.journal().is_empty());
    }

    #[test]
    fn test_self_transfer_is_noop_with_event() {
        let (processor, sink) = create_test_processor(1000);

        processor.transfer(&owner(), &owner(), 10).unwrap();

        assert_eq!(processor.balance_of(&owner()), 1000);
        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].from, events[0].to);
        assert!(processor.verify_integrity());
    }

    #[test]
    fn test_zero_amount_transfer_is_valid() {
        let (processor, sink) = create_test_processor(1000);
        let alice = AccountId::new("ALICE");

        processor.transfer(&owner(), &alice, 0).unwrap();

        assert_eq!(processor.balance_of(&owner()), 1000);
        assert_eq!(processor.balance_of(&alice), 0);
        assert_eq!(sink.len(), 1);
        assert_eq!(processor.journal().len(), 1);
    }

    #[test]
    fn test_invalid_account_rejected() {
        let (processor, sink) = create_test_processor(1000);

        let err = processor
            .transfer(&owner(), &AccountId::new("not valid!"), 1)
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAccount(_)));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_events_follow_mutation_order() {
        let (processor, sink) = create_test_processor(1000);
        let alice = AccountId::new("ALICE");
        let bob = AccountId::new("BOB");

        processor.transfer(&owner(), &alice, 10).unwrap();
        processor.transfer(&owner(), &bob, 20).unwrap();
        processor.transfer(&alice, &bob, 5).unwrap();

        let events = sink.events();
        let sequences: Vec<u64> = events.iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3]);
        assert_eq!(events[2].amount, 5);
    }

    #[test]
    fn test_journal_records_successful_transfers() {
        let (processor, _sink) = create_test_processor(1000);
        let alice = AccountId::new("ALICE");

        let id = processor.transfer(&owner(), &alice, 50).unwrap();
        let _ = processor.transfer(&alice, &owner(), 500).unwrap_err();

        assert_eq!(processor.journal().len(), 1);
        let record = processor.journal().get(&id).unwrap();
        assert_eq!(record.amount, 50);
        assert_eq!(processor.journal().records_for_account(&alice).len(), 1);
    }

    #[test]
    fn test_sink_failure_does_not_roll_back() {
        let (channel_sink, rx) = ChannelSink::new();
        drop(rx);

        let processor =
            TransferProcessor::new(TokenInfo::default(), vec![Arc::new(channel_sink)]);
        processor.initialize(&owner(), 1000).unwrap();

        let alice = AccountId::new("ALICE");
        processor.transfer(&owner(), &alice, 50).unwrap();

        assert_eq!(processor.balance_of(&alice), 50);
        assert_eq!(processor.journal().len(), 1);
    }

    #[test]
    fn test_contended_sender_serializes() {
        let (processor, _sink) = create_test_processor(15);
        let processor = Arc::new(processor);
        let alice = AccountId::new("ALICE");
        let bob = AccountId::new("BOB");

        let handles: Vec<_> = [alice.clone(), bob.clone()]
            .into_iter()
            .map(|recipient| {
                let processor = processor.clone();
                std::thread::spawn(move || processor.transfer(&owner(), &recipient, 10))
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let succeeded = results.iter().filter(|r| r.is_ok()).count();
        let rejected = results
            .iter()
            .filter(|r| {
                matches!(
                    r,
                    Err(LedgerError::InsufficientBalance { .. })
                )
            })
            .count();

        assert_eq!(succeeded, 1);
        assert_eq!(rejected, 1);
        assert_eq!(processor.balance_of(&owner()), 5);
        assert_eq!(
            processor.balance_of(&alice) + processor.balance_of(&bob),
            10
        );
        assert!(processor.verify_integrity());
    }

    proptest! {
        #[test]
        fn prop_transfers_conserve_supply(
            ops in proptest::collection::vec((0usize..4, 0usize..4, 0u64..500), 1..64)
        ) {
            let accounts = [
                AccountId::new("OWNER"),
                AccountId::new("ALICE"),
                AccountId::new("BOB"),
                AccountId::new("CAROL"),
            ];
            let processor = TransferProcessor::new(TokenInfo::default(), Vec::new());
            processor.initialize(&accounts[0], 1000).unwrap();

            for (from, to, amount) in ops {
                let _ = processor.transfer(&accounts[from], &accounts[to], amount);

                prop_assert!(processor.verify_integrity());
                let sum: u64 = accounts.iter().map(|a| processor.balance_of(a)).sum();
                prop_assert_eq!(sum, 1000);
            }
        }
    }
}
