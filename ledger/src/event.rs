//! Transfer events and observer sinks.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::info;

use tokenbook_common::{AccountId, TransferId};

/// Notification of a successfully applied transfer.
///
/// Emitted for every successful mutation, zero-amount and self-transfers
/// included. `sequence` increases by one per applied mutation, so sinks
/// can verify they observed the exact order of application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEvent {
    /// Transfer this event belongs to.
    pub id: TransferId,
    /// Debited account.
    pub from: AccountId,
    /// Credited account.
    pub to: AccountId,
    /// Amount moved.
    pub amount: u64,
    /// Position in the mutation order, starting at 1.
    pub sequence: u64,
    /// When the event was emitted.
    pub emitted_at: DateTime<Utc>,
}

/// Delivery failure reported by a sink.
#[derive(Error, Debug)]
#[error("Event delivery failed: {0}")]
pub struct SinkError(pub String);

/// Observer of ledger state changes.
///
/// Delivery is synchronous and best-effort: a failed `emit` is logged by
/// the processor and never rolls back the transfer it describes.
pub trait EventSink: Send + Sync {
    /// Deliver one event.
    fn emit(&self, event: &TransferEvent) -> Result<(), SinkError>;
}

/// Sink that writes a structured log line per transfer.
#[derive(Debug, Default)]
pub struct TracingSink;

impl TracingSink {
    /// Create a new tracing sink.
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for TracingSink {
    fn emit(&self, event: &TransferEvent) -> Result<(), SinkError> {
        info!(
            transfer_id = %event.id,
            from = %event.from,
            to = %event.to,
            amount = event.amount,
            sequence = event.sequence,
            "Transfer applied"
        );
        Ok(())
    }
}

/// Sink that forwards events to an async consumer over a channel.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<TransferEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiver its events arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TransferEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: &TransferEvent) -> Result<(), SinkError> {
        self.tx
            .send(event.clone())
            .map_err(|_| SinkError("receiver dropped".to_string()))
    }
}

/// Sink that records events in memory, for tests and the simulator.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<TransferEvent>>,
}

impl MemorySink {
    /// Create a new memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded events, in emission order.
    pub fn events(&self) -> Vec<TransferEvent> {
        self.events.lock().clone()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Check whether no events were recorded.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &TransferEvent) -> Result<(), SinkError> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}
