//! Tokenbook Ledger Engine
//!
//! Fixed-supply fungible-asset ledger: a balance mapping with a conserved
//! total supply, a single validated transfer path, and synchronous event
//! notification for every applied mutation.

pub mod config;
pub mod event;
pub mod journal;
pub mod processor;
pub mod store;

pub use config::LedgerConfig;
pub use event::{ChannelSink, EventSink, MemorySink, SinkError, TracingSink, TransferEvent};
pub use journal::{TransferJournal, TransferRecord};
pub use processor::TransferProcessor;
pub use store::LedgerStore;
