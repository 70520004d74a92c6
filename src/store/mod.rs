//! Persistence for permission overrides, aliases and custom triggers.
//!
//! Records live in a [`Storage`] backend. The router never reads storage on
//! the message path; it reads [`Tables`], which hold immutable snapshots that
//! are rebuilt from storage after every write.

mod backend;
mod json;
mod records;
mod snapshot;
mod tables;

pub use backend::{MemoryStore, Storage, StoreDocument, StoreError};
pub use json::JsonFileStore;
pub use records::{AliasRecord, OverrideRecord, TriggerRecord};
pub use snapshot::SnapshotTable;
pub use tables::Tables;
