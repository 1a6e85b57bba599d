//! Domain Dashboard - Core Library
//!
//! Local record store, remote table adapter and the policy that chooses
//! between them for every operation.

pub mod config;
pub mod error;
pub mod kv;
pub mod normalize;
pub mod remote;
pub mod selector;
pub mod store;

pub use config::*;
pub use error::*;
pub use kv::{FileKv, KeyValueStore, MemoryKv};
pub use remote::{RemoteDomains, TableClient};
pub use selector::BackendSelector;
pub use store::RecordStore;

pub use dashboard_types as types;
