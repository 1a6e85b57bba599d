//! Dashboard Types - Pure record definitions
//!
//! This crate contains only the data shapes shared by the store, the remote
//! adapter and the CLI. It has no async runtime or I/O dependencies.

pub mod domain;
pub mod id;
pub mod task;

pub use domain::*;
pub use id::generate_id;
pub use task::*;
