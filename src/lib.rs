//! task-sync: batch task synchronization client
//!
//! A library for submitting batches of task records to a remote automation
//! endpoint, following deferred jobs until they finish, and reducing the
//! per-record outcomes to a single summary.

pub mod config;
pub mod json;
pub mod lookup;
pub mod sync;
pub mod time;
pub mod transport;
