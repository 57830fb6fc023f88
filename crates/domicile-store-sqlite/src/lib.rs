//! SQLite backend for the Domicile person register.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. Each unit of work is one
//! `BEGIN IMMEDIATE` transaction executed entirely on that thread; plain
//! reads use `BEGIN DEFERRED` and never wait for the write lock.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
