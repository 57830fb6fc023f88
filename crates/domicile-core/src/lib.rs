//! Core types and the consistency engine for the Domicile person register.
//!
//! Persons reference exactly one postal address; addresses are stored once
//! per distinct value and shared by every person living there. The
//! [`registry::Registry`] keeps that table deduplicated and free of orphans
//! on top of any backend implementing [`store::PersonStore`].
//!
//! This crate has no database or presentation dependencies. The in-memory
//! backend in [`memory`] lives here since it needs no driver.

pub mod error;
pub mod matcher;
pub mod memory;
pub mod model;
pub mod registry;
pub mod store;

pub use error::{Error, Result};
pub use registry::{ReadOutcome, Registry};
