//! `apartment-pool` - Apartment catalog and local reservation ledger
//!
//! This library generates the apartment catalog of a twelve-section residential
//! building, filters and counts it by section, floor and availability, and keeps
//! buyers' reservations in a local `SQLite` database.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod query;
pub mod reservations;
pub mod session;
pub mod storage;

pub use catalog::{Apartment, ApartmentId, Catalog, Section};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use reservations::{Reservation, ReservationStore};
pub use session::Session;
pub use storage::{MemoryBackend, StateBackend, Storage, StorageStats};
