//! Error types for apartment-pool.
//!
//! This module defines all error types used throughout the apartment-pool crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for apartment-pool operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Catalog Errors ===
    /// An apartment type key is not part of the layout table.
    #[error("unknown apartment type '{key}'")]
    UnknownApartmentType {
        /// The rejected key.
        key: String,
    },

    /// A section identifier is outside 1..=12.
    #[error("invalid section '{value}'")]
    InvalidSection {
        /// The rejected value.
        value: String,
    },

    /// An apartment id does not have the `section-floor-number` shape.
    #[error("invalid apartment id '{value}'")]
    InvalidApartmentId {
        /// The rejected value.
        value: String,
    },

    /// A floor selector is neither `all` nor a positive floor number.
    #[error("invalid floor '{value}', expected a floor number or 'all'")]
    InvalidFloor {
        /// The rejected value.
        value: String,
    },

    /// The generated catalog broke one of its structural invariants.
    #[error("catalog invariant violated: {message}")]
    CatalogInvariant {
        /// Which invariant failed and where.
        message: String,
    },

    // === Reservation Errors ===
    /// The apartment id is well formed but not in the catalog.
    #[error("apartment {id} does not exist")]
    UnknownApartment {
        /// The apartment id.
        id: String,
    },

    /// The apartment is already sold or reserved.
    #[error("apartment {id} is not free")]
    ApartmentNotFree {
        /// The apartment id.
        id: String,
    },

    /// A reservation was requested with no apartment open.
    #[error("no apartment is selected")]
    NoApartmentSelected,

    /// The buyer name is empty after trimming.
    #[error("buyer name must not be empty")]
    InvalidBuyerName,

    /// Writing the reservation document to durable storage failed.
    #[error("failed to persist reservations under '{key}': {source}")]
    PersistenceWrite {
        /// The state key being written.
        key: String,
        /// The underlying error.
        #[source]
        source: Box<Error>,
    },

    /// The persisted reservation document has a version this build cannot read.
    #[error("unsupported reservation document version {version}")]
    UnsupportedStateVersion {
        /// The version found in storage.
        version: u32,
    },

    /// The stored reservations could not be loaded, so writing would destroy them.
    #[error("reservations under '{key}' are read-only: {reason}")]
    StateReadOnly {
        /// The state key that was not loaded.
        key: String,
        /// Why the stored document was not loaded.
        reason: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for apartment-pool operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create an unknown apartment type error.
    #[must_use]
    pub fn unknown_apartment_type(key: impl Into<String>) -> Self {
        Self::UnknownApartmentType { key: key.into() }
    }

    /// Create a catalog invariant error.
    #[must_use]
    pub fn catalog_invariant(message: impl Into<String>) -> Self {
        Self::CatalogInvariant {
            message: message.into(),
        }
    }

    /// Wrap a backend failure as a persistence write error.
    #[must_use]
    pub fn persistence_write(key: impl Into<String>, source: Error) -> Self {
        Self::PersistenceWrite {
            key: key.into(),
            source: Box::new(source),
        }
    }

    /// Check if this error is a rejected reservation attempt.
    ///
    /// Rejections leave all state untouched.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidBuyerName
                | Self::NoApartmentSelected
                | Self::ApartmentNotFree { .. }
                | Self::UnknownApartment { .. }
        )
    }

    /// Check if this error means durable storage was not updated.
    #[must_use]
    pub fn is_persistence_failure(&self) -> bool {
        matches!(
            self,
            Self::PersistenceWrite { .. } | Self::StateReadOnly { .. }
        )
    }
}
