//! Local reservation ledger.
//!
//! The store keeps the map of reserved apartments in memory and writes the
//! whole map through a [`StateBackend`] after every change. It is the only
//! mutable state in the crate.
//!
//! The store checks buyer names only. Whether an apartment exists or is free
//! is decided by the caller (see [`crate::session::Session::reserve`]); the
//! store itself overwrites an existing reservation without complaint.
//!
//! A store whose backend could not be read, or whose stored document was
//! written by a newer build, comes up empty and read-only: reserve and
//! cancel fail with [`Error::StateReadOnly`] and storage is left as found.

pub mod document;

use tracing::{debug, info, warn};

pub use document::{DocumentFormat, Reservation, ReservationMap, DOCUMENT_VERSION};

use crate::catalog::ApartmentId;
use crate::error::{Error, Result};
use crate::storage::StateBackend;

/// Where the map came from on [`ReservationStore::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Nothing was stored yet.
    Empty,
    /// A stored document was read.
    Restored(DocumentFormat),
    /// The stored document was unreadable and has been ignored.
    Discarded,
    /// The stored document has a version this build cannot read.
    Unsupported(u32),
    /// The backend itself could not be read.
    Unavailable,
}

impl LoadSource {
    /// Whether the store must refuse writes after loading from this source.
    #[must_use]
    pub fn is_read_only(self) -> bool {
        matches!(self, Self::Unsupported(_) | Self::Unavailable)
    }
}

/// Summary of a [`ReservationStore::load`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// How the map was obtained.
    pub source: LoadSource,
    /// Reservations now in memory.
    pub restored: usize,
    /// Stored entries that were dropped.
    pub discarded: usize,
    /// The document was saved against a different catalog.
    pub catalog_changed: bool,
}

impl LoadReport {
    fn empty(source: LoadSource) -> Self {
        Self {
            source,
            restored: 0,
            discarded: 0,
            catalog_changed: false,
        }
    }
}

/// Reservation map mirrored to durable storage.
#[derive(Debug)]
pub struct ReservationStore<B> {
    backend: B,
    key: String,
    catalog: Option<String>,
    reservations: ReservationMap,
    read_only: Option<String>,
}

impl<B: StateBackend> ReservationStore<B> {
    /// Create an empty store writing under `key`.
    ///
    /// Nothing is read until [`load`](Self::load) is called.
    pub fn new(backend: B, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            catalog: None,
            reservations: ReservationMap::new(),
            read_only: None,
        }
    }

    /// Record `fingerprint` in every saved document and compare it on load.
    #[must_use]
    pub fn with_catalog_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.catalog = Some(fingerprint.into());
        self
    }

    /// Replace the in-memory map with the persisted one.
    ///
    /// Never fails: a missing, unreadable or unparsable document leaves the
    /// store empty and is reported in the returned [`LoadReport`]. If the
    /// backend read fails or the document has an unsupported version, the
    /// store also becomes read-only until the next successful load.
    pub fn load(&mut self) -> LoadReport {
        self.reservations.clear();
        self.read_only = None;

        let raw = match self.backend.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.key, "No stored reservations");
                return LoadReport::empty(LoadSource::Empty);
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read stored reservations, starting read-only");
                self.read_only = Some(format!("stored reservations could not be read: {e}"));
                return LoadReport::empty(LoadSource::Unavailable);
            }
        };

        let decoded = match document::decode(&raw) {
            Ok(decoded) => decoded,
            Err(Error::UnsupportedStateVersion { version }) => {
                warn!(key = %self.key, version, "Stored reservations have an unsupported version, starting read-only");
                self.read_only = Some(format!("stored document has version {version}"));
                return LoadReport::empty(LoadSource::Unsupported(version));
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Ignoring unreadable reservation document");
                return LoadReport::empty(LoadSource::Discarded);
            }
        };

        let catalog_changed = match (&self.catalog, &decoded.catalog) {
            (Some(current), Some(saved)) => current != saved,
            _ => false,
        };
        if catalog_changed {
            warn!(key = %self.key, "Reservations were saved against a different catalog");
        }

        self.reservations = decoded.reservations;
        info!(
            restored = self.reservations.len(),
            discarded = decoded.discarded,
            "Loaded reservations"
        );

        LoadReport {
            source: LoadSource::Restored(decoded.format),
            restored: self.reservations.len(),
            discarded: decoded.discarded,
            catalog_changed,
        }
    }

    /// Reserve `id` for `buyer_name` and persist the map.
    ///
    /// The name is trimmed. An existing reservation for `id` is overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBuyerName`] for an empty or whitespace-only
    /// name, [`Error::StateReadOnly`] if the last load left the store
    /// read-only, and [`Error::PersistenceWrite`] if the map could not be
    /// saved. In every case the in-memory map is unchanged.
    pub fn reserve(&mut self, id: ApartmentId, buyer_name: &str) -> Result<()> {
        let buyer_name = buyer_name.trim();
        if buyer_name.is_empty() {
            return Err(Error::InvalidBuyerName);
        }
        self.ensure_writable()?;

        let previous = self
            .reservations
            .insert(id, Reservation::now(buyer_name));

        if let Err(e) = self.persist() {
            match previous {
                Some(previous) => self.reservations.insert(id, previous),
                None => self.reservations.remove(&id),
            };
            return Err(e);
        }

        if let Some(previous) = previous {
            debug!(%id, previous = %previous.buyer_name, "Overwrote reservation");
        }
        info!(%id, "Reserved apartment");
        Ok(())
    }

    /// Remove the reservation for `id` and persist the map.
    ///
    /// Returns `false` without touching storage if `id` was not reserved.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StateReadOnly`] if the last load left the store
    /// read-only, and [`Error::PersistenceWrite`] if the map could not be
    /// saved; the reservation is then kept.
    pub fn cancel(&mut self, id: ApartmentId) -> Result<bool> {
        self.ensure_writable()?;
        let Some(removed) = self.reservations.remove(&id) else {
            debug!(%id, "Nothing to cancel");
            return Ok(false);
        };

        if let Err(e) = self.persist() {
            self.reservations.insert(id, removed);
            return Err(e);
        }

        info!(%id, "Cancelled reservation");
        Ok(true)
    }

    fn ensure_writable(&self) -> Result<()> {
        match &self.read_only {
            Some(reason) => Err(Error::StateReadOnly {
                key: self.key.clone(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    fn persist(&mut self) -> Result<()> {
        let raw = document::encode(&self.reservations, self.catalog.as_deref())
            .map_err(|e| Error::persistence_write(&self.key, e))?;
        self.backend
            .write(&self.key, &raw)
            .map_err(|e| Error::persistence_write(&self.key, e))
    }
}

impl<B> ReservationStore<B> {
    /// The reservation for `id`, if any.
    #[must_use]
    pub fn get(&self, id: &ApartmentId) -> Option<&Reservation> {
        self.reservations.get(id)
    }

    /// Buyer name recorded for `id`, if any.
    #[must_use]
    pub fn buyer(&self, id: &ApartmentId) -> Option<&str> {
        self.get(id).map(|r| r.buyer_name.as_str())
    }

    /// Whether `id` is reserved.
    #[must_use]
    pub fn is_reserved(&self, id: &ApartmentId) -> bool {
        self.reservations.contains_key(id)
    }

    /// The full map, ordered by apartment id.
    #[must_use]
    pub fn reservations(&self) -> &ReservationMap {
        &self.reservations
    }

    /// Number of reservations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reservations.len()
    }

    /// Whether there are no reservations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reservations.is_empty()
    }

    /// Whether the last load left the store unable to write.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only.is_some()
    }

    /// The storage key the map is written under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The backend the map is written to.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }
}
