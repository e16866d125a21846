//! On-disk format of the reservation map.
//!
//! The current format is a versioned envelope:
//!
//! ```json
//! {
//!   "version": 2,
//!   "catalog": "<catalog fingerprint>",
//!   "reservations": {
//!     "1-5-3": { "buyer_name": "Alice", "reserved_at": "2026-10-15T09:30:00Z" }
//!   }
//! }
//! ```
//!
//! Version 1 had no envelope: a bare object mapping apartment ids to buyer
//! names. It is still accepted on read and rewritten as version 2 on the next
//! save.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::catalog::ApartmentId;
use crate::error::{Error, Result};

/// Version written by this build.
pub const DOCUMENT_VERSION: u32 = 2;

/// Reservations keyed by apartment id.
pub type ReservationMap = BTreeMap<ApartmentId, Reservation>;

/// A buyer's local claim on one apartment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Trimmed, non-empty buyer name.
    pub buyer_name: String,
    /// When the reservation was made; unknown for version 1 documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserved_at: Option<DateTime<Utc>>,
}

impl Reservation {
    /// Create a reservation stamped with the current time.
    #[must_use]
    pub fn now(buyer_name: impl Into<String>) -> Self {
        Self {
            buyer_name: buyer_name.into(),
            reserved_at: Some(Utc::now()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<R> {
    version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    catalog: Option<String>,
    reservations: BTreeMap<String, R>,
}

/// Which format a document was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Bare id → name object.
    Legacy,
    /// Versioned envelope.
    Current,
}

/// Result of decoding a stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    /// Valid reservations.
    pub reservations: ReservationMap,
    /// Catalog fingerprint recorded at save time, if any.
    pub catalog: Option<String>,
    /// Entries dropped for a malformed id or an empty name.
    pub discarded: usize,
    /// Format the document was read from.
    pub format: DocumentFormat,
}

/// Serialize `reservations` as a current-version document.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn encode(reservations: &ReservationMap, catalog: Option<&str>) -> Result<String> {
    let envelope = Envelope {
        version: DOCUMENT_VERSION,
        catalog: catalog.map(str::to_string),
        reservations: reservations
            .iter()
            .map(|(id, r)| (id.to_string(), r))
            .collect(),
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Parse a stored document of either format.
///
/// Individual bad entries are dropped and counted; only a document that is
/// not JSON, not an object, or of an unknown version is an error.
///
/// # Errors
///
/// Returns [`Error::Json`] for unparsable documents and
/// [`Error::UnsupportedStateVersion`] for an envelope whose `version` is
/// anything but 2. Version 1 documents carry no `version` field at all; an
/// object without one is read as the bare legacy map.
pub fn decode(raw: &str) -> Result<Decoded> {
    let value: Value = serde_json::from_str(raw)?;

    match value.get("version").map(Value::as_u64) {
        Some(Some(version)) if version == u64::from(DOCUMENT_VERSION) => {
            let envelope: Envelope<Value> = serde_json::from_value(value)?;
            let (reservations, discarded) = collect(
                envelope
                    .reservations
                    .into_iter()
                    .map(|(id, entry)| (id, serde_json::from_value::<Reservation>(entry).ok())),
            );
            Ok(Decoded {
                reservations,
                catalog: envelope.catalog,
                discarded,
                format: DocumentFormat::Current,
            })
        }
        Some(version) => Err(Error::UnsupportedStateVersion {
            version: version
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(u32::MAX),
        }),
        None => {
            let legacy: BTreeMap<String, Value> = serde_json::from_value(value)?;
            let (reservations, discarded) = collect(legacy.into_iter().map(|(id, name)| {
                let reservation = name.as_str().map(|n| Reservation {
                    buyer_name: n.to_string(),
                    reserved_at: None,
                });
                (id, reservation)
            }));
            Ok(Decoded {
                reservations,
                catalog: None,
                discarded,
                format: DocumentFormat::Legacy,
            })
        }
    }
}

fn collect(entries: impl Iterator<Item = (String, Option<Reservation>)>) -> (ReservationMap, usize) {
    let mut reservations = ReservationMap::new();
    let mut discarded = 0;

    for (raw_id, reservation) in entries {
        let Ok(id) = raw_id.parse::<ApartmentId>() else {
            warn!(id = %raw_id, "Discarding reservation with malformed apartment id");
            discarded += 1;
            continue;
        };
        let Some(mut reservation) = reservation else {
            warn!(%id, "Discarding malformed reservation");
            discarded += 1;
            continue;
        };
        let trimmed = reservation.buyer_name.trim();
        if trimmed.is_empty() {
            warn!(%id, "Discarding reservation with empty buyer name");
            discarded += 1;
            continue;
        }
        reservation.buyer_name = trimmed.to_string();
        reservations.insert(id, reservation);
    }

    (reservations, discarded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> ApartmentId {
        s.parse().unwrap()
    }

    #[test]
    fn test_decode_legacy_map() {
        let decoded = decode(r#"{"1-1-1":"Alice","12-15-6":"Борис"}"#).unwrap();

        assert_eq!(decoded.format, DocumentFormat::Legacy);
        assert_eq!(decoded.reservations.len(), 2);
        assert_eq!(decoded.reservations[&id("1-1-1")].buyer_name, "Alice");
        assert!(decoded.reservations[&id("1-1-1")].reserved_at.is_none());
        assert_eq!(decoded.reservations[&id("12-15-6")].buyer_name, "Борис");
        assert!(decoded.catalog.is_none());
    }

    #[test]
    fn test_decode_current_document() {
        let raw = r#"{
            "version": 2,
            "catalog": "abc",
            "reservations": {
                "2-3-4": {"buyer_name": "Alice", "reserved_at": "2026-10-15T09:30:00Z"}
            }
        }"#;
        let decoded = decode(raw).unwrap();

        assert_eq!(decoded.format, DocumentFormat::Current);
        assert_eq!(decoded.catalog.as_deref(), Some("abc"));
        let reservation = &decoded.reservations[&id("2-3-4")];
        assert_eq!(reservation.buyer_name, "Alice");
        assert!(reservation.reserved_at.is_some());
    }

    #[test]
    fn test_decode_drops_bad_entries() {
        let decoded = decode(r#"{"1-1-1":"Alice","bogus":"Bob","1-1-2":"  ","1-1-3":42}"#).unwrap();

        assert_eq!(decoded.reservations.len(), 1);
        assert_eq!(decoded.discarded, 3);
    }

    #[test]
    fn test_decode_current_keeps_good_entries_beside_bad_ones() {
        let raw = r#"{
            "version": 2,
            "reservations": {
                "1-1-1": {"buyer_name": "Alice"},
                "1-1-2": "Bob",
                "1-1-3": {"buyer_name": 7},
                "1-1-4": {"buyer_name": "Carol", "reserved_at": "yesterday"}
            }
        }"#;
        let decoded = decode(raw).unwrap();

        assert_eq!(decoded.format, DocumentFormat::Current);
        assert_eq!(decoded.reservations.len(), 1);
        assert_eq!(decoded.reservations[&id("1-1-1")].buyer_name, "Alice");
        assert_eq!(decoded.discarded, 3);
    }

    #[test]
    fn test_decode_trims_names() {
        let decoded = decode(r#"{"1-1-1":"  Alice "}"#).unwrap();
        assert_eq!(decoded.reservations[&id("1-1-1")].buyer_name, "Alice");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode("not json"), Err(Error::Json(_))));
        assert!(matches!(decode("[1,2,3]"), Err(Error::Json(_))));
        assert!(matches!(decode("\"text\""), Err(Error::Json(_))));
    }

    #[test]
    fn test_decode_rejects_unknown_version() {
        let err = decode(r#"{"version": 9, "reservations": {}}"#).unwrap_err();
        assert!(matches!(err, Error::UnsupportedStateVersion { version: 9 }));

        // version 1 never had an envelope
        let err = decode(r#"{"version": 1, "reservations": {}}"#).unwrap_err();
        assert!(matches!(err, Error::UnsupportedStateVersion { version: 1 }));

        let err = decode(r#"{"version": "3", "reservations": {}}"#).unwrap_err();
        assert!(matches!(err, Error::UnsupportedStateVersion { .. }));
    }

    #[test]
    fn test_encode_writes_current_version() {
        let mut reservations = ReservationMap::new();
        reservations.insert(id("1-1-1"), Reservation::now("Alice"));

        let raw = encode(&reservations, Some("fp")).unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], 2);
        assert_eq!(value["catalog"], "fp");
        assert_eq!(value["reservations"]["1-1-1"]["buyer_name"], "Alice");

        let decoded = decode(&raw).unwrap();
        assert_eq!(decoded.reservations, reservations);
    }

    #[test]
    fn test_encode_empty_map() {
        let raw = encode(&ReservationMap::new(), None).unwrap();
        assert_eq!(raw, r#"{"version":2,"reservations":{}}"#);
    }
}
