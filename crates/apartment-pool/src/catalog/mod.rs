//! Static apartment catalog.
//!
//! The catalog is generated from the section table and the per-floor layout
//! templates. Generation is a pure function of the configuration: the same
//! scheme and price rate always produce the same, fully free catalog.

pub mod layout;
pub mod section;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use layout::{ApartmentClass, ApartmentType, ApartmentTypeKey};
pub use section::{Section, SectionImages, SectionKind, SectionScheme, SECTION_COUNT};

use crate::config::CatalogConfig;
use crate::error::{Error, Result};

/// Floors in every section.
pub const FLOORS_PER_SECTION: u8 = 15;

/// Stable identifier of an apartment: section, floor and unit number.
///
/// Rendered as `section-floor-number`, e.g. `1-5-3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ApartmentId {
    /// Section of the apartment.
    pub section: Section,
    /// Floor, starting at 1.
    pub floor: u8,
    /// Unit number on the floor, starting at 1.
    pub number: u8,
}

impl ApartmentId {
    /// Create an id from its parts.
    #[must_use]
    pub fn new(section: Section, floor: u8, number: u8) -> Self {
        Self {
            section,
            floor,
            number,
        }
    }
}

impl fmt::Display for ApartmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.section, self.floor, self.number)
    }
}

impl FromStr for ApartmentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidApartmentId {
            value: s.to_string(),
        };

        let mut parts = s.split('-');
        let (Some(section), Some(floor), Some(number), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        let section = section.parse::<Section>().map_err(|_| invalid())?;
        let floor = floor.parse::<u8>().map_err(|_| invalid())?;
        let number = number.parse::<u8>().map_err(|_| invalid())?;
        if floor == 0 || number == 0 {
            return Err(invalid());
        }

        // only the rendered form is a key; "01-1-1" or "1-+1-1" would alias it
        let id = Self::new(section, floor, number);
        if id.to_string() != s {
            return Err(invalid());
        }
        Ok(id)
    }
}

impl Serialize for ApartmentId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ApartmentId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Baseline sale status of an apartment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApartmentStatus {
    /// Available.
    #[default]
    Free,
    /// Sold by the developer.
    Sold,
}

impl fmt::Display for ApartmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Sold => write!(f, "sold"),
        }
    }
}

/// One apartment of the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Apartment {
    /// Catalog-wide unique id.
    pub id: ApartmentId,
    /// Unit number on the floor.
    pub number: u8,
    /// Floor number.
    pub floor: u8,
    /// Section the apartment belongs to.
    pub section: Section,
    /// Layout key from the drawings.
    pub type_key: ApartmentTypeKey,
    /// Number of rooms.
    pub rooms: u8,
    /// Total area in m².
    pub area: f64,
    /// Living area in m².
    pub living_area: f64,
    /// Kitchen area in m².
    pub kitchen_area: f64,
    /// Price in whole roubles.
    pub price: u64,
    /// Baseline status, before local reservations.
    pub status: ApartmentStatus,
    /// Class derived from the layout key.
    pub apartment_class: ApartmentClass,
}

impl Apartment {
    fn new(section: Section, floor: u8, number: u8, type_key: ApartmentTypeKey, rate: u64) -> Self {
        let layout = type_key.layout();
        Self {
            id: ApartmentId::new(section, floor, number),
            number,
            floor,
            section,
            type_key,
            rooms: layout.rooms,
            area: layout.area,
            living_area: layout.living_area,
            kitchen_area: layout.kitchen_area,
            price: price_for(layout.area, rate),
            status: ApartmentStatus::Free,
            apartment_class: type_key.class(),
        }
    }
}

/// Price of `area` m² at `rate` per m², rounded to the nearest rouble.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn price_for(area: f64, rate: u64) -> u64 {
    (area * rate as f64).round() as u64
}

/// All apartments on one floor of one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorPlan {
    /// Floor number.
    pub floor: u8,
    /// Section of the floor.
    pub section: Section,
    /// Apartments in unit-number order.
    pub apartments: Vec<Apartment>,
}

/// The generated building catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    floors: Vec<FloorPlan>,
    scheme: SectionScheme,
    price_per_sqm: u64,
}

impl Catalog {
    /// Generate the catalog for every section and floor.
    ///
    /// Floors are ordered by section, then by floor number.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CatalogInvariant`] if the generated data breaks a
    /// structural invariant (floor range, units per floor, unique ids).
    pub fn generate(config: &CatalogConfig) -> Result<Self> {
        let floors = config
            .section_scheme
            .table()
            .into_iter()
            .flat_map(|(section, kind)| {
                (1..=FLOORS_PER_SECTION).map(move |floor| FloorPlan {
                    floor,
                    section,
                    apartments: kind
                        .template(floor)
                        .iter()
                        .zip(1u8..)
                        .map(|(&key, number)| {
                            Apartment::new(section, floor, number, key, config.price_per_sqm)
                        })
                        .collect(),
                })
            })
            .collect();

        let catalog = Self {
            floors,
            scheme: config.section_scheme,
            price_per_sqm: config.price_per_sqm,
        };
        catalog.verify()?;

        debug!(
            scheme = %catalog.scheme,
            apartments = catalog.len(),
            "Generated apartment catalog"
        );
        Ok(catalog)
    }

    fn verify(&self) -> Result<()> {
        let mut seen = HashSet::new();

        for section in Section::all() {
            let kind = self.kind_of(section);
            let floors: Vec<u8> = self.section_floors(section).map(|f| f.floor).collect();
            let expected: Vec<u8> = (1..=FLOORS_PER_SECTION).collect();
            if floors != expected {
                return Err(Error::catalog_invariant(format!(
                    "section {section} has floors {floors:?}"
                )));
            }

            for plan in self.section_floors(section) {
                if plan.apartments.len() != kind.units_per_floor() {
                    return Err(Error::catalog_invariant(format!(
                        "section {section} floor {} has {} apartments, expected {}",
                        plan.floor,
                        plan.apartments.len(),
                        kind.units_per_floor()
                    )));
                }
                for apartment in &plan.apartments {
                    if apartment.section != plan.section || apartment.floor != plan.floor {
                        return Err(Error::catalog_invariant(format!(
                            "apartment {} listed on section {section} floor {}",
                            apartment.id, plan.floor
                        )));
                    }
                    if !seen.insert(apartment.id) {
                        return Err(Error::catalog_invariant(format!(
                            "duplicate apartment id {}",
                            apartment.id
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// All floor plans in catalog order.
    #[must_use]
    pub fn floors(&self) -> &[FloorPlan] {
        &self.floors
    }

    /// Floor plans of one section in floor order.
    pub fn section_floors(&self, section: Section) -> impl Iterator<Item = &FloorPlan> {
        self.floors.iter().filter(move |f| f.section == section)
    }

    /// Every apartment in catalog order.
    pub fn apartments(&self) -> impl Iterator<Item = &Apartment> {
        self.floors.iter().flat_map(|f| f.apartments.iter())
    }

    /// Look up an apartment by id.
    #[must_use]
    pub fn find(&self, id: &ApartmentId) -> Option<&Apartment> {
        self.floors
            .iter()
            .find(|f| f.section == id.section && f.floor == id.floor)
            .and_then(|f| f.apartments.iter().find(|a| a.number == id.number))
    }

    /// Whether `id` names an apartment of this catalog.
    #[must_use]
    pub fn contains(&self, id: &ApartmentId) -> bool {
        self.find(id).is_some()
    }

    /// Capacity class of a section.
    #[must_use]
    pub fn kind_of(&self, section: Section) -> SectionKind {
        self.scheme.kind_of(section)
    }

    /// The section scheme the catalog was generated with.
    #[must_use]
    pub fn scheme(&self) -> SectionScheme {
        self.scheme
    }

    /// Price per m² used for every apartment.
    #[must_use]
    pub fn price_per_sqm(&self) -> u64 {
        self.price_per_sqm
    }

    /// Total number of apartments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.floors.iter().map(|f| f.apartments.len()).sum()
    }

    /// Whether the catalog has no apartments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// BLAKE3 digest over ids, layouts and prices.
    ///
    /// Changes whenever the section scheme or the price rate changes.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for apartment in self.apartments() {
            hasher.update(
                format!(
                    "{}|{}|{}\n",
                    apartment.id, apartment.type_key, apartment.price
                )
                .as_bytes(),
            );
        }
        hasher.finalize().to_hex().to_string()
    }
}
