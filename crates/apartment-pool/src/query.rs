//! Filtering and aggregation over the catalog.
//!
//! Everything here is a pure function of the catalog, the selection and the
//! reservation map. Output preserves catalog order.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::catalog::{
    Apartment, ApartmentId, ApartmentStatus, Catalog, FloorPlan, Section, SectionImages,
    SectionKind,
};
use crate::error::{Error, Result};
use crate::reservations::ReservationMap;

/// Floor selector: every floor or a single one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FloorSelection {
    /// No floor filtering.
    #[default]
    All,
    /// Only this floor.
    Floor(u8),
}

impl FloorSelection {
    fn admits(self, floor: u8) -> bool {
        match self {
            Self::All => true,
            Self::Floor(selected) => selected == floor,
        }
    }
}

impl fmt::Display for FloorSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Floor(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for FloorSelection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse::<u8>()
            .ok()
            .filter(|&n| n > 0)
            .map(Self::Floor)
            .ok_or_else(|| Error::InvalidFloor {
                value: s.to_string(),
            })
    }
}

/// Status filter over effective status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatusFilter {
    /// Everything.
    #[default]
    All,
    /// Neither sold nor reserved.
    Free,
    /// Sold or reserved.
    Sold,
}

/// Displayed availability of an apartment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectiveStatus {
    /// Available.
    Free,
    /// Sold by the developer.
    Sold,
    /// Reserved locally.
    Mine,
}

impl fmt::Display for EffectiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Sold => write!(f, "sold"),
            Self::Mine => write!(f, "mine"),
        }
    }
}

/// Effective status: `Mine` if reserved, else the baseline status.
#[must_use]
pub fn effective_status(apartment: &Apartment, reservations: &ReservationMap) -> EffectiveStatus {
    if reservations.contains_key(&apartment.id) {
        return EffectiveStatus::Mine;
    }
    match apartment.status {
        ApartmentStatus::Free => EffectiveStatus::Free,
        ApartmentStatus::Sold => EffectiveStatus::Sold,
    }
}

/// Sold for counting and filtering: baseline sold or reserved.
#[must_use]
pub fn is_effectively_sold(apartment: &Apartment, reservations: &ReservationMap) -> bool {
    apartment.status == ApartmentStatus::Sold || reservations.contains_key(&apartment.id)
}

/// Whether `apartment` passes `filter`.
#[must_use]
pub fn matches_status(apartment: &Apartment, filter: StatusFilter, reservations: &ReservationMap) -> bool {
    match filter {
        StatusFilter::All => true,
        StatusFilter::Free => !is_effectively_sold(apartment, reservations),
        StatusFilter::Sold => is_effectively_sold(apartment, reservations),
    }
}

/// Apartment counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Stats {
    /// All apartments.
    pub total: usize,
    /// Neither sold nor reserved.
    pub free: usize,
    /// Sold or reserved.
    pub sold: usize,
}

impl Stats {
    /// Count `apartments` against `reservations`.
    pub fn tally<'a>(
        apartments: impl IntoIterator<Item = &'a Apartment>,
        reservations: &ReservationMap,
    ) -> Self {
        apartments.into_iter().fold(Self::default(), |mut stats, a| {
            stats.total += 1;
            if is_effectively_sold(a, reservations) {
                stats.sold += 1;
            } else {
                stats.free += 1;
            }
            stats
        })
    }
}

/// A selection to filter the catalog by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Query {
    /// Section to show.
    pub section: Section,
    /// Floor to show.
    pub floor: FloorSelection,
    /// Status to show.
    pub status: StatusFilter,
}

/// One floor of a filtered view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloorView<'a> {
    /// Floor number.
    pub floor: u8,
    /// Section of the floor.
    pub section: Section,
    /// Matching apartments in unit order.
    pub apartments: Vec<&'a Apartment>,
}

impl<'a> FloorView<'a> {
    fn of(plan: &'a FloorPlan, filter: StatusFilter, reservations: &ReservationMap) -> Self {
        Self {
            floor: plan.floor,
            section: plan.section,
            apartments: plan
                .apartments
                .iter()
                .filter(|a| matches_status(a, filter, reservations))
                .collect(),
        }
    }
}

/// Floors of the selected section that have at least one matching apartment.
#[must_use]
pub fn filter_floors<'a>(
    catalog: &'a Catalog,
    query: &Query,
    reservations: &ReservationMap,
) -> Vec<FloorView<'a>> {
    catalog
        .section_floors(query.section)
        .filter(|plan| query.floor.admits(plan.floor))
        .map(|plan| FloorView::of(plan, query.status, reservations))
        .filter(|view| !view.apartments.is_empty())
        .collect()
}

/// Counts for one section.
#[must_use]
pub fn section_stats(catalog: &Catalog, section: Section, reservations: &ReservationMap) -> Stats {
    Stats::tally(
        catalog
            .section_floors(section)
            .flat_map(|f| f.apartments.iter()),
        reservations,
    )
}

/// Counts for the whole building.
#[must_use]
pub fn building_stats(catalog: &Catalog, reservations: &ReservationMap) -> Stats {
    Stats::tally(catalog.apartments(), reservations)
}

/// Look up one apartment by id.
#[must_use]
pub fn find_apartment<'a>(catalog: &'a Catalog, id: &ApartmentId) -> Option<&'a Apartment> {
    catalog.find(id)
}

/// Floor numbers of a section, ascending.
#[must_use]
pub fn floor_options(catalog: &Catalog, section: Section) -> Vec<u8> {
    let mut floors: Vec<u8> = catalog.section_floors(section).map(|f| f.floor).collect();
    floors.sort_unstable();
    floors
}

/// Overview line for one section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionSummary {
    /// The section.
    pub section: Section,
    /// Capacity class.
    pub kind: SectionKind,
    /// Capacity label.
    pub label: &'static str,
    /// Apartments per floor.
    pub units_per_floor: usize,
    /// Counts for the section.
    pub stats: Stats,
    /// Floor plan drawings.
    pub images: SectionImages,
}

/// One summary per section in building order.
#[must_use]
pub fn section_summaries(catalog: &Catalog, reservations: &ReservationMap) -> Vec<SectionSummary> {
    Section::all()
        .map(|section| {
            let kind = catalog.kind_of(section);
            SectionSummary {
                section,
                kind,
                label: kind.label(),
                units_per_floor: kind.units_per_floor(),
                stats: section_stats(catalog, section, reservations),
                images: section.images(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CatalogConfig;
    use crate::reservations::Reservation;

    fn catalog() -> Catalog {
        Catalog::generate(&CatalogConfig::default()).unwrap()
    }

    fn section(n: u8) -> Section {
        Section::new(n).unwrap()
    }

    fn reserved(ids: &[&str]) -> ReservationMap {
        ids.iter()
            .map(|s| (s.parse::<ApartmentId>().unwrap(), Reservation::now("Alice")))
            .collect()
    }

    fn count(views: &[FloorView<'_>]) -> usize {
        views.iter().map(|v| v.apartments.len()).sum()
    }

    #[test]
    fn test_all_status_keeps_every_apartment() {
        let catalog = catalog();
        let reservations = reserved(&["1-1-1", "1-2-3"]);

        for s in Section::all() {
            let query = Query {
                section: s,
                ..Query::default()
            };
            let views = filter_floors(&catalog, &query, &reservations);
            assert_eq!(views.len(), 15);
            assert_eq!(count(&views), section_stats(&catalog, s, &reservations).total);

            for floor in 1..=15 {
                let query = Query {
                    section: s,
                    floor: FloorSelection::Floor(floor),
                    status: StatusFilter::All,
                };
                let views = filter_floors(&catalog, &query, &reservations);
                let expected = catalog.kind_of(s).units_per_floor();
                assert_eq!(count(&views), expected);
            }
        }
    }

    #[test]
    fn test_free_and_sold_partition_section() {
        let catalog = catalog();
        let reservations = reserved(&["2-1-1", "2-7-6", "2-15-3", "3-1-1"]);

        let query = |status| Query {
            section: section(2),
            floor: FloorSelection::All,
            status,
        };
        let all = filter_floors(&catalog, &query(StatusFilter::All), &reservations);
        let free = filter_floors(&catalog, &query(StatusFilter::Free), &reservations);
        let sold = filter_floors(&catalog, &query(StatusFilter::Sold), &reservations);

        assert_eq!(count(&sold), 3);
        assert_eq!(count(&free) + count(&sold), count(&all));

        let free_ids: Vec<ApartmentId> = free
            .iter()
            .flat_map(|v| v.apartments.iter().map(|a| a.id))
            .collect();
        let sold_ids: Vec<ApartmentId> = sold
            .iter()
            .flat_map(|v| v.apartments.iter().map(|a| a.id))
            .collect();
        assert!(free_ids.iter().all(|id| !sold_ids.contains(id)));
    }

    #[test]
    fn test_empty_floors_are_dropped() {
        let catalog = catalog();
        let reservations = reserved(&["1-4-2", "1-9-5"]);
        let query = Query {
            section: section(1),
            floor: FloorSelection::All,
            status: StatusFilter::Sold,
        };

        let views = filter_floors(&catalog, &query, &reservations);
        let floors: Vec<u8> = views.iter().map(|v| v.floor).collect();
        assert_eq!(floors, [4, 9]);
    }

    #[test]
    fn test_no_match_yields_no_floors() {
        let catalog = catalog();
        let query = Query {
            section: section(6),
            floor: FloorSelection::Floor(3),
            status: StatusFilter::Sold,
        };
        assert!(filter_floors(&catalog, &query, &ReservationMap::new()).is_empty());
    }

    #[test]
    fn test_floor_outside_range_yields_no_floors() {
        let catalog = catalog();
        let query = Query {
            section: section(6),
            floor: FloorSelection::Floor(16),
            status: StatusFilter::All,
        };
        assert!(filter_floors(&catalog, &query, &ReservationMap::new()).is_empty());
    }

    #[test]
    fn test_filtering_is_repeatable() {
        let catalog = catalog();
        let reservations = reserved(&["5-5-5"]);
        let query = Query {
            section: section(5),
            floor: FloorSelection::Floor(5),
            status: StatusFilter::Free,
        };
        assert_eq!(
            filter_floors(&catalog, &query, &reservations),
            filter_floors(&catalog, &query, &reservations)
        );
    }

    #[test]
    fn test_effective_status() {
        let catalog = catalog();
        let reservations = reserved(&["1-1-1"]);
        let mine = catalog.find(&"1-1-1".parse().unwrap()).unwrap();
        let free = catalog.find(&"1-1-2".parse().unwrap()).unwrap();

        assert_eq!(effective_status(mine, &reservations), EffectiveStatus::Mine);
        assert_eq!(effective_status(free, &reservations), EffectiveStatus::Free);

        let mut sold = free.clone();
        sold.status = ApartmentStatus::Sold;
        assert_eq!(effective_status(&sold, &reservations), EffectiveStatus::Sold);
        assert!(is_effectively_sold(&sold, &reservations));
        assert!(!matches_status(&sold, StatusFilter::Free, &reservations));
    }

    #[test]
    fn test_section_and_building_stats() {
        let catalog = catalog();
        let reservations = reserved(&["1-1-1", "1-1-2", "4-1-8"]);

        let s1 = section_stats(&catalog, section(1), &reservations);
        assert_eq!(s1, Stats { total: 75, free: 73, sold: 2 });

        let s4 = section_stats(&catalog, section(4), &reservations);
        assert_eq!(s4, Stats { total: 120, free: 119, sold: 1 });

        let building = building_stats(&catalog, &reservations);
        assert_eq!(building, Stats { total: 1080, free: 1077, sold: 3 });
    }

    #[test]
    fn test_reservations_outside_catalog_are_not_counted() {
        let catalog = catalog();
        let reservations = reserved(&["1-1-7"]);
        assert_eq!(building_stats(&catalog, &reservations).sold, 0);
    }

    #[test]
    fn test_find_apartment() {
        let catalog = catalog();
        let found = find_apartment(&catalog, &"2-1-2".parse().unwrap()).unwrap();
        assert_eq!(found.type_key.as_str(), "1Б-53");
        assert!(find_apartment(&catalog, &"1-16-1".parse().unwrap()).is_none());
    }

    #[test]
    fn test_floor_options() {
        let catalog = catalog();
        assert_eq!(floor_options(&catalog, section(3)), (1..=15).collect::<Vec<u8>>());
    }

    #[test]
    fn test_section_summaries() {
        let catalog = catalog();
        let summaries = section_summaries(&catalog, &ReservationMap::new());

        assert_eq!(summaries.len(), 12);
        assert_eq!(summaries[0].units_per_floor, 5);
        assert_eq!(summaries[3].kind, SectionKind::Block45);
        assert_eq!(summaries[3].stats.total, 120);
        assert_eq!(summaries[1].label, "Широкая (6 кв.)");
    }

    #[test]
    fn test_floor_selection_parse() {
        assert_eq!("all".parse::<FloorSelection>().unwrap(), FloorSelection::All);
        assert_eq!("ALL".parse::<FloorSelection>().unwrap(), FloorSelection::All);
        assert_eq!(
            "7".parse::<FloorSelection>().unwrap(),
            FloorSelection::Floor(7)
        );
        assert!("0".parse::<FloorSelection>().is_err());
        assert!("top".parse::<FloorSelection>().is_err());
    }
}
