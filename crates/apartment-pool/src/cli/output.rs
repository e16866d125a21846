//! Text and JSON rendering for CLI output.
//!
//! Renderers build a `String` and leave printing to the caller.

use std::fmt::Write as _;

use serde::Serialize;

use crate::catalog::{Apartment, ApartmentId, Catalog};
use crate::error::Result;
use crate::query::{self, EffectiveStatus, FloorView, SectionSummary, Stats};
use crate::reservations::{Reservation, ReservationMap};
use crate::session::{ApartmentDetails, View};

use super::OutputFormat;

const GROUP_SEPARATOR: char = '\u{a0}';

/// Price in roubles with ru-RU digit grouping, e.g. `10 572 900 ₽`.
#[must_use]
pub fn format_price(price: u64) -> String {
    let digits = price.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(GROUP_SEPARATOR);
        }
        grouped.push(c);
    }
    grouped.push_str(" ₽");
    grouped
}

/// Area in square metres with two decimals.
#[must_use]
pub fn format_area(area: f64) -> String {
    format!("{area:.2} м²")
}

#[derive(Serialize)]
struct ApartmentRow<'a> {
    #[serde(flatten)]
    apartment: &'a Apartment,
    effective_status: EffectiveStatus,
}

#[derive(Serialize)]
struct FloorRows<'a> {
    floor: u8,
    section: String,
    apartments: Vec<ApartmentRow<'a>>,
}

fn rows<'a>(floor: &FloorView<'a>, reservations: &ReservationMap) -> Vec<ApartmentRow<'a>> {
    floor
        .apartments
        .iter()
        .map(|&a| ApartmentRow {
            apartment: a,
            effective_status: query::effective_status(a, reservations),
        })
        .collect()
}

fn stats_line(stats: &Stats) -> String {
    format!(
        "{} total, {} free, {} sold",
        stats.total, stats.free, stats.sold
    )
}

/// Render the floors of a view.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_floors(
    view: &View<'_>,
    reservations: &ReservationMap,
    format: OutputFormat,
) -> Result<String> {
    if format == OutputFormat::Json {
        let floors: Vec<FloorRows<'_>> = view
            .floors
            .iter()
            .map(|f| FloorRows {
                floor: f.floor,
                section: f.section.to_string(),
                apartments: rows(f, reservations),
            })
            .collect();
        let value = serde_json::json!({
            "section": view.section.to_string(),
            "floor": view.floor.to_string(),
            "floors": floors,
            "section_stats": view.section_stats,
            "building_stats": view.building_stats,
        });
        return Ok(serde_json::to_string_pretty(&value)?);
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Section {} (floor: {}): {}",
        view.section,
        view.floor,
        stats_line(&view.section_stats)
    );

    if view.floors.is_empty() {
        let _ = writeln!(out, "No apartments match.");
        return Ok(out);
    }

    for floor in &view.floors {
        let _ = writeln!(out);
        let _ = writeln!(out, "Floor {}", floor.floor);
        for row in rows(floor, reservations) {
            let a = row.apartment;
            let line = match format {
                OutputFormat::Table => format!(
                    "  {:<8} {:<6} {:>2}  {:>12} {:>12} {:>12}  {:>16}  {}",
                    a.id.to_string(),
                    a.type_key.as_str(),
                    a.rooms,
                    format_area(a.area),
                    format_area(a.living_area),
                    format_area(a.kitchen_area),
                    format_price(a.price),
                    row.effective_status
                ),
                _ => format!(
                    "  {} {} {}-room {} {} [{}]",
                    a.id,
                    a.type_key,
                    a.rooms,
                    format_area(a.area),
                    format_price(a.price),
                    row.effective_status
                ),
            };
            let _ = writeln!(out, "{line}");
        }
    }

    Ok(out)
}

/// Render one apartment.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_details(details: &ApartmentDetails<'_>, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(details)?);
    }

    let a = details.apartment;
    let mut out = String::new();
    let _ = writeln!(out, "Apartment {}", a.id);
    let _ = writeln!(out, "  Section:      {}", a.section);
    let _ = writeln!(out, "  Floor:        {}", a.floor);
    let _ = writeln!(out, "  Number:       {}", a.number);
    let _ = writeln!(out, "  Type:         {} (class {})", a.type_key, a.apartment_class);
    let _ = writeln!(out, "  Rooms:        {}", a.rooms);
    let _ = writeln!(out, "  Area:         {}", format_area(a.area));
    let _ = writeln!(out, "  Living area:  {}", format_area(a.living_area));
    let _ = writeln!(out, "  Kitchen area: {}", format_area(a.kitchen_area));
    let _ = writeln!(out, "  Price:        {}", format_price(a.price));
    let _ = writeln!(out, "  Status:       {}", details.status);
    if let Some(buyer) = details.buyer {
        let _ = writeln!(out, "  Reserved by:  {buyer}");
    }
    if let Some(at) = details.reserved_at {
        let _ = writeln!(out, "  Reserved at:  {}", at.format("%Y-%m-%d %H:%M UTC"));
    }
    Ok(out)
}

/// Render the section overview.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_sections(summaries: &[SectionSummary], json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(summaries)?);
    }

    let mut out = String::new();
    for s in summaries {
        let _ = writeln!(
            out,
            "Section {:>2}  {:<18} {}",
            s.section.number(),
            s.label,
            stats_line(&s.stats)
        );
    }
    Ok(out)
}

#[derive(Serialize)]
struct ReservationRow<'a> {
    id: ApartmentId,
    #[serde(flatten)]
    reservation: &'a Reservation,
    in_catalog: bool,
}

/// Render the reservation list.
///
/// Reservations for apartments missing from `catalog` are flagged.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_reservations(
    reservations: &ReservationMap,
    catalog: &Catalog,
    json: bool,
) -> Result<String> {
    let rows: Vec<ReservationRow<'_>> = reservations
        .iter()
        .map(|(id, reservation)| ReservationRow {
            id: *id,
            reservation,
            in_catalog: catalog.contains(id),
        })
        .collect();

    if json {
        return Ok(serde_json::to_string_pretty(&rows)?);
    }

    let mut out = String::new();
    if rows.is_empty() {
        let _ = writeln!(out, "No reservations.");
        return Ok(out);
    }
    for row in rows {
        let _ = write!(out, "{:<8} {}", row.id.to_string(), row.reservation.buyer_name);
        if let Some(at) = row.reservation.reserved_at {
            let _ = write!(out, "  ({})", at.format("%Y-%m-%d %H:%M UTC"));
        }
        if !row.in_catalog {
            let _ = write!(out, "  [not in catalog]");
        }
        let _ = writeln!(out);
    }
    Ok(out)
}

/// Render building and per-section counts.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_stats(building: &Stats, summaries: &[SectionSummary], json: bool) -> Result<String> {
    if json {
        let sections: Vec<_> = summaries
            .iter()
            .map(|s| serde_json::json!({ "section": s.section.to_string(), "stats": s.stats }))
            .collect();
        let value = serde_json::json!({ "building": building, "sections": sections });
        return Ok(serde_json::to_string_pretty(&value)?);
    }

    let mut out = String::new();
    let _ = writeln!(out, "Building: {}", stats_line(building));
    for s in summaries {
        let _ = writeln!(out, "  Section {:>2}: {}", s.section.number(), stats_line(&s.stats));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CatalogConfig;
    use crate::reservations::ReservationStore;
    use crate::session::{Action, Session};
    use crate::storage::MemoryBackend;

    fn session() -> Session<MemoryBackend> {
        let catalog = Catalog::generate(&CatalogConfig::default()).unwrap();
        Session::new(
            catalog,
            ReservationStore::new(MemoryBackend::new(), "apartmentPurchases"),
        )
    }

    #[test]
    fn test_format_price_groups_digits() {
        assert_eq!(format_price(10_572_900), "10\u{a0}572\u{a0}900 ₽");
        assert_eq!(format_price(999), "999 ₽");
        assert_eq!(format_price(1000), "1\u{a0}000 ₽");
        assert_eq!(format_price(0), "0 ₽");
    }

    #[test]
    fn test_format_area() {
        assert_eq!(format_area(81.33), "81.33 м²");
        assert_eq!(format_area(15.0), "15.00 м²");
    }

    #[test]
    fn test_render_floors_plain() {
        let mut session = session();
        session
            .reserve("1-1-1".parse().unwrap(), "Alice")
            .unwrap();
        session.dispatch(Action::SelectFloor(crate::query::FloorSelection::Floor(1)));

        let out = render_floors(
            &session.view(),
            session.store().reservations(),
            OutputFormat::Plain,
        )
        .unwrap();
        assert!(out.contains("Floor 1"));
        assert!(out.contains("1-1-1 2А-81"));
        assert!(out.contains("[mine]"));
        assert!(out.contains("1-1-5 2Г-74"));
    }

    #[test]
    fn test_render_floors_json() {
        let session = session();
        let out = render_floors(
            &session.view(),
            session.store().reservations(),
            OutputFormat::Json,
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["floors"].as_array().unwrap().len(), 15);
        let first = &value["floors"][0]["apartments"][0];
        assert_eq!(first["id"], "1-1-1");
        assert_eq!(first["effective_status"], "free");
        assert_eq!(first["price"], 10_572_900);
    }

    #[test]
    fn test_render_floors_empty() {
        let session = session();
        let view = session.view();
        let empty = View {
            floors: Vec::new(),
            ..view
        };
        let out = render_floors(&empty, &ReservationMap::new(), OutputFormat::Table).unwrap();
        assert!(out.contains("No apartments match."));
    }

    #[test]
    fn test_render_details() {
        let mut session = session();
        let id = "3-2-4".parse().unwrap();
        session.reserve(id, "Борис").unwrap();

        let out = render_details(&session.details(&id).unwrap(), false).unwrap();
        assert!(out.contains("Apartment 3-2-4"));
        assert!(out.contains("Reserved by:  Борис"));
        assert!(out.contains("mine"));

        let json = render_details(&session.details(&id).unwrap(), true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["status"], "mine");
        assert_eq!(value["buyer"], "Борис");
    }

    #[test]
    fn test_render_reservations_flags_orphans() {
        let session = session();
        let mut reservations = ReservationMap::new();
        reservations.insert("1-1-1".parse().unwrap(), Reservation::now("Alice"));
        reservations.insert("1-1-9".parse().unwrap(), Reservation::now("Bob"));

        let out = render_reservations(&reservations, session.catalog(), false).unwrap();
        assert!(out.contains("1-1-1    Alice"));
        assert!(out.contains("[not in catalog]"));

        let empty = render_reservations(&ReservationMap::new(), session.catalog(), false).unwrap();
        assert!(empty.contains("No reservations."));
    }

    #[test]
    fn test_render_stats() {
        let session = session();
        let reservations = session.store().reservations();
        let summaries = query::section_summaries(session.catalog(), reservations);
        let building = query::building_stats(session.catalog(), reservations);

        let out = render_stats(&building, &summaries, false).unwrap();
        assert!(out.starts_with("Building: 1080 total, 1080 free, 0 sold"));

        let json = render_stats(&building, &summaries, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["sections"].as_array().unwrap().len(), 12);
    }

    #[test]
    fn test_render_sections() {
        let session = session();
        let summaries = query::section_summaries(session.catalog(), &ReservationMap::new());
        let out = render_sections(&summaries, false).unwrap();
        assert_eq!(out.lines().count(), 12);
        assert!(out.contains("Блок 4/5 (8 кв.)"));
    }
}
