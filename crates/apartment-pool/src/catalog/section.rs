//! Building sections, their capacity classes and floor templates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::layout::ApartmentTypeKey;
use crate::error::{Error, Result};

/// Number of sections in the building.
pub const SECTION_COUNT: u8 = 12;

/// One of the twelve vertical sections of the building, `1..=12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Section(u8);

impl Section {
    /// Create a section, rejecting numbers outside `1..=12`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSection`] if `number` is out of range.
    pub fn new(number: u8) -> Result<Self> {
        if (1..=SECTION_COUNT).contains(&number) {
            Ok(Self(number))
        } else {
            Err(Error::InvalidSection {
                value: number.to_string(),
            })
        }
    }

    /// All sections in building order.
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=SECTION_COUNT).map(Self)
    }

    /// The section number.
    #[must_use]
    pub fn number(self) -> u8 {
        self.0
    }

    /// Floor plan drawings for this section.
    #[must_use]
    pub fn images(self) -> SectionImages {
        // Sections 4 and 5 share one double-core drawing.
        let (first, typical) = match self.0 {
            1 => (1, 2),
            2 => (3, 4),
            3 => (7, 8),
            4 | 5 => (5, 6),
            n => (2 * n - 3, 2 * n - 2),
        };
        SectionImages {
            first_floor: plan_image(first),
            typical_floor: plan_image(typical),
        }
    }
}

impl Default for Section {
    fn default() -> Self {
        Self(1)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Section {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(|n| Self::new(n).ok())
            .ok_or_else(|| Error::InvalidSection {
                value: s.to_string(),
            })
    }
}

impl Serialize for Section {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Section {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

fn plan_image(n: u8) -> String {
    format!("/schemaImages/Plan zdaniya-{n:02}.png")
}

/// Paths of the two floor plan drawings of a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionImages {
    /// Drawing of floor 1.
    pub first_floor: String,
    /// Drawing of floors 2-15.
    pub typical_floor: String,
}

/// Capacity class of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Five apartments per floor.
    Narrow,
    /// Six apartments per floor.
    Wide,
    /// Eight apartments per floor; the double section 4/5 with two lift cores.
    Block45,
}

const NARROW_FIRST: &[ApartmentTypeKey] = &[
    ApartmentTypeKey::TwoRoomA81,
    ApartmentTypeKey::TwoRoomG74,
    ApartmentTypeKey::TwoRoomV75,
    ApartmentTypeKey::OneRoomA45,
    ApartmentTypeKey::TwoRoomG74,
];

const NARROW_TYPICAL: &[ApartmentTypeKey] = &[
    ApartmentTypeKey::TwoRoomA81,
    ApartmentTypeKey::TwoRoomB74,
    ApartmentTypeKey::TwoRoomV75,
    ApartmentTypeKey::OneRoomA45,
    ApartmentTypeKey::TwoRoomG74,
];

const WIDE_FIRST: &[ApartmentTypeKey] = &[
    ApartmentTypeKey::TwoRoomD81,
    ApartmentTypeKey::OneRoomB53,
    ApartmentTypeKey::OneRoomB53,
    ApartmentTypeKey::TwoRoomE80,
    ApartmentTypeKey::TwoRoomG74,
    ApartmentTypeKey::OneRoomB53,
];

const WIDE_TYPICAL: &[ApartmentTypeKey] = &[
    ApartmentTypeKey::TwoRoomD81,
    ApartmentTypeKey::OneRoomB53,
    ApartmentTypeKey::OneRoomB53,
    ApartmentTypeKey::TwoRoomE80,
    ApartmentTypeKey::TwoRoomB74,
    ApartmentTypeKey::OneRoomB53,
];

const BLOCK45_FIRST: &[ApartmentTypeKey] = &[
    ApartmentTypeKey::TwoRoomD81,
    ApartmentTypeKey::OneRoomB53,
    ApartmentTypeKey::OneRoomB53,
    ApartmentTypeKey::TwoRoomE80,
    ApartmentTypeKey::TwoRoomG74,
    ApartmentTypeKey::OneRoomB53,
    ApartmentTypeKey::TwoRoomD81,
    ApartmentTypeKey::OneRoomB53,
];

const BLOCK45_TYPICAL: &[ApartmentTypeKey] = &[
    ApartmentTypeKey::TwoRoomD81,
    ApartmentTypeKey::OneRoomB53,
    ApartmentTypeKey::OneRoomB53,
    ApartmentTypeKey::TwoRoomE80,
    ApartmentTypeKey::TwoRoomB74,
    ApartmentTypeKey::OneRoomB53,
    ApartmentTypeKey::TwoRoomD81,
    ApartmentTypeKey::OneRoomB53,
];

impl SectionKind {
    /// Apartments on every floor of a section of this kind.
    #[must_use]
    pub fn units_per_floor(self) -> usize {
        match self {
            Self::Narrow => 5,
            Self::Wide => 6,
            Self::Block45 => 8,
        }
    }

    /// Layouts of one floor in unit-number order.
    ///
    /// Floor 1 has its own template; floors 2-15 share the typical one.
    #[must_use]
    pub fn template(self, floor: u8) -> &'static [ApartmentTypeKey] {
        let first = floor == 1;
        match (self, first) {
            (Self::Narrow, true) => NARROW_FIRST,
            (Self::Narrow, false) => NARROW_TYPICAL,
            (Self::Wide, true) => WIDE_FIRST,
            (Self::Wide, false) => WIDE_TYPICAL,
            (Self::Block45, true) => BLOCK45_FIRST,
            (Self::Block45, false) => BLOCK45_TYPICAL,
        }
    }

    /// Human-readable capacity label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Narrow => "Узкая (5 кв.)",
            Self::Wide => "Широкая (6 кв.)",
            Self::Block45 => "Блок 4/5 (8 кв.)",
        }
    }
}

/// Assignment of capacity classes to sections.
///
/// Two plans of the building exist. In the three-tier plan sections 4 and 5
/// form the eight-unit double block; in the two-tier plan they are ordinary
/// wide sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionScheme {
    /// Narrow, wide and the 4/5 double block.
    #[default]
    ThreeTier,
    /// Narrow and wide only.
    TwoTier,
}

impl SectionScheme {
    /// Capacity class of `section` under this scheme.
    #[must_use]
    pub fn kind_of(self, section: Section) -> SectionKind {
        match (self, section.number()) {
            (_, 1 | 6 | 9 | 10) => SectionKind::Narrow,
            (Self::ThreeTier, 4 | 5) => SectionKind::Block45,
            _ => SectionKind::Wide,
        }
    }

    /// The full section table in building order.
    #[must_use]
    pub fn table(self) -> Vec<(Section, SectionKind)> {
        Section::all().map(|s| (s, self.kind_of(s))).collect()
    }
}

impl fmt::Display for SectionScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ThreeTier => write!(f, "three_tier"),
            Self::TwoTier => write!(f, "two_tier"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(n: u8) -> Section {
        Section::new(n).unwrap()
    }

    #[test]
    fn test_section_range() {
        assert!(Section::new(0).is_err());
        assert!(Section::new(13).is_err());
        assert_eq!(Section::all().count(), 12);
    }

    #[test]
    fn test_section_parse() {
        assert_eq!("7".parse::<Section>().unwrap(), section(7));
        assert_eq!(" 12 ".parse::<Section>().unwrap(), section(12));
        assert!("abc".parse::<Section>().is_err());
        assert!("-1".parse::<Section>().is_err());
    }

    #[test]
    fn test_section_serde_as_string() {
        let json = serde_json::to_string(&section(10)).unwrap();
        assert_eq!(json, "\"10\"");
        assert!(serde_json::from_str::<Section>("\"13\"").is_err());
    }

    #[test]
    fn test_images_table() {
        let expected = [
            (1, 1, 2),
            (2, 3, 4),
            (3, 7, 8),
            (4, 5, 6),
            (5, 5, 6),
            (6, 9, 10),
            (7, 11, 12),
            (8, 13, 14),
            (9, 15, 16),
            (10, 17, 18),
            (11, 19, 20),
            (12, 21, 22),
        ];
        for (n, first, typical) in expected {
            let images = section(n).images();
            assert_eq!(images.first_floor, plan_image(first));
            assert_eq!(images.typical_floor, plan_image(typical));
        }
        assert_eq!(
            section(1).images().first_floor,
            "/schemaImages/Plan zdaniya-01.png"
        );
    }

    #[test]
    fn test_templates_match_capacity() {
        for kind in [SectionKind::Narrow, SectionKind::Wide, SectionKind::Block45] {
            for floor in [1, 2, 15] {
                assert_eq!(kind.template(floor).len(), kind.units_per_floor());
            }
        }
    }

    #[test]
    fn test_three_tier_scheme() {
        let scheme = SectionScheme::ThreeTier;
        assert_eq!(scheme.kind_of(section(1)), SectionKind::Narrow);
        assert_eq!(scheme.kind_of(section(2)), SectionKind::Wide);
        assert_eq!(scheme.kind_of(section(4)), SectionKind::Block45);
        assert_eq!(scheme.kind_of(section(5)), SectionKind::Block45);
        assert_eq!(scheme.kind_of(section(10)), SectionKind::Narrow);
        assert_eq!(scheme.kind_of(section(12)), SectionKind::Wide);
    }

    #[test]
    fn test_two_tier_scheme() {
        let scheme = SectionScheme::TwoTier;
        assert_eq!(scheme.kind_of(section(4)), SectionKind::Wide);
        assert_eq!(scheme.kind_of(section(5)), SectionKind::Wide);
        assert_eq!(scheme.kind_of(section(9)), SectionKind::Narrow);
    }

    #[test]
    fn test_scheme_serde() {
        let json = serde_json::to_string(&SectionScheme::TwoTier).unwrap();
        assert_eq!(json, "\"two_tier\"");
        assert_eq!(SectionScheme::default(), SectionScheme::ThreeTier);
    }
}
