//! Apartment layout table.
//!
//! Every apartment in the building uses one of eight layouts taken from the
//! architectural drawings. A layout key such as `2А-81` encodes the room count,
//! the layout letter and the nominal area; the exact areas live in this table.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Shape of a layout key: room count, Cyrillic layout letter, nominal area.
static TYPE_KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([12])\s*([АБВГДЕ])\s*-\s*(\d{2})\s*$").expect("Invalid regex pattern")
});

/// Apartment class by floor plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ApartmentClass {
    /// Class А.
    #[serde(rename = "А")]
    A,
    /// Class Б.
    #[serde(rename = "Б")]
    B,
    /// Class В.
    #[serde(rename = "В")]
    C,
    /// Class Г.
    #[serde(rename = "Г")]
    D,
}

impl ApartmentClass {
    /// The Cyrillic label shown on drawings.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::A => "А",
            Self::B => "Б",
            Self::C => "В",
            Self::D => "Г",
        }
    }
}

impl fmt::Display for ApartmentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Areas and room count of one layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApartmentType {
    /// Number of rooms.
    pub rooms: u8,
    /// Total area in m².
    pub area: f64,
    /// Living area in m².
    pub living_area: f64,
    /// Kitchen area in m².
    pub kitchen_area: f64,
}

/// Key of one of the eight known layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ApartmentTypeKey {
    /// `2А-81`
    TwoRoomA81,
    /// `2Б-74`
    TwoRoomB74,
    /// `2В-75`
    TwoRoomV75,
    /// `2Г-74`
    TwoRoomG74,
    /// `2Д-81`
    TwoRoomD81,
    /// `2Е-80`
    TwoRoomE80,
    /// `1А-45`
    OneRoomA45,
    /// `1Б-53`
    OneRoomB53,
}

impl ApartmentTypeKey {
    /// All layout keys in table order.
    pub const ALL: [Self; 8] = [
        Self::TwoRoomA81,
        Self::TwoRoomB74,
        Self::TwoRoomV75,
        Self::TwoRoomG74,
        Self::TwoRoomD81,
        Self::TwoRoomE80,
        Self::OneRoomA45,
        Self::OneRoomB53,
    ];

    /// The key as printed on the drawings.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TwoRoomA81 => "2А-81",
            Self::TwoRoomB74 => "2Б-74",
            Self::TwoRoomV75 => "2В-75",
            Self::TwoRoomG74 => "2Г-74",
            Self::TwoRoomD81 => "2Д-81",
            Self::TwoRoomE80 => "2Е-80",
            Self::OneRoomA45 => "1А-45",
            Self::OneRoomB53 => "1Б-53",
        }
    }

    /// Room count and areas for this layout.
    #[must_use]
    pub fn layout(self) -> ApartmentType {
        let (rooms, area, living_area, kitchen_area) = match self {
            Self::TwoRoomA81 => (2, 81.33, 43.31, 15.85),
            Self::TwoRoomB74 => (2, 74.45, 42.65, 14.72),
            Self::TwoRoomV75 => (2, 75.57, 43.89, 15.00),
            Self::TwoRoomG74 => (2, 74.60, 40.39, 14.81),
            Self::TwoRoomD81 => (2, 81.57, 44.12, 15.50),
            Self::TwoRoomE80 => (2, 80.52, 42.85, 15.20),
            Self::OneRoomA45 => (1, 45.93, 33.62, 14.81),
            Self::OneRoomB53 => (1, 53.71, 38.45, 15.32),
        };
        ApartmentType {
            rooms,
            area,
            living_area,
            kitchen_area,
        }
    }

    /// Apartment class of this layout.
    ///
    /// Layouts Д and Е have no class of their own on the drawings and are
    /// sold as class Г.
    #[must_use]
    pub fn class(self) -> ApartmentClass {
        match self {
            Self::TwoRoomA81 | Self::OneRoomA45 => ApartmentClass::A,
            Self::TwoRoomB74 | Self::OneRoomB53 => ApartmentClass::B,
            Self::TwoRoomV75 => ApartmentClass::C,
            Self::TwoRoomG74 | Self::TwoRoomD81 | Self::TwoRoomE80 => ApartmentClass::D,
        }
    }
}

impl fmt::Display for ApartmentTypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApartmentTypeKey {
    type Err = Error;

    /// Parse a layout key, tolerating stray whitespace around its parts.
    ///
    /// Well-formed keys that are not in the table are rejected as well, so a
    /// new layout on the drawings has to be added here before it can be used.
    fn from_str(s: &str) -> Result<Self> {
        let caps = TYPE_KEY_PATTERN
            .captures(s)
            .ok_or_else(|| Error::unknown_apartment_type(s))?;
        let canonical = format!("{}{}-{}", &caps[1], &caps[2], &caps[3]);

        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == canonical)
            .ok_or_else(|| Error::unknown_apartment_type(s))
    }
}

impl Serialize for ApartmentTypeKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ApartmentTypeKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_keys() {
        for key in ApartmentTypeKey::ALL {
            assert_eq!(key.as_str().parse::<ApartmentTypeKey>().unwrap(), key);
        }
    }

    #[test]
    fn test_parse_tolerates_whitespace() {
        let key: ApartmentTypeKey = " 2А - 81 ".parse().unwrap();
        assert_eq!(key, ApartmentTypeKey::TwoRoomA81);
    }

    #[test]
    fn test_parse_rejects_unknown_layout() {
        // well formed, but not on the drawings
        let err = "2А-99".parse::<ApartmentTypeKey>().unwrap_err();
        assert!(matches!(err, Error::UnknownApartmentType { .. }));
    }

    #[test]
    fn test_parse_rejects_latin_letters() {
        assert!("2A-81".parse::<ApartmentTypeKey>().is_err());
        assert!("".parse::<ApartmentTypeKey>().is_err());
        assert!("3А-81".parse::<ApartmentTypeKey>().is_err());
    }

    #[test]
    fn test_class_mapping() {
        assert_eq!(ApartmentTypeKey::TwoRoomA81.class(), ApartmentClass::A);
        assert_eq!(ApartmentTypeKey::OneRoomA45.class(), ApartmentClass::A);
        assert_eq!(ApartmentTypeKey::TwoRoomB74.class(), ApartmentClass::B);
        assert_eq!(ApartmentTypeKey::OneRoomB53.class(), ApartmentClass::B);
        assert_eq!(ApartmentTypeKey::TwoRoomV75.class(), ApartmentClass::C);
        assert_eq!(ApartmentTypeKey::TwoRoomG74.class(), ApartmentClass::D);
        assert_eq!(ApartmentTypeKey::TwoRoomD81.class(), ApartmentClass::D);
        assert_eq!(ApartmentTypeKey::TwoRoomE80.class(), ApartmentClass::D);
    }

    #[test]
    fn test_room_count_matches_key_prefix() {
        for key in ApartmentTypeKey::ALL {
            let prefix = key.as_str().chars().next().unwrap();
            assert_eq!(prefix.to_digit(10).unwrap(), u32::from(key.layout().rooms));
        }
    }

    #[test]
    fn test_areas_are_consistent() {
        for key in ApartmentTypeKey::ALL {
            let layout = key.layout();
            assert!(layout.living_area < layout.area, "{key}");
            assert!(layout.kitchen_area < layout.area, "{key}");
        }
    }

    #[test]
    fn test_serde_uses_drawing_key() {
        let json = serde_json::to_string(&ApartmentTypeKey::TwoRoomE80).unwrap();
        assert_eq!(json, "\"2Е-80\"");
        let back: ApartmentTypeKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ApartmentTypeKey::TwoRoomE80);
    }

    #[test]
    fn test_class_label() {
        assert_eq!(ApartmentClass::C.to_string(), "В");
        assert_eq!(serde_json::to_string(&ApartmentClass::D).unwrap(), "\"Г\"");
    }
}
