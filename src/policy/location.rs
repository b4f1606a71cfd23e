//! Location validation against the served-location allow-list
//!
//! Only two canonical locations are served. Every location handed to a
//! retrieval tool must come out of this module; free-text place names
//! never reach a provider.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A canonical served location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    DaNang,
    HoiAn,
}

impl Location {
    /// Query string expected by the weather provider.
    pub fn provider_query(&self) -> &'static str {
        match self {
            Location::DaNang => "Da Nang",
            Location::HoiAn => "Hoi An, Quang Nam",
        }
    }

    /// Vietnamese display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Location::DaNang => "Đà Nẵng",
            Location::HoiAn => "Hội An",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Alias table mapping raw spellings to canonical locations.
///
/// Iteration order is the tie-break for ambiguous substrings; that order
/// is an accepted nondeterminism across table edits, not a contract.
pub const LOCATION_ALIASES: &[(&str, Location)] = &[
    ("đà nẵng", Location::DaNang),
    ("da nang", Location::DaNang),
    ("danang", Location::DaNang),
    ("hội an", Location::HoiAn),
    ("hoi an", Location::HoiAn),
    ("hoian", Location::HoiAn),
];

/// Normalize and validate a raw place name.
///
/// Lowercases and trims the input, then tries an exact alias match
/// followed by a substring match in either direction. Pure, no I/O.
pub fn validate(raw: &str) -> Option<Location> {
    let normalized = raw.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }

    for (alias, location) in LOCATION_ALIASES {
        if normalized == *alias {
            return Some(*location);
        }
    }

    for (alias, location) in LOCATION_ALIASES {
        if normalized.contains(alias) || alias.contains(normalized.as_str()) {
            return Some(*location);
        }
    }

    None
}

/// Find the first served location mentioned anywhere in an utterance.
pub fn find_in(utterance: &str) -> Option<Location> {
    let lowered = utterance.to_lowercase();
    LOCATION_ALIASES
        .iter()
        .find(|(alias, _)| lowered.contains(alias))
        .map(|(_, location)| *location)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_of_one_location_are_interchangeable() {
        for aliases in [
            &["đà nẵng", "da nang", "danang"][..],
            &["hội an", "hoi an", "hoian"][..],
        ] {
            let canonical = validate(aliases[0]).unwrap();
            for alias in aliases {
                assert_eq!(validate(alias), Some(canonical), "alias {alias}");
            }
        }
    }

    #[test]
    fn case_and_whitespace_are_normalized() {
        assert_eq!(validate("  Đà Nẵng  "), Some(Location::DaNang));
        assert_eq!(validate("HOI AN"), Some(Location::HoiAn));
    }

    #[test]
    fn substring_matches_in_either_direction() {
        // Raw text containing an alias
        assert_eq!(validate("thành phố đà nẵng"), Some(Location::DaNang));
        // Alias containing the raw text
        assert_eq!(validate("hội"), Some(Location::HoiAn));
    }

    #[test]
    fn unknown_locations_are_rejected() {
        assert_eq!(validate("hà nội"), None);
        assert_eq!(validate("tokyo"), None);
        assert_eq!(validate("nha trang"), None);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(validate(""), None);
        assert_eq!(validate("   "), None);
    }

    #[test]
    fn find_in_pulls_location_out_of_free_text() {
        assert_eq!(
            find_in("thời tiết Đà Nẵng hôm nay"),
            Some(Location::DaNang)
        );
        assert_eq!(find_in("khách sạn ở hoi an giá rẻ"), Some(Location::HoiAn));
        assert_eq!(find_in("dự báo thời tiết ngày mai"), None);
    }

    #[test]
    fn provider_queries_are_canonical() {
        assert_eq!(Location::DaNang.provider_query(), "Da Nang");
        assert_eq!(Location::HoiAn.provider_query(), "Hoi An, Quang Nam");
    }
}
