//! The 13-tier polish rating scale.
//!
//! Ratings are shown to users as letter grades (`A+`, `B-`, `F`) and stored
//! as identifiers (`A_PLUS`, `B_MINUS`, `F`). Both forms come from one lookup
//! table so the scale cannot drift; `F` has no `+`/`-` variants because the
//! table never lists them.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A rating tier, best (`A+`) to worst (`F`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rating {
    APlus,
    A,
    AMinus,
    BPlus,
    B,
    BMinus,
    CPlus,
    C,
    CMinus,
    DPlus,
    D,
    DMinus,
    F,
}

/// `(tier, display form, storage form)`, best first.
const SCALE: [(Rating, &str, &str); 13] = [
    (Rating::APlus, "A+", "A_PLUS"),
    (Rating::A, "A", "A"),
    (Rating::AMinus, "A-", "A_MINUS"),
    (Rating::BPlus, "B+", "B_PLUS"),
    (Rating::B, "B", "B"),
    (Rating::BMinus, "B-", "B_MINUS"),
    (Rating::CPlus, "C+", "C_PLUS"),
    (Rating::C, "C", "C"),
    (Rating::CMinus, "C-", "C_MINUS"),
    (Rating::DPlus, "D+", "D_PLUS"),
    (Rating::D, "D", "D"),
    (Rating::DMinus, "D-", "D_MINUS"),
    (Rating::F, "F", "F"),
];

impl Rating {
    /// Every tier, best first.
    pub const ALL: [Rating; 13] = [
        Rating::APlus,
        Rating::A,
        Rating::AMinus,
        Rating::BPlus,
        Rating::B,
        Rating::BMinus,
        Rating::CPlus,
        Rating::C,
        Rating::CMinus,
        Rating::DPlus,
        Rating::D,
        Rating::DMinus,
        Rating::F,
    ];

    fn entry(self) -> &'static (Rating, &'static str, &'static str) {
        // SCALE is indexed in declaration order.
        &SCALE[self as usize]
    }

    /// Letter-grade form shown in the UI and used in URLs.
    pub fn display_form(self) -> &'static str {
        self.entry().1
    }

    /// Identifier stored in the `polishes.rating` column.
    pub fn storage_form(self) -> &'static str {
        self.entry().2
    }

    /// Ordinal where a higher value is a better rating (`F` = 0, `A+` = 12).
    pub fn rank(self) -> i32 {
        (SCALE.len() - 1 - self as usize) as i32
    }

    /// Parse a letter grade, ignoring case and surrounding whitespace.
    pub fn from_display(value: &str) -> Option<Self> {
        let value = value.trim();
        SCALE
            .iter()
            .find(|(_, display, _)| display.eq_ignore_ascii_case(value))
            .map(|(rating, _, _)| *rating)
    }

    /// Parse a stored identifier. Storage values are written by this crate,
    /// so the match is exact.
    pub fn from_storage(value: &str) -> Option<Self> {
        SCALE
            .iter()
            .find(|(_, _, storage)| *storage == value)
            .map(|(rating, _, _)| *rating)
    }

    /// Accept either form; used for request bodies.
    pub fn parse(value: &str) -> Option<Self> {
        Self::from_display(value).or_else(|| Self::from_storage(value.trim()))
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_form())
    }
}

impl Serialize for Rating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.display_form())
    }
}

impl<'de> Deserialize<'de> for Rating {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Rating::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown rating '{raw}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_has_thirteen_tiers_in_declaration_order() {
        assert_eq!(Rating::ALL.len(), 13);
        for (i, rating) in Rating::ALL.iter().enumerate() {
            assert_eq!(SCALE[i].0, *rating);
        }
    }

    #[test]
    fn display_to_storage() {
        assert_eq!(Rating::from_display("A+").unwrap().storage_form(), "A_PLUS");
        assert_eq!(Rating::from_display("b-").unwrap().storage_form(), "B_MINUS");
        assert_eq!(Rating::from_display(" c ").unwrap().storage_form(), "C");
    }

    #[test]
    fn f_has_no_modifiers() {
        assert_eq!(Rating::from_display("F"), Some(Rating::F));
        assert_eq!(Rating::from_display("F+"), None);
        assert_eq!(Rating::from_display("F-"), None);
        assert_eq!(Rating::from_storage("F_PLUS"), None);
    }

    #[test]
    fn storage_round_trip() {
        for rating in Rating::ALL {
            assert_eq!(Rating::from_storage(rating.storage_form()), Some(rating));
            assert_eq!(Rating::from_display(rating.display_form()), Some(rating));
        }
    }

    #[test]
    fn rank_orders_best_highest() {
        assert_eq!(Rating::APlus.rank(), 12);
        assert_eq!(Rating::F.rank(), 0);
        assert!(Rating::BPlus.rank() > Rating::B.rank());
    }

    #[test]
    fn parse_accepts_either_form() {
        assert_eq!(Rating::parse("A_MINUS"), Some(Rating::AMinus));
        assert_eq!(Rating::parse("a-"), Some(Rating::AMinus));
        assert_eq!(Rating::parse("Z"), None);
    }

    #[test]
    fn serde_uses_display_form() {
        let json = serde_json::to_string(&Rating::DPlus).unwrap();
        assert_eq!(json, "\"D+\"");
        let back: Rating = serde_json::from_str("\"d+\"").unwrap();
        assert_eq!(back, Rating::DPlus);
        assert!(serde_json::from_str::<Rating>("\"G\"").is_err());
    }
}
