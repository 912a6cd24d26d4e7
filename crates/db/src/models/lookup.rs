//! Brand, color and finish lookup models.
//!
//! The three lookup tables share one shape (`id`, unique `name`, timestamps),
//! so a single [`Lookup`] row type serves all of them and [`LookupKind`]
//! selects the table.

use lacquer_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Which lookup table an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupKind {
    Brand,
    Color,
    Finish,
}

impl LookupKind {
    /// Entity name used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Brand => "Brand",
            Self::Color => "Color",
            Self::Finish => "Finish",
        }
    }

    pub fn table(self) -> &'static str {
        match self {
            Self::Brand => "brands",
            Self::Color => "colors",
            Self::Finish => "finishes",
        }
    }

    /// `(table, foreign key column, polish id column)` of the rows that
    /// reference this lookup.
    pub fn reference_source(self) -> (&'static str, &'static str, &'static str) {
        match self {
            Self::Brand => ("polishes", "brand_id", "id"),
            Self::Color => ("polish_colors", "color_id", "polish_id"),
            Self::Finish => ("polish_finishes", "finish_id", "polish_id"),
        }
    }

    /// Junction table for many-to-many lookups; `None` for brands.
    pub fn junction(self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::Brand => None,
            Self::Color => Some(("polish_colors", "color_id")),
            Self::Finish => Some(("polish_finishes", "finish_id")),
        }
    }
}

/// A row from `brands`, `colors` or `finishes`.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Lookup {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A lookup enriched with the number of polishes referencing it.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct LookupWithUsage {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub lookup: Lookup,
    pub polish_count: i64,
}

/// DTO for creating (upserting) or renaming a lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct LookupName {
    pub name: String,
}
