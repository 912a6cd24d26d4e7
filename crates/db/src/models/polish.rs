//! Polish row models.
//!
//! Write DTOs (`PolishInput`, `PolishAttributes`) live in
//! `lacquer_core::polish` because validation happens there.

use chrono::NaiveDate;
use lacquer_core::catalog::CatalogRow;
use lacquer_core::rating::Rating;
use lacquer_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// One polish joined with its brand and at most one color and one finish.
///
/// `rating` is the stored identifier (`A_PLUS`); conversion to [`Rating`]
/// happens in [`PolishJoinRow::into_catalog_row`].
#[derive(Debug, Clone, FromRow)]
pub struct PolishJoinRow {
    pub id: DbId,
    pub brand: String,
    pub name: String,
    pub color: Option<String>,
    pub finish: Option<String>,
    pub link: Option<String>,
    pub image_url: Option<String>,
    pub rating: Option<String>,
    pub coats: Option<i32>,
    pub notes: Option<String>,
    pub last_used: Option<NaiveDate>,
    pub total_bottles: Option<i32>,
    pub empty_bottles: Option<i32>,
    pub is_old: Option<bool>,
    pub purchase_year: Option<i32>,
    pub updated_at: Timestamp,
}

impl PolishJoinRow {
    pub fn into_catalog_row(self) -> CatalogRow {
        let rating = self.rating.as_deref().and_then(|stored| {
            let parsed = Rating::from_storage(stored);
            if parsed.is_none() {
                tracing::warn!(polish_id = self.id, rating = stored, "Unknown stored rating");
            }
            parsed
        });
        CatalogRow {
            id: self.id,
            brand: self.brand,
            name: self.name,
            color: self.color,
            finish: self.finish,
            link: self.link,
            image_url: self.image_url,
            rating,
            coats: self.coats,
            notes: self.notes,
            last_used: self.last_used,
            total_bottles: self.total_bottles,
            empty_bottles: self.empty_bottles,
            is_old: self.is_old,
            purchase_year: self.purchase_year,
            updated_at: self.updated_at,
        }
    }
}

/// Values the filter UI can offer for each facet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacetOptions {
    pub brands: Vec<String>,
    pub colors: Vec<String>,
    pub finishes: Vec<String>,
    /// The full rating scale, best first.
    pub ratings: Vec<Rating>,
    /// Distinct purchase years on record, newest first.
    pub purchase_years: Vec<i32>,
}
