//! Polish write DTOs and boundary validation.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::CoreError;
use crate::rating::Rating;

/// Earliest purchase year accepted.
pub const MIN_PURCHASE_YEAR: i32 = 1900;

/// Full polish record for create and replace-style updates.
///
/// Brand, colors and finishes are given by name and upserted on write.
#[derive(Debug, Clone, Deserialize)]
pub struct PolishInput {
    pub brand: String,
    pub name: String,
    pub colors: Vec<String>,
    pub finishes: Vec<String>,
    pub link: Option<String>,
    pub image_url: Option<String>,
    pub rating: Option<Rating>,
    pub coats: Option<i32>,
    pub notes: Option<String>,
    pub last_used: Option<NaiveDate>,
    pub total_bottles: Option<i32>,
    pub empty_bottles: Option<i32>,
    pub is_old: Option<bool>,
    pub purchase_year: Option<i32>,
}

/// Quick attribute update. Only non-`None` fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolishAttributes {
    pub rating: Option<Rating>,
    pub coats: Option<i32>,
    pub notes: Option<String>,
    pub last_used: Option<NaiveDate>,
    pub total_bottles: Option<i32>,
    pub empty_bottles: Option<i32>,
    pub is_old: Option<bool>,
    pub link: Option<String>,
    pub purchase_year: Option<i32>,
}

/// Trim names, drop blanks and duplicates, keep first-seen order.
pub fn normalize_names(names: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let name = name.trim();
        if !name.is_empty() && !out.iter().any(|n| n == name) {
            out.push(name.to_string());
        }
    }
    out
}

impl PolishInput {
    /// Validate and normalize the record in place.
    pub fn validate(&mut self) -> Result<(), CoreError> {
        self.brand = self.brand.trim().to_string();
        self.name = self.name.trim().to_string();
        self.colors = normalize_names(&self.colors);
        self.finishes = normalize_names(&self.finishes);

        if self.brand.is_empty() {
            return Err(CoreError::Validation("Brand is required".into()));
        }
        if self.name.is_empty() {
            return Err(CoreError::Validation("Polish name is required".into()));
        }
        if self.colors.is_empty() {
            return Err(CoreError::Validation(
                "At least one color is required".into(),
            ));
        }
        if self.finishes.is_empty() {
            return Err(CoreError::Validation(
                "At least one finish is required".into(),
            ));
        }
        validate_counts(
            self.coats,
            self.total_bottles,
            self.empty_bottles,
            self.purchase_year,
        )
    }
}

impl PolishAttributes {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_counts(
            self.coats,
            self.total_bottles,
            self.empty_bottles,
            self.purchase_year,
        )
    }

    pub fn is_empty(&self) -> bool {
        self.rating.is_none()
            && self.coats.is_none()
            && self.notes.is_none()
            && self.last_used.is_none()
            && self.total_bottles.is_none()
            && self.empty_bottles.is_none()
            && self.is_old.is_none()
            && self.link.is_none()
            && self.purchase_year.is_none()
    }
}

fn validate_counts(
    coats: Option<i32>,
    total_bottles: Option<i32>,
    empty_bottles: Option<i32>,
    purchase_year: Option<i32>,
) -> Result<(), CoreError> {
    for (label, value) in [
        ("coats", coats),
        ("total_bottles", total_bottles),
        ("empty_bottles", empty_bottles),
    ] {
        if matches!(value, Some(v) if v < 0) {
            return Err(CoreError::Validation(format!("{label} must not be negative")));
        }
    }
    if matches!(purchase_year, Some(y) if y < MIN_PURCHASE_YEAR) {
        return Err(CoreError::Validation(format!(
            "purchase_year must be {MIN_PURCHASE_YEAR} or later"
        )));
    }
    Ok(())
}
