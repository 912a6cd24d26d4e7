//! The catalog filter model.
//!
//! A [`FilterState`] is what the user currently wants to see. It is rebuilt
//! from the URL on every request and never persisted.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::rating::Rating;

/// A name-valued filter dimension backed by a lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    Brand,
    Color,
    Finish,
}

impl Facet {
    pub const ALL: [Facet; 3] = [Facet::Brand, Facet::Color, Facet::Finish];
}

/// Tri-state filter on the polish image reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImagePresence {
    /// No restriction.
    #[default]
    Any,
    /// Must have a real image (not null, not the no-image sentinel).
    With,
    /// Must never have been given an image (null only).
    Without,
}

impl ImagePresence {
    pub fn token(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::With => "with",
            Self::Without => "without",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "any" => Some(Self::Any),
            "with" => Some(Self::With),
            "without" => Some(Self::Without),
            _ => None,
        }
    }
}

/// Primary sort key for the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Brand,
    Name,
    Rating,
    Updated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// A sort key plus direction, written in URLs as `brand-asc`, `rating-desc`...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CatalogSort {
    pub field: SortField,
    pub direction: SortDirection,
}

const SORT_TOKENS: [(SortField, SortDirection, &str); 8] = [
    (SortField::Brand, SortDirection::Asc, "brand-asc"),
    (SortField::Brand, SortDirection::Desc, "brand-desc"),
    (SortField::Name, SortDirection::Asc, "name-asc"),
    (SortField::Name, SortDirection::Desc, "name-desc"),
    (SortField::Rating, SortDirection::Asc, "rating-asc"),
    (SortField::Rating, SortDirection::Desc, "rating-desc"),
    (SortField::Updated, SortDirection::Asc, "updated-asc"),
    (SortField::Updated, SortDirection::Desc, "updated-desc"),
];

impl CatalogSort {
    pub const fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn token(self) -> &'static str {
        SORT_TOKENS
            .iter()
            .find(|(field, direction, _)| *field == self.field && *direction == self.direction)
            .map(|(_, _, token)| *token)
            .unwrap_or("brand-asc")
    }

    pub fn from_token(token: &str) -> Option<Self> {
        SORT_TOKENS
            .iter()
            .find(|(_, _, t)| *t == token)
            .map(|(field, direction, _)| Self::new(*field, *direction))
    }
}

impl Default for CatalogSort {
    /// Brand ascending; name ascending is appended as a tie-break by the compiler.
    fn default() -> Self {
        Self::new(SortField::Brand, SortDirection::Asc)
    }
}

impl fmt::Display for CatalogSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl Serialize for CatalogSort {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.token())
    }
}

/// Active catalog filters.
///
/// Facet sets are ordered sets, so equality ignores the order values were
/// selected in. An empty set means the facet is unrestricted. Values are
/// trimmed on the way in and blank values are ignored; this keeps every
/// reachable state representable in a URL.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FilterState {
    brands: BTreeSet<String>,
    colors: BTreeSet<String>,
    finishes: BTreeSet<String>,
    ratings: BTreeSet<Rating>,
    search: String,
    sort: CatalogSort,
    purchase_year: Option<i32>,
    image: ImagePresence,
}

impl FilterState {
    /// Selected names for a facet.
    pub fn values(&self, facet: Facet) -> &BTreeSet<String> {
        match facet {
            Facet::Brand => &self.brands,
            Facet::Color => &self.colors,
            Facet::Finish => &self.finishes,
        }
    }

    fn values_mut(&mut self, facet: Facet) -> &mut BTreeSet<String> {
        match facet {
            Facet::Brand => &mut self.brands,
            Facet::Color => &mut self.colors,
            Facet::Finish => &mut self.finishes,
        }
    }

    pub fn brands(&self) -> &BTreeSet<String> {
        &self.brands
    }

    pub fn colors(&self) -> &BTreeSet<String> {
        &self.colors
    }

    pub fn finishes(&self) -> &BTreeSet<String> {
        &self.finishes
    }

    pub fn ratings(&self) -> &BTreeSet<Rating> {
        &self.ratings
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort(&self) -> CatalogSort {
        self.sort
    }

    pub fn purchase_year(&self) -> Option<i32> {
        self.purchase_year
    }

    pub fn image(&self) -> ImagePresence {
        self.image
    }

    /// Add `value` to the facet if absent, remove it if present.
    pub fn toggle(&mut self, facet: Facet, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        let set = self.values_mut(facet);
        if !set.remove(value) {
            set.insert(value.to_string());
        }
    }

    pub fn toggle_rating(&mut self, rating: Rating) {
        if !self.ratings.remove(&rating) {
            self.ratings.insert(rating);
        }
    }

    /// Ensure `value` is selected (idempotent).
    pub fn select(&mut self, facet: Facet, value: &str) {
        let value = value.trim();
        if !value.is_empty() {
            self.values_mut(facet).insert(value.to_string());
        }
    }

    pub fn select_rating(&mut self, rating: Rating) {
        self.ratings.insert(rating);
    }

    pub fn clear(&mut self, facet: Facet) {
        self.values_mut(facet).clear();
    }

    pub fn set_search(&mut self, text: &str) {
        self.search = text.trim().to_string();
    }

    pub fn set_sort(&mut self, sort: CatalogSort) {
        self.sort = sort;
    }

    pub fn set_purchase_year(&mut self, year: Option<i32>) {
        self.purchase_year = year;
    }

    pub fn set_image(&mut self, image: ImagePresence) {
        self.image = image;
    }

    // -- builder-style helpers ----------------------------------------------

    pub fn with(mut self, facet: Facet, value: &str) -> Self {
        self.select(facet, value);
        self
    }

    pub fn with_rating(mut self, rating: Rating) -> Self {
        self.select_rating(rating);
        self
    }

    pub fn with_search(mut self, text: &str) -> Self {
        self.set_search(text);
        self
    }

    pub fn with_sort(mut self, sort: CatalogSort) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_purchase_year(mut self, year: i32) -> Self {
        self.purchase_year = Some(year);
        self
    }

    pub fn with_image(mut self, image: ImagePresence) -> Self {
        self.image = image;
        self
    }

    /// True when no facet, search, year or image restriction is active.
    /// Sort order does not count as a restriction.
    pub fn is_unrestricted(&self) -> bool {
        self.brands.is_empty()
            && self.colors.is_empty()
            && self.finishes.is_empty()
            && self.ratings.is_empty()
            && self.search.is_empty()
            && self.purchase_year.is_none()
            && self.image == ImagePresence::Any
    }
}
