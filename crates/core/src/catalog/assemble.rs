//! Shaping joined storage rows into display records.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::query::PageSize;
use crate::rating::Rating;
use crate::types::{DbId, Timestamp};

/// One row of a polish joined with at most one color and one finish.
///
/// A polish with N colors and M finishes typically arrives as N x M rows;
/// pre-grouped storage layers may send fewer. Either shape assembles to the
/// same record.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRow {
    pub id: DbId,
    pub brand: String,
    pub name: String,
    pub color: Option<String>,
    pub finish: Option<String>,
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
    pub updated_at: Timestamp,
}

/// A polish as the catalog UI shows it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolishView {
    pub id: DbId,
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
    /// `None` when unknown.
    pub is_old: Option<bool>,
    pub purchase_year: Option<i32>,
    pub updated_at: Timestamp,
}

impl PolishView {
    fn from_row(row: &CatalogRow) -> Self {
        Self {
            id: row.id,
            brand: row.brand.clone(),
            name: row.name.clone(),
            colors: Vec::new(),
            finishes: Vec::new(),
            link: row.link.clone(),
            image_url: row.image_url.clone(),
            rating: row.rating,
            coats: row.coats,
            notes: row.notes.clone(),
            last_used: row.last_used,
            total_bottles: row.total_bottles,
            empty_bottles: row.empty_bottles,
            is_old: row.is_old,
            purchase_year: row.purchase_year,
            updated_at: row.updated_at,
        }
    }

    /// Expand back into join rows (colors x finishes). A polish without
    /// colors or finishes still yields one row.
    pub fn to_rows(&self) -> Vec<CatalogRow> {
        let colors: Vec<Option<&String>> = if self.colors.is_empty() {
            vec![None]
        } else {
            self.colors.iter().map(Some).collect()
        };
        let finishes: Vec<Option<&String>> = if self.finishes.is_empty() {
            vec![None]
        } else {
            self.finishes.iter().map(Some).collect()
        };

        let mut rows = Vec::with_capacity(colors.len() * finishes.len());
        for &color in &colors {
            for &finish in &finishes {
                rows.push(CatalogRow {
                    id: self.id,
                    brand: self.brand.clone(),
                    name: self.name.clone(),
                    color: color.cloned(),
                    finish: finish.cloned(),
                    link: self.link.clone(),
                    image_url: self.image_url.clone(),
                    rating: self.rating,
                    coats: self.coats,
                    notes: self.notes.clone(),
                    last_used: self.last_used,
                    total_bottles: self.total_bottles,
                    empty_bottles: self.empty_bottles,
                    is_old: self.is_old,
                    purchase_year: self.purchase_year,
                    updated_at: self.updated_at,
                });
            }
        }
        rows
    }
}

/// One page of catalog results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogPage {
    pub records: Vec<PolishView>,
    /// Distinct polishes matching the filter (not join rows).
    pub total: i64,
    pub total_pages: i64,
    pub page: i64,
    /// `None` for the unbounded catalog view.
    pub page_size: Option<i64>,
}

/// Number of pages needed for `total` items.
pub fn total_pages(total: i64, page_size: PageSize) -> i64 {
    match page_size.limit() {
        Some(size) => (total.max(0) + size - 1) / size,
        None => 1,
    }
}

/// Group join rows into one record per polish.
///
/// Polishes keep the order of their first row; colors and finishes keep
/// first-seen order with duplicates removed.
pub fn group_rows(rows: &[CatalogRow]) -> Vec<PolishView> {
    let mut records: Vec<PolishView> = Vec::new();
    let mut index: HashMap<DbId, usize> = HashMap::new();

    for row in rows {
        let slot = *index.entry(row.id).or_insert_with(|| {
            records.push(PolishView::from_row(row));
            records.len() - 1
        });
        let record = &mut records[slot];

        if let Some(color) = &row.color {
            if !record.colors.contains(color) {
                record.colors.push(color.clone());
            }
        }
        if let Some(finish) = &row.finish {
            if !record.finishes.contains(finish) {
                record.finishes.push(finish.clone());
            }
        }
    }

    records
}

/// Assemble a page of results from join rows and the distinct match count.
///
/// With an unbounded page size every result is on the single page 1.
pub fn assemble(rows: &[CatalogRow], total: i64, page: i64, page_size: PageSize) -> CatalogPage {
    let records = group_rows(rows);
    match page_size.limit() {
        Some(size) => CatalogPage {
            records,
            total,
            total_pages: total_pages(total, page_size),
            page: page.max(1),
            page_size: Some(size),
        },
        None => CatalogPage {
            records,
            total,
            total_pages: 1,
            page: 1,
            page_size: None,
        },
    }
}
