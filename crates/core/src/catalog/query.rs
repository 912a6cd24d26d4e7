//! Filter compilation.
//!
//! [`compile`] turns a [`FilterState`] into a storage-agnostic
//! [`QueryDescriptor`]: a predicate tree, a fully determined ordering and
//! pagination bounds. Storage adapters walk the tree to produce their native
//! query; the in-memory matcher in [`super::matcher`] evaluates it directly.

use super::filter::{CatalogSort, Facet, FilterState, ImagePresence, SortDirection, SortField};
use crate::image::NO_IMAGE_AVAILABLE;

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

/// Default page size for paginated (admin) listings.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size a caller may request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Page size for a listing: a positive bound, or everything on one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSize {
    Limited(i64),
    Unbounded,
}

impl PageSize {
    /// A bounded page size clamped to `1..=MAX_PAGE_SIZE`.
    pub fn limited(size: i64) -> Self {
        Self::Limited(size.clamp(1, MAX_PAGE_SIZE))
    }

    /// Resolve an optional user-supplied size, falling back to `default`.
    pub fn from_param(size: Option<i64>, default: PageSize) -> Self {
        match size {
            Some(size) => Self::limited(size),
            None => default,
        }
    }

    /// The row bound, clamped to `1..=MAX_PAGE_SIZE` however the variant was
    /// built. `None` when unbounded.
    pub fn limit(self) -> Option<i64> {
        match self {
            Self::Limited(size) => Some(size.clamp(1, MAX_PAGE_SIZE)),
            Self::Unbounded => None,
        }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::Limited(DEFAULT_PAGE_SIZE)
    }
}

/// Clamp a requested page number to the first page or later.
pub fn clamp_page(page: i64) -> i64 {
    page.max(1)
}

// ---------------------------------------------------------------------------
// Predicate tree
// ---------------------------------------------------------------------------

/// A queryable attribute of a polish (or of an entity related to it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    BrandName,
    ColorName,
    FinishName,
    Rating,
    PolishName,
    PurchaseYear,
    ImageUrl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Sensitive,
    Insensitive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Int(i32),
}

/// Boolean filter over polishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Matches every polish.
    All,
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
    /// The field equals any of `values`.
    FieldIn {
        field: Field,
        values: Vec<String>,
        case: Case,
    },
    /// Case-insensitive substring match.
    Contains { field: Field, text: String },
    Equals { field: Field, value: FieldValue },
    IsNull { field: Field },
}

impl Predicate {
    /// Conjunction that collapses to `All` when empty and to the sole clause
    /// when there is only one.
    pub fn and(mut clauses: Vec<Predicate>) -> Predicate {
        clauses.retain(|c| *c != Predicate::All);
        match clauses.len() {
            0 => Predicate::All,
            1 => clauses.remove(0),
            _ => Predicate::And(clauses),
        }
    }

    pub fn negate(self) -> Predicate {
        Predicate::Not(Box::new(self))
    }
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTerm {
    pub field: SortField,
    pub direction: SortDirection,
}

impl OrderTerm {
    const fn asc(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }
}

/// Expand a sort choice into a total ordering.
///
/// Brand ascending then name ascending is appended as a tie-break; when the
/// primary key already is brand or name, only the other one is appended.
pub fn order_terms(sort: CatalogSort) -> Vec<OrderTerm> {
    let primary = OrderTerm {
        field: sort.field,
        direction: sort.direction,
    };
    match sort.field {
        SortField::Brand => vec![primary, OrderTerm::asc(SortField::Name)],
        SortField::Name => vec![primary, OrderTerm::asc(SortField::Brand)],
        SortField::Rating | SortField::Updated => vec![
            primary,
            OrderTerm::asc(SortField::Brand),
            OrderTerm::asc(SortField::Name),
        ],
    }
}

// ---------------------------------------------------------------------------
// Compilation
// ---------------------------------------------------------------------------

/// A compiled catalog query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDescriptor {
    pub predicate: Predicate,
    pub order_by: Vec<OrderTerm>,
    /// Effective (clamped) 1-based page number.
    pub page: i64,
    pub offset: i64,
    /// `None` means every matching polish.
    pub limit: Option<i64>,
}

/// Build the predicate for a filter state, without ordering or pagination.
///
/// Facet values are not checked against existing lookups: an unknown name
/// simply matches nothing.
pub fn compile_predicate(filter: &FilterState) -> Predicate {
    let mut clauses = Vec::new();

    for facet in Facet::ALL {
        let values = filter.values(facet);
        if values.is_empty() {
            continue;
        }
        let (field, case) = match facet {
            Facet::Brand => (Field::BrandName, Case::Sensitive),
            Facet::Color => (Field::ColorName, Case::Insensitive),
            Facet::Finish => (Field::FinishName, Case::Insensitive),
        };
        clauses.push(Predicate::FieldIn {
            field,
            values: values.iter().cloned().collect(),
            case,
        });
    }

    if !filter.ratings().is_empty() {
        clauses.push(Predicate::FieldIn {
            field: Field::Rating,
            values: filter
                .ratings()
                .iter()
                .map(|r| r.storage_form().to_string())
                .collect(),
            case: Case::Sensitive,
        });
    }

    if !filter.search().is_empty() {
        let text = filter.search().to_string();
        clauses.push(Predicate::Or(vec![
            Predicate::Contains {
                field: Field::PolishName,
                text: text.clone(),
            },
            Predicate::Contains {
                field: Field::BrandName,
                text,
            },
        ]));
    }

    if let Some(year) = filter.purchase_year() {
        clauses.push(Predicate::Equals {
            field: Field::PurchaseYear,
            value: FieldValue::Int(year),
        });
    }

    match filter.image() {
        ImagePresence::Any => {}
        ImagePresence::With => {
            clauses.push(
                Predicate::IsNull {
                    field: Field::ImageUrl,
                }
                .negate(),
            );
            clauses.push(
                Predicate::Equals {
                    field: Field::ImageUrl,
                    value: FieldValue::Text(NO_IMAGE_AVAILABLE.to_string()),
                }
                .negate(),
            );
        }
        ImagePresence::Without => clauses.push(Predicate::IsNull {
            field: Field::ImageUrl,
        }),
    }

    Predicate::and(clauses)
}

/// Compile a filter state, page number (1-based) and page size into a query.
///
/// Page numbers below 1 are treated as page 1.
pub fn compile(filter: &FilterState, page: i64, page_size: PageSize) -> QueryDescriptor {
    let (page, offset, limit) = match page_size.limit() {
        Some(size) => {
            let page = clamp_page(page);
            (page, (page - 1).saturating_mul(size), Some(size))
        }
        None => (1, 0, None),
    };

    QueryDescriptor {
        predicate: compile_predicate(filter),
        order_by: order_terms(filter.sort()),
        page,
        offset,
        limit,
    }
}
