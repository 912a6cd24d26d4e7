//! In-memory evaluation of compiled queries.
//!
//! Mirrors what the SQL adapter does so that stores without a query engine
//! (the in-memory store, tests) produce the same results: NULL never matches
//! a comparison, relations match when any related name matches, and missing
//! ratings sort last in both directions.

use std::cmp::Ordering;

use super::assemble::PolishView;
use super::filter::{SortDirection, SortField};
use super::query::{Case, Field, FieldValue, OrderTerm, Predicate};

/// Values of `field` on `record`. Empty when the field is NULL (or, for
/// relations, when nothing is related).
fn field_values(record: &PolishView, field: Field) -> Vec<String> {
    match field {
        Field::BrandName => vec![record.brand.clone()],
        Field::PolishName => vec![record.name.clone()],
        Field::ColorName => record.colors.clone(),
        Field::FinishName => record.finishes.clone(),
        Field::Rating => record
            .rating
            .map(|r| r.storage_form().to_string())
            .into_iter()
            .collect(),
        Field::PurchaseYear => record
            .purchase_year
            .map(|y| y.to_string())
            .into_iter()
            .collect(),
        Field::ImageUrl => record.image_url.clone().into_iter().collect(),
    }
}

fn text_eq(a: &str, b: &str, case: Case) -> bool {
    match case {
        Case::Sensitive => a == b,
        Case::Insensitive => a.to_lowercase() == b.to_lowercase(),
    }
}

/// Whether `record` satisfies `predicate`.
pub fn matches(predicate: &Predicate, record: &PolishView) -> bool {
    match predicate {
        Predicate::All => true,
        Predicate::And(clauses) => clauses.iter().all(|c| matches(c, record)),
        Predicate::Or(clauses) => clauses.iter().any(|c| matches(c, record)),
        Predicate::Not(inner) => !matches(inner, record),
        Predicate::FieldIn {
            field,
            values,
            case,
        } => field_values(record, *field)
            .iter()
            .any(|have| values.iter().any(|want| text_eq(have, want, *case))),
        Predicate::Contains { field, text } => {
            let needle = text.to_lowercase();
            field_values(record, *field)
                .iter()
                .any(|have| have.to_lowercase().contains(&needle))
        }
        Predicate::Equals { field, value } => match (field, value) {
            (Field::PurchaseYear, FieldValue::Int(year)) => record.purchase_year == Some(*year),
            (_, FieldValue::Int(n)) => field_values(record, *field)
                .iter()
                .any(|have| *have == n.to_string()),
            (_, FieldValue::Text(text)) => field_values(record, *field)
                .iter()
                .any(|have| have == text),
        },
        Predicate::IsNull { field } => field_values(record, *field).is_empty(),
    }
}

fn compare_term(term: &OrderTerm, a: &PolishView, b: &PolishView) -> Ordering {
    let directed = |ord: Ordering| match term.direction {
        SortDirection::Asc => ord,
        SortDirection::Desc => ord.reverse(),
    };
    match term.field {
        SortField::Brand => directed(a.brand.cmp(&b.brand)),
        SortField::Name => directed(a.name.cmp(&b.name)),
        SortField::Updated => directed(a.updated_at.cmp(&b.updated_at)),
        SortField::Rating => match (a.rating, b.rating) {
            (Some(x), Some(y)) => directed(x.rank().cmp(&y.rank())),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    }
}

/// Compare two records under a list of order terms.
pub fn compare(order_by: &[OrderTerm], a: &PolishView, b: &PolishView) -> Ordering {
    order_by
        .iter()
        .map(|term| compare_term(term, a, b))
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Stable sort of records by the given order terms.
pub fn sort_records(records: &mut [PolishView], order_by: &[OrderTerm]) {
    records.sort_by(|a, b| compare(order_by, a, b));
}
