//! Rendering compiled catalog queries into PostgreSQL.
//!
//! The predicate tree from `lacquer_core::catalog::query` is walked into a
//! [`QueryBuilder`] with every value bound as a parameter. Queries assume
//! `polishes p JOIN brands b ON b.id = p.brand_id` is in scope; color and
//! finish clauses are `EXISTS` subqueries so a polish is counted once no
//! matter how many related rows match.
//!
//! Scalar comparisons are wrapped in `COALESCE(..., FALSE)` so a NULL column
//! never turns a `NOT` into "unknown": results match the in-memory matcher.

use lacquer_core::catalog::filter::{SortDirection, SortField};
use lacquer_core::catalog::query::{Case, Field, FieldValue, OrderTerm, Predicate};
use lacquer_core::rating::Rating;
use sqlx::{Postgres, QueryBuilder};

/// Base `FROM` clause every predicate is rendered against.
pub const CATALOG_FROM: &str = "FROM polishes p JOIN brands b ON b.id = p.brand_id";

/// Scalar column for a field, or `None` for many-to-many relations.
fn column(field: Field) -> Option<&'static str> {
    match field {
        Field::BrandName => Some("b.name"),
        Field::PolishName => Some("p.name"),
        Field::Rating => Some("p.rating"),
        Field::PurchaseYear => Some("p.purchase_year::text"),
        Field::ImageUrl => Some("p.image_url"),
        Field::ColorName | Field::FinishName => None,
    }
}

/// `(junction, lookup table, junction fk, alias)` for relation fields.
fn relation(field: Field) -> (&'static str, &'static str, &'static str, &'static str) {
    match field {
        Field::FinishName => ("polish_finishes", "finishes", "finish_id", "f"),
        _ => ("polish_colors", "colors", "color_id", "c"),
    }
}

/// Open `EXISTS (SELECT 1 FROM junction JOIN lookup ... WHERE ... AND ` and
/// return the qualified name column to compare against.
fn open_exists(qb: &mut QueryBuilder<'_, Postgres>, field: Field) -> String {
    let (junction, table, fk, alias) = relation(field);
    qb.push(format!(
        "EXISTS (SELECT 1 FROM {junction} j{alias} JOIN {table} {alias} ON {alias}.id = j{alias}.{fk} \
         WHERE j{alias}.polish_id = p.id AND "
    ));
    format!("{alias}.name")
}

/// Escape `%`, `_` and `\` for use inside an `ILIKE` pattern.
pub fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn push_in(qb: &mut QueryBuilder<'_, Postgres>, target: &str, values: &[String], case: Case) {
    match case {
        Case::Sensitive => {
            qb.push(format!("{target} = ANY("));
            qb.push_bind(values.to_vec());
        }
        Case::Insensitive => {
            qb.push(format!("lower({target}) = ANY("));
            qb.push_bind(values.iter().map(|v| v.to_lowercase()).collect::<Vec<_>>());
        }
    }
    qb.push(")");
}

/// Append the SQL for `predicate` to `qb`.
pub fn push_predicate(qb: &mut QueryBuilder<'_, Postgres>, predicate: &Predicate) {
    match predicate {
        Predicate::All => {
            qb.push("TRUE");
        }
        Predicate::And(clauses) | Predicate::Or(clauses) if clauses.is_empty() => {
            qb.push(if matches!(predicate, Predicate::And(_)) {
                "TRUE"
            } else {
                "FALSE"
            });
        }
        Predicate::And(clauses) | Predicate::Or(clauses) => {
            let joiner = if matches!(predicate, Predicate::And(_)) {
                " AND "
            } else {
                " OR "
            };
            qb.push("(");
            for (i, clause) in clauses.iter().enumerate() {
                if i > 0 {
                    qb.push(joiner);
                }
                push_predicate(qb, clause);
            }
            qb.push(")");
        }
        Predicate::Not(inner) => {
            qb.push("NOT (");
            push_predicate(qb, inner);
            qb.push(")");
        }
        Predicate::FieldIn {
            field,
            values,
            case,
        } => match column(*field) {
            Some(col) => {
                qb.push("COALESCE(");
                push_in(qb, col, values, *case);
                qb.push(", FALSE)");
            }
            None => {
                let target = open_exists(qb, *field);
                push_in(qb, &target, values, *case);
                qb.push(")");
            }
        },
        Predicate::Contains { field, text } => {
            let pattern = format!("%{}%", escape_like(text));
            match column(*field) {
                Some(col) => {
                    qb.push(format!("COALESCE({col} ILIKE "));
                    qb.push_bind(pattern);
                    qb.push(", FALSE)");
                }
                None => {
                    let target = open_exists(qb, *field);
                    qb.push(format!("{target} ILIKE "));
                    qb.push_bind(pattern);
                    qb.push(")");
                }
            }
        }
        Predicate::Equals { field, value } => {
            match (field, value) {
                (Field::PurchaseYear, FieldValue::Int(year)) => {
                    qb.push("COALESCE(p.purchase_year = ");
                    qb.push_bind(*year);
                }
                (_, value) => {
                    let text = match value {
                        FieldValue::Text(text) => text.clone(),
                        FieldValue::Int(n) => n.to_string(),
                    };
                    match column(*field) {
                        Some(col) => {
                            qb.push(format!("COALESCE({col} = "));
                            qb.push_bind(text);
                        }
                        None => {
                            let target = open_exists(qb, *field);
                            qb.push(format!("{target} = "));
                            qb.push_bind(text);
                            qb.push(")");
                            return;
                        }
                    }
                }
            }
            qb.push(", FALSE)");
        }
        Predicate::IsNull { field } => match column(*field) {
            Some(col) => {
                qb.push(format!("{col} IS NULL"));
            }
            None => {
                let (junction, _, _, alias) = relation(*field);
                qb.push(format!(
                    "NOT EXISTS (SELECT 1 FROM {junction} j{alias} WHERE j{alias}.polish_id = p.id)"
                ));
            }
        },
    }
}

/// `CASE` expression ranking stored ratings, higher is better.
pub fn rating_rank_expr() -> String {
    let arms: String = Rating::ALL
        .iter()
        .map(|r| format!(" WHEN '{}' THEN {}", r.storage_form(), r.rank()))
        .collect();
    format!("(CASE p.rating{arms} END)")
}

/// Render order terms as a comma-separated `ORDER BY` list (without the
/// keyword). Ratings sort NULLS LAST in both directions.
pub fn order_by_sql(order_by: &[OrderTerm]) -> String {
    order_by
        .iter()
        .map(|term| {
            let dir = match term.direction {
                SortDirection::Asc => "ASC",
                SortDirection::Desc => "DESC",
            };
            match term.field {
                SortField::Brand => format!("b.name {dir}"),
                SortField::Name => format!("p.name {dir}"),
                SortField::Updated => format!("p.updated_at {dir}"),
                SortField::Rating => format!("{} {dir} NULLS LAST", rating_rank_expr()),
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
