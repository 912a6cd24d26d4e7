//! Repository for the `brands`, `colors` and `finishes` lookup tables.

use lacquer_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::lookup::{Lookup, LookupKind, LookupWithUsage};

/// Column list shared by all lookup tables.
const COLUMNS: &str = "id, name, created_at, updated_at";

/// Provides CRUD operations for brands, colors and finishes.
pub struct LookupRepo;

impl LookupRepo {
    /// List every lookup of a kind with its polish count, ordered by name.
    pub async fn list_with_usage(
        pool: &PgPool,
        kind: LookupKind,
    ) -> Result<Vec<LookupWithUsage>, sqlx::Error> {
        let (source, fk, polish_col) = kind.reference_source();
        let query = format!(
            "SELECT l.id, l.name, l.created_at, l.updated_at, \
                    (SELECT COUNT(DISTINCT r.{polish_col}) FROM {source} r WHERE r.{fk} = l.id) \
                        AS polish_count \
             FROM {table} l \
             ORDER BY l.name",
            table = kind.table(),
        );
        sqlx::query_as::<_, LookupWithUsage>(&query)
            .fetch_all(pool)
            .await
    }

    /// Find a lookup by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        kind: LookupKind,
        id: DbId,
    ) -> Result<Option<Lookup>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {} WHERE id = $1", kind.table());
        sqlx::query_as::<_, Lookup>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Create a lookup or return the existing one with the same name.
    pub async fn create_or_get(
        pool: &PgPool,
        kind: LookupKind,
        name: &str,
    ) -> Result<Lookup, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let lookup = Self::create_or_get_inner(&mut tx, kind, name).await?;
        tx.commit().await?;
        Ok(lookup)
    }

    /// Upsert by name within an existing transaction.
    ///
    /// `DO UPDATE` (rather than `DO NOTHING`) so `RETURNING` always yields
    /// the row.
    pub async fn create_or_get_inner(
        tx: &mut Transaction<'_, Postgres>,
        kind: LookupKind,
        name: &str,
    ) -> Result<Lookup, sqlx::Error> {
        let query = format!(
            "INSERT INTO {} (name) VALUES ($1) \
             ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
             RETURNING {COLUMNS}",
            kind.table()
        );
        sqlx::query_as::<_, Lookup>(&query)
            .bind(name)
            .fetch_one(&mut **tx)
            .await
    }

    /// Rename a lookup. Returns `None` if the ID does not exist.
    pub async fn rename(
        pool: &PgPool,
        kind: LookupKind,
        id: DbId,
        name: &str,
    ) -> Result<Option<Lookup>, sqlx::Error> {
        let query = format!(
            "UPDATE {} SET name = $2, updated_at = now() WHERE id = $1 RETURNING {COLUMNS}",
            kind.table()
        );
        sqlx::query_as::<_, Lookup>(&query)
            .bind(id)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Number of distinct polishes referencing a lookup.
    pub async fn count_references(
        pool: &PgPool,
        kind: LookupKind,
        id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let (source, fk, polish_col) = kind.reference_source();
        let query =
            format!("SELECT COUNT(DISTINCT {polish_col}) FROM {source} WHERE {fk} = $1");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Delete a lookup. Returns `true` if a row was removed.
    ///
    /// Referenced rows are rejected by the `ON DELETE RESTRICT` foreign keys;
    /// callers check [`Self::count_references`] first to report a friendly
    /// error.
    pub async fn delete(pool: &PgPool, kind: LookupKind, id: DbId) -> Result<bool, sqlx::Error> {
        let query = format!("DELETE FROM {} WHERE id = $1", kind.table());
        let result = sqlx::query(&query).bind(id).execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// All lookup names of a kind, ordered by name.
    pub async fn list_names(pool: &PgPool, kind: LookupKind) -> Result<Vec<String>, sqlx::Error> {
        let query = format!("SELECT name FROM {} ORDER BY name", kind.table());
        sqlx::query_scalar::<_, String>(&query)
            .fetch_all(pool)
            .await
    }
}
