//! Repository for the `polishes` table and its color/finish junctions.

use lacquer_core::polish::{PolishAttributes, PolishInput};
use lacquer_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::lookup::LookupKind;
use crate::repositories::lookup_repo::LookupRepo;

/// Provides write operations for polishes. Reads go through
/// [`crate::repositories::CatalogRepo`], which returns the joined shape.
pub struct PolishRepo;

impl PolishRepo {
    /// Insert a polish, upserting its brand, colors and finishes by name.
    ///
    /// Everything happens in one transaction. Returns the new polish ID.
    pub async fn create(pool: &PgPool, input: &PolishInput) -> Result<DbId, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let brand = LookupRepo::create_or_get_inner(&mut tx, LookupKind::Brand, &input.brand).await?;
        let id = sqlx::query_scalar::<_, DbId>(
            "INSERT INTO polishes \
                (brand_id, name, link, image_url, rating, coats, notes, last_used, \
                 total_bottles, empty_bottles, is_old, purchase_year) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING id",
        )
        .bind(brand.id)
        .bind(&input.name)
        .bind(&input.link)
        .bind(&input.image_url)
        .bind(input.rating.map(|r| r.storage_form()))
        .bind(input.coats)
        .bind(&input.notes)
        .bind(input.last_used)
        .bind(input.total_bottles)
        .bind(input.empty_bottles)
        .bind(input.is_old)
        .bind(input.purchase_year)
        .fetch_one(&mut *tx)
        .await?;

        Self::set_relations_inner(&mut tx, id, LookupKind::Color, &input.colors).await?;
        Self::set_relations_inner(&mut tx, id, LookupKind::Finish, &input.finishes).await?;

        tx.commit().await?;
        Ok(id)
    }

    /// Replace every field and relation of a polish.
    ///
    /// The image URL is left alone; images change through [`Self::set_image`].
    /// Returns `false` if the polish does not exist.
    pub async fn replace(
        pool: &PgPool,
        id: DbId,
        input: &PolishInput,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let brand = LookupRepo::create_or_get_inner(&mut tx, LookupKind::Brand, &input.brand).await?;
        let result = sqlx::query(
            "UPDATE polishes SET \
                brand_id = $2, name = $3, link = $4, rating = $5, coats = $6, notes = $7, \
                last_used = $8, total_bottles = $9, empty_bottles = $10, is_old = $11, \
                purchase_year = $12, updated_at = now() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(brand.id)
        .bind(&input.name)
        .bind(&input.link)
        .bind(input.rating.map(|r| r.storage_form()))
        .bind(input.coats)
        .bind(&input.notes)
        .bind(input.last_used)
        .bind(input.total_bottles)
        .bind(input.empty_bottles)
        .bind(input.is_old)
        .bind(input.purchase_year)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        Self::set_relations_inner(&mut tx, id, LookupKind::Color, &input.colors).await?;
        Self::set_relations_inner(&mut tx, id, LookupKind::Finish, &input.finishes).await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Apply the non-`None` attributes of a quick update.
    ///
    /// Returns `false` if the polish does not exist.
    pub async fn update_attributes(
        pool: &PgPool,
        id: DbId,
        attrs: &PolishAttributes,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE polishes SET \
                rating = COALESCE($2, rating), \
                coats = COALESCE($3, coats), \
                notes = COALESCE($4, notes), \
                last_used = COALESCE($5, last_used), \
                total_bottles = COALESCE($6, total_bottles), \
                empty_bottles = COALESCE($7, empty_bottles), \
                is_old = COALESCE($8, is_old), \
                link = COALESCE($9, link), \
                purchase_year = COALESCE($10, purchase_year), \
                updated_at = now() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(attrs.rating.map(|r| r.storage_form()))
        .bind(attrs.coats)
        .bind(&attrs.notes)
        .bind(attrs.last_used)
        .bind(attrs.total_bottles)
        .bind(attrs.empty_bottles)
        .bind(attrs.is_old)
        .bind(&attrs.link)
        .bind(attrs.purchase_year)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set (or clear) the image URL.
    ///
    /// Returns the previous URL, or `None` if the polish does not exist.
    pub async fn set_image(
        pool: &PgPool,
        id: DbId,
        image_url: Option<&str>,
    ) -> Result<Option<Option<String>>, sqlx::Error> {
        sqlx::query_scalar::<_, Option<String>>(
            "UPDATE polishes p SET image_url = $2, updated_at = now() \
             FROM (SELECT id, image_url FROM polishes WHERE id = $1 FOR UPDATE) old \
             WHERE p.id = old.id \
             RETURNING old.image_url",
        )
        .bind(id)
        .bind(image_url)
        .fetch_optional(pool)
        .await
    }

    /// Delete a polish. Junction rows go with it via `ON DELETE CASCADE`.
    ///
    /// Returns the deleted polish's image URL, or `None` if it did not exist.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Option<String>>, sqlx::Error> {
        sqlx::query_scalar::<_, Option<String>>(
            "DELETE FROM polishes WHERE id = $1 RETURNING image_url",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Replace a polish's colors or finishes within an existing transaction.
    ///
    /// Names are upserted into the lookup table; `position` keeps the order
    /// they were given in.
    async fn set_relations_inner(
        tx: &mut Transaction<'_, Postgres>,
        polish_id: DbId,
        kind: LookupKind,
        names: &[String],
    ) -> Result<(), sqlx::Error> {
        let Some((junction, fk)) = kind.junction() else {
            return Ok(());
        };

        // Delete existing
        sqlx::query(&format!("DELETE FROM {junction} WHERE polish_id = $1"))
            .bind(polish_id)
            .execute(&mut **tx)
            .await?;

        // Insert new associations
        let insert = format!(
            "INSERT INTO {junction} (polish_id, {fk}, position) VALUES ($1, $2, $3) \
             ON CONFLICT DO NOTHING"
        );
        for (position, name) in names.iter().enumerate() {
            let lookup = LookupRepo::create_or_get_inner(tx, kind, name).await?;
            sqlx::query(&insert)
                .bind(polish_id)
                .bind(lookup.id)
                .bind(position as i32)
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }
}
