//! Catalog reads: filtered pages of joined polish rows and match counts.
//!
//! Pages are selected on distinct polishes first (a `page` CTE that applies
//! the predicate, ordering and `LIMIT`/`OFFSET`) and only then joined with
//! colors and finishes, so a limit of 10 means ten polishes, not ten rows.

use lacquer_core::catalog::query::{Predicate, QueryDescriptor};
use lacquer_core::rating::Rating;
use lacquer_core::types::DbId;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::lookup::LookupKind;
use crate::models::polish::{FacetOptions, PolishJoinRow};
use crate::repositories::lookup_repo::LookupRepo;
use crate::sql::{order_by_sql, push_predicate, CATALOG_FROM};

/// Columns of the joined row shape (see [`PolishJoinRow`]).
const JOIN_COLUMNS: &str = "\
    p.id, b.name AS brand, p.name, c.name AS color, f.name AS finish, \
    p.link, p.image_url, p.rating, p.coats, p.notes, p.last_used, \
    p.total_bottles, p.empty_bottles, p.is_old, p.purchase_year, p.updated_at";

/// Joins from a polish to its brand, colors and finishes.
const JOIN_RELATIONS: &str = "\
    JOIN brands b ON b.id = p.brand_id \
    LEFT JOIN polish_colors pc ON pc.polish_id = p.id \
    LEFT JOIN colors c ON c.id = pc.color_id \
    LEFT JOIN polish_finishes pf ON pf.polish_id = p.id \
    LEFT JOIN finishes f ON f.id = pf.finish_id";

/// Provides filtered catalog reads.
pub struct CatalogRepo;

impl CatalogRepo {
    /// Fetch the joined rows for one page of a compiled query.
    ///
    /// Rows come back grouped by polish in page order, with colors and
    /// finishes in their stored position order.
    pub async fn fetch_page(
        pool: &PgPool,
        query: &QueryDescriptor,
    ) -> Result<Vec<PolishJoinRow>, sqlx::Error> {
        let order = order_by_sql(&query.order_by);

        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(format!(
            "WITH page AS (\
                SELECT p.id, ROW_NUMBER() OVER (ORDER BY {order}, p.id) AS position \
                {CATALOG_FROM} WHERE "
        ));
        push_predicate(&mut qb, &query.predicate);
        qb.push(format!(" ORDER BY {order}, p.id"));
        if let Some(limit) = query.limit {
            qb.push(" LIMIT ");
            qb.push_bind(limit);
        }
        qb.push(" OFFSET ");
        qb.push_bind(query.offset);
        qb.push(format!(
            ") SELECT {JOIN_COLUMNS} FROM page pg \
             JOIN polishes p ON p.id = pg.id \
             {JOIN_RELATIONS} \
             ORDER BY pg.position, pc.position, pf.position"
        ));

        qb.build_query_as::<PolishJoinRow>().fetch_all(pool).await
    }

    /// Count distinct polishes matching a predicate.
    pub async fn count(pool: &PgPool, predicate: &Predicate) -> Result<i64, sqlx::Error> {
        let mut qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT COUNT(*) {CATALOG_FROM} WHERE "));
        push_predicate(&mut qb, predicate);
        qb.build_query_scalar::<i64>().fetch_one(pool).await
    }

    /// Joined rows for a single polish; empty if it does not exist.
    pub async fn find_rows(pool: &PgPool, id: DbId) -> Result<Vec<PolishJoinRow>, sqlx::Error> {
        let query = format!(
            "SELECT {JOIN_COLUMNS} FROM polishes p {JOIN_RELATIONS} \
             WHERE p.id = $1 \
             ORDER BY pc.position, pf.position"
        );
        sqlx::query_as::<_, PolishJoinRow>(&query)
            .bind(id)
            .fetch_all(pool)
            .await
    }

    /// Values the filter UI can offer.
    pub async fn facet_options(pool: &PgPool) -> Result<FacetOptions, sqlx::Error> {
        let brands = LookupRepo::list_names(pool, LookupKind::Brand).await?;
        let colors = LookupRepo::list_names(pool, LookupKind::Color).await?;
        let finishes = LookupRepo::list_names(pool, LookupKind::Finish).await?;
        let purchase_years = sqlx::query_scalar::<_, i32>(
            "SELECT DISTINCT purchase_year FROM polishes \
             WHERE purchase_year IS NOT NULL \
             ORDER BY purchase_year DESC",
        )
        .fetch_all(pool)
        .await?;

        Ok(FacetOptions {
            brands,
            colors,
            finishes,
            ratings: Rating::ALL.to_vec(),
            purchase_years,
        })
    }
}

#[cfg(test)]
mod tests {
    use lacquer_core::catalog::filter::{Facet, FilterState};
    use lacquer_core::catalog::{compile, PageSize};

    use super::*;

    async fn seed(pool: &PgPool) {
        use lacquer_core::polish::PolishInput;

        use crate::repositories::PolishRepo;

        for (brand, name, color, finish, rating) in [
            ("OPI", "Red Hot", "Red", "Creme", Rating::A),
            ("Essie", "Blue Sky", "Blue", "Shimmer", Rating::B),
        ] {
            let input = PolishInput {
                brand: brand.into(),
                name: name.into(),
                colors: vec![color.into()],
                finishes: vec![finish.into()],
                link: None,
                image_url: None,
                rating: Some(rating),
                coats: None,
                notes: None,
                last_used: None,
                total_bottles: None,
                empty_bottles: None,
                is_old: None,
                purchase_year: Some(2022),
            };
            PolishRepo::create(pool, &input).await.unwrap();
        }
    }

    fn names(rows: &[PolishJoinRow]) -> Vec<&str> {
        rows.iter().map(|r| r.name.as_str()).collect()
    }

    #[sqlx::test(migrations = "../../db/migrations")]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn filters_by_brand_and_counts(pool: PgPool) {
        seed(&pool).await;
        let filter = FilterState::default().with(Facet::Brand, "OPI");
        let query = compile(&filter, 1, PageSize::default());

        let rows = CatalogRepo::fetch_page(&pool, &query).await.unwrap();
        assert_eq!(names(&rows), vec!["Red Hot"]);
        assert_eq!(CatalogRepo::count(&pool, &query.predicate).await.unwrap(), 1);
    }

    #[sqlx::test(migrations = "../../db/migrations")]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn color_filter_ignores_case(pool: PgPool) {
        seed(&pool).await;
        let filter = FilterState::default().with(Facet::Color, "blue");
        let query = compile(&filter, 1, PageSize::Unbounded);
        let rows = CatalogRepo::fetch_page(&pool, &query).await.unwrap();
        assert_eq!(names(&rows), vec!["Blue Sky"]);
    }

    #[sqlx::test(migrations = "../../db/migrations")]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn facet_options_list_lookups_and_years(pool: PgPool) {
        seed(&pool).await;
        let options = CatalogRepo::facet_options(&pool).await.unwrap();
        assert_eq!(options.brands, vec!["Essie", "OPI"]);
        assert_eq!(options.purchase_years, vec![2022]);
        assert_eq!(options.ratings.len(), 13);
    }
}
