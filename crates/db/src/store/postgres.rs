//! PostgreSQL-backed [`CatalogStore`].

use async_trait::async_trait;
use lacquer_core::catalog::assemble::group_rows;
use lacquer_core::catalog::query::{Predicate, QueryDescriptor};
use lacquer_core::catalog::{CatalogRow, PolishView};
use lacquer_core::polish::{PolishAttributes, PolishInput};
use lacquer_core::types::DbId;

use super::{CatalogStore, StoreResult};
use crate::models::lookup::{Lookup, LookupKind, LookupWithUsage};
use crate::models::polish::FacetOptions;
use crate::repositories::{CatalogRepo, LookupRepo, PolishRepo};
use crate::DbPool;

/// Store over a shared connection pool.
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: DbPool,
}

impl PgCatalogStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn fetch_page(&self, query: &QueryDescriptor) -> StoreResult<Vec<CatalogRow>> {
        let rows = CatalogRepo::fetch_page(&self.pool, query).await?;
        Ok(rows.into_iter().map(|r| r.into_catalog_row()).collect())
    }

    async fn count(&self, predicate: &Predicate) -> StoreResult<i64> {
        Ok(CatalogRepo::count(&self.pool, predicate).await?)
    }

    async fn facet_options(&self) -> StoreResult<FacetOptions> {
        Ok(CatalogRepo::facet_options(&self.pool).await?)
    }

    async fn get_polish(&self, id: DbId) -> StoreResult<Option<PolishView>> {
        let rows: Vec<CatalogRow> = CatalogRepo::find_rows(&self.pool, id)
            .await?
            .into_iter()
            .map(|r| r.into_catalog_row())
            .collect();
        Ok(group_rows(&rows).into_iter().next())
    }

    async fn create_polish(&self, input: &PolishInput) -> StoreResult<DbId> {
        Ok(PolishRepo::create(&self.pool, input).await?)
    }

    async fn replace_polish(&self, id: DbId, input: &PolishInput) -> StoreResult<bool> {
        Ok(PolishRepo::replace(&self.pool, id, input).await?)
    }

    async fn update_attributes(&self, id: DbId, attrs: &PolishAttributes) -> StoreResult<bool> {
        Ok(PolishRepo::update_attributes(&self.pool, id, attrs).await?)
    }

    async fn set_image(
        &self,
        id: DbId,
        image_url: Option<&str>,
    ) -> StoreResult<Option<Option<String>>> {
        Ok(PolishRepo::set_image(&self.pool, id, image_url).await?)
    }

    async fn delete_polish(&self, id: DbId) -> StoreResult<Option<Option<String>>> {
        Ok(PolishRepo::delete(&self.pool, id).await?)
    }

    async fn list_lookups(&self, kind: LookupKind) -> StoreResult<Vec<LookupWithUsage>> {
        Ok(LookupRepo::list_with_usage(&self.pool, kind).await?)
    }

    async fn find_lookup(&self, kind: LookupKind, id: DbId) -> StoreResult<Option<Lookup>> {
        Ok(LookupRepo::find_by_id(&self.pool, kind, id).await?)
    }

    async fn upsert_lookup(&self, kind: LookupKind, name: &str) -> StoreResult<Lookup> {
        Ok(LookupRepo::create_or_get(&self.pool, kind, name).await?)
    }

    async fn rename_lookup(
        &self,
        kind: LookupKind,
        id: DbId,
        name: &str,
    ) -> StoreResult<Option<Lookup>> {
        Ok(LookupRepo::rename(&self.pool, kind, id, name).await?)
    }

    async fn count_references(&self, kind: LookupKind, id: DbId) -> StoreResult<i64> {
        Ok(LookupRepo::count_references(&self.pool, kind, id).await?)
    }

    async fn delete_lookup(&self, kind: LookupKind, id: DbId) -> StoreResult<bool> {
        Ok(LookupRepo::delete(&self.pool, kind, id).await?)
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(crate::health_check(&self.pool).await?)
    }
}
