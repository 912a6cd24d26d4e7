//! The storage seam for the inventory.
//!
//! [`CatalogStore`] is what the service layer and HTTP handlers talk to. It is
//! built once at startup and shared as `Arc<dyn CatalogStore>`.
//!
//! - [`PgCatalogStore`]: PostgreSQL via the repositories in this crate.
//! - [`MemoryCatalogStore`]: in-process maps, evaluated with the core matcher.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use lacquer_core::catalog::query::{Predicate, QueryDescriptor};
use lacquer_core::catalog::{CatalogRow, PolishView};
use lacquer_core::error::CoreError;
use lacquer_core::polish::{PolishAttributes, PolishInput};
use lacquer_core::types::DbId;

use crate::models::lookup::{Lookup, LookupKind, LookupWithUsage};
use crate::models::polish::FacetOptions;

pub use memory::MemoryCatalogStore;
pub use postgres::PgCatalogStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence operations for polishes and their lookups.
///
/// Methods that target one row return `Option`/`bool` for "does not exist"
/// and leave the choice of error to the caller.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Joined rows for one page of a compiled query, grouped by polish in
    /// page order.
    async fn fetch_page(&self, query: &QueryDescriptor) -> StoreResult<Vec<CatalogRow>>;

    /// Number of distinct polishes matching `predicate`.
    async fn count(&self, predicate: &Predicate) -> StoreResult<i64>;

    async fn facet_options(&self) -> StoreResult<FacetOptions>;

    async fn get_polish(&self, id: DbId) -> StoreResult<Option<PolishView>>;

    /// Insert a validated polish and return its ID.
    async fn create_polish(&self, input: &PolishInput) -> StoreResult<DbId>;

    /// Replace every field and relation except the image. `false` if missing.
    async fn replace_polish(&self, id: DbId, input: &PolishInput) -> StoreResult<bool>;

    async fn update_attributes(&self, id: DbId, attrs: &PolishAttributes) -> StoreResult<bool>;

    /// Set or clear the image reference, returning the previous one.
    /// The outer `None` means the polish does not exist.
    async fn set_image(
        &self,
        id: DbId,
        image_url: Option<&str>,
    ) -> StoreResult<Option<Option<String>>>;

    /// Delete a polish, returning its image reference.
    /// The outer `None` means the polish does not exist.
    async fn delete_polish(&self, id: DbId) -> StoreResult<Option<Option<String>>>;

    async fn list_lookups(&self, kind: LookupKind) -> StoreResult<Vec<LookupWithUsage>>;

    async fn find_lookup(&self, kind: LookupKind, id: DbId) -> StoreResult<Option<Lookup>>;

    /// Create a lookup by name or return the existing one.
    async fn upsert_lookup(&self, kind: LookupKind, name: &str) -> StoreResult<Lookup>;

    async fn rename_lookup(
        &self,
        kind: LookupKind,
        id: DbId,
        name: &str,
    ) -> StoreResult<Option<Lookup>>;

    /// Number of distinct polishes referencing a lookup.
    async fn count_references(&self, kind: LookupKind, id: DbId) -> StoreResult<i64>;

    async fn delete_lookup(&self, kind: LookupKind, id: DbId) -> StoreResult<bool>;

    /// Verify the backing store is reachable.
    async fn health_check(&self) -> StoreResult<()>;
}
