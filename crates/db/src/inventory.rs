//! Inventory service: the operations handlers call.
//!
//! Sits between the HTTP layer and [`CatalogStore`]: compiles and assembles
//! catalog pages, validates polish writes at the boundary, guards lookup
//! deletion and keeps stored image files in step with polish rows.

use std::sync::Arc;

use lacquer_core::catalog::{assemble, compile, CatalogPage, FilterState, PageSize, PolishView};
use lacquer_core::error::CoreError;
use lacquer_core::image::{has_real_image, ImageError, ImageSource, ImageStore, NO_IMAGE_AVAILABLE};
use lacquer_core::polish::{PolishAttributes, PolishInput};
use lacquer_core::types::DbId;

use crate::models::lookup::{Lookup, LookupKind, LookupWithUsage};
use crate::models::polish::FacetOptions;
use crate::store::{CatalogStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Image(#[from] ImageError),
}

impl From<CoreError> for InventoryError {
    fn from(err: CoreError) -> Self {
        Self::Store(StoreError::Core(err))
    }
}

pub type InventoryResult<T> = Result<T, InventoryError>;

fn polish_not_found(id: DbId) -> InventoryError {
    CoreError::NotFound {
        entity: "Polish",
        id,
    }
    .into()
}

fn lookup_not_found(kind: LookupKind, id: DbId) -> InventoryError {
    CoreError::NotFound {
        entity: kind.label(),
        id,
    }
    .into()
}

fn validate_lookup_name(kind: LookupKind, name: &str) -> Result<String, CoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation(format!("{} name is required", kind.label())));
    }
    Ok(name.to_string())
}

#[derive(Clone)]
pub struct Inventory {
    store: Arc<dyn CatalogStore>,
    images: Arc<dyn ImageStore>,
}

impl Inventory {
    pub fn new(store: Arc<dyn CatalogStore>, images: Arc<dyn ImageStore>) -> Self {
        Self { store, images }
    }

    pub fn store(&self) -> &Arc<dyn CatalogStore> {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Catalog
    // -----------------------------------------------------------------------

    /// Compile `filter`, fetch the page and the distinct match count, and
    /// assemble the result.
    pub async fn browse(
        &self,
        filter: &FilterState,
        page: i64,
        page_size: PageSize,
    ) -> InventoryResult<CatalogPage> {
        let query = compile(filter, page, page_size);
        let (rows, total) = tokio::try_join!(
            self.store.fetch_page(&query),
            self.store.count(&query.predicate)
        )?;
        tracing::debug!(
            page = query.page,
            offset = query.offset,
            rows = rows.len(),
            total,
            "Catalog page fetched"
        );
        Ok(assemble(&rows, total, query.page, page_size))
    }

    pub async fn facet_options(&self) -> InventoryResult<FacetOptions> {
        Ok(self.store.facet_options().await?)
    }

    // -----------------------------------------------------------------------
    // Polishes
    // -----------------------------------------------------------------------

    pub async fn get_polish(&self, id: DbId) -> InventoryResult<PolishView> {
        self.store
            .get_polish(id)
            .await?
            .ok_or_else(|| polish_not_found(id))
    }

    pub async fn create_polish(&self, mut input: PolishInput) -> InventoryResult<PolishView> {
        input.validate()?;
        let id = self.store.create_polish(&input).await?;
        tracing::info!(polish_id = id, brand = %input.brand, name = %input.name, "Polish created");
        self.get_polish(id).await
    }

    /// Full-record update. Colors and finishes are replaced wholesale.
    pub async fn replace_polish(&self, id: DbId, mut input: PolishInput) -> InventoryResult<PolishView> {
        input.validate()?;
        if !self.store.replace_polish(id, &input).await? {
            return Err(polish_not_found(id));
        }
        tracing::info!(polish_id = id, "Polish replaced");
        self.get_polish(id).await
    }

    pub async fn update_attributes(
        &self,
        id: DbId,
        attrs: PolishAttributes,
    ) -> InventoryResult<PolishView> {
        attrs.validate()?;
        if attrs.is_empty() {
            return Err(CoreError::Validation("No attributes to update".into()).into());
        }
        if !self.store.update_attributes(id, &attrs).await? {
            return Err(polish_not_found(id));
        }
        self.get_polish(id).await
    }

    /// Delete a polish and its stored image file, if any.
    pub async fn delete_polish(&self, id: DbId) -> InventoryResult<()> {
        let image_url = self
            .store
            .delete_polish(id)
            .await?
            .ok_or_else(|| polish_not_found(id))?;
        tracing::info!(polish_id = id, "Polish deleted");
        self.discard_image(image_url.as_deref()).await;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Images
    // -----------------------------------------------------------------------

    /// Store a new image for a polish and replace its previous one.
    pub async fn upload_image(&self, id: DbId, source: ImageSource) -> InventoryResult<PolishView> {
        let polish = self.get_polish(id).await?;
        let hint = format!("{} {}", polish.brand, polish.name);
        let url = self.images.upload(source, &hint).await?;

        match self.store.set_image(id, Some(&url)).await {
            Ok(Some(previous)) => {
                tracing::info!(polish_id = id, url = %url, "Polish image stored");
                self.discard_image(previous.as_deref()).await;
                self.get_polish(id).await
            }
            Ok(None) => {
                self.discard_image(Some(&url)).await;
                Err(polish_not_found(id))
            }
            Err(err) => {
                self.discard_image(Some(&url)).await;
                Err(err.into())
            }
        }
    }

    /// Clear the image reference (back to "never checked").
    pub async fn clear_image(&self, id: DbId) -> InventoryResult<PolishView> {
        self.replace_image_reference(id, None).await
    }

    /// Record that no image exists for this polish.
    pub async fn mark_no_image(&self, id: DbId) -> InventoryResult<PolishView> {
        self.replace_image_reference(id, Some(NO_IMAGE_AVAILABLE)).await
    }

    async fn replace_image_reference(
        &self,
        id: DbId,
        reference: Option<&str>,
    ) -> InventoryResult<PolishView> {
        let previous = self
            .store
            .set_image(id, reference)
            .await?
            .ok_or_else(|| polish_not_found(id))?;
        self.discard_image(previous.as_deref()).await;
        self.get_polish(id).await
    }

    /// Remove a stored image file. Failures are logged, not returned: the row
    /// no longer points at the file.
    async fn discard_image(&self, image_url: Option<&str>) {
        let Some(url) = image_url.filter(|url| has_real_image(Some(*url))) else {
            return;
        };
        if let Err(e) = self.images.remove(url).await {
            tracing::warn!(url = %url, error = %e, "Failed to remove stored image");
        }
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    pub async fn list_lookups(&self, kind: LookupKind) -> InventoryResult<Vec<LookupWithUsage>> {
        Ok(self.store.list_lookups(kind).await?)
    }

    /// Create a lookup by name, or return the existing one.
    pub async fn upsert_lookup(&self, kind: LookupKind, name: &str) -> InventoryResult<Lookup> {
        let name = validate_lookup_name(kind, name)?;
        Ok(self.store.upsert_lookup(kind, &name).await?)
    }

    pub async fn rename_lookup(
        &self,
        kind: LookupKind,
        id: DbId,
        name: &str,
    ) -> InventoryResult<Lookup> {
        let name = validate_lookup_name(kind, name)?;
        self.store
            .rename_lookup(kind, id, &name)
            .await?
            .ok_or_else(|| lookup_not_found(kind, id))
    }

    /// Delete a lookup that no polish references.
    ///
    /// Fails with [`CoreError::StillReferenced`] naming the lookup and the
    /// number of referencing polishes; storage is not touched in that case.
    pub async fn delete_lookup(&self, kind: LookupKind, id: DbId) -> InventoryResult<()> {
        let lookup = self
            .store
            .find_lookup(kind, id)
            .await?
            .ok_or_else(|| lookup_not_found(kind, id))?;

        let count = self.store.count_references(kind, id).await?;
        if count > 0 {
            tracing::debug!(kind = kind.label(), id, count, "Lookup delete refused");
            return Err(CoreError::StillReferenced {
                entity: kind.label(),
                name: lookup.name,
                count,
            }
            .into());
        }

        if !self.store.delete_lookup(kind, id).await? {
            return Err(lookup_not_found(kind, id));
        }
        tracing::info!(kind = kind.label(), id, name = %lookup.name, "Lookup deleted");
        Ok(())
    }
}
