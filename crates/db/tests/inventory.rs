//! Integration tests for the inventory service over the in-memory store.

use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use async_trait::async_trait;
use lacquer_core::catalog::{
    CatalogSort, Facet, FilterState, ImagePresence, PageSize, SortDirection, SortField,
};
use lacquer_core::error::CoreError;
use lacquer_core::image::{ImageError, ImageSource, ImageStore, NO_IMAGE_AVAILABLE};
use lacquer_core::polish::{PolishAttributes, PolishInput};
use lacquer_core::rating::Rating;
use lacquer_db::inventory::{Inventory, InventoryError};
use lacquer_db::models::lookup::LookupKind;
use lacquer_db::store::{MemoryCatalogStore, StoreError};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Image store that hands out sequential URLs and records removals.
#[derive(Default)]
struct FakeImages {
    uploaded: Mutex<u32>,
    removed: Mutex<Vec<String>>,
}

#[async_trait]
impl ImageStore for FakeImages {
    async fn upload(&self, _source: ImageSource, hint: &str) -> Result<String, ImageError> {
        let mut n = self.uploaded.lock().unwrap();
        *n += 1;
        Ok(format!("http://localhost/images/{}-{n}.jpg", hint.replace(' ', "-")))
    }

    async fn remove(&self, url_or_key: &str) -> Result<(), ImageError> {
        self.removed.lock().unwrap().push(url_or_key.to_string());
        Ok(())
    }
}

fn setup() -> (Inventory, Arc<FakeImages>) {
    let images = Arc::new(FakeImages::default());
    let inventory = Inventory::new(Arc::new(MemoryCatalogStore::new()), images.clone());
    (inventory, images)
}

fn polish(brand: &str, name: &str, colors: &[&str], finishes: &[&str]) -> PolishInput {
    PolishInput {
        brand: brand.into(),
        name: name.into(),
        colors: colors.iter().map(|c| c.to_string()).collect(),
        finishes: finishes.iter().map(|f| f.to_string()).collect(),
        link: None,
        image_url: None,
        rating: None,
        coats: None,
        notes: None,
        last_used: None,
        total_bottles: None,
        empty_bottles: None,
        is_old: None,
        purchase_year: None,
    }
}

fn rated(mut input: PolishInput, rating: Rating) -> PolishInput {
    input.rating = Some(rating);
    input
}

async fn seed_two(inventory: &Inventory) {
    inventory
        .create_polish(rated(polish("OPI", "Red Hot", &["Red"], &["Creme"]), Rating::A))
        .await
        .unwrap();
    inventory
        .create_polish(rated(polish("Essie", "Blue Sky", &["Blue"], &["Shimmer"]), Rating::B))
        .await
        .unwrap();
}

async fn browse_names(inventory: &Inventory, filter: &FilterState) -> Vec<String> {
    inventory
        .browse(filter, 1, PageSize::Unbounded)
        .await
        .unwrap()
        .records
        .into_iter()
        .map(|r| r.name)
        .collect()
}

// ---------------------------------------------------------------------------
// Browsing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn end_to_end_filters() {
    let (inventory, _) = setup();
    seed_two(&inventory).await;

    let by_brand = FilterState::default().with(Facet::Brand, "OPI");
    assert_eq!(browse_names(&inventory, &by_brand).await, vec!["Red Hot"]);

    let by_search = FilterState::default().with_search("blue");
    assert_eq!(browse_names(&inventory, &by_search).await, vec!["Blue Sky"]);

    let by_rating = FilterState::default()
        .with_rating(Rating::A)
        .with_rating(Rating::B);
    assert_eq!(
        browse_names(&inventory, &by_rating).await,
        vec!["Blue Sky", "Red Hot"]
    );
}

#[tokio::test]
async fn pagination_counts_polishes_not_rows() {
    let (inventory, _) = setup();
    for i in 0..23 {
        inventory
            .create_polish(polish(
                "OPI",
                &format!("Shade {i:02}"),
                &["Red", "Pink"],
                &["Creme", "Glitter"],
            ))
            .await
            .unwrap();
    }

    let filter = FilterState::default();
    let first = inventory.browse(&filter, 1, PageSize::default()).await.unwrap();
    assert_eq!(first.total, 23);
    assert_eq!(first.total_pages, 3);
    assert_eq!(first.records.len(), 10);
    assert_eq!(first.records[0].colors, vec!["Red", "Pink"]);

    let last = inventory.browse(&filter, 3, PageSize::default()).await.unwrap();
    assert_eq!(last.records.len(), 3);
    assert_eq!(last.records[0].name, "Shade 20");

    for page in [0, -1] {
        let clamped = inventory.browse(&filter, page, PageSize::default()).await.unwrap();
        assert_eq!(clamped, first);
    }

    let all = inventory.browse(&filter, 2, PageSize::Unbounded).await.unwrap();
    assert_eq!(all.records.len(), 23);
    assert_eq!(all.total_pages, 1);
    assert_eq!(all.page, 1);
}

#[tokio::test]
async fn rating_desc_breaks_ties_by_name() {
    let (inventory, _) = setup();
    for name in ["Zinnia", "Aster", "Mallow"] {
        inventory
            .create_polish(rated(polish("OPI", name, &["Pink"], &["Creme"]), Rating::BPlus))
            .await
            .unwrap();
    }
    inventory
        .create_polish(rated(polish("OPI", "Best", &["Red"], &["Creme"]), Rating::APlus))
        .await
        .unwrap();

    let filter = FilterState::default()
        .with_sort(CatalogSort::new(SortField::Rating, SortDirection::Desc));
    assert_eq!(
        browse_names(&inventory, &filter).await,
        vec!["Best", "Aster", "Mallow", "Zinnia"]
    );
}

#[tokio::test]
async fn image_presence_filters() {
    let (inventory, _) = setup();
    seed_two(&inventory).await;
    let mut third = polish("Zoya", "Ash", &["Grey"], &["Creme"]);
    third.image_url = Some(NO_IMAGE_AVAILABLE.into());
    inventory.create_polish(third).await.unwrap();

    let red_hot = inventory
        .browse(&FilterState::default().with(Facet::Brand, "OPI"), 1, PageSize::Unbounded)
        .await
        .unwrap()
        .records
        .remove(0);
    inventory
        .upload_image(red_hot.id, ImageSource::Bytes(vec![1, 2, 3]))
        .await
        .unwrap();

    let with = FilterState::default().with_image(ImagePresence::With);
    assert_eq!(browse_names(&inventory, &with).await, vec!["Red Hot"]);

    let without = FilterState::default().with_image(ImagePresence::Without);
    assert_eq!(browse_names(&inventory, &without).await, vec!["Blue Sky"]);
}

#[tokio::test]
async fn facet_options_cover_lookups_and_years() {
    let (inventory, _) = setup();
    let mut input = polish("OPI", "Red Hot", &["Red"], &["Creme"]);
    input.purchase_year = Some(2021);
    inventory.create_polish(input).await.unwrap();
    let mut input = polish("Essie", "Blue Sky", &["Blue"], &["Shimmer"]);
    input.purchase_year = Some(2023);
    inventory.create_polish(input).await.unwrap();

    let options = inventory.facet_options().await.unwrap();
    assert_eq!(options.brands, vec!["Essie", "OPI"]);
    assert_eq!(options.colors, vec!["Blue", "Red"]);
    assert_eq!(options.purchase_years, vec![2023, 2021]);
    assert_eq!(options.ratings.first(), Some(&Rating::APlus));
}

// ---------------------------------------------------------------------------
// Polish writes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_requires_color_and_finish() {
    let (inventory, _) = setup();
    let result = inventory
        .create_polish(polish("OPI", "Bare", &[], &["Creme"]))
        .await;
    assert_matches!(
        result,
        Err(InventoryError::Store(StoreError::Core(CoreError::Validation(_))))
    );
}

#[tokio::test]
async fn attribute_update_keeps_unset_fields() {
    let (inventory, _) = setup();
    let mut input = rated(polish("OPI", "Red Hot", &["Red"], &["Creme"]), Rating::A);
    input.notes = Some("two coats".into());
    let created = inventory.create_polish(input).await.unwrap();

    let updated = inventory
        .update_attributes(
            created.id,
            PolishAttributes {
                coats: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.coats, Some(2));
    assert_eq!(updated.rating, Some(Rating::A));
    assert_eq!(updated.notes.as_deref(), Some("two coats"));

    assert_matches!(
        inventory
            .update_attributes(created.id, PolishAttributes::default())
            .await,
        Err(InventoryError::Store(StoreError::Core(CoreError::Validation(_))))
    );
}

#[tokio::test]
async fn missing_polish_is_not_found() {
    let (inventory, _) = setup();
    assert_matches!(
        inventory.get_polish(404).await,
        Err(InventoryError::Store(StoreError::Core(CoreError::NotFound { entity: "Polish", id: 404 })))
    );
    assert_matches!(
        inventory.delete_polish(404).await,
        Err(InventoryError::Store(StoreError::Core(CoreError::NotFound { .. })))
    );
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

#[tokio::test]
async fn replacing_an_image_removes_the_old_file() {
    let (inventory, images) = setup();
    let created = inventory
        .create_polish(polish("OPI", "Red Hot", &["Red"], &["Creme"]))
        .await
        .unwrap();

    let first = inventory
        .upload_image(created.id, ImageSource::Bytes(vec![0]))
        .await
        .unwrap();
    let first_url = first.image_url.clone().unwrap();
    assert!(first_url.contains("OPI-Red-Hot"));

    inventory
        .upload_image(created.id, ImageSource::RemoteUrl("https://example.com/a.png".into()))
        .await
        .unwrap();
    assert_eq!(*images.removed.lock().unwrap(), vec![first_url]);

    let marked = inventory.mark_no_image(created.id).await.unwrap();
    assert_eq!(marked.image_url.as_deref(), Some(NO_IMAGE_AVAILABLE));
    assert_eq!(images.removed.lock().unwrap().len(), 2);

    // The sentinel is not a file.
    let cleared = inventory.clear_image(created.id).await.unwrap();
    assert_eq!(cleared.image_url, None);
    assert_eq!(images.removed.lock().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

#[tokio::test]
async fn referenced_color_cannot_be_deleted_until_released() {
    let (inventory, _) = setup();
    let created = inventory
        .create_polish(polish("OPI", "Red Hot", &["Red"], &["Creme"]))
        .await
        .unwrap();
    let red = inventory.upsert_lookup(LookupKind::Color, "Red").await.unwrap();

    let err = inventory
        .delete_lookup(LookupKind::Color, red.id)
        .await
        .unwrap_err();
    assert_matches!(
        &err,
        InventoryError::Store(StoreError::Core(CoreError::StillReferenced { entity: "Color", name, count: 1 }))
            if name == "Red"
    );

    inventory
        .replace_polish(created.id, polish("OPI", "Red Hot", &["Orange"], &["Creme"]))
        .await
        .unwrap();
    inventory
        .delete_lookup(LookupKind::Color, red.id)
        .await
        .unwrap();

    let colors = inventory.list_lookups(LookupKind::Color).await.unwrap();
    assert_eq!(colors.len(), 1);
    assert_eq!(colors[0].lookup.name, "Orange");
}

#[tokio::test]
async fn lookup_upsert_is_idempotent_and_trims() {
    let (inventory, _) = setup();
    let first = inventory.upsert_lookup(LookupKind::Finish, " Matte ").await.unwrap();
    let again = inventory.upsert_lookup(LookupKind::Finish, "Matte").await.unwrap();
    assert_eq!(first.id, again.id);
    assert_eq!(first.name, "Matte");

    assert_matches!(
        inventory.upsert_lookup(LookupKind::Finish, "   ").await,
        Err(InventoryError::Store(StoreError::Core(CoreError::Validation(_))))
    );
}

#[tokio::test]
async fn renamed_brand_shows_in_catalog() {
    let (inventory, _) = setup();
    seed_two(&inventory).await;
    let brands = inventory.list_lookups(LookupKind::Brand).await.unwrap();
    let opi = brands.iter().find(|b| b.lookup.name == "OPI").unwrap();

    inventory
        .rename_lookup(LookupKind::Brand, opi.lookup.id, "O.P.I")
        .await
        .unwrap();
    let filter = FilterState::default().with(Facet::Brand, "O.P.I");
    assert_eq!(browse_names(&inventory, &filter).await, vec!["Red Hot"]);
}
