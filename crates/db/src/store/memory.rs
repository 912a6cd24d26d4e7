//! In-memory [`CatalogStore`].
//!
//! Holds everything in maps behind one `tokio::sync::RwLock`; each mutation
//! runs under a single write guard so readers never see half an update.
//! Filtering and ordering go through `lacquer_core::catalog::matcher`, which
//! mirrors the SQL rendering in [`crate::sql`].

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use lacquer_core::catalog::matcher::{matches, sort_records};
use lacquer_core::catalog::query::{Predicate, QueryDescriptor};
use lacquer_core::catalog::{CatalogRow, PolishView};
use lacquer_core::error::CoreError;
use lacquer_core::polish::{PolishAttributes, PolishInput};
use lacquer_core::rating::Rating;
use lacquer_core::types::{DbId, Timestamp};
use tokio::sync::RwLock;

use super::{CatalogStore, StoreResult};
use crate::models::lookup::{Lookup, LookupKind, LookupWithUsage};
use crate::models::polish::FacetOptions;

#[derive(Debug, Clone)]
struct StoredPolish {
    id: DbId,
    brand_id: DbId,
    name: String,
    color_ids: Vec<DbId>,
    finish_ids: Vec<DbId>,
    link: Option<String>,
    image_url: Option<String>,
    rating: Option<Rating>,
    coats: Option<i32>,
    notes: Option<String>,
    last_used: Option<NaiveDate>,
    total_bottles: Option<i32>,
    empty_bottles: Option<i32>,
    is_old: Option<bool>,
    purchase_year: Option<i32>,
    updated_at: Timestamp,
}

#[derive(Debug, Default)]
struct Data {
    next_id: DbId,
    lookups: HashMap<LookupKind, BTreeMap<DbId, Lookup>>,
    polishes: BTreeMap<DbId, StoredPolish>,
}

impl Data {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn lookup_table(&self, kind: LookupKind) -> Option<&BTreeMap<DbId, Lookup>> {
        self.lookups.get(&kind)
    }

    fn lookup_name(&self, kind: LookupKind, id: DbId) -> String {
        self.lookup_table(kind)
            .and_then(|t| t.get(&id))
            .map(|l| l.name.clone())
            .unwrap_or_default()
    }

    fn upsert_lookup(&mut self, kind: LookupKind, name: &str) -> Lookup {
        let existing = self
            .lookup_table(kind)
            .and_then(|t| t.values().find(|l| l.name == name))
            .cloned();
        if let Some(lookup) = existing {
            return lookup;
        }
        let now = Utc::now();
        let lookup = Lookup {
            id: self.next_id(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.lookups
            .entry(kind)
            .or_default()
            .insert(lookup.id, lookup.clone());
        lookup
    }

    fn upsert_all(&mut self, kind: LookupKind, names: &[String]) -> Vec<DbId> {
        let mut ids: Vec<DbId> = Vec::with_capacity(names.len());
        for name in names {
            let id = self.upsert_lookup(kind, name).id;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    fn references(&self, kind: LookupKind, id: DbId) -> i64 {
        self.polishes
            .values()
            .filter(|p| match kind {
                LookupKind::Brand => p.brand_id == id,
                LookupKind::Color => p.color_ids.contains(&id),
                LookupKind::Finish => p.finish_ids.contains(&id),
            })
            .count() as i64
    }

    fn ensure_unique_polish(
        &self,
        brand_id: DbId,
        name: &str,
        except: Option<DbId>,
    ) -> StoreResult<()> {
        let taken = self
            .polishes
            .values()
            .any(|p| p.brand_id == brand_id && p.name == name && Some(p.id) != except);
        if taken {
            return Err(CoreError::Conflict(format!(
                "A polish named '{name}' already exists for this brand"
            ))
            .into());
        }
        Ok(())
    }

    fn view(&self, polish: &StoredPolish) -> PolishView {
        PolishView {
            id: polish.id,
            brand: self.lookup_name(LookupKind::Brand, polish.brand_id),
            name: polish.name.clone(),
            colors: polish
                .color_ids
                .iter()
                .map(|id| self.lookup_name(LookupKind::Color, *id))
                .collect(),
            finishes: polish
                .finish_ids
                .iter()
                .map(|id| self.lookup_name(LookupKind::Finish, *id))
                .collect(),
            link: polish.link.clone(),
            image_url: polish.image_url.clone(),
            rating: polish.rating,
            coats: polish.coats,
            notes: polish.notes.clone(),
            last_used: polish.last_used,
            total_bottles: polish.total_bottles,
            empty_bottles: polish.empty_bottles,
            is_old: polish.is_old,
            purchase_year: polish.purchase_year,
            updated_at: polish.updated_at,
        }
    }

    fn matching(&self, predicate: &Predicate) -> Vec<PolishView> {
        self.polishes
            .values()
            .map(|p| self.view(p))
            .filter(|v| matches(predicate, v))
            .collect()
    }

    fn names(&self, kind: LookupKind) -> Vec<String> {
        let mut names: Vec<String> = self
            .lookup_table(kind)
            .map(|t| t.values().map(|l| l.name.clone()).collect())
            .unwrap_or_default();
        names.sort();
        names
    }
}

/// Store backed by process memory. Data is lost on restart.
#[derive(Debug, Default)]
pub struct MemoryCatalogStore {
    data: RwLock<Data>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn fetch_page(&self, query: &QueryDescriptor) -> StoreResult<Vec<CatalogRow>> {
        let data = self.data.read().await;
        // Iteration is in id order, so the stable sort breaks full ties by id.
        let mut records = data.matching(&query.predicate);
        sort_records(&mut records, &query.order_by);

        let offset = usize::try_from(query.offset.max(0)).unwrap_or(usize::MAX);
        let limit = match query.limit {
            Some(limit) => usize::try_from(limit.max(0)).unwrap_or(usize::MAX),
            None => usize::MAX,
        };
        Ok(records
            .iter()
            .skip(offset)
            .take(limit)
            .flat_map(PolishView::to_rows)
            .collect())
    }

    async fn count(&self, predicate: &Predicate) -> StoreResult<i64> {
        let data = self.data.read().await;
        Ok(data.matching(predicate).len() as i64)
    }

    async fn facet_options(&self) -> StoreResult<FacetOptions> {
        let data = self.data.read().await;
        let mut purchase_years: Vec<i32> = data
            .polishes
            .values()
            .filter_map(|p| p.purchase_year)
            .collect();
        purchase_years.sort_unstable_by(|a, b| b.cmp(a));
        purchase_years.dedup();

        Ok(FacetOptions {
            brands: data.names(LookupKind::Brand),
            colors: data.names(LookupKind::Color),
            finishes: data.names(LookupKind::Finish),
            ratings: Rating::ALL.to_vec(),
            purchase_years,
        })
    }

    async fn get_polish(&self, id: DbId) -> StoreResult<Option<PolishView>> {
        let data = self.data.read().await;
        Ok(data.polishes.get(&id).map(|p| data.view(p)))
    }

    async fn create_polish(&self, input: &PolishInput) -> StoreResult<DbId> {
        let mut data = self.data.write().await;
        let brand_id = data.upsert_lookup(LookupKind::Brand, &input.brand).id;
        data.ensure_unique_polish(brand_id, &input.name, None)?;
        let color_ids = data.upsert_all(LookupKind::Color, &input.colors);
        let finish_ids = data.upsert_all(LookupKind::Finish, &input.finishes);

        let id = data.next_id();
        data.polishes.insert(
            id,
            StoredPolish {
                id,
                brand_id,
                name: input.name.clone(),
                color_ids,
                finish_ids,
                link: input.link.clone(),
                image_url: input.image_url.clone(),
                rating: input.rating,
                coats: input.coats,
                notes: input.notes.clone(),
                last_used: input.last_used,
                total_bottles: input.total_bottles,
                empty_bottles: input.empty_bottles,
                is_old: input.is_old,
                purchase_year: input.purchase_year,
                updated_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn replace_polish(&self, id: DbId, input: &PolishInput) -> StoreResult<bool> {
        let mut data = self.data.write().await;
        if !data.polishes.contains_key(&id) {
            return Ok(false);
        }
        let brand_id = data.upsert_lookup(LookupKind::Brand, &input.brand).id;
        data.ensure_unique_polish(brand_id, &input.name, Some(id))?;
        let color_ids = data.upsert_all(LookupKind::Color, &input.colors);
        let finish_ids = data.upsert_all(LookupKind::Finish, &input.finishes);

        let Some(polish) = data.polishes.get_mut(&id) else {
            return Ok(false);
        };
        polish.brand_id = brand_id;
        polish.name = input.name.clone();
        polish.color_ids = color_ids;
        polish.finish_ids = finish_ids;
        polish.link = input.link.clone();
        polish.rating = input.rating;
        polish.coats = input.coats;
        polish.notes = input.notes.clone();
        polish.last_used = input.last_used;
        polish.total_bottles = input.total_bottles;
        polish.empty_bottles = input.empty_bottles;
        polish.is_old = input.is_old;
        polish.purchase_year = input.purchase_year;
        polish.updated_at = Utc::now();
        Ok(true)
    }

    async fn update_attributes(&self, id: DbId, attrs: &PolishAttributes) -> StoreResult<bool> {
        let mut data = self.data.write().await;
        let Some(polish) = data.polishes.get_mut(&id) else {
            return Ok(false);
        };
        if attrs.rating.is_some() {
            polish.rating = attrs.rating;
        }
        if attrs.coats.is_some() {
            polish.coats = attrs.coats;
        }
        if attrs.notes.is_some() {
            polish.notes = attrs.notes.clone();
        }
        if attrs.last_used.is_some() {
            polish.last_used = attrs.last_used;
        }
        if attrs.total_bottles.is_some() {
            polish.total_bottles = attrs.total_bottles;
        }
        if attrs.empty_bottles.is_some() {
            polish.empty_bottles = attrs.empty_bottles;
        }
        if attrs.is_old.is_some() {
            polish.is_old = attrs.is_old;
        }
        if attrs.link.is_some() {
            polish.link = attrs.link.clone();
        }
        if attrs.purchase_year.is_some() {
            polish.purchase_year = attrs.purchase_year;
        }
        polish.updated_at = Utc::now();
        Ok(true)
    }

    async fn set_image(
        &self,
        id: DbId,
        image_url: Option<&str>,
    ) -> StoreResult<Option<Option<String>>> {
        let mut data = self.data.write().await;
        let Some(polish) = data.polishes.get_mut(&id) else {
            return Ok(None);
        };
        let previous = std::mem::replace(&mut polish.image_url, image_url.map(str::to_string));
        polish.updated_at = Utc::now();
        Ok(Some(previous))
    }

    async fn delete_polish(&self, id: DbId) -> StoreResult<Option<Option<String>>> {
        let mut data = self.data.write().await;
        Ok(data.polishes.remove(&id).map(|p| p.image_url))
    }

    async fn list_lookups(&self, kind: LookupKind) -> StoreResult<Vec<LookupWithUsage>> {
        let data = self.data.read().await;
        let mut lookups: Vec<LookupWithUsage> = data
            .lookup_table(kind)
            .map(|t| {
                t.values()
                    .map(|l| LookupWithUsage {
                        lookup: l.clone(),
                        polish_count: data.references(kind, l.id),
                    })
                    .collect()
            })
            .unwrap_or_default();
        lookups.sort_by(|a, b| a.lookup.name.cmp(&b.lookup.name));
        Ok(lookups)
    }

    async fn find_lookup(&self, kind: LookupKind, id: DbId) -> StoreResult<Option<Lookup>> {
        let data = self.data.read().await;
        Ok(data.lookup_table(kind).and_then(|t| t.get(&id)).cloned())
    }

    async fn upsert_lookup(&self, kind: LookupKind, name: &str) -> StoreResult<Lookup> {
        let mut data = self.data.write().await;
        Ok(data.upsert_lookup(kind, name))
    }

    async fn rename_lookup(
        &self,
        kind: LookupKind,
        id: DbId,
        name: &str,
    ) -> StoreResult<Option<Lookup>> {
        let mut data = self.data.write().await;
        let table = data.lookups.entry(kind).or_default();
        if table.values().any(|l| l.name == name && l.id != id) {
            return Err(CoreError::Conflict(format!(
                "{} '{name}' already exists",
                kind.label()
            ))
            .into());
        }
        Ok(table.get_mut(&id).map(|lookup| {
            lookup.name = name.to_string();
            lookup.updated_at = Utc::now();
            lookup.clone()
        }))
    }

    async fn count_references(&self, kind: LookupKind, id: DbId) -> StoreResult<i64> {
        let data = self.data.read().await;
        Ok(data.references(kind, id))
    }

    async fn delete_lookup(&self, kind: LookupKind, id: DbId) -> StoreResult<bool> {
        let mut data = self.data.write().await;
        // Same outcome as the RESTRICT foreign keys in PostgreSQL.
        if data.references(kind, id) > 0 {
            return Err(CoreError::Conflict(format!(
                "{} {id} is referenced by existing polishes",
                kind.label()
            ))
            .into());
        }
        Ok(data
            .lookups
            .get_mut(&kind)
            .and_then(|t| t.remove(&id))
            .is_some())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
