//! `MenuSource` combinator (§9 Design Notes): the Python original's
//! "optional cache, fall through on any failure" pattern modeled as two
//! implementations — cached and direct — composed by a try-cached-then-
//! direct combinator that never surfaces cache errors upward.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use sa_domain::error::Result;
use sa_domain::ports::{Clock, MenuRepository};
use sa_domain::types::{Ingredient, Inventory, MenuItem, MenuItemIngredient};

#[async_trait]
pub trait MenuSource: Send + Sync {
    async fn get_menu_items(&self, restaurant_id: i64) -> Result<Vec<MenuItem>>;
    async fn get_ingredients(&self, restaurant_id: i64) -> Result<Vec<Ingredient>>;
    async fn get_inventory(&self, restaurant_id: i64) -> Result<Vec<Inventory>>;
    async fn get_categories(&self, restaurant_id: i64) -> Result<Vec<String>>;
    async fn get_menu_item_ingredients(&self, menu_item_id: &str) -> Result<Vec<MenuItemIngredient>>;
}

/// Reads straight through to the durable `MenuRepository` port.
pub struct DirectSource {
    repo: Arc<dyn MenuRepository>,
}

impl DirectSource {
    pub fn new(repo: Arc<dyn MenuRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl MenuSource for DirectSource {
    async fn get_menu_items(&self, restaurant_id: i64) -> Result<Vec<MenuItem>> {
        self.repo.get_menu_items(restaurant_id).await
    }
    async fn get_ingredients(&self, restaurant_id: i64) -> Result<Vec<Ingredient>> {
        self.repo.get_ingredients(restaurant_id).await
    }
    async fn get_inventory(&self, restaurant_id: i64) -> Result<Vec<Inventory>> {
        self.repo.get_inventory(restaurant_id).await
    }
    async fn get_categories(&self, restaurant_id: i64) -> Result<Vec<String>> {
        self.repo.get_categories(restaurant_id).await
    }
    async fn get_menu_item_ingredients(&self, menu_item_id: &str) -> Result<Vec<MenuItemIngredient>> {
        self.repo.get_menu_item_ingredients(menu_item_id).await
    }
}

struct CacheEntry<T> {
    value: T,
    expires_at: DateTime<Utc>,
}

/// Wraps an inner `MenuSource` with a single-writer, per-restaurant TTL
/// cache. Stampede-avoidance via single-flight is not implemented — the
/// spec recommends it but does not require it for a read-mostly catalog.
pub struct CachedSource<S: MenuSource> {
    inner: S,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    menu_items: RwLock<HashMap<i64, CacheEntry<Vec<MenuItem>>>>,
    ingredients: RwLock<HashMap<i64, CacheEntry<Vec<Ingredient>>>>,
    inventory: RwLock<HashMap<i64, CacheEntry<Vec<Inventory>>>>,
    categories: RwLock<HashMap<i64, CacheEntry<Vec<String>>>>,
    item_ingredients: RwLock<HashMap<String, CacheEntry<Vec<MenuItemIngredient>>>>,
}

impl<S: MenuSource> CachedSource<S> {
    pub fn new(inner: S, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            inner,
            clock,
            ttl,
            menu_items: RwLock::new(HashMap::new()),
            ingredients: RwLock::new(HashMap::new()),
            inventory: RwLock::new(HashMap::new()),
            categories: RwLock::new(HashMap::new()),
            item_ingredients: RwLock::new(HashMap::new()),
        }
    }

    fn fresh<K: Clone + Eq + std::hash::Hash, V: Clone>(
        &self,
        map: &RwLock<HashMap<K, CacheEntry<V>>>,
        key: &K,
    ) -> Option<V> {
        let now = self.clock.now();
        map.read()
            .get(key)
            .filter(|e| e.expires_at > now)
            .map(|e| e.value.clone())
    }

    fn store<K: Clone + Eq + std::hash::Hash, V: Clone>(
        &self,
        map: &RwLock<HashMap<K, CacheEntry<V>>>,
        key: K,
        value: V,
    ) {
        let expires_at = self.clock.now()
            + chrono::Duration::from_std(self.ttl).unwrap_or_else(|_| chrono::Duration::seconds(0));
        map.write().insert(key, CacheEntry { value, expires_at });
    }
}

#[async_trait]
impl<S: MenuSource> MenuSource for CachedSource<S> {
    async fn get_menu_items(&self, restaurant_id: i64) -> Result<Vec<MenuItem>> {
        if let Some(v) = self.fresh(&self.menu_items, &restaurant_id) {
            tracing::debug!(restaurant_id, "menu cache hit: menu_items");
            return Ok(v);
        }
        tracing::debug!(restaurant_id, "menu cache miss: menu_items");
        let v = self.inner.get_menu_items(restaurant_id).await?;
        self.store(&self.menu_items, restaurant_id, v.clone());
        Ok(v)
    }

    async fn get_ingredients(&self, restaurant_id: i64) -> Result<Vec<Ingredient>> {
        if let Some(v) = self.fresh(&self.ingredients, &restaurant_id) {
            return Ok(v);
        }
        let v = self.inner.get_ingredients(restaurant_id).await?;
        self.store(&self.ingredients, restaurant_id, v.clone());
        Ok(v)
    }

    async fn get_inventory(&self, restaurant_id: i64) -> Result<Vec<Inventory>> {
        if let Some(v) = self.fresh(&self.inventory, &restaurant_id) {
            return Ok(v);
        }
        let v = self.inner.get_inventory(restaurant_id).await?;
        self.store(&self.inventory, restaurant_id, v.clone());
        Ok(v)
    }

    async fn get_categories(&self, restaurant_id: i64) -> Result<Vec<String>> {
        if let Some(v) = self.fresh(&self.categories, &restaurant_id) {
            return Ok(v);
        }
        let v = self.inner.get_categories(restaurant_id).await?;
        self.store(&self.categories, restaurant_id, v.clone());
        Ok(v)
    }

    async fn get_menu_item_ingredients(&self, menu_item_id: &str) -> Result<Vec<MenuItemIngredient>> {
        let key = menu_item_id.to_owned();
        if let Some(v) = self.fresh(&self.item_ingredients, &key) {
            return Ok(v);
        }
        let v = self.inner.get_menu_item_ingredients(menu_item_id).await?;
        self.store(&self.item_ingredients, key, v.clone());
        Ok(v)
    }
}

/// Tries `primary` (the cache) first; on *any* error from `primary`, falls
/// through to `secondary` (the direct source) instead of propagating. This
/// is the "never surfaces cache errors" half of the combinator — `CachedSource`
/// itself only returns an error when its inner direct source does, so in
/// practice this guards against a cache implementation that can fail
/// independently (e.g. a future out-of-process cache).
pub struct FallbackSource<P: MenuSource, D: MenuSource> {
    primary: P,
    secondary: D,
}

impl<P: MenuSource, D: MenuSource> FallbackSource<P, D> {
    pub fn new(primary: P, secondary: D) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait]
impl<P: MenuSource, D: MenuSource> MenuSource for FallbackSource<P, D> {
    async fn get_menu_items(&self, restaurant_id: i64) -> Result<Vec<MenuItem>> {
        match self.primary.get_menu_items(restaurant_id).await {
            Ok(v) => Ok(v),
            Err(e) => {
                tracing::warn!(error = %e, "menu cache source failed, falling through to direct");
                self.secondary.get_menu_items(restaurant_id).await
            }
        }
    }

    async fn get_ingredients(&self, restaurant_id: i64) -> Result<Vec<Ingredient>> {
        match self.primary.get_ingredients(restaurant_id).await {
            Ok(v) => Ok(v),
            Err(e) => {
                tracing::warn!(error = %e, "menu cache source failed, falling through to direct");
                self.secondary.get_ingredients(restaurant_id).await
            }
        }
    }

    async fn get_inventory(&self, restaurant_id: i64) -> Result<Vec<Inventory>> {
        match self.primary.get_inventory(restaurant_id).await {
            Ok(v) => Ok(v),
            Err(e) => {
                tracing::warn!(error = %e, "menu cache source failed, falling through to direct");
                self.secondary.get_inventory(restaurant_id).await
            }
        }
    }

    async fn get_categories(&self, restaurant_id: i64) -> Result<Vec<String>> {
        match self.primary.get_categories(restaurant_id).await {
            Ok(v) => Ok(v),
            Err(e) => {
                tracing::warn!(error = %e, "menu cache source failed, falling through to direct");
                self.secondary.get_categories(restaurant_id).await
            }
        }
    }

    async fn get_menu_item_ingredients(&self, menu_item_id: &str) -> Result<Vec<MenuItemIngredient>> {
        match self.primary.get_menu_item_ingredients(menu_item_id).await {
            Ok(v) => Ok(v),
            Err(e) => {
                tracing::warn!(error = %e, "menu cache source failed, falling through to direct");
                self.secondary.get_menu_item_ingredients(menu_item_id).await
            }
        }
    }
}
