//! Menu Read Model (C1): public, side-effect-free (beyond cache
//! repopulation) operations over the restaurant catalog.

use std::sync::Arc;
use std::time::Duration;

use sa_domain::ports::{Clock, MenuRepository};
use sa_domain::types::{Ingredient, Inventory, MenuItem, MenuItemIngredient};

use crate::normalize::{normalize, tokenize};
use crate::source::{CachedSource, DirectSource, FallbackSource, MenuSource};

type Source = FallbackSource<CachedSource<DirectSource>, DirectSource>;

pub struct MenuReadModel {
    source: Source,
}

const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

impl MenuReadModel {
    pub fn new(repo: Arc<dyn MenuRepository>, clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(repo, clock, DEFAULT_CACHE_TTL)
    }

    pub fn with_ttl(repo: Arc<dyn MenuRepository>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        let cached = CachedSource::new(DirectSource::new(repo.clone()), clock, ttl);
        let direct = DirectSource::new(repo);
        Self {
            source: FallbackSource::new(cached, direct),
        }
    }

    /// All menu items for a restaurant regardless of availability. Never
    /// raises; returns `[]` on any underlying failure.
    pub async fn all_items(&self, restaurant_id: i64) -> Vec<MenuItem> {
        match self.source.get_menu_items(restaurant_id).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(error = %e, restaurant_id, "menu read failed");
                Vec::new()
            }
        }
    }

    /// All available menu items for a restaurant. Never raises; returns
    /// `[]` on any underlying failure.
    pub async fn available_items(&self, restaurant_id: i64) -> Vec<MenuItem> {
        self.all_items(restaurant_id)
            .await
            .into_iter()
            .filter(|i| i.is_available)
            .collect()
    }

    /// Look up an item by id regardless of availability, so callers can
    /// distinguish "doesn't exist" from "exists but unavailable".
    pub async fn item_by_id(&self, restaurant_id: i64, menu_item_id: &str) -> Option<MenuItem> {
        self.all_items(restaurant_id)
            .await
            .into_iter()
            .find(|i| i.id == menu_item_id)
    }

    /// Normalized, keyword-based, stopword-stripped, case-insensitive
    /// substring search against available item names. An exact normalized
    /// equality always wins over a token match.
    pub async fn search(&self, restaurant_id: i64, query: &str) -> Vec<MenuItem> {
        let items = self.available_items(restaurant_id).await;
        let normalized_query = normalize(query);
        if normalized_query.is_empty() {
            return Vec::new();
        }

        if let Some(exact) = items
            .iter()
            .find(|i| normalize(&i.name) == normalized_query)
        {
            return vec![exact.clone()];
        }

        let query_tokens = tokenize(&normalized_query);
        if query_tokens.is_empty() {
            return Vec::new();
        }

        items
            .into_iter()
            .filter(|item| {
                let item_norm = normalize(&item.name);
                query_tokens.iter().any(|t| item_norm.contains(t))
            })
            .collect()
    }

    /// Exact match on the item name after normalization.
    pub async fn item_by_name(&self, restaurant_id: i64, name: &str) -> Option<MenuItem> {
        let normalized_name = normalize(name);
        self.available_items(restaurant_id)
            .await
            .into_iter()
            .find(|i| normalize(&i.name) == normalized_name)
    }

    pub async fn ingredients_of(&self, menu_item_id: &str) -> Vec<MenuItemIngredient> {
        self.source
            .get_menu_item_ingredients(menu_item_id)
            .await
            .unwrap_or_default()
    }

    pub async fn all_ingredients_with_costs(&self, restaurant_id: i64) -> Vec<Ingredient> {
        self.source.get_ingredients(restaurant_id).await.unwrap_or_default()
    }

    pub async fn inventory(&self, restaurant_id: i64) -> Vec<Inventory> {
        self.source.get_inventory(restaurant_id).await.unwrap_or_default()
    }

    pub async fn categories(&self, restaurant_id: i64) -> Vec<String> {
        self.source.get_categories(restaurant_id).await.unwrap_or_default()
    }

    pub async fn items_by_category(&self, restaurant_id: i64, category: &str) -> Vec<MenuItem> {
        self.available_items(restaurant_id)
            .await
            .into_iter()
            .filter(|i| i.category.eq_ignore_ascii_case(category))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sa_domain::error::Result;
    use sa_domain::ports::SystemClock;
    use rust_decimal_macros::dec;

    struct FakeRepo {
        items: Vec<MenuItem>,
    }

    #[async_trait]
    impl MenuRepository for FakeRepo {
        async fn get_menu_items(&self, _restaurant_id: i64) -> Result<Vec<MenuItem>> {
            Ok(self.items.clone())
        }
        async fn get_ingredients(&self, _restaurant_id: i64) -> Result<Vec<Ingredient>> {
            Ok(vec![])
        }
        async fn get_inventory(&self, _restaurant_id: i64) -> Result<Vec<Inventory>> {
            Ok(vec![])
        }
        async fn get_categories(&self, _restaurant_id: i64) -> Result<Vec<String>> {
            Ok(vec![])
        }
        async fn get_menu_item_ingredients(&self, _menu_item_id: &str) -> Result<Vec<MenuItemIngredient>> {
            Ok(vec![])
        }
    }

    fn item(id: &str, name: &str, available: bool) -> MenuItem {
        MenuItem {
            id: id.into(),
            restaurant_id: 1,
            name: name.into(),
            category: "mains".into(),
            price: dec!(9.99),
            is_available: available,
            tags: vec![],
        }
    }

    fn model(items: Vec<MenuItem>) -> MenuReadModel {
        MenuReadModel::new(Arc::new(FakeRepo { items }), Arc::new(SystemClock))
    }

    #[tokio::test]
    async fn search_empty_query_returns_empty() {
        let m = model(vec![item("1", "Quantum Burger", true)]);
        assert!(m.search(1, "").await.is_empty());
    }

    #[tokio::test]
    async fn search_excludes_unavailable_items() {
        let m = model(vec![item("1", "Quantum Burger", false)]);
        assert!(m.search(1, "quantum").await.is_empty());
    }

    #[tokio::test]
    async fn search_finds_available_item_by_token() {
        let m = model(vec![item("1", "Quantum Burger", true)]);
        let hits = m.search(1, "give me a quantum burger please").await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "1");
    }

    #[tokio::test]
    async fn search_exact_match_wins_over_substring_match() {
        let m = model(vec![
            item("1", "Fries", true),
            item("2", "French Fries", true),
        ]);
        let hits = m.search(1, "fries").await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "1");
    }

    #[tokio::test]
    async fn search_ambiguous_returns_multiple_hits() {
        let m = model(vec![
            item("1", "French Fries", true),
            item("2", "Galactic Fries", true),
        ]);
        let hits = m.search(1, "fries").await;
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn item_by_name_exact_match_after_normalization() {
        let m = model(vec![item("1", "Quantum Burger", true)]);
        let found = m.item_by_name(1, "  QUANTUM   burger!! ").await;
        assert_eq!(found.unwrap().id, "1");
    }
}
