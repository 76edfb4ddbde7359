//! Fixed in-memory `MenuRepository` for the demo CLI — one small catalog
//! that exercises the scenarios the pipeline is built around: a plain add,
//! an unavailable item, an ambiguous name shared by two items, and a
//! modifier that isn't actually on the item the customer thinks it's on.

use async_trait::async_trait;
use rust_decimal_macros::dec;

use sa_domain::error::Result;
use sa_domain::ports::MenuRepository;
use sa_domain::types::{Ingredient, Inventory, MenuItem, MenuItemIngredient};

pub struct StaticMenuRepository;

fn items(restaurant_id: i64) -> Vec<MenuItem> {
    vec![
        MenuItem {
            id: "quantum-burger".into(),
            restaurant_id,
            name: "Quantum Burger".into(),
            category: "Burgers".into(),
            price: dec!(6.99),
            is_available: true,
            tags: vec![],
        },
        MenuItem {
            id: "quantum-cheeseburger".into(),
            restaurant_id,
            name: "Quantum Cheeseburger".into(),
            category: "Burgers".into(),
            price: dec!(7.49),
            is_available: true,
            tags: vec![],
        },
        MenuItem {
            id: "nebula-wrap".into(),
            restaurant_id,
            name: "Nebula Wrap".into(),
            category: "Wraps".into(),
            price: dec!(6.49),
            is_available: true,
            tags: vec![],
        },
        MenuItem {
            id: "french-fries".into(),
            restaurant_id,
            name: "French Fries".into(),
            category: "Sides".into(),
            price: dec!(2.99),
            is_available: true,
            tags: vec![],
        },
        MenuItem {
            id: "galactic-fries".into(),
            restaurant_id,
            name: "Galactic Fries".into(),
            category: "Sides".into(),
            price: dec!(3.99),
            is_available: true,
            tags: vec![],
        },
    ]
}

fn ingredients(restaurant_id: i64) -> Vec<Ingredient> {
    let plain = |id: &str, name: &str| Ingredient {
        id: id.into(),
        restaurant_id,
        name: name.into(),
        unit_cost: dec!(0.20),
        is_allergen: false,
        allergen_type: None,
    };
    vec![
        plain("beef-patty", "beef patty"),
        plain("bun", "bun"),
        plain("cheese", "cheese"),
        plain("lettuce", "lettuce"),
        plain("tomato", "tomato"),
        plain("tortilla", "tortilla"),
        plain("fries-potato", "potato"),
        plain("fries-seasoning", "seasoning"),
        // On the catalog so the LLM can name it, never linked to a menu
        // item — exercises the "remove a modifier that isn't there" path.
        plain("foie-gras", "foie gras"),
    ]
}

fn link(menu_item_id: &str, ingredient_id: &str) -> MenuItemIngredient {
    MenuItemIngredient {
        menu_item_id: menu_item_id.into(),
        ingredient_id: ingredient_id.into(),
        quantity: dec!(1),
        unit: "unit".into(),
        is_optional: true,
        additional_cost: dec!(0),
    }
}

fn menu_item_ingredients(menu_item_id: &str) -> Vec<MenuItemIngredient> {
    match menu_item_id {
        "quantum-burger" => {
            vec![link(menu_item_id, "beef-patty"), link(menu_item_id, "bun"), link(menu_item_id, "lettuce"), link(menu_item_id, "tomato")]
        }
        "quantum-cheeseburger" => vec![
            link(menu_item_id, "beef-patty"),
            link(menu_item_id, "bun"),
            link(menu_item_id, "cheese"),
            link(menu_item_id, "lettuce"),
            link(menu_item_id, "tomato"),
        ],
        "nebula-wrap" => vec![link(menu_item_id, "tortilla"), link(menu_item_id, "lettuce"), link(menu_item_id, "tomato")],
        "french-fries" | "galactic-fries" => vec![link(menu_item_id, "fries-potato"), link(menu_item_id, "fries-seasoning")],
        _ => vec![],
    }
}

#[async_trait]
impl MenuRepository for StaticMenuRepository {
    async fn get_menu_items(&self, restaurant_id: i64) -> Result<Vec<MenuItem>> {
        Ok(items(restaurant_id))
    }

    async fn get_ingredients(&self, restaurant_id: i64) -> Result<Vec<Ingredient>> {
        Ok(ingredients(restaurant_id))
    }

    async fn get_inventory(&self, restaurant_id: i64) -> Result<Vec<Inventory>> {
        Ok(ingredients(restaurant_id)
            .into_iter()
            .map(|ingredient| Inventory {
                ingredient_id: ingredient.id,
                current_stock: dec!(100),
                min_stock: dec!(10),
                is_low_stock: false,
            })
            .collect())
    }

    async fn get_categories(&self, _restaurant_id: i64) -> Result<Vec<String>> {
        Ok(vec!["Burgers".into(), "Wraps".into(), "Sides".into()])
    }

    async fn get_menu_item_ingredients(&self, menu_item_id: &str) -> Result<Vec<MenuItemIngredient>> {
        Ok(menu_item_ingredients(menu_item_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn quantum_burger_has_no_foie_gras_linked() {
        let repo = StaticMenuRepository;
        let links = repo.get_menu_item_ingredients("quantum-burger").await.unwrap();
        assert!(!links.iter().any(|l| l.ingredient_id == "foie-gras"));
        let ingredients = repo.get_ingredients(1).await.unwrap();
        assert!(ingredients.iter().any(|i| i.id == "foie-gras"), "foie gras should still exist on the catalog");
    }

    #[tokio::test]
    async fn fries_are_two_distinct_available_items() {
        let repo = StaticMenuRepository;
        let items = repo.get_menu_items(1).await.unwrap();
        let fries: Vec<_> = items.iter().filter(|i| i.name.contains("Fries")).collect();
        assert_eq!(fries.len(), 2);
        assert!(fries.iter().all(|i| i.is_available));
    }
}
