//! Customization Validator: classifies and validates "no X" / "extra X"
//! style modifiers, and the eager `MODIFY_ITEM` conflict check (§9
//! Decision — MODIFY_ITEM conflicting changes).

use rust_decimal::Decimal;
use sa_domain::config::UnknownIngredientPolicy;
use sa_domain::error::ErrorCode;
use sa_domain::types::{Ingredient, MenuItemIngredient, ModifyChanges};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierKind {
    Add,
    Remove,
}

/// Split a free-text modifier like `"no foie gras"` or `"extra cheese"`
/// into its kind and the bare ingredient name. Defaults to `Add` when no
/// recognized prefix is present.
pub fn classify_modifier(raw: &str) -> (ModifierKind, String) {
    let lower = raw.trim().to_lowercase();
    for prefix in ["no ", "remove ", "without "] {
        if let Some(rest) = lower.strip_prefix(prefix) {
            return (ModifierKind::Remove, rest.trim().to_string());
        }
    }
    for prefix in ["extra ", "add ", "with extra ", "more "] {
        if let Some(rest) = lower.strip_prefix(prefix) {
            return (ModifierKind::Add, rest.trim().to_string());
        }
    }
    (ModifierKind::Add, lower)
}

pub fn normalize_ingredient_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Outcome of validating one "remove X" or "add X" modifier.
pub enum ModifierOutcome {
    /// Valid; the modifier string to record and the extra cost to add
    /// (zero for removals).
    Valid { modifier_text: String, extra_cost: Decimal },
    /// Hard failure — always an error, never configurable.
    Error(ErrorCode, String),
    /// Soft failure — becomes a warning or an error depending on
    /// `unknown_ingredient_policy`.
    UnknownIngredient(ErrorCode, String),
}

/// Validate a "remove X" modifier: valid iff X is an ingredient of the
/// menu item via `MenuItemIngredient`.
pub fn validate_remove(
    ingredient_name: &str,
    item_ingredients: &[MenuItemIngredient],
    ingredients: &[Ingredient],
) -> ModifierOutcome {
    let normalized = normalize_ingredient_name(ingredient_name);
    let found = item_ingredients.iter().find_map(|mi| {
        ingredients
            .iter()
            .find(|ing| ing.id == mi.ingredient_id && normalize_ingredient_name(&ing.name) == normalized)
    });
    match found {
        Some(ing) => ModifierOutcome::Valid {
            modifier_text: format!("no {}", ing.name),
            extra_cost: Decimal::ZERO,
        },
        None => ModifierOutcome::Error(
            ErrorCode::ModifierRemoveNotPresent,
            format!("{ingredient_name} is not an ingredient of this item"),
        ),
    }
}

/// Validate an "add/extra X" modifier: valid iff X exists as an ingredient
/// in the restaurant's ingredient list. Extra cost is taken from the
/// item's association cost when already present (an upgrade), otherwise
/// from the ingredient's base unit cost.
pub fn validate_add(
    ingredient_name: &str,
    item_ingredients: &[MenuItemIngredient],
    ingredients: &[Ingredient],
) -> ModifierOutcome {
    let normalized = normalize_ingredient_name(ingredient_name);
    let Some(ingredient) = ingredients
        .iter()
        .find(|ing| normalize_ingredient_name(&ing.name) == normalized)
    else {
        return ModifierOutcome::UnknownIngredient(
            ErrorCode::ModifierAddNotAllowed,
            format!("{ingredient_name} is not a known ingredient"),
        );
    };

    let extra_cost = item_ingredients
        .iter()
        .find(|mi| mi.ingredient_id == ingredient.id)
        .map(|mi| mi.additional_cost)
        .unwrap_or(ingredient.unit_cost);

    ModifierOutcome::Valid {
        modifier_text: format!("extra {}", ingredient.name),
        extra_cost,
    }
}

pub fn unknown_ingredient_result(
    policy: UnknownIngredientPolicy,
    code: ErrorCode,
    message: String,
) -> (bool, ErrorCode, String) {
    // (is_hard_error, code, message)
    match policy {
        UnknownIngredientPolicy::Warn => (false, code, message),
        UnknownIngredientPolicy::Reject => (true, code, message),
    }
}

/// Eagerly reject a `MODIFY_ITEM` change-set, before any mutation, when it
/// names contradictory operations on the same ingredient or the same field.
pub fn detect_conflict(changes: &ModifyChanges) -> Option<String> {
    if let (Some(add), Some(remove)) = (&changes.add_modifier, &changes.remove_modifier) {
        if normalize_ingredient_name(add) == normalize_ingredient_name(remove) {
            return Some(format!(
                "cannot both add and remove {} in the same change",
                add.trim()
            ));
        }
    }
    if changes.set_special_instructions.is_some() && changes.clear_special_instructions {
        return Some("cannot both set and clear special instructions".to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_modifier_detects_remove_prefixes() {
        assert_eq!(
            classify_modifier("no foie gras"),
            (ModifierKind::Remove, "foie gras".to_string())
        );
        assert_eq!(
            classify_modifier("Remove Onions"),
            (ModifierKind::Remove, "onions".to_string())
        );
    }

    #[test]
    fn classify_modifier_detects_add_prefixes() {
        assert_eq!(
            classify_modifier("extra cheese"),
            (ModifierKind::Add, "cheese".to_string())
        );
    }

    #[test]
    fn classify_modifier_defaults_to_add() {
        assert_eq!(classify_modifier("bacon"), (ModifierKind::Add, "bacon".to_string()));
    }

    #[test]
    fn detect_conflict_flags_contradictory_modifier_changes() {
        let changes = ModifyChanges {
            add_modifier: Some("cheese".into()),
            remove_modifier: Some("Cheese".into()),
            ..Default::default()
        };
        assert!(detect_conflict(&changes).is_some());
    }

    #[test]
    fn detect_conflict_allows_distinct_ingredients() {
        let changes = ModifyChanges {
            add_modifier: Some("cheese".into()),
            remove_modifier: Some("onions".into()),
            ..Default::default()
        };
        assert!(detect_conflict(&changes).is_none());
    }

    #[test]
    fn detect_conflict_flags_special_instructions_contradiction() {
        let changes = ModifyChanges {
            set_special_instructions: Some("well done".into()),
            clear_special_instructions: true,
            ..Default::default()
        };
        assert!(detect_conflict(&changes).is_some());
    }

    #[test]
    fn validate_remove_rejects_ingredient_not_on_item() {
        let outcome = validate_remove("foie gras", &[], &[]);
        assert!(matches!(outcome, ModifierOutcome::Error(ErrorCode::ModifierRemoveNotPresent, _)));
    }
}
