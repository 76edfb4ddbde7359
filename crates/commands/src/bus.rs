//! Command Bus (C3): executes a validated command or a list of commands
//! against an order, applies invariants, categorizes every result.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sa_domain::config::PipelineConfig;
use sa_domain::error::ErrorCode;
use sa_domain::ports::{Clock, OrderStore};
use sa_domain::types::{
    Command, CommandBatchResult, CommandResult, ConversationState, ModifyChanges, OrderAggregate,
    OrderLine, OrderStatus, SessionContext, TargetRef,
};
use sa_menu::MenuReadModel;

use crate::outcome::build_batch_result;
use crate::validation::{
    classify_modifier, detect_conflict, unknown_ingredient_result, validate_add, validate_remove,
    ModifierKind, ModifierOutcome,
};

pub struct CommandBus {
    menu: Arc<MenuReadModel>,
    orders: Arc<dyn OrderStore>,
    clock: Arc<dyn Clock>,
    pipeline: PipelineConfig,
    order_ttl: Duration,
}

impl CommandBus {
    pub fn new(
        menu: Arc<MenuReadModel>,
        orders: Arc<dyn OrderStore>,
        clock: Arc<dyn Clock>,
        pipeline: PipelineConfig,
        order_ttl: Duration,
    ) -> Self {
        Self {
            menu,
            orders,
            clock,
            pipeline,
            order_ttl,
        }
    }

    /// Execute every command in order, independently. A `SYSTEM` failure
    /// does not abort the batch — later commands still run — but flips
    /// `follow_up_action` to `STOP` via [`crate::outcome::derive_outcome`].
    /// The order is reloaded before each command so later commands observe
    /// earlier commands' committed effects.
    pub async fn execute(
        &self,
        commands: &[Command],
        order_id: &str,
        restaurant_id: i64,
        session: &SessionContext,
    ) -> CommandBatchResult {
        let mut results = Vec::with_capacity(commands.len());
        for command in commands {
            let result = self.execute_one(command, order_id, restaurant_id, session).await;
            tracing::info!(
                intent = ?command.intent(),
                status = ?result.status,
                "command executed"
            );
            results.push(result);
        }
        build_batch_result(commands, results)
    }

    async fn execute_one(
        &self,
        command: &Command,
        order_id: &str,
        restaurant_id: i64,
        session: &SessionContext,
    ) -> CommandResult {
        match self.try_execute_one(command, order_id, restaurant_id, session).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "command bus internal failure");
                CommandResult::system_error(ErrorCode::InternalError, e.to_string())
            }
        }
    }

    async fn load_order(&self, order_id: &str, session: &SessionContext) -> sa_domain::error::Result<OrderAggregate> {
        match self.orders.get(order_id).await? {
            Some(order) => Ok(order),
            None => Ok(OrderAggregate::new(
                order_id.to_string(),
                session.session_id.clone(),
                session.restaurant_id,
                self.clock.now(),
            )),
        }
    }

    async fn save_order(&self, order: &mut OrderAggregate) -> sa_domain::error::Result<()> {
        order.updated_at = self.clock.now();
        order.recompute_totals();
        self.orders.upsert(order, self.order_ttl).await
    }

    async fn try_execute_one(
        &self,
        command: &Command,
        order_id: &str,
        restaurant_id: i64,
        session: &SessionContext,
    ) -> sa_domain::error::Result<CommandResult> {
        match command {
            Command::AddItem {
                menu_item_id,
                item_name,
                quantity,
                size,
                modifiers,
                special_instructions,
            } => {
                self.add_item(
                    order_id,
                    restaurant_id,
                    session,
                    menu_item_id.as_deref(),
                    item_name,
                    *quantity,
                    size.clone(),
                    modifiers,
                    special_instructions.clone(),
                )
                .await
            }
            Command::RemoveItem { order_item_id, target_ref } => {
                self.remove_item(order_id, restaurant_id, session, order_item_id.as_deref(), target_ref.as_ref())
                    .await
            }
            Command::ModifyItem { order_item_id, changes } => {
                self.modify_item(order_id, restaurant_id, session, order_item_id, changes).await
            }
            Command::ClearOrder => self.clear_order(order_id, session).await,
            Command::ConfirmOrder => self.confirm_order(order_id, session).await,
            Command::Question { question, category } => Ok(CommandResult::success(question.clone())
                .with_data(serde_json::json!({ "category": category }))),
            Command::ClarificationNeeded {
                ambiguous_item,
                suggested_options,
                clarification_question,
            } => Ok(CommandResult::success(clarification_question.clone()).with_data(serde_json::json!({
                "ambiguous_item": ambiguous_item,
                "suggested_options": suggested_options,
            }))),
            Command::ItemUnavailable { requested_item, message } => {
                Ok(CommandResult::business_error(ErrorCode::ItemUnavailable, message.clone())
                    .with_data(serde_json::json!({ "requested_item": requested_item })))
            }
            Command::Unknown { user_input, clarifying_question } => {
                Ok(CommandResult::success(
                    clarifying_question.clone().unwrap_or_else(|| "Could you say that again?".to_string()),
                )
                .with_data(serde_json::json!({ "user_input": user_input })))
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn add_item(
        &self,
        order_id: &str,
        restaurant_id: i64,
        session: &SessionContext,
        menu_item_id: Option<&str>,
        item_name: &str,
        quantity: u32,
        size: Option<String>,
        modifiers: &[String],
        special_instructions: Option<String>,
    ) -> sa_domain::error::Result<CommandResult> {
        if quantity < 1 {
            return Ok(CommandResult::validation_error("quantity must be at least 1"));
        }
        if quantity > self.pipeline.max_quantity_per_item {
            return Ok(CommandResult::business_error(
                ErrorCode::QuantityExceedsLimit,
                format!("at most {} of an item per order", self.pipeline.max_quantity_per_item),
            ));
        }

        let item = match menu_item_id {
            Some(id) => self.menu.item_by_id(restaurant_id, id).await,
            None => self.menu.item_by_name(restaurant_id, item_name).await,
        };
        let Some(item) = item else {
            return Ok(CommandResult::business_error(
                ErrorCode::ItemNotFound,
                format!("{item_name} is not on the menu"),
            ));
        };
        if !item.is_available {
            return Ok(CommandResult::business_error(
                ErrorCode::ItemUnavailable,
                format!("{} is currently unavailable", item.name),
            ));
        }

        let item_ingredients = self.menu.ingredients_of(&item.id).await;
        let all_ingredients = self.menu.all_ingredients_with_costs(restaurant_id).await;

        let mut resolved_modifiers = Vec::new();
        let mut extra_cost = Decimal::ZERO;
        let mut warning: Option<CommandResult> = None;

        if self.pipeline.enable_customization_validation {
            for raw in modifiers {
                let (kind, ingredient_name) = classify_modifier(raw);
                let outcome = match kind {
                    ModifierKind::Remove => validate_remove(&ingredient_name, &item_ingredients, &all_ingredients),
                    ModifierKind::Add => validate_add(&ingredient_name, &item_ingredients, &all_ingredients),
                };
                match outcome {
                    ModifierOutcome::Valid { modifier_text, extra_cost: c } => {
                        if !resolved_modifiers.contains(&modifier_text) {
                            resolved_modifiers.push(modifier_text);
                        }
                        extra_cost += c;
                    }
                    ModifierOutcome::Error(code, message) => {
                        return Ok(CommandResult::business_error(code, message));
                    }
                    ModifierOutcome::UnknownIngredient(code, message) => {
                        let (is_hard, code, message) =
                            unknown_ingredient_result(self.pipeline.unknown_ingredient_policy, code, message);
                        if is_hard {
                            return Ok(CommandResult::business_error(code, message));
                        }
                        warning = Some(CommandResult::business_warning(code, message));
                    }
                }
            }
        } else {
            resolved_modifiers = modifiers.to_vec();
        }

        if self.pipeline.enable_inventory_checking && !self.pipeline.allow_negative_inventory {
            let inventory = self.menu.inventory(restaurant_id).await;
            for mi in &item_ingredients {
                if let Some(inv) = inventory.iter().find(|i| i.ingredient_id == mi.ingredient_id) {
                    if inv.current_stock < mi.quantity * Decimal::from(quantity) {
                        return Ok(CommandResult::business_error(
                            ErrorCode::InventoryShortage,
                            format!("not enough stock for {}", item.name),
                        ));
                    }
                }
            }
        }

        let mut order = self.load_order(order_id, session).await?;

        if self.pipeline.enable_order_limits {
            if order.items.len() + 1 > self.pipeline.max_items_per_order {
                return Ok(CommandResult::business_error(
                    ErrorCode::QuantityExceedsLimit,
                    format!("an order can have at most {} items", self.pipeline.max_items_per_order),
                ));
            }
        }

        let mut line = OrderLine {
            line_id: uuid::Uuid::new_v4().to_string(),
            menu_item_id: item.id.clone(),
            quantity,
            size,
            modifiers: resolved_modifiers,
            special_instructions,
            unit_price: item.price,
            extra_cost,
            total_price: Decimal::ZERO,
        };
        line.reprice();

        let projected_total = order.items.iter().map(|l| l.total_price).sum::<Decimal>() + line.total_price;
        if self.pipeline.enable_order_limits && projected_total > self.pipeline.max_order_total {
            return Ok(CommandResult::business_error(
                ErrorCode::QuantityExceedsLimit,
                format!("order total would exceed the {} limit", self.pipeline.max_order_total),
            ));
        }

        let line_id = line.line_id.clone();
        order.items.push(line);
        self.save_order(&mut order).await?;

        if let Some(mut w) = warning {
            w.data = Some(serde_json::json!({ "line_id": line_id, "menu_item_id": item.id }));
            return Ok(w);
        }

        Ok(CommandResult::success(format!("added {item_name}"))
            .with_data(serde_json::json!({ "line_id": line_id, "menu_item_id": item.id })))
    }

    async fn remove_item(
        &self,
        order_id: &str,
        restaurant_id: i64,
        session: &SessionContext,
        order_item_id: Option<&str>,
        target_ref: Option<&TargetRef>,
    ) -> sa_domain::error::Result<CommandResult> {
        let mut order = self.load_order(order_id, session).await?;

        let resolved_line_id = if let Some(id) = order_item_id {
            order.items.iter().find(|l| l.line_id == id).map(|l| l.line_id.clone())
        } else {
            match target_ref {
                Some(TargetRef::LastItem) => order.items.last().map(|l| l.line_id.clone()),
                Some(TargetRef::Mentioned { expectation }) => order
                    .items
                    .iter()
                    .find(|l| &l.line_id == expectation)
                    .map(|l| l.line_id.clone()),
                Some(TargetRef::ByName { name }) => {
                    // `name` is the spoken item name, not a menu_item_id slug;
                    // resolve it through the menu the same way MODIFY_ITEM does.
                    let menu_item_id = self.menu.item_by_name(restaurant_id, name).await.map(|m| m.id);
                    menu_item_id
                        .and_then(|id| order.items.iter().find(|l| l.menu_item_id == id))
                        .map(|l| l.line_id.clone())
                }
                None => None,
            }
        };

        let Some(line_id) = resolved_line_id else {
            return Ok(CommandResult::business_error(
                ErrorCode::ItemNotFound,
                "couldn't find that item in the order",
            ));
        };

        order.items.retain(|l| l.line_id != line_id);
        self.save_order(&mut order).await?;
        Ok(CommandResult::success("removed item").with_data(serde_json::json!({ "line_id": line_id })))
    }

    async fn modify_item(
        &self,
        order_id: &str,
        restaurant_id: i64,
        session: &SessionContext,
        order_item_id: &str,
        changes: &ModifyChanges,
    ) -> sa_domain::error::Result<CommandResult> {
        if let Some(conflict) = detect_conflict(changes) {
            return Ok(CommandResult {
                status: sa_domain::types::ResultStatus::Error,
                message: conflict,
                data: None,
                error_category: Some(sa_domain::types::ErrorCategory::Validation),
                error_code: Some(ErrorCode::ModifierConflict),
            });
        }

        let mut order = self.load_order(order_id, session).await?;
        let Some(line_index) = order.items.iter().position(|l| l.line_id == order_item_id) else {
            return Ok(CommandResult::business_error(ErrorCode::ItemNotFound, "no such order line"));
        };

        let menu_item_id = order.items[line_index].menu_item_id.clone();
        let item_ingredients = self.menu.ingredients_of(&menu_item_id).await;
        let all_ingredients = self.menu.all_ingredients_with_costs(restaurant_id).await;

        let mut warning: Option<CommandResult> = None;

        if let Some(raw) = &changes.remove_modifier {
            match validate_remove(raw, &item_ingredients, &all_ingredients) {
                ModifierOutcome::Valid { modifier_text, .. } => {
                    let line = &mut order.items[line_index];
                    if !line.modifiers.contains(&modifier_text) {
                        line.modifiers.push(modifier_text);
                    }
                }
                ModifierOutcome::Error(code, message) => {
                    return Ok(CommandResult::business_error(code, message));
                }
                ModifierOutcome::UnknownIngredient(code, message) => {
                    return Ok(CommandResult::business_error(code, message));
                }
            }
        }

        if let Some(raw) = &changes.add_modifier {
            match validate_add(raw, &item_ingredients, &all_ingredients) {
                ModifierOutcome::Valid { modifier_text, extra_cost } => {
                    let line = &mut order.items[line_index];
                    if !line.modifiers.contains(&modifier_text) {
                        line.modifiers.push(modifier_text);
                        line.extra_cost += extra_cost;
                    }
                }
                ModifierOutcome::Error(code, message) => {
                    return Ok(CommandResult::business_error(code, message));
                }
                ModifierOutcome::UnknownIngredient(code, message) => {
                    let (is_hard, code, message) =
                        unknown_ingredient_result(self.pipeline.unknown_ingredient_policy, code, message);
                    if is_hard {
                        return Ok(CommandResult::business_error(code, message));
                    }
                    warning = Some(CommandResult::business_warning(code, message));
                }
            }
        }

        if let Some(size) = &changes.set_size {
            order.items[line_index].size = Some(size.clone());
        }
        if changes.clear_special_instructions {
            order.items[line_index].special_instructions = None;
        } else if let Some(instructions) = &changes.set_special_instructions {
            order.items[line_index].special_instructions = Some(instructions.clone());
        }
        if let Some(qty) = changes.set_quantity {
            if qty < 1 {
                return Ok(CommandResult::validation_error("quantity must be at least 1"));
            }
            if qty > self.pipeline.max_quantity_per_item {
                return Ok(CommandResult::business_error(
                    ErrorCode::QuantityExceedsLimit,
                    format!("at most {} of an item per order", self.pipeline.max_quantity_per_item),
                ));
            }
            order.items[line_index].quantity = qty;
        }

        order.items[line_index].reprice();
        self.save_order(&mut order).await?;

        if let Some(w) = warning {
            return Ok(w);
        }
        Ok(CommandResult::success("updated item").with_data(serde_json::json!({ "line_id": order_item_id })))
    }

    async fn clear_order(&self, order_id: &str, session: &SessionContext) -> sa_domain::error::Result<CommandResult> {
        let mut order = self.load_order(order_id, session).await?;
        order.items.clear();
        self.save_order(&mut order).await?;
        Ok(CommandResult::success("order cleared"))
    }

    /// CONFIRM_ORDER is a two-step turn: the first confirm (from ORDERING)
    /// only needs the non-empty-order business rule enforced so the
    /// orchestrator can speak an order summary; the order itself isn't
    /// committed until the second confirm (from CONFIRMING). `session`
    /// still carries the pre-turn state when this runs, so that's what
    /// decides which half we're in.
    async fn confirm_order(&self, order_id: &str, session: &SessionContext) -> sa_domain::error::Result<CommandResult> {
        let mut order = self.load_order(order_id, session).await?;
        if order.items.is_empty() {
            return Ok(CommandResult {
                status: sa_domain::types::ResultStatus::Error,
                message: "cannot confirm an empty order".to_string(),
                data: None,
                error_category: Some(sa_domain::types::ErrorCategory::Business),
                error_code: None,
            });
        }
        if session.conversation_state != ConversationState::Confirming {
            return Ok(CommandResult::success("order ready to confirm")
                .with_data(serde_json::json!({ "order_id": order.order_id })));
        }
        order.status = OrderStatus::Confirmed;
        let now: DateTime<Utc> = self.clock.now();
        order.confirmed_at = Some(now);
        self.save_order(&mut order).await?;
        Ok(CommandResult::success("order confirmed").with_data(serde_json::json!({ "order_id": order.order_id })))
    }
}
