//! Core domain types shared by every pipeline component: menu catalog,
//! order aggregate, session context and the command vocabulary that flows
//! between the Intent Parser Router (C6) and the Command Bus (C3).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::ErrorCode;

// ─────────────────────────────────────────────────────────────────────────
// Menu catalog (read-only to the core)
// ─────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub restaurant_id: i64,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub is_available: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: String,
    pub restaurant_id: i64,
    pub name: String,
    pub unit_cost: Decimal,
    #[serde(default)]
    pub is_allergen: bool,
    #[serde(default)]
    pub allergen_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItemIngredient {
    pub menu_item_id: String,
    pub ingredient_id: String,
    pub quantity: Decimal,
    pub unit: String,
    pub is_optional: bool,
    pub additional_cost: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub ingredient_id: String,
    pub current_stock: Decimal,
    pub min_stock: Decimal,
    pub is_low_stock: bool,
}

// ─────────────────────────────────────────────────────────────────────────
// Order aggregate (owned by the Command Bus, persisted through the Order
// Store)
// ─────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Active,
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub line_id: String,
    pub menu_item_id: String,
    pub quantity: u32,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub special_instructions: Option<String>,
    pub unit_price: Decimal,
    pub extra_cost: Decimal,
    pub total_price: Decimal,
}

impl OrderLine {
    /// Recompute `total_price` from `unit_price`, `extra_cost` and
    /// `quantity`. Callers must invoke this after any mutation.
    pub fn reprice(&mut self) {
        self.total_price = crate::money::line_total(self.unit_price, self.extra_cost, self.quantity);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAggregate {
    pub order_id: String,
    pub session_id: String,
    pub restaurant_id: i64,
    pub items: Vec<OrderLine>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl OrderAggregate {
    pub fn new(order_id: String, session_id: String, restaurant_id: i64, now: DateTime<Utc>) -> Self {
        Self {
            order_id,
            session_id,
            restaurant_id,
            items: Vec::new(),
            subtotal: crate::money::zero(),
            tax: crate::money::zero(),
            total: crate::money::zero(),
            status: OrderStatus::Active,
            created_at: now,
            updated_at: now,
            confirmed_at: None,
        }
    }

    /// Recompute `subtotal`/`total` from `items`. Tax is left untouched —
    /// tax-rate policy lives outside the core's scope.
    pub fn recompute_totals(&mut self) {
        self.subtotal = crate::money::round_money(
            self.items.iter().map(|l| l.total_price).sum::<Decimal>(),
        );
        self.total = crate::money::round_money(self.subtotal + self.tax);
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Session context (consumed, not owned, by the core)
// ─────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversationState {
    Idle,
    Ordering,
    Thinking,
    Clarifying,
    Confirming,
    Closing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub user_input: String,
    pub response_text: String,
    pub intent: IntentType,
    pub state: ConversationState,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    pub session_id: String,
    pub restaurant_id: i64,
    pub order_id: String,
    pub conversation_state: ConversationState,
    pub turn_counter: u64,
    #[serde(default)]
    pub conversation_history: Vec<Turn>,
    /// A free-form hint left by the previous turn for reference resolution,
    /// e.g. "last_item" → the line id most recently mentioned.
    #[serde(default)]
    pub expectation: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────
// Intent vocabulary
// ─────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentType {
    AddItem,
    RemoveItem,
    ModifyItem,
    ClearOrder,
    ConfirmOrder,
    Question,
    SmallTalk,
    Repeat,
    Unknown,
}

// ─────────────────────────────────────────────────────────────────────────
// Commands (C6 output, C3 input) — value objects, never mutated once built
// ─────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModifyChanges {
    #[serde(default)]
    pub add_modifier: Option<String>,
    #[serde(default)]
    pub remove_modifier: Option<String>,
    #[serde(default)]
    pub set_special_instructions: Option<String>,
    #[serde(default)]
    pub clear_special_instructions: bool,
    #[serde(default)]
    pub set_size: Option<String>,
    #[serde(default)]
    pub set_quantity: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionCategory {
    Menu,
    Pricing,
    Hours,
    Allergens,
    Other,
}

/// A reference to the line a `REMOVE_ITEM`/`MODIFY_ITEM` command targets,
/// before or instead of an explicit `order_item_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TargetRef {
    LastItem,
    Mentioned { expectation: String },
    ByName { name: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "intent")]
pub enum Command {
    #[serde(rename = "ADD_ITEM")]
    AddItem {
        menu_item_id: Option<String>,
        item_name: String,
        quantity: u32,
        #[serde(default)]
        size: Option<String>,
        #[serde(default)]
        modifiers: Vec<String>,
        #[serde(default)]
        special_instructions: Option<String>,
    },
    #[serde(rename = "REMOVE_ITEM")]
    RemoveItem {
        #[serde(default)]
        order_item_id: Option<String>,
        #[serde(default)]
        target_ref: Option<TargetRef>,
    },
    #[serde(rename = "MODIFY_ITEM")]
    ModifyItem {
        order_item_id: String,
        changes: ModifyChanges,
    },
    #[serde(rename = "CLEAR_ORDER")]
    ClearOrder,
    #[serde(rename = "CONFIRM_ORDER")]
    ConfirmOrder,
    #[serde(rename = "QUESTION")]
    Question {
        question: String,
        #[serde(default)]
        category: Option<QuestionCategory>,
    },
    #[serde(rename = "CLARIFICATION_NEEDED")]
    ClarificationNeeded {
        ambiguous_item: String,
        suggested_options: Vec<String>,
        clarification_question: String,
    },
    #[serde(rename = "ITEM_UNAVAILABLE")]
    ItemUnavailable {
        requested_item: String,
        message: String,
    },
    #[serde(rename = "UNKNOWN")]
    Unknown {
        user_input: String,
        #[serde(default)]
        clarifying_question: Option<String>,
    },
}

impl Command {
    pub fn intent(&self) -> IntentType {
        match self {
            Command::AddItem { .. } => IntentType::AddItem,
            Command::RemoveItem { .. } => IntentType::RemoveItem,
            Command::ModifyItem { .. } => IntentType::ModifyItem,
            Command::ClearOrder => IntentType::ClearOrder,
            Command::ConfirmOrder => IntentType::ConfirmOrder,
            Command::Question { .. } => IntentType::Question,
            Command::ClarificationNeeded { .. } => IntentType::Unknown,
            Command::ItemUnavailable { .. } => IntentType::Unknown,
            Command::Unknown { .. } => IntentType::Unknown,
        }
    }
}

/// Descriptor emitted by a C6 parser before it is turned into a [`Command`].
/// Carries the confidence/clarification metadata the schema validator
/// checks and the response aggregator later reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandDescriptor {
    pub intent: IntentType,
    pub confidence: f64,
    pub slots: serde_json::Value,
    #[serde(default)]
    pub needs_clarification: bool,
    #[serde(default)]
    pub clarifying_question: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────
// Command results
// ─────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultStatus {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    Validation,
    Business,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResult {
    pub status: ResultStatus,
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub error_category: Option<ErrorCategory>,
    #[serde(default)]
    pub error_code: Option<ErrorCode>,
}

impl CommandResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: ResultStatus::Success,
            message: message.into(),
            data: None,
            error_category: None,
            error_code: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn business_error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status: ResultStatus::Error,
            message: message.into(),
            data: None,
            error_category: Some(ErrorCategory::Business),
            error_code: Some(code),
        }
    }

    pub fn business_warning(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status: ResultStatus::Warning,
            message: message.into(),
            data: None,
            error_category: Some(ErrorCategory::Business),
            error_code: Some(code),
        }
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self {
            status: ResultStatus::Error,
            message: message.into(),
            data: None,
            error_category: Some(ErrorCategory::Validation),
            error_code: None,
        }
    }

    pub fn system_error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status: ResultStatus::Error,
            message: message.into(),
            data: None,
            error_category: Some(ErrorCategory::System),
            error_code: Some(code),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResultStatus::Success
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchOutcome {
    AllSuccess,
    PartialSuccess,
    AllFailed,
    FatalSystem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FollowUpAction {
    Continue,
    Ask,
    Stop,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandBatchResult {
    pub results: Vec<CommandResult>,
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub errors_by_category: HashMap<String, usize>,
    pub errors_by_code: HashMap<String, usize>,
    pub batch_outcome: BatchOutcome,
    pub follow_up_action: FollowUpAction,
    pub summary_message: String,
    pub command_family: String,
}
