//! External collaborators the core pipeline depends on but does not
//! implement. Every port but [`Clock`] is `#[async_trait]`, mirroring the
//! host codebase family's `LlmProvider`/`SerialMemoryProvider` idiom, so a
//! process-local reference implementation (used by tests and the demo CLI)
//! and an out-of-process adapter are interchangeable behind `Arc<dyn Port>`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::Result;
use crate::types::{Ingredient, Inventory, MenuItem, MenuItemIngredient, OrderAggregate, SessionContext};

/// A single chat message in provider-agnostic form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// A chat request against the classifier/parser LLM.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    /// Tool definitions the model may invoke, JSON-schema encoded.
    pub tools: Vec<serde_json::Value>,
    /// A JSON schema the response must conform to, when structured output
    /// is required (the classifier and both parser stages use this).
    pub response_schema: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default)]
pub struct ChatResponse {
    pub text: Option<String>,
    /// Populated when the model produced a structured object conforming to
    /// `response_schema`.
    pub structured: Option<serde_json::Value>,
    pub tool_calls: Vec<ToolCallRequest>,
}

#[derive(Debug, Clone)]
pub struct ToolCallRequest {
    pub call_id: String,
    pub tool_name: String,
    pub arguments: serde_json::Value,
}

#[async_trait]
pub trait LLMClient: Send + Sync {
    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse>;
}

#[async_trait]
pub trait TTS: Send + Sync {
    async fn synthesize(&self, text: &str, voice: &str, language: &str) -> Result<Vec<u8>>;
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String>;
    async fn get(&self, key: &str) -> Result<Option<String>>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, session_id: &str) -> Result<Option<SessionContext>>;
    async fn put(&self, session_id: &str, ctx: &SessionContext, ttl: Duration) -> Result<()>;
    async fn delete(&self, session_id: &str) -> Result<()>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn get(&self, order_id: &str) -> Result<Option<OrderAggregate>>;
    async fn upsert(&self, order: &OrderAggregate, ttl: Duration) -> Result<()>;
    async fn delete(&self, order_id: &str) -> Result<()>;
}

#[async_trait]
pub trait MenuRepository: Send + Sync {
    async fn get_menu_items(&self, restaurant_id: i64) -> Result<Vec<MenuItem>>;
    async fn get_ingredients(&self, restaurant_id: i64) -> Result<Vec<Ingredient>>;
    async fn get_inventory(&self, restaurant_id: i64) -> Result<Vec<Inventory>>;
    async fn get_categories(&self, restaurant_id: i64) -> Result<Vec<String>>;
    async fn get_menu_item_ingredients(&self, menu_item_id: &str) -> Result<Vec<MenuItemIngredient>>;
}

/// The one synchronous port — injected everywhere `Utc::now()` would
/// otherwise appear so TTL expiry, lock-timeout and session-reset tests are
/// deterministic.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// `Clock` backed by the real wall clock, used outside tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
