//! End-to-end turns through `process_turn`, exercising the fixed sequence
//! of components with a scripted LLM and the demo in-memory adapters.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use sa_commands::CommandBus;
use sa_domain::config::Config as PipelineConfig;
use sa_domain::error::Result;
use sa_domain::ports::{ChatRequest, ChatResponse, Clock, LLMClient, SystemClock};
use sa_domain::types::ConversationState;
use sa_llm::IntentClassifier;
use sa_menu::MenuReadModel;
use sa_sessions::{InMemoryOrderStore, InMemorySessionStore, SessionLockMap};

use sa_orchestrator::adapters::{LocalObjectStore, SilentTts, StaticMenuRepository};
use sa_orchestrator::runtime::cancel::CancelMap;
use sa_orchestrator::state::AppState;
use sa_orchestrator::turn::process_turn;

/// Replays a fixed queue of structured LLM responses, one per call, in
/// order. Panics if a test exhausts the script — that means the turn made
/// a call nobody anticipated.
struct ScriptedLlm {
    queue: Mutex<std::collections::VecDeque<Value>>,
}

impl ScriptedLlm {
    fn new(responses: Vec<Value>) -> Self {
        Self { queue: Mutex::new(responses.into_iter().collect()) }
    }
}

#[async_trait]
impl LLMClient for ScriptedLlm {
    async fn chat(&self, _req: ChatRequest) -> Result<ChatResponse> {
        let next = self.queue.lock().unwrap().pop_front().expect("scripted LLM queue exhausted");
        Ok(ChatResponse { text: None, structured: Some(next), tool_calls: vec![] })
    }
}

fn test_state(llm_responses: Vec<Value>, tmp_dir: &std::path::Path) -> AppState {
    let config = Arc::new(PipelineConfig::default());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let menu_repo = Arc::new(StaticMenuRepository);
    let menu = Arc::new(MenuReadModel::new(menu_repo, clock.clone()));

    let sessions = Arc::new(InMemorySessionStore::new(clock.clone()));
    let orders = Arc::new(InMemoryOrderStore::new(clock.clone()));
    let session_locks = Arc::new(SessionLockMap::new());

    let commands = Arc::new(CommandBus::new(menu.clone(), orders.clone(), clock.clone(), config.pipeline.clone(), Duration::from_secs(3600)));

    let llm: Arc<dyn LLMClient> = Arc::new(ScriptedLlm::new(llm_responses));
    let classifier = Arc::new(IntentClassifier::new(llm.clone(), "test-model"));

    let tts = Arc::new(SilentTts);
    let object_store = Arc::new(LocalObjectStore::new(tmp_dir));

    AppState {
        config,
        clock,
        sessions,
        orders,
        session_locks,
        cancel_map: Arc::new(CancelMap::new()),
        menu,
        commands,
        llm,
        classifier,
        tts,
        object_store,
    }
}

fn tmp_dir(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("sa-orchestrator-turn-test-{name}"))
}

#[tokio::test]
async fn single_item_happy_path_adds_the_item_and_advances_state() {
    let dir = tmp_dir("happy-path");
    let state = test_state(
        vec![
            json!({"intent": "ADD_ITEM", "confidence": 0.95, "cleansed_input": "a quantum cheeseburger"}),
            json!({
                "success": true,
                "confidence": 0.9,
                "extracted_items": [
                    {"item_name": "quantum cheeseburger", "quantity": 1, "modifiers": [], "confidence": 0.9}
                ]
            }),
        ],
        &dir,
    );

    let out = process_turn(&state, "session-1", 1, "I want a quantum cheeseburger").await;

    assert!(out.success);
    assert_eq!(out.target_state, ConversationState::Ordering);
    assert_eq!(out.order_snapshot.items.len(), 1);
    assert_eq!(out.order_snapshot.items[0].menu_item_id, "quantum-cheeseburger");
    assert!(out.audio_url.is_some());
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn invalid_transition_in_closing_state_returns_canned_phrase_without_a_router_call() {
    let dir = tmp_dir("invalid-transition");
    let state = test_state(vec![json!({"intent": "REMOVE_ITEM", "confidence": 0.9, "cleansed_input": "remove the fries"})], &dir);

    state
        .sessions
        .put(
            "session-2",
            &sa_domain::types::SessionContext {
                session_id: "session-2".into(),
                restaurant_id: 1,
                order_id: "order-session-2".into(),
                conversation_state: ConversationState::Closing,
                turn_counter: 3,
                conversation_history: Vec::new(),
                expectation: None,
            },
            Duration::from_secs(3600),
        )
        .await
        .unwrap();

    let out = process_turn(&state, "session-2", 1, "remove the fries").await;

    assert!(out.success);
    assert_eq!(out.target_state, ConversationState::Closing);
    assert!(out.response_text.to_lowercase().contains("kitchen"));
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn confirming_an_empty_order_rolls_back_to_ordering() {
    let dir = tmp_dir("empty-confirm");
    let state = test_state(vec![json!({"intent": "CONFIRM_ORDER", "confidence": 0.95, "cleansed_input": "that's it"})], &dir);

    state
        .sessions
        .put(
            "session-3",
            &sa_domain::types::SessionContext {
                session_id: "session-3".into(),
                restaurant_id: 1,
                order_id: "order-session-3".into(),
                conversation_state: ConversationState::Ordering,
                turn_counter: 1,
                conversation_history: Vec::new(),
                expectation: None,
            },
            Duration::from_secs(3600),
        )
        .await
        .unwrap();

    let out = process_turn(&state, "session-3", 1, "that's it").await;

    assert!(!out.success);
    assert_eq!(out.target_state, ConversationState::Ordering);
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn confirming_a_non_empty_order_takes_two_turns_to_commit() {
    let dir = tmp_dir("two-step-confirm");
    let state = test_state(
        vec![
            json!({"intent": "ADD_ITEM", "confidence": 0.95, "cleansed_input": "a quantum cheeseburger"}),
            json!({
                "success": true,
                "confidence": 0.9,
                "extracted_items": [
                    {"item_name": "quantum cheeseburger", "quantity": 1, "modifiers": [], "confidence": 0.9}
                ]
            }),
            json!({"intent": "CONFIRM_ORDER", "confidence": 0.95, "cleansed_input": "that's it"}),
            json!({"intent": "CONFIRM_ORDER", "confidence": 0.95, "cleansed_input": "yes confirm"}),
        ],
        &dir,
    );

    let add = process_turn(&state, "session-5", 1, "I want a quantum cheeseburger").await;
    assert_eq!(add.target_state, ConversationState::Ordering);

    let first_confirm = process_turn(&state, "session-5", 1, "that's it").await;
    assert!(first_confirm.success);
    assert_eq!(first_confirm.target_state, ConversationState::Confirming);
    assert_eq!(first_confirm.order_snapshot.status, sa_domain::types::OrderStatus::Active);
    assert!(first_confirm.order_snapshot.confirmed_at.is_none());

    let second_confirm = process_turn(&state, "session-5", 1, "yes confirm").await;
    assert!(second_confirm.success);
    assert_eq!(second_confirm.target_state, ConversationState::Closing);
    assert_eq!(second_confirm.order_snapshot.status, sa_domain::types::OrderStatus::Confirmed);
    assert!(second_confirm.order_snapshot.confirmed_at.is_some());

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn low_confidence_classification_asks_the_customer_to_repeat() {
    let dir = tmp_dir("low-confidence");
    let state = test_state(vec![json!({"intent": "ADD_ITEM", "confidence": 0.1, "cleansed_input": "mumble mumble"})], &dir);

    let out = process_turn(&state, "session-4", 1, "mmmmuuh").await;

    assert!(out.success);
    assert_eq!(out.target_state, ConversationState::Idle);
    std::fs::remove_dir_all(&dir).ok();
}
