//! Turn Orchestrator (C9): the single entry point that turns one user
//! utterance into one response, threading it through every other
//! component in the fixed sequence from §4.9.

use std::time::Duration;

use sa_domain::error::ErrorCode;
use sa_domain::types::{
    BatchOutcome, CommandBatchResult, CommandResult, ConversationState, ErrorCategory,
    FollowUpAction, IntentType, OrderAggregate, SessionContext, Turn,
};
use sa_parsers::dispatch::RouterContext;
use sa_response::{AggregatedResponse, PhraseCategory};

use crate::state::AppState;

pub struct TurnError {
    pub category: &'static str,
    pub code: Option<String>,
    pub message: String,
}

pub struct TurnOutput {
    pub success: bool,
    pub response_text: String,
    pub audio_url: Option<String>,
    pub intent: Option<IntentType>,
    pub target_state: ConversationState,
    pub order_snapshot: OrderAggregate,
    pub error: Option<TurnError>,
}

/// Process one turn for `session_id` under `restaurant_id`. Acquires the
/// per-session lock for the duration of the call and releases it on every
/// path, including early returns (the permit is dropped at function exit).
pub async fn process_turn(state: &AppState, session_id: &str, restaurant_id: i64, user_input: &str) -> TurnOutput {
    let deadline = Duration::from_secs(state.config.session.turn_deadline_secs);
    let _permit = match state.session_locks.acquire_with_timeout(session_id, deadline).await {
        Ok(permit) => permit,
        Err(e) => return system_error_output(session_id, restaurant_id, state, e.to_string()).await,
    };

    let cancel = state.cancel_map.register(session_id);

    let (mut session, mut order) = match load_or_create(state, session_id, restaurant_id).await {
        Ok(pair) => pair,
        Err(e) => return system_error_output(session_id, restaurant_id, state, e.to_string()).await,
    };
    let pre_turn_state = session.conversation_state;

    if cancel.is_cancelled() {
        state.cancel_map.clear(session_id);
        return cancelled_output(order, pre_turn_state);
    }

    // ── Step 1: Intent Classifier (C4) ──────────────────────────────
    let order_snapshot_str = serde_json::to_string(&order).unwrap_or_default();
    let classified = state.classifier.classify(user_input, &session.conversation_history, &order_snapshot_str).await;

    let (intent, confidence, cleansed_input) = match classified {
        Ok(out) => (out.intent, out.confidence, out.cleansed_input),
        Err(e) => {
            tracing::error!(error = %e, session_id, "intent classifier failed");
            let response = AggregatedResponse::canned("SYSTEM_ERROR_RETRY");
            let turn_error = Some(TurnError { category: "SYSTEM", code: None, message: e.to_string() });
            let out = finish_turn(state, &mut session, order, None, pre_turn_state, response, user_input, restaurant_id, false, turn_error).await;
            state.cancel_map.clear(session_id);
            return out;
        }
    };

    // ── Step 2: confidence gate ──────────────────────────────────────
    if confidence < state.config.pipeline.confidence_threshold {
        let response = AggregatedResponse::canned("DIDNT_UNDERSTAND");
        let out = finish_turn(state, &mut session, order, Some(intent), pre_turn_state, response, user_input, restaurant_id, true, None).await;
        state.cancel_map.clear(session_id);
        return out;
    }

    if cancel.is_cancelled() {
        state.cancel_map.clear(session_id);
        return cancelled_output(order, pre_turn_state);
    }

    // ── Step 3: State Machine (C5) ───────────────────────────────────
    let transition = sa_statemachine::transition(session.conversation_state, intent);
    if !transition.is_valid {
        let phrase = transition.invalid_phrase.expect("invalid transitions always carry a phrase");
        let response = AggregatedResponse::canned(phrase);
        let out = finish_turn(state, &mut session, order, Some(intent), pre_turn_state, response, user_input, restaurant_id, true, None).await;
        state.cancel_map.clear(session_id);
        return out;
    }

    // CONFIRM_ORDER always reaches the Command Bus so it can enforce the
    // non-empty-order business rule, even though the state table marks
    // every CONFIRM_ORDER cell `requires_command=false` — the table only
    // decides whether *other* intents need a command. The bus itself only
    // commits the order when the pre-turn state was CONFIRMING; from
    // ORDERING it validates non-empty and leaves the order untouched, so
    // the first confirm never freezes it.
    let dispatches_to_commands = transition.requires_command || intent == IntentType::ConfirmOrder;

    if !dispatches_to_commands {
        let response = short_circuit_response(intent, &session);
        let out = finish_turn(state, &mut session, order, Some(intent), transition.target_state, response, user_input, restaurant_id, true, None).await;
        state.cancel_map.clear(session_id);
        return out;
    }

    if cancel.is_cancelled() {
        state.cancel_map.clear(session_id);
        return cancelled_output(order, pre_turn_state);
    }

    // ── Step 4: Intent Parser Router (C6) + Command Bus (C3) ─────────
    let router_ctx = RouterContext { llm: state.llm.as_ref(), model: &state.config.llm.model, menu: state.menu.as_ref(), restaurant_id, order: &order };
    let batch = match sa_parsers::dispatch::route(intent, &cleansed_input, &router_ctx).await {
        Ok(commands) => state.commands.execute(&commands, &order.order_id, restaurant_id, &session).await,
        Err(e) => {
            tracing::error!(error = %e, session_id, "intent parser router failed");
            fatal_batch(e.to_string())
        }
    };

    // The Command Bus persists its own mutations; reload so the returned
    // snapshot reflects them.
    if let Ok(Some(updated)) = state.orders.get(&order.order_id).await {
        order = updated;
    }

    let has_business_error = batch.results.iter().any(|r| r.error_category == Some(ErrorCategory::Business));

    let mut target_state = transition.target_state;
    if intent == IntentType::ConfirmOrder && has_business_error {
        // Empty-confirmation rollback (§4.9): stay where the session was
        // before this turn instead of advancing per the state table.
        target_state = pre_turn_state;
    }

    // ── Step 5: Response Aggregator (C7) ──────────────────────────────
    let response = if intent == IntentType::ConfirmOrder && !has_business_error && pre_turn_state == ConversationState::Ordering {
        // First CONFIRM_ORDER (ORDERING -> CONFIRMING): the Command Bus
        // only validated the order is non-empty, it hasn't committed
        // anything yet, so speak the summary rather than the bus's
        // "order confirmed" phrasing.
        short_circuit_response(intent, &session)
    } else {
        sa_response::aggregate(&batch)
    };

    let (success, error) = match batch.follow_up_action {
        FollowUpAction::Continue => (true, None),
        FollowUpAction::Ask => (false, Some(TurnError { category: "BUSINESS", code: None, message: batch.summary_message.clone() })),
        FollowUpAction::Stop => (false, Some(TurnError { category: "SYSTEM", code: None, message: batch.summary_message.clone() })),
    };

    let out = finish_turn(state, &mut session, order, Some(intent), target_state, response, user_input, restaurant_id, success, error).await;
    state.cancel_map.clear(session_id);
    out
}

fn short_circuit_response(intent: IntentType, session: &SessionContext) -> AggregatedResponse {
    match intent {
        IntentType::SmallTalk => AggregatedResponse::canned("SMALL_TALK_ACK"),
        IntentType::Repeat => match session.conversation_history.last() {
            Some(last) => AggregatedResponse {
                response_text: last.response_text.clone(),
                phrase_category: PhraseCategory::Dynamic,
                phrase_id: None,
            },
            None => AggregatedResponse::canned("NOTHING_TO_REPEAT"),
        },
        // ORDERING×CONFIRM_ORDER → CONFIRMING only speaks a summary; the
        // second CONFIRM_ORDER (from CONFIRMING) is the one that dispatches
        // to the Command Bus above.
        IntentType::ConfirmOrder => AggregatedResponse {
            response_text: "Alright, just to confirm — would you like to place that order?".to_string(),
            phrase_category: PhraseCategory::Dynamic,
            phrase_id: None,
        },
        _ => AggregatedResponse::canned("DIDNT_UNDERSTAND"),
    }
}

fn fatal_batch(message: String) -> CommandBatchResult {
    use std::collections::HashMap;

    CommandBatchResult {
        total: 1,
        successful: 0,
        failed: 1,
        errors_by_category: HashMap::new(),
        errors_by_code: HashMap::new(),
        batch_outcome: BatchOutcome::FatalSystem,
        follow_up_action: FollowUpAction::Stop,
        summary_message: "router failure".to_string(),
        command_family: "UNKNOWN".to_string(),
        results: vec![CommandResult::system_error(ErrorCode::InternalError, message)],
    }
}

#[allow(clippy::too_many_arguments)]
async fn finish_turn(
    state: &AppState,
    session: &mut SessionContext,
    order: OrderAggregate,
    intent: Option<IntentType>,
    target_state: ConversationState,
    response: AggregatedResponse,
    user_input: &str,
    restaurant_id: i64,
    success: bool,
    error: Option<TurnError>,
) -> TurnOutput {
    // ── Step 6: Audio Dispatcher (C8) ────────────────────────────────
    let dispatcher = sa_audio::AudioDispatcher::new(state.tts.as_ref(), state.object_store.as_ref(), &state.config.voice.voice, &state.config.voice.language);
    let audio_url = dispatcher.dispatch(restaurant_id, &response).await;

    // ── Step 7: update SessionContext ────────────────────────────────
    let now = state.clock.now();
    session.conversation_history.push(Turn {
        user_input: user_input.to_string(),
        response_text: response.response_text.clone(),
        intent: intent.unwrap_or(IntentType::Unknown),
        state: target_state,
        at: now,
    });
    let window = state.config.session.history_window;
    if session.conversation_history.len() > window {
        let overflow = session.conversation_history.len() - window;
        session.conversation_history.drain(0..overflow);
    }
    session.turn_counter += 1;
    session.conversation_state = target_state;

    let ttl = Duration::from_secs(state.config.session.session_ttl_secs);
    if let Err(e) = state.sessions.put(&session.session_id, session, ttl).await {
        tracing::warn!(error = %e, session_id = %session.session_id, "failed to persist session after turn");
    }
    if let Err(e) = state.orders.upsert(&order, ttl).await {
        tracing::warn!(error = %e, order_id = %order.order_id, "failed to persist order after turn");
    }

    TurnOutput {
        success,
        response_text: response.response_text,
        audio_url,
        intent,
        target_state,
        order_snapshot: order,
        error,
    }
}

async fn system_error_output(session_id: &str, restaurant_id: i64, state: &AppState, message: String) -> TurnOutput {
    tracing::error!(session_id, error = %message, "turn failed before a response could be composed");
    let order = OrderAggregate::new(format!("order-{session_id}"), session_id.to_string(), restaurant_id, state.clock.now());
    TurnOutput {
        success: false,
        response_text: sa_response::canned::text_for("SYSTEM_ERROR_RETRY").to_string(),
        audio_url: None,
        intent: None,
        target_state: ConversationState::Idle,
        order_snapshot: order,
        error: Some(TurnError { category: "SYSTEM", code: None, message }),
    }
}

fn cancelled_output(order: OrderAggregate, state: ConversationState) -> TurnOutput {
    TurnOutput {
        success: false,
        response_text: String::new(),
        audio_url: None,
        intent: None,
        target_state: state,
        order_snapshot: order,
        error: Some(TurnError { category: "SYSTEM", code: Some("CANCELLED".into()), message: "turn cancelled".into() }),
    }
}

async fn load_or_create(state: &AppState, session_id: &str, restaurant_id: i64) -> sa_domain::error::Result<(SessionContext, OrderAggregate)> {
    let now = state.clock.now();
    let session = match state.sessions.get(session_id).await? {
        Some(existing) => existing,
        None => SessionContext {
            session_id: session_id.to_string(),
            restaurant_id,
            order_id: format!("order-{session_id}"),
            conversation_state: ConversationState::Idle,
            turn_counter: 0,
            conversation_history: Vec::new(),
            expectation: None,
        },
    };
    let order = match state.orders.get(&session.order_id).await? {
        Some(existing) => existing,
        None => OrderAggregate::new(session.order_id.clone(), session_id.to_string(), restaurant_id, now),
    };
    Ok((session, order))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sa_domain::error::ErrorCode;

    fn empty_session() -> SessionContext {
        SessionContext {
            session_id: "s1".into(),
            restaurant_id: 1,
            order_id: "order-s1".into(),
            conversation_state: ConversationState::Idle,
            turn_counter: 0,
            conversation_history: Vec::new(),
            expectation: None,
        }
    }

    #[test]
    fn small_talk_gets_the_canned_ack() {
        let response = short_circuit_response(IntentType::SmallTalk, &empty_session());
        assert_eq!(response.phrase_id.as_deref(), Some("SMALL_TALK_ACK"));
    }

    #[test]
    fn repeat_with_history_replays_the_last_response_verbatim() {
        let mut session = empty_session();
        session.conversation_history.push(Turn {
            user_input: "add a burger".into(),
            response_text: "Added a Quantum Burger.".into(),
            intent: IntentType::AddItem,
            state: ConversationState::Ordering,
            at: chrono::Utc::now(),
        });
        let response = short_circuit_response(IntentType::Repeat, &session);
        assert_eq!(response.response_text, "Added a Quantum Burger.");
        assert_eq!(response.phrase_category, PhraseCategory::Dynamic);
    }

    #[test]
    fn repeat_with_no_history_falls_back_to_canned() {
        let response = short_circuit_response(IntentType::Repeat, &empty_session());
        assert_eq!(response.phrase_id.as_deref(), Some("NOTHING_TO_REPEAT"));
    }

    #[test]
    fn confirm_order_short_circuit_asks_for_confirmation() {
        let response = short_circuit_response(IntentType::ConfirmOrder, &empty_session());
        assert!(response.response_text.to_lowercase().contains("confirm"));
        assert_eq!(response.phrase_category, PhraseCategory::Dynamic);
    }

    #[test]
    fn fatal_batch_is_a_single_system_error_result() {
        let batch = fatal_batch("router exploded".into());
        assert_eq!(batch.total, 1);
        assert_eq!(batch.failed, 1);
        assert_eq!(batch.successful, 0);
        assert!(matches!(batch.batch_outcome, BatchOutcome::FatalSystem));
        assert_eq!(batch.results.len(), 1);
        assert_eq!(batch.results[0].error_category, Some(ErrorCategory::System));
        let _ = ErrorCode::InternalError;
    }
}
