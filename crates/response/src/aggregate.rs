//! Response Aggregator (C7): turns a `CommandBatchResult` into exactly one
//! `{response_text, phrase_category, phrase_id?}`. Deterministic — the same
//! batch always composes the same text, in the same order.

use sa_domain::error::ErrorCode;
use sa_domain::types::{BatchOutcome, CommandBatchResult};

use crate::canned;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhraseCategory {
    Canned,
    Dynamic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedResponse {
    pub response_text: String,
    pub phrase_category: PhraseCategory,
    pub phrase_id: Option<String>,
}

impl AggregatedResponse {
    pub fn canned(phrase_id: impl Into<String>) -> Self {
        let id = phrase_id.into();
        let text = canned::text_for(&id).to_string();
        Self { response_text: text, phrase_category: PhraseCategory::Canned, phrase_id: Some(id) }
    }
}

const SINGLE_SUCCESS_PHRASE: &[(&str, &str)] = &[
    ("ADD_ITEM", "ITEM_ADDED_SUCCESS"),
    ("REMOVE_ITEM", "ITEM_REMOVED_SUCCESS"),
    ("MODIFY_ITEM", "ITEM_MODIFIED_SUCCESS"),
    ("CLEAR_ORDER", "ORDER_CLEARED"),
    ("CONFIRM_ORDER", "ORDER_CONFIRMED"),
];

/// Compose the response for a completed command batch. `batch_outcome`
/// drives the canned/dynamic split; the single-success case additionally
/// checks `command_family` against the fixed phrase table.
pub fn aggregate(batch: &CommandBatchResult) -> AggregatedResponse {
    match batch.batch_outcome {
        BatchOutcome::FatalSystem => AggregatedResponse::canned("SYSTEM_ERROR_RETRY"),
        BatchOutcome::AllSuccess if batch.total == 1 => {
            match SINGLE_SUCCESS_PHRASE.iter().find(|(family, _)| *family == batch.command_family) {
                Some((_, phrase_id)) => AggregatedResponse::canned(*phrase_id),
                None => compose_dynamic(batch),
            }
        }
        _ => compose_dynamic(batch),
    }
}

/// Used by the orchestrator when a turn short-circuits before C3 ever
/// runs: a low classifier confidence or an invalid state transition.
pub fn canned_phrase(phrase_id: &str) -> AggregatedResponse {
    AggregatedResponse::canned(phrase_id)
}

fn compose_dynamic(batch: &CommandBatchResult) -> AggregatedResponse {
    let mut added_items = Vec::new();
    let mut other_acks = Vec::new();
    let mut unavailable = Vec::new();
    let mut failures = Vec::new();
    let mut clarification = None;

    for result in &batch.results {
        let is_clarification = result.data.as_ref().and_then(|d| d.get("ambiguous_item")).is_some();
        if is_clarification {
            clarification.get_or_insert_with(|| result.message.clone());
            continue;
        }

        if result.error_code == Some(ErrorCode::ItemUnavailable) {
            let requested = result
                .data
                .as_ref()
                .and_then(|d| d.get("requested_item"))
                .and_then(|v| v.as_str())
                .unwrap_or("that item");
            unavailable.push(format!("Sorry, we don't have {requested}."));
            continue;
        }

        if result.is_success() {
            match result.message.strip_prefix("added ") {
                Some(item_name) => added_items.push(item_name.to_string()),
                None => other_acks.push(result.message.clone()),
            }
        } else {
            failures.push(result.message.clone());
        }
    }

    let mut sentences = Vec::new();
    if !added_items.is_empty() {
        sentences.push(format!("I added {}.", join_with_and(&added_items)));
    }
    for ack in &other_acks {
        sentences.push(format!("{}.", capitalize(ack)));
    }
    sentences.extend(unavailable);
    for failure in &failures {
        sentences.push(format!("{}.", capitalize(failure)));
    }
    if let Some(question) = clarification {
        sentences.push(question);
    }
    if sentences.is_empty() {
        sentences.push("Sorry, I couldn't make that change.".to_string());
    }

    AggregatedResponse { response_text: sentences.join(" "), phrase_category: PhraseCategory::Dynamic, phrase_id: None }
}

fn join_with_and(items: &[String]) -> String {
    match items.len() {
        0 => String::new(),
        1 => items[0].clone(),
        2 => format!("{} and {}", items[0], items[1]),
        _ => {
            let (last, rest) = items.split_last().expect("non-empty checked above");
            format!("{} and {}", rest.join(", "), last)
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sa_domain::types::{CommandResult, FollowUpAction, ResultStatus};
    use std::collections::HashMap;

    fn batch(results: Vec<CommandResult>, outcome: BatchOutcome, family: &str) -> CommandBatchResult {
        let total = results.len();
        let successful = results.iter().filter(|r| r.is_success()).count();
        CommandBatchResult {
            total,
            successful,
            failed: total - successful,
            errors_by_category: HashMap::new(),
            errors_by_code: HashMap::new(),
            batch_outcome: outcome,
            follow_up_action: FollowUpAction::Continue,
            summary_message: String::new(),
            command_family: family.to_string(),
            results,
        }
    }

    #[test]
    fn single_add_item_success_is_canned() {
        let b = batch(vec![CommandResult::success("added Quantum Burger")], BatchOutcome::AllSuccess, "ADD_ITEM");
        let resp = aggregate(&b);
        assert_eq!(resp.phrase_category, PhraseCategory::Canned);
        assert_eq!(resp.phrase_id.as_deref(), Some("ITEM_ADDED_SUCCESS"));
    }

    #[test]
    fn fatal_system_is_always_canned_retry() {
        let b = batch(vec![CommandResult::system_error(ErrorCode::InternalError, "boom")], BatchOutcome::FatalSystem, "ADD_ITEM");
        let resp = aggregate(&b);
        assert_eq!(resp.phrase_id.as_deref(), Some("SYSTEM_ERROR_RETRY"));
    }

    #[test]
    fn partial_success_composes_acknowledgements_and_unavailable_sentence() {
        let results = vec![
            CommandResult::success("added Quantum Burger"),
            CommandResult::success("added Nebula Wrap"),
            CommandResult::business_error(ErrorCode::ItemUnavailable, "we don't have galaxy pie")
                .with_data(serde_json::json!({ "requested_item": "galaxy pie" })),
        ];
        let b = batch(results, BatchOutcome::PartialSuccess, "MIXED");
        let resp = aggregate(&b);
        assert_eq!(resp.phrase_category, PhraseCategory::Dynamic);
        assert!(resp.response_text.contains("I added Quantum Burger and Nebula Wrap."));
        assert!(resp.response_text.contains("Sorry, we don't have galaxy pie."));
    }

    #[test]
    fn clarification_needed_surfaces_as_dynamic_question() {
        let results = vec![CommandResult::success("Which one would you like?").with_data(serde_json::json!({
            "ambiguous_item": "fries",
            "suggested_options": ["French Fries", "Galactic Fries"]
        }))];
        let b = batch(results, BatchOutcome::AllSuccess, "MIXED");
        let resp = aggregate(&b);
        assert_eq!(resp.phrase_category, PhraseCategory::Dynamic);
        assert!(resp.response_text.contains("Which one would you like?"));
    }

    #[test]
    fn all_failed_single_modify_is_dynamic_not_canned() {
        let results = vec![CommandResult::business_error(ErrorCode::ModifierRemoveNotPresent, "foie gras isn't on that item")];
        let b = batch(results, BatchOutcome::AllFailed, "MODIFY_ITEM");
        let resp = aggregate(&b);
        assert_eq!(resp.phrase_category, PhraseCategory::Dynamic);
        assert!(resp.response_text.contains("foie gras"));
    }

    #[test]
    fn canned_phrase_shortcut_matches_state_machine_invalid_phrase() {
        let resp = canned_phrase("ORDER_ALREADY_CONFIRMED");
        assert_eq!(resp.phrase_category, PhraseCategory::Canned);
        assert_eq!(resp.response_text, canned::text_for("ORDER_ALREADY_CONFIRMED"));
    }
}
