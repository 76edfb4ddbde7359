//! Batch outcome derivation (§4.3): a deterministic, order-independent
//! classification of a command batch's results.

use std::collections::HashMap;

use sa_domain::types::{
    BatchOutcome, Command, CommandBatchResult, CommandResult, ErrorCategory, FollowUpAction,
    ResultStatus,
};

fn category_key(cat: ErrorCategory) -> &'static str {
    match cat {
        ErrorCategory::Validation => "VALIDATION",
        ErrorCategory::Business => "BUSINESS",
        ErrorCategory::System => "SYSTEM",
    }
}

fn code_key(code: sa_domain::error::ErrorCode) -> String {
    serde_json::to_value(code)
        .ok()
        .and_then(|v| v.as_str().map(str::to_owned))
        .unwrap_or_else(|| "UNKNOWN".to_string())
}

fn intent_key(command: &Command) -> String {
    serde_json::to_value(command.intent())
        .ok()
        .and_then(|v| v.as_str().map(str::to_owned))
        .unwrap_or_else(|| "UNKNOWN".to_string())
}

/// Derive `(batch_outcome, follow_up_action)` from a batch's results alone.
/// Pure and order-independent, as required by §4.3 and tested exhaustively
/// per §13.
pub fn derive_outcome(results: &[CommandResult]) -> (BatchOutcome, FollowUpAction) {
    let has_system = results
        .iter()
        .any(|r| r.error_category == Some(ErrorCategory::System));
    if has_system {
        return (BatchOutcome::FatalSystem, FollowUpAction::Stop);
    }

    let all_success = results.iter().all(|r| r.status == ResultStatus::Success);
    if all_success {
        return (BatchOutcome::AllSuccess, FollowUpAction::Continue);
    }

    let any_non_error = results.iter().any(|r| r.status != ResultStatus::Error);
    if any_non_error {
        (BatchOutcome::PartialSuccess, FollowUpAction::Ask)
    } else {
        (BatchOutcome::AllFailed, FollowUpAction::Ask)
    }
}

fn command_family(commands: &[Command]) -> String {
    if commands.is_empty() {
        return "NONE".to_string();
    }
    let first = intent_key(&commands[0]);
    if commands.iter().all(|c| intent_key(c) == first) {
        first
    } else {
        "MIXED".to_string()
    }
}

fn summarize(batch_outcome: BatchOutcome, results: &[CommandResult]) -> String {
    match batch_outcome {
        BatchOutcome::AllSuccess => "all commands succeeded".to_string(),
        BatchOutcome::PartialSuccess => format!(
            "{} of {} commands succeeded",
            results.iter().filter(|r| r.status != ResultStatus::Error).count(),
            results.len()
        ),
        BatchOutcome::AllFailed => "all commands failed".to_string(),
        BatchOutcome::FatalSystem => "a system error interrupted the batch".to_string(),
    }
}

pub fn build_batch_result(commands: &[Command], results: Vec<CommandResult>) -> CommandBatchResult {
    let total = results.len();
    let successful = results.iter().filter(|r| r.status == ResultStatus::Success).count();
    let failed = total - successful;

    let mut errors_by_category: HashMap<String, usize> = HashMap::new();
    let mut errors_by_code: HashMap<String, usize> = HashMap::new();
    for r in &results {
        if let Some(cat) = r.error_category {
            *errors_by_category.entry(category_key(cat).to_string()).or_insert(0) += 1;
        }
        if let Some(code) = r.error_code {
            *errors_by_code.entry(code_key(code)).or_insert(0) += 1;
        }
    }

    let (batch_outcome, follow_up_action) = derive_outcome(&results);
    let summary_message = summarize(batch_outcome, &results);
    let family = command_family(commands);

    CommandBatchResult {
        results,
        total,
        successful,
        failed,
        errors_by_category,
        errors_by_code,
        batch_outcome,
        follow_up_action,
        summary_message,
        command_family: family,
    }
}
