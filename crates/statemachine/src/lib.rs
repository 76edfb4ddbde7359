//! Conversation State Machine (C5): a pure, table-driven function from
//! `(current state, recognized intent)` to the next state. Carries no
//! ports and no I/O — every other component can be exercised against it
//! without a mock.

use sa_domain::types::{ConversationState, IntentType};

/// Outcome of looking up a single `(state, intent)` cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// State the session moves to. Equal to the input state when the
    /// intent does not advance the conversation (small talk, repeat, a
    /// pure question).
    pub target_state: ConversationState,
    /// Whether this transition should be routed through the Command Bus
    /// (C3) at all. `false` for small talk/repeat, which are answered
    /// directly by the Response Aggregator.
    pub requires_command: bool,
    /// `false` marks a transition the state machine refuses to take —
    /// the session stays in its current state and `invalid_phrase`
    /// names the canned phrase the Response Aggregator should use.
    pub is_valid: bool,
    pub invalid_phrase: Option<&'static str>,
}

impl Transition {
    fn valid(target_state: ConversationState, requires_command: bool) -> Self {
        Self { target_state, requires_command, is_valid: true, invalid_phrase: None }
    }

    fn invalid(current_state: ConversationState, phrase: &'static str) -> Self {
        Self {
            target_state: current_state,
            requires_command: false,
            is_valid: false,
            invalid_phrase: Some(phrase),
        }
    }
}

use ConversationState::*;
use IntentType::*;

/// Look up the transition for `(state, intent)`. Total over both enums —
/// every combination has a defined, deterministic result.
pub fn transition(state: ConversationState, intent: IntentType) -> Transition {
    // ADD_ITEM always opens or reopens ordering, regardless of where the
    // conversation currently sits.
    if intent == AddItem {
        return Transition::valid(Ordering, true);
    }

    match (state, intent) {
        // ── IDLE ────────────────────────────────────────────────────
        (Idle, RemoveItem) | (Idle, ModifyItem) | (Idle, ClearOrder) | (Idle, ConfirmOrder) => {
            Transition::invalid(Idle, "NOTHING_TO_CONFIRM")
        }
        (Idle, Question) | (Idle, Unknown) => Transition::valid(Idle, true),
        (Idle, SmallTalk) | (Idle, Repeat) => Transition::valid(Idle, false),

        // ── ORDERING ────────────────────────────────────────────────
        (Ordering, RemoveItem) | (Ordering, ModifyItem) | (Ordering, ClearOrder) => {
            Transition::valid(Ordering, true)
        }
        (Ordering, ConfirmOrder) => Transition::valid(Confirming, false),
        (Ordering, Question) | (Ordering, Unknown) => Transition::valid(Ordering, true),
        (Ordering, SmallTalk) | (Ordering, Repeat) => Transition::valid(Ordering, false),

        // ── THINKING (a turn is already in flight for this session) ──
        (Thinking, _) => Transition::invalid(Thinking, "STILL_PROCESSING"),

        // ── CLARIFYING (waiting on the answer to a disambiguation) ───
        (Clarifying, RemoveItem)
        | (Clarifying, ModifyItem)
        | (Clarifying, ClearOrder)
        | (Clarifying, ConfirmOrder) => Transition::invalid(Clarifying, "PLEASE_ANSWER_CLARIFICATION"),
        (Clarifying, Question) | (Clarifying, Unknown) => Transition::valid(Clarifying, true),
        (Clarifying, SmallTalk) | (Clarifying, Repeat) => Transition::valid(Clarifying, false),

        // ── CONFIRMING (summary read back, awaiting final yes/no) ────
        (Confirming, ConfirmOrder) => Transition::valid(Closing, false),
        (Confirming, RemoveItem) | (Confirming, ModifyItem) | (Confirming, ClearOrder) => {
            Transition::valid(Ordering, true)
        }
        (Confirming, Question) | (Confirming, Unknown) => Transition::valid(Confirming, true),
        (Confirming, SmallTalk) | (Confirming, Repeat) => Transition::valid(Confirming, false),

        // ── CLOSING (order already confirmed and sent to the kitchen) ─
        (Closing, RemoveItem)
        | (Closing, ModifyItem)
        | (Closing, ClearOrder)
        | (Closing, ConfirmOrder) => Transition::invalid(Closing, "ORDER_ALREADY_CONFIRMED"),
        (Closing, Question) | (Closing, Unknown) => Transition::valid(Closing, true),
        (Closing, SmallTalk) | (Closing, Repeat) => Transition::valid(Closing, false),

        (_, AddItem) => unreachable!("handled above"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATES: [ConversationState; 6] =
        [Idle, Ordering, Thinking, Clarifying, Confirming, Closing];
    const INTENTS: [IntentType; 9] = [
        AddItem, RemoveItem, ModifyItem, ClearOrder, ConfirmOrder, Question, SmallTalk, Repeat,
        Unknown,
    ];

    #[test]
    fn table_is_total_and_never_panics() {
        for &s in &STATES {
            for &i in &INTENTS {
                let t = transition(s, i);
                if !t.is_valid {
                    assert_eq!(t.target_state, s, "invalid transitions stay put");
                    assert!(t.invalid_phrase.is_some());
                }
            }
        }
    }

    #[test]
    fn add_item_always_opens_ordering() {
        for &s in &STATES {
            let t = transition(s, AddItem);
            assert!(t.is_valid);
            assert_eq!(t.target_state, Ordering);
            assert!(t.requires_command);
        }
    }

    #[test]
    fn ordering_confirm_order_moves_to_confirming_without_a_command() {
        let t = transition(Ordering, ConfirmOrder);
        assert!(t.is_valid);
        assert_eq!(t.target_state, Confirming);
        assert!(!t.requires_command);
    }

    #[test]
    fn confirming_confirm_order_closes_the_order() {
        let t = transition(Confirming, ConfirmOrder);
        assert!(t.is_valid);
        assert_eq!(t.target_state, Closing);
    }

    #[test]
    fn closing_rejects_further_order_mutation() {
        for intent in [RemoveItem, ModifyItem, ClearOrder, ConfirmOrder] {
            let t = transition(Closing, intent);
            assert!(!t.is_valid);
            assert_eq!(t.target_state, Closing);
            assert_eq!(t.invalid_phrase, Some("ORDER_ALREADY_CONFIRMED"));
        }
    }

    #[test]
    fn thinking_rejects_everything_except_add_item() {
        for &i in &INTENTS {
            if i == AddItem {
                continue;
            }
            let t = transition(Thinking, i);
            assert!(!t.is_valid);
            assert_eq!(t.invalid_phrase, Some("STILL_PROCESSING"));
        }
    }

    #[test]
    fn clarifying_blocks_order_mutation_until_resolved() {
        for intent in [RemoveItem, ModifyItem, ClearOrder, ConfirmOrder] {
            let t = transition(Clarifying, intent);
            assert!(!t.is_valid);
            assert_eq!(t.invalid_phrase, Some("PLEASE_ANSWER_CLARIFICATION"));
        }
    }

    #[test]
    fn small_talk_and_repeat_never_require_a_command_or_change_state() {
        for &s in &STATES {
            for intent in [SmallTalk, Repeat] {
                let t = transition(s, intent);
                if t.is_valid {
                    assert!(!t.requires_command);
                    assert_eq!(t.target_state, s);
                }
            }
        }
    }

    #[test]
    fn idle_rejects_mutation_with_no_order_open() {
        for intent in [RemoveItem, ModifyItem, ClearOrder, ConfirmOrder] {
            let t = transition(Idle, intent);
            assert!(!t.is_valid);
        }
    }
}
