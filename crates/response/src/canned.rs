//! Fixed phrase table for `CANNED` responses. Every `phrase_id` the state
//! machine, the orchestrator's confidence gate, or this aggregator chooses
//! maps to exactly one line of text here.

pub fn text_for(phrase_id: &str) -> &'static str {
    match phrase_id {
        "ITEM_ADDED_SUCCESS" => "Got it, I've added that to your order.",
        "ITEM_REMOVED_SUCCESS" => "Done, I've taken that off your order.",
        "ITEM_MODIFIED_SUCCESS" => "Got it, I've updated that item.",
        "ORDER_CLEARED" => "Okay, I've cleared your order.",
        "ORDER_CONFIRMED" => "Perfect, your order is confirmed and on its way to the kitchen.",
        "SYSTEM_ERROR_RETRY" => "Sorry, we're having some technical difficulties. Could you try that again?",
        "DIDNT_UNDERSTAND" => "Sorry, I didn't quite catch that.",
        "ORDER_ALREADY_CONFIRMED" => "Your order's already been sent to the kitchen, so I can't change it now.",
        "STILL_PROCESSING" => "Hang on, I'm still working on your last request.",
        "PLEASE_ANSWER_CLARIFICATION" => "Let's finish answering my last question first.",
        "NOTHING_TO_CONFIRM" => "There's nothing to confirm yet — would you like to start an order?",
        "SMALL_TALK_ACK" => "Happy to chat, but let's get your order sorted first. What can I get you?",
        "NOTHING_TO_REPEAT" => "I don't have anything to repeat yet.",
        _ => "Sorry, something went wrong on our end.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_phrase_id_falls_back_to_a_generic_line() {
        assert_eq!(text_for("NOT_A_REAL_PHRASE"), "Sorry, something went wrong on our end.");
    }

    #[test]
    fn every_state_machine_invalid_phrase_has_text() {
        for id in ["NOTHING_TO_CONFIRM", "STILL_PROCESSING", "PLEASE_ANSWER_CLARIFICATION", "ORDER_ALREADY_CONFIRMED"]
        {
            assert_ne!(text_for(id), "Sorry, something went wrong on our end.");
        }
    }

    #[test]
    fn orchestrator_short_circuit_phrases_have_text() {
        for id in ["SMALL_TALK_ACK", "NOTHING_TO_REPEAT"] {
            assert_ne!(text_for(id), "Sorry, something went wrong on our end.");
        }
    }
}
