//! Rule-based parsers: `CLEAR_ORDER` and `CONFIRM_ORDER` carry no slots at
//! all, `QUESTION` only needs a keyword-inferred category, and `UNKNOWN`
//! needs a canned clarifying question. None of these call the LLM.

use sa_domain::types::{Command, QuestionCategory};

pub fn clear_order() -> Command {
    Command::ClearOrder
}

pub fn confirm_order() -> Command {
    Command::ConfirmOrder
}

const PRICING_WORDS: &[&str] = &["cost", "price", "how much", "expensive", "cheap"];
const HOURS_WORDS: &[&str] = &["hour", "open", "close", "closing", "time"];
const ALLERGEN_WORDS: &[&str] = &["allerg", "gluten", "nut", "dairy", "vegan", "vegetarian"];
const MENU_WORDS: &[&str] = &["menu", "have", "offer", "sell", "flavor", "flavour"];

pub fn question(verbatim: &str) -> Command {
    let lower = verbatim.to_lowercase();
    let category = if PRICING_WORDS.iter().any(|w| lower.contains(w)) {
        QuestionCategory::Pricing
    } else if HOURS_WORDS.iter().any(|w| lower.contains(w)) {
        QuestionCategory::Hours
    } else if ALLERGEN_WORDS.iter().any(|w| lower.contains(w)) {
        QuestionCategory::Allergens
    } else if MENU_WORDS.iter().any(|w| lower.contains(w)) {
        QuestionCategory::Menu
    } else {
        QuestionCategory::Other
    };
    Command::Question { question: verbatim.to_string(), category: Some(category) }
}

pub fn unknown(user_input: &str) -> Command {
    Command::Unknown {
        user_input: user_input.to_string(),
        clarifying_question: Some("Sorry, I didn't catch that — could you say it again?".into()),
    }
}
