//! Two-stage `ADD_ITEM` parser: an extraction LLM call with no tools,
//! followed by menu resolution (exact match / unavailable / disambiguation)
//! against the Menu Read Model's `search`.

use serde::Deserialize;
use serde_json::json;

use sa_domain::error::{Error, Result};
use sa_domain::ports::{ChatMessage, ChatRequest, LLMClient};
use sa_domain::types::{Command, MenuItem};
use sa_menu::MenuReadModel;

const EXTRACTION_PROMPT: &str = "Extract every distinct food item the customer \
mentions, even ones you don't recognize. For each, give the item name as the \
customer said it, quantity (default 1), an optional size, a list of modifier \
phrases, and optional special instructions. Surface low-confidence guesses \
rather than omitting an item.";

#[derive(Debug, Clone, Deserialize)]
struct ExtractedItem {
    item_name: String,
    quantity: u32,
    #[serde(default)]
    size: Option<String>,
    modifiers: Vec<String>,
    #[serde(default)]
    special_instructions: Option<String>,
    #[allow(dead_code)]
    confidence: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct ItemExtractionResponse {
    #[allow(dead_code)]
    success: bool,
    #[allow(dead_code)]
    confidence: f64,
    extracted_items: Vec<ExtractedItem>,
}

fn extraction_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "success": { "type": "boolean" },
            "confidence": { "type": "number", "minimum": 0.0, "maximum": 1.0 },
            "extracted_items": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "item_name": { "type": "string" },
                        "quantity": { "type": "integer", "minimum": 1 },
                        "size": { "type": "string" },
                        "modifiers": { "type": "array", "items": { "type": "string" } },
                        "special_instructions": { "type": "string" },
                        "confidence": { "type": "number", "minimum": 0.0, "maximum": 1.0 }
                    },
                    "required": ["item_name", "quantity", "modifiers", "confidence"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["success", "confidence", "extracted_items"],
        "additionalProperties": false
    })
}

fn disambiguation_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": { "chosen_name": { "type": "string" } },
        "required": ["chosen_name"],
        "additionalProperties": false
    })
}

pub async fn parse(
    llm: &dyn LLMClient,
    model: &str,
    menu: &MenuReadModel,
    restaurant_id: i64,
    cleansed_input: &str,
) -> Result<Vec<Command>> {
    let req = ChatRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage { role: "system".into(), content: EXTRACTION_PROMPT.into() },
            ChatMessage { role: "user".into(), content: cleansed_input.to_string() },
        ],
        tools: vec![],
        response_schema: Some(extraction_schema()),
    };
    let resp = llm.chat(req).await?;
    let value = resp
        .structured
        .ok_or_else(|| Error::System("ADD_ITEM extraction returned no structured output".into()))?;
    let extraction: ItemExtractionResponse = serde_json::from_value(value)
        .map_err(|e| Error::System(format!("ADD_ITEM extraction failed validation: {e}")))?;

    let mut commands = Vec::with_capacity(extraction.extracted_items.len());
    for item in extraction.extracted_items {
        commands.push(resolve_one(llm, model, menu, restaurant_id, item).await?);
    }
    Ok(commands)
}

async fn resolve_one(
    llm: &dyn LLMClient,
    model: &str,
    menu: &MenuReadModel,
    restaurant_id: i64,
    item: ExtractedItem,
) -> Result<Command> {
    let hits = menu.search(restaurant_id, &item.item_name).await;
    match hits.len() {
        0 => Ok(Command::ItemUnavailable {
            requested_item: item.item_name.clone(),
            message: format!("we don't have {}", item.item_name),
        }),
        1 => Ok(Command::AddItem {
            menu_item_id: Some(hits[0].id.clone()),
            item_name: hits[0].name.clone(),
            quantity: item.quantity,
            size: item.size,
            modifiers: item.modifiers,
            special_instructions: item.special_instructions,
        }),
        _ => disambiguate(llm, model, item, hits).await,
    }
}

async fn disambiguate(
    llm: &dyn LLMClient,
    model: &str,
    item: ExtractedItem,
    hits: Vec<MenuItem>,
) -> Result<Command> {
    let options: Vec<String> = hits.iter().map(|m| m.name.clone()).collect();
    let prompt = format!(
        "The customer asked for \"{}\". Candidates: {}. Pick the single best match's exact name.",
        item.item_name,
        options.join(", ")
    );
    let req = ChatRequest {
        model: model.to_string(),
        messages: vec![ChatMessage { role: "user".into(), content: prompt }],
        tools: vec![],
        response_schema: Some(disambiguation_schema()),
    };
    let resp = llm.chat(req).await?;
    let chosen = resp
        .structured
        .as_ref()
        .and_then(|v| v.get("chosen_name"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    match chosen.and_then(|name| hits.iter().find(|m| m.name == name).cloned()) {
        Some(picked) => Ok(Command::AddItem {
            menu_item_id: Some(picked.id),
            item_name: picked.name,
            quantity: item.quantity,
            size: item.size,
            modifiers: item.modifiers,
            special_instructions: item.special_instructions,
        }),
        None => Ok(Command::ClarificationNeeded {
            ambiguous_item: item.item_name,
            suggested_options: options,
            clarification_question: "Which one would you like?".into(),
        }),
    }
}
