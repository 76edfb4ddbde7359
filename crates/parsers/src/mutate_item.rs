//! LLM-backed parser for `REMOVE_ITEM` and `MODIFY_ITEM`, sharing
//! `ADD_ITEM`'s two-stage discipline: a single extraction call against the
//! cleansed input, then resolution of the named target against the
//! *current order's lines* (the candidate set), never against the menu
//! catalog.

use serde::Deserialize;
use serde_json::json;

use sa_domain::error::{Error, Result};
use sa_domain::ports::{ChatMessage, ChatRequest, LLMClient};
use sa_domain::types::{Command, ModifyChanges, OrderAggregate, TargetRef};
use sa_menu::MenuReadModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum MutationAction {
    Remove,
    Modify,
}

#[derive(Debug, Clone, Deserialize)]
struct MutationExtraction {
    action: MutationAction,
    #[serde(default)]
    target_item_name: Option<String>,
    #[serde(default)]
    refers_to_last_item: bool,
    #[serde(default)]
    add_modifier: Option<String>,
    #[serde(default)]
    remove_modifier: Option<String>,
    #[serde(default)]
    set_special_instructions: Option<String>,
    #[serde(default)]
    clear_special_instructions: bool,
    #[serde(default)]
    set_size: Option<String>,
    #[serde(default)]
    set_quantity: Option<u32>,
}

fn extraction_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "action": { "type": "string", "enum": ["REMOVE", "MODIFY"] },
            "target_item_name": { "type": "string" },
            "refers_to_last_item": { "type": "boolean" },
            "add_modifier": { "type": "string" },
            "remove_modifier": { "type": "string" },
            "set_special_instructions": { "type": "string" },
            "clear_special_instructions": { "type": "boolean" },
            "set_size": { "type": "string" },
            "set_quantity": { "type": "integer", "minimum": 0 }
        },
        "required": ["action", "refers_to_last_item", "clear_special_instructions"],
        "additionalProperties": false
    })
}

const SYSTEM_PROMPT: &str = "The customer wants to remove or change an item \
already in their order. Decide whether this is a REMOVE or a MODIFY, name \
the item they mean as they said it (or set refers_to_last_item if they used \
a pronoun like \"that\" or \"it\"), and capture only the fields that changed.";

pub async fn parse(
    llm: &dyn LLMClient,
    model: &str,
    menu: &MenuReadModel,
    restaurant_id: i64,
    order: &OrderAggregate,
    cleansed_input: &str,
) -> Result<Command> {
    let req = ChatRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage { role: "system".into(), content: SYSTEM_PROMPT.into() },
            ChatMessage { role: "user".into(), content: cleansed_input.to_string() },
        ],
        tools: vec![],
        response_schema: Some(extraction_schema()),
    };
    let resp = llm.chat(req).await?;
    let value = resp
        .structured
        .ok_or_else(|| Error::System("REMOVE/MODIFY extraction returned no structured output".into()))?;
    let extraction: MutationExtraction = serde_json::from_value(value)
        .map_err(|e| Error::System(format!("REMOVE/MODIFY extraction failed validation: {e}")))?;

    match extraction.action {
        MutationAction::Remove => {
            let target_ref = if extraction.refers_to_last_item {
                Some(TargetRef::LastItem)
            } else {
                extraction.target_item_name.clone().map(|name| TargetRef::ByName { name })
            };
            Ok(Command::RemoveItem { order_item_id: None, target_ref })
        }
        MutationAction::Modify => {
            let order_item_id =
                resolve_order_item_id(menu, restaurant_id, order, &extraction).await.unwrap_or_default();
            Ok(Command::ModifyItem {
                order_item_id,
                changes: ModifyChanges {
                    add_modifier: extraction.add_modifier,
                    remove_modifier: extraction.remove_modifier,
                    set_special_instructions: extraction.set_special_instructions,
                    clear_special_instructions: extraction.clear_special_instructions,
                    set_size: extraction.set_size,
                    set_quantity: extraction.set_quantity,
                },
            })
        }
    }
}

/// `MODIFY_ITEM` needs a concrete `order_item_id`, resolved against the
/// lines already in the order rather than the menu catalog.
async fn resolve_order_item_id(
    menu: &MenuReadModel,
    restaurant_id: i64,
    order: &OrderAggregate,
    extraction: &MutationExtraction,
) -> Option<String> {
    if extraction.refers_to_last_item {
        return order.items.last().map(|l| l.line_id.clone());
    }

    let name = extraction.target_item_name.as_ref()?;
    let resolved = menu.item_by_name(restaurant_id, name).await;
    let menu_item_id = resolved.map(|m| m.id);

    order
        .items
        .iter()
        .find(|line| menu_item_id.as_deref() == Some(line.menu_item_id.as_str()))
        .map(|line| line.line_id.clone())
}
