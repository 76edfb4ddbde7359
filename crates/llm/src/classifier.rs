//! Intent Classifier (C4): a single structured LLM call that turns the
//! current utterance plus recent history into `(intent, confidence,
//! cleansed_input)`. No side effects, no retries of its own — a provider
//! failure propagates straight to the orchestrator.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use sa_domain::error::{Error, Result};
use sa_domain::ports::{ChatMessage, ChatRequest, LLMClient};
use sa_domain::types::{IntentType, Turn};

const SYSTEM_PROMPT: &str = "You are the intent classifier for a drive-thru ordering \
assistant. Read the customer's utterance plus recent conversation history and \
classify it. Preserve every item name, quantity and modifier mentioned into \
cleansed_input; strip only background chatter. When unsure, prefer a lower \
confidence score over leaving anything out.";

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierOutput {
    pub intent: IntentType,
    pub confidence: f64,
    pub cleansed_input: String,
}

fn response_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "intent": {
                "type": "string",
                "enum": ["ADD_ITEM", "REMOVE_ITEM", "MODIFY_ITEM", "CLEAR_ORDER",
                         "CONFIRM_ORDER", "QUESTION", "SMALL_TALK", "REPEAT", "UNKNOWN"]
            },
            "confidence": { "type": "number", "minimum": 0.0, "maximum": 1.0 },
            "cleansed_input": { "type": "string" }
        },
        "required": ["intent", "confidence", "cleansed_input"],
        "additionalProperties": false
    })
}

pub struct IntentClassifier {
    llm: Arc<dyn LLMClient>,
    model: String,
}

impl IntentClassifier {
    pub fn new(llm: Arc<dyn LLMClient>, model: impl Into<String>) -> Self {
        Self { llm, model: model.into() }
    }

    pub async fn classify(
        &self,
        utterance: &str,
        history: &[Turn],
        order_snapshot: &str,
    ) -> Result<ClassifierOutput> {
        let mut messages = vec![ChatMessage { role: "system".into(), content: SYSTEM_PROMPT.into() }];
        for turn in history {
            messages.push(ChatMessage { role: "user".into(), content: turn.user_input.clone() });
            messages.push(ChatMessage { role: "assistant".into(), content: turn.response_text.clone() });
        }
        messages.push(ChatMessage {
            role: "user".into(),
            content: format!("Current order: {order_snapshot}\n\nUtterance: {utterance}"),
        });

        let req = ChatRequest {
            model: self.model.clone(),
            messages,
            tools: vec![],
            response_schema: Some(response_schema()),
        };

        let resp = self.llm.chat(req).await?;
        let value = resp
            .structured
            .ok_or_else(|| Error::System("intent classifier returned no structured output".into()))?;
        serde_json::from_value(value)
            .map_err(|e| Error::System(format!("intent classifier output failed validation: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sa_domain::ports::ChatResponse;

    struct FakeLlm(serde_json::Value);

    #[async_trait]
    impl LLMClient for FakeLlm {
        async fn chat(&self, _req: ChatRequest) -> Result<ChatResponse> {
            Ok(ChatResponse { text: None, structured: Some(self.0.clone()), tool_calls: vec![] })
        }
    }

    #[tokio::test]
    async fn classifies_add_item_from_structured_output() {
        let llm = Arc::new(FakeLlm(json!({
            "intent": "ADD_ITEM",
            "confidence": 0.92,
            "cleansed_input": "two quantum burgers with extra cheese"
        })));
        let classifier = IntentClassifier::new(llm, "gpt-4o-mini");
        let out = classifier
            .classify("uh yeah gimme like two quantum burgers extra cheese please", &[], "{}")
            .await
            .unwrap();
        assert_eq!(out.intent, IntentType::AddItem);
        assert!(out.confidence > 0.9);
        assert!(out.cleansed_input.contains("quantum burger"));
    }

    #[tokio::test]
    async fn missing_structured_output_is_a_system_error() {
        struct NoStructure;
        #[async_trait]
        impl LLMClient for NoStructure {
            async fn chat(&self, _req: ChatRequest) -> Result<ChatResponse> {
                Ok(ChatResponse { text: Some("not json".into()), structured: None, tool_calls: vec![] })
            }
        }
        let classifier = IntentClassifier::new(Arc::new(NoStructure), "gpt-4o-mini");
        let err = classifier.classify("hello", &[], "{}").await.unwrap_err();
        assert!(matches!(err, Error::System(_)));
    }

    #[tokio::test]
    async fn malformed_structured_output_is_a_system_error() {
        let llm = Arc::new(FakeLlm(json!({ "intent": "NOT_A_REAL_INTENT" })));
        let classifier = IntentClassifier::new(llm, "gpt-4o-mini");
        let err = classifier.classify("hello", &[], "{}").await.unwrap_err();
        assert!(matches!(err, Error::System(_)));
    }
}
