//! HTTP adapter for [`LLMClient`], speaking the OpenAI chat-completions
//! wire format. Grounded on the host family's OpenAI-compatible provider:
//! same authenticated-POST-then-parse shape, trimmed to a single provider
//! with no streaming and no tool-call rotation across keys.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use sa_domain::error::{Error, Result};
use sa_domain::ports::{ChatRequest, ChatResponse, LLMClient, ToolCallRequest};

use crate::config::ProviderConfig;

pub struct HttpLlmClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl HttpLlmClient {
    pub fn from_config(cfg: &ProviderConfig, timeout: Duration) -> Result<Self> {
        let api_key = cfg.resolve_api_key()?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| provider_err(e.to_string()))?;
        Ok(Self { base_url: cfg.base_url.trim_end_matches('/').to_string(), api_key, client })
    }

    fn body(&self, req: &ChatRequest) -> Value {
        let messages: Vec<Value> = req
            .messages
            .iter()
            .map(|m| json!({ "role": m.role, "content": m.content }))
            .collect();

        let mut body = json!({ "model": req.model, "messages": messages });
        if !req.tools.is_empty() {
            body["tools"] = Value::Array(req.tools.clone());
        }
        if let Some(schema) = &req.response_schema {
            body["response_format"] = json!({
                "type": "json_schema",
                "json_schema": { "name": "pipeline_response", "schema": schema, "strict": true },
            });
        }
        body
    }
}

fn provider_err(message: String) -> Error {
    Error::Provider { provider: "openai_compat".into(), message }
}

#[async_trait]
impl LLMClient for HttpLlmClient {
    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse> {
        let structured_expected = req.response_schema.is_some();
        let url = format!("{}/chat/completions", self.base_url);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.body(&req))
            .send()
            .await
            .map_err(|e| provider_err(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(provider_err(format!("{status}: {text}")));
        }

        let payload: Value = resp.json().await.map_err(|e| provider_err(e.to_string()))?;
        parse_chat_response(payload, structured_expected)
    }
}

fn parse_chat_response(payload: Value, structured_expected: bool) -> Result<ChatResponse> {
    let choice = payload["choices"]
        .get(0)
        .ok_or_else(|| provider_err("response contained no choices".into()))?;
    let message = &choice["message"];
    let content = message["content"].as_str().map(|s| s.to_string());

    let tool_calls = message["tool_calls"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .filter_map(|tc| {
            let call_id = tc["id"].as_str()?.to_string();
            let tool_name = tc["function"]["name"].as_str()?.to_string();
            let arguments = tc["function"]["arguments"]
                .as_str()
                .and_then(|s| serde_json::from_str(s).ok())
                .unwrap_or(Value::Null);
            Some(ToolCallRequest { call_id, tool_name, arguments })
        })
        .collect();

    let structured =
        if structured_expected { content.as_deref().and_then(|c| serde_json::from_str(c).ok()) } else { None };

    Ok(ChatResponse { text: content, structured, tool_calls })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_text_choice() {
        let payload = json!({
            "choices": [{ "message": { "content": "hello there" } }]
        });
        let resp = parse_chat_response(payload, false).unwrap();
        assert_eq!(resp.text.as_deref(), Some("hello there"));
        assert!(resp.structured.is_none());
    }

    #[test]
    fn parses_structured_json_content() {
        let payload = json!({
            "choices": [{ "message": { "content": "{\"intent\":\"ADD_ITEM\"}" } }]
        });
        let resp = parse_chat_response(payload, true).unwrap();
        assert_eq!(resp.structured, Some(json!({ "intent": "ADD_ITEM" })));
    }

    #[test]
    fn missing_choices_is_a_provider_error() {
        let payload = json!({ "choices": [] });
        let err = parse_chat_response(payload, false).unwrap_err();
        assert!(matches!(err, Error::Provider { .. }));
    }

    #[test]
    fn parses_tool_calls() {
        let payload = json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "function": { "name": "search_menu", "arguments": "{\"query\":\"burger\"}" }
                    }]
                }
            }]
        });
        let resp = parse_chat_response(payload, false).unwrap();
        assert_eq!(resp.tool_calls.len(), 1);
        assert_eq!(resp.tool_calls[0].tool_name, "search_menu");
        assert_eq!(resp.tool_calls[0].arguments, json!({ "query": "burger" }));
    }
}
