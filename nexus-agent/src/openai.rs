//! OpenAI-compatible chat-completions oracle adapter.
//!
//! Maps the run transcript to chat messages, tool specs to function
//! declarations, and the output contract to a strict `json_schema` response
//! format. Works against any endpoint speaking the chat-completions dialect;
//! point `base_url` at a proxy or a local server to swap providers.

use serde::Deserialize;
use serde_json::{json, Value};

use async_trait::async_trait;

use crate::error::{AgentError, Result};
use crate::history::WorkItem;
use crate::oracle::{OracleRequest, OracleTurn, ReasoningOracle, ToolCallRequest};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4.1";

pub struct OpenAiOracle {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiOracle {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Chat-completions requires tool calls grouped into one assistant
    /// message ahead of their `tool` role results; the flat transcript is
    /// regrouped here.
    fn build_messages(instructions: &str, transcript: &[WorkItem]) -> Vec<Value> {
        let mut messages = vec![json!({"role": "system", "content": instructions})];
        let mut pending_calls: Vec<Value> = Vec::new();

        for item in transcript {
            if let WorkItem::ToolCall {
                call_id,
                tool,
                arguments,
            } = item
            {
                pending_calls.push(json!({
                    "id": call_id,
                    "type": "function",
                    "function": {"name": tool, "arguments": arguments.to_string()},
                }));
                continue;
            }
            if !pending_calls.is_empty() {
                messages.push(json!({
                    "role": "assistant",
                    "content": null,
                    "tool_calls": std::mem::take(&mut pending_calls),
                }));
            }
            match item {
                WorkItem::UserMessage { text } => {
                    messages.push(json!({"role": "user", "content": text}));
                }
                WorkItem::AgentMessage { text, .. } => {
                    messages.push(json!({"role": "assistant", "content": text}));
                }
                WorkItem::ToolResult {
                    call_id, output, ..
                } => {
                    messages.push(json!({
                        "role": "tool",
                        "tool_call_id": call_id,
                        "content": output,
                    }));
                }
                WorkItem::ToolCall { .. } => {}
            }
        }
        if !pending_calls.is_empty() {
            messages.push(json!({
                "role": "assistant",
                "content": null,
                "tool_calls": pending_calls,
            }));
        }
        messages
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<RawToolCall>,
}

#[derive(Debug, Deserialize)]
struct RawToolCall {
    id: String,
    function: RawFunction,
}

#[derive(Debug, Deserialize)]
struct RawFunction {
    name: String,
    arguments: String,
}

#[async_trait]
impl ReasoningOracle for OpenAiOracle {
    async fn complete(&self, request: OracleRequest<'_>) -> Result<OracleTurn> {
        let mut body = json!({
            "model": &self.model,
            "messages": Self::build_messages(request.instructions, request.transcript),
            "temperature": request.settings.temperature,
            "top_p": request.settings.top_p,
            "max_tokens": request.settings.max_tokens,
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": &request.contract.name,
                    "schema": &request.contract.schema,
                    "strict": true,
                },
            },
        });
        if !request.tools.is_empty() {
            body["tools"] = Value::Array(
                request
                    .tools
                    .iter()
                    .map(|spec| {
                        json!({
                            "type": "function",
                            "function": {
                                "name": &spec.name,
                                "description": &spec.description,
                                "parameters": &spec.parameters,
                            },
                        })
                    })
                    .collect(),
            );
            body["parallel_tool_calls"] = Value::Bool(request.settings.parallel_tool_calls);
        }

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::Oracle(format!("transport error: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AgentError::Oracle(format!("HTTP {status}: {detail}")));
        }
        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Oracle(format!("malformed response body: {e}")))?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Oracle("response contained no choices".into()))?;

        if !choice.message.tool_calls.is_empty() {
            let calls = choice
                .message
                .tool_calls
                .into_iter()
                .map(|call| {
                    let arguments = serde_json::from_str(&call.function.arguments)
                        .unwrap_or(Value::Null);
                    ToolCallRequest {
                        call_id: call.id,
                        tool: call.function.name,
                        arguments,
                    }
                })
                .collect();
            return Ok(OracleTurn::ToolCalls(calls));
        }

        match choice.message.content {
            Some(text) if !text.trim().is_empty() => {
                let value = serde_json::from_str(&text).map_err(|e| {
                    AgentError::ContractViolation {
                        agent: request.agent.to_string(),
                        reason: format!("final output is not valid JSON: {e}"),
                    }
                })?;
                Ok(OracleTurn::Final(value))
            }
            _ => Ok(OracleTurn::Empty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn transcript_regroups_tool_calls_ahead_of_results() {
        let transcript = vec![
            WorkItem::UserMessage { text: "hi".into() },
            WorkItem::ToolCall {
                call_id: "c1".into(),
                tool: "execute_cypher_query".into(),
                arguments: json!({"query": "RETURN 1"}),
            },
            WorkItem::ToolCall {
                call_id: "c2".into(),
                tool: "execute_cypher_query".into(),
                arguments: json!({"query": "RETURN 2"}),
            },
            WorkItem::ToolResult {
                call_id: "c1".into(),
                tool: "execute_cypher_query".into(),
                output: "[]".into(),
                is_error: false,
            },
        ];
        let messages = OpenAiOracle::build_messages("sys", &transcript);

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[2]["role"], "assistant");
        assert_eq!(messages[2]["tool_calls"].as_array().map(Vec::len), Some(2));
        assert_eq!(messages[3]["role"], "tool");
        assert_eq!(messages[3]["tool_call_id"], "c1");
    }
}
