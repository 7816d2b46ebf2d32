//! Gemini-backed agent with function calling
//!
//! Each turn sends the utterance plus the profile tool declarations to
//! `generateContent`. When the model answers with function calls, the tools are
//! run, their results appended to the conversation, and the model is asked
//! again until it answers with text.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;

use super::{Agent, AgentError, AgentOutput};
use crate::config::AgentConfig;
use crate::tools::{ProfileTools, ToolCallRecord, ToolDeclaration};

/// Blocking JSON-over-HTTP transport
pub trait Transport: Send + Sync {
    /// POST `body` to `url` and return the response body
    fn post(&self, url: &str, headers: &[(&str, &str)], body: &str) -> Result<String, AgentError>;
}

/// [`Transport`] backed by `ureq`
pub struct HttpTransport {
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder().timeout_global(Some(timeout)).build();
        Self { agent: config.into() }
    }
}

impl Transport for HttpTransport {
    fn post(&self, url: &str, headers: &[(&str, &str)], body: &str) -> Result<String, AgentError> {
        let mut request = self.agent.post(url).header("Content-Type", "application/json");
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let mut response = request
            .send(body.as_bytes())
            .map_err(|e| AgentError::Http(e.to_string()))?;

        response
            .body_mut()
            .read_to_string()
            .map_err(|e| AgentError::Http(format!("failed to read response: {}", e)))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts,
        }
    }

    fn text(text: &str) -> Self {
        Self {
            role: None,
            parts: vec![Part {
                text: Some(text.to_string()),
                ..Default::default()
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<FunctionResponse>,
    /// Fields we don't model (e.g. `thoughtSignature`), echoed back as received
    #[serde(flatten)]
    extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct FunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content,
    contents: &'a [Content],
    tools: Vec<ToolSet>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolSet {
    function_declarations: Vec<ToolDeclaration>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

/// Agent that answers through the Gemini `generateContent` API
pub struct GeminiAgent {
    model: String,
    endpoint: String,
    api_key_env: String,
    api_key: Option<String>,
    instructions: String,
    max_tool_rounds: usize,
    tools: ProfileTools,
    transport: Box<dyn Transport>,
}

impl GeminiAgent {
    /// Build an agent from settings. A missing `api_key` is only reported when the agent is invoked.
    pub fn new(settings: &AgentConfig, api_key: Option<String>, tools: ProfileTools) -> Self {
        let transport = HttpTransport::new(Duration::from_secs(settings.timeout_secs));
        Self::with_transport(settings, api_key, tools, transport)
    }

    pub fn with_transport(
        settings: &AgentConfig,
        api_key: Option<String>,
        tools: ProfileTools,
        transport: impl Transport + 'static,
    ) -> Self {
        Self {
            model: settings.model.clone(),
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            api_key_env: settings.api_key_env.clone(),
            api_key,
            instructions: settings.instructions.clone(),
            max_tool_rounds: settings.max_tool_rounds,
            tools,
            transport: Box::new(transport),
        }
    }

    fn generate(&self, api_key: &str, contents: &[Content]) -> Result<Content, AgentError> {
        let request = GenerateRequest {
            system_instruction: Content::text(&self.instructions),
            contents,
            tools: vec![ToolSet {
                function_declarations: self.tools.declarations(),
            }],
        };
        let body = serde_json::to_string(&request).map_err(|e| AgentError::Decode(e.to_string()))?;

        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        log::debug!("POST {} ({} contents)", url, contents.len());

        let response_body = self.transport.post(&url, &[("x-goog-api-key", api_key)], &body)?;
        let response: GenerateResponse =
            serde_json::from_str(&response_body).map_err(|e| AgentError::Decode(e.to_string()))?;

        let candidate = response.candidates.into_iter().next().ok_or(AgentError::EmptyResponse)?;
        if let Some(reason) = &candidate.finish_reason {
            log::debug!("Gemini finish reason: {}", reason);
        }
        candidate.content.ok_or(AgentError::EmptyResponse)
    }

    fn run_tool(&self, call: &FunctionCall) -> Value {
        match self.tools.dispatch(&call.name, &call.args) {
            Ok(output) => output,
            Err(e) => {
                log::warn!("Tool {} failed: {}", call.name, e);
                json!({ "error": e.to_string() })
            }
        }
    }
}

impl Agent for GeminiAgent {
    fn invoke(&self, utterance: &str) -> Result<AgentOutput, AgentError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AgentError::Unavailable(format!("{} is not set", self.api_key_env)))?;

        let mut contents = vec![Content::user(vec![Part {
            text: Some(utterance.to_string()),
            ..Default::default()
        }])];
        let mut tool_calls = Vec::new();
        let mut rounds = 0;

        loop {
            let mut content = self.generate(api_key, &contents)?;

            let calls: Vec<FunctionCall> = content.parts.iter().filter_map(|p| p.function_call.clone()).collect();

            if calls.is_empty() {
                let text: String = content.parts.iter().filter_map(|p| p.text.as_deref()).collect();
                if text.trim().is_empty() {
                    return Err(AgentError::EmptyResponse);
                }
                log::info!("Gemini replied after {} tool rounds", rounds);
                let text = text.trim_end().to_string();
                if tool_calls.is_empty() {
                    return Ok(AgentOutput::Text(text));
                }
                return Ok(AgentOutput::Final {
                    final_output: text,
                    tool_calls,
                });
            }

            if rounds >= self.max_tool_rounds {
                return Err(AgentError::ToolRounds(self.max_tool_rounds));
            }
            rounds += 1;

            content.role = Some("model".to_string());
            contents.push(content);

            let mut responses = Vec::with_capacity(calls.len());
            for call in calls {
                let output = self.run_tool(&call);
                let response = if output.is_object() {
                    output.clone()
                } else {
                    json!({ "result": output })
                };

                tool_calls.push(ToolCallRecord {
                    tool_name: call.name.clone(),
                    tool_input: call.args.clone(),
                    tool_output: output,
                });
                responses.push(Part {
                    function_response: Some(FunctionResponse {
                        name: call.name,
                        response,
                    }),
                    ..Default::default()
                });
            }
            contents.push(Content::user(responses));
        }
    }
}
