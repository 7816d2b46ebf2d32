//! Agents that turn one user utterance into one reply
//!
//! An agent may call the profile tools any number of times before answering.
//! The conversation handler only sees the final [`AgentOutput`].

use crate::tools::ToolCallRecord;

pub mod gemini;

pub use gemini::GeminiAgent;

/// Result of one agent invocation
#[derive(Debug, Clone, PartialEq)]
pub enum AgentOutput {
    /// Structured result with the final answer and the tools used to reach it
    Final {
        final_output: String,
        tool_calls: Vec<ToolCallRecord>,
    },
    /// Plain text answer
    Text(String),
}

impl AgentOutput {
    pub fn text(&self) -> &str {
        match self {
            AgentOutput::Final { final_output, .. } => final_output,
            AgentOutput::Text(text) => text,
        }
    }

    pub fn tool_calls(&self) -> &[ToolCallRecord] {
        match self {
            AgentOutput::Final { tool_calls, .. } => tool_calls,
            AgentOutput::Text(_) => &[],
        }
    }

    pub fn into_parts(self) -> (String, Vec<ToolCallRecord>) {
        match self {
            AgentOutput::Final {
                final_output,
                tool_calls,
            } => (final_output, tool_calls),
            AgentOutput::Text(text) => (text, Vec::new()),
        }
    }
}

/// Why an agent could not produce a reply
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    /// The agent cannot be invoked at all (no credential, nothing bound)
    #[error("agent unavailable: {0}")]
    Unavailable(String),

    #[error("model request failed: {0}")]
    Http(String),

    #[error("could not decode model response: {0}")]
    Decode(String),

    #[error("model returned no usable content")]
    EmptyResponse,

    #[error("model was still calling tools after {0} rounds")]
    ToolRounds(usize),
}

impl AgentError {
    /// Unavailability is expected and gets the fallback reply; everything else is a failure
    pub fn is_unavailable(&self) -> bool {
        matches!(self, AgentError::Unavailable(_))
    }
}

/// Something that can answer a user utterance
pub trait Agent {
    fn invoke(&self, utterance: &str) -> Result<AgentOutput, AgentError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_final_output_text() {
        let output = AgentOutput::Final {
            final_output: "Hello Alice".to_string(),
            tool_calls: vec![],
        };
        assert_eq!(output.text(), "Hello Alice");
    }

    #[test]
    fn test_plain_text() {
        let output = AgentOutput::Text("Hi there".to_string());
        assert_eq!(output.text(), "Hi there");
        assert!(output.tool_calls().is_empty());
    }

    #[test]
    fn test_into_parts_keeps_tool_calls() {
        let record = ToolCallRecord {
            tool_name: "read_user_profile".to_string(),
            tool_input: json!({}),
            tool_output: json!({"name": "Alice"}),
        };
        let output = AgentOutput::Final {
            final_output: "Hello Alice".to_string(),
            tool_calls: vec![record.clone()],
        };

        let (text, calls) = output.into_parts();

        assert_eq!(text, "Hello Alice");
        assert_eq!(calls, vec![record]);
    }

    #[test]
    fn test_is_unavailable() {
        assert!(AgentError::Unavailable("no key".to_string()).is_unavailable());
        assert!(!AgentError::Http("503".to_string()).is_unavailable());
        assert!(!AgentError::ToolRounds(5).is_unavailable());
    }
}
