//! Conversation sessions
//!
//! A session is uninitialized until [`Session::start`] binds an agent, and
//! ready from then on. Each turn turns one utterance into exactly one reply;
//! agent failures never escape a turn.

use crate::agent::{Agent, AgentError};
use crate::config::ConversationConfig;
use crate::tools::ToolCallRecord;

/// Session lifecycle
pub enum SessionState {
    Uninitialized,
    Ready(Box<dyn Agent>),
}

/// Result of one turn
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub reply: String,
    pub tool_calls: Vec<ToolCallRecord>,
}

/// One chat session between the UI and an agent
pub struct Session {
    state: SessionState,
    replies: ConversationConfig,
}

impl Session {
    pub fn new(replies: ConversationConfig) -> Self {
        Self {
            state: SessionState::Uninitialized,
            replies,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, SessionState::Ready(_))
    }

    /// Bind the agent and return the greeting. A session only binds once.
    pub fn start(&mut self, agent: Box<dyn Agent>) -> &str {
        if self.is_ready() {
            log::warn!("Session already started, keeping the bound agent");
        } else {
            log::info!("Session started");
            self.state = SessionState::Ready(agent);
        }
        &self.replies.greeting
    }

    /// Reply to one utterance
    pub fn handle(&self, utterance: &str) -> String {
        self.turn(utterance).reply
    }

    /// Reply to one utterance, keeping the tool calls made along the way
    pub fn turn(&self, utterance: &str) -> Turn {
        let result = match &self.state {
            SessionState::Ready(agent) => agent.invoke(utterance),
            SessionState::Uninitialized => Err(AgentError::Unavailable("session not started".to_string())),
        };

        match result {
            Ok(output) => {
                log::debug!("Reply: {}", output.text());
                for call in output.tool_calls() {
                    log::info!("Tool call: {}", call.tool_name);
                    log::debug!("Tool input: {}", call.tool_input);
                    log::debug!("Tool output: {}", call.tool_output);
                }
                let (reply, tool_calls) = output.into_parts();
                Turn { reply, tool_calls }
            }
            Err(e) if e.is_unavailable() => {
                log::warn!("{}", e);
                self.canned(&self.replies.fallback_reply)
            }
            Err(e) => {
                log::error!("Agent invocation failed: {}", e);
                self.canned(&self.replies.apology_reply)
            }
        }
    }

    fn canned(&self, reply: &str) -> Turn {
        Turn {
            reply: reply.to_string(),
            tool_calls: Vec::new(),
        }
    }
}
