//! Profile tools exposed to the agent
//!
//! Two tools, each a pass-through to the profile store:
//! - `read_user_profile`: returns the whole profile
//! - `update_user_profile(key, value)`: sets one key and returns a confirmation

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::profile::{Profile, ProfileError, ProfileStore, UpdateStatus};

pub const READ_USER_PROFILE: &str = "read_user_profile";
pub const UPDATE_USER_PROFILE: &str = "update_user_profile";

/// Errors from running a tool
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    Unknown(String),

    #[error("invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error(transparent)]
    Store(#[from] ProfileError),
}

/// Declaration of a tool as advertised to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

/// One tool invocation made while producing a reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub tool_name: String,
    pub tool_input: Value,
    pub tool_output: Value,
}

/// The profile tools, bound to a store
#[derive(Clone)]
pub struct ProfileTools {
    store: Arc<dyn ProfileStore>,
}

impl ProfileTools {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    /// Everything currently known about the user
    pub fn read_user_profile(&self) -> Result<Profile, ToolError> {
        Ok(self.store.read()?)
    }

    /// Remember one fact about the user
    pub fn update_user_profile(&self, key: &str, value: &str) -> Result<UpdateStatus, ToolError> {
        Ok(self.store.write(key, value)?)
    }

    pub fn declarations(&self) -> Vec<ToolDeclaration> {
        vec![
            ToolDeclaration {
                name: READ_USER_PROFILE.to_string(),
                description: "Reads the user profile: everything known about the user, as key/value pairs.".to_string(),
                parameters: None,
            },
            ToolDeclaration {
                name: UPDATE_USER_PROFILE.to_string(),
                description: "Updates a specific key in the user profile and saves it. Use this whenever the user shares personal information such as their name or preferences.".to_string(),
                parameters: Some(json!({
                    "type": "OBJECT",
                    "properties": {
                        "key": {
                            "type": "STRING",
                            "description": "Name of the fact, e.g. \"name\" or \"favorite_color\""
                        },
                        "value": {
                            "type": "STRING",
                            "description": "Value of the fact"
                        }
                    },
                    "required": ["key", "value"]
                })),
            },
        ]
    }

    /// Run a tool by name with JSON arguments
    pub fn dispatch(&self, name: &str, args: &Value) -> Result<Value, ToolError> {
        log::debug!("Running tool {} with {}", name, args);

        let output = match name {
            READ_USER_PROFILE => serde_json::to_value(self.read_user_profile()?).map_err(ProfileError::from)?,
            UPDATE_USER_PROFILE => {
                let key = string_arg(name, args, "key")?;
                let value = string_arg(name, args, "value")?;
                serde_json::to_value(self.update_user_profile(&key, &value)?).map_err(ProfileError::from)?
            }
            _ => return Err(ToolError::Unknown(name.to_string())),
        };

        log::debug!("Tool output for {}: {}", name, output);
        Ok(output)
    }
}

fn string_arg(tool: &str, args: &Value, field: &str) -> Result<String, ToolError> {
    let invalid = |reason: String| ToolError::InvalidArguments {
        tool: tool.to_string(),
        reason,
    };

    match args.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        // Models often send `30` where a string was declared
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(other) => Err(invalid(format!("'{}' must be a string, got {}", field, other))),
        None => Err(invalid(format!("missing '{}'", field))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::MemoryProfileStore;

    fn tools() -> ProfileTools {
        ProfileTools::new(Arc::new(MemoryProfileStore::default()))
    }

    #[test]
    fn test_read_user_profile_empty() {
        let tools = tools();
        assert!(tools.read_user_profile().unwrap().is_empty());
    }

    #[test]
    fn test_update_user_profile_confirmation_shape() {
        let tools = tools();

        let status = tools.update_user_profile("age", "30").unwrap();

        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            json!({"status": "success", "key": "age", "value": "30"})
        );
    }

    #[test]
    fn test_update_then_read() {
        let tools = tools();

        tools.update_user_profile("name", "Alice").unwrap();

        let profile = tools.read_user_profile().unwrap();
        assert_eq!(profile.get("name").map(String::as_str), Some("Alice"));
    }

    #[test]
    fn test_dispatch_update_and_read() {
        let tools = tools();

        let status = tools
            .dispatch(UPDATE_USER_PROFILE, &json!({"key": "name", "value": "Alice"}))
            .unwrap();
        assert_eq!(status, json!({"status": "success", "key": "name", "value": "Alice"}));

        let profile = tools.dispatch(READ_USER_PROFILE, &json!({})).unwrap();
        assert_eq!(profile, json!({"name": "Alice"}));
    }

    #[test]
    fn test_dispatch_read_ignores_null_args() {
        let tools = tools();
        assert_eq!(tools.dispatch(READ_USER_PROFILE, &Value::Null).unwrap(), json!({}));
    }

    #[test]
    fn test_dispatch_coerces_scalar_values() {
        let tools = tools();

        let status = tools
            .dispatch(UPDATE_USER_PROFILE, &json!({"key": "age", "value": 30}))
            .unwrap();

        assert_eq!(status["value"], json!("30"));
    }

    #[test]
    fn test_dispatch_missing_argument() {
        let tools = tools();

        let err = tools
            .dispatch(UPDATE_USER_PROFILE, &json!({"key": "name"}))
            .unwrap_err();

        assert!(matches!(err, ToolError::InvalidArguments { .. }));
        assert!(err.to_string().contains("value"));
    }

    #[test]
    fn test_dispatch_rejects_object_value() {
        let tools = tools();

        let err = tools
            .dispatch(UPDATE_USER_PROFILE, &json!({"key": "name", "value": {"first": "Alice"}}))
            .unwrap_err();

        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }

    #[test]
    fn test_dispatch_unknown_tool() {
        let tools = tools();

        let err = tools.dispatch("delete_user_profile", &json!({})).unwrap_err();

        assert!(matches!(err, ToolError::Unknown(ref name) if name == "delete_user_profile"));
    }

    #[test]
    fn test_declarations() {
        let decls = tools().declarations();

        let names: Vec<_> = decls.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec![READ_USER_PROFILE, UPDATE_USER_PROFILE]);
        assert!(decls[0].parameters.is_none());
        assert_eq!(decls[1].parameters.as_ref().unwrap()["required"], json!(["key", "value"]));
    }
}
