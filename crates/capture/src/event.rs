//! Typed vocabulary of agent-lifecycle events.
//!
//! One closed tagged enum per recognized kind, with an explicit catch-all
//! arm: the runtime may grow new event kinds, and the sink must skip them
//! rather than fail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single agent-lifecycle event, in the order the runtime emits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// A new user message; authoritative turn boundary.
    UserMessageStart,
    /// A tool invocation began. `id` may be absent on runtimes that only
    /// name the tool; the sink synthesizes a correlation id then.
    ToolStart {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        name: String,
        #[serde(default)]
        input: Map<String, Value>,
        timestamp: DateTime<Utc>,
        /// Set by runtimes that dispatched the tool through an MCP server.
        #[serde(default)]
        server_origin: bool,
    },
    /// A tool invocation finished.
    ToolEnd {
        id: String,
        #[serde(default)]
        output: Value,
        success: bool,
        timestamp: DateTime<Utc>,
    },
    /// Incremental "thinking" text.
    ReasoningDelta { text: String },
    /// Incremental assistant text; passed through to the chat renderer,
    /// never captured here.
    TextDelta { text: String },
    /// Optional explicit turn boundary; absence is tolerated.
    TurnEnd,
    /// A full message whose content blocks may embed tool activity
    /// (runtimes that only surface tool calls inside assistant messages).
    Message {
        #[serde(default)]
        content: Vec<MessageBlock>,
    },
    /// Any event kind this vocabulary does not recognize.
    #[serde(other)]
    Other,
}

/// Content block inside a [`AgentEvent::Message`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageBlock {
    ToolUse {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        name: String,
        #[serde(default)]
        input: Map<String, Value>,
    },
    ToolResult {
        id: String,
        success: bool,
        #[serde(default)]
        content: Value,
    },
    #[serde(other)]
    Other,
}

/// A recognized event kind arrived with a missing or mistyped field.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EventDecodeError {
    #[error("malformed {kind:?} event: {source}")]
    Malformed {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

impl AgentEvent {
    /// Decode a raw runtime payload.
    ///
    /// Unknown `type` values decode to [`AgentEvent::Other`]; only a
    /// recognized kind with a bad payload is an error.
    pub fn from_value(value: Value) -> Result<Self, EventDecodeError> {
        let kind = value
            .as_object()
            .and_then(|obj| obj.get("type"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        serde_json::from_value(value)
            .map_err(|source| EventDecodeError::Malformed { kind, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_tool_start() {
        let event = AgentEvent::from_value(json!({
            "type": "tool_start",
            "id": "t1",
            "name": "shell",
            "input": {"command": "ls"},
            "timestamp": "2026-01-01T00:00:00Z",
        }))
        .unwrap();

        match event {
            AgentEvent::ToolStart {
                id,
                name,
                input,
                server_origin,
                ..
            } => {
                assert_eq!(id.as_deref(), Some("t1"));
                assert_eq!(name, "shell");
                assert_eq!(input["command"], "ls");
                assert!(!server_origin);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn tool_start_without_id_or_input_is_valid() {
        let event = AgentEvent::from_value(json!({
            "type": "tool_start",
            "name": "shell",
            "timestamp": "2026-01-01T00:00:00Z",
        }))
        .unwrap();

        match event {
            AgentEvent::ToolStart { id, input, .. } => {
                assert!(id.is_none());
                assert!(input.is_empty());
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn unknown_kind_decodes_to_other() {
        let event = AgentEvent::from_value(json!({
            "type": "hook_fired",
            "whatever": 42,
        }))
        .unwrap();

        assert_eq!(event, AgentEvent::Other);
    }

    #[test]
    fn recognized_kind_with_missing_field_is_malformed() {
        let err = AgentEvent::from_value(json!({
            "type": "tool_end",
            "output": "done",
        }))
        .unwrap_err();

        match err {
            EventDecodeError::Malformed { kind, .. } => assert_eq!(kind, "tool_end"),
        }
    }

    #[test]
    fn message_blocks_decode_tool_activity() {
        let event = AgentEvent::from_value(json!({
            "type": "message",
            "content": [
                {"type": "tool_use", "id": "t1", "name": "calculator", "input": {"expr": "1+1"}},
                {"type": "tool_result", "id": "t1", "success": true, "content": "2"},
                {"type": "text", "text": "the answer is 2"},
            ],
        }))
        .unwrap();

        match event {
            AgentEvent::Message { content } => {
                assert_eq!(content.len(), 3);
                assert!(matches!(content[0], MessageBlock::ToolUse { .. }));
                assert!(matches!(content[1], MessageBlock::ToolResult { .. }));
                assert_eq!(content[2], MessageBlock::Other);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
