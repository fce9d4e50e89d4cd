use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use skydock_core::{ChatSession, Message, Role, ToolCall, ToolCallStatus};
use uuid::Uuid;

/// A message row as the backend stores it.
///
/// Tool activity is persisted out-of-band: `tool_calls` and `tool_results`
/// are JSON-encoded arrays correlated by tool-use id, not part of the
/// content itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Persisted message identifier.
    pub id: Uuid,
    /// Author role.
    pub role: Role,
    /// Message text.
    pub content: String,
    /// JSON-encoded array of tool invocations, if the turn used tools.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<String>,
    /// JSON-encoded array of tool results, if the turn used tools.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_results: Option<String>,
    /// UTC timestamp of message creation.
    pub created_at: DateTime<Utc>,
}

/// One session's detail view: metadata plus its stored messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    /// Session metadata.
    pub session: ChatSession,
    /// Stored messages, oldest first.
    pub messages: Vec<StoredMessage>,
}

impl StoredSession {
    /// Hydrates the stored messages into resolved [`Message`]s.
    pub fn hydrate(&self) -> Vec<Message> {
        hydrate_messages(self.messages.clone())
    }
}

#[derive(Deserialize)]
struct StoredToolCall {
    id: String,
    name: String,
    #[serde(default)]
    input: serde_json::Value,
}

#[derive(Deserialize)]
struct StoredToolResult {
    tool_use_id: String,
    #[serde(default)]
    result: serde_json::Value,
}

/// Hydrates stored rows into transcript messages.
///
/// Tool-call and tool-result side-channels are parsed, correlated by
/// tool-use id in start order, and merged with status forced to `done` —
/// loaded history is always fully resolved, never `running`. Unmatched
/// results are dropped; a malformed side-channel hydrates to a message
/// with no tool calls rather than failing the load.
pub fn hydrate_messages(stored: Vec<StoredMessage>) -> Vec<Message> {
    stored.into_iter().map(hydrate_message).collect()
}

fn hydrate_message(stored: StoredMessage) -> Message {
    let calls: Vec<StoredToolCall> = parse_side_channel(stored.tool_calls.as_deref());
    let results: Vec<StoredToolResult> = parse_side_channel(stored.tool_results.as_deref());

    let mut tool_calls: Vec<ToolCall> = calls
        .into_iter()
        .map(|c| ToolCall::running(c.id, c.name, c.input))
        .collect();

    for result in results {
        match tool_calls.iter_mut().find(|c| c.id == result.tool_use_id) {
            Some(call) => call.finish(result.result),
            None => {
                tracing::debug!(
                    call_id = %result.tool_use_id,
                    "dropping stored result with no matching tool call"
                );
            }
        }
    }

    for call in &mut tool_calls {
        call.status = ToolCallStatus::Done;
    }

    Message {
        id: Some(stored.id),
        role: stored.role,
        content: stored.content,
        tool_calls,
    }
}

fn parse_side_channel<T: DeserializeOwned>(raw: Option<&str>) -> Vec<T> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    match serde_json::from_str(raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(error = %e, "malformed tool side-channel in stored message");
            Vec::new()
        }
    }
}
