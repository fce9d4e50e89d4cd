use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role of the participant that authored a [`Message`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A human end-user.
    User,
    /// The AI assistant.
    Assistant,
}

/// The lifecycle state of a [`ToolCall`].
///
/// A tool call transitions `Running` → `Done` exactly once and never
/// reverts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToolCallStatus {
    /// The backend is still executing the tool.
    Running,
    /// The tool finished and its result (if any) is attached.
    Done,
}

/// A single invocation of a backend-exposed tool, tracked within one
/// assistant turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Identifier assigned by the backend, unique within one assistant turn.
    pub id: String,
    /// Name of the tool being invoked.
    pub name: String,
    /// Opaque structured input the tool was invoked with.
    pub input: serde_json::Value,
    /// Opaque structured result, present only once the call is [`ToolCallStatus::Done`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Current lifecycle state.
    pub status: ToolCallStatus,
}

impl ToolCall {
    /// Creates a tool call in the `Running` state with no result yet.
    pub fn running(id: impl Into<String>, name: impl Into<String>, input: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input,
            result: None,
            status: ToolCallStatus::Running,
        }
    }

    /// Attaches a result and marks the call `Done`.
    ///
    /// Calling this on an already-`Done` call is a no-op: the first result
    /// wins and the status never reverts.
    pub fn finish(&mut self, result: serde_json::Value) {
        if self.status == ToolCallStatus::Done {
            return;
        }
        self.result = Some(result);
        self.status = ToolCallStatus::Done;
    }
}

/// A single message within a chat session transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Persisted identifier, present once loaded from storage and absent for
    /// messages created client-side during a live turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    /// The role of the message author.
    pub role: Role,
    /// The textual content of the message.
    pub content: String,
    /// Tool invocations carried by this message, in start order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

impl Message {
    /// Creates a new client-side message with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: None,
            role,
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Creates a new client-side message with [`Role::User`].
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates a new client-side message with [`Role::Assistant`].
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hello");
        assert!(msg.id.is_none());
        assert!(msg.tool_calls.is_empty());
    }

    #[test]
    fn test_message_serialization() {
        let msg = Message::assistant("test");
        let json = serde_json::to_string(&msg).unwrap();
        let deserialized: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.content, "test");
        assert_eq!(deserialized.role, Role::Assistant);
    }

    #[test]
    fn test_tool_call_finish_once() {
        let mut call = ToolCall::running("a1", "read_file", serde_json::json!({"path": "x.txt"}));
        assert_eq!(call.status, ToolCallStatus::Running);
        assert!(call.result.is_none());

        call.finish(serde_json::json!({"content": "first"}));
        assert_eq!(call.status, ToolCallStatus::Done);

        // A second result must leave the call unchanged.
        call.finish(serde_json::json!({"content": "second"}));
        assert_eq!(call.result.unwrap()["content"], "first");
    }

    #[test]
    fn test_tool_call_result_omitted_while_running() {
        let call = ToolCall::running("a1", "shell", serde_json::json!({}));
        let json = serde_json::to_string(&call).unwrap();
        assert!(!json.contains("\"result\""));
        assert!(json.contains("\"status\":\"running\""));
    }
}
