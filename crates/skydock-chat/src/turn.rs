use crate::event::StreamEvent;
use skydock_core::{Message, ToolCall};

/// Builds the assistant message for one in-flight turn.
///
/// The builder is the sole owner of the mutable message while its turn is
/// streaming; the transcript only ever receives immutable snapshots of it.
#[derive(Debug)]
pub struct TurnBuilder {
    message: Message,
}

impl TurnBuilder {
    /// Starts a turn with an empty assistant message.
    pub fn new() -> Self {
        Self {
            message: Message::assistant(""),
        }
    }

    /// Applies one decoded event to the in-flight message.
    ///
    /// `MessageDone` carries no content mutation; the caller handles its
    /// session-refresh side effect.
    pub fn apply(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::TextDelta { text } => {
                self.message.content.push_str(&text);
            }
            StreamEvent::ToolCallStart { id, name, input } => {
                tracing::debug!(call_id = %id, tool = %name, "tool call started");
                self.message.tool_calls.push(ToolCall::running(id, name, input));
            }
            StreamEvent::ToolCallResult { id, result } => {
                // Results only attach to a known start; an unmatched id is
                // dropped rather than synthesizing an entry.
                match self.message.tool_calls.iter_mut().find(|c| c.id == id) {
                    Some(call) => call.finish(result),
                    None => {
                        tracing::debug!(call_id = %id, "dropping result with no matching tool call");
                    }
                }
            }
            StreamEvent::MessageDone => {}
            StreamEvent::Error { message } => {
                self.append_error(&message);
            }
        }
    }

    /// Appends a delimited error annotation for a transport-level failure.
    ///
    /// Explicit cancellation must never call this; cancelled turns keep
    /// exactly the content assembled so far.
    pub fn append_transport_error(&mut self, description: &str) {
        self.append_error(description);
    }

    fn append_error(&mut self, message: &str) {
        self.message
            .content
            .push_str(&format!("\n\n[stream error: {message}]"));
    }

    /// Returns an immutable snapshot of the message as assembled so far.
    pub fn snapshot(&self) -> Message {
        self.message.clone()
    }
}

impl Default for TurnBuilder {
    fn default() -> Self {
        Self::new()
    }
}
