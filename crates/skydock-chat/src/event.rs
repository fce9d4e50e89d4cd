use serde::Deserialize;

/// Events decoded from one data frame of a turn stream.
///
/// Wire shape is `{"type": <kind>, "data": <kind-specific object>}`. An
/// event exists only while its frame is being applied to the in-flight
/// assistant message; nothing here is persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A chunk of text content from the assistant.
    TextDelta {
        /// Text to append to the message content, verbatim.
        text: String,
    },

    /// A new tool call has started.
    ToolCallStart {
        /// Identifier unique within this assistant turn.
        id: String,
        /// Name of the tool being invoked.
        name: String,
        /// Opaque structured input.
        input: serde_json::Value,
    },

    /// A previously started tool call has finished.
    ToolCallResult {
        /// Identifier of the matching `ToolCallStart`.
        id: String,
        /// Opaque structured result.
        result: serde_json::Value,
    },

    /// The turn reached its normal terminal point. Does not end the stream
    /// by itself; end-of-stream is detected independently.
    MessageDone,

    /// The backend reported an error mid-turn.
    Error {
        /// Human-readable failure description.
        message: String,
    },
}

#[derive(Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Deserialize)]
struct TextDeltaData {
    text: String,
}

#[derive(Deserialize)]
struct ToolCallStartData {
    id: String,
    name: String,
    #[serde(default)]
    input: serde_json::Value,
}

#[derive(Deserialize)]
struct ToolCallResultData {
    id: String,
    #[serde(default)]
    result: serde_json::Value,
}

#[derive(Deserialize)]
struct ErrorData {
    message: String,
}

impl StreamEvent {
    /// Parses one frame payload into an event.
    ///
    /// Returns `None` for malformed JSON, unknown event kinds, and payloads
    /// missing required fields. Callers drop such frames and continue; a bad
    /// frame never aborts a turn.
    pub fn parse(payload: &str) -> Option<Self> {
        let frame: RawFrame = serde_json::from_str(payload).ok()?;
        match frame.kind.as_str() {
            "text_delta" => {
                let data: TextDeltaData = serde_json::from_value(frame.data).ok()?;
                Some(Self::TextDelta { text: data.text })
            }
            "tool_call_start" => {
                let data: ToolCallStartData = serde_json::from_value(frame.data).ok()?;
                Some(Self::ToolCallStart {
                    id: data.id,
                    name: data.name,
                    input: data.input,
                })
            }
            "tool_call_result" => {
                let data: ToolCallResultData = serde_json::from_value(frame.data).ok()?;
                Some(Self::ToolCallResult {
                    id: data.id,
                    result: data.result,
                })
            }
            "message_done" => Some(Self::MessageDone),
            "error" => {
                let data: ErrorData = serde_json::from_value(frame.data).ok()?;
                Some(Self::Error {
                    message: data.message,
                })
            }
            _ => None,
        }
    }
}
