use skydock_core::Message;

/// The ordered message list for one chat session.
///
/// Message order is append-only during a turn; while streaming, only the
/// last element (the in-flight assistant message) is ever replaced. Earlier
/// messages and the user message are never mutated.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Replaces the last message with an updated snapshot.
    ///
    /// No-op on an empty transcript; the assembler always pushes the
    /// placeholder assistant message before streaming begins.
    pub fn replace_last(&mut self, message: Message) {
        if let Some(last) = self.messages.last_mut() {
            *last = message;
        }
    }

    /// Discards the current contents and installs loaded history.
    pub fn reset(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    /// All messages, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The most recent message, if any.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the transcript holds no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
