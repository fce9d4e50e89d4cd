use crate::event::StreamEvent;

const DATA_PREFIX: &str = "data: ";

/// Incremental decoder for the newline-delimited turn stream.
///
/// Chunks may split lines, and multi-byte UTF-8 sequences, at arbitrary
/// byte boundaries. The decoder buffers raw bytes and only decodes complete
/// lines, so the final event sequence is independent of how the transport
/// chunked the body.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
}

impl FrameDecoder {
    /// Creates an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one transport chunk, returning the events decoded from every
    /// line completed by it.
    ///
    /// Lines without the `data: ` prefix (blanks, comments, non-data SSE
    /// fields) are skipped. Data payloads that fail to parse are dropped and
    /// the stream continues; a trailing incomplete line stays buffered for
    /// the next chunk.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line_bytes: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line_bytes);
            let line = line.trim();

            let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
                continue;
            };

            match StreamEvent::parse(payload) {
                Some(event) => events.push(event),
                None => {
                    tracing::debug!(payload_len = payload.len(), "dropping unparsable frame");
                }
            }
        }
        events
    }
}
