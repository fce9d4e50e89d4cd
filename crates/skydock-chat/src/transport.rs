use async_trait::async_trait;
use futures_util::Stream;
use skydock_core::SkydockResult;
use std::pin::Pin;
use uuid::Uuid;

/// Raw bytes of one turn stream, as delivered by the transport.
///
/// Dropping the stream aborts the underlying connection; that is how
/// cancellation reaches the transport.
pub type ByteStream = Pin<Box<dyn Stream<Item = SkydockResult<Vec<u8>>> + Send>>;

/// Seam to whatever produces turn streams.
///
/// The HTTP client implements this against the backend's chat endpoint;
/// tests substitute in-memory streams.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Opens one stream for a submitted user message.
    async fn open_turn(&self, session_id: Uuid, text: &str) -> SkydockResult<ByteStream>;
}

/// Seam for collaborators holding cached session views.
///
/// Called when a turn reaches its normal terminal point, so server-side
/// updates (e.g. a generated title) become visible without a manual reload.
#[async_trait]
pub trait SessionNotifier: Send + Sync {
    /// A turn in the given session completed normally.
    async fn turn_completed(&self, session_id: Uuid);
}

/// Notifier that discards completion signals.
pub struct NullNotifier;

#[async_trait]
impl SessionNotifier for NullNotifier {
    async fn turn_completed(&self, _session_id: Uuid) {}
}
