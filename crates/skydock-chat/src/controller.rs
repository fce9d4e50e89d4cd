use crate::event::StreamEvent;
use crate::frame::FrameDecoder;
use crate::transcript::Transcript;
use crate::transport::{ByteStream, ChatTransport, SessionNotifier};
use crate::turn::TurnBuilder;
use futures_util::StreamExt;
use parking_lot::Mutex;
use skydock_core::Message;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Drives assistant turns for one chat session.
///
/// At most one turn is in flight at a time. [`ChatController::submit`]
/// appends the user message and an assistant placeholder, opens a stream
/// through the [`ChatTransport`], and spawns a task that applies decoded
/// frames to the transcript until end-of-stream, transport failure, or
/// [`ChatController::cancel`].
///
/// Failures never propagate to the caller; they end the turn and, for
/// mid-stream transport errors, leave an inline annotation in the assistant
/// message. Cancellation ends the turn without an annotation.
pub struct ChatController {
    session_id: Uuid,
    transport: Arc<dyn ChatTransport>,
    notifier: Arc<dyn SessionNotifier>,
    transcript: Arc<Mutex<Transcript>>,
    streaming: Arc<AtomicBool>,
    revision: watch::Sender<u64>,
    cancel: Mutex<Option<watch::Sender<bool>>>,
    turn: Mutex<Option<JoinHandle<()>>>,
}

impl ChatController {
    /// Creates a controller for one session with an empty transcript.
    pub fn new(
        session_id: Uuid,
        transport: Arc<dyn ChatTransport>,
        notifier: Arc<dyn SessionNotifier>,
    ) -> Self {
        let (revision, _) = watch::channel(0u64);
        Self {
            session_id,
            transport,
            notifier,
            transcript: Arc::new(Mutex::new(Transcript::new())),
            streaming: Arc::new(AtomicBool::new(false)),
            revision,
            cancel: Mutex::new(None),
            turn: Mutex::new(None),
        }
    }

    /// The session this controller drives.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Shared handle to the transcript. Readers always observe whole-frame
    /// states; mutations happen under the lock, one frame at a time.
    pub fn transcript(&self) -> Arc<Mutex<Transcript>> {
        Arc::clone(&self.transcript)
    }

    /// Whether a turn is currently in flight.
    pub fn is_streaming(&self) -> bool {
        self.streaming.load(Ordering::SeqCst)
    }

    /// Subscribes to transcript revisions. The value bumps after every
    /// applied frame and at turn boundaries; re-read the transcript on
    /// change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Installs loaded history, replacing the current transcript.
    ///
    /// Rejected while a turn is in flight; returns whether the history was
    /// installed.
    pub fn load_history(&self, messages: Vec<Message>) -> bool {
        if self.is_streaming() {
            warn!(session_id = %self.session_id, "refusing history load while streaming");
            return false;
        }
        self.transcript.lock().reset(messages);
        self.revision.send_modify(|r| *r += 1);
        true
    }

    /// Submits one user message and starts streaming the assistant turn.
    ///
    /// No-op while a turn is already in flight, and for empty or
    /// whitespace-only input.
    pub async fn submit(&self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if self.streaming.swap(true, Ordering::SeqCst) {
            warn!(session_id = %self.session_id, "turn already in flight, ignoring submit");
            return;
        }

        {
            let mut transcript = self.transcript.lock();
            transcript.push(Message::user(text));
            transcript.push(Message::assistant(""));
        }
        self.revision.send_modify(|r| *r += 1);

        let (cancel_tx, cancel_rx) = watch::channel(false);
        *self.cancel.lock() = Some(cancel_tx);

        let stream = match self.transport.open_turn(self.session_id, text).await {
            Ok(stream) => stream,
            Err(e) => {
                // No frames ever arrived; the placeholder stays as-is.
                warn!(session_id = %self.session_id, error = %e, "turn stream unavailable");
                *self.cancel.lock() = None;
                self.streaming.store(false, Ordering::SeqCst);
                self.revision.send_modify(|r| *r += 1);
                return;
            }
        };

        info!(session_id = %self.session_id, "turn stream opened");

        let handle = tokio::spawn(run_turn(
            self.session_id,
            stream,
            cancel_rx,
            Arc::clone(&self.transcript),
            Arc::clone(&self.notifier),
            Arc::clone(&self.streaming),
            self.revision.clone(),
        ));
        *self.turn.lock() = Some(handle);
    }

    /// Requests cancellation of the in-flight turn.
    ///
    /// The read loop exits promptly and the underlying transport connection
    /// is dropped. Cancelled turns keep exactly the content assembled so
    /// far, with no error annotation. No-op when no turn is in flight.
    pub fn cancel(&self) {
        if !self.is_streaming() {
            return;
        }
        if let Some(tx) = self.cancel.lock().as_ref() {
            let _ = tx.send(true);
        }
    }

    /// Waits for the in-flight turn task to finish, if any.
    pub async fn join_turn(&self) {
        let handle = self.turn.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_turn(
    session_id: Uuid,
    mut stream: ByteStream,
    mut cancel_rx: watch::Receiver<bool>,
    transcript: Arc<Mutex<Transcript>>,
    notifier: Arc<dyn SessionNotifier>,
    streaming: Arc<AtomicBool>,
    revision: watch::Sender<u64>,
) {
    let mut decoder = FrameDecoder::new();
    let mut builder = TurnBuilder::new();
    let mut cancelled = false;

    loop {
        tokio::select! {
            biased;

            changed = cancel_rx.changed() => {
                if changed.is_err() || *cancel_rx.borrow() {
                    cancelled = true;
                    break;
                }
            }

            chunk = stream.next() => match chunk {
                Some(Ok(bytes)) => {
                    for event in decoder.feed(&bytes) {
                        if matches!(event, StreamEvent::MessageDone) {
                            notifier.turn_completed(session_id).await;
                        }
                        builder.apply(event);
                        transcript.lock().replace_last(builder.snapshot());
                        revision.send_modify(|r| *r += 1);
                    }
                }
                Some(Err(e)) => {
                    error!(session_id = %session_id, error = %e, "turn stream failed");
                    builder.append_transport_error(&e.to_string());
                    transcript.lock().replace_last(builder.snapshot());
                    break;
                }
                None => break,
            },
        }
    }

    // Dropping `stream` here aborts the transport on the cancel path.
    drop(stream);

    streaming.store(false, Ordering::SeqCst);
    revision.send_modify(|r| *r += 1);
    info!(session_id = %session_id, cancelled, "turn ended");
}
