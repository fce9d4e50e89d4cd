//! End-to-end tests for the turn assembler: scripted byte streams in,
//! transcript states out.

#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use skydock_chat::{ByteStream, ChatController, ChatTransport, SessionNotifier};
use skydock_core::{Role, SkydockError, SkydockResult, ToolCallStatus};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

enum Tail {
    End,
    Error(String),
    Hang,
}

/// Transport that replays a fixed chunk script for every opened turn.
struct ScriptedTransport {
    chunks: Vec<Vec<u8>>,
    tail: Tail,
}

impl ScriptedTransport {
    fn new(chunks: Vec<&str>, tail: Tail) -> Self {
        Self {
            chunks: chunks.into_iter().map(|c| c.as_bytes().to_vec()).collect(),
            tail,
        }
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn open_turn(&self, _session_id: Uuid, _text: &str) -> SkydockResult<ByteStream> {
        let head = stream::iter(self.chunks.clone().into_iter().map(Ok::<_, SkydockError>));
        Ok(match &self.tail {
            Tail::End => Box::pin(head),
            Tail::Error(message) => Box::pin(head.chain(stream::iter(vec![Err(
                SkydockError::Http(message.clone()),
            )]))),
            Tail::Hang => Box::pin(head.chain(stream::pending())),
        })
    }
}

/// Transport that cannot open a stream at all.
struct UnavailableTransport;

#[async_trait]
impl ChatTransport for UnavailableTransport {
    async fn open_turn(&self, _session_id: Uuid, _text: &str) -> SkydockResult<ByteStream> {
        Err(SkydockError::Http("connection refused".to_string()))
    }
}

#[derive(Default)]
struct RecordingNotifier {
    completed: AtomicUsize,
}

#[async_trait]
impl SessionNotifier for RecordingNotifier {
    async fn turn_completed(&self, _session_id: Uuid) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }
}

fn controller_with(transport: impl ChatTransport + 'static) -> (ChatController, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let controller = ChatController::new(Uuid::new_v4(), Arc::new(transport), notifier.clone());
    (controller, notifier)
}

fn last_content(controller: &ChatController) -> String {
    let transcript = controller.transcript();
    let transcript = transcript.lock();
    transcript.last().map(|m| m.content.clone()).unwrap_or_default()
}

#[tokio::test]
async fn text_deltas_accumulate_into_assistant_message() {
    let (controller, _) = controller_with(ScriptedTransport::new(
        vec![
            "data: {\"type\":\"text_delta\",\"data\":{\"text\":\"Hi\"}}\n",
            "data: {\"type\":\"text_delta\",\"data\":{\"text\":\" there\"}}\n",
        ],
        Tail::End,
    ));

    controller.submit("hello").await;
    controller.join_turn().await;

    let transcript = controller.transcript();
    let transcript = transcript.lock();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript.messages()[0].role, Role::User);
    assert_eq!(transcript.messages()[0].content, "hello");
    assert_eq!(transcript.messages()[1].role, Role::Assistant);
    assert_eq!(transcript.messages()[1].content, "Hi there");
    drop(transcript);
    assert!(!controller.is_streaming());
}

#[tokio::test]
async fn tool_call_lifecycle_resolves_in_start_order() {
    let (controller, _) = controller_with(ScriptedTransport::new(
        vec![
            "data: {\"type\":\"tool_call_start\",\"data\":{\"id\":\"a1\",\"name\":\"read_file\",\"input\":{\"path\":\"x.txt\"}}}\n",
            "data: {\"type\":\"tool_call_result\",\"data\":{\"id\":\"a1\",\"result\":{\"content\":\"...\"}}}\n",
        ],
        Tail::End,
    ));

    controller.submit("read x.txt").await;
    controller.join_turn().await;

    let transcript = controller.transcript();
    let transcript = transcript.lock();
    let calls = &transcript.last().unwrap().tool_calls;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].name, "read_file");
    assert_eq!(calls[0].status, ToolCallStatus::Done);
    assert_eq!(calls[0].result.as_ref().unwrap()["content"], "...");
}

#[tokio::test]
async fn malformed_frame_is_skipped_without_failing_the_turn() {
    let (controller, _) = controller_with(ScriptedTransport::new(
        vec![
            "data: {not valid json\n",
            "data: {\"type\":\"text_delta\",\"data\":{\"text\":\"ok\"}}\n",
        ],
        Tail::End,
    ));

    controller.submit("hi").await;
    controller.join_turn().await;

    assert_eq!(last_content(&controller), "ok");
    assert!(!controller.is_streaming());
}

#[tokio::test]
async fn cancel_keeps_partial_content_without_annotation() {
    let (controller, _) = controller_with(ScriptedTransport::new(
        vec!["data: {\"type\":\"text_delta\",\"data\":{\"text\":\"partial\"}}\n"],
        Tail::Hang,
    ));

    let mut revisions = controller.subscribe();
    controller.submit("hi").await;

    // Wait for the delta to land before cancelling mid-stream.
    while last_content(&controller) != "partial" {
        revisions.changed().await.unwrap();
    }
    controller.cancel();
    controller.join_turn().await;

    assert_eq!(last_content(&controller), "partial");
    assert!(!controller.is_streaming());
}

#[tokio::test]
async fn transport_failure_appends_error_annotation() {
    let (controller, _) = controller_with(ScriptedTransport::new(
        vec!["data: {\"type\":\"text_delta\",\"data\":{\"text\":\"partial\"}}\n"],
        Tail::Error("connection reset".to_string()),
    ));

    controller.submit("hi").await;
    controller.join_turn().await;

    let content = last_content(&controller);
    assert!(content.starts_with("partial"));
    assert!(content.contains("[stream error:"));
    assert!(content.contains("connection reset"));
    assert!(!controller.is_streaming());
}

#[tokio::test]
async fn empty_stream_ends_turn_silently() {
    let (controller, notifier) = controller_with(ScriptedTransport::new(vec![], Tail::End));

    controller.submit("hi").await;
    controller.join_turn().await;

    let transcript = controller.transcript();
    let transcript = transcript.lock();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript.last().unwrap().content, "");
    drop(transcript);
    assert!(!controller.is_streaming());
    assert_eq!(notifier.completed.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unavailable_transport_ends_turn_silently() {
    let (controller, _) = controller_with(UnavailableTransport);

    controller.submit("hi").await;
    controller.join_turn().await;

    let transcript = controller.transcript();
    let transcript = transcript.lock();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript.last().unwrap().content, "");
    drop(transcript);
    assert!(!controller.is_streaming());
}

#[tokio::test]
async fn submit_while_streaming_is_a_noop() {
    let (controller, _) = controller_with(ScriptedTransport::new(
        vec!["data: {\"type\":\"text_delta\",\"data\":{\"text\":\"first\"}}\n"],
        Tail::Hang,
    ));

    let mut revisions = controller.subscribe();
    controller.submit("one").await;
    while last_content(&controller) != "first" {
        revisions.changed().await.unwrap();
    }

    controller.submit("two").await;
    {
        let transcript = controller.transcript();
        let transcript = transcript.lock();
        // Still just the first user message and its placeholder.
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.messages()[0].content, "one");
    }

    controller.cancel();
    controller.join_turn().await;
}

#[tokio::test]
async fn empty_input_is_rejected() {
    let (controller, _) = controller_with(ScriptedTransport::new(vec![], Tail::End));

    controller.submit("   ").await;
    controller.join_turn().await;

    assert!(controller.transcript().lock().is_empty());
    assert!(!controller.is_streaming());
}

#[tokio::test]
async fn message_done_notifies_without_ending_the_stream() {
    let (controller, notifier) = controller_with(ScriptedTransport::new(
        vec![
            "data: {\"type\":\"text_delta\",\"data\":{\"text\":\"Hi\"}}\n",
            "data: {\"type\":\"message_done\",\"data\":{}}\n",
            "data: {\"type\":\"text_delta\",\"data\":{\"text\":\"!\"}}\n",
        ],
        Tail::End,
    ));

    controller.submit("hi").await;
    controller.join_turn().await;

    // Frames after message_done still apply; only end-of-stream ends the turn.
    assert_eq!(last_content(&controller), "Hi!");
    assert_eq!(notifier.completed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn error_event_annotates_but_does_not_end_turn() {
    let (controller, _) = controller_with(ScriptedTransport::new(
        vec![
            "data: {\"type\":\"error\",\"data\":{\"message\":\"tool quota exceeded\"}}\n",
            "data: {\"type\":\"text_delta\",\"data\":{\"text\":\"continuing\"}}\n",
        ],
        Tail::End,
    ));

    controller.submit("hi").await;
    controller.join_turn().await;

    let content = last_content(&controller);
    assert!(content.contains("[stream error: tool quota exceeded]"));
    assert!(content.ends_with("continuing"));
}

#[tokio::test]
async fn cancel_when_idle_is_a_noop() {
    let (controller, _) = controller_with(ScriptedTransport::new(vec![], Tail::End));
    controller.cancel();
    assert!(!controller.is_streaming());
    assert!(controller.transcript().lock().is_empty());
}

#[tokio::test]
async fn history_load_rejected_while_streaming() {
    let (controller, _) = controller_with(ScriptedTransport::new(
        vec!["data: {\"type\":\"text_delta\",\"data\":{\"text\":\"live\"}}\n"],
        Tail::Hang,
    ));

    let mut revisions = controller.subscribe();
    controller.submit("hi").await;
    while last_content(&controller) != "live" {
        revisions.changed().await.unwrap();
    }

    assert!(!controller.load_history(vec![skydock_core::Message::user("old")]));

    controller.cancel();
    controller.join_turn().await;

    assert!(controller.load_history(vec![skydock_core::Message::user("old")]));
    assert_eq!(controller.transcript().lock().len(), 1);
}

#[tokio::test]
async fn consecutive_turns_reuse_the_controller() {
    let (controller, _) = controller_with(ScriptedTransport::new(
        vec!["data: {\"type\":\"text_delta\",\"data\":{\"text\":\"reply\"}}\n"],
        Tail::End,
    ));

    controller.submit("first").await;
    controller.join_turn().await;
    controller.submit("second").await;
    controller.join_turn().await;

    let transcript = controller.transcript();
    let transcript = transcript.lock();
    assert_eq!(transcript.len(), 4);
    assert_eq!(transcript.messages()[0].content, "first");
    assert_eq!(transcript.messages()[1].content, "reply");
    assert_eq!(transcript.messages()[2].content, "second");
    assert_eq!(transcript.messages()[3].content, "reply");
}
