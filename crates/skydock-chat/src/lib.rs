//! Streaming assistant-turn assembly for the Skydock chat client.
//!
//! One submitted user message opens one event stream against the backend.
//! This crate consumes that stream frame by frame and keeps an ordered,
//! continuously-updated transcript: text deltas accumulate into the
//! in-flight assistant message, tool calls move from `running` to `done`,
//! and a turn ends on end-of-stream, transport failure, or explicit
//! cancellation.
//!
//! # Main types
//!
//! - [`ChatController`] — owns the transcript and drives submit/cancel.
//! - [`FrameDecoder`] — splits raw stream bytes into [`StreamEvent`]s.
//! - [`TurnBuilder`] — assembles the current assistant message.
//! - [`ChatTransport`] — seam to whatever produces the byte stream.
//! - [`SessionNotifier`] — seam for session-cache invalidation.

/// Submit/cancel driver and the turn read loop.
pub mod controller;
/// Wire-level stream events.
pub mod event;
/// Incremental frame decoding.
pub mod frame;
/// The ordered message list for one session.
pub mod transcript;
/// Transport and notifier seams.
pub mod transport;
/// Turn-scoped assistant message assembly.
pub mod turn;

pub use controller::ChatController;
pub use event::StreamEvent;
pub use frame::FrameDecoder;
pub use transcript::Transcript;
pub use transport::{ByteStream, ChatTransport, NullNotifier, SessionNotifier};
pub use turn::TurnBuilder;
