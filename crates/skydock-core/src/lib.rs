//! Core types and error definitions for the Skydock client.
//!
//! This crate provides the foundational types shared across all Skydock
//! crates, including error handling, chat message representations, and
//! tool call tracking.
//!
//! # Main types
//!
//! - [`SkydockError`] — Unified error enum for all client subsystems.
//! - [`SkydockResult`] — Convenience alias for `Result<T, SkydockError>`.
//! - [`Role`] — Message role (user or assistant).
//! - [`Message`] — A single message within a chat session transcript.
//! - [`ToolCall`] — A backend tool invocation tracked from start to completion.
//! - [`ChatSession`] — Metadata for one chat session, owned by the backend.

/// Unified error enum and result alias.
pub mod error;
/// Chat message and tool call types.
pub mod message;
/// Chat session metadata.
pub mod session;

pub use error::{SkydockError, SkydockResult};
pub use message::{Message, Role, ToolCall, ToolCallStatus};
pub use session::ChatSession;
