//! Session loading and caching for the Skydock chat client.

/// Cached list/detail views over the backend's sessions.
pub mod cache;
/// Stored-message rows and hydration into resolved messages.
pub mod history;

pub use cache::{SessionCache, SessionSource};
pub use history::{hydrate_messages, StoredMessage, StoredSession};
