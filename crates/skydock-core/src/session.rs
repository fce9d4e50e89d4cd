use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata for one chat session.
///
/// Sessions are owned by the backend; the client holds a read-only cached
/// copy keyed by id. The title may be server-updated after a turn completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    /// Backend-assigned session identifier.
    pub id: Uuid,
    /// Display title, possibly server-generated from the first turn.
    pub title: String,
    /// Project this session is linked to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Uuid>,
    /// UTC timestamp of session creation.
    pub created_at: DateTime<Utc>,
    /// UTC timestamp of the last update.
    pub updated_at: DateTime<Utc>,
}
