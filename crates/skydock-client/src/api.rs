use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::StatusCode;
use serde::Serialize;
use skydock_chat::{ByteStream, ChatTransport};
use skydock_core::{ChatSession, SkydockError, SkydockResult};
use skydock_session::{SessionSource, StoredSession};
use uuid::Uuid;

/// Bearer-authenticated client for the backend's chat endpoints.
pub struct ApiClient {
    base_url: String,
    token: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Creates a client for the given backend base URL and API token.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            token: token.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Lists all chat sessions visible to the token's user.
    pub async fn list_sessions(&self) -> SkydockResult<Vec<ChatSession>> {
        let url = format!("{}/api/chat/sessions", self.base_url);
        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| SkydockError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(error_for(status, resp, "session list").await);
        }
        resp.json()
            .await
            .map_err(|e| SkydockError::Http(e.to_string()))
    }

    /// Fetches one session with its stored messages. `None` on 404.
    pub async fn get_session(&self, id: Uuid) -> SkydockResult<Option<StoredSession>> {
        let url = format!("{}/api/chat/sessions/{}", self.base_url, id);
        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| SkydockError::Http(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(error_for(status, resp, "session detail").await);
        }
        resp.json()
            .await
            .map(Some)
            .map_err(|e| SkydockError::Http(e.to_string()))
    }

    /// Creates a session, optionally titled and linked to a project.
    pub async fn create_session(
        &self,
        title: Option<&str>,
        project_id: Option<Uuid>,
    ) -> SkydockResult<ChatSession> {
        let url = format!("{}/api/chat/sessions", self.base_url);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&CreateSessionBody { title, project_id })
            .send()
            .await
            .map_err(|e| SkydockError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(error_for(status, resp, "session create").await);
        }
        resp.json()
            .await
            .map_err(|e| SkydockError::Http(e.to_string()))
    }

    /// Deletes a session.
    pub async fn delete_session(&self, id: Uuid) -> SkydockResult<()> {
        let url = format!("{}/api/chat/sessions/{}", self.base_url, id);
        let resp = self
            .http
            .delete(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| SkydockError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(error_for(status, resp, "session delete").await);
        }
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for ApiClient {
    async fn open_turn(&self, session_id: Uuid, text: &str) -> SkydockResult<ByteStream> {
        let url = format!("{}/api/chat/sessions/{}/stream", self.base_url, session_id);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .header("accept", "text/event-stream")
            .json(&TurnBody { message: text })
            .send()
            .await
            .map_err(|e| SkydockError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(error_for(status, resp, "turn stream").await);
        }

        tracing::debug!(session_id = %session_id, "turn stream opened");

        let stream = resp.bytes_stream().map(|chunk| {
            chunk
                .map(|bytes| bytes.to_vec())
                .map_err(|e| SkydockError::Http(format!("Stream read error: {e}")))
        });
        Ok(Box::pin(stream))
    }
}

#[async_trait]
impl SessionSource for ApiClient {
    async fn fetch_sessions(&self) -> SkydockResult<Vec<ChatSession>> {
        self.list_sessions().await
    }

    async fn fetch_session(&self, id: Uuid) -> SkydockResult<Option<StoredSession>> {
        self.get_session(id).await
    }
}

#[derive(Serialize)]
struct CreateSessionBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    project_id: Option<Uuid>,
}

#[derive(Serialize)]
struct TurnBody<'a> {
    message: &'a str,
}

async fn error_for(status: StatusCode, resp: reqwest::Response, context: &str) -> SkydockError {
    let body = resp
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());
    SkydockError::Http(format!("{context} error {status}: {body}"))
}
