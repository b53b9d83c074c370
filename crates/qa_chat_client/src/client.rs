//! HTTP client: chat exchange (`POST /chat`) and the Q&A record store (`/qa`).

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use tracing::debug;

use crate::messages::{ChatReply, ChatRequest, Record, RecordDraft, RecordId};

/// Transport or protocol failure on any backend call.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("HTTP error! status: {0}")]
    Status(u16),
    #[error("invalid response body: {0}")]
    Decode(String),
    #[error("invalid base URL: {0}")]
    BaseUrl(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Decode(e.to_string())
    }
}

/// Sends one chat message and returns the extracted reply.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_chat(&self, message: &str) -> Result<ChatReply, ClientError>;
}

/// Remote Q&A record store. Non-success status is always an error.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create(&self, draft: &RecordDraft) -> Result<(), ClientError>;
    async fn list(&self) -> Result<Vec<Record>, ClientError>;
    async fn get(&self, id: &RecordId) -> Result<Record, ClientError>;
    async fn update(&self, id: &RecordId, draft: &RecordDraft) -> Result<(), ClientError>;
    async fn delete(&self, id: &RecordId) -> Result<(), ClientError>;
}

/// `reqwest`-backed implementation of both backend surfaces.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    base: Url,
}

impl HttpBackend {
    /// `base_url` is the server root, e.g. `http://localhost:8000`.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ClientError::BaseUrl(base_url.to_string()));
        }
        let base = Url::parse(trimmed).map_err(|_| ClientError::BaseUrl(base_url.to_string()))?;
        Ok(Self {
            client: Client::new(),
            base_url: trimmed.to_string(),
            base,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `{base}/qa/{id}` with the id percent-encoded as one path segment.
    fn record_url(&self, id: &RecordId) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::BaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push("qa")
            .push(id.as_str());
        Ok(url)
    }

    /// Sends the request and fails on a non-success status.
    async fn execute(request: RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }
        Ok(response)
    }
}

#[async_trait]
impl ChatTransport for HttpBackend {
    async fn send_chat(&self, message: &str) -> Result<ChatReply, ClientError> {
        let url = self.url("/chat");
        debug!(%url, "sending chat message");
        let response = Self::execute(self.client.post(&url).json(&ChatRequest::new(message))).await?;
        let body = response.text().await?;
        let value: serde_json::Value = serde_json::from_str(&body)?;
        if value.is_null() {
            return Err(ClientError::Decode("chat body is null".into()));
        }
        Ok(ChatReply::from_json(&value))
    }
}

#[async_trait]
impl RecordStore for HttpBackend {
    async fn create(&self, draft: &RecordDraft) -> Result<(), ClientError> {
        debug!("creating Q&A record");
        Self::execute(self.client.post(self.url("/qa")).json(draft)).await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Record>, ClientError> {
        debug!("listing Q&A records");
        let response = Self::execute(self.client.get(self.url("/qa"))).await?;
        Ok(response.json().await?)
    }

    async fn get(&self, id: &RecordId) -> Result<Record, ClientError> {
        debug!(%id, "fetching Q&A record");
        let response = Self::execute(self.client.get(self.record_url(id)?)).await?;
        Ok(response.json().await?)
    }

    async fn update(&self, id: &RecordId, draft: &RecordDraft) -> Result<(), ClientError> {
        debug!(%id, "updating Q&A record");
        Self::execute(self.client.put(self.record_url(id)?).json(draft)).await?;
        Ok(())
    }

    async fn delete(&self, id: &RecordId) -> Result<(), ClientError> {
        debug!(%id, "deleting Q&A record");
        Self::execute(self.client.delete(self.record_url(id)?)).await?;
        Ok(())
    }
}
