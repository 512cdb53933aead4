//! Server-side actions (book CRUD, metadata, uploads) as one capability
//!
//! The reader never interprets these responses; it submits an action, lets the
//! caller update the UI on success, and shows the error string in a message
//! panel on failure.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::Result;

/// Human-readable failure of a remote action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMessage(pub String);

impl std::fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[async_trait::async_trait]
pub trait RemoteAction: Send + Sync {
    async fn submit(&self, action: &str, payload: Value) -> std::result::Result<Value, ErrorMessage>;
}

/// `{"status": "ok", ...}` or `{"status": "error", "msg": "..."}`
#[derive(Debug, Deserialize)]
struct ActionResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    msg: Option<String>,
}

/// Remote actions POSTed as JSON to `{base_url}/{action}`
pub struct HttpRemoteAction {
    client: Client,
    base_url: Url,
}

impl HttpRemoteAction {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
        })
    }

    fn action_url(&self, action: &str) -> std::result::Result<Url, ErrorMessage> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ErrorMessage(format!("Invalid base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(action.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }
}

/// Map a response body to the action outcome
fn interpret(body: Value) -> std::result::Result<Value, ErrorMessage> {
    let parsed = ActionResponse::deserialize(&body).unwrap_or(ActionResponse {
        status: None,
        msg: None,
    });
    match parsed.status.as_deref() {
        Some("error") => Err(ErrorMessage(
            parsed.msg.unwrap_or_else(|| "Server reported an error".to_string()),
        )),
        _ => Ok(body),
    }
}

#[async_trait::async_trait]
impl RemoteAction for HttpRemoteAction {
    async fn submit(&self, action: &str, payload: Value) -> std::result::Result<Value, ErrorMessage> {
        let url = self.action_url(action)?;
        tracing::debug!("Submitting {} to {}", action, url);

        let response = self
            .client
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ErrorMessage(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ErrorMessage(format!("Server returned HTTP {}", status)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ErrorMessage(format!("Invalid server response: {}", e)))?;
        interpret(body)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashMessage {
    pub level: MessageLevel,
    pub text: String,
}

/// Flash messages shown to the reader
#[derive(Debug, Default, Clone)]
pub struct MessagePanel {
    messages: Vec<FlashMessage>,
}

impl MessagePanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(MessageLevel::Info, text.into());
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(MessageLevel::Error, text.into());
    }

    fn push(&mut self, level: MessageLevel, text: String) {
        self.messages.push(FlashMessage { level, text });
    }

    pub fn latest(&self) -> Option<&FlashMessage> {
        self.messages.last()
    }

    pub fn messages(&self) -> &[FlashMessage] {
        &self.messages
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

/// Submit `action`; on failure the message lands in `panel` and `None` is returned
pub async fn submit_with_panel(
    remote: &dyn RemoteAction,
    panel: &mut MessagePanel,
    action: &str,
    payload: Value,
) -> Option<Value> {
    match remote.submit(action, payload).await {
        Ok(data) => Some(data),
        Err(message) => {
            tracing::warn!("Remote action {} failed: {}", action, message);
            panel.error(message.0);
            None
        }
    }
}
