//! Thin wrapper over the backend API.
//!
//! Every call surfaces one of two failure classes: [`ClientError::Network`]
//! for transport problems, non-2xx statuses and unreadable bodies, and
//! [`ClientError::Api`] when a write succeeds at the HTTP level but the
//! payload reports `success: false`.

use reqwest::{multipart::Form, Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

const REQUEST_FAILED: &str = "Request failed";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{message}")]
    Network {
        status: Option<StatusCode>,
        message: String,
    },
    #[error("{0}")]
    Api(String),
}

impl ClientError {
    fn status(status: StatusCode, message: &str) -> Self {
        Self::Network {
            status: Some(status),
            message: format!("{message} ({status})"),
        }
    }

    pub fn http_status(&self) -> Option<StatusCode> {
        match self {
            Self::Network { status, .. } => *status,
            Self::Api(_) => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            status: err.status(),
            message: err.to_string(),
        }
    }
}

/// Body of a write request.
pub enum RequestBody {
    /// Serialized as JSON with an `application/json` content type.
    Json(Value),
    /// Sent as-is; reqwest sets the multipart content type and boundary.
    Multipart(Form),
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<Form> for RequestBody {
    fn from(form: Form) -> Self {
        Self::Multipart(form)
    }
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Reads `endpoint`. The payload is returned as-is, without an envelope check.
    pub async fn get(&self, endpoint: &str) -> Result<Value, ClientError> {
        let response = self.http.get(self.url(endpoint)).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(endpoint, %status, "GET failed");
            return Err(ClientError::status(status, "Network response was not ok"));
        }

        Ok(response.json::<Value>().await?)
    }

    /// Sends `body` as JSON or multipart. A non-2xx status fails with
    /// [`ClientError::Network`] carrying the status (message "API error"),
    /// not [`ClientError::Api`]; `Api` is reserved for a 2xx payload with
    /// `success: false`.
    pub async fn post(
        &self,
        endpoint: &str,
        body: impl Into<RequestBody>,
    ) -> Result<Value, ClientError> {
        let request = self.http.post(self.url(endpoint));
        let request = match body.into() {
            RequestBody::Json(value) => request.json(&value),
            RequestBody::Multipart(form) => request.multipart(form),
        };

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(endpoint, %status, "POST failed");
            return Err(ClientError::status(status, "API error"));
        }

        check_envelope(response.json::<Value>().await?)
    }

    pub async fn get_as<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ClientError> {
        decode(self.get(endpoint).await?)
    }

    pub async fn post_as<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: impl Into<RequestBody>,
    ) -> Result<T, ClientError> {
        decode(self.post(endpoint, body).await?)
    }
}

/// Rejects payloads that carry an explicit `success: false`.
pub fn check_envelope(data: Value) -> Result<Value, ClientError> {
    if data.get("success") == Some(&Value::Bool(false)) {
        let message = data
            .get("message")
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
            .unwrap_or(REQUEST_FAILED);
        return Err(ClientError::Api(message.to_string()));
    }

    Ok(data)
}

fn decode<T: DeserializeOwned>(data: Value) -> Result<T, ClientError> {
    serde_json::from_value(data).map_err(|err| ClientError::Network {
        status: None,
        message: format!("unexpected response payload: {err}"),
    })
}
