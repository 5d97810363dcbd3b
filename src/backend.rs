//! Edit backend collaborator.
//!
//! The backend is opaque: it receives a [`QuillPayload`] and answers with
//! either an image or a JSON document. [`HttpBackend`] posts the payload as a
//! multipart form to `{base_url}/edit_image`.

use async_trait::async_trait;
use photo_canvas::error::MaskError;
use photo_canvas::payload::{QuillPayload, rescale_result};
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::Form;
use tracing::{info, warn};

use crate::config::BackendTimeouts;

const EDIT_PATH: &str = "/edit_image";

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("failed to build HTTP client: {0}")]
    HttpClientBuild(String),
    #[error("backend request failed: {0}")]
    Request(String),
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("backend returned unsupported content type {0:?}")]
    UnsupportedContent(String),
    #[error("invalid JSON from backend: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not rescale backend image: {0}")]
    Image(#[from] MaskError),
}

/// What the backend sent back.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendReply {
    Image(Vec<u8>),
    Json(serde_json::Value),
}

#[async_trait]
pub trait EditBackend: Send + Sync {
    async fn submit(&self, payload: &QuillPayload) -> Result<BackendReply, BackendError>;
}

pub struct HttpBackend {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpBackend {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeouts: BackendTimeouts) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(timeouts.request())
            .connect_timeout(timeouts.connect())
            .build()
            .map_err(|e| BackendError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, endpoint: endpoint_url(base_url) })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EditBackend for HttpBackend {
    async fn submit(&self, payload: &QuillPayload) -> Result<BackendReply, BackendError> {
        let form = payload
            .form_fields()
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value.to_owned()));

        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        let body = response
            .bytes()
            .await
            .map_err(|e| BackendError::Request(e.to_string()))?;

        if !(200..300).contains(&status) {
            warn!(status, endpoint = %self.endpoint, "edit backend rejected request");
            return Err(BackendError::Status { status, body: String::from_utf8_lossy(&body).into_owned() });
        }

        info!(status, %content_type, bytes = body.len(), "edit backend replied");
        classify_reply(&content_type, body.to_vec())
    }
}

/// `{base}/edit_image`, tolerating a trailing slash on `base`.
#[must_use]
pub fn endpoint_url(base_url: &str) -> String {
    format!("{}{EDIT_PATH}", base_url.trim_end_matches('/'))
}

/// Sort a successful response body by its content type.
///
/// # Errors
///
/// Returns an error for malformed JSON or a content type that is neither
/// `image/*` nor JSON.
pub fn classify_reply(content_type: &str, body: Vec<u8>) -> Result<BackendReply, BackendError> {
    let mime = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    if mime.starts_with("image/") {
        Ok(BackendReply::Image(body))
    } else if mime == "application/json" || mime.ends_with("+json") {
        Ok(BackendReply::Json(serde_json::from_slice(&body)?))
    } else {
        Err(BackendError::UnsupportedContent(content_type.to_owned()))
    }
}

/// Submit `payload` and bring an image reply back to the photo's own size.
///
/// # Errors
///
/// Any backend error, or a failure to decode/rescale the returned image.
pub async fn edit(backend: &dyn EditBackend, payload: &QuillPayload) -> Result<BackendReply, BackendError> {
    match backend.submit(payload).await? {
        BackendReply::Image(bytes) => Ok(BackendReply::Image(rescale_result(&bytes, payload.original_size)?)),
        json @ BackendReply::Json(_) => Ok(json),
    }
}

#[cfg(test)]
#[path = "backend_test.rs"]
mod backend_test;
