//! Direct image-host uploads with backend-issued signatures.
//!
//! Entity images (products, categories, profile pictures) are not proxied
//! through the backend: the backend only signs the upload (so no long-lived
//! credential reaches this layer's requests), and the file goes straight to
//! the image host. The returned `secure_url` is what entity forms submit.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use crate::backend::{BackendClient, BackendError};
use crate::config::MediaConfig;

/// Image upload failures. Any of these blocks the owning form's submission.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The backend refused to sign the upload.
    #[error("failed to obtain an upload signature: {0}")]
    Signature(#[from] BackendError),

    /// HTTP transport failure talking to the image host.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The image host rejected the upload.
    #[error("image host rejected the upload: {0}")]
    Host(String),

    /// The image host answered 2xx without a `secure_url`.
    #[error("image host response carried no secure_url")]
    MissingUrl,

    /// No file bytes were provided.
    #[error("no file was provided")]
    EmptyFile,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    secure_url: Option<String>,
}

/// Client for the image host's upload endpoint.
#[derive(Clone)]
pub struct MediaClient {
    inner: Arc<MediaClientInner>,
}

struct MediaClientInner {
    client: reqwest::Client,
    cloud_name: String,
    api_key: String,
    upload_preset: String,
}

impl MediaClient {
    /// Create a new media client.
    #[must_use]
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            inner: Arc::new(MediaClientInner {
                client: reqwest::Client::new(),
                cloud_name: config.cloud_name.clone(),
                api_key: config.api_key.clone(),
                upload_preset: config.upload_preset.clone(),
            }),
        }
    }

    /// Upload an image and return its hosted URL.
    ///
    /// Flow: request a signed ticket from the backend for the current
    /// timestamp, then post the file directly to the image host with the
    /// signature attached.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError`] if the signature cannot be obtained, the host
    /// rejects the upload, or the response carries no URL.
    #[instrument(skip(self, backend, bytes), fields(filename = %filename, size = bytes.len()))]
    pub async fn upload_image(
        &self,
        backend: &BackendClient,
        bytes: Vec<u8>,
        filename: String,
        content_type: Option<String>,
    ) -> Result<String, UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::EmptyFile);
        }

        let timestamp = Utc::now().timestamp();
        let ticket = backend.upload_signature(timestamp).await?;

        let mut part = reqwest::multipart::Part::bytes(bytes).file_name(filename);
        if let Some(mime) = content_type {
            part = part
                .mime_str(&mime)
                .map_err(|_| UploadError::Host(format!("unsupported content type {mime}")))?;
        }

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("upload_preset", self.inner.upload_preset.clone())
            .text("api_key", self.inner.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("signature", ticket.signature);

        let url = format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            self.inner.cloud_name
        );
        let response = self.inner.client.post(&url).multipart(form).send().await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(UploadError::Host(format!(
                "{status}: {}",
                text.chars().take(200).collect::<String>()
            )));
        }

        let body: UploadResponse = serde_json::from_str(&text)
            .map_err(|_| UploadError::Host(text.chars().take(200).collect()))?;

        body.secure_url.ok_or(UploadError::MissingUrl)
    }
}
