//! Application state shared across handlers.

use std::sync::Arc;

use crate::backend::BackendClient;
use crate::config::AppConfig;
use crate::payments::ProcessorClient;
use crate::services::media::MediaClient;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; carries the configuration and the three
/// remote clients (commerce backend, card processor, image host). There is
/// no database handle - the backend owns all durable state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    backend: BackendClient,
    processor: ProcessorClient,
    media: MediaClient,
}

impl AppState {
    /// Create a new application state from configuration.
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        let backend = BackendClient::new(&config.backend);
        let processor = ProcessorClient::new(&config.processor);
        let media = MediaClient::new(&config.media);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                processor,
                media,
            }),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get a reference to the commerce backend client.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    /// Get a reference to the card processor client.
    #[must_use]
    pub fn processor(&self) -> &ProcessorClient {
        &self.inner.processor
    }

    /// Get a reference to the image host client.
    #[must_use]
    pub fn media(&self) -> &MediaClient {
        &self.inner.media
    }
}
