//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::content::{GeminiClient, Provider, StaticContent};
use crate::session::SessionStore;

/// Application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    /// Resolved configuration
    pub config: Arc<AppConfig>,
    /// Content provider: model-backed when an API key is configured,
    /// built-in tables otherwise
    pub provider: Arc<Provider>,
    /// Per-learner session store
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let provider = match &config.api_key {
            Some(key) => match GeminiClient::new(&config, key.clone()) {
                Ok(client) => {
                    tracing::info!("Using model provider: {}", config.model);
                    Provider::Gemini(client)
                }
                Err(e) => {
                    tracing::warn!("Failed to build model client, using built-in content: {}", e);
                    Provider::Static(StaticContent)
                }
            },
            None => Provider::Static(StaticContent),
        };

        Self {
            config: Arc::new(config),
            provider: Arc::new(provider),
            sessions: Arc::new(SessionStore::new()),
        }
    }

    /// State wired to the built-in tables regardless of configuration.
    pub fn with_static_content(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
            provider: Arc::new(Provider::Static(StaticContent)),
            sessions: Arc::new(SessionStore::new()),
        }
    }
}
