//! Application state shared across all route handlers.
//!
//! AppState holds the configuration and the orchestrator. It is passed to
//! handlers via axum's State extractor; all fields use `Arc` for cheap
//! cloning across handler tasks.

use std::sync::Arc;
use std::time::Instant;

use nimbus_ai::Orchestrator;
use nimbus_core::config::NimbusConfig;

use crate::error::ApiError;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<NimbusConfig>,
    /// The AI orchestrator; `None` when no API key could be resolved, in
    /// which case AI routes answer 503 while info routes keep working.
    orchestrator: Option<Arc<Orchestrator>>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Create a new AppState.
    pub fn new(config: NimbusConfig, orchestrator: Option<Orchestrator>) -> Self {
        Self {
            config: Arc::new(config),
            orchestrator: orchestrator.map(Arc::new),
            start_time: Instant::now(),
        }
    }

    /// Whether the AI backend is configured.
    pub fn ai_available(&self) -> bool {
        self.orchestrator.is_some()
    }

    /// The orchestrator, or a 503 when the backend is not configured.
    pub fn orchestrator(&self) -> Result<&Arc<Orchestrator>, ApiError> {
        self.orchestrator.as_ref().ok_or_else(|| {
            ApiError::ServiceUnavailable(
                "AI service not available. Configure GOOGLE_API_KEY".to_string(),
            )
        })
    }
}
