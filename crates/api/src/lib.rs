pub mod config;
pub mod error;
pub mod metrics;
pub mod routes;

pub use config::AppConfig;
pub use routes::build_router;

use anyhow::Result;
use classify::{Classifier, FixedDelay};
use extract::{GeminiClient, SpeciesExtractor};
use metrics::Metrics;
use std::sync::Arc;

pub struct AppState {
    pub classifier: Classifier,
    pub metrics: Arc<Metrics>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(classifier: Classifier, max_upload_bytes: usize) -> Self {
        Self {
            classifier,
            metrics: Metrics::new(),
            max_upload_bytes,
        }
    }

    /// Wire the Gemini client, pacing policy and caller secret from configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let gemini = GeminiClient::new(config.gemini_config())?;
        let extractor = SpeciesExtractor::new(Arc::new(gemini));
        let pacer = Arc::new(FixedDelay::from_millis(config.batch.pacing_ms));
        let classifier = Classifier::new(extractor, config.api_key.clone(), pacer);

        Ok(Self::new(classifier, config.limits.max_upload_bytes))
    }
}
