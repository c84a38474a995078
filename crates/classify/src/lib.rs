pub mod auth;
pub mod batch;
pub mod categorize;
pub mod data_url;
pub mod error;
pub mod pacing;
pub mod single;

pub use batch::BatchOutcome;
pub use categorize::{CategorizedBundle, CommonBuckets, categorize};
pub use error::ServiceError;
pub use pacing::{FixedDelay, Pacer};
pub use single::{SingleOutcome, UploadedImage};

use extract::SpeciesExtractor;
use std::sync::Arc;

/// Entry point for both single-photo and dive-log classification.
///
/// Holds no per-request state; clones share the extractor and pacer.
#[derive(Clone)]
pub struct Classifier {
    extractor: SpeciesExtractor,
    api_secret: Option<String>,
    pacer: Arc<dyn Pacer>,
}

impl Classifier {
    pub fn new(
        extractor: SpeciesExtractor,
        api_secret: Option<String>,
        pacer: Arc<dyn Pacer>,
    ) -> Self {
        Self {
            extractor,
            api_secret: api_secret.filter(|secret| !secret.is_empty()),
            pacer,
        }
    }

    pub fn auth_enabled(&self) -> bool {
        self.api_secret.is_some()
    }

    pub fn extractor(&self) -> &SpeciesExtractor {
        &self.extractor
    }

    /// First gate of every operation; nothing reaches the model before it passes.
    pub fn authorize(&self, credential: Option<&str>) -> Result<(), ServiceError> {
        let check = auth::validate(credential, self.api_secret.as_deref());
        if check.valid {
            Ok(())
        } else {
            Err(ServiceError::Unauthorized(
                check.error.unwrap_or_else(|| "Unauthorized".to_string()),
            ))
        }
    }

    fn ensure_model_ready(&self) -> Result<(), ServiceError> {
        if self.extractor.is_ready() {
            Ok(())
        } else {
            tracing::error!("AI model credential is not configured");
            Err(ServiceError::Misconfigured)
        }
    }
}
