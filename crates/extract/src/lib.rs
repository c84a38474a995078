pub mod error;
pub mod llm;
pub mod parse;
pub mod prompt;
pub mod schema;
pub mod testing;

pub use error::ExtractionError;
pub use llm::{GeminiClient, GeminiConfig, ImagePayload, VisionModel};
pub use parse::ParseMode;
pub use schema::{Category, Rarity, SpeciesRecord};

use std::sync::Arc;
use tracing::{debug, info};

/// How the model's answer is read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptVariant {
    /// One uploaded photo; the answer must be a clean JSON object.
    Single,
    /// A dive-log photo; tolerate prose around the JSON object.
    Batch,
}

impl PromptVariant {
    pub fn parse_mode(self) -> ParseMode {
        match self {
            PromptVariant::Single => ParseMode::Strict,
            PromptVariant::Batch => ParseMode::Lenient,
        }
    }
}

#[derive(Clone)]
pub struct SpeciesExtractor {
    model: Arc<dyn VisionModel>,
}

impl SpeciesExtractor {
    pub fn new(model: Arc<dyn VisionModel>) -> Self {
        Self { model }
    }

    /// True when the underlying model has its own credential configured.
    pub fn is_ready(&self) -> bool {
        self.model.is_configured()
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Identify the organism in one image.
    ///
    /// Makes exactly one model call and never retries; retry policy belongs
    /// to the caller.
    pub async fn extract(
        &self,
        image_bytes: &[u8],
        mime_type: &str,
        variant: PromptVariant,
    ) -> Result<SpeciesRecord, ExtractionError> {
        let prompt = prompt::build_species_prompt();
        let image = ImagePayload {
            bytes: image_bytes,
            mime_type,
        };

        let response = self
            .model
            .generate(&prompt, image)
            .await
            .map_err(ExtractionError::Upstream)?;

        debug!(
            variant = ?variant,
            preview = %response.chars().take(200).collect::<String>(),
            "Raw model response"
        );

        let species = parse::parse_species_response(&response, variant.parse_mode())?;

        info!(
            common_name = %species.common_name,
            confidence = species.confidence,
            "Species extracted"
        );

        Ok(species)
    }
}
