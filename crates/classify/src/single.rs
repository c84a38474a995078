use extract::{PromptVariant, SpeciesRecord};
use serde::Serialize;
use tracing::info;

use crate::{Classifier, ServiceError};

/// One photo as it arrived in the upload form.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SingleOutcome {
    pub species: SpeciesRecord,
    pub confidence: u8,
}

impl Classifier {
    /// Identify the organism in one uploaded photo.
    pub async fn classify_single(
        &self,
        credential: Option<&str>,
        image: Option<UploadedImage>,
    ) -> Result<SingleOutcome, ServiceError> {
        self.authorize(credential)?;

        let image = image
            .filter(|image| !image.bytes.is_empty())
            .ok_or(ServiceError::NoImage)?;

        self.ensure_model_ready()?;

        info!(
            file_name = image.file_name.as_deref().unwrap_or("<unnamed>"),
            mime_type = %image.mime_type,
            bytes = image.bytes.len(),
            "Classifying single image"
        );

        let species = self
            .extractor
            .extract(&image.bytes, &image.mime_type, PromptVariant::Single)
            .await
            .map_err(|err| {
                tracing::error!(error = %err, "Single classification failed");
                ServiceError::from(err)
            })?;

        Ok(SingleOutcome {
            confidence: species.confidence,
            species,
        })
    }
}
