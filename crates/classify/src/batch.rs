use extract::{ExtractionError, PromptVariant, SpeciesRecord};
use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::categorize::{CategorizedBundle, categorize};
use crate::data_url::{DataUrlError, decode_data_url};
use crate::{Classifier, ServiceError};

#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub categorized: CategorizedBundle,
    /// Number of input images, whether or not they produced a record.
    pub attempted: usize,
    pub succeeded: usize,
    pub skipped: usize,
}

/// Why one image in a batch produced no record.
#[derive(Debug, Error)]
enum SkipReason {
    #[error("undecodable image: {0}")]
    Decode(#[from] DataUrlError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("batch cancelled")]
    Cancelled,
}

impl Classifier {
    /// Identify every photo of a dive log, one at a time, in input order.
    pub async fn classify_batch(
        &self,
        credential: Option<&str>,
        images: Vec<String>,
    ) -> Result<BatchOutcome, ServiceError> {
        self.classify_batch_until(credential, images, &CancellationToken::new())
            .await
    }

    /// Runs the batch on a spawned task tied to the returned future.
    ///
    /// Dropping the future (a client hanging up) cancels the batch: the image
    /// in flight finishes on the task and the rest are skipped.
    pub async fn classify_batch_detached(
        &self,
        credential: Option<&str>,
        images: Vec<String>,
    ) -> Result<BatchOutcome, ServiceError> {
        let cancel = CancellationToken::new();
        let _guard = cancel.clone().drop_guard();

        let classifier = self.clone();
        let credential = credential.map(str::to_string);
        let task = tokio::spawn(async move {
            classifier
                .classify_batch_until(credential.as_deref(), images, &cancel)
                .await
        });

        task.await.map_err(|err| {
            error!(error = %err, "Batch task did not complete");
            ServiceError::Internal(err.to_string())
        })?
    }

    /// Like [`Classifier::classify_batch`], but stops starting new images
    /// once `cancel` fires. The image in flight always completes.
    pub async fn classify_batch_until(
        &self,
        credential: Option<&str>,
        images: Vec<String>,
        cancel: &CancellationToken,
    ) -> Result<BatchOutcome, ServiceError> {
        self.authorize(credential)?;

        if images.is_empty() {
            return Err(ServiceError::NoImages);
        }

        self.ensure_model_ready()?;

        let batch_id = Uuid::new_v4();
        let attempted = images.len();
        let mut records: Vec<SpeciesRecord> = Vec::with_capacity(attempted);
        let mut skipped = 0;

        info!(%batch_id, images = attempted, "Starting batch classification");

        for (index, data_url) in images.into_iter().enumerate() {
            match self.classify_data_url(&data_url, cancel).await {
                Ok(mut species) => {
                    species.image = Some(data_url);
                    records.push(species);
                }
                Err(SkipReason::Cancelled) => {
                    skipped += attempted - index;
                    warn!(
                        %batch_id,
                        index,
                        remaining = attempted - index,
                        "Batch cancelled, skipping remaining images"
                    );
                    break;
                }
                Err(reason) => {
                    skipped += 1;
                    warn!(%batch_id, index, error = %reason, "Skipping image");
                }
            }
        }

        let categorized = categorize(&records);

        info!(
            %batch_id,
            attempted,
            succeeded = records.len(),
            skipped,
            new = categorized.new.len(),
            rare = categorized.rare.len(),
            dangerous = categorized.dangerous.len(),
            "Batch classification finished"
        );

        Ok(BatchOutcome {
            categorized,
            attempted,
            succeeded: records.len(),
            skipped,
        })
    }

    async fn classify_data_url(
        &self,
        data_url: &str,
        cancel: &CancellationToken,
    ) -> Result<SpeciesRecord, SkipReason> {
        if cancel.is_cancelled() {
            return Err(SkipReason::Cancelled);
        }

        let image = decode_data_url(data_url)?;

        let result = self
            .extractor
            .extract(&image.bytes, &image.mime_type, PromptVariant::Batch)
            .await;

        // Every model call is followed by the pacing step, successful or not.
        self.pacer.pace().await;

        Ok(result?)
    }
}
