use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, State, multipart::MultipartRejection, rejection::JsonRejection,
    },
    http::HeaderMap,
    routing::{get, post},
};
use classify::{BatchOutcome, SingleOutcome, UploadedImage};
use classify::auth::API_KEY_HEADER;
use extract::SpeciesRecord;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::metrics::{MetricsSnapshot, TimedOperation};

const IMAGE_FIELD: &str = "image";

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    model: String,
    auth_enabled: bool,
    ai_configured: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClassifyResponse {
    success: bool,
    species_info: SpeciesRecord,
    confidence: u8,
    identified_species: String,
}

#[derive(Deserialize)]
struct BatchClassifyRequest {
    #[serde(default)]
    images: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchClassifyResponse {
    success: bool,
    categorized: classify::CategorizedBundle,
    total_analyzed: usize,
    succeeded: usize,
    skipped: usize,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(get_metrics))
        .route("/api-docs", get(api_docs))
        .route("/api/classify", post(classify_single))
        .route("/api/batch-classify", post(classify_batch))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}

fn credential(headers: &HeaderMap) -> Option<&str> {
    headers.get(API_KEY_HEADER).and_then(|value| value.to_str().ok())
}

/// Fall back to the file extension when the upload carries no content type.
fn guess_mime_type(file_name: Option<&str>) -> &'static str {
    let extension = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        _ => "image/jpeg",
    }
}

async fn read_image_field(mut multipart: Multipart) -> ApiResult<Option<UploadedImage>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let mime_type = field
            .content_type()
            .filter(|ct| !ct.is_empty() && *ct != "application/octet-stream")
            .map(str::to_string)
            .unwrap_or_else(|| guess_mime_type(file_name.as_deref()).to_string());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        return Ok(Some(UploadedImage {
            bytes: bytes.to_vec(),
            mime_type,
            file_name,
        }));
    }

    Ok(None)
}

async fn classify_single(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ClassifyResponse>> {
    let timer = TimedOperation::start();
    let result = run_single(&state, &headers, multipart).await;

    state.metrics.record_single(timer.elapsed());
    state.metrics.record_request(result.is_ok());

    let outcome = result?;
    info!(species = %outcome.species.common_name, "Single classification succeeded");

    Ok(Json(ClassifyResponse {
        success: true,
        identified_species: outcome.species.common_name.clone(),
        confidence: outcome.confidence,
        species_info: outcome.species,
    }))
}

async fn run_single(
    state: &AppState,
    headers: &HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<SingleOutcome> {
    let credential = credential(headers);
    state.classifier.authorize(credential)?;

    let multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let image = read_image_field(multipart).await?;

    Ok(state.classifier.classify_single(credential, image).await?)
}

async fn classify_batch(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<BatchClassifyRequest>, JsonRejection>,
) -> ApiResult<Json<BatchClassifyResponse>> {
    let timer = TimedOperation::start();
    let result = run_batch(&state, &headers, body).await;

    state.metrics.record_batch(timer.elapsed());
    state.metrics.record_request(result.is_ok());

    let outcome = result?;
    state
        .metrics
        .record_images(outcome.attempted, outcome.succeeded, outcome.skipped);

    Ok(Json(BatchClassifyResponse {
        success: true,
        categorized: outcome.categorized,
        total_analyzed: outcome.attempted,
        succeeded: outcome.succeeded,
        skipped: outcome.skipped,
    }))
}

async fn run_batch(
    state: &AppState,
    headers: &HeaderMap,
    body: Result<Json<BatchClassifyRequest>, JsonRejection>,
) -> ApiResult<BatchOutcome> {
    let credential = credential(headers);
    state.classifier.authorize(credential)?;

    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    // Runs on its own task so a client disconnect lets the current image finish.
    Ok(state
        .classifier
        .classify_batch_detached(credential, request.images)
        .await?)
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let extractor = state.classifier.extractor();

    Json(HealthResponse {
        status: "ok",
        model: extractor.model_name().to_string(),
        auth_enabled: state.classifier.auth_enabled(),
        ai_configured: extractor.is_ready(),
    })
}

async fn get_metrics(State(state): State<Arc<AppState>>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

async fn api_docs() -> Json<Value> {
    Json(json!({
        "authentication": {
            "header": API_KEY_HEADER,
            "description":
                "Required only when the server has API_KEY set. Generate keys with the generate_key binary.",
        },
        "endpoints": [
            {
                "method": "POST",
                "path": "/api/classify",
                "content_type": "multipart/form-data",
                "fields": { IMAGE_FIELD: "image file (jpeg, png, webp, ...)" },
                "response": {
                    "success": "bool",
                    "speciesInfo": "species record",
                    "confidence": "integer 0-100",
                    "identifiedSpecies": "common name",
                },
                "errors": {
                    "401": "missing or invalid API key",
                    "400": "no image",
                    "500": "AI not configured or unparseable response",
                },
            },
            {
                "method": "POST",
                "path": "/api/batch-classify",
                "content_type": "application/json",
                "body": { "images": ["data:image/jpeg;base64,..."] },
                "response": {
                    "success": "bool",
                    "categorized": {
                        "new": [],
                        "rare": [],
                        "dangerous": [],
                        "common": { "fish": [], "corals": [], "crabs": [], "other": [] },
                    },
                    "totalAnalyzed": "number of images submitted",
                    "succeeded": "images that produced a record",
                    "skipped": "images dropped after a decode or AI failure",
                },
                "errors": {
                    "401": "missing or invalid API key",
                    "400": "no images or malformed body",
                    "500": "AI not configured",
                },
            },
        ],
        "species_record_fields": [
            "common_name", "scientific_name", "about", "habitat", "size", "behavior",
            "conservation_status", "is_dangerous", "fun_facts", "did_you_know",
            "category", "rarity", "confidence", "image",
        ],
    }))
}
