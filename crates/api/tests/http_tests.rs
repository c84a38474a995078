//! HTTP routing tests against a scripted model.

use api::{AppState, build_router};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use classify::{Classifier, FixedDelay};
use extract::SpeciesExtractor;
use extract::testing::ScriptedModel;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "X-MARINE-BOUNDARY";
const PNG: &str = "data:image/png;base64,AQID";

fn app(model: &Arc<ScriptedModel>, secret: Option<&str>) -> axum::Router {
    let classifier = Classifier::new(
        SpeciesExtractor::new(model.clone()),
        secret.map(str::to_string),
        Arc::new(FixedDelay::from_millis(0)),
    );
    build_router(Arc::new(AppState::new(classifier, 1024 * 1024)))
}

fn species_answer(name: &str, category: &str, rarity: &str, danger: Option<&str>) -> String {
    json!({
        "common_name": name,
        "scientific_name": format!("{name} sp."),
        "about": "Seen on the reef.",
        "is_dangerous": danger,
        "fun_facts": ["one", "two", "three"],
        "category": category,
        "rarity": rarity,
        "confidence": 88,
    })
    .to_string()
}

fn multipart_request(field: &str, key: Option<&str>) -> Request<Body> {
    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"reef.png\"\r\n\
         Content-Type: image/png\r\n\r\n\
         PNGDATA\r\n\
         --{BOUNDARY}--\r\n"
    );

    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/classify")
        .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"));
    if let Some(key) = key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(Body::from(body)).unwrap()
}

fn batch_request(body: Value, key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/batch-classify")
        .header("content-type", "application/json");
    if let Some(key) = key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn classify_single_returns_species() {
    let model = Arc::new(
        ScriptedModel::new().with_response(&species_answer("Clownfish", "fish", "common", None)),
    );

    let response = app(&model, None)
        .oneshot(multipart_request("image", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["identifiedSpecies"], "Clownfish");
    assert_eq!(body["confidence"], 88);
    assert_eq!(body["speciesInfo"]["scientific_name"], "Clownfish sp.");
    assert_eq!(body["speciesInfo"]["is_dangerous"], Value::Null);
    assert_eq!(model.seen_mime_types(), vec!["image/png"]);
}

#[tokio::test]
async fn classify_single_returns_unknown_placeholder() {
    let model = Arc::new(ScriptedModel::new().with_response(
        r#"{"common_name":"Unknown Marine Species", "scientific_name":"N/A", "about": "Not a marine organism."}"#,
    ));

    let response = app(&model, None)
        .oneshot(multipart_request("image", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["identifiedSpecies"], "Unknown Marine Species");
    assert_eq!(body["speciesInfo"]["scientific_name"], "N/A");
    assert_eq!(body["confidence"], 90);
}

#[tokio::test]
async fn classify_single_without_image_field() {
    let model = Arc::new(ScriptedModel::new());

    let response = app(&model, None)
        .oneshot(multipart_request("photo", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "No image provided");
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn classify_single_rejects_missing_key() {
    let model = Arc::new(ScriptedModel::new().with_response("{}"));

    let response = app(&model, Some("msr_secret"))
        .oneshot(multipart_request("image", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("Missing API key"));
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn classify_single_accepts_matching_key() {
    let model = Arc::new(
        ScriptedModel::new().with_response(&species_answer("Manta Ray", "other", "rare", None)),
    );

    let response = app(&model, Some("msr_secret"))
        .oneshot(multipart_request("image", Some("msr_secret")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(model.call_count(), 1);
}

#[tokio::test]
async fn classify_single_parse_failure_is_500() {
    let model = Arc::new(ScriptedModel::new().with_response("I think this is a fish, maybe."));

    let response = app(&model, None)
        .oneshot(multipart_request("image", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Failed to parse AI response");
}

#[tokio::test]
async fn classify_single_unconfigured_model_is_500() {
    let model = Arc::new(ScriptedModel::new().unconfigured());

    let response = app(&model, None)
        .oneshot(multipart_request("image", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"], "API key not configured");
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn batch_classify_categorizes_and_skips_failures() {
    let model = Arc::new(
        ScriptedModel::new()
            .with_response(&species_answer("Lionfish", "fish", "new", Some("venomous spines")))
            .with_response("no idea")
            .with_response(&species_answer("Staghorn Coral", "coral", "common", None)),
    );

    let response = app(&model, None)
        .oneshot(batch_request(json!({"images": [PNG, PNG, PNG]}), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["totalAnalyzed"], 3);
    assert_eq!(body["succeeded"], 2);
    assert_eq!(body["skipped"], 1);

    let categorized = &body["categorized"];
    assert_eq!(categorized["new"][0]["common_name"], "Lionfish");
    assert_eq!(categorized["dangerous"][0]["common_name"], "Lionfish");
    assert_eq!(categorized["common"]["corals"][0]["common_name"], "Staghorn Coral");
    assert_eq!(categorized["common"]["corals"][0]["image"], PNG);
    assert!(categorized["common"]["fish"].as_array().unwrap().is_empty());
    assert!(categorized["rare"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn batch_classify_empty_list() {
    let model = Arc::new(ScriptedModel::new());

    let response = app(&model, None)
        .oneshot(batch_request(json!({"images": []}), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "No images provided");
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn batch_classify_wrong_key_before_body_checks() {
    let model = Arc::new(ScriptedModel::new());

    let response = app(&model, Some("msr_secret"))
        .oneshot(batch_request(json!({"images": "not a list"}), Some("msr_wrong")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Invalid API key");
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn batch_classify_malformed_body() {
    let model = Arc::new(ScriptedModel::new());

    let response = app(&model, None)
        .oneshot(batch_request(json!({"images": 42}), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn health_and_metrics() {
    let model = Arc::new(ScriptedModel::new());
    let app = app(&model, Some("msr_secret"));

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["model"], "scripted");
    assert_eq!(body["auth_enabled"], true);
    assert_eq!(body["ai_configured"], true);

    let response = app
        .clone()
        .oneshot(batch_request(json!({"images": []}), Some("msr_secret")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["total_requests"], 1);
    assert_eq!(body["failed_requests"], 1);
    assert_eq!(body["batch_requests"], 1);
    assert_eq!(body["images_attempted"], 0);
}

#[tokio::test]
async fn api_docs_lists_endpoints() {
    let model = Arc::new(ScriptedModel::new());

    let response = app(&model, None)
        .oneshot(Request::builder().uri("/api-docs").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let paths: Vec<&str> = body["endpoints"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["path"].as_str().unwrap())
        .collect();
    assert_eq!(paths, vec!["/api/classify", "/api/batch-classify"]);
    assert_eq!(body["authentication"]["header"], "x-api-key");
}
