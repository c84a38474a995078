use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// One image handed to the model, borrowed from the caller's upload.
#[derive(Debug, Clone, Copy)]
pub struct ImagePayload<'a> {
    pub bytes: &'a [u8],
    pub mime_type: &'a str,
}

/// A multimodal model: given an instruction and an image, answer with text.
#[async_trait]
pub trait VisionModel: Send + Sync {
    async fn generate(&self, prompt: &str, image: ImagePayload<'_>) -> Result<String>;

    /// Whether the model has the credentials it needs to be called at all.
    fn is_configured(&self) -> bool {
        true
    }

    fn model_name(&self) -> &str;
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_base: String,
    pub model: String,
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            api_key: None,
            request_timeout_secs: 60,
        }
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    api_base: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    Image {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build Gemini HTTP client")?;

        Ok(Self {
            api_base: config.api_base.trim().trim_end_matches('/').to_string(),
            model: config.model,
            api_key: config.api_key.filter(|key| !key.trim().is_empty()),
            client,
        })
    }

    fn endpoint(&self) -> String {
        let model = self.model.trim();
        let model_path = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }
}

#[async_trait]
impl VisionModel for GeminiClient {
    async fn generate(&self, prompt: &str, image: ImagePayload<'_>) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .context("GEMINI_API_KEY is not set")?;

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text { text: prompt },
                    Part::Image {
                        inline_data: InlineData {
                            mime_type: image.mime_type,
                            data: BASE64.encode(image.bytes),
                        },
                    },
                ],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Gemini")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            anyhow::bail!("Gemini request failed: {status}: {snippet}");
        }

        let payload: GenerateResponse = response
            .json()
            .await
            .context("Failed to parse Gemini response")?;

        let text: String = payload
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            anyhow::bail!("Gemini returned no text");
        }

        Ok(text)
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(model: &str, api_key: Option<&str>) -> GeminiClient {
        GeminiClient::new(GeminiConfig {
            api_base: "https://example.test/v1beta/".to_string(),
            model: model.to_string(),
            api_key: api_key.map(str::to_string),
            ..GeminiConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_building() {
        assert_eq!(
            client("gemini-1.5-flash", None).endpoint(),
            "https://example.test/v1beta/models/gemini-1.5-flash:generateContent"
        );
        assert_eq!(
            client("models/gemini-pro-vision", None).endpoint(),
            "https://example.test/v1beta/models/gemini-pro-vision:generateContent"
        );
    }

    #[test]
    fn test_blank_key_is_unconfigured() {
        assert!(!client(DEFAULT_GEMINI_MODEL, Some("  ")).is_configured());
        assert!(client(DEFAULT_GEMINI_MODEL, Some("abc")).is_configured());
    }

    #[test]
    fn test_request_body_shape() {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text { text: "identify" },
                    Part::Image {
                        inline_data: InlineData {
                            mime_type: "image/png",
                            data: BASE64.encode([1u8, 2, 3]),
                        },
                    },
                ],
            }],
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "identify");
        assert_eq!(
            value["contents"][0]["parts"][1]["inlineData"]["mimeType"],
            "image/png"
        );
        assert_eq!(value["contents"][0]["parts"][1]["inlineData"]["data"], "AQID");
    }

    #[tokio::test]
    async fn test_generate_without_key_fails_before_sending() {
        let gemini = client(DEFAULT_GEMINI_MODEL, None);
        let image = ImagePayload {
            bytes: &[0u8; 4],
            mime_type: "image/jpeg",
        };

        let err = gemini.generate("prompt", image).await.unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }
}
