use anyhow::{Context, Result};
use classify::pacing::DEFAULT_PACING_MS;
use extract::llm::{DEFAULT_GEMINI_API_BASE, DEFAULT_GEMINI_MODEL};
use extract::GeminiConfig;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub bind_addr: String,
    pub gemini: GeminiSettings,
    /// Secret callers must send in `x-api-key`. `None` disables authorization.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub batch: BatchConfig,
    pub limits: LimitsConfig,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiSettings {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Wait after each model call in a batch.
    pub pacing_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            gemini: GeminiSettings {
                api_key: None,
                api_base: DEFAULT_GEMINI_API_BASE.to_string(),
                model: DEFAULT_GEMINI_MODEL.to_string(),
                request_timeout_secs: 60,
            },
            api_key: None,
            batch: BatchConfig {
                pacing_ms: DEFAULT_PACING_MS,
            },
            limits: LimitsConfig {
                max_upload_bytes: 25 * 1024 * 1024,
            },
            log_format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    /// Build the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any variable source; unset or blank
    /// variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let log_format = match var("LOG_FORMAT").as_deref() {
            None => defaults.log_format,
            Some(raw) if raw.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(raw) if raw.eq_ignore_ascii_case("pretty") => LogFormat::Pretty,
            Some(other) => anyhow::bail!("LOG_FORMAT must be 'pretty' or 'json', got '{other}'"),
        };

        Ok(Self {
            bind_addr: var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            gemini: GeminiSettings {
                api_key: var("GEMINI_API_KEY"),
                api_base: var("GEMINI_API_BASE").unwrap_or(defaults.gemini.api_base),
                model: var("GEMINI_MODEL").unwrap_or(defaults.gemini.model),
                request_timeout_secs: parse_var(
                    var("AI_REQUEST_TIMEOUT_SECS"),
                    "AI_REQUEST_TIMEOUT_SECS",
                    defaults.gemini.request_timeout_secs,
                )?,
            },
            api_key: var("API_KEY"),
            batch: BatchConfig {
                pacing_ms: parse_var(
                    var("BATCH_PACING_MS"),
                    "BATCH_PACING_MS",
                    defaults.batch.pacing_ms,
                )?,
            },
            limits: LimitsConfig {
                max_upload_bytes: parse_var(
                    var("MAX_UPLOAD_BYTES"),
                    "MAX_UPLOAD_BYTES",
                    defaults.limits.max_upload_bytes,
                )?,
            },
            log_format,
        })
    }

    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfig {
            api_base: self.gemini.api_base.clone(),
            model: self.gemini.model.clone(),
            api_key: self.gemini.api_key.clone(),
            request_timeout_secs: self.gemini.request_timeout_secs,
        }
    }
}

fn parse_var<T>(raw: Option<String>, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .parse()
            .with_context(|| format!("{name} has an invalid value '{value}'")),
        None => Ok(default),
    }
}
