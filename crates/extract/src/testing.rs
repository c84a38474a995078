// Scripted VisionModel for tests in this and downstream crates.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::llm::{ImagePayload, VisionModel};

/// Replays queued answers in order and records every call it receives.
pub struct ScriptedModel {
    responses: Mutex<VecDeque<Result<String, String>>>,
    mime_types: Mutex<Vec<String>>,
    calls: AtomicUsize,
    configured: bool,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            mime_types: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            configured: true,
        }
    }

    pub fn with_response(self, text: &str) -> Self {
        self.push(Ok(text.to_string()));
        self
    }

    /// Queue an upstream failure (network error, quota, ...).
    pub fn with_failure(self, message: &str) -> Self {
        self.push(Err(message.to_string()));
        self
    }

    /// Behave like a client whose credential is missing.
    pub fn unconfigured(mut self) -> Self {
        self.configured = false;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen_mime_types(&self) -> Vec<String> {
        self.mime_types
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn push(&self, response: Result<String, String>) {
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(response);
    }
}

impl Default for ScriptedModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VisionModel for ScriptedModel {
    async fn generate(&self, _prompt: &str, image: ImagePayload<'_>) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.mime_types
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(image.mime_type.to_string());

        let next = self
            .responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front();

        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("no scripted response left")),
        }
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
