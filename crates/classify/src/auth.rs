use rand::Rng;
use rand::distributions::Alphanumeric;

/// Header callers put their key in.
pub const API_KEY_HEADER: &str = "x-api-key";

/// "marine species recognition"
pub const KEY_PREFIX: &str = "msr_";
const KEY_BODY_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValidation {
    pub valid: bool,
    pub error: Option<String>,
}

impl KeyValidation {
    fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    fn denied(error: &str) -> Self {
        Self {
            valid: false,
            error: Some(error.to_string()),
        }
    }
}

/// Check a caller's key against the configured secret.
///
/// With no secret configured every request is allowed. Empty strings count
/// as absent on both sides.
pub fn validate(credential: Option<&str>, configured_secret: Option<&str>) -> KeyValidation {
    let Some(secret) = configured_secret.filter(|s| !s.is_empty()) else {
        return KeyValidation::ok();
    };

    match credential.filter(|c| !c.is_empty()) {
        None => KeyValidation::denied("Missing API key. Include x-api-key header."),
        Some(key) if key != secret => KeyValidation::denied("Invalid API key"),
        Some(_) => KeyValidation::ok(),
    }
}

/// Provision a new caller key: `msr_` plus 32 alphanumeric characters.
pub fn generate_api_key() -> String {
    let body: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(KEY_BODY_LEN)
        .map(char::from)
        .collect();
    format!("{KEY_PREFIX}{body}")
}
