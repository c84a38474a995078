use serde::{Deserialize, Serialize};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Placeholder the model is told to use for anything that is not a marine organism.
pub const UNKNOWN_SPECIES: &str = "Unknown Marine Species";
pub const NOT_AVAILABLE: &str = "Not available";
pub const DEFAULT_CONFIDENCE: u8 = 90;
pub const MAX_FUN_FACTS: usize = 5;

const DANGER_FROM_FLAG: &str = "Potentially dangerous to humans";

/// Answers that mean "not dangerous" even though the field is filled in.
const SAFE_ANSWERS: &[&str] = &[
    "none", "no", "null", "n/a", "na", "false", "safe", "not available", "not dangerous",
];
const SAFE_PREFIXES: &[&str] = &[
    "harmless",
    "generally harmless",
    "completely harmless",
    "not dangerous",
    "not considered dangerous",
    "not harmful",
    "not venomous",
    "not poisonous",
    "non-venomous",
    "nonvenomous",
    "none known",
    "no known danger",
    "no danger",
    "no threat",
    "no risk",
    "not a threat",
    "poses no",
    "safe to",
];

/// A hedge after a safe opener ("harmless, but its spines sting") means the
/// answer describes a real hazard.
static CONTRAST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(but|however|unless|except|although|though|yet)\b|;")
        .expect("contrast pattern is valid")
});

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Fish,
    Coral,
    Crab,
    Other,
}

impl Category {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "fish" => Some(Self::Fish),
            "coral" => Some(Self::Coral),
            "crab" => Some(Self::Crab),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    New,
}

impl Rarity {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "common" => Some(Self::Common),
            "rare" => Some(Self::Rare),
            "new" => Some(Self::New),
            _ => None,
        }
    }
}

/// Identification result for one image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpeciesRecord {
    pub common_name: String,
    pub scientific_name: String,
    pub about: String,
    pub habitat: String,
    pub size: String,
    pub behavior: String,
    pub conservation_status: Option<String>,
    /// Set only when the organism is genuinely hazardous to humans.
    pub is_dangerous: Option<String>,
    pub fun_facts: Vec<String>,
    pub did_you_know: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<Rarity>,
    pub confidence: u8,
    /// Data URL of the source photo, attached by the batch pipeline for thumbnails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl SpeciesRecord {
    pub fn is_dangerous(&self) -> bool {
        self.is_dangerous
            .as_deref()
            .is_some_and(|danger| !danger.trim().is_empty())
    }
}

/// The model's answer before any backfilling. Every field is loosely typed
/// so one odd value (a number for `size`, a bool for `is_dangerous`) does not
/// sink the whole record.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawSpeciesRecord {
    common_name: Option<Value>,
    scientific_name: Option<Value>,
    about: Option<Value>,
    habitat: Option<Value>,
    size: Option<Value>,
    behavior: Option<Value>,
    conservation_status: Option<Value>,
    is_dangerous: Option<Value>,
    fun_facts: Option<Value>,
    did_you_know: Option<Value>,
    category: Option<Value>,
    rarity: Option<Value>,
    confidence: Option<Value>,
}

impl From<RawSpeciesRecord> for SpeciesRecord {
    fn from(raw: RawSpeciesRecord) -> Self {
        Self {
            common_name: text_or(raw.common_name, UNKNOWN_SPECIES),
            scientific_name: text_or(raw.scientific_name, NOT_AVAILABLE),
            about: text_or(raw.about, NOT_AVAILABLE),
            habitat: text_or(raw.habitat, NOT_AVAILABLE),
            size: text_or(raw.size, NOT_AVAILABLE),
            behavior: text_or(raw.behavior, NOT_AVAILABLE),
            conservation_status: text(raw.conservation_status),
            is_dangerous: danger(raw.is_dangerous),
            fun_facts: fun_facts(raw.fun_facts),
            did_you_know: text_or(raw.did_you_know, NOT_AVAILABLE),
            category: text(raw.category).and_then(|c| Category::parse(&c)),
            rarity: text(raw.rarity).and_then(|r| Rarity::parse(&r)),
            confidence: confidence(raw.confidence),
            image: None,
        }
    }
}

fn text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let joined = items
                .into_iter()
                .filter_map(|item| text(Some(item)))
                .collect::<Vec<_>>()
                .join(", ");
            (!joined.is_empty()).then_some(joined)
        }
        Value::Null | Value::Object(_) => None,
    }
}

fn text_or(value: Option<Value>, fallback: &str) -> String {
    text(value).unwrap_or_else(|| fallback.to_string())
}

fn danger(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Bool(true) => Some(DANGER_FROM_FLAG.to_string()),
        Value::Bool(false) => None,
        other => text(Some(other)).and_then(|s| normalize_danger(&s)),
    }
}

/// Collapse answers that are wholly a safety statement to `None`; anything
/// else is kept as the hazard description.
pub fn normalize_danger(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let lowered = trimmed.to_ascii_lowercase();
    let bare = lowered.trim_end_matches(['.', '!']);
    if SAFE_ANSWERS.contains(&bare) {
        return None;
    }

    let safe_opener = SAFE_PREFIXES.iter().any(|prefix| bare.starts_with(prefix));
    if safe_opener && !CONTRAST.is_match(bare) {
        return None;
    }

    Some(trimmed.to_string())
}

fn fun_facts(value: Option<Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| text(Some(item)))
            .take(MAX_FUN_FACTS)
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

fn confidence(value: Option<Value>) -> u8 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(score) if score.is_finite() => score.clamp(0.0, 100.0).round() as u8,
        _ => DEFAULT_CONFIDENCE,
    }
}
