use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::error::ExtractionError;
use crate::schema::{RawSpeciesRecord, SpeciesRecord};

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[A-Za-z]*[ \t]*\r?\n?").expect("code fence pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// The whole (fence-stripped) answer must be one JSON object.
    Strict,
    /// Take the first balanced `{...}` object found anywhere in the answer.
    Lenient,
}

/// Remove markdown code fences the model sometimes wraps around its JSON.
pub fn strip_code_fences(text: &str) -> String {
    CODE_FENCE.replace_all(text, "").trim().to_string()
}

/// Return the first balanced `{...}` span that parses as a JSON object.
///
/// Braces inside string literals are ignored, so prose such as
/// `Here you go: {"about": "uses {claws}"}` still resolves correctly.
pub fn find_json_object(text: &str) -> Option<&str> {
    text.char_indices()
        .filter(|&(_, c)| c == '{')
        .filter_map(|(start, _)| balanced_span(text, start))
        .find(|span| matches!(serde_json::from_str::<Value>(span), Ok(Value::Object(_))))
}

fn balanced_span(text: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Turn the model's raw answer into a backfilled [`SpeciesRecord`].
pub fn parse_species_response(
    raw: &str,
    mode: ParseMode,
) -> Result<SpeciesRecord, ExtractionError> {
    let cleaned = strip_code_fences(raw);

    let object = match mode {
        ParseMode::Strict => serde_json::from_str::<Value>(&cleaned)
            .map_err(|e| ExtractionError::MalformedResponse(e.to_string()))?,
        ParseMode::Lenient => {
            let span = find_json_object(&cleaned).ok_or_else(|| {
                ExtractionError::MalformedResponse("no JSON object found in response".to_string())
            })?;
            serde_json::from_str::<Value>(span)
                .map_err(|e| ExtractionError::MalformedResponse(e.to_string()))?
        }
    };

    if !object.is_object() {
        return Err(ExtractionError::MalformedResponse(
            "expected a JSON object".to_string(),
        ));
    }

    let raw_record: RawSpeciesRecord = serde_json::from_value(object)
        .map_err(|e| ExtractionError::MalformedResponse(e.to_string()))?;

    Ok(raw_record.into())
}
