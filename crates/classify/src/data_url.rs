use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataUrlError {
    #[error("data URL has no ',' separating header and payload")]
    MissingSeparator,

    #[error("data URL header has no MIME type")]
    MissingMimeType,

    #[error("data URL payload is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("data URL payload is empty")]
    EmptyPayload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Decode `data:<mime>;base64,<payload>` into raw bytes and the declared MIME type.
pub fn decode_data_url(url: &str) -> Result<DecodedImage, DataUrlError> {
    let (header, payload) = url
        .split_once(',')
        .ok_or(DataUrlError::MissingSeparator)?;

    let media = header.split(';').next().unwrap_or_default().trim();
    let mime_type = media
        .strip_prefix("data:")
        .unwrap_or(media)
        .trim()
        .to_ascii_lowercase();
    if !mime_type.contains('/') {
        return Err(DataUrlError::MissingMimeType);
    }

    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = BASE64.decode(compact.as_bytes())?;
    if bytes.is_empty() {
        return Err(DataUrlError::EmptyPayload);
    }

    Ok(DecodedImage { bytes, mime_type })
}
