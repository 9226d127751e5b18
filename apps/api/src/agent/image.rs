//! Generated-image decoding: provider file download in, `data:` URL out.
//!
//! The file store hands back images in several shapes depending on the tool
//! and API version. `ImagePayload::classify` sorts a download into one of a
//! closed set of shapes; `to_data_url` is the only thing callers use.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use serde_json::Value;
use thiserror::Error;

use crate::provider::FileDownload;

const DATA_URL_PREFIX: &str = "data:image/";
const FALLBACK_MIME: &str = "image/png";

#[derive(Debug, Error)]
pub enum ImageDecodeError {
    #[error("Unsupported image payload: {0}")]
    Unsupported(String),

    #[error("Invalid base64 image data: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid JSON image payload: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImagePayload {
    /// Raw binary body.
    Bytes(Bytes),
    /// Base64 text without a data URL prefix.
    Base64(String),
    /// Already a `data:image/...` URL.
    DataUrl(String),
    /// JSON wrapper whose `data` field holds the real payload.
    Wrapped(Box<ImagePayload>),
}

impl ImagePayload {
    pub fn classify(download: &FileDownload) -> Result<Self, ImageDecodeError> {
        let content_type = download
            .content_type
            .as_deref()
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase());

        match content_type.as_deref() {
            Some("application/json") => {
                let value: Value = serde_json::from_slice(&download.body)?;
                Self::from_json(value)
            }
            Some(ct) if ct.starts_with("text/") => {
                let text = std::str::from_utf8(&download.body).map_err(|_| {
                    ImageDecodeError::Unsupported("text body is not UTF-8".to_string())
                })?;
                Self::from_text(text)
            }
            _ if download.body.starts_with(DATA_URL_PREFIX.as_bytes()) => {
                Self::from_text(&String::from_utf8_lossy(&download.body))
            }
            _ if download.body.is_empty() => {
                Err(ImageDecodeError::Unsupported("empty body".to_string()))
            }
            _ => Ok(ImagePayload::Bytes(download.body.clone())),
        }
    }

    fn from_text(text: &str) -> Result<Self, ImageDecodeError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ImageDecodeError::Unsupported("empty text".to_string()));
        }
        if text.starts_with(DATA_URL_PREFIX) {
            Ok(ImagePayload::DataUrl(text.to_string()))
        } else {
            Ok(ImagePayload::Base64(text.to_string()))
        }
    }

    fn from_json(value: Value) -> Result<Self, ImageDecodeError> {
        match value {
            Value::String(s) => Self::from_text(&s),
            Value::Array(items) => items
                .iter()
                .map(|v| v.as_u64().and_then(|n| u8::try_from(n).ok()))
                .collect::<Option<Vec<u8>>>()
                .filter(|bytes| !bytes.is_empty())
                .map(|bytes| ImagePayload::Bytes(Bytes::from(bytes)))
                .ok_or_else(|| ImageDecodeError::Unsupported("array is not a byte array".to_string())),
            Value::Object(mut map) => match map.remove("data") {
                Some(inner) => Ok(ImagePayload::Wrapped(Box::new(Self::from_json(inner)?))),
                None => Err(ImageDecodeError::Unsupported(
                    "object without a data field".to_string(),
                )),
            },
            other => Err(ImageDecodeError::Unsupported(json_kind(&other).to_string())),
        }
    }

    pub fn to_data_url(self) -> Result<String, ImageDecodeError> {
        match self {
            ImagePayload::DataUrl(url) => Ok(url),
            ImagePayload::Base64(encoded) => {
                let bytes = STANDARD.decode(encoded.as_bytes())?;
                Ok(encode_data_url(&bytes))
            }
            ImagePayload::Bytes(bytes) => Ok(encode_data_url(&bytes)),
            ImagePayload::Wrapped(inner) => inner.to_data_url(),
        }
    }
}

/// Turns a provider file download into an inline image.
pub fn download_to_data_url(download: &FileDownload) -> Result<String, ImageDecodeError> {
    ImagePayload::classify(download)?.to_data_url()
}

fn encode_data_url(bytes: &[u8]) -> String {
    let mime = infer::get(bytes)
        .filter(|kind| kind.matcher_type() == infer::MatcherType::Image)
        .map(|kind| kind.mime_type())
        .unwrap_or(FALLBACK_MIME);
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
