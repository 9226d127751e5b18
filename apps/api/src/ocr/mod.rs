//! OCR ingestion — résumé documents in, raw text and labeled sections out.
//!
//! Extraction and structuring are both delegated to the provider; this module
//! only sequences the calls and shapes their results.

pub mod handlers;
pub mod prompts;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use crate::provider::{strip_json_fences, DocumentProvider, ProviderError};

pub const OCR_PURPOSE: &str = "ocr";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StructuredResume {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub sections: Vec<ResumeSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResumeSection {
    #[serde(default)]
    pub heading: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub items: Vec<SectionItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SectionItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub date_range: String,
    #[serde(default)]
    pub bullets: Vec<String>,
}

/// Uploads the document and returns its OCR text.
pub async fn extract_text(
    provider: &dyn DocumentProvider,
    file_name: &str,
    bytes: Bytes,
) -> Result<String, ProviderError> {
    let size = bytes.len();
    let file_id = provider.upload_file(file_name, bytes, OCR_PURPOSE).await?;
    debug!("Uploaded {file_name} ({size} bytes) as {file_id}");

    let result = provider.ocr(&file_id).await?;
    Ok(ocr_text(&result))
}

/// Page markdown joined by blank lines; the whole OCR document, pretty
/// printed, when no page text came back.
pub fn ocr_text(result: &Value) -> String {
    let pages: Vec<&str> = result
        .get("pages")
        .and_then(Value::as_array)
        .map(|pages| {
            pages
                .iter()
                .filter_map(|p| p.get("markdown").and_then(Value::as_str))
                .filter(|md| !md.trim().is_empty())
                .collect()
        })
        .unwrap_or_default();

    if pages.is_empty() {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| result.to_string())
    } else {
        pages.join("\n\n")
    }
}

/// Restructures raw OCR text into résumé sections.
///
/// A provider failure is an error. An empty completion or an unparseable
/// structure is not: it is logged and reported as `None` so the raw text
/// still reaches the caller.
pub async fn structure_text(
    provider: &dyn DocumentProvider,
    raw_text: &str,
) -> Result<Option<StructuredResume>, ProviderError> {
    let content = match provider
        .complete_json(prompts::STRUCTURE_SYSTEM, raw_text)
        .await
    {
        Ok(content) => content,
        Err(ProviderError::EmptyContent) => {
            error!("Structuring completion returned no content");
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    match serde_json::from_str::<StructuredResume>(strip_json_fences(&content)) {
        Ok(structured) => Ok(Some(structured)),
        Err(e) => {
            error!("Failed to parse structured OCR output: {e}");
            Ok(None)
        }
    }
}
