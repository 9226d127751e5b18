//! Decoding of conversation outputs.
//!
//! Each output entry carries `content` that is either a bare string or a list
//! of chunks. Chunks are classified into a closed set; everything the service
//! does not understand (tool references, citations, ...) is `Other`.

use serde_json::Value;

/// Where a `tool_file` chunk may keep its file id, checked in this order.
/// The first non-empty string wins.
pub const FILE_ID_FIELDS: &[&[&str]] = &[
    &["file_id"],
    &["fileId"],
    &["file", "id"],
    &["file", "file_id"],
    &["file", "fileId"],
    &["tool_file", "file_id"],
    &["tool_file", "fileId"],
];

#[derive(Debug, Clone, PartialEq)]
pub enum OutputChunk {
    Text(String),
    /// Tool-generated file (an image). `file_id` is `None` when no known
    /// field carries it.
    ToolFile { file_id: Option<String> },
    Other,
}

/// Text and generated files extracted from one conversation turn.
#[derive(Debug, Default, PartialEq)]
pub struct DecodedOutputs {
    pub text: String,
    pub file_ids: Vec<String>,
    /// Set when any `tool_file` chunk appeared, even one without a usable id.
    pub saw_tool_file: bool,
}

pub fn file_id(chunk: &Value) -> Option<&str> {
    FILE_ID_FIELDS.iter().find_map(|path| {
        path.iter()
            .try_fold(chunk, |node, key| node.get(*key))
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
    })
}

pub fn classify(chunk: &Value) -> OutputChunk {
    if let Some(text) = chunk.as_str() {
        return OutputChunk::Text(text.to_string());
    }

    match chunk.get("type").and_then(Value::as_str) {
        Some("text") => match chunk.get("text").and_then(Value::as_str) {
            Some(text) if !text.is_empty() => OutputChunk::Text(text.to_string()),
            _ => OutputChunk::Other,
        },
        Some("tool_file") => OutputChunk::ToolFile {
            file_id: file_id(chunk).map(String::from),
        },
        _ => OutputChunk::Other,
    }
}

/// Flattens every output's content into chunks, preserving order.
/// Outputs without `content` (or with a null one) are skipped.
pub fn output_chunks(outputs: &[Value]) -> Vec<(OutputChunk, &Value)> {
    outputs
        .iter()
        .filter_map(|output| output.get("content").filter(|c| !c.is_null()))
        .flat_map(|content| match content {
            Value::Array(items) => items.iter().collect::<Vec<_>>(),
            single => vec![single],
        })
        .map(|chunk| (classify(chunk), chunk))
        .collect()
}

pub fn decode_outputs(outputs: &[Value]) -> DecodedOutputs {
    let mut decoded = DecodedOutputs::default();

    for (chunk, raw) in output_chunks(outputs) {
        match chunk {
            OutputChunk::Text(text) => decoded.text.push_str(&text),
            OutputChunk::ToolFile { file_id } => {
                decoded.saw_tool_file = true;
                match file_id {
                    Some(id) => decoded.file_ids.push(id),
                    None => {
                        let keys: Vec<&str> = raw
                            .as_object()
                            .map(|o| o.keys().map(String::as_str).collect())
                            .unwrap_or_default();
                        tracing::warn!("tool_file chunk missing file id (keys: {keys:?})");
                    }
                }
            }
            OutputChunk::Other => {}
        }
    }

    decoded
}
