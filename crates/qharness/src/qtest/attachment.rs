//! Report attachments.

use super::error::QTestError;
use super::models::Attachment;
use base64::{engine::general_purpose::STANDARD, Engine};
use std::path::Path;

/// MIME type used for HTML report attachments.
pub const HTML_CONTENT_TYPE: &str = "text/html";

/// Read a file and return the standard base64 encoding of its raw bytes.
pub fn encode_file_to_base64(path: &Path) -> Result<String, QTestError> {
    let bytes = std::fs::read(path).map_err(|source| QTestError::Attachment {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(STANDARD.encode(bytes))
}

/// Build an HTML report attachment named after the file's base name.
pub fn html_report(path: &Path) -> Result<Attachment, QTestError> {
    let data = encode_file_to_base64(path)?;
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    Ok(Attachment {
        name,
        content_type: HTML_CONTENT_TYPE.to_string(),
        data,
    })
}
