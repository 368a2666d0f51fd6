//! File ingestion
//!
//! Turns a user-selected image or video into an in-memory record that the
//! analysis client can inline into a model request. No network access.

pub mod mime;
pub mod reader;

pub use mime::{guess_mime_type, is_media_type};
pub use reader::{strip_data_uri_prefix, FileIngestor, DEFAULT_MAX_FILE_BYTES};

use base64::Engine;

/// A file staged for analysis. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    payload: Vec<u8>,
    encoding: String,
    mime_type: String,
    display_name: String,
}

impl UploadedFile {
    pub(crate) fn new(payload: Vec<u8>, mime_type: String, display_name: String) -> Self {
        let encoding = base64::engine::general_purpose::STANDARD.encode(&payload);
        Self {
            payload,
            encoding,
            mime_type,
            display_name,
        }
    }

    /// Raw bytes as read from disk or the picker.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Base64 text of the payload, without any data-URI prefix.
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn size(&self) -> u64 {
        self.payload.len() as u64
    }

    /// `data:<mime>;base64,<payload>` form, for renderers that embed previews.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.encoding)
    }
}
