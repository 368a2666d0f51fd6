use std::path::Path;

use base64::Engine;
use tokio::fs;

use super::mime::{guess_mime_type, is_media_type};
use super::UploadedFile;
use crate::error::ReadError;

/// Inline-data ceiling of the hosted model (20 MiB).
pub const DEFAULT_MAX_FILE_BYTES: u64 = 20 * 1024 * 1024;

/// Reads user-selected files into [`UploadedFile`] records.
#[derive(Debug, Clone)]
pub struct FileIngestor {
    max_file_bytes: Option<u64>,
}

impl Default for FileIngestor {
    fn default() -> Self {
        Self {
            max_file_bytes: Some(DEFAULT_MAX_FILE_BYTES),
        }
    }
}

impl FileIngestor {
    /// `None` disables the size check.
    pub fn new(max_file_bytes: Option<u64>) -> Self {
        Self { max_file_bytes }
    }

    /// Read a file from disk. The MIME type is guessed from the extension.
    pub async fn ingest(&self, path: &Path) -> Result<UploadedFile, ReadError> {
        let display_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();

        let meta = fs::metadata(path).await.map_err(|source| ReadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.check_size(&display_name, meta.len())?;

        let data = fs::read(path).await.map_err(|source| ReadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mime_type = guess_mime_type(&display_name);
        self.ingest_bytes(data, &mime_type, &display_name)
    }

    /// Build a record from bytes handed over by a picker.
    pub fn ingest_bytes(
        &self,
        data: Vec<u8>,
        mime_type: &str,
        display_name: &str,
    ) -> Result<UploadedFile, ReadError> {
        self.check_size(display_name, data.len() as u64)?;
        if !is_media_type(mime_type) {
            tracing::warn!(
                file = display_name,
                mime_type,
                "uploaded file is not an image or video"
            );
        }
        tracing::debug!(
            file = display_name,
            mime_type,
            size = data.len(),
            "file ingested"
        );
        Ok(UploadedFile::new(
            data,
            mime_type.to_string(),
            display_name.to_string(),
        ))
    }

    /// Accept a `data:<mime>;base64,<payload>` string as produced by browser
    /// file readers. The MIME type in the prefix wins over the file name.
    pub fn ingest_data_uri(
        &self,
        data_uri: &str,
        display_name: &str,
    ) -> Result<UploadedFile, ReadError> {
        let encoded = strip_data_uri_prefix(data_uri);
        let mime_type = data_uri
            .strip_prefix("data:")
            .and_then(|rest| rest.split([';', ',']).next())
            .filter(|m| !m.is_empty() && encoded.len() < data_uri.len())
            .map(str::to_string)
            .unwrap_or_else(|| guess_mime_type(display_name));
        let data = base64::engine::general_purpose::STANDARD.decode(encoded.trim())?;
        self.ingest_bytes(data, &mime_type, display_name)
    }

    fn check_size(&self, name: &str, size: u64) -> Result<(), ReadError> {
        match self.max_file_bytes {
            Some(limit) if size > limit => Err(ReadError::TooLarge {
                name: name.to_string(),
                size,
                limit,
            }),
            _ => Ok(()),
        }
    }
}

/// Everything after the first comma, or the whole input when there is none.
pub fn strip_data_uri_prefix(text: &str) -> &str {
    match text.find(',') {
        Some(idx) => &text[idx + 1..],
        None => text,
    }
}
