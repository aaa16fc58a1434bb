use std::path::{Path, PathBuf};

use base64::{Engine, engine::general_purpose::STANDARD};
use tokio::fs;

use crate::error::EncodeError;

/// Media type attached to every inlined video.
pub const VIDEO_MIME_TYPE: &str = "video/mp4";

/// A user-selected video, either on disk or already in memory.
#[derive(Debug, Clone)]
pub enum MediaBlob {
    File(PathBuf),
    Bytes { name: String, data: Vec<u8> },
}

impl MediaBlob {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        MediaBlob::File(path.into())
    }

    pub fn bytes(name: impl Into<String>, data: Vec<u8>) -> Self {
        MediaBlob::Bytes {
            name: name.into(),
            data,
        }
    }

    /// File-backed blobs count as present until they are read.
    pub fn is_empty(&self) -> bool {
        match self {
            MediaBlob::File(_) => false,
            MediaBlob::Bytes { data, .. } => data.is_empty(),
        }
    }

    pub fn name(&self) -> String {
        match self {
            MediaBlob::File(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            MediaBlob::Bytes { name, .. } => name.clone(),
        }
    }
}

/// Video ready to be inlined into a model request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedMedia {
    pub mime_type: String,
    pub payload: String,
}

impl EncodedMedia {
    fn video(bytes: &[u8]) -> Self {
        Self {
            mime_type: VIDEO_MIME_TYPE.to_string(),
            payload: STANDARD.encode(bytes),
        }
    }
}

async fn read_file(path: &Path) -> Result<Vec<u8>, EncodeError> {
    fs::read(path).await.map_err(|source| EncodeError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read the blob and encode its bytes as padded standard base64.
pub async fn encode_media(blob: &MediaBlob) -> Result<EncodedMedia, EncodeError> {
    let encoded = match blob {
        MediaBlob::File(path) => {
            let bytes = read_file(path).await?;
            tracing::debug!(target: "infovar::pipeline", path = %path.display(), bytes = bytes.len(), "read media file");
            EncodedMedia::video(&bytes)
        }
        MediaBlob::Bytes { data, .. } => EncodedMedia::video(data),
    };

    Ok(encoded)
}
