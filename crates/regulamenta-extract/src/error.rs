use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("cannot read document {path}: {message}")]
    DocumentRead { path: PathBuf, message: String },

    #[error("OCR failed for {path}: {message}")]
    Ocr { path: PathBuf, message: String },

    #[error("unsupported document type: {0}")]
    UnsupportedType(PathBuf),

    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ExtractError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn ocr(path: &std::path::Path, message: impl Into<String>) -> Self {
        Self::Ocr {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}
