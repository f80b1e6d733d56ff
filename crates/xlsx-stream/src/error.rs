use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum XlsxStreamError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("no worksheets defined")]
    NoSheets,
    #[error("output path is not writable: {}", .0.display())]
    NotWritable(PathBuf),
    #[error("invalid style descriptor: {0}")]
    InvalidStyle(String),
}

impl From<serde_json::Error> for XlsxStreamError {
    fn from(err: serde_json::Error) -> Self {
        XlsxStreamError::InvalidStyle(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, XlsxStreamError>;
