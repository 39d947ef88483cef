use thiserror::Error;

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("Failed to read {path}: {reason}")]
    ReadFailed { path: String, reason: String },

    #[error("Failed to parse bundle archive: {0}")]
    BundleParseFailed(String),

    #[error("Invalid path in bundle: {0}")]
    InvalidPath(String),

    #[error("Book too large: {size} bytes (max: {max})")]
    BookTooLarge { size: u64, max: u64 },

    #[error("Invalid book title from {0}")]
    InvalidTitle(String),

    #[error("Duplicate book title: {0}")]
    DuplicateBook(String),

    #[error("Book '{0}' is not UTF-8 text")]
    NotText(String),
}
