use thiserror::Error;

#[derive(Error, Debug)]
pub enum SegmentError {
    #[error("Invalid heading pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Line {position} has no book association")]
    MissingBook { position: usize },
}
