/// Metadata for a single book in the corpus
#[derive(Debug, Clone)]
pub struct BookEntry {
    /// Book title; directory and bundle ingestion use the file stem
    pub title: String,
    /// Where the book came from (file path, bundle member, or "<memory>")
    pub source: String,
    /// Number of lines after normalization
    pub line_count: usize,
    /// Raw size in bytes
    pub size_bytes: usize,
}
