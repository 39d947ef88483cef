// Public API exports
pub mod corpus;
pub mod db;
pub mod pack;
pub mod segmenter;

// Re-export main types for convenience
pub use corpus::{Book, BookEntry, Corpus, CorpusBuilder, CorpusError};

pub use segmenter::{
    assemble_documents, label_lines, segment_lines, Document, HeadingPattern, LabeledLine,
    RawLine, SegmentError, DEFAULT_HEADING_PATTERN,
};

pub use db::{BookRecord, CorpusDb, CorpusStats, DocumentRecord};

pub use pack::{Manifest, ManifestStats, PackReader, PackWriter, PACK_FORMAT_VERSION};
