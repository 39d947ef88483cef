//! Document segmentation pipeline
//!
//! Two sequential stages:
//! - Chapter labeling: assign each raw line a chapter index within its book
//! - Document assembly: join each (book, chapter) group into one document
//!
//! Both stages are pure functions over in-memory sequences; the corpus is
//! passed in as a value and the result is freshly constructed on every call.

mod assembler;
mod error;
mod heading;
mod labeler;


pub use assembler::{assemble_documents, Document};
pub use error::SegmentError;
pub use heading::HeadingPattern;
pub use labeler::{label_lines, LabeledLine, RawLine};

/// Default chapter-heading rule: the line starts with the word "chapter"
/// (any case), then whitespace, then at least one numeral-like character.
///
/// The character class accepts Roman-numeral letters alongside digits without
/// validating the numeral itself, so "Chapter IX" and "chapter 12" match
/// while "chapterhouse" and "Chapter nine" do not.
pub const DEFAULT_HEADING_PATTERN: &str = r"(?i)^chapter\s+[0-9ivxlc]+";

/// Run both segmentation stages over an ordered line sequence.
///
/// Input lines must be grouped by book (all lines of a book contiguous);
/// every book change resets the chapter counter.
pub fn segment_lines(
    lines: Vec<RawLine>,
    pattern: &HeadingPattern,
) -> Result<Vec<Document>, SegmentError> {
    let labeled = label_lines(lines, pattern)?;
    Ok(assemble_documents(labeled))
}
