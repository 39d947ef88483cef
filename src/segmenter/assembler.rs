use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::labeler::LabeledLine;

/// One assembled document: every line of a (book, chapter) group joined
/// into a single string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Book the document belongs to
    pub book: String,
    /// Chapter index within the book (0 = front matter)
    pub chapter: u32,
    /// Space-joined text of all constituent lines, in original order
    pub text: String,
    /// Number of lines merged into this document
    pub line_count: usize,
}

impl Document {
    /// The (book, chapter) key that uniquely identifies this document
    pub fn key(&self) -> (&str, u32) {
        (&self.book, self.chapter)
    }
}

/// Group labeled lines by (book, chapter) and join each group with single
/// spaces.
///
/// Documents are emitted in first-appearance order of their key. An empty
/// line contributes an empty segment to the join, leaving a double space
/// behind rather than being skipped. The join is lossy: original line
/// boundaries cannot be recovered from the document text.
pub fn assemble_documents(lines: Vec<LabeledLine>) -> Vec<Document> {
    let mut documents: Vec<Document> = Vec::new();
    let mut index: HashMap<(String, u32), usize> = HashMap::new();

    for line in lines {
        match index.get(&(line.book.clone(), line.chapter)) {
            Some(&at) => {
                let doc = &mut documents[at];
                doc.text.push(' ');
                doc.text.push_str(&line.text);
                doc.line_count += 1;
            }
            None => {
                index.insert((line.book.clone(), line.chapter), documents.len());
                documents.push(Document {
                    book: line.book,
                    chapter: line.chapter,
                    text: line.text,
                    line_count: 1,
                });
            }
        }
    }

    documents
}
