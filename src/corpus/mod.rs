//! Corpus ingestion
//!
//! A corpus is an ordered, immutable collection of books, each already
//! decoded into normalized lines. `CorpusBuilder` accepts books from raw
//! bytes, a directory of `.txt` files, or a local `.zip` bundle, enforcing
//! size limits along the way; `Corpus::lines()` flattens everything into
//! the (book, line) sequence the segmenter consumes.

mod entry;
mod error;
mod reader;

pub use entry::BookEntry;
pub use error::CorpusError;

use std::fs;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::segmenter::RawLine;

/// One book: its metadata plus normalized lines
#[derive(Debug, Clone)]
pub struct Book {
    entry: BookEntry,
    lines: Vec<String>,
}

impl Book {
    pub fn title(&self) -> &str {
        &self.entry.title
    }

    pub fn entry(&self) -> &BookEntry {
        &self.entry
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// Immutable, ordered collection of books ready for segmentation
#[derive(Debug, Clone)]
pub struct Corpus {
    books: Vec<Book>,
}

/// Mutable builder for constructing a corpus
pub struct CorpusBuilder {
    books: Vec<Book>,
    max_book_size: u64,
    max_total_size: u64,
    total_size: u64,
}

impl CorpusBuilder {
    /// Create a new builder with default limits
    pub fn new() -> Self {
        Self {
            books: Vec::new(),
            max_book_size: 16 * 1024 * 1024,   // 16 MB per book
            max_total_size: 256 * 1024 * 1024, // 256 MB total
            total_size: 0,
        }
    }

    /// Set maximum individual book size
    pub fn max_book_size(mut self, size: u64) -> Self {
        self.max_book_size = size;
        self
    }

    /// Set maximum total corpus size
    pub fn max_total_size(mut self, size: u64) -> Self {
        self.max_total_size = size;
        self
    }

    /// Decode and add a single book from raw bytes
    pub fn add_book(&mut self, title: &str, source: &str, bytes: &[u8]) -> Result<(), CorpusError> {
        if title.trim().is_empty() {
            return Err(CorpusError::InvalidTitle(source.to_string()));
        }
        if self.books.iter().any(|b| b.entry.title == title) {
            return Err(CorpusError::DuplicateBook(title.to_string()));
        }

        if bytes.len() as u64 > self.max_book_size {
            return Err(CorpusError::BookTooLarge {
                size: bytes.len() as u64,
                max: self.max_book_size,
            });
        }
        let new_total = self.total_size + bytes.len() as u64;
        if new_total > self.max_total_size {
            return Err(CorpusError::BookTooLarge {
                size: new_total,
                max: self.max_total_size,
            });
        }

        let lines = reader::decode_lines(title, bytes)?;
        self.total_size = new_total;
        self.books.push(Book {
            entry: BookEntry {
                title: title.to_string(),
                source: source.to_string(),
                line_count: lines.len(),
                size_bytes: bytes.len(),
            },
            lines,
        });

        Ok(())
    }

    /// Ingest every `.txt` file under a directory
    ///
    /// Book titles come from file stems; files are taken in sorted path
    /// order so ingestion is reproducible across platforms. Unreadable
    /// files are skipped with a warning rather than aborting the walk.
    pub fn ingest_dir(mut self, dir: &str) -> Result<Self, CorpusError> {
        let mut paths: Vec<PathBuf> = Vec::new();

        for entry in WalkDir::new(dir).follow_links(false) {
            let entry = entry.map_err(|e| CorpusError::ReadFailed {
                path: dir.to_string(),
                reason: e.to_string(),
            })?;
            let path = entry.path();
            if path.is_file() && has_txt_extension(path) {
                paths.push(path.to_path_buf());
            }
        }
        paths.sort();

        for path in paths {
            let bytes = match fs::read(&path) {
                Ok(b) => b,
                Err(e) => {
                    eprintln!("[corpus] Warning: Failed to read {}: {}", path.display(), e);
                    continue;
                }
            };
            let title = file_stem_title(&path)
                .ok_or_else(|| CorpusError::InvalidTitle(path.display().to_string()))?;
            self.add_book(&title, &path.display().to_string(), &bytes)?;
        }

        Ok(self)
    }

    /// Ingest a local `.zip` corpus bundle
    ///
    /// Only `.txt` members are taken; every member path is sanitized
    /// against traversal and absolute paths before use.
    pub fn ingest_bundle(mut self, bundle: &str) -> Result<Self, CorpusError> {
        let file = fs::File::open(bundle).map_err(|e| CorpusError::ReadFailed {
            path: bundle.to_string(),
            reason: e.to_string(),
        })?;
        let mut archive = zip::ZipArchive::new(file)
            .map_err(|e| CorpusError::BundleParseFailed(e.to_string()))?;

        for i in 0..archive.len() {
            let mut member = archive
                .by_index(i)
                .map_err(|e| CorpusError::BundleParseFailed(e.to_string()))?;

            if member.is_dir() {
                continue;
            }

            let virtual_path = sanitize_bundle_path(member.name())?;
            if !has_txt_extension(Path::new(&virtual_path)) {
                continue;
            }

            let mut bytes = Vec::new();
            member
                .read_to_end(&mut bytes)
                .map_err(|e| CorpusError::BundleParseFailed(e.to_string()))?;

            let title = file_stem_title(Path::new(&virtual_path))
                .ok_or_else(|| CorpusError::InvalidTitle(virtual_path.clone()))?;
            let source = format!("{}!{}", bundle, virtual_path);
            self.add_book(&title, &source, &bytes)?;
        }

        Ok(self)
    }

    /// Build the immutable corpus
    pub fn build(self) -> Corpus {
        Corpus { books: self.books }
    }
}

impl Default for CorpusBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Corpus {
    /// Books in insertion order
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    /// Total line count across all books
    pub fn line_count(&self) -> usize {
        self.books.iter().map(|b| b.lines.len()).sum()
    }

    /// Total raw size in bytes across all books
    pub fn total_size(&self) -> u64 {
        self.books.iter().map(|b| b.entry.size_bytes as u64).sum()
    }

    /// Flatten all books, in insertion order, into the ordered
    /// (book, line) sequence the chapter labeler consumes
    pub fn lines(&self) -> Vec<RawLine> {
        let mut lines = Vec::with_capacity(self.line_count());
        for book in &self.books {
            for text in &book.lines {
                lines.push(RawLine::new(book.entry.title.clone(), text.clone()));
            }
        }
        lines
    }
}

fn has_txt_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("txt"))
}

fn file_stem_title(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
        .filter(|s| !s.trim().is_empty())
}

/// Sanitize a path from a bundle archive to prevent directory traversal,
/// absolute paths, and zip slip. Returns a normalized virtual path with
/// forward slashes.
fn sanitize_bundle_path(raw_path: &str) -> Result<String, CorpusError> {
    if raw_path.is_empty() {
        return Err(CorpusError::InvalidPath("empty path".to_string()));
    }

    let mut components = Vec::new();
    for component in Path::new(raw_path).components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {
                return Err(CorpusError::InvalidPath(format!(
                    "absolute path not allowed: {}",
                    raw_path
                )));
            }
            Component::ParentDir => {
                return Err(CorpusError::InvalidPath(format!(
                    "parent directory traversal not allowed: {}",
                    raw_path
                )));
            }
            Component::CurDir => continue,
            Component::Normal(part) => {
                let part = part.to_str().ok_or_else(|| {
                    CorpusError::InvalidPath(format!("invalid UTF-8 in path: {}", raw_path))
                })?;
                components.push(part);
            }
        }
    }

    if components.is_empty() {
        return Err(CorpusError::InvalidPath(format!(
            "no valid components: {}",
            raw_path
        )));
    }

    Ok(components.join("/"))
}
