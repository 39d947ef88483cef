use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::segmenter::Document;

/// A book row as stored in the corpus database
#[derive(Debug, Serialize, Deserialize)]
pub struct BookRecord {
    pub title: String,
    pub source: String,
    pub line_count: u32,
    pub chapter_count: u32,
}

/// A document row as stored in the corpus database
#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub book: String,
    pub chapter_index: u32,
    pub content: String,
    pub line_count: u32,
    pub content_hash: String,
}

impl DocumentRecord {
    /// Wrap an assembled document with a fresh id and content hash
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            book: doc.book.clone(),
            chapter_index: doc.chapter,
            content: doc.text.clone(),
            line_count: doc.line_count as u32,
            content_hash: hash_content(&doc.text),
        }
    }
}

/// Compute the hex-encoded SHA-256 hash of document text
pub fn hash_content(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CorpusStats {
    pub book_count: u32,
    pub document_count: u32,
    pub line_count: u32,
    pub total_text_bytes: u64,
}

pub struct CorpusDb {
    conn: Connection,
}

impl CorpusDb {
    /// Create a new in-memory database
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .context("Failed to create in-memory database")?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Open an existing database file
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .context(format!("Failed to open database at {}", path))?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(
                r#"
            CREATE TABLE IF NOT EXISTS books (
                title TEXT PRIMARY KEY,
                source TEXT NOT NULL,
                line_count INTEGER NOT NULL,
                chapter_count INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                book TEXT NOT NULL,
                chapter_index INTEGER NOT NULL,
                content TEXT NOT NULL,
                line_count INTEGER NOT NULL,
                content_hash TEXT NOT NULL,
                UNIQUE (book, chapter_index),
                FOREIGN KEY (book) REFERENCES books(title)
            );

            CREATE INDEX IF NOT EXISTS idx_documents_book ON documents(book);
            "#,
            )
            .context("Failed to initialize database schema")?;
        Ok(())
    }

    /// Insert a book record
    pub fn insert_book(&self, book: &BookRecord) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO books (title, source, line_count, chapter_count) VALUES (?1, ?2, ?3, ?4)",
                params![book.title, book.source, book.line_count, book.chapter_count],
            )
            .context(format!("Failed to insert book: {}", book.title))?;
        Ok(())
    }

    /// Insert a document record
    pub fn insert_document(&self, doc: &DocumentRecord) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO documents (id, book, chapter_index, content, line_count, content_hash) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    doc.id,
                    doc.book,
                    doc.chapter_index,
                    doc.content,
                    doc.line_count,
                    doc.content_hash
                ],
            )
            .context(format!(
                "Failed to insert document: {} chapter {}",
                doc.book, doc.chapter_index
            ))?;
        Ok(())
    }

    /// Get all books in title order
    pub fn get_all_books(&self) -> Result<Vec<BookRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT title, source, line_count, chapter_count FROM books ORDER BY title")
            .context("Failed to prepare statement")?;

        let books = stmt
            .query_map([], |row| {
                Ok(BookRecord {
                    title: row.get(0)?,
                    source: row.get(1)?,
                    line_count: row.get(2)?,
                    chapter_count: row.get(3)?,
                })
            })
            .context("Failed to query books")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to collect books")?;

        Ok(books)
    }

    /// Get all documents in insertion order
    pub fn get_all_documents(&self) -> Result<Vec<DocumentRecord>> {
        self.query_documents(
            "SELECT id, book, chapter_index, content, line_count, content_hash FROM documents ORDER BY rowid",
            params![],
        )
    }

    /// Get one book's documents in chapter order
    pub fn get_documents_for_book(&self, book: &str) -> Result<Vec<DocumentRecord>> {
        self.query_documents(
            "SELECT id, book, chapter_index, content, line_count, content_hash FROM documents WHERE book = ?1 ORDER BY chapter_index",
            params![book],
        )
    }

    fn query_documents(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<DocumentRecord>> {
        let mut stmt = self.conn.prepare(sql).context("Failed to prepare statement")?;

        let documents = stmt
            .query_map(params, |row| {
                Ok(DocumentRecord {
                    id: row.get(0)?,
                    book: row.get(1)?,
                    chapter_index: row.get(2)?,
                    content: row.get(3)?,
                    line_count: row.get(4)?,
                    content_hash: row.get(5)?,
                })
            })
            .context("Failed to query documents")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to collect documents")?;

        Ok(documents)
    }

    /// Get statistics
    pub fn get_stats(&self) -> Result<CorpusStats> {
        let book_count: u32 = self
            .conn
            .query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))
            .context("Failed to count books")?;

        let document_count: u32 = self
            .conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))
            .context("Failed to count documents")?;

        let line_count: u32 = self
            .conn
            .query_row(
                "SELECT COALESCE(SUM(line_count), 0) FROM documents",
                [],
                |row| row.get(0),
            )
            .context("Failed to sum line counts")?;

        // LENGTH over a BLOB cast counts bytes rather than characters.
        let total_text_bytes: i64 = self
            .conn
            .query_row(
                "SELECT COALESCE(SUM(LENGTH(CAST(content AS BLOB))), 0) FROM documents",
                [],
                |row| row.get(0),
            )
            .context("Failed to sum content sizes")?;

        Ok(CorpusStats {
            book_count,
            document_count,
            line_count,
            total_text_bytes: total_text_bytes as u64,
        })
    }

    /// Save database to file
    pub fn save_to_file(&self, path: &str) -> Result<()> {
        // VACUUM INTO persists an in-memory database without relying on
        // rusqlite backup APIs; the target must not already exist.
        let _ = std::fs::remove_file(path);
        let safe_path = path.replace("'", "''");
        let sql = format!("VACUUM INTO '{}'", safe_path);
        self.conn
            .execute_batch(&sql)
            .context(format!("Failed to save database to {}", path))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_doc(book: &str, chapter: u32, content: &str) -> DocumentRecord {
        DocumentRecord::from_document(&Document {
            book: book.to_string(),
            chapter,
            text: content.to_string(),
            line_count: 1,
        })
    }

    #[test]
    fn test_insert_and_read_back() {
        let db = CorpusDb::new_in_memory().unwrap();
        db.insert_book(&BookRecord {
            title: "Emma".to_string(),
            source: "<memory>".to_string(),
            line_count: 2,
            chapter_count: 2,
        })
        .unwrap();
        db.insert_document(&sample_doc("Emma", 0, "front matter")).unwrap();
        db.insert_document(&sample_doc("Emma", 1, "CHAPTER I text")).unwrap();

        let books = db.get_all_books().unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].chapter_count, 2);

        let docs = db.get_documents_for_book("Emma").unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].chapter_index, 0);
        assert_eq!(docs[1].content, "CHAPTER I text");
    }

    #[test]
    fn test_insertion_order_preserved() {
        let db = CorpusDb::new_in_memory().unwrap();
        db.insert_document(&sample_doc("B", 0, "b")).unwrap();
        db.insert_document(&sample_doc("A", 0, "a")).unwrap();

        let docs = db.get_all_documents().unwrap();
        assert_eq!(docs[0].book, "B");
        assert_eq!(docs[1].book, "A");
    }

    #[test]
    fn test_stats() {
        let db = CorpusDb::new_in_memory().unwrap();
        db.insert_book(&BookRecord {
            title: "Emma".to_string(),
            source: "<memory>".to_string(),
            line_count: 2,
            chapter_count: 1,
        })
        .unwrap();
        db.insert_document(&sample_doc("Emma", 1, "abcd")).unwrap();

        let stats = db.get_stats().unwrap();
        assert_eq!(stats.book_count, 1);
        assert_eq!(stats.document_count, 1);
        assert_eq!(stats.line_count, 1);
        assert_eq!(stats.total_text_bytes, 4);
    }

    #[test]
    fn test_content_hash_is_stable() {
        let a = sample_doc("Emma", 0, "same text");
        let b = sample_doc("Emma", 1, "same text");
        assert_eq!(a.content_hash, b.content_hash);
        assert_eq!(a.content_hash.len(), 64);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_empty_stats() {
        let db = CorpusDb::new_in_memory().unwrap();
        let stats = db.get_stats().unwrap();
        assert_eq!(stats.document_count, 0);
        assert_eq!(stats.total_text_bytes, 0);
    }
}
