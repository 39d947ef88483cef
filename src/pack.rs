use anyhow::{Context, Result};
use chrono::{Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::db::CorpusDb;

/// Format version written into every manifest
pub const PACK_FORMAT_VERSION: &str = "1.0.0";

/// Top-level metadata stored as `manifest.json` inside a corpus pack
#[derive(Debug, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    pub created_at: String,
    pub source_path: Option<String>,
    pub generator: String,
    /// The heading rule the corpus was segmented with
    pub heading_pattern: String,
    pub stats: ManifestStats,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ManifestStats {
    pub book_count: u32,
    pub document_count: u32,
    pub line_count: u32,
    pub total_text_bytes: u64,
}

pub struct PackWriter {
    db: CorpusDb,
    manifest: Manifest,
}

impl PackWriter {
    /// Create a new pack writer backed by an in-memory database
    pub fn new(source_path: Option<String>, heading_pattern: String) -> Result<Self> {
        let db = CorpusDb::new_in_memory()
            .context("Failed to create in-memory database")?;

        let manifest = Manifest {
            version: PACK_FORMAT_VERSION.to_string(),
            created_at: Utc::now().to_rfc3339(),
            source_path,
            generator: format!("chapterize v{}", env!("CARGO_PKG_VERSION")),
            heading_pattern,
            stats: ManifestStats {
                book_count: 0,
                document_count: 0,
                line_count: 0,
                total_text_bytes: 0,
            },
        };

        Ok(Self { db, manifest })
    }

    /// Get mutable reference to the database
    pub fn db_mut(&mut self) -> &mut CorpusDb {
        &mut self.db
    }

    /// Get reference to the database
    pub fn db(&self) -> &CorpusDb {
        &self.db
    }

    /// Update manifest stats from database
    fn update_stats(&mut self) -> Result<()> {
        let stats = self.db.get_stats().context("Failed to get database stats")?;

        self.manifest.stats.book_count = stats.book_count;
        self.manifest.stats.document_count = stats.document_count;
        self.manifest.stats.line_count = stats.line_count;
        self.manifest.stats.total_text_bytes = stats.total_text_bytes;

        Ok(())
    }

    /// Write the pack to file
    pub fn write_to_file(&mut self, output_path: &str) -> Result<()> {
        eprintln!("[pack] Writing corpus pack to: {}", output_path);

        self.update_stats()
            .context("Failed to update manifest stats")?;

        // Persist the in-memory database to a temporary file first.
        let temp_db_path = format!("{}.tmp.db", output_path);
        self.db
            .save_to_file(&temp_db_path)
            .context("Failed to save database to temporary file")?;

        let file = File::create(output_path)
            .context(format!("Failed to create output file: {}", output_path))?;
        let mut zip = ZipWriter::new(file);

        let now = chrono::Local::now();
        let options: FileOptions<'_, ()> = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(
                zip::DateTime::from_date_and_time(
                    now.year() as u16,
                    now.month() as u8,
                    now.day() as u8,
                    now.hour() as u8,
                    now.minute() as u8,
                    now.second() as u8,
                )
                .unwrap_or_default(),
            );

        eprintln!("[pack] Adding corpus.sqlite to archive...");
        zip.start_file("corpus.sqlite", options)
            .context("Failed to start database file in ZIP")?;
        let mut db_file = File::open(&temp_db_path)
            .context("Failed to open temporary database file")?;
        let mut db_contents = Vec::new();
        db_file
            .read_to_end(&mut db_contents)
            .context("Failed to read database contents")?;
        zip.write_all(&db_contents)
            .context("Failed to write database to ZIP")?;

        eprintln!("[pack] Adding manifest.json to archive...");
        zip.start_file("manifest.json", options)
            .context("Failed to start manifest file in ZIP")?;
        let manifest_json = serde_json::to_string_pretty(&self.manifest)
            .context("Failed to serialize manifest")?;
        zip.write_all(manifest_json.as_bytes())
            .context("Failed to write manifest to ZIP")?;

        eprintln!("[pack] Adding readme.md to archive...");
        zip.start_file("readme.md", options)
            .context("Failed to start readme file in ZIP")?;
        let readme = self.generate_readme();
        zip.write_all(readme.as_bytes())
            .context("Failed to write readme to ZIP")?;

        zip.finish().context("Failed to finalize ZIP file")?;

        std::fs::remove_file(&temp_db_path)
            .context("Failed to remove temporary database file")?;

        eprintln!("[pack] ✓ Successfully created corpus pack: {}", output_path);
        eprintln!("[pack]   Books: {}", self.manifest.stats.book_count);
        eprintln!("[pack]   Documents: {}", self.manifest.stats.document_count);
        eprintln!("[pack]   Lines: {}", self.manifest.stats.line_count);

        Ok(())
    }

    /// Generate a human-readable README
    fn generate_readme(&self) -> String {
        format!(
            r#"# Corpus pack

This is a corpus pack generated by chapterize.

## Metadata

- **Version**: {}
- **Created**: {}
- **Generator**: {}
- **Source**: {}
- **Heading pattern**: `{}`

## Contents

- **Books**: {}
- **Documents**: {}
- **Lines**: {}
- **Text size**: {} bytes

## Structure

```
corpus.sqlite     - Books and assembled chapter documents
manifest.json     - Top-level metadata
readme.md         - This file
```

## Usage

Each document is one chapter of one book: its lines joined with single
spaces, in original order, keyed by (book, chapter_index). Chapter 0 is
front matter before the first detected heading. Query the pack with the
chapterize tool or any SQLite-compatible database viewer.

"#,
            self.manifest.version,
            self.manifest.created_at,
            self.manifest.generator,
            self.manifest
                .source_path
                .as_deref()
                .unwrap_or("Unknown"),
            self.manifest.heading_pattern,
            self.manifest.stats.book_count,
            self.manifest.stats.document_count,
            self.manifest.stats.line_count,
            self.manifest.stats.total_text_bytes,
        )
    }
}

pub struct PackReader {
    db: CorpusDb,
    pub manifest: Manifest,
}

impl std::fmt::Debug for PackReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackReader")
            .field("manifest", &self.manifest)
            .finish_non_exhaustive()
    }
}

impl PackReader {
    /// Open and read a corpus pack file
    pub fn open(pack_path: &str) -> Result<Self> {
        eprintln!("[pack] Opening corpus pack: {}", pack_path);

        let file = File::open(pack_path)
            .context(format!("Failed to open corpus pack: {}", pack_path))?;
        let mut archive = ZipArchive::new(file).context("Failed to read ZIP archive")?;

        let mut manifest_file = archive
            .by_name("manifest.json")
            .context("manifest.json not found in corpus pack")?;
        let mut manifest_contents = String::new();
        manifest_file
            .read_to_string(&mut manifest_contents)
            .context("Failed to read manifest")?;
        let manifest: Manifest = serde_json::from_str(&manifest_contents)
            .context("Failed to parse manifest.json")?;
        // Drop the `manifest_file` before borrowing `archive` mutably again.
        drop(manifest_file);

        eprintln!(
            "[pack] Manifest loaded: {} books, {} documents",
            manifest.stats.book_count, manifest.stats.document_count
        );

        // Extract database to temporary file
        let temp_db_path = format!("{}.extracted.db", pack_path);
        let mut db_file = archive
            .by_name("corpus.sqlite")
            .context("corpus.sqlite not found in archive")?;
        let mut db_contents = Vec::new();
        db_file
            .read_to_end(&mut db_contents)
            .context("Failed to read database from archive")?;

        let mut temp_file = File::create(&temp_db_path)
            .context("Failed to create temporary database file")?;
        temp_file
            .write_all(&db_contents)
            .context("Failed to write temporary database file")?;

        let db = CorpusDb::open(&temp_db_path)
            .context("Failed to open extracted database")?;

        eprintln!("[pack] ✓ Corpus pack loaded successfully");

        Ok(Self { db, manifest })
    }

    /// Get reference to the database
    pub fn db(&self) -> &CorpusDb {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{BookRecord, DocumentRecord};
    use crate::segmenter::Document;

    fn temp_path(name: &str) -> String {
        std::env::temp_dir()
            .join(format!("chapterize-pack-{}-{}", uuid::Uuid::new_v4(), name))
            .display()
            .to_string()
    }

    #[test]
    fn test_write_and_open_round_trip() {
        let pack_path = temp_path("roundtrip.corpack");

        let mut writer =
            PackWriter::new(Some("novels/".to_string()), "(?i)^chapter".to_string()).unwrap();
        writer
            .db_mut()
            .insert_book(&BookRecord {
                title: "Emma".to_string(),
                source: "novels/emma.txt".to_string(),
                line_count: 3,
                chapter_count: 1,
            })
            .unwrap();
        writer
            .db_mut()
            .insert_document(&DocumentRecord::from_document(&Document {
                book: "Emma".to_string(),
                chapter: 1,
                text: "CHAPTER I Emma Woodhouse...".to_string(),
                line_count: 2,
            }))
            .unwrap();
        writer.write_to_file(&pack_path).unwrap();

        let reader = PackReader::open(&pack_path).unwrap();
        assert_eq!(reader.manifest.version, PACK_FORMAT_VERSION);
        assert_eq!(reader.manifest.stats.book_count, 1);
        assert_eq!(reader.manifest.stats.document_count, 1);
        assert_eq!(reader.manifest.heading_pattern, "(?i)^chapter");

        let docs = reader.db().get_all_documents().unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].content, "CHAPTER I Emma Woodhouse...");

        let _ = std::fs::remove_file(&pack_path);
        let _ = std::fs::remove_file(format!("{}.extracted.db", pack_path));
    }

    #[test]
    fn test_open_missing_pack_fails() {
        let err = PackReader::open(&temp_path("missing.corpack")).unwrap_err();
        assert!(err.to_string().contains("Failed to open corpus pack"));
    }
}
