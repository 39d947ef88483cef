use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use chapterize::{
    assemble_documents, label_lines, BookRecord, Corpus, CorpusBuilder, DocumentRecord,
    HeadingPattern, PackReader, PackWriter, DEFAULT_HEADING_PATTERN,
};

#[derive(Parser)]
#[command(name = "chapterize", version)]
#[command(about = "Segment plain-text book corpora into chapter documents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest a corpus and write a .corpack archive
    Build {
        /// Corpus directory or .zip bundle
        input: String,
        /// Output pack path
        #[arg(short, long, default_value = "corpus.corpack")]
        output: String,
        /// Override the chapter-heading regex
        #[arg(long, default_value = DEFAULT_HEADING_PATTERN)]
        pattern: String,
        /// Per-book size cap in bytes
        #[arg(long)]
        max_book_size: Option<u64>,
    },
    /// Print a pack's manifest and per-book document counts
    Inspect {
        /// Pack path
        pack: String,
    },
    /// Export a pack's documents as JSON
    Export {
        /// Pack path
        pack: String,
        /// Output JSON path
        #[arg(short, long, default_value = "documents.json")]
        output: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Build {
            input,
            output,
            pattern,
            max_book_size,
        } => cmd_build(&input, &output, &pattern, max_book_size),
        Command::Inspect { pack } => cmd_inspect(&pack),
        Command::Export { pack, output } => cmd_export(&pack, &output),
    }
}

fn cmd_build(
    input: &str,
    output: &str,
    pattern: &str,
    max_book_size: Option<u64>,
) -> Result<()> {
    let start_time = Instant::now();
    println!("=== chapterize: corpus segmentation pipeline ===\n");

    // Step 1: Ingest the corpus
    let step1_start = Instant::now();
    println!("Step 1: Ingesting corpus...");
    let corpus = ingest_corpus(input, max_book_size)?;
    let step1_duration = step1_start.elapsed();
    println!(
        "✓ Loaded {} books ({} lines, {} bytes total) [{:.2}s]\n",
        corpus.book_count(),
        corpus.line_count(),
        corpus.total_size(),
        step1_duration.as_secs_f64()
    );

    // Step 2: Segment into chapter documents
    let step2_start = Instant::now();
    println!("Step 2: Segmenting into chapter documents...\n");
    let heading = HeadingPattern::new(pattern)?;
    let labeled = label_lines(corpus.lines(), &heading)?;
    let documents = assemble_documents(labeled);

    let mut shown = 0;
    for book in corpus.books() {
        let count = documents.iter().filter(|d| d.book == book.title()).count();
        if shown < 6 {
            println!("  {} - {} documents", book.title(), count);
            shown += 1;
        }
    }
    let step2_duration = step2_start.elapsed();
    println!(
        "\n✓ Segmentation complete: {} documents [{:.2}s]\n",
        documents.len(),
        step2_duration.as_secs_f64()
    );

    // Step 3: Persist and write the pack
    let step3_start = Instant::now();
    println!("Step 3: Writing corpus pack...\n");
    let mut writer = PackWriter::new(Some(input.to_string()), heading.as_str().to_string())?;

    for book in corpus.books() {
        let chapter_count = documents.iter().filter(|d| d.book == book.title()).count();
        writer.db_mut().insert_book(&BookRecord {
            title: book.title().to_string(),
            source: book.entry().source.clone(),
            line_count: book.entry().line_count as u32,
            chapter_count: chapter_count as u32,
        })?;
    }
    for doc in &documents {
        writer.db_mut().insert_document(&DocumentRecord::from_document(doc))?;
    }
    writer.write_to_file(output)?;
    let step3_duration = step3_start.elapsed();
    println!(
        "\n✓ Pack written [{:.2}s]\n",
        step3_duration.as_secs_f64()
    );

    // Timing breakdown
    let total_duration = start_time.elapsed();
    println!("=== Timing Breakdown ===");
    println!(
        "Step 1 (Ingestion):    {:.3}s ({:.1}%)",
        step1_duration.as_secs_f64(),
        100.0 * step1_duration.as_secs_f64() / total_duration.as_secs_f64()
    );
    println!(
        "Step 2 (Segmentation): {:.3}s ({:.1}%)",
        step2_duration.as_secs_f64(),
        100.0 * step2_duration.as_secs_f64() / total_duration.as_secs_f64()
    );
    println!(
        "Step 3 (Packing):      {:.3}s ({:.1}%)",
        step3_duration.as_secs_f64(),
        100.0 * step3_duration.as_secs_f64() / total_duration.as_secs_f64()
    );
    println!("─────────────────────────────────");
    println!("Total execution:       {:.3}s", total_duration.as_secs_f64());

    Ok(())
}

/// Pick the ingestion route from the input path: `.zip` bundles go through
/// the archive reader, anything else is walked as a directory.
fn ingest_corpus(input: &str, max_book_size: Option<u64>) -> Result<Corpus> {
    let mut builder = CorpusBuilder::new();
    if let Some(size) = max_book_size {
        builder = builder.max_book_size(size);
    }

    let builder = if input.to_lowercase().ends_with(".zip") {
        builder
            .ingest_bundle(input)
            .context(format!("Failed to ingest bundle: {}", input))?
    } else {
        builder
            .ingest_dir(input)
            .context(format!("Failed to ingest directory: {}", input))?
    };

    Ok(builder.build())
}

fn cmd_inspect(pack: &str) -> Result<()> {
    let reader = PackReader::open(pack)?;
    let manifest = &reader.manifest;

    println!("\n=== Manifest ===");
    println!("Version:          {}", manifest.version);
    println!("Created:          {}", manifest.created_at);
    println!("Generator:        {}", manifest.generator);
    println!(
        "Source:           {}",
        manifest.source_path.as_deref().unwrap_or("Unknown")
    );
    println!("Heading pattern:  {}", manifest.heading_pattern);
    println!("Books:            {}", manifest.stats.book_count);
    println!("Documents:        {}", manifest.stats.document_count);
    println!("Lines:            {}", manifest.stats.line_count);
    println!("Text bytes:       {}", manifest.stats.total_text_bytes);

    println!("\n=== Books ===");
    for book in reader.db().get_all_books()? {
        println!(
            "  {} - {} documents, {} lines",
            book.title, book.chapter_count, book.line_count
        );
    }

    Ok(())
}

fn cmd_export(pack: &str, output: &str) -> Result<()> {
    let reader = PackReader::open(pack)?;
    let documents = reader.db().get_all_documents()?;

    let json = serde_json::to_string_pretty(&documents)
        .context("Failed to serialize documents")?;
    std::fs::write(output, json)
        .context(format!("Failed to write export file: {}", output))?;

    println!(
        "✓ Exported {} documents to {}",
        documents.len(),
        output
    );

    Ok(())
}
