// src/main.rs
use clap::Parser;
use std::path::PathBuf;

use statement_extractor::model::ParserOptions;
use statement_extractor::orchestrator::StatementParser;
use statement_extractor::postprocess::{export_results_to_json, summarize_results};
use statement_extractor::storage::StorageManager;
use statement_extractor::utils::{self, ParseError};

/// Command Line Interface for the financial statement parser
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Statement files to parse (PDF, Excel/ODS, CSV/TSV)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Fail a file when any of the three statements is missing
    #[arg(long)]
    strict: bool,

    /// Debug mode - log section boundaries and raise log level
    #[arg(short, long)]
    debug: bool,

    /// Directory for annotated text dumps (implies --debug)
    #[arg(long)]
    debug_dir: Option<PathBuf>,

    /// Text encoding of CSV input (e.g. shift_jis); auto-detected by default
    #[arg(long)]
    encoding: Option<String>,

    /// CSV field delimiter
    #[arg(long)]
    delimiter: Option<char>,

    /// Leading rows to ignore in CSV and spreadsheet input
    #[arg(long)]
    skip_rows: Option<usize>,

    /// Read input incrementally (always on above 10 MB)
    #[arg(long)]
    streaming: bool,

    /// Streaming buffer size in bytes
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Request OCR for PDFs without a text layer (reported as unavailable)
    #[arg(long)]
    use_ocr: bool,

    /// JSON file with parser options; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory for statement JSON; results go to stdout when omitted
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

impl Args {
    fn parser_options(&self) -> Result<ParserOptions, ParseError> {
        let mut options = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                serde_json::from_str(&text)
                    .map_err(|e| ParseError::Config(format!("Invalid config file {}: {}", path.display(), e)))?
            }
            None => ParserOptions::default(),
        };

        options.strict |= self.strict;
        options.streaming |= self.streaming;
        options.use_ocr |= self.use_ocr;
        options.debug |= self.debug || self.debug_dir.is_some();
        if let Some(dir) = &self.debug_dir {
            options.debug_dir = Some(dir.clone());
        }
        if let Some(encoding) = &self.encoding {
            options.encoding = Some(encoding.clone());
        }
        if let Some(delimiter) = self.delimiter {
            options.delimiter = u8::try_from(delimiter)
                .ok()
                .filter(u8::is_ascii)
                .ok_or_else(|| ParseError::Config(format!("Delimiter must be a single ASCII character, got '{}'", delimiter)))?;
        }
        if let Some(rows) = self.skip_rows {
            options.skip_rows = rows;
        }
        if let Some(size) = self.chunk_size {
            options.chunk_size = Some(size);
        }
        Ok(options)
    }
}

#[tokio::main]
async fn main() -> Result<(), ParseError> {
    // 1. Parse CLI Arguments
    let args = Args::parse();

    // 2. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging(args.debug || args.debug_dir.is_some());
    tracing::info!("Starting processing for args: {:?}", args);

    let options = args.parser_options()?;
    tracing::debug!("Parser options: {:?}", options);

    // 3. Initialize storage
    let storage = args.output_dir.as_ref().map(StorageManager::new).transpose()?;

    // 4. Parse all files
    let parser = StatementParser::default();
    let results = parser.parse_statements(&args.files, &options).await;

    // 5. Save or print
    match &storage {
        Some(storage) => {
            for (path, result) in args.files.iter().zip(&results) {
                let Some(statement) = &result.data else { continue };
                match storage.save_statement(statement) {
                    Ok(saved) => tracing::info!("Saved {} to: {}", path.display(), saved.display()),
                    Err(e) => tracing::error!("Failed to save statement for {}: {}", path.display(), e),
                }
                if let Err(e) = storage.save_statement_metadata(statement) {
                    tracing::error!("Failed to save statement metadata for {}: {}", path.display(), e);
                }
            }
        }
        None => println!("{}", export_results_to_json(&results)?),
    }

    let stats = summarize_results(&results);
    tracing::info!(
        "Processing finished. Success: {}, Failures: {}, Warnings: {}, Total time: {} ms",
        stats.successful, stats.failed, stats.warning_count, stats.total_duration
    );

    if stats.successful == 0 && stats.failed > 0 {
        return Err(ParseError::Processing(format!("Failed to parse any of {} file(s)", stats.failed)));
    }

    Ok(())
}
