// src/orchestrator.rs
use futures::future::join_all;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::assembler::{assemble, Assembly};
use crate::extractors::detect::detect_format;
use crate::extractors::{CsvExtractor, FormatExtractor, PdfExtractor, SourceFile, SpreadsheetExtractor};
use crate::model::{FileFormat, ParserOptions, ParserResult, BATCH_WINDOW, MAX_FILE_SIZE};
use crate::utils::error::ParseError;

/// Entry point for parsing statement files. Holds one extractor per format.
#[derive(Clone)]
pub struct StatementParser {
    extractors: Vec<Arc<dyn FormatExtractor>>,
}

impl Default for StatementParser {
    fn default() -> Self {
        Self::with_extractors(vec![
            Arc::new(PdfExtractor),
            Arc::new(SpreadsheetExtractor),
            Arc::new(CsvExtractor),
        ])
    }
}

impl StatementParser {
    /// Builds a parser from a custom extractor set. When two extractors claim
    /// the same format, the first one wins.
    pub fn with_extractors(extractors: Vec<Arc<dyn FormatExtractor>>) -> Self {
        Self { extractors }
    }

    fn extractor_for(&self, format: FileFormat) -> Result<Arc<dyn FormatExtractor>, ParseError> {
        self.extractors
            .iter()
            .find(|extractor| extractor.format() == format)
            .cloned()
            .ok_or_else(|| ParseError::UnsupportedFormat(format!("no extractor registered for {}", format)))
    }

    /// Parses one file. Never fails: every error ends up in the returned
    /// envelope with `success == false`.
    pub async fn parse_statement(&self, path: impl AsRef<Path>, options: &ParserOptions) -> ParserResult {
        let path = path.as_ref();
        let started = Instant::now();
        tracing::info!("Parsing {}", path.display());

        match self.try_parse(path, options).await {
            Ok(Assembly { statement, warnings }) => {
                let duration = elapsed_ms(started);
                tracing::info!(
                    "Parsed {} in {} ms ({} warning(s))",
                    path.display(), duration, warnings.len()
                );
                for warning in &warnings {
                    tracing::debug!("{}: {}", path.display(), warning);
                }
                ParserResult::success(statement, warnings, duration)
            }
            Err(e) => {
                let duration = elapsed_ms(started);
                tracing::error!("Failed to parse {}: {}", path.display(), e);
                ParserResult::failure(e.to_string(), duration)
            }
        }
    }

    /// Parses many files, at most `BATCH_WINDOW` at a time. Each window
    /// completes before the next starts; results keep the input order.
    pub async fn parse_statements<P: AsRef<Path>>(&self, paths: &[P], options: &ParserOptions) -> Vec<ParserResult> {
        let mut results = Vec::with_capacity(paths.len());
        for (index, window) in paths.chunks(BATCH_WINDOW).enumerate() {
            tracing::debug!("Starting batch window {} ({} file(s))", index + 1, window.len());
            let batch = join_all(window.iter().map(|path| self.parse_statement(path, options))).await;
            results.extend(batch);
        }
        results
    }

    async fn try_parse(&self, path: &Path, options: &ParserOptions) -> Result<Assembly, ParseError> {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ParseError::FileNotFound(path.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };
        if !metadata.is_file() {
            return Err(ParseError::UnsupportedFormat(format!("{} is not a regular file", path.display())));
        }

        let size = metadata.len();
        if size > MAX_FILE_SIZE {
            return Err(ParseError::FileTooLarge { size, limit: MAX_FILE_SIZE });
        }

        let options = options.resolved_for_size(size);
        if options.streaming {
            tracing::debug!(
                "Streaming {} ({} bytes) in chunks of {} bytes",
                path.display(), size, options.buffer_size(0)
            );
        }

        let format = detect_format(path).await?;
        let extractor = self.extractor_for(format)?;
        let source = SourceFile::new(path, size);

        let raw = {
            let source = source.clone();
            let options = options.clone();
            tokio::task::spawn_blocking(move || extractor.extract(&source, &options))
                .await
                .map_err(|e| ParseError::Task(e.to_string()))??
        };

        assemble(raw, &source, format, &options)
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Parses one file with the default extractors.
pub async fn parse_statement(path: impl AsRef<Path>, options: &ParserOptions) -> ParserResult {
    StatementParser::default().parse_statement(path, options).await
}

/// Parses many files with the default extractors, in windows of
/// `BATCH_WINDOW`, preserving input order.
pub async fn parse_statements<P: AsRef<Path>>(paths: &[P], options: &ParserOptions) -> Vec<ParserResult> {
    StatementParser::default().parse_statements(paths, options).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::RawStatement;
    use crate::utils::error::ExtractError;
    use std::io::Write;

    struct PanickingExtractor;

    impl FormatExtractor for PanickingExtractor {
        fn format(&self) -> FileFormat {
            FileFormat::DelimitedText
        }

        fn extract(&self, _: &SourceFile, _: &ParserOptions) -> Result<RawStatement, ExtractError> {
            panic!("extractor bug");
        }
    }

    fn temp_file(suffix: &str, content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn test_missing_file_is_a_failed_result() {
        let result = tokio_test::block_on(parse_statement("/no/such/statement.csv", &ParserOptions::default()));
        assert!(!result.success);
        assert!(result.data.is_none());
        assert!(result.error.unwrap().contains("File not found"));
    }

    #[test]
    fn test_unsupported_extension_is_a_failed_result() {
        let file = temp_file(".docx", b"not a statement");
        let result = tokio_test::block_on(parse_statement(file.path(), &ParserOptions::default()));
        assert!(!result.success);
        assert!(result.error.unwrap().contains("Unsupported file format"));
    }

    #[tokio::test]
    async fn test_extractor_panic_is_contained() {
        let file = temp_file(".csv", "損益計算書\n売上高,100\n".as_bytes());
        let parser = StatementParser::with_extractors(vec![Arc::new(PanickingExtractor)]);
        let result = parser.parse_statement(file.path(), &ParserOptions::default()).await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("Extractor task failed"));
    }

    #[tokio::test]
    async fn test_missing_extractor_for_format() {
        let file = temp_file(".pdf", b"%PDF-1.4");
        let parser = StatementParser::with_extractors(vec![Arc::new(CsvExtractor)]);
        let result = parser.parse_statement(file.path(), &ParserOptions::default()).await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("no extractor registered for PDF"));
    }

    #[tokio::test]
    async fn test_csv_end_to_end() {
        let csv = "会社名,テスト商事株式会社\n損益計算書,\n売上高,\"1,000\"\n売上原価,600\n";
        let file = temp_file(".csv", csv.as_bytes());
        let result = parse_statement(file.path(), &ParserOptions::default()).await;
        assert!(result.success, "{:?}", result.error);
        let data = result.data.unwrap();
        assert_eq!(data.company.name, "テスト商事株式会社");
        assert_eq!(data.income_statement.unwrap().revenue[0].amount.value(), 1000.0);
        assert_eq!(data.metadata.encoding.as_deref(), Some("UTF-8"));
        // Balance sheet and cash flow missing, period defaulted
        assert!(result.warnings.len() >= 3);
    }
}
