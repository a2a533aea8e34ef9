// tests/pipeline.rs
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use statement_extractor::extractors::detect::detect_format;
use statement_extractor::extractors::{FormatExtractor, RawStatement, Row, SectionLocator, SourceFile};
use statement_extractor::model::{FileFormat, ParserOptions, BATCH_WINDOW, MAX_FILE_SIZE};
use statement_extractor::utils::error::ExtractError;
use statement_extractor::{parse_statement, StatementParser};

const INCOME_STATEMENT_ONLY: &str = "\
会社名,北斗電機株式会社,6999
対象期間,2023年4月1日,2024年3月31日
損益計算書（単位：千円）,
売上高,\"12,000\"
売上原価,\"7,000\"
売上総利益,\"5,000\"
";

fn write_file(dir: &Path, name: &str, content: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content).unwrap();
    path
}

/// Counts calls and otherwise behaves like an empty document.
struct CountingExtractor {
    format: FileFormat,
    calls: Arc<AtomicUsize>,
}

impl FormatExtractor for CountingExtractor {
    fn format(&self) -> FileFormat {
        self.format
    }

    fn extract(&self, _: &SourceFile, _: &ParserOptions) -> Result<RawStatement, ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(SectionLocator::default().analyze(&[]))
    }
}

/// Sleeps for the number of milliseconds written in the file, then parses
/// the remaining lines.
struct SlowExtractor;

impl FormatExtractor for SlowExtractor {
    fn format(&self) -> FileFormat {
        FileFormat::DelimitedText
    }

    fn extract(&self, source: &SourceFile, _: &ParserOptions) -> Result<RawStatement, ExtractError> {
        let text = std::fs::read_to_string(&source.path)?;
        let mut lines = text.lines();
        let delay: u64 = lines.next().and_then(|l| l.trim().parse().ok()).unwrap_or(0);
        std::thread::sleep(Duration::from_millis(delay));
        let rows: Vec<Row> = lines.map(|line| vec![line.to_string()]).collect();
        Ok(SectionLocator::default().analyze(&rows))
    }
}

/// Records how many extractions overlap.
#[derive(Default)]
struct InFlightExtractor {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl FormatExtractor for InFlightExtractor {
    fn format(&self) -> FileFormat {
        FileFormat::DelimitedText
    }

    fn extract(&self, _: &SourceFile, _: &ParserOptions) -> Result<RawStatement, ExtractError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(40));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(SectionLocator::default().analyze(&[]))
    }
}

#[tokio::test]
async fn test_missing_balance_sheet_is_a_warning_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "hokuto.csv", INCOME_STATEMENT_ONLY.as_bytes());

    let result = parse_statement(&path, &ParserOptions::default()).await;

    assert!(result.success, "error: {:?}", result.error);
    let data = result.data.expect("data should be present");
    let income = data.income_statement.expect("income statement should be extracted");
    assert_eq!(income.revenue[0].amount.to_yen(), 12_000_000.0);
    assert!(data.balance_sheet.is_none());
    assert!(!result.warnings.is_empty());
    assert!(result.warnings.iter().any(|w| w.contains("balance sheet")));
    assert_eq!(data.company.security_code.as_deref(), Some("6999"));
    assert!(!data.metadata.period_is_default);
}

#[tokio::test]
async fn test_missing_balance_sheet_fails_in_strict_mode() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "hokuto.csv", INCOME_STATEMENT_ONLY.as_bytes());

    let options = ParserOptions { strict: true, ..Default::default() };
    let result = parse_statement(&path, &options).await;

    assert!(!result.success);
    assert!(result.data.is_none());
    assert!(result.error.unwrap().contains("balance sheet"));
}

#[tokio::test]
async fn test_oversized_file_is_rejected_before_extraction() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "huge.csv", b"");
    // Sparse file, nothing is actually written
    std::fs::OpenOptions::new()
        .write(true)
        .open(&path)
        .unwrap()
        .set_len(101 * 1024 * 1024)
        .unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let parser = StatementParser::with_extractors(vec![Arc::new(CountingExtractor {
        format: FileFormat::DelimitedText,
        calls: calls.clone(),
    })]);
    let result = parser.parse_statement(&path, &ParserOptions::default()).await;

    assert!(!result.success);
    let error = result.error.unwrap();
    assert!(error.contains("size"), "error should mention size: {}", error);
    assert!(error.contains(&MAX_FILE_SIZE.to_string()));
    assert_eq!(calls.load(Ordering::SeqCst), 0, "extractor must not run");
}

#[tokio::test]
async fn test_large_file_switches_to_streaming() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "big.csv", b"");
    std::fs::OpenOptions::new()
        .write(true)
        .open(&path)
        .unwrap()
        .set_len(11 * 1024 * 1024)
        .unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let parser = StatementParser::with_extractors(vec![Arc::new(CountingExtractor {
        format: FileFormat::DelimitedText,
        calls: calls.clone(),
    })]);
    let result = parser.parse_statement(&path, &ParserOptions::default()).await;

    assert!(result.success, "error: {:?}", result.error);
    let metadata = result.data.unwrap().metadata;
    assert!(metadata.streaming);
    assert_eq!(metadata.chunk_size, Some(5 * 1024 * 1024));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_batch_preserves_input_order() {
    let dir = tempfile::tempdir().unwrap();
    // Earlier files take longer, so completion order is the reverse of input order.
    let names = ["f1", "f2", "f3", "f4", "f5", "f6", "f7"];
    let paths: Vec<_> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let delay = (names.len() - i) * 15;
            let content = format!("{}\n損益計算書\n売上高 {}\n", delay, i + 1);
            write_file(dir.path(), &format!("{}.csv", name), content.as_bytes())
        })
        .collect();
    let missing = dir.path().join("missing.csv");
    let mut inputs = paths.clone();
    inputs.insert(3, missing);

    let parser = StatementParser::with_extractors(vec![Arc::new(SlowExtractor)]);
    let results = parser.parse_statements(&inputs, &ParserOptions::default()).await;

    assert_eq!(results.len(), inputs.len());
    assert!(!results[3].success, "missing file must fail in place");
    let companies: Vec<String> = results
        .iter()
        .filter_map(|r| r.data.as_ref().map(|d| d.company.name.clone()))
        .collect();
    assert_eq!(companies, names.iter().map(|n| n.to_string()).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_batch_runs_at_most_one_window_at_a_time() {
    let dir = tempfile::tempdir().unwrap();
    let paths: Vec<_> = (0..10)
        .map(|i| write_file(dir.path(), &format!("s{}.csv", i), b"x"))
        .collect();

    let tracker = Arc::new(InFlightExtractor::default());
    let extractor: Arc<dyn FormatExtractor> = tracker.clone();
    let parser = StatementParser::with_extractors(vec![extractor]);
    let results = parser.parse_statements(&paths, &ParserOptions::default()).await;

    assert_eq!(results.len(), 10);
    assert_eq!(tracker.calls.load(Ordering::SeqCst), 10);
    let peak = tracker.peak.load(Ordering::SeqCst);
    assert!(peak <= BATCH_WINDOW, "{} extractions overlapped", peak);
    assert!(peak > 1, "files within a window should run concurrently");
}

#[tokio::test]
async fn test_pdf_magic_detected_without_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "statement_download", b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n");
    assert_eq!(detect_format(&path).await.unwrap(), FileFormat::Pdf);

    let calls = Arc::new(AtomicUsize::new(0));
    let parser = StatementParser::with_extractors(vec![Arc::new(CountingExtractor {
        format: FileFormat::Pdf,
        calls: calls.clone(),
    })]);
    let result = parser.parse_statement(&path, &ParserOptions::default()).await;
    assert!(result.success);
    assert_eq!(result.data.unwrap().metadata.format, FileFormat::Pdf);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_zip_magic_detected_as_spreadsheet() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "export", b"PK\x03\x04\x14\x00\x06\x00");
    assert_eq!(detect_format(&path).await.unwrap(), FileFormat::Spreadsheet);
}
