// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::ParsedStatement;
use crate::postprocess::{export_to_json, statement_statistics, validate_statement};
use crate::utils::error::StorageError;

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    // Directory structure like: /base_dir/<security code or file stem>/<fiscal year>/
    fn target_dir(&self, statement: &ParsedStatement) -> Result<PathBuf, StorageError> {
        let company_dir = sanitize(
            statement
                .company
                .security_code
                .as_deref()
                .unwrap_or_else(|| file_stem(statement)),
        );
        let year_dir = statement
            .period
            .fiscal_year
            .map_or_else(|| "unknown".to_string(), |year| year.to_string());

        let target_dir = self.base_dir.join(company_dir).join(year_dir);
        if !target_dir.exists() {
            fs::create_dir_all(&target_dir).map_err(StorageError::IoError)?;
        }
        Ok(target_dir)
    }

    /// Saves the statement as pretty JSON
    pub fn save_statement(&self, statement: &ParsedStatement) -> Result<PathBuf, StorageError> {
        let file_path = self
            .target_dir(statement)?
            .join(format!("{}_statement.json", sanitize(file_stem(statement))));

        fs::write(&file_path, export_to_json(statement)?).map_err(StorageError::IoError)?;

        tracing::info!("Saved statement to {}", file_path.display());
        Ok(file_path)
    }

    /// Saves a short summary of the statement (counts, validation result) in JSON format
    pub fn save_statement_metadata(&self, statement: &ParsedStatement) -> Result<PathBuf, StorageError> {
        let file_path = self
            .target_dir(statement)?
            .join(format!("{}_meta.json", sanitize(file_stem(statement))));

        let report = validate_statement(statement);
        let metadata = serde_json::json!({
            "company_name": statement.company.name,
            "security_code": statement.company.security_code,
            "fiscal_year": statement.period.fiscal_year,
            "source_file": statement.metadata.source_file,
            "format": statement.metadata.format,
            "period_is_default": statement.metadata.period_is_default,
            "statistics": statement_statistics(statement),
            "valid": report.is_valid(),
            "validation": report,
            "extraction_timestamp": statement.metadata.parsed_at.to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, metadata_str).map_err(StorageError::IoError)?;

        tracing::info!("Saved metadata to {}", file_path.display());
        Ok(file_path)
    }
}

fn file_stem(statement: &ParsedStatement) -> &str {
    let source = statement.metadata.source_file.as_str();
    Path::new(source)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(source)
}

// Keeps path components to a single level.
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim().trim_matches('.').to_string();
    if cleaned.is_empty() {
        "statement".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::postprocess::validate::tests::sample_statement;

    #[test]
    fn test_layout_uses_code_and_fiscal_year() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path().join("out")).unwrap();
        let statement = sample_statement();

        let path = storage.save_statement(&statement).unwrap();
        assert_eq!(path, dir.path().join("out/1234/2024/sample_statement.json"));
        let saved: ParsedStatement = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved.company.name, statement.company.name);

        let meta_path = storage.save_statement_metadata(&statement).unwrap();
        let meta: serde_json::Value = serde_json::from_str(&fs::read_to_string(meta_path).unwrap()).unwrap();
        assert_eq!(meta["valid"], true);
        assert_eq!(meta["statistics"]["totalItems"], 4);
    }

    #[test]
    fn test_layout_without_code_uses_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();
        let mut statement = sample_statement();
        statement.company.security_code = None;
        statement.period.fiscal_year = None;
        statement.metadata.source_file = "決算:2024.pdf".into();

        let path = storage.save_statement(&statement).unwrap();
        assert_eq!(path, dir.path().join("決算_2024/unknown/決算_2024_statement.json"));
    }
}
