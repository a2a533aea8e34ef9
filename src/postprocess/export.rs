// src/postprocess/export.rs
use serde::Serialize;

use crate::model::{ParsedStatement, ParserResult};
use crate::utils::error::StorageError;

fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string_pretty(value).map_err(|e| StorageError::SerializationError(e.to_string()))
}

/// Pretty JSON with camelCase keys; dates come out as ISO-8601 strings.
pub fn export_to_json(statement: &ParsedStatement) -> Result<String, StorageError> {
    to_pretty_json(statement)
}

/// Exports a whole batch, failed entries included.
pub fn export_results_to_json(results: &[ParserResult]) -> Result<String, StorageError> {
    to_pretty_json(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::postprocess::validate::tests::sample_statement;

    #[test]
    fn test_dates_are_iso_strings_and_keys_camel_case() {
        let json = export_to_json(&sample_statement()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["period"]["startDate"], "2023-04-01");
        assert_eq!(value["period"]["endDate"], "2024-03-31");
        assert_eq!(value["company"]["securityCode"], "1234");
        assert_eq!(value["balanceSheet"]["fixedAssets"][0]["subItems"][1]["name"], "土地");
        assert_eq!(value["balanceSheet"]["fixedAssets"][0]["amount"]["unit"], "MILLION_YEN");
        assert!(value["metadata"]["parsedAt"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn test_statement_survives_export() {
        let statement = sample_statement();
        let back: ParsedStatement = serde_json::from_str(&export_to_json(&statement).unwrap()).unwrap();
        assert_eq!(back, statement);
    }

    #[test]
    fn test_batch_export_keeps_failures() {
        let results = vec![
            ParserResult::success(sample_statement(), vec![], 5),
            ParserResult::failure("File too large", 1),
        ];
        let value: serde_json::Value = serde_json::from_str(&export_results_to_json(&results).unwrap()).unwrap();
        assert_eq!(value[0]["success"], true);
        assert_eq!(value[1]["success"], false);
        assert_eq!(value[1]["error"], "File too large");
        assert!(value[1].get("data").is_none());
    }
}
