// src/utils/debug_dump.rs
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::utils::error::StorageError;

/// Renders extracted lines with numbered gutters and section markers.
/// `markers` are `(start_line, end_line_exclusive, label)`.
pub fn render_annotated_text(lines: &[String], markers: &[(usize, usize, String)]) -> String {
    let mut sorted_markers = markers.to_vec();
    sorted_markers.sort_by_key(|m| m.0); // Sort by position

    let mut out = String::new();
    for (idx, line) in lines.iter().enumerate() {
        for (start, end, label) in &sorted_markers {
            if *start == idx {
                out.push_str(&format!(">>>>> BEGIN {} (lines {}..{})\n", label, start, end));
            }
        }
        // Mark every line that falls inside a section
        let inside = sorted_markers.iter().any(|(start, end, _)| idx > *start && idx < *end);
        let gutter = if inside { '|' } else { ' ' };
        out.push_str(&format!("{:>6} {} {}\n", idx, gutter, line));
        for (_, end, label) in &sorted_markers {
            if *end == idx + 1 {
                out.push_str(&format!("<<<<< END {}\n", label));
            }
        }
    }
    out
}

/// Saves the annotated dump to `filename`, creating parent directories.
pub fn save_annotated_text(
    lines: &[String],
    markers: &[(usize, usize, String)],
    filename: &Path,
) -> Result<(), StorageError> {
    if let Some(parent) = filename.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(filename)?;
    file.write_all(render_annotated_text(lines, markers).as_bytes())?;

    tracing::info!("Saved annotated debug text to {}", filename.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_wrap_section() {
        let lines: Vec<String> = ["表紙", "貸借対照表", "現金 100", "売掛金 50", "注記"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rendered = render_annotated_text(&lines, &[(1, 4, "balance sheet".to_string())]);
        let begin = rendered.find(">>>>> BEGIN balance sheet").unwrap();
        let end = rendered.find("<<<<< END balance sheet").unwrap();
        assert!(begin < rendered.find("現金 100").unwrap());
        assert!(end > rendered.find("売掛金 50").unwrap());
        assert!(end < rendered.find("注記").unwrap());
    }

    #[test]
    fn test_save_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("dump.txt");
        save_annotated_text(&["a".to_string()], &[], &path).unwrap();
        assert!(path.exists());
    }
}
