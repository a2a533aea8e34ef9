// src/extractors/detect.rs
use std::path::Path;
use tokio::io::AsyncReadExt;

use crate::model::FileFormat;
use crate::utils::error::ParseError;

const MAGIC_LEN: usize = 8;
const PDF_MAGIC: &[u8] = b"%PDF";
const ZIP_MAGIC: &[u8] = b"PK";
const OLE2_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];

// Extensions that are known not to carry statements we can read.
const UNSUPPORTED_EXTENSIONS: &[&str] = &[
    "doc", "docx", "ppt", "pptx", "png", "jpg", "jpeg", "gif", "tif", "tiff", "bmp",
];

/// Classifies a file by extension, falling back to magic bytes, and finally
/// to delimited text.
pub async fn detect_format(path: &Path) -> Result<FileFormat, ParseError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    if let Some(ext) = extension.as_deref() {
        if let Some(format) = format_from_extension(ext) {
            tracing::debug!("Detected {} from extension .{}", format, ext);
            return Ok(format);
        }
        if UNSUPPORTED_EXTENSIONS.contains(&ext) {
            return Err(ParseError::UnsupportedFormat(format!(".{} files are not supported", ext)));
        }
    }

    let magic = read_magic(path).await?;
    let format = format_from_magic(&magic).unwrap_or(FileFormat::DelimitedText);
    tracing::debug!("Detected {} from content of {}", format, path.display());
    Ok(format)
}

/// Extension lookup; `None` means the extension is absent or unknown.
pub fn format_from_extension(ext: &str) -> Option<FileFormat> {
    match ext {
        "pdf" => Some(FileFormat::Pdf),
        "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Some(FileFormat::Spreadsheet),
        "csv" | "tsv" | "txt" => Some(FileFormat::DelimitedText),
        _ => None,
    }
}

/// Magic-byte sniffing for files whose extension did not decide.
pub fn format_from_magic(magic: &[u8]) -> Option<FileFormat> {
    if magic.starts_with(PDF_MAGIC) {
        Some(FileFormat::Pdf)
    } else if magic.starts_with(ZIP_MAGIC) || magic.starts_with(OLE2_MAGIC) {
        Some(FileFormat::Spreadsheet)
    } else {
        None
    }
}

async fn read_magic(path: &Path) -> Result<Vec<u8>, ParseError> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut buf = [0u8; MAGIC_LEN];
    let mut filled = 0;
    // A single read may return fewer bytes than are available.
    while filled < MAGIC_LEN {
        let n = file.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(buf[..filled].to_vec())
}
