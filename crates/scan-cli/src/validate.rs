//! Extension allow-list for files accepted by the scanner.

use std::path::Path;

pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    ".zip", ".js", ".jsx", ".ts", ".tsx", ".py", ".java", ".cpp", ".c", ".cs", ".go", ".rb", ".php",
];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unsupported file type: {ext}. Supported types: {}", SUPPORTED_EXTENSIONS.join(","))]
pub struct UnsupportedFileType {
    pub ext: String,
}

/// Lower-cased extension with its leading dot, or an empty string when there is none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}

/// Accept `path` only if its extension is on the allow-list; returns that extension.
pub fn validate_extension(path: &Path) -> Result<String, UnsupportedFileType> {
    let ext = extension_of(path);
    if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(UnsupportedFileType { ext })
    }
}
