//! Turn the input file into the code text sent for review. Zip archives are expanded
//! into their supported source entries.

use crate::validate::{extension_of, SUPPORTED_EXTENSIONS};
use anyhow::Context;
use std::io::{Cursor, Read};
use std::path::Path;

/// Source text for `bytes`, read from a file with extension `ext`.
pub fn extract_source(ext: &str, bytes: Vec<u8>) -> anyhow::Result<String> {
    if ext == ".zip" {
        return extract_zip(bytes);
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn extract_zip(bytes: Vec<u8>) -> anyhow::Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).context("invalid zip archive")?;
    let mut out = String::new();
    let mut files = 0usize;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        let ext = extension_of(Path::new(&name));
        if ext == ".zip" || !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
            tracing::debug!(entry = %name, "skipping unsupported archive entry");
            continue;
        }
        let mut buf = Vec::new();
        entry
            .read_to_end(&mut buf)
            .with_context(|| format!("reading {} from archive", name))?;
        out.push_str(&format!(
            "// File: {}\n{}\n\n",
            name,
            String::from_utf8_lossy(&buf)
        ));
        files += 1;
    }
    anyhow::ensure!(files > 0, "zip archive contains no supported source files");
    Ok(out.trim_end().to_string())
}
