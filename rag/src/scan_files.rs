use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Lists the `*.json` files directly inside `dir`, sorted by path.
pub fn scan_json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut results = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::corpus(dir, e))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if is_json_file(entry.path()) {
            results.push(entry.into_path());
        }
    }

    Ok(results)
}

fn is_json_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}
