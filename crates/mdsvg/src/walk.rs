//! Markdown file discovery by filesystem walking.

use std::fs;
use std::path::{Path, PathBuf};

/// Collect all `.md` files under `dir`, recursively.
///
/// Hidden files and directories (leading `.`) are skipped and the extension
/// match ignores case. Returns an empty Vec if the directory does not exist.
/// The result is sorted so repeated runs process files in a stable order.
pub(crate) fn markdown_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if dir.exists() {
        collect(dir, &mut files);
    }
    files.sort();
    files
}

fn collect(dir: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.filter_map(Result::ok) {
        let name_lower = entry.file_name().to_string_lossy().to_lowercase();
        if name_lower.starts_with('.') {
            continue;
        }

        let path = entry.path();
        if entry.file_type().is_ok_and(|t| t.is_dir()) {
            collect(&path, files);
        } else if name_lower.ends_with(".md") {
            files.push(path);
        }
    }
}
