//! Source file discovery

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// File name filter for source files in a data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFilter {
    pub prefix: String,
    pub suffix: String,
}

impl Default for SourceFilter {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            suffix: ".txt".to_string(),
        }
    }
}

impl SourceFilter {
    pub fn matches(&self, file_name: &str) -> bool {
        file_name.starts_with(&self.prefix) && file_name.ends_with(&self.suffix)
    }
}

/// List the regular files in `dir` accepted by `filter`, sorted by path.
///
/// Returns [`Error::MissingInput`] if `dir` does not exist.
pub fn list_source_files<P: AsRef<Path>>(dir: P, filter: &SourceFilter) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(Error::MissingInput(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        if filter.matches(&name.to_string_lossy()) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}
