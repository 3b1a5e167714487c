//! Walks an input directory tree and feeds every non-excluded file into a
//! [`Container`].

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use walkdir::{DirEntry, WalkDir};

use crate::container::{Container, ContainerOptions};
use crate::error::Result;
use crate::fsutil;

#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub use_compression: bool,
    pub exclude_dirs: HashSet<String>,
    pub exclude_exts: HashSet<String>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            use_compression: true,
            exclude_dirs: [".git", "__pycache__", ".DS_Store"].into_iter().map(String::from).collect(),
            exclude_exts: ["bak", "tmp", "log"].into_iter().map(String::from).collect(),
        }
    }
}

impl IngestOptions {
    fn is_excluded_dir(&self, entry: &DirEntry) -> bool {
        entry.file_type().is_dir()
            && entry.file_name().to_str().is_some_and(|name| self.exclude_dirs.contains(name))
    }

    fn is_excluded_file(&self, entry: &DirEntry) -> bool {
        entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.exclude_exts.contains(ext))
            || entry.file_name().to_str().is_some_and(|name| self.exclude_dirs.contains(name))
    }
}

/// Walks `input_dir`, skipping excluded directories and files, and writes
/// every remaining file into a fresh container at `output_sdb_path`.
///
/// Returns the number of documents written.
pub fn pack_directory(input_dir: &Path, options: &IngestOptions, output_sdb_path: &Path) -> Result<usize> {
    let container_options = ContainerOptions { use_compression: options.use_compression };
    let mut container = Container::open(output_sdb_path, container_options)?;

    let walker = WalkDir::new(input_dir).into_iter().filter_entry(|entry| {
        if options.is_excluded_dir(entry) {
            log::debug!("excluding directory {}", entry.path().display());
            return false;
        }
        true
    });

    let mut count = 0usize;
    for entry in walker {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        if options.is_excluded_file(&entry) {
            log::debug!("excluding file {}", entry.path().display());
            continue;
        }

        let relative = entry.path().strip_prefix(input_dir).unwrap_or(entry.path());
        let logical_path = fsutil::to_logical_path(relative);
        let bytes = fs::read(entry.path())?;

        container.write_document(&logical_path, &bytes)?;
        log::info!("packed '{logical_path}' ({} bytes)", bytes.len());
        count += 1;
    }

    container.close()?;
    Ok(count)
}
