use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Component, Path};

/// Open an existing file read-only.
///
/// # Errors
/// Returns an error if the file does not exist or cannot be opened.
pub fn open_ro(path: &Path) -> io::Result<File> {
    OpenOptions::new().read(true).open(path)
}

/// Create (or truncate) a file for exclusive read/write.
///
/// # Errors
/// Returns an error if the file cannot be created.
pub fn create_rw_truncate(path: &Path) -> io::Result<File> {
    OpenOptions::new().read(true).write(true).create(true).truncate(true).open(path)
}

/// Normalizes a filesystem path into the forward-slash logical path form
/// stored inside a `.sdb` container, regardless of host path separator.
#[must_use]
pub fn to_logical_path(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
