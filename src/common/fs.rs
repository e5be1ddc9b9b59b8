//! File metadata probing
//!
//! The watcher compares modification times and filesystem identities
//! between checks. Probing a missing or unreadable file is an I/O error.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Device and inode of a file.
///
/// On platforms without inode numbers both fields are zero, so only
/// modification times are compared there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileIdentity {
    /// Device id
    pub dev: u64,
    /// Inode number
    pub ino: u64,
}

#[cfg(unix)]
fn identity_of(metadata: &fs::Metadata) -> FileIdentity {
    use std::os::unix::fs::MetadataExt;
    FileIdentity {
        dev: metadata.dev(),
        ino: metadata.ino(),
    }
}

#[cfg(not(unix))]
fn identity_of(_metadata: &fs::Metadata) -> FileIdentity {
    FileIdentity { dev: 0, ino: 0 }
}

/// Identity of the file at `path`
pub fn file_identity(path: &Path) -> io::Result<FileIdentity> {
    fs::metadata(path).map(|metadata| identity_of(&metadata))
}

/// Modification time of the file at `path`
pub fn modified_time(path: &Path) -> io::Result<SystemTime> {
    fs::metadata(path)?.modified()
}

/// Make `path` absolute against the current directory
pub fn absolute_path(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
