//! Filesystem collaborator.
//!
//! Discovery only ever lists directories; it never reads or writes files
//! itself.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use futures_util::future::BoxFuture;

use crate::routing::types::DirectoryEntry;

/// Lists directory entries.
pub trait FileSystem: Send + Sync {
    /// List the entries of `path`. Fails if the path is missing or not a
    /// directory. Order is unspecified.
    fn list<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, io::Result<Vec<DirectoryEntry>>>;
}

/// The local filesystem, via tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    fn list<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, io::Result<Vec<DirectoryEntry>>> {
        Box::pin(async move {
            let mut reader = tokio::fs::read_dir(path).await?;
            let mut entries = Vec::new();
            while let Some(entry) = reader.next_entry().await? {
                let name = match entry.file_name().into_string() {
                    Ok(name) => name,
                    Err(raw) => {
                        tracing::warn!(dir = %path.display(), name = ?raw, "Skipping non UTF-8 entry");
                        continue;
                    }
                };
                let file_type = entry.file_type().await?;
                let is_dir = if file_type.is_symlink() {
                    // Follow links so a linked directory is walked.
                    match tokio::fs::metadata(entry.path()).await {
                        Ok(target) => target.is_dir(),
                        Err(e) => {
                            tracing::warn!(
                                link = %entry.path().display(),
                                error = %e,
                                "Skipping unresolvable symlink"
                            );
                            continue;
                        }
                    }
                } else {
                    file_type.is_dir()
                };
                entries.push(DirectoryEntry { name, is_dir });
            }
            Ok(entries)
        })
    }
}

/// An in-memory directory tree.
///
/// Listings are returned in insertion order, which lets callers exercise
/// arbitrary orderings.
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    dirs: HashMap<PathBuf, Vec<DirectoryEntry>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, creating its parent directories.
    pub fn add_file(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.insert(path.as_ref(), false);
        self
    }

    /// Add an empty directory, creating its parents.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.insert(path.as_ref(), true);
        self
    }

    /// Reverse every listing.
    pub fn reverse_listings(&mut self) -> &mut Self {
        for entries in self.dirs.values_mut() {
            entries.reverse();
        }
        self
    }

    fn insert(&mut self, path: &Path, is_dir: bool) {
        if is_dir {
            self.dirs.entry(path.to_path_buf()).or_default();
        }
        let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
            return;
        };
        let name = name.to_string_lossy().into_owned();
        let siblings = self.dirs.entry(parent.to_path_buf()).or_default();
        if siblings.iter().any(|e| e.name == name) {
            return;
        }
        siblings.push(DirectoryEntry { name, is_dir });
        self.insert(parent, true);
    }
}

impl FileSystem for MemoryFs {
    fn list<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, io::Result<Vec<DirectoryEntry>>> {
        Box::pin(async move {
            self.dirs.get(path).cloned().ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no such directory: {}", path.display()),
                )
            })
        })
    }
}
