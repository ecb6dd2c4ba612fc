//! Named text blob storage backing transcript documents.

use crate::Result;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// File extension of stored documents.
const EXTENSION: &str = "md";

/// Listing entry for a stored blob.
#[derive(Debug, Clone)]
pub struct BlobInfo {
    pub name: String,
    pub modified: DateTime<Utc>,
}

/// Read/write/append/delete of named text blobs.
///
/// Names are trusted; callers validate them before they reach a backend.
pub trait BlobStore: Send + Sync {
    /// Read a blob. Absent blobs are `Ok(None)`.
    fn read(&self, name: &str) -> Result<Option<String>>;

    /// Create or replace a blob.
    fn write(&self, name: &str, content: &str) -> Result<()>;

    /// Append to a blob, creating it if needed.
    fn append(&self, name: &str, content: &str) -> Result<()>;

    /// Remove a blob. Returns whether it existed.
    fn remove(&self, name: &str) -> Result<bool>;

    /// All stored blobs, in no particular order.
    fn list(&self) -> Result<Vec<BlobInfo>>;
}

/// One `<name>.md` file per blob inside a directory.
pub struct FsBlobStore {
    dir: PathBuf,
}

impl FsBlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{EXTENSION}"))
    }

    fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }
}

impl BlobStore for FsBlobStore {
    fn read(&self, name: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path(name)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, name: &str, content: &str) -> Result<()> {
        self.ensure_dir()?;
        std::fs::write(self.path(name), content)?;
        Ok(())
    }

    fn append(&self, name: &str, content: &str) -> Result<()> {
        self.ensure_dir()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path(name))?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<bool> {
        match std::fs::remove_file(self.path(name)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> Result<Vec<BlobInfo>> {
        self.ensure_dir()?;
        let mut blobs = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let modified = entry.metadata()?.modified()?;
            blobs.push(BlobInfo {
                name: name.to_string(),
                modified: DateTime::<Utc>::from(modified),
            });
        }
        Ok(blobs)
    }
}

/// In-process blob storage, lost on exit.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: DashMap<String, (String, DateTime<Utc>)>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn read(&self, name: &str) -> Result<Option<String>> {
        Ok(self.blobs.get(name).map(|blob| blob.0.clone()))
    }

    fn write(&self, name: &str, content: &str) -> Result<()> {
        self.blobs
            .insert(name.to_string(), (content.to_string(), Utc::now()));
        Ok(())
    }

    fn append(&self, name: &str, content: &str) -> Result<()> {
        let mut blob = self
            .blobs
            .entry(name.to_string())
            .or_insert_with(|| (String::new(), Utc::now()));
        blob.0.push_str(content);
        blob.1 = Utc::now();
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<bool> {
        Ok(self.blobs.remove(name).is_some())
    }

    fn list(&self) -> Result<Vec<BlobInfo>> {
        Ok(self
            .blobs
            .iter()
            .map(|blob| BlobInfo {
                name: blob.key().clone(),
                modified: blob.value().1,
            })
            .collect())
    }
}
