//! Durable storage for the serialized cache map.
//!
//! The store always reads or rewrites the whole document; backends only move
//! bytes and never interpret them.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub trait CacheBackend: Send + Sync {
    /// Returns `Ok(None)` when nothing has been persisted yet.
    fn read(&self) -> io::Result<Option<String>>;

    /// Replace the persisted document.
    fn write(&self, contents: &str) -> io::Result<()>;

    /// Human-readable location for logs and `cache stats`.
    fn describe(&self) -> String;
}

/// Single JSON file on disk, rewritten through a sibling temp file.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "cache".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl CacheBackend for FileBackend {
    fn read(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let temp = self.temp_path();
        fs::write(&temp, contents)?;
        fs::rename(&temp, &self.path)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-process backend for tests and for running without a cache file.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    contents: Mutex<Option<String>>,
    writes: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the backend as if a previous process had written `contents`.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(contents.into())),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl CacheBackend for MemoryBackend {
    fn read(&self) -> io::Result<Option<String>> {
        Ok(self.contents())
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        *self.contents.lock().unwrap_or_else(|e| e.into_inner()) = Some(contents.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}

impl<B: CacheBackend + ?Sized> CacheBackend for std::sync::Arc<B> {
    fn read(&self) -> io::Result<Option<String>> {
        (**self).read()
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        (**self).write(contents)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_backend_missing_file_reads_none() {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::new(dir.path().join("absent.json"));
        assert!(backend.read().unwrap().is_none());
    }

    #[test]
    fn test_file_backend_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("cache").join("weather-cache.json");
        let backend = FileBackend::new(&path);

        backend.write("{}").unwrap();
        assert_eq!(backend.read().unwrap().as_deref(), Some("{}"));
        assert!(!backend.temp_path().exists());
    }

    #[test]
    fn test_file_backend_overwrites() {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::new(dir.path().join("c.json"));
        backend.write(r#"{"a":1}"#).unwrap();
        backend.write(r#"{"b":2}"#).unwrap();
        assert_eq!(backend.read().unwrap().as_deref(), Some(r#"{"b":2}"#));
    }

    #[test]
    fn test_memory_backend_counts_writes() {
        let backend = MemoryBackend::with_contents("seed");
        assert_eq!(backend.read().unwrap().as_deref(), Some("seed"));
        backend.write("one").unwrap();
        backend.write("two").unwrap();
        assert_eq!(backend.write_count(), 2);
        assert_eq!(backend.contents().as_deref(), Some("two"));
    }
}
