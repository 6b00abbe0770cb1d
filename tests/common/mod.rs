//! Common test utilities for integration tests
//!
//! These helpers build isolated project layouts (content directory plus an
//! optional build output directory) in temporary locations so tests can run
//! in parallel without interfering with each other.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated project fixture with automatic cleanup.
pub struct ProjectFixture {
    _root: TempDir,
    root_path: PathBuf,
}

impl ProjectFixture {
    /// Create an empty project with a `content/` directory.
    pub fn new() -> Result<Self> {
        let root = TempDir::new()?;
        let root_path = root.path().to_path_buf();
        fs::create_dir_all(root_path.join("content"))?;
        Ok(Self {
            _root: root,
            root_path,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root_path
    }

    pub fn content_dir(&self) -> PathBuf {
        self.root_path.join("content")
    }

    /// Write a markdown document under `content/`.
    pub fn write_document(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.content_dir().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Write a file under the build output directory (`.nuxt/`).
    pub fn write_build_file(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.root_path.join(".nuxt").join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }
}
