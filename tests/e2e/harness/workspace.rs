use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Manages an isolated object store with tempfile
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    /// Create an empty workspace
    pub fn empty() -> Result<Self> {
        let dir = TempDir::new().context("Failed to create temp directory")?;
        Ok(Self { dir })
    }

    /// Get workspace path
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a value as pretty JSON
    pub fn write_json<T: Serialize>(&self, path: &str, value: &T) -> Result<()> {
        let full_path = self.path().join(path);

        // Create parent directories
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directories for {}", path))?;
        }

        let content = serde_json::to_vec_pretty(value)
            .with_context(|| format!("Failed to serialize {}", path))?;
        fs::write(&full_path, content).with_context(|| format!("Failed to write file: {}", path))?;

        Ok(())
    }

    /// Read a JSON file back into a value
    pub fn read_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let full_path = self.path().join(path);
        let content =
            fs::read(&full_path).with_context(|| format!("Failed to read file: {}", path))?;
        serde_json::from_slice(&content).with_context(|| format!("Failed to parse {}", path))
    }

    /// Remove a file
    pub fn remove_file(&self, path: &str) -> Result<()> {
        fs::remove_file(self.path().join(path))
            .with_context(|| format!("Failed to remove file: {}", path))
    }

    /// Check if file exists
    pub fn file_exists(&self, path: &str) -> bool {
        self.path().join(path).exists()
    }
}
