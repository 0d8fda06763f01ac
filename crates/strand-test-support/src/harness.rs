//! Tempdir-backed project fixtures

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A throwaway project directory for exercising the session against real
/// files. Dropped with the value.
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp project dir"),
        }
    }

    /// Absolute path of the project root.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file at a project-relative path, creating parent directories.
    pub fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent dirs");
        }
        fs::write(&path, content).expect("failed to write fixture file");
        path
    }

    /// Create a folder at a project-relative path.
    pub fn create_dir(&self, relative: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        fs::create_dir_all(&path).expect("failed to create fixture dir");
        path
    }

    /// Read a project-relative file back as a string.
    pub fn read_file(&self, relative: &str) -> String {
        fs::read_to_string(self.dir.path().join(relative)).expect("failed to read fixture file")
    }

    /// Whether a project-relative path exists.
    pub fn exists(&self, relative: &str) -> bool {
        self.dir.path().join(relative).exists()
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}
