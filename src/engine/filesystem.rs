//! File system collaborator.
//!
//! The engine touches the file system only to clean the temporary and
//! output directories; reading and writing files is the business of
//! modules and output writers.

use std::fmt::Debug;
use std::path::{Path, PathBuf};

/// A directory handle the engine can probe and delete.
#[derive(Debug, Clone)]
pub struct Directory {
    path: PathBuf,
}

impl Directory {
    /// Creates a handle for the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns whether the directory exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_dir()
    }

    /// Recursively deletes the directory.
    pub fn delete(&self) -> std::io::Result<()> {
        std::fs::remove_dir_all(&self.path)
    }
}

/// Abstraction over the paths the engine operates between.
pub trait FileSystem: Send + Sync + Debug {
    /// The configured input paths.
    fn input_paths(&self) -> &[PathBuf];

    /// The output path.
    fn output_path(&self) -> &Path;

    /// The temporary path.
    fn temp_path(&self) -> &Path;

    /// A handle for the output directory.
    fn output_directory(&self) -> Directory {
        Directory::new(self.output_path())
    }

    /// A handle for the temporary directory.
    fn temp_directory(&self) -> Directory {
        Directory::new(self.temp_path())
    }
}

/// The default file system rooted in the working directory.
#[derive(Debug, Clone)]
pub struct LocalFileSystem {
    input_paths: Vec<PathBuf>,
    output_path: PathBuf,
    temp_path: PathBuf,
}

impl Default for LocalFileSystem {
    fn default() -> Self {
        Self {
            input_paths: vec![PathBuf::from("input")],
            output_path: PathBuf::from("output"),
            temp_path: PathBuf::from("temp"),
        }
    }
}

impl LocalFileSystem {
    /// Creates a file system with the default paths.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the input paths.
    #[must_use]
    pub fn with_input_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.input_paths = paths;
        self
    }

    /// Sets the output path.
    #[must_use]
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Sets the temporary path.
    #[must_use]
    pub fn with_temp_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.temp_path = path.into();
        self
    }
}

impl FileSystem for LocalFileSystem {
    fn input_paths(&self) -> &[PathBuf] {
        &self.input_paths
    }

    fn output_path(&self) -> &Path {
        &self.output_path
    }

    fn temp_path(&self) -> &Path {
        &self.temp_path
    }
}
