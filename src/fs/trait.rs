//! FileSystem trait definition

use anyhow::Result;
use std::path::Path;

/// Abstraction over the file operations the generator performs
pub trait FileSystem: Send + Sync {
    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Read file contents as string
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Create a directory and all missing ancestors; succeeds if it already exists
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Replace the file at `path` with `contents`
    ///
    /// Readers observe either the previous contents or the new ones, never a
    /// partially written file. Parent directories are created as needed.
    fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<()>;

    /// Mark a file as executable by its owner, group and others
    fn set_executable(&self, path: &Path) -> Result<()>;
}
