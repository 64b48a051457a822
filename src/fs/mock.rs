use super::FileSystem;
use anyhow::{anyhow, bail, Result};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

#[derive(Debug, Clone)]
pub struct MockEntry {
    pub content: Option<Vec<u8>>,
    pub executable: bool,
}

/// In-memory file system with injectable failures
pub struct MockFileSystem {
    files: RwLock<HashMap<PathBuf, MockEntry>>,
    denied: RwLock<BTreeSet<PathBuf>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            denied: RwLock::new(BTreeSet::new()),
        }
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: &str) {
        let path = path.as_ref().to_path_buf();
        let mut files = self.files.write().unwrap();
        if let Some(parent) = path.parent() {
            Self::ensure_parents(&mut files, parent);
        }
        files.insert(
            path,
            MockEntry {
                content: Some(content.as_bytes().to_vec()),
                executable: false,
            },
        );
    }

    /// Makes every write or directory creation at or below `path` fail
    pub fn deny(&self, path: impl AsRef<Path>) {
        self.denied
            .write()
            .unwrap()
            .insert(path.as_ref().to_path_buf());
    }

    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.files
            .read()
            .unwrap()
            .get(path.as_ref())
            .and_then(|entry| entry.content.clone())
    }

    pub fn contents_string(&self, path: impl AsRef<Path>) -> Option<String> {
        self.contents(path)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn is_executable(&self, path: impl AsRef<Path>) -> bool {
        self.files
            .read()
            .unwrap()
            .get(path.as_ref())
            .map(|entry| entry.executable)
            .unwrap_or(false)
    }

    /// Every file (not directory) currently stored, sorted
    pub fn file_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self
            .files
            .read()
            .unwrap()
            .iter()
            .filter(|(_, entry)| entry.content.is_some())
            .map(|(path, _)| path.clone())
            .collect();
        paths.sort();
        paths
    }

    fn check_allowed(&self, path: &Path) -> Result<()> {
        let denied = self.denied.read().unwrap();
        if denied.iter().any(|prefix| path.starts_with(prefix)) {
            bail!("Permission denied: {:?}", path);
        }
        Ok(())
    }

    fn ensure_parents(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            files.entry(current.clone()).or_insert(MockEntry {
                content: None,
                executable: false,
            });
        }
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.files.read().unwrap().contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.files
            .read()
            .unwrap()
            .get(path)
            .map(|e| e.content.is_none())
            .unwrap_or(false)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.contents_string(path)
            .ok_or_else(|| anyhow!("File not found: {:?}", path))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.check_allowed(path)?;
        let mut files = self.files.write().unwrap();
        if files.get(path).map_or(false, |e| e.content.is_some()) {
            bail!("Not a directory: {:?}", path);
        }
        Self::ensure_parents(&mut files, path);
        Ok(())
    }

    fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.check_allowed(path)?;
        let mut files = self.files.write().unwrap();
        if let Some(parent) = path.parent() {
            Self::ensure_parents(&mut files, parent);
        }
        let executable = files.get(path).map_or(false, |e| e.executable);
        files.insert(
            path.to_path_buf(),
            MockEntry {
                content: Some(contents.to_vec()),
                executable,
            },
        );
        Ok(())
    }

    fn set_executable(&self, path: &Path) -> Result<()> {
        let mut files = self.files.write().unwrap();
        let entry = files
            .get_mut(path)
            .ok_or_else(|| anyhow!("File not found: {:?}", path))?;
        entry.executable = true;
        Ok(())
    }
}
