//! Document store for collections
//!
//! Each collection lives in its own YAML document named after the
//! collection (`<root>/<name>.yaml`). The manifest listing all collection
//! names sits in the same directory. Writes are atomic (temp file + rename).

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::yaml;
use crate::domain::Book;

/// File extension of collection documents
pub const DOCUMENT_EXTENSION: &str = "yaml";

/// Repository of collection documents keyed by collection name
pub trait CollectionStore {
    /// Reads the manifest, `None` if it does not exist yet
    fn read_manifest(&self, manifest: &str) -> Result<Option<Vec<String>>>;

    /// Overwrites the manifest
    fn write_manifest(&self, manifest: &str, names: &[String]) -> Result<()>;

    /// Reads the books of a collection, `None` if it has no document
    fn read_books(&self, name: &str) -> Result<Option<Vec<Book>>>;

    /// Overwrites the document of a collection
    fn write_books(&self, name: &str, books: &[Book]) -> Result<()>;

    /// Checks whether a document exists for the collection
    fn contains(&self, name: &str) -> bool;

    /// Lists collection names that have a document
    fn list(&self) -> Result<Vec<String>>;

    /// Moves a document to a new collection name
    fn rename(&self, old: &str, new: &str) -> Result<()>;

    /// Removes a document, returning false if it did not exist
    fn remove(&self, name: &str) -> Result<bool>;
}

/// Store backed by a directory of YAML documents
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Creates a store rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the document path for a collection
    pub fn document_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.{}", name, DOCUMENT_EXTENSION))
    }

    fn manifest_path(&self, manifest: &str) -> PathBuf {
        self.root.join(manifest)
    }

    /// Writes content to a temp file next to `path`, then renames it into place
    fn write_atomic(&self, path: &Path, content: &str) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create directory: {}", self.root.display()))?;

        let mut temp_name = path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);

        fs::write(&temp_path, content)
            .with_context(|| format!("Failed to write temp file: {}", temp_path.display()))?;

        fs::rename(&temp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                path.display()
            )
        })
    }

    /// Reads a file, mapping "not found" to `None`
    fn read_optional(path: &Path) -> Result<Option<String>> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }
}

impl CollectionStore for DirectoryStore {
    fn read_manifest(&self, manifest: &str) -> Result<Option<Vec<String>>> {
        let path = self.manifest_path(manifest);
        match Self::read_optional(&path)? {
            Some(content) => yaml::decode_manifest(&content)
                .with_context(|| format!("Invalid manifest: {}", path.display()))
                .map(Some),
            None => Ok(None),
        }
    }

    fn write_manifest(&self, manifest: &str, names: &[String]) -> Result<()> {
        let content = yaml::encode_manifest(names)?;
        self.write_atomic(&self.manifest_path(manifest), &content)
    }

    fn read_books(&self, name: &str) -> Result<Option<Vec<Book>>> {
        let path = self.document_path(name);
        match Self::read_optional(&path)? {
            Some(content) => yaml::decode_books(&content)
                .with_context(|| format!("Invalid collection document: {}", path.display()))
                .map(Some),
            None => Ok(None),
        }
    }

    fn write_books(&self, name: &str, books: &[Book]) -> Result<()> {
        let content = yaml::encode_books(books)?;
        self.write_atomic(&self.document_path(name), &content)
    }

    fn contains(&self, name: &str) -> bool {
        self.document_path(name).is_file()
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();

        if !self.root.exists() {
            return Ok(names);
        }

        for entry in fs::read_dir(&self.root)
            .with_context(|| format!("Failed to read directory: {}", self.root.display()))?
        {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if !path.is_file() || !path.extension().is_some_and(|e| e == DOCUMENT_EXTENSION) {
                continue;
            }

            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    fn rename(&self, old: &str, new: &str) -> Result<()> {
        let from = self.document_path(old);
        let to = self.document_path(new);

        if to.exists() {
            anyhow::bail!("Target document already exists: {}", to.display());
        }

        fs::rename(&from, &to)
            .with_context(|| format!("Failed to rename {} to {}", from.display(), to.display()))
    }

    fn remove(&self, name: &str) -> Result<bool> {
        let path = self.document_path(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn dune() -> Book {
        Book::new("Dune", "Frank", "Herbert", "Science Fiction", 1965, 9780441172719)
    }

    #[test]
    fn read_missing_documents() {
        let dir = TempDir::new().unwrap();
        let store = DirectoryStore::new(dir.path());

        assert!(store.read_books("fiction").unwrap().is_none());
        assert!(store.read_manifest("collections.yaml").unwrap().is_none());
        assert!(!store.contains("fiction"));
    }

    #[test]
    fn write_and_read_books() {
        let dir = TempDir::new().unwrap();
        let store = DirectoryStore::new(dir.path());

        store.write_books("fiction", &[dune()]).unwrap();

        assert!(store.contains("fiction"));
        assert!(dir.path().join("fiction.yaml").is_file());
        assert_eq!(store.read_books("fiction").unwrap(), Some(vec![dune()]));
    }

    #[test]
    fn write_is_atomic() {
        let dir = TempDir::new().unwrap();
        let store = DirectoryStore::new(dir.path());

        store.write_books("fiction", &[dune()]).unwrap();
        assert!(!dir.path().join("fiction.yaml.tmp").exists());
    }

    #[test]
    fn creates_root_directory() {
        let dir = TempDir::new().unwrap();
        let store = DirectoryStore::new(dir.path().join("users").join("ann"));

        store.write_manifest("collections.yaml", &["default".to_string()]).unwrap();
        assert!(store.root().join("collections.yaml").is_file());
    }

    #[test]
    fn manifest_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = DirectoryStore::new(dir.path());
        let names = vec!["b".to_string(), "a".to_string()];

        store.write_manifest("collections.yaml", &names).unwrap();
        assert_eq!(store.read_manifest("collections.yaml").unwrap(), Some(names));
    }

    #[test]
    fn malformed_document_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = DirectoryStore::new(dir.path());
        fs::write(dir.path().join("broken.yaml"), "books: [oops").unwrap();

        assert!(store.read_books("broken").is_err());
    }

    #[test]
    fn list_returns_documents() {
        let dir = TempDir::new().unwrap();
        let store = DirectoryStore::new(dir.path());

        store.write_books("b", &[]).unwrap();
        store.write_books("a", &[]).unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        assert_eq!(store.list().unwrap(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn rename_moves_document() {
        let dir = TempDir::new().unwrap();
        let store = DirectoryStore::new(dir.path());
        store.write_books("old", &[dune()]).unwrap();

        store.rename("old", "new").unwrap();

        assert!(!store.contains("old"));
        assert_eq!(store.read_books("new").unwrap(), Some(vec![dune()]));
    }

    #[test]
    fn rename_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let store = DirectoryStore::new(dir.path());
        store.write_books("old", &[dune()]).unwrap();
        store.write_books("new", &[]).unwrap();

        assert!(store.rename("old", "new").is_err());
        assert_eq!(store.read_books("old").unwrap(), Some(vec![dune()]));
        assert_eq!(store.read_books("new").unwrap(), Some(vec![]));
    }

    #[test]
    fn remove_tolerates_missing_document() {
        let dir = TempDir::new().unwrap();
        let store = DirectoryStore::new(dir.path());
        store.write_books("gone", &[]).unwrap();

        assert!(store.remove("gone").unwrap());
        assert!(!store.remove("gone").unwrap());
    }
}
