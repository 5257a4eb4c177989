//! Collection lifecycle
//!
//! The manager owns the ordered index of collection names (persisted in the
//! manifest document) and keeps it consistent with the per-collection
//! documents held by a [`CollectionStore`]. It never caches collections:
//! every load re-reads the store.
//!
//! Create, rename and delete touch both the index and a document. Each one
//! either completes both steps or undoes the step that already happened.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::format::DocumentFormat;
use super::store::{CollectionStore, DirectoryStore, DOCUMENT_EXTENSION};
use crate::domain::{Book, Collection, Notifier};

/// Default manifest document name
pub const DEFAULT_MANIFEST: &str = "collections.yaml";

#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("A collection with the name '{0}' already exists")]
    AlreadyExists(String),

    #[error("The collection '{0}' does not exist")]
    NotFound(String),

    #[error("File does not exist: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Unsupported file format: {} (use .yaml, .yml or .xlsx)", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type Result<T, E = CollectionError> = std::result::Result<T, E>;

/// What to do with imported books that duplicate an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Drop books that match an existing (title, isbn) pair
    #[default]
    Skip,
    /// Append every imported book
    Allow,
}

/// Outcome of an import
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub collection: String,
    pub format: &'static str,
    pub imported: usize,
    pub skipped: usize,
}

/// Outcome of an export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub format: &'static str,
    pub collections: usize,
    pub books: usize,
}

/// Manages the named collections of one library root
pub struct CollectionManager<S: CollectionStore = DirectoryStore> {
    store: S,
    manifest: String,
    names: Vec<String>,
}

impl<S: CollectionStore> CollectionManager<S> {
    /// Creates a manager with an empty index
    pub fn new(store: S, manifest: impl Into<String>) -> Self {
        Self {
            store,
            manifest: manifest.into(),
            names: Vec::new(),
        }
    }

    /// Creates a manager and loads the index from its manifest
    pub fn open(store: S, manifest: impl Into<String>) -> Result<Self> {
        let mut manager = Self::new(store, manifest);
        let manifest = manager.manifest.clone();
        manager.load_collection_names(&manifest)?;
        Ok(manager)
    }

    /// Returns the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the manifest document id used for index updates
    pub fn manifest(&self) -> &str {
        &self.manifest
    }

    /// Returns the collection names in index order
    pub fn collection_names(&self) -> &[String] {
        &self.names
    }

    /// Checks whether a name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    fn manifest_stem(&self) -> &str {
        self.manifest
            .strip_suffix(&format!(".{}", DOCUMENT_EXTENSION))
            .unwrap_or(&self.manifest)
    }

    /// True when the collection's document would be the manifest itself
    fn is_manifest_name(&self, name: &str) -> bool {
        name.eq_ignore_ascii_case(self.manifest_stem())
    }

    /// Replaces the index with the names stored in `manifest`
    ///
    /// A missing manifest leaves the index unchanged.
    pub fn load_collection_names(&mut self, manifest: &str) -> Result<()> {
        let Some(stored) = self.store.read_manifest(manifest)? else {
            debug!(manifest, "No manifest found, keeping current index");
            return Ok(());
        };

        let mut names: Vec<String> = Vec::with_capacity(stored.len());
        for name in stored {
            if !names.contains(&name) {
                names.push(name);
            }
        }

        debug!(manifest, count = names.len(), "Loaded collection names");
        self.names = names;
        Ok(())
    }

    /// Overwrites `manifest` with the current index
    pub fn save_collection_names(&self, manifest: &str) -> Result<()> {
        self.store.write_manifest(manifest, &self.names)?;
        debug!(manifest, count = self.names.len(), "Saved collection names");
        Ok(())
    }

    /// Registers a new, empty collection
    pub fn add_new_collection(&mut self, name: &str) -> Result<()> {
        if self.contains(name) || self.store.contains(name) || self.is_manifest_name(name) {
            return Err(CollectionError::AlreadyExists(name.to_string()));
        }

        self.store
            .write_books(name, &[])
            .with_context(|| format!("Failed to create collection '{}'", name))?;

        self.names.push(name.to_string());
        if let Err(e) = self.store.write_manifest(&self.manifest, &self.names) {
            self.names.pop();
            if let Err(cleanup) = self.store.remove(name) {
                error!(collection = name, "Failed to remove new document after error: {:#}", cleanup);
            }
            return Err(e
                .context(format!("Failed to register collection '{}'", name))
                .into());
        }

        info!(collection = name, "Collection created");
        Ok(())
    }

    /// Registers `name` when the index is empty
    ///
    /// An existing document with that name is adopted rather than replaced.
    /// Returns true if the index changed.
    pub fn ensure_collection(&mut self, name: &str) -> Result<bool> {
        if !self.names.is_empty() {
            return Ok(false);
        }

        if self.is_manifest_name(name) {
            return Err(CollectionError::AlreadyExists(name.to_string()));
        }

        if self.store.contains(name) {
            self.names.push(name.to_string());
            if let Err(e) = self.store.write_manifest(&self.manifest, &self.names) {
                self.names.pop();
                return Err(e.into());
            }
            info!(collection = name, "Registered existing collection document");
        } else {
            self.add_new_collection(name)?;
        }

        Ok(true)
    }

    /// Loads a collection's books
    ///
    /// A missing document gives an empty collection. So does an unreadable
    /// one, after logging a warning.
    pub fn load_books_for_collection(&self, name: &str) -> Collection {
        match self.store.read_books(name) {
            Ok(Some(books)) => {
                debug!(collection = name, count = books.len(), "Loaded collection");
                Collection::with_books(name, books)
            }
            Ok(None) => Collection::new(name),
            Err(e) => {
                warn!(collection = name, "Treating unreadable collection as empty: {:#}", e);
                Collection::new(name)
            }
        }
    }

    /// Loads a collection's books before changing them
    ///
    /// Unlike [`load_books_for_collection`](Self::load_books_for_collection),
    /// an unreadable document is an error, so saving the changed collection
    /// cannot overwrite books that failed to load.
    pub fn load_books_for_update(&self, name: &str) -> Result<Collection> {
        let books = self
            .store
            .read_books(name)
            .with_context(|| {
                format!(
                    "Collection '{}' cannot be read, fix or remove its document first",
                    name
                )
            })?
            .unwrap_or_default();
        Ok(Collection::with_books(name, books))
    }

    /// Overwrites a collection's document with its current books
    pub fn save_books_for_collection(&self, collection: &Collection) -> Result<()> {
        self.store
            .write_books(collection.name(), collection.books())
            .with_context(|| format!("Failed to save collection '{}'", collection.name()))?;
        debug!(collection = collection.name(), count = collection.len(), "Saved collection");
        Ok(())
    }

    /// Renames a collection and its document
    ///
    /// The index keeps the collection's position. If the manifest cannot be
    /// written, the document is moved back and the index restored.
    pub fn rename_selected_collection(&mut self, old: &str, new: &str) -> Result<()> {
        let position = self
            .position(old)
            .ok_or_else(|| CollectionError::NotFound(old.to_string()))?;

        if self.contains(new) || self.store.contains(new) || self.is_manifest_name(new) {
            return Err(CollectionError::AlreadyExists(new.to_string()));
        }

        let moved = self.store.contains(old);
        if moved {
            self.store
                .rename(old, new)
                .with_context(|| format!("Failed to rename collection '{}'", old))?;
        }

        self.names[position] = new.to_string();
        if let Err(e) = self.store.write_manifest(&self.manifest, &self.names) {
            self.names[position] = old.to_string();
            if moved {
                if let Err(rollback) = self.store.rename(new, old) {
                    error!(
                        from = new,
                        to = old,
                        "Failed to move document back after rename error: {:#}",
                        rollback
                    );
                }
            }
            return Err(e
                .context(format!("Failed to rename collection '{}'", old))
                .into());
        }

        info!(from = old, to = new, "Collection renamed");
        Ok(())
    }

    /// Deletes a collection and its document
    ///
    /// The document may already be gone. If it exists but cannot be
    /// removed, the manifest is restored.
    pub fn delete_selected_collection(&mut self, name: &str) -> Result<()> {
        let position = self
            .position(name)
            .ok_or_else(|| CollectionError::NotFound(name.to_string()))?;

        let mut remaining = self.names.clone();
        remaining.remove(position);

        self.store
            .write_manifest(&self.manifest, &remaining)
            .with_context(|| format!("Failed to delete collection '{}'", name))?;

        match self.store.remove(name) {
            Ok(true) => {}
            Ok(false) => debug!(collection = name, "Collection had no document"),
            Err(e) => {
                if let Err(restore) = self.store.write_manifest(&self.manifest, &self.names) {
                    error!(collection = name, "Failed to restore manifest: {:#}", restore);
                }
                return Err(e
                    .context(format!("Failed to delete collection '{}'", name))
                    .into());
            }
        }

        self.names = remaining;
        info!(collection = name, "Collection deleted");
        Ok(())
    }

    /// Lists documents in the store that have no index entry
    pub fn unregistered_documents(&self) -> Result<Vec<String>> {
        let manifest_stem = self.manifest_stem();

        Ok(self
            .store
            .list()?
            .into_iter()
            .filter(|name| name != manifest_stem && !self.contains(name))
            .collect())
    }

    /// Appends the books of a YAML or XLSX document to a registered collection
    ///
    /// Nothing is saved unless the whole document reads cleanly. With
    /// [`DuplicatePolicy::Skip`], books matching an existing one (including
    /// one imported earlier from the same document) are dropped and reported
    /// to the notifier.
    pub fn import_books(
        &self,
        path: &Path,
        name: &str,
        policy: DuplicatePolicy,
        notifier: Option<&dyn Notifier>,
    ) -> Result<ImportSummary> {
        if !self.contains(name) {
            return Err(CollectionError::NotFound(name.to_string()));
        }
        if !path.is_file() {
            return Err(CollectionError::MissingFile(path.to_path_buf()));
        }
        let format = DocumentFormat::from_path(path)
            .ok_or_else(|| CollectionError::UnsupportedFormat(path.to_path_buf()))?;

        let incoming = format
            .read(path)
            .with_context(|| format!("Failed to import {}", path.display()))?;

        let mut collection = self.load_books_for_update(name)?;
        let mut imported = 0;
        let mut skipped = 0;

        for book in incoming {
            match policy {
                DuplicatePolicy::Skip => {
                    if collection.add_book(book, notifier) {
                        imported += 1;
                    } else {
                        skipped += 1;
                    }
                }
                DuplicatePolicy::Allow => {
                    collection.push_unchecked(book);
                    imported += 1;
                }
            }
        }

        self.save_books_for_collection(&collection)?;
        info!(
            collection = name,
            path = %path.display(),
            imported,
            skipped,
            "Import finished"
        );

        Ok(ImportSummary {
            collection: name.to_string(),
            format: format.as_str(),
            imported,
            skipped,
        })
    }

    /// Writes the named collections into one YAML or XLSX document
    ///
    /// YAML gets one section per collection, XLSX one sheet per collection.
    pub fn export_collections(&self, path: &Path, names: &[String]) -> Result<ExportSummary> {
        let format = DocumentFormat::from_path(path)
            .ok_or_else(|| CollectionError::UnsupportedFormat(path.to_path_buf()))?;

        if let Some(missing) = names.iter().find(|name| !self.contains(name)) {
            return Err(CollectionError::NotFound(missing.clone()));
        }

        let sections: Vec<(String, Vec<Book>)> = names
            .iter()
            .map(|name| {
                let collection = self.load_books_for_collection(name);
                (name.clone(), collection.books().to_vec())
            })
            .collect();
        let books = sections.iter().map(|(_, books)| books.len()).sum();

        format
            .write(path, &sections)
            .with_context(|| format!("Failed to export to {}", path.display()))?;

        info!(path = %path.display(), collections = sections.len(), books, "Export finished");

        Ok(ExportSummary {
            path: path.to_path_buf(),
            format: format.as_str(),
            collections: sections.len(),
            books,
        })
    }
}
