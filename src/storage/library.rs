//! Library management
//!
//! A library is one user's root directory: the manifest, one document per
//! collection and an optional `config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::config::LibraryConfig;
use super::manager::CollectionManager;
use super::store::DirectoryStore;

/// A library root with its configuration
pub struct Library {
    root: PathBuf,
    config: LibraryConfig,
}

impl Library {
    /// Opens the library at the given root, creating the directory if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create library directory: {}", root.display()))?;

        let config = LibraryConfig::load(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the library and makes sure the default collection exists
    /// when no collection is registered yet
    pub fn init(root: impl Into<PathBuf>) -> Result<(Self, CollectionManager)> {
        let library = Self::open(root)?;
        let mut manager = library.manager()?;

        if manager.ensure_collection(&library.config.default_collection)? {
            tracing::info!(
                root = %library.root.display(),
                collection = %library.config.default_collection,
                "Initialized library"
            );
        }

        Ok((library, manager))
    }

    /// Returns the library root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the configuration
    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    /// Returns the collection store
    pub fn store(&self) -> DirectoryStore {
        DirectoryStore::new(&self.root)
    }

    /// Opens a collection manager with the index loaded from the manifest
    pub fn manager(&self) -> Result<CollectionManager> {
        let manager = CollectionManager::open(self.store(), self.config.manifest.as_str())
            .with_context(|| format!("Failed to open library: {}", self.root.display()))?;
        Ok(manager)
    }
}
