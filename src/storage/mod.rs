//! # Storage Layer
//!
//! Persistence layer for Bookshelf with human-editable file formats.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Collection names | YAML (`collections: [...]`) | `<root>/collections.yaml` |
//! | Books | YAML (`books: [...]`) | `<root>/<collection>.yaml` |
//! | Config | TOML | `<root>/config.toml` |
//! | Import/export | YAML or XLSX | any path |
//!
//! ## Consistency
//!
//! - Every write is atomic (temp file + rename)
//! - [`CollectionManager`] undoes the first step of create, rename and
//!   delete if the second one fails
//! - No locking: the last writer wins
//!
//! ## Library Structure
//!
//! ```text
//! <data dir>/users/<user>/
//! ├── collections.yaml      # Ordered collection names
//! ├── default.yaml          # One document per collection
//! ├── fiction.yaml
//! └── config.toml           # Library configuration (optional)
//! ```
//!
//! ## Key Types
//!
//! - [`Library`] - Entry point for accessing a library root
//! - [`CollectionManager`] - Index of collections and their lifecycle
//! - [`CollectionStore`] - Document repository ([`DirectoryStore`] on disk)
//! - [`GlobalConfig`] / [`LibraryConfig`] - Configuration

mod config;
mod format;
mod library;
mod manager;
mod store;
mod xlsx;
pub mod yaml;

pub use config::{ConfigError, GlobalConfig, ImportConfig, LibraryConfig, OutputFormat};
pub use format::DocumentFormat;
pub use library::Library;
pub use manager::{
    CollectionError, CollectionManager, DuplicatePolicy, ExportSummary, ImportSummary,
    DEFAULT_MANIFEST,
};
pub use store::{CollectionStore, DirectoryStore, DOCUMENT_EXTENSION};
