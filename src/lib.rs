//! Bookshelf - A personal book collection manager
//!
//! Books are organized into named collections. Each collection is stored as
//! its own YAML document next to a manifest listing the collection names,
//! and collections can be imported from or exported to YAML and XLSX.

pub mod cli;
pub mod domain;
pub mod storage;

pub use domain::{Book, Collection, Notifier, Rating};
pub use storage::{CollectionError, CollectionManager, Library};
