//! Domain models for Bookshelf
//!
//! Contains the core business logic without any I/O concerns.

mod book;
mod collection;
mod validate;

pub use book::{titles_match, Book, Rating};
pub use collection::{Collection, Notifier};
pub use validate::{
    validate_collection_name, validate_publication_year, ValidationError, MIN_PUBLICATION_YEAR,
};
