//! Collection domain model
//!
//! A collection is a named, ordered list of books. It never touches storage;
//! persistence goes through [`crate::storage::CollectionManager`].
//!
//! Duplicate rejections are reported to a [`Notifier`] passed by the caller.
//! Without one, the message is logged as a warning.

use tracing::warn;

use super::book::{titles_match, Book};

/// Receives user-facing messages raised by collection operations
pub trait Notifier {
    fn notify(&self, message: &str);
}

impl<F> Notifier for F
where
    F: Fn(&str),
{
    fn notify(&self, message: &str) {
        self(message)
    }
}

/// A named list of books
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Collection {
    name: String,
    books: Vec<Book>,
}

impl Collection {
    /// Creates an empty collection
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            books: Vec::new(),
        }
    }

    /// Creates a collection from already loaded books
    pub fn with_books(name: impl Into<String>, books: Vec<Book>) -> Self {
        Self {
            name: name.into(),
            books,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    /// Returns the book at a position
    pub fn get(&self, index: usize) -> Option<&Book> {
        self.books.get(index)
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Appends a book unless an equal (title, isbn) pair is already present
    ///
    /// Returns false and notifies `"Duplicate found: <title>"` on conflict.
    pub fn add_book(&mut self, book: Book, notifier: Option<&dyn Notifier>) -> bool {
        if let Some(existing) = self.find_duplicate(&book, None) {
            let message = format!("Duplicate found: {}", existing.title);
            self.notify(notifier, &message);
            return false;
        }

        self.books.push(book);
        true
    }

    /// Appends a book without the duplicate check
    pub fn push_unchecked(&mut self, book: Book) {
        self.books.push(book);
    }

    /// Replaces the book at `index`, rejecting edits that would collide with another book
    pub fn update_book(
        &mut self,
        index: usize,
        updated: Book,
        notifier: Option<&dyn Notifier>,
    ) -> bool {
        if index >= self.books.len() {
            self.notify(notifier, &format!("No book at position {}", index + 1));
            return false;
        }

        if let Some(existing) = self.find_duplicate(&updated, Some(index)) {
            let message = format!("Duplicate found: {}", existing.title);
            self.notify(notifier, &message);
            return false;
        }

        self.books[index] = updated;
        true
    }

    /// Removes every book with the given title (case-insensitive)
    ///
    /// Returns how many books were removed.
    pub fn remove_book(&mut self, title: &str) -> usize {
        let before = self.books.len();
        self.books.retain(|book| !titles_match(&book.title, title));
        before - self.books.len()
    }

    /// Finds books whose title, author names, year, ISBN or genre contain the keyword
    pub fn search(&self, keyword: &str) -> Vec<&Book> {
        let keyword = keyword.to_lowercase();
        self.books
            .iter()
            .filter(|book| book.contains_keyword(&keyword))
            .collect()
    }

    /// True when a book with the same title (ignoring case) and ISBN exists
    pub fn is_duplicate(&self, candidate: &Book) -> bool {
        self.find_duplicate(candidate, None).is_some()
    }

    /// Like [`Collection::is_duplicate`], ignoring the book at `index`
    ///
    /// Used when validating an edit so the edited book does not match itself.
    pub fn is_duplicate_except(&self, index: usize, candidate: &Book) -> bool {
        self.find_duplicate(candidate, Some(index)).is_some()
    }

    fn find_duplicate(&self, candidate: &Book, skip: Option<usize>) -> Option<&Book> {
        self.books
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != skip)
            .map(|(_, book)| book)
            .find(|book| book.matches(candidate))
    }

    fn notify(&self, notifier: Option<&dyn Notifier>, message: &str) {
        match notifier {
            Some(notifier) => notifier.notify(message),
            None => warn!(collection = %self.name, "{}", message),
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
