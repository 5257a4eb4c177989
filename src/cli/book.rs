//! Book CLI commands

use std::path::Path;

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use super::output::Output;
use crate::domain::{validate_publication_year, Book, Collection, Rating};
use crate::storage::{CollectionError, CollectionManager, Library};

#[derive(Subcommand)]
pub enum BookCommands {
    /// Add a book to a collection
    ///
    /// Examples:
    ///   bookshelf book add --title Dune --first-name Frank --last-name Herbert \
    ///       --year 1965 --isbn 9780441172719
    ///   bookshelf book add -c to-read --title Emma --first-name Jane \
    ///       --last-name Austen --year 1815 --isbn 9780141439587 --rating 3
    Add {
        /// Collection (defaults to the library's default collection)
        #[arg(long, short)]
        collection: Option<String>,

        #[command(flatten)]
        book: NewBook,
    },

    /// List the books of a collection
    List {
        /// Collection (defaults to the library's default collection)
        #[arg(long, short)]
        collection: Option<String>,
    },

    /// Search title, author, year, ISBN and genre (case-insensitive)
    Search {
        /// Keyword (empty matches every book)
        keyword: String,

        /// Collection (defaults to the library's default collection)
        #[arg(long, short)]
        collection: Option<String>,
    },

    /// Show a book's details
    Show {
        /// Position in the collection (1-based, as shown by `book list`)
        position: usize,

        /// Collection (defaults to the library's default collection)
        #[arg(long, short)]
        collection: Option<String>,
    },

    /// Change fields of a book
    Edit {
        /// Position in the collection (1-based, as shown by `book list`)
        position: usize,

        /// Collection (defaults to the library's default collection)
        #[arg(long, short)]
        collection: Option<String>,

        #[command(flatten)]
        changes: BookChanges,
    },

    /// Remove every book with the given title (case-insensitive)
    Remove {
        /// Title of the book
        title: String,

        /// Collection (defaults to the library's default collection)
        #[arg(long, short)]
        collection: Option<String>,
    },
}

/// Fields of a new book
#[derive(Args)]
pub struct NewBook {
    #[arg(long)]
    title: String,

    #[arg(long)]
    first_name: String,

    #[arg(long)]
    last_name: String,

    #[arg(long, default_value = "")]
    genre: String,

    /// Publication year
    #[arg(long)]
    year: i32,

    #[arg(long)]
    isbn: u64,

    /// Mark the book as read
    #[arg(long)]
    read: bool,

    /// Rating: 1, 2, 3 or none
    #[arg(long, default_value = "none")]
    rating: Rating,

    #[arg(long, default_value = "")]
    comment: String,
}

/// Fields to change on an existing book
#[derive(Args)]
pub struct BookChanges {
    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    first_name: Option<String>,

    #[arg(long)]
    last_name: Option<String>,

    #[arg(long)]
    genre: Option<String>,

    /// Publication year
    #[arg(long)]
    year: Option<i32>,

    #[arg(long)]
    isbn: Option<u64>,

    /// Read status (true or false)
    #[arg(long)]
    read: Option<bool>,

    /// Rating: 1, 2, 3 or none
    #[arg(long)]
    rating: Option<Rating>,

    #[arg(long)]
    comment: Option<String>,
}

impl NewBook {
    fn into_book(self) -> Result<Book> {
        if self.title.trim().is_empty() {
            bail!("Title cannot be empty");
        }
        validate_publication_year(self.year)?;

        let mut book = Book::new(
            self.title,
            self.first_name,
            self.last_name,
            self.genre,
            self.year,
            self.isbn,
        );
        book.read = self.read;
        book.rating = self.rating;
        book.comment = self.comment;
        Ok(book)
    }
}

impl BookChanges {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.genre.is_none()
            && self.year.is_none()
            && self.isbn.is_none()
            && self.read.is_none()
            && self.rating.is_none()
            && self.comment.is_none()
    }

    fn apply(self, book: &mut Book) -> Result<()> {
        if let Some(title) = self.title {
            if title.trim().is_empty() {
                bail!("Title cannot be empty");
            }
            book.title = title;
        }
        if let Some(year) = self.year {
            book.publication_year = validate_publication_year(year)?;
        }
        if let Some(first_name) = self.first_name {
            book.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            book.last_name = last_name;
        }
        if let Some(genre) = self.genre {
            book.genre = genre;
        }
        if let Some(isbn) = self.isbn {
            book.isbn = isbn;
        }
        if let Some(read) = self.read {
            book.read = read;
        }
        if let Some(rating) = self.rating {
            book.rating = rating;
        }
        if let Some(comment) = self.comment {
            book.comment = comment;
        }
        Ok(())
    }
}

pub fn run(cmd: BookCommands, root: &Path, output: &Output) -> Result<()> {
    match cmd {
        BookCommands::Add { collection, book } => add_book(output, root, collection, book),
        BookCommands::List { collection } => list_books(output, root, collection),
        BookCommands::Search {
            keyword,
            collection,
        } => search_books(output, root, collection, &keyword),
        BookCommands::Show {
            position,
            collection,
        } => show_book(output, root, collection, position),
        BookCommands::Edit {
            position,
            collection,
            changes,
        } => edit_book(output, root, collection, position, changes),
        BookCommands::Remove { title, collection } => {
            remove_book(output, root, collection, &title)
        }
    }
}

/// How a command uses the collection it opens
#[derive(Clone, Copy, PartialEq, Eq)]
enum Access {
    Read,
    Update,
}

/// Opens the library and loads the requested (or default) collection
///
/// For updates an unreadable document is an error instead of an empty
/// collection, so it is never overwritten.
fn open_collection(
    root: &Path,
    collection: Option<String>,
    access: Access,
) -> Result<(CollectionManager, Collection)> {
    let (library, manager) = Library::init(root)?;
    let name = collection.unwrap_or_else(|| library.config().default_collection.clone());

    if !manager.contains(&name) {
        return Err(CollectionError::NotFound(name).into());
    }

    let collection = match access {
        Access::Read => manager.load_books_for_collection(&name),
        Access::Update => manager.load_books_for_update(&name)?,
    };
    Ok((manager, collection))
}

/// Converts a 1-based position to an index
fn index_of(collection: &Collection, position: usize) -> Result<usize> {
    if position == 0 || position > collection.len() {
        bail!(
            "No book at position {} in '{}' ({} books)",
            position,
            collection.name(),
            collection.len()
        );
    }
    Ok(position - 1)
}

fn book_json(position: usize, book: &Book) -> serde_json::Value {
    serde_json::json!({
        "position": position,
        "title": book.title,
        "first_name": book.first_name,
        "last_name": book.last_name,
        "genre": book.genre,
        "publication_year": book.publication_year,
        "isbn": book.isbn,
        "read": book.read,
        "rating": book.rating.as_str(),
        "comment": book.comment,
    })
}

fn print_table(rows: &[(usize, &Book)]) {
    println!(
        "{:>4}  {:<32} {:<24} {:>6} {:<14} {:<5} RATING",
        "#", "TITLE", "AUTHOR", "YEAR", "ISBN", "READ"
    );
    println!("{}", "-".repeat(98));

    for (position, book) in rows {
        println!(
            "{:>4}  {:<32} {:<24} {:>6} {:<14} {:<5} {}",
            position,
            book.title,
            book.author(),
            book.publication_year,
            book.isbn,
            if book.read { "yes" } else { "no" },
            book.rating
        );
    }
}

fn add_book(output: &Output, root: &Path, collection: Option<String>, new: NewBook) -> Result<()> {
    let book = new.into_book()?;
    let (manager, mut collection) = open_collection(root, collection, Access::Update)?;

    let notifier = |message: &str| output.warning(message);
    if !collection.add_book(book.clone(), Some(&notifier)) {
        bail!("Book not added to '{}'", collection.name());
    }
    manager.save_books_for_collection(&collection)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "collection": collection.name(),
            "book": book_json(collection.len(), &book),
        }));
    } else {
        output.success(&format!(
            "Added to {}: {} by {}",
            collection.name(),
            book.title,
            book.author()
        ));
    }

    Ok(())
}

fn list_books(output: &Output, root: &Path, collection: Option<String>) -> Result<()> {
    let (_, collection) = open_collection(root, collection, Access::Read)?;
    let rows: Vec<(usize, &Book)> = collection
        .books()
        .iter()
        .enumerate()
        .map(|(i, book)| (i + 1, book))
        .collect();

    if output.is_json() {
        let items: Vec<_> = rows.iter().map(|(p, b)| book_json(*p, b)).collect();
        output.data(&serde_json::json!({
            "collection": collection.name(),
            "books": items,
        }));
    } else if rows.is_empty() {
        println!("No books in {}", collection.name());
    } else {
        print_table(&rows);
    }

    Ok(())
}

fn search_books(
    output: &Output,
    root: &Path,
    collection: Option<String>,
    keyword: &str,
) -> Result<()> {
    let (_, collection) = open_collection(root, collection, Access::Read)?;
    let hits = collection.search(keyword);

    let rows: Vec<(usize, &Book)> = hits
        .into_iter()
        .filter_map(|hit| {
            collection
                .books()
                .iter()
                .position(|book| std::ptr::eq(book, hit))
                .map(|i| (i + 1, hit))
        })
        .collect();

    output.verbose_ctx(
        "search",
        &format!("'{}' matched {} of {} books", keyword, rows.len(), collection.len()),
    );

    if output.is_json() {
        let items: Vec<_> = rows.iter().map(|(p, b)| book_json(*p, b)).collect();
        output.data(&serde_json::json!({
            "collection": collection.name(),
            "keyword": keyword,
            "books": items,
        }));
    } else if rows.is_empty() {
        println!("No books matching '{}' in {}", keyword, collection.name());
    } else {
        print_table(&rows);
    }

    Ok(())
}

fn show_book(output: &Output, root: &Path, collection: Option<String>, position: usize) -> Result<()> {
    let (_, collection) = open_collection(root, collection, Access::Read)?;
    let index = index_of(&collection, position)?;
    let book = &collection.books()[index];

    if output.is_json() {
        output.data(&book_json(position, book));
        return Ok(());
    }

    println!("{:<12} {}", "Title:", book.title);
    println!("{:<12} {}", "Author:", book.author());
    if !book.genre.is_empty() {
        println!("{:<12} {}", "Genre:", book.genre);
    }
    println!("{:<12} {}", "Year:", book.publication_year);
    println!("{:<12} {}", "ISBN:", book.isbn);
    println!("{:<12} {}", "Read:", if book.read { "yes" } else { "no" });
    if book.rating != Rating::Unrated {
        println!("{:<12} {}", "Rating:", book.rating);
    }
    if !book.comment.is_empty() {
        println!();
        println!("{}", book.comment);
    }

    Ok(())
}

fn edit_book(
    output: &Output,
    root: &Path,
    collection: Option<String>,
    position: usize,
    changes: BookChanges,
) -> Result<()> {
    if changes.is_empty() {
        bail!("Nothing to change. Pass at least one field, e.g. --title or --rating");
    }

    let (manager, mut collection) = open_collection(root, collection, Access::Update)?;
    let index = index_of(&collection, position)?;

    let mut updated = collection.books()[index].clone();
    changes.apply(&mut updated)?;

    let notifier = |message: &str| output.warning(message);
    if !collection.update_book(index, updated.clone(), Some(&notifier)) {
        bail!("Book at position {} was not changed", position);
    }
    manager.save_books_for_collection(&collection)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "collection": collection.name(),
            "book": book_json(position, &updated),
        }));
    } else {
        output.success(&format!("Updated {}: {}", collection.name(), updated));
    }

    Ok(())
}

fn remove_book(output: &Output, root: &Path, collection: Option<String>, title: &str) -> Result<()> {
    let (manager, mut collection) = open_collection(root, collection, Access::Update)?;

    let removed = collection.remove_book(title);
    if removed == 0 {
        bail!("No book titled '{}' in '{}'", title, collection.name());
    }
    manager.save_books_for_collection(&collection)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "collection": collection.name(),
            "title": title,
            "removed": removed,
        }));
    } else {
        output.success(&format!(
            "Removed {} book(s) titled '{}' from {}",
            removed,
            title,
            collection.name()
        ));
    }

    Ok(())
}
