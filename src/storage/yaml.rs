//! YAML document schema
//!
//! The on-disk shape is kept separate from [`Book`]: records use the
//! camelCase keys of existing collection files and every key is optional, so
//! older documents without `genre`, `read`, `rating` or `comment` still load.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::{Book, Rating};

/// One book as it appears in a YAML document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BookRecord {
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    pub genre: String,
    pub publication_year: i32,
    pub isbn: u64,
    pub read: bool,
    pub rating: String,
    pub comment: String,
}

impl From<&Book> for BookRecord {
    fn from(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            first_name: book.first_name.clone(),
            last_name: book.last_name.clone(),
            genre: book.genre.clone(),
            publication_year: book.publication_year,
            isbn: book.isbn,
            read: book.read,
            rating: book.rating.as_str().to_string(),
            comment: book.comment.clone(),
        }
    }
}

impl TryFrom<BookRecord> for Book {
    type Error = anyhow::Error;

    fn try_from(record: BookRecord) -> Result<Self> {
        let rating = Rating::from_persisted(&record.rating)
            .map_err(|e| anyhow::anyhow!("Book '{}': {}", record.title, e))?;

        Ok(Book {
            title: record.title,
            first_name: record.first_name,
            last_name: record.last_name,
            genre: record.genre,
            publication_year: record.publication_year,
            isbn: record.isbn,
            read: record.read,
            rating,
            comment: record.comment,
        })
    }
}

/// Per-collection document: `books: [...]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionDocument {
    #[serde(default)]
    pub books: Vec<BookRecord>,
}

/// Manifest document listing collection names: `collections: [...]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManifestDocument {
    #[serde(default)]
    pub collections: Vec<String>,
}

/// One section of an export document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSection {
    pub name: String,
    #[serde(default)]
    pub books: Vec<BookRecord>,
}

/// Export document: one section per collection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportDocument {
    #[serde(default)]
    pub collections: Vec<ExportSection>,
}

/// Any document shape accepted by import
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ImportDocument {
    Records(Vec<BookRecord>),
    Collection { books: Vec<BookRecord> },
    Export { collections: Vec<ExportSection> },
}

impl ImportDocument {
    fn into_records(self) -> Vec<BookRecord> {
        match self {
            ImportDocument::Records(records) => records,
            ImportDocument::Collection { books } => books,
            ImportDocument::Export { collections } => {
                collections.into_iter().flat_map(|s| s.books).collect()
            }
        }
    }
}

/// Maps books to their records
pub fn to_records(books: &[Book]) -> Vec<BookRecord> {
    books.iter().map(BookRecord::from).collect()
}

/// Maps records to books, failing on the first malformed record
pub fn from_records(records: Vec<BookRecord>) -> Result<Vec<Book>> {
    records
        .into_iter()
        .enumerate()
        .map(|(i, record)| {
            Book::try_from(record).with_context(|| format!("Invalid book record #{}", i + 1))
        })
        .collect()
}

/// Renders a collection document
pub fn encode_books(books: &[Book]) -> Result<String> {
    let document = CollectionDocument {
        books: to_records(books),
    };
    serde_yaml::to_string(&document).context("Failed to serialize books")
}

/// Parses a collection document
///
/// An empty file is an empty collection.
pub fn decode_books(content: &str) -> Result<Vec<Book>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let document: CollectionDocument =
        serde_yaml::from_str(content).context("Failed to parse collection document")?;
    from_records(document.books)
}

/// Renders the manifest
pub fn encode_manifest(names: &[String]) -> Result<String> {
    let document = ManifestDocument {
        collections: names.to_vec(),
    };
    serde_yaml::to_string(&document).context("Failed to serialize collection names")
}

/// Parses the manifest
pub fn decode_manifest(content: &str) -> Result<Vec<String>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let document: ManifestDocument =
        serde_yaml::from_str(content).context("Failed to parse collection manifest")?;
    Ok(document.collections)
}

/// Writes several collections into one export document
pub fn write_export(path: &Path, sections: &[(String, Vec<Book>)]) -> Result<()> {
    let document = ExportDocument {
        collections: sections
            .iter()
            .map(|(name, books)| ExportSection {
                name: name.clone(),
                books: to_records(books),
            })
            .collect(),
    };

    let content = serde_yaml::to_string(&document).context("Failed to serialize export")?;
    fs::write(path, content).with_context(|| format!("Failed to write export: {}", path.display()))
}

/// Reads books from any supported YAML shape
pub fn read_import(path: &Path) -> Result<Vec<Book>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read YAML file: {}", path.display()))?;

    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let document: ImportDocument = serde_yaml::from_str(&content)
        .with_context(|| format!("Unrecognized YAML book document: {}", path.display()))?;
    from_records(document.into_records())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn dune() -> Book {
        Book::new("Dune", "Frank", "Herbert", "Science Fiction", 1965, 9780441172719)
    }

    #[test]
    fn record_uses_camel_case_keys() {
        let yaml = encode_books(&[dune()]).unwrap();
        assert!(yaml.contains("firstName: Frank"));
        assert!(yaml.contains("publicationYear: 1965"));
        assert!(yaml.contains("isbn: 9780441172719"));
        assert!(yaml.starts_with("books:"));
    }

    #[test]
    fn missing_fields_default() {
        let yaml = r#"
books:
  - title: Emma
    firstName: Jane
    lastName: Austen
    publicationYear: 1815
    isbn: 9780141439587
"#;
        let books = decode_books(yaml).unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].genre, "");
        assert!(!books[0].read);
        assert_eq!(books[0].rating, Rating::Unrated);
        assert_eq!(books[0].comment, "");
    }

    #[test]
    fn unknown_rating_is_rejected() {
        let yaml = r#"
books:
  - title: Emma
    rating: "7"
"#;
        let err = decode_books(yaml).unwrap_err();
        assert!(format!("{:#}", err).contains("Unknown rating"));
    }

    #[test]
    fn input_aliases_are_not_valid_ratings_in_documents() {
        for rating in ["none", "unrated", " 2"] {
            let yaml = format!("books:\n  - title: Emma\n    rating: {:?}\n", rating);
            assert!(decode_books(&yaml).is_err(), "accepted rating {:?}", rating);
        }
    }

    #[test]
    fn empty_document_is_empty_collection() {
        assert!(decode_books("").unwrap().is_empty());
        assert!(decode_books("books: []\n").unwrap().is_empty());
        assert!(decode_manifest("\n").unwrap().is_empty());
    }

    #[test]
    fn malformed_document_fails() {
        assert!(decode_books("books: [unterminated").is_err());
        assert!(decode_books("books: 42").is_err());
    }

    #[test]
    fn manifest_round_trip() {
        let names = vec!["default".to_string(), "to read".to_string()];
        let yaml = encode_manifest(&names).unwrap();
        assert!(yaml.starts_with("collections:"));
        assert_eq!(decode_manifest(&yaml).unwrap(), names);
    }

    #[test]
    fn import_accepts_all_shapes() {
        let dir = TempDir::new().unwrap();

        let bare = dir.path().join("bare.yaml");
        fs::write(&bare, "- title: A\n  isbn: 1\n- title: B\n  isbn: 2\n").unwrap();
        assert_eq!(read_import(&bare).unwrap().len(), 2);

        let wrapped = dir.path().join("wrapped.yaml");
        fs::write(&wrapped, encode_books(&[dune()]).unwrap()).unwrap();
        assert_eq!(read_import(&wrapped).unwrap(), vec![dune()]);

        let export = dir.path().join("export.yaml");
        write_export(
            &export,
            &[
                ("one".to_string(), vec![dune()]),
                ("two".to_string(), vec![Book::new("Emma", "Jane", "Austen", "", 1815, 2)]),
            ],
        )
        .unwrap();
        let books = read_import(&export).unwrap();
        assert_eq!(books.len(), 2);
        assert_eq!(books[1].title, "Emma");
    }

    #[test]
    fn import_of_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        assert!(read_import(&dir.path().join("nope.yaml")).is_err());
    }

    #[test]
    fn import_of_unrelated_yaml_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("other.yaml");
        fs::write(&path, "name: not a book list\nversion: 3\n").unwrap();
        assert!(read_import(&path).is_err());
    }

    fn arb_rating() -> impl Strategy<Value = Rating> {
        prop_oneof![
            Just(Rating::Unrated),
            Just(Rating::One),
            Just(Rating::Two),
            Just(Rating::Three),
        ]
    }

    prop_compose! {
        fn arb_book()(
            title in "[A-Za-z0-9äöüßÄÖÜé :#'\"!?,.-]{0,24}",
            first_name in "[A-Za-z ]{0,12}",
            last_name in "[A-Za-z' -]{0,12}",
            genre in "[A-Za-z -]{0,12}",
            publication_year in 1000i32..2100,
            isbn in any::<u64>(),
            read in any::<bool>(),
            rating in arb_rating(),
            comment in "[A-Za-z0-9 :#'\"!?,.()-]{0,40}",
        ) -> Book {
            Book {
                title,
                first_name,
                last_name,
                genre,
                publication_year,
                isbn,
                read,
                rating,
                comment,
            }
        }
    }

    proptest! {
        #[test]
        fn books_survive_encode_decode(books in prop::collection::vec(arb_book(), 0..8)) {
            let yaml = encode_books(&books).unwrap();
            let decoded = decode_books(&yaml).unwrap();
            prop_assert_eq!(decoded, books);
        }
    }
}
