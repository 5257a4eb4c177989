//! Book domain model
//!
//! A book is a plain record. The only notion of identity is the
//! (title, isbn) pair used for duplicate detection, see [`Book::matches`].

/// Personal rating of a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rating {
    /// No rating given yet
    #[default]
    Unrated,
    One,
    Two,
    Three,
}

impl Rating {
    /// Returns the persisted form ("", "1", "2" or "3")
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Unrated => "",
            Rating::One => "1",
            Rating::Two => "2",
            Rating::Three => "3",
        }
    }

    /// Parses the persisted form exactly, without the aliases accepted on input
    pub fn from_persisted(s: &str) -> Result<Self, String> {
        match s {
            "" => Ok(Rating::Unrated),
            "1" => Ok(Rating::One),
            "2" => Ok(Rating::Two),
            "3" => Ok(Rating::Three),
            _ => Err(format!("Unknown rating: {:?} (expected \"\", \"1\", \"2\" or \"3\")", s)),
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Rating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "none" | "unrated" => Ok(Rating::Unrated),
            "1" => Ok(Rating::One),
            "2" => Ok(Rating::Two),
            "3" => Ok(Rating::Three),
            _ => Err(format!("Unknown rating: {:?} (expected 1, 2, 3 or empty)", s)),
        }
    }
}

/// A single book record
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Book {
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    /// Empty when unknown
    pub genre: String,
    pub publication_year: i32,
    pub isbn: u64,
    pub read: bool,
    pub rating: Rating,
    pub comment: String,
}

impl Book {
    /// Creates an unread, unrated book without a comment
    pub fn new(
        title: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        genre: impl Into<String>,
        publication_year: i32,
        isbn: u64,
    ) -> Self {
        Self {
            title: title.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            genre: genre.into(),
            publication_year,
            isbn,
            read: false,
            rating: Rating::Unrated,
            comment: String::new(),
        }
    }

    /// Returns "first last", without stray spaces when a part is missing
    pub fn author(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// True when both books share a case-insensitive title and the same ISBN
    pub fn matches(&self, other: &Book) -> bool {
        self.isbn == other.isbn && titles_match(&self.title, &other.title)
    }

    /// True when the lowercase keyword occurs in any searchable field
    pub(crate) fn contains_keyword(&self, lower_keyword: &str) -> bool {
        self.title.to_lowercase().contains(lower_keyword)
            || self.first_name.to_lowercase().contains(lower_keyword)
            || self.last_name.to_lowercase().contains(lower_keyword)
            || self.publication_year.to_string().contains(lower_keyword)
            || self.isbn.to_string().contains(lower_keyword)
            || self.genre.to_lowercase().contains(lower_keyword)
    }
}

impl std::fmt::Display for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Title: {}, Author: {} {}, Genre: {}, Year: {}, ISBN: {}, Read: {}, Rating: {}, Comment: {}",
            self.title,
            self.first_name,
            self.last_name,
            self.genre,
            self.publication_year,
            self.isbn,
            self.read,
            self.rating,
            self.comment
        )
    }
}

/// Case-insensitive title comparison
pub fn titles_match(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}
