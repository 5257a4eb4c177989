//! Spreadsheet import/export
//!
//! One row per book below a header row, with a fixed column order. Year and
//! ISBN are numeric cells and the read flag is a boolean cell, so the values
//! read back with their types intact.

use std::path::Path;

use anyhow::{bail, Context, Result};
use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::domain::{Book, Rating};

/// Header row, in column order
pub const HEADERS: [&str; 9] = [
    "Title",
    "First Name",
    "Last Name",
    "Genre",
    "Year",
    "ISBN",
    "Read",
    "Rating",
    "Comment",
];

const COL_TITLE: usize = 0;
const COL_FIRST_NAME: usize = 1;
const COL_LAST_NAME: usize = 2;
const COL_GENRE: usize = 3;
const COL_YEAR: usize = 4;
const COL_ISBN: usize = 5;
const COL_READ: usize = 6;
const COL_RATING: usize = 7;
const COL_COMMENT: usize = 8;

/// Longest sheet name Excel accepts
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Largest ISBN a numeric cell holds exactly (2^53)
pub const MAX_EXACT_ISBN: u64 = 1 << 53;

static EMPTY_CELL: Data = Data::Empty;

/// Writes a workbook with one sheet per collection
///
/// Sheet names are derived from the collection names, see [`sheet_names`].
pub fn write_workbook(path: &Path, sheets: &[(String, Vec<Book>)]) -> Result<()> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let names = sheet_names(sheets.iter().map(|(name, _)| name.as_str()));

    for ((collection, books), sheet_name) in sheets.iter().zip(&names) {
        let sheet = workbook.add_worksheet();
        sheet
            .set_name(sheet_name)
            .with_context(|| format!("Invalid sheet name: {}", sheet_name))?;
        write_sheet(sheet, books, &header_format)
            .with_context(|| format!("Failed to write collection: {}", collection))?;
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to write workbook: {}", path.display()))
}

/// Maps collection names to valid, distinct sheet names
///
/// Names are cut to 31 characters and characters Excel forbids become `_`.
/// Sheet names compare case-insensitively, so a clash gets a ` (n)` suffix.
pub fn sheet_names<'a>(collections: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    // Excel reserves "History" for its own use
    let mut used: Vec<String> = vec!["history".to_string()];
    let mut names = Vec::new();

    for collection in collections {
        let cleaned: String = collection
            .chars()
            .map(|c| match c {
                '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
                c => c,
            })
            .collect();
        let cleaned = cleaned.trim_matches('\'').trim();
        let base = if cleaned.is_empty() { "Sheet" } else { cleaned };

        let mut candidate = truncate(base, MAX_SHEET_NAME_LEN);
        let mut n = 2;
        while used.contains(&candidate.to_lowercase()) {
            let suffix = format!(" ({})", n);
            candidate = format!(
                "{}{}",
                truncate(base, MAX_SHEET_NAME_LEN - suffix.chars().count()).trim_end(),
                suffix
            );
            n += 1;
        }

        used.push(candidate.to_lowercase());
        names.push(candidate);
    }

    names
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

fn write_sheet(sheet: &mut Worksheet, books: &[Book], header_format: &Format) -> Result<()> {
    for (col, header) in HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, header_format)?;
    }

    for (i, book) in books.iter().enumerate() {
        if book.isbn > MAX_EXACT_ISBN {
            bail!(
                "ISBN {} of '{}' is too large for a spreadsheet cell (max {})",
                book.isbn,
                book.title,
                MAX_EXACT_ISBN
            );
        }

        let row = (i + 1) as u32;
        sheet.write_string(row, COL_TITLE as u16, &book.title)?;
        sheet.write_string(row, COL_FIRST_NAME as u16, &book.first_name)?;
        sheet.write_string(row, COL_LAST_NAME as u16, &book.last_name)?;
        sheet.write_string(row, COL_GENRE as u16, &book.genre)?;
        sheet.write_number(row, COL_YEAR as u16, book.publication_year as f64)?;
        sheet.write_number(row, COL_ISBN as u16, book.isbn as f64)?;
        sheet.write_boolean(row, COL_READ as u16, book.read)?;
        sheet.write_string(row, COL_RATING as u16, book.rating.as_str())?;
        sheet.write_string(row, COL_COMMENT as u16, &book.comment)?;
    }

    sheet.autofit();
    Ok(())
}

/// Reads books from every sheet of a workbook
///
/// The first row of each sheet is a header. Blank rows are skipped; any
/// other row with a cell of the wrong type fails the whole read.
pub fn read_workbook(path: &Path) -> Result<Vec<Book>> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("Failed to open workbook: {}", path.display()))?;

    let mut books = Vec::new();

    for sheet_name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&sheet_name)
            .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

        for (i, row) in range.rows().enumerate().skip(1) {
            if row.iter().all(is_blank) {
                continue;
            }

            let book = parse_row(row)
                .with_context(|| format!("Sheet '{}', row {}", sheet_name, i + 1))?;
            books.push(book);
        }
    }

    Ok(books)
}

fn parse_row(row: &[Data]) -> Result<Book> {
    let cell = |col: usize| row.get(col).unwrap_or(&EMPTY_CELL);

    let year = number_cell(cell(COL_YEAR), "Year")?;
    let isbn = number_cell(cell(COL_ISBN), "ISBN")?;

    if year < i32::MIN as f64 || year > i32::MAX as f64 {
        bail!("Year out of range: {}", year);
    }
    if isbn < 0.0 {
        bail!("ISBN must not be negative: {}", isbn);
    }
    if isbn > MAX_EXACT_ISBN as f64 {
        bail!("ISBN {} is too large to be read exactly", isbn);
    }

    let rating = Rating::from_persisted(&string_cell(cell(COL_RATING), "Rating")?)
        .map_err(anyhow::Error::msg)?;

    Ok(Book {
        title: string_cell(cell(COL_TITLE), "Title")?,
        first_name: string_cell(cell(COL_FIRST_NAME), "First Name")?,
        last_name: string_cell(cell(COL_LAST_NAME), "Last Name")?,
        genre: string_cell(cell(COL_GENRE), "Genre")?,
        publication_year: year as i32,
        isbn: isbn as u64,
        read: bool_cell(cell(COL_READ), "Read")?,
        rating,
        comment: string_cell(cell(COL_COMMENT), "Comment")?,
    })
}

fn is_blank(data: &Data) -> bool {
    match data {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn string_cell(data: &Data, column: &str) -> Result<String> {
    match data {
        Data::String(s) => Ok(s.clone()),
        Data::Empty => Ok(String::new()),
        other => bail!("Column '{}' must be text, found {:?}", column, other),
    }
}

fn number_cell(data: &Data, column: &str) -> Result<f64> {
    match data {
        Data::Float(f) => Ok(f.trunc()),
        Data::Int(i) => Ok(*i as f64),
        other => bail!("Column '{}' must be a number, found {:?}", column, other),
    }
}

fn bool_cell(data: &Data, column: &str) -> Result<bool> {
    match data {
        Data::Bool(b) => Ok(*b),
        Data::Empty => Ok(false),
        other => bail!("Column '{}' must be a boolean, found {:?}", column, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn books() -> Vec<Book> {
        let mut dune = Book::new("Dune", "Frank", "Herbert", "Science Fiction", 1965, 9780441172719);
        dune.read = true;
        dune.rating = Rating::Three;
        dune.comment = "Spice".to_string();

        vec![dune, Book::new("Emma", "Jane", "Austen", "", 1815, 9780141439587)]
    }

    #[test]
    fn write_then_read_keeps_types() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("books.xlsx");

        write_workbook(&path, &[("fiction".to_string(), books())]).unwrap();
        let loaded = read_workbook(&path).unwrap();

        assert_eq!(loaded, books());
    }

    #[test]
    fn cells_have_expected_types() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("books.xlsx");
        write_workbook(&path, &[("fiction".to_string(), books())]).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        let range = workbook.worksheet_range("fiction").unwrap();
        let rows: Vec<_> = range.rows().collect();

        assert_eq!(rows[0][COL_TITLE], Data::String("Title".to_string()));
        assert_eq!(rows[0][COL_COMMENT], Data::String("Comment".to_string()));
        assert!(matches!(rows[1][COL_YEAR], Data::Float(_) | Data::Int(_)));
        assert!(matches!(rows[1][COL_ISBN], Data::Float(_) | Data::Int(_)));
        assert_eq!(rows[1][COL_READ], Data::Bool(true));
    }

    #[test]
    fn one_sheet_per_collection() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("all.xlsx");
        let all = books();

        write_workbook(
            &path,
            &[
                ("first".to_string(), vec![all[0].clone()]),
                ("second".to_string(), vec![all[1].clone()]),
            ],
        )
        .unwrap();

        let workbook: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["first".to_string(), "second".to_string()]);
        assert_eq!(read_workbook(&path).unwrap(), all);
    }

    #[test]
    fn text_in_numeric_column_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, header) in HEADERS.iter().enumerate() {
            sheet.write_string(0, col as u16, *header).unwrap();
        }
        sheet.write_string(1, COL_TITLE as u16, "Dune").unwrap();
        sheet.write_string(1, COL_YEAR as u16, "nineteen sixty-five").unwrap();
        sheet.write_number(1, COL_ISBN as u16, 1.0).unwrap();
        workbook.save(&path).unwrap();

        let err = read_workbook(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Year"));
    }

    #[test]
    fn sheet_names_are_shortened_and_distinct() {
        let names = sheet_names([
            "Science Fiction and Fantasy Shelf",
            "Fiction",
            "fiction",
            "FICTION",
            "History",
        ]);

        assert_eq!(names[0], "Science Fiction and Fantasy She");
        assert_eq!(names[1], "Fiction");
        assert_eq!(names[2], "fiction (2)");
        assert_eq!(names[3], "FICTION (3)");
        assert_eq!(names[4], "History (2)");
        assert!(names.iter().all(|n| n.chars().count() <= MAX_SHEET_NAME_LEN));
    }

    #[test]
    fn clash_suffix_fits_the_length_limit() {
        let long = "a".repeat(40);
        let names = sheet_names([long.as_str(), long.as_str()]);

        assert_eq!(names[0].len(), MAX_SHEET_NAME_LEN);
        assert_eq!(names[1], format!("{} (2)", "a".repeat(27)));
    }

    #[test]
    fn long_and_case_clashing_collections_export() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("all.xlsx");
        let all = books();

        write_workbook(
            &path,
            &[
                ("Science Fiction and Fantasy Shelf".to_string(), vec![all[0].clone()]),
                ("Fiction".to_string(), vec![all[1].clone()]),
                ("fiction".to_string(), vec![]),
            ],
        )
        .unwrap();

        let workbook: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(workbook.sheet_names().len(), 3);
        assert_eq!(read_workbook(&path).unwrap(), all);
    }

    #[test]
    fn isbn_beyond_exact_range_is_refused() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.xlsx");

        let mut book = books().remove(0);
        book.isbn = MAX_EXACT_ISBN + 1;
        let err = write_workbook(&path, &[("big".to_string(), vec![book.clone()])]).unwrap_err();
        assert!(format!("{:#}", err).contains("too large"));
        assert!(!path.exists());

        book.isbn = MAX_EXACT_ISBN;
        write_workbook(&path, &[("big".to_string(), vec![book.clone()])]).unwrap();
        assert_eq!(read_workbook(&path).unwrap(), vec![book]);
    }

    #[test]
    fn lenient_rating_aliases_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("alias.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, header) in HEADERS.iter().enumerate() {
            sheet.write_string(0, col as u16, *header).unwrap();
        }
        sheet.write_string(1, COL_TITLE as u16, "Dune").unwrap();
        sheet.write_number(1, COL_YEAR as u16, 1965.0).unwrap();
        sheet.write_number(1, COL_ISBN as u16, 1.0).unwrap();
        sheet.write_string(1, COL_RATING as u16, "none").unwrap();
        workbook.save(&path).unwrap();

        let err = read_workbook(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Unknown rating"));
    }

    #[test]
    fn missing_workbook_fails() {
        let dir = TempDir::new().unwrap();
        assert!(read_workbook(&dir.path().join("missing.xlsx")).is_err());
    }
}
