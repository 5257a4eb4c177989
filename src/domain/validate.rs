//! Input validation performed before the core is invoked
//!
//! Collection names double as document file names, so they are limited to a
//! conservative character set. Publication years must fall between 1000 and
//! the current year.

use chrono::{Datelike, Utc};
use thiserror::Error;

/// Earliest accepted publication year
pub const MIN_PUBLICATION_YEAR: i32 = 1000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Collection name cannot be empty")]
    EmptyName,

    #[error("Collection name '{0}' contains invalid characters (allowed: letters, digits, '-', '_', space)")]
    InvalidName(String),

    #[error("Publication year {year} must be between {min} and {max}")]
    InvalidYear { year: i32, min: i32, max: i32 },
}

/// Validates a collection name and returns it trimmed
pub fn validate_collection_name(name: &str) -> Result<&str, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }

    let valid = trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ' '));
    if !valid {
        return Err(ValidationError::InvalidName(trimmed.to_string()));
    }

    Ok(trimmed)
}

/// Validates a publication year against the current calendar year
pub fn validate_publication_year(year: i32) -> Result<i32, ValidationError> {
    let max = Utc::now().year();
    if (MIN_PUBLICATION_YEAR..=max).contains(&year) {
        Ok(year)
    } else {
        Err(ValidationError::InvalidYear {
            year,
            min: MIN_PUBLICATION_YEAR,
            max,
        })
    }
}
