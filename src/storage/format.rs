//! Import/export document formats

use std::path::Path;

use anyhow::Result;

use super::{xlsx, yaml};
use crate::domain::Book;

/// File format of an import or export document, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Xlsx,
}

impl DocumentFormat {
    /// Detects the format from a file extension (`.yaml`, `.yml`, `.xlsx`)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(DocumentFormat::Yaml),
            "xlsx" => Some(DocumentFormat::Xlsx),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Yaml => "yaml",
            DocumentFormat::Xlsx => "xlsx",
        }
    }

    /// Reads every book contained in a document
    pub fn read(&self, path: &Path) -> Result<Vec<Book>> {
        match self {
            DocumentFormat::Yaml => yaml::read_import(path),
            DocumentFormat::Xlsx => xlsx::read_workbook(path),
        }
    }

    /// Writes named collections into a single document
    pub fn write(&self, path: &Path, sections: &[(String, Vec<Book>)]) -> Result<()> {
        match self {
            DocumentFormat::Yaml => yaml::write_export(path, sections),
            DocumentFormat::Xlsx => xlsx::write_workbook(path, sections),
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_by_extension() {
        assert_eq!(DocumentFormat::from_path(Path::new("a.yaml")), Some(DocumentFormat::Yaml));
        assert_eq!(DocumentFormat::from_path(Path::new("a.YML")), Some(DocumentFormat::Yaml));
        assert_eq!(DocumentFormat::from_path(Path::new("dir/a.xlsx")), Some(DocumentFormat::Xlsx));
        assert_eq!(DocumentFormat::from_path(Path::new("a.csv")), None);
        assert_eq!(DocumentFormat::from_path(Path::new("noext")), None);
    }
}
