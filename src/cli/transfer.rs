//! Import and export commands

use std::path::Path;

use anyhow::Result;

use super::output::Output;
use crate::storage::{DuplicatePolicy, Library};

pub fn import(
    output: &Output,
    root: &Path,
    file: &Path,
    collection: Option<&str>,
    allow_duplicates: bool,
) -> Result<()> {
    let (library, manager) = Library::init(root)?;
    let name = collection.unwrap_or(&library.config().default_collection);

    let policy = if allow_duplicates {
        DuplicatePolicy::Allow
    } else {
        library.config().import.duplicate_policy
    };
    output.verbose_ctx("import", &format!("Duplicate policy: {:?}", policy));

    let notifier = |message: &str| output.warning(message);
    let summary = manager.import_books(file, name, policy, Some(&notifier))?;

    if output.is_json() {
        output.data(&summary);
    } else {
        let mut message = format!(
            "Imported {} book(s) into {} from {}",
            summary.imported,
            summary.collection,
            file.display()
        );
        if summary.skipped > 0 {
            message.push_str(&format!(" ({} duplicate(s) skipped)", summary.skipped));
        }
        output.success(&message);
    }

    Ok(())
}

pub fn export(output: &Output, root: &Path, file: &Path, collections: &[String]) -> Result<()> {
    let (_, manager) = Library::init(root)?;

    let names: Vec<String> = if collections.is_empty() {
        manager.collection_names().to_vec()
    } else {
        collections.to_vec()
    };

    let summary = manager.export_collections(file, &names)?;

    if output.is_json() {
        output.data(&summary);
    } else {
        output.success(&format!(
            "Exported {} book(s) from {} collection(s) to {}",
            summary.books,
            summary.collections,
            summary.path.display()
        ));
    }

    Ok(())
}
