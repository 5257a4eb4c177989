//! Collection CLI commands

use std::path::Path;

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use crate::domain::validate_collection_name;
use crate::storage::Library;

#[derive(Subcommand)]
pub enum CollectionCommands {
    /// List collections with their book counts
    List,

    /// Create an empty collection
    Add {
        /// Collection name (letters, digits, '-', '_', space)
        name: String,
    },

    /// Rename a collection
    Rename {
        /// Current name
        old: String,

        /// New name
        new: String,
    },

    /// Delete a collection and all of its books
    Delete {
        /// Collection name
        name: String,
    },
}

pub fn run(cmd: CollectionCommands, root: &Path, output: &Output) -> Result<()> {
    match cmd {
        CollectionCommands::List => list_collections(output, root),
        CollectionCommands::Add { name } => add_collection(output, root, &name),
        CollectionCommands::Rename { old, new } => rename_collection(output, root, &old, &new),
        CollectionCommands::Delete { name } => delete_collection(output, root, &name),
    }
}

fn list_collections(output: &Output, root: &Path) -> Result<()> {
    let (library, manager) = Library::init(root)?;
    let default = &library.config().default_collection;

    let rows: Vec<(String, usize)> = manager
        .collection_names()
        .iter()
        .map(|name| (name.clone(), manager.load_books_for_collection(name).len()))
        .collect();
    let unregistered = manager.unregistered_documents()?;

    if output.is_json() {
        let items: Vec<_> = rows
            .iter()
            .map(|(name, books)| {
                serde_json::json!({
                    "name": name,
                    "books": books,
                    "default": name == default,
                })
            })
            .collect();
        output.data(&serde_json::json!({
            "collections": items,
            "unregistered": unregistered,
        }));
        return Ok(());
    }

    if rows.is_empty() {
        println!("No collections");
    } else {
        println!("{:<24} {:>6}", "NAME", "BOOKS");
        println!("{}", "-".repeat(31));
        for (name, books) in &rows {
            let marker = if name == default { " *" } else { "" };
            println!("{:<24} {:>6}{}", name, books, marker);
        }
    }

    if !unregistered.is_empty() {
        println!();
        println!("Documents without a collection entry: {}", unregistered.join(", "));
    }

    Ok(())
}

fn add_collection(output: &Output, root: &Path, name: &str) -> Result<()> {
    let name = validate_collection_name(name)?;
    let (_, mut manager) = Library::init(root)?;

    output.verbose_ctx("collection", &format!("Creating collection '{}'", name));
    manager.add_new_collection(name)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "name": name,
            "collections": manager.collection_names(),
        }));
    } else {
        output.success(&format!("Created collection: {}", name));
    }

    Ok(())
}

fn rename_collection(output: &Output, root: &Path, old: &str, new: &str) -> Result<()> {
    let new = validate_collection_name(new)?;
    let (_, mut manager) = Library::init(root)?;

    manager.rename_selected_collection(old, new)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "from": old,
            "to": new,
            "collections": manager.collection_names(),
        }));
    } else {
        output.success(&format!("Renamed collection: {} -> {}", old, new));
    }

    Ok(())
}

fn delete_collection(output: &Output, root: &Path, name: &str) -> Result<()> {
    let (_, mut manager) = Library::init(root)?;

    let books = manager.load_books_for_collection(name).len();
    manager.delete_selected_collection(name)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "name": name,
            "books_removed": books,
            "collections": manager.collection_names(),
        }));
    } else {
        output.success(&format!("Deleted collection: {} ({} books)", name, books));
    }

    Ok(())
}
