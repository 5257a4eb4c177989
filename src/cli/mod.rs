//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Collection | Collection lifecycle | `collection list`, `collection add`, `collection rename` |
//! | Book | Books of one collection | `book add`, `book list`, `book search`, `book edit` |
//! | Transfer | YAML and XLSX files | `import`, `export` |
//!
//! ## Library Selection
//!
//! Commands act on one library directory: `--root` (or `BOOKSHELF_ROOT`),
//! otherwise `<data dir>/users/<user>` with `--user` defaulting to the
//! global config, then `default`.
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug logs on stderr. `RUST_LOG` overrides it:
//! ```bash
//! bookshelf --verbose collection list
//! RUST_LOG=bookshelf_cli=trace bookshelf book list
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod book;
mod collection;
mod output;
mod transfer;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
