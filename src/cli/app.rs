//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::output::{Output, OutputFormat};
use super::{book, collection, transfer};
use crate::storage::GlobalConfig;

#[derive(Parser)]
#[command(name = "bookshelf")]
#[command(author, version, about = "Manage a personal book collection")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Library directory (overrides --user and the data directory)
    #[arg(long, global = true, env = "BOOKSHELF_ROOT")]
    pub root: Option<PathBuf>,

    /// Library owner, selects `<data dir>/users/<user>`
    #[arg(long, short = 'u', global = true)]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage collections
    #[command(subcommand)]
    Collection(collection::CollectionCommands),

    /// Manage the books of a collection
    #[command(subcommand)]
    Book(book::BookCommands),

    /// Import books from a YAML or XLSX file
    Import {
        /// File to import (.yaml, .yml or .xlsx)
        file: PathBuf,

        /// Target collection (defaults to the library's default collection)
        #[arg(long, short)]
        collection: Option<String>,

        /// Append books even if they duplicate existing ones
        #[arg(long)]
        allow_duplicates: bool,
    },

    /// Export collections to a YAML or XLSX file
    Export {
        /// Destination file (.yaml, .yml or .xlsx)
        file: PathBuf,

        /// Collection to export, repeatable (defaults to all)
        #[arg(long = "collection", short)]
        collections: Vec<String>,
    },
}

/// Installs the stderr log subscriber
///
/// `RUST_LOG` wins over the `--verbose` flag.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "bookshelf_cli=debug"
    } else {
        "bookshelf_cli=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let global = GlobalConfig::load()?;
    let format = cli.format.unwrap_or_else(|| global.default_format.into());
    let output = Output::new(format);

    let root = match cli.root {
        Some(root) => root,
        None => global.library_root(cli.user.as_deref())?,
    };
    output.verbose(&format!("Using library at {}", root.display()));

    match cli.command {
        Commands::Collection(cmd) => collection::run(cmd, &root, &output)?,
        Commands::Book(cmd) => book::run(cmd, &root, &output)?,

        Commands::Import {
            file,
            collection,
            allow_duplicates,
        } => {
            output.verbose_ctx(
                "import",
                &format!("Importing {} (allow duplicates: {})", file.display(), allow_duplicates),
            );
            transfer::import(&output, &root, &file, collection.as_deref(), allow_duplicates)?
        }
        Commands::Export { file, collections } => {
            output.verbose_ctx("export", &format!("Exporting to {}", file.display()));
            transfer::export(&output, &root, &file, &collections)?
        }
    }

    Ok(())
}
