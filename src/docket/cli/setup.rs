use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// "0.3.2" for release builds, "0.3.2@abc1234 2024-01-15 14:30" otherwise.
fn version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "docket", bin_name = "docket", version = version())]
#[command(about = "File documents into a folder taxonomy and give them stable codes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Debug-level operator logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the folder tree
    Tree {
        /// Show collapsed folders too
        #[arg(short, long)]
        all: bool,
    },

    /// Change the folder tree
    #[command(subcommand)]
    Folder(FolderCommand),

    /// Export or import the folder structure as JSON
    #[command(subcommand)]
    Structure(StructureCommand),

    /// File documents directly into a folder
    Upload {
        /// Target folder id, e.g. 3.1.2
        node: String,

        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Record OCR and classifier results as auto-classified documents
    Classify {
        /// JSON list of {file, text, error, suggestedNodeId, documentTitle, ...}
        results: PathBuf,
    },

    /// List pending and finalized documents
    #[command(alias = "ls")]
    List,

    /// Correct a document's folder or metadata
    Edit(EditArgs),

    /// Remove pending documents (e.g. a1 d2-d4)
    #[command(alias = "rm")]
    Remove {
        indexes: Vec<String>,

        /// Remove every pending document
        #[arg(long, conflicts_with = "indexes")]
        all: bool,

        /// Skip the preview and remove
        #[arg(short, long)]
        yes: bool,
    },

    /// Assign codes to all pending documents
    Finalize,

    /// Finalized document counts per folder
    Summary,

    /// Write the archive or the manifest
    #[command(subcommand)]
    Export(ExportCommand),

    /// Clear documents; --hard also restores the default folder tree
    Reset {
        #[arg(long)]
        hard: bool,

        /// Skip the preview and reset
        #[arg(short, long)]
        yes: bool,
    },

    /// Show or change settings
    Config {
        key: Option<String>,
        value: Option<String>,
    },

    /// Create the workspace
    Init,
}

#[derive(Subcommand, Debug)]
pub enum FolderCommand {
    /// Add a child folder (use "root" for a top-level folder)
    Add { parent: String, name: String },
    Rename { id: String, name: String },
    /// Delete a folder and everything below it
    #[command(alias = "rm")]
    Remove {
        id: String,
        #[arg(short, long)]
        yes: bool,
    },
    Up { id: String },
    Down { id: String },
    /// Expand or collapse a folder
    Toggle { id: String },
}

#[derive(Subcommand, Debug)]
pub enum StructureCommand {
    /// Print the structure, or write it to FILE
    Export { file: Option<PathBuf> },
    /// Replace the structure with the contents of FILE
    Import { file: PathBuf },
}

#[derive(Subcommand, Debug)]
pub enum ExportCommand {
    /// tar.gz of finalized documents laid out by folder
    Archive {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// JSON manifest rows grouped by top-level folder
    Manifest {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// a1, d2 or f3
    pub index: String,

    /// Move a pending document to another folder
    #[arg(long)]
    pub node: Option<String>,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub issuer: Option<String>,

    #[arg(long)]
    pub number: Option<String>,

    #[arg(long)]
    pub date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_edit_flags() {
        let cli = Cli::parse_from(["docket", "edit", "f2", "--title", "Warranty"]);
        match cli.command {
            Commands::Edit(args) => {
                assert_eq!(args.index, "f2");
                assert_eq!(args.title.as_deref(), Some("Warranty"));
                assert!(args.node.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn remove_all_conflicts_with_indexes() {
        assert!(Cli::try_parse_from(["docket", "remove", "a1", "--all"]).is_err());
        assert!(Cli::try_parse_from(["docket", "remove", "--all", "--yes"]).is_ok());
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::parse_from(["docket", "finalize", "-v"]);
        assert!(cli.verbose);
    }
}
