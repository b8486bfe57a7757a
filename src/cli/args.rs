//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};
use clap_complete::Shell;

/// Sentence structure explorer: parse clause/phrase notation, index and lay out the trees
#[derive(Parser, Debug)]
#[command(name = "sse")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (repeat for more: -d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub debug: u8,

    /// Corpus directory (default: from settings, else cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub corpus_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a corpus file and report the number of records
    Check {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Validate every corpus file below a directory
    #[command(name = "check-dir")]
    CheckDir {
        #[arg(value_hint = ValueHint::DirPath)]
        dir: PathBuf,
    },

    /// Print the trees of a corpus file
    Tree {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Print the records of a corpus file as JSON
    Json {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Print the bar layout of every record as JSON
    Layout {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Words that fit the full width (0 = longest sentence of the file)
        #[arg(long)]
        cap: Option<u32>,
        /// Bar height in pixels
        #[arg(long)]
        bar_height: Option<f64>,
    },

    /// Print the reconstructed text, one paragraph per line
    Excerpt {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Print the metadata header of a corpus file
    Meta {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Show the highlighted sentence and comment of one node
    Hover {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Record number (1-based)
        record: usize,
        /// Node id (default: root)
        #[arg(long)]
        node: Option<u64>,
        /// Word index to resolve within the node's own words
        #[arg(long)]
        word: Option<usize>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config paths
    Path,

    /// Print a config template
    Template,
}
