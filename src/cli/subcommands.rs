use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Style guide subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum StyleCommands {
    /// Print the current style guide as JSON
    Show,
    /// Lock the guide against ingestion merges
    Lock,
    /// Unlock the guide (requires --force)
    Unlock {
        #[arg(long)]
        force: bool,
    },
}

/// Flags shared by every ingestion command.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct IngestArgs {
    /// Keep posts on or after this day (YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<String>,

    /// Keep posts on or before this day (YYYY-MM-DD)
    #[arg(long)]
    pub until: Option<String>,

    /// Merge the ingested posts into the style guide
    #[arg(long)]
    pub update_style: bool,

    /// Merge even when the style guide is locked (implies --update-style)
    #[arg(long)]
    pub force_update_style: bool,

    /// Append to the corpus instead of replacing it
    #[arg(long)]
    pub append: bool,

    /// Corpus path (default: <data_dir>/corpus.jsonl)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Drop posts shorter than this many words
    #[arg(long)]
    pub min_words: Option<usize>,
}
