use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};

use crate::types::Platform;

mod subcommands;

pub use subcommands::{IngestArgs, StyleCommands};

/// `--platform` values: `x` (or `twitter`) and `linkedin`, any case.
fn parse_platform(value: &str) -> Result<Platform, String> {
    Platform::from_str(value.trim())
        .map_err(|_| format!("unknown platform '{value}' (expected x or linkedin)"))
}

/// `ghostpost` - voice-matched X and LinkedIn drafts from your own facts.
#[derive(Parser, Debug)]
#[command(name = "ghostpost")]
#[command(version)]
#[command(about = "Draft social posts in your own voice.", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.ghostpost/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a draft
    Generate {
        /// Target platform (x, linkedin)
        #[arg(long, value_parser = parse_platform)]
        platform: Platform,

        /// What the post is about
        #[arg(long, default_value = "")]
        context: String,

        /// A fact the draft may state (repeatable)
        #[arg(long = "facts")]
        facts: Vec<String>,

        /// Point of view to take
        #[arg(long)]
        angle: Option<String>,

        /// Closing call to action
        #[arg(long)]
        cta: Option<String>,

        /// Split into a numbered thread (X only)
        #[arg(long)]
        thread: bool,

        /// Number of alternative drafts (1-5)
        #[arg(long, default_value = "1")]
        variants: usize,

        /// Override the per-post character limit
        #[arg(long)]
        max_chars: Option<usize>,

        /// Explicit web research query
        #[arg(long)]
        research_query: Option<String>,

        /// Skip web research entirely
        #[arg(long)]
        no_research: bool,

        /// Do not derive a research query from the context
        #[arg(long)]
        no_auto_research: bool,

        /// Skip the LLM proofreading pass
        #[arg(long)]
        no_proofread: bool,

        /// Fail instead of returning a template when no backend is configured
        #[arg(long)]
        strict: bool,

        /// Print the full outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Ingest a LinkedIn activity export (PDF, text or saved HTML)
    IngestLinkedin {
        #[arg(long)]
        pdf: PathBuf,

        /// Day relative timestamps ("3d", "2w") are resolved against
        #[arg(long)]
        reference_date: Option<String>,

        #[command(flatten)]
        ingest: IngestArgs,
    },

    /// Ingest a Nitter profile export (PDF, text or saved HTML)
    IngestNitter {
        #[arg(long)]
        pdf: PathBuf,

        #[command(flatten)]
        ingest: IngestArgs,
    },

    /// Collect posts from a public Nitter profile or saved pages, then ingest
    Scrape {
        #[arg(long, default_value = "x", value_parser = parse_platform)]
        platform: Platform,

        /// Profile handle for a live Nitter fetch
        #[arg(long)]
        profile: Option<String>,

        /// Saved HTML page or directory of pages
        #[arg(long)]
        html: Option<PathBuf>,

        #[arg(long, default_value = "https://nitter.net")]
        nitter_instance: String,

        #[arg(long, default_value = "100")]
        max_posts: usize,

        /// Confirm you have read the platform's terms of service
        #[arg(long = "i-acknowledge-terms")]
        acknowledge_terms: bool,

        /// Confirm you accept the risk of automated access
        #[arg(long = "i-acknowledge-risk")]
        acknowledge_risk: bool,

        #[command(flatten)]
        ingest: IngestArgs,
    },

    /// Start the web gateway
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (use 0 for random available port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show backend, research, grammar and style guide state
    Status,

    /// Inspect or lock the style guide
    Style {
        #[command(subcommand)]
        style_command: StyleCommands,
    },
}
