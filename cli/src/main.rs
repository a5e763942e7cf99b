mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::config::load_config;

#[derive(Parser)]
#[command(name = "notecase")]
#[command(author, version, about = "Notes organized in a category tree")]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = "notecase.toml")]
    config: PathBuf,

    /// Database file (overrides the configuration)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with an email address
    Login {
        #[arg(short, long)]
        email: String,
    },

    /// Create a profile and sign in with it
    Signup {
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,
    },

    /// Sign out
    Logout,

    /// Show the signed-in user and theme
    Whoami,

    /// Update display name and theme colors
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        primary: Option<String>,
        #[arg(long)]
        background: Option<String>,
        #[arg(long)]
        accent: Option<String>,
        #[arg(long)]
        note_color: Option<String>,
        #[arg(long)]
        category_color: Option<String>,
        #[arg(long)]
        subcategory_color: Option<String>,
    },

    /// Manage categories
    #[command(subcommand)]
    Category(CategoryCommand),

    /// Manage notes
    #[command(subcommand)]
    Note(NoteCommand),

    /// List tags with usage counts
    Tags,
}

#[derive(Subcommand)]
pub enum CategoryCommand {
    /// Print the category tree
    List,

    /// Add a category, optionally under a parent
    Add {
        name: String,
        #[arg(short, long)]
        color: Option<String>,
        #[arg(short, long)]
        parent: Option<String>,
    },

    /// Rename or recolor a category
    Edit {
        id: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        color: Option<String>,
    },

    /// Delete a category and its sub-categories
    Rm { id: String },
}

#[derive(Subcommand)]
pub enum NoteCommand {
    /// List notes, newest first
    List {
        /// Only notes in this category or its sub-categories
        #[arg(short, long)]
        category: Option<String>,
        /// Case-insensitive text to look for in title, content and tags
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Print a note
    Show { id: String },

    /// Create a note
    Add {
        #[arg(short, long)]
        title: String,
        #[arg(short = 'b', long)]
        content: String,
        #[arg(short, long)]
        category: String,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Edit a note
    Edit {
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short = 'b', long)]
        content: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long = "untag")]
        untags: Vec<String>,
    },

    /// Delete a note
    Rm { id: String },

    /// Record a file as an attachment of a note
    Attach {
        id: String,
        path: PathBuf,
        /// MIME type, guessed from the file name when omitted
        #[arg(long)]
        mime: Option<String>,
    },

    /// Remove an attachment from a note
    Detach { id: String, attachment_id: String },

    /// Apply suggestions from a JSON file ({"suggestedTags": [...], "suggestedHeaders": [...]})
    Suggest {
        id: String,
        #[arg(long)]
        from: PathBuf,
        /// Only apply tags, keep the current category
        #[arg(long)]
        tags_only: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(&cli.config)?;
    if let Some(db) = cli.db {
        config.database_path = db;
    }
    init_logging(&config.log_filter);

    commands::dispatch(&config, cli.command)
}

fn init_logging(default_filter: &str) {
    let env_filter = EnvFilter::try_from_env("NOTECASE_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
