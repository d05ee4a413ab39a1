//! CLI command definitions.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use storybook::{DEFAULT_SERVER_URL, ImageEngine};

/// Storybook - AI-generated, illustrated children's books
#[derive(Parser, Debug)]
#[command(name = "storybook")]
#[command(about = "Generate, browse and manage illustrated children's books", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Storybook server address
    #[arg(long, global = true, env = "STORYBOOK_SERVER", default_value = DEFAULT_SERVER_URL)]
    pub server: String,

    /// Directory for local settings (defaults to the user config directory)
    #[arg(long, global = true)]
    pub settings_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate, illustrate and save a new book
    Generate {
        /// What the story is about
        #[arg(long)]
        theme: String,

        /// Name or short description of the protagonist
        #[arg(long, default_value = "")]
        character: String,

        /// Target-age label
        #[arg(long, default_value = "3-5")]
        age: String,

        /// Moral the story should teach
        #[arg(long, default_value = "")]
        moral: String,

        /// Story genre
        #[arg(long, default_value = "Adventure")]
        genre: String,

        /// Illustration style
        #[arg(long, default_value = "Cartoon")]
        style: String,

        /// Kind of protagonist
        #[arg(long, default_value = "Human")]
        character_type: String,

        /// Language of the story text
        #[arg(long, default_value = "Indonesian")]
        language: String,

        /// Image engine for this run (defaults to the saved setting)
        #[arg(long)]
        engine: Option<ImageEngine>,
    },

    /// List saved books
    List {
        /// Sort column (createdAt, title, theme)
        #[arg(long)]
        sort_by: Option<String>,

        /// Sort direction (ASC, DESC)
        #[arg(long)]
        order: Option<String>,

        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Show a book with its pages
    Show {
        /// Book identifier
        id: String,
    },

    /// Redraw one page's illustration and save the book
    Redraw {
        /// Book identifier
        id: String,

        /// Page to redraw
        #[arg(long)]
        page: i32,
    },

    /// Delete a book, or every book
    Delete {
        /// Book identifier
        #[arg(required_unless_present = "all")]
        id: Option<String>,

        /// Delete every book
        #[arg(long, conflicts_with = "id")]
        all: bool,
    },

    /// Check that the server and the text model are reachable
    Check,

    /// Settings commands
    #[command(subcommand)]
    Settings(SettingsCommands),
}

/// Settings subcommands
#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Print the current settings
    Show,

    /// Change the brand
    Brand {
        /// Brand name
        #[arg(long)]
        name: String,

        /// Built-in logo icon
        #[arg(long, default_value = "BookOpen")]
        logo: String,

        /// Uploaded logo URL
        #[arg(long, default_value = "")]
        logo_url: String,
    },

    /// Select the image engine
    Engine {
        /// Engine name (gemini, freepik, imagen)
        engine: ImageEngine,
    },

    /// Set or clear provider key overrides
    Keys {
        /// Gemini key (empty to clear)
        #[arg(long)]
        gemini: Option<String>,

        /// Freepik key (empty to clear)
        #[arg(long)]
        freepik: Option<String>,
    },

    /// Check a Gemini key against the provider
    Validate {
        /// Key to check (defaults to the saved override)
        key: Option<String>,
    },

    /// Pull brand and engine from the server
    Pull,
}

/// Output format for listings
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Human,
    /// JSON output
    Json,
}
