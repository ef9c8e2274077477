//! CLI command definitions.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Sprout - safe learning-content generation with parental approval
#[derive(Parser, Debug)]
#[command(name = "sprout")]
#[command(about = "Generate study plans and screen learning content for children", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./sprout.toml and ~/.config/sprout/sprout.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Screen a piece of text for a child of the given age
    Check {
        /// Child age in years
        #[arg(long)]
        age: u8,

        /// Text to screen
        text: String,

        /// Output format
        #[arg(long, default_value = "json")]
        format: OutputFormat,
    },

    /// Print the age bands and their content limits
    Bands {
        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Generate a study plan from a JSON request file
    Plan {
        /// Path to the generation request JSON
        request: PathBuf,
    },

    /// Generate content recommendations from a JSON request file
    Recommend {
        /// Path to the recommendation request JSON
        request: PathBuf,
    },
}

/// Output format options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}
