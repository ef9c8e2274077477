//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the sprout binary.

mod commands;
mod generate;
mod screen;

pub use commands::{Cli, Commands, OutputFormat};
pub use generate::{generate_plan, generate_recommendations};
pub use screen::{check_text, print_bands};

use serde::Serialize;
use serde::de::DeserializeOwned;
use sprout::{ConfigError, JsonError, SproutConfig, SproutResult};
use std::path::Path;

/// Load configuration from `path`, or from the default locations.
pub fn load_config(path: Option<&Path>) -> SproutResult<SproutConfig> {
    match path {
        Some(path) => SproutConfig::from_file(path),
        None => SproutConfig::load(),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> SproutResult<T> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        ConfigError::new(format!("Failed to read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&raw)
        .map_err(|e| JsonError::new(format!("Invalid request in {}: {}", path.display(), e)).into())
}

fn print_json<T: Serialize>(value: &T) -> SproutResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| JsonError::new(format!("Failed to render output: {}", e)))?;
    println!("{}", rendered);
    Ok(())
}
