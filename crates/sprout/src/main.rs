//! Sprout CLI binary.
//!
//! This binary provides command-line access to Sprout's functionality:
//! - Screen text against the configured safety layers
//! - Show the age band limits
//! - Generate study plans and recommendations with in-memory stores

use clap::Parser;
use sprout::observability::{ObservabilityConfig, init_observability_with_config};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{
        Cli, Commands, check_text, generate_plan, generate_recommendations, load_config,
        print_bands,
    };

    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    init_observability_with_config(
        ObservabilityConfig::new("sprout")
            .with_log_level(log_level)
            .with_json_logs(cli.json_logs),
    )?;

    match cli.command {
        Commands::Check { age, text, format } => {
            let config = load_config(cli.config.as_deref())?;
            check_text(&config, age, &text, format).await?;
        }

        Commands::Bands { format } => {
            print_bands(format)?;
        }

        Commands::Plan { request } => {
            let config = load_config(cli.config.as_deref())?;
            generate_plan(&config, &request).await?;
        }

        Commands::Recommend { request } => {
            let config = load_config(cli.config.as_deref())?;
            generate_recommendations(&config, &request).await?;
        }
    }

    Ok(())
}
