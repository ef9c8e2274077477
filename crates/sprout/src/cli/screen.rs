//! Screening commands: `check` and `bands`.

use super::{OutputFormat, print_json};
use sprout::{AgeThresholdPolicy, SafetyClassifier, SproutConfig, SproutResult};

/// Run the configured safety layers over `text` and print the verdict.
pub async fn check_text(
    config: &SproutConfig,
    age: u8,
    text: &str,
    format: OutputFormat,
) -> SproutResult<()> {
    let classifier = SafetyClassifier::from_settings(config.safety())?;
    tracing::debug!(layers = ?classifier.layer_names(), "Screening text");
    let verdict = classifier.check(text, age).await;

    match format {
        OutputFormat::Json => print_json(&verdict)?,
        OutputFormat::Human => {
            let status = if verdict.is_clear() { "clear" } else { "needs approval" };
            println!("{} (source: {})", status, verdict.source());
            println!(
                "  safety score {:.2}, educational value {:.2}",
                verdict.safety_score(),
                verdict.educational_value()
            );
            for concern in verdict.flagged_concerns() {
                println!("  concern: {}", concern);
            }
            for reason in verdict.reasons() {
                println!("  reason: {}", reason);
            }
        }
    }
    Ok(())
}

/// Print the age band table.
pub fn print_bands(format: OutputFormat) -> SproutResult<()> {
    let bands = AgeThresholdPolicy::thresholds();
    match format {
        OutputFormat::Json => print_json(&bands)?,
        OutputFormat::Human => {
            println!("{:<16} {:>5} {:>14} {:>13}", "band", "ages", "max difficulty", "max minutes");
            for band in bands {
                println!(
                    "{:<16} {:>5} {:>14} {:>13}",
                    band.band().to_string(),
                    format!("{}-{}", band.min_age(), band.max_age()),
                    band.max_difficulty(),
                    band.max_duration_minutes()
                );
            }
        }
    }
    Ok(())
}
