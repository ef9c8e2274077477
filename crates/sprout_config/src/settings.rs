//! Configuration structures and loading.

use config::{Config, Environment, File, FileFormat};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use sprout_error::{ConfigError, SproutError, SproutResult};
use std::time::Duration;
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../sprout.toml");

/// Generation cache settings.
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct CacheSettings {
    /// Whether cached responses are used at all
    #[serde(default = "default_true")]
    enabled: bool,

    /// Lifetime of a cached response (seconds)
    #[serde(default = "default_ttl_seconds")]
    ttl_seconds: u64,

    /// Maximum number of entries kept by the in-memory store
    #[serde(default = "default_max_entries")]
    max_entries: usize,
}

fn default_true() -> bool {
    true
}

fn default_ttl_seconds() -> u64 {
    24 * 60 * 60
}

fn default_max_entries() -> usize {
    1000
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: default_ttl_seconds(),
            max_entries: default_max_entries(),
        }
    }
}

/// Model call settings.
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct GenerationSettings {
    /// Model identifier passed to the provider
    #[serde(default = "default_model")]
    model: String,

    /// Deadline for one generation call, retries included (seconds)
    #[serde(default = "default_generation_timeout")]
    timeout_secs: u64,

    /// Retries on transient provider errors
    #[serde(default = "default_max_retries")]
    max_retries: usize,

    /// Initial retry backoff (milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    retry_backoff_ms: u64,
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_generation_timeout() -> u64 {
    60
}

fn default_max_retries() -> usize {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            timeout_secs: default_generation_timeout(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl GenerationSettings {
    /// Generation deadline as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Safety classifier settings.
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct SafetySettings {
    /// External safety service endpoint
    #[serde(default)]
    api_url: Option<String>,

    /// External safety service API key
    #[serde(default)]
    api_key: Option<String>,

    /// Deadline for one external safety call (milliseconds)
    #[serde(default = "default_safety_timeout_ms")]
    timeout_ms: u64,

    /// Minimum content safety score for display without approval
    #[serde(default = "default_min_safety_score")]
    min_safety_score: f64,

    /// Terms added to the built-in deny-list
    #[serde(default)]
    extra_keywords: Vec<String>,

    /// Whether the model-based classifier layer is enabled
    #[serde(default)]
    model_classifier: bool,
}

fn default_safety_timeout_ms() -> u64 {
    5000
}

fn default_min_safety_score() -> f64 {
    0.8
}

impl Default for SafetySettings {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            timeout_ms: default_safety_timeout_ms(),
            min_safety_score: default_min_safety_score(),
            extra_keywords: Vec::new(),
            model_classifier: false,
        }
    }
}

impl SafetySettings {
    /// Endpoint and key of the external safety service.
    ///
    /// Returns `None` unless both are set and non-empty; a half-configured
    /// service disables the layer rather than failing.
    pub fn external_endpoint(&self) -> Option<(&str, &str)> {
        let url = self.api_url.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let key = self.api_key.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some((url, key))
    }

    /// External call deadline as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Top-level Sprout configuration.
///
/// # Example
///
/// ```no_run
/// use sprout_config::SproutConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = SproutConfig::load()?;
/// println!("cache ttl: {}s", config.cache().ttl_seconds());
/// # Ok(())
/// # }
/// ```
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, Default, Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct SproutConfig {
    /// Generation cache settings
    #[serde(default)]
    cache: CacheSettings,

    /// Model call settings
    #[serde(default)]
    generation: GenerationSettings,

    /// Safety classifier settings
    #[serde(default)]
    safety: SafetySettings,
}

impl SproutConfig {
    /// Load configuration from a specific file path, on top of the bundled defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> SproutResult<Self> {
        debug!("Loading configuration from file");

        Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                SproutError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                SproutError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Load configuration with precedence: env > current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and silently skipped if not found.
    #[instrument]
    pub fn load() -> SproutResult<Self> {
        debug!("Loading configuration with precedence: env > current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/sprout/sprout.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder
            .add_source(File::with_name("sprout").required(false))
            .add_source(
                Environment::with_prefix("SPROUT")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("safety.extra_keywords")
                    .try_parsing(true),
            );

        builder = builder
            .set_override_option("safety.api_url", std::env::var("SAFETY_API_URL").ok())
            .and_then(|b| {
                b.set_override_option("safety.api_key", std::env::var("SAFETY_API_KEY").ok())
            })
            .map_err(|e| {
                SproutError::from(ConfigError::new(format!(
                    "Failed to apply safety service overrides: {}",
                    e
                )))
            })?;

        builder
            .build()
            .map_err(|e| {
                SproutError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                SproutError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_defaults_parse() {
        let config: SproutConfig = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(*config.cache().ttl_seconds(), 86_400);
        assert_eq!(*config.safety().min_safety_score(), 0.8);
        assert!(config.safety().external_endpoint().is_none());
    }

    #[test]
    fn test_half_configured_service_is_disabled() {
        let safety = SafetySettings::default().with_api_url(Some("https://safety.test".to_string()));
        assert!(safety.external_endpoint().is_none());

        let safety = safety.with_api_key(Some("   ".to_string()));
        assert!(safety.external_endpoint().is_none());

        let safety = safety.with_api_key(Some("secret".to_string()));
        assert_eq!(
            safety.external_endpoint(),
            Some(("https://safety.test", "secret"))
        );
    }
}
