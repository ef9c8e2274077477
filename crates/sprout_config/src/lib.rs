//! Layered configuration for the Sprout pipeline.
//!
//! Configuration is assembled from, in increasing precedence:
//! 1. Bundled defaults (`sprout.toml` shipped with this crate)
//! 2. `~/.config/sprout/sprout.toml`
//! 3. `./sprout.toml`
//! 4. `SPROUT__<SECTION>__<KEY>` environment variables
//! 5. `SAFETY_API_URL` / `SAFETY_API_KEY` for the external safety service

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod settings;

pub use settings::{CacheSettings, GenerationSettings, SafetySettings, SproutConfig};
