//! Model provider clients for Sprout.
//!
//! Each provider implements [`sprout_interface::ModelClient`]. Only Gemini is
//! provided; anything else can be plugged in behind the same trait.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod gemini;

pub use gemini::{GEMINI_API_KEY_VAR, GeminiClient};
