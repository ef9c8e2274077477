//! Google Gemini REST client.

mod client;
mod wire;

pub use client::{GEMINI_API_KEY_VAR, GeminiClient};
