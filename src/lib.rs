//! Relay service for hyocard - turns study-note photos into explanations or flashcards
//!
//! Accepts an uploaded image over HTTP, forwards it to the Gemini API with one
//! of two fixed prompts, and returns the model's text response.

pub mod ai;
pub mod error;
pub mod models;
pub mod prompts;
pub mod server;

pub use error::{Error, Result};
