//! Data models and structures
//!
//! Defines the request mode, response envelopes, and environment-derived
//! configuration for the relay.

use serde::{Deserialize, Serialize};

/// Which instruction template (and output constraint) a request selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Explain,
    Flashcards,
}

impl Mode {
    /// Parse the `mode` form field.
    ///
    /// Only the literal `"explain"` selects explain mode; every other value,
    /// including typos, falls back to flashcards. The fallback matches the
    /// deployed behavior the frontend relies on, so unrecognized values are
    /// logged rather than rejected.
    pub fn from_field(value: &str) -> Self {
        match value {
            "explain" => Mode::Explain,
            "flashcards" => Mode::Flashcards,
            other => {
                tracing::warn!("Unrecognized mode '{}', falling back to flashcards", other);
                Mode::Flashcards
            }
        }
    }

    /// The instruction template this mode sends to the model.
    pub fn prompt(&self) -> &'static str {
        match self {
            Mode::Explain => crate::prompts::EXPLAIN,
            Mode::Flashcards => crate::prompts::FLASHCARDS,
        }
    }

    /// Whether the model output is constrained to the flashcard JSON schema.
    pub fn constrains_output(&self) -> bool {
        matches!(self, Mode::Flashcards)
    }
}

/// One Q&A pair in the flashcard output shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

/// Success envelope for `/process`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub result: String,
}

/// Error envelope returned with HTTP 500.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub host: String,
    pub port: u16,
}

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let gemini_api_key = std::env::var("GEMINI_API_KEY").unwrap_or_else(|_| {
            // The service stays up so /health keeps answering; every upstream
            // call will fail until the key is provided.
            tracing::error!("GEMINI_API_KEY is not set; Gemini calls will fail");
            String::new()
        });

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8000);

        Self {
            gemini_api_key,
            gemini_model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
        }
    }
}
