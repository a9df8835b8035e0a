//! AI service integration for image understanding
//!
//! Provides the interface to Gemini's generateContent API for turning an
//! uploaded image plus an instruction prompt into a text response.

pub mod gemini;
pub mod mock;

pub use gemini::GeminiVisionClient;
pub use mock::MockVisionClient;

use crate::models::Mode;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait VisionService: Send + Sync {
    /// Submit an instruction prompt plus inline image bytes and return the
    /// model's text output. Flashcards mode constrains the output to the
    /// question/answer array schema.
    async fn generate(
        &self,
        prompt: &str,
        image_bytes: &[u8],
        mime_type: &str,
        mode: Mode,
    ) -> Result<String>;
}
