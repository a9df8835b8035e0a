use super::client::GeminiHttpClient;
use super::types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, InlineData, Part,
    ResponseSchema,
};
use crate::ai::VisionService;
use crate::models::Mode;
use crate::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Text returned when Gemini answers without a text part, mirroring the
/// envelope the frontend already expects.
pub const NO_TEXT_FALLBACK: &str = "No text returned";

pub struct GeminiVisionClient {
    http: GeminiHttpClient,
}

impl GeminiVisionClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(
                api_key,
                model,
                Duration::from_secs(30),
                client,
            ),
        }
    }

    pub fn model(&self) -> &str {
        self.http.model()
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    fn extract_text(response: &GenerateContentResponse) -> Option<String> {
        response
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|content| {
                content.parts.iter().find_map(|p| match p {
                    Part::Text { text } => Some(text.clone()),
                    Part::InlineData { .. } => None,
                })
            })
    }
}

#[async_trait]
impl VisionService for GeminiVisionClient {
    async fn generate(
        &self,
        prompt: &str,
        image_bytes: &[u8],
        mime_type: &str,
        mode: Mode,
    ) -> Result<String> {
        tracing::debug!(
            "Submitting image ({} bytes, {}) to Gemini in {:?} mode",
            image_bytes.len(),
            mime_type,
            mode
        );

        use base64::Engine as _;
        let encoded_image = base64::engine::general_purpose::STANDARD.encode(image_bytes);

        let generation_config = mode.constrains_output().then(|| GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(ResponseSchema::flashcard_array()),
        });

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part::Text {
                        text: prompt.to_string(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: mime_type.to_string(),
                            data: encoded_image,
                        },
                    },
                ],
            }],
            generation_config,
        };

        let response: GenerateContentResponse = self.http.generate_content(&request).await?;

        Ok(Self::extract_text(&response).unwrap_or_else(|| {
            tracing::warn!("Gemini response contained no text part");
            NO_TEXT_FALLBACK.to_string()
        }))
    }
}
