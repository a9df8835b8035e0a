//! Gemini `generateContent` payload types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Gemini content container used in both requests and responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<Part>,
}

/// Untagged union of text and inline media content parts.
///
/// Variant order matters for `#[serde(untagged)]` decoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

/// Base64 inline payload used for image requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// Request envelope for `generateContent`.
#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// Output constraints attached to a request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<ResponseSchema>,
}

/// Subset of Gemini's OpenAPI-style schema language used to constrain output.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ResponseSchema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, ResponseSchema>>,
}

impl ResponseSchema {
    fn string() -> Self {
        Self {
            schema_type: "STRING".to_string(),
            items: None,
            properties: None,
        }
    }

    /// The fixed flashcard output shape: an array of objects with string
    /// `question` and `answer` fields.
    pub fn flashcard_array() -> Self {
        let mut properties = BTreeMap::new();
        properties.insert("question".to_string(), Self::string());
        properties.insert("answer".to_string(), Self::string());

        Self {
            schema_type: "ARRAY".to_string(),
            items: Some(Box::new(Self {
                schema_type: "OBJECT".to_string(),
                items: None,
                properties: Some(properties),
            })),
            properties: None,
        }
    }
}

/// Top-level `generateContent` response envelope.
#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// Candidate completion item returned by Gemini.
///
/// `content` is absent when generation was blocked (the candidate then
/// carries only `finishReason`), so it must not be required.
#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}
