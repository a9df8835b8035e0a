use super::VisionService;
use crate::models::Mode;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Arguments of the most recent `generate` call, for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub image_len: usize,
    pub mime_type: String,
    pub mode: Mode,
}

#[derive(Clone)]
pub struct MockVisionClient {
    responses: Arc<Mutex<Vec<Result<String>>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockVisionClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_text_response(self, response: String) -> Self {
        self.responses.lock().unwrap().push(Ok(response));
        self
    }

    pub fn with_error(self, message: String) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push(Err(Error::AiProvider(message)));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_call(&self) -> Option<RecordedCall> {
        self.calls.lock().unwrap().last().cloned()
    }
}

impl Default for MockVisionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VisionService for MockVisionClient {
    async fn generate(
        &self,
        prompt: &str,
        image_bytes: &[u8],
        mime_type: &str,
        mode: Mode,
    ) -> Result<String> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(RecordedCall {
                prompt: prompt.to_string(),
                image_len: image_bytes.len(),
                mime_type: mime_type.to_string(),
                mode,
            });
            calls.len() - 1
        };

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Ok("mock response".to_string());
        }

        match &responses[index % responses.len()] {
            Ok(text) => Ok(text.clone()),
            Err(Error::AiProvider(message)) => Err(Error::AiProvider(message.clone())),
            Err(_) => Err(Error::AiProvider("mock failure".to_string())),
        }
    }
}
