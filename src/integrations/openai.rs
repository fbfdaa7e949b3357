//! OpenAI API client for lesson text and illustrations.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::generator::{ImageModel, LanguageModel};
use crate::{Error, Result};

pub const OPENAI_API_URL: &str = "https://api.openai.com/v1";

/// Square image, the only size the channel posts.
pub const IMAGE_SIZE: &str = "1024x1024";
pub const IMAGE_QUALITY: &str = "standard";

/// OpenAI client.
#[derive(Debug, Clone)]
pub struct OpenAIClient {
    http: Client,
    api_key: String,
    base_url: String,
    chat_model: String,
    image_model: String,
}

impl OpenAIClient {
    /// Create client with API key and the models used for text and images.
    pub fn new(
        api_key: impl Into<String>,
        chat_model: impl Into<String>,
        image_model: impl Into<String>,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::InvalidArgument("OPENAI_API_KEY is empty".to_string()));
        }

        let http = Client::builder()
            .user_agent("daily_english_bot/0.1.0")
            .build()
            .map_err(|e| Error::InvalidArgument(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            http,
            api_key,
            base_url: OPENAI_API_URL.to_string(),
            chat_model: chat_model.into(),
            image_model: image_model.into(),
        })
    }

    /// Point the client at a different API root (proxies, compatible providers).
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn chat_model(&self) -> &str {
        &self.chat_model
    }

    pub fn image_model(&self) -> &str {
        &self.image_model
    }

    /// Chat completion.
    pub async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        model: &str,
        temperature: Option<f32>,
        max_tokens: Option<u32>,
    ) -> Result<String> {
        let request = ChatRequest {
            model: model.to_string(),
            messages,
            temperature,
            max_tokens,
        };

        let text = self.post_json("chat/completions", &request).await?;

        let chat_response: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| Error::OpenAiError(format!("Invalid response: {}", e)))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::OpenAiError("Empty response from OpenAI".to_string()))
    }

    /// Generate a single image and return its URL.
    pub async fn create_image(
        &self,
        prompt: &str,
        model: &str,
        size: &str,
        quality: &str,
    ) -> Result<String> {
        let request = ImageRequest {
            model: model.to_string(),
            prompt: prompt.to_string(),
            size: size.to_string(),
            quality: quality.to_string(),
            n: 1,
        };

        let text = self.post_json("images/generations", &request).await?;

        let image_response: ImageResponse = serde_json::from_str(&text)
            .map_err(|e| Error::OpenAiError(format!("Invalid image response: {}", e)))?;

        image_response
            .data
            .into_iter()
            .next()
            .and_then(|d| d.url)
            .ok_or_else(|| Error::OpenAiError("Image response has no URL".to_string()))
    }

    async fn post_json<T: Serialize>(&self, path: &str, body: &T) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/{}", self.base_url, path))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(body)
            .send()
            .await
            .map_err(|e| Error::OpenAiError(format!("OpenAI request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::OpenAiError(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::OpenAiError(format!(
                "OpenAI error {}: {}",
                status, text
            )));
        }

        Ok(text)
    }
}

impl LanguageModel for OpenAIClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let messages = vec![ChatMessage::system(system), ChatMessage::user(user)];
        self.chat_completion(messages, &self.chat_model, None, None)
            .await
    }
}

impl ImageModel for OpenAIClient {
    async fn generate_image(&self, prompt: &str) -> Result<String> {
        self.create_image(prompt, &self.image_model, IMAGE_SIZE, IMAGE_QUALITY)
            .await
    }
}

/// Chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl ChatMessage {
    pub fn system<S: Into<String>>(content: S) -> Self {
        Self {
            role: "system".to_string(),
            content: Some(content.into()),
        }
    }

    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.into()),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Serialize)]
struct ImageRequest {
    model: String,
    prompt: String,
    size: String,
    quality: String,
    n: u8,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
}
