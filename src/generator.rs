//! Content and illustration generators.
//!
//! Provider faults never leave this module: every failure is logged with
//! the content type and turned into `None`.

use std::future::Future;

use tracing::{error, info};

use crate::content::ContentType;
use crate::Result;

/// Text completion provider.
pub trait LanguageModel: Send + Sync {
    /// Run one completion and return the first choice's text.
    fn complete(&self, system: &str, user: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Image generation provider.
pub trait ImageModel: Send + Sync {
    /// Generate one image and return its URL.
    fn generate_image(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Generates lesson text.
#[derive(Debug, Clone)]
pub struct ContentGenerator<L> {
    model: L,
}

impl<L: LanguageModel> ContentGenerator<L> {
    pub fn new(model: L) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &L {
        &self.model
    }

    /// One provider call, returning its text as is. Blank text counts as a failure.
    pub async fn generate(
        &self,
        content_type: ContentType,
        system: &str,
        user: &str,
    ) -> Option<String> {
        match self.model.complete(system, user).await {
            Ok(text) if !text.trim().is_empty() => {
                info!(content_type = %content_type, "{} response got ok!", content_type);
                Some(text)
            }
            Ok(_) => {
                error!(content_type = %content_type, "{} response error: empty text", content_type);
                None
            }
            Err(e) => {
                error!(content_type = %content_type, error = %e, "{} response error {}", content_type, e);
                None
            }
        }
    }
}

/// Generates the picture attached to a post.
#[derive(Debug, Clone)]
pub struct IllustrationGenerator<I> {
    model: I,
}

impl<I: ImageModel> IllustrationGenerator<I> {
    pub fn new(model: I) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &I {
        &self.model
    }

    pub async fn generate_image(&self, content_type: ContentType, prompt: &str) -> Option<String> {
        match self.model.generate_image(prompt).await {
            Ok(url) if !url.trim().is_empty() => {
                info!(content_type = %content_type, "{} image generated", content_type);
                Some(url)
            }
            Ok(_) => {
                error!(content_type = %content_type, "{} image error: empty URL", content_type);
                None
            }
            Err(e) => {
                error!(content_type = %content_type, error = %e, "{} image error {}", content_type, e);
                None
            }
        }
    }
}
