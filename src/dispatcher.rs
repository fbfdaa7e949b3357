//! Delivery pipeline: generate text, try an illustration, post once.

use std::fmt;
use std::future::Future;
use std::time::Instant;

use tracing::{error, info, warn};

use crate::content::ContentType;
use crate::generator::{ContentGenerator, IllustrationGenerator, ImageModel, LanguageModel};
use crate::metrics;
use crate::Result;

/// Telegram rejects photo captions longer than this, counted in UTF-16 code units.
pub const CAPTION_LIMIT: usize = 1024;

/// Caption length the way Telegram counts it: emoji outside the BMP take two units.
pub fn caption_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Outbound channel for finished posts.
pub trait Messenger: Send + Sync {
    /// Send a plain text message, returning a delivery handle.
    fn send_text(&self, text: &str) -> impl Future<Output = Result<String>> + Send;

    /// Send a photo by URL with a caption, returning a delivery handle.
    fn send_photo(
        &self,
        photo_url: &str,
        caption: &str,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// What happened to one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Generation failed, nothing was sent.
    NoContent,
    /// Photo with caption delivered.
    Photo { handle: String },
    /// Text-only message delivered.
    Text { handle: String },
    /// The send call failed.
    Failed { error: String },
}

impl DeliveryOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            DeliveryOutcome::NoContent => "no_content",
            DeliveryOutcome::Photo { .. } => "photo",
            DeliveryOutcome::Text { .. } => "text",
            DeliveryOutcome::Failed { .. } => "failed",
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(
            self,
            DeliveryOutcome::Photo { .. } | DeliveryOutcome::Text { .. }
        )
    }
}

/// Who started the invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Scheduled,
    Manual,
    Cli,
}

impl Trigger {
    pub fn label(&self) -> &'static str {
        match self {
            Trigger::Scheduled => "scheduled",
            Trigger::Manual => "manual",
            Trigger::Cli => "cli",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Runs the generate → illustrate → send pipeline against one channel.
pub struct Dispatcher<L, I, M> {
    content: ContentGenerator<L>,
    illustrations: IllustrationGenerator<I>,
    messenger: M,
}

impl<L, I, M> Dispatcher<L, I, M>
where
    L: LanguageModel,
    I: ImageModel,
    M: Messenger,
{
    pub fn new(language_model: L, image_model: I, messenger: M) -> Self {
        Self {
            content: ContentGenerator::new(language_model),
            illustrations: IllustrationGenerator::new(image_model),
            messenger,
        }
    }

    pub fn messenger(&self) -> &M {
        &self.messenger
    }

    /// Run the pipeline with the content type's own prompts.
    pub async fn deliver(&self, content_type: ContentType) -> DeliveryOutcome {
        self.deliver_with(
            content_type,
            content_type.system_prompt(),
            content_type.user_prompt(),
        )
        .await
    }

    /// Run the pipeline with explicit prompts. Never fails: faults become outcomes.
    pub async fn deliver_with(
        &self,
        content_type: ContentType,
        system: &str,
        user: &str,
    ) -> DeliveryOutcome {
        let Some(content) = self.content.generate(content_type, system, user).await else {
            return DeliveryOutcome::NoContent;
        };

        let image = if caption_len(&content) <= CAPTION_LIMIT {
            self.illustrations
                .generate_image(content_type, &content_type.illustration_prompt())
                .await
        } else {
            warn!(
                content_type = %content_type,
                utf16_len = caption_len(&content),
                "Content too long for a caption, sending text only"
            );
            None
        };

        let sent = match &image {
            Some(url) => self.messenger.send_photo(url, &content).await,
            None => {
                self.messenger
                    .send_text(&content_type.text_message(&content))
                    .await
            }
        };

        match sent {
            Ok(handle) => {
                info!(content_type = %content_type, handle = %handle, "{} message was successfully sent! {}", content_type, handle);
                if image.is_some() {
                    DeliveryOutcome::Photo { handle }
                } else {
                    DeliveryOutcome::Text { handle }
                }
            }
            Err(e) => {
                error!(content_type = %content_type, error = %e, "{} message wasn't sent: {}", content_type, e);
                DeliveryOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Invocation wrapper used by every trigger: records metrics and logs the outcome.
    pub async fn dispatch(&self, content_type: ContentType, trigger: Trigger) -> DeliveryOutcome {
        let inflight = metrics::record_delivery_start(content_type);
        let start = Instant::now();

        let outcome = self.deliver(content_type).await;

        metrics::record_delivery_result(content_type, trigger, start.elapsed(), &outcome);
        drop(inflight);
        if outcome.is_delivered() {
            info!(content_type = %content_type, trigger = %trigger, outcome = outcome.label(), "Delivery finished");
        } else {
            warn!(content_type = %content_type, trigger = %trigger, outcome = outcome.label(), "Delivery finished without a post");
        }

        outcome
    }
}
