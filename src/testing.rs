//! In-memory providers for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::dispatcher::Messenger;
use crate::generator::{ImageModel, LanguageModel};
use crate::{Error, Result};

pub struct FakeLanguageModel {
    reply: Option<String>,
    calls: AtomicUsize,
}

impl FakeLanguageModel {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LanguageModel for FakeLanguageModel {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply
            .clone()
            .ok_or_else(|| Error::OpenAiError("provider unavailable".to_string()))
    }
}

pub struct FakeImageModel {
    url: Option<String>,
    calls: AtomicUsize,
}

impl FakeImageModel {
    pub fn replying(url: &str) -> Self {
        Self {
            url: Some(url.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            url: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ImageModel for FakeImageModel {
    async fn generate_image(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.url
            .clone()
            .ok_or_else(|| Error::OpenAiError("image generation failed".to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text(String),
    Photo { url: String, caption: String },
}

/// Records every send attempt, failing them all when asked to.
#[derive(Default)]
pub struct RecordingMessenger {
    fail: bool,
    sent: Mutex<Vec<Sent>>,
}

impl RecordingMessenger {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text(text) => Some(text),
                Sent::Photo { .. } => None,
            })
            .collect()
    }

    pub fn photos(&self) -> Vec<(String, String)> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Photo { url, caption } => Some((url, caption)),
                Sent::Text(_) => None,
            })
            .collect()
    }

    fn record(&self, sent: Sent) -> Result<String> {
        let mut log = self.sent.lock().unwrap();
        log.push(sent);
        if self.fail {
            return Err(Error::TelegramError("Bad Request: chat not found".to_string()));
        }
        Ok(format!("message_id={}", log.len()))
    }
}

impl Messenger for RecordingMessenger {
    async fn send_text(&self, text: &str) -> Result<String> {
        self.record(Sent::Text(text.to_string()))
    }

    async fn send_photo(&self, photo_url: &str, caption: &str) -> Result<String> {
        self.record(Sent::Photo {
            url: photo_url.to_string(),
            caption: caption.to_string(),
        })
    }
}
