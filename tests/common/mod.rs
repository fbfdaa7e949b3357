//! Shared fakes for integration tests.

#![allow(dead_code)]

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{Barrier, Notify};

use daily_english_bot::{Error, ImageModel, LanguageModel, Messenger, Result};

/// Language model with a fixed answer, or a fault when `reply` is `None`.
pub struct ScriptedModel {
    pub reply: Option<String>,
    pub calls: AtomicUsize,
    pub barrier: Option<Arc<Barrier>>,
    pub started: Option<Arc<Notify>>,
    pub delay: Duration,
}

impl ScriptedModel {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            calls: AtomicUsize::new(0),
            barrier: None,
            started: None,
            delay: Duration::ZERO,
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
            barrier: None,
            started: None,
            delay: Duration::ZERO,
        }
    }

    /// Every call waits until `barrier` is full before answering.
    pub fn waiting_on(mut self, barrier: Arc<Barrier>) -> Self {
        self.barrier = Some(barrier);
        self
    }

    /// Signal `started` when a call begins, then take `delay` to answer.
    pub fn slow(mut self, started: Arc<Notify>, delay: Duration) -> Self {
        self.started = Some(started);
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LanguageModel for ScriptedModel {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(started) = &self.started {
            started.notify_one();
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        self.reply
            .clone()
            .ok_or_else(|| Error::OpenAiError("insufficient_quota".to_string()))
    }
}

impl ImageModel for ScriptedModel {
    async fn generate_image(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply
            .clone()
            .ok_or_else(|| Error::OpenAiError("image generation failed".to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Post {
    Text(String),
    Photo { url: String, caption: String },
}

#[derive(Default)]
pub struct ChannelRecorder {
    pub posts: Mutex<Vec<Post>>,
}

impl ChannelRecorder {
    pub fn posts(&self) -> Vec<Post> {
        self.posts.lock().unwrap().clone()
    }
}

impl Messenger for ChannelRecorder {
    async fn send_text(&self, text: &str) -> Result<String> {
        self.posts.lock().unwrap().push(Post::Text(text.to_string()));
        Ok("message_id=1".to_string())
    }

    async fn send_photo(&self, photo_url: &str, caption: &str) -> Result<String> {
        self.posts.lock().unwrap().push(Post::Photo {
            url: photo_url.to_string(),
            caption: caption.to_string(),
        });
        Ok("message_id=1".to_string())
    }
}

/// In-memory sink for a `tracing_subscriber::fmt` writer.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
