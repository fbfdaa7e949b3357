//! Daily English Bot Library
//!
//! This library provides tools to:
//! - Generate short English lessons (words, grammar rules, idioms) with OpenAI
//! - Illustrate them with a generated image when possible
//! - Post them to a Telegram channel on a fixed daily schedule
//! - Trigger any lesson manually over HTTP or from the command line

pub mod app;
pub mod config;
pub mod content;
pub mod dispatcher;
pub mod error;
pub mod generator;
pub mod integrations;
pub mod logging;
pub mod metrics;
pub mod scheduler;
pub mod server;

#[cfg(test)]
mod testing;

// Re-export common types
pub use config::Config;
pub use content::ContentType;
pub use dispatcher::{DeliveryOutcome, Dispatcher, Messenger, Trigger};
pub use error::{Error, Result};
pub use generator::{ContentGenerator, IllustrationGenerator, ImageModel, LanguageModel};
pub use integrations::{OpenAIClient, TelegramMessenger};
pub use scheduler::{default_schedule, ScheduleEntry, Scheduler};
