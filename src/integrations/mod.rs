//! External integrations module.
//!
//! Provides clients for:
//! - OpenAI (chat completions, image generation)
//! - Telegram Bot API (channel posts)

pub mod openai;
pub mod telegram;

pub use openai::OpenAIClient;
pub use telegram::TelegramMessenger;
