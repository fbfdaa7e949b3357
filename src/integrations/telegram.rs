//! Telegram Bot API delivery to the lesson channel.

use teloxide::prelude::*;
use teloxide::types::{InputFile, Message, Recipient};

use crate::dispatcher::Messenger;
use crate::{Error, Result};

/// Sends posts to one fixed channel.
#[derive(Debug, Clone)]
pub struct TelegramMessenger {
    bot: Bot,
    channel: Recipient,
}

impl TelegramMessenger {
    pub fn new(token: &str, channel_id: &str) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(Error::InvalidArgument("TELEGRAM_BOT_TOKEN is empty".to_string()));
        }

        Ok(Self {
            bot: Bot::new(token),
            channel: parse_recipient(channel_id)?,
        })
    }

    pub fn channel(&self) -> &Recipient {
        &self.channel
    }
}

/// `-100123…` style ids become numeric chats, anything else a public `@username`.
pub fn parse_recipient(channel_id: &str) -> Result<Recipient> {
    let channel_id = channel_id.trim();
    if channel_id.is_empty() {
        return Err(Error::InvalidArgument("TELEGRAM_CHANNEL_ID is empty".to_string()));
    }

    if let Ok(id) = channel_id.parse::<i64>() {
        return Ok(Recipient::Id(ChatId(id)));
    }

    let username = channel_id.strip_prefix('@').unwrap_or(channel_id);
    if username.is_empty() || username.contains(char::is_whitespace) {
        return Err(Error::InvalidArgument(format!(
            "Invalid channel id: {}",
            channel_id
        )));
    }

    Ok(Recipient::ChannelUsername(format!("@{}", username)))
}

fn delivery_handle(message: &Message) -> String {
    format!("message_id={} chat_id={}", message.id.0, message.chat.id.0)
}

impl Messenger for TelegramMessenger {
    async fn send_text(&self, text: &str) -> Result<String> {
        let message = self.bot.send_message(self.channel.clone(), text).await?;
        Ok(delivery_handle(&message))
    }

    async fn send_photo(&self, photo_url: &str, caption: &str) -> Result<String> {
        let url = photo_url
            .parse::<reqwest::Url>()
            .map_err(|e| Error::InvalidArgument(format!("Invalid photo URL {}: {}", photo_url, e)))?;

        let message = self
            .bot
            .send_photo(self.channel.clone(), InputFile::url(url))
            .caption(caption)
            .await?;
        Ok(delivery_handle(&message))
    }
}
