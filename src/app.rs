//! Composition root: builds the production clients and runs the bot.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::Config;
use crate::content::ContentType;
use crate::dispatcher::{DeliveryOutcome, Dispatcher, Trigger};
use crate::integrations::{OpenAIClient, TelegramMessenger};
use crate::scheduler::{LocalClock, Scheduler};
use crate::server;
use crate::Result;

/// Dispatcher wired to OpenAI and the Telegram channel.
pub type BotDispatcher = Dispatcher<OpenAIClient, OpenAIClient, TelegramMessenger>;

pub fn build_dispatcher(config: &Config) -> Result<BotDispatcher> {
    let mut openai = OpenAIClient::new(
        config.openai_api_key.as_str(),
        config.openai_model.as_str(),
        config.openai_image_model.as_str(),
    )?;
    if let Some(base_url) = &config.openai_base_url {
        openai = openai.with_base_url(base_url.as_str());
    }

    let telegram = TelegramMessenger::new(&config.telegram_bot_token, &config.telegram_channel_id)?;

    Ok(Dispatcher::new(openai.clone(), openai, telegram))
}

/// Run one pipeline to completion (CLI mode).
pub async fn run_once(config: &Config, content_type: ContentType) -> Result<DeliveryOutcome> {
    let dispatcher = build_dispatcher(config)?;
    Ok(dispatcher.dispatch(content_type, Trigger::Cli).await)
}

/// Start the scheduler and the HTTP server; returns on Ctrl+C.
pub async fn run_server(config: &Config, bind: SocketAddr) -> Result<()> {
    let schedule = config.schedule()?;
    let dispatcher = Arc::new(build_dispatcher(config)?);

    let listener = TcpListener::bind(bind).await?;

    let scheduler = Scheduler::new(schedule, Arc::clone(&dispatcher), LocalClock);
    for entry in scheduler.entries() {
        info!(
            content_type = %entry.content_type,
            "Scheduled daily at {:02}:{:02}",
            entry.hour,
            entry.minute
        );
    }
    let handle = scheduler.start();

    let result = server::serve(listener, dispatcher, shutdown_signal()).await;
    handle.shutdown();
    result
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", err);
        std::future::pending::<()>().await;
    }
}
