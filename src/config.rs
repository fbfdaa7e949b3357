//! Process configuration from environment variables.
//!
//! Every required value is checked at startup; all missing names are
//! reported together.

use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::scheduler::{default_schedule, load_schedule_file, ScheduleEntry};
use crate::{Error, Result};

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const OPENAI_MODEL: &str = "OPENAI_MODEL";
pub const OPENAI_IMAGE_MODEL: &str = "OPENAI_IMAGE_MODEL";
pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const TELEGRAM_CHANNEL_ID: &str = "TELEGRAM_CHANNEL_ID";
pub const SCHEDULE_FILE: &str = "SCHEDULE_FILE";

pub const REQUIRED_VARS: [&str; 5] = [
    OPENAI_API_KEY,
    OPENAI_MODEL,
    OPENAI_IMAGE_MODEL,
    TELEGRAM_BOT_TOKEN,
    TELEGRAM_CHANNEL_ID,
];

/// Main configuration struct
#[derive(Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_image_model: String,
    pub openai_base_url: Option<String>,
    pub telegram_bot_token: String,
    pub telegram_channel_id: String,
    pub schedule_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary lookup; blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let missing: Vec<&str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|key| get(*key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(Error::Config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let required = |key: &str| get(key).unwrap_or_default();

        Ok(Self {
            openai_api_key: required(OPENAI_API_KEY),
            openai_model: required(OPENAI_MODEL),
            openai_image_model: required(OPENAI_IMAGE_MODEL),
            openai_base_url: get(OPENAI_BASE_URL),
            telegram_bot_token: required(TELEGRAM_BOT_TOKEN),
            telegram_channel_id: required(TELEGRAM_CHANNEL_ID),
            schedule_file: get(SCHEDULE_FILE).map(PathBuf::from),
        })
    }

    /// Schedule table: the YAML file when configured, the built-in table otherwise.
    pub fn schedule(&self) -> Result<Vec<ScheduleEntry>> {
        match &self.schedule_file {
            Some(path) => load_schedule_file(path),
            None => Ok(default_schedule()),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("openai_api_key", &"<redacted>")
            .field("openai_model", &self.openai_model)
            .field("openai_image_model", &self.openai_image_model)
            .field("openai_base_url", &self.openai_base_url)
            .field("telegram_bot_token", &"<redacted>")
            .field("telegram_channel_id", &self.telegram_channel_id)
            .field("schedule_file", &self.schedule_file)
            .finish()
    }
}
