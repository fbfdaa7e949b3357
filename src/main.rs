//! Daily English Bot - main entry point
//!
//! Without arguments starts the HTTP server together with the daily
//! scheduler. With `word`, `rule` or `idioms` runs that one pipeline and exits.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::{error, info};

use daily_english_bot::{app, logging, Config, ContentType};

#[derive(Parser)]
#[command(name = "daily_english_bot")]
#[command(about = "Scheduled English lessons for a Telegram channel", long_about = None)]
#[command(version)]
struct Cli {
    /// Run one pipeline and exit instead of starting the server
    #[arg(value_enum)]
    job: Option<Job>,

    /// Address for the HTTP server
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8000")]
    bind: SocketAddr,

    /// Append-only log file
    #[arg(long, env = "LOG_FILE", default_value = logging::DEFAULT_LOG_FILE)]
    log_file: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
enum Job {
    /// Vocabulary with exercises
    Word,
    /// Grammar rule of the day
    Rule,
    /// Idioms of the day
    Idioms,
}

impl From<Job> for ContentType {
    fn from(job: Job) -> Self {
        match job {
            Job::Word => ContentType::Words,
            Job::Rule => ContentType::Rules,
            Job::Idioms => ContentType::Idioms,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env for local development
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    logging::init(&cli.log_file)?;

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("{}", err);
            return Err(err.into());
        }
    };

    match cli.job {
        Some(job) => {
            let content_type = ContentType::from(job);
            let outcome = app::run_once(&config, content_type).await?;
            info!(content_type = %content_type, outcome = outcome.label(), "One-shot run finished");
        }
        None => {
            info!(bind = %cli.bind, "Starting daily English bot");
            app::run_server(&config, cli.bind).await?;
        }
    }

    Ok(())
}
