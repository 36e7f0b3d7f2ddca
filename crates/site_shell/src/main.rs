mod command;
mod render;
mod shell;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use config::{ConfigStore, PreferenceStore, SiteConfig};
use contact::HttpMailRelay;
use core_types::{AssistantProvider, ContentFetcher, Language, TracingAnalytics};
use i18n::{DirContentFetcher, HttpContentFetcher};
use provider_gemini::GeminiAssistantProvider;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::command::Command;
use crate::shell::{Services, Shell};

#[derive(Debug, Parser)]
#[command(name = "folio", version, about = "Headless portfolio site driven from the terminal")]
struct Args {
    /// Directory holding config.json and preferences.json.
    #[arg(long)]
    config_dir: Option<PathBuf>,
    /// Content root, either an http(s) base URL or a local directory.
    #[arg(long)]
    content: Option<String>,
    /// Language to start in instead of the configured default.
    #[arg(long)]
    lang: Option<Language>,
    /// Initial location fragment.
    #[arg(long, default_value = "#/")]
    fragment: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut data_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    data_dir.push("folio");
    if let Err(err) = fs::create_dir_all(&data_dir) {
        eprintln!("failed to prepare data dir: {err}");
    }
    let _log_guard = init_local_logger(&data_dir.join("logs"));

    let config_dir = match args.config_dir.clone() {
        Some(dir) => dir,
        None => config::default_dir()?,
    };
    let config = match ConfigStore::from_dir(&config_dir).load_or_init() {
        Ok(cfg) => cfg,
        Err(err) => {
            error!("failed to load config: {err:#}");
            SiteConfig::default()
        }
    };

    let runtime = tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;
    runtime.block_on(run(args, config, PreferenceStore::from_dir(config_dir)))
}

async fn run(args: Args, config: SiteConfig, preferences: PreferenceStore) -> Result<()> {
    let content = args
        .content
        .clone()
        .unwrap_or_else(|| config.content_base_url.clone());
    let assistant = config.assistant.api_key().map(|key| {
        Arc::new(GeminiAssistantProvider::new(config.assistant.base_url.clone(), key))
            as Arc<dyn AssistantProvider>
    });
    let services = Services {
        fetcher: content_fetcher(&content),
        analytics: Arc::new(TracingAnalytics::new(config.analytics.measurement_id.clone())),
        assistant,
        relay: Arc::new(HttpMailRelay::new(config.contact_endpoint.clone())),
        preferences,
    };

    let mut shell = Shell::new(&config, services, &args.fragment)?;
    info!(content = %content, "folio starting");
    println!(
        "{}",
        shell
            .start(args.lang.unwrap_or(config.default_language))
            .await
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        match Command::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => println!("{}", shell.handle(command).await),
            Err(err) => println!("{err:#}"),
        }
    }
    Ok(())
}

fn content_fetcher(content: &str) -> Arc<dyn ContentFetcher> {
    if content.starts_with("http://") || content.starts_with("https://") {
        Arc::new(HttpContentFetcher::new(content))
    } else {
        Arc::new(DirContentFetcher::new(content))
    }
}

fn init_local_logger(log_dir: &Path) -> tracing_appender::non_blocking::WorkerGuard {
    if let Err(err) = fs::create_dir_all(log_dir) {
        eprintln!("failed to create log dir `{}`: {err}", log_dir.display());
    }
    let file_appender = tracing_appender::rolling::daily(log_dir, "folio.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,folio=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .json()
        .with_writer(writer)
        .init();

    guard
}
