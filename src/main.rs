use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use eyre::Result;
use log::{debug, info};

use ytqa::config::{self, Config};
use ytqa::llm::LlmClient;
use ytqa::{QaRequest, QaService, ReplyFormat, TranscriptCache, YoutubeCaptions};

mod cli;

use cli::{Cli, Command, OutputFormat};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_FRONTEND_DIR: &str = "frontend";

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytqa.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytqa")
        .join("logs")
}

fn build_service(cli: &Cli, config: &Config) -> Result<QaService> {
    let mut llm = LlmClient::new(cli.api_key.clone())?;
    if let Some(base_url) = &config.base_url {
        llm = llm.with_base_url(base_url.as_str());
    }
    if let Some(model) = cli.model.as_ref().or(config.model.as_ref()) {
        llm = llm.with_model(model.as_str());
    }
    debug!("Using model {}", llm.model());

    let cache = match config.cache_capacity {
        Some(capacity) => TranscriptCache::with_capacity_limit(capacity),
        None => TranscriptCache::new(),
    };

    let languages = if cli.languages.is_empty() {
        config.languages.clone().unwrap_or_default()
    } else {
        cli.languages.clone()
    };

    let source = Arc::new(YoutubeCaptions::new(reqwest::Client::new()));
    Ok(QaService::new(source, cache, llm).with_languages(languages))
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let cli = Cli::parse();

    // Load config file (non-fatal if missing/invalid)
    let config = Config::load().unwrap_or_default();
    if cli.verbose {
        let config_path = config::config_path();
        if config_path.exists() {
            eprintln!("Config: {}", config_path.display());
        }
    }

    let service = build_service(&cli, &config)?;

    match &cli.command {
        Command::Serve { host, port, frontend } => {
            let host = host.as_deref().or(config.host.as_deref()).unwrap_or(DEFAULT_HOST);
            let port = port.or(config.port).unwrap_or(DEFAULT_PORT);
            let frontend = frontend
                .clone()
                .or_else(|| config.frontend_dir.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FRONTEND_DIR));

            let addr = format!("{host}:{port}");
            eprintln!("Listening on http://{addr}");
            ytqa::server::run(&addr, service, &frontend).await?;
        }
        Command::Ask { url, question } => {
            let request = QaRequest {
                video_url: url.clone(),
                question: question.clone(),
            };
            let result = service.ask(&request).await?;
            if cli.verbose && result.format == ReplyFormat::Fallback {
                eprintln!("Model reply did not follow the ANSWER/CONTEXT format");
            }
            println!("Answer: {}\n\nContext: {}", result.answer, result.context);
        }
        Command::Transcript { url, timestamps, format } => {
            if *timestamps {
                let segments = service.transcript_segments(url).await?;
                if cli.verbose {
                    eprintln!("Segments: {}", segments.len());
                }
                let rendered = match format {
                    OutputFormat::Text => ytqa::output::render_timestamped(&segments),
                    OutputFormat::Json => ytqa::output::render_json(&segments),
                };
                println!("{rendered}");
            } else {
                println!("{}", service.transcript(url).await?);
            }
        }
    }

    Ok(())
}
