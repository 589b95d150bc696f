//! CLI entrypoint and subcommand orchestration.

mod config;
mod daemon;
mod server;

use clap::{Parser, Subcommand};

#[cfg(not(test))]
use std::sync::Arc;

#[cfg(not(test))]
use config::Config;
#[cfg(not(test))]
use engine::WebDriverEngine;
#[cfg(not(test))]
use tools::{BrowserContext, ToolRegistry, register_browser_tools};
#[cfg(not(test))]
use tracing::{info, warn};
#[cfg(not(test))]
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Top-level command-line arguments for the wd-agent application.
#[derive(Parser)]
#[command(name = "wd-agent")]
#[command(about = "Browser automation agent over line-delimited JSON", version = "0.1.0")]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Enable debug logging to ~/.wd-agent/logs/
    #[arg(long, default_value_t = false)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// CLI subcommands available in the application.
#[derive(Subcommand)]
enum Commands {
    /// Serve tool calls on stdin/stdout (default when no subcommand is given)
    Serve,

    /// Print the tool catalog as JSON and exit
    Tools,
}

#[cfg(not(test))]
#[tokio::main]
/// Program entrypoint.
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Serve);

    // Stdout carries the protocol stream, so console logs go to stderr.
    // When --debug is passed, write debug-level logs to
    // ~/.wd-agent/logs/debug.YYYY-MM-DD.log using daily rotation.
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    // WorkerGuard must outlive main() so buffered file writes are flushed on exit.
    let _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>;

    if cli.debug {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let log_dir = std::path::PathBuf::from(home).join(".wd-agent").join("logs");
        std::fs::create_dir_all(&log_dir).ok();
        let appender = tracing_appender::rolling::daily(&log_dir, "debug.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        _file_guard = Some(guard);

        let console = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(console_filter);
        let file = fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
            .with_filter(EnvFilter::new("debug,hyper_util=info,rustls=info,reqwest=info"));
        tracing_subscriber::registry().with(console).with(file).init();
    } else {
        _file_guard = None;
        fmt()
            .with_env_filter(console_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let config = Config::load(cli.config.as_deref()).unwrap_or_else(|e| {
        warn!("Failed to load config ({e}), using defaults");
        Config::default()
    });

    match command {
        Commands::Serve => cmd_serve(config).await,
        Commands::Tools => cmd_tools(config),
    }
}

#[cfg(not(test))]
/// Builds the tool registry and browser context from config.
fn build_surface(config: &Config) -> (ToolRegistry, Arc<BrowserContext<WebDriverEngine>>) {
    let engine = WebDriverEngine::new(config.engine.clone());
    let ctx = Arc::new(BrowserContext::new(engine));
    let mut registry = ToolRegistry::new();
    register_browser_tools(&mut registry, &ctx);
    (registry, ctx)
}

#[cfg(not(test))]
/// Serves tool calls on stdin/stdout until EOF or a shutdown signal, then
/// sweeps any remaining browser sessions.
async fn cmd_serve(config: Config) -> anyhow::Result<()> {
    let (registry, ctx) = build_surface(&config);
    info!("wd-agent serving {} tools on stdin/stdout", registry.tool_names().len());

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    tokio::select! {
        result = server::serve(&registry, stdin, stdout) => {
            result?;
            info!("Input stream closed");
        }
        _ = daemon::wait_for_shutdown() => {
            info!("Shutdown signal received");
        }
    }

    ctx.shutdown().await;
    info!("wd-agent stopped");
    Ok(())
}

#[cfg(not(test))]
/// Prints the tool catalog as pretty JSON.
fn cmd_tools(config: Config) -> anyhow::Result<()> {
    let (registry, _ctx) = build_surface(&config);
    let defs = registry.definitions();
    println!("{}", serde_json::to_string_pretty(&defs)?);
    Ok(())
}
