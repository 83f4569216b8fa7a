//! Mitra tutor server CLI
//!
//! Main entry point for serving the Mitra tutoring API.

use std::net::SocketAddr;
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use mitra_gemini::{GeminiClient, GeminiTutor};
use mitra_tutor::{create_router, AppConfig, AppState, SessionMachine, SessionStore};
use secrecy::SecretString;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Default port for the HTTP API server.
const DEFAULT_PORT: u16 = 3000;

/// Environment variable holding the Gemini API key.
const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Mitra - Hindi AI Tutor for JNV Entrance Exams
///
/// Serves the tutoring API: upload a problem image, then work through it
/// step by step with a Socratic Hindi tutor backed by Gemini.
#[derive(Parser, Debug)]
#[command(name = "mitra")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (default: mitra.json in current directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Path to the session state file (overrides the config)
    #[arg(short, long, value_name = "FILE")]
    state_file: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    verbose: bool,

    /// Port for the HTTP API server
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize tracing subscriber with appropriate filter
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Mitra tutor server starting");
    tracing::debug!(config = ?args.config, "Config file");

    match run_server(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Runs the tutor server.
///
/// 1. Load and validate config
/// 2. Read the Gemini API key
/// 3. Rehydrate the session from the state file
/// 4. Serve the HTTP API until Ctrl+C
async fn run_server(args: Args) -> anyhow::Result<()> {
    // Load configuration
    let mut config = load_config(args.config.as_deref())?;

    // Apply CLI argument overrides
    if let Some(ref state_file) = args.state_file {
        config.state_file.clone_from(state_file);
    }

    // Re-validate after overrides
    config.validate()?;

    print_config(&config);

    // Gemini API key comes from the environment only, never from the
    // config file, so it cannot end up committed to disk.
    let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
        anyhow::anyhow!(
            "{API_KEY_ENV} is not set\n\nSuggestion: export {API_KEY_ENV}=<your key> and try again"
        )
    })?;
    if api_key.trim().is_empty() {
        anyhow::bail!(
            "{API_KEY_ENV} is empty\n\nSuggestion: export {API_KEY_ENV}=<your key> and try again"
        );
    }

    let client = GeminiClient::new(
        SecretString::from(api_key),
        Duration::from_secs(config.request_timeout_secs),
    )
    .map_err(|e| anyhow::anyhow!("Failed to build Gemini client: {e}"))?;
    let driver = GeminiTutor::new(client, &config);

    // Rehydrate the session; a corrupt state file is discarded inside load
    let store = SessionStore::new(&config.state_file);
    let machine = SessionMachine::new(driver, store);
    let session = machine.session();
    if session.is_active() {
        println!(
            "Resumed session: {} messages, problem active",
            session.history.len()
        );
        tracing::info!(
            messages = session.history.len(),
            solved = session.is_solved,
            "Resumed persisted session"
        );
    } else {
        println!("Starting with a fresh session");
    }

    // Start the HTTP server
    let addr: SocketAddr = ([127, 0, 0, 1], args.port).into();
    println!();
    println!("Starting Mitra API server on {addr}...");

    let state = AppState::new(machine);
    let router = create_router(state);

    let listener = TcpListener::bind(addr).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to bind to {addr}: {e}\n\nSuggestion: Try a different port with --port"
        )
    })?;

    println!("Mitra API server running on http://{addr}");
    println!("Press Ctrl+C to stop");
    println!();

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server error: {e}"))?;

    println!("Mitra tutor server stopped");
    Ok(())
}

/// Completes when Ctrl+C is received.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        return;
    }
    tracing::info!("Received Ctrl+C, shutting down");
}

/// Loads configuration from the specified path or default location.
fn load_config(config_path: Option<&str>) -> anyhow::Result<AppConfig> {
    match config_path {
        Some(path_str) => {
            let path = Path::new(path_str);
            if !path.exists() {
                anyhow::bail!(
                    "Config file not found: '{}'\n\nSuggestion: Check the path or remove the --config flag to use defaults",
                    path.display()
                );
            }
            AppConfig::load_from_file(path).map_err(|e| anyhow::anyhow!("{e}"))
        }
        None => AppConfig::load().map_err(|e| anyhow::anyhow!("{e}")),
    }
}

/// Prints the loaded configuration.
fn print_config(config: &AppConfig) {
    println!("Configuration loaded:");
    println!("  State file: {}", config.state_file);
    println!("  Chat model: {}", config.chat_model);
    println!("  Extraction model: {}", config.extraction_model);
    println!("  Thinking budget: {}", config.thinking_budget);
    println!("  Request timeout: {}s", config.request_timeout_secs);
}
