mod api;
mod cli;
mod config;
mod domain;
mod risk;
mod session;
mod tradovate;

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use config::Config;
use tracing::{Level, error, info};
use tracing_subscriber::{EnvFilter, fmt};
use tradovate::{Client, ClientConfig, build_http_client};

const DEFAULT_CONFIG_PATH: &str = "configs/config.yaml";

fn parse_config_path() -> String {
    for arg in env::args().skip(1) {
        if let Some(path) = arg.strip_prefix("--config=") {
            return path.to_string();
        }
    }
    DEFAULT_CONFIG_PATH.to_string()
}

fn init_tracing(log_level: Option<&str>) {
    let level = match log_level {
        Some("debug") => Level::DEBUG,
        Some("info") => Level::INFO,
        Some("warn") | Some("warning") => Level::WARN,
        Some("error") => Level::ERROR,
        Some("trace") => Level::TRACE,
        _ => Level::INFO,
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let args: Vec<String> = env::args().skip(1).collect();
    let cli_mode = cli::is_cli_invocation(&args);

    let cli_args = if cli_mode {
        match cli::parse_args(&args) {
            Ok(parsed) if parsed.help => {
                println!("{}", cli::USAGE);
                return ExitCode::SUCCESS;
            }
            Ok(parsed) => Some(parsed),
            Err(e) => {
                eprintln!("Error: {}\n\n{}", e, cli::USAGE);
                return ExitCode::FAILURE;
            }
        }
    } else {
        None
    };

    let config_path = parse_config_path();
    let config = match Config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(config.app.log_level.as_deref());
    info!(config = %config_path, env = %config.app.env, "Configuration loaded");

    let result = match cli_args {
        Some(args) => run_cli(&config, &args).await,
        None => serve(&config).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Fatal error");
            eprintln!("Fatal error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_cli(config: &Config, args: &cli::CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    if config.tradovate.access_token.is_empty() {
        return Err(cli::CliError::MissingToken.into());
    }

    let environment = config.tradovate.environment;
    let base_url = config.tradovate.base_url_for(environment);
    println!("Environment: {}", environment.to_string().to_uppercase());
    println!("API URL:     {}\n", base_url);

    let client = Client::new(
        ClientConfig::new(base_url, config.tradovate.access_token.clone()),
        build_http_client()?,
    );

    let report = cli::run(args, Arc::new(client)).await?;
    print!("{}", cli::format_report(&report));
    println!("\nDone.");
    Ok(())
}

async fn serve(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let state = api::AppState::from_config(config, build_http_client()?);
    let app = api::router(state);

    let address = config.server().bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(
        address = %address,
        environment = %config.tradovate.environment,
        oauth = config.oauth().is_some(),
        cache_ttl = ?config.cache_ttl(),
        "Risk API listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
