//! BlendIQ - blend-ratio optimizer service
//!
//! # Usage
//!
//! ```bash
//! # Run the HTTP API (default subcommand)
//! blendiq serve --addr 0.0.0.0:8080
//!
//! # One-shot optimization: request JSON on stdin, result JSON on stdout
//! blendiq optimize < request.json
//!
//! # Validate a config file, or print the defaults as TOML
//! blendiq check-config --config blendiq.toml
//! blendiq check-config --print-defaults
//! ```
//!
//! # Environment Variables
//!
//! - `BLENDIQ_CONFIG`: Path to the TOML config file
//! - `BLENDIQ_SERVER_ADDR`: Bind address (overridden by `--addr`)
//! - `BLENDIQ_CORS_ORIGINS`: Comma-separated origins allowed cross-origin
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use blendiq::api::{create_app, ApiState, BlendRequest};
use blendiq::config::{BlendiqConfig, CONFIG_ENV_VAR, LOCAL_CONFIG_FILE};
use blendiq::optimization::BlendOptimizer;
use blendiq::types::OptimizationResult;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "blendiq")]
#[command(about = "BlendIQ soil and compost blend-ratio optimizer")]
#[command(version)]
struct CliArgs {
    /// Config file to use instead of the BLENDIQ_CONFIG / ./blendiq.toml search
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<SubCommand>,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Run the HTTP API
    Serve {
        /// Override the server address (default: "0.0.0.0:8080")
        #[arg(short, long, env = "BLENDIQ_SERVER_ADDR")]
        addr: Option<String>,
    },

    /// Optimize one request read from a file or stdin and print the result
    Optimize {
        /// Request JSON file; reads stdin when omitted
        #[arg(short, long, value_name = "PATH")]
        input: Option<PathBuf>,
        /// Pretty-print the result
        #[arg(long)]
        pretty: bool,
    },

    /// Validate the config file and report warnings
    CheckConfig {
        /// Print the built-in defaults as TOML and exit
        #[arg(long)]
        print_defaults: bool,
    },
}

// ============================================================================
// Logging
// ============================================================================

/// Logs go to stderr so `optimize` output on stdout stays machine-readable.
fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(path: Option<&Path>) -> Result<BlendiqConfig> {
    match path {
        Some(p) => BlendiqConfig::load_from_file(p)
            .with_context(|| format!("Failed to load config from {}", p.display())),
        None => Ok(BlendiqConfig::load()),
    }
}

// ============================================================================
// Subcommands
// ============================================================================

async fn run_server(config: BlendiqConfig, addr: String) -> Result<()> {
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("  BlendIQ - Blend-Ratio Optimizer v{}", env!("CARGO_PKG_VERSION"));
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!(
        limits = config.reference.limits.len(),
        max_materials = config.server.max_materials,
        timeout_secs = config.server.optimize_timeout_secs,
        "Reference tables and limits loaded"
    );

    let app = create_app(ApiState::from_config(&config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    info!("✓ HTTP server listening on {}", addr);

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("🛑 Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancel_token.cancelled().await;
            info!("[HttpServer] Received shutdown signal");
        })
        .await
        .context("HTTP server error")?;

    info!("✓ BlendIQ shutdown complete");
    Ok(())
}

fn read_request(input: Option<&Path>) -> Result<BlendRequest> {
    let raw = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("Invalid request JSON")
}

fn optimize_once(config: &BlendiqConfig, input: Option<&Path>) -> Result<OptimizationResult> {
    let request = read_request(input)?;
    request.validate(config.server.max_materials)?;

    let optimizer = BlendOptimizer::new(config.reference.clone(), config.solver.clone());
    Ok(optimizer.optimize(&request.materials, &request.config))
}

/// Prints the result, or an error object with `success: false`, on stdout.
fn run_optimize(config: &BlendiqConfig, input: Option<&Path>, pretty: bool) -> Result<bool> {
    let (value, ok) = match optimize_once(config, input) {
        Ok(result) => (serde_json::to_value(&result)?, true),
        Err(e) => {
            warn!(error = %format!("{e:#}"), "Optimization request failed");
            (
                serde_json::json!({
                    "success": false,
                    "errorMessage": format!("{e:#}"),
                    "warnings": [],
                }),
                false,
            )
        }
    };

    let out = if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    println!("{out}");
    Ok(ok)
}

fn run_check_config(path: Option<PathBuf>, print_defaults: bool) -> Result<()> {
    if print_defaults {
        print!("{}", BlendiqConfig::default().to_toml()?);
        return Ok(());
    }

    let path = path
        .or_else(|| std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from))
        .or_else(|| {
            let local = PathBuf::from(LOCAL_CONFIG_FILE);
            local.exists().then_some(local)
        });

    match path {
        Some(p) => {
            // Unknown keys and suspicious values are logged during the load
            BlendiqConfig::load_from_file(&p)
                .with_context(|| format!("Config check failed for {}", p.display()))?;
            info!(path = %p.display(), "✓ Config is valid");
        }
        None => info!("No config file found; built-in defaults are in effect"),
    }
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_json);

    match args.command {
        Some(SubCommand::CheckConfig { print_defaults }) => {
            run_check_config(args.config, print_defaults)
        }
        Some(SubCommand::Optimize { input, pretty }) => {
            let config = load_config(args.config.as_deref())?;
            // Engine work is CPU-bound; keep it off the async workers
            let ok = tokio::task::spawn_blocking(move || {
                run_optimize(&config, input.as_deref(), pretty)
            })
            .await
            .context("Optimization task panicked")??;
            if !ok {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(SubCommand::Serve { addr }) => {
            let config = load_config(args.config.as_deref())?;
            let addr = addr.unwrap_or_else(|| config.server.addr.clone());
            run_server(config, addr).await
        }
        None => {
            let config = load_config(args.config.as_deref())?;
            let addr = std::env::var("BLENDIQ_SERVER_ADDR")
                .unwrap_or_else(|_| config.server.addr.clone());
            run_server(config, addr).await
        }
    }
}
