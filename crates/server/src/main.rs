use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use fragments_server::api::{self, AppState};
use fragments_server::auth::AuthProvider;
use fragments_server::auth::config::AuthFileConfig;
use fragments_server::auth::password::hash_password;
use fragments_server::config::FragmentsConfig;
use fragments_server::storage_factory::create_storage;
use fragments_server::telemetry;
use fragments_service::FragmentService;

/// Fragments HTTP server.
#[derive(Parser, Debug)]
#[command(name = "fragments-server", about = "Standalone HTTP server for fragments")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "fragments.toml")]
    config: String,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print an argon2 hash for auth.toml. Reads the password from stdin.
    HashPassword,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(Commands::HashPassword) = cli.command {
        return run_hash_password();
    }

    telemetry::init();

    let config_path = Path::new(&cli.config);
    let mut config = if config_path.exists() {
        let contents = std::fs::read_to_string(config_path)?;
        FragmentsConfig::from_toml(&contents)?
    } else {
        info!(path = %cli.config, "config file not found, using defaults");
        FragmentsConfig::default()
    };
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let storage_config = config.storage.clone().with_env_overrides();
    let storage = create_storage(&storage_config).await?;
    let service =
        FragmentService::new(storage).with_max_fragment_size(config.fragments.max_size_bytes);

    let mut state = AppState::new(service);
    if let Some(url) = config.server.external_url.clone() {
        state = state.with_external_url(url);
    }
    if config.auth.enabled {
        let provider = load_auth(config_path, config.auth.config_path.as_deref())?;
        info!(users = provider.user_count(), "basic authentication enabled");
        state = state.with_auth(Arc::new(provider));
    } else {
        warn!("authentication disabled, all requests run as the anonymous owner");
    }

    let app = api::router(state);
    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "fragments-server listening");

    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(());
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_rx.changed().await.ok();
            })
            .await
    });

    tokio::select! {
        result = &mut server => {
            result??;
        }
        () = shutdown_signal() => {
            shutdown_tx.send(()).ok();
            let timeout_secs = config.server.shutdown_timeout_seconds;
            info!(timeout_secs, "draining in-flight requests");
            if tokio::time::timeout(Duration::from_secs(timeout_secs), server).await.is_err() {
                warn!(timeout_secs, "shutdown timeout exceeded, dropping remaining connections");
            }
        }
    }

    info!("fragments-server shut down");
    Ok(())
}

/// Load `auth.toml`, resolving a relative path against the config file's directory.
fn load_auth(
    config_path: &Path,
    auth_path: Option<&str>,
) -> Result<AuthProvider, Box<dyn std::error::Error>> {
    let auth_path = auth_path.unwrap_or("auth.toml");
    let resolved = match config_path.parent() {
        Some(dir) if Path::new(auth_path).is_relative() => dir.join(auth_path),
        _ => Path::new(auth_path).to_path_buf(),
    };
    let contents = std::fs::read_to_string(&resolved)
        .map_err(|e| format!("failed to read auth config {}: {e}", resolved.display()))?;
    let auth_config = AuthFileConfig::from_toml(&contents)?;
    Ok(AuthProvider::new(&auth_config)?)
}

/// Run the `hash-password` subcommand: read a password from stdin, print its hash.
fn run_hash_password() -> Result<(), Box<dyn std::error::Error>> {
    let mut password = String::new();
    std::io::Read::read_to_string(&mut std::io::stdin(), &mut password)?;
    let password = password.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        return Err("password must not be empty".into());
    }
    println!("{}", hash_password(password)?);
    Ok(())
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT"); }
        () = terminate => { info!("received SIGTERM"); }
    }
}
