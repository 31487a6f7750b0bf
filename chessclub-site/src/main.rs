use std::{env, future, process};

use chessclub_site::{cli, config::Config, http, logs, state::AppState};
use log::{error, info};
use tokio::{net::TcpListener, signal};

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {err}");
            future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(err) => {
                error!("Failed to listen for SIGTERM: {err}");
                future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, finishing open requests");
}

fn load_env_file(args: &cli::Args) -> Result<(), dotenvy::Error> {
    match &args.env_file {
        Some(path) => dotenvy::from_path(path),
        None => match dotenvy::dotenv() {
            Ok(_) => Ok(()),
            Err(err) if err.not_found() => Ok(()),
            Err(err) => Err(err),
        },
    }
}

#[tokio::main]
async fn main() {
    let args = cli::parse(env::args().skip(1).collect());

    if let Err(err) = load_env_file(&args) {
        eprintln!("Failed to load environment file: {err}");
        process::exit(1);
    }

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Invalid configuration: {err}");
            process::exit(1);
        }
    };
    if let Some(address) = args.address {
        config.address = address;
    }

    let _log_handle = match logs::init(&config.log) {
        Ok(handle) => handle,
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    };

    let state = match AppState::from_config(&config) {
        Ok(state) => state,
        Err(err) => {
            error!("Failed to build HTTP client: {err}");
            process::exit(1);
        }
    };
    info!("Reading events from {}", state.events.name());

    let listener = match TcpListener::bind(config.address).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind {}: {err}", config.address);
            process::exit(1);
        }
    };
    info!("Listening at http://{}", config.address);

    if let Err(err) = axum::serve(listener, http::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {err}");
        process::exit(1);
    }
}
