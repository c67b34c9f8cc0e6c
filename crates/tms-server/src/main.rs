//! tms server binary.
//!
//! - `tms-server`                             : serve the HTTP API
//! - `tms-server hash-password <pass> [cost]` : print a bcrypt hash for `seed_users`

use std::process::ExitCode;

use tms_core::error::{Result, TmsError};
use tracing_subscriber::{fmt, EnvFilter};

use tms_server::config::AuthSection;
use tms_server::repo::Repository;
use tms_server::store::Store;
use tms_server::{app_state, auth, config, router};

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let outcome = match args.first().map(String::as_str) {
        Some("hash-password") => hash_password(&args[1..]),
        Some(other) => Err(TmsError::Validation(format!("unknown command: {other}"))),
        None => serve().await,
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.client_code().as_str(), error = %e, "tms-server exiting");
            ExitCode::FAILURE
        }
    }
}

/// Cost: explicit argument, else `auth.bcrypt_cost` of the stage config,
/// else the built-in default.
fn hash_password(args: &[String]) -> Result<()> {
    let Some(password) = args.first() else {
        return Err(TmsError::Validation(
            "usage: tms-server hash-password <password> [cost]".into(),
        ));
    };
    let cost = match args.get(1) {
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| TmsError::Validation(format!("invalid bcrypt cost: {raw}")))?,
        None => config::load_for_stage()
            .map(|cfg| cfg.auth.bcrypt_cost)
            .unwrap_or_else(|_| AuthSection::default().bcrypt_cost),
    };
    let hash = auth::hash_password(password, cost)?;
    println!("{hash}");
    Ok(())
}

async fn serve() -> Result<()> {
    let cfg = config::load_for_stage()?;

    // Store connectivity is checked here; failure is fatal.
    let store = Store::open(&cfg.database)
        .map_err(|e| TmsError::Internal(format!("store open failed: {e}")))?;

    if !cfg.seed_users.is_empty() {
        let conn = store
            .connect()
            .map_err(|e| TmsError::Internal(format!("store connect failed: {e}")))?;
        let inserted = Repository::new(&conn).seed_users(&cfg.seed_users)?;
        tracing::info!(configured = cfg.seed_users.len(), inserted, "seed users applied");
    }

    let listen = cfg.server.listen_addr();
    let state = app_state::AppState::new(cfg, store)?;
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&listen)
        .await
        .map_err(|e| TmsError::Internal(format!("bind {listen} failed: {e}")))?;
    tracing::info!(%listen, "tms-server starting");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| TmsError::Internal(format!("server failed: {e}")))?;

    tracing::info!("tms-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
}
