//! Serve mode — connects to PostgreSQL, applies migrations, and runs the
//! REST API until Ctrl-C or SIGTERM.
//!
//! In this mode, the daemon:
//! 1. Opens the PostgreSQL pool
//! 2. Applies embedded migrations (unless skipped)
//! 3. Wires store → grader → router
//! 4. Serves HTTP, draining in-flight requests on shutdown for at most
//!    `server.shutdown_timeout_secs`

use std::future::IntoFuture;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info, warn};

use grading_api::{ApiState, build_router};
use grading_core::ServiceConfig;
use grading_engine::Grader;
use grading_store::{GradeStore, PgGradeStore};

/// Run the HTTP server until a shutdown signal arrives.
pub async fn run_serve(config: ServiceConfig, skip_migrations: bool) -> anyhow::Result<()> {
    info!(
        service = %config.log.service_name,
        version = env!("CARGO_PKG_VERSION"),
        "grading daemon starting"
    );

    // ── Storage ──────────────────────────────────────────────────
    let pool = grading_store::connect(&config.database).await?;
    if skip_migrations {
        warn!("skipping database migrations");
    } else {
        grading_store::migrate(&pool).await?;
    }
    let store: Arc<dyn GradeStore> = Arc::new(PgGradeStore::new(pool.clone()));

    // ── Engine + API ─────────────────────────────────────────────
    let grader = Grader::new(store, &config.grading);
    let state = ApiState::new(Arc::new(grader)).with_default_limit(config.grading.default_limit);
    let router = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %listener.local_addr()?, "API server starting");

    // ── Shutdown ─────────────────────────────────────────────────
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let server = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
        })
        .into_future();

    let drain_timeout = config.server.shutdown_timeout();
    let drain_deadline = async move {
        if shutdown_rx.changed().await.is_err() {
            // Server ended without a signal; let the server branch report it.
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(drain_timeout).await;
    };

    tokio::select! {
        result = server => result?,
        _ = drain_deadline => {
            warn!(timeout = ?drain_timeout, "graceful shutdown did not complete in time");
        }
    }

    pool.close().await;
    info!("grading daemon stopped");
    Ok(())
}

/// Resolve on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl-C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
