use crate::{
    config::{self, ConfigSource, DB_TYPE, DatabaseKind, Env},
    descriptor::ConnectionDescriptor,
    metrics::{self, encode_metrics},
    probe::{Drivers, ProbeOutcome, Prober},
};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use std::{net::IpAddr, sync::Arc};
use tokio::{net::TcpListener, signal, time::Instant};
use tracing::{error, info, warn};

/// Resolve the configuration, build the descriptor and probe it
///
/// Configuration is read again on every call, nothing is cached.
pub async fn check<S>(source: &S, drivers: Drivers) -> ProbeOutcome
where
    S: ConfigSource + ?Sized,
{
    let started = Instant::now();
    let config = match config::resolve(source) {
        Ok(config) => config,
        Err(e) => {
            warn!("invalid database configuration: {e}");
            let outcome = ProbeOutcome::misconfigured(&e);
            let kind = DatabaseKind::normalize(source.get(DB_TYPE).as_deref());
            metrics::record(kind, &outcome, started.elapsed());
            return outcome;
        }
    };

    let descriptor = ConnectionDescriptor::build(&config);

    Prober::new(config.timeout)
        .with_drivers(drivers)
        .probe(&descriptor)
        .await
}

/// HTTP status for an outcome
#[must_use]
pub const fn status_code(outcome: &ProbeOutcome) -> StatusCode {
    if outcome.ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

#[derive(Clone)]
pub struct AppState {
    source: Arc<dyn ConfigSource + Send + Sync>,
    drivers: Drivers,
}

impl AppState {
    #[must_use]
    pub fn new(source: Arc<dyn ConfigSource + Send + Sync>, drivers: Drivers) -> Self {
        Self { source, drivers }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(Env), Drivers::compiled())
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(hello))
        .route("/db/health", get(db_health))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

async fn hello() -> &'static str {
    "Hello, World!"
}

async fn db_health(State(state): State<AppState>) -> impl IntoResponse {
    let outcome = check(&*state.source, state.drivers).await;
    (status_code(&outcome), Json(outcome))
}

async fn metrics_handler() -> impl IntoResponse {
    match encode_metrics() {
        Ok(buffer) => (StatusCode::OK, buffer),
        Err(e) => {
            error!("{e}");
            (StatusCode::INTERNAL_SERVER_ERROR, Vec::new())
        }
    }
}

/// Start the HTTP server and serve until Ctrl-C or SIGTERM
///
/// # Errors
///
/// Returns an error if the server fails to bind or serve
pub async fn start(listen: IpAddr, port: u16) -> anyhow::Result<()> {
    let app = router(AppState::default());

    let listener = TcpListener::bind((listen, port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received");
}
