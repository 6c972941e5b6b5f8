use crate::{config::Config, oauth, session::MemorySessionStore};
use anyhow::Context;
use axum::{Router, extract::FromRef, http::StatusCode};
use std::{
    net::{Ipv4Addr, SocketAddr},
    sync::Arc,
    time::Duration,
};
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer, compression::CompressionLayer, timeout::TimeoutLayer,
    trace::TraceLayer,
};

mod error;
mod routes;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: MemorySessionStore,
}

impl AppState {
    pub fn new(config: Config, sessions: MemorySessionStore) -> Self {
        Self {
            config: Arc::new(config),
            sessions,
        }
    }
}

impl FromRef<AppState> for MemorySessionStore {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

pub async fn serve(config: Config) -> anyhow::Result<()> {
    let callback_url = oauth::google::PROVIDER.callback_url(&config.auth_url);
    if let Err(e) =
        oauth::google::new_flow(&config.google_client_id, &config.google_client_secret)
            .and_then(|flow| flow.authorization_url(&callback_url))
    {
        log::warn!("Google authorization is misconfigured, /GoogleAuth will answer 500: {e}");
    }

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
    let listener = TcpListener::bind(addr).await?;
    let sessions = MemorySessionStore::new(Duration::from_secs(config.session_ttl));
    let app = app_router(AppState::new(config, sessions));

    log::info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Error when trying to run HTTP server")
}

pub fn app_router(app_state: AppState) -> Router {
    routes::router(app_state).layer((
        CompressionLayer::new(),
        TraceLayer::new_for_http().on_failure(()),
        TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, Duration::from_secs(30)),
        CatchPanicLayer::new(),
    ))
}

async fn shutdown_signal() {
    use tokio::signal;
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C signal handler");
    };
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install terminate signal handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("Shutting down");
}
