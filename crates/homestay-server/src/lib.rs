//! Homestay Server: the HTTP API for the review, application and CMS
//! platform.
//!
//! [`app`] builds the router over shared [`AppState`]; [`start_server`]
//! connects to the database, binds the listener and serves until Ctrl-C
//! or SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::{
        HeaderName, HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
};
use homestay_db::DbManager;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

pub mod config;
pub mod error;
pub mod extract;
pub mod mail;
pub mod media;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::{ApiError, ServerError};
pub use state::AppState;

const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Build the router with CORS and request tracing.
pub fn app(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    Router::new()
        .merge(routes::router())
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .expose_headers([HeaderName::from_static(routes::TOTAL_COUNT_HEADER)])
        .max_age(Duration::from_secs(60 * 60))
}

pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    info!("Initializing state...");
    let db = DbManager::connect(&config.db).await?;

    let state = AppState::new(
        db.client().clone(),
        config.auth.clone(),
        config.cookie_secure,
        mail::from_config(&config.mail),
        media::from_config(&config.media),
    );

    spawn_session_cleanup(state.clone());

    let app = app(state, &config.cors_origins);

    let address = format!("0.0.0.0:{}", config.port);
    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

fn spawn_session_cleanup(state: Arc<AppState>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            match state.auth.cleanup_expired_sessions().await {
                Ok(0) => {}
                Ok(removed) => info!(removed, "Purged expired sessions"),
                Err(e) => error!(error = %e, "Session cleanup failed"),
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
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
}
