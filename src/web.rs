use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{Router, extract::DefaultBodyLimit, routing::get};
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::WeatherWizConfig;
use crate::dashboard::{self, DashboardRenderer};
use crate::prediction::Predictor;
use crate::weather::{WeatherClient, WeatherProvider};
use crate::{api, image_encoder};

/// Shared, read-only handles for every request
#[derive(Clone)]
pub struct AppState {
    pub weather: Arc<dyn WeatherProvider>,
    pub predictor: Predictor,
    pub renderer: Arc<DashboardRenderer>,
}

impl AppState {
    pub fn from_config(config: &WeatherWizConfig) -> Result<Self> {
        let weather = WeatherClient::new(&config.weather)?;
        let logo = image_encoder::load_logo(&config.server.logo_path)
            .with_context(|| "Failed to load branding image")?;
        let renderer = DashboardRenderer::new(logo)?;

        Ok(Self {
            weather: Arc::new(weather),
            predictor: Predictor::new(&config.model),
            renderer: Arc::new(renderer),
        })
    }
}

pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(dashboard::show).post(dashboard::submit))
        .nest("/api", api::router())
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn run(config: WeatherWizConfig) -> Result<()> {
    let state = AppState::from_config(&config)?;
    let app = router(state, config.server.max_body_bytes);
    let addr = format!("{}:{}", config.server.host, config.server.port);

    #[cfg(feature = "tls")]
    if let (Some(cert), Some(key)) = (&config.server.tls_cert_path, &config.server.tls_key_path) {
        return serve_tls(app, &addr, cert, key).await;
    }

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Web server stopped");
    Ok(())
}

#[cfg(feature = "tls")]
async fn serve_tls(
    app: Router,
    addr: &str,
    cert: &std::path::Path,
    key: &std::path::Path,
) -> Result<()> {
    use axum_server::tls_rustls::RustlsConfig;

    let tls = RustlsConfig::from_pem_file(cert, key)
        .await
        .with_context(|| "Failed to load TLS certificate or key")?;
    let socket: std::net::SocketAddr = addr
        .parse()
        .with_context(|| format!("Invalid bind address {addr}"))?;

    let handle = axum_server::Handle::new();
    let shutdown = handle.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.graceful_shutdown(Some(std::time::Duration::from_secs(10)));
    });

    tracing::info!("Web server running at https://{}", addr);
    axum_server::bind_rustls(socket, tls)
        .handle(handle)
        .serve(app.into_make_service())
        .await?;

    tracing::info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
