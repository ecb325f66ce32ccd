use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use ie_domain::config::Config;
use ie_gateway::api;
use ie_gateway::runtime::cancel::CancelMap;
use ie_gateway::runtime::session_lock::SessionLockMap;
use ie_gateway::state::AppState;
use ie_providers::GroqProvider;
use ie_search::{TavilySearch, ToolGateway};
use ie_sessions::SessionStore;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,ie_gateway=debug")),
        )
        .init();

    let config = Arc::new(load_config()?);

    let model: Arc<dyn ie_providers::LanguageModel> =
        Arc::new(GroqProvider::from_config(&config.llm)?);
    let search = Arc::new(TavilySearch::from_config(&config.search)?);
    let tools = Arc::new(ToolGateway::new(search, config.search.max_results));
    let sessions = Arc::new(SessionStore::new(
        &config.sessions.state_path,
        config.sessions.title_max_chars,
    )?);

    let state = AppState {
        config: config.clone(),
        model,
        tools,
        sessions: sessions.clone(),
        session_locks: Arc::new(SessionLockMap::new()),
        cancel_map: Arc::new(CancelMap::new()),
    };

    let cors = cors_layer(&config)?;

    let app = api::router()
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(ConcurrencyLimitLayer::new(
            config.server.max_concurrent_requests,
        ))
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server host/port")?;

    tracing::info!(%addr, model = %config.llm.model, "insight-engine listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // Final index write so a shutdown mid-batch leaves nothing behind in
    // memory only.
    sessions.flush()?;
    tracing::info!("shutdown complete");
    Ok(())
}

/// Load configuration from `IE_CONFIG` (or `./config.toml`); missing file
/// means built-in defaults.
fn load_config() -> anyhow::Result<Config> {
    let path = std::env::var("IE_CONFIG").unwrap_or_else(|_| "config.toml".to_owned());
    match std::fs::read_to_string(&path) {
        Ok(raw) => {
            let config: Config =
                toml::from_str(&raw).with_context(|| format!("failed to parse {path}"))?;
            tracing::info!(path = %path, "configuration loaded");
            Ok(config)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path, "no config file, using defaults");
            Ok(Config::default())
        }
        Err(e) => Err(e).with_context(|| format!("failed to read {path}")),
    }
}

fn cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("invalid CORS origin {origin:?}"))
        })
        .collect::<anyhow::Result<_>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(tower_http::cors::Any))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("ctrl-c received"),
        _ = terminate => tracing::info!("SIGTERM received"),
    }
}
