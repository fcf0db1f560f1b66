//! Paste a video URL, pick a quality, get the file back.
//!
//! The extraction itself is delegated to yt-dlp through the [`extractor::Extractor`]
//! trait; this crate orders the calls and renders the form around them.

use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use std::sync::{Arc, RwLock};
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::extractor::Extractor;

// --- Modules ---
pub mod config;
pub mod daemon;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod handlers;
pub mod models;
pub mod page;
pub mod resolver;
pub mod selector;
pub mod session;

pub use extractor::YtDlp;
pub use models::{DownloadOutcome, FormatVariant, ResolutionResult, SelectableOption};
pub use session::{Session, SessionState};

// --- State Type Aliases ---
pub type ConfigState = Arc<RwLock<Config>>;

#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<dyn Extractor>,
    pub config: ConfigState,
}

impl AppState {
    pub fn new(extractor: Arc<dyn Extractor>, config: Config) -> Self {
        Self {
            extractor,
            config: Arc::new(RwLock::new(config)),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    // Only the read-only JSON listing is open to other origins; files and
    // config stay same-origin.
    let api = Router::new()
        .route("/formats", get(handlers::list_formats))
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any).allow_methods([Method::GET]));

    Router::new()
        .route("/", get(handlers::index))
        .route("/download", post(handlers::download))
        .route("/files/*name", get(handlers::get_file))
        .route("/config", get(handlers::get_config).post(handlers::update_config))
        .merge(api)
        .with_state(state)
}

/// Runs the web server in the foreground until the listener fails.
pub async fn run_server() -> anyhow::Result<()> {
    let config = config::load_config().await?;
    let addr = config.bind_address();
    let extractor = Arc::new(YtDlp::new(&config.ytdlp_path));
    tracing::info!("Using extraction service at {}", extractor.binary().display());

    let app = build_router(AppState::new(extractor, config));
    tracing::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
