use crate::{
    config::{self, Config},
    error::AppError,
    fetcher,
    models::{DownloadForm, FormatsResponse, UrlQuery},
    page, resolver,
    selector::selectable,
    session::Session,
    AppState,
};
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse},
    Form, Json,
};
use std::path::PathBuf;

// ===================================================================
//                          FORM HANDLERS
// ===================================================================

/// # GET / - The form; with `?url=` it also resolves and lists qualities.
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<UrlQuery>,
) -> Result<Html<String>, AppError> {
    let download_dir = download_dir(&state)?;
    let session = Session::new(state.extractor.as_ref(), &download_dir);
    let url = params.url.unwrap_or_default();
    let current = session.submit_url(&url).await;
    Ok(Html(page::render(&current)))
}

/// # POST /download - Downloads the chosen quality and offers the file back.
pub async fn download(
    State(state): State<AppState>,
    Form(form): Form<DownloadForm>,
) -> Result<Html<String>, AppError> {
    if form.url.trim().is_empty() {
        return Err(AppError::BadRequest("URL cannot be empty".to_string()));
    }
    let download_dir = download_dir(&state)?;
    let session = Session::new(state.extractor.as_ref(), &download_dir);
    let current = session.download(&form.url, &form.quality).await;
    Ok(Html(page::render(&current)))
}

// ===================================================================
//                          FORMATS HANDLER
// ===================================================================

/// # GET /formats - JSON list of selectable qualities for a URL.
pub async fn list_formats(
    State(state): State<AppState>,
    Query(params): Query<UrlQuery>,
) -> Result<impl IntoResponse, AppError> {
    let url = params.url.unwrap_or_default();
    if url.trim().is_empty() {
        return Err(AppError::BadRequest("URL parameter cannot be empty".to_string()));
    }

    let resolution = resolver::resolve(state.extractor.as_ref(), url.trim())
        .await
        .map_err(AppError::Resolution)?;
    let options = selectable(&resolution.variants);

    Ok((StatusCode::OK, Json(FormatsResponse { title: resolution.title, options })))
}

// ===================================================================
//                          FILE HANDLER
// ===================================================================

/// # GET /files/:name - Serves a produced file as a video/mp4 attachment.
///
/// Names that `fetcher::destination_for` could not have produced are 404.
pub async fn get_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if !fetcher::is_output_name(&name) {
        return Err(AppError::NotFound(format!("File '{}' not found.", name)));
    }
    let download_dir = download_dir(&state)?;
    let file_path = download_dir.join(&name);

    let canonical_base = tokio::fs::canonicalize(&download_dir)
        .await
        .map_err(|_| AppError::NotFound(format!("File '{}' not found.", name)))?;
    let canonical_file = tokio::fs::canonicalize(&file_path)
        .await
        .map_err(|_| AppError::NotFound(format!("File '{}' not found.", name)))?;

    if !canonical_file.starts_with(&canonical_base) || !canonical_file.is_file() {
        return Err(AppError::NotFound("File not found.".to_string()));
    }

    let file = tokio::fs::File::open(&canonical_file).await?;
    let body = Body::from_stream(tokio_util::io::ReaderStream::new(file));

    let file_name = canonical_file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let disposition = format!("attachment; filename=\"{}\"", file_name.replace('"', "_"));

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("video/mp4"));
    // Non-ASCII names are not valid header bytes; fall back to a bare attachment.
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition).unwrap_or_else(|_| HeaderValue::from_static("attachment")),
    );

    Ok((headers, body))
}

// ===================================================================
//                          CONFIG HANDLERS
// ===================================================================

/// # GET /config - Returns the current application configuration.
pub async fn get_config(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let config = state
        .config
        .read()
        .map_err(|_| anyhow::anyhow!("config lock poisoned"))?
        .clone();
    Ok((StatusCode::OK, Json(config)))
}

/// # POST /config - Updates the configuration and saves it to disk.
///
/// `ytdlp_path`, `host` and `port` take effect on the next start.
pub async fn update_config(
    State(state): State<AppState>,
    Json(payload): Json<Config>,
) -> Result<impl IntoResponse, AppError> {
    *state
        .config
        .write()
        .map_err(|_| anyhow::anyhow!("config lock poisoned"))? = payload.clone();
    config::save_config(&payload).await?;
    tracing::info!("Configuration updated and saved.");
    Ok((StatusCode::OK, Json(payload)))
}

// ===================================================================
//                          HELPER FUNCTIONS
// ===================================================================

fn download_dir(state: &AppState) -> Result<PathBuf, AppError> {
    let config = state
        .config
        .read()
        .map_err(|_| anyhow::anyhow!("config lock poisoned"))?;
    Ok(PathBuf::from(&config.download_directory))
}
