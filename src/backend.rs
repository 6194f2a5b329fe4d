use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::{
    cmp::Ordering,
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering as AtomicOrdering},
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tokio::{sync::RwLock, time::Instant};
use tower_http::services::{ServeDir, ServeFile};
use url::Url;

use crate::feed::ProjectRecord;

const DEFAULT_PROJECTS_CONFIG_PATH: &str = "config/projects.json";
const DEFAULT_PROJECTS_RELOAD_SECONDS: u64 = 300;
const DEFAULT_PROJECT_IMAGE: &str = "/previews/default.svg";
const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;

const PROJECTS_RELOAD_SECONDS_BOUNDS: (u64, u64) = (1, 86_400);

const REQUEST_ID_HEADER: &str = "x-request-id";

static REQUEST_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, PartialEq, Eq)]
enum LogLevel {
    Debug,
    Info,
}

impl PartialOrd for LogLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LogLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        fn rank(level: LogLevel) -> u8 {
            match level {
                LogLevel::Debug => 0,
                LogLevel::Info => 1,
            }
        }

        rank(*self).cmp(&rank(*other))
    }
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
        }
    }
}

#[derive(Clone)]
struct RuntimeConfig {
    projects_path: PathBuf,
    reload_after: Duration,
    log_level: LogLevel,
}

impl RuntimeConfig {
    fn from_env() -> Self {
        let projects_path = parse_env_non_empty_string("PROJECTS_CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROJECTS_CONFIG_PATH));
        let reload_seconds = parse_env_u64_with_bounds(
            "PROJECTS_RELOAD_SECONDS",
            DEFAULT_PROJECTS_RELOAD_SECONDS,
            PROJECTS_RELOAD_SECONDS_BOUNDS,
        );
        let log_level = parse_log_level("LOG_LEVEL", DEFAULT_LOG_LEVEL);

        Self {
            projects_path,
            reload_after: Duration::from_secs(reload_seconds),
            log_level,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    listing: Arc<RwLock<ProjectListing>>,
    config: RuntimeConfig,
}

/// In-memory copy of the projects config, re-read once it goes stale.
#[derive(Default)]
struct ProjectListing {
    loaded_at: Option<Instant>,
    records: Vec<ProjectRecord>,
}

struct LoadOutcome {
    records: Vec<ProjectRecord>,
    dropped_links: usize,
    replaced_images: usize,
}

#[derive(Serialize)]
struct ErrorPayload {
    ok: bool,
    error: &'static str,
}

impl ErrorPayload {
    fn new(error: &'static str) -> Self {
        Self { ok: false, error }
    }
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let port = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);
    let bind_address = format!("0.0.0.0:{port}");
    let config = RuntimeConfig::from_env();

    let state = AppState {
        listing: Arc::new(RwLock::new(ProjectListing::default())),
        config,
    };

    let static_service = ServeDir::new("dist").not_found_service(ServeFile::new("dist/index.html"));

    let app = Router::new()
        .route("/api/projects", get(get_projects))
        .fallback_service(static_service)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    println!("server listening on http://127.0.0.1:{port}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn get_projects(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let request_started_at = Instant::now();
    let request_id = resolve_request_id(&headers);

    log_event(
        &state.config,
        LogLevel::Debug,
        "projects_request_start",
        serde_json::json!({
            "request_id": request_id.as_str(),
        }),
    );

    let cached = {
        let listing = state.listing.read().await;
        if listing_is_stale(listing.loaded_at, Instant::now(), state.config.reload_after) {
            None
        } else {
            Some(listing.records.clone())
        }
    };

    let records = match cached {
        Some(records) => {
            log_event(
                &state.config,
                LogLevel::Debug,
                "projects_cache_decision",
                serde_json::json!({
                    "request_id": request_id.as_str(),
                    "memory_cache": "hit",
                }),
            );
            records
        }
        None => match load_projects_from_disk(&state.config.projects_path) {
            Ok(outcome) => {
                let mut listing = state.listing.write().await;
                listing.loaded_at = Some(Instant::now());
                listing.records = outcome.records.clone();

                log_event(
                    &state.config,
                    LogLevel::Info,
                    "projects_reloaded",
                    serde_json::json!({
                        "request_id": request_id.as_str(),
                        "count": outcome.records.len(),
                        "dropped_links": outcome.dropped_links,
                        "replaced_images": outcome.replaced_images,
                    }),
                );
                outcome.records
            }
            Err(error_message) => {
                log_event(
                    &state.config,
                    LogLevel::Info,
                    "projects_request_failed",
                    serde_json::json!({
                        "request_id": request_id.as_str(),
                        "error_class": "config_unavailable",
                        "message": error_message,
                        "duration_ms": request_started_at.elapsed().as_millis(),
                    }),
                );
                return json_error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorPayload::new(error_message),
                    &request_id,
                );
            }
        },
    };

    log_event(
        &state.config,
        LogLevel::Info,
        "projects_request_served",
        serde_json::json!({
            "request_id": request_id.as_str(),
            "count": records.len(),
            "duration_ms": request_started_at.elapsed().as_millis(),
        }),
    );

    let mut response_headers = HeaderMap::new();
    response_headers.insert(header::CACHE_CONTROL, cache_control("public, max-age=60"));
    response_with_request_id(StatusCode::OK, response_headers, Json(records), &request_id)
}

/// The config file may be a bare array or wrapped in a `projects` key.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum ProjectsConfig {
    Bare(Vec<ProjectRecord>),
    Wrapped { projects: Vec<ProjectRecord> },
}

impl ProjectsConfig {
    fn into_records(self) -> Vec<ProjectRecord> {
        match self {
            Self::Bare(records) => records,
            Self::Wrapped { projects } => projects,
        }
    }
}

fn load_projects_from_disk(path: &Path) -> Result<LoadOutcome, &'static str> {
    let raw = fs::read_to_string(path).map_err(|_| "failed reading projects config")?;
    let parsed: ProjectsConfig =
        serde_json::from_str(&raw).map_err(|_| "failed parsing projects config")?;

    let mut dropped_links = 0;
    let mut replaced_images = 0;
    let records = parsed
        .into_records()
        .into_iter()
        .map(|record| sanitize_record(record, &mut dropped_links, &mut replaced_images))
        .collect::<Vec<_>>();

    Ok(LoadOutcome {
        records,
        dropped_links,
        replaced_images,
    })
}

/// Link hygiene: a bad project link becomes no link at all, a bad image
/// falls back to the bundled placeholder. Order of records is preserved.
fn sanitize_record(
    mut record: ProjectRecord,
    dropped_links: &mut usize,
    replaced_images: &mut usize,
) -> ProjectRecord {
    if let Some(link) = record.project_url.as_deref() {
        if !is_allowed_link(link) {
            record.project_url = None;
            *dropped_links += 1;
        }
    }

    if !is_allowed_link(&record.image_url) {
        record.image_url = DEFAULT_PROJECT_IMAGE.to_string();
        *replaced_images += 1;
    }

    record
}

/// Site-relative paths and absolute http(s) URLs only.
fn is_allowed_link(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }

    if let Some(rest) = value.strip_prefix('/') {
        // Scheme-relative URLs dodge the scheme check; reject them.
        return !rest.starts_with('/');
    }

    match Url::parse(value) {
        Ok(url) => url.scheme() == "http" || url.scheme() == "https",
        Err(_) => false,
    }
}

fn listing_is_stale(loaded_at: Option<Instant>, now: Instant, reload_after: Duration) -> bool {
    match loaded_at {
        Some(loaded_at) => now.duration_since(loaded_at) >= reload_after,
        None => true,
    }
}

fn json_error_response(
    status: StatusCode,
    payload: ErrorPayload,
    request_id: &str,
) -> axum::response::Response {
    let mut headers = HeaderMap::new();
    headers.insert(header::CACHE_CONTROL, cache_control("no-store"));
    response_with_request_id(status, headers, Json(payload), request_id)
}

fn cache_control(value: &str) -> HeaderValue {
    HeaderValue::from_str(value).unwrap_or_else(|_| HeaderValue::from_static("no-store"))
}

fn response_with_request_id(
    status: StatusCode,
    mut headers: HeaderMap,
    payload: impl IntoResponse,
    request_id: &str,
) -> axum::response::Response {
    if let Ok(request_id_header) = HeaderValue::from_str(request_id) {
        headers.insert(REQUEST_ID_HEADER, request_id_header);
    }
    (status, headers, payload).into_response()
}

fn parse_env_u64_with_bounds(name: &str, default: u64, bounds: (u64, u64)) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}

fn parse_env_non_empty_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_log_level(name: &str, default: LogLevel) -> LogLevel {
    match parse_env_non_empty_string(name)
        .unwrap_or_else(|| default.as_str().to_string())
        .to_ascii_lowercase()
        .as_str()
    {
        "debug" => LogLevel::Debug,
        "info" => LogLevel::Info,
        _ => default,
    }
}

fn now_unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_millis())
        .unwrap_or(0)
}

fn now_unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_secs())
        .unwrap_or(0)
}

fn generate_request_id() -> String {
    let counter = REQUEST_ID_COUNTER.fetch_add(1, AtomicOrdering::Relaxed);
    format!("req-{}-{counter}", now_unix_millis())
}

fn resolve_request_id(headers: &HeaderMap) -> String {
    let value = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|raw| raw.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string);

    value.unwrap_or_else(generate_request_id)
}

fn log_event(config: &RuntimeConfig, level: LogLevel, event: &str, fields: serde_json::Value) {
    if level < config.log_level {
        return;
    }

    let mut payload = serde_json::Map::new();
    payload.insert(
        "ts".to_string(),
        serde_json::Value::Number(serde_json::Number::from(now_unix_seconds())),
    );
    payload.insert(
        "level".to_string(),
        serde_json::Value::String(level.as_str().to_string()),
    );
    payload.insert(
        "event".to_string(),
        serde_json::Value::String(event.to_string()),
    );

    if let serde_json::Value::Object(extra) = fields {
        for (key, value) in extra {
            payload.insert(key, value);
        }
    }

    println!("{}", serde_json::Value::Object(payload));
}
