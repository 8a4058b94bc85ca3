//! JSON API consumed by the site's page components.

use crate::config::Config;
use crate::content::{AboutKind, ContentType, LocalizedContentItem};
use crate::i18n::{Locale, LocaleInfo};
use crate::localizer::{localize_about_item, LocalizedAboutItem};
use crate::resolver::{FallbackSnapshot, ListQuery, LocaleResolver};
use crate::security::preview_allowed;
use crate::store::{ContentStore, StoreError};
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub const PREVIEW_TOKEN_HEADER: &str = "x-preview-token";

const MAX_SLUG_LEN: usize = 200;

static SLUG_REGEX: OnceLock<Regex> = OnceLock::new();

#[derive(Clone)]
pub struct AppState {
    resolver: LocaleResolver,
    config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn ContentStore>, config: Config) -> Self {
        Self {
            resolver: LocaleResolver::new(store, config.locales.clone()),
            config: Arc::new(config),
        }
    }

    pub fn resolver(&self) -> &LocaleResolver {
        &self.resolver
    }
}

// ==================== Errors ====================

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error("preview requires a valid token")]
    Forbidden,

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Store(e) => {
                error!("Content store failure: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = match self {
            ApiError::Store(_) => "internal server error".to_string(),
            other => other.to_string(),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

// ==================== Request/response types ====================

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub locale: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub search: Option<String>,
    pub category: Option<i64>,
    pub preview: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ItemParams {
    pub locale: Option<String>,
    pub preview: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AboutParams {
    pub locale: Option<String>,
    pub kind: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContentEnvelope<T> {
    pub data: T,
    pub locale: Locale,
    pub requested_locale: Locale,
    pub used_fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct LocalesResponse {
    pub default_locale: Locale,
    pub locales: Vec<&'static LocaleInfo>,
}

// ==================== Helpers ====================

fn is_valid_slug(slug: &str) -> bool {
    let regex = SLUG_REGEX.get_or_init(|| {
        Regex::new(r"^[\p{L}\p{N}]+(?:[-_.][\p{L}\p{N}]+)*$").expect("slug pattern is valid")
    });
    slug.len() <= MAX_SLUG_LEN && regex.is_match(slug)
}

fn is_preview_flag(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("1" | "true" | "yes"))
}

/// Raw requested locale: the `locale` query parameter, else the first
/// `Accept-Language` entry.
fn raw_locale<'a>(param: Option<&'a str>, headers: &'a HeaderMap) -> Option<&'a str> {
    param.or_else(|| {
        headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .and_then(|tag| tag.split(';').next())
            .map(str::trim)
            .filter(|tag| !tag.is_empty() && *tag != "*")
    })
}

impl AppState {
    fn requested_locale(&self, param: Option<&str>, headers: &HeaderMap) -> Locale {
        self.config.locales.negotiate(raw_locale(param, headers))
    }

    fn preview(&self, flag: Option<&str>, headers: &HeaderMap) -> Result<bool, ApiError> {
        if !is_preview_flag(flag) {
            return Ok(false);
        }

        let presented = headers
            .get(PREVIEW_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok());
        if preview_allowed(self.config.preview_token.as_deref(), presented) {
            Ok(true)
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

fn content_type(segment: &str) -> Result<ContentType, ApiError> {
    ContentType::from_segment(segment).ok_or(ApiError::NotFound)
}

// ==================== Router ====================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/locales", get(list_locales))
        .route("/api/about", get(list_about))
        .route("/api/metrics/fallback", get(fallback_metrics))
        .route("/api/:content_type", get(list_content))
        .route("/api/:content_type/:slug", get(get_content))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ==================== Handlers ====================

async fn health_check(State(state): State<AppState>) -> Response {
    match state.resolver.store().ping().await {
        Ok(()) => Json(serde_json::json!({ "status": "ok" })).into_response(),
        Err(e) => {
            error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "status": "unavailable" })),
            )
                .into_response()
        }
    }
}

async fn list_locales(State(state): State<AppState>) -> Json<LocalesResponse> {
    let settings = state.resolver.settings();
    Json(LocalesResponse {
        default_locale: settings.default_locale(),
        locales: settings.enabled().iter().map(Locale::info).collect(),
    })
}

async fn fallback_metrics(State(state): State<AppState>) -> Json<FallbackSnapshot> {
    Json(state.resolver.metrics().snapshot())
}

async fn list_content(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    Query(params): Query<ListParams>,
    headers: HeaderMap,
) -> Result<Json<ContentEnvelope<Vec<LocalizedContentItem>>>, ApiError> {
    let content_type = content_type(&segment)?;
    let requested = state.requested_locale(params.locale.as_deref(), &headers);
    let preview = state.preview(params.preview.as_deref(), &headers)?;

    let query = ListQuery {
        search: params.search,
        category_id: params.category,
        page: params.page.unwrap_or(1).max(1),
        page_size: state.config.page_size(params.page_size),
    };

    let resolved = state
        .resolver
        .list(content_type, &query, requested, preview)
        .await?;

    Ok(Json(ContentEnvelope {
        data: resolved.value,
        locale: resolved.locale,
        requested_locale: requested,
        used_fallback: resolved.used_fallback,
        page: Some(query.page),
        page_size: Some(query.page_size),
    }))
}

async fn get_content(
    State(state): State<AppState>,
    Path((segment, slug)): Path<(String, String)>,
    Query(params): Query<ItemParams>,
    headers: HeaderMap,
) -> Result<Json<ContentEnvelope<LocalizedContentItem>>, ApiError> {
    let content_type = content_type(&segment)?;
    if !is_valid_slug(&slug) {
        return Err(ApiError::NotFound);
    }
    let requested = state.requested_locale(params.locale.as_deref(), &headers);
    let preview = state.preview(params.preview.as_deref(), &headers)?;

    let resolved = state
        .resolver
        .find(content_type, &slug, requested, preview)
        .await?;
    let item = resolved.value.ok_or(ApiError::NotFound)?;

    Ok(Json(ContentEnvelope {
        data: item,
        locale: resolved.locale,
        requested_locale: requested,
        used_fallback: resolved.used_fallback,
        page: None,
        page_size: None,
    }))
}

async fn list_about(
    State(state): State<AppState>,
    Query(params): Query<AboutParams>,
    headers: HeaderMap,
) -> Result<Json<ContentEnvelope<Vec<LocalizedAboutItem>>>, ApiError> {
    let kind = params
        .kind
        .as_deref()
        .map(str::parse::<AboutKind>)
        .transpose()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let requested = state.requested_locale(params.locale.as_deref(), &headers);
    let default = state.resolver.settings().default_locale();

    let items: Vec<_> = state
        .resolver
        .store()
        .about_items(kind)
        .await?
        .iter()
        .filter(|item| item.is_displayable())
        .map(|item| localize_about_item(item, requested, default))
        .collect();
    let used_fallback = items.iter().any(|item| item.used_fallback);

    Ok(Json(ContentEnvelope {
        data: items,
        locale: requested,
        requested_locale: requested,
        used_fallback,
        page: None,
        page_size: None,
    }))
}
