//! HTTP API over [`TenKLookup`].
//!
//! | Route | Response |
//! |---|---|
//! | `GET /api/search?q=` | `{ companies: [...] }` |
//! | `GET /api/company/:identifier/10k` | [`Filing10KResult`](crate::Filing10KResult) |
//! | `GET /api/download/:cik/:accessionNumber/:primaryDocument` | document bytes as an attachment |
//! | `GET /api/download-url/:cik/:accessionNumber/:primaryDocument` | `{ downloadUrl }` |
//! | `GET /api/health` | `{ status: "OK", timestamp }` |
//!
//! Errors are `{ error }` bodies: 400 for bad input, 404 when nothing was
//! found, 500 otherwise.

use super::company::{CompanyDirectory, CompanyRecord};
use super::error::EdgarError;
use super::report::{Filing10KResult, TenKLookup};
use super::traits::FilingOperations;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

type SharedLookup<F, D> = Arc<TenKLookup<F, D>>;

/// Error body returned by every route.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Maps a lookup error to a response. Internal failures are reported with
    /// the route's generic `context` message; the detail only goes to the log.
    fn from_edgar(err: EdgarError, context: &str) -> Self {
        tracing::error!("{}: {}", context, err);
        match err {
            EdgarError::Validation(message) => Self::new(StatusCode::BAD_REQUEST, message),
            EdgarError::NotFound(message) => Self::new(StatusCode::NOT_FOUND, message),
            _ => Self::new(StatusCode::INTERNAL_SERVER_ERROR, context),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: &self.message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    q: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub companies: Vec<CompanyRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DownloadUrlResponse {
    #[serde(rename = "downloadUrl")]
    pub download_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

async fn search<F, D>(
    State(lookup): State<SharedLookup<F, D>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError>
where
    F: FilingOperations + 'static,
    D: CompanyDirectory + 'static,
{
    let query = params
        .q
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| {
            ApiError::new(StatusCode::BAD_REQUEST, "Query parameter \"q\" is required")
        })?;

    let companies = lookup
        .search(&query)
        .map_err(|e| ApiError::from_edgar(e, "Failed to search companies"))?;
    Ok(Json(SearchResponse { companies }))
}

async fn company_10k<F, D>(
    State(lookup): State<SharedLookup<F, D>>,
    Path(identifier): Path<String>,
) -> Result<Json<Filing10KResult>, ApiError>
where
    F: FilingOperations + 'static,
    D: CompanyDirectory + 'static,
{
    lookup
        .most_recent_10k(&identifier)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_edgar(e, "Failed to fetch 10-K data"))
}

async fn download<F, D>(
    State(lookup): State<SharedLookup<F, D>>,
    Path((cik, accession_number, primary_document)): Path<(String, String, String)>,
) -> Result<Response, ApiError>
where
    F: FilingOperations + 'static,
    D: CompanyDirectory + 'static,
{
    let content = lookup
        .download_document(&cik, &accession_number, &primary_document)
        .await
        .map_err(|e| ApiError::from_edgar(e, "Failed to download document"))?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        primary_document.replace(['"', '\\'], "")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/html".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        content,
    )
        .into_response())
}

async fn download_url<F, D>(
    State(lookup): State<SharedLookup<F, D>>,
    Path((cik, accession_number, primary_document)): Path<(String, String, String)>,
) -> Result<Json<DownloadUrlResponse>, ApiError>
where
    F: FilingOperations + 'static,
    D: CompanyDirectory + 'static,
{
    lookup
        .download_url(&cik, &accession_number, &primary_document)
        .map(|download_url| Json(DownloadUrlResponse { download_url }))
        .map_err(|e| ApiError::from_edgar(e, "Failed to generate download URL"))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "Not found")
}

/// Builds the API router around a shared lookup service.
pub fn router<F, D>(lookup: SharedLookup<F, D>) -> Router
where
    F: FilingOperations + 'static,
    D: CompanyDirectory + 'static,
{
    Router::new()
        .route("/api/search", get(search::<F, D>))
        .route("/api/company/:identifier/10k", get(company_10k::<F, D>))
        .route(
            "/api/download/:cik/:accession_number/:primary_document",
            get(download::<F, D>),
        )
        .route(
            "/api/download-url/:cik/:accession_number/:primary_document",
            get(download_url::<F, D>),
        )
        .route("/api/health", get(health))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(lookup)
}
