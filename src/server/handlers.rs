//! HTTP request handlers for the image delivery API.
//!
//! # Endpoints
//!
//! - `GET /image/{id}` - Serve stored bytes
//! - `GET /s3/{id}` - Redirect to a presigned object-store URL
//! - `GET /cf/{id}` - Redirect to a signed CDN URL
//! - `GET /{page}` - List the catalog for one delivery strategy
//! - `GET /` - Index of listing pages
//! - `GET /health` - Health check endpoint

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

use crate::delivery::{DeliveryResolver, DeliveryResult, DeliveryStrategy};
use crate::error::{DeliveryError, SigningError, StoreError};
use crate::store::ResourceStore;

/// Header carrying the expiry (Unix epoch seconds) of a redirect target.
pub const URL_EXPIRES_HEADER: &str = "x-url-expires";

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the resolver and the catalog.
pub struct AppState<S: ResourceStore> {
    /// Strategy dispatcher
    pub resolver: Arc<DeliveryResolver<S>>,

    /// Resource ids listed on every page, in order
    pub catalog: Arc<Vec<String>>,
}

impl<S: ResourceStore> AppState<S> {
    pub fn new(resolver: DeliveryResolver<S>, catalog: Vec<String>) -> Self {
        Self {
            resolver: Arc::new(resolver),
            catalog: Arc::new(catalog),
        }
    }
}

impl<S: ResourceStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
            catalog: Arc::clone(&self.catalog),
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "not_found", "signing_failed")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// One strategy's listing page.
#[derive(Debug, Serialize)]
pub struct ListingResponse {
    /// Strategy slug (e.g. "cf-direct")
    pub strategy: String,

    /// Page title
    pub title: String,

    /// One link per catalog entry
    pub images: Vec<String>,
}

/// Entry of the index page.
#[derive(Debug, Serialize)]
pub struct PageLink {
    pub title: String,
    pub href: String,
}

/// Index of all listing pages.
#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub pages: Vec<PageLink>,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert DeliveryError to HTTP response.
///
/// 4xx responses are logged at WARN, 5xx at ERROR.
impl IntoResponse for DeliveryError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            DeliveryError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            DeliveryError::Store(StoreError::InvalidId(_)) => {
                (StatusCode::BAD_REQUEST, "invalid_resource_id")
            }
            DeliveryError::Store(StoreError::Io(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "store_error")
            }
            DeliveryError::Signing(SigningError::NoCredentials) => {
                (StatusCode::SERVICE_UNAVAILABLE, "no_credentials")
            }
            DeliveryError::Signing(SigningError::InvalidTtl { .. }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "invalid_ttl")
            }
            DeliveryError::Signing(SigningError::SigningFailed(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "signing_failed")
            }
        };
        let message = self.to_string();

        if status.is_server_error() {
            error!(
                error_type = error_type,
                status = status.as_u16(),
                "Request failed: {}",
                message
            );
        } else {
            warn!(
                error_type = error_type,
                status = status.as_u16(),
                "Request rejected: {}",
                message
            );
        }

        (
            status,
            Json(ErrorResponse::with_status(error_type, message, status)),
        )
            .into_response()
    }
}

fn page_not_found(page: &str) -> Response {
    let status = StatusCode::NOT_FOUND;
    warn!(page = page, "Unknown listing page");
    (
        status,
        Json(ErrorResponse::with_status(
            "not_found",
            format!("Unknown page: {}", page),
            status,
        )),
    )
        .into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check handler.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Index of the listing pages.
pub async fn index_handler() -> Json<IndexResponse> {
    let pages = DeliveryStrategy::ALL
        .into_iter()
        .map(|strategy| PageLink {
            title: strategy.title().to_string(),
            href: format!("/{}", strategy.slug()),
        })
        .collect();
    Json(IndexResponse { pages })
}

/// Serve the stored bytes of a resource with its MIME type.
pub async fn content_handler<S: ResourceStore + 'static>(
    State(state): State<AppState<S>>,
    Path(resource_id): Path<String>,
) -> Result<Response, DeliveryError> {
    let result = state
        .resolver
        .resolve(&resource_id, DeliveryStrategy::Direct)
        .await?;
    Ok(into_http_response(result))
}

/// Redirect to a presigned object-store URL.
pub async fn object_store_redirect_handler<S: ResourceStore + 'static>(
    State(state): State<AppState<S>>,
    Path(resource_id): Path<String>,
) -> Result<Response, DeliveryError> {
    let result = state
        .resolver
        .resolve(&resource_id, DeliveryStrategy::ObjectStoreIndirect)
        .await?;
    Ok(into_http_response(result))
}

/// Redirect to a signed CDN URL.
pub async fn cdn_redirect_handler<S: ResourceStore + 'static>(
    State(state): State<AppState<S>>,
    Path(resource_id): Path<String>,
) -> Result<Response, DeliveryError> {
    let result = state
        .resolver
        .resolve(&resource_id, DeliveryStrategy::CdnIndirect)
        .await?;
    Ok(into_http_response(result))
}

/// List the catalog for the strategy named by `page`.
pub async fn listing_handler<S: ResourceStore + 'static>(
    State(state): State<AppState<S>>,
    Path(page): Path<String>,
) -> Response {
    let strategy = match page.parse::<DeliveryStrategy>() {
        Ok(strategy) => strategy,
        Err(_) => return page_not_found(&page),
    };

    match state.resolver.listing(&state.catalog, strategy).await {
        Ok(images) => Json(ListingResponse {
            strategy: strategy.slug().to_string(),
            title: strategy.title().to_string(),
            images,
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

fn into_http_response(result: DeliveryResult) -> Response {
    match result {
        DeliveryResult::Content(resource) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, resource.mime)],
            resource.bytes,
        )
            .into_response(),
        DeliveryResult::Redirect(signed) => {
            let expires = signed.expires_epoch_secs().to_string();
            (
                StatusCode::FOUND,
                [
                    (header::LOCATION, signed.into_url()),
                    (header::CACHE_CONTROL, "no-store".to_string()),
                    (header::HeaderName::from_static(URL_EXPIRES_HEADER), expires),
                ],
            )
                .into_response()
        }
    }
}
