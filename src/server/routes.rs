//! Router configuration for image delivery.
//!
//! # Route Structure
//!
//! ```text
//! /health          - Health check
//! /                - Index of listing pages
//! /image/{id}      - Stored bytes (Direct)
//! /s3/{id}         - 302 to presigned object-store URL (ObjectStoreIndirect)
//! /cf/{id}         - 302 to signed CDN URL (CdnIndirect)
//! /{page}          - Catalog listing for one strategy
//! ```
//!
//! # Example
//!
//! ```ignore
//! use image_delivery::server::routes::{create_router, RouterConfig};
//!
//! let router = create_router(resolver, catalog, RouterConfig::new());
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{routing::get, Router};
use http::header::CONTENT_TYPE;
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    cdn_redirect_handler, content_handler, health_handler, index_handler, listing_handler,
    object_store_redirect_handler, AppState,
};
use crate::delivery::DeliveryResolver;
use crate::store::ResourceStore;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Clone, Debug)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a router configuration with CORS open to any origin and
    /// request tracing enabled.
    pub fn new() -> Self {
        Self {
            cors_origins: None,
            enable_tracing: true,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
pub fn create_router<S>(
    resolver: DeliveryResolver<S>,
    catalog: Vec<String>,
    config: RouterConfig,
) -> Router
where
    S: ResourceStore + 'static,
{
    let app_state = AppState::new(resolver, catalog);
    let cors = build_cors_layer(&config);

    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/", get(index_handler))
        .route("/image/{resource_id}", get(content_handler::<S>))
        .route("/s3/{resource_id}", get(object_store_redirect_handler::<S>))
        .route("/cf/{resource_id}", get(cdn_redirect_handler::<S>))
        .route("/{page}", get(listing_handler::<S>))
        .with_state(app_state)
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(86400));

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
