//! HTTP server layer for image delivery.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │     GET /image/{id}   GET /s3/{id}   GET /cf/{id}   GET /{page} │
//! │                                                                 │
//! │        ┌──────────────────────┐  ┌─────────────────────────┐    │
//! │        │      handlers        │  │        routes           │    │
//! │        │ (requests, errors)   │  │  (router config)        │    │
//! │        └──────────────────────┘  └─────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    cdn_redirect_handler, content_handler, health_handler, index_handler, listing_handler,
    object_store_redirect_handler, AppState, ErrorResponse, HealthResponse, IndexResponse,
    ListingResponse, PageLink, URL_EXPIRES_HEADER,
};
pub use routes::{create_router, RouterConfig};
