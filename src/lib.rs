//! # Image Delivery
//!
//! Serve images from a byte store, or hand out time-limited URLs that let
//! clients fetch them straight from S3 or a CloudFront-style CDN.
//!
//! ## Features
//!
//! - **Direct delivery**: Stored bytes served with their MIME type
//! - **Presigned object-store URLs**: SigV4 query-string URLs for S3 and S3-compatible stores
//! - **Signed CDN URLs**: RSA-SHA1 canned-policy URLs with an URL-safe base64 signature
//! - **Redirect endpoints**: `302` responses pointing at a freshly signed URL
//!
//! ## Architecture
//!
//! - [`signing`] - Key loading, object-store presigning, CDN signing
//! - [`store`] - Byte store backing direct delivery
//! - [`delivery`] - Strategy selection and dispatch
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::{Duration, SystemTime};
//!
//! use image_delivery::{CdnSigner, KeyMaterial};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let key = KeyMaterial::from_file("private.pem", "APKAEXAMPLE")?;
//! let signer = CdnSigner::new("d111111abcdef8.cloudfront.net", Arc::new(key));
//! let signed = signer.sign("10kb.png", Duration::from_secs(86_400), SystemTime::now())?;
//! println!("{}", signed.url());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod delivery;
pub mod error;
pub mod server;
pub mod signing;
pub mod store;

// Re-export commonly used types
pub use config::{Cli, Command, ServeConfig, SignConfig, SignOutputFormat, SignScheme};
pub use delivery::{DeliveryResolver, DeliveryResult, DeliveryStrategy, UnknownStrategy};
pub use error::{DeliveryError, KeyLoadError, NotFoundError, SigningError, StoreError};
pub use server::{create_router, AppState, ErrorResponse, RouterConfig};
pub use signing::{
    create_s3_client, CannedPolicy, CdnSigner, Clock, FixedClock, KeyMaterial, ObjectStoreSigner,
    SignedUrl, SystemClock, UrlSigner, DEFAULT_URL_TTL_SECS, MAX_PRESIGN_TTL_SECS,
};
pub use store::{DirectoryStore, MemoryStore, Resource, ResourceStore, DEFAULT_CATALOG};
