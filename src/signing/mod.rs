//! Signed URL issuance.
//!
//! Two signing schemes sit behind one contract, [`UrlSigner`]:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            DeliveryResolver             │
//! └────────────────────┬────────────────────┘
//!                      │ sign_at(id, ttl, now)
//!          ┌───────────┴───────────┐
//!          ▼                       ▼
//! ┌─────────────────┐    ┌─────────────────────┐
//! │ObjectStoreSigner│    │     CdnSigner       │
//! │ (S3 SigV4)      │    │ (RSA-SHA1 canned)   │
//! └─────────────────┘    └──────────┬──────────┘
//!                                   │
//!                        ┌──────────▼──────────┐
//!                        │    KeyMaterial      │
//!                        └─────────────────────┘
//! ```
//!
//! Every signer receives the issuance instant from its caller rather than
//! reading the clock, so a request's expiry is computed from a single reading.

mod cdn;
mod clock;
mod key;
mod object_store;

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

use crate::error::SigningError;

pub use cdn::{cdn_base64_decode, cdn_base64_encode, sign_canned, CannedPolicy, CdnSigner};
pub use clock::{Clock, FixedClock, SystemClock};
pub use key::KeyMaterial;
pub use object_store::{create_s3_client, ObjectStoreSigner, MAX_PRESIGN_TTL_SECS};

/// Default validity window for issued URLs (one day).
pub const DEFAULT_URL_TTL_SECS: u64 = 86_400;

/// A URL carrying a time-limited signature.
///
/// Built fresh for every request and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    url: String,
    expires_at: SystemTime,
}

impl SignedUrl {
    pub fn new(url: String, expires_at: SystemTime) -> Self {
        Self { url, expires_at }
    }

    /// The signed target URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Absolute instant after which the signature is rejected.
    pub fn expires_at(&self) -> SystemTime {
        self.expires_at
    }

    /// Expiry as Unix epoch seconds.
    pub fn expires_epoch_secs(&self) -> u64 {
        self.expires_at
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    pub fn into_url(self) -> String {
        self.url
    }
}

/// Issuance and expiry of one signature, in whole epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validity {
    pub issued_at: u64,
    pub expires_at: u64,
}

impl Validity {
    /// Compute the validity window for a signature issued at `now`.
    ///
    /// The TTL must be at least one second and at most `max_ttl_secs`, which
    /// keeps the expiry strictly after `now` at epoch-second granularity.
    pub fn compute(now: SystemTime, ttl: Duration, max_ttl_secs: u64) -> Result<Self, SigningError> {
        let ttl_secs = ttl.as_secs();
        if ttl_secs == 0 || ttl_secs > max_ttl_secs {
            return Err(SigningError::InvalidTtl {
                ttl_secs,
                max_secs: max_ttl_secs,
            });
        }

        let issued_at = now
            .duration_since(UNIX_EPOCH)
            .map_err(|_| SigningError::SigningFailed("clock is before the Unix epoch".to_string()))?
            .as_secs();

        let expires_at = issued_at
            .checked_add(ttl_secs)
            .ok_or(SigningError::InvalidTtl {
                ttl_secs,
                max_secs: max_ttl_secs,
            })?;

        Ok(Self {
            issued_at,
            expires_at,
        })
    }

    pub fn issued_time(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(self.issued_at)
    }

    pub fn expiry_time(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(self.expires_at)
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.expires_at - self.issued_at)
    }
}

/// A scheme that turns a resource identifier into a time-limited URL.
#[async_trait]
pub trait UrlSigner: Send + Sync {
    /// Short name of the signing scheme, used in logs.
    fn scheme(&self) -> &'static str;

    /// Sign `resource_id` for `ttl`, treating `now` as the issuance instant.
    async fn sign_at(
        &self,
        resource_id: &str,
        ttl: Duration,
        now: SystemTime,
    ) -> Result<SignedUrl, SigningError>;
}
