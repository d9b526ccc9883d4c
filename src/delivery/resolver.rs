//! Strategy dispatch for image delivery.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::error::{DeliveryError, NotFoundError, StoreError};
use crate::signing::{Clock, SignedUrl, SystemClock, UrlSigner, DEFAULT_URL_TTL_SECS};
use crate::store::{Resource, ResourceStore};

use super::DeliveryStrategy;

/// Outcome of resolving one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryResult {
    /// The stored bytes, to be served as-is
    Content(Resource),

    /// A signed URL the caller should be redirected to
    Redirect(SignedUrl),
}

/// Uniform entry point over direct bytes, object-store URLs and CDN URLs.
///
/// Nothing is cached: every call reads the clock once and produces a fresh
/// signature with a fresh expiry window.
pub struct DeliveryResolver<S: ResourceStore> {
    store: S,
    object_store: Arc<dyn UrlSigner>,
    cdn: Arc<dyn UrlSigner>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl<S: ResourceStore> DeliveryResolver<S> {
    /// Create a resolver using the system clock and a one-day TTL.
    pub fn new(store: S, object_store: Arc<dyn UrlSigner>, cdn: Arc<dyn UrlSigner>) -> Self {
        Self {
            store,
            object_store,
            cdn,
            clock: Arc::new(SystemClock),
            ttl: Duration::from_secs(DEFAULT_URL_TTL_SECS),
        }
    }

    /// Set the validity window of issued URLs.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolve `resource_id` under `strategy`.
    ///
    /// `Direct` reads the byte store. Every other strategy signs a fresh
    /// URL; the indirect variants yield the same external URL their
    /// redirect endpoints send the caller to.
    pub async fn resolve(
        &self,
        resource_id: &str,
        strategy: DeliveryStrategy,
    ) -> Result<DeliveryResult, DeliveryError> {
        match strategy {
            DeliveryStrategy::Direct => {
                let resource = self
                    .store
                    .fetch(resource_id)
                    .await?
                    .ok_or_else(|| NotFoundError::new(resource_id))?;
                debug!(
                    resource_id = resource_id,
                    mime = %resource.mime,
                    size = resource.bytes.len(),
                    "Resolved direct content"
                );
                Ok(DeliveryResult::Content(resource))
            }
            DeliveryStrategy::ObjectStoreIndirect | DeliveryStrategy::ObjectStoreDirect => {
                let signed = self.sign(&*self.object_store, resource_id, strategy).await?;
                Ok(DeliveryResult::Redirect(signed))
            }
            DeliveryStrategy::CdnIndirect | DeliveryStrategy::CdnDirect => {
                let signed = self.sign(&*self.cdn, resource_id, strategy).await?;
                Ok(DeliveryResult::Redirect(signed))
            }
        }
    }

    /// The link a listing page shows for `resource_id` under `strategy`.
    ///
    /// Direct and indirect strategies point at this service's own endpoints;
    /// the external strategies are signed on the spot.
    pub async fn link(
        &self,
        resource_id: &str,
        strategy: DeliveryStrategy,
    ) -> Result<String, DeliveryError> {
        let encoded = urlencoding::encode(resource_id);
        match strategy {
            DeliveryStrategy::Direct => Ok(format!("/image/{}", encoded)),
            DeliveryStrategy::ObjectStoreIndirect => Ok(format!("/s3/{}", encoded)),
            DeliveryStrategy::CdnIndirect => Ok(format!("/cf/{}", encoded)),
            DeliveryStrategy::ObjectStoreDirect => Ok(self
                .sign(&*self.object_store, resource_id, strategy)
                .await?
                .into_url()),
            DeliveryStrategy::CdnDirect => Ok(self
                .sign(&*self.cdn, resource_id, strategy)
                .await?
                .into_url()),
        }
    }

    /// Links for every id of `catalog`, in order.
    pub async fn listing(
        &self,
        catalog: &[String],
        strategy: DeliveryStrategy,
    ) -> Result<Vec<String>, DeliveryError> {
        let mut links = Vec::with_capacity(catalog.len());
        for resource_id in catalog {
            links.push(self.link(resource_id, strategy).await?);
        }
        Ok(links)
    }

    async fn sign(
        &self,
        signer: &dyn UrlSigner,
        resource_id: &str,
        strategy: DeliveryStrategy,
    ) -> Result<SignedUrl, DeliveryError> {
        // The id lands verbatim in a URL and a Location header
        if resource_id.is_empty() || resource_id.chars().any(char::is_control) {
            return Err(StoreError::InvalidId(resource_id.escape_debug().to_string()).into());
        }

        let now = self.clock.now();
        let signed = signer.sign_at(resource_id, self.ttl, now).await?;
        debug!(
            resource_id = resource_id,
            strategy = %strategy,
            scheme = signer.scheme(),
            expires = signed.expires_epoch_secs(),
            "Resolved signed URL"
        );
        Ok(signed)
    }
}
