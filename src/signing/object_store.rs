//! Presigned GET URLs for objects in S3 or S3-compatible storage.
//!
//! The store's native SigV4 query-string presigner is used: the canonical
//! request over method, bucket, key and timestamp is signed with the client's
//! credentials. The store itself enforces expiry when it verifies the URL.

use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use aws_credential_types::provider::error::CredentialsError;
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;
use tracing::debug;

use crate::error::SigningError;

use super::{SignedUrl, UrlSigner, Validity};

/// Longest validity SigV4 query-string presigning accepts (7 days).
pub const MAX_PRESIGN_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Issues presigned GET URLs for objects in one bucket.
#[derive(Clone, Debug)]
pub struct ObjectStoreSigner {
    client: Client,
    bucket: String,
}

impl ObjectStoreSigner {
    /// Create a signer for `bucket`. The object key is the resource id.
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Resolve the client's credentials once, without signing anything.
    ///
    /// The default provider chain is always installed, so only resolving it
    /// tells whether presigning can succeed.
    pub async fn check_credentials(&self) -> Result<(), SigningError> {
        let provider = self
            .client
            .config()
            .credentials_provider()
            .ok_or(SigningError::NoCredentials)?;

        provider.provide_credentials().await.map(|_| ()).map_err(|e| {
            debug!(error = %DisplayErrorContext(&e), "Credential resolution failed");
            SigningError::NoCredentials
        })
    }

    /// Presign a GET for `object_id`, issued at `now`.
    pub async fn sign(
        &self,
        object_id: &str,
        ttl: Duration,
        now: SystemTime,
    ) -> Result<SignedUrl, SigningError> {
        let validity = Validity::compute(now, ttl, MAX_PRESIGN_TTL_SECS)?;

        if self.client.config().credentials_provider().is_none() {
            return Err(SigningError::NoCredentials);
        }

        let presigning = PresigningConfig::builder()
            .start_time(validity.issued_time())
            .expires_in(validity.ttl())
            .build()
            .map_err(|e| SigningError::SigningFailed(e.to_string()))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(object_id)
            .presigned(presigning)
            .await
            .map_err(|e| {
                let message = DisplayErrorContext(&e).to_string();
                if is_credentials_error(&e) || message.to_lowercase().contains("credential") {
                    SigningError::NoCredentials
                } else {
                    SigningError::SigningFailed(message)
                }
            })?;

        debug!(
            bucket = %self.bucket,
            object_id = object_id,
            expires = validity.expires_at,
            "Issued presigned object-store URL"
        );

        Ok(SignedUrl::new(
            presigned.uri().to_string(),
            validity.expiry_time(),
        ))
    }
}

#[async_trait]
impl UrlSigner for ObjectStoreSigner {
    fn scheme(&self) -> &'static str {
        "object-store"
    }

    async fn sign_at(
        &self,
        resource_id: &str,
        ttl: Duration,
        now: SystemTime,
    ) -> Result<SignedUrl, SigningError> {
        self.sign(resource_id, ttl, now).await
    }
}

/// Whether a `CredentialsError` appears anywhere in the error's source chain.
fn is_credentials_error(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<CredentialsError>() {
            return true;
        }
        current = e.source();
    }
    false
}

/// Create an S3 client with optional custom endpoint and region.
///
/// Credentials come from the ambient environment (env vars, profile, IMDS).
/// Use a custom endpoint for S3-compatible services like MinIO:
/// ```ignore
/// let client = create_s3_client(Some("http://localhost:9000"), "us-east-1").await;
/// ```
pub async fn create_s3_client(endpoint_url: Option<&str>, region: &str) -> Client {
    let region = aws_config::Region::new(region.to_string());
    let mut config_loader =
        aws_config::defaults(aws_config::BehaviorVersion::latest()).region(region);

    if let Some(endpoint) = endpoint_url {
        config_loader = config_loader.endpoint_url(endpoint);
    }

    let sdk_config = config_loader.load().await;

    // S3-compatible services generally need path-style addressing
    let s3_config = if endpoint_url.is_some() {
        aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build()
    } else {
        aws_sdk_s3::config::Builder::from(&sdk_config).build()
    };

    Client::from_conf(s3_config)
}
