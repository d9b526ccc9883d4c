//! CloudFront-style canned-policy URL signing.
//!
//! # Signing Scheme
//!
//! A canned policy grants access to exactly one URL until one instant. The
//! policy is never sent; the CDN rebuilds it from the URL and `Expires`:
//!
//! ```text
//! policy    = {"Statement":[{"Resource":"<url>","Condition":{"DateLessThan":{"AWS:EpochTime":<expires>}}}]}
//! signature = cdn_base64(RSA-SHA1(private_key, policy))
//! url       = <url>?Expires=<expires>&Signature=<signature>&Key-Pair-Id=<key_pair_id>
//! ```
//!
//! The policy must be byte-exact (minified, fixed key order), otherwise every
//! verifier rejects the signature.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::{Duration, SystemTime};
//! use image_delivery::signing::{CdnSigner, KeyMaterial};
//!
//! let key = Arc::new(KeyMaterial::from_file("private.pem", "APKAEXAMPLE")?);
//! let signer = CdnSigner::new("cdn.example.com", key);
//! let signed = signer.sign("10kb.png", Duration::from_secs(86400), SystemTime::now())?;
//! println!("{}", signed.url());
//! ```

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;

use crate::error::SigningError;

use super::key::KeyMaterial;
use super::{SignedUrl, UrlSigner, Validity};

/// Encode bytes with the CDN's URL-safe base64 variant.
///
/// Standard base64 with `+` → `-`, `=` → `_` and `/` → `~`.
pub fn cdn_base64_encode(bytes: impl AsRef<[u8]>) -> String {
    STANDARD
        .encode(bytes)
        .chars()
        .map(|c| match c {
            '+' => '-',
            '=' => '_',
            '/' => '~',
            other => other,
        })
        .collect()
}

/// Decode a value produced by [`cdn_base64_encode`].
pub fn cdn_base64_decode(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let standard: String = encoded
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '=',
            '~' => '/',
            other => other,
        })
        .collect();
    STANDARD.decode(standard)
}

/// The access policy implied by a canned-policy signed URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CannedPolicy {
    resource: String,
    expires: u64,
}

impl CannedPolicy {
    pub fn new(resource: impl Into<String>, expires: u64) -> Self {
        Self {
            resource: resource.into(),
            expires,
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn expires(&self) -> u64 {
        self.expires
    }

    /// The exact policy bytes that get signed.
    ///
    /// Hand-formatted: a serializer is free to reorder keys or add
    /// whitespace, and the CDN compares against this literal form.
    pub fn to_json(&self) -> String {
        format!(
            r#"{{"Statement":[{{"Resource":"{}","Condition":{{"DateLessThan":{{"AWS:EpochTime":{}}}}}}}]}}"#,
            self.resource, self.expires
        )
    }

    /// Policy JSON in the CDN base64 alphabet.
    pub fn encoded(&self) -> String {
        cdn_base64_encode(self.to_json())
    }
}

/// Sign `https://{domain}/{resource_id}` with a canned policy.
///
/// `now` is the issuance instant; the same inputs and instant always produce
/// the same URL.
pub fn sign_canned(
    domain: &str,
    resource_id: &str,
    key: &KeyMaterial,
    ttl: Duration,
    now: SystemTime,
) -> Result<SignedUrl, SigningError> {
    let validity = Validity::compute(now, ttl, u64::MAX)?;

    let resource = format!("https://{}/{}", domain, resource_id);
    let policy = CannedPolicy::new(resource, validity.expires_at);
    let signature = key.sign_sha1(policy.to_json().as_bytes())?;

    let separator = if policy.resource().contains('?') { '&' } else { '?' };
    let url = format!(
        "{}{}Expires={}&Signature={}&Key-Pair-Id={}",
        policy.resource(),
        separator,
        validity.expires_at,
        cdn_base64_encode(signature),
        key.key_pair_id()
    );

    Ok(SignedUrl::new(url, validity.expiry_time()))
}

/// Issues canned-policy URLs for one CDN distribution.
#[derive(Debug, Clone)]
pub struct CdnSigner {
    domain: String,
    key: Arc<KeyMaterial>,
}

impl CdnSigner {
    /// Create a signer for the distribution at `domain`.
    ///
    /// A leading `https://` and trailing `/` are stripped from the domain.
    pub fn new(domain: impl Into<String>, key: Arc<KeyMaterial>) -> Self {
        let domain = domain.into();
        let domain = domain
            .strip_prefix("https://")
            .unwrap_or(&domain)
            .trim_end_matches('/')
            .to_string();
        Self { domain, key }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn key_pair_id(&self) -> &str {
        self.key.key_pair_id()
    }

    /// Sign a resource of this distribution.
    pub fn sign(
        &self,
        resource_id: &str,
        ttl: Duration,
        now: SystemTime,
    ) -> Result<SignedUrl, SigningError> {
        let signed = sign_canned(&self.domain, resource_id, &self.key, ttl, now)?;
        debug!(
            resource_id = resource_id,
            expires = signed.expires_epoch_secs(),
            "Issued CDN signed URL"
        );
        Ok(signed)
    }
}

#[async_trait]
impl UrlSigner for CdnSigner {
    fn scheme(&self) -> &'static str {
        "cdn"
    }

    async fn sign_at(
        &self,
        resource_id: &str,
        ttl: Duration,
        now: SystemTime,
    ) -> Result<SignedUrl, SigningError> {
        self.sign(resource_id, ttl, now)
    }
}
