//! Test utilities for integration tests.
//!
//! Everything here is deterministic: the clock is pinned, the RSA key is a
//! checked-in fixture and the S3 client uses static credentials.

use std::sync::Arc;

use aws_credential_types::provider::error::CredentialsError;
use aws_credential_types::provider::{future, ProvideCredentials};
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use image_delivery::{
    create_router, CdnSigner, DeliveryResolver, FixedClock, KeyMaterial, MemoryStore,
    ObjectStoreSigner, Resource, RouterConfig,
};

/// Unix time the test clock is pinned to.
pub const FIXED_NOW: u64 = 1_000_000;

pub const TEST_BUCKET: &str = "images-bucket";
pub const TEST_CDN_DOMAIN: &str = "cdn.example.com";
pub const TEST_KEY_PAIR_ID: &str = "APKAEXAMPLE";

pub const PKCS8_KEY_PEM: &str = include_str!("../fixtures/rsa_pkcs8.pem");
pub const PKCS1_KEY_PEM: &str = include_str!("../fixtures/rsa_pkcs1.pem");
pub const EC_KEY_PEM: &str = include_str!("../fixtures/ec_pkcs8.pem");

/// OpenSSL's RSA-SHA1 signature of the canned policy for
/// `https://cdn.example.com/10kb.png` expiring at 1086400, in CDN base64.
pub const GOLDEN_SIGNATURE: &str = "vu35egUGMPcG~Le3R1OOVsv0Jyqe-wZ7Tm06v8ZNsmd4D646JPALM~tUDbQ39hE6YrZcqHwKnMeoXllwEsrusGmZeW4D9~uj4cW~198xoOS35pbUCmevNmBEDa5cfss6doDziasGPqKkEUfiK4eInAdGARp2N2LL4NH3WZL9OLw7hwGr8cpg1ODDHWtvLp22aecKlx-Cp-CGlWiwvUBl5RIoOU6322zTRc9yIFO7jf3w557yGZEXcWRnFCfiAfLHvHs6wOdY3SncDQkIpl4FjWQZYfs4Maukq9u45QgS66sHAV7egfxifY0sUtuZ8PM4zkgjzFpK8igsE8sl0U~A5g__";

pub fn test_key() -> Arc<KeyMaterial> {
    Arc::new(KeyMaterial::load(PKCS8_KEY_PEM, TEST_KEY_PAIR_ID).unwrap())
}

pub fn test_cdn_signer() -> CdnSigner {
    CdnSigner::new(TEST_CDN_DOMAIN, test_key())
}

/// An S3 client with static credentials that never touches the network.
pub fn test_s3_client() -> aws_sdk_s3::Client {
    let creds = aws_sdk_s3::config::Credentials::new(
        "AKIDEXAMPLE",
        "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
        None,
        None,
        "test",
    );

    let config = aws_sdk_s3::Config::builder()
        .behavior_version_latest()
        .region(aws_sdk_s3::config::Region::new("us-east-1"))
        .credentials_provider(creds)
        .build();

    aws_sdk_s3::Client::from_conf(config)
}

/// An S3 client with no credential source at all.
pub fn anonymous_s3_client() -> aws_sdk_s3::Client {
    let config = aws_sdk_s3::Config::builder()
        .behavior_version_latest()
        .region(aws_sdk_s3::config::Region::new("us-east-1"))
        .build();

    aws_sdk_s3::Client::from_conf(config)
}

/// Credential provider that always fails, like an empty default chain.
#[derive(Debug)]
pub struct UnavailableCredentials;

impl ProvideCredentials for UnavailableCredentials {
    fn provide_credentials<'a>(&'a self) -> future::ProvideCredentials<'a>
    where
        Self: 'a,
    {
        future::ProvideCredentials::ready(Err(CredentialsError::not_loaded(
            "no credentials in the environment",
        )))
    }
}

/// An S3 client whose credential provider is present but finds nothing.
pub fn unavailable_credentials_s3_client() -> aws_sdk_s3::Client {
    let config = aws_sdk_s3::Config::builder()
        .behavior_version_latest()
        .region(aws_sdk_s3::config::Region::new("us-east-1"))
        .credentials_provider(UnavailableCredentials)
        .build();

    aws_sdk_s3::Client::from_conf(config)
}

/// A store holding two small PNG-typed resources.
pub fn sample_store() -> MemoryStore {
    MemoryStore::new()
        .with_resource(Resource::new("10kb.png", "image/png", vec![0x89u8, b'P', b'N', b'G']))
        .with_resource(Resource::new("100kb.png", "image/png", vec![0x89u8, b'P', b'N', b'G', 0]))
}

pub fn test_resolver_with(
    store: MemoryStore,
    s3_client: aws_sdk_s3::Client,
) -> DeliveryResolver<MemoryStore> {
    let object_store = ObjectStoreSigner::new(s3_client, TEST_BUCKET);
    DeliveryResolver::new(store, Arc::new(object_store), Arc::new(test_cdn_signer()))
        .with_clock(Arc::new(FixedClock::at_epoch_secs(FIXED_NOW)))
}

pub fn test_resolver() -> DeliveryResolver<MemoryStore> {
    test_resolver_with(sample_store(), test_s3_client())
}

pub fn test_router() -> Router {
    let catalog = vec!["10kb.png".to_string(), "100kb.png".to_string()];
    create_router(test_resolver(), catalog, RouterConfig::new().with_tracing(false))
}

/// Issue a GET request against the router.
pub async fn get(router: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    router.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Value of query parameter `name` in `url`.
pub fn query_param(url: &str, name: &str) -> Option<String> {
    url::Url::parse(url)
        .unwrap()
        .query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
