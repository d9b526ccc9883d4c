//! Resolver integration tests.
//!
//! Tests verify:
//! - Every strategy resolves through the real signers
//! - Direct delivery from a directory-backed store
//! - Missing credentials surface as a signing error, not a panic

use std::sync::Arc;
use std::time::Duration;

use image_delivery::{
    DeliveryError, DeliveryResolver, DeliveryResult, DeliveryStrategy, DirectoryStore,
    FixedClock, ObjectStoreSigner, SigningError,
};

use super::test_utils::{
    anonymous_s3_client, query_param, sample_store, test_cdn_signer, test_resolver,
    test_resolver_with, test_s3_client, unavailable_credentials_s3_client, FIXED_NOW,
    GOLDEN_SIGNATURE, TEST_BUCKET,
};

fn redirect_url(result: DeliveryResult) -> String {
    match result {
        DeliveryResult::Redirect(signed) => signed.into_url(),
        other => panic!("expected redirect, got {:?}", other),
    }
}

#[tokio::test]
async fn test_every_strategy_resolves() {
    let resolver = test_resolver();

    for strategy in DeliveryStrategy::ALL {
        let result = resolver.resolve("10kb.png", strategy).await.unwrap();
        match (strategy, result) {
            (DeliveryStrategy::Direct, DeliveryResult::Content(resource)) => {
                assert_eq!(resource.id, "10kb.png");
            }
            (DeliveryStrategy::Direct, other) => panic!("expected content, got {:?}", other),
            (_, DeliveryResult::Redirect(signed)) => {
                assert_eq!(signed.expires_epoch_secs(), FIXED_NOW + 86_400);
            }
            (_, other) => panic!("expected redirect, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_cdn_strategy_matches_openssl_signature() {
    let resolver = test_resolver();
    let url = redirect_url(
        resolver
            .resolve("10kb.png", DeliveryStrategy::CdnDirect)
            .await
            .unwrap(),
    );
    assert_eq!(query_param(&url, "Signature").unwrap(), GOLDEN_SIGNATURE);
}

#[tokio::test]
async fn test_ttl_override_reaches_both_signers() {
    let resolver = test_resolver().with_ttl(Duration::from_secs(900));

    let s3 = redirect_url(
        resolver
            .resolve("10kb.png", DeliveryStrategy::ObjectStoreDirect)
            .await
            .unwrap(),
    );
    assert_eq!(query_param(&s3, "X-Amz-Expires").unwrap(), "900");

    let cdn = redirect_url(
        resolver
            .resolve("10kb.png", DeliveryStrategy::CdnDirect)
            .await
            .unwrap(),
    );
    assert_eq!(
        query_param(&cdn, "Expires").unwrap(),
        (FIXED_NOW + 900).to_string()
    );
}

#[tokio::test]
async fn test_missing_s3_credentials() {
    let resolver = test_resolver_with(sample_store(), anonymous_s3_client());

    let result = resolver
        .resolve("10kb.png", DeliveryStrategy::ObjectStoreIndirect)
        .await;
    assert!(matches!(
        result,
        Err(DeliveryError::Signing(SigningError::NoCredentials))
    ));

    // The CDN path is unaffected
    assert!(resolver
        .resolve("10kb.png", DeliveryStrategy::CdnIndirect)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_failing_credential_provider() {
    let resolver = test_resolver_with(sample_store(), unavailable_credentials_s3_client());

    for strategy in [
        DeliveryStrategy::ObjectStoreIndirect,
        DeliveryStrategy::ObjectStoreDirect,
    ] {
        assert!(matches!(
            resolver.resolve("10kb.png", strategy).await,
            Err(DeliveryError::Signing(SigningError::NoCredentials))
        ));
    }

    let signer = ObjectStoreSigner::new(unavailable_credentials_s3_client(), TEST_BUCKET);
    assert!(matches!(
        signer.check_credentials().await,
        Err(SigningError::NoCredentials)
    ));
}

#[tokio::test]
async fn test_directory_store_backs_direct_delivery() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("1mb.png"), b"png bytes").unwrap();

    let resolver = DeliveryResolver::new(
        DirectoryStore::new(dir.path()),
        Arc::new(ObjectStoreSigner::new(test_s3_client(), TEST_BUCKET)),
        Arc::new(test_cdn_signer()),
    )
    .with_clock(Arc::new(FixedClock::at_epoch_secs(FIXED_NOW)));

    match resolver
        .resolve("1mb.png", DeliveryStrategy::Direct)
        .await
        .unwrap()
    {
        DeliveryResult::Content(resource) => {
            assert_eq!(resource.mime, "image/png");
            assert_eq!(&resource.bytes[..], b"png bytes");
        }
        other => panic!("expected content, got {:?}", other),
    }

    assert!(matches!(
        resolver.resolve("5mb.png", DeliveryStrategy::Direct).await,
        Err(DeliveryError::NotFound(_))
    ));
}
