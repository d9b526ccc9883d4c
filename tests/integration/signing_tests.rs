//! Signing integration tests.
//!
//! Tests verify:
//! - Canned-policy URLs match a signature produced by OpenSSL
//! - Signatures verify against the public half of the key
//! - PKCS#1 and PKCS#8 encodings of one key sign identically
//! - Key loading failures are classified

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rsa::pkcs1v15::Signature;
use rsa::signature::Verifier;

use image_delivery::signing::{cdn_base64_decode, CannedPolicy};
use image_delivery::{CdnSigner, KeyLoadError, KeyMaterial, SigningError};

use super::test_utils::{
    query_param, test_cdn_signer, test_key, EC_KEY_PEM, FIXED_NOW, GOLDEN_SIGNATURE,
    PKCS1_KEY_PEM, TEST_KEY_PAIR_ID,
};

const ONE_DAY: Duration = Duration::from_secs(86_400);

fn at(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}

// =============================================================================
// Canned Policy
// =============================================================================

#[test]
fn test_canned_url_matches_openssl_signature() {
    let signed = test_cdn_signer()
        .sign("10kb.png", ONE_DAY, at(FIXED_NOW))
        .unwrap();

    assert_eq!(
        signed.url(),
        format!(
            "https://cdn.example.com/10kb.png?Expires=1086400&Signature={}&Key-Pair-Id={}",
            GOLDEN_SIGNATURE, TEST_KEY_PAIR_ID
        )
    );
    assert_eq!(signed.expires_epoch_secs(), 1_086_400);
}

#[test]
fn test_signature_verifies_against_policy() {
    let key = test_key();
    let signed = CdnSigner::new("cdn.example.com", key.clone())
        .sign("100kb.png", Duration::from_secs(3600), at(FIXED_NOW))
        .unwrap();

    let policy = CannedPolicy::new("https://cdn.example.com/100kb.png", FIXED_NOW + 3600);
    let raw = cdn_base64_decode(&query_param(signed.url(), "Signature").unwrap()).unwrap();
    let signature = Signature::try_from(raw.as_slice()).unwrap();

    assert!(key
        .verifying_key()
        .verify(policy.to_json().as_bytes(), &signature)
        .is_ok());

    // A different expiry is a different policy
    let other = CannedPolicy::new("https://cdn.example.com/100kb.png", FIXED_NOW + 3601);
    assert!(key
        .verifying_key()
        .verify(other.to_json().as_bytes(), &signature)
        .is_err());
}

#[test]
fn test_signature_alphabet_is_url_safe() {
    let signer = test_cdn_signer();
    for (i, id) in ["10kb.png", "1mb.png", "10mb.png", "a/b/c.png"].iter().enumerate() {
        let signed = signer
            .sign(id, ONE_DAY, at(FIXED_NOW + i as u64))
            .unwrap();
        let signature = query_param(signed.url(), "Signature").unwrap();
        assert!(!signature.contains(['+', '=', '/']), "{}", signature);
    }
}

#[test]
fn test_pkcs1_and_pkcs8_keys_sign_identically() {
    let pkcs1 = KeyMaterial::load(PKCS1_KEY_PEM, TEST_KEY_PAIR_ID).unwrap();
    let from_pkcs1 = CdnSigner::new("cdn.example.com", pkcs1.into())
        .sign("10kb.png", ONE_DAY, at(FIXED_NOW))
        .unwrap();
    let from_pkcs8 = test_cdn_signer()
        .sign("10kb.png", ONE_DAY, at(FIXED_NOW))
        .unwrap();

    assert_eq!(from_pkcs1, from_pkcs8);
}

#[test]
fn test_zero_ttl_rejected() {
    let result = test_cdn_signer().sign("10kb.png", Duration::ZERO, at(FIXED_NOW));
    assert!(matches!(result, Err(SigningError::InvalidTtl { .. })));
}

// =============================================================================
// Key Loading
// =============================================================================

#[test]
fn test_key_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("private.pem");
    std::fs::write(&path, PKCS1_KEY_PEM).unwrap();

    let key = KeyMaterial::from_file(&path, TEST_KEY_PAIR_ID).unwrap();
    assert_eq!(key.key_pair_id(), TEST_KEY_PAIR_ID);
}

#[test]
fn test_key_load_failures() {
    assert!(matches!(
        KeyMaterial::load("", TEST_KEY_PAIR_ID),
        Err(KeyLoadError::EmptySource)
    ));
    assert!(matches!(
        KeyMaterial::load(EC_KEY_PEM, TEST_KEY_PAIR_ID),
        Err(KeyLoadError::UnsupportedAlgorithm(_))
    ));
    assert!(matches!(
        KeyMaterial::from_file("/nonexistent/private.pem", TEST_KEY_PAIR_ID),
        Err(KeyLoadError::Unreadable { .. })
    ));
}
