//! RSA key material for CDN canned-policy signing.
//!
//! The key is loaded once at startup by the composition root and shared by
//! reference (`Arc<KeyMaterial>`) with every [`CdnSigner`](super::CdnSigner).
//! It is read-only after loading and can never be serialized back out.

use std::fmt;
use std::path::Path;

use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15::{SigningKey, VerifyingKey};
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{Keypair, SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use sha1::Sha1;

use crate::error::{KeyLoadError, SigningError};

/// PEM label of a PKCS#1 RSA private key.
const PKCS1_LABEL: &str = "RSA PRIVATE KEY";

/// PEM label of an unencrypted PKCS#8 private key.
const PKCS8_LABEL: &str = "PRIVATE KEY";

/// An RSA private key plus the CDN key-pair identifier of its public half.
pub struct KeyMaterial {
    key_pair_id: String,
    signing_key: SigningKey<Sha1>,
}

impl KeyMaterial {
    /// Parse a PEM-encoded RSA private key (PKCS#1 or PKCS#8).
    ///
    /// The first private-key block in the source is used; certificates or
    /// other blocks around it are ignored.
    pub fn load(
        source: impl AsRef<[u8]>,
        key_pair_id: impl Into<String>,
    ) -> Result<Self, KeyLoadError> {
        let source = source.as_ref();
        if source.iter().all(u8::is_ascii_whitespace) {
            return Err(KeyLoadError::EmptySource);
        }

        let blocks = pem::parse_many(source).map_err(|e| KeyLoadError::Malformed(e.to_string()))?;
        let block = blocks
            .iter()
            .find(|block| block.tag().ends_with("PRIVATE KEY"))
            .ok_or_else(|| KeyLoadError::Malformed("no PEM private key block found".to_string()))?;

        let private_key = match block.tag() {
            PKCS1_LABEL => RsaPrivateKey::from_pkcs1_der(block.contents())
                .map_err(|e| KeyLoadError::Malformed(e.to_string()))?,
            PKCS8_LABEL => {
                RsaPrivateKey::from_pkcs8_der(block.contents()).map_err(|e| match e {
                    rsa::pkcs8::Error::PublicKey(rsa::pkcs8::spki::Error::OidUnknown { oid }) => {
                        KeyLoadError::UnsupportedAlgorithm(format!("PKCS#8 algorithm {}", oid))
                    }
                    other => KeyLoadError::Malformed(other.to_string()),
                })?
            }
            other => return Err(KeyLoadError::UnsupportedAlgorithm(other.to_string())),
        };

        Ok(Self {
            key_pair_id: key_pair_id.into(),
            signing_key: SigningKey::<Sha1>::new(private_key),
        })
    }

    /// Read and parse a PEM key file.
    pub fn from_file(
        path: impl AsRef<Path>,
        key_pair_id: impl Into<String>,
    ) -> Result<Self, KeyLoadError> {
        let path = path.as_ref();
        let source = std::fs::read(path).map_err(|e| KeyLoadError::Unreadable {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::load(source, key_pair_id)
    }

    /// Identifier the CDN uses to find the matching public key.
    pub fn key_pair_id(&self) -> &str {
        &self.key_pair_id
    }

    /// Public half of the key, for verifying issued signatures.
    pub fn verifying_key(&self) -> VerifyingKey<Sha1> {
        self.signing_key.verifying_key()
    }

    /// RSASSA-PKCS1-v1_5 signature over SHA-1 of `message`.
    pub(crate) fn sign_sha1(&self, message: &[u8]) -> Result<Vec<u8>, SigningError> {
        self.signing_key
            .try_sign(message)
            .map(|signature| signature.to_vec())
            .map_err(|e| SigningError::SigningFailed(e.to_string()))
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("key_pair_id", &self.key_pair_id)
            .field("signing_key", &"<redacted>")
            .finish()
    }
}
