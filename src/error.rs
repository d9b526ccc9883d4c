use thiserror::Error;

/// Errors raised while loading the CDN signing key.
///
/// These are startup-fatal: without a key the service cannot issue CDN URLs.
#[derive(Debug, Clone, Error)]
pub enum KeyLoadError {
    /// The key source contained no data
    #[error("Key source is empty")]
    EmptySource,

    /// The source is not a well-formed PEM private key
    #[error("Malformed private key: {0}")]
    Malformed(String),

    /// The key parsed, but it is not an RSA key
    #[error("Unsupported key algorithm: {0} (CDN canned policies require RSA)")]
    UnsupportedAlgorithm(String),

    /// The key file could not be read
    #[error("Failed to read key file {path}: {message}")]
    Unreadable { path: String, message: String },
}

/// Errors raised while issuing a signed URL.
///
/// Signing is atomic: on error no partial URL is ever produced.
#[derive(Debug, Clone, Error)]
pub enum SigningError {
    /// No object-store credentials are available to the signer
    #[error("No signing credentials available")]
    NoCredentials,

    /// The requested validity window cannot be issued
    #[error("Invalid TTL: {ttl_secs}s (must be between 1 and {max_secs} seconds)")]
    InvalidTtl { ttl_secs: u64, max_secs: u64 },

    /// The underlying cryptographic or presigning step failed
    #[error("Signing failed: {0}")]
    SigningFailed(String),
}

/// The requested resource does not exist in the byte store.
#[derive(Debug, Clone, Error)]
#[error("Resource not found: {resource_id}")]
pub struct NotFoundError {
    pub resource_id: String,
}

impl NotFoundError {
    pub fn new(resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
        }
    }
}

/// Errors from the byte store backing direct delivery.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Reading the stored bytes failed
    #[error("Store I/O error: {0}")]
    Io(String),

    /// The identifier cannot name a stored resource (e.g. contains a path separator)
    #[error("Invalid resource id: {0}")]
    InvalidId(String),
}

/// Per-request errors surfaced by the delivery resolver.
#[derive(Debug, Clone, Error)]
pub enum DeliveryError {
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
