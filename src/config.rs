//! Configuration management for image delivery.
//!
//! This module provides a configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables with the `DELIVERY_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Commands
//!
//! - `serve` - Run the HTTP server
//! - `sign` - Issue one signed URL and print it
//!
//! # Environment Variables
//!
//! - `DELIVERY_HOST` - Server bind address (default: 0.0.0.0)
//! - `DELIVERY_PORT` - Server port (default: 8080)
//! - `DELIVERY_S3_BUCKET` - S3 bucket holding the images (required)
//! - `DELIVERY_S3_ENDPOINT` - Custom S3 endpoint for S3-compatible services
//! - `DELIVERY_S3_REGION` - AWS region (default: us-east-1)
//! - `DELIVERY_CDN_DOMAIN` - CDN distribution domain (required)
//! - `DELIVERY_CDN_KEY_PAIR_ID` - CDN public key id (required)
//! - `DELIVERY_CDN_PRIVATE_KEY` - Path to the PEM private key (default: private.pem)
//! - `DELIVERY_URL_TTL` - Signed URL validity in seconds (default: 86400)
//! - `DELIVERY_RESOURCE_DIR` - Directory backing direct delivery (default: static)
//! - `DELIVERY_RESOURCES` - Comma-separated catalog of resource ids
//! - `DELIVERY_CORS_ORIGINS` - Allowed CORS origins (comma-separated)

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::signing::{DEFAULT_URL_TTL_SECS, MAX_PRESIGN_TTL_SECS};
use crate::store::DEFAULT_CATALOG;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default AWS region.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default path of the CDN private key.
pub const DEFAULT_PRIVATE_KEY_PATH: &str = "private.pem";

/// Default directory backing direct delivery.
pub const DEFAULT_RESOURCE_DIR: &str = "static";

// =============================================================================
// CLI Arguments
// =============================================================================

/// Image delivery - serve images from a byte store, S3, or a CDN.
#[derive(Parser, Debug, Clone)]
#[command(name = "image-delivery")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

/// Top-level commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP server.
    Serve(ServeConfig),

    /// Issue a single signed URL and print it.
    Sign(SignConfig),
}

// =============================================================================
// Shared Settings
// =============================================================================

/// Object-store settings.
#[derive(Args, Debug, Clone)]
pub struct S3Args {
    /// S3 bucket name containing the images.
    #[arg(long, env = "DELIVERY_S3_BUCKET", default_value = "")]
    pub s3_bucket: String,

    /// Custom S3 endpoint URL for S3-compatible services (MinIO, etc.).
    #[arg(long, env = "DELIVERY_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// AWS region for S3.
    #[arg(long, default_value = DEFAULT_REGION, env = "DELIVERY_S3_REGION")]
    pub s3_region: String,
}

/// CDN signing settings.
#[derive(Args, Debug, Clone)]
pub struct CdnArgs {
    /// CDN distribution domain (e.g. d111111abcdef8.cloudfront.net).
    #[arg(long, env = "DELIVERY_CDN_DOMAIN", default_value = "")]
    pub cdn_domain: String,

    /// Identifier of the CDN public key matching the private key.
    #[arg(long, env = "DELIVERY_CDN_KEY_PAIR_ID", default_value = "")]
    pub cdn_key_pair_id: String,

    /// Path to the PEM-encoded RSA private key (PKCS#1 or PKCS#8).
    #[arg(long, default_value = DEFAULT_PRIVATE_KEY_PATH, env = "DELIVERY_CDN_PRIVATE_KEY")]
    pub cdn_private_key: PathBuf,
}

/// Configuration for the `serve` command.
#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "DELIVERY_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "DELIVERY_PORT")]
    pub port: u16,

    #[command(flatten)]
    pub s3: S3Args,

    #[command(flatten)]
    pub cdn: CdnArgs,

    // =========================================================================
    // Delivery Configuration
    // =========================================================================
    /// Validity of issued URLs in seconds.
    #[arg(long, default_value_t = DEFAULT_URL_TTL_SECS, env = "DELIVERY_URL_TTL")]
    pub url_ttl: u64,

    /// Directory holding one file per resource id for direct delivery.
    #[arg(long, default_value = DEFAULT_RESOURCE_DIR, env = "DELIVERY_RESOURCE_DIR")]
    pub resource_dir: PathBuf,

    /// Resource ids listed on every page, in order (comma-separated).
    #[arg(long, env = "DELIVERY_RESOURCES", value_delimiter = ',')]
    pub resources: Option<Vec<String>>,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "DELIVERY_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        validate_bucket(&self.s3.s3_bucket)?;
        validate_cdn(&self.cdn)?;
        validate_ttl(self.url_ttl)?;

        if let Some(resources) = &self.resources {
            if resources.iter().any(|id| id.trim().is_empty()) {
                return Err("resources must not contain empty ids".to_string());
            }
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn url_ttl(&self) -> Duration {
        Duration::from_secs(self.url_ttl)
    }

    /// The catalog to list, falling back to the demo images.
    pub fn catalog(&self) -> Vec<String> {
        match &self.resources {
            Some(resources) => resources.iter().map(|id| id.trim().to_string()).collect(),
            None => DEFAULT_CATALOG.iter().map(|id| id.to_string()).collect(),
        }
    }
}

/// Which signer the `sign` command uses.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignScheme {
    /// Presigned object-store URL
    S3,
    /// Canned-policy CDN URL
    Cdn,
}

/// Output format for the `sign` command.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignOutputFormat {
    /// Print the signed URL only
    #[default]
    Url,
    /// Print URL, expiry and (for CDN) the encoded policy as JSON
    Json,
}

/// Configuration for the `sign` command.
#[derive(Args, Debug, Clone)]
pub struct SignConfig {
    /// Resource id to sign (object key / CDN path).
    pub resource_id: String,

    /// Signing scheme.
    #[arg(long, value_enum, default_value_t = SignScheme::Cdn)]
    pub scheme: SignScheme,

    /// Validity in seconds.
    #[arg(long, default_value_t = DEFAULT_URL_TTL_SECS, env = "DELIVERY_URL_TTL")]
    pub ttl: u64,

    /// Output format.
    #[arg(long, value_enum, default_value_t = SignOutputFormat::Url)]
    pub format: SignOutputFormat,

    #[command(flatten)]
    pub s3: S3Args,

    #[command(flatten)]
    pub cdn: CdnArgs,
}

impl SignConfig {
    /// Validate only the settings the chosen scheme needs.
    pub fn validate(&self) -> Result<(), String> {
        if self.resource_id.trim().is_empty() {
            return Err("resource id must not be empty".to_string());
        }
        validate_ttl(self.ttl)?;
        match self.scheme {
            SignScheme::S3 => validate_bucket(&self.s3.s3_bucket),
            SignScheme::Cdn => validate_cdn(&self.cdn),
        }
    }
}

// =============================================================================
// Validation Helpers
// =============================================================================

fn validate_bucket(bucket: &str) -> Result<(), String> {
    if bucket.is_empty() {
        return Err(
            "S3 bucket name is required. Set --s3-bucket or DELIVERY_S3_BUCKET".to_string(),
        );
    }
    Ok(())
}

fn validate_cdn(cdn: &CdnArgs) -> Result<(), String> {
    if cdn.cdn_key_pair_id.is_empty() {
        return Err(
            "CDN key pair id is required. Set --cdn-key-pair-id or DELIVERY_CDN_KEY_PAIR_ID"
                .to_string(),
        );
    }
    validate_domain(&cdn.cdn_domain)
}

/// The CDN domain must be a bare host: no scheme, path, port or query.
fn validate_domain(domain: &str) -> Result<(), String> {
    if domain.is_empty() {
        return Err(
            "CDN domain is required. Set --cdn-domain or DELIVERY_CDN_DOMAIN".to_string(),
        );
    }

    let parsed = url::Url::parse(&format!("https://{}/", domain))
        .map_err(|e| format!("Invalid CDN domain '{}': {}", domain, e))?;

    // Hosts come back lowercased
    let host_matches = parsed
        .host_str()
        .is_some_and(|host| host.eq_ignore_ascii_case(domain));

    if !host_matches || parsed.port().is_some() || parsed.path() != "/" {
        return Err(format!(
            "Invalid CDN domain '{}': expected a bare host name such as d111111abcdef8.cloudfront.net",
            domain
        ));
    }
    Ok(())
}

fn validate_ttl(ttl: u64) -> Result<(), String> {
    if ttl == 0 || ttl > MAX_PRESIGN_TTL_SECS {
        return Err(format!(
            "url_ttl must be between 1 and {} seconds",
            MAX_PRESIGN_TTL_SECS
        ));
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
