//! Image Delivery - serve images directly or through signed URLs.
//!
//! This binary starts the HTTP server or issues one signed URL.

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use image_delivery::{
    config::{Cli, Command, ServeConfig, SignConfig, SignOutputFormat, SignScheme},
    create_router, create_s3_client,
    signing::{CannedPolicy, CdnSigner, KeyMaterial, ObjectStoreSigner, SignedUrl},
    DeliveryResolver, DirectoryStore, RouterConfig,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Serve(config) => run_serve(config).await,
        Command::Sign(config) => run_sign(config).await,
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Configuration:");
    info!("  S3 bucket: {}", config.s3.s3_bucket);
    if let Some(ref endpoint) = config.s3.s3_endpoint {
        info!("  S3 endpoint: {}", endpoint);
    }
    info!("  S3 region: {}", config.s3.s3_region);
    info!("  CDN domain: {}", config.cdn.cdn_domain);
    info!("  CDN key pair: {}", config.cdn.cdn_key_pair_id);
    info!("  URL TTL: {}s", config.url_ttl);
    info!("  Resource dir: {}", config.resource_dir.display());

    // The key is loaded once; a bad key stops startup
    let key = match KeyMaterial::from_file(&config.cdn.cdn_private_key, &config.cdn.cdn_key_pair_id)
    {
        Ok(key) => key,
        Err(e) => {
            error!("Failed to load CDN private key: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let s3_client = create_s3_client(config.s3.s3_endpoint.as_deref(), &config.s3.s3_region).await;
    let object_store = ObjectStoreSigner::new(s3_client, config.s3.s3_bucket.clone());
    if object_store.check_credentials().await.is_err() {
        warn!("  No AWS credentials found; S3 strategies will fail with 503");
    }
    let cdn = CdnSigner::new(config.cdn.cdn_domain.clone(), Arc::new(key));
    let store = DirectoryStore::new(config.resource_dir.clone());

    let resolver = DeliveryResolver::new(store, Arc::new(object_store), Arc::new(cdn))
        .with_ttl(config.url_ttl());

    let catalog = config.catalog();
    info!("  Catalog: {} resource(s)", catalog.len());

    let router = create_router(resolver, catalog, build_router_config(&config));

    let addr = config.bind_address();

    info!("");
    info!("  Server listening on: http://{}", addr);
    info!("    curl http://{}/health", addr);
    info!("    curl http://{}/cf-direct", addr);
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "image_delivery=debug,tower_http=debug"
    } else {
        "image_delivery=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application ServeConfig.
fn build_router_config(config: &ServeConfig) -> RouterConfig {
    let mut router_config = RouterConfig::new();

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config.with_tracing(!config.no_tracing)
}

// =============================================================================
// Sign Command
// =============================================================================

async fn run_sign(config: SignConfig) -> ExitCode {
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let ttl = Duration::from_secs(config.ttl);
    let now = SystemTime::now();

    let (signed, policy) = match config.scheme {
        SignScheme::Cdn => match sign_cdn(&config, ttl, now) {
            Ok(result) => result,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        },
        SignScheme::S3 => {
            let client =
                create_s3_client(config.s3.s3_endpoint.as_deref(), &config.s3.s3_region).await;
            let signer = ObjectStoreSigner::new(client, config.s3.s3_bucket.clone());
            match signer.sign(&config.resource_id, ttl, now).await {
                Ok(signed) => (signed, None),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
    };

    match config.format {
        SignOutputFormat::Url => {
            println!("{}", signed.url());
        }
        SignOutputFormat::Json => {
            let json = serde_json::json!({
                "url": signed.url(),
                "expires": signed.expires_epoch_secs(),
                "ttl": config.ttl,
                "resource_id": config.resource_id,
                "policy": policy,
            });
            match serde_json::to_string_pretty(&json) {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    ExitCode::SUCCESS
}

/// Sign with the CDN key, returning the URL and its encoded policy.
fn sign_cdn(
    config: &SignConfig,
    ttl: Duration,
    now: SystemTime,
) -> Result<(SignedUrl, Option<String>), Box<dyn std::error::Error>> {
    let key = KeyMaterial::from_file(&config.cdn.cdn_private_key, &config.cdn.cdn_key_pair_id)?;
    let signer = CdnSigner::new(config.cdn.cdn_domain.clone(), Arc::new(key));
    let signed = signer.sign(&config.resource_id, ttl, now)?;

    let resource = format!("https://{}/{}", signer.domain(), config.resource_id);
    let policy = CannedPolicy::new(resource, signed.expires_epoch_secs());

    Ok((signed, Some(policy.encoded())))
}
