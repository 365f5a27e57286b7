//! docgate - document upload gateway
//!
//! Accepts PDF/DOCX uploads over HTTP and stores them in an S3 bucket,
//! refusing to overwrite existing objects. A companion endpoint deletes
//! stored documents.

mod config;
mod router;

use anyhow::Context;
use clap::Parser;
use docgate_documents::storage::{DocumentStorage, EphemeralStorage, S3Storage};
use docgate_documents::DocumentState;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Settings, StorageBackend};

#[derive(Parser, Debug)]
#[command(name = "docgate")]
#[command(about = "Document upload gateway backed by S3", long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "PORT")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "0.0.0.0", env = "HOST")]
    host: String,

    /// Optional settings file (extension picks the format)
    #[arg(long, default_value = "docgate", env = "DOCGATE_CONFIG")]
    config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the environment may already be populated
    let dotenv = dotenvy::dotenv();

    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "docgate={level},docgate_documents={level},tower_http=debug",
                    level = args.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Ok(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    let settings = Settings::load(&args.config).context("invalid configuration")?;

    info!("Starting docgate...");
    info!("  Bucket: {}", settings.bucket_name);
    info!("  Backend: {:?}", settings.backend);
    info!(
        "  Allowed MIME types: {}",
        settings.policy.allowed_mime_types().join(", ")
    );
    info!("  Key rule: {:?}", settings.policy.key_rule);

    let storage: Arc<dyn DocumentStorage> = match settings.backend {
        StorageBackend::S3 => Arc::new(S3Storage::connect(settings.s3_config()).await),
        StorageBackend::Ephemeral => {
            warn!("Using in-memory storage; documents are lost on restart");
            Arc::new(
                EphemeralStorage::new(settings.bucket_name.clone())
                    .with_public_host(settings.storage_host.clone())
                    .with_conditional_writes(settings.conditional_writes),
            )
        }
    };

    let state = DocumentState::new(storage, settings.policy.clone());
    let app = router::create_router(state, &settings);

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", args.host, args.port))?;
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("docgate shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections");
}
