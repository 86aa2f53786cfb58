//! Code security scanner API server: /upload, /results/:id.

use scan_api::{config::ServerConfig, server};
use scan_llm::{OpenAiCompletionClient, PromptTemplate};
use scan_scheduler::{FsArtifactStore, InMemoryJobStore, InMemoryScheduler, WorkerConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let dotenv_result = dotenv::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = dotenv_result {
        tracing::debug!(error = %e, "no .env loaded");
    }

    let config = ServerConfig::from_env()?;

    let artifacts = FsArtifactStore::new(&config.upload_dir);
    artifacts.ensure_root().await?;

    let mut llm = OpenAiCompletionClient::new(
        config.llm_api_url.clone(),
        config.llm_api_key.clone(),
        config.llm_model.clone(),
    );
    if let Some(max_tokens) = config.llm_max_tokens {
        llm = llm.with_max_tokens(max_tokens);
    }
    tracing::info!(model = llm.model(), "completion client ready");

    let scheduler = InMemoryScheduler::new(
        Arc::new(InMemoryJobStore::new()),
        Arc::new(artifacts),
        Arc::new(llm),
        PromptTemplate::service(),
        WorkerConfig {
            deadline: config.analysis_timeout,
        },
    );
    let state = Arc::new(
        server::AppState::new(Arc::new(scheduler)).with_max_upload_bytes(config.max_upload_bytes),
    );

    let app = server::router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(
        upload_dir = %config.upload_dir.display(),
        timeout_secs = config.analysis_timeout.as_secs(),
        "scanner API listening on {}",
        addr
    );
    axum::serve(
        tokio::net::TcpListener::bind(addr).await?,
        app.into_make_service(),
    )
    .await?;
    Ok(())
}
