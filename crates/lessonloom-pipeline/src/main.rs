//! LessonLoom — one-shot ingestion runner.
//!
//! Reads a text file, runs it through the ingestion pipeline and prints the
//! completion summary. Configuration comes from `LOOM_*` environment
//! variables (see `lessonloom_core::config`).

use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

use lessonloom_core::{LoomConfig, RawDocument};
use lessonloom_embed::{BatchLimits, EmbeddingClient, HttpEmbeddingProvider, RateLimiter};
use lessonloom_index::{HttpVectorIndex, VectorIndexAdapter};
use lessonloom_pipeline::IngestPipeline;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn print_usage() {
    println!("LessonLoom — ingest lesson text into a per-tenant vector index");
    println!();
    println!("Usage: lessonloom <file> <owner-id> <source-id>");
    println!();
    println!("Required environment:");
    println!("  LOOM_PROVIDER_URL, LOOM_PROVIDER_API_KEY");
    println!("  LOOM_INDEX_URL, LOOM_INDEX_NAME [, LOOM_INDEX_API_KEY]");
}

#[tokio::main]
async fn main() -> lessonloom_core::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 4 || matches!(args[1].as_str(), "--help" | "-h" | "help") {
        print_usage();
        std::process::exit(if args.len() == 2 { 0 } else { 1 });
    }

    let config = LoomConfig::from_env()?;
    let text = std::fs::read_to_string(&args[1])?;
    let owner_id = args[2].clone();
    let source_id = args[3].clone();

    let provider = Arc::new(HttpEmbeddingProvider::new(
        &config.provider_url,
        &config.provider_api_key,
        REQUEST_TIMEOUT,
    )?);
    let embedder = EmbeddingClient::new(
        provider,
        BatchLimits {
            max_batch_items: config.max_batch_items,
            max_item_chars: config.max_item_chars,
            request_batch_size: config.request_batch_size,
        },
        config.embedding_dim,
    )?;
    let limiter = Arc::new(RateLimiter::new(
        config.rate_limit,
        Duration::from_millis(config.rate_limit_window_ms),
    ));
    let index = VectorIndexAdapter::new(Arc::new(HttpVectorIndex::new(
        &config.index_url,
        &config.index_name,
        &config.index_api_key,
        REQUEST_TIMEOUT,
    )?));

    let pipeline = IngestPipeline::new(
        config.chunk_size,
        config.chunk_overlap,
        limiter,
        embedder,
        index,
    )?;

    let summary = pipeline
        .ingest(RawDocument {
            text,
            owner_id: owner_id.clone(),
            source_id: source_id.clone(),
        })
        .await?;

    info!(%owner_id, %source_id, chunks = summary.chunk_count, "done");
    println!("ingested {} chunks", summary.chunk_count);
    Ok(())
}
