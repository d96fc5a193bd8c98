//! LessonLoom Embed — embedding provider client, batch handling, rate
//! limiting.
//!
//! `EmbeddingProvider` abstracts the network endpoint; `EmbeddingClient`
//! enforces the batch/size limits and sub-batch partitioning in front of it;
//! `RateLimiter` caps outbound request rate per caller identity.

pub mod client;
pub mod limiter;
pub mod provider;

pub use client::{BatchLimits, EmbeddingClient};
pub use limiter::RateLimiter;
pub use provider::{EmbeddingProvider, HttpEmbeddingProvider};
