//! LessonLoom Index — tenant-isolated vector storage.
//!
//! `VectorBackend` abstracts the vector database; `MemoryVectorIndex` backs
//! tests and local runs, `HttpVectorIndex` talks to a remote index. The
//! `VectorIndexAdapter` is the single place a namespace is ever derived from
//! an owner id, and every read and write goes through the handle it returns.

pub mod backend;
pub mod http;
pub mod namespace;

pub use backend::{MemoryVectorIndex, VectorBackend};
pub use http::HttpVectorIndex;
pub use namespace::{NamespaceHandle, VectorIndexAdapter};
