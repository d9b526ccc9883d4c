//! Byte store backing direct delivery.
//!
//! Resources are immutable records of `(id, mime, bytes)`. The store is an
//! external collaborator; this module only defines the single-key read the
//! resolver needs plus two simple backends.

mod directory;
mod memory;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StoreError;

pub use directory::{mime_for, DirectoryStore};
pub use memory::MemoryStore;

/// The demo catalog: image ids in listing order.
pub const DEFAULT_CATALOG: &[&str] = &[
    "10kb.png",
    "10kb-2.png",
    "10kb-3.png",
    "10kb-4.png",
    "10kb-5.png",
    "100kb.png",
    "100kb-2.png",
    "100kb-3.png",
    "100kb-4.png",
    "100kb-5.png",
    "1mb.png",
    "5mb.png",
    "10mb.png",
];

/// A stored resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Unique identifier (also the object key and CDN path)
    pub id: String,

    /// MIME type, e.g. "image/png"
    pub mime: String,

    /// Raw content
    pub bytes: Bytes,
}

impl Resource {
    pub fn new(id: impl Into<String>, mime: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            id: id.into(),
            mime: mime.into(),
            bytes: bytes.into(),
        }
    }
}

/// Single-key read access to stored resources.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Fetch a resource by id, returning `None` if it does not exist.
    async fn fetch(&self, id: &str) -> Result<Option<Resource>, StoreError>;
}
