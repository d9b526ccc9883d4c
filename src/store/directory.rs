//! Filesystem-backed resource store: one file per resource id.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::error::StoreError;

use super::{Resource, ResourceStore};

/// Serves resources from files directly under a root directory.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, StoreError> {
        if id.is_empty()
            || id == "."
            || id == ".."
            || id.contains(['/', '\\', '\0'])
        {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        Ok(self.root.join(id))
    }
}

/// Guess a MIME type from a resource id's extension.
pub fn mime_for(id: &str) -> mime::Mime {
    let extension = id
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "png" => mime::IMAGE_PNG,
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "gif" => mime::IMAGE_GIF,
        "bmp" => mime::IMAGE_BMP,
        "svg" => mime::IMAGE_SVG,
        "webp" => "image/webp".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

#[async_trait]
impl ResourceStore for DirectoryStore {
    async fn fetch(&self, id: &str) -> Result<Option<Resource>, StoreError> {
        let path = self.path_for(id)?;

        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(Resource {
                id: id.to_string(),
                mime: mime_for(id).to_string(),
                bytes: Bytes::from(data),
            })),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "Resource file not found");
                Ok(None)
            }
            Err(e) => Err(StoreError::Io(format!("{}: {}", path.display(), e))),
        }
    }
}
