use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::StoreError;

use super::{Resource, ResourceStore};

/// In-process resource store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    resources: HashMap<String, Resource>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource, replacing any previous one with the same id.
    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resources.insert(resource.id.clone(), resource);
        self
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn fetch(&self, id: &str) -> Result<Option<Resource>, StoreError> {
        Ok(self.resources.get(id).cloned())
    }
}
