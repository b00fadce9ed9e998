use std::sync::Arc;

use tool3rd_protocol::ResourceMetadata;

use crate::model::{DomainModel, ModelError};

/// A loaded resource. The model is shared read-only with blocking compute
/// tasks; it is never mutated in place.
#[derive(Debug, Clone)]
pub struct Resource {
    pub id: String,
    pub name: String,
    pub model: Arc<DomainModel>,
}

impl Resource {
    pub fn metadata(&self) -> ResourceMetadata {
        ResourceMetadata {
            id: self.id.clone(),
            name: self.name.clone(),
            resource_type: self.model.resource_type(),
        }
    }
}

#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(ResourceMetadata),
    /// A resource with the same name is already loaded; nothing changed.
    Duplicate,
    Unrecognized(ModelError),
}

/// In-memory resources of the compute worker, in insertion order.
///
/// Ids come from a monotonic counter, so an id freed by `unload` is never
/// handed to a later resource.
#[derive(Debug, Default)]
pub struct ResourceStore {
    resources: Vec<Resource>,
    next_id: u64,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.resources.iter().any(|resource| resource.name == name)
    }

    /// Parses and inserts `serialized` under `name`, unless the name is taken.
    pub fn load(&mut self, name: &str, serialized: &str) -> LoadOutcome {
        if self.contains_name(name) {
            return LoadOutcome::Duplicate;
        }
        match DomainModel::from_serialized(serialized) {
            Ok(model) => match self.insert(name, model) {
                Some(metadata) => LoadOutcome::Loaded(metadata),
                None => LoadOutcome::Duplicate,
            },
            Err(err) => LoadOutcome::Unrecognized(err),
        }
    }

    /// Inserts an already parsed model. Returns `None` if the name is taken.
    pub fn insert(&mut self, name: impl Into<String>, model: DomainModel) -> Option<ResourceMetadata> {
        let name = name.into();
        if self.contains_name(&name) {
            return None;
        }
        let resource = Resource {
            id: self.next_id.to_string(),
            name,
            model: Arc::new(model),
        };
        self.next_id += 1;
        let metadata = resource.metadata();
        self.resources.push(resource);
        Some(metadata)
    }

    pub fn unload(&mut self, id: &str) -> Option<ResourceMetadata> {
        let index = self.resources.iter().position(|resource| resource.id == id)?;
        Some(self.resources.remove(index).metadata())
    }

    pub fn find(&self, id: &str) -> Option<&Resource> {
        self.resources.iter().find(|resource| resource.id == id)
    }

    pub fn list_metadata(&self) -> Vec<ResourceMetadata> {
        self.resources.iter().map(Resource::metadata).collect()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
