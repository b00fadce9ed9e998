use tool3rd_protocol::{
    readable_name, IeEntry, MemoryUsage, ResourceMetadata, ResourceType, Settings, WorkerState,
};

use crate::{CatalogueSeries, Notification};

#[derive(Debug, Clone, PartialEq)]
pub struct AppViewModel {
    pub worker_state: WorkerState,
    /// Mutating actions are disabled while the worker is busy.
    pub can_mutate: bool,
    pub resources: Vec<ResourceRowView>,
    pub memory: Option<MemoryUsage>,
    pub ie_source: Option<String>,
    pub ie_list: Vec<IeEntry>,
    pub queue: Vec<QueueRowView>,
    pub catalogue: Vec<CatalogueSeries>,
    pub settings: Option<Settings>,
    pub notifications: Vec<Notification>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRowView {
    pub id: String,
    pub name: String,
    /// `38.331-h00 (asn1)` for `38.331-h00.asn1`.
    pub display_name: String,
    pub resource_type: ResourceType,
}

impl From<&ResourceMetadata> for ResourceRowView {
    fn from(metadata: &ResourceMetadata) -> Self {
        Self {
            id: metadata.id.clone(),
            name: metadata.name.clone(),
            display_name: readable_name(&metadata.name),
            resource_type: metadata.resource_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueRowView {
    pub resource: String,
    pub name: String,
    pub key: String,
    pub expand: bool,
}

impl AppViewModel {
    /// Memory usage as `used / total` in whole megabytes.
    pub fn memory_label(&self) -> Option<String> {
        const MB: u64 = 1024 * 1024;
        self.memory
            .map(|MemoryUsage { total, used }| format!("{} / {} MB", used / MB, total / MB))
    }
}
