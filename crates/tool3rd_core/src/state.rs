use tool3rd_protocol::{
    IeEntry, MemoryUsage, QueueItem, ResourceMetadata, Settings, WorkerState,
};

use crate::view_model::{AppViewModel, QueueRowView, ResourceRowView};
use crate::CatalogueSeries;

pub type NotificationId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationAction {
    OpenFolder { location: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    pub description: String,
    /// Expires on the next tick instead of waiting for the user.
    pub auto_dismiss: bool,
    pub action: Option<NotificationAction>,
}

/// Everything the UI context knows. Worker-owned data only arrives through
/// reports and is replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    worker_state: WorkerState,
    resources: Vec<ResourceMetadata>,
    memory: Option<MemoryUsage>,
    ie_source: Option<String>,
    ie_list: Vec<IeEntry>,
    queue: Vec<QueueItem>,
    catalogue: Vec<CatalogueSeries>,
    settings: Option<Settings>,
    notifications: Vec<Notification>,
    next_notification_id: NotificationId,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            // Until the worker's first report arrives nothing may be sent.
            worker_state: WorkerState::Busy,
            resources: Vec::new(),
            memory: None,
            ie_source: None,
            ie_list: Vec::new(),
            queue: Vec::new(),
            catalogue: Vec::new(),
            settings: None,
            notifications: Vec::new(),
            next_notification_id: 1,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            worker_state: self.worker_state,
            can_mutate: self.can_mutate(),
            resources: self.resources.iter().map(ResourceRowView::from).collect(),
            memory: self.memory,
            ie_source: self.ie_source.clone(),
            ie_list: self.ie_list.clone(),
            queue: self
                .queue
                .iter()
                .map(|item| QueueRowView {
                    resource: self.resource_name(&item.id).unwrap_or_default(),
                    name: item.name.clone(),
                    key: item.key.clone(),
                    expand: item.expand,
                })
                .collect(),
            catalogue: self.catalogue.clone(),
            settings: self.settings.clone(),
            notifications: self.notifications.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn worker_state(&self) -> WorkerState {
        self.worker_state
    }

    pub fn can_mutate(&self) -> bool {
        !self.worker_state.is_busy()
    }

    pub fn resources(&self) -> &[ResourceMetadata] {
        &self.resources
    }

    pub fn queue(&self) -> &[QueueItem] {
        &self.queue
    }

    pub fn ie_list(&self) -> &[IeEntry] {
        &self.ie_list
    }

    pub fn catalogue(&self) -> &[CatalogueSeries] {
        &self.catalogue
    }

    pub fn settings(&self) -> Option<&Settings> {
        self.settings.as_ref()
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_worker_state(&mut self, state: WorkerState) {
        if self.worker_state != state {
            self.worker_state = state;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_memory(&mut self, memory: MemoryUsage) {
        self.memory = Some(memory);
        self.mark_dirty();
    }

    /// Replaces the resource list; queue entries and the IE list of resources
    /// that disappeared are dropped with it.
    pub(crate) fn set_resources(&mut self, resources: Vec<ResourceMetadata>) {
        let present = |id: &str| resources.iter().any(|r| r.id == id);
        self.queue.retain(|item| present(&item.id));
        if self.ie_source.as_deref().is_some_and(|id| !present(id)) {
            self.ie_source = None;
            self.ie_list.clear();
        }
        self.resources = resources;
        self.mark_dirty();
    }

    pub(crate) fn set_ie_source(&mut self, id: String) {
        self.ie_source = Some(id);
        self.ie_list.clear();
        self.mark_dirty();
    }

    pub(crate) fn set_ie_list(&mut self, ie_list: Vec<IeEntry>) {
        self.ie_list = ie_list;
        self.mark_dirty();
    }

    /// Queues the IE with `key` from the shown IE list. Returns false when
    /// there is no such IE or it is already queued.
    pub(crate) fn queue_ie(&mut self, key: &str) -> bool {
        let Some(id) = self.ie_source.clone() else {
            return false;
        };
        let Some(ie) = self.ie_list.iter().find(|ie| ie.key == key) else {
            return false;
        };
        if self.queue.iter().any(|item| item.id == id && item.key == key) {
            return false;
        }
        self.queue.push(QueueItem {
            id,
            name: ie.name.clone(),
            key: ie.key.clone(),
            expand: false,
        });
        self.mark_dirty();
        true
    }

    pub(crate) fn unqueue(&mut self, index: usize) {
        if index < self.queue.len() {
            self.queue.remove(index);
            self.mark_dirty();
        }
    }

    pub(crate) fn toggle_expand(&mut self, index: usize) {
        if let Some(item) = self.queue.get_mut(index) {
            item.expand = !item.expand;
            self.mark_dirty();
        }
    }

    pub(crate) fn clear_queue(&mut self) {
        if !self.queue.is_empty() {
            self.queue.clear();
            self.mark_dirty();
        }
    }

    pub(crate) fn set_catalogue(&mut self, catalogue: Vec<CatalogueSeries>) {
        self.catalogue = catalogue;
        self.mark_dirty();
    }

    pub(crate) fn set_settings(&mut self, settings: Settings) {
        self.settings = Some(settings);
        self.mark_dirty();
    }

    pub(crate) fn notify(
        &mut self,
        title: impl Into<String>,
        description: impl Into<String>,
        auto_dismiss: bool,
        action: Option<NotificationAction>,
    ) {
        let id = self.next_notification_id;
        self.next_notification_id += 1;
        self.notifications.push(Notification {
            id,
            title: title.into(),
            description: description.into(),
            auto_dismiss,
            action,
        });
        self.mark_dirty();
    }

    pub(crate) fn dismiss(&mut self, id: NotificationId) {
        let before = self.notifications.len();
        self.notifications.retain(|n| n.id != id);
        if self.notifications.len() != before {
            self.mark_dirty();
        }
    }

    pub(crate) fn expire_notifications(&mut self) {
        let before = self.notifications.len();
        self.notifications.retain(|n| !n.auto_dismiss);
        if self.notifications.len() != before {
            self.mark_dirty();
        }
    }

    fn resource_name(&self, id: &str) -> Option<String> {
        self.resources
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.name.clone())
    }
}
