use tool3rd_protocol::{Envelope, Settings};

use crate::{CatalogueSeries, NotificationId};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// The UI context came up; asks the worker for fresh snapshots.
    Started,
    /// A validated envelope from the relay.
    Inbound(Envelope),
    /// User picked a local file.
    LoadResource { name: String, serialized: String },
    UnloadResource { id: String },
    CatalogueRequested,
    CatalogueLoaded(Vec<CatalogueSeries>),
    /// User picked a version from the remote catalogue.
    FetchResource {
        series: String,
        spec: String,
        version: String,
    },
    ResourceFetched { name: String, serialized: String },
    /// Catalogue or resource download failed.
    FetchFailed { title: String, description: String },
    RequestIeList { id: String },
    /// Queue the IE with `key` from the IE list currently shown.
    QueueAdd { key: String },
    QueueRemove { index: usize },
    QueueToggleExpand { index: usize },
    QueueClear,
    FormatClicked,
    DiffClicked {
        old_resource_id: String,
        new_resource_id: String,
    },
    OpenFolder { location: String },
    SettingsRequested,
    /// Reply to `getSettings`.
    SettingsLoaded(Settings),
    SettingsApplied(Settings),
    NotificationDismissed(NotificationId),
    /// Render tick; expires auto-dismissing notifications.
    Tick,
    NoOp,
}
