use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{IeEntry, QueueItem, ResourceMetadata, Settings, WorkerState};

/// The three execution contexts that exchange envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessId {
    Main,
    Worker,
    Renderer,
}

impl ProcessId {
    pub const fn as_str(self) -> &'static str {
        match self {
            ProcessId::Main => "main",
            ProcessId::Worker => "worker",
            ProcessId::Renderer => "renderer",
        }
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of artifact waiting for a save location. Only used to pick the
/// dialog filter on the orchestrator side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArtifactKind {
    Workbook,
    DiffReport,
}

impl ArtifactKind {
    pub const fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Workbook => "xlsx",
            ArtifactKind::DiffReport => "html",
        }
    }

    pub const fn filter_name(self) -> &'static str {
        match self {
            ArtifactKind::Workbook => "Spreadsheet file",
            ArtifactKind::DiffReport => "HTML file",
        }
    }
}

/// Channel-specific payloads. The `channel` literal is the serde tag, so it is
/// matched before any payload field is looked at: two channels sharing the same
/// payload shape (`{id}`) can never be confused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "channel", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Payload {
    Ping {},
    ResourceLoadRequest {
        name: String,
        serialized: String,
    },
    ResourceUnloadRequest {
        id: String,
    },
    ResourceListReport {
        resource_list: Vec<ResourceMetadata>,
    },
    MemoryUsageReport {
        total: u64,
        used: u64,
    },
    WorkerStateReport {
        state: WorkerState,
    },
    IeListRequest {
        id: String,
    },
    IeListReport {
        ie_list: Vec<IeEntry>,
    },
    FormatRequest {
        queue: Vec<QueueItem>,
    },
    FormatReport {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        save_location: Option<String>,
    },
    DiffRequest {
        old_resource_id: String,
        new_resource_id: String,
    },
    DiffReport {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        save_location: Option<String>,
    },
    SaveLocationRequest {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        artifact: Option<ArtifactKind>,
    },
    SaveLocationResponse {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        save_location: Option<String>,
    },
    OpenFolderRequest {
        location: String,
    },
    GetSettings {},
    SetSettings {
        settings: Settings,
    },
    NotificationReport {
        title: String,
        description: String,
        auto_dismiss: bool,
    },
}

/// Closed set of channel literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Ping,
    ResourceLoadRequest,
    ResourceUnloadRequest,
    ResourceListReport,
    MemoryUsageReport,
    WorkerStateReport,
    IeListRequest,
    IeListReport,
    FormatRequest,
    FormatReport,
    DiffRequest,
    DiffReport,
    SaveLocationRequest,
    SaveLocationResponse,
    OpenFolderRequest,
    GetSettings,
    SetSettings,
    NotificationReport,
}

/// Fixed direction of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub src: ProcessId,
    pub dest: ProcessId,
}

impl Channel {
    pub const ALL: [Channel; 18] = [
        Channel::Ping,
        Channel::ResourceLoadRequest,
        Channel::ResourceUnloadRequest,
        Channel::ResourceListReport,
        Channel::MemoryUsageReport,
        Channel::WorkerStateReport,
        Channel::IeListRequest,
        Channel::IeListReport,
        Channel::FormatRequest,
        Channel::FormatReport,
        Channel::DiffRequest,
        Channel::DiffReport,
        Channel::SaveLocationRequest,
        Channel::SaveLocationResponse,
        Channel::OpenFolderRequest,
        Channel::GetSettings,
        Channel::SetSettings,
        Channel::NotificationReport,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Channel::Ping => "ping",
            Channel::ResourceLoadRequest => "resourceLoadRequest",
            Channel::ResourceUnloadRequest => "resourceUnloadRequest",
            Channel::ResourceListReport => "resourceListReport",
            Channel::MemoryUsageReport => "memoryUsageReport",
            Channel::WorkerStateReport => "workerStateReport",
            Channel::IeListRequest => "ieListRequest",
            Channel::IeListReport => "ieListReport",
            Channel::FormatRequest => "formatRequest",
            Channel::FormatReport => "formatReport",
            Channel::DiffRequest => "diffRequest",
            Channel::DiffReport => "diffReport",
            Channel::SaveLocationRequest => "saveLocationRequest",
            Channel::SaveLocationResponse => "saveLocationResponse",
            Channel::OpenFolderRequest => "openFolderRequest",
            Channel::GetSettings => "getSettings",
            Channel::SetSettings => "setSettings",
            Channel::NotificationReport => "notificationReport",
        }
    }

    pub fn from_name(name: &str) -> Option<Channel> {
        Channel::ALL.into_iter().find(|channel| channel.as_str() == name)
    }

    pub const fn route(self) -> Route {
        use ProcessId::{Main, Renderer, Worker};
        let (src, dest) = match self {
            Channel::Ping
            | Channel::ResourceLoadRequest
            | Channel::ResourceUnloadRequest
            | Channel::IeListRequest
            | Channel::FormatRequest
            | Channel::DiffRequest => (Renderer, Worker),
            Channel::ResourceListReport
            | Channel::MemoryUsageReport
            | Channel::WorkerStateReport
            | Channel::IeListReport
            | Channel::FormatReport
            | Channel::DiffReport
            | Channel::NotificationReport => (Worker, Renderer),
            Channel::SaveLocationRequest => (Worker, Main),
            Channel::SaveLocationResponse => (Main, Worker),
            Channel::OpenFolderRequest | Channel::GetSettings | Channel::SetSettings => {
                (Renderer, Main)
            }
        };
        Route { src, dest }
    }

    /// Requests that must not overlap with another one in the worker.
    pub const fn is_mutating(self) -> bool {
        matches!(
            self,
            Channel::ResourceLoadRequest
                | Channel::ResourceUnloadRequest
                | Channel::IeListRequest
                | Channel::FormatRequest
                | Channel::DiffRequest
                | Channel::SetSettings
        )
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Payload {
    pub fn channel(&self) -> Channel {
        match self {
            Payload::Ping {} => Channel::Ping,
            Payload::ResourceLoadRequest { .. } => Channel::ResourceLoadRequest,
            Payload::ResourceUnloadRequest { .. } => Channel::ResourceUnloadRequest,
            Payload::ResourceListReport { .. } => Channel::ResourceListReport,
            Payload::MemoryUsageReport { .. } => Channel::MemoryUsageReport,
            Payload::WorkerStateReport { .. } => Channel::WorkerStateReport,
            Payload::IeListRequest { .. } => Channel::IeListRequest,
            Payload::IeListReport { .. } => Channel::IeListReport,
            Payload::FormatRequest { .. } => Channel::FormatRequest,
            Payload::FormatReport { .. } => Channel::FormatReport,
            Payload::DiffRequest { .. } => Channel::DiffRequest,
            Payload::DiffReport { .. } => Channel::DiffReport,
            Payload::SaveLocationRequest { .. } => Channel::SaveLocationRequest,
            Payload::SaveLocationResponse { .. } => Channel::SaveLocationResponse,
            Payload::OpenFolderRequest { .. } => Channel::OpenFolderRequest,
            Payload::GetSettings {} => Channel::GetSettings,
            Payload::SetSettings { .. } => Channel::SetSettings,
            Payload::NotificationReport { .. } => Channel::NotificationReport,
        }
    }
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("message matches no channel schema: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("channel {channel} cannot travel from {src} to {dest}")]
    Misrouted {
        channel: Channel,
        src: ProcessId,
        dest: ProcessId,
    },
}

/// A fully validated message: routing header plus channel payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub src: ProcessId,
    pub dest: ProcessId,
    #[serde(flatten)]
    pub payload: Payload,
}

impl Envelope {
    /// Wraps a payload, filling `src`/`dest` from the channel's route.
    pub fn new(payload: Payload) -> Self {
        let Route { src, dest } = payload.channel().route();
        Self { src, dest, payload }
    }

    pub fn channel(&self) -> Channel {
        self.payload.channel()
    }

    /// Validates a raw message against the channel schemas and the channel's
    /// route.
    pub fn decode(value: &Value) -> Result<Self, ProtocolError> {
        let envelope = Envelope::deserialize(value)?;
        let route = envelope.channel().route();
        if route.src != envelope.src || route.dest != envelope.dest {
            return Err(ProtocolError::Misrouted {
                channel: envelope.channel(),
                src: envelope.src,
                dest: envelope.dest,
            });
        }
        Ok(envelope)
    }

    pub fn encode(&self) -> Result<Value, ProtocolError> {
        Ok(serde_json::to_value(self)?)
    }
}

impl From<Payload> for Envelope {
    fn from(payload: Payload) -> Self {
        Envelope::new(payload)
    }
}

/// Routing header only; the channel is kept as a free string so unknown
/// channels can still be routed (and dropped by their receiver).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnvelopeHeader {
    pub src: ProcessId,
    pub dest: ProcessId,
    pub channel: String,
}

impl EnvelopeHeader {
    pub fn decode(value: &Value) -> Result<Self, ProtocolError> {
        Ok(EnvelopeHeader::deserialize(value)?)
    }

    pub fn known_channel(&self) -> Option<Channel> {
        Channel::from_name(&self.channel)
    }
}
