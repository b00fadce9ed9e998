//! tool3rd protocol: envelope format and channel schemas shared by the UI,
//! orchestrator and compute worker contexts.
mod envelope;
mod resource;
mod settings;
mod state;

pub use envelope::{
    ArtifactKind, Channel, Envelope, EnvelopeHeader, Payload, ProcessId, ProtocolError, Route,
};
pub use resource::{readable_name, IeEntry, QueueItem, ResourceMetadata, ResourceType};
pub use settings::{CertificateSettings, ProxyProtocol, ProxySettings, Settings};
pub use state::{MemoryUsage, WorkerState};
