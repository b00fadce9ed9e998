use thiserror::Error;
use tool3rd_protocol::{ArtifactKind, Payload};

use crate::persist::PersistError;
use crate::state::BusyGuard;
use crate::workbook::{Workbook, WorkbookError};

/// A rendered artifact that only the worker holds.
#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    Workbook(Workbook),
    DiffReport(String),
}

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to encode workbook: {0}")]
    Encode(#[from] WorkbookError),
    #[error("failed to write artifact: {0}")]
    Persist(#[from] PersistError),
}

impl Artifact {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Artifact::Workbook(_) => ArtifactKind::Workbook,
            Artifact::DiffReport(_) => ArtifactKind::DiffReport,
        }
    }

    pub fn into_bytes(self) -> Result<Vec<u8>, ArtifactError> {
        match self {
            Artifact::Workbook(workbook) => Ok(workbook.to_xlsx()?),
            Artifact::DiffReport(html) => Ok(html.into_bytes()),
        }
    }
}

/// Outcome report for an artifact kind.
pub(crate) fn completion_report(
    kind: ArtifactKind,
    success: bool,
    save_location: Option<String>,
) -> Payload {
    match kind {
        ArtifactKind::Workbook => Payload::FormatReport {
            success,
            save_location,
        },
        ArtifactKind::DiffReport => Payload::DiffReport {
            success,
            save_location,
        },
    }
}

/// The artifact waiting for a save location. It keeps the worker busy until
/// the orchestrator answered and the artifact was written or discarded.
#[derive(Debug)]
pub(crate) struct PendingSave {
    artifact: Artifact,
    busy: BusyGuard,
}

impl PendingSave {
    pub(crate) fn new(artifact: Artifact, busy: BusyGuard) -> Self {
        Self { artifact, busy }
    }

    pub(crate) fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    pub(crate) fn into_parts(self) -> (Artifact, BusyGuard) {
        (self.artifact, self.busy)
    }
}
