//! tool3rd worker: the compute context. Owns the resource store, the busy/idle
//! state machine and the pending save slot, and answers renderer requests.
mod debounce;
mod diff;
mod memory;
mod model;
mod outbox;
mod pending;
mod persist;
mod state;
mod store;
mod toolkit;
mod workbook;
mod worker;

pub use debounce::Debouncer;
pub use diff::{diff_models, render_diff_report, Change, ChangeKind, DiffError};
pub use memory::{MemoryProbe, SysinfoProbe};
pub use model::{Asn1Model, Asn1Module, Assignment, Definition, DomainModel, ModelError, TabularModel};
pub use outbox::Outbox;
pub use pending::{Artifact, ArtifactError};
pub use persist::{write_atomically, PersistError};
pub use state::{BusyGuard, StateMachine};
pub use store::{LoadOutcome, Resource, ResourceStore};
pub use toolkit::{BuiltinToolkit, SheetRows, Toolkit};
pub use workbook::{ContentsEntry, Sheet, Workbook, WorkbookError, CONTENTS_SHEET};
pub use worker::{Worker, WorkerConfig, WorkerHandle};
