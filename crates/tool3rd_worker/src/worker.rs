use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use context_logging::{ctx_debug, ctx_error, ctx_info, ctx_trace, ctx_warn};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tool3rd_protocol::{
    readable_name, ArtifactKind, Channel, Envelope, MemoryUsage, Payload, ProcessId, QueueItem,
    ResourceMetadata, WorkerState,
};

use crate::debounce::Debouncer;
use crate::memory::MemoryProbe;
use crate::model::DomainModel;
use crate::outbox::Outbox;
use crate::pending::{completion_report, Artifact, ArtifactError, PendingSave};
use crate::persist::write_atomically;
use crate::state::{BusyGuard, StateMachine};
use crate::store::ResourceStore;
use crate::toolkit::Toolkit;
use crate::workbook::Workbook;

const DEFAULT_REPORT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Quiet period before a resource list or memory usage report is sent.
    /// Zero sends every report immediately.
    pub report_debounce: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            report_debounce: DEFAULT_REPORT_DEBOUNCE,
        }
    }
}

/// The compute context. Handles one inbound envelope at a time; domain work
/// runs on the blocking pool and is awaited before the next message is read.
pub struct Worker {
    store: ResourceStore,
    state: StateMachine,
    outbox: Outbox,
    toolkit: Arc<dyn Toolkit>,
    pending: Option<PendingSave>,
    list_reporter: Debouncer<Vec<ResourceMetadata>>,
    memory_reporter: Debouncer<()>,
}

impl Worker {
    /// Must be called inside a tokio runtime unless the debounce is zero.
    pub fn new(
        config: WorkerConfig,
        store: ResourceStore,
        toolkit: Arc<dyn Toolkit>,
        probe: Arc<dyn MemoryProbe>,
        outbox: Outbox,
    ) -> Self {
        let list_reporter = {
            let outbox = outbox.clone();
            Debouncer::new(config.report_debounce, move |resource_list| {
                outbox.post(Payload::ResourceListReport { resource_list });
            })
        };
        let memory_reporter = {
            let outbox = outbox.clone();
            Debouncer::new(config.report_debounce, move |()| {
                let MemoryUsage { total, used } = probe.sample();
                outbox.post(Payload::MemoryUsageReport { total, used });
            })
        };
        Self {
            store,
            state: StateMachine::new(outbox.clone()),
            outbox,
            toolkit,
            pending: None,
            list_reporter,
            memory_reporter,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state.state()
    }

    pub fn store(&self) -> &ResourceStore {
        &self.store
    }

    /// The artifact waiting for a save location, if any.
    pub fn pending_artifact(&self) -> Option<&Artifact> {
        self.pending.as_ref().map(PendingSave::artifact)
    }

    pub async fn run(&mut self, mut inbox: mpsc::UnboundedReceiver<Value>) {
        ctx_info!("worker ready");
        while let Some(message) = inbox.recv().await {
            self.handle(message).await;
        }
        ctx_info!("inbound port closed, worker stopping");
    }

    /// Validates and dispatches one raw message. Invalid messages are dropped.
    pub async fn handle(&mut self, message: Value) {
        let envelope = match Envelope::decode(&message) {
            Ok(envelope) => envelope,
            Err(err) => {
                ctx_debug!("dropping invalid message: {}", err);
                return;
            }
        };
        if envelope.dest != ProcessId::Worker {
            ctx_debug!("dropping {} addressed to {}", envelope.channel(), envelope.dest);
            return;
        }
        ctx_trace!("received {}", envelope.channel());

        match envelope.payload {
            Payload::Ping {} => self.on_ping(),
            Payload::ResourceLoadRequest { name, serialized } => {
                self.on_load(name, serialized).await;
            }
            Payload::ResourceUnloadRequest { id } => self.on_unload(&id),
            Payload::IeListRequest { id } => self.on_ie_list(&id),
            Payload::FormatRequest { queue } => self.on_format(queue).await,
            Payload::DiffRequest {
                old_resource_id,
                new_resource_id,
            } => self.on_diff(&old_resource_id, &new_resource_id).await,
            Payload::SaveLocationResponse { save_location } => {
                self.on_save_location(save_location).await;
            }
            other => ctx_debug!("worker does not handle {}", other.channel()),
        }
    }

    fn on_ping(&self) {
        self.memory_reporter.push(());
        self.list_reporter.push(self.store.list_metadata());
        self.state.report();
    }

    async fn on_load(&mut self, name: String, serialized: String) {
        let Some(busy) = self.state.try_enter(Channel::ResourceLoadRequest) else {
            return;
        };

        if self.store.contains_name(&name) {
            ctx_info!("{} is already loaded", name);
        } else {
            let parsed =
                tokio::task::spawn_blocking(move || DomainModel::from_serialized(&serialized)).await;
            match parsed {
                Ok(Ok(model)) => {
                    if let Some(metadata) = self.store.insert(name, model) {
                        ctx_info!("loaded {} as {}", metadata.name, metadata.id);
                    }
                }
                Ok(Err(err)) => {
                    ctx_warn!("{} was not loaded: {}", name, err);
                    self.outbox.post(Payload::NotificationReport {
                        title: "Unrecognized resource".to_string(),
                        description: format!("{} is not a supported specification", readable_name(&name)),
                        auto_dismiss: true,
                    });
                }
                Err(err) => ctx_error!("parsing {} failed: {}", name, err),
            }
        }

        self.report_resources();
        drop(busy);
    }

    fn on_unload(&mut self, id: &str) {
        let Some(busy) = self.state.try_enter(Channel::ResourceUnloadRequest) else {
            return;
        };
        match self.store.unload(id) {
            Some(metadata) => ctx_info!("unloaded {} ({})", metadata.name, metadata.id),
            None => ctx_debug!("no resource with id {} to unload", id),
        }
        self.report_resources();
        drop(busy);
    }

    fn on_ie_list(&self, id: &str) {
        let Some(busy) = self.state.try_enter(Channel::IeListRequest) else {
            return;
        };
        match self.store.find(id) {
            Some(resource) => self.outbox.post(Payload::IeListReport {
                ie_list: resource.model.ie_list(),
            }),
            None => ctx_warn!("ie list requested for unknown resource {}", id),
        }
        drop(busy);
    }

    async fn on_format(&mut self, queue: Vec<QueueItem>) {
        let Some(busy) = self.state.try_enter(Channel::FormatRequest) else {
            return;
        };

        let mut jobs = Vec::with_capacity(queue.len());
        for item in queue {
            match self.store.find(&item.id) {
                Some(resource) => jobs.push(FormatJob {
                    resource_name: resource.name.clone(),
                    model: resource.model.clone(),
                    item,
                }),
                None => ctx_warn!("skipping {}: resource {} is not loaded", item.key, item.id),
            }
        }

        let toolkit = self.toolkit.clone();
        let built = tokio::task::spawn_blocking(move || build_workbook(toolkit.as_ref(), &jobs)).await;
        match built {
            Ok(workbook) => {
                ctx_info!("workbook ready with {} sheet(s)", workbook.sheet_names().len());
                self.park(Artifact::Workbook(workbook), busy);
            }
            Err(err) => {
                ctx_error!("formatting failed: {}", err);
                self.outbox
                    .post(completion_report(ArtifactKind::Workbook, false, None));
                drop(busy);
            }
        }
    }

    async fn on_diff(&mut self, old_id: &str, new_id: &str) {
        let Some(busy) = self.state.try_enter(Channel::DiffRequest) else {
            return;
        };

        let (Some(old), Some(new)) = (self.store.find(old_id), self.store.find(new_id)) else {
            ctx_warn!("cannot diff {} against {}: resource not loaded", old_id, new_id);
            self.outbox
                .post(completion_report(ArtifactKind::DiffReport, false, None));
            drop(busy);
            return;
        };

        let (old_name, old_model) = (old.name.clone(), old.model.clone());
        let (new_name, new_model) = (new.name.clone(), new.model.clone());
        let toolkit = self.toolkit.clone();
        let rendered = tokio::task::spawn_blocking(move || {
            toolkit.diff_report(&old_name, &old_model, &new_name, &new_model)
        })
        .await;

        match rendered {
            Ok(Ok(html)) => self.park(Artifact::DiffReport(html), busy),
            Ok(Err(err)) => {
                ctx_warn!("diff of {} and {} failed: {}", old_id, new_id, err);
                self.outbox
                    .post(completion_report(ArtifactKind::DiffReport, false, None));
                drop(busy);
            }
            Err(err) => {
                ctx_error!("diff task failed: {}", err);
                self.outbox
                    .post(completion_report(ArtifactKind::DiffReport, false, None));
                drop(busy);
            }
        }
    }

    async fn on_save_location(&mut self, save_location: Option<String>) {
        let Some(pending) = self.pending.take() else {
            ctx_debug!("save location received with nothing pending");
            return;
        };
        let (artifact, busy) = pending.into_parts();
        let kind = artifact.kind();

        let report = match save_location.filter(|location| !location.is_empty()) {
            None => {
                ctx_info!("save cancelled, discarding {:?}", kind);
                completion_report(kind, false, None)
            }
            Some(location) => {
                let target = PathBuf::from(&location);
                let written = tokio::task::spawn_blocking(move || -> Result<(), ArtifactError> {
                    let bytes = artifact.into_bytes()?;
                    write_atomically(&target, &bytes)?;
                    Ok(())
                })
                .await;
                match written {
                    Ok(Ok(())) => {
                        ctx_info!("saved {:?} to {}", kind, location);
                        completion_report(kind, true, Some(location))
                    }
                    Ok(Err(err)) => {
                        ctx_error!("saving to {} failed: {}", location, err);
                        completion_report(kind, false, Some(location))
                    }
                    Err(err) => {
                        ctx_error!("save task failed: {}", err);
                        completion_report(kind, false, Some(location))
                    }
                }
            }
        };

        self.outbox.post(report);
        self.memory_reporter.push(());
        drop(busy);
    }

    /// Parks the artifact with its busy guard and asks the orchestrator where
    /// to write it.
    fn park(&mut self, artifact: Artifact, busy: BusyGuard) {
        let kind = artifact.kind();
        if let Some(stale) = self.pending.take() {
            ctx_warn!("replacing unanswered {:?}", stale.artifact().kind());
        }
        self.pending = Some(PendingSave::new(artifact, busy));
        self.memory_reporter.push(());
        self.outbox.post(Payload::SaveLocationRequest {
            artifact: Some(kind),
        });
    }

    fn report_resources(&self) {
        self.list_reporter.push(self.store.list_metadata());
        self.memory_reporter.push(());
    }
}

struct FormatJob {
    resource_name: String,
    model: Arc<DomainModel>,
    item: QueueItem,
}

fn build_workbook(toolkit: &dyn Toolkit, jobs: &[FormatJob]) -> Workbook {
    let mut workbook = Workbook::new();
    for job in jobs {
        let Some(sheet) = toolkit.sheet_rows(&job.model, &job.item.key, job.item.expand) else {
            ctx_warn!("{} has no formattable IE {}", job.resource_name, job.item.key);
            continue;
        };
        workbook.add_sheet(&job.item.name, &sheet.title, sheet.rows);
    }
    workbook
}

/// The worker context running on its own thread.
pub struct WorkerHandle {
    inbox: mpsc::UnboundedSender<Value>,
    stop: oneshot::Sender<()>,
    thread: thread::JoinHandle<()>,
}

impl WorkerHandle {
    /// Starts the worker thread. Returns the handle and the worker's outbound
    /// port.
    pub fn spawn(
        config: WorkerConfig,
        toolkit: Arc<dyn Toolkit>,
        probe: Arc<dyn MemoryProbe>,
    ) -> io::Result<(Self, mpsc::UnboundedReceiver<Value>)> {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let (outbox_tx, outbox_rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = oneshot::channel();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;

        let thread = thread::Builder::new()
            .name("worker".to_string())
            .spawn(move || {
                context_logging::set_context("worker");
                runtime.block_on(async move {
                    let mut worker = Worker::new(
                        config,
                        ResourceStore::new(),
                        toolkit,
                        probe,
                        Outbox::new(outbox_tx),
                    );
                    tokio::select! {
                        () = worker.run(inbox_rx) => {}
                        _ = stop_rx => ctx_info!("worker stopped"),
                    }
                });
            })?;

        Ok((
            Self {
                inbox: inbox_tx,
                stop: stop_tx,
                thread,
            },
            outbox_rx,
        ))
    }

    /// Sender for the worker's inbound port.
    pub fn sender(&self) -> mpsc::UnboundedSender<Value> {
        self.inbox.clone()
    }

    pub fn post(&self, message: Value) {
        if self.inbox.send(message).is_err() {
            ctx_debug!("worker inbound port closed");
        }
    }

    /// Stops the worker after the message it is handling and waits for its
    /// thread.
    pub fn shutdown(self) {
        let _ = self.stop.send(());
        if self.thread.join().is_err() {
            ctx_error!("worker thread panicked");
        }
    }
}
