use std::path::Path;

use context_logging::{ctx_debug, ctx_error, ctx_info, ctx_warn};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tool3rd_protocol::{
    ArtifactKind, Channel, Envelope, EnvelopeHeader, Payload, ProcessId,
};

use crate::broker::SaveDialog;
use crate::settings_store::SettingsStore;
use crate::shell::FolderOpener;

/// What the orchestrator does with one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAction {
    ForwardToWorker,
    ForwardToRenderer,
    HandleLocally,
    Drop,
}

/// Routing decision from the header alone. Unknown channels are still
/// forwarded between UI and worker so that the receiver drops them; locally
/// handled traffic must name a known channel.
pub fn route(src: ProcessId, dest: ProcessId, channel: Option<Channel>) -> RouteAction {
    match (src, dest, channel) {
        (ProcessId::Renderer, ProcessId::Worker, _) => RouteAction::ForwardToWorker,
        (ProcessId::Worker, ProcessId::Renderer, _) => RouteAction::ForwardToRenderer,
        (ProcessId::Renderer, ProcessId::Main, Some(_))
        | (ProcessId::Worker, ProcessId::Main, Some(_)) => RouteAction::HandleLocally,
        _ => RouteAction::Drop,
    }
}

/// One `message` invocation from the UI context. Requests addressed to the
/// orchestrator may answer through `reply`.
#[derive(Debug)]
pub struct Invocation {
    pub message: Value,
    pub reply: oneshot::Sender<Option<Value>>,
}

/// The orchestrator context: the only component connected to both the UI and
/// the worker.
pub struct Relay {
    worker_tx: mpsc::UnboundedSender<Value>,
    renderer_tx: mpsc::UnboundedSender<Value>,
    settings: SettingsStore,
    dialog: Box<dyn SaveDialog>,
    opener: Box<dyn FolderOpener>,
    relaunch: CancellationToken,
}

impl Relay {
    pub fn new(
        worker_tx: mpsc::UnboundedSender<Value>,
        renderer_tx: mpsc::UnboundedSender<Value>,
        settings: SettingsStore,
        dialog: Box<dyn SaveDialog>,
        opener: Box<dyn FolderOpener>,
        relaunch: CancellationToken,
    ) -> Self {
        Self {
            worker_tx,
            renderer_tx,
            settings,
            dialog,
            opener,
            relaunch,
        }
    }

    /// Handles a message from the UI context.
    pub fn invoke(&mut self, message: Value) -> Option<Value> {
        let header = self.header(&message)?;
        if header.src != ProcessId::Renderer {
            ctx_debug!("dropping {} claiming to come from {}", header.channel, header.src);
            return None;
        }
        match route(header.src, header.dest, header.known_channel()) {
            RouteAction::ForwardToWorker => {
                forward(&self.worker_tx, message, &header);
                None
            }
            RouteAction::HandleLocally => self.handle_local(&message),
            RouteAction::ForwardToRenderer | RouteAction::Drop => {
                ctx_debug!("dropping {} from {} to {}", header.channel, header.src, header.dest);
                None
            }
        }
    }

    /// Handles a message from the worker context.
    pub fn from_worker(&mut self, message: Value) {
        let Some(header) = self.header(&message) else {
            return;
        };
        if header.src != ProcessId::Worker {
            ctx_debug!("dropping {} claiming to come from {}", header.channel, header.src);
            return;
        }
        match route(header.src, header.dest, header.known_channel()) {
            RouteAction::ForwardToRenderer => forward(&self.renderer_tx, message, &header),
            RouteAction::HandleLocally => {
                self.handle_local(&message);
            }
            RouteAction::ForwardToWorker | RouteAction::Drop => {
                ctx_debug!("dropping {} from {} to {}", header.channel, header.src, header.dest);
            }
        }
    }

    fn header(&self, message: &Value) -> Option<EnvelopeHeader> {
        match EnvelopeHeader::decode(message) {
            Ok(header) => Some(header),
            Err(err) => {
                ctx_debug!("dropping message without a valid header: {}", err);
                None
            }
        }
    }

    fn handle_local(&mut self, message: &Value) -> Option<Value> {
        let envelope = match Envelope::decode(message) {
            Ok(envelope) => envelope,
            Err(err) => {
                ctx_debug!("dropping invalid message: {}", err);
                return None;
            }
        };

        match envelope.payload {
            Payload::GetSettings {} => match self.settings.load() {
                Ok(settings) => serde_json::to_value(settings)
                    .map_err(|err| ctx_error!("failed to encode settings: {}", err))
                    .ok(),
                Err(err) => {
                    ctx_error!("failed to load settings: {}", err);
                    None
                }
            },
            Payload::SetSettings { settings } => {
                match self.settings.save(&settings) {
                    Ok(()) => {
                        ctx_info!("settings saved, relaunching");
                        self.relaunch.cancel();
                    }
                    Err(err) => ctx_error!("failed to save settings: {}", err),
                }
                None
            }
            Payload::OpenFolderRequest { location } => {
                if let Err(err) = self.opener.reveal(Path::new(&location)) {
                    ctx_warn!("cannot reveal {}: {}", location, err);
                }
                None
            }
            Payload::SaveLocationRequest { artifact } => {
                let kind = artifact.unwrap_or(ArtifactKind::Workbook);
                let save_location = self
                    .dialog
                    .choose(kind)
                    .map(|path| path.to_string_lossy().into_owned());
                if save_location.is_none() {
                    ctx_info!("save location dialog cancelled");
                }
                self.respond_to_worker(Payload::SaveLocationResponse { save_location });
                None
            }
            other => {
                ctx_debug!("orchestrator does not handle {}", other.channel());
                None
            }
        }
    }

    fn respond_to_worker(&self, payload: Payload) {
        let channel = payload.channel();
        match Envelope::new(payload).encode() {
            Ok(value) => {
                if self.worker_tx.send(value).is_err() {
                    ctx_warn!("worker port closed, {} lost", channel);
                }
            }
            Err(err) => ctx_error!("failed to encode {}: {}", channel, err),
        }
    }
}

fn forward(tx: &mpsc::UnboundedSender<Value>, message: Value, header: &EnvelopeHeader) {
    if tx.send(message).is_err() {
        ctx_debug!("{} port closed, dropping {}", header.dest, header.channel);
    }
}

/// How a relay session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The UI context went away.
    Quit,
    /// Settings changed; start every context again.
    Relaunch,
}

/// Orchestrator event loop. Runs until the UI context closes its port or a
/// relaunch is requested.
pub async fn serve(
    mut relay: Relay,
    mut invocations: mpsc::UnboundedReceiver<Invocation>,
    mut from_worker: mpsc::UnboundedReceiver<Value>,
) -> SessionEnd {
    let relaunch = relay.relaunch.clone();
    loop {
        tokio::select! {
            biased;
            () = relaunch.cancelled() => return SessionEnd::Relaunch,
            invocation = invocations.recv() => match invocation {
                Some(Invocation { message, reply }) => {
                    let answer = relay.invoke(message);
                    let _ = reply.send(answer);
                }
                None => return SessionEnd::Quit,
            },
            message = from_worker.recv() => match message {
                Some(message) => relay.from_worker(message),
                None => {
                    ctx_error!("worker context stopped");
                    return SessionEnd::Quit;
                }
            },
        }
    }
}
