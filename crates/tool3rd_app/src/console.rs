//! Line-oriented front end of the UI context.

use std::collections::HashSet;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::thread;

use context_logging::{ctx_debug, ctx_info};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tool3rd_core::{update, AppState, AppViewModel, Msg, NotificationAction};
use tool3rd_protocol::{Envelope, ProxyProtocol, ProxySettings, Settings, WorkerState};

use crate::effects::EffectRunner;

pub const HELP: &str = "\
commands:
  load <path>                      load a serialized specification file
  catalogue                        list the remote catalogue
  fetch <series> <spec> <version>  download and load from the catalogue
  unload <id>                      unload a resource
  list                             show resources and worker status
  ies <id>                         list the IEs of a resource
  queue [<key>]                    queue an IE from the last IE list, or show the queue
  unqueue <index>                  remove a queue entry
  expand <index>                   toggle expansion of a queue entry
  clear                            empty the queue
  format                           render the queue into a workbook
  diff <old id> <new id>           compare two ASN.1 resources
  open <location>                  reveal a saved file
  settings                         show settings
  set-proxy <host> <port> [https]  use a proxy (set-proxy off disables it)
  dismiss <id>                     dismiss a notification
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Load { path: String },
    Catalogue,
    Fetch { series: String, spec: String, version: String },
    Unload { id: String },
    List,
    Ies { id: String },
    Queue { key: Option<String> },
    Unqueue { index: usize },
    Expand { index: usize },
    Clear,
    Format,
    Diff { old: String, new: String },
    Open { location: String },
    Settings,
    SetProxy(Option<ProxySettings>),
    Dismiss { id: u64 },
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&name, args)) = words.split_first() else {
        return Err("empty command".to_string());
    };
    let command = match (name, args) {
        ("load", [path]) => Command::Load {
            path: (*path).to_string(),
        },
        ("catalogue", []) => Command::Catalogue,
        ("fetch", [series, spec, version]) => Command::Fetch {
            series: (*series).to_string(),
            spec: (*spec).to_string(),
            version: (*version).to_string(),
        },
        ("unload", [id]) => Command::Unload {
            id: (*id).to_string(),
        },
        ("list", []) => Command::List,
        ("ies", [id]) => Command::Ies { id: (*id).to_string() },
        ("queue", []) => Command::Queue { key: None },
        ("queue", [key]) => Command::Queue {
            key: Some((*key).to_string()),
        },
        ("unqueue", [index]) => Command::Unqueue {
            index: parse_number(index)?,
        },
        ("expand", [index]) => Command::Expand {
            index: parse_number(index)?,
        },
        ("clear", []) => Command::Clear,
        ("format", []) => Command::Format,
        ("diff", [old, new]) => Command::Diff {
            old: (*old).to_string(),
            new: (*new).to_string(),
        },
        ("open", [location]) => Command::Open {
            location: (*location).to_string(),
        },
        ("settings", []) => Command::Settings,
        ("set-proxy", ["off"]) => Command::SetProxy(None),
        ("set-proxy", [host, port, rest @ ..]) if rest.len() <= 1 => {
            let protocol = match rest {
                [] | ["http"] => ProxyProtocol::Http,
                ["https"] => ProxyProtocol::Https,
                _ => return Err(format!("unknown proxy protocol {}", rest.join(" "))),
            };
            Command::SetProxy(Some(ProxySettings {
                enabled: true,
                protocol,
                host: (*host).to_string(),
                port: parse_number(port)?,
            }))
        }
        ("dismiss", [id]) => Command::Dismiss {
            id: parse_number(id)?,
        },
        ("help", []) => Command::Help,
        ("quit" | "exit", []) => Command::Quit,
        _ => return Err(format!("unknown command or wrong arguments: {line}")),
    };
    Ok(command)
}

fn parse_number<T: std::str::FromStr>(text: &str) -> Result<T, String> {
    text.parse()
        .map_err(|_| format!("{text} is not a valid number"))
}

/// Settings after a `set-proxy` command.
pub fn apply_proxy(mut settings: Settings, proxy: Option<ProxySettings>) -> Settings {
    match proxy {
        Some(proxy) => settings.proxy = proxy,
        None => settings.proxy.enabled = false,
    }
    settings
}

/// Reads stdin on a dedicated thread for the life of the process, so that
/// relaunched UI contexts can keep reading from it.
pub fn spawn_stdin_reader() -> io::Result<mpsc::UnboundedReceiver<String>> {
    let (tx, rx) = mpsc::unbounded_channel();
    thread::Builder::new()
        .name("stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                if tx.send(line).is_err() {
                    break;
                }
            }
        })?;
    Ok(rx)
}

/// The UI context.
pub struct Console {
    state: AppState,
    effects: EffectRunner,
    msg_rx: mpsc::UnboundedReceiver<Msg>,
    renderer_rx: mpsc::UnboundedReceiver<Value>,
    view: ConsoleView,
}

/// Why the UI loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleExit {
    Quit,
    Cancelled,
}

impl Console {
    pub fn new(
        effects: EffectRunner,
        msg_rx: mpsc::UnboundedReceiver<Msg>,
        renderer_rx: mpsc::UnboundedReceiver<Value>,
    ) -> Self {
        Self {
            state: AppState::new(),
            effects,
            msg_rx,
            renderer_rx,
            view: ConsoleView::default(),
        }
    }

    pub async fn run(
        mut self,
        lines: &mut mpsc::UnboundedReceiver<String>,
        cancel: CancellationToken,
    ) -> ConsoleExit {
        self.dispatch(Msg::Started);
        self.dispatch(Msg::SettingsRequested);
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return ConsoleExit::Cancelled,
                Some(message) = self.renderer_rx.recv() => match Envelope::decode(&message) {
                    Ok(envelope) => self.dispatch(Msg::Inbound(envelope)),
                    Err(err) => ctx_debug!("dropping invalid report: {}", err),
                },
                Some(msg) = self.msg_rx.recv() => self.dispatch(msg),
                line = lines.recv() => {
                    let Some(line) = line else {
                        return ConsoleExit::Quit;
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    match parse_command(&line) {
                        Ok(Command::Quit) => return ConsoleExit::Quit,
                        Ok(command) => self.execute(command),
                        Err(err) => say(&err),
                    }
                }
            }
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        self.effects.run(effects);
        if state.consume_dirty() {
            let view = state.view();
            if self.view.render(&view) {
                let (expired, _) = update(state, Msg::Tick);
                state = expired;
                state.consume_dirty();
            }
        }
        self.state = state;
    }

    fn execute(&mut self, command: Command) {
        let blocked = !self.state.can_mutate();
        let msg = match command {
            Command::Load { path } => match read_resource(Path::new(&path)) {
                Ok((name, serialized)) => Msg::LoadResource { name, serialized },
                Err(err) => return say(&format!("cannot read {path}: {err}")),
            },
            Command::Catalogue => Msg::CatalogueRequested,
            Command::Fetch {
                series,
                spec,
                version,
            } => Msg::FetchResource {
                series,
                spec,
                version,
            },
            Command::Unload { id } => Msg::UnloadResource { id },
            Command::List => return self.view.print_status(&self.state.view()),
            Command::Ies { id } => Msg::RequestIeList { id },
            Command::Queue { key: Some(key) } => Msg::QueueAdd { key },
            Command::Queue { key: None } => return self.view.print_queue(&self.state.view()),
            Command::Unqueue { index } => Msg::QueueRemove { index },
            Command::Expand { index } => Msg::QueueToggleExpand { index },
            Command::Clear => Msg::QueueClear,
            Command::Format => Msg::FormatClicked,
            Command::Diff { old, new } => Msg::DiffClicked {
                old_resource_id: old,
                new_resource_id: new,
            },
            Command::Open { location } => Msg::OpenFolder { location },
            Command::Settings => return self.view.print_settings(&self.state.view()),
            Command::SetProxy(proxy) => {
                let current = self.state.settings().cloned().unwrap_or_default();
                Msg::SettingsApplied(apply_proxy(current, proxy))
            }
            Command::Dismiss { id } => Msg::NotificationDismissed(id),
            Command::Help => return say(HELP),
            Command::Quit => return,
        };
        if blocked && is_mutating(&msg) {
            say("worker is busy, try again when it is idle");
        }
        ctx_info!("command: {:?}", short(&msg));
        self.dispatch(msg);
    }
}

fn is_mutating(msg: &Msg) -> bool {
    matches!(
        msg,
        Msg::LoadResource { .. }
            | Msg::UnloadResource { .. }
            | Msg::FetchResource { .. }
            | Msg::RequestIeList { .. }
            | Msg::FormatClicked
            | Msg::DiffClicked { .. }
            | Msg::SettingsApplied(_)
    )
}

/// Log-friendly name of a message without its payload.
fn short(msg: &Msg) -> &'static str {
    match msg {
        Msg::LoadResource { .. } => "load",
        Msg::UnloadResource { .. } => "unload",
        Msg::CatalogueRequested => "catalogue",
        Msg::FetchResource { .. } => "fetch",
        Msg::RequestIeList { .. } => "ies",
        Msg::QueueAdd { .. } => "queue",
        Msg::QueueRemove { .. } => "unqueue",
        Msg::QueueToggleExpand { .. } => "expand",
        Msg::QueueClear => "clear",
        Msg::FormatClicked => "format",
        Msg::DiffClicked { .. } => "diff",
        Msg::OpenFolder { .. } => "open",
        Msg::SettingsApplied(_) => "set-proxy",
        Msg::NotificationDismissed(_) => "dismiss",
        _ => "other",
    }
}

fn read_resource(path: &Path) -> io::Result<(String, String)> {
    let serialized = fs::read_to_string(path)?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok((name, serialized))
}

fn say(text: &str) {
    let mut out = io::stdout().lock();
    let _ = writeln!(out, "{text}");
    let _ = out.flush();
}

/// Prints what changed since the last render.
#[derive(Debug, Default)]
struct ConsoleView {
    worker_state: Option<WorkerState>,
    resources: Vec<String>,
    ie_list_len: Option<usize>,
    catalogue_len: usize,
    shown_notifications: HashSet<u64>,
}

impl ConsoleView {
    /// Returns true when auto-dismissing notifications were shown.
    fn render(&mut self, view: &AppViewModel) -> bool {
        if self.worker_state != Some(view.worker_state) {
            self.worker_state = Some(view.worker_state);
            say(&format!("worker: {}", worker_label(view.worker_state)));
        }

        let resources: Vec<String> = view
            .resources
            .iter()
            .map(|r| format!("{}: {}", r.id, r.display_name))
            .collect();
        if resources != self.resources {
            self.resources = resources;
            self.print_resources();
        }

        let ie_len = view.ie_source.as_ref().map(|_| view.ie_list.len());
        if ie_len != self.ie_list_len && !view.ie_list.is_empty() {
            for ie in &view.ie_list {
                say(&format!("  {}  {}", ie.key, ie.name));
            }
        }
        self.ie_list_len = ie_len;

        if view.catalogue.len() != self.catalogue_len {
            self.catalogue_len = view.catalogue.len();
            for series in &view.catalogue {
                for spec in &series.children {
                    say(&format!("{} {}: {}", series.name, spec.name, spec.children.join(" ")));
                }
            }
        }

        let mut auto_dismissed = false;
        for notification in &view.notifications {
            if !self.shown_notifications.insert(notification.id) {
                continue;
            }
            auto_dismissed |= notification.auto_dismiss;
            let mut line = format!("[{}] {}", notification.id, notification.title);
            if !notification.description.is_empty() {
                line.push_str(": ");
                line.push_str(&notification.description);
            }
            if let Some(NotificationAction::OpenFolder { location }) = &notification.action {
                line.push_str(&format!(" (open {location})"));
            }
            say(&line);
        }
        auto_dismissed
    }

    fn print_resources(&self) {
        if self.resources.is_empty() {
            say("no resources loaded");
        }
        for row in &self.resources {
            say(row);
        }
    }

    fn print_status(&self, view: &AppViewModel) {
        say(&format!(
            "worker: {}, memory: {}",
            worker_label(view.worker_state),
            view.memory_label().unwrap_or_else(|| "unknown".to_string())
        ));
        self.print_resources();
    }

    fn print_queue(&self, view: &AppViewModel) {
        if view.queue.is_empty() {
            say("queue is empty");
        }
        for (index, row) in view.queue.iter().enumerate() {
            let expand = if row.expand { " (expand)" } else { "" };
            say(&format!("{index}: {} {} [{}]{expand}", row.resource, row.name, row.key));
        }
    }

    fn print_settings(&self, view: &AppViewModel) {
        match view.settings.as_ref().map(serde_json::to_string_pretty) {
            Some(Ok(text)) => say(&text),
            _ => say("settings not loaded yet"),
        }
    }
}

fn worker_label(state: WorkerState) -> &'static str {
    match state {
        WorkerState::Idle => "idle",
        WorkerState::Busy => "busy",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_with_arguments() {
        assert_eq!(
            parse_command("fetch 38_series 38.331 38.331-h00.asn1"),
            Ok(Command::Fetch {
                series: "38_series".to_string(),
                spec: "38.331".to_string(),
                version: "38.331-h00.asn1".to_string(),
            })
        );
        assert_eq!(parse_command("  expand 2 "), Ok(Command::Expand { index: 2 }));
        assert_eq!(parse_command("queue"), Ok(Command::Queue { key: None }));
        assert!(parse_command("unqueue two").is_err());
        assert!(parse_command("diff 0").is_err());
        assert!(parse_command("").is_err());
    }

    #[test]
    fn set_proxy_builds_proxy_settings() {
        let Ok(Command::SetProxy(Some(proxy))) = parse_command("set-proxy proxy.local 8080 https")
        else {
            panic!("expected a proxy");
        };
        assert!(proxy.enabled);
        assert_eq!(proxy.protocol, ProxyProtocol::Https);
        assert_eq!(proxy.port, 8080);

        let settings = apply_proxy(Settings::default(), Some(proxy));
        assert_eq!(settings.proxy.url().as_deref(), Some("https://proxy.local:8080"));
        let settings = apply_proxy(settings, None);
        assert_eq!(settings.proxy.url(), None);
        assert!(parse_command("set-proxy host 99999").is_err());
    }
}
