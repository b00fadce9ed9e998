use std::sync::Arc;
use std::thread;

use anyhow::{anyhow, Context};
use context_logging::{ctx_error, ctx_info, ctx_warn};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tool3rd_worker::{BuiltinToolkit, SysinfoProbe, WorkerConfig, WorkerHandle};

use crate::broker::DirectorySaveDialog;
use crate::catalogue::HttpCatalogue;
use crate::cli::AppOptions;
use crate::console::{spawn_stdin_reader, Console, ConsoleExit};
use crate::effects::EffectRunner;
use crate::relay::{serve, Relay, SessionEnd};
use crate::settings_store::SettingsStore;
use crate::shell::SystemFolderOpener;

/// Runs the three contexts until the user quits, starting them again after
/// every settings change.
pub fn run(options: AppOptions) -> anyhow::Result<()> {
    context_logging::set_context("main");
    let mut lines = spawn_stdin_reader().context("failed to start stdin reader")?;
    let store = SettingsStore::new(&options.user_data);

    loop {
        let (end, returned) = run_session(&options, &store, lines)?;
        lines = returned;
        match end {
            SessionEnd::Quit => {
                ctx_info!("bye");
                return Ok(());
            }
            SessionEnd::Relaunch => ctx_info!("relaunching with new settings"),
        }
    }
}

type Lines = mpsc::UnboundedReceiver<String>;

fn run_session(
    options: &AppOptions,
    store: &SettingsStore,
    lines: Lines,
) -> anyhow::Result<(SessionEnd, Lines)> {
    let settings = store
        .load()
        .with_context(|| format!("failed to load {:?}", store.path()))?;
    ctx_info!("settings loaded from {:?}", store.path());

    let cancel = CancellationToken::new();
    let (worker, from_worker) = WorkerHandle::spawn(
        WorkerConfig {
            report_debounce: options.report_debounce,
        },
        Arc::new(BuiltinToolkit),
        Arc::new(SysinfoProbe),
    )
    .context("failed to start worker context")?;

    let (invoke_tx, invoke_rx) = mpsc::unbounded_channel();
    let (renderer_tx, renderer_rx) = mpsc::unbounded_channel();

    let catalogue = match HttpCatalogue::new(&options.catalogue_url, &settings) {
        Ok(catalogue) => catalogue,
        Err(err) => {
            ctx_warn!("catalogue client unavailable with current settings: {}", err);
            HttpCatalogue::new(&options.catalogue_url, &Default::default())
                .context("failed to build catalogue client")?
        }
    };

    let ui_cancel = cancel.clone();
    let ui = thread::Builder::new()
        .name("renderer".to_string())
        .spawn(move || -> anyhow::Result<(ConsoleExit, Lines)> {
            context_logging::set_context("renderer");
            let mut lines = lines;
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let exit = runtime.block_on(async {
                let (msg_tx, msg_rx) = mpsc::unbounded_channel();
                let effects = EffectRunner::new(invoke_tx, msg_tx, Arc::new(catalogue));
                Console::new(effects, msg_rx, renderer_rx)
                    .run(&mut lines, ui_cancel)
                    .await
            });
            runtime.shutdown_background();
            Ok((exit, lines))
        })
        .context("failed to start UI context")?;

    let relay = Relay::new(
        worker.sender(),
        renderer_tx,
        store.clone(),
        Box::new(DirectorySaveDialog::new(options.save_dir.clone())),
        Box::new(SystemFolderOpener),
        cancel.clone(),
    );
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start orchestrator runtime")?;
    let end = runtime.block_on(serve(relay, invoke_rx, from_worker));

    cancel.cancel();
    worker.shutdown();
    let (exit, lines) = ui
        .join()
        .map_err(|_| anyhow!("UI context panicked"))??;
    if exit == ConsoleExit::Quit && end == SessionEnd::Relaunch {
        ctx_error!("UI quit while a relaunch was pending");
        return Ok((SessionEnd::Quit, lines));
    }
    Ok((end, lines))
}
