//! tool3rd application: orchestrator relay, save-location broker, settings,
//! remote catalogue and the console UI context.
pub mod app;
pub mod broker;
pub mod catalogue;
pub mod cli;
pub mod console;
pub mod effects;
pub mod logging;
pub mod relay;
pub mod settings_store;
pub mod shell;

pub use broker::{DirectorySaveDialog, SaveDialog};
pub use catalogue::{CatalogueError, CatalogueSource, HttpCatalogue, DEFAULT_CATALOGUE_URL};
pub use relay::{route, serve, Invocation, Relay, RouteAction, SessionEnd};
pub use settings_store::{SettingsError, SettingsStore, SETTINGS_FILENAME};
pub use shell::{FolderOpener, SystemFolderOpener};
