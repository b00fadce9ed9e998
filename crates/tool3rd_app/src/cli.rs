use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use directories::{ProjectDirs, UserDirs};
use log::LevelFilter;

use crate::catalogue::DEFAULT_CATALOGUE_URL;
use crate::logging::LogDestination;

#[derive(Debug, Parser)]
#[command(name = "tool3rd", version, about = "Browse, format and diff 3GPP specifications")]
pub struct Cli {
    /// Directory holding settings.json and the log file.
    #[arg(long)]
    pub user_data: Option<PathBuf>,

    /// Directory where workbooks and diff reports are saved.
    #[arg(long)]
    pub save_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogDestination::File)]
    pub log: LogDestination,

    /// Log verbosity.
    #[arg(long, default_value_t = LevelFilter::Info)]
    pub log_level: LevelFilter,

    /// Base URL of the remote specification catalogue.
    #[arg(long, default_value = DEFAULT_CATALOGUE_URL)]
    pub catalogue_url: String,

    /// Quiet period before resource list and memory reports are sent.
    #[arg(long, default_value_t = 500)]
    pub report_debounce_ms: u64,
}

/// Resolved runtime options.
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub user_data: PathBuf,
    pub save_dir: PathBuf,
    pub log: LogDestination,
    pub log_level: LevelFilter,
    pub catalogue_url: String,
    pub report_debounce: Duration,
}

impl Cli {
    pub fn into_options(self) -> AppOptions {
        let user_data = self.user_data.unwrap_or_else(|| {
            ProjectDirs::from("io.github", "proj3rd", "tool3rd")
                .map(|dirs| dirs.data_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."))
        });
        let save_dir = self.save_dir.unwrap_or_else(|| {
            UserDirs::new()
                .and_then(|dirs| dirs.document_dir().map(|dir| dir.join("tool3rd")))
                .unwrap_or_else(|| PathBuf::from("."))
        });
        AppOptions {
            user_data,
            save_dir,
            log: self.log,
            log_level: self.log_level,
            catalogue_url: self.catalogue_url,
            report_debounce: Duration::from_millis(self.report_debounce_ms),
        }
    }
}
