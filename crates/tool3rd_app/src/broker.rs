use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use context_logging::{ctx_info, ctx_warn};
use tool3rd_protocol::ArtifactKind;

/// The orchestrator's only access to save dialogs. `None` means the user
/// cancelled.
pub trait SaveDialog: Send {
    fn choose(&mut self, artifact: ArtifactKind) -> Option<PathBuf>;
}

/// Non-interactive dialog: picks a fresh timestamped file name in a fixed
/// directory, or cancels when the directory cannot be created.
pub struct DirectorySaveDialog {
    dir: PathBuf,
    stamp: Arc<dyn Fn() -> String + Send + Sync>,
}

impl DirectorySaveDialog {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            stamp: Arc::new(|| Local::now().format("%Y%m%d-%H%M%S").to_string()),
        }
    }

    /// Replaces the clock used for file names.
    pub fn with_stamp(mut self, stamp: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.stamp = Arc::new(stamp);
        self
    }
}

impl SaveDialog for DirectorySaveDialog {
    fn choose(&mut self, artifact: ArtifactKind) -> Option<PathBuf> {
        if let Err(err) = fs::create_dir_all(&self.dir) {
            ctx_warn!("save directory {:?} unavailable: {}", self.dir, err);
            return None;
        }
        let prefix = match artifact {
            ArtifactKind::Workbook => "format",
            ArtifactKind::DiffReport => "diff",
        };
        let stem = format!("{prefix}-{}", (self.stamp)());
        let extension = artifact.extension();

        let path = (1..)
            .map(|n| match n {
                1 => self.dir.join(format!("{stem}.{extension}")),
                n => self.dir.join(format!("{stem}-{n}.{extension}")),
            })
            .find(|candidate| !candidate.exists())?;
        ctx_info!("{} will be saved to {:?}", artifact.filter_name(), path);
        Some(path)
    }
}
