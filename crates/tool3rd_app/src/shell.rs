use std::io;
use std::path::Path;
use std::process::{Child, Command, ExitStatus};
use std::thread;

/// Reveals a saved file in the platform's file manager.
pub trait FolderOpener: Send {
    fn reveal(&self, location: &Path) -> io::Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemFolderOpener;

impl FolderOpener for SystemFolderOpener {
    fn reveal(&self, location: &Path) -> io::Result<()> {
        let mut command = if cfg!(target_os = "windows") {
            let mut command = Command::new("explorer");
            command.arg(format!("/select,{}", location.display()));
            command
        } else if cfg!(target_os = "macos") {
            let mut command = Command::new("open");
            command.arg("-R").arg(location);
            command
        } else {
            let dir = if location.is_dir() {
                location
            } else {
                location.parent().unwrap_or(location)
            };
            let mut command = Command::new("xdg-open");
            command.arg(dir);
            command
        };
        reap_in_background(command.spawn()?).map(|_waiter| ())
    }
}

/// Waits for `child` on a detached thread so it does not linger as a zombie.
fn reap_in_background(mut child: Child) -> io::Result<thread::JoinHandle<io::Result<ExitStatus>>> {
    thread::Builder::new()
        .name("reveal".to_string())
        .spawn(move || child.wait())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn finished_opener_is_waited_for() {
        let child = Command::new("true").spawn().unwrap();
        let waiter = reap_in_background(child).unwrap();
        let status = waiter.join().unwrap().unwrap();
        assert!(status.success());
    }
}
