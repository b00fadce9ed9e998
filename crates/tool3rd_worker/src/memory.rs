use sysinfo::{MemoryRefreshKind, Process, ProcessRefreshKind, ProcessesToUpdate, RefreshKind, System};
use tool3rd_protocol::MemoryUsage;

pub trait MemoryProbe: Send + Sync {
    fn sample(&self) -> MemoryUsage;
}

/// Resident memory of this process against the machine's total memory.
#[derive(Debug, Default, Clone, Copy)]
pub struct SysinfoProbe;

impl MemoryProbe for SysinfoProbe {
    fn sample(&self) -> MemoryUsage {
        let mut system = System::new_with_specifics(
            RefreshKind::nothing().with_memory(MemoryRefreshKind::nothing().with_ram()),
        );
        let total = system.total_memory();
        let used = match sysinfo::get_current_pid() {
            Ok(pid) => {
                system.refresh_processes_specifics(
                    ProcessesToUpdate::Some(&[pid]),
                    false,
                    ProcessRefreshKind::nothing().with_memory(),
                );
                system.process(pid).map(Process::memory).unwrap_or(0)
            }
            Err(_) => 0,
        };
        MemoryUsage { total, used }
    }
}
