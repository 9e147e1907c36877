//! Resident memory sampling for the current process.

use sysinfo::{ProcessExt, System, SystemExt};

/// Samples the resident set size of this process.
///
/// Holds one `System` so repeated samples only refresh this process.
pub struct MemoryProbe {
    sys: System,
    pid: Option<sysinfo::Pid>,
}

impl MemoryProbe {
    pub fn new() -> Self {
        Self {
            sys: System::new(),
            pid: sysinfo::get_current_pid().ok(),
        }
    }

    /// Resident memory in bytes, or 0 when the platform does not report it.
    pub fn resident_bytes(&mut self) -> u64 {
        let Some(pid) = self.pid else {
            return 0;
        };
        self.sys.refresh_process(pid);
        self.sys.process(pid).map(|p| p.memory()).unwrap_or(0)
    }
}

impl Default for MemoryProbe {
    fn default() -> Self {
        Self::new()
    }
}
