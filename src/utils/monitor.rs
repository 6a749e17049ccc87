#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, RefreshKind, System};

#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct StageStats {
    pub memory_usage_mb: u64,
    pub peak_memory_mb: u64,
    pub stage_time: Duration,
    pub total_time: Duration,
}

/// Logs elapsed time and resident memory at the end of each CLI stage.
#[cfg(feature = "cli")]
pub struct StageMonitor {
    system: Option<(System, Pid)>,
    started: Instant,
    stage_started: Instant,
    peak_memory_mb: u64,
}

#[cfg(feature = "cli")]
impl StageMonitor {
    pub fn new(enabled: bool) -> Self {
        let system = if enabled {
            match sysinfo::get_current_pid() {
                Ok(pid) => {
                    let mut system = System::new_with_specifics(RefreshKind::everything());
                    system.refresh_all();
                    Some((system, pid))
                }
                Err(e) => {
                    tracing::warn!("Stage monitoring disabled: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let now = Instant::now();
        Self {
            system,
            started: now,
            stage_started: now,
            peak_memory_mb: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.system.is_some()
    }

    /// Close the current stage and return its figures.
    pub fn finish_stage(&mut self) -> Option<StageStats> {
        let (system, pid) = self.system.as_mut()?;
        system.refresh_all();
        let memory_mb = system.process(*pid)?.memory() / 1024 / 1024;
        self.peak_memory_mb = self.peak_memory_mb.max(memory_mb);

        let stats = StageStats {
            memory_usage_mb: memory_mb,
            peak_memory_mb: self.peak_memory_mb,
            stage_time: self.stage_started.elapsed(),
            total_time: self.started.elapsed(),
        };
        self.stage_started = Instant::now();
        Some(stats)
    }

    pub fn log_stage(&mut self, stage: &str) {
        if let Some(stats) = self.finish_stage() {
            tracing::info!(
                "📊 {} - Memory: {}MB, Peak: {}MB, Stage: {:?}, Total: {:?}",
                stage,
                stats.memory_usage_mb,
                stats.peak_memory_mb,
                stats.stage_time,
                stats.total_time
            );
        }
    }
}

#[cfg(not(feature = "cli"))]
pub struct StageMonitor;

#[cfg(not(feature = "cli"))]
impl StageMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn is_enabled(&self) -> bool {
        false
    }

    pub fn log_stage(&mut self, _stage: &str) {}
}
