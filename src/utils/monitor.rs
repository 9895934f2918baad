//! Per-batch prediction throughput and latency, with process memory when
//! `sysinfo` is compiled in.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

#[cfg(feature = "cli")]
use sysinfo::{Pid, System};

/// Progress is logged after this many predictions.
const PROGRESS_EVERY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPhase {
    Started,
    Predicting,
    Finished,
}

impl BatchPhase {
    fn label(self) -> &'static str {
        match self {
            BatchPhase::Started => "batch started",
            BatchPhase::Predicting => "predicting",
            BatchPhase::Finished => "batch finished",
        }
    }
}

/// Throughput and latency over the predictions of one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchThroughput {
    pub requests: usize,
    pub failed: usize,
    pub elapsed_ms: f64,
    pub requests_per_second: f64,
    pub mean_latency_ms: f64,
    pub max_latency_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_memory_mb: Option<u64>,
}

#[cfg_attr(not(feature = "cli"), allow(dead_code))]
#[derive(Debug, Clone, Copy)]
struct MemorySample {
    rss_mb: u64,
    peak_mb: u64,
}

#[cfg(feature = "cli")]
struct MemorySampler {
    system: System,
    pid: Option<Pid>,
    peak_mb: u64,
}

#[cfg(feature = "cli")]
impl MemorySampler {
    fn new() -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                tracing::warn!("Memory sampling unavailable: {}", e);
                None
            }
        };
        Self {
            system: System::new(),
            pid,
            peak_mb: 0,
        }
    }

    fn sample(&mut self) -> Option<MemorySample> {
        let pid = self.pid?;
        self.system.refresh_all();
        let rss_mb = self.system.process(pid)?.memory() / 1024 / 1024;
        self.peak_mb = self.peak_mb.max(rss_mb);
        Some(MemorySample {
            rss_mb,
            peak_mb: self.peak_mb,
        })
    }

    fn peak(&self) -> Option<u64> {
        self.pid.map(|_| self.peak_mb)
    }
}

#[cfg(not(feature = "cli"))]
struct MemorySampler;

#[cfg(not(feature = "cli"))]
impl MemorySampler {
    fn new() -> Self {
        Self
    }

    fn sample(&mut self) -> Option<MemorySample> {
        None
    }

    fn peak(&self) -> Option<u64> {
        None
    }
}

/// Records the latency of every prediction in a batch. Disabled monitors
/// record nothing and log nothing.
pub struct BatchMonitor {
    enabled: bool,
    planned: usize,
    started: Instant,
    latencies: Vec<Duration>,
    failed: usize,
    memory: Option<MemorySampler>,
}

impl BatchMonitor {
    pub fn start(enabled: bool, planned: usize) -> Self {
        let mut monitor = Self {
            enabled,
            planned,
            started: Instant::now(),
            latencies: Vec::with_capacity(if enabled { planned } else { 0 }),
            failed: 0,
            memory: enabled.then(MemorySampler::new),
        };
        monitor.log_phase(BatchPhase::Started);
        monitor
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn record(&mut self, latency: Duration, succeeded: bool) {
        if !self.enabled {
            return;
        }
        self.latencies.push(latency);
        if !succeeded {
            self.failed += 1;
        }
        if self.latencies.len() % PROGRESS_EVERY == 0 {
            self.log_phase(BatchPhase::Predicting);
        }
    }

    pub fn summary(&self) -> BatchThroughput {
        let elapsed = self.started.elapsed();
        let requests = self.latencies.len();
        let total: Duration = self.latencies.iter().sum();
        let max = self.latencies.iter().max().copied().unwrap_or_default();

        BatchThroughput {
            requests,
            failed: self.failed,
            elapsed_ms: millis(elapsed),
            requests_per_second: if elapsed.is_zero() {
                0.0
            } else {
                requests as f64 / elapsed.as_secs_f64()
            },
            mean_latency_ms: if requests == 0 {
                0.0
            } else {
                millis(total) / requests as f64
            },
            max_latency_ms: millis(max),
            peak_memory_mb: self.memory.as_ref().and_then(MemorySampler::peak),
        }
    }

    /// Logs the closing figures. Returns `None` for a disabled monitor.
    pub fn finish(mut self) -> Option<BatchThroughput> {
        if !self.enabled {
            return None;
        }
        self.log_phase(BatchPhase::Finished);
        Some(self.summary())
    }

    fn log_phase(&mut self, phase: BatchPhase) {
        if !self.enabled {
            return;
        }
        let memory = self.memory.as_mut().and_then(MemorySampler::sample);
        let summary = self.summary();
        match memory {
            Some(mem) => tracing::info!(
                "{} - {}/{} predictions, {:.1} req/s, mean {:.2}ms, max {:.2}ms, memory {}MB (peak {}MB)",
                phase.label(),
                summary.requests,
                self.planned,
                summary.requests_per_second,
                summary.mean_latency_ms,
                summary.max_latency_ms,
                mem.rss_mb,
                mem.peak_mb
            ),
            None => tracing::info!(
                "{} - {}/{} predictions, {:.1} req/s, mean {:.2}ms, max {:.2}ms",
                phase.label(),
                summary.requests,
                self.planned,
                summary.requests_per_second,
                summary.mean_latency_ms,
                summary.max_latency_ms
            ),
        }
    }
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
