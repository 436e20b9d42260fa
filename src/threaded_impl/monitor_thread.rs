use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::RecvTimeoutError;
use tracing::{debug, info};

use crate::ipc::SystemChannels;
use crate::metrics::MonitorMetrics;
use crate::monitor::AnxietyMonitor;
use crate::ride::Sample;

pub struct MonitorStats {
    pub processed: AtomicU64,
    pub shutdown: AtomicBool,
}

impl MonitorStats {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            processed: AtomicU64::new(0),
            shutdown: AtomicBool::new(false),
        })
    }
}

/// Runs the monitor as the single writer of alert state.
///
/// Waits up to `poll_interval` for each sample and checks the shutdown flag
/// between waits. On shutdown every sample already queued is processed
/// before the thread returns the monitor.
pub fn spawn_monitor_thread(
    mut monitor: AnxietyMonitor,
    channels: SystemChannels,
    metrics: MonitorMetrics,
    poll_interval: Duration,
) -> (thread::JoinHandle<AnxietyMonitor>, Arc<MonitorStats>) {
    let stats = MonitorStats::new();
    let stats_clone = stats.clone();

    let handle = thread::spawn(move || {
        loop {
            if stats_clone.shutdown.load(Ordering::Relaxed) {
                let drained: Vec<Sample> = channels.sample_rx.try_iter().collect();
                for sample in &drained {
                    process(&mut monitor, sample, &metrics, &stats_clone);
                }
                info!(target: "monitor", drained = drained.len(), "monitor shutting down");
                break;
            }

            let sample = match channels.sample_rx.recv_timeout(poll_interval) {
                Ok(s) => s,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    info!(target: "monitor", "sample channel closed");
                    break;
                }
            };
            process(&mut monitor, &sample, &metrics, &stats_clone);
        }
        monitor
    });

    (handle, stats)
}

fn process(monitor: &mut AnxietyMonitor, sample: &Sample, metrics: &MonitorMetrics, stats: &MonitorStats) {
    let start = Instant::now();
    let events = monitor.observe(sample);
    metrics.record_processing(start.elapsed());
    metrics.record_sample(sample);
    metrics.record_events(&events);

    let processed = stats.processed.fetch_add(1, Ordering::Relaxed) + 1;
    if processed % 60 == 0 {
        debug!(target: "monitor", processed, tick = sample.tick, alert = ?monitor.current_alert_state(), "progress");
    }
}
