use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::SendTimeoutError;
use tracing::{debug, error, info};

use crate::ipc::SystemChannels;
use crate::ride::{Sample, Series};
use crate::store::SeriesStore;

/// Longest single sleep, so a stop request is seen promptly.
const SHUTDOWN_SLICE: Duration = Duration::from_millis(50);

pub struct FeedStats {
    pub sent: AtomicU64,
    /// Set when the feed ran out of samples on its own.
    pub finished: AtomicBool,
    /// Set when the poller hit a bad record file.
    pub failed: AtomicBool,
    pub shutdown: AtomicBool,
}

impl FeedStats {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sent: AtomicU64::new(0),
            finished: AtomicBool::new(false),
            failed: AtomicBool::new(false),
            shutdown: AtomicBool::new(false),
        })
    }

    fn stopping(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}

/// Pushes a series onto the channel, one sample per `interval`.
pub fn spawn_replay_thread(
    series: Series,
    channels: SystemChannels,
    interval: Duration,
) -> (thread::JoinHandle<()>, Arc<FeedStats>) {
    let stats = FeedStats::new();
    let stats_clone = stats.clone();

    let handle = thread::spawn(move || {
        for sample in series.iter() {
            if stats_clone.stopping() {
                info!(target: "feed", "replay shutting down");
                return;
            }
            let cycle_start = Instant::now();

            if !send(&channels, *sample, &stats_clone) {
                return;
            }
            pace(cycle_start, interval, &stats_clone);
        }
        stats_clone.finished.store(true, Ordering::Relaxed);
        debug!(target: "feed", sent = stats_clone.sent.load(Ordering::Relaxed), "replay finished");
    });

    (handle, stats)
}

/// Re-reads the record file every `interval` and forwards rows not sent yet.
/// A malformed file stops the poller.
pub fn spawn_store_poller(
    store: SeriesStore,
    channels: SystemChannels,
    interval: Duration,
) -> (thread::JoinHandle<()>, Arc<FeedStats>) {
    let stats = FeedStats::new();
    let stats_clone = stats.clone();

    let handle = thread::spawn(move || {
        let mut seen = 0usize;

        while !stats_clone.stopping() {
            let cycle_start = Instant::now();

            match store.load_since(seen) {
                Ok(rows) => {
                    if !rows.is_empty() {
                        debug!(target: "feed", new_rows = rows.len(), seen, "record file grew");
                    }
                    for sample in rows {
                        if !send(&channels, sample, &stats_clone) {
                            return;
                        }
                        seen += 1;
                    }
                }
                Err(e) => {
                    error!(target: "feed", path = %store.path().display(), error = %e, "record file unusable");
                    stats_clone.failed.store(true, Ordering::Relaxed);
                    return;
                }
            }

            pace(cycle_start, interval, &stats_clone);
        }
        info!(target: "feed", "poller shutting down");
    });

    (handle, stats)
}

/// False when the feed should stop: shutdown requested or monitor gone.
fn send(channels: &SystemChannels, sample: Sample, stats: &FeedStats) -> bool {
    let mut pending = sample;
    loop {
        match channels.sample_tx.send_timeout(pending, SHUTDOWN_SLICE) {
            Ok(()) => {
                stats.sent.fetch_add(1, Ordering::Relaxed);
                return true;
            }
            Err(SendTimeoutError::Timeout(s)) => {
                if stats.stopping() {
                    return false;
                }
                pending = s;
            }
            Err(SendTimeoutError::Disconnected(_)) => {
                error!(target: "feed", "sample channel closed");
                return false;
            }
        }
    }
}

fn pace(cycle_start: Instant, interval: Duration, stats: &FeedStats) {
    while !stats.stopping() {
        let elapsed = cycle_start.elapsed();
        if elapsed >= interval {
            break;
        }
        thread::sleep((interval - elapsed).min(SHUTDOWN_SLICE));
    }
}
