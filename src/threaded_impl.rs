//! Background threads: sample feeds and the monitor loop

use std::thread::JoinHandle;

use tracing::error;

use crate::error::{MonitorError, Result};

pub mod feed_thread;
pub mod monitor_thread;

pub use feed_thread::{spawn_replay_thread, spawn_store_poller, FeedStats};
pub use monitor_thread::{spawn_monitor_thread, MonitorStats};

/// Joins a worker thread, turning a panic into `WorkerPanicked`.
pub fn join_worker<T>(handle: JoinHandle<T>, name: &'static str) -> Result<T> {
    handle.join().map_err(|_| {
        error!(target: "threads", worker = name, "worker thread panicked");
        MonitorError::WorkerPanicked { name }
    })
}
