//! IPC module - Sample channel between the feed and the monitor thread

use crossbeam::channel::{bounded, Receiver, Sender};
use std::sync::Arc;

use crate::ride::Sample;

// ============================================================================
// SYSTEM CHANNELS - Feed -> Monitor
// ============================================================================

#[derive(Clone)]
pub struct SystemChannels {
    pub sample_tx: Sender<Sample>,
    pub sample_rx: Arc<Receiver<Sample>>,
}

impl SystemChannels {
    pub fn new(buffer_size: usize) -> Self {
        let (sample_tx, sample_rx) = bounded(buffer_size);

        Self {
            sample_tx,
            sample_rx: Arc::new(sample_rx),
        }
    }
}
