//! Metrics module - Monitor latency and BPM distributions

use hdrhistogram::Histogram;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::monitor::MonitorEvent;
use crate::ride::Sample;

fn histogram() -> Histogram<u64> {
    Histogram::new(3).expect("3 significant figures is a valid precision")
}

// ============================================================================
// MONITOR METRICS - Thread-safe tracking
// ============================================================================

#[derive(Clone)]
pub struct MonitorMetrics {
    processing_hist: Arc<Mutex<Histogram<u64>>>,
    driver_bpm_hist: Arc<Mutex<Histogram<u64>>>,
    passenger_bpm_hist: Arc<Mutex<Histogram<u64>>>,
    samples: Arc<AtomicU64>,
    prompts: Arc<AtomicU64>,
    emergencies: Arc<AtomicU64>,
}

impl Default for MonitorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitorMetrics {
    pub fn new() -> Self {
        Self {
            processing_hist: Arc::new(Mutex::new(histogram())),
            driver_bpm_hist: Arc::new(Mutex::new(histogram())),
            passenger_bpm_hist: Arc::new(Mutex::new(histogram())),
            samples: Arc::new(AtomicU64::new(0)),
            prompts: Arc::new(AtomicU64::new(0)),
            emergencies: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn record_processing(&self, duration: Duration) {
        self.processing_hist.lock().record(duration.as_nanos() as u64).ok();
    }

    /// BPM is recorded rounded to whole beats.
    pub fn record_sample(&self, sample: &Sample) {
        self.driver_bpm_hist.lock().record(sample.driver_bpm.round() as u64).ok();
        self.passenger_bpm_hist.lock().record(sample.passenger_bpm.round() as u64).ok();
        self.samples.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_events(&self, events: &[MonitorEvent]) {
        for event in events {
            match event {
                MonitorEvent::PromptRequested { .. } => {
                    self.prompts.fetch_add(1, Ordering::Relaxed);
                }
                MonitorEvent::EmergencyNotified { .. } => {
                    self.emergencies.fetch_add(1, Ordering::Relaxed);
                }
                _ => {}
            }
        }
    }

    pub fn report(&self) -> MetricsReport {
        let proc = self.processing_hist.lock();
        let driver = self.driver_bpm_hist.lock();
        let passenger = self.passenger_bpm_hist.lock();

        MetricsReport {
            processing_p50: Duration::from_nanos(proc.value_at_quantile(0.5)),
            processing_p99: Duration::from_nanos(proc.value_at_quantile(0.99)),
            driver_bpm_p50: driver.value_at_quantile(0.5),
            driver_bpm_p99: driver.value_at_quantile(0.99),
            passenger_bpm_p50: passenger.value_at_quantile(0.5),
            passenger_bpm_p99: passenger.value_at_quantile(0.99),
            samples: self.samples.load(Ordering::Relaxed),
            prompts: self.prompts.load(Ordering::Relaxed),
            emergencies: self.emergencies.load(Ordering::Relaxed),
        }
    }
}

// ============================================================================
// METRICS REPORT - Summary statistics
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct MetricsReport {
    pub processing_p50: Duration,
    pub processing_p99: Duration,
    pub driver_bpm_p50: u64,
    pub driver_bpm_p99: u64,
    pub passenger_bpm_p50: u64,
    pub passenger_bpm_p99: u64,
    pub samples: u64,
    pub prompts: u64,
    pub emergencies: u64,
}
