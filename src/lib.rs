pub mod error;
pub mod sensor;
pub mod ride;
pub mod store;
pub mod monitor;
pub mod ipc;
pub mod metrics;
pub mod threaded_impl;
pub mod visualization;
pub mod intake;
pub mod config;

pub use error::{MonitorError, Result};
pub use sensor::{AgeGroup, AgeProfile, HeartRateRange, MovingAverage, Role, SignalGenerator, TripState};
pub use ride::{RideSimulator, Sample, Series, TickRecord};
pub use store::SeriesStore;
pub use monitor::{
    Actor, AlertState, AlertWindow, AnxietyMonitor, ControlLevel, DangerLevel, MonitorEvent, MonitorState,
    Responder, SharedMonitorState, Thresholds,
};
pub use ipc::SystemChannels;
pub use metrics::{MetricsReport, MonitorMetrics};
pub use config::{load_config, MonitorConfig};
