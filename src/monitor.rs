//! Monitor module - Anxiety thresholds, alert state and contact acknowledgements

pub mod state;
pub mod anxiety;

pub use state::{Actor, AlertState, ControlLevel, DangerLevel, MonitorState, SharedMonitorState};
pub use anxiety::{
    AlertWindow, AnxietyMonitor, MonitorEvent, Responder, Thresholds, DEFAULT_CONTROL_THRESHOLD,
    DEFAULT_DANGER_THRESHOLD,
};
