// Runtime configuration loading
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::error::{MonitorError, Result};
use crate::monitor::{AlertWindow, Thresholds, DEFAULT_CONTROL_THRESHOLD, DEFAULT_DANGER_THRESHOLD};
use crate::ride::DEFAULT_RIDE_DURATION_SECS;
use crate::sensor::filter::DEFAULT_SMOOTHING_WINDOW;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorConfig {
    pub ride_duration_secs: u64,
    pub tick_interval_ms: u64,
    pub danger_threshold: f64,
    pub control_threshold: f64,
    /// 0 = running maximum over the whole session.
    pub alert_window: usize,
    pub smoothing_window: usize,
    pub seed: Option<u64>,
    pub data_file: PathBuf,
    pub channel_capacity: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            ride_duration_secs: DEFAULT_RIDE_DURATION_SECS,
            tick_interval_ms: 1000,
            danger_threshold: DEFAULT_DANGER_THRESHOLD,
            control_threshold: DEFAULT_CONTROL_THRESHOLD,
            alert_window: 0,
            smoothing_window: DEFAULT_SMOOTHING_WINDOW,
            seed: None,
            data_file: PathBuf::from("heart_rate_data.txt"),
            channel_capacity: 256,
        }
    }
}

impl MonitorConfig {
    pub fn thresholds(&self) -> Result<Thresholds> {
        Thresholds::new(self.danger_threshold, self.control_threshold)
    }

    pub fn alert_window(&self) -> AlertWindow {
        AlertWindow::from_len(self.alert_window)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

/// Missing file falls back to defaults; a file that exists must parse.
pub fn load_config(path: &Path) -> Result<MonitorConfig> {
    let contents = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "config file not found, using defaults");
            return Ok(MonitorConfig::default());
        }
        Err(e) => {
            return Err(MonitorError::Config { path: path.to_path_buf(), reason: e.to_string() });
        }
    };
    parse_config(&contents).map_err(|reason| MonitorError::Config { path: path.to_path_buf(), reason })
}

pub fn parse_config(contents: &str) -> std::result::Result<MonitorConfig, String> {
    let config: MonitorConfig = toml::from_str(contents).map_err(|e| e.to_string())?;
    Thresholds::new(config.danger_threshold, config.control_threshold).map_err(|e| e.to_string())?;
    Ok(config)
}
