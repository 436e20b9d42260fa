use std::fmt;

use crate::metrics::MetricsReport;
use crate::monitor::{AlertState, ControlLevel, MonitorState};

/// Text labels for the operator display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBoard {
    pub control: String,
    pub danger: String,
    pub driver: String,
    pub passenger: String,
    pub response_unit: String,
}

impl StatusBoard {
    pub fn from_state(state: &MonitorState) -> Self {
        let danger = match state.alert {
            AlertState::Normal => "Danger: OK".to_string(),
            AlertState::DriverHigh => "Danger: Driver's heart rate is high".to_string(),
            AlertState::PassengerHigh => "Danger: Passenger's heart rate is high".to_string(),
        };
        Self {
            control: format!("Control: {}", state.control_level),
            danger,
            driver: contact_label("Driver", state.driver_contacted),
            passenger: contact_label("Passenger", state.passenger_contacted),
            response_unit: contact_label("Response Unit", state.response_unit_contacted),
        }
    }

    /// True when anything needs an operator's attention.
    pub fn is_alarming(state: &MonitorState) -> bool {
        state.alert != AlertState::Normal || state.control_level != ControlLevel::Ok
    }
}

fn contact_label(who: &str, contacted: bool) -> String {
    if contacted {
        format!("{who}: Contacted")
    } else {
        format!("{who}: Not Contacted")
    }
}

impl fmt::Display for StatusBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<40}{}", self.control, self.driver)?;
        writeln!(f, "{:<40}{}", self.danger, self.passenger)?;
        write!(f, "{:<40}{}", "", self.response_unit)
    }
}

pub fn render_report(report: &MetricsReport) -> String {
    format!(
        "Samples: {}\n\
         Driver BPM P50: {}, P99: {}\n\
         Passenger BPM P50: {}, P99: {}\n\
         Processing P50: {:?}, P99: {:?}\n\
         Prompts: {}, Emergencies notified: {}",
        report.samples,
        report.driver_bpm_p50,
        report.driver_bpm_p99,
        report.passenger_bpm_p50,
        report.passenger_bpm_p99,
        report.processing_p50,
        report.processing_p99,
        report.prompts,
        report.emergencies,
    )
}
