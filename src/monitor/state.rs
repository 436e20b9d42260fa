use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Actor {
    Driver,
    Passenger,
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actor::Driver => write!(f, "Driver"),
            Actor::Passenger => write!(f, "Passenger"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertState {
    #[default]
    Normal,
    DriverHigh,
    PassengerHigh,
}

impl AlertState {
    pub fn actor(&self) -> Option<Actor> {
        match self {
            AlertState::Normal => None,
            AlertState::DriverHigh => Some(Actor::Driver),
            AlertState::PassengerHigh => Some(Actor::Passenger),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlLevel {
    #[default]
    Ok,
    Danger,
    /// Above the control threshold.
    HighBpm,
}

impl fmt::Display for ControlLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlLevel::Ok => write!(f, "OK"),
            ControlLevel::Danger => write!(f, "Danger"),
            ControlLevel::HighBpm => write!(f, "High BPM"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DangerLevel {
    #[default]
    Ok,
    High,
}

/// Alert levels plus the three acknowledgement flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MonitorState {
    pub driver_contacted: bool,
    pub passenger_contacted: bool,
    pub response_unit_contacted: bool,
    pub alert: AlertState,
    pub control_level: ControlLevel,
    pub danger_level: DangerLevel,
}

// ============================================================================
// SHARED MONITOR STATE - One mutex, two disjoint write paths
// ============================================================================

/// Handle shared between the monitor loop and the presentation layer.
///
/// The monitor writes only the alert fields through `set_levels`; contact
/// actions write only the acknowledgement flags, and only from false to true.
#[derive(Clone, Default)]
pub struct SharedMonitorState {
    data: Arc<Mutex<MonitorState>>,
}

impl SharedMonitorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> MonitorState {
        *self.data.lock()
    }

    pub fn current_alert_state(&self) -> AlertState {
        self.data.lock().alert
    }

    /// Returns true if this call made the transition.
    pub fn contact_driver(&self) -> bool {
        self.contact("driver", |s| &mut s.driver_contacted)
    }

    pub fn contact_passenger(&self) -> bool {
        self.contact("passenger", |s| &mut s.passenger_contacted)
    }

    pub fn contact_response_unit(&self) -> bool {
        self.contact("response unit", |s| &mut s.response_unit_contacted)
    }

    fn contact<F>(&self, who: &str, flag: F) -> bool
    where
        F: FnOnce(&mut MonitorState) -> &mut bool,
    {
        let mut state = self.data.lock();
        let contacted = flag(&mut *state);
        if *contacted {
            return false;
        }
        *contacted = true;
        drop(state);
        info!(target: "monitor", who, "contacted");
        true
    }

    pub(crate) fn set_levels(&self, alert: AlertState, control: ControlLevel, danger: DangerLevel) {
        let mut state = self.data.lock();
        state.alert = alert;
        state.control_level = control;
        state.danger_level = danger;
    }
}
