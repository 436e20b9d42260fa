use std::collections::VecDeque;

use crossbeam::channel::{unbounded, Receiver, Sender};
use tracing::{info, warn};

use super::state::{Actor, AlertState, ControlLevel, DangerLevel, SharedMonitorState};
use crate::error::{MonitorError, Result};
use crate::ride::Sample;

pub const DEFAULT_DANGER_THRESHOLD: f64 = 140.0;
pub const DEFAULT_CONTROL_THRESHOLD: f64 = 160.0;

// ============================================================================
// THRESHOLDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Advisory level: an actor above it is "high".
    pub danger: f64,
    /// Escalates the control level to High BPM.
    pub control: f64,
}

impl Thresholds {
    pub fn new(danger: f64, control: f64) -> Result<Self> {
        let valid = danger.is_finite() && control.is_finite() && danger > 0.0 && control >= danger;
        if !valid {
            return Err(MonitorError::InvalidThresholds { danger, control });
        }
        Ok(Self { danger, control })
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self { danger: DEFAULT_DANGER_THRESHOLD, control: DEFAULT_CONTROL_THRESHOLD }
    }
}

/// Which samples the maxima are taken over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertWindow {
    /// Every sample seen this session.
    #[default]
    Running,
    /// Only the most recent `n` samples.
    Last(usize),
}

impl AlertWindow {
    /// 0 means running.
    pub fn from_len(n: usize) -> Self {
        if n == 0 { AlertWindow::Running } else { AlertWindow::Last(n) }
    }
}

// ============================================================================
// EVENTS AND RESPONDERS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MonitorEvent {
    AlertChanged { state: AlertState, actor: Option<Actor>, tick: u64 },
    ControlChanged { level: ControlLevel, tick: u64 },
    /// "Are you feeling okay?" was put to the actor.
    PromptRequested { actor: Actor, tick: u64 },
    /// The actor declined or answered no.
    EmergencyNotified { actor: Actor, tick: u64 },
}

/// The interaction layer that answers "is the actor okay?".
pub trait Responder: Send {
    fn is_ok(&mut self, actor: Actor) -> bool;
}

impl<F> Responder for F
where
    F: FnMut(Actor) -> bool + Send,
{
    fn is_ok(&mut self, actor: Actor) -> bool {
        self(actor)
    }
}

// ============================================================================
// ANXIETY MONITOR - Threshold state machine
// ============================================================================

pub struct AnxietyMonitor {
    thresholds: Thresholds,
    window: AlertWindow,
    recent: VecDeque<Sample>,
    driver_max: Option<f64>,
    passenger_max: Option<f64>,
    driver_episode: bool,
    passenger_episode: bool,
    alert: AlertState,
    control: ControlLevel,
    state: SharedMonitorState,
    responder: Box<dyn Responder>,
    subscribers: Vec<Sender<MonitorEvent>>,
}

impl AnxietyMonitor {
    pub fn new(thresholds: Thresholds, state: SharedMonitorState, responder: impl Responder + 'static) -> Self {
        Self {
            thresholds,
            window: AlertWindow::Running,
            recent: VecDeque::new(),
            driver_max: None,
            passenger_max: None,
            driver_episode: false,
            passenger_episode: false,
            alert: AlertState::Normal,
            control: ControlLevel::Ok,
            state,
            responder: Box::new(responder),
            subscribers: Vec::new(),
        }
    }

    pub fn with_window(mut self, window: AlertWindow) -> Self {
        self.window = window;
        self
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn state(&self) -> &SharedMonitorState {
        &self.state
    }

    pub fn current_alert_state(&self) -> AlertState {
        self.alert
    }

    pub fn control_level(&self) -> ControlLevel {
        self.control
    }

    /// `(driver_max, passenger_max)` over the current window.
    pub fn maxima(&self) -> (Option<f64>, Option<f64>) {
        (self.driver_max, self.passenger_max)
    }

    /// New receiver for every event published from now on.
    pub fn subscribe(&mut self) -> Receiver<MonitorEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn observe(&mut self, sample: &Sample) -> Vec<MonitorEvent> {
        self.record(sample);
        self.evaluate(sample.tick)
    }

    /// Folds in every sample first, then evaluates once.
    pub fn observe_batch(&mut self, samples: &[Sample]) -> Vec<MonitorEvent> {
        let Some(last) = samples.last() else {
            return Vec::new();
        };
        for sample in samples {
            self.record(sample);
        }
        self.evaluate(last.tick)
    }

    fn record(&mut self, sample: &Sample) {
        match self.window {
            AlertWindow::Running => {
                self.driver_max = Some(self.driver_max.map_or(sample.driver_bpm, |m| m.max(sample.driver_bpm)));
                self.passenger_max =
                    Some(self.passenger_max.map_or(sample.passenger_bpm, |m| m.max(sample.passenger_bpm)));
            }
            AlertWindow::Last(n) => {
                self.recent.push_back(*sample);
                while self.recent.len() > n {
                    self.recent.pop_front();
                }
                self.driver_max = self.recent.iter().map(|s| s.driver_bpm).reduce(f64::max);
                self.passenger_max = self.recent.iter().map(|s| s.passenger_bpm).reduce(f64::max);
            }
        }
    }

    /// Classifies the current maxima, publishes changes and runs prompts for
    /// actors entering a new episode.
    fn evaluate(&mut self, tick: u64) -> Vec<MonitorEvent> {
        let driver = self.driver_max.unwrap_or(0.0);
        let passenger = self.passenger_max.unwrap_or(0.0);
        let Thresholds { danger, control } = self.thresholds;

        let alert = if driver > danger {
            AlertState::DriverHigh
        } else if passenger > danger {
            AlertState::PassengerHigh
        } else {
            AlertState::Normal
        };
        let control_level = if driver.max(passenger) > control {
            ControlLevel::HighBpm
        } else if alert != AlertState::Normal {
            ControlLevel::Danger
        } else {
            ControlLevel::Ok
        };
        let danger_level = if alert == AlertState::Normal { DangerLevel::Ok } else { DangerLevel::High };

        self.state.set_levels(alert, control_level, danger_level);

        let mut events = Vec::new();
        if alert != self.alert {
            match alert.actor() {
                Some(actor) => warn!(target: "monitor", %actor, tick, driver, passenger, "heart rate is high"),
                None => info!(target: "monitor", tick, "heart rate back to normal"),
            }
            self.alert = alert;
            events.push(MonitorEvent::AlertChanged { state: alert, actor: alert.actor(), tick });
        }
        if control_level != self.control {
            info!(target: "monitor", tick, level = %control_level, "control level changed");
            self.control = control_level;
            events.push(MonitorEvent::ControlChanged { level: control_level, tick });
        }

        if episode_started(&mut self.driver_episode, driver > danger) {
            events.extend(self.prompt(Actor::Driver, tick));
        }
        if episode_started(&mut self.passenger_episode, passenger > danger) {
            events.extend(self.prompt(Actor::Passenger, tick));
        }

        for event in &events {
            self.publish(*event);
        }
        events
    }

    fn prompt(&mut self, actor: Actor, tick: u64) -> Vec<MonitorEvent> {
        info!(target: "monitor", %actor, tick, "Are you feeling okay?");
        let mut events = vec![MonitorEvent::PromptRequested { actor, tick }];
        if !self.responder.is_ok(actor) {
            warn!(target: "monitor", %actor, tick, "Emergency response has been notified");
            events.push(MonitorEvent::EmergencyNotified { actor, tick });
        }
        events
    }

    fn publish(&mut self, event: MonitorEvent) {
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }
}

/// An episode runs while the actor stays above the danger threshold; returns
/// true only on the evaluation that starts one.
fn episode_started(episode: &mut bool, high: bool) -> bool {
    let started = high && !*episode;
    *episode = high;
    started
}
