//! Anxiety monitor state machine and contact acknowledgements

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ride_heart_monitor::{
    Actor, AlertState, AlertWindow, AnxietyMonitor, ControlLevel, DangerLevel, MonitorError, MonitorEvent,
    Sample, Series, SharedMonitorState, Thresholds,
};

fn series(pairs: &[(f64, f64)]) -> Series {
    pairs.iter().copied().collect()
}

fn monitor_answering(ok: bool) -> AnxietyMonitor {
    AnxietyMonitor::new(Thresholds::default(), SharedMonitorState::new(), move |_: Actor| ok)
}

fn feed(monitor: &mut AnxietyMonitor, s: &Series) -> Vec<MonitorEvent> {
    s.iter().flat_map(|sample| monitor.observe(sample)).collect()
}

fn prompts(events: &[MonitorEvent], actor: Actor) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, MonitorEvent::PromptRequested { actor: a, .. } if *a == actor))
        .count()
}

// ============================================================================
// ALERT CLASSIFICATION
// ============================================================================

#[test]
fn test_driver_above_danger_threshold() {
    let mut monitor = monitor_answering(true);
    feed(&mut monitor, &series(&[(120.0, 80.0), (150.0, 90.0), (130.0, 85.0)]));

    assert_eq!(monitor.current_alert_state(), AlertState::DriverHigh);
    let state = monitor.state().get();
    assert_eq!(state.alert, AlertState::DriverHigh);
    assert_eq!(state.control_level, ControlLevel::Danger);
    assert_eq!(state.danger_level, DangerLevel::High);
    assert_eq!(monitor.maxima(), (Some(150.0), Some(90.0)));
}

#[test]
fn test_control_threshold_escalates_to_high_bpm() {
    let mut monitor = monitor_answering(true);
    feed(&mut monitor, &series(&[(170.0, 90.0)]));

    assert_eq!(monitor.current_alert_state(), AlertState::DriverHigh);
    assert_eq!(monitor.state().get().control_level, ControlLevel::HighBpm);
}

#[test]
fn test_passenger_high_when_driver_is_fine() {
    let mut monitor = monitor_answering(true);
    feed(&mut monitor, &series(&[(100.0, 145.0)]));

    assert_eq!(monitor.current_alert_state(), AlertState::PassengerHigh);
    assert_eq!(monitor.control_level(), ControlLevel::Danger);
}

#[test]
fn test_passenger_escalates_control_level_too() {
    let mut monitor = monitor_answering(true);
    feed(&mut monitor, &series(&[(100.0, 165.0)]));

    assert_eq!(monitor.current_alert_state(), AlertState::PassengerHigh);
    assert_eq!(monitor.control_level(), ControlLevel::HighBpm);
}

#[test]
fn test_driver_takes_precedence_when_both_high() {
    let mut monitor = monitor_answering(true);
    let events = feed(&mut monitor, &series(&[(150.0, 155.0)]));

    assert_eq!(monitor.current_alert_state(), AlertState::DriverHigh);
    // Both actors are still asked
    assert_eq!(prompts(&events, Actor::Driver), 1);
    assert_eq!(prompts(&events, Actor::Passenger), 1);
}

#[test]
fn test_threshold_is_strictly_greater() {
    let mut monitor = monitor_answering(true);
    let events = feed(&mut monitor, &series(&[(140.0, 140.0), (160.0, 100.0)]));

    assert_eq!(monitor.current_alert_state(), AlertState::DriverHigh);
    assert_eq!(monitor.control_level(), ControlLevel::Danger, "160 is not above 160");
    assert_eq!(prompts(&events, Actor::Passenger), 0);
}

#[test]
fn test_normal_series_emits_nothing() {
    let mut monitor = monitor_answering(true);
    let events = feed(&mut monitor, &series(&[(90.0, 80.0), (110.0, 95.0)]));

    assert!(events.is_empty());
    assert_eq!(monitor.current_alert_state(), AlertState::Normal);
    assert_eq!(monitor.state().get().control_level, ControlLevel::Ok);
    assert_eq!(monitor.state().get().danger_level, DangerLevel::Ok);
}

#[test]
fn test_custom_thresholds_are_per_session() {
    let strict = Thresholds::new(100.0, 120.0).expect("valid");
    let mut strict_monitor = AnxietyMonitor::new(strict, SharedMonitorState::new(), |_: Actor| true);
    let mut default_monitor = monitor_answering(true);

    let s = series(&[(110.0, 90.0)]);
    feed(&mut strict_monitor, &s);
    feed(&mut default_monitor, &s);

    assert_eq!(strict_monitor.current_alert_state(), AlertState::DriverHigh);
    assert_eq!(default_monitor.current_alert_state(), AlertState::Normal);
}

#[test]
fn test_invalid_thresholds_rejected() {
    assert!(matches!(Thresholds::new(160.0, 140.0), Err(MonitorError::InvalidThresholds { .. })));
    assert!(matches!(Thresholds::new(f64::NAN, 160.0), Err(MonitorError::InvalidThresholds { .. })));
    assert!(matches!(Thresholds::new(0.0, 160.0), Err(MonitorError::InvalidThresholds { .. })));
    assert!(Thresholds::new(140.0, 140.0).is_ok());
}

// ============================================================================
// EPISODES AND PROMPTS
// ============================================================================

#[test]
fn test_running_max_prompts_once() {
    let mut monitor = monitor_answering(true);
    let events = feed(&mut monitor, &series(&[(150.0, 80.0), (100.0, 80.0), (155.0, 80.0)]));

    // Running maximum never drops, so this is one episode.
    assert_eq!(prompts(&events, Actor::Driver), 1);
    assert_eq!(monitor.current_alert_state(), AlertState::DriverHigh);
}

#[test]
fn test_sliding_window_starts_new_episode_after_recovery() {
    let mut monitor = monitor_answering(true).with_window(AlertWindow::Last(1));
    let events = feed(
        &mut monitor,
        &series(&[(150.0, 80.0), (152.0, 80.0), (100.0, 80.0), (150.0, 80.0)]),
    );

    assert_eq!(prompts(&events, Actor::Driver), 2);
    let back_to_normal = events
        .iter()
        .any(|e| matches!(e, MonitorEvent::AlertChanged { state: AlertState::Normal, actor: None, tick: 2 }));
    assert!(back_to_normal);
}

#[test]
fn test_sliding_window_keeps_recent_maximum() {
    let mut monitor = monitor_answering(true).with_window(AlertWindow::Last(3));
    feed(&mut monitor, &series(&[(150.0, 80.0), (100.0, 80.0), (100.0, 80.0)]));
    assert_eq!(monitor.current_alert_state(), AlertState::DriverHigh);

    feed(&mut monitor, &series(&[(100.0, 80.0)]));
    assert_eq!(monitor.current_alert_state(), AlertState::Normal);
}

#[test]
fn test_declined_prompt_notifies_emergency() {
    let mut monitor = monitor_answering(false);
    let events = feed(&mut monitor, &series(&[(150.0, 80.0), (151.0, 80.0)]));

    let emergencies: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, MonitorEvent::EmergencyNotified { .. }))
        .collect();
    assert_eq!(emergencies, vec![&MonitorEvent::EmergencyNotified { actor: Actor::Driver, tick: 0 }]);
}

#[test]
fn test_confirmed_prompt_does_not_notify() {
    let mut monitor = monitor_answering(true);
    let events = feed(&mut monitor, &series(&[(150.0, 150.0)]));

    assert!(!events.iter().any(|e| matches!(e, MonitorEvent::EmergencyNotified { .. })));
}

#[test]
fn test_responder_asked_once_per_episode() {
    let asked = Arc::new(AtomicUsize::new(0));
    let counter = asked.clone();
    let mut monitor = AnxietyMonitor::new(Thresholds::default(), SharedMonitorState::new(), move |_: Actor| {
        counter.fetch_add(1, Ordering::SeqCst);
        true
    });
    feed(&mut monitor, &series(&[(150.0, 80.0); 20]));

    assert_eq!(asked.load(Ordering::SeqCst), 1);
}

#[test]
fn test_batch_evaluates_once_over_window() {
    let mut monitor = monitor_answering(true).with_window(AlertWindow::Last(1));
    let s = series(&[(150.0, 80.0), (100.0, 80.0)]);
    let events = monitor.observe_batch(s.samples());

    // Only the last sample is in the window when the batch is evaluated.
    assert!(events.is_empty());
    assert_eq!(monitor.current_alert_state(), AlertState::Normal);

    let mut running = monitor_answering(true);
    running.observe_batch(s.samples());
    assert_eq!(running.current_alert_state(), AlertState::DriverHigh);
    assert!(monitor_answering(true).observe_batch(&[]).is_empty());
}

// ============================================================================
// SUBSCRIPTION
// ============================================================================

#[test]
fn test_subscriber_receives_alert_changes() {
    let mut monitor = monitor_answering(true);
    let rx = monitor.subscribe();
    monitor.observe(&Sample::new(0, 100.0, 80.0));
    monitor.observe(&Sample::new(1, 150.0, 80.0));

    let received: Vec<_> = rx.try_iter().collect();
    assert_eq!(
        received[0],
        MonitorEvent::AlertChanged { state: AlertState::DriverHigh, actor: Some(Actor::Driver), tick: 1 }
    );
    assert!(received.contains(&MonitorEvent::ControlChanged { level: ControlLevel::Danger, tick: 1 }));
    assert!(received.contains(&MonitorEvent::PromptRequested { actor: Actor::Driver, tick: 1 }));
}

#[test]
fn test_dropped_subscriber_is_ignored() {
    let mut monitor = monitor_answering(true);
    drop(monitor.subscribe());
    let events = monitor.observe(&Sample::new(0, 150.0, 80.0));
    assert!(!events.is_empty());
}

// ============================================================================
// CONTACT ACTIONS
// ============================================================================

#[test]
fn test_contact_actions_are_idempotent() {
    let state = SharedMonitorState::new();

    assert!(state.contact_driver());
    assert!(!state.contact_driver());
    assert!(state.get().driver_contacted);
    assert!(!state.get().passenger_contacted);

    assert!(state.contact_passenger());
    assert!(!state.contact_passenger());
    assert!(state.contact_response_unit());
    assert!(!state.contact_response_unit());

    let s = state.get();
    assert!(s.driver_contacted && s.passenger_contacted && s.response_unit_contacted);
}

#[test]
fn test_contact_does_not_touch_alert_levels() {
    let state = SharedMonitorState::new();
    let mut monitor = AnxietyMonitor::new(Thresholds::default(), state.clone(), |_: Actor| true);
    monitor.observe(&Sample::new(0, 170.0, 80.0));

    state.contact_driver();
    state.contact_response_unit();

    let s = state.get();
    assert_eq!(s.alert, AlertState::DriverHigh);
    assert_eq!(s.control_level, ControlLevel::HighBpm);
    assert_eq!(state.current_alert_state(), AlertState::DriverHigh);

    // And the monitor does not reset contact flags.
    monitor.observe(&Sample::new(1, 90.0, 80.0));
    assert!(state.get().driver_contacted);
}
