//! Integration tests for the bath controller

use rs_sousvide::{
    config::ControlConfig,
    hal::{MockBuzzer, MockRelay},
    AlarmPattern, BathController, ButtonEvent, ControllerState, SensorFault,
};

fn controller() -> BathController<MockRelay, MockBuzzer> {
    BathController::new(MockRelay::new(), MockBuzzer::new(), ControlConfig::default())
}

#[test]
fn full_cook_scenario() {
    // Setpoint 60.0, bath starts at 20.0, hysteresisLow 0.5.
    let mut c = controller();

    // First tick: no measurement yet.
    let snap = c.tick(ButtonEvent::None, None).unwrap();
    assert_eq!(snap.state, ControllerState::Idle);
    assert!(!c.relay_on());

    // Heating with the relay on for every reading below the margin.
    for t in [20.0, 30.0, 40.0, 50.0, 58.0] {
        let snap = c.tick(ButtonEvent::None, Some(Ok(t))).unwrap();
        assert_eq!(snap.state, ControllerState::Heating);
        assert!(c.relay_on(), "relay must stay on at {t}");
    }

    // Inside the margin: relay off, still Heating until target.
    let snap = c.tick(ButtonEvent::None, Some(Ok(59.7))).unwrap();
    assert_eq!(snap.state, ControllerState::Heating);
    assert!(!c.relay_on());

    // First reading at/above target: AtTarget, relay off, confirm chirp.
    let snap = c.tick(ButtonEvent::None, Some(Ok(60.0))).unwrap();
    assert_eq!(snap.state, ControllerState::AtTarget);
    assert!(!c.relay_on());
    assert!(c.buzzer().played.contains(&AlarmPattern::Confirm));
}

#[test]
fn idle_heating_attarget_each_entered_once_on_monotonic_rise() {
    let mut c = controller();
    c.tick(ButtonEvent::None, None).unwrap();

    let mut transitions = vec![c.state()];
    for t in [25.0, 35.0, 45.0, 55.0, 59.0, 60.5, 61.0] {
        let state = c.tick(ButtonEvent::None, Some(Ok(t))).unwrap().state;
        if *transitions.last().unwrap() != state {
            transitions.push(state);
        }
    }
    assert_eq!(
        transitions,
        vec![
            ControllerState::Idle,
            ControllerState::Heating,
            ControllerState::AtTarget,
        ]
    );
}

#[test]
fn no_relay_chatter_inside_the_band() {
    let mut c = controller();
    c.tick(ButtonEvent::None, Some(Ok(20.0))).unwrap();
    c.tick(ButtonEvent::None, Some(Ok(60.0))).unwrap();
    assert_eq!(c.state(), ControllerState::AtTarget);
    let transitions_before = c.heater().transitions;

    // Jitter within the hold band must not switch the relay at all.
    for t in [59.9, 59.85, 59.9, 59.95, 59.9, 59.85] {
        c.tick(ButtonEvent::None, Some(Ok(t))).unwrap();
    }
    assert_eq!(c.heater().transitions, transitions_before);
}

#[test]
fn three_faults_from_heating_force_error() {
    // Prior state Heating with a good last measurement.
    let mut c = controller();
    c.tick(ButtonEvent::None, Some(Ok(40.0))).unwrap();
    assert_eq!(c.state(), ControllerState::Heating);
    assert!(c.relay_on());

    for _ in 0..3 {
        c.tick(ButtonEvent::None, Some(Err(SensorFault::Bus))).unwrap();
    }

    // Error regardless of the last good measurement, relay forced off.
    assert_eq!(c.state(), ControllerState::Error);
    assert!(!c.relay_on());
    assert!(!c.heater().heat_on);
}

#[test]
fn error_is_terminal_until_clean_streak() {
    let mut c = controller();
    c.tick(ButtonEvent::None, Some(Ok(40.0))).unwrap();
    for _ in 0..3 {
        c.tick(ButtonEvent::None, Some(Err(SensorFault::Disconnected)))
            .unwrap();
    }

    // Two valid readings are not enough.
    c.tick(ButtonEvent::None, Some(Ok(40.0))).unwrap();
    c.tick(ButtonEvent::None, Some(Ok(40.0))).unwrap();
    assert_eq!(c.state(), ControllerState::Error);
    assert!(!c.relay_on());

    // The third completes the streak and recovery lands in Idle.
    let snap = c.tick(ButtonEvent::None, Some(Ok(40.0))).unwrap();
    assert_eq!(snap.state, ControllerState::Idle);
    assert!(!c.relay_on());
}

#[test]
fn relay_off_on_every_error_tick() {
    let mut c = controller();
    c.tick(ButtonEvent::None, Some(Ok(40.0))).unwrap();
    for _ in 0..3 {
        c.tick(ButtonEvent::None, Some(Err(SensorFault::Bus))).unwrap();
    }

    for _ in 0..10 {
        c.tick(ButtonEvent::None, Some(Err(SensorFault::Bus))).unwrap();
        assert!(!c.relay_on());
        assert!(!c.heater().heat_on);
    }
}

#[test]
fn setpoint_bounds_hold_under_event_bursts() {
    let mut c = controller();

    for _ in 0..100 {
        c.tick(ButtonEvent::Increase, None).unwrap();
        assert!(c.target_c() <= 95.0);
    }
    assert_eq!(c.target_c(), 95.0);

    for _ in 0..1000 {
        c.tick(ButtonEvent::Decrease, None).unwrap();
        assert!(c.target_c() >= 20.0);
    }
    assert_eq!(c.target_c(), 20.0);
}

#[test]
fn lowering_setpoint_below_bath_moves_hold_to_off() {
    let mut c = controller();
    c.tick(ButtonEvent::None, Some(Ok(20.0))).unwrap();
    c.tick(ButtonEvent::None, Some(Ok(60.0))).unwrap();
    assert_eq!(c.state(), ControllerState::AtTarget);

    // Operator scrolls the setpoint well below the bath: the hold policy
    // keeps the relay off while the bath coasts down.
    for _ in 0..10 {
        c.tick(ButtonEvent::Decrease, Some(Ok(60.0))).unwrap();
        assert!(!c.relay_on());
    }
    assert_eq!(c.target_c(), 55.0);
}

#[test]
fn snapshot_tracks_stale_flag_through_fault_and_recovery() {
    let mut c = controller();
    let snap = c.tick(ButtonEvent::None, Some(Ok(40.0))).unwrap();
    assert!(snap.measurement_fresh);

    let snap = c.tick(ButtonEvent::None, Some(Err(SensorFault::Bus))).unwrap();
    assert_eq!(snap.measured_c, Some(40.0));
    assert!(!snap.measurement_fresh);

    let snap = c.tick(ButtonEvent::None, Some(Ok(41.0))).unwrap();
    assert_eq!(snap.measured_c, Some(41.0));
    assert!(snap.measurement_fresh);
}
