//! Integration tests for the sample → AppService → actuators pipeline.
//!
//! These run on the host and drive the full chain from a sampling outcome
//! or an operator command down to actuator calls and store writes.

use super::mock_hw::{FakeClock, MockActuators, RecordingSink};

use curebox::adapters::storage::MemoryConfigStore;
use curebox::app::commands::UiCommand;
use curebox::app::events::AppEvent;
use curebox::app::ports::{Actuator, ActuatorState, ConfigError};
use curebox::app::service::AppService;
use curebox::config::{FanMode, SetpointField, SetpointStore};
use curebox::control::fan_duty::{DutyAction, FanDutyPolicy};
use curebox::error::SensorFault;
use curebox::health::{HealthFault, SENSOR_STALE_AFTER};
use curebox::scheduler::SampleOutcome;
use curebox::sensors::SensorSample;

type App = AppService<MemoryConfigStore>;

fn make_app(store: SetpointStore<MemoryConfigStore>) -> (App, MockActuators, RecordingSink) {
    let mut app = AppService::new(store, FanDutyPolicy::default());
    let hw = MockActuators::new();
    let mut sink = RecordingSink::new();
    app.start(&mut sink);
    (app, hw, sink)
}

/// Cabinet tuned to 22 ± 2 °C and 70 ± 5 %RH.
fn cellar_store() -> SetpointStore<MemoryConfigStore> {
    let mut s = SetpointStore::open(MemoryConfigStore::new());
    s.set_target_temperature(22.0).unwrap();
    s.set_temperature_tolerance(2.0).unwrap();
    s.set_target_humidity(70.0).unwrap();
    s.set_humidity_tolerance(5.0).unwrap();
    s
}

fn fresh(t: f32, h: f32) -> SampleOutcome {
    SampleOutcome::Fresh(SensorSample::validated(t, h).unwrap())
}

fn failed(consecutive: u32, total: u32) -> SampleOutcome {
    SampleOutcome::Failed {
        fault: SensorFault::Timeout,
        consecutive,
        total,
    }
}

// ── Control cycle ─────────────────────────────────────────────

#[test]
fn warm_cabinet_cools_and_leaves_humidity_lines_alone() {
    let (mut app, mut hw, mut sink) = make_app(cellar_store());

    app.on_sample(fresh(24.0, 70.0), &mut hw, &mut sink);

    assert_eq!(hw.calls_for(Actuator::Fridge), vec![true]);
    assert_eq!(hw.calls_for(Actuator::Heater), vec![false]);
    assert!(hw.calls_for(Actuator::Fan).is_empty());
    assert!(hw.calls_for(Actuator::Atomizer).is_empty());
}

#[test]
fn warm_humid_cabinet_cools_and_vents() {
    let (mut app, mut hw, mut sink) = make_app(cellar_store());

    app.on_sample(fresh(24.0, 86.0), &mut hw, &mut sink);

    assert_eq!(
        hw.current(),
        ActuatorState {
            fan: true,
            atomizer: false,
            fridge: true,
            heater: false,
        }
    );
}

#[test]
fn no_actuator_writes_before_first_good_sample() {
    let (mut app, mut hw, mut sink) = make_app(cellar_store());

    app.on_sample(failed(1, 1), &mut hw, &mut sink);

    assert!(hw.calls.is_empty());
    assert_eq!(app.latest_sample(), None);
}

#[test]
fn failed_sample_reuses_last_good_one() {
    let (mut app, mut hw, mut sink) = make_app(cellar_store());
    app.on_sample(fresh(24.0, 86.0), &mut hw, &mut sink);
    let before = app.latest_sample();
    hw.clear();

    app.on_sample(failed(1, 1), &mut hw, &mut sink);

    assert_eq!(app.latest_sample(), before);
    // Same sample, same decisions.
    assert_eq!(hw.calls_for(Actuator::Fridge), vec![true]);
    assert_eq!(hw.calls_for(Actuator::Fan), vec![true]);
    assert!(hw.current().fan);
}

#[test]
fn edit_takes_effect_on_next_cycle() {
    let (mut app, mut hw, mut sink) = make_app(cellar_store());
    // 22.5 °C is inside the 22 ± 2 band: nothing happens.
    app.on_sample(fresh(22.5, 70.0), &mut hw, &mut sink);
    assert!(hw.calls_for(Actuator::Fridge).is_empty());

    // Drop the target to 20.5 °C: 22.5 is now at the fridge's on threshold.
    app.on_ui(UiCommand::NextPage, &mut sink);
    app.on_ui(UiCommand::Enter, &mut sink);
    app.on_ui(UiCommand::CursorDown, &mut sink);
    app.on_ui(UiCommand::CursorDown, &mut sink);
    app.on_ui(UiCommand::CursorDown, &mut sink);
    app.on_ui(UiCommand::Enter, &mut sink);
    assert!((app.setpoints().target_temperature - 20.5).abs() < f32::EPSILON);

    app.control_cycle(&mut hw);
    assert_eq!(hw.calls_for(Actuator::Fridge), vec![true]);
}

// ── Health ────────────────────────────────────────────────────

#[test]
fn repeated_failures_raise_stale_fault_and_recovery_clears_it() {
    let (mut app, mut hw, mut sink) = make_app(cellar_store());
    app.on_sample(fresh(22.0, 70.0), &mut hw, &mut sink);

    for n in 1..=SENSOR_STALE_AFTER {
        app.on_sample(failed(n, n), &mut hw, &mut sink);
    }
    assert!(app.health().has_fault(HealthFault::SensorStale));
    assert!(sink.contains(&AppEvent::FaultDetected(HealthFault::SensorStale.mask())));

    app.on_sample(fresh(22.0, 70.0), &mut hw, &mut sink);
    assert!(!app.health().has_faults());
    assert!(sink.contains(&AppEvent::FaultCleared));
}

#[test]
fn telemetry_reports_errors_and_faults() {
    let (mut app, mut hw, mut sink) = make_app(cellar_store());
    app.on_sample(fresh(24.0, 86.0), &mut hw, &mut sink);
    for n in 1..=SENSOR_STALE_AFTER {
        app.on_sample(failed(n, n), &mut hw, &mut sink);
    }

    let t = app.build_telemetry(&mut hw, 42);
    assert_eq!(t.temperature_c, Some(24.0));
    assert_eq!(t.humidity_pct, Some(86.0));
    assert_eq!(t.counter, 42);
    assert_eq!(t.sample_errors, SENSOR_STALE_AFTER);
    assert_eq!(t.fault_flags, HealthFault::SensorStale.mask());
    assert!(t.actuators.fridge);
}

// ── Setpoint store ────────────────────────────────────────────

#[test]
fn pager_edit_is_persisted() {
    let (mut app, _hw, mut sink) = make_app(SetpointStore::open(MemoryConfigStore::new()));
    let saves = app.store().port().saves();

    app.on_ui(UiCommand::NextPage, &mut sink);
    app.on_ui(UiCommand::Enter, &mut sink);
    app.on_ui(UiCommand::CursorUp, &mut sink);
    app.on_ui(UiCommand::Enter, &mut sink);

    assert!(sink.contains(&AppEvent::SetpointChanged(SetpointField::TargetTemperature)));
    assert_eq!(app.store().port().saves(), saves + 1);
    let stored = app.store().port().stored().unwrap();
    assert!((stored.target_temperature - 50.5).abs() < f32::EPSILON);
}

#[test]
fn invalid_edit_is_rejected_and_not_written() {
    let (mut app, _hw, mut sink) = make_app(SetpointStore::open(MemoryConfigStore::new()));
    let saves = app.store().port().saves();

    app.on_ui(UiCommand::NextPage, &mut sink);
    app.on_ui(UiCommand::CursorDown, &mut sink); // temperature tolerance
    app.on_ui(UiCommand::Enter, &mut sink);
    for _ in 0..5 {
        app.on_ui(UiCommand::CursorDown, &mut sink); // 2.0 → -0.5
    }
    app.on_ui(UiCommand::Enter, &mut sink);

    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::SetpointRejected(_))),
        1
    );
    assert!((app.setpoints().temperature_tolerance - 2.0).abs() < f32::EPSILON);
    assert_eq!(app.store().port().saves(), saves);
    assert!(!app.health().has_faults());
}

#[test]
fn unwritable_store_is_surfaced_at_start_and_on_edit() {
    let mut port = MemoryConfigStore::new();
    port.fail_writes(true);
    let (mut app, _hw, mut sink) = make_app(SetpointStore::open(port));

    assert!(sink.contains(&AppEvent::ConfigSaveFailed(ConfigError::IoError)));
    assert!(sink.contains(&AppEvent::FaultDetected(HealthFault::ConfigIo.mask())));
    assert!(sink.contains(&AppEvent::Started(FanMode::Hysteresis)));

    app.on_ui(UiCommand::NextPage, &mut sink);
    app.on_ui(UiCommand::Enter, &mut sink);
    app.on_ui(UiCommand::CursorUp, &mut sink);
    app.on_ui(UiCommand::Enter, &mut sink);

    assert_eq!(
        sink.count(|e| *e == AppEvent::ConfigSaveFailed(ConfigError::IoError)),
        2
    );
    // The operator's value stays live even though it was not stored.
    assert!((app.setpoints().target_temperature - 50.5).abs() < f32::EPSILON);
    assert!(app.health().has_fault(HealthFault::ConfigIo));
}

#[test]
fn corrupt_store_falls_back_to_defaults() {
    let (app, _hw, sink) = make_app(SetpointStore::open(MemoryConfigStore::with_blob("{not json")));

    assert!((app.setpoints().target_temperature - 50.0).abs() < f32::EPSILON);
    assert!((app.setpoints().target_humidity - 55.0).abs() < f32::EPSILON);
    assert!(sink.contains(&AppEvent::ConfigSaveFailed(ConfigError::Corrupted)));
    assert!(app.health().has_fault(HealthFault::ConfigIo));
}

#[test]
fn successful_save_clears_config_fault() {
    let (mut app, _hw, mut sink) = make_app(SetpointStore::open(MemoryConfigStore::with_blob("{not json")));
    assert!(app.health().has_fault(HealthFault::ConfigIo));

    app.on_ui(UiCommand::NextPage, &mut sink);
    app.on_ui(UiCommand::Enter, &mut sink);
    app.on_ui(UiCommand::CursorUp, &mut sink);
    app.on_ui(UiCommand::Enter, &mut sink);

    assert!(!app.health().has_faults());
    assert!(sink.contains(&AppEvent::FaultCleared));
}

// ── Fan duty cycle ────────────────────────────────────────────

fn duty_store() -> SetpointStore<MemoryConfigStore> {
    let mut s = cellar_store();
    s.set_fan_mode(FanMode::DutyCycle).unwrap();
    s.set_fan_on_interval(2).unwrap();
    s.set_fan_off_interval(10).unwrap();
    s
}

#[test]
fn controller_leaves_fan_to_duty_policy() {
    let (mut app, mut hw, mut sink) = make_app(duty_store());

    app.on_sample(fresh(24.0, 86.0), &mut hw, &mut sink);

    assert!(hw.calls_for(Actuator::Fan).is_empty());
    assert_eq!(hw.calls_for(Actuator::Atomizer), vec![false]);
}

#[test]
fn duty_cycle_alternates_on_and_off_periods() {
    let (mut app, mut hw, mut sink) = make_app(duty_store());
    let clock = FakeClock::new();

    // Fan starts off: on after 10 min.
    clock.advance(599);
    assert_eq!(app.on_duty_check(&clock, &mut hw, &mut sink), DutyAction::Hold);
    clock.advance(1);
    assert_eq!(app.on_duty_check(&clock, &mut hw, &mut sink), DutyAction::TurnedOn);
    assert!(sink.contains(&AppEvent::FanToggled { on: true }));
    assert_eq!(clock.restarts.get(), 1);

    // Then off after 2 min.
    clock.advance(60);
    assert_eq!(app.on_duty_check(&clock, &mut hw, &mut sink), DutyAction::Hold);
    clock.advance(60);
    assert_eq!(app.on_duty_check(&clock, &mut hw, &mut sink), DutyAction::TurnedOff);
    assert!(sink.contains(&AppEvent::FanToggled { on: false }));
    assert_eq!(clock.restarts.get(), 2);
    assert_eq!(hw.calls_for(Actuator::Fan), vec![true, false]);
}

#[test]
fn duty_policy_idle_in_hysteresis_mode() {
    let (mut app, mut hw, mut sink) = make_app(cellar_store());
    let clock = FakeClock::new();
    clock.advance(10_000);

    assert_eq!(app.on_duty_check(&clock, &mut hw, &mut sink), DutyAction::Hold);
    assert!(hw.calls.is_empty());
    assert_eq!(clock.restarts.get(), 0);
}
