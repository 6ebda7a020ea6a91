//! End-to-end: hand-driven ticks → sampling task → AppService → actuators.
//!
//! The scheduler runs its real sampling thread against the simulated
//! sensor; only the tick source is manual so every tick is deterministic.

use std::sync::Arc;
use std::time::Duration;

use super::mock_hw::{MockActuators, RecordingSink, wait_completion, wait_idle};

use curebox::adapters::storage::MemoryConfigStore;
use curebox::app::ports::{Actuator, ActuatorState};
use curebox::app::service::AppService;
use curebox::config::{FanMode, SetpointStore};
use curebox::control::fan_duty::{DutyAction, FanDutyPolicy};
use curebox::drivers::hw_timer::ManualTicker;
use curebox::error::SensorFault;
use curebox::scheduler::{SampleOutcome, Scheduler, SchedulerTiming};
use curebox::sensors::sim::{SimCabinet, SimDht22};

fn timing() -> SchedulerTiming {
    SchedulerTiming {
        power_up_settle: Duration::ZERO,
        ..SchedulerTiming::default()
    }
}

fn start(cabinet: &Arc<SimCabinet>) -> Scheduler<ManualTicker> {
    let mut s = Scheduler::new(ManualTicker::new(), timing());
    s.start(SimDht22::new(Arc::clone(cabinet)).with_latency(Duration::ZERO))
        .unwrap();
    s
}

fn tick(s: &Scheduler<ManualTicker>, n: u32) {
    for _ in 0..n {
        assert!(s.ticker().tick());
    }
}

fn cellar_app() -> AppService<MemoryConfigStore> {
    let mut store = SetpointStore::open(MemoryConfigStore::new());
    store.set_target_temperature(22.0).unwrap();
    store.set_target_humidity(70.0).unwrap();
    AppService::new(store, FanDutyPolicy::default())
}

#[test]
fn third_tick_sample_drives_control() {
    let cabinet = Arc::new(SimCabinet::new(24.0, 86.0));
    let mut sched = start(&cabinet);
    let mut app = cellar_app();
    let mut hw = MockActuators::new();
    let mut sink = RecordingSink::new();

    tick(&sched, 2);
    assert!(!sched.is_sampling());
    tick(&sched, 1);

    let outcome = wait_completion(&sched).expect("sample");
    assert!(matches!(outcome, SampleOutcome::Fresh(_)));
    app.on_sample(outcome, &mut hw, &mut sink);

    assert_eq!(
        hw.current(),
        ActuatorState {
            fan: true,
            atomizer: false,
            fridge: true,
            heater: false,
        }
    );
    sched.stop();
}

#[test]
fn failed_read_power_cycles_and_next_attempt_recovers() {
    let cabinet = Arc::new(SimCabinet::new(18.0, 50.0));
    let mut sched = start(&cabinet);
    let mut app = cellar_app();
    let mut hw = MockActuators::new();
    let mut sink = RecordingSink::new();

    // First read succeeds: heater on, atomizer on.
    tick(&sched, 3);
    app.on_sample(wait_completion(&sched).unwrap(), &mut hw, &mut sink);
    assert!(wait_idle(&sched));
    assert!(hw.current().heater);

    // Second read times out: last good sample is reused.
    cabinet.inject_failures(1);
    cabinet.set(30.0, 90.0);
    tick(&sched, 3);
    let outcome = wait_completion(&sched).unwrap();
    assert!(matches!(
        outcome,
        SampleOutcome::Failed {
            fault: SensorFault::Timeout,
            consecutive: 1,
            total: 1,
        }
    ));
    hw.clear();
    app.on_sample(outcome, &mut hw, &mut sink);
    assert!(wait_idle(&sched));
    assert_eq!(hw.calls_for(Actuator::Heater), vec![true]);
    assert_eq!(sched.last_good_sample().map(|s| s.temperature()), Some(18.0));

    // Third attempt powers the sensor back up and reads the new climate.
    tick(&sched, 3);
    let outcome = wait_completion(&sched).unwrap();
    let SampleOutcome::Fresh(sample) = outcome else {
        panic!("expected recovery, got {:?}", outcome);
    };
    assert!((sample.temperature() - 30.0).abs() < f32::EPSILON);
    app.on_sample(outcome, &mut hw, &mut sink);
    assert!(hw.current().fridge);
    assert!(!hw.current().heater);
    assert_eq!(sched.consecutive_failures(), 0);
    assert_eq!(sched.error_count(), 1);
    sched.stop();
}

#[test]
fn duty_policy_runs_on_scheduler_counter() {
    let cabinet = Arc::new(SimCabinet::default());
    let mut sched = start(&cabinet);
    let mut store = SetpointStore::open(MemoryConfigStore::new());
    store.set_fan_mode(FanMode::DutyCycle).unwrap();
    store.set_fan_on_interval(2).unwrap();
    let mut app = AppService::new(store, FanDutyPolicy::new(sched.timing().tick_period));
    let mut hw = MockActuators::with_state(ActuatorState {
        fan: true,
        ..ActuatorState::default()
    });
    let mut sink = RecordingSink::new();

    tick(&sched, 60);
    assert!(sched.take_duty_check());
    assert_eq!(app.on_duty_check(&sched, &mut hw, &mut sink), DutyAction::Hold);
    assert!(!sched.take_duty_check());

    tick(&sched, 60);
    assert!(sched.take_duty_check());
    assert_eq!(
        app.on_duty_check(&sched, &mut hw, &mut sink),
        DutyAction::TurnedOff
    );
    assert_eq!(sched.counter(), 0);
    assert!(!hw.current().fan);
    sched.stop();
}

#[test]
fn stopped_scheduler_ignores_ticks() {
    let cabinet = Arc::new(SimCabinet::default());
    let mut sched = start(&cabinet);
    sched.stop();

    assert!(!sched.ticker().tick());
    assert!(!sched.is_running());
    assert_eq!(sched.counter(), 0);
    assert!(sched.start(SimDht22::new(cabinet)).is_err());
}
