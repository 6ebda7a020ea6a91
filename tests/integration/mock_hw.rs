//! Mock hardware adapters for integration tests.
//!
//! Records every actuator call so tests can assert on the full command
//! history without touching real lines.

use core::cell::Cell;
use std::time::{Duration, Instant};

use curebox::app::events::AppEvent;
use curebox::app::ports::{Actuator, ActuatorPort, ActuatorState, EventSink};
use curebox::control::fan_duty::DutyClock;
use curebox::drivers::hw_timer::TickSource;
use curebox::scheduler::{SampleOutcome, Scheduler};

// ── MockActuators ─────────────────────────────────────────────

#[derive(Default)]
pub struct MockActuators {
    pub calls: Vec<(Actuator, bool)>,
    state: ActuatorState,
}

#[allow(dead_code)]
impl MockActuators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: ActuatorState) -> Self {
        Self {
            calls: Vec::new(),
            state,
        }
    }

    pub fn current(&self) -> ActuatorState {
        self.state
    }

    /// Calls made for one actuator, in order.
    pub fn calls_for(&self, actuator: Actuator) -> Vec<bool> {
        self.calls
            .iter()
            .filter(|(a, _)| *a == actuator)
            .map(|(_, on)| *on)
            .collect()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl ActuatorPort for MockActuators {
    fn set(&mut self, actuator: Actuator, on: bool) {
        self.calls.push((actuator, on));
        match actuator {
            Actuator::Fan => self.state.fan = on,
            Actuator::Atomizer => self.state.atomizer = on,
            Actuator::Fridge => self.state.fridge = on,
            Actuator::Heater => self.state.heater = on,
        }
    }

    fn is_on(&mut self, actuator: Actuator) -> bool {
        self.state.get(actuator)
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, event: &AppEvent) -> bool {
        self.events.contains(event)
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── FakeClock ─────────────────────────────────────────────────

/// Hand-driven duty clock: one `advance(1)` per tick.
#[derive(Default)]
pub struct FakeClock {
    ticks: Cell<u32>,
    pub restarts: Cell<u32>,
}

#[allow(dead_code)]
impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ticks: u32) {
        self.ticks.set(self.ticks.get() + ticks);
    }
}

impl DutyClock for FakeClock {
    fn elapsed_ticks(&self) -> u32 {
        self.ticks.get()
    }

    fn restart(&self) {
        self.ticks.set(0);
        self.restarts.set(self.restarts.get() + 1);
    }
}

// ── Helpers ───────────────────────────────────────────────────

/// Block until the sampling task posts an outcome (2 s cap).
#[allow(dead_code)]
pub fn wait_completion<T: TickSource>(s: &Scheduler<T>) -> Option<SampleOutcome> {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if let Some(o) = s.try_completion() {
            return Some(o);
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    None
}

/// Block until the single-flight guard is released (2 s cap).
#[allow(dead_code)]
pub fn wait_idle<T: TickSource>(s: &Scheduler<T>) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if !s.is_sampling() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    false
}
