//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the live setpoints, the control laws, the health
//! monitor and the pager.  Everything it touches outside itself comes in
//! through port traits at the call site, so the whole service runs
//! against mocks in tests.
//!
//! ```text
//!  SampleOutcome ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!  UiCommand     ──▶ │          AppService          │
//!  duty check    ──▶ │ Controller · Duty · Health   │ ──▶ ActuatorPort
//!                    │ Pager · SetpointStore        │
//!                    └──────────────────────────────┘
//! ```
//!
//! All methods run on the main loop.  Setpoints are only ever touched
//! here, so edits and control cycles never race.

use log::{debug, info};

use crate::config::{SetpointConfig, SetpointStore};
use crate::control::fan_duty::{DutyAction, DutyClock, FanDutyPolicy};
use crate::control::hysteresis::ClimateController;
use crate::health::HealthMonitor;
use crate::scheduler::SampleOutcome;
use crate::sensors::SensorSample;
use crate::ui::pager::Pager;

use super::commands::UiCommand;
use super::events::{AppEvent, TelemetryData};
use super::ports::{ActuatorPort, ConfigError, ConfigPort, EventSink};

pub struct AppService<C: ConfigPort> {
    store: SetpointStore<C>,
    controller: ClimateController,
    duty: FanDutyPolicy,
    health: HealthMonitor,
    pager: Pager,
    latest: Option<SensorSample>,
    sample_errors: u32,
}

impl<C: ConfigPort> AppService<C> {
    pub fn new(store: SetpointStore<C>, duty: FanDutyPolicy) -> Self {
        Self {
            store,
            controller: ClimateController::new(),
            duty,
            health: HealthMonitor::new(),
            pager: Pager::new(),
            latest: None,
            sample_errors: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Surface any store problem found while loading, then announce start.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        if let Some(e) = self.store.startup_fault() {
            let before = self.health.faults();
            self.health.on_config_io(false);
            sink.emit(&AppEvent::ConfigSaveFailed(e));
            self.emit_fault_change(before, sink);
        }
        let mode = self.store.fan_mode();
        sink.emit(&AppEvent::Started(mode));
        info!("AppService started (fan mode {:?})", mode);
    }

    // ── Deferred work from the scheduler ──────────────────────

    /// Fold in one sampling outcome and run a control cycle with the best
    /// available sample.  A failed attempt keeps the previous sample.
    pub fn on_sample(
        &mut self,
        outcome: SampleOutcome,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        let before = self.health.faults();
        self.health.on_sample(&outcome);
        match outcome {
            SampleOutcome::Fresh(sample) => self.latest = Some(sample),
            SampleOutcome::Failed { total, .. } => self.sample_errors = total,
        }
        self.emit_fault_change(before, sink);
        self.control_cycle(hw);
    }

    /// Run the controller on the latest sample.  No-op before the first
    /// good read.
    pub fn control_cycle(&mut self, hw: &mut impl ActuatorPort) {
        match self.latest {
            Some(s) => self
                .controller
                .control(self.store.setpoints(), s.temperature(), s.humidity(), hw),
            None => debug!("control: no sample yet"),
        }
    }

    /// Run the fan duty policy against the scheduler's counter.
    pub fn on_duty_check(
        &mut self,
        clock: &impl DutyClock,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> DutyAction {
        let action = self.duty.evaluate(self.store.setpoints(), clock, hw);
        match action {
            DutyAction::TurnedOn => sink.emit(&AppEvent::FanToggled { on: true }),
            DutyAction::TurnedOff => sink.emit(&AppEvent::FanToggled { on: false }),
            DutyAction::Hold => {}
        }
        action
    }

    // ── Operator input ────────────────────────────────────────

    pub fn on_ui(&mut self, cmd: UiCommand, sink: &mut impl EventSink) {
        debug!("ui: {:?}", cmd);
        match cmd {
            UiCommand::CursorUp => self.pager.cursor_up(),
            UiCommand::CursorDown => self.pager.cursor_down(),
            UiCommand::NextPage => self.pager.next_page(),
            UiCommand::Enter => {
                let field = self.pager.selected();
                let before = self.health.faults();
                match self.pager.enter(&mut self.store) {
                    Ok(false) => {}
                    Ok(true) => {
                        self.health.on_config_io(true);
                        sink.emit(&AppEvent::SetpointChanged(field));
                    }
                    Err(ConfigError::ValidationFailed(why)) => {
                        sink.emit(&AppEvent::SetpointRejected(why));
                    }
                    Err(e) => {
                        self.health.on_config_io(false);
                        sink.emit(&AppEvent::ConfigSaveFailed(e));
                    }
                }
                self.emit_fault_change(before, sink);
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn build_telemetry(&self, hw: &mut impl ActuatorPort, counter: u32) -> TelemetryData {
        let sp = self.store.setpoints();
        TelemetryData {
            temperature_c: self.latest.map(|s| s.temperature()),
            humidity_pct: self.latest.map(|s| s.humidity()),
            target_temperature_c: sp.target_temperature,
            target_humidity_pct: sp.target_humidity,
            actuators: hw.state(),
            fan_mode: sp.fan_mode,
            fan_on_minutes: sp.fan_on_interval_minutes,
            fan_off_minutes: sp.fan_off_interval_minutes,
            counter,
            sample_errors: self.sample_errors,
            fault_flags: self.health.faults(),
        }
    }

    pub fn setpoints(&self) -> &SetpointConfig {
        self.store.setpoints()
    }

    pub fn store(&self) -> &SetpointStore<C> {
        &self.store
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn health(&self) -> &HealthMonitor {
        &self.health
    }

    pub fn latest_sample(&self) -> Option<SensorSample> {
        self.latest
    }

    // ── Internal ──────────────────────────────────────────────

    fn emit_fault_change(&self, before: u8, sink: &mut impl EventSink) {
        let after = self.health.faults();
        if after == before {
            return;
        }
        if after == 0 {
            sink.emit(&AppEvent::FaultCleared);
        } else if after & !before != 0 {
            sink.emit(&AppEvent::FaultDetected(after));
        }
    }
}
