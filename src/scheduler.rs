//! Sampling scheduler.
//!
//! Reconciles a fast periodic tick with a slow, blocking sensor read.
//!
//! ```text
//!  ┌────────────┐ on_tick ┌─────────────┐  Signal<Measure>  ┌──────────────┐
//!  │ TickSource │────────▶│ TickHandler │──────────────────▶│ sampling task│
//!  │  (1 Hz)    │         │ atomics only│                   │ (may block)  │
//!  └────────────┘         └──────┬──────┘                   └──────┬───────┘
//!                                │ duty_check_due                  │ SampleOutcome
//!                                ▼                                 ▼
//!                         ┌──────────────────────────────────────────────┐
//!                         │ main loop: take_duty_check / try_completion  │
//!                         └──────────────────────────────────────────────┘
//! ```
//!
//! - Every tick increments the counter.  Every `sample_every` ticks a
//!   sample is requested; a request made while one is in flight is
//!   skipped (single-flight, guarded by one `AtomicBool` that the
//!   sampling task clears after delivering its outcome).
//! - Every `duty_check_every` ticks a flag is raised for the main loop to
//!   run the fan duty policy.  The counter doubles as the duty clock.
//! - A failed measurement powers the sensor down.  The next attempt
//!   powers it back up, waits for it to settle and measures.  Retries are
//!   unbounded; failure logging is capped.
//!
//! Lifecycle: `NotStarted → Running → Stopped`.  `stop()` is synchronous
//! and terminal.

use core::cell::Cell;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use log::{error, info, warn};

use crate::app::ports::SensorPort;
use crate::control::fan_duty::DutyClock;
use crate::drivers::hw_timer::{TickListener, TickSource};
use crate::drivers::task::{self, SAMPLER_TASK};
use crate::error::{SchedulerError, SensorFault};
use crate::sensors::SensorSample;

/// Completions the queue can hold.  Single-flight keeps at most one in
/// flight; the slack covers a main loop that falls behind.
const COMPLETION_DEPTH: usize = 4;

/// Failures always logged before switching to powers of two.
const FAILURE_LOG_BURST: u32 = 3;

// ═══════════════════════════════════════════════════════════════
//  Timing
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerTiming {
    pub tick_period: Duration,
    /// Request a sample every N ticks.
    pub sample_every: u32,
    /// Raise the duty-check flag every N ticks.
    pub duty_check_every: u32,
    /// Wait after powering the sensor up before measuring.
    pub power_up_settle: Duration,
}

impl Default for SchedulerTiming {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_secs(1),
            sample_every: 3,
            duty_check_every: 60,
            power_up_settle: Duration::from_secs(1),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Completions
// ═══════════════════════════════════════════════════════════════

/// Result of one background sampling attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleOutcome {
    Fresh(SensorSample),
    Failed {
        fault: SensorFault,
        /// Failures since the last good sample, this one included.
        consecutive: u32,
        /// Failures since start.
        total: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SamplerCommand {
    Measure,
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    NotStarted,
    Running,
    Stopped,
}

// ═══════════════════════════════════════════════════════════════
//  Shared state
// ═══════════════════════════════════════════════════════════════

/// State shared by the tick context, the sampling task and the main loop.
struct Shared {
    timing: SchedulerTiming,
    counter: AtomicU32,
    sampling: AtomicBool,
    duty_check_due: AtomicBool,
    requests: AtomicU32,
    skipped: AtomicU32,
    error_count: AtomicU32,
    consecutive_failures: AtomicU32,
    command: Signal<CriticalSectionRawMutex, SamplerCommand>,
    completions: Channel<CriticalSectionRawMutex, SampleOutcome, COMPLETION_DEPTH>,
    last_good: Mutex<CriticalSectionRawMutex, Cell<Option<SensorSample>>>,
}

impl Shared {
    fn new(timing: SchedulerTiming) -> Self {
        Self {
            timing: SchedulerTiming {
                sample_every: timing.sample_every.max(1),
                duty_check_every: timing.duty_check_every.max(1),
                ..timing
            },
            counter: AtomicU32::new(0),
            sampling: AtomicBool::new(false),
            duty_check_due: AtomicBool::new(false),
            requests: AtomicU32::new(0),
            skipped: AtomicU32::new(0),
            error_count: AtomicU32::new(0),
            consecutive_failures: AtomicU32::new(0),
            command: Signal::new(),
            completions: Channel::new(),
            last_good: Mutex::new(Cell::new(None)),
        }
    }

    /// Single-flight sample request.  Safe from the tick context.
    fn request_sample(&self) -> bool {
        if self
            .sampling
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            self.skipped.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.command.signal(SamplerCommand::Measure);
        true
    }

    /// One sampling attempt.  Runs on the sampling task only.
    fn attempt(&self, sensor: &mut impl SensorPort) -> SampleOutcome {
        if !sensor.is_enabled() {
            info!("sampler: powering sensor up");
            sensor.set_enabled(true);
            if !self.timing.power_up_settle.is_zero() {
                std::thread::sleep(self.timing.power_up_settle);
            }
        }

        let result = sensor
            .measure()
            .and_then(|()| SensorSample::validated(sensor.temperature(), sensor.humidity()));

        match result {
            Ok(sample) => {
                self.last_good.lock(|c| c.set(Some(sample)));
                let prior = self.consecutive_failures.swap(0, Ordering::AcqRel);
                if prior > 0 {
                    info!("sampler: sensor recovered after {} failures", prior);
                }
                SampleOutcome::Fresh(sample)
            }
            Err(fault) => {
                let total = self.error_count.fetch_add(1, Ordering::AcqRel) + 1;
                let consecutive = self.consecutive_failures.fetch_add(1, Ordering::AcqRel) + 1;
                sensor.set_enabled(false);
                if total <= FAILURE_LOG_BURST || total.is_power_of_two() {
                    warn!(
                        "sampler: {} (failures: {} total, {} in a row), sensor powered down",
                        fault, total, consecutive
                    );
                }
                SampleOutcome::Failed {
                    fault,
                    consecutive,
                    total,
                }
            }
        }
    }
}

/// Sampling task body.
fn run_sampler(shared: Arc<Shared>, mut sensor: impl SensorPort) {
    loop {
        match futures_lite::future::block_on(shared.command.wait()) {
            SamplerCommand::Shutdown => break,
            SamplerCommand::Measure => {
                let outcome = shared.attempt(&mut sensor);
                if shared.completions.try_send(outcome).is_err() {
                    warn!("sampler: completion queue full, outcome dropped");
                }
                shared.sampling.store(false, Ordering::Release);
            }
        }
    }
    info!("sampler: stopped");
}

// ═══════════════════════════════════════════════════════════════
//  Tick handler
// ═══════════════════════════════════════════════════════════════

/// Tick-context half of the scheduler.  Only atomic operations and a
/// signal to the sampling task.
pub struct TickHandler {
    shared: Arc<Shared>,
}

impl TickListener for TickHandler {
    fn on_tick(&self) {
        let n = self.shared.counter.fetch_add(1, Ordering::AcqRel).wrapping_add(1);
        if n % self.shared.timing.sample_every == 0 {
            self.shared.request_sample();
        }
        if n % self.shared.timing.duty_check_every == 0 {
            self.shared.duty_check_due.store(true, Ordering::Release);
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler
// ═══════════════════════════════════════════════════════════════

pub struct Scheduler<T: TickSource> {
    shared: Arc<Shared>,
    ticker: T,
    sampler: Option<JoinHandle<()>>,
    lifecycle: Lifecycle,
}

impl<T: TickSource> Scheduler<T> {
    pub fn new(ticker: T, timing: SchedulerTiming) -> Self {
        Self {
            shared: Arc::new(Shared::new(timing)),
            ticker,
            sampler: None,
            lifecycle: Lifecycle::NotStarted,
        }
    }

    /// Spawn the sampling task (which takes ownership of `sensor`) and arm
    /// the tick source.
    pub fn start<S>(&mut self, sensor: S) -> Result<(), SchedulerError>
    where
        S: SensorPort + Send + 'static,
    {
        match self.lifecycle {
            Lifecycle::Running => return Err(SchedulerError::AlreadyRunning),
            Lifecycle::Stopped => return Err(SchedulerError::Stopped),
            Lifecycle::NotStarted => {}
        }

        let shared = Arc::clone(&self.shared);
        let sampler = task::spawn_task(SAMPLER_TASK, move || run_sampler(shared, sensor))?;

        let handler = Arc::new(TickHandler {
            shared: Arc::clone(&self.shared),
        });
        if let Err(e) = self.ticker.arm(self.shared.timing.tick_period, handler) {
            error!("scheduler: tick source failed to arm: {}", e);
            self.shared.command.signal(SamplerCommand::Shutdown);
            if sampler.join().is_err() {
                warn!("scheduler: sampling task panicked");
            }
            self.lifecycle = Lifecycle::Stopped;
            return Err(e);
        }

        self.sampler = Some(sampler);
        self.lifecycle = Lifecycle::Running;
        info!(
            "scheduler: running (tick {} ms, sample every {}, duty check every {})",
            self.shared.timing.tick_period.as_millis(),
            self.shared.timing.sample_every,
            self.shared.timing.duty_check_every
        );
        Ok(())
    }

    /// Disarm the tick source and wait for the sampling task to finish any
    /// in-flight attempt and exit.  Terminal.
    pub fn stop(&mut self) {
        if self.lifecycle != Lifecycle::Running {
            self.lifecycle = Lifecycle::Stopped;
            return;
        }
        self.ticker.disarm();
        self.shared.command.signal(SamplerCommand::Shutdown);
        if let Some(handle) = self.sampler.take() {
            if handle.join().is_err() {
                warn!("scheduler: sampling task panicked");
            }
        }
        self.shared.sampling.store(false, Ordering::Release);
        self.lifecycle = Lifecycle::Stopped;
        info!("scheduler: stopped");
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    pub fn timing(&self) -> SchedulerTiming {
        self.shared.timing
    }

    pub fn ticker(&self) -> &T {
        &self.ticker
    }

    /// Ticks since the last reset.
    pub fn counter(&self) -> u32 {
        self.shared.counter.load(Ordering::Acquire)
    }

    pub fn reset_counter(&self) {
        self.shared.counter.store(0, Ordering::Release);
    }

    /// Request a sample outside the tick cadence.  `false` if one is
    /// already in flight.
    pub fn request_sample(&self) -> bool {
        self.is_running() && self.shared.request_sample()
    }

    /// Whether a sample is in flight.
    pub fn is_sampling(&self) -> bool {
        self.shared.sampling.load(Ordering::Acquire)
    }

    /// Consume the duty-check flag.
    pub fn take_duty_check(&self) -> bool {
        self.shared.duty_check_due.swap(false, Ordering::AcqRel)
    }

    /// Next completed sampling attempt, if any.
    pub fn try_completion(&self) -> Option<SampleOutcome> {
        self.shared.completions.try_receive().ok()
    }

    /// Most recent sample that passed validation.
    pub fn last_good_sample(&self) -> Option<SensorSample> {
        self.shared.last_good.lock(|c| c.get())
    }

    /// Sampling failures since start.
    pub fn error_count(&self) -> u32 {
        self.shared.error_count.load(Ordering::Acquire)
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.shared.consecutive_failures.load(Ordering::Acquire)
    }

    /// Sample requests that reached the sampling task.
    pub fn sample_requests(&self) -> u32 {
        self.shared.requests.load(Ordering::Relaxed)
    }

    /// Sample requests dropped by the single-flight guard.
    pub fn skipped_requests(&self) -> u32 {
        self.shared.skipped.load(Ordering::Relaxed)
    }
}

impl<T: TickSource> DutyClock for Scheduler<T> {
    fn elapsed_ticks(&self) -> u32 {
        self.counter()
    }

    fn restart(&self) {
        self.reset_counter();
    }
}

impl<T: TickSource> Drop for Scheduler<T> {
    fn drop(&mut self) {
        self.stop();
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
