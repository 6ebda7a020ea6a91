//! Periodic tick source.
//!
//! [`TickSource`] is the seam between the scheduler and whatever produces
//! the 1 Hz tick (a hardware timer on the board, a thread on the host).
//! The listener runs in the tick context and must return quickly: it may
//! only touch atomics and signal other tasks.
//!
//! [`ThreadTicker`] is the host implementation.  It sleeps to absolute
//! deadlines (`start + n * period`) so the tick rate does not drift with
//! listener run time, and `disarm` wakes it immediately.

use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use log::{info, warn};

use crate::drivers::task::{self, TICK_TASK};
use crate::error::SchedulerError;

/// Receives ticks.  Called from the tick context.
pub trait TickListener: Send + Sync {
    fn on_tick(&self);
}

/// Something that can call a [`TickListener`] at a fixed period.
pub trait TickSource {
    /// Start calling `listener` every `period`.
    fn arm(&mut self, period: Duration, listener: Arc<dyn TickListener>)
        -> Result<(), SchedulerError>;

    /// Stop ticking.  No tick is delivered after this returns.
    fn disarm(&mut self);

    fn is_armed(&self) -> bool;
}

/// Tick source backed by a dedicated thread.
#[derive(Default)]
pub struct ThreadTicker {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ThreadTicker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TickSource for ThreadTicker {
    fn arm(
        &mut self,
        period: Duration,
        listener: Arc<dyn TickListener>,
    ) -> Result<(), SchedulerError> {
        if self.handle.is_some() {
            return Err(SchedulerError::AlreadyRunning);
        }
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = task::spawn_task(TICK_TASK, move || {
            let start = Instant::now();
            let mut n: u32 = 0;
            loop {
                n = n.wrapping_add(1);
                let deadline = start + period * n;
                // park_timeout may wake spuriously; sleep until the deadline.
                loop {
                    if stop_flag.load(Ordering::Acquire) {
                        return;
                    }
                    let now = Instant::now();
                    if now >= deadline {
                        break;
                    }
                    std::thread::park_timeout(deadline - now);
                }
                listener.on_tick();
            }
        })?;

        self.stop = stop;
        self.handle = Some(handle);
        info!("ThreadTicker: armed ({} ms)", period.as_millis());
        Ok(())
    }

    fn disarm(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.stop.store(true, Ordering::Release);
        handle.thread().unpark();
        if handle.join().is_err() {
            warn!("ThreadTicker: tick thread panicked");
        }
        info!("ThreadTicker: disarmed");
    }

    fn is_armed(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for ThreadTicker {
    fn drop(&mut self) {
        self.disarm();
    }
}

/// Tick source stepped by the caller with [`tick`](Self::tick), for
/// deterministic tests and single-step runs.
#[derive(Default)]
pub struct ManualTicker {
    listener: Option<Arc<dyn TickListener>>,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one tick.  Returns `false` when disarmed.
    pub fn tick(&self) -> bool {
        match &self.listener {
            Some(l) => {
                l.on_tick();
                true
            }
            None => false,
        }
    }
}

impl TickSource for ManualTicker {
    fn arm(
        &mut self,
        _period: Duration,
        listener: Arc<dyn TickListener>,
    ) -> Result<(), SchedulerError> {
        if self.listener.is_some() {
            return Err(SchedulerError::AlreadyRunning);
        }
        self.listener = Some(listener);
        Ok(())
    }

    fn disarm(&mut self) {
        self.listener = None;
    }

    fn is_armed(&self) -> bool {
        self.listener.is_some()
    }
}
