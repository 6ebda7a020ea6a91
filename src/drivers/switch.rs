//! Debounced front-panel switch.
//!
//! ## Hardware
//!
//! Momentary switches with pull-down resistors: the line reads high while
//! pressed.  The GPIO edge interrupt calls [`EdgeIrq::on_raw_edge`], which
//! only touches atomics.  [`DebouncedSwitch::poll`] (called from the main
//! loop) runs the confirmation state machine, so the bound command is
//! always delivered outside interrupt context.
//!
//! ## State machine
//!
//! | State             | Input                   | Next              | Action                         |
//! |-------------------|-------------------------|-------------------|--------------------------------|
//! | `Idle`            | raw edge (IRQ disarms)  | `ArmedForRelease` | deadline = edge + 50 ms        |
//! | `ArmedForRelease` | deadline passed         | `Idle`            | re-read line, re-arm IRQ, emit |
//!
//! The IRQ stays disarmed for the whole confirmation window, so a burst
//! of bounces produces at most one command.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use embedded_hal::digital::InputPin;
use log::{debug, warn};

use crate::app::commands::UiCommand;

/// Confirmation delay after the first raw edge.
pub const DEBOUNCE_MS: u32 = 50;

/// Most switches the front panel carries.
pub const MAX_SWITCHES: usize = 4;

/// Interrupt-side half of a switch.  Shared between the GPIO ISR and the
/// [`DebouncedSwitch`] that owns the line.
#[derive(Debug, Default)]
pub struct EdgeIrq {
    enabled: AtomicBool,
    pending: AtomicBool,
    edge_ms: AtomicU32,
}

impl EdgeIrq {
    pub const fn new() -> Self {
        Self {
            enabled: AtomicBool::new(false),
            pending: AtomicBool::new(false),
            edge_ms: AtomicU32::new(0),
        }
    }

    /// ISR handler: register on the switch GPIO rising edge.
    ///
    /// Lock-free.  The first edge disarms the IRQ; further edges are
    /// ignored until the switch re-arms it.
    pub fn on_raw_edge(&self, now_ms: u32) {
        if self.enabled.swap(false, Ordering::AcqRel) {
            self.edge_ms.store(now_ms, Ordering::Relaxed);
            self.pending.store(true, Ordering::Release);
        }
    }

    /// Whether raw edges are currently accepted.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    fn set_enabled(&self, on: bool) {
        self.enabled.store(on, Ordering::Release);
    }

    fn take_pending(&self) -> Option<u32> {
        if self.pending.swap(false, Ordering::AcqRel) {
            Some(self.edge_ms.load(Ordering::Relaxed))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DebounceState {
    Idle,
    ArmedForRelease { deadline_ms: u32 },
}

/// A switch line plus its debounce session and command binding.
pub struct DebouncedSwitch<P> {
    pin: P,
    name: &'static str,
    irq: Arc<EdgeIrq>,
    binding: Option<UiCommand>,
    state: DebounceState,
    delay_ms: u32,
}

impl<P: InputPin> DebouncedSwitch<P> {
    /// New switch bound to `binding`.  With `None` the IRQ stays disarmed.
    pub fn new(pin: P, name: &'static str, binding: Option<UiCommand>) -> Self {
        let mut sw = Self {
            pin,
            name,
            irq: Arc::new(EdgeIrq::new()),
            binding: None,
            state: DebounceState::Idle,
            delay_ms: DEBOUNCE_MS,
        };
        sw.attach(binding);
        sw
    }

    /// Override the confirmation delay.
    pub fn with_delay(mut self, delay_ms: u32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Handle for the ISR side.
    pub fn irq(&self) -> Arc<EdgeIrq> {
        Arc::clone(&self.irq)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn binding(&self) -> Option<UiCommand> {
        self.binding
    }

    /// Replace the command binding.  Any debounce in progress is dropped.
    /// Detaching (`None`) disarms the raw-edge IRQ entirely.
    pub fn attach(&mut self, binding: Option<UiCommand>) {
        self.irq.set_enabled(false);
        self.irq.take_pending();
        self.state = DebounceState::Idle;
        self.binding = binding;
        if binding.is_some() {
            self.irq.set_enabled(true);
        }
    }

    /// Advance the debounce state machine.  Call from the main loop.
    ///
    /// Returns the bound command once per confirmed press.
    pub fn poll(&mut self, now_ms: u32) -> Option<UiCommand> {
        if self.state == DebounceState::Idle {
            if let Some(edge_ms) = self.irq.take_pending() {
                self.state = DebounceState::ArmedForRelease {
                    deadline_ms: edge_ms.wrapping_add(self.delay_ms),
                };
            }
        }

        let DebounceState::ArmedForRelease { deadline_ms } = self.state else {
            return None;
        };
        // Wrapping compare: deadline reached once the signed distance is >= 0.
        if (now_ms.wrapping_sub(deadline_ms) as i32) < 0 {
            return None;
        }

        self.state = DebounceState::Idle;
        let asserted = self.pin.is_high().unwrap_or_else(|_| {
            warn!("{}: line read failed", self.name);
            false
        });
        if self.binding.is_some() {
            self.irq.set_enabled(true);
        }

        if asserted {
            debug!("{}: press confirmed", self.name);
            self.binding
        } else {
            debug!("{}: bounce rejected", self.name);
            None
        }
    }
}

/// Poll every switch and collect the confirmed commands in panel order.
pub fn poll_all<P: InputPin>(
    switches: &mut heapless::Vec<DebouncedSwitch<P>, MAX_SWITCHES>,
    now_ms: u32,
) -> heapless::Vec<UiCommand, MAX_SWITCHES> {
    switches
        .iter_mut()
        .filter_map(|sw| sw.poll(now_ms))
        .collect()
}
