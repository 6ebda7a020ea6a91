//! Log-based event sink and console logging setup.
//!
//! [`LogEventSink`] implements [`EventSink`] by writing structured
//! application events through the `log` facade.  [`init`] installs the
//! host backend: a `tracing-subscriber` formatter on stderr that also
//! picks up `log` records.

use log::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

fn on_off(on: bool) -> &'static str {
    if on { "ON" } else { "off" }
}

/// Adapter that logs every [`AppEvent`] to the console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                let fmt_opt = |v: Option<f32>| v.map_or_else(|| "--".to_owned(), |v| format!("{v:.1}"));
                info!(
                    "TELEM | T={}\u{00b0}C (target {:.1}) | RH={}% (target {:.1}) | \
                     fan={} atomizer={} fridge={} heater={} | fan mode={:?} {}m/{}m | \
                     counter={} | errors={} | faults=0b{:02b}",
                    fmt_opt(t.temperature_c),
                    t.target_temperature_c,
                    fmt_opt(t.humidity_pct),
                    t.target_humidity_pct,
                    on_off(t.actuators.fan),
                    on_off(t.actuators.atomizer),
                    on_off(t.actuators.fridge),
                    on_off(t.actuators.heater),
                    t.fan_mode,
                    t.fan_on_minutes,
                    t.fan_off_minutes,
                    t.counter,
                    t.sample_errors,
                    t.fault_flags,
                );
            }
            AppEvent::FaultDetected(flags) => {
                warn!("FAULT | degraded, flags=0b{:02b}", flags);
            }
            AppEvent::FaultCleared => {
                info!("FAULT | all cleared");
            }
            AppEvent::SetpointChanged(field) => {
                info!("CONFIG | {} saved", field.label());
            }
            AppEvent::SetpointRejected(why) => {
                warn!("CONFIG | rejected: {}", why);
            }
            AppEvent::ConfigSaveFailed(e) => {
                warn!("CONFIG | save failed: {}", e);
            }
            AppEvent::FanToggled { on } => {
                info!("DUTY | fan {}", on_off(*on));
            }
            AppEvent::Started(mode) => {
                info!("START | fan mode={:?}", mode);
            }
        }
    }
}

/// Filter used when `CUREBOX_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info";

/// Build the console filter from an `EnvFilter` directive string
/// (`debug`, `curebox::scheduler=trace,info`, ...).
pub fn env_filter(directives: Option<&str>) -> EnvFilter {
    match directives.map(EnvFilter::try_new) {
        Some(Ok(filter)) => filter,
        Some(Err(e)) => {
            eprintln!("bad log filter ({e}), using '{DEFAULT_FILTER}'");
            EnvFilter::new(DEFAULT_FILTER)
        }
        None => EnvFilter::new(DEFAULT_FILTER),
    }
}

/// Install the stderr subscriber.  `log` records are bridged into it.
pub fn init(directives: Option<&str>) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(directives))
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("logger init failed: {e}"))
}
