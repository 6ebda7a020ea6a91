//! Curebox controller: host simulation entry point.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                      │
//! │                                                                 │
//! │  ActuatorBank     SimDht22        FileConfigStore  LogEventSink │
//! │  (ActuatorPort)   (SensorPort)    (ConfigPort)     (EventSink)  │
//! │                                                                 │
//! │  ──────────────── Port Trait Boundary ────────────────────      │
//! │                                                                 │
//! │  ┌───────────────────────────────────────────────────────────┐  │
//! │  │              AppService (pure logic)                      │  │
//! │  │  ClimateController · FanDutyPolicy · Health · Pager       │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! │                                                                 │
//! │  Scheduler (tick thread + sampling task) · DebouncedSwitch ×4   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Console keys (followed by Enter): `u` up, `d` down, `e` edit, `p` page,
//! `f` inject sensor failures, `q` quit.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Result;
use log::{info, warn};

use curebox::adapters::log_sink::{self, LogEventSink};
use curebox::adapters::storage::FileConfigStore;
use curebox::adapters::time::MonotonicClock;
use curebox::app::commands::UiCommand;
use curebox::app::events::AppEvent;
use curebox::app::ports::{ActuatorPort, EventSink};
use curebox::app::service::AppService;
use curebox::config::SetpointStore;
use curebox::control::fan_duty::FanDutyPolicy;
use curebox::drivers::actuator::{ActuatorBank, ActuatorLine, Polarity};
use curebox::drivers::hw_timer::ThreadTicker;
use curebox::drivers::sim_gpio::{LineProbe, SimInputPin, SimOutputPin};
use curebox::drivers::switch::{self, DebouncedSwitch, EdgeIrq, MAX_SWITCHES};
use curebox::drivers::task::{self, TaskSpec};
use curebox::error::Error;
use curebox::pins;
use curebox::scheduler::{Scheduler, SchedulerTiming};
use curebox::sensors::sim::{SimCabinet, SimDht22};

const LOOP_PERIOD: Duration = Duration::from_millis(10);
const TELEMETRY_EVERY_TICKS: u32 = 10;
/// How long a console "press" holds the line high.
const PRESS_HOLD: Duration = Duration::from_millis(120);
/// Failures injected by `f`; enough to raise the stale-sensor fault.
const INJECTED_FAILURES: u32 = 6;

const CONSOLE_TASK: TaskSpec = TaskSpec {
    name: "console",
    stack_kb: 16,
};

/// Everything the control loop owns.  Built once in `main`, no globals.
struct AppContext {
    app: AppService<FileConfigStore>,
    hw: ActuatorBank<SimOutputPin>,
    scheduler: Scheduler<ThreadTicker>,
    switches: SwitchPanel,
    sink: LogEventSink,
    clock: Arc<MonotonicClock>,
    cabinet: Arc<SimCabinet>,
}

/// Console-side handle of one simulated switch.
struct SwitchHandle {
    key: char,
    line: LineProbe,
    irq: Arc<EdgeIrq>,
}

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    log_sink::init(std::env::var("CUREBOX_LOG").ok().as_deref())?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Curebox v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Setpoints ──────────────────────────────────────────
    let path = std::env::var("CUREBOX_CONFIG").unwrap_or_else(|_| "curebox.json".to_owned());
    let store = SetpointStore::open(FileConfigStore::new(path));

    // ── 3. Simulated hardware ─────────────────────────────────
    let cabinet = Arc::new(SimCabinet::default());
    let hw = build_actuators();
    let (switches, handles) = build_switches()?;
    info!(
        "Lines: dht=GPIO{} (en GPIO{}), fan=GPIO{}, atomizer=GPIO{}, fridge=GPIO{} (active-low), heater=GPIO{}",
        pins::DHT_DATA_GPIO,
        pins::DHT_ENABLE_GPIO,
        pins::FAN_GPIO,
        pins::ATOMIZER_GPIO,
        pins::FRIDGE_GPIO,
        pins::HEATER_GPIO
    );
    info!(
        "Switches: up=GPIO{}, down=GPIO{}, edit=GPIO{}, page=GPIO{}",
        pins::SWITCH_UP_GPIO,
        pins::SWITCH_DOWN_GPIO,
        pins::SWITCH_EDIT_GPIO,
        pins::SWITCH_PAGE_GPIO
    );

    // ── 4. Context ────────────────────────────────────────────
    let timing = SchedulerTiming::default();
    let mut ctx = AppContext {
        app: AppService::new(store, FanDutyPolicy::new(timing.tick_period)),
        hw,
        scheduler: Scheduler::new(ThreadTicker::new(), timing),
        switches,
        sink: LogEventSink::new(),
        clock: Arc::new(MonotonicClock::new()),
        cabinet,
    };

    ctx.app.start(&mut ctx.sink);
    ctx.scheduler
        .start(SimDht22::new(Arc::clone(&ctx.cabinet)))
        .map_err(Error::from)?;

    // ── 5. Console input ──────────────────────────────────────
    let quit = Arc::new(AtomicBool::new(false));
    spawn_console(
        handles,
        Arc::clone(&ctx.clock),
        Arc::clone(&ctx.cabinet),
        Arc::clone(&quit),
    )
    .map_err(Error::from)?;

    info!("System ready. Entering control loop.");
    run(&mut ctx, &quit);

    // ── 6. Shutdown ───────────────────────────────────────────
    ctx.scheduler.stop();
    ctx.hw.all_off().map_err(Error::from)?;
    info!("Shutdown complete");
    Ok(())
}

/// The unbounded control loop.  Returns when `quit` is raised.
fn run(ctx: &mut AppContext, quit: &AtomicBool) {
    let telemetry_every_ms =
        ctx.scheduler.timing().tick_period.as_millis() as u32 * TELEMETRY_EVERY_TICKS;
    let mut last_step_ms = ctx.clock.uptime_ms();
    let mut last_telemetry_ms = last_step_ms;

    while !quit.load(Ordering::Acquire) {
        let now_ms = ctx.clock.uptime_ms();

        // Confirmed switch presses.
        for cmd in switch::poll_all(&mut ctx.switches, now_ms) {
            ctx.app.on_ui(cmd, &mut ctx.sink);
        }

        // Deferred sample completions → control cycle.
        while let Some(outcome) = ctx.scheduler.try_completion() {
            ctx.app.on_sample(outcome, &mut ctx.hw, &mut ctx.sink);
        }

        // Fan duty policy on the tick cadence.
        if ctx.scheduler.take_duty_check() {
            ctx.app.on_duty_check(&ctx.scheduler, &mut ctx.hw, &mut ctx.sink);
        }

        // Periodic status line.
        if now_ms.wrapping_sub(last_telemetry_ms) >= telemetry_every_ms {
            last_telemetry_ms = now_ms;
            let t = ctx.app.build_telemetry(&mut ctx.hw, ctx.scheduler.counter());
            ctx.sink.emit(&AppEvent::Telemetry(t));
        }

        // Cabinet physics.
        let dt = now_ms.wrapping_sub(last_step_ms) as f32 / 1000.0;
        last_step_ms = now_ms;
        let state = ctx.hw.state();
        ctx.cabinet.step(state, dt);

        std::thread::sleep(LOOP_PERIOD);
    }
}

fn build_actuators() -> ActuatorBank<SimOutputPin> {
    let line = |polarity: Polarity, name: &'static str| {
        ActuatorLine::new(SimOutputPin::new(false).0, polarity, name)
    };
    ActuatorBank::new(
        line(pins::FAN_POLARITY, "fan"),
        line(pins::ATOMIZER_POLARITY, "atomizer"),
        line(pins::FRIDGE_POLARITY, "fridge"),
        line(pins::HEATER_POLARITY, "heater"),
    )
}

type SwitchPanel = heapless::Vec<DebouncedSwitch<SimInputPin>, MAX_SWITCHES>;

fn build_switches() -> Result<(SwitchPanel, Vec<SwitchHandle>)> {
    let layout = [
        ('u', "up", UiCommand::CursorUp),
        ('d', "down", UiCommand::CursorDown),
        ('e', "edit", UiCommand::Enter),
        ('p', "page", UiCommand::NextPage),
    ];
    let mut panel = SwitchPanel::new();
    let mut handles = Vec::with_capacity(layout.len());
    for (key, name, cmd) in layout {
        let (pin, line) = SimInputPin::new(false);
        let sw = DebouncedSwitch::new(pin, name, Some(cmd));
        handles.push(SwitchHandle {
            key,
            line,
            irq: sw.irq(),
        });
        if panel.push(sw).is_err() {
            anyhow::bail!("switch panel full at '{}'", name);
        }
    }
    Ok((panel, handles))
}

/// Read console keys and turn them into raw switch edges.
fn spawn_console(
    handles: Vec<SwitchHandle>,
    clock: Arc<MonotonicClock>,
    cabinet: Arc<SimCabinet>,
    quit: Arc<AtomicBool>,
) -> Result<(), curebox::error::SchedulerError> {
    task::spawn_task(CONSOLE_TASK, move || {
        let mut line = String::new();
        loop {
            line.clear();
            match std::io::stdin().read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            for key in line.trim().chars() {
                match key {
                    'q' => {
                        quit.store(true, Ordering::Release);
                        return;
                    }
                    'f' => {
                        info!("console: injecting {} sensor failures", INJECTED_FAILURES);
                        cabinet.inject_failures(INJECTED_FAILURES);
                    }
                    k => match handles.iter().find(|h| h.key == k) {
                        Some(h) => {
                            // Raw press: line high, edge IRQ, hold, release.
                            h.line.set_high(true);
                            h.irq.on_raw_edge(clock.uptime_ms());
                            std::thread::sleep(PRESS_HOLD);
                            h.line.set_high(false);
                        }
                        None => warn!("console: unknown key '{}'", k),
                    },
                }
            }
        }
        // stdin closed: keep running until killed.
        info!("console: input closed");
    })
    .map(|_detached| ())
}
