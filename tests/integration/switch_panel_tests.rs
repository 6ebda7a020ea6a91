//! Front panel: raw edges → debounced commands → pager → setpoint store.

use curebox::adapters::storage::MemoryConfigStore;
use curebox::app::commands::UiCommand;
use curebox::app::events::AppEvent;
use curebox::app::service::AppService;
use curebox::config::{SetpointField, SetpointStore};
use curebox::control::fan_duty::FanDutyPolicy;
use curebox::drivers::sim_gpio::{LineProbe, SimInputPin};
use curebox::drivers::switch::{self, DEBOUNCE_MS, DebouncedSwitch, EdgeIrq, MAX_SWITCHES};
use curebox::ui::pager::Page;

use super::mock_hw::RecordingSink;

use std::sync::Arc;

struct Panel {
    switches: heapless::Vec<DebouncedSwitch<SimInputPin>, MAX_SWITCHES>,
    lines: Vec<(UiCommand, LineProbe, Arc<EdgeIrq>)>,
}

impl Panel {
    fn new() -> Self {
        let mut switches = heapless::Vec::new();
        let mut lines = Vec::new();
        for (name, cmd) in [
            ("up", UiCommand::CursorUp),
            ("down", UiCommand::CursorDown),
            ("edit", UiCommand::Enter),
            ("page", UiCommand::NextPage),
        ] {
            let (pin, probe) = SimInputPin::new(false);
            let sw = DebouncedSwitch::new(pin, name, Some(cmd));
            lines.push((cmd, probe, sw.irq()));
            assert!(switches.push(sw).is_ok());
        }
        Self { switches, lines }
    }

    /// Press `cmd` at `at_ms` and hold past the debounce window.  Returns
    /// the commands confirmed during the hold.
    fn press(&mut self, cmd: UiCommand, at_ms: u32) -> Vec<UiCommand> {
        let (_, probe, irq) = self.lines.iter().find(|(c, ..)| *c == cmd).unwrap();
        probe.set_high(true);
        irq.on_raw_edge(at_ms);
        let mut out = Vec::new();
        for t in (at_ms..=at_ms + DEBOUNCE_MS).step_by(10) {
            out.extend(switch::poll_all(&mut self.switches, t));
        }
        probe.set_high(false);
        out
    }
}

#[test]
fn one_command_per_press() {
    let mut panel = Panel::new();
    assert_eq!(panel.press(UiCommand::NextPage, 1_000), vec![UiCommand::NextPage]);
    assert_eq!(panel.press(UiCommand::CursorDown, 2_000), vec![UiCommand::CursorDown]);
}

#[test]
fn glitch_released_before_deadline_is_ignored() {
    let mut panel = Panel::new();
    let (_, probe, irq) = &panel.lines[2];
    probe.set_high(true);
    irq.on_raw_edge(500);
    probe.set_high(false);

    let mut out = Vec::new();
    for t in (500..=600).step_by(10) {
        out.extend(switch::poll_all(&mut panel.switches, t));
    }
    assert!(out.is_empty());
    // Re-armed for the next real press.
    assert!(panel.lines[2].2.is_enabled());
}

#[test]
fn panel_edit_reaches_the_store() {
    let mut panel = Panel::new();
    let mut app = AppService::new(
        SetpointStore::open(MemoryConfigStore::new()),
        FanDutyPolicy::default(),
    );
    let mut sink = RecordingSink::new();
    app.start(&mut sink);

    let mut now = 10_000;
    for cmd in [
        UiCommand::NextPage,
        UiCommand::CursorDown,
        UiCommand::CursorDown,
        UiCommand::Enter,
        UiCommand::CursorUp,
        UiCommand::CursorUp,
        UiCommand::Enter,
    ] {
        for confirmed in panel.press(cmd, now) {
            app.on_ui(confirmed, &mut sink);
        }
        now += 1_000;
    }

    assert_eq!(app.pager().page(), Page::Setpoints);
    assert!(sink.contains(&AppEvent::SetpointChanged(SetpointField::TargetHumidity)));
    assert!((app.setpoints().target_humidity - 56.0).abs() < f32::EPSILON);
    let stored = app.store().port().stored().unwrap();
    assert!((stored.target_humidity - 56.0).abs() < f32::EPSILON);
}
