//! Menu state machine behind the front-panel display.
//!
//! Pages cycle `Overview → Setpoints → Faults → Overview`.  On the
//! setpoints page the cursor wraps over every [`SetpointField`]; `Enter`
//! opens an edit buffer on the selected field and a second `Enter`
//! commits it through the [`SetpointStore`].  Leaving the page drops an
//! uncommitted edit.  Drawing is the renderer's job; it reads
//! [`Pager::view`].

use log::{debug, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::{FieldValue, SetpointConfig, SetpointField, SetpointStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Overview,
    Setpoints,
    Faults,
}

impl Page {
    pub fn next(self) -> Self {
        match self {
            Self::Overview => Self::Setpoints,
            Self::Setpoints => Self::Faults,
            Self::Faults => Self::Overview,
        }
    }
}

/// Snapshot of what the display should show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PagerView {
    pub page: Page,
    /// Selected field (setpoints page only).
    pub cursor: Option<SetpointField>,
    /// Edit buffer, when editing.
    pub editing: Option<FieldValue>,
}

impl PagerView {
    /// Value to display for `field`: the edit buffer for the field being
    /// edited, the live setpoint otherwise.
    pub fn value_of(&self, field: SetpointField, setpoints: &SetpointConfig) -> FieldValue {
        match (self.cursor, self.editing) {
            (Some(selected), Some(buf)) if selected == field => buf,
            _ => setpoints.get(field),
        }
    }
}

#[derive(Debug)]
pub struct Pager {
    page: Page,
    cursor: usize,
    edit: Option<FieldValue>,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new()
    }
}

impl Pager {
    pub fn new() -> Self {
        Self {
            page: Page::Overview,
            cursor: 0,
            edit: None,
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn selected(&self) -> SetpointField {
        SetpointField::ALL[self.cursor]
    }

    pub fn is_editing(&self) -> bool {
        self.edit.is_some()
    }

    pub fn view(&self) -> PagerView {
        let on_setpoints = self.page == Page::Setpoints;
        PagerView {
            page: self.page,
            cursor: on_setpoints.then(|| self.selected()),
            editing: self.edit,
        }
    }

    pub fn next_page(&mut self) {
        if let Some(buf) = self.edit.take() {
            debug!("pager: edit of {} dropped ({:?})", self.selected().label(), buf);
        }
        self.page = self.page.next();
    }

    pub fn cursor_up(&mut self) {
        if self.page != Page::Setpoints {
            return;
        }
        match self.edit.as_mut() {
            Some(buf) => *buf = buf.step_up(),
            None => {
                self.cursor = self
                    .cursor
                    .checked_sub(1)
                    .unwrap_or(SetpointField::ALL.len() - 1);
            }
        }
    }

    pub fn cursor_down(&mut self) {
        if self.page != Page::Setpoints {
            return;
        }
        match self.edit.as_mut() {
            Some(buf) => *buf = buf.step_down(),
            None => self.cursor = (self.cursor + 1) % SetpointField::ALL.len(),
        }
    }

    /// Toggle edit mode on the selected field.  Leaving edit mode commits
    /// the buffer; the store's answer is passed back (`Ok(true)` when a
    /// new value was written).
    pub fn enter<P: ConfigPort>(
        &mut self,
        store: &mut SetpointStore<P>,
    ) -> Result<bool, ConfigError> {
        if self.page != Page::Setpoints {
            return Ok(false);
        }
        let field = self.selected();
        match self.edit.take() {
            None => {
                self.edit = Some(store.setpoints().get(field));
                Ok(false)
            }
            Some(buf) => store.set(field, buf).inspect_err(|e| {
                warn!("pager: {} not saved: {}", field.label(), e);
            }),
        }
    }
}
