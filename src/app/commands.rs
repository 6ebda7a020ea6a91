//! Inbound commands to the application service.
//!
//! These are the discrete operator actions a confirmed switch press
//! produces.  Each switch is bound to one variant; the
//! [`AppService`](super::service::AppService) dispatches them to the pager.

/// Operator commands from the front-panel switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    /// Move the cursor up, or step the edited value up.
    CursorUp,

    /// Move the cursor down, or step the edited value down.
    CursorDown,

    /// Enter edit mode on the selected field, or commit the edit.
    Enter,

    /// Advance to the next page (cancels an edit in progress).
    NextPage,
}
