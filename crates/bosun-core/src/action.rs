//! Keyboard-shortcut surface.
//!
//! The host application owns the actual key bindings; it translates them
//! into [`Action`]s and dispatches them into the workspace.

use crate::error::WorkspaceError;
use crate::workspace::{CreateParams, Workspace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    NewSession,
    NewGroup,
    CloseActiveSession,
    FocusNext,
    FocusPrevious,
    /// 1-based session index; out-of-range is a no-op.
    FocusIndex(u8),
}

impl Workspace {
    pub fn dispatch(&mut self, action: Action) -> Result<(), WorkspaceError> {
        match action {
            Action::NewSession => {
                let n = self.session_count() + 1;
                self.create_session(CreateParams::named(format!("Terminal {n}")))
                    .map(|_| ())
            }
            Action::NewGroup => {
                let n = self.group_count() + 1;
                self.create_group(format!("Group {n}"));
                Ok(())
            }
            Action::CloseActiveSession => match self.active_session_id() {
                Some(id) => self.delete_session(id),
                None => Ok(()),
            },
            Action::FocusNext => {
                self.focus_next();
                Ok(())
            }
            Action::FocusPrevious => {
                self.focus_previous();
                Ok(())
            }
            Action::FocusIndex(index) => {
                self.focus_by_index(index as usize);
                Ok(())
            }
        }
    }
}
