use tracing::debug;

use crate::page::RowView;

/// Alive only while a row is being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub original_marks: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RowMode {
    #[default]
    Viewing,
    Editing(EditSession),
}

impl RowMode {
    pub fn view(&self) -> RowView {
        match self {
            RowMode::Viewing => RowView::Viewing,
            RowMode::Editing(_) => RowView::Editing,
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, RowMode::Editing(_))
    }

    /// Viewing -> Editing, caching the displayed score. Returns false if the
    /// row was already editing; the first session's original is kept.
    pub fn begin_edit(&mut self, current_marks: &str) -> bool {
        if self.is_editing() {
            debug!("row already editing, keeping original value");
            return false;
        }
        *self = RowMode::Editing(EditSession {
            original_marks: current_marks.trim().to_string(),
        });
        true
    }

    /// Editing -> Viewing without saving. Yields the cached original.
    pub fn cancel(&mut self) -> Option<String> {
        match std::mem::take(self) {
            RowMode::Editing(session) => Some(session.original_marks),
            RowMode::Viewing => None,
        }
    }

    /// Editing -> Viewing after a successful save; the session is discarded.
    pub fn commit(&mut self) -> bool {
        let was_editing = self.is_editing();
        *self = RowMode::Viewing;
        was_editing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_then_cancel_restores_original() {
        let mut mode = RowMode::default();
        assert!(mode.begin_edit(" 72.5 "));
        assert_eq!(mode.view(), RowView::Editing);
        assert_eq!(mode.cancel().as_deref(), Some("72.5"));
        assert_eq!(mode, RowMode::Viewing);
    }

    #[test]
    fn second_begin_edit_keeps_first_original() {
        let mut mode = RowMode::default();
        mode.begin_edit("40");
        assert!(!mode.begin_edit("99"));
        assert_eq!(mode.cancel().as_deref(), Some("40"));
    }

    #[test]
    fn cancel_and_commit_while_viewing_are_noops() {
        let mut mode = RowMode::Viewing;
        assert_eq!(mode.cancel(), None);
        assert!(!mode.commit());
        assert_eq!(mode.view(), RowView::Viewing);
    }

    #[test]
    fn commit_discards_session() {
        let mut mode = RowMode::default();
        mode.begin_edit("10");
        assert!(mode.commit());
        assert_eq!(mode, RowMode::Viewing);
    }
}
