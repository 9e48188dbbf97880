//! The page capability: everything the controller is allowed to read or
//! change on the rendered dashboard.

use serde::{Deserialize, Serialize};
use shared::{
    domain::{GradeBadge, NotificationId, StudentId},
    protocol::StudentForm,
};

use crate::notify::Notification;

/// Which control set a row shows. A row is always in exactly one view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowView {
    #[default]
    Viewing,
    Editing,
}

impl RowView {
    pub fn visible_controls(self) -> [RowControl; 2] {
        match self {
            RowView::Viewing => [RowControl::Edit, RowControl::Delete],
            RowView::Editing => [RowControl::Save, RowControl::Cancel],
        }
    }

    pub fn shows(self, control: RowControl) -> bool {
        self.visible_controls().contains(&control)
    }

    /// The score is shown as text while viewing and as an input while editing.
    pub fn shows_marks_input(self) -> bool {
        self == RowView::Editing
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowControl {
    Edit,
    Save,
    Cancel,
    Delete,
}

/// A button: its current label and whether it accepts clicks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Control {
    pub label: String,
    #[serde(default)]
    pub disabled: bool,
}

impl Control {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            disabled: false,
        }
    }
}

/// Fade and slide applied to a row before it leaves the table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExitAnimation {
    pub duration_ms: u64,
    pub opacity: f32,
    pub translate_x_px: i32,
}

impl ExitAnimation {
    pub fn fade_slide(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            opacity: 0.0,
            translate_x_px: -20,
        }
    }
}

/// Typed handle to one table row and its editable sub-elements.
pub trait RowElement {
    fn student_id(&self) -> StudentId;
    /// Text of the row's first cell.
    fn display_name(&self) -> String;
    fn marks_text(&self) -> String;
    fn set_marks_text(&mut self, text: &str);
    fn input_value(&self) -> String;
    fn set_input_value(&mut self, value: &str);
    /// Focus the score input and select its contents.
    fn focus_input(&mut self);
    fn show(&mut self, view: RowView);
    fn set_grade_badge(&mut self, badge: GradeBadge);
    fn control(&self, control: RowControl) -> &Control;
    fn control_mut(&mut self, control: RowControl) -> &mut Control;
    fn begin_exit(&mut self, animation: ExitAnimation);
}

pub trait Page: Send + 'static {
    type Row: RowElement;

    fn hidden_input_value(&self, name: &str) -> Option<String>;

    /// Rows present in the table, in display order.
    fn row_ids(&self) -> Vec<StudentId>;
    fn row(&self, student_id: StudentId) -> Option<&Self::Row>;
    fn row_mut(&mut self, student_id: StudentId) -> Option<&mut Self::Row>;
    /// Returns false when the row was already gone.
    fn remove_row(&mut self, student_id: StudentId) -> bool;

    fn create_dialog_open(&self) -> bool;
    fn create_form(&self) -> StudentForm;
    fn submit_control(&self) -> &Control;
    fn submit_control_mut(&mut self) -> &mut Control;
    /// Hides the add-student dialog and resets its form.
    fn close_create_dialog(&mut self);

    /// Inserts at the top of the main container, above older notifications.
    fn insert_notification(&mut self, notification: Notification);
    /// Returns false when the notification was already gone.
    fn remove_notification(&mut self, id: NotificationId) -> bool;

    fn count_text(&self) -> Option<String>;
    fn set_count_text(&mut self, text: String);

    /// Blocking yes/no prompt.
    fn confirm(&mut self, message: &str) -> bool;
    fn reload(&mut self);
}
