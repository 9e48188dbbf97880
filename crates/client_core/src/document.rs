//! In-memory rendition of the dashboard page.
//!
//! A `Document` is what the server-side template would have rendered: the
//! hidden token field, the student table, the add-student dialog and the
//! count badge. It serializes to JSON so a page can be loaded from and saved
//! to a snapshot file.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use shared::{
    domain::{GradeBadge, Marks, NotificationId, Severity, StudentId},
    protocol::StudentForm,
};

use crate::{
    notify::Notification,
    page::{Control, ExitAnimation, Page, RowControl, RowElement, RowView},
};

pub type ConfirmHandler = Box<dyn FnMut(&str) -> bool + Send>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowControls {
    pub edit: Control,
    pub save: Control,
    pub cancel: Control,
    pub delete: Control,
}

impl Default for RowControls {
    fn default() -> Self {
        Self {
            edit: Control::new("Edit"),
            save: Control::new("Save"),
            cancel: Control::new("Cancel"),
            delete: Control::new("Delete"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowNode {
    pub student_id: StudentId,
    pub name: String,
    #[serde(default)]
    pub subject_name: String,
    pub marks_text: String,
    #[serde(default)]
    pub input_value: String,
    #[serde(default)]
    pub badge: Option<GradeBadge>,
    #[serde(default)]
    pub view: RowView,
    #[serde(default)]
    pub controls: RowControls,
    #[serde(default)]
    pub input_focused: bool,
    #[serde(default)]
    pub exit_animation: Option<ExitAnimation>,
}

impl RowNode {
    pub fn new(
        student_id: StudentId,
        name: impl Into<String>,
        subject_name: impl Into<String>,
        marks: Marks,
    ) -> Self {
        Self {
            student_id,
            name: name.into(),
            subject_name: subject_name.into(),
            marks_text: marks.to_string(),
            input_value: marks.to_string(),
            badge: Some(GradeBadge::for_marks(marks)),
            view: RowView::Viewing,
            controls: RowControls::default(),
            input_focused: false,
            exit_animation: None,
        }
    }

    pub fn is_visible(&self, control: RowControl) -> bool {
        self.view.shows(control)
    }
}

impl RowElement for RowNode {
    fn student_id(&self) -> StudentId {
        self.student_id
    }

    fn display_name(&self) -> String {
        self.name.trim().to_string()
    }

    fn marks_text(&self) -> String {
        self.marks_text.clone()
    }

    fn set_marks_text(&mut self, text: &str) {
        self.marks_text = text.to_string();
    }

    fn input_value(&self) -> String {
        self.input_value.clone()
    }

    fn set_input_value(&mut self, value: &str) {
        self.input_value = value.to_string();
    }

    fn focus_input(&mut self) {
        self.input_focused = true;
    }

    fn show(&mut self, view: RowView) {
        self.view = view;
        if view == RowView::Viewing {
            self.input_focused = false;
        }
    }

    fn set_grade_badge(&mut self, badge: GradeBadge) {
        self.badge = Some(badge);
    }

    fn control(&self, control: RowControl) -> &Control {
        match control {
            RowControl::Edit => &self.controls.edit,
            RowControl::Save => &self.controls.save,
            RowControl::Cancel => &self.controls.cancel,
            RowControl::Delete => &self.controls.delete,
        }
    }

    fn control_mut(&mut self, control: RowControl) -> &mut Control {
        match control {
            RowControl::Edit => &mut self.controls.edit,
            RowControl::Save => &mut self.controls.save,
            RowControl::Cancel => &mut self.controls.cancel,
            RowControl::Delete => &mut self.controls.delete,
        }
    }

    fn begin_exit(&mut self, animation: ExitAnimation) {
        self.exit_animation = Some(animation);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDialog {
    #[serde(default)]
    pub open: bool,
    #[serde(default)]
    pub form: StudentForm,
    pub submit: Control,
}

impl Default for CreateDialog {
    fn default() -> Self {
        Self {
            open: false,
            form: StudentForm::default(),
            submit: Control::new("Add Student"),
        }
    }
}

#[derive(Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub hidden_inputs: BTreeMap<String, String>,
    #[serde(default)]
    pub rows: Vec<RowNode>,
    #[serde(default)]
    pub create_dialog: CreateDialog,
    /// Newest first.
    #[serde(default)]
    pub notifications: Vec<Notification>,
    #[serde(default)]
    pub count_indicator: Option<String>,
    #[serde(default)]
    pub reload_count: u32,
    #[serde(default)]
    pub prompts: Vec<String>,
    #[serde(skip)]
    confirm_handler: Option<ConfirmHandler>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hidden_input(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.hidden_inputs.insert(name.into(), value.into());
        self
    }

    pub fn with_row(mut self, row: RowNode) -> Self {
        self.rows.push(row);
        self
    }

    pub fn with_count_text(mut self, text: impl Into<String>) -> Self {
        self.count_indicator = Some(text.into());
        self
    }

    /// Without a handler every confirmation prompt is declined.
    pub fn on_confirm<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&str) -> bool + Send + 'static,
    {
        self.confirm_handler = Some(Box::new(handler));
        self
    }

    pub fn set_confirm_handler(&mut self, handler: ConfirmHandler) {
        self.confirm_handler = Some(handler);
    }

    pub fn open_create_dialog(&mut self, form: StudentForm) {
        self.create_dialog.open = true;
        self.create_dialog.form = form;
    }

    pub fn find_row(&self, student_id: StudentId) -> Option<&RowNode> {
        self.rows.iter().find(|row| row.student_id == student_id)
    }

    pub fn messages(&self) -> Vec<(Severity, String)> {
        self.notifications
            .iter()
            .map(|n| (n.severity, n.message.clone()))
            .collect()
    }
}

impl Page for Document {
    type Row = RowNode;

    fn hidden_input_value(&self, name: &str) -> Option<String> {
        self.hidden_inputs.get(name).cloned()
    }

    fn row_ids(&self) -> Vec<StudentId> {
        self.rows.iter().map(|row| row.student_id).collect()
    }

    fn row(&self, student_id: StudentId) -> Option<&RowNode> {
        self.find_row(student_id)
    }

    fn row_mut(&mut self, student_id: StudentId) -> Option<&mut RowNode> {
        self.rows.iter_mut().find(|row| row.student_id == student_id)
    }

    fn remove_row(&mut self, student_id: StudentId) -> bool {
        let before = self.rows.len();
        self.rows.retain(|row| row.student_id != student_id);
        self.rows.len() != before
    }

    fn create_dialog_open(&self) -> bool {
        self.create_dialog.open
    }

    fn create_form(&self) -> StudentForm {
        self.create_dialog.form.clone()
    }

    fn submit_control(&self) -> &Control {
        &self.create_dialog.submit
    }

    fn submit_control_mut(&mut self) -> &mut Control {
        &mut self.create_dialog.submit
    }

    fn close_create_dialog(&mut self) {
        self.create_dialog.open = false;
        self.create_dialog.form = StudentForm::default();
    }

    fn insert_notification(&mut self, notification: Notification) {
        self.notifications.insert(0, notification);
    }

    fn remove_notification(&mut self, id: NotificationId) -> bool {
        let before = self.notifications.len();
        self.notifications.retain(|n| n.id != id);
        self.notifications.len() != before
    }

    fn count_text(&self) -> Option<String> {
        self.count_indicator.clone()
    }

    fn set_count_text(&mut self, text: String) {
        self.count_indicator = Some(text);
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.prompts.push(message.to_string());
        match self.confirm_handler.as_mut() {
            Some(handler) => handler(message),
            None => false,
        }
    }

    fn reload(&mut self) {
        self.reload_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64) -> RowNode {
        RowNode::new(
            StudentId(id),
            " Ada Lovelace ",
            "Maths",
            Marks::new(91.0).expect("marks"),
        )
    }

    #[test]
    fn rendered_row_starts_in_viewing_with_badge() {
        let row = row(1);
        assert_eq!(row.view, RowView::Viewing);
        assert!(row.is_visible(RowControl::Edit));
        assert!(!row.is_visible(RowControl::Save));
        assert_eq!(row.display_name(), "Ada Lovelace");
        assert_eq!(row.badge.map(|b| b.grade.label()), Some("A+"));
    }

    #[test]
    fn notifications_stack_newest_first() {
        let mut doc = Document::new();
        doc.insert_notification(Notification::new(NotificationId(1), Severity::Success, "one"));
        doc.insert_notification(Notification::new(NotificationId(2), Severity::Danger, "two"));
        assert_eq!(doc.notifications[0].message, "two");
        assert!(doc.remove_notification(NotificationId(1)));
        assert!(!doc.remove_notification(NotificationId(1)));
    }

    #[test]
    fn confirm_defaults_to_decline_and_records_prompt() {
        let mut doc = Document::new();
        assert!(!doc.confirm("Are you sure?"));
        let mut doc = Document::new().on_confirm(|_| true);
        assert!(doc.confirm("Are you sure?"));
        assert_eq!(doc.prompts, vec!["Are you sure?".to_string()]);
    }

    #[test]
    fn closing_dialog_resets_form() {
        let mut doc = Document::new();
        doc.open_create_dialog(StudentForm {
            name: "Grace".into(),
            subject_name: "Physics".into(),
            marks: "77".into(),
        });
        doc.close_create_dialog();
        assert!(!doc.create_dialog.open);
        assert!(doc.create_form().is_blank());
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let doc = Document::new()
            .with_hidden_input("csrfmiddlewaretoken", "tok")
            .with_row(row(3))
            .with_count_text("Total Students: 1");
        let json = serde_json::to_string(&doc).expect("serialize");
        let restored: Document = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored.rows, doc.rows);
        assert_eq!(restored.count_indicator.as_deref(), Some("Total Students: 1"));
        assert_eq!(
            restored.hidden_input_value("csrfmiddlewaretoken").as_deref(),
            Some("tok")
        );
    }
}
