use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::Duration,
};

use shared::{
    domain::{GradeBadge, Marks, NotificationId, Severity, StudentId},
    error::ServerRejection,
    protocol::{ActionResponse, UpdateMarksForm},
};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::{
    error::{ControllerError, TransportError},
    notify::{Notification, NotificationIds},
    page::{Control, ExitAnimation, Page, RowControl, RowElement, RowView},
    row::RowMode,
    settings::ControllerSettings,
    transport::{CsrfToken, StudentApi},
    validation::{decrement_count_text, parse_marks_input, MARKS_RANGE_WARNING},
};

pub const ADDING_LABEL: &str = "Adding...";
pub const SPINNER_LABEL: &str = "\u{231b}";

const STUDENT_ADDED: &str = "Student added successfully!";
const STUDENT_ADD_FAILED: &str = "An error occurred while adding the student.";
const MARKS_UPDATED: &str = "Marks updated successfully!";
const MARKS_UPDATE_FAILED: &str = "Failed to update marks.";
const STUDENT_DELETED: &str = "Student deleted successfully!";
const STUDENT_DELETE_FAILED: &str = "Failed to delete student.";

/// User interactions the controller listens for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    SubmitCreate,
    EditClicked(StudentId),
    SaveClicked(StudentId),
    CancelClicked(StudentId),
    DeleteClicked(StudentId),
    KeyPressed { student_id: StudentId, key: String },
    DismissNotification(NotificationId),
}

impl PageEvent {
    fn name(&self) -> &'static str {
        match self {
            PageEvent::SubmitCreate => "submit_create",
            PageEvent::EditClicked(_) => "edit_clicked",
            PageEvent::SaveClicked(_) => "save_clicked",
            PageEvent::CancelClicked(_) => "cancel_clicked",
            PageEvent::DeleteClicked(_) => "delete_clicked",
            PageEvent::KeyPressed { .. } => "key_pressed",
            PageEvent::DismissNotification(_) => "dismiss_notification",
        }
    }

    fn row_target(&self) -> Option<(StudentId, RowControl)> {
        match self {
            PageEvent::EditClicked(id) => Some((*id, RowControl::Edit)),
            PageEvent::SaveClicked(id) => Some((*id, RowControl::Save)),
            PageEvent::CancelClicked(id) => Some((*id, RowControl::Cancel)),
            PageEvent::DeleteClicked(id) => Some((*id, RowControl::Delete)),
            // Enter in the score input acts like the save control.
            PageEvent::KeyPressed { student_id, .. } => Some((*student_id, RowControl::Save)),
            PageEvent::SubmitCreate | PageEvent::DismissNotification(_) => None,
        }
    }
}

/// Read-only values fixed at page load and shared by every workflow.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub csrf_token: CsrfToken,
    pub notification_ttl: Duration,
    pub reload_delay: Duration,
    pub row_exit: Duration,
}

impl PageContext {
    pub fn from_page<P: Page>(
        page: &P,
        settings: &ControllerSettings,
    ) -> Result<Self, ControllerError> {
        let field = settings.csrf_field_name.clone();
        let token = page
            .hidden_input_value(&field)
            .ok_or_else(|| ControllerError::MissingCsrfToken {
                field: field.clone(),
            })?;
        if token.trim().is_empty() {
            return Err(ControllerError::EmptyCsrfToken { field });
        }

        Ok(Self {
            csrf_token: CsrfToken::new(token.trim()),
            notification_ttl: settings.notification_ttl(),
            reload_delay: settings.reload_delay(),
            row_exit: settings.row_exit(),
        })
    }
}

/// A control showing its loading label for the length of one request.
/// Releasing consumes the guard, so a control is restored exactly once.
#[must_use]
struct BusyControl {
    original_label: String,
}

impl BusyControl {
    fn engage(control: &mut Control, loading_label: &str) -> Self {
        let original_label = std::mem::replace(&mut control.label, loading_label.to_string());
        control.disabled = true;
        Self { original_label }
    }

    fn release(self, control: &mut Control) {
        control.label = self.original_label;
        control.disabled = false;
    }
}

struct PageState<P> {
    page: P,
    modes: HashMap<StudentId, RowMode>,
}

pub struct StudentController<P: Page, A: StudentApi> {
    state: Arc<Mutex<PageState<P>>>,
    api: A,
    context: Arc<PageContext>,
    bound_rows: HashSet<StudentId>,
    notification_ids: NotificationIds,
}

impl<P: Page, A: StudentApi> StudentController<P, A> {
    /// Reads the anti-forgery token and binds every row rendered at load.
    /// Rows that appear later are not bound.
    pub fn initialize(
        page: P,
        api: A,
        settings: &ControllerSettings,
    ) -> Result<Self, ControllerError> {
        let context = PageContext::from_page(&page, settings)?;
        let bound_rows: HashSet<StudentId> = page.row_ids().into_iter().collect();
        let modes = bound_rows
            .iter()
            .map(|id| (*id, RowMode::Viewing))
            .collect();
        info!(rows = bound_rows.len(), "student controller initialized");

        Ok(Self {
            state: Arc::new(Mutex::new(PageState { page, modes })),
            api,
            context: Arc::new(context),
            bound_rows,
            notification_ids: NotificationIds::default(),
        })
    }

    pub fn context(&self) -> &PageContext {
        &self.context
    }

    pub fn is_bound(&self, student_id: StudentId) -> bool {
        self.bound_rows.contains(&student_id)
    }

    pub async fn with_page<R>(&self, f: impl FnOnce(&P) -> R) -> R {
        let state = self.state.lock().await;
        f(&state.page)
    }

    pub async fn with_page_mut<R>(&self, f: impl FnOnce(&mut P) -> R) -> R {
        let mut state = self.state.lock().await;
        f(&mut state.page)
    }

    pub async fn row_mode(&self, student_id: StudentId) -> Option<RowMode> {
        self.state.lock().await.modes.get(&student_id).cloned()
    }

    pub async fn dispatch(&self, event: PageEvent) {
        if let Some((student_id, control)) = event.row_target() {
            if !self.accepts_row_event(student_id, control).await {
                debug!(event = event.name(), student_id = student_id.0, "row event ignored");
                return;
            }
        }

        match event {
            PageEvent::SubmitCreate => self.submit_create().await,
            PageEvent::EditClicked(id) => self.enter_edit_mode(id).await,
            PageEvent::SaveClicked(id) => self.save_marks(id).await,
            PageEvent::CancelClicked(id) => self.cancel_edit(id).await,
            PageEvent::DeleteClicked(id) => self.delete_student(id).await,
            PageEvent::KeyPressed { student_id, key } => {
                if key == "Enter" {
                    self.save_marks(student_id).await;
                }
            }
            PageEvent::DismissNotification(id) => {
                let removed = self.state.lock().await.page.remove_notification(id);
                debug!(notification = id.0, removed, "notification dismissed");
            }
        }
    }

    /// Only bound rows react, and only through controls that are visible and
    /// enabled in the row's current view.
    async fn accepts_row_event(&self, student_id: StudentId, control: RowControl) -> bool {
        if !self.is_bound(student_id) {
            return false;
        }
        let state = self.state.lock().await;
        let Some(row) = state.page.row(student_id) else {
            return false;
        };
        let view = state
            .modes
            .get(&student_id)
            .map(RowMode::view)
            .unwrap_or_default();
        view.shows(control) && !row.control(control).disabled
    }

    async fn submit_create(&self) {
        let (form, busy) = {
            let mut state = self.state.lock().await;
            if !state.page.create_dialog_open() {
                debug!("create submitted with dialog closed");
                return;
            }
            if state.page.submit_control().disabled {
                debug!("create already in flight");
                return;
            }
            let form = state.page.create_form();
            let busy = BusyControl::engage(state.page.submit_control_mut(), ADDING_LABEL);
            (form, busy)
        };

        let outcome = self
            .api
            .create_student(&form, &self.context.csrf_token)
            .await;

        let mut state = self.state.lock().await;
        match settle(outcome) {
            Ok(()) => {
                info!(name = %form.name, subject = %form.subject_name, "student added");
                state.page.close_create_dialog();
                self.notify(&mut state.page, Severity::Success, STUDENT_ADDED);
                self.schedule_reload();
            }
            Err(Failure::Rejected(rejection)) => {
                warn!(%rejection, "add student rejected");
                self.notify_rejection(&mut state.page, &rejection);
            }
            Err(Failure::Transport(err)) => {
                error!(error = %err, "error adding student");
                self.notify(&mut state.page, Severity::Danger, STUDENT_ADD_FAILED);
            }
        }
        busy.release(state.page.submit_control_mut());
    }

    async fn enter_edit_mode(&self, student_id: StudentId) {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let Some(row) = state.page.row_mut(student_id) else {
            return;
        };
        let current = row.marks_text();
        let mode = state.modes.entry(student_id).or_default();
        if !mode.begin_edit(&current) {
            return;
        }

        row.set_input_value(current.trim());
        row.show(RowView::Editing);
        row.focus_input();
        debug!(student_id = student_id.0, "row entered edit mode");
    }

    async fn cancel_edit(&self, student_id: StudentId) {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let Some(original) = state
            .modes
            .get_mut(&student_id)
            .and_then(RowMode::cancel)
        else {
            return;
        };
        if let Some(row) = state.page.row_mut(student_id) {
            row.set_input_value(&original);
            row.show(RowView::Viewing);
        }
        debug!(student_id = student_id.0, "edit cancelled");
    }

    async fn save_marks(&self, student_id: StudentId) {
        let (marks, busy) = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;
            if !state
                .modes
                .get(&student_id)
                .is_some_and(RowMode::is_editing)
            {
                return;
            }
            let Some(row) = state.page.row_mut(student_id) else {
                return;
            };

            match parse_marks_input(&row.input_value()) {
                Ok(marks) => {
                    let busy =
                        BusyControl::engage(row.control_mut(RowControl::Save), SPINNER_LABEL);
                    (marks, busy)
                }
                Err(err) => {
                    debug!(student_id = student_id.0, error = %err, "marks input rejected");
                    self.notify(&mut state.page, Severity::Warning, MARKS_RANGE_WARNING);
                    return;
                }
            }
        };

        let outcome = self
            .api
            .update_marks(student_id, UpdateMarksForm { marks }, &self.context.csrf_token)
            .await;

        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        match settle(outcome) {
            Ok(()) => {
                info!(student_id = student_id.0, marks = marks.value(), "marks updated");
                if let Some(mode) = state.modes.get_mut(&student_id) {
                    mode.commit();
                }
                if let Some(row) = state.page.row_mut(student_id) {
                    show_saved_marks(row, marks);
                }
                self.notify(&mut state.page, Severity::Success, MARKS_UPDATED);
            }
            Err(Failure::Rejected(rejection)) => {
                warn!(student_id = student_id.0, %rejection, "marks update rejected");
                self.notify_rejection(&mut state.page, &rejection);
            }
            Err(Failure::Transport(err)) => {
                error!(student_id = student_id.0, error = %err, "error updating marks");
                self.notify(&mut state.page, Severity::Danger, MARKS_UPDATE_FAILED);
            }
        }
        if let Some(row) = state.page.row_mut(student_id) {
            busy.release(row.control_mut(RowControl::Save));
        }
    }

    async fn delete_student(&self, student_id: StudentId) {
        let busy = {
            let mut state = self.state.lock().await;
            let Some(name) = state.page.row(student_id).map(|row| row.display_name()) else {
                return;
            };
            if !state
                .page
                .confirm(&format!("Are you sure you want to delete {name}?"))
            {
                debug!(student_id = student_id.0, "delete declined");
                return;
            }
            let Some(row) = state.page.row_mut(student_id) else {
                return;
            };
            BusyControl::engage(row.control_mut(RowControl::Delete), SPINNER_LABEL)
        };

        let outcome = self
            .api
            .delete_student(student_id, &self.context.csrf_token)
            .await;

        let mut state = self.state.lock().await;
        match settle(outcome) {
            Ok(()) => {
                info!(student_id = student_id.0, "student deleted");
                let exit_ms = self.context.row_exit.as_millis() as u64;
                if let Some(row) = state.page.row_mut(student_id) {
                    row.begin_exit(ExitAnimation::fade_slide(exit_ms));
                }
                self.schedule_row_removal(student_id);
                self.notify(&mut state.page, Severity::Success, STUDENT_DELETED);
            }
            Err(Failure::Rejected(rejection)) => {
                warn!(student_id = student_id.0, %rejection, "delete rejected");
                self.notify_rejection(&mut state.page, &rejection);
            }
            Err(Failure::Transport(err)) => {
                error!(student_id = student_id.0, error = %err, "error deleting student");
                self.notify(&mut state.page, Severity::Danger, STUDENT_DELETE_FAILED);
            }
        }
        if let Some(row) = state.page.row_mut(student_id) {
            busy.release(row.control_mut(RowControl::Delete));
        }
    }

    fn notify(&self, page: &mut P, severity: Severity, message: &str) -> NotificationId {
        let id = self.notification_ids.next();
        page.insert_notification(Notification::new(id, severity, message));
        self.schedule(self.context.notification_ttl, move |state| {
            if !state.page.remove_notification(id) {
                debug!(notification = id.0, "notification already dismissed");
            }
        });
        id
    }

    fn notify_rejection(&self, page: &mut P, rejection: &ServerRejection) {
        for message in rejection.messages() {
            self.notify(page, Severity::Danger, &message);
        }
    }

    fn schedule_reload(&self) {
        self.schedule(self.context.reload_delay, |state| {
            info!("reloading page");
            state.page.reload();
        });
    }

    fn schedule_row_removal(&self, student_id: StudentId) {
        self.schedule(self.context.row_exit, move |state| {
            state.modes.remove(&student_id);
            if !state.page.remove_row(student_id) {
                debug!(student_id = student_id.0, "row already removed");
                return;
            }
            let updated = state.page.count_text().and_then(|t| decrement_count_text(&t));
            if let Some(text) = updated {
                state.page.set_count_text(text);
            }
        });
    }

    /// Fire-and-forget timer. The callback must tolerate its target having
    /// disappeared in the meantime.
    fn schedule<F>(&self, delay: Duration, action: F)
    where
        F: FnOnce(&mut PageState<P>) + Send + 'static,
    {
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut guard = state.lock().await;
            action(&mut *guard);
        });
    }
}

fn show_saved_marks<R: RowElement>(row: &mut R, marks: Marks) {
    let text = marks.to_string();
    row.set_marks_text(&text);
    row.set_input_value(&text);
    row.set_grade_badge(GradeBadge::for_marks(marks));
    row.show(RowView::Viewing);
}

enum Failure {
    Rejected(ServerRejection),
    Transport(TransportError),
}

fn settle(outcome: Result<ActionResponse, TransportError>) -> Result<(), Failure> {
    outcome
        .map_err(Failure::Transport)?
        .into_result()
        .map_err(Failure::Rejected)
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
