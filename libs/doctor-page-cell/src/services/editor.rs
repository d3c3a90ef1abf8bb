use tracing::debug;

use crate::error::PageError;
use crate::models::{Appointment, AppointmentStatus, FieldEdit};

/// One appointment checked out for editing.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    appointment_id: String,
    buffer: Appointment,
}

impl EditSession {
    pub fn appointment_id(&self) -> &str {
        &self.appointment_id
    }

    pub fn buffer(&self) -> &Appointment {
        &self.buffer
    }
}

/// Viewing (`None`) or Editing (`Some`). At most one appointment is edited at a time.
#[derive(Debug, Clone, Default)]
pub struct Editor {
    session: Option<EditSession>,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_editing(&self) -> bool {
        self.session.is_some()
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.session.as_ref().map(EditSession::appointment_id)
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    /// The buffer, if `appointment_id` is the one being edited.
    pub fn buffer_for(&self, appointment_id: &str) -> Option<&Appointment> {
        self.session
            .as_ref()
            .filter(|s| s.appointment_id == appointment_id)
            .map(EditSession::buffer)
    }

    /// Copies `appointment` into the buffer. Re-opening the row already being edited
    /// keeps the existing buffer.
    pub fn begin(&mut self, appointment: &Appointment) -> Result<&EditSession, PageError> {
        if let Some(current) = &self.session {
            if current.appointment_id != appointment.id {
                return Err(PageError::AlreadyEditing(current.appointment_id.clone()));
            }
        } else {
            debug!("Editing appointment {}", appointment.id);
            self.session = Some(EditSession {
                appointment_id: appointment.id.clone(),
                buffer: appointment.clone(),
            });
        }

        self.session.as_ref().ok_or(PageError::NotEditing)
    }

    pub fn apply(&mut self, edit: &FieldEdit) -> Result<&Appointment, PageError> {
        let session = self.session.as_mut().ok_or(PageError::NotEditing)?;

        edit.validate()
            .map_err(|reason| PageError::InvalidField { field: edit.field, reason })?;
        edit.apply_to(&mut session.buffer);

        Ok(&session.buffer)
    }

    /// Keeps an open buffer in step with a status change acknowledged by the backend,
    /// so a later save does not revert it.
    pub fn sync_status(&mut self, appointment_id: &str, status: &AppointmentStatus) {
        if let Some(session) = self.session.as_mut().filter(|s| s.appointment_id == appointment_id) {
            session.buffer.set_status(status);
        }
    }

    pub fn cancel(&mut self) -> Option<EditSession> {
        let discarded = self.session.take();
        if let Some(session) = &discarded {
            debug!("Discarded edits to appointment {}", session.appointment_id);
        }
        discarded
    }

    /// Closes the session only if it is still the one for `appointment_id`.
    pub fn close_if(&mut self, appointment_id: &str) -> Option<EditSession> {
        if self.editing_id() == Some(appointment_id) {
            self.session.take()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppointmentField, Scalar};
    use assert_matches::assert_matches;
    use serde_json::Map;

    fn appointment(id: &str) -> Appointment {
        Appointment {
            id: id.to_string(),
            patient_name: Some(Scalar::text("Jo")),
            patient_contact_no: None,
            patient_email: None,
            appno: None,
            date: Some(Scalar::text("2024-03-01")),
            day: None,
            time: None,
            msg: None,
            purpose: None,
            status: Some(Scalar::text(AppointmentStatus::PENDING)),
            age: None,
            extra: Map::new(),
        }
    }

    #[test]
    fn test_begin_copies_into_buffer() {
        let source = appointment("a1");
        let mut editor = Editor::new();

        editor.begin(&source).unwrap();
        editor.apply(&FieldEdit::new(AppointmentField::Date, "2024-04-02")).unwrap();

        assert_eq!(source.date, Some(Scalar::text("2024-03-01")));
        assert_eq!(editor.buffer_for("a1").unwrap().date, Some(Scalar::text("2024-04-02")));
        assert!(editor.buffer_for("a2").is_none());
    }

    #[test]
    fn test_second_row_is_rejected() {
        let mut editor = Editor::new();
        editor.begin(&appointment("a1")).unwrap();

        assert_matches!(editor.begin(&appointment("a2")), Err(PageError::AlreadyEditing(id)) if id == "a1");
        assert_eq!(editor.editing_id(), Some("a1"));
    }

    #[test]
    fn test_reopening_same_row_keeps_buffer() {
        let source = appointment("a1");
        let mut editor = Editor::new();
        editor.begin(&source).unwrap();
        editor.apply(&FieldEdit::new(AppointmentField::Message, "bring reports")).unwrap();

        let session = editor.begin(&source).unwrap();
        assert_eq!(session.buffer().msg, Some(Scalar::text("bring reports")));
    }

    #[test]
    fn test_apply_without_session() {
        let mut editor = Editor::new();
        assert_matches!(
            editor.apply(&FieldEdit::new(AppointmentField::Message, "x")),
            Err(PageError::NotEditing)
        );
    }

    #[test]
    fn test_invalid_edit_leaves_buffer() {
        let mut editor = Editor::new();
        editor.begin(&appointment("a1")).unwrap();

        assert_matches!(
            editor.apply(&FieldEdit::new(AppointmentField::Time, "noon")),
            Err(PageError::InvalidField { field: AppointmentField::Time, .. })
        );
        assert!(editor.buffer_for("a1").unwrap().time.is_none());
    }

    #[test]
    fn test_sync_status_only_touches_edited_row() {
        let mut editor = Editor::new();
        editor.begin(&appointment("a1")).unwrap();

        editor.sync_status("a2", &AppointmentStatus::successful());
        assert_eq!(editor.buffer_for("a1").unwrap().status(), AppointmentStatus::pending());

        editor.sync_status("a1", &AppointmentStatus::successful());
        assert_eq!(editor.buffer_for("a1").unwrap().status(), AppointmentStatus::successful());
    }

    #[test]
    fn test_cancel_and_close_if() {
        let mut editor = Editor::new();
        editor.begin(&appointment("a1")).unwrap();

        assert!(editor.close_if("a2").is_none());
        assert!(editor.is_editing());
        assert!(editor.cancel().is_some());
        assert!(!editor.is_editing());
        assert!(editor.cancel().is_none());
    }
}
