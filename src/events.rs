// src/events.rs

use tokio::time::Instant;

use crate::{
    client::ScheduleBackend,
    models::{
        row::{FieldValue, FileHandle, RowId, RowKind},
        survey::SurveyField,
    },
    session::FormSession,
    view::FormView,
};

/// Every UI event the form reacts to.
///
/// Row-scoped events carry the row's identity instead of a closure bound
/// into generated markup.
#[derive(Debug, Clone)]
pub enum FormEvent {
    AddRow(RowKind),
    RemoveRow(RowId),
    EditField {
        row: RowId,
        field: String,
        value: FieldValue,
    },
    EditSurvey {
        field: SurveyField,
        value: String,
    },
    AttachCalendar(FileHandle),
    ClearCalendar,
    DragStart(String),
    DragOver {
        pointer_y: f64,
    },
    DragEnd,
    /// Email input lost focus or Enter was pressed.
    EmailCommitted,
    Submit,
    Tick(Instant),
}

impl<V: FormView> FormSession<V> {
    /// Routes one event to its handler.
    pub async fn dispatch(&mut self, event: FormEvent, backend: &dyn ScheduleBackend) {
        match event {
            FormEvent::AddRow(kind) => {
                self.add_row(kind);
            }
            FormEvent::RemoveRow(id) => self.remove_row(id),
            FormEvent::EditField { row, field, value } => {
                self.edit_field(row, &field, value);
            }
            FormEvent::EditSurvey { field, value } => self.edit_survey(field, value),
            FormEvent::AttachCalendar(file) => self.attach_calendar(file),
            FormEvent::ClearCalendar => self.clear_calendar(),
            FormEvent::DragStart(token) => {
                self.drag_start(&token);
            }
            FormEvent::DragOver { pointer_y } => self.drag_over(pointer_y),
            FormEvent::DragEnd => self.drag_end(),
            FormEvent::EmailCommitted => {
                self.autofill(backend).await;
            }
            FormEvent::Submit => {
                self.submit(backend).await;
            }
            FormEvent::Tick(now) => self.tick(now),
        }
    }
}
