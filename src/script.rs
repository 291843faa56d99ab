// src/script.rs

use std::path::PathBuf;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::{
    client::ScheduleBackend,
    error::AppError,
    events::FormEvent,
    models::{
        row::{FieldValue, FileHandle, RowKind, fields},
        survey::SurveyField,
    },
    session::FormSession,
    view::FormView,
};

/// One scripted user action. Rows are addressed by kind and position at the
/// moment the step runs; files by path.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptStep {
    AddRow {
        kind: RowKind,
    },
    RemoveRow {
        kind: RowKind,
        position: usize,
    },
    EditField {
        kind: RowKind,
        position: usize,
        field: String,
        value: Value,
    },
    AttachFile {
        kind: RowKind,
        position: usize,
        path: PathBuf,
    },
    EditSurvey {
        #[serde(deserialize_with = "survey_field")]
        field: SurveyField,
        value: String,
    },
    AttachCalendar {
        path: PathBuf,
    },
    /// Pointer drag of one ranking item, dropped after moving through `pointer_ys`.
    Drag {
        token: String,
        pointer_ys: Vec<f64>,
    },
    EmailCommitted,
    Submit,
}

/// Survey field names accept both the snake_case and the camelCase spelling.
fn survey_field<'de, D>(deserializer: D) -> Result<SurveyField, D::Error>
where
    D: Deserializer<'de>,
{
    let name = String::deserialize(deserializer)?;
    name.parse().map_err(serde::de::Error::custom)
}

pub fn parse_script(json: &str) -> Result<Vec<ScriptStep>, AppError> {
    serde_json::from_str(json).map_err(|e| AppError::BadRequest(format!("invalid script: {}", e)))
}

fn field_value(value: Value) -> FieldValue {
    match value {
        Value::Null => FieldValue::Empty,
        Value::Bool(b) => FieldValue::Flag(b),
        Value::Number(n) => n.as_f64().map(FieldValue::Number).unwrap_or_default(),
        Value::String(s) => FieldValue::Text(s),
        other => FieldValue::Text(other.to_string()),
    }
}

impl ScriptStep {
    /// Expands the step into UI events against the session's current rows.
    pub fn to_events<V: FormView>(&self, session: &FormSession<V>) -> Result<Vec<FormEvent>, AppError> {
        let row_at = |kind: RowKind, position: usize| {
            session.registry().id_at(kind, position).ok_or_else(|| {
                AppError::BadRequest(format!("no {:?} row at position {}", kind, position))
            })
        };

        let events = match self {
            ScriptStep::AddRow { kind } => vec![FormEvent::AddRow(*kind)],
            ScriptStep::RemoveRow { kind, position } => {
                vec![FormEvent::RemoveRow(row_at(*kind, *position)?)]
            }
            ScriptStep::EditField {
                kind,
                position,
                field,
                value,
            } => vec![FormEvent::EditField {
                row: row_at(*kind, *position)?,
                field: field.clone(),
                value: field_value(value.clone()),
            }],
            ScriptStep::AttachFile { kind, position, path } => vec![FormEvent::EditField {
                row: row_at(*kind, *position)?,
                field: fields::SYLLABUS_FILE.to_string(),
                value: FieldValue::File(FileHandle::from_path(path)?),
            }],
            ScriptStep::EditSurvey { field, value } => vec![FormEvent::EditSurvey {
                field: *field,
                value: value.clone(),
            }],
            ScriptStep::AttachCalendar { path } => {
                vec![FormEvent::AttachCalendar(FileHandle::from_path(path)?)]
            }
            ScriptStep::Drag { token, pointer_ys } => {
                let mut events = vec![FormEvent::DragStart(token.clone())];
                events.extend(pointer_ys.iter().map(|&pointer_y| FormEvent::DragOver { pointer_y }));
                events.push(FormEvent::DragEnd);
                events
            }
            ScriptStep::EmailCommitted => vec![FormEvent::EmailCommitted],
            ScriptStep::Submit => vec![FormEvent::Submit],
        };
        Ok(events)
    }
}

/// Replays a script. After each submit the pending re-enable is waited out
/// on the tokio clock and applied with a tick.
pub async fn replay<V: FormView>(
    session: &mut FormSession<V>,
    steps: &[ScriptStep],
    backend: &dyn ScheduleBackend,
) -> Result<(), AppError> {
    for (index, step) in steps.iter().enumerate() {
        tracing::debug!("Step {}: {:?}", index, step);
        for event in step.to_events(session)? {
            session.dispatch(event, backend).await;
        }
        if let Some(deadline) = session.next_deadline() {
            tokio::time::sleep_until(deadline).await;
            session.dispatch(FormEvent::Tick(deadline), backend).await;
        }
    }
    Ok(())
}
