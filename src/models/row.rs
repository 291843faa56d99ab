// src/models/row.rs

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Field names used by assignment rows.
/// They double as the JSON keys of the course projection sent to the backend.
pub mod fields {
    pub const ASSIGNMENT_NAME: &str = "assignment_name";
    pub const ASSIGNMENT_TYPE: &str = "assignment_type";
    pub const FIELD_OF_STUDY: &str = "field_of_study";
    pub const DUE_DATE: &str = "due_date";
    pub const WORK_SESSIONS: &str = "work_sessions";
    pub const EXTERNAL_RESOURCES: &str = "external_resources";
    pub const WORK_LOCATION: &str = "work_location";
    pub const WORK_IN_GROUP: &str = "work_in_group";
    pub const SUBMITTED_IN_PERSON: &str = "submitted_in_person";

    // Syllabus rows
    pub const SYLLABUS_FILE: &str = "file";
    pub const COURSE_NAME: &str = "course_name";

    // Ranking rows
    pub const TOKEN: &str = "token";
}

/// Opaque row identity, stable for the lifetime of the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowId(pub u64);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    Assignment,
    SyllabusUpload,
    RankingItem,
}

impl RowKind {
    /// Prefix of the positional label shown on each row.
    pub fn label(self) -> &'static str {
        match self {
            RowKind::Assignment => "Assignment",
            RowKind::SyllabusUpload => "Syllabus",
            RowKind::RankingItem => "Preference",
        }
    }

    /// Required kinds get one row when the session starts.
    pub fn is_required(self) -> bool {
        matches!(self, RowKind::Assignment)
    }
}

/// An uploaded file held in memory until submit.
#[derive(Clone, PartialEq)]
pub struct FileHandle {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl FileHandle {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let bytes = std::fs::read(path).map_err(|e| {
            tracing::error!("Failed to read attachment {}: {:?}", path.display(), e);
            AppError::Io(format!("{}: {}", path.display(), e))
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "ics" => "text/calendar",
        _ => "application/octet-stream",
    }
}

/// Current value of one form control.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Flag(bool),
    File(FileHandle),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> bool {
        match self {
            FieldValue::Flag(b) => *b,
            FieldValue::Text(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "yes" | "true" | "on"),
            _ => false,
        }
    }

    pub fn as_file(&self) -> Option<&FileHandle> {
        match self {
            FieldValue::File(f) => Some(f),
            _ => None,
        }
    }

    /// Empty, whitespace-only text and NaN count as "not filled in".
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Empty => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Number(n) => n.is_nan(),
            FieldValue::Flag(_) | FieldValue::File(_) => false,
        }
    }
}

/// One repeating entry of the form (an assignment, a syllabus upload or a ranking item).
#[derive(Debug, Clone, PartialEq)]
pub struct FormRow {
    pub id: RowId,
    pub kind: RowKind,

    /// Live control values keyed by field name.
    pub fields: BTreeMap<String, FieldValue>,

    /// Choice lists for the select controls, filled from the catalog at creation.
    pub choices: BTreeMap<String, Vec<String>>,

    /// Display region for the predicted effort, written after a successful submit.
    pub estimate: Option<String>,
}

impl FormRow {
    pub fn new(id: RowId, kind: RowKind) -> Self {
        Self {
            id,
            kind,
            fields: BTreeMap::new(),
            choices: BTreeMap::new(),
            estimate: None,
        }
    }

    pub fn field(&self, name: &str) -> &FieldValue {
        static EMPTY: FieldValue = FieldValue::Empty;
        self.fields.get(name).unwrap_or(&EMPTY)
    }

    /// Text value of a field, or "" when unset or not text.
    pub fn text(&self, name: &str) -> &str {
        self.field(name).as_text().unwrap_or("").trim()
    }

    pub fn set(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    pub fn choices(&self, name: &str) -> Option<&[String]> {
        self.choices.get(name).map(Vec::as_slice)
    }
}
