// src/models/payload.rs

use serde::{Serialize, Serializer};

use crate::models::{
    row::{FileHandle, RowId},
    survey::{Preferences, Survey},
};

/// JSON document carried in the `data` multipart field.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleRequest {
    pub survey: Survey,
    pub preferences: Preferences,
    pub courses: Vec<CourseProjection>,
    #[serde(rename = "syllabusMeta", skip_serializing_if = "Vec::is_empty")]
    pub syllabus_meta: Vec<SyllabusMeta>,
}

/// Wire form of one assignment row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseProjection {
    pub assignment_name: String,
    pub assignment_type: String,
    pub field_of_study: String,
    pub due_date: String,
    pub work_sessions: u32,
    pub external_resources: String,
    pub work_location: String,
    #[serde(serialize_with = "yes_no")]
    pub work_in_group: bool,
    #[serde(serialize_with = "yes_no")]
    pub submitted_in_person: bool,
}

/// Describes the file sent as `pdf_<index>`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyllabusMeta {
    pub index: usize,
    pub file_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub course_name: String,
}

/// A named file part of the multipart body.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub field: String,
    pub file: FileHandle,
}

/// Everything one submit sends, assembled from the live form state.
#[derive(Debug, Clone)]
pub struct SubmissionPayload {
    pub request: ScheduleRequest,
    pub attachments: Vec<Attachment>,

    /// Number of `pdf_<n>` parts, sent as `pdf_count`.
    pub pdf_count: usize,

    /// Assignment rows that made it into `courses`, in payload order.
    /// Response entries are matched back to rows through this list.
    pub submitted_rows: Vec<RowId>,
}

impl SubmissionPayload {
    pub fn data_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.request)
    }
}

fn yes_no<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *value { "Yes" } else { "No" })
}
