// src/assembler.rs

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::{
    catalog::{CatalogField, OptionCatalog, SELECT_SENTINEL},
    drag::RankedToken,
    models::{
        payload::{Attachment, CourseProjection, ScheduleRequest, SubmissionPayload, SyllabusMeta},
        row::{FieldValue, FileHandle, FormRow, RowKind, fields},
        survey::{Preferences, Survey},
    },
    registry::RowRegistry,
};

/// Live form state read by one submit.
pub struct FormSnapshot<'a> {
    pub registry: &'a RowRegistry,
    pub catalog: &'a OptionCatalog,
    pub survey: &'a Survey,
    pub preferences: &'a Preferences,
    pub ranking: Vec<RankedToken>,
    pub calendar_files: &'a [FileHandle],
}

/// Builds the request payload from the current form state.
///
/// * Assignment rows without a name or due date are left out.
/// * Syllabus rows without a file are left out; the rest become `pdf_0..pdf_n`.
/// * Calendar files are sent as repeated `ics` parts.
pub fn assemble(snapshot: FormSnapshot<'_>) -> SubmissionPayload {
    let FormSnapshot {
        registry,
        catalog,
        survey,
        preferences,
        ranking,
        calendar_files,
    } = snapshot;

    let mut courses = Vec::new();
    let mut submitted_rows = Vec::new();
    for row in registry.list_rows(RowKind::Assignment) {
        match project_assignment(row, catalog) {
            Some(course) => {
                courses.push(course);
                submitted_rows.push(row.id);
            }
            None => tracing::debug!("Skipping incomplete {}", row.id),
        }
    }

    let mut attachments = Vec::new();
    let mut syllabus_meta = Vec::new();
    for row in registry.list_rows(RowKind::SyllabusUpload) {
        let Some(file) = row.field(fields::SYLLABUS_FILE).as_file() else {
            tracing::debug!("Skipping {} without a file", row.id);
            continue;
        };
        let index = syllabus_meta.len();
        syllabus_meta.push(SyllabusMeta {
            index,
            file_name: file.file_name.clone(),
            course_name: row.text(fields::COURSE_NAME).to_string(),
        });
        attachments.push(Attachment {
            field: format!("pdf_{}", index),
            file: file.clone(),
        });
    }
    let pdf_count = syllabus_meta.len();

    attachments.extend(calendar_files.iter().map(|file| Attachment {
        field: "ics".to_string(),
        file: file.clone(),
    }));

    let mut preferences = preferences.normalized();
    preferences.time_ranking = ranking;

    let request = ScheduleRequest {
        survey: clean_survey(survey),
        preferences,
        courses,
        syllabus_meta,
    };

    SubmissionPayload {
        request,
        attachments,
        pdf_count,
        submitted_rows,
    }
}

/// Wire form of an assignment row, or `None` when it lacks a name or due date.
pub fn project_assignment(row: &FormRow, catalog: &OptionCatalog) -> Option<CourseProjection> {
    let assignment_name = row.text(fields::ASSIGNMENT_NAME);
    let due_date = row.text(fields::DUE_DATE);
    if assignment_name.is_empty() || due_date.is_empty() {
        return None;
    }
    if NaiveDate::parse_from_str(due_date, "%Y-%m-%d").is_err() {
        tracing::debug!("{} has a non-ISO due date '{}'", row.id, due_date);
    }

    let select = |name: &str, field: CatalogField| {
        let value = row.text(name);
        if value == SELECT_SENTINEL {
            return String::new();
        }
        if !value.is_empty() && !catalog.is_valid_choice(field, value) {
            tracing::warn!("{}: '{}' is not a known {} choice", row.id, value, field.as_str());
        }
        value.to_string()
    };

    Some(CourseProjection {
        assignment_name: assignment_name.to_string(),
        assignment_type: select(fields::ASSIGNMENT_TYPE, CatalogField::AssignmentType),
        field_of_study: select(fields::FIELD_OF_STUDY, CatalogField::FieldOfStudy),
        due_date: due_date.to_string(),
        work_sessions: parse_sessions(row.field(fields::WORK_SESSIONS)),
        external_resources: select(fields::EXTERNAL_RESOURCES, CatalogField::Resource),
        work_location: select(fields::WORK_LOCATION, CatalogField::Location),
        work_in_group: row.field(fields::WORK_IN_GROUP).as_flag(),
        submitted_in_person: row.field(fields::SUBMITTED_IN_PERSON).as_flag(),
    })
}

/// Upper bound on the session count of one assignment.
pub const MAX_WORK_SESSIONS: u32 = 50;

static LEADING_INT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?(\d+)").expect("static regex"));

/// Session count of a row, read like an integer input: leading digits only,
/// capped at `MAX_WORK_SESSIONS`. Anything without a positive count becomes 1.
pub fn parse_sessions(value: &FieldValue) -> u32 {
    let parsed: Option<u64> = match value {
        FieldValue::Number(n) if n.is_finite() && *n >= 1.0 => Some(*n as u64),
        FieldValue::Text(s) => LEADING_INT
            .captures(s.trim())
            .and_then(|c| c.get(1))
            .map(|digits| digits.as_str().parse::<u64>().unwrap_or(u64::MAX)),
        _ => None,
    };
    match parsed {
        Some(n) if n >= 1 => n.min(u64::from(MAX_WORK_SESSIONS)) as u32,
        _ => 1,
    }
}

fn clean_survey(survey: &Survey) -> Survey {
    let clean = |value: &str| {
        let value = value.trim();
        if value == SELECT_SENTINEL {
            String::new()
        } else {
            value.to_string()
        }
    };
    Survey {
        year: clean(&survey.year),
        major: clean(&survey.major),
        second_concentration: clean(&survey.second_concentration),
        minor: clean(&survey.minor),
        email: survey.email.trim().to_string(),
    }
}
