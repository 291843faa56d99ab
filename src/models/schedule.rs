// src/models/schedule.rs

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static ASSIGNMENT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^assign_(\d+)$").expect("static regex"));

/// Success body of the schedule endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawScheduleResponse")]
pub struct ScheduleResponse {
    pub message: Option<String>,

    /// Per-row estimates. Older backends call this list `assignments` or `courses`.
    pub predictions: Vec<Prediction>,

    /// Download link of the generated calendar file.
    pub ics_url: Option<String>,

    pub stats: Option<ScheduleStats>,

    pub courses_count: Option<u64>,
    pub pdfs_processed: Option<u64>,
    pub calendar_events_count: Option<u64>,
}

/// Wire shape of the success body. The estimate list may arrive under any of
/// its names, possibly more than one at once; the first non-empty one wins.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawScheduleResponse {
    message: Option<String>,
    predictions: Option<Vec<Prediction>>,
    assignments: Option<Vec<Prediction>>,
    courses: Option<Vec<Prediction>>,
    ics_url: Option<String>,
    stats: Option<ScheduleStats>,
    courses_count: Option<u64>,
    pdfs_processed: Option<u64>,
    calendar_events_count: Option<u64>,
}

impl From<RawScheduleResponse> for ScheduleResponse {
    fn from(raw: RawScheduleResponse) -> Self {
        let predictions = [raw.predictions, raw.assignments, raw.courses]
            .into_iter()
            .flatten()
            .find(|list| !list.is_empty())
            .unwrap_or_default();
        Self {
            message: raw.message,
            predictions,
            ics_url: raw.ics_url,
            stats: raw.stats,
            courses_count: raw.courses_count,
            pdfs_processed: raw.pdfs_processed,
            calendar_events_count: raw.calendar_events_count,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleStats {
    pub scheduled: u64,
    pub unscheduled: u64,
}

/// One estimate entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Prediction {
    pub index: Option<usize>,
    pub id: Option<String>,
    #[serde(alias = "assignment_name")]
    pub name: Option<String>,
    #[serde(alias = "time_estimate")]
    pub predicted_hours: Option<f64>,
    pub due_date: Option<String>,
    pub class_name: Option<String>,
}

impl Prediction {
    /// Index into the submitted rows: explicit `index`, else the `assign_<n>` id suffix.
    pub fn row_index(&self) -> Option<usize> {
        self.index.or_else(|| {
            let id = self.id.as_deref()?;
            ASSIGNMENT_ID.captures(id)?.get(1)?.as_str().parse().ok()
        })
    }
}

/// Error body of a non-success response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ErrorBody {
    pub error: Option<String>,
}

/// Hours as shown in a row: whole numbers without decimals, otherwise up to two places.
pub fn format_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{:.0}", hours)
    } else {
        let text = format!("{:.2}", hours);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
