// src/view.rs

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    drag::RankedToken,
    models::{
        row::{FormRow, RowId},
        schedule::{ScheduleResponse, format_hours},
        survey::{Preferences, Survey},
    },
    utils::html::render_results_html,
};

/// Summary shown after a successful submit.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultsPanel {
    pub message: Option<String>,
    pub download_url: Option<String>,
    pub scheduled: Option<u64>,
    pub unscheduled: Option<u64>,
    pub courses_count: Option<u64>,
    pub pdfs_processed: Option<u64>,
    pub calendar_events_count: Option<u64>,
    pub items: Vec<ResultItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultItem {
    pub name: String,
    pub class_name: Option<String>,
    pub due_date: Option<String>,
    pub hours: Option<String>,
}

impl ResultsPanel {
    pub fn from_response(response: &ScheduleResponse) -> Self {
        Self {
            message: response.message.clone(),
            download_url: response.ics_url.clone(),
            scheduled: response.stats.as_ref().map(|s| s.scheduled),
            unscheduled: response.stats.as_ref().map(|s| s.unscheduled),
            courses_count: response.courses_count,
            pdfs_processed: response.pdfs_processed,
            calendar_events_count: response.calendar_events_count,
            items: response
                .predictions
                .iter()
                .map(|p| ResultItem {
                    name: p.name.clone().unwrap_or_default(),
                    class_name: p.class_name.clone(),
                    due_date: p.due_date.clone(),
                    hours: p.predicted_hours.map(format_hours),
                })
                .collect(),
        }
    }
}

/// Visible side of the form. Every session mutation is mirrored here
/// before the session call returns.
pub trait FormView {
    fn row_mounted(&mut self, row: &FormRow, label: &str);
    fn row_unmounted(&mut self, id: RowId);
    fn row_relabelled(&mut self, id: RowId, label: &str);
    fn row_estimate(&mut self, id: RowId, text: &str);
    fn ranking_reordered(&mut self, order: &[RankedToken]);
    fn survey_filled(&mut self, survey: &Survey, preferences: &Preferences);
    fn submit_control(&mut self, enabled: bool, label: &str);
    fn results_revealed(&mut self, panel: &ResultsPanel);
    fn notify(&mut self, message: &str);
}

/// Mounted row as displayed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowDisplay {
    pub id: RowId,
    pub label: String,
    pub estimate: Option<String>,
}

/// In-memory `FormView` that records what a user would see.
#[derive(Debug, Clone, Serialize)]
pub struct HeadlessView {
    pub rows: Vec<RowDisplay>,
    pub ranking: Vec<String>,
    pub submit_enabled: bool,
    pub submit_label: String,
    pub notifications: Vec<String>,
    pub results: Option<ResultsPanel>,
    pub results_html: Option<String>,
    pub filled_fields: BTreeMap<String, String>,
}

impl Default for HeadlessView {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            ranking: Vec::new(),
            submit_enabled: true,
            submit_label: String::new(),
            notifications: Vec::new(),
            results: None,
            results_html: None,
            filled_fields: BTreeMap::new(),
        }
    }
}

impl HeadlessView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(&self, id: RowId) -> Option<&RowDisplay> {
        self.rows.iter().find(|r| r.id == id)
    }

    pub fn last_notification(&self) -> Option<&str> {
        self.notifications.last().map(String::as_str)
    }
}

impl FormView for HeadlessView {
    fn row_mounted(&mut self, row: &FormRow, label: &str) {
        self.rows.push(RowDisplay {
            id: row.id,
            label: label.to_string(),
            estimate: row.estimate.clone(),
        });
    }

    fn row_unmounted(&mut self, id: RowId) {
        self.rows.retain(|r| r.id != id);
    }

    fn row_relabelled(&mut self, id: RowId, label: &str) {
        if let Some(row) = self.rows.iter_mut().find(|r| r.id == id) {
            row.label = label.to_string();
        }
    }

    fn row_estimate(&mut self, id: RowId, text: &str) {
        if let Some(row) = self.rows.iter_mut().find(|r| r.id == id) {
            row.estimate = Some(text.to_string());
        }
    }

    fn ranking_reordered(&mut self, order: &[RankedToken]) {
        self.ranking = order.iter().map(|r| r.token.clone()).collect();
    }

    fn survey_filled(&mut self, survey: &Survey, preferences: &Preferences) {
        let pairs = [
            ("year", &survey.year),
            ("major", &survey.major),
            ("secondConcentration", &survey.second_concentration),
            ("minor", &survey.minor),
            ("timezone", &preferences.timezone),
            ("weekdayStart", &preferences.weekday_start),
            ("weekdayEnd", &preferences.weekday_end),
            ("weekendStart", &preferences.weekend_start),
            ("weekendEnd", &preferences.weekend_end),
        ];
        for (name, value) in pairs {
            self.filled_fields.insert(name.to_string(), value.clone());
        }
    }

    fn submit_control(&mut self, enabled: bool, label: &str) {
        self.submit_enabled = enabled;
        self.submit_label = label.to_string();
    }

    fn results_revealed(&mut self, panel: &ResultsPanel) {
        self.results_html = Some(render_results_html(panel));
        self.results = Some(panel.clone());
    }

    fn notify(&mut self, message: &str) {
        tracing::info!("Notification: {}", message);
        self.notifications.push(message.to_string());
    }
}
