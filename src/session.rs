// src/session.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use validator::Validate;

use crate::{
    assembler::{FormSnapshot, assemble},
    catalog::OptionCatalog,
    client::ScheduleBackend,
    drag::{DragReorderController, RankedToken},
    error::AppError,
    models::{
        payload::SubmissionPayload,
        row::{FieldValue, FileHandle, RowId, RowKind, fields},
        schedule::{ScheduleResponse, format_hours},
        survey::{Preferences, Survey, SurveyField, apply_field},
    },
    registry::RowRegistry,
    submit::{SubmitMachine, SubmitPhase},
    view::{FormView, ResultsPanel},
};

/// One independent instance of the schedule form.
///
/// Owns all mutable form state; the catalog is shared read-only. Every
/// mutation updates the view before returning.
pub struct FormSession<V: FormView> {
    catalog: Arc<OptionCatalog>,
    registry: RowRegistry,
    survey: Survey,
    preferences: Preferences,
    ranking: DragReorderController,
    calendar_files: Vec<FileHandle>,
    submit: SubmitMachine,
    view: V,
}

impl<V: FormView> FormSession<V> {
    /// Mounts the default row of every required kind and one ranking row per
    /// catalog token.
    pub fn new(catalog: Arc<OptionCatalog>, view: V, reenable_delay: Duration) -> Self {
        let ranking = DragReorderController::new(Vec::<String>::new());
        let mut session = Self {
            catalog,
            registry: RowRegistry::new(),
            survey: Survey::default(),
            preferences: Preferences::default(),
            ranking,
            calendar_files: Vec::new(),
            submit: SubmitMachine::new(reenable_delay),
            view,
        };

        for kind in [RowKind::Assignment, RowKind::SyllabusUpload] {
            if kind.is_required() {
                session.add_row(kind);
            }
        }
        for token in session.catalog.ranking_tokens() {
            let id = session.add_row(RowKind::RankingItem);
            session.edit_field(id, fields::TOKEN, FieldValue::Text(token));
        }
        session.push_ranking();
        session.sync_submit_control();
        session
    }

    pub fn catalog(&self) -> &OptionCatalog {
        &self.catalog
    }

    pub fn registry(&self) -> &RowRegistry {
        &self.registry
    }

    pub fn survey(&self) -> &Survey {
        &self.survey
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn ranking(&self) -> &DragReorderController {
        &self.ranking
    }

    pub fn calendar_files(&self) -> &[FileHandle] {
        &self.calendar_files
    }

    pub fn submit_phase(&self) -> &SubmitPhase {
        self.submit.phase()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn into_view(self) -> V {
        self.view
    }

    // ---- Row Registry ----

    pub fn add_row(&mut self, kind: RowKind) -> RowId {
        let id = self.registry.add_row(kind, &self.catalog).id;
        if let (Some(row), Some(label)) = (self.registry.get(id), self.registry.label(id)) {
            self.view.row_mounted(row, &label);
        }
        if kind == RowKind::RankingItem {
            self.sync_ranking_layout();
        }
        id
    }

    /// Removes a row and relabels the rows of its kind. Unknown ids are ignored.
    pub fn remove_row(&mut self, id: RowId) {
        let Some(removed) = self.registry.remove_row(id) else {
            tracing::debug!("Ignoring removal of unknown {}", id);
            return;
        };
        self.view.row_unmounted(id);
        self.relabel(removed.kind);

        if removed.kind == RowKind::RankingItem {
            self.sync_ranking_layout();
            self.push_ranking();
        }
    }

    /// Records a control edit. Returns `false` for unknown rows.
    pub fn edit_field(&mut self, id: RowId, field: &str, value: FieldValue) -> bool {
        let updated = self.registry.set_field(id, field, value);
        if !updated {
            tracing::debug!("Edit of '{}' on unknown {}", field, id);
        } else if field == fields::TOKEN
            && self.registry.get(id).is_some_and(|r| r.kind == RowKind::RankingItem)
        {
            self.push_ranking();
        }
        updated
    }

    fn relabel(&mut self, kind: RowKind) {
        let rows: Vec<RowId> = self.registry.list_rows(kind).map(|r| r.id).collect();
        for row_id in rows {
            if let Some(label) = self.registry.label(row_id) {
                self.view.row_relabelled(row_id, &label);
            }
        }
    }

    pub fn edit_survey(&mut self, field: SurveyField, value: impl Into<String>) {
        apply_field(&mut self.survey, &mut self.preferences, field, value.into());
        if let Err(e) = self.preferences.validate() {
            tracing::debug!("Preferences not valid yet: {}", e);
        }
    }

    pub fn attach_calendar(&mut self, file: FileHandle) {
        tracing::debug!("Attached calendar file {}", file.file_name);
        self.calendar_files.push(file);
    }

    pub fn clear_calendar(&mut self) {
        self.calendar_files.clear();
    }

    // ---- Ranking ----
    //
    // The ranking rows in the registry are the order. The drag controller lays
    // them out keyed by row id and only decides where a dragged row lands.

    /// Starts dragging the first ranking row showing `token`.
    pub fn drag_start(&mut self, token: &str) -> bool {
        let Some(id) = self
            .registry
            .list_rows(RowKind::RankingItem)
            .find(|r| r.text(fields::TOKEN) == token)
            .map(|r| r.id)
        else {
            tracing::debug!("No ranking row for '{}'", token);
            return false;
        };
        self.ranking.drag_start(&id.to_string())
    }

    pub fn drag_over(&mut self, pointer_y: f64) {
        if !self.ranking.drag_over(pointer_y) {
            return;
        }
        let order: Vec<RowId> = self
            .ranking
            .tokens()
            .iter()
            .filter_map(|key| {
                self.registry
                    .list_rows(RowKind::RankingItem)
                    .find(|r| r.id.to_string() == *key)
                    .map(|r| r.id)
            })
            .collect();
        if self.registry.reorder(RowKind::RankingItem, &order) {
            self.relabel(RowKind::RankingItem);
            self.push_ranking();
        }
    }

    pub fn drag_end(&mut self) {
        self.ranking.drag_end();
    }

    /// Tokens of the ranking rows, top to bottom, as contiguous 1-based ranks.
    /// Rows without a token are not ranked.
    pub fn current_order(&self) -> Vec<RankedToken> {
        self.registry
            .list_rows(RowKind::RankingItem)
            .map(|r| r.text(fields::TOKEN))
            .filter(|token| !token.is_empty())
            .enumerate()
            .map(|(index, token)| RankedToken {
                rank: index + 1,
                token: token.to_string(),
            })
            .collect()
    }

    fn sync_ranking_layout(&mut self) {
        let keys: Vec<String> = self
            .registry
            .list_rows(RowKind::RankingItem)
            .map(|r| r.id.to_string())
            .collect();
        self.ranking.set_items(keys);
    }

    fn push_ranking(&mut self) {
        let order = self.current_order();
        self.view.ranking_reordered(&order);
    }

    // ---- Submission ----

    /// Ready -> Submitting and the payload to send, or `None` while the control is disabled.
    ///
    /// Non-blocking entry point: the caller sends the payload and reports back
    /// through `finish_submit`, and the session keeps taking events meanwhile.
    pub fn begin_submit(&mut self) -> Option<SubmissionPayload> {
        if !self.submit.begin() {
            tracing::debug!("Submit ignored, control disabled");
            return None;
        }
        self.sync_submit_control();

        let payload = assemble(FormSnapshot {
            registry: &self.registry,
            catalog: &self.catalog,
            survey: &self.survey,
            preferences: &self.preferences,
            ranking: self.current_order(),
            calendar_files: &self.calendar_files,
        });
        Some(payload)
    }

    /// Applies the outcome of the request started by `begin_submit`.
    pub fn finish_submit(
        &mut self,
        payload: &SubmissionPayload,
        outcome: Result<ScheduleResponse, AppError>,
        now: Instant,
    ) {
        match outcome {
            Ok(response) => {
                self.apply_estimates(payload, &response);
                let panel = ResultsPanel::from_response(&response);
                self.view.results_revealed(&panel);
                self.submit.succeed(now);
                tracing::info!(
                    "Schedule generated, {} estimate(s) returned",
                    response.predictions.len()
                );
            }
            Err(e) => {
                tracing::error!("Submission failed: {}", e);
                let message = e.user_message();
                self.view.notify(&message);
                self.submit.fail(message);
            }
        }
        self.sync_submit_control();
    }

    /// One full submit: exactly one request, no retry.
    /// Returns `false` when the control was disabled and nothing was sent.
    pub async fn submit(&mut self, backend: &dyn ScheduleBackend) -> bool {
        let Some(payload) = self.begin_submit() else {
            return false;
        };
        let outcome = backend.generate_schedule(&payload).await;
        self.finish_submit(&payload, outcome, Instant::now());
        true
    }

    /// Runs scheduled transitions that are due at `now`.
    pub fn tick(&mut self, now: Instant) {
        if self.submit.tick(now) {
            self.sync_submit_control();
        }
    }

    /// When the next scheduled transition is due, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.submit.pending_until()
    }

    fn apply_estimates(&mut self, payload: &SubmissionPayload, response: &ScheduleResponse) {
        for (position, prediction) in response.predictions.iter().enumerate() {
            let Some(hours) = prediction.predicted_hours else {
                continue;
            };
            let index = prediction.row_index().unwrap_or(position);
            let Some(&row_id) = payload.submitted_rows.get(index) else {
                continue;
            };
            let text = format_hours(hours);
            if let Some(row) = self.registry.get_mut(row_id) {
                row.estimate = Some(text.clone());
                self.view.row_estimate(row_id, &text);
            }
        }
    }

    fn sync_submit_control(&mut self) {
        self.view
            .submit_control(self.submit.control_enabled(), self.submit.control_label());
    }

    // ---- Autofill ----

    /// Refills the form from saved preferences for the current email.
    ///
    /// Invalid emails, missing records and lookup failures leave the form untouched.
    pub async fn autofill(&mut self, backend: &dyn ScheduleBackend) -> bool {
        if self.survey.email.trim().is_empty() {
            return false;
        }
        if let Err(e) = self.survey.validate() {
            tracing::debug!("Skipping preferences lookup: {}", e);
            return false;
        }

        let email = self.survey.email.trim().to_string();
        let saved = match backend.fetch_preferences(&email).await {
            Ok(Some(saved)) => saved,
            Ok(None) => {
                tracing::debug!("No saved preferences for {}", email);
                return false;
            }
            Err(e) => {
                tracing::warn!("Preferences lookup failed: {}", e);
                return false;
            }
        };

        let entries = saved.entries();
        if entries.is_empty() {
            return false;
        }
        for (field, value) in entries {
            apply_field(&mut self.survey, &mut self.preferences, field, value);
        }
        self.view.survey_filled(&self.survey, &self.preferences);
        tracing::info!("Applied saved preferences for {}", email);
        true
    }
}
