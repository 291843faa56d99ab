// src/registry.rs

use crate::{
    catalog::{CatalogField, OptionCatalog},
    models::row::{FieldValue, FormRow, RowId, RowKind, fields},
};

/// Ordered set of the currently mounted repeating rows.
///
/// Rows of every kind live in one list; the relative order of rows of the
/// same kind is their top-to-bottom display order.
#[derive(Debug, Default)]
pub struct RowRegistry {
    rows: Vec<FormRow>,
    next_id: u64,
}

impl RowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a row with default values and appends it at the end of its kind.
    pub fn add_row(&mut self, kind: RowKind, catalog: &OptionCatalog) -> &FormRow {
        self.next_id += 1;
        let mut row = FormRow::new(RowId(self.next_id), kind);

        match kind {
            RowKind::Assignment => {
                row.set(fields::ASSIGNMENT_NAME, FieldValue::Empty);
                row.set(fields::DUE_DATE, FieldValue::Empty);
                row.set(fields::WORK_SESSIONS, FieldValue::Empty);
                for (name, field) in [
                    (fields::ASSIGNMENT_TYPE, CatalogField::AssignmentType),
                    (fields::FIELD_OF_STUDY, CatalogField::FieldOfStudy),
                    (fields::EXTERNAL_RESOURCES, CatalogField::Resource),
                    (fields::WORK_LOCATION, CatalogField::Location),
                ] {
                    let options = catalog.options_for(field, false);
                    row.set(name, FieldValue::text(options[0].clone()));
                    row.choices.insert(name.to_string(), options);
                }
                row.set(fields::WORK_IN_GROUP, FieldValue::Flag(false));
                row.set(fields::SUBMITTED_IN_PERSON, FieldValue::Flag(false));
            }
            RowKind::SyllabusUpload => {
                row.set(fields::SYLLABUS_FILE, FieldValue::Empty);
                row.set(fields::COURSE_NAME, FieldValue::Empty);
            }
            RowKind::RankingItem => {
                row.set(fields::TOKEN, FieldValue::Empty);
            }
        }

        tracing::debug!("Mounted {} ({:?})", row.id, kind);
        self.rows.push(row);
        let last = self.rows.len() - 1;
        &self.rows[last]
    }

    /// Removes the row with the given id. Unknown ids are a no-op.
    pub fn remove_row(&mut self, id: RowId) -> Option<FormRow> {
        let index = self.rows.iter().position(|r| r.id == id)?;
        let row = self.rows.remove(index);
        tracing::debug!("Unmounted {} ({:?})", row.id, row.kind);
        Some(row)
    }

    /// Rows of one kind in display order, with their live field values.
    ///
    /// The iterator borrows the registry and can be cloned to restart it.
    pub fn list_rows(&self, kind: RowKind) -> impl Iterator<Item = &FormRow> + Clone + '_ {
        self.rows.iter().filter(move |r| r.kind == kind)
    }

    pub fn get(&self, id: RowId) -> Option<&FormRow> {
        self.rows.iter().find(|r| r.id == id)
    }

    pub fn get_mut(&mut self, id: RowId) -> Option<&mut FormRow> {
        self.rows.iter_mut().find(|r| r.id == id)
    }

    /// Writes a field value. Returns `false` when the row does not exist.
    pub fn set_field(&mut self, id: RowId, name: &str, value: FieldValue) -> bool {
        match self.get_mut(id) {
            Some(row) => {
                row.set(name, value);
                true
            }
            None => false,
        }
    }

    /// Puts the rows of one kind into the given order. Rows of other kinds keep
    /// their places. Returns `false`, changing nothing, unless `order` is a
    /// permutation of the kind's current ids.
    pub fn reorder(&mut self, kind: RowKind, order: &[RowId]) -> bool {
        let mut current: Vec<RowId> = self.list_rows(kind).map(|r| r.id).collect();
        let mut wanted = order.to_vec();
        current.sort();
        wanted.sort();
        if current != wanted {
            tracing::debug!("Rejected reorder of {:?} rows", kind);
            return false;
        }

        let slots: Vec<usize> = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.kind == kind)
            .map(|(index, _)| index)
            .collect();
        let mut taken: Vec<FormRow> = slots.iter().rev().map(|&i| self.rows.remove(i)).collect();

        // Ascending slots: every earlier slot is already refilled when a later one is used.
        for (&slot, id) in slots.iter().zip(order) {
            if let Some(at) = taken.iter().position(|r| r.id == *id) {
                self.rows.insert(slot, taken.swap_remove(at));
            }
        }
        true
    }

    /// Zero-based position of a row among the rows of its kind.
    pub fn position(&self, id: RowId) -> Option<usize> {
        let row = self.get(id)?;
        self.list_rows(row.kind).position(|r| r.id == id)
    }

    /// Id of the row at a zero-based position within a kind.
    pub fn id_at(&self, kind: RowKind, position: usize) -> Option<RowId> {
        self.list_rows(kind).nth(position).map(|r| r.id)
    }

    /// Positional label shown on a row, e.g. "Assignment 2".
    pub fn label(&self, id: RowId) -> Option<String> {
        let row = self.get(id)?;
        let position = self.position(id)?;
        Some(format!("{} {}", row.kind.label(), position + 1))
    }

    pub fn len(&self, kind: RowKind) -> usize {
        self.list_rows(kind).count()
    }

    pub fn is_empty(&self, kind: RowKind) -> bool {
        self.list_rows(kind).next().is_none()
    }
}
