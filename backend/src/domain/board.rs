//! The in-memory board.
//!
//! Exactly one week is editable at a time: the week containing the
//! displayed date. Operations mutate that owned copy and [`Board::flush`]
//! writes it back into the week store under the displayed identifier.
//! Navigation flushes first, then loads the target week from the store or
//! seeds it from the recurring rules.

use chrono::{Duration, NaiveDate};
use shared::NavigateDirection;
use tracing::debug;

use crate::domain::models::{BoardDocument, WeekSnapshot};
use crate::domain::recurring_engine::RecurringEngine;
use crate::domain::undo::UndoManager;
use crate::domain::WeekId;

#[derive(Debug, Clone)]
pub struct Board {
    document: BoardDocument,
    displayed_date: NaiveDate,
    editable: WeekSnapshot,
    undo: UndoManager,
    recurring: RecurringEngine,
}

impl Board {
    /// Open `document` on the week containing `date`
    pub fn open(document: BoardDocument, date: NaiveDate, undo: UndoManager) -> Self {
        let recurring = RecurringEngine::new();
        let editable = Self::load_week(&document, &recurring, date);
        Self {
            document,
            displayed_date: date,
            editable,
            undo,
            recurring,
        }
    }

    fn load_week(document: &BoardDocument, recurring: &RecurringEngine, date: NaiveDate) -> WeekSnapshot {
        let week_id = WeekId::of(date);
        match document.weeks.get(&week_id) {
            Some(stored) => {
                let mut week = stored.clone();
                week.normalize();
                week
            }
            None => {
                debug!("Week {} not stored yet, initializing from recurring rules", week_id);
                recurring.initialize_week(&document.recurring_rules, date)
            }
        }
    }

    pub fn document(&self) -> &BoardDocument {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut BoardDocument {
        &mut self.document
    }

    pub fn displayed_date(&self) -> NaiveDate {
        self.displayed_date
    }

    pub fn displayed_week(&self) -> WeekId {
        WeekId::of(self.displayed_date)
    }

    pub fn editable(&self) -> &WeekSnapshot {
        &self.editable
    }

    pub fn editable_mut(&mut self) -> &mut WeekSnapshot {
        &mut self.editable
    }

    /// Swap in a new editable week, returning the old one
    pub fn replace_editable(&mut self, week: WeekSnapshot) -> WeekSnapshot {
        std::mem::replace(&mut self.editable, week)
    }

    pub fn undo(&self) -> &UndoManager {
        &self.undo
    }

    pub fn undo_mut(&mut self) -> &mut UndoManager {
        &mut self.undo
    }

    /// Write the editable week into the store under the displayed identifier
    pub fn flush(&mut self) {
        let week_id = self.displayed_week();
        self.document.weeks.insert(week_id, self.editable.clone());
    }

    /// Move the displayed date by one week in `direction`
    pub fn navigate(&mut self, direction: NavigateDirection) -> WeekId {
        let days = match direction {
            NavigateDirection::Previous => -7,
            NavigateDirection::Next => 7,
        };
        self.go_to(self.displayed_date + Duration::days(days))
    }

    /// Display the week containing `date`
    pub fn go_to(&mut self, date: NaiveDate) -> WeekId {
        self.flush();
        let from = self.displayed_week();
        self.displayed_date = date;
        self.editable = Self::load_week(&self.document, &self.recurring, date);
        let to = self.displayed_week();
        debug!("Navigated from week {} to {}", from, to);
        to
    }

    /// Every week with its snapshot; the displayed week is the editable copy
    pub fn weeks(&self) -> impl Iterator<Item = (WeekId, &WeekSnapshot)> {
        let displayed = self.displayed_week();
        std::iter::once((displayed, &self.editable)).chain(
            self.document
                .weeks
                .iter()
                .filter(move |(week_id, _)| **week_id != displayed)
                .map(|(week_id, week)| (*week_id, week)),
        )
    }

    /// Mutable counterpart of [`Board::weeks`]
    pub fn weeks_mut(&mut self) -> impl Iterator<Item = (WeekId, &mut WeekSnapshot)> {
        let displayed = self.displayed_week();
        std::iter::once((displayed, &mut self.editable)).chain(
            self.document
                .weeks
                .iter_mut()
                .filter(move |(week_id, _)| **week_id != displayed)
                .map(|(week_id, week)| (*week_id, week)),
        )
    }

    /// The snapshot for `week_id`, the editable copy when it is displayed
    pub fn week_mut(&mut self, week_id: WeekId) -> Option<&mut WeekSnapshot> {
        if week_id == self.displayed_week() {
            Some(&mut self.editable)
        } else {
            self.document.weeks.get_mut(&week_id)
        }
    }

    /// Replace the whole document and reopen on `date`. Any pending undo
    /// refers to the old document and is dropped.
    pub fn replace_document(&mut self, document: BoardDocument, date: NaiveDate) {
        self.editable = Self::load_week(&document, &self.recurring, date);
        self.document = document;
        self.displayed_date = date;
        self.undo.clear();
    }

    pub fn into_document(mut self) -> BoardDocument {
        self.flush();
        self.document
    }
}
