//! Whole-week operations: clearing the editable week and templates.

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::domain::board::Board;
use crate::domain::errors::BoardError;
use crate::domain::models::{Template, WeekSnapshot};
use crate::domain::undo::UndoAction;
use crate::domain::WeekId;

#[derive(Debug, Clone, Default)]
pub struct WeekService;

impl WeekService {
    pub fn new() -> Self {
        Self
    }

    /// Empty the editable week and stop it from paying the fixed
    /// allowance. The previous content is kept for undo.
    pub fn clear_week(&self, board: &mut Board, now: DateTime<Utc>) -> WeekId {
        let week_id = board.displayed_week();
        let snapshot = board.replace_editable(WeekSnapshot::cleared());
        info!("Cleared week {} ({} tasks)", week_id, snapshot.task_count());
        board.undo_mut().arm(UndoAction::ClearedWeek { week_id, snapshot }, now);
        week_id
    }

    /// Put a cleared week's content back
    pub fn restore_week(&self, board: &mut Board, week_id: WeekId, snapshot: WeekSnapshot) -> Result<()> {
        match board.week_mut(week_id) {
            Some(week) => {
                *week = snapshot;
                info!("Restored week {}", week_id);
                Ok(())
            }
            None => {
                warn!("Week {} is no longer stored, cannot restore it", week_id);
                Err(BoardError::WeekNotFound(week_id).into())
            }
        }
    }

    /// Save the layout of the editable week under `name`. Completion state
    /// and soft deleted tasks are not part of a template.
    pub fn save_template(&self, board: &mut Board, name: &str) -> Result<Template> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BoardError::validation("Template name cannot be empty").into());
        }

        let mut week = WeekSnapshot::empty();
        for (day, task) in board.editable().iter_tasks() {
            if !task.deleted {
                week.tasks_mut(day).push(task.clone());
            }
        }
        let template = Template {
            id: Template::generate_id(),
            name: name.to_string(),
            week,
        };
        board.document_mut().templates.push(template.clone());

        info!("Saved template {} '{}' with {} tasks", template.id, template.name, template.week.task_count());
        Ok(template)
    }

    /// Replace the editable week's tasks with a copy of the template.
    /// Every task gets a fresh id; the allowance flag of the week is kept.
    pub fn load_template(&self, board: &mut Board, template_id: &str) -> Result<usize> {
        let template = board
            .document()
            .templates
            .iter()
            .find(|template| template.id == template_id)
            .cloned()
            .ok_or_else(|| BoardError::TemplateNotFound(template_id.to_string()))?;

        let mut week = WeekSnapshot {
            allowance_disabled: board.editable().allowance_disabled,
            ..WeekSnapshot::empty()
        };
        for (day, task) in template.week.iter_tasks() {
            week.tasks_mut(day).push(task.duplicate());
        }
        let count = week.task_count();
        board.replace_editable(week);

        info!("Loaded template '{}' into week {} ({} tasks)", template.name, board.displayed_week(), count);
        Ok(count)
    }

    pub fn delete_template(&self, board: &mut Board, template_id: &str) -> Result<Template> {
        let templates = &mut board.document_mut().templates;
        let index = templates
            .iter()
            .position(|template| template.id == template_id)
            .ok_or_else(|| BoardError::TemplateNotFound(template_id.to_string()))?;
        let template = templates.remove(index);
        info!("Deleted template {} '{}'", template.id, template.name);
        Ok(template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Assignee, BoardDocument, TaskInstance};
    use crate::domain::undo::UndoManager;
    use chrono::{Duration, NaiveDate, TimeZone};
    use shared::{DayKey, NavigateDirection};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).unwrap()
    }

    fn board_with_tasks() -> Board {
        let mut board = Board::open(
            BoardDocument::default(),
            NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(),
            UndoManager::default(),
        );
        let week = board.editable_mut();
        let done = TaskInstance::new("Dishes", 5.0, "", Assignee::Unassigned);
        week.set_completed(DayKey::Monday, &done.id, true);
        week.tasks_mut(DayKey::Monday).push(done);
        let mut gone = TaskInstance::new("Old", 1.0, "", Assignee::Unassigned);
        gone.deleted = true;
        week.tasks_mut(DayKey::Tuesday).push(gone);
        week.tasks_mut(DayKey::Market).push(TaskInstance::new("Windows", 10.0, "", Assignee::Unassigned));
        board
    }

    #[test]
    fn test_clear_week_and_undo() {
        let service = WeekService::new();
        let mut board = board_with_tasks();
        let before = board.editable().clone();

        let week_id = service.clear_week(&mut board, now());
        assert_eq!(board.editable(), &WeekSnapshot::cleared());

        let UndoAction::ClearedWeek { week_id: undo_week, snapshot } =
            board.undo_mut().take(now() + Duration::seconds(1)).unwrap()
        else {
            panic!("expected a cleared week");
        };
        assert_eq!(undo_week, week_id);
        service.restore_week(&mut board, undo_week, snapshot).unwrap();
        assert_eq!(board.editable(), &before);
    }

    #[test]
    fn test_restore_into_stored_week_after_navigation() {
        let service = WeekService::new();
        let mut board = board_with_tasks();
        let before = board.editable().clone();
        let week_id = service.clear_week(&mut board, now());
        board.navigate(NavigateDirection::Next);

        service.restore_week(&mut board, week_id, before.clone()).unwrap();
        assert_eq!(board.document().weeks[&week_id], before);

        let missing = WeekId::new(2020, 1).unwrap();
        let err = service.restore_week(&mut board, missing, before).unwrap_err();
        assert_eq!(err.downcast_ref::<BoardError>(), Some(&BoardError::WeekNotFound(missing)));
    }

    #[test]
    fn test_template_round_trip() {
        let service = WeekService::new();
        let mut board = board_with_tasks();
        let template = service.save_template(&mut board, " Busy week ").unwrap();
        assert_eq!(template.name, "Busy week");
        assert_eq!(template.week.task_count(), 2);
        assert!(template.week.completed.is_empty());

        board.navigate(NavigateDirection::Next);
        board.editable_mut().allowance_disabled = true;
        assert_eq!(service.load_template(&mut board, &template.id).unwrap(), 2);
        let week = board.editable();
        assert!(week.allowance_disabled);
        assert_eq!(week.tasks(DayKey::Market)[0].text, "Windows");
        assert_ne!(week.tasks(DayKey::Market)[0].id, template.week.tasks(DayKey::Market)[0].id);

        service.delete_template(&mut board, &template.id).unwrap();
        let err = service.load_template(&mut board, &template.id).unwrap_err();
        assert!(matches!(err.downcast_ref::<BoardError>(), Some(BoardError::TemplateNotFound(_))));
        assert!(service.save_template(&mut board, "  ").is_err());
    }
}
