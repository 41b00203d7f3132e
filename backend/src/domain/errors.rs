//! Domain errors surfaced by board operations.
//!
//! Services return `anyhow::Result`; the REST layer downcasts to
//! [`BoardError`] to pick a status code.

use crate::domain::WeekId;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BoardError {
    #[error("User not found: {0}")]
    UserNotFound(String),
    #[error("Task not found: {task_id} on {day}")]
    TaskNotFound { day: String, task_id: String },
    #[error("Library task not found: {0}")]
    LibraryTaskNotFound(String),
    #[error("Recurring rule not found: {0}")]
    RuleNotFound(String),
    #[error("Template not found: {0}")]
    TemplateNotFound(String),
    #[error("A user named '{0}' already exists")]
    DuplicateName(String),
    #[error("{0}")]
    Validation(String),
    #[error("This operation overwrites all data and must be confirmed")]
    ConfirmationRequired,
    #[error("Nothing to undo")]
    NothingToUndo,
    #[error("Week {0} is not stored")]
    WeekNotFound(WeekId),
}

impl BoardError {
    pub fn validation(message: impl Into<String>) -> Self {
        BoardError::Validation(message.into())
    }

    pub fn task_not_found(day: shared::DayKey, task_id: &str) -> Self {
        BoardError::TaskNotFound {
            day: day.to_string(),
            task_id: task_id.to_string(),
        }
    }
}
