//! Task library and the task operations of the editable week.

use anyhow::Result;
use shared::DayKey;
use tracing::info;

use crate::domain::board::Board;
use crate::domain::commands::library::{CreateLibraryTaskCommand, UpdateLibraryTaskCommand};
use crate::domain::commands::week::{
    AddTasksCommand, AssigneeChange, DeleteMatchingCommand, EditTaskCommand, MoveTaskCommand,
};
use crate::domain::errors::BoardError;
use crate::domain::models::{Assignee, LibraryTask, TaskInstance};

#[derive(Debug, Clone, Default)]
pub struct TaskService;

impl TaskService {
    pub fn new() -> Self {
        Self
    }

    // -- library ----------------------------------------------------------

    pub fn add_library_task(&self, board: &mut Board, command: CreateLibraryTaskCommand) -> Result<LibraryTask> {
        let text = self.validate_text(&command.text)?;
        self.validate_value(command.value)?;

        let entry = LibraryTask {
            id: LibraryTask::generate_id(),
            text,
            value: command.value,
            icon: command.icon,
        };
        board.document_mut().task_library.push(entry.clone());
        info!("Added library task {} '{}'", entry.id, entry.text);
        Ok(entry)
    }

    /// Update a library entry. Returns the entry and how many instances in
    /// the editable week were rewritten along with it.
    pub fn update_library_task(
        &self,
        board: &mut Board,
        command: UpdateLibraryTaskCommand,
    ) -> Result<(LibraryTask, usize)> {
        let text = command.text.as_deref().map(|text| self.validate_text(text)).transpose()?;
        if let Some(value) = command.value {
            self.validate_value(value)?;
        }

        let entry = board
            .document_mut()
            .task_library
            .iter_mut()
            .find(|entry| entry.id == command.library_id)
            .ok_or_else(|| BoardError::LibraryTaskNotFound(command.library_id.clone()))?;
        if let Some(text) = text {
            entry.text = text;
        }
        if let Some(value) = command.value {
            entry.value = value;
        }
        if let Some(icon) = command.icon {
            entry.icon = icon;
        }
        let entry = entry.clone();

        let mut propagated = 0;
        if command.propagate_to_week {
            for task in board.editable_mut().iter_tasks_mut() {
                if task.library_id.as_deref() == Some(entry.id.as_str()) {
                    task.text = entry.text.clone();
                    task.value = entry.value;
                    task.icon = entry.icon.clone();
                    propagated += 1;
                }
            }
        }

        info!("Updated library task {} ({} week instances)", entry.id, propagated);
        Ok((entry, propagated))
    }

    /// Remove a library entry; tasks already placed stay as they are
    pub fn delete_library_task(&self, board: &mut Board, library_id: &str) -> Result<LibraryTask> {
        let library = &mut board.document_mut().task_library;
        let index = library
            .iter()
            .position(|entry| entry.id == library_id)
            .ok_or_else(|| BoardError::LibraryTaskNotFound(library_id.to_string()))?;
        let entry = library.remove(index);
        info!("Deleted library task {} '{}'", entry.id, entry.text);
        Ok(entry)
    }

    // -- editable week ----------------------------------------------------

    /// Place a library task on each requested day, each copy with its own id
    pub fn add_tasks(&self, board: &mut Board, command: AddTasksCommand) -> Result<Vec<String>> {
        if command.days.is_empty() {
            return Err(BoardError::validation("Pick at least one day for the task").into());
        }
        let entry = board
            .document()
            .library_task(&command.library_id)
            .cloned()
            .ok_or_else(|| BoardError::LibraryTaskNotFound(command.library_id.clone()))?;
        let assignee = self.resolve_assignee(board, command.assignee_id.as_deref())?;

        let mut ids = Vec::with_capacity(command.days.len());
        for day in command.days {
            let task = TaskInstance::from_library(&entry, assignee.clone());
            ids.push(task.id.clone());
            board.editable_mut().tasks_mut(day).push(task);
        }

        info!("Added '{}' to {} day(s) of week {}", entry.text, ids.len(), board.displayed_week());
        Ok(ids)
    }

    /// Flip completion of a task; returns the new state
    pub fn toggle_task(&self, board: &mut Board, day: DayKey, task_id: &str) -> Result<bool> {
        let week = board.editable_mut();
        if week.find_task(day, task_id).is_none() {
            return Err(BoardError::task_not_found(day, task_id).into());
        }
        let completed = week.toggle_completed(day, task_id);
        info!("Task {} on {} is now {}", task_id, day, if completed { "done" } else { "open" });
        Ok(completed)
    }

    /// Move a task to the end of another day, completion included
    pub fn move_task(&self, board: &mut Board, command: MoveTaskCommand) -> Result<()> {
        let MoveTaskCommand {
            task_id,
            from_day,
            to_day,
        } = command;
        let week = board.editable_mut();
        let index = week
            .tasks(from_day)
            .iter()
            .position(|task| task.id == task_id)
            .ok_or_else(|| BoardError::task_not_found(from_day, &task_id))?;
        if from_day == to_day {
            return Ok(());
        }

        let task = week.tasks_mut(from_day).remove(index);
        let completed = week.is_completed(from_day, &task_id);
        week.set_completed(from_day, &task_id, false);
        week.tasks_mut(to_day).push(task);
        week.set_completed(to_day, &task_id, completed);

        info!("Moved task {} from {} to {}", task_id, from_day, to_day);
        Ok(())
    }

    /// Copy a task to another day under a new id; the copy starts open
    pub fn copy_task(&self, board: &mut Board, command: MoveTaskCommand) -> Result<String> {
        let week = board.editable_mut();
        let copy = week
            .find_task(command.from_day, &command.task_id)
            .map(TaskInstance::duplicate)
            .ok_or_else(|| BoardError::task_not_found(command.from_day, &command.task_id))?;
        let copy_id = copy.id.clone();
        week.tasks_mut(command.to_day).push(copy);

        info!("Copied task {} to {} as {}", command.task_id, command.to_day, copy_id);
        Ok(copy_id)
    }

    /// Edit one instance in the editable week
    pub fn edit_task(&self, board: &mut Board, command: EditTaskCommand) -> Result<TaskInstance> {
        let text = command.text.as_deref().map(|text| self.validate_text(text)).transpose()?;
        if let Some(value) = command.value {
            self.validate_value(value)?;
        }
        let assignee = match &command.assignee {
            AssigneeChange::Keep => None,
            AssigneeChange::Unassign => Some(Assignee::Unassigned),
            AssigneeChange::User(user_id) => Some(self.resolve_assignee(board, Some(user_id.as_str()))?),
        };

        let task = board
            .editable_mut()
            .find_task_mut(command.day, &command.task_id)
            .ok_or_else(|| BoardError::task_not_found(command.day, &command.task_id))?;
        if let Some(text) = text {
            task.text = text;
        }
        if let Some(value) = command.value {
            task.value = value;
        }
        if let Some(icon) = command.icon {
            task.icon = icon;
        }
        if let Some(assignee) = assignee {
            task.assignee = assignee;
        }

        info!("Edited task {} on {}", task.id, command.day);
        Ok(task.clone())
    }

    /// Soft delete: hidden from the board, still counted if completed
    pub fn delete_task(&self, board: &mut Board, day: DayKey, task_id: &str) -> Result<()> {
        let task = board
            .editable_mut()
            .find_task_mut(day, task_id)
            .ok_or_else(|| BoardError::task_not_found(day, task_id))?;
        task.deleted = true;
        info!("Deleted task {} on {}", task_id, day);
        Ok(())
    }

    /// Soft delete every visible task with this exact text, limited to one
    /// assignee when given
    pub fn delete_matching(&self, board: &mut Board, command: DeleteMatchingCommand) -> Result<usize> {
        if command.text.is_empty() {
            return Err(BoardError::validation("Task text cannot be empty").into());
        }

        let mut deleted = 0;
        for task in board.editable_mut().iter_tasks_mut() {
            let owner_matches = match &command.assignee_id {
                Some(user_id) => task.assignee.is_user(user_id),
                None => true,
            };
            if !task.deleted && task.text == command.text && owner_matches {
                task.deleted = true;
                deleted += 1;
            }
        }

        info!("Deleted {} tasks named '{}'", deleted, command.text);
        Ok(deleted)
    }

    fn resolve_assignee(&self, board: &Board, user_id: Option<&str>) -> Result<Assignee> {
        match user_id {
            None => Ok(Assignee::Unassigned),
            Some(id) if id.is_empty() => Ok(Assignee::Unassigned),
            Some(id) => match board.document().user(id) {
                Some(user) => Ok(Assignee::user(&user.id)),
                None => Err(BoardError::UserNotFound(id.to_string()).into()),
            },
        }
    }

    fn validate_text(&self, text: &str) -> Result<String> {
        let text = text.trim();
        if text.is_empty() {
            return Err(BoardError::validation("Task text cannot be empty").into());
        }
        Ok(text.to_string())
    }

    fn validate_value(&self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(BoardError::validation("Task value must be a number").into());
        }
        Ok(())
    }
}
