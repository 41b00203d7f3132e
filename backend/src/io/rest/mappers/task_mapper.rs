use crate::domain::commands::library::{CreateLibraryTaskCommand, UpdateLibraryTaskCommand};
use crate::domain::commands::week::{
    AddTasksCommand, AssigneeChange, DeleteMatchingCommand, EditTaskCommand, MoveTaskCommand,
};
use crate::domain::models::{Assignee, LibraryTask as DomainLibraryTask, TaskInstance, User, DELETED_SUFFIX};
use shared::{
    AddTasksRequest, BoardTask, CreateLibraryTaskRequest, DeleteMatchingRequest, EditTaskRequest,
    LibraryTask as SharedLibraryTask, MoveTaskRequest, TaskAssignee, UpdateLibraryTaskRequest,
};

/// Mapper for library entries and task instances.
pub struct TaskMapper;

impl TaskMapper {
    pub fn library_to_dto(domain: DomainLibraryTask) -> SharedLibraryTask {
        SharedLibraryTask {
            id: domain.id,
            text: domain.text,
            value: domain.value,
            icon: domain.icon,
        }
    }

    pub fn to_create_library_command(request: CreateLibraryTaskRequest) -> CreateLibraryTaskCommand {
        CreateLibraryTaskCommand {
            text: request.text,
            value: request.value,
            icon: request.icon.unwrap_or_default(),
        }
    }

    pub fn to_update_library_command(library_id: String, request: UpdateLibraryTaskRequest) -> UpdateLibraryTaskCommand {
        UpdateLibraryTaskCommand {
            library_id,
            text: request.text,
            value: request.value,
            icon: request.icon,
            propagate_to_week: request.propagate_to_week,
        }
    }

    pub fn to_add_tasks_command(request: AddTasksRequest) -> AddTasksCommand {
        AddTasksCommand {
            library_id: request.library_id,
            days: request.days,
            assignee_id: request.assignee_id,
        }
    }

    pub fn to_edit_command(request: EditTaskRequest) -> EditTaskCommand {
        let assignee = match (request.assignee_id, request.unassign) {
            (Some(user_id), _) => AssigneeChange::User(user_id),
            (None, true) => AssigneeChange::Unassign,
            (None, false) => AssigneeChange::Keep,
        };
        EditTaskCommand {
            day: request.day,
            task_id: request.task_id,
            text: request.text,
            value: request.value,
            icon: request.icon,
            assignee,
        }
    }

    pub fn to_move_command(request: MoveTaskRequest) -> MoveTaskCommand {
        MoveTaskCommand {
            task_id: request.task_id,
            from_day: request.from_day,
            to_day: request.to_day,
        }
    }

    pub fn to_delete_matching_command(request: DeleteMatchingRequest) -> DeleteMatchingCommand {
        DeleteMatchingCommand {
            text: request.text,
            assignee_id: request.assignee_id.filter(|id| !id.is_empty()),
        }
    }

    /// Resolve an assignee for display
    pub fn assignee_to_dto(assignee: &Assignee, users: &[User]) -> TaskAssignee {
        match assignee {
            Assignee::Unassigned => TaskAssignee::Unassigned,
            Assignee::Active { user_id } => match users.iter().find(|user| &user.id == user_id) {
                Some(user) => TaskAssignee::User {
                    user_id: user.id.clone(),
                    name: user.name.clone(),
                },
                None => TaskAssignee::Deleted {
                    name: format!("{}{}", user_id, DELETED_SUFFIX),
                },
            },
            Assignee::Tombstoned { .. } => TaskAssignee::Deleted {
                name: assignee.tombstone_label().unwrap_or_default(),
            },
            // only exists before load repair; shown as is
            Assignee::Named { name } => match users.iter().find(|user| &user.name == name) {
                Some(user) => TaskAssignee::User {
                    user_id: user.id.clone(),
                    name: user.name.clone(),
                },
                None => TaskAssignee::Deleted {
                    name: format!("{}{}", name, DELETED_SUFFIX),
                },
            },
        }
    }

    pub fn to_board_task(task: &TaskInstance, completed: bool, users: &[User]) -> BoardTask {
        BoardTask {
            id: task.id.clone(),
            text: task.text.clone(),
            value: task.value,
            icon: task.icon.clone(),
            assignee: Self::assignee_to_dto(&task.assignee, users),
            library_id: task.library_id.clone(),
            deleted: task.deleted,
            completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use shared::DayKey;

    #[test]
    fn test_assignee_display() {
        let maja = User::new("Maja", 0.0, Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).unwrap());
        let users = vec![maja.clone()];

        assert_eq!(
            TaskMapper::assignee_to_dto(&Assignee::user(&maja.id), &users),
            TaskAssignee::User {
                user_id: maja.id.clone(),
                name: "Maja".to_string()
            }
        );
        assert_eq!(
            TaskMapper::assignee_to_dto(&Assignee::tombstone("Alva"), &users),
            TaskAssignee::Deleted {
                name: "Alva (deleted)".to_string()
            }
        );
        assert_eq!(
            TaskMapper::assignee_to_dto(&Assignee::Unassigned, &users),
            TaskAssignee::Unassigned
        );
    }

    #[test]
    fn test_edit_request_assignee_precedence() {
        let request = EditTaskRequest {
            day: DayKey::Monday,
            task_id: "task::1".to_string(),
            text: None,
            value: None,
            icon: None,
            assignee_id: Some("user::1".to_string()),
            unassign: true,
        };
        assert_eq!(
            TaskMapper::to_edit_command(request.clone()).assignee,
            AssigneeChange::User("user::1".to_string())
        );

        let unassign = EditTaskRequest {
            assignee_id: None,
            ..request
        };
        assert_eq!(TaskMapper::to_edit_command(unassign).assignee, AssigneeChange::Unassign);
    }
}
