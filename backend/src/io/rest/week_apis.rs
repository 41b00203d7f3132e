//! # REST API for the Displayed Week
//!
//! Task placement, completion and editing on the week currently shown.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::info;

use crate::io::rest::error::error_response;
use crate::io::rest::mappers::TaskMapper;
use crate::AppState;
use shared::{
    ActionResponse, AddTasksRequest, AddTasksResponse, ClearWeekResponse, CopyTaskResponse, DeleteMatchingRequest,
    DeleteMatchingResponse, EditTaskRequest, MoveTaskRequest, TaskRef, ToggleTaskResponse,
};

/// Place a library task on one or more days
pub async fn add_tasks(
    State(state): State<AppState>,
    Json(request): Json<AddTasksRequest>,
) -> impl IntoResponse {
    info!("POST /api/week/tasks - request: {:?}", request);

    let command = TaskMapper::to_add_tasks_command(request);
    match state.board_service.add_tasks(command).await {
        Ok(task_ids) => {
            let response = AddTasksResponse {
                success_message: format!("Added {} task(s)", task_ids.len()),
                task_ids,
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => error_response("add tasks", e),
    }
}

/// Edit a single task instance
pub async fn edit_task(
    State(state): State<AppState>,
    Json(request): Json<EditTaskRequest>,
) -> impl IntoResponse {
    info!("PUT /api/week/tasks - request: {:?}", request);

    let command = TaskMapper::to_edit_command(request);
    let day = command.day;
    let edited = match state.board_service.edit_task(command).await {
        Ok(task) => task,
        Err(e) => return error_response("edit task", e),
    };
    match state.board_service.overview().await {
        Ok(overview) => {
            let completed = overview.week.is_completed(day, &edited.id);
            let task = TaskMapper::to_board_task(&edited, completed, &overview.users);
            (StatusCode::OK, Json(task)).into_response()
        }
        Err(e) => error_response("edit task", e),
    }
}

/// Flip the completion state of a task
pub async fn toggle_task(State(state): State<AppState>, Json(request): Json<TaskRef>) -> impl IntoResponse {
    info!("POST /api/week/tasks/toggle - request: {:?}", request);

    match state.board_service.toggle_task(request.day, &request.task_id).await {
        Ok(completed) => (StatusCode::OK, Json(ToggleTaskResponse { completed })).into_response(),
        Err(e) => error_response("toggle task", e),
    }
}

/// Move a task to another day, keeping its completion
pub async fn move_task(
    State(state): State<AppState>,
    Json(request): Json<MoveTaskRequest>,
) -> impl IntoResponse {
    info!("POST /api/week/tasks/move - request: {:?}", request);

    let command = TaskMapper::to_move_command(request);
    match state.board_service.move_task(command).await {
        Ok(()) => {
            let response = ActionResponse {
                success_message: "Task moved".to_string(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("move task", e),
    }
}

/// Copy a task to another day
pub async fn copy_task(
    State(state): State<AppState>,
    Json(request): Json<MoveTaskRequest>,
) -> impl IntoResponse {
    info!("POST /api/week/tasks/copy - request: {:?}", request);

    let command = TaskMapper::to_move_command(request);
    match state.board_service.copy_task(command).await {
        Ok(task_id) => (StatusCode::CREATED, Json(CopyTaskResponse { task_id })).into_response(),
        Err(e) => error_response("copy task", e),
    }
}

/// Soft-delete a task; a completed one keeps counting toward earnings
pub async fn delete_task(State(state): State<AppState>, Json(request): Json<TaskRef>) -> impl IntoResponse {
    info!("POST /api/week/tasks/delete - request: {:?}", request);

    match state.board_service.delete_task(request.day, &request.task_id).await {
        Ok(()) => {
            let response = ActionResponse {
                success_message: "Task removed".to_string(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("delete task", e),
    }
}

/// Soft-delete every task of the week with the given text and assignee
pub async fn delete_matching(
    State(state): State<AppState>,
    Json(request): Json<DeleteMatchingRequest>,
) -> impl IntoResponse {
    info!("POST /api/week/tasks/delete-matching - request: {:?}", request);

    let command = TaskMapper::to_delete_matching_command(request);
    match state.board_service.delete_matching(command).await {
        Ok(deleted_count) => (StatusCode::OK, Json(DeleteMatchingResponse { deleted_count })).into_response(),
        Err(e) => error_response("delete matching tasks", e),
    }
}

/// Empty the displayed week and disable its allowance. Undoable.
pub async fn clear_week(State(state): State<AppState>) -> impl IntoResponse {
    info!("DELETE /api/week");

    match state.board_service.clear_week().await {
        Ok(week_id) => {
            let response = ClearWeekResponse {
                week_id: week_id.to_string(),
                undo_seconds: state.board_service.undo_window_secs(),
                success_message: format!("Cleared week {}", week_id),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("clear week", e),
    }
}
