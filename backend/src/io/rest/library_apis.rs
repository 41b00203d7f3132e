//! # REST API for the Task Library

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::info;

use crate::io::rest::error::error_response;
use crate::io::rest::mappers::TaskMapper;
use crate::AppState;
use shared::{CreateLibraryTaskRequest, LibraryTaskResponse, UpdateLibraryTaskRequest};

/// Add a reusable task to the library
pub async fn create_library_task(
    State(state): State<AppState>,
    Json(request): Json<CreateLibraryTaskRequest>,
) -> impl IntoResponse {
    info!("POST /api/library - request: {:?}", request);

    let command = TaskMapper::to_create_library_command(request);
    match state.board_service.add_library_task(command).await {
        Ok(task) => {
            let response = LibraryTaskResponse {
                success_message: format!("Added '{}' to the library", task.text),
                task: TaskMapper::library_to_dto(task),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => error_response("create library task", e),
    }
}

/// Update a library task, optionally rewriting its copies in the displayed week
pub async fn update_library_task(
    State(state): State<AppState>,
    Path(library_id): Path<String>,
    Json(request): Json<UpdateLibraryTaskRequest>,
) -> impl IntoResponse {
    info!("PUT /api/library/{} - request: {:?}", library_id, request);

    let command = TaskMapper::to_update_library_command(library_id, request);
    match state.board_service.update_library_task(command).await {
        Ok((task, updated)) => {
            let success_message = if updated > 0 {
                format!("Updated '{}' and {} task(s) this week", task.text, updated)
            } else {
                format!("Updated '{}'", task.text)
            };
            let response = LibraryTaskResponse {
                success_message,
                task: TaskMapper::library_to_dto(task),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("update library task", e),
    }
}

/// Remove a library task; placed copies stay on the board
pub async fn delete_library_task(
    State(state): State<AppState>,
    Path(library_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/library/{}", library_id);

    match state.board_service.delete_library_task(&library_id).await {
        Ok(task) => {
            let response = LibraryTaskResponse {
                success_message: format!("Removed '{}' from the library", task.text),
                task: TaskMapper::library_to_dto(task),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("delete library task", e),
    }
}
