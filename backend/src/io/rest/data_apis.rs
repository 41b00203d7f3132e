//! # REST API for Whole-Document Access
//!
//! Read, export and import the persisted board document.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use tracing::info;

use crate::domain::models::BoardDocument;
use crate::domain::BoardError;
use crate::io::rest::error::error_response;
use crate::AppState;
use shared::{ActionResponse, ImportRequest};

pub const EXPORT_FILE_NAME: &str = "chore-board-export.json";

/// Get the whole board document
pub async fn get_data(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/data");

    match state.board_service.export().await {
        Ok(document) => (StatusCode::OK, Json(document)).into_response(),
        Err(e) => error_response("read data", e),
    }
}

/// Download the whole board document as a file
pub async fn export_data(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/export");

    match state.board_service.export().await {
        Ok(document) => {
            let disposition = format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME);
            (StatusCode::OK, [(header::CONTENT_DISPOSITION, disposition)], Json(document)).into_response()
        }
        Err(e) => error_response("export data", e),
    }
}

/// Overwrite the board with an imported document
pub async fn import_data(
    State(state): State<AppState>,
    Json(request): Json<ImportRequest>,
) -> impl IntoResponse {
    info!("POST /api/import - confirm: {}", request.confirm);

    let document = match serde_json::from_value::<BoardDocument>(request.document) {
        Ok(document) => document,
        Err(e) => {
            return error_response(
                "import data",
                BoardError::validation(format!("Invalid board document: {}", e)).into(),
            )
        }
    };

    match state.board_service.import(document, request.confirm).await {
        Ok(()) => {
            let response = ActionResponse {
                success_message: "Board data imported".to_string(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("import data", e),
    }
}
