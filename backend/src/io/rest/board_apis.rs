//! # REST API for the Board View
//!
//! The board view is the single payload the UI renders: the displayed
//! week with its columns, totals, balances and side panels.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::info;

use crate::io::rest::error::error_response;
use crate::io::rest::mappers::BoardMapper;
use crate::AppState;
use shared::{NavigateRequest, UndoResponse};

/// Get the displayed week
pub async fn get_board(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/board");

    match state.board_service.overview().await {
        Ok(overview) => (StatusCode::OK, Json(BoardMapper::to_view(overview))).into_response(),
        Err(e) => error_response("load board", e),
    }
}

/// Step one week back or forward
pub async fn navigate(
    State(state): State<AppState>,
    Json(request): Json<NavigateRequest>,
) -> impl IntoResponse {
    info!("POST /api/board/navigate - request: {:?}", request);

    match state.board_service.navigate(request.direction).await {
        Ok(overview) => (StatusCode::OK, Json(BoardMapper::to_view(overview))).into_response(),
        Err(e) => error_response("navigate", e),
    }
}

/// Jump back to the current week
pub async fn go_to_today(State(state): State<AppState>) -> impl IntoResponse {
    info!("POST /api/board/today");

    match state.board_service.go_to_today().await {
        Ok(overview) => (StatusCode::OK, Json(BoardMapper::to_view(overview))).into_response(),
        Err(e) => error_response("go to today", e),
    }
}

/// Revert the pending destructive action
pub async fn undo(State(state): State<AppState>) -> impl IntoResponse {
    info!("POST /api/undo");

    match state.board_service.undo().await {
        Ok(label) => {
            let response = UndoResponse {
                success_message: format!("Undid: {}", label),
                restored: label,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("undo", e),
    }
}
