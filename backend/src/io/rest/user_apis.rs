//! # REST API for User Management
//!
//! Endpoints for creating, updating and deleting household members and
//! reading their balances.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::info;

use crate::io::rest::error::error_response;
use crate::io::rest::mappers::UserMapper;
use crate::AppState;
use shared::{BalanceListResponse, CreateUserRequest, UpdateUserRequest, UserListResponse, UserResponse};

/// List all users
pub async fn list_users(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/users");

    match state.board_service.users().await {
        Ok(users) => {
            let response = UserListResponse {
                users: users.into_iter().map(UserMapper::to_dto).collect(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("list users", e),
    }
}

/// Create a new user
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> impl IntoResponse {
    info!("POST /api/users - request: {:?}", request);

    let command = UserMapper::to_create_command(request);
    match state.board_service.create_user(command).await {
        Ok(user) => {
            let response = UserResponse {
                success_message: format!("{} was added", user.name),
                user: UserMapper::to_dto(user),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => error_response("create user", e),
    }
}

/// Update a user
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> impl IntoResponse {
    info!("PUT /api/users/{} - request: {:?}", user_id, request);

    let command = UserMapper::to_update_command(user_id, request);
    match state.board_service.update_user(command).await {
        Ok(user) => {
            let response = UserResponse {
                success_message: format!("{} was updated", user.name),
                user: UserMapper::to_dto(user),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("update user", e),
    }
}

/// Delete a user together with their tasks and payouts. Undoable.
pub async fn delete_user(State(state): State<AppState>, Path(user_id): Path<String>) -> impl IntoResponse {
    info!("DELETE /api/users/{}", user_id);

    match state.board_service.delete_user(&user_id).await {
        Ok(result) => {
            let undo_seconds = state.board_service.undo_window_secs();
            (StatusCode::OK, Json(UserMapper::to_delete_response(result, undo_seconds))).into_response()
        }
        Err(e) => error_response("delete user", e),
    }
}

/// Get the lifetime balance of one user
pub async fn get_user_balance(State(state): State<AppState>, Path(user_id): Path<String>) -> impl IntoResponse {
    info!("GET /api/users/{}/balance", user_id);

    match state.board_service.user_balance(&user_id).await {
        Ok((user, balance)) => (StatusCode::OK, Json(UserMapper::to_balance_dto(&user, balance))).into_response(),
        Err(e) => error_response("get balance", e),
    }
}

/// Get the balances of every user
pub async fn list_balances(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/balances");

    match state.board_service.balances().await {
        Ok(balances) => {
            let response = BalanceListResponse {
                balances: balances
                    .into_iter()
                    .map(|(user, balance)| UserMapper::to_balance_dto(&user, balance))
                    .collect(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("list balances", e),
    }
}
