//! # REST API for Payouts

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::info;

use crate::io::rest::error::error_response;
use crate::io::rest::mappers::BoardMapper;
use crate::AppState;
use shared::{PayoutResponse, RegisterPayoutRequest, ResetPayoutsResponse};

/// Record money handed to a user
pub async fn register_payout(
    State(state): State<AppState>,
    Json(request): Json<RegisterPayoutRequest>,
) -> impl IntoResponse {
    info!("POST /api/payouts - request: {:?}", request);

    let command = BoardMapper::to_register_payout_command(request);
    match state.board_service.register_payout(command).await {
        Ok((payout, balance)) => {
            let response = PayoutResponse {
                success_message: format!("Paid out {:.2}", payout.amount),
                payout: BoardMapper::payout_to_dto(payout),
                new_balance: balance.balance,
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => error_response("register payout", e),
    }
}

/// Drop the payout history while keeping every balance. Undoable.
pub async fn reset_payouts(State(state): State<AppState>) -> impl IntoResponse {
    info!("POST /api/payouts/reset");

    match state.board_service.reset_payouts().await {
        Ok(removed_payouts) => {
            let response = ResetPayoutsResponse {
                removed_payouts,
                undo_seconds: state.board_service.undo_window_secs(),
                success_message: format!("Reset {} payout(s)", removed_payouts),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("reset payouts", e),
    }
}
