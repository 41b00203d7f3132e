//! # REST API for Recurring Rules

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::info;

use crate::io::rest::error::error_response;
use crate::io::rest::mappers::BoardMapper;
use crate::AppState;
use shared::{ActionResponse, CreateRecurringRuleRequest, RecurringRuleResponse};

/// Create a rule that seeds tasks into newly initialized weeks
pub async fn create_recurring_rule(
    State(state): State<AppState>,
    Json(request): Json<CreateRecurringRuleRequest>,
) -> impl IntoResponse {
    info!("POST /api/recurring - request: {:?}", request);

    let command = BoardMapper::to_recurring_command(request);
    match state.board_service.add_recurring_rule(command).await {
        Ok((rule, applied_to_current_week)) => {
            let success_message = if applied_to_current_week {
                format!("'{}' repeats from this week", rule.text)
            } else {
                format!("'{}' repeats from week {}", rule.text, rule.start_week)
            };
            let response = RecurringRuleResponse {
                rule: BoardMapper::rule_to_dto(rule),
                applied_to_current_week,
                success_message,
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => error_response("create recurring rule", e),
    }
}

/// Delete a rule; tasks it already seeded stay on the board
pub async fn delete_recurring_rule(State(state): State<AppState>, Path(rule_id): Path<String>) -> impl IntoResponse {
    info!("DELETE /api/recurring/{}", rule_id);

    match state.board_service.delete_recurring_rule(&rule_id).await {
        Ok(rule) => {
            let response = ActionResponse {
                success_message: format!("'{}' no longer repeats", rule.text),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("delete recurring rule", e),
    }
}
