//! # REST API for Week Templates

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::info;

use crate::io::rest::error::error_response;
use crate::io::rest::mappers::BoardMapper;
use crate::AppState;
use shared::{ActionResponse, SaveTemplateRequest, TemplateResponse};

/// Save the displayed week as a named template
pub async fn save_template(
    State(state): State<AppState>,
    Json(request): Json<SaveTemplateRequest>,
) -> impl IntoResponse {
    info!("POST /api/templates - request: {:?}", request);

    match state.board_service.save_template(&request.name).await {
        Ok(template) => {
            let response = TemplateResponse {
                success_message: format!("Saved template '{}'", template.name),
                template: BoardMapper::template_summary(&template),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => error_response("save template", e),
    }
}

/// Replace the displayed week with a template
pub async fn load_template(State(state): State<AppState>, Path(template_id): Path<String>) -> impl IntoResponse {
    info!("POST /api/templates/{}/load", template_id);

    match state.board_service.load_template(&template_id).await {
        Ok(task_count) => {
            let response = ActionResponse {
                success_message: format!("Loaded {} task(s)", task_count),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("load template", e),
    }
}

pub async fn delete_template(State(state): State<AppState>, Path(template_id): Path<String>) -> impl IntoResponse {
    info!("DELETE /api/templates/{}", template_id);

    match state.board_service.delete_template(&template_id).await {
        Ok(template) => {
            let response = ActionResponse {
                success_message: format!("Deleted template '{}'", template.name),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("delete template", e),
    }
}
