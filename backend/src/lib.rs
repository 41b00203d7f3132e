//! # Chore Board Backend
//!
//! Household chore board: a week of tasks per member, fixed weekly
//! allowances, payouts and lifetime balances.
//!
//! ## Layers
//!
//! - [`domain`]: the board document, week identity, ledger, archival,
//!   lifecycle services and undo
//! - [`storage`]: persistence of the board document as a JSON file
//! - [`io`]: the REST API
//! - [`config`]: layered runtime configuration
//!
//! All mutations go through [`domain::BoardService`], which serializes them
//! behind a single lock and persists the document after each one.

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::Result;
use axum::{
    http::{HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::domain::board_service::BoardSettings;
use crate::domain::{BoardService, SystemClock};
use crate::io::rest::{
    board_apis, data_apis, library_apis, payout_apis, recurring_apis, template_apis, user_apis, week_apis,
};
use crate::storage::{DocumentRepository, JsonFileConnection};

#[derive(Clone)]
pub struct AppState {
    pub board_service: BoardService,
}

pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up storage in {:?}", config.data_dir);
    let connection = JsonFileConnection::new(&config.data_dir)?;
    let repository = DocumentRepository::new(connection);

    info!("Setting up domain model");
    let board_service = BoardService::initialize(
        Arc::new(repository),
        Arc::new(SystemClock),
        BoardSettings::from(config),
    )
    .await;

    Ok(AppState { board_service })
}

pub fn create_router(app_state: AppState, config: &AppConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);
    let cors = match config.allowed_origin.as_deref().map(str::parse::<HeaderValue>) {
        Some(Ok(origin)) => cors.allow_origin(origin),
        Some(Err(e)) => {
            warn!("Ignoring invalid allowed_origin: {}", e);
            cors.allow_origin(Any)
        }
        None => cors.allow_origin(Any),
    };

    let api_routes = Router::new()
        .route("/data", get(data_apis::get_data))
        .route("/export", get(data_apis::export_data))
        .route("/import", post(data_apis::import_data))
        .route("/board", get(board_apis::get_board))
        .route("/board/navigate", post(board_apis::navigate))
        .route("/board/today", post(board_apis::go_to_today))
        .route("/undo", post(board_apis::undo))
        .route("/users", get(user_apis::list_users).post(user_apis::create_user))
        .route("/users/:id", put(user_apis::update_user).delete(user_apis::delete_user))
        .route("/users/:id/balance", get(user_apis::get_user_balance))
        .route("/balances", get(user_apis::list_balances))
        .route("/library", post(library_apis::create_library_task))
        .route(
            "/library/:id",
            put(library_apis::update_library_task).delete(library_apis::delete_library_task),
        )
        .route("/week", delete(week_apis::clear_week))
        .route("/week/tasks", post(week_apis::add_tasks).put(week_apis::edit_task))
        .route("/week/tasks/toggle", post(week_apis::toggle_task))
        .route("/week/tasks/move", post(week_apis::move_task))
        .route("/week/tasks/copy", post(week_apis::copy_task))
        .route("/week/tasks/delete", post(week_apis::delete_task))
        .route("/week/tasks/delete-matching", post(week_apis::delete_matching))
        .route("/payouts", post(payout_apis::register_payout))
        .route("/payouts/reset", post(payout_apis::reset_payouts))
        .route("/recurring", post(recurring_apis::create_recurring_rule))
        .route("/recurring/:id", delete(recurring_apis::delete_recurring_rule))
        .route("/templates", post(template_apis::save_template))
        .route("/templates/:id/load", post(template_apis::load_template))
        .route("/templates/:id", delete(template_apis::delete_template));

    let router = Router::new().nest("/api", api_routes);
    let router = match &config.static_dir {
        Some(static_dir) => {
            info!("Serving static files from {:?}", static_dir);
            router.fallback_service(ServeDir::new(static_dir))
        }
        None => router,
    };

    router.layer(cors).with_state(app_state)
}
