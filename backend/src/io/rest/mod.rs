//! # REST API Interface Layer
//!
//! HTTP endpoints for the chore board. Handlers translate JSON bodies from
//! the `shared` crate into domain commands, call [`BoardService`], and
//! translate [`BoardError`] back into status codes.
//!
//! [`BoardService`]: crate::domain::BoardService
//! [`BoardError`]: crate::domain::BoardError

pub mod board_apis;
pub mod data_apis;
pub mod error;
pub mod library_apis;
pub mod mappers;
pub mod payout_apis;
pub mod recurring_apis;
pub mod template_apis;
pub mod user_apis;
pub mod week_apis;
