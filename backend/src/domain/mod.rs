//! # Domain Module
//!
//! Contains all business logic of the chore board.
//!
//! The board is a weekly calendar of tasks assigned to household members.
//! Completed tasks and each member's fixed weekly allowance add up to what
//! the member has earned; payouts are subtracted to give the balance that
//! is still owed. Nothing here knows about HTTP or the on-disk format.
//!
//! ## Module Organization
//!
//! - **week_identity**: ISO-8601 week identifiers used as week store keys
//! - **recurring_engine**: seeds never-seen weeks from recurring rules
//! - **balance_service**: the ledger, a pure fold over weeks and payouts
//! - **archive_service**: folds old weeks and payouts into archived balances
//! - **board**: the in-memory board with its single editable week
//! - **user_service / task_service / week_service / payout_service**:
//!   lifecycle operations on the board
//! - **undo**: the single pending undo action and its deadline
//! - **board_service**: async orchestration of load, mutate, prune and save
//!
//! ## Business Rules
//!
//! - Tasks reference users by id; deleted users leave tombstones, never
//!   name matches that a new user could inherit
//! - A week is stored under exactly one identifier
//! - Pruning never changes any balance
//! - Destructive actions are reversible for a short undo window

pub mod archive_service;
pub mod balance_service;
pub mod board;
pub mod board_service;
pub mod clock;
pub mod commands;
pub mod errors;
pub mod models;
pub mod payout_service;
pub mod recurring_engine;
pub mod task_service;
pub mod undo;
pub mod user_service;
pub mod week_identity;
pub mod week_service;

pub use archive_service::{ArchiveReport, ArchiveService};
pub use balance_service::{Balance, BalanceService, WeeklyTotal};
pub use board::Board;
pub use board_service::{BoardOverview, BoardService, BoardSettings};
pub use clock::{Clock, FixedClock, SystemClock};
pub use errors::BoardError;
pub use recurring_engine::RecurringEngine;
pub use undo::{UndoAction, UndoManager};
pub use week_identity::{week_identifier_of, WeekId, WeekIdParseError};
