//! Conversions between the `shared` DTOs and domain types.

pub mod board_mapper;
pub mod task_mapper;
pub mod user_mapper;

pub use board_mapper::BoardMapper;
pub use task_mapper::TaskMapper;
pub use user_mapper::UserMapper;
