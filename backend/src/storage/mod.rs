//! # Storage Module
//!
//! Persists the board document.
//!
//! The whole document is read once at startup and written as one unit after
//! every change; there are no partial-document operations. The domain only
//! sees the [`DocumentStorage`] trait, so the JSON files can be swapped for
//! another backend without touching board logic.
//!
//! ## Current Implementation
//!
//! - **Primary copy**: `board.json` in the data directory, replaced
//!   atomically (write to a temp file, then rename)
//! - **Fallback copy**: `board.backup.json`, refreshed after every successful
//!   save and read when the primary is missing or unreadable

pub mod json;
pub mod traits;

pub use json::{DocumentRepository, JsonFileConnection};
pub use traits::DocumentStorage;
