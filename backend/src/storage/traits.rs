//! # Storage Traits
//!
//! The storage abstraction the board service works against.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::BoardDocument;

/// Whole-document persistence
#[async_trait]
pub trait DocumentStorage: Send + Sync {
    /// Load the stored document.
    ///
    /// `None` means first run: nothing stored, nothing readable, or a
    /// document without any board data.
    async fn load(&self) -> Result<Option<BoardDocument>>;

    /// Replace the stored document
    async fn save(&self, document: &BoardDocument) -> Result<()>;
}
