//! RAII test environment for storage tests.
//!
//! Test data lives in a temporary directory that is removed when the
//! environment is dropped, even if the test panics.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::connection::JsonFileConnection;
use super::document_repository::DocumentRepository;

pub struct TestEnvironment {
    /// Kept alive until drop
    _temp_dir: TempDir,
    pub connection: JsonFileConnection,
    pub repository: DocumentRepository,
    pub base_path: PathBuf,
}

impl TestEnvironment {
    pub async fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let base_path = temp_dir.path().to_path_buf();
        let connection = JsonFileConnection::new(&base_path)?;
        let repository = DocumentRepository::new(connection.clone());

        Ok(TestEnvironment {
            _temp_dir: temp_dir,
            connection,
            repository,
            base_path,
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_path
    }
}

impl Drop for TestEnvironment {
    fn drop(&mut self) {
        if std::env::var("CHORE_BOARD_DEBUG_TESTS").is_ok() {
            println!("Cleaning up test environment: {:?}", self.base_path);
        }
    }
}
