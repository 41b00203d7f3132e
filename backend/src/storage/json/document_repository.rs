//! Board document persistence on top of [`JsonFileConnection`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use tracing::{error, info, warn};

use super::connection::JsonFileConnection;
use crate::domain::models::BoardDocument;
use crate::storage::traits::DocumentStorage;

#[derive(Debug, Clone)]
pub struct DocumentRepository {
    connection: JsonFileConnection,
}

enum ReadOutcome {
    Missing,
    Unreadable,
    Loaded(BoardDocument),
}

impl DocumentRepository {
    pub fn new(connection: JsonFileConnection) -> Self {
        Self { connection }
    }

    pub fn connection(&self) -> &JsonFileConnection {
        &self.connection
    }

    /// Keep a broken file around, the next save would replace it
    async fn quarantine(&self, path: &Path) {
        let quarantine = self.connection.quarantine_path(path);
        match self.connection.rename(path, &quarantine).await {
            Ok(()) => warn!("Moved unreadable {} to {}", path.display(), quarantine.display()),
            Err(e) => warn!("{:#}", e),
        }
    }

    async fn read_document(&self, path: &Path) -> ReadOutcome {
        let bytes = match self.connection.read(path).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return ReadOutcome::Missing,
            Err(e) => {
                error!("{:#}", e);
                return ReadOutcome::Unreadable;
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return ReadOutcome::Missing;
        }

        match serde_json::from_slice::<BoardDocument>(&bytes) {
            Ok(document) => ReadOutcome::Loaded(document),
            Err(e) => {
                error!("Failed to parse {}: {}", path.display(), e);
                ReadOutcome::Unreadable
            }
        }
    }
}

#[async_trait]
impl DocumentStorage for DocumentRepository {
    async fn load(&self) -> Result<Option<BoardDocument>> {
        let primary = self.connection.primary_path();
        let document = match self.read_document(&primary).await {
            ReadOutcome::Loaded(document) => Some(document),
            outcome => {
                if matches!(outcome, ReadOutcome::Unreadable) {
                    self.quarantine(&primary).await;
                }

                let backup = self.connection.backup_path();
                match self.read_document(&backup).await {
                    ReadOutcome::Loaded(document) => {
                        warn!("Loaded board from fallback copy {}", backup.display());
                        Some(document)
                    }
                    ReadOutcome::Unreadable => {
                        self.quarantine(&backup).await;
                        None
                    }
                    ReadOutcome::Missing => None,
                }
            }
        };

        match document {
            Some(document) if !document.is_blank() => {
                info!(
                    "Loaded board: {} users, {} weeks, {} payouts",
                    document.users.len(),
                    document.weeks.len(),
                    document.payouts.len()
                );
                Ok(Some(document))
            }
            _ => {
                info!("No stored board found in {}", self.connection.base_directory().display());
                Ok(None)
            }
        }
    }

    async fn save(&self, document: &BoardDocument) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(document).context("Failed to serialize board document")?;
        self.connection
            .write_atomic(&self.connection.primary_path(), &bytes)
            .await?;
        self.connection
            .write_atomic(&self.connection.backup_path(), &bytes)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Assignee, TaskInstance, User, WeekSnapshot};
    use crate::domain::WeekId;
    use crate::storage::json::test_utils::TestEnvironment;
    use chrono::{TimeZone, Utc};
    use shared::DayKey;

    fn sample_document() -> BoardDocument {
        let now = Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).unwrap();
        let mut document = BoardDocument::seeded(now);
        let user_id = document.users[0].id.clone();
        let mut week = WeekSnapshot::empty();
        let task = TaskInstance::new("Dishes", 5.0, "", Assignee::user(&user_id));
        week.set_completed(DayKey::Monday, &task.id, true);
        week.tasks_mut(DayKey::Monday).push(task);
        document.weeks.insert(WeekId::new(2026, 10).unwrap(), week);
        document
    }

    #[tokio::test]
    async fn test_missing_files_mean_first_run() {
        let env = TestEnvironment::new().await.unwrap();
        assert!(env.repository.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let env = TestEnvironment::new().await.unwrap();
        let document = sample_document();
        env.repository.save(&document).await.unwrap();

        assert!(env.connection.primary_path().exists());
        assert!(env.connection.backup_path().exists());
        assert_eq!(env.repository.load().await.unwrap(), Some(document));
    }

    #[tokio::test]
    async fn test_corrupt_primary_falls_back_to_backup() {
        let env = TestEnvironment::new().await.unwrap();
        let document = sample_document();
        env.repository.save(&document).await.unwrap();
        std::fs::write(env.connection.primary_path(), b"{ not json").unwrap();

        assert_eq!(env.repository.load().await.unwrap(), Some(document));
        assert!(!env.connection.primary_path().exists());
        let quarantined = std::fs::read_dir(env.base_directory())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .any(|entry| entry.file_name().to_string_lossy().starts_with("board.corrupt-"));
        assert!(quarantined);
    }

    #[tokio::test]
    async fn test_unreadable_everything_is_first_run() {
        let env = TestEnvironment::new().await.unwrap();
        std::fs::write(env.connection.primary_path(), b"[1, 2").unwrap();
        std::fs::write(env.connection.backup_path(), b"").unwrap();
        assert!(env.repository.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_server_created_marker_is_first_run() {
        let env = TestEnvironment::new().await.unwrap();
        std::fs::write(env.connection.primary_path(), br#"{"created":"2026-01-01T00:00:00.000Z"}"#).unwrap();
        assert!(env.repository.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_legacy_document_loads_with_defaults() {
        let env = TestEnvironment::new().await.unwrap();
        let legacy = r#"{
            "users": [{"id": "u1", "name": "Isak"}],
            "weeks": {"2025-W05": {"days": {"monday": [{"id": "t1", "text": "Trash", "value": 2, "assignee": "Isak"}]}}}
        }"#;
        std::fs::write(env.connection.primary_path(), legacy).unwrap();

        let document = env.repository.load().await.unwrap().unwrap();
        let user: &User = &document.users[0];
        assert_eq!(user.fixed_allowance, 0.0);
        let week = &document.weeks[&WeekId::new(2025, 5).unwrap()];
        assert_eq!(week.days.len(), 8);
        assert_eq!(
            week.tasks(DayKey::Monday)[0].assignee,
            Assignee::Named { name: "Isak".to_string() }
        );
    }

    #[tokio::test]
    async fn test_one_bad_value_keeps_the_rest_of_the_board() {
        let env = TestEnvironment::new().await.unwrap();
        let stored = r#"{
            "users": [{"id": "u1", "name": "Maja", "fixed_allowance": 20, "archived_balance": 500}],
            "task_library": [{"id": "l1", "text": "Dishes", "value": null}],
            "weeks": {"2026-W10": {"days": {"friday": [{"id": "t1", "text": "Trash", "value": null, "assignee": 42}]}}}
        }"#;
        std::fs::write(env.connection.primary_path(), stored).unwrap();
        std::fs::write(env.connection.backup_path(), stored).unwrap();

        let document = env.repository.load().await.unwrap().unwrap();
        assert_eq!(document.users.len(), 1);
        assert_eq!(document.users[0].archived_balance, 500.0);
        assert_eq!(document.task_library[0].value, 0.0);
        let task = &document.weeks[&WeekId::new(2026, 10).unwrap()].tasks(DayKey::Friday)[0];
        assert_eq!(task.value, 0.0);
        assert_eq!(task.assignee, Assignee::Unassigned);
        assert!(env.connection.primary_path().exists());
    }

    #[tokio::test]
    async fn test_unreadable_backup_is_quarantined_too() {
        let env = TestEnvironment::new().await.unwrap();
        std::fs::write(env.connection.primary_path(), b"{ broken").unwrap();
        std::fs::write(env.connection.backup_path(), b"{ also broken").unwrap();

        assert!(env.repository.load().await.unwrap().is_none());
        assert!(!env.connection.backup_path().exists());
        let names: Vec<String> = std::fs::read_dir(env.base_directory())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        assert!(names.iter().any(|name| name.starts_with("board.corrupt-")));
        assert!(names.iter().any(|name| name.starts_with("board.backup.corrupt-")));
    }
}
