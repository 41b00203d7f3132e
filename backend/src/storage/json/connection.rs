use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

const PRIMARY_FILE: &str = "board.json";
const BACKUP_FILE: &str = "board.backup.json";

/// JsonFileConnection manages the data directory and the files in it
#[derive(Debug, Clone)]
pub struct JsonFileConnection {
    base_directory: PathBuf,
}

impl JsonFileConnection {
    /// Create a connection rooted at `base_directory`, creating it if needed
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            std::fs::create_dir_all(&base_path)
                .with_context(|| format!("Failed to create data directory {}", base_path.display()))?;
            info!("Created data directory {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn primary_path(&self) -> PathBuf {
        self.base_directory.join(PRIMARY_FILE)
    }

    pub fn backup_path(&self) -> PathBuf {
        self.base_directory.join(BACKUP_FILE)
    }

    /// Where an unreadable data file is moved before it gets replaced
    pub fn quarantine_path(&self, path: &Path) -> PathBuf {
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("board");
        let stamp = chrono::Utc::now().format("%Y%m%d%H%M%S");
        self.base_directory.join(format!("{}.corrupt-{}.json", stem, stamp))
    }

    /// Read a file, `None` when it does not exist
    pub async fn read(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    /// Replace `path` with `bytes` so readers never see a partial file
    pub async fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(PRIMARY_FILE);
        // unique per write so concurrent writers never share a temp file
        let temp_path = path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()));

        tokio::fs::write(&temp_path, bytes)
            .await
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        tokio::fs::rename(&temp_path, path)
            .await
            .with_context(|| format!("Failed to move {} into place", temp_path.display()))?;

        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    pub async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        tokio::fs::rename(from, to)
            .await
            .with_context(|| format!("Failed to move {} to {}", from.display(), to.display()))
    }
}
