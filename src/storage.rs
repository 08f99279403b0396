use crate::models::Session;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, warn};

/// File-backed home of the single persisted [`Session`].
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the stored session, or `None` when nothing usable is there.
    /// Unreadable or malformed content counts as absent.
    pub async fn load(&self) -> Option<Session> {
        match fs::read(&self.path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(session) => Some(session),
                Err(err) => {
                    warn!(path = %self.path.display(), "ignoring malformed session file: {err}");
                    None
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                error!(path = %self.path.display(), "failed to read session file: {err}");
                None
            }
        }
    }

    /// Replaces the stored session. The payload goes to a sibling temp file
    /// first and is renamed over the target, so readers never see half of it.
    pub async fn save(&self, session: &Session) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let payload = serde_json::to_vec_pretty(session)?;
        let tmp = self.tmp_path();
        fs::write(&tmp, payload).await?;
        fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    /// Removes the stored session. Clearing an absent session is fine.
    pub async fn clear(&self) -> std::io::Result<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
