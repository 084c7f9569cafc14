use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::errors::StoreError;
use crate::storage::{PersistedSession, SessionStore};

/// JSON-file session store. Writes go through a temp file and a rename so a
/// crash mid-write never leaves a torn record.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<PersistedSession>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let session = serde_json::from_slice(&bytes)?;
        Ok(Some(session))
    }

    async fn save(&self, session: &PersistedSession) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(session)?;

        let tmp = self
            .path
            .with_extension(format!("tmp.{:08x}", rand::random::<u32>()));
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), "session persisted");
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
