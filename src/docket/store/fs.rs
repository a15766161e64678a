use super::{DataStore, Session};
use crate::error::{DocketError, Result};
use crate::model::ContentRef;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

pub const SESSION_FILE: &str = "session.json";
const CONTENT_DIR: &str = "content";

pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn content_dir(&self) -> PathBuf {
        self.root.join(CONTENT_DIR)
    }

    fn content_path(&self, content: &ContentRef) -> PathBuf {
        self.content_dir().join(content.0.to_string())
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).map_err(DocketError::Io)?;
        }
        Ok(())
    }

    /// Writes through a temp file in the same directory, then renames over the target.
    fn write_atomic(&self, dir: &Path, target: &Path, bytes: &[u8]) -> Result<()> {
        self.ensure_dir(dir)?;
        let tmp = dir.join(format!(".docket-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp, bytes).map_err(DocketError::Io)?;
        fs::rename(&tmp, target).map_err(DocketError::Io)?;
        Ok(())
    }
}

impl DataStore for FileStore {
    fn load_session(&self) -> Result<Session> {
        let path = self.root.join(SESSION_FILE);
        if !path.exists() {
            return Ok(Session::default());
        }
        let content = fs::read_to_string(path).map_err(DocketError::Io)?;
        let session: Session =
            serde_json::from_str(&content).map_err(DocketError::Serialization)?;
        Ok(session)
    }

    fn save_session(&mut self, session: &Session) -> Result<()> {
        let content = serde_json::to_vec_pretty(session).map_err(DocketError::Serialization)?;
        let target = self.root.join(SESSION_FILE);
        self.write_atomic(&self.root, &target, &content)?;
        debug!(path = %target.display(), "session saved");
        Ok(())
    }

    fn put_content(&mut self, bytes: &[u8]) -> Result<ContentRef> {
        let content = ContentRef::new();
        let dir = self.content_dir();
        self.write_atomic(&dir, &self.content_path(&content), bytes)?;
        Ok(content)
    }

    fn read_content(&self, content: &ContentRef) -> Result<Option<Vec<u8>>> {
        let path = self.content_path(content);
        if !path.exists() {
            return Ok(None);
        }
        fs::read(path).map(Some).map_err(DocketError::Io)
    }

    fn delete_content(&mut self, content: &ContentRef) -> Result<()> {
        let path = self.content_path(content);
        if path.exists() {
            fs::remove_file(path).map_err(DocketError::Io)?;
        }
        Ok(())
    }

    fn clear_content(&mut self) -> Result<usize> {
        let dir = self.content_dir();
        if !dir.exists() {
            return Ok(0);
        }
        let mut removed = 0;
        for entry in fs::read_dir(&dir).map_err(DocketError::Io)? {
            let path = entry.map_err(DocketError::Io)?.path();
            if path.is_file() {
                fs::remove_file(&path).map_err(DocketError::Io)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}
