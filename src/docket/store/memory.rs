use super::{DataStore, Session};
use crate::error::{DocketError, Result};
use crate::model::ContentRef;
use std::collections::HashMap;

/// In-memory storage for tests.
#[derive(Default)]
pub struct InMemoryStore {
    session: Option<Session>,
    content: HashMap<ContentRef, Vec<u8>>,
    simulate_write_error: bool,
    simulate_save_error: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail, for testing error paths.
    pub fn set_simulate_write_error(&mut self, simulate: bool) {
        self.simulate_write_error = simulate;
    }

    /// Makes only session saves fail; content writes still succeed.
    pub fn set_simulate_save_error(&mut self, simulate: bool) {
        self.simulate_save_error = simulate;
    }

    pub fn content_count(&self) -> usize {
        self.content.len()
    }

    fn check_writable(&self) -> Result<()> {
        if self.simulate_write_error {
            return Err(DocketError::Store("Simulated write error".to_string()));
        }
        Ok(())
    }
}

impl DataStore for InMemoryStore {
    fn load_session(&self) -> Result<Session> {
        Ok(self.session.clone().unwrap_or_default())
    }

    fn save_session(&mut self, session: &Session) -> Result<()> {
        self.check_writable()?;
        if self.simulate_save_error {
            return Err(DocketError::Store("Simulated save error".to_string()));
        }
        self.session = Some(session.clone());
        Ok(())
    }

    fn put_content(&mut self, bytes: &[u8]) -> Result<ContentRef> {
        self.check_writable()?;
        let content = ContentRef::new();
        self.content.insert(content, bytes.to_vec());
        Ok(content)
    }

    fn read_content(&self, content: &ContentRef) -> Result<Option<Vec<u8>>> {
        Ok(self.content.get(content).cloned())
    }

    fn delete_content(&mut self, content: &ContentRef) -> Result<()> {
        self.check_writable()?;
        self.content.remove(content);
        Ok(())
    }

    fn clear_content(&mut self) -> Result<usize> {
        self.check_writable()?;
        let removed = self.content.len();
        self.content.clear();
        Ok(removed)
    }
}
