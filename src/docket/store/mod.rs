//! # Storage Layer
//!
//! All state that must survive a restart goes through the [`DataStore`] trait.
//! Commands load a [`Session`], mutate it through the core types, and save it
//! back once. That single save is the transaction edge: finalization updates
//! counters, clears the ledger and appends finalized documents in one write.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: production storage.
//! - [`memory::InMemoryStore`]: in-memory storage for tests, with simulated
//!   write failures.
//!
//! ## Storage Format
//!
//! For `FileStore`:
//! ```text
//! <workspace>/
//! ├── session.json        # Session: taxonomy, counters, ledger, finalized set
//! ├── content/{uuid}      # Uploaded binary content, one file per document
//! └── config.json         # DocketConfig
//! ```
//!
//! Binary content is kept apart from the session so that loading the session
//! never reads document bytes.

use crate::error::Result;
use crate::ledger::IntakeLedger;
use crate::model::{ContentRef, FinalizedDocument, NodeCounters};
use crate::tree::TaxonomyTree;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub mod fs;
pub mod memory;

/// Everything the workspace persists apart from binary content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub taxonomy: TaxonomyTree,
    #[serde(default)]
    pub counters: NodeCounters,
    #[serde(default)]
    pub ledger: IntakeLedger,
    #[serde(default)]
    pub finalized: Vec<FinalizedDocument>,
    /// Names of every file finalized so far, used as a duplicate guard.
    #[serde(default)]
    pub processed_files: Vec<String>,
}

impl Session {
    /// Folder ids still referenced by counters, pending entries or finalized
    /// documents. None of them may be handed to a new folder.
    pub fn referenced_nodes(&self) -> HashSet<String> {
        self.counters
            .iter()
            .map(|(id, _)| id.to_string())
            .chain(self.ledger.iter().map(|e| e.target_node_id().to_string()))
            .chain(self.finalized.iter().map(|d| d.node_id.clone()))
            .collect()
    }

    pub fn is_known_file(&self, file_name: &str) -> bool {
        self.processed_files.iter().any(|f| f == file_name) || self.ledger.contains_file(file_name)
    }
}

/// Abstract interface for workspace storage.
pub trait DataStore {
    /// Loads the session. A store that has never been written yields
    /// `Session::default()`, which carries the default taxonomy.
    fn load_session(&self) -> Result<Session>;

    /// Replaces the persisted session as one atomic unit.
    fn save_session(&mut self, session: &Session) -> Result<()>;

    fn put_content(&mut self, bytes: &[u8]) -> Result<ContentRef>;

    /// `None` when the blob is missing.
    fn read_content(&self, content: &ContentRef) -> Result<Option<Vec<u8>>>;

    /// Deleting a missing blob is not an error.
    fn delete_content(&mut self, content: &ContentRef) -> Result<()>;

    /// Removes every stored blob, returning how many were removed.
    fn clear_content(&mut self) -> Result<usize>;
}
