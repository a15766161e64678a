//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It is the single
//! entry point for docket operations, whatever the UI.
//!
//! The facade:
//! - **Dispatches** to the appropriate command function
//! - **Normalizes inputs** (display indexes such as `a2`, `d1-d3` or `f4` are
//!   parsed here and turned into entry ids by the commands)
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! It does no business logic, no stdout/stderr and no formatting.
//!
//! `DocketApi<S: DataStore>` is generic over the storage backend:
//! `DocketApi<FileStore>` in production, `DocketApi<InMemoryStore>` in tests.
//!
//! API tests check that calls reach the right command with the right
//! arguments. Command logic is tested in the command modules.

use crate::commands;
use crate::config::DocketConfig;
use crate::error::{DocketError, Result};
use crate::index::{longest_population, parse_indexes, DisplayIndex};
use crate::intake::{Classifier, MetadataExtractor, TextExtractor};
use crate::model::EntryPatch;
use crate::store::DataStore;
use std::path::PathBuf;
use std::str::FromStr;

pub struct DocketApi<S: DataStore> {
    store: S,
    paths: commands::DocketPaths,
    config: DocketConfig,
}

impl<S: DataStore> DocketApi<S> {
    pub fn new(store: S, paths: commands::DocketPaths, config: DocketConfig) -> Self {
        Self {
            store,
            paths,
            config,
        }
    }

    pub fn tree(&self, all: bool) -> Result<CmdResult> {
        commands::tree::run(&self.store, &self.config, all)
    }

    pub fn folders(&mut self, action: FolderAction) -> Result<CmdResult> {
        commands::folders::run(&mut self.store, action)
    }

    pub fn export_structure(&self) -> Result<CmdResult> {
        commands::structure::export(&self.store)
    }

    pub fn import_structure(&mut self, json: &str) -> Result<CmdResult> {
        commands::structure::import(&mut self.store, json)
    }

    pub fn upload(
        &mut self,
        node_id: &str,
        files: Vec<IncomingFile>,
        metadata: Option<&dyn MetadataExtractor>,
    ) -> Result<CmdResult> {
        commands::upload::run(&mut self.store, &self.config, node_id, files, metadata)
    }

    pub fn classify(
        &mut self,
        files: Vec<IncomingFile>,
        extractor: &dyn TextExtractor,
        classifier: &dyn Classifier,
    ) -> Result<CmdResult> {
        commands::classify::run(&mut self.store, &self.config, files, extractor, classifier)
    }

    pub fn list(&self) -> Result<CmdResult> {
        commands::list::run(&self.store)
    }

    pub fn edit(&mut self, index: &str, patch: EntryPatch) -> Result<CmdResult> {
        let index = DisplayIndex::from_str(index).map_err(DocketError::Api)?;
        commands::edit::run(&mut self.store, index, patch)
    }

    pub fn remove<I: AsRef<str>>(&mut self, indexes: &[I]) -> Result<CmdResult> {
        let limit = longest_population(&self.store.load_session()?);
        let indexes = parse_inputs(indexes, limit)?;
        commands::remove::run(&mut self.store, &indexes)
    }

    pub fn remove_all(&mut self, intent: Intent) -> Result<CmdResult> {
        commands::remove::all(&mut self.store, intent)
    }

    pub fn finalize(&mut self) -> Result<CmdResult> {
        commands::finalize::run(&mut self.store, &self.config)
    }

    pub fn summary(&self) -> Result<CmdResult> {
        commands::summary::run(&self.store, &self.config)
    }

    pub fn export_archive(&self, output: Option<PathBuf>) -> Result<CmdResult> {
        commands::export::archive(&self.store, &self.config, output)
    }

    pub fn export_manifest(&self) -> Result<CmdResult> {
        commands::export::manifest(&self.store)
    }

    pub fn reset(&mut self, intent: Intent) -> Result<CmdResult> {
        commands::reset::run(&mut self.store, false, intent)
    }

    pub fn hard_reset(&mut self, intent: Intent) -> Result<CmdResult> {
        commands::reset::run(&mut self.store, true, intent)
    }

    pub fn config(&mut self, action: ConfigAction) -> Result<CmdResult> {
        let result = commands::config::run(&self.paths, action)?;
        if let Some(config) = &result.config {
            self.config = config.clone();
        }
        Ok(result)
    }

    pub fn init(&mut self) -> Result<CmdResult> {
        commands::init::run(&self.paths, &mut self.store)
    }

    pub fn paths(&self) -> &commands::DocketPaths {
        &self.paths
    }
}

fn parse_inputs<I: AsRef<str>>(inputs: &[I], limit: usize) -> Result<Vec<DisplayIndex>> {
    let inputs: Vec<String> = inputs.iter().map(|s| s.as_ref().to_string()).collect();
    parse_indexes(&inputs, limit).map_err(DocketError::Api)
}

pub use crate::commands::config::ConfigAction;
pub use crate::commands::folders::FolderAction;
pub use crate::commands::helpers::IncomingFile;
pub use commands::{CmdMessage, CmdResult, DocketPaths, Intent, MessageLevel};
