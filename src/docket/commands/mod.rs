use crate::config::DocketConfig;
use crate::index::{DisplayDocument, DisplayEntry};
use crate::intake::IntakeReport;
use crate::model::{FinalizedDocument, FolderNode, IntakeEntry};
use std::path::PathBuf;

pub mod classify;
pub mod config;
pub mod edit;
pub mod export;
pub mod finalize;
pub mod folders;
pub mod helpers;
pub mod init;
pub mod list;
pub mod remove;
pub mod reset;
pub mod structure;
pub mod summary;
pub mod tree;
pub mod upload;

#[derive(Debug, Clone)]
pub struct DocketPaths {
    /// Workspace directory holding the session, content and config.
    pub root: PathBuf,
}

/// Destructive operations run in two steps: `Preview` reports what would be
/// removed and changes nothing, `Confirmed` executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Preview,
    Confirmed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// One row of the folder tree as shown to the user.
#[derive(Debug, Clone)]
pub struct TreeLine {
    pub node: FolderNode,
    pub breadcrumb: String,
    pub code: String,
    pub has_children: bool,
    /// Pending entries targeting this folder or anything below it.
    pub pending: usize,
}

/// Finalized document count for one folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryLine {
    pub node_id: String,
    pub breadcrumb: String,
    pub documents: usize,
    pub last_sequence: u32,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_entries: Vec<IntakeEntry>,
    pub affected_documents: Vec<FinalizedDocument>,
    pub listed_entries: Vec<DisplayEntry>,
    pub listed_documents: Vec<DisplayDocument>,
    pub tree: Vec<TreeLine>,
    pub summary: Vec<SummaryLine>,
    pub intake: Option<IntakeReport>,
    pub config: Option<DocketConfig>,
    /// Serialized payload for the caller to print or write (structure export, manifest).
    pub output: Option<String>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_entries(mut self, entries: Vec<IntakeEntry>) -> Self {
        self.affected_entries = entries;
        self
    }

    pub fn with_affected_documents(mut self, docs: Vec<FinalizedDocument>) -> Self {
        self.affected_documents = docs;
        self
    }

    pub fn with_listed_entries(mut self, entries: Vec<DisplayEntry>) -> Self {
        self.listed_entries = entries;
        self
    }

    pub fn with_listed_documents(mut self, docs: Vec<DisplayDocument>) -> Self {
        self.listed_documents = docs;
        self
    }

    pub fn with_tree(mut self, tree: Vec<TreeLine>) -> Self {
        self.tree = tree;
        self
    }

    pub fn with_summary(mut self, summary: Vec<SummaryLine>) -> Self {
        self.summary = summary;
        self
    }

    pub fn with_intake(mut self, report: IntakeReport) -> Self {
        self.intake = Some(report);
        self
    }

    pub fn with_config(mut self, config: DocketConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_output(mut self, output: String) -> Self {
        self.output = Some(output);
        self
    }

    pub fn has_level(&self, level: MessageLevel) -> bool {
        self.messages.iter().any(|m| m.level == level)
    }
}
