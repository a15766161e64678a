//! # Intake Ledger
//!
//! Pending documents, split into two populations by how their folder was
//! chosen: AutoClassified (a classifier suggested it) and DirectlyPlaced (the
//! user filed it at upload time). Each population keeps insertion order.
//!
//! The population of an entry is fixed by its [`Placement`] variant, so an
//! entry can never sit in both. Re-targeting an entry changes the node but
//! keeps the variant.

use crate::error::{DocketError, Result};
use crate::model::{
    is_descendant, ContentRef, DocumentMeta, EntryPatch, IntakeEntry, IntakeKind, Placement,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntakeLedger {
    #[serde(default)]
    auto: Vec<IntakeEntry>,
    #[serde(default)]
    direct: Vec<IntakeEntry>,
}

/// A file handed to direct upload, already placed in the content store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub file_name: String,
    pub content: ContentRef,
}

/// Extracted text for one file, as recorded by OCR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrResult {
    pub file_name: String,
    pub content: ContentRef,
    pub text: String,
    pub failed: bool,
}

/// The classifier's verdict for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub suggested_node_id: String,
    #[serde(default)]
    pub document_title: Option<String>,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub document_number: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

impl Classification {
    pub fn meta(&self) -> DocumentMeta {
        let clean = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        DocumentMeta {
            title: clean(&self.document_title),
            issuer: clean(&self.issuer),
            number: clean(&self.document_number),
            date: clean(&self.date),
        }
    }
}

impl IntakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn auto(&self) -> &[IntakeEntry] {
        &self.auto
    }

    pub fn direct(&self) -> &[IntakeEntry] {
        &self.direct
    }

    pub fn len(&self) -> usize {
        self.auto.len() + self.direct.len()
    }

    pub fn is_empty(&self) -> bool {
        self.auto.is_empty() && self.direct.is_empty()
    }

    /// All entries, AutoClassified first, each population in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &IntakeEntry> {
        self.auto.iter().chain(self.direct.iter())
    }

    pub fn get(&self, id: &Uuid) -> Option<&IntakeEntry> {
        self.iter().find(|e| &e.id == id)
    }

    pub fn contains_file(&self, file_name: &str) -> bool {
        self.iter().any(|e| e.file_name == file_name)
    }

    /// One DirectlyPlaced entry per file, metadata empty.
    pub fn add_direct(&mut self, node_id: &str, files: Vec<StoredFile>) -> Vec<Uuid> {
        files
            .into_iter()
            .map(|file| {
                let entry = IntakeEntry::new(
                    file.file_name,
                    file.content,
                    Placement::Direct {
                        node_id: node_id.to_string(),
                    },
                );
                let id = entry.id;
                self.direct.push(entry);
                id
            })
            .collect()
    }

    pub fn add_auto_classified(
        &mut self,
        ocr: OcrResult,
        classification: &Classification,
    ) -> Uuid {
        let mut entry = IntakeEntry::new(
            ocr.file_name,
            ocr.content,
            Placement::Auto {
                suggested_node_id: classification.suggested_node_id.clone(),
            },
        );
        entry.meta = classification.meta();
        entry.extracted_text = Some(ocr.text);
        entry.intake_failed = ocr.failed;
        let id = entry.id;
        self.auto.push(entry);
        id
    }

    /// Records an entry that could not be classified, routed to `fallback_node`.
    pub fn add_placeholder(&mut self, ocr: OcrResult, fallback_node: &str) -> Uuid {
        let mut entry = IntakeEntry::new(
            ocr.file_name,
            ocr.content,
            Placement::Auto {
                suggested_node_id: fallback_node.to_string(),
            },
        );
        entry.extracted_text = Some(ocr.text);
        entry.intake_failed = true;
        let id = entry.id;
        self.auto.push(entry);
        id
    }

    /// Merges a patch into the entry, whichever population holds it.
    pub fn edit(&mut self, id: &Uuid, patch: &EntryPatch) -> Result<&IntakeEntry> {
        let entry = self
            .auto
            .iter_mut()
            .chain(self.direct.iter_mut())
            .find(|e| &e.id == id)
            .ok_or(DocketError::EntryNotFound(*id))?;
        if let Some(node) = &patch.node_id {
            entry.placement.retarget(node.clone());
        }
        patch.meta.apply(&mut entry.meta);
        Ok(&*entry)
    }

    pub fn remove(&mut self, id: &Uuid) -> Option<IntakeEntry> {
        if let Some(pos) = self.auto.iter().position(|e| &e.id == id) {
            return Some(self.auto.remove(pos));
        }
        if let Some(pos) = self.direct.iter().position(|e| &e.id == id) {
            return Some(self.direct.remove(pos));
        }
        None
    }

    /// Empties both populations, returning what was there.
    pub fn drain(&mut self) -> (Vec<IntakeEntry>, Vec<IntakeEntry>) {
        (
            std::mem::take(&mut self.auto),
            std::mem::take(&mut self.direct),
        )
    }

    /// Entries whose target is `node_id` or lies below it.
    pub fn count_in_subtree(&self, node_id: &str) -> usize {
        self.iter()
            .filter(|e| {
                let target = e.target_node_id();
                target == node_id || is_descendant(target, node_id)
            })
            .count()
    }

    pub fn population(&self, kind: IntakeKind) -> &[IntakeEntry] {
        match kind {
            IntakeKind::Auto => &self.auto,
            IntakeKind::Direct => &self.direct,
        }
    }
}
