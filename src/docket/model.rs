use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Parent id used when inserting a top-level folder.
pub const ROOT: &str = "root";

/// One folder of the taxonomy.
///
/// The id is a dot-delimited path (`"3.1.2"`), so ancestry is encoded in the id
/// itself and no parent pointer is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderNode {
    pub id: String,
    pub name: String,
    pub level: usize,
    pub expanded: bool,
}

impl FolderNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let id = id.into();
        let level = level_of(&id);
        Self {
            id,
            name: name.into(),
            level,
            expanded: false,
        }
    }

    pub fn parent_id(&self) -> Option<&str> {
        parent_id(&self.id)
    }
}

/// Depth implied by a dot-delimited id (`"1"` → 0, `"1.2"` → 1).
pub fn level_of(id: &str) -> usize {
    id.matches('.').count()
}

/// The id with its last segment removed, or `None` for a top-level id.
pub fn parent_id(id: &str) -> Option<&str> {
    id.rfind('.').map(|pos| &id[..pos])
}

/// True when `id` lies strictly below `ancestor`.
pub fn is_descendant(id: &str, ancestor: &str) -> bool {
    id.len() > ancestor.len() + 1
        && id.starts_with(ancestor)
        && id.as_bytes()[ancestor.len()] == b'.'
}

/// Reference to binary content held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentRef(pub Uuid);

impl ContentRef {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ContentRef {
    fn default() -> Self {
        Self::new()
    }
}

/// Descriptive metadata extracted from (or typed in for) a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl DocumentMeta {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.issuer.is_none() && self.number.is_none() && self.date.is_none()
    }
}

/// A partial metadata update. `Some("")` clears a field, `None` leaves it alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaPatch {
    pub title: Option<String>,
    pub issuer: Option<String>,
    pub number: Option<String>,
    pub date: Option<String>,
}

impl MetaPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.issuer.is_none() && self.number.is_none() && self.date.is_none()
    }

    pub fn apply(&self, meta: &mut DocumentMeta) {
        merge_field(&mut meta.title, &self.title);
        merge_field(&mut meta.issuer, &self.issuer);
        merge_field(&mut meta.number, &self.number);
        merge_field(&mut meta.date, &self.date);
    }
}

fn merge_field(target: &mut Option<String>, value: &Option<String>) {
    if let Some(v) = value {
        let v = v.trim();
        *target = if v.is_empty() {
            None
        } else {
            Some(v.to_string())
        };
    }
}

/// A shallow patch applied to a pending intake entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPatch {
    pub node_id: Option<String>,
    pub meta: MetaPatch,
}

/// Which intake path produced a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeKind {
    Auto,
    Direct,
}

/// Where a pending document is headed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Placement {
    /// The classifier proposed this node; the user may still redirect it.
    Auto { suggested_node_id: String },
    /// The user filed the document into this node at upload time.
    Direct { node_id: String },
}

impl Placement {
    pub fn target_node_id(&self) -> &str {
        match self {
            Placement::Auto { suggested_node_id } => suggested_node_id,
            Placement::Direct { node_id } => node_id,
        }
    }

    pub fn kind(&self) -> IntakeKind {
        match self {
            Placement::Auto { .. } => IntakeKind::Auto,
            Placement::Direct { .. } => IntakeKind::Direct,
        }
    }

    /// Points the placement at another node without changing its kind.
    pub fn retarget(&mut self, node: String) {
        match self {
            Placement::Auto { suggested_node_id } => *suggested_node_id = node,
            Placement::Direct { node_id } => *node_id = node,
        }
    }
}

/// A document waiting for finalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeEntry {
    pub id: Uuid,
    pub file_name: String,
    pub content: ContentRef,
    #[serde(default)]
    pub meta: DocumentMeta,
    pub placement: Placement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
    /// OCR or classification failed and the entry was routed to the fallback folder.
    #[serde(default)]
    pub intake_failed: bool,
    pub added_at: DateTime<Utc>,
}

impl IntakeEntry {
    pub fn new(file_name: impl Into<String>, content: ContentRef, placement: Placement) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_name: file_name.into(),
            content,
            meta: DocumentMeta::default(),
            placement,
            extracted_text: None,
            intake_failed: false,
            added_at: Utc::now(),
        }
    }

    pub fn target_node_id(&self) -> &str {
        self.placement.target_node_id()
    }

    pub fn kind(&self) -> IntakeKind {
        self.placement.kind()
    }
}

/// A document with its permanent per-folder number and code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizedDocument {
    pub id: Uuid,
    pub file_name: String,
    pub content: ContentRef,
    #[serde(default)]
    pub meta: DocumentMeta,
    pub node_id: String,
    pub origin: IntakeKind,
    pub sequence_number: u32,
    pub code: String,
    /// The target folder was missing when the code was stamped.
    #[serde(default)]
    pub needs_review: bool,
    #[serde(default)]
    pub intake_failed: bool,
    pub finalized_at: DateTime<Utc>,
}

/// Highest sequence number handed out per folder id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeCounters(BTreeMap<String, u32>);

impl NodeCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, node_id: &str) -> u32 {
        self.0.get(node_id).copied().unwrap_or(0)
    }

    /// Bumps the counter for `node_id` and returns the new value.
    pub fn next(&mut self, node_id: &str) -> u32 {
        let counter = self.0.entry(node_id.to_string()).or_insert(0);
        *counter += 1;
        *counter
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_helpers() {
        assert_eq!(level_of("3"), 0);
        assert_eq!(level_of("3.1.2"), 2);
        assert_eq!(parent_id("3.1.2"), Some("3.1"));
        assert_eq!(parent_id("3"), None);
    }

    #[test]
    fn descendant_check_respects_segment_boundaries() {
        assert!(is_descendant("1.1", "1"));
        assert!(is_descendant("1.1.4", "1"));
        assert!(!is_descendant("1", "1"));
        assert!(!is_descendant("10.1", "1"));
        assert!(!is_descendant("1.10", "1.1"));
    }

    #[test]
    fn retarget_keeps_placement_kind() {
        let mut p = Placement::Auto {
            suggested_node_id: "1.1".into(),
        };
        p.retarget("3.2".into());
        assert_eq!(p.kind(), IntakeKind::Auto);
        assert_eq!(p.target_node_id(), "3.2");
    }

    #[test]
    fn meta_patch_sets_and_clears() {
        let mut meta = DocumentMeta {
            title: Some("Old".into()),
            issuer: Some("ACME".into()),
            ..Default::default()
        };
        let patch = MetaPatch {
            title: Some("New".into()),
            issuer: Some("".into()),
            ..Default::default()
        };
        patch.apply(&mut meta);
        assert_eq!(meta.title.as_deref(), Some("New"));
        assert_eq!(meta.issuer, None);
    }

    #[test]
    fn counters_start_at_one() {
        let mut counters = NodeCounters::new();
        assert_eq!(counters.get("1.1"), 0);
        assert_eq!(counters.next("1.1"), 1);
        assert_eq!(counters.next("1.1"), 2);
        assert_eq!(counters.next("2"), 1);
        assert_eq!(counters.get("1.1"), 2);
    }
}
