//! # Export Projection
//!
//! Read-only views of the finalized document set for the two export sinks:
//!
//! - [`build_archive_paths`]: where each document goes inside an archive.
//!   Folder paths are the breadcrumb of names joined with `/`; file names are
//!   `NNN_<original name>`. Documents whose folder is gone are excluded and
//!   reported, never dropped silently.
//! - [`build_manifest_rows`]: rows for a spreadsheet renderer, sorted by
//!   folder id and grouped by top-level folder. Documents with a missing folder
//!   stay in the manifest with whatever the degraded breadcrumb and prefix
//!   code yield.

use crate::codec::{breadcrumb, path_nodes, prefix_code};
use crate::model::{ContentRef, FinalizedDocument};
use crate::tree::TaxonomyTree;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::warn;
use uuid::Uuid;

pub const MANIFEST_SEPARATOR: &str = " / ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub doc_id: Uuid,
    pub content: ContentRef,
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchivePlan {
    /// One path per existing folder, in tree order.
    pub folders: Vec<String>,
    pub entries: Vec<ArchiveEntry>,
    pub excluded: Vec<Uuid>,
    pub warnings: Vec<String>,
}

impl ArchivePlan {
    pub fn paths(&self) -> HashMap<Uuid, &str> {
        self.entries
            .iter()
            .map(|e| (e.doc_id, e.path.as_str()))
            .collect()
    }
}

pub fn build_archive_paths(
    docs: &[FinalizedDocument],
    tree: &TaxonomyTree,
    code_width: usize,
) -> ArchivePlan {
    let folder_paths: HashMap<&str, String> = tree
        .nodes()
        .iter()
        .map(|node| {
            let path = path_nodes(&node.id, tree)
                .iter()
                .map(|n| sanitize_component(&n.name))
                .collect::<Vec<_>>()
                .join("/");
            (node.id.as_str(), path)
        })
        .collect();

    let mut plan = ArchivePlan {
        folders: tree
            .nodes()
            .iter()
            .filter_map(|n| folder_paths.get(n.id.as_str()).cloned())
            .collect(),
        ..Default::default()
    };

    let mut taken: HashSet<String> = HashSet::new();
    for doc in docs {
        let Some(folder) = folder_paths.get(doc.node_id.as_str()) else {
            warn!(code = %doc.code, node = %doc.node_id, "excluding document from archive");
            plan.warnings.push(format!(
                "{} ({}) excluded: folder {} no longer exists",
                doc.code, doc.file_name, doc.node_id
            ));
            plan.excluded.push(doc.id);
            continue;
        };
        let base = format!(
            "{:0width$}_{}",
            doc.sequence_number,
            sanitize_component(&doc.file_name),
            width = code_width
        );
        let path = unique_path(folder, &base, &mut taken);
        plan.entries.push(ArchiveEntry {
            doc_id: doc.id,
            content: doc.content,
            path,
        });
    }
    plan
}

fn unique_path(folder: &str, file_name: &str, taken: &mut HashSet<String>) -> String {
    let join = |name: &str| format!("{}/{}", folder, name);
    let mut candidate = join(file_name);
    if taken.contains(&candidate) {
        let (stem, ext) = match file_name.rfind('.') {
            Some(dot) if dot > 0 => file_name.split_at(dot),
            _ => (file_name, ""),
        };
        let mut n = 2;
        while taken.contains(&candidate) {
            candidate = join(&format!("{} ({}){}", stem, n, ext));
            n += 1;
        }
    }
    taken.insert(candidate.clone());
    candidate
}

/// Makes a folder or file name safe to use as one archive path component.
pub fn sanitize_component(name: &str) -> String {
    let cleaned = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.' | '(' | ')') {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim()
        .to_string();
    if cleaned.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        cleaned
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestRow {
    pub doc_id: Uuid,
    pub sequence_number: u32,
    pub title: String,
    pub issuer: String,
    pub number: String,
    pub date: String,
    pub category: String,
    /// Prefix code the folder resolves to now; shorter than the stamped code
    /// when ancestors were deleted.
    pub folder_code: String,
    pub code: String,
    pub needs_review: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestSection {
    pub top_level_id: String,
    pub heading: String,
    pub rows: Vec<ManifestRow>,
}

pub fn build_manifest_rows(docs: &[FinalizedDocument], tree: &TaxonomyTree) -> Vec<ManifestSection> {
    let mut sorted: Vec<&FinalizedDocument> = docs.iter().collect();
    sorted.sort_by(|a, b| a.node_id.cmp(&b.node_id));

    let mut sections: Vec<ManifestSection> = Vec::new();
    for doc in sorted {
        let top = top_level_id(&doc.node_id);
        let row = ManifestRow {
            doc_id: doc.id,
            sequence_number: doc.sequence_number,
            title: doc.meta.title.clone().unwrap_or_default(),
            issuer: doc.meta.issuer.clone().unwrap_or_default(),
            number: doc.meta.number.clone().unwrap_or_default(),
            date: doc.meta.date.clone().unwrap_or_default(),
            category: breadcrumb(&doc.node_id, tree, MANIFEST_SEPARATOR),
            folder_code: prefix_code(&doc.node_id, tree),
            code: doc.code.clone(),
            needs_review: doc.needs_review || !tree.contains(&doc.node_id),
        };
        match sections.last_mut() {
            Some(section) if section.top_level_id == top => section.rows.push(row),
            _ => sections.push(ManifestSection {
                top_level_id: top.to_string(),
                heading: tree
                    .get(top)
                    .map(|n| n.name.clone())
                    .unwrap_or_else(|| top.to_string()),
                rows: vec![row],
            }),
        }
    }
    sections
}

fn top_level_id(id: &str) -> &str {
    id.split('.').next().unwrap_or(id)
}
