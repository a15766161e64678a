//! # Code Assignment
//!
//! Finalization turns pending intake entries into permanently numbered
//! documents. It is a pure function of (entries, tree, counters) returning the
//! numbered documents and the updated counters; persisting the result is the
//! caller's job and must happen as one unit.
//!
//! 1. **Merge**: AutoClassified entries followed by DirectlyPlaced entries.
//! 2. **Order**: stable sort by target folder id, comparing the ids as plain
//!    strings. Grouping follows tree order only as long as ids were allocated
//!    in tree order.
//! 3. **Number**: each document bumps its folder's counter and takes the new
//!    value. Counters persist across rounds, so numbers never repeat.
//! 4. **Stamp**: `code = prefix_code(folder) + "." + zero-padded number`.
//!
//! A document whose folder no longer exists is still numbered and stamped with
//! whatever the degraded prefix code yields, and is flagged for review.

use crate::codec::{document_code, prefix_code};
use crate::model::{FinalizedDocument, IntakeEntry, NodeCounters};
use crate::tree::TaxonomyTree;
use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

pub const DEFAULT_CODE_WIDTH: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct Finalization {
    /// Documents in assignment order.
    pub documents: Vec<FinalizedDocument>,
    pub counters: NodeCounters,
    /// Documents stamped against a folder that no longer exists.
    pub dangling: Vec<Uuid>,
}

pub fn assign_codes(
    auto: &[IntakeEntry],
    direct: &[IntakeEntry],
    tree: &TaxonomyTree,
    counters: &NodeCounters,
    code_width: usize,
) -> Finalization {
    let mut merged: Vec<&IntakeEntry> = auto.iter().chain(direct.iter()).collect();
    merged.sort_by(|a, b| a.target_node_id().cmp(b.target_node_id()));

    let mut counters = counters.clone();
    let mut dangling = Vec::new();
    let finalized_at = Utc::now();

    let documents = merged
        .into_iter()
        .map(|entry| {
            let node_id = entry.target_node_id();
            let sequence_number = counters.next(node_id);
            let code = document_code(&prefix_code(node_id, tree), sequence_number, code_width);
            let needs_review = !tree.contains(node_id);
            if needs_review {
                warn!(
                    file = %entry.file_name,
                    node = node_id,
                    code = %code,
                    "document targets a folder that no longer exists"
                );
                dangling.push(entry.id);
            }
            debug!(file = %entry.file_name, code = %code, "assigned code");
            FinalizedDocument {
                id: entry.id,
                file_name: entry.file_name.clone(),
                content: entry.content,
                meta: entry.meta.clone(),
                node_id: node_id.to_string(),
                origin: entry.kind(),
                sequence_number,
                code,
                needs_review,
                intake_failed: entry.intake_failed,
                finalized_at,
            }
        })
        .collect();

    Finalization {
        documents,
        counters,
        dangling,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentRef, FolderNode, IntakeKind, Placement};

    fn auto(name: &str, node: &str) -> IntakeEntry {
        IntakeEntry::new(
            name,
            ContentRef::new(),
            Placement::Auto {
                suggested_node_id: node.into(),
            },
        )
    }

    fn direct(name: &str, node: &str) -> IntakeEntry {
        IntakeEntry::new(
            name,
            ContentRef::new(),
            Placement::Direct {
                node_id: node.into(),
            },
        )
    }

    fn alpha_beta() -> TaxonomyTree {
        TaxonomyTree::from(vec![
            FolderNode::new("1", "I. ALFA"),
            FolderNode::new("1.1", "01 BETA"),
        ])
    }

    fn codes(result: &Finalization) -> Vec<&str> {
        result.documents.iter().map(|d| d.code.as_str()).collect()
    }

    #[test]
    fn first_documents_in_a_folder() {
        let tree = alpha_beta();
        let entries = vec![auto("a.pdf", "1.1"), auto("b.pdf", "1.1")];
        let result = assign_codes(&entries, &[], &tree, &NodeCounters::new(), DEFAULT_CODE_WIDTH);
        assert_eq!(codes(&result), vec!["I.01.001", "I.01.002"]);
        assert_eq!(result.counters.get("1.1"), 2);
        assert!(result.dangling.is_empty());
    }

    #[test]
    fn merged_populations_number_in_concatenation_order() {
        let tree = TaxonomyTree::default();
        let autos: Vec<_> = (1..=3).map(|i| auto(&format!("a{}", i), "3.1")).collect();
        let directs: Vec<_> = (1..=2).map(|i| direct(&format!("d{}", i), "3.1")).collect();

        let result = assign_codes(&autos, &directs, &tree, &NodeCounters::new(), 3);
        let seq: Vec<(u32, &str, IntakeKind)> = result
            .documents
            .iter()
            .map(|d| (d.sequence_number, d.file_name.as_str(), d.origin))
            .collect();
        assert_eq!(
            seq,
            vec![
                (1, "a1", IntakeKind::Auto),
                (2, "a2", IntakeKind::Auto),
                (3, "a3", IntakeKind::Auto),
                (4, "d1", IntakeKind::Direct),
                (5, "d2", IntakeKind::Direct),
            ]
        );
        assert_eq!(result.documents[4].code, "III.01.005");
    }

    #[test]
    fn sorted_by_target_id_string() {
        let tree = TaxonomyTree::default();
        let entries = vec![auto("x", "4.2"), auto("y", "1.1"), auto("z", "4.2")];
        let extra = vec![direct("w", "1.1")];
        let result = assign_codes(&entries, &extra, &tree, &NodeCounters::new(), 3);
        let names: Vec<&str> = result.documents.iter().map(|d| d.file_name.as_str()).collect();
        assert_eq!(names, vec!["y", "w", "x", "z"]);
        assert_eq!(codes(&result), vec!["I.01.001", "I.01.002", "IV.02.001", "IV.02.002"]);
    }

    #[test]
    fn counters_continue_across_rounds() {
        let mut tree = alpha_beta();
        let first = assign_codes(&[auto("a", "1.1")], &[], &tree, &NodeCounters::new(), 3);

        tree.rename("1.1", "01 BETA RENAMED");
        tree.insert("1", "02 GAMMA");
        let second = assign_codes(
            &[auto("b", "1.1")],
            &[direct("c", "1.1")],
            &tree,
            &first.counters,
            3,
        );
        let seqs: Vec<u32> = second.documents.iter().map(|d| d.sequence_number).collect();
        assert_eq!(seqs, vec![2, 3]);
        assert_eq!(first.documents[0].code, "I.01.001");
        assert_eq!(second.counters.get("1.1"), 3);
    }

    #[test]
    fn input_counters_are_not_mutated() {
        let tree = alpha_beta();
        let counters = NodeCounters::new();
        let _ = assign_codes(&[auto("a", "1.1")], &[], &tree, &counters, 3);
        assert!(counters.is_empty());
    }

    #[test]
    fn dangling_target_is_degraded_and_flagged() {
        let mut tree = TaxonomyTree::default();
        tree.delete_subtree("3.1");
        let entry = direct("lost.pdf", "3.1");
        let result = assign_codes(&[], std::slice::from_ref(&entry), &tree, &NodeCounters::new(), 3);
        assert_eq!(result.documents[0].code, "III.001");
        assert!(result.documents[0].needs_review);
        assert_eq!(result.dangling, vec![entry.id]);
    }

    #[test]
    fn empty_input() {
        let result = assign_codes(&[], &[], &TaxonomyTree::default(), &NodeCounters::new(), 3);
        assert!(result.documents.is_empty());
        assert!(result.counters.is_empty());
    }
}
