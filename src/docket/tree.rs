//! # Taxonomy Tree
//!
//! The folder tree is an ordered `Vec<FolderNode>` in display order. A node's
//! whole subtree always occupies the contiguous run right after it, and
//! siblings appear in display order. Every structural mutation preserves this.
//!
//! Parent/child relationships are derived from the dot-delimited ids. To avoid
//! prefix scans over the whole list, the tree keeps a derived index (id →
//! position, parent id → ordered child ids) that is rebuilt after every
//! structural change.
//!
//! Operations addressing an id that does not exist are no-ops: they return
//! `false`/`None` and never error. Callers that need confirmation check
//! [`TaxonomyTree::contains`] first.

use crate::error::{DocketError, Result};
use crate::model::{is_descendant, level_of, parent_id, FolderNode, ROOT};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::Range;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "Vec<FolderNode>", into = "Vec<FolderNode>")]
pub struct TaxonomyTree {
    nodes: Vec<FolderNode>,
    positions: HashMap<String, usize>,
    children: HashMap<String, Vec<String>>,
}

impl PartialEq for TaxonomyTree {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
    }
}

impl From<Vec<FolderNode>> for TaxonomyTree {
    fn from(nodes: Vec<FolderNode>) -> Self {
        let mut tree = Self {
            nodes,
            positions: HashMap::new(),
            children: HashMap::new(),
        };
        tree.reindex();
        tree
    }
}

impl From<TaxonomyTree> for Vec<FolderNode> {
    fn from(tree: TaxonomyTree) -> Self {
        tree.nodes
    }
}

impl Default for TaxonomyTree {
    fn default() -> Self {
        Self::from(default_structure())
    }
}

impl TaxonomyTree {
    pub fn empty() -> Self {
        Self::from(Vec::new())
    }

    /// Builds a tree from untrusted input, rejecting anything that would break
    /// the id/level or contiguity invariants.
    pub fn try_from_nodes(nodes: Vec<FolderNode>) -> Result<Self> {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (pos, node) in nodes.iter().enumerate() {
            if node.id.is_empty() || node.id.split('.').any(|seg| seg.is_empty()) {
                return Err(DocketError::InvalidImport(format!(
                    "element {}: malformed id '{}'",
                    pos, node.id
                )));
            }
            if node.id == ROOT {
                return Err(DocketError::InvalidImport(format!(
                    "element {}: '{}' is reserved",
                    pos, ROOT
                )));
            }
            if node.level != level_of(&node.id) {
                return Err(DocketError::InvalidImport(format!(
                    "element {}: level {} does not match id '{}'",
                    pos, node.level, node.id
                )));
            }
            if seen.insert(node.id.as_str(), pos).is_some() {
                return Err(DocketError::InvalidImport(format!(
                    "element {}: duplicate id '{}'",
                    pos, node.id
                )));
            }
            if let Some(parent) = parent_id(&node.id) {
                // The closest shallower node before this one must be its parent,
                // otherwise the parent's subtree would not be contiguous.
                let enclosing = nodes[..pos].iter().rev().find(|n| n.level < node.level);
                if enclosing.map(|n| n.id.as_str()) != Some(parent) {
                    return Err(DocketError::InvalidImport(format!(
                        "element {}: '{}' is not placed inside its parent '{}'",
                        pos, node.id, parent
                    )));
                }
            }
        }
        Ok(Self::from(nodes))
    }

    pub fn nodes(&self) -> &[FolderNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&FolderNode> {
        self.positions.get(id).map(|&pos| &self.nodes[pos])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Direct children in display order. Pass [`ROOT`] for top-level folders.
    pub fn children(&self, id: &str) -> &[String] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn first(&self) -> Option<&FolderNode> {
        self.nodes.first()
    }

    /// The node and all its descendants, in display order.
    pub fn subtree(&self, id: &str) -> &[FolderNode] {
        match self.position(id) {
            Some(pos) => &self.nodes[self.block(pos)],
            None => &[],
        }
    }

    /// Appends a folder as the last child of `parent` (or as a new top-level
    /// folder when `parent` is [`ROOT`]). Returns the new id, or `None` when the
    /// parent does not exist or no segment above the largest sibling is free.
    pub fn insert(&mut self, parent: &str, name: impl Into<String>) -> Option<String> {
        self.insert_avoiding(parent, name, |_| false)
    }

    /// Like [`insert`](Self::insert), but never allocates an id for which
    /// `taken` returns true. Used to keep ids of deleted folders that are still
    /// referenced by counters or documents out of circulation.
    pub fn insert_avoiding<F>(
        &mut self,
        parent: &str,
        name: impl Into<String>,
        taken: F,
    ) -> Option<String>
    where
        F: Fn(&str) -> bool,
    {
        let (insert_at, prefix) = if parent == ROOT {
            (self.nodes.len(), None)
        } else {
            let pos = self.position(parent)?;
            (self.block(pos).end, Some(parent))
        };

        let make_id = |segment: u64| match prefix {
            Some(p) => format!("{}.{}", p, segment),
            None => segment.to_string(),
        };
        let mut segment = match self
            .children(parent)
            .iter()
            .filter_map(|child| child.rsplit('.').next())
            .filter_map(|seg| seg.parse::<u64>().ok())
            .max()
        {
            Some(max) => max.checked_add(1)?,
            None => 1,
        };
        while taken(&make_id(segment)) || self.contains(&make_id(segment)) {
            segment = segment.checked_add(1)?;
        }

        let id = make_id(segment);
        debug!(id = %id, parent, "inserting folder");
        self.nodes.insert(insert_at, FolderNode::new(id.clone(), name));
        self.reindex();
        Some(id)
    }

    pub fn rename(&mut self, id: &str, name: impl Into<String>) -> bool {
        match self.positions.get(id) {
            Some(&pos) => {
                self.nodes[pos].name = name.into();
                true
            }
            None => false,
        }
    }

    /// Removes the folder and everything below it. Returns the removed nodes.
    pub fn delete_subtree(&mut self, id: &str) -> Vec<FolderNode> {
        let Some(pos) = self.position(id) else {
            return Vec::new();
        };
        let range = self.block(pos);
        let removed: Vec<FolderNode> = self.nodes.drain(range).collect();
        debug!(id, removed = removed.len(), "deleted subtree");
        self.reindex();
        removed
    }

    /// Moves the folder's subtree in front of its previous sibling's subtree.
    /// Returns false when the folder is already first among its siblings.
    pub fn move_up(&mut self, id: &str) -> bool {
        let Some(pos) = self.position(id) else {
            return false;
        };
        let level = self.nodes[pos].level;
        let parent = parent_id(id);

        let mut sibling = None;
        for i in (0..pos).rev() {
            let candidate = &self.nodes[i];
            if candidate.level < level {
                break;
            }
            if candidate.level == level && parent_id(&candidate.id) == parent {
                sibling = Some(i);
                break;
            }
        }
        let Some(start) = sibling else {
            return false;
        };

        let end = self.block(pos).end;
        self.nodes[start..end].rotate_left(pos - start);
        debug!(id, "moved folder up");
        self.reindex();
        true
    }

    /// Moves the folder's subtree behind its next sibling's subtree.
    /// Returns false when the folder is already last among its siblings.
    pub fn move_down(&mut self, id: &str) -> bool {
        let Some(pos) = self.position(id) else {
            return false;
        };
        let level = self.nodes[pos].level;
        let parent = parent_id(id);
        let own_end = self.block(pos).end;

        let mut sibling = None;
        for i in own_end..self.nodes.len() {
            let candidate = &self.nodes[i];
            if candidate.level < level {
                break;
            }
            if candidate.level == level && parent_id(&candidate.id) == parent {
                sibling = Some(i);
                break;
            }
        }
        let Some(sib) = sibling else {
            return false;
        };

        let end = self.block(sib).end;
        self.nodes[pos..end].rotate_left(sib - pos);
        debug!(id, "moved folder down");
        self.reindex();
        true
    }

    /// Flips `expanded`; descendants are always collapsed.
    pub fn toggle(&mut self, id: &str) -> bool {
        let Some(expanded) = self.get(id).map(|n| n.expanded) else {
            return false;
        };
        self.apply_expanded(id, !expanded);
        true
    }

    /// Sets `expanded`; descendants are collapsed either way.
    pub fn set_expanded(&mut self, id: &str, expanded: bool) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.apply_expanded(id, expanded);
        true
    }

    fn apply_expanded(&mut self, id: &str, expanded: bool) {
        let Some(pos) = self.position(id) else {
            return;
        };
        let range = self.block(pos);
        self.nodes[pos].expanded = expanded;
        for node in &mut self.nodes[range.start + 1..range.end] {
            node.expanded = false;
        }
    }

    /// A folder is visible when every existing strict ancestor is expanded.
    /// Top-level folders are always visible.
    pub fn is_visible(&self, id: &str) -> bool {
        let mut current = parent_id(id);
        while let Some(ancestor) = current {
            if let Some(node) = self.get(ancestor) {
                if !node.expanded {
                    return false;
                }
            }
            current = parent_id(ancestor);
        }
        true
    }

    pub fn has_children(&self, id: &str) -> bool {
        !self.children(id).is_empty()
    }

    pub fn visible_nodes(&self) -> Vec<&FolderNode> {
        self.nodes
            .iter()
            .filter(|n| self.is_visible(&n.id))
            .collect()
    }

    /// The contiguous index range holding the node at `pos` and its subtree.
    fn block(&self, pos: usize) -> Range<usize> {
        let id = &self.nodes[pos].id;
        let mut end = pos + 1;
        while end < self.nodes.len() && is_descendant(&self.nodes[end].id, id) {
            end += 1;
        }
        pos..end
    }

    fn reindex(&mut self) {
        self.positions.clear();
        self.children.clear();
        for (pos, node) in self.nodes.iter().enumerate() {
            self.positions.insert(node.id.clone(), pos);
            let parent = parent_id(&node.id).unwrap_or(ROOT).to_string();
            self.children.entry(parent).or_default().push(node.id.clone());
        }
    }
}

/// The structure a fresh workspace starts with.
pub fn default_structure() -> Vec<FolderNode> {
    [
        ("0", "0 PODATKI O POGODBI"),
        ("1", "I. GRADBENA DELA"),
        ("1.1", "01 BETONSKA DELA"),
        ("1.2", "02 ZIDARSKA DELA"),
        ("2", "II. PRIPRAVLJALNA DELA"),
        ("3", "III. INŠTALACIJE"),
        ("3.1", "01 STROJNE INSTALACIJE"),
        ("3.1.1", "01 OGREVANJE IN HLAJENJE"),
        ("3.1.2", "02 ŠPRINKLER INŠTALACIJA"),
        ("3.1.3", "03 VODOVOD"),
        ("3.1.4", "04 PREZRAČEVANJE"),
        ("3.1.5", "05 PLINI"),
        ("3.1.6", "06 CEVNA POŠTA"),
        ("3.2", "02 ELEKTRO INSTALACIJE"),
        ("3.2.1", "01 INŠTALACIJSKI MATERIAL"),
        ("3.2.2", "02 SVETILKE SPLOŠNE RAZSVETLJAVE"),
        ("3.2.3", "03 SVETILKE VARNOSTNE RAZSVETLJAVE"),
        ("3.2.4", "04 RAZDELILNIKI"),
        ("4", "IV. ZAKLJUČNA GRADBENA DELA"),
        ("4.1", "01 OKNA"),
        ("4.2", "02 OPREMA"),
        ("4.2.1", "01 MEDICINSKA OPREMA"),
        ("4.2.2", "02 POHIŠTVENA OPREMA"),
        ("4.2.3", "03 TIPSKA OPREMA"),
        ("4.3", "03 SLIKOPLESKARSKA DELA"),
        ("4.4", "04 SUHOMONTAŽNA DELA"),
        ("4.5", "05 TLAKARSKA DELA"),
        ("4.6", "06 VRATA"),
        ("4.7", "07 KLJUČAVNIČARSKA DELA"),
        ("5", "V. KROVSTVO IN DRUGA SPEC. GRADBENA DELA"),
        ("6", "VI. IZKAZI IN POROČILA"),
        ("6.1", "01 GRADBENIŠTVO"),
        ("6.2", "02 ELEKTRO INŠTALACIJE"),
        ("6.3", "03 STROJNE INŠTALACIJE"),
        ("6.4", "04 MEDICINSKA OPREMA"),
        ("6.5", "05 ČISTI PROSTORI"),
        ("7", "VII. NAVODILA ZA UPORABO"),
        ("7.1", "01 GRADBENIŠTVO"),
        ("7.2", "02 ELEKTRO INŠTALACIJE"),
        ("7.3", "03 STROJNE INŠTALACIJE"),
        ("7.4", "04 OPREMA"),
        ("7.4.1", "01 MEDICINSKA OPREMA"),
        ("7.4.2", "02 POHIŠTVENA OPREMA"),
        ("7.4.3", "03 TIPSKA OPREMA"),
    ]
    .into_iter()
    .map(|(id, name)| FolderNode::new(id, name))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(ids: &[&str]) -> TaxonomyTree {
        TaxonomyTree::from(
            ids.iter()
                .map(|id| FolderNode::new(*id, format!("node {}", id)))
                .collect::<Vec<_>>(),
        )
    }

    fn ids(tree: &TaxonomyTree) -> Vec<&str> {
        tree.nodes().iter().map(|n| n.id.as_str()).collect()
    }

    /// Every subtree is a contiguous run starting at its root.
    fn assert_contiguous(tree: &TaxonomyTree) {
        let nodes = tree.nodes();
        for (pos, node) in nodes.iter().enumerate() {
            let members: Vec<usize> = nodes
                .iter()
                .enumerate()
                .filter(|(_, n)| n.id == node.id || is_descendant(&n.id, &node.id))
                .map(|(i, _)| i)
                .collect();
            let expected: Vec<usize> = (pos..pos + members.len()).collect();
            assert_eq!(members, expected, "subtree of {} not contiguous", node.id);
            assert_eq!(node.level, level_of(&node.id));
        }
    }

    #[test]
    fn default_structure_is_well_formed() {
        let t = TaxonomyTree::default();
        assert_contiguous(&t);
        assert!(TaxonomyTree::try_from_nodes(default_structure()).is_ok());
        assert_eq!(t.children(ROOT).len(), 8);
    }

    #[test]
    fn insert_lands_after_parents_last_descendant() {
        let mut t = tree(&["1", "1.1", "2"]);
        let id = t.insert("1", "Gamma").unwrap();
        assert_eq!(id, "1.2");
        assert_eq!(ids(&t), vec!["1", "1.1", "1.2", "2"]);
        assert_eq!(t.get("1.2").unwrap().level, 1);
        assert_contiguous(&t);
    }

    #[test]
    fn insert_skips_past_nested_descendants() {
        let mut t = tree(&["1", "1.1", "1.1.1", "1.1.2", "2"]);
        t.insert("1", "New").unwrap();
        assert_eq!(ids(&t), vec!["1", "1.1", "1.1.1", "1.1.2", "1.2", "2"]);
    }

    #[test]
    fn insert_at_root_appends_top_level() {
        let mut t = tree(&["0", "1", "1.1"]);
        let id = t.insert(ROOT, "New top").unwrap();
        assert_eq!(id, "2");
        assert_eq!(ids(&t), vec!["0", "1", "1.1", "2"]);
        assert_eq!(t.get("2").unwrap().level, 0);
    }

    #[test]
    fn insert_under_missing_parent_is_noop() {
        let mut t = tree(&["1"]);
        assert_eq!(t.insert("9", "x"), None);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn insert_avoids_taken_ids() {
        let mut t = tree(&["1", "1.1"]);
        let id = t.insert_avoiding("1", "x", |id| id == "1.2").unwrap();
        assert_eq!(id, "1.3");
    }

    #[test]
    fn insert_past_largest_segment_is_noop() {
        let max = u64::MAX.to_string();
        let mut t =
            TaxonomyTree::try_from_nodes(vec![FolderNode::new(max.clone(), "I. X")]).unwrap();
        assert_eq!(t.insert(ROOT, "II. Y"), None);
        assert_eq!(ids(&t), vec![max.as_str()]);

        let below = (u64::MAX - 1).to_string();
        let mut t = tree(&[below.as_str()]);
        assert_eq!(t.insert_avoiding(ROOT, "II. Y", |id| id == max), None);
        assert_eq!(t.insert(ROOT, "II. Y"), Some(max));
    }

    #[test]
    fn rename_only_touches_name() {
        let mut t = tree(&["1", "1.1"]);
        assert!(t.rename("1.1", "01 NEW"));
        assert_eq!(t.get("1.1").unwrap().name, "01 NEW");
        assert_eq!(ids(&t), vec!["1", "1.1"]);
        assert!(!t.rename("7", "nothing"));
    }

    #[test]
    fn delete_removes_whole_subtree() {
        let mut t = tree(&["1", "3", "3.1", "3.1.1", "31"]);
        let removed = t.delete_subtree("3");
        assert_eq!(removed.len(), 3);
        assert_eq!(ids(&t), vec!["1", "31"]);
        assert!(t.delete_subtree("3").is_empty());
    }

    #[test]
    fn move_down_swaps_blocks() {
        let mut t = tree(&["1", "1.1", "1.2", "1.2.1", "2"]);
        assert!(t.move_down("1.1"));
        assert_eq!(ids(&t), vec!["1", "1.2", "1.2.1", "1.1", "2"]);
        assert_contiguous(&t);
    }

    #[test]
    fn move_up_swaps_blocks() {
        let mut t = tree(&["1", "1.1", "1.1.1", "1.2", "1.2.1", "1.2.2"]);
        assert!(t.move_up("1.2"));
        assert_eq!(ids(&t), vec!["1", "1.2", "1.2.1", "1.2.2", "1.1", "1.1.1"]);
        assert_contiguous(&t);
    }

    #[test]
    fn move_stops_at_ancestor_boundary() {
        let mut t = tree(&["1", "1.1", "2", "2.1"]);
        assert!(!t.move_up("2.1"));
        assert!(!t.move_down("1.1"));
        assert!(!t.move_up("1"));
        assert!(!t.move_down("2"));
        assert_eq!(ids(&t), vec!["1", "1.1", "2", "2.1"]);
    }

    #[test]
    fn move_of_missing_id_is_noop() {
        let mut t = tree(&["1", "2"]);
        assert!(!t.move_up("5"));
        assert!(!t.move_down("5"));
    }

    #[test]
    fn top_level_move_carries_subtree() {
        let mut t = TaxonomyTree::default();
        assert!(t.move_up("3"));
        let order = ids(&t);
        let three = order.iter().position(|id| *id == "3").unwrap();
        let two = order.iter().position(|id| *id == "2").unwrap();
        assert!(three < two);
        let subtree: Vec<&str> = t.subtree("3").iter().map(|n| n.id.as_str()).collect();
        assert_eq!(subtree.len(), 13);
        assert_eq!(&order[three..three + subtree.len()], subtree.as_slice());
        assert_contiguous(&t);
    }

    #[test]
    fn moves_keep_other_sibling_order() {
        let mut t = TaxonomyTree::default();
        let before: Vec<String> = t.children("4").to_vec();
        assert!(t.move_down("4.2"));
        let after: Vec<String> = t.children("4").to_vec();
        assert_eq!(after[0], before[0]);
        assert_eq!(after[1], before[2]);
        assert_eq!(after[2], before[1]);
        assert_eq!(&after[3..], &before[3..]);
        // Untouched groups keep their order.
        assert_eq!(t.children("3.1"), TaxonomyTree::default().children("3.1"));
    }

    #[test]
    fn operation_sequence_preserves_contiguity() {
        let mut t = TaxonomyTree::default();
        let targets = ["3.1", "4.2", "1", "7.4", "3", "6.2", "4.2.2", "0"];
        for (step, id) in targets.iter().cycle().take(40).enumerate() {
            match step % 4 {
                0 => {
                    t.move_down(id);
                }
                1 => {
                    t.move_up(id);
                }
                2 => {
                    t.insert(id, "extra");
                }
                _ => {
                    t.toggle(id);
                }
            }
            assert_contiguous(&t);
        }
    }

    #[test]
    fn collapse_cascades_to_descendants() {
        let mut t = tree(&["3", "3.1", "3.1.1"]);
        t.set_expanded("3", true);
        t.set_expanded("3.1", true);
        assert!(t.is_visible("3.1.1"));

        t.set_expanded("3", false);
        assert!(!t.get("3.1").unwrap().expanded);
        assert!(!t.is_visible("3.1"));
        assert!(!t.is_visible("3.1.1"));
    }

    #[test]
    fn toggle_expands_one_level() {
        let mut t = tree(&["3", "3.1", "3.1.1"]);
        assert!(t.toggle("3"));
        assert!(t.is_visible("3.1"));
        assert!(!t.is_visible("3.1.1"));
        assert!(t.toggle("3"));
        assert!(!t.is_visible("3.1"));
    }

    #[test]
    fn top_level_always_visible() {
        let t = TaxonomyTree::default();
        assert!(t.is_visible("3"));
        assert!(!t.is_visible("3.1"));
        assert_eq!(t.visible_nodes().len(), 8);
    }

    #[test]
    fn has_children_is_direct_only() {
        let t = tree(&["1", "1.1", "2", "10"]);
        assert!(t.has_children("1"));
        assert!(!t.has_children("1.1"));
        assert!(!t.has_children("2"));
        assert!(!t.has_children("missing"));
    }

    #[test]
    fn import_rejects_broken_structures() {
        let bad_level = vec![FolderNode {
            id: "1.1".into(),
            name: "x".into(),
            level: 0,
            expanded: false,
        }];
        assert!(TaxonomyTree::try_from_nodes(bad_level).is_err());

        let orphan = vec![FolderNode::new("1", "a"), FolderNode::new("2.1", "b")];
        assert!(TaxonomyTree::try_from_nodes(orphan).is_err());

        let split = vec![
            FolderNode::new("1", "a"),
            FolderNode::new("2", "b"),
            FolderNode::new("1.1", "c"),
        ];
        assert!(TaxonomyTree::try_from_nodes(split).is_err());

        let dup = vec![FolderNode::new("1", "a"), FolderNode::new("1", "b")];
        assert!(TaxonomyTree::try_from_nodes(dup).is_err());
    }

    #[test]
    fn serializes_as_plain_node_list() {
        let t = tree(&["1", "1.1"]);
        let json = serde_json::to_value(&t).unwrap();
        assert!(json.is_array());
        assert_eq!(json[1]["id"], "1.1");
        let back: TaxonomyTree = serde_json::from_value(json).unwrap();
        assert_eq!(back.children("1"), &["1.1".to_string()]);
    }
}
