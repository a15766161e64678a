//! # Path Codec
//!
//! Pure functions turning a folder's position in the tree into strings:
//!
//! - a **breadcrumb** for humans: `III. INŠTALACIJE → 01 STROJNE INSTALACIJE`
//! - a **prefix code** for document codes: `III.01`
//!
//! Both walk the ancestor chain by truncating id segments. Ancestors missing
//! from the tree are skipped, so a dangling id degrades to a shorter result
//! instead of failing.
//!
//! Token extraction follows the naming convention of the taxonomy:
//! top-level names start with a roman numeral terminated by `.` (`"III. …"`),
//! deeper names start with a decimal ordinal (`"01 …"`). A top-level name with
//! no roman numeral falls back to its leading digits (`"0 PODATKI"` → `"0"`).

use crate::model::FolderNode;
use crate::tree::TaxonomyTree;

pub const DEFAULT_SEPARATOR: &str = " → ";

/// Nodes on the path from the top level down to `id` that still exist.
pub fn path_nodes<'a>(id: &str, tree: &'a TaxonomyTree) -> Vec<&'a FolderNode> {
    let mut nodes = Vec::new();
    for (pos, _) in id.match_indices('.') {
        if let Some(node) = tree.get(&id[..pos]) {
            nodes.push(node);
        }
    }
    if let Some(node) = tree.get(id) {
        nodes.push(node);
    }
    nodes
}

pub fn breadcrumb(id: &str, tree: &TaxonomyTree, separator: &str) -> String {
    path_nodes(id, tree)
        .iter()
        .map(|n| n.name.as_str())
        .collect::<Vec<_>>()
        .join(separator)
}

pub fn prefix_code(id: &str, tree: &TaxonomyTree) -> String {
    path_nodes(id, tree)
        .iter()
        .filter_map(|node| code_token(&node.name, node.level))
        .collect::<Vec<_>>()
        .join(".")
}

/// The short code a folder name contributes at the given level.
pub fn code_token(name: &str, level: usize) -> Option<&str> {
    let name = name.trim_start();
    if level == 0 {
        if let Some(roman) = roman_prefix(name) {
            return Some(roman);
        }
    }
    leading_digits(name)
}

fn roman_prefix(name: &str) -> Option<&str> {
    let end = name
        .find(|c: char| !matches!(c, 'I' | 'V' | 'X' | 'L' | 'C' | 'D' | 'M'))
        .unwrap_or(name.len());
    if end > 0 && name[end..].starts_with('.') {
        Some(&name[..end])
    } else {
        None
    }
}

fn leading_digits(name: &str) -> Option<&str> {
    let end = name
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(name.len());
    if end > 0 {
        Some(&name[..end])
    } else {
        None
    }
}

/// Joins a prefix and a zero-padded sequence number into a document code.
pub fn document_code(prefix: &str, sequence: u32, width: usize) -> String {
    if prefix.is_empty() {
        format!("{:0width$}", sequence, width = width)
    } else {
        format!("{}.{:0width$}", prefix, sequence, width = width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FolderNode;

    fn sample() -> TaxonomyTree {
        TaxonomyTree::from(vec![
            FolderNode::new("1", "I. ALFA"),
            FolderNode::new("1.1", "01 BETA"),
            FolderNode::new("3", "III. INŠTALACIJE"),
            FolderNode::new("3.1", "01 STROJNE INSTALACIJE"),
            FolderNode::new("3.1.2", "02 ŠPRINKLER"),
            FolderNode::new("4", "Misc"),
            FolderNode::new("4.1", "no digits"),
        ])
    }

    #[test]
    fn prefix_code_from_roman_and_ordinals() {
        let t = sample();
        assert_eq!(prefix_code("1.1", &t), "I.01");
        assert_eq!(prefix_code("3.1.2", &t), "III.01.02");
        assert_eq!(prefix_code("3", &t), "III");
    }

    #[test]
    fn unmatched_levels_are_filtered_not_padded() {
        let t = sample();
        assert_eq!(prefix_code("4.1", &t), "");
        assert_eq!(prefix_code("4", &t), "");
    }

    #[test]
    fn missing_ancestors_are_skipped() {
        let mut t = sample();
        t.delete_subtree("3");
        assert_eq!(prefix_code("3.1.2", &t), "");
        assert_eq!(breadcrumb("3.1.2", &t, DEFAULT_SEPARATOR), "");

        let t = TaxonomyTree::from(vec![
            FolderNode::new("3", "III. X"),
            FolderNode::new("3.1.2", "02 Y"),
        ]);
        assert_eq!(prefix_code("3.1.2", &t), "III.02");
    }

    #[test]
    fn breadcrumb_joins_names() {
        let t = sample();
        assert_eq!(
            breadcrumb("3.1.2", &t, DEFAULT_SEPARATOR),
            "III. INŠTALACIJE → 01 STROJNE INSTALACIJE → 02 ŠPRINKLER"
        );
        assert_eq!(breadcrumb("1.1", &t, " / "), "I. ALFA / 01 BETA");
    }

    #[test]
    fn code_tokens() {
        assert_eq!(code_token("III. INŠTALACIJE", 0), Some("III"));
        assert_eq!(code_token("0 PODATKI O POGODBI", 0), Some("0"));
        assert_eq!(code_token("IV ZAKLJUČNA", 0), None);
        assert_eq!(code_token("01 STROJNE", 1), Some("01"));
        assert_eq!(code_token("III. not at depth", 1), None);
        assert_eq!(code_token("", 2), None);
    }

    #[test]
    fn prefix_code_is_stable_for_unchanged_tree() {
        let t = sample();
        assert_eq!(prefix_code("3.1.2", &t), prefix_code("3.1.2", &t));
    }

    #[test]
    fn rename_changes_future_prefix() {
        let mut t = sample();
        t.rename("1.1", "07 BETA");
        assert_eq!(prefix_code("1.1", &t), "I.07");
    }

    #[test]
    fn document_codes() {
        assert_eq!(document_code("I.01", 1, 3), "I.01.001");
        assert_eq!(document_code("I.01", 1234, 3), "I.01.1234");
        assert_eq!(document_code("", 7, 3), "007");
    }
}
