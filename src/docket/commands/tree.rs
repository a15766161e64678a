use crate::codec::{breadcrumb, prefix_code};
use crate::commands::{CmdResult, TreeLine};
use crate::config::DocketConfig;
use crate::error::Result;
use crate::store::DataStore;

/// Lists folders in display order: only visible ones, or every folder with `all`.
pub fn run<S: DataStore>(store: &S, config: &DocketConfig, all: bool) -> Result<CmdResult> {
    let session = store.load_session()?;
    let tree = &session.taxonomy;
    let nodes = if all {
        tree.nodes().iter().collect()
    } else {
        tree.visible_nodes()
    };
    let lines = nodes
        .into_iter()
        .map(|node| TreeLine {
            node: node.clone(),
            breadcrumb: breadcrumb(&node.id, tree, &config.separator),
            code: prefix_code(&node.id, tree),
            has_children: tree.has_children(&node.id),
            pending: session.ledger.count_in_subtree(&node.id),
        })
        .collect();
    Ok(CmdResult::default().with_tree(lines))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::folders::{self, FolderAction};
    use crate::commands::helpers::test_support::upload_to;
    use crate::store::memory::InMemoryStore;

    #[test]
    fn collapsed_tree_shows_top_level_only() {
        let store = InMemoryStore::new();
        let res = run(&store, &DocketConfig::default(), false).unwrap();
        assert_eq!(res.tree.len(), 8);
        assert!(res.tree.iter().all(|l| l.node.level == 0));
        assert_eq!(res.tree[3].code, "III");

        let all = run(&store, &DocketConfig::default(), true).unwrap();
        assert_eq!(all.tree.len(), 44);
    }

    #[test]
    fn expanding_reveals_children() {
        let mut store = InMemoryStore::new();
        folders::run(&mut store, FolderAction::Toggle("3".into())).unwrap();
        let res = run(&store, &DocketConfig::default(), false).unwrap();
        let ids: Vec<&str> = res.tree.iter().map(|l| l.node.id.as_str()).collect();
        assert!(ids.contains(&"3.1"));
        assert!(!ids.contains(&"3.1.1"));
    }

    #[test]
    fn pending_counts_roll_up() {
        let mut store = InMemoryStore::new();
        upload_to(&mut store, "3.1.2", &["a", "b"]);
        upload_to(&mut store, "3.2", &["c"]);
        let res = run(&store, &DocketConfig::default(), true).unwrap();
        let count = |id: &str| res.tree.iter().find(|l| l.node.id == id).unwrap().pending;
        assert_eq!(count("3"), 3);
        assert_eq!(count("3.1"), 2);
        assert_eq!(count("3.1.1"), 0);
        assert_eq!(count("4"), 0);
    }
}
