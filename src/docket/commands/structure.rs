use crate::commands::{CmdMessage, CmdResult};
use crate::error::{DocketError, Result};
use crate::model::FolderNode;
use crate::store::DataStore;
use crate::tree::TaxonomyTree;
use tracing::info;

/// Serializes the folder list as a JSON array of `{id, name, level, expanded}`.
pub fn export<S: DataStore>(store: &S) -> Result<CmdResult> {
    let session = store.load_session()?;
    let json = serde_json::to_string_pretty(session.taxonomy.nodes())?;
    Ok(CmdResult::default().with_output(json))
}

/// Replaces the taxonomy with the given JSON. Anything malformed rejects the
/// whole import and leaves the current taxonomy untouched.
pub fn import<S: DataStore>(store: &mut S, json: &str) -> Result<CmdResult> {
    let nodes: Vec<FolderNode> = serde_json::from_str(json)
        .map_err(|e| DocketError::InvalidImport(format!("not a folder list: {}", e)))?;
    if nodes.is_empty() {
        return Err(DocketError::InvalidImport("folder list is empty".to_string()));
    }
    let tree = TaxonomyTree::try_from_nodes(nodes)?;

    let mut session = store.load_session()?;
    let stranded = session
        .ledger
        .iter()
        .filter(|e| !tree.contains(e.target_node_id()))
        .count();
    let count = tree.len();
    session.taxonomy = tree;
    store.save_session(&session)?;
    info!(folders = count, "imported folder structure");

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Imported {} folders", count)));
    if stranded > 0 {
        result.add_message(CmdMessage::warning(format!(
            "{} pending document(s) target folders missing from the new structure",
            stranded
        )));
    }
    Ok(result)
}
