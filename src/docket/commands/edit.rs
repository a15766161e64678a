use crate::commands::{CmdMessage, CmdResult};
use crate::error::{DocketError, Result};
use crate::index::DisplayIndex;
use crate::model::EntryPatch;
use crate::store::DataStore;

use super::helpers::resolve_indexes;

/// Applies a patch to a pending entry or a finalized document.
///
/// Pending entries accept both a new folder and metadata. Finalized documents
/// keep their folder and sequence number; only metadata can change.
pub fn run<S: DataStore>(store: &mut S, index: DisplayIndex, patch: EntryPatch) -> Result<CmdResult> {
    if patch.node_id.is_none() && patch.meta.is_empty() {
        return Err(DocketError::Api("Nothing to change".to_string()));
    }
    let mut session = store.load_session()?;
    let (_, id) = resolve_indexes(&session, &[index])?
        .into_iter()
        .next()
        .ok_or_else(|| DocketError::Api(format!("Index {} not found", index)))?;

    let mut result = CmdResult::default();
    if index.is_pending() {
        if let Some(node) = &patch.node_id {
            if !session.taxonomy.contains(node) {
                return Err(DocketError::NodeNotFound(node.clone()));
            }
        }
        let entry = session.ledger.edit(&id, &patch)?.clone();
        store.save_session(&session)?;
        result.add_message(CmdMessage::success(format!(
            "Updated {} {}",
            index, entry.file_name
        )));
        return Ok(result.with_affected_entries(vec![entry]));
    }

    if patch.node_id.is_some() {
        return Err(DocketError::Api(format!(
            "{} is finalized; its folder can no longer change",
            index
        )));
    }
    let doc = session
        .finalized
        .iter_mut()
        .find(|d| d.id == id)
        .ok_or(DocketError::DocumentNotFound(id))?;
    patch.meta.apply(&mut doc.meta);
    let doc = doc.clone();
    store.save_session(&session)?;
    result.add_message(CmdMessage::success(format!("Updated {} {}", index, doc.code)));
    Ok(result.with_affected_documents(vec![doc]))
}
