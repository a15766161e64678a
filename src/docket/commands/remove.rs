use crate::commands::{CmdMessage, CmdResult, Intent};
use crate::error::{DocketError, Result};
use crate::index::DisplayIndex;
use crate::store::DataStore;

use super::helpers::resolve_indexes;

/// Removes pending entries and their stored content.
pub fn run<S: DataStore>(store: &mut S, indexes: &[DisplayIndex]) -> Result<CmdResult> {
    if let Some(idx) = indexes.iter().find(|i| !i.is_pending()) {
        return Err(DocketError::Api(format!(
            "{} is finalized and cannot be removed",
            idx
        )));
    }
    let mut session = store.load_session()?;
    let resolved = resolve_indexes(&session, indexes)?;

    let mut result = CmdResult::default();
    let mut removed = Vec::new();
    for (index, id) in resolved {
        let entry = session
            .ledger
            .remove(&id)
            .ok_or(DocketError::EntryNotFound(id))?;
        result.add_message(CmdMessage::success(format!(
            "Removed {} {}",
            index, entry.file_name
        )));
        removed.push(entry);
    }
    store.save_session(&session)?;
    for entry in &removed {
        store.delete_content(&entry.content)?;
    }
    Ok(result.with_affected_entries(removed))
}

/// Removes every pending entry. `Preview` only reports.
pub fn all<S: DataStore>(store: &mut S, intent: Intent) -> Result<CmdResult> {
    let mut session = store.load_session()?;
    let mut result = CmdResult::default();
    if session.ledger.is_empty() {
        result.add_message(CmdMessage::info("No pending documents."));
        return Ok(result);
    }
    if intent == Intent::Preview {
        result.add_message(CmdMessage::info(format!(
            "This would remove {} auto-classified and {} directly placed document(s)",
            session.ledger.auto().len(),
            session.ledger.direct().len()
        )));
        return Ok(result);
    }

    let (auto, direct) = session.ledger.drain();
    store.save_session(&session)?;
    let removed: Vec<_> = auto.into_iter().chain(direct).collect();
    for entry in &removed {
        store.delete_content(&entry.content)?;
    }
    result.add_message(CmdMessage::success(format!(
        "Removed {} pending document(s)",
        removed.len()
    )));
    Ok(result.with_affected_entries(removed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::helpers::test_support::upload_to;
    use crate::store::memory::InMemoryStore;

    #[test]
    fn removes_selected_entries_and_content() {
        let mut store = InMemoryStore::new();
        upload_to(&mut store, "1.1", &["a", "b", "c"]);
        let res = run(&mut store, &[DisplayIndex::Direct(1), DisplayIndex::Direct(3)]).unwrap();
        assert_eq!(res.affected_entries.len(), 2);

        let session = store.load_session().unwrap();
        assert_eq!(session.ledger.direct().len(), 1);
        assert_eq!(session.ledger.direct()[0].file_name, "b");
        assert_eq!(store.content_count(), 1);
    }

    #[test]
    fn finalized_indexes_are_refused() {
        let mut store = InMemoryStore::new();
        assert!(run(&mut store, &[DisplayIndex::Finalized(1)]).is_err());
    }

    #[test]
    fn unknown_index_removes_nothing() {
        let mut store = InMemoryStore::new();
        upload_to(&mut store, "1.1", &["a"]);
        assert!(run(&mut store, &[DisplayIndex::Direct(1), DisplayIndex::Direct(2)]).is_err());
        assert_eq!(store.load_session().unwrap().ledger.len(), 1);
    }

    #[test]
    fn remove_all_needs_confirmation() {
        let mut store = InMemoryStore::new();
        upload_to(&mut store, "1.1", &["a", "b"]);

        let preview = all(&mut store, Intent::Preview).unwrap();
        assert!(preview.messages[0].content.contains("2 directly placed"));
        assert_eq!(store.load_session().unwrap().ledger.len(), 2);

        let done = all(&mut store, Intent::Confirmed).unwrap();
        assert_eq!(done.affected_entries.len(), 2);
        assert!(store.load_session().unwrap().ledger.is_empty());
        assert_eq!(store.content_count(), 0);
    }
}
