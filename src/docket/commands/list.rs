use crate::commands::CmdResult;
use crate::error::Result;
use crate::index::{index_documents, index_entries};
use crate::store::DataStore;

/// Pending entries (`a`/`d` indexes) and finalized documents (`f` indexes).
pub fn run<S: DataStore>(store: &S) -> Result<CmdResult> {
    let session = store.load_session()?;
    Ok(CmdResult::default()
        .with_listed_entries(index_entries(&session))
        .with_listed_documents(index_documents(&session)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::finalize;
    use crate::commands::helpers::test_support::upload_to;
    use crate::config::DocketConfig;
    use crate::index::DisplayIndex;
    use crate::store::memory::InMemoryStore;

    #[test]
    fn lists_pending_then_finalized() {
        let mut store = InMemoryStore::new();
        upload_to(&mut store, "1.1", &["a.pdf"]);
        finalize::run(&mut store, &DocketConfig::default()).unwrap();
        upload_to(&mut store, "1.1", &["b.pdf", "c.pdf"]);

        let res = run(&store).unwrap();
        let pending: Vec<DisplayIndex> = res.listed_entries.iter().map(|e| e.index).collect();
        assert_eq!(pending, vec![DisplayIndex::Direct(1), DisplayIndex::Direct(2)]);
        assert_eq!(res.listed_documents.len(), 1);
        assert_eq!(res.listed_documents[0].document.code, "I.01.001");
    }

    #[test]
    fn empty_workspace() {
        let res = run(&InMemoryStore::new()).unwrap();
        assert!(res.listed_entries.is_empty());
        assert!(res.listed_documents.is_empty());
    }
}
