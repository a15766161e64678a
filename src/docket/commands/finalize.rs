use crate::assign::assign_codes;
use crate::commands::{CmdMessage, CmdResult};
use crate::config::DocketConfig;
use crate::error::Result;
use crate::store::DataStore;
use tracing::info;

/// Numbers every pending entry and commits the result.
///
/// The new counters, the emptied ledger, the appended finalized documents and
/// the processed file names are written in one session save. If that save
/// fails, nothing has changed.
pub fn run<S: DataStore>(store: &mut S, config: &DocketConfig) -> Result<CmdResult> {
    let mut session = store.load_session()?;
    let mut result = CmdResult::default();
    if session.ledger.is_empty() {
        result.add_message(CmdMessage::info("Nothing to finalize."));
        return Ok(result);
    }

    let outcome = assign_codes(
        session.ledger.auto(),
        session.ledger.direct(),
        &session.taxonomy,
        &session.counters,
        config.code_width,
    );

    session.ledger.drain();
    session.counters = outcome.counters;
    session
        .processed_files
        .extend(outcome.documents.iter().map(|d| d.file_name.clone()));
    session.finalized.extend(outcome.documents.iter().cloned());
    store.save_session(&session)?;

    info!(documents = outcome.documents.len(), "finalized batch");
    for doc in outcome.documents.iter().filter(|d| d.needs_review) {
        result.add_message(CmdMessage::warning(format!(
            "{} ({}) targets missing folder {}; review its code",
            doc.code, doc.file_name, doc.node_id
        )));
    }
    result.add_message(CmdMessage::success(format!(
        "Finalized {} document(s)",
        outcome.documents.len()
    )));
    Ok(result.with_affected_documents(outcome.documents))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::classify;
    use crate::commands::folders::{self, FolderAction};
    use crate::commands::helpers::test_support::{file, upload_to};
    use crate::commands::MessageLevel;
    use crate::intake::{RecordedResult, RecordedResults};
    use crate::ledger::Classification;
    use crate::store::memory::InMemoryStore;

    fn codes(res: &CmdResult) -> Vec<&str> {
        res.affected_documents.iter().map(|d| d.code.as_str()).collect()
    }

    #[test]
    fn commits_codes_and_clears_ledger() {
        let mut store = InMemoryStore::new();
        upload_to(&mut store, "1.1", &["a.pdf", "b.pdf"]);

        let res = run(&mut store, &DocketConfig::default()).unwrap();
        assert_eq!(codes(&res), vec!["I.01.001", "I.01.002"]);

        let session = store.load_session().unwrap();
        assert!(session.ledger.is_empty());
        assert_eq!(session.counters.get("1.1"), 2);
        assert_eq!(session.finalized.len(), 2);
        assert_eq!(session.processed_files, vec!["a.pdf", "b.pdf"]);
    }

    #[test]
    fn auto_entries_number_before_direct_ones() {
        let mut store = InMemoryStore::new();
        upload_to(&mut store, "3.1", &["d1", "d2"]);
        let recorded = RecordedResults::new(
            ["a1", "a2", "a3"]
                .iter()
                .map(|n| RecordedResult {
                    file: n.to_string(),
                    text: Some("scan".into()),
                    error: None,
                    classification: Some(Classification {
                        suggested_node_id: "3.1".into(),
                        ..Default::default()
                    }),
                })
                .collect(),
        );
        classify::run(
            &mut store,
            &DocketConfig::default(),
            vec![file("a1"), file("a2"), file("a3")],
            &recorded,
            &recorded,
        )
        .unwrap();

        let res = run(&mut store, &DocketConfig::default()).unwrap();
        let order: Vec<(&str, u32)> = res
            .affected_documents
            .iter()
            .map(|d| (d.file_name.as_str(), d.sequence_number))
            .collect();
        assert_eq!(
            order,
            vec![("a1", 1), ("a2", 2), ("a3", 3), ("d1", 4), ("d2", 5)]
        );
    }

    #[test]
    fn later_rounds_continue_numbering_after_tree_edits() {
        let mut store = InMemoryStore::new();
        let config = DocketConfig::default();
        upload_to(&mut store, "1.1", &["a"]);
        run(&mut store, &config).unwrap();

        folders::run(
            &mut store,
            FolderAction::Rename {
                id: "1.1".into(),
                name: "05 BETON".into(),
            },
        )
        .unwrap();
        folders::run(&mut store, FolderAction::Down("1.1".into())).unwrap();
        upload_to(&mut store, "1.1", &["b", "c"]);

        let res = run(&mut store, &config).unwrap();
        assert_eq!(codes(&res), vec!["I.05.002", "I.05.003"]);
        let session = store.load_session().unwrap();
        assert_eq!(session.finalized[0].code, "I.01.001");
        assert_eq!(session.finalized.len(), 3);
    }

    #[test]
    fn failed_commit_changes_nothing() {
        let mut store = InMemoryStore::new();
        upload_to(&mut store, "1.1", &["a"]);
        let before = store.load_session().unwrap();

        store.set_simulate_write_error(true);
        assert!(run(&mut store, &DocketConfig::default()).is_err());
        store.set_simulate_write_error(false);

        assert_eq!(store.load_session().unwrap(), before);
        let res = run(&mut store, &DocketConfig::default()).unwrap();
        assert_eq!(codes(&res), vec!["I.01.001"]);
    }

    #[test]
    fn dangling_target_is_reported() {
        let mut store = InMemoryStore::new();
        upload_to(&mut store, "3.1", &["lost.pdf"]);
        folders::run(
            &mut store,
            FolderAction::Remove {
                id: "3.1".into(),
                intent: crate::commands::Intent::Confirmed,
            },
        )
        .unwrap();

        let res = run(&mut store, &DocketConfig::default()).unwrap();
        assert!(res.has_level(MessageLevel::Warning));
        assert_eq!(codes(&res), vec!["III.001"]);
        assert!(res.affected_documents[0].needs_review);
    }

    #[test]
    fn empty_ledger_is_a_no_op() {
        let mut store = InMemoryStore::new();
        let res = run(&mut store, &DocketConfig::default()).unwrap();
        assert!(res.affected_documents.is_empty());
        assert_eq!(store.load_session().unwrap(), crate::store::Session::default());
    }
}
