use crate::commands::{CmdMessage, CmdResult};
use crate::config::DocketConfig;
use crate::error::{DocketError, Result};
use crate::intake::{classify_into_ledger, extract_all, Classifier, OutcomeStatus, TextExtractor};
use crate::store::DataStore;

use super::helpers::{admit_files, check_limits, save_with_content, store_files, IncomingFile};

/// Runs OCR and classification over `files`, recording one AutoClassified
/// entry per admitted file.
pub fn run<S: DataStore>(
    store: &mut S,
    config: &DocketConfig,
    files: Vec<IncomingFile>,
    extractor: &dyn TextExtractor,
    classifier: &dyn Classifier,
) -> Result<CmdResult> {
    let mut session = store.load_session()?;
    check_limits(config, &files)?;
    if session.taxonomy.first().is_none() {
        return Err(DocketError::NodeNotFound(
            "taxonomy is empty; add a folder first".to_string(),
        ));
    }

    let mut result = CmdResult::default();
    let files = admit_files(&session, files, &mut result);
    if files.is_empty() {
        result.add_message(CmdMessage::info("No new files to classify."));
        return Ok(result);
    }

    let sources = store_files(store, files)?;
    let ocr = extract_all(extractor, &sources);
    let report = classify_into_ledger(
        classifier,
        ocr,
        &session.taxonomy,
        &mut session.ledger,
        config.batch_size,
    )?;
    save_with_content(store, &session, &sources)?;

    for outcome in &report.outcomes {
        if let OutcomeStatus::Fallback { reason } = &outcome.status {
            result.add_message(CmdMessage::warning(format!(
                "{}: {}, filed under {}",
                outcome.file_name, reason, outcome.node_id
            )));
        }
    }
    result.add_message(CmdMessage::success(format!(
        "Classified {} of {} document(s)",
        report.classified(),
        report.outcomes.len()
    )));
    let entries = report
        .outcomes
        .iter()
        .filter_map(|o| session.ledger.get(&o.entry_id).cloned())
        .collect();
    Ok(result.with_affected_entries(entries).with_intake(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::helpers::test_support::file;
    use crate::intake::{RecordedResult, RecordedResults};
    use crate::ledger::Classification;
    use crate::store::memory::InMemoryStore;

    fn recorded(entries: &[(&str, Option<&str>)]) -> RecordedResults {
        RecordedResults::new(
            entries
                .iter()
                .map(|(name, node)| RecordedResult {
                    file: name.to_string(),
                    text: Some(format!("text of {}", name)),
                    error: None,
                    classification: node.map(|n| Classification {
                        suggested_node_id: n.to_string(),
                        ..Default::default()
                    }),
                })
                .collect(),
        )
    }

    #[test]
    fn records_auto_classified_entries() {
        let mut store = InMemoryStore::new();
        let results = recorded(&[("a.pdf", Some("3.1")), ("b.pdf", Some("4.2"))]);
        let res = run(
            &mut store,
            &DocketConfig::default(),
            vec![file("a.pdf"), file("b.pdf")],
            &results,
            &results,
        )
        .unwrap();

        let report = res.intake.unwrap();
        assert_eq!(report.classified(), 2);
        let session = store.load_session().unwrap();
        let targets: Vec<&str> = session.ledger.auto().iter().map(|e| e.target_node_id()).collect();
        assert_eq!(targets, vec!["3.1", "4.2"]);
        assert!(session.ledger.direct().is_empty());
    }

    #[test]
    fn missing_classification_fails_the_batch_only() {
        let mut store = InMemoryStore::new();
        let config = DocketConfig {
            batch_size: 1,
            ..Default::default()
        };
        let results = recorded(&[("a.pdf", Some("3.1")), ("b.pdf", None)]);
        let res = run(
            &mut store,
            &config,
            vec![file("a.pdf"), file("b.pdf")],
            &results,
            &results,
        )
        .unwrap();

        let report = res.intake.unwrap();
        assert_eq!(report.classified(), 1);
        assert_eq!(report.fallbacks(), 1);
        let session = store.load_session().unwrap();
        assert_eq!(session.ledger.auto()[1].target_node_id(), "0");
        assert!(session.ledger.auto()[1].intake_failed);
    }

    #[test]
    fn failed_save_leaves_no_stored_content() {
        let mut store = InMemoryStore::new();
        store.set_simulate_save_error(true);
        let results = recorded(&[("a.pdf", Some("3.1"))]);
        let err = run(
            &mut store,
            &DocketConfig::default(),
            vec![file("a.pdf")],
            &results,
            &results,
        );
        assert!(err.is_err());
        assert_eq!(store.content_count(), 0);
    }
}
