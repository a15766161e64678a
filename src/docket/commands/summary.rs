use crate::codec::breadcrumb;
use crate::commands::{CmdResult, SummaryLine};
use crate::config::DocketConfig;
use crate::error::Result;
use crate::store::DataStore;
use std::collections::BTreeMap;

/// Finalized document counts per folder, in tree order. Folders that no
/// longer exist are listed last.
pub fn run<S: DataStore>(store: &S, config: &DocketConfig) -> Result<CmdResult> {
    let session = store.load_session()?;
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for doc in &session.finalized {
        *counts.entry(doc.node_id.as_str()).or_insert(0) += 1;
    }

    let line = |id: &str, documents: usize| SummaryLine {
        node_id: id.to_string(),
        breadcrumb: breadcrumb(id, &session.taxonomy, &config.separator),
        documents,
        last_sequence: session.counters.get(id),
    };

    let mut lines: Vec<SummaryLine> = session
        .taxonomy
        .nodes()
        .iter()
        .filter_map(|n| counts.remove(n.id.as_str()).map(|c| line(&n.id, c)))
        .collect();
    lines.extend(counts.into_iter().map(|(id, c)| line(id, c)));
    Ok(CmdResult::default().with_summary(lines))
}
