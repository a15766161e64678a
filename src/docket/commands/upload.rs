use crate::codec::breadcrumb;
use crate::commands::{CmdMessage, CmdResult};
use crate::config::DocketConfig;
use crate::error::{DocketError, Result};
use crate::intake::{enrich_direct, MetadataExtractor};
use crate::ledger::StoredFile;
use crate::store::DataStore;
use tracing::{info, warn};

use super::helpers::{admit_files, check_limits, save_with_content, store_files, IncomingFile};

/// Files documents directly into `node_id`, skipping the classifier.
pub fn run<S: DataStore>(
    store: &mut S,
    config: &DocketConfig,
    node_id: &str,
    files: Vec<IncomingFile>,
    metadata: Option<&dyn MetadataExtractor>,
) -> Result<CmdResult> {
    let mut session = store.load_session()?;
    if !session.taxonomy.contains(node_id) {
        return Err(DocketError::NodeNotFound(node_id.to_string()));
    }
    check_limits(config, &files)?;

    let mut result = CmdResult::default();
    let files = admit_files(&session, files, &mut result);
    if files.is_empty() {
        result.add_message(CmdMessage::info("No new files to upload."));
        return Ok(result);
    }

    let sources = store_files(store, files)?;
    let ids = session.ledger.add_direct(
        node_id,
        sources
            .iter()
            .map(|s| StoredFile {
                file_name: s.file_name.clone(),
                content: s.content,
            })
            .collect(),
    );

    if let Some(extractor) = metadata {
        match enrich_direct(extractor, &sources, &ids, &mut session.ledger) {
            Ok(n) => info!(enriched = n, "metadata extracted"),
            Err(e) => {
                warn!(error = %e, "metadata extraction failed");
                result.add_message(CmdMessage::warning(format!(
                    "Metadata extraction failed, fill in details manually: {}",
                    e
                )));
            }
        }
    }

    save_with_content(store, &session, &sources)?;

    let folder = breadcrumb(node_id, &session.taxonomy, &config.separator);
    result.add_message(CmdMessage::success(format!(
        "Filed {} document(s) into {}",
        ids.len(),
        folder
    )));
    let entries = ids
        .iter()
        .filter_map(|id| session.ledger.get(id).cloned())
        .collect();
    Ok(result.with_affected_entries(entries))
}
