use crate::commands::{CmdMessage, CmdResult, Intent};
use crate::error::Result;
use crate::store::{DataStore, Session};
use tracing::info;

/// Clears pending entries, finalized documents and stored content.
///
/// With `hard` the taxonomy, counters and processed file names go too and the
/// workspace returns to the default structure. Without it they are kept, so
/// later rounds keep numbering where they left off.
pub fn run<S: DataStore>(store: &mut S, hard: bool, intent: Intent) -> Result<CmdResult> {
    let mut session = store.load_session()?;
    let mut result = CmdResult::default();

    if intent == Intent::Preview {
        result.add_message(CmdMessage::info(format!(
            "This would remove {} pending and {} finalized document(s)",
            session.ledger.len(),
            session.finalized.len()
        )));
        if hard {
            result.add_message(CmdMessage::info(
                "The folder structure, counters and processed file names would be reset",
            ));
        }
        return Ok(result);
    }

    if hard {
        session = Session::default();
    } else {
        session.ledger.drain();
        session.finalized.clear();
    }
    store.save_session(&session)?;
    let blobs = store.clear_content()?;
    info!(hard, blobs, "workspace reset");

    result.add_message(CmdMessage::success(if hard {
        "Workspace reset to the default structure".to_string()
    } else {
        "Pending and finalized documents cleared".to_string()
    }));
    Ok(result)
}
