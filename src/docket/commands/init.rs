use crate::commands::{CmdMessage, CmdResult, DocketPaths};
use crate::error::Result;
use crate::store::fs::SESSION_FILE;
use crate::store::DataStore;
use std::fs;

/// Creates the workspace directory and writes the initial session if there is none.
pub fn run<S: DataStore>(paths: &DocketPaths, store: &mut S) -> Result<CmdResult> {
    fs::create_dir_all(&paths.root)?;
    let mut result = CmdResult::default();
    if paths.root.join(SESSION_FILE).exists() {
        result.add_message(CmdMessage::info(format!(
            "Workspace already initialized at {}",
            paths.root.display()
        )));
        return Ok(result);
    }
    let session = store.load_session()?;
    store.save_session(&session)?;
    result.add_message(CmdMessage::success(format!(
        "Initialized docket workspace at {}",
        paths.root.display()
    )));
    Ok(result)
}
