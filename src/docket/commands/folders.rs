use crate::commands::{CmdMessage, CmdResult, Intent};
use crate::error::{DocketError, Result};
use crate::model::{is_descendant, ROOT};
use crate::store::DataStore;

#[derive(Debug, Clone)]
pub enum FolderAction {
    /// Adds a folder as the last child of `parent` ([`ROOT`] for top level).
    Add { parent: String, name: String },
    Rename { id: String, name: String },
    Remove { id: String, intent: Intent },
    Up(String),
    Down(String),
    Toggle(String),
}

pub fn run<S: DataStore>(store: &mut S, action: FolderAction) -> Result<CmdResult> {
    let mut session = store.load_session()?;
    let mut result = CmdResult::default();

    match action {
        FolderAction::Add { parent, name } => {
            let name = clean_name(&name)?;
            require(&parent, parent == ROOT || session.taxonomy.contains(&parent))?;
            let referenced = session.referenced_nodes();
            let id = session
                .taxonomy
                .insert_avoiding(&parent, name.clone(), |id| referenced.contains(id))
                .ok_or_else(|| {
                    DocketError::Api(format!("No free folder id left under {}", parent))
                })?;
            result.add_message(CmdMessage::success(format!("Added folder {} {}", id, name)));
        }
        FolderAction::Rename { id, name } => {
            let name = clean_name(&name)?;
            require(&id, session.taxonomy.rename(&id, name.clone()))?;
            result.add_message(CmdMessage::success(format!("Renamed {} to {}", id, name)));
        }
        FolderAction::Remove { id, intent } => {
            let subtree = session.taxonomy.subtree(&id).len();
            require(&id, subtree > 0)?;
            let stranded = session.ledger.count_in_subtree(&id);
            if intent == Intent::Preview {
                result.add_message(CmdMessage::info(format!(
                    "Removing {} deletes {} folder(s); {} pending document(s) target it",
                    id, subtree, stranded
                )));
                return Ok(result);
            }
            session.taxonomy.delete_subtree(&id);
            result.add_message(CmdMessage::success(format!(
                "Removed {} and {} subfolder(s)",
                id,
                subtree - 1
            )));
            if stranded > 0 {
                result.add_message(CmdMessage::warning(format!(
                    "{} pending document(s) now target a missing folder; reassign them before finalizing",
                    stranded
                )));
            }
            let finalized = session
                .finalized
                .iter()
                .filter(|d| d.node_id == id || is_descendant(&d.node_id, &id))
                .count();
            if finalized > 0 {
                result.add_message(CmdMessage::warning(format!(
                    "{} finalized document(s) will be left out of archive exports",
                    finalized
                )));
            }
        }
        FolderAction::Up(id) => {
            require(&id, session.taxonomy.contains(&id))?;
            if session.taxonomy.move_up(&id) {
                result.add_message(CmdMessage::success(format!("Moved {} up", id)));
            } else {
                result.add_message(CmdMessage::info(format!("{} is already first", id)));
                return Ok(result);
            }
        }
        FolderAction::Down(id) => {
            require(&id, session.taxonomy.contains(&id))?;
            if session.taxonomy.move_down(&id) {
                result.add_message(CmdMessage::success(format!("Moved {} down", id)));
            } else {
                result.add_message(CmdMessage::info(format!("{} is already last", id)));
                return Ok(result);
            }
        }
        FolderAction::Toggle(id) => {
            require(&id, session.taxonomy.toggle(&id))?;
            let expanded = session.taxonomy.get(&id).is_some_and(|n| n.expanded);
            result.add_message(CmdMessage::info(format!(
                "{} {}",
                if expanded { "Expanded" } else { "Collapsed" },
                id
            )));
        }
    }

    store.save_session(&session)?;
    Ok(result)
}

fn require(id: &str, exists: bool) -> Result<()> {
    if exists {
        Ok(())
    } else {
        Err(DocketError::NodeNotFound(id.to_string()))
    }
}

fn clean_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DocketError::Api("Folder name cannot be empty".to_string()));
    }
    Ok(name.to_string())
}
