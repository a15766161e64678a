use crate::commands::{CmdMessage, CmdResult};
use crate::config::DocketConfig;
use crate::error::{DocketError, Result};
use crate::index::{resolve, DisplayIndex};
use crate::intake::SourceFile;
use crate::store::{DataStore, Session};
use std::collections::HashSet;
use tracing::warn;
use uuid::Uuid;

/// A file offered for intake, not yet stored.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub fn resolve_indexes(
    session: &Session,
    indexes: &[DisplayIndex],
) -> Result<Vec<(DisplayIndex, Uuid)>> {
    indexes
        .iter()
        .map(|idx| {
            resolve(session, *idx)
                .map(|id| (*idx, id))
                .ok_or_else(|| DocketError::Api(format!("Index {} not found", idx)))
        })
        .collect()
}

/// Rejects the whole call when it exceeds the configured file count or size.
pub fn check_limits(config: &DocketConfig, files: &[IncomingFile]) -> Result<()> {
    if files.len() > config.max_files {
        return Err(DocketError::Api(format!(
            "Too many files: {} (limit {})",
            files.len(),
            config.max_files
        )));
    }
    let total: u64 = files.iter().map(|f| f.bytes.len() as u64).sum();
    if total > config.max_batch_bytes() {
        return Err(DocketError::Api(format!(
            "Files total {:.1} MB (limit {} MB)",
            total as f64 / (1024.0 * 1024.0),
            config.max_batch_mb
        )));
    }
    Ok(())
}

/// Drops files already finalized, already pending, or repeated within the
/// call, with a warning for each.
pub fn admit_files(
    session: &Session,
    files: Vec<IncomingFile>,
    result: &mut CmdResult,
) -> Vec<IncomingFile> {
    let mut seen = HashSet::new();
    files
        .into_iter()
        .filter(|f| {
            let fresh = !session.is_known_file(&f.file_name) && seen.insert(f.file_name.clone());
            if !fresh {
                result.add_message(CmdMessage::warning(format!(
                    "Skipping {}: already processed",
                    f.file_name
                )));
            }
            fresh
        })
        .collect()
}

/// Writes each file's bytes to the content store. If any write fails, the
/// blobs stored so far are removed again.
pub fn store_files<S: DataStore>(store: &mut S, files: Vec<IncomingFile>) -> Result<Vec<SourceFile>> {
    let mut sources = Vec::with_capacity(files.len());
    for f in files {
        match store.put_content(&f.bytes) {
            Ok(content) => sources.push(SourceFile {
                file_name: f.file_name,
                content,
                bytes: f.bytes,
            }),
            Err(e) => {
                discard_content(store, &sources);
                return Err(e);
            }
        }
    }
    Ok(sources)
}

/// Saves the session that references `sources`. When the save fails the
/// blobs would be orphaned, so they are removed before the error is returned.
pub fn save_with_content<S: DataStore>(
    store: &mut S,
    session: &Session,
    sources: &[SourceFile],
) -> Result<()> {
    store.save_session(session).inspect_err(|_| discard_content(store, sources))
}

fn discard_content<S: DataStore>(store: &mut S, sources: &[SourceFile]) {
    for source in sources {
        if let Err(e) = store.delete_content(&source.content) {
            warn!(file = %source.file_name, error = %e, "could not remove stored content");
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::file;
    use super::*;

    #[test]
    fn limits_reject_whole_call() {
        let config = DocketConfig {
            max_files: 2,
            ..Default::default()
        };
        assert!(check_limits(&config, &[file("a"), file("b")]).is_ok());
        assert!(check_limits(&config, &[file("a"), file("b"), file("c")]).is_err());

        let tiny = DocketConfig {
            max_batch_mb: 1,
            ..Default::default()
        };
        let big = IncomingFile {
            file_name: "big".into(),
            bytes: vec![0; 1024 * 1024 + 1],
        };
        assert!(check_limits(&tiny, &[big]).is_err());
    }

    #[test]
    fn admit_skips_known_and_repeated_names() {
        let mut session = Session::default();
        session.processed_files.push("old.pdf".into());
        let mut result = CmdResult::default();
        let admitted = admit_files(
            &session,
            vec![file("old.pdf"), file("new.pdf"), file("new.pdf")],
            &mut result,
        );
        assert_eq!(admitted.len(), 1);
        assert_eq!(admitted[0].file_name, "new.pdf");
        assert_eq!(result.messages.len(), 2);
    }

    #[test]
    fn unknown_index_is_an_error() {
        let session = Session::default();
        assert!(resolve_indexes(&session, &[DisplayIndex::Auto(1)]).is_err());
    }
}
