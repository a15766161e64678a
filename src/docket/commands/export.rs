use crate::commands::{CmdMessage, CmdResult};
use crate::config::DocketConfig;
use crate::error::{DocketError, Result};
use crate::projection::{build_archive_paths, build_manifest_rows, ArchivePlan};
use crate::store::DataStore;
use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use tracing::warn;

/// Writes the finalized set as a tar.gz laid out by folder breadcrumb.
pub fn archive<S: DataStore>(
    store: &S,
    config: &DocketConfig,
    output: Option<PathBuf>,
) -> Result<CmdResult> {
    let session = store.load_session()?;
    let mut result = CmdResult::default();
    if session.finalized.is_empty() {
        result.add_message(CmdMessage::info("No finalized documents to export."));
        return Ok(result);
    }

    let plan = build_archive_paths(&session.finalized, &session.taxonomy, config.code_width);
    let path = output.unwrap_or_else(|| {
        PathBuf::from(format!(
            "docket-{}.tar.gz",
            Utc::now().format("%Y-%m-%d_%H-%M-%S")
        ))
    });
    let file = File::create(&path).map_err(DocketError::Io)?;
    let written = write_archive(store, file, &plan, &mut result)?;

    for warning in &plan.warnings {
        result.add_message(CmdMessage::warning(warning.clone()));
    }
    result.add_message(CmdMessage::success(format!(
        "Exported {} document(s) to {}",
        written,
        path.display()
    )));
    Ok(result)
}

/// Returns the number of documents written.
fn write_archive<S: DataStore, W: Write>(
    store: &S,
    writer: W,
    plan: &ArchivePlan,
    result: &mut CmdResult,
) -> Result<usize> {
    let enc = GzEncoder::new(writer, Compression::default());
    let mut tar = tar::Builder::new(enc);

    for folder in &plan.folders {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Directory);
        header.set_size(0);
        header.set_mode(0o755);
        header.set_cksum();
        tar.append_data(&mut header, format!("{}/", folder), std::io::empty())
            .map_err(DocketError::Io)?;
    }

    let mut written = 0;
    for entry in &plan.entries {
        let Some(bytes) = store.read_content(&entry.content)? else {
            warn!(path = %entry.path, "stored content missing");
            result.add_message(CmdMessage::warning(format!(
                "Skipping {}: stored content is missing",
                entry.path
            )));
            continue;
        };
        let mut header = tar::Header::new_gnu();
        header.set_size(bytes.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        tar.append_data(&mut header, &entry.path, bytes.as_slice())
            .map_err(DocketError::Io)?;
        written += 1;
    }

    tar.into_inner()
        .and_then(|enc| enc.finish())
        .map_err(DocketError::Io)?;
    Ok(written)
}

/// Serializes the manifest sections as JSON for an external spreadsheet renderer.
pub fn manifest<S: DataStore>(store: &S) -> Result<CmdResult> {
    let session = store.load_session()?;
    let sections = build_manifest_rows(&session.finalized, &session.taxonomy);
    let json = serde_json::to_string_pretty(&sections)?;
    let mut result = CmdResult::default().with_output(json);
    let flagged = sections
        .iter()
        .flat_map(|s| &s.rows)
        .filter(|r| r.needs_review)
        .count();
    if flagged > 0 {
        result.add_message(CmdMessage::warning(format!(
            "{} row(s) reference missing folders",
            flagged
        )));
    }
    Ok(result)
}
