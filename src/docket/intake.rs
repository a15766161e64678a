//! # Intake
//!
//! Text extraction, classification and metadata extraction are external
//! services. This module defines their interfaces and drives them over a batch
//! of files, turning every per-item failure into a placeholder entry routed to
//! the fallback folder (the first folder of the taxonomy). Nothing a
//! collaborator does can fail the batch as a whole: each file produces exactly
//! one [`IntakeOutcome`].
//!
//! Entries are added to the ledger as soon as their batch completes, so an
//! abandoned intake leaves only the finished entries behind.

use crate::error::{DocketError, Result};
use crate::ledger::{Classification, IntakeLedger, OcrResult};
use crate::model::{ContentRef, DocumentMeta, EntryPatch, MetaPatch};
use crate::tree::TaxonomyTree;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

pub const OCR_FAILED_TEXT: &str = "Error during OCR processing.";
pub const OCR_EMPTY_TEXT: &str = "No text found.";

/// A file handed to intake together with its bytes and stored content.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub file_name: String,
    pub content: ContentRef,
    pub bytes: Vec<u8>,
}

/// The folder list a classifier chooses from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxonomyEntry {
    pub id: String,
    pub name: String,
    pub level: usize,
}

pub fn taxonomy_snapshot(tree: &TaxonomyTree) -> Vec<TaxonomyEntry> {
    tree.nodes()
        .iter()
        .map(|n| TaxonomyEntry {
            id: n.id.clone(),
            name: n.name.clone(),
            level: n.level,
        })
        .collect()
}

pub trait TextExtractor {
    fn extract_text(&self, file_name: &str, bytes: &[u8]) -> Result<String>;
}

pub trait Classifier {
    /// Must return one classification per input, in input order.
    fn classify_batch(
        &self,
        batch: &[OcrResult],
        taxonomy: &[TaxonomyEntry],
    ) -> Result<Vec<Classification>>;
}

pub trait MetadataExtractor {
    /// Must return one metadata record per input, in input order.
    fn extract_metadata_batch(&self, files: &[SourceFile]) -> Result<Vec<DocumentMeta>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    Classified,
    Fallback { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeOutcome {
    pub entry_id: Uuid,
    pub file_name: String,
    pub node_id: String,
    pub status: OutcomeStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntakeReport {
    pub outcomes: Vec<IntakeOutcome>,
}

impl IntakeReport {
    pub fn classified(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::Classified)
            .count()
    }

    pub fn fallbacks(&self) -> usize {
        self.outcomes.len() - self.classified()
    }
}

/// Runs OCR over every file. Failures become placeholder text flagged as failed.
pub fn extract_all(extractor: &dyn TextExtractor, files: &[SourceFile]) -> Vec<OcrResult> {
    files
        .iter()
        .map(|file| {
            let (text, failed) = match extractor.extract_text(&file.file_name, &file.bytes) {
                Ok(text) if text.trim().is_empty() => (OCR_EMPTY_TEXT.to_string(), false),
                Ok(text) => (text, false),
                Err(e) => {
                    warn!(file = %file.file_name, error = %e, "text extraction failed");
                    (OCR_FAILED_TEXT.to_string(), true)
                }
            };
            OcrResult {
                file_name: file.file_name.clone(),
                content: file.content,
                text,
                failed,
            }
        })
        .collect()
}

/// Classifies OCR results in batches and records one AutoClassified entry per
/// result, in input order. Failed OCR results skip the classifier and are
/// recorded as placeholders at their own position; each run of readable
/// results between them is sent in chunks of `batch_size`. Fails only when the
/// taxonomy is empty and no fallback exists.
pub fn classify_into_ledger(
    classifier: &dyn Classifier,
    results: Vec<OcrResult>,
    tree: &TaxonomyTree,
    ledger: &mut IntakeLedger,
    batch_size: usize,
) -> Result<IntakeReport> {
    let fallback = tree
        .first()
        .map(|n| n.id.clone())
        .ok_or_else(|| DocketError::NodeNotFound("taxonomy is empty".to_string()))?;
    let taxonomy = taxonomy_snapshot(tree);
    let mut report = IntakeReport::default();

    let mut runs: Vec<(bool, Vec<OcrResult>)> = Vec::new();
    for ocr in results {
        if let Some((failed, run)) = runs.last_mut() {
            if *failed == ocr.failed {
                run.push(ocr);
                continue;
            }
        }
        runs.push((ocr.failed, vec![ocr]));
    }

    let batch_size = batch_size.max(1);
    let batches: usize = runs
        .iter()
        .filter(|(failed, _)| !failed)
        .map(|(_, run)| run.len().div_ceil(batch_size))
        .sum();
    let mut n = 0;
    for (failed, run) in runs {
        if failed {
            for ocr in run {
                route_to_fallback(ledger, &mut report, ocr, &fallback, "text extraction failed");
            }
            continue;
        }
        for batch in run.chunks(batch_size) {
            n += 1;
            info!(batch = n, of = batches, size = batch.len(), "classifying batch");
            classify_chunk(classifier, batch, &taxonomy, tree, &fallback, ledger, &mut report);
        }
    }

    info!(
        classified = report.classified(),
        fallback = report.fallbacks(),
        "intake finished"
    );
    Ok(report)
}

fn classify_chunk(
    classifier: &dyn Classifier,
    batch: &[OcrResult],
    taxonomy: &[TaxonomyEntry],
    tree: &TaxonomyTree,
    fallback: &str,
    ledger: &mut IntakeLedger,
    report: &mut IntakeReport,
) {
    let verdicts = match classifier.classify_batch(batch, taxonomy) {
        Ok(v) if v.len() == batch.len() => v,
        Ok(v) => {
            let reason = format!(
                "classifier returned {} results for {} documents",
                v.len(),
                batch.len()
            );
            fallback_batch(ledger, report, batch, fallback, &reason);
            return;
        }
        Err(e) => {
            let reason = format!("classification failed: {}", e);
            fallback_batch(ledger, report, batch, fallback, &reason);
            return;
        }
    };

    for (ocr, verdict) in batch.iter().zip(verdicts) {
        if tree.contains(&verdict.suggested_node_id) {
            let entry_id = ledger.add_auto_classified(ocr.clone(), &verdict);
            report.outcomes.push(IntakeOutcome {
                entry_id,
                file_name: ocr.file_name.clone(),
                node_id: verdict.suggested_node_id,
                status: OutcomeStatus::Classified,
            });
        } else {
            let reason = format!("unknown folder '{}' suggested", verdict.suggested_node_id);
            warn!(file = %ocr.file_name, %reason, "routing to fallback folder");
            let rerouted = Classification {
                suggested_node_id: fallback.to_string(),
                ..verdict
            };
            let flagged = OcrResult {
                failed: true,
                ..ocr.clone()
            };
            let entry_id = ledger.add_auto_classified(flagged, &rerouted);
            report.outcomes.push(IntakeOutcome {
                entry_id,
                file_name: ocr.file_name.clone(),
                node_id: fallback.to_string(),
                status: OutcomeStatus::Fallback { reason },
            });
        }
    }
}

fn fallback_batch(
    ledger: &mut IntakeLedger,
    report: &mut IntakeReport,
    batch: &[OcrResult],
    fallback: &str,
    reason: &str,
) {
    for ocr in batch {
        route_to_fallback(ledger, report, ocr.clone(), fallback, reason);
    }
}

fn route_to_fallback(
    ledger: &mut IntakeLedger,
    report: &mut IntakeReport,
    ocr: OcrResult,
    fallback: &str,
    reason: &str,
) {
    warn!(file = %ocr.file_name, reason, "routing to fallback folder");
    let file_name = ocr.file_name.clone();
    let entry_id = ledger.add_placeholder(ocr, fallback);
    report.outcomes.push(IntakeOutcome {
        entry_id,
        file_name,
        node_id: fallback.to_string(),
        status: OutcomeStatus::Fallback {
            reason: reason.to_string(),
        },
    });
}

/// Fills in metadata for freshly added DirectlyPlaced entries. `ids` pairs
/// with `files` by position. On error the entries keep empty metadata.
pub fn enrich_direct(
    extractor: &dyn MetadataExtractor,
    files: &[SourceFile],
    ids: &[Uuid],
    ledger: &mut IntakeLedger,
) -> Result<usize> {
    let metas = extractor.extract_metadata_batch(files)?;
    if metas.len() != files.len() {
        return Err(DocketError::Collaborator(format!(
            "metadata extractor returned {} results for {} files",
            metas.len(),
            files.len()
        )));
    }
    let mut updated = 0;
    for (id, meta) in ids.iter().zip(metas) {
        if meta.is_empty() {
            continue;
        }
        let patch = EntryPatch {
            node_id: None,
            meta: MetaPatch {
                title: meta.title,
                issuer: meta.issuer,
                number: meta.number,
                date: meta.date,
            },
        };
        ledger.edit(id, &patch)?;
        updated += 1;
    }
    Ok(updated)
}

/// One record of a classifier results file, as produced by an external
/// OCR + classification run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedResult {
    pub file: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(flatten)]
    pub classification: Option<Classification>,
}

/// Replays recorded OCR and classifier output through the collaborator
/// interfaces. Records are looked up by file name.
#[derive(Debug, Default)]
pub struct RecordedResults {
    records: HashMap<String, RecordedResult>,
}

impl RecordedResults {
    pub fn new(records: Vec<RecordedResult>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|r| (file_key(&r.file).to_string(), r))
                .collect(),
        }
    }

    fn record(&self, file_name: &str) -> Result<&RecordedResult> {
        self.records
            .get(file_name)
            .ok_or_else(|| DocketError::Collaborator(format!("no recorded result for {}", file_name)))
    }
}

/// The bare file name a path is recorded under.
pub fn file_key(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

impl TextExtractor for RecordedResults {
    fn extract_text(&self, file_name: &str, _bytes: &[u8]) -> Result<String> {
        let record = self.record(file_name)?;
        if let Some(error) = &record.error {
            return Err(DocketError::Collaborator(error.clone()));
        }
        Ok(record.text.clone().unwrap_or_default())
    }
}

impl Classifier for RecordedResults {
    fn classify_batch(
        &self,
        batch: &[OcrResult],
        _taxonomy: &[TaxonomyEntry],
    ) -> Result<Vec<Classification>> {
        batch
            .iter()
            .map(|ocr| {
                self.record(&ocr.file_name)?
                    .classification
                    .clone()
                    .ok_or_else(|| {
                        DocketError::Collaborator(format!("{} was not classified", ocr.file_name))
                    })
            })
            .collect()
    }
}
