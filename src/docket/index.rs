//! # Display Indexes
//!
//! Documents are addressed on the command line by short positional indexes
//! instead of UUIDs:
//!
//! - `a1, a2, …` pending AutoClassified entries, in ledger order
//! - `d1, d2, …` pending DirectlyPlaced entries, in ledger order
//! - `f1, f2, …` finalized documents, in finalization order
//!
//! Indexes are recomputed from the session every time, so they are stable only
//! as long as the session is unchanged. Commands resolve them to UUIDs before
//! mutating anything.

use crate::model::{FinalizedDocument, IntakeEntry, IntakeKind};
use crate::store::Session;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayIndex {
    Auto(usize),
    Direct(usize),
    Finalized(usize),
}

impl std::fmt::Display for DisplayIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayIndex::Auto(i) => write!(f, "a{}", i),
            DisplayIndex::Direct(i) => write!(f, "d{}", i),
            DisplayIndex::Finalized(i) => write!(f, "f{}", i),
        }
    }
}

impl FromStr for DisplayIndex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ctor, rest): (fn(usize) -> DisplayIndex, &str) = if let Some(r) = s.strip_prefix('a')
        {
            (DisplayIndex::Auto, r)
        } else if let Some(r) = s.strip_prefix('d') {
            (DisplayIndex::Direct, r)
        } else if let Some(r) = s.strip_prefix('f') {
            (DisplayIndex::Finalized, r)
        } else {
            return Err(format!("Invalid index format: {}", s));
        };
        match rest.parse::<usize>() {
            Ok(n) if n > 0 => Ok(ctor(n)),
            _ => Err(format!("Invalid index format: {}", s)),
        }
    }
}

impl DisplayIndex {
    fn bucket(&self) -> char {
        match self {
            DisplayIndex::Auto(_) => 'a',
            DisplayIndex::Direct(_) => 'd',
            DisplayIndex::Finalized(_) => 'f',
        }
    }

    fn number(&self) -> usize {
        match self {
            DisplayIndex::Auto(n) | DisplayIndex::Direct(n) | DisplayIndex::Finalized(n) => *n,
        }
    }

    fn with_number(&self, n: usize) -> Self {
        match self {
            DisplayIndex::Auto(_) => DisplayIndex::Auto(n),
            DisplayIndex::Direct(_) => DisplayIndex::Direct(n),
            DisplayIndex::Finalized(_) => DisplayIndex::Finalized(n),
        }
    }

    pub fn is_pending(&self) -> bool {
        !matches!(self, DisplayIndex::Finalized(_))
    }
}

/// Parses a single index (`a2`) or a range (`a2-a4`).
///
/// Both ends of a range must be in the same bucket and ascending, and a range
/// may not reach past `limit`. Whether single indexes exist is checked later,
/// during resolution.
pub fn parse_index_or_range(s: &str, limit: usize) -> Result<Vec<DisplayIndex>, String> {
    if let Some(dash) = s.find('-') {
        if dash > 0 {
            let start = DisplayIndex::from_str(&s[..dash])?;
            let end = DisplayIndex::from_str(&s[dash + 1..])?;
            if start.bucket() != end.bucket() {
                return Err(format!(
                    "Invalid range: cannot mix index types ({} and {})",
                    start, end
                ));
            }
            if start.number() > end.number() {
                return Err(format!(
                    "Invalid range: start ({}) must be <= end ({})",
                    start, end
                ));
            }
            if end.number() > limit {
                return Err(format!(
                    "Invalid range: {} is past the last listed document ({} listed)",
                    end, limit
                ));
            }
            return Ok((start.number()..=end.number())
                .map(|n| start.with_number(n))
                .collect());
        }
    }
    DisplayIndex::from_str(s).map(|idx| vec![idx])
}

pub fn parse_indexes(inputs: &[String], limit: usize) -> Result<Vec<DisplayIndex>, String> {
    let mut out = Vec::new();
    for input in inputs {
        for idx in parse_index_or_range(input, limit)? {
            if !out.contains(&idx) {
                out.push(idx);
            }
        }
    }
    Ok(out)
}

/// A pending entry with its display index.
#[derive(Debug, Clone)]
pub struct DisplayEntry {
    pub index: DisplayIndex,
    pub entry: IntakeEntry,
}

#[derive(Debug, Clone)]
pub struct DisplayDocument {
    pub index: DisplayIndex,
    pub document: FinalizedDocument,
}

pub fn index_entries(session: &Session) -> Vec<DisplayEntry> {
    let bucket = |kind: IntakeKind, ctor: fn(usize) -> DisplayIndex| {
        session
            .ledger
            .population(kind)
            .iter()
            .enumerate()
            .map(move |(i, e)| DisplayEntry {
                index: ctor(i + 1),
                entry: e.clone(),
            })
    };
    bucket(IntakeKind::Auto, DisplayIndex::Auto)
        .chain(bucket(IntakeKind::Direct, DisplayIndex::Direct))
        .collect()
}

pub fn index_documents(session: &Session) -> Vec<DisplayDocument> {
    session
        .finalized
        .iter()
        .enumerate()
        .map(|(i, d)| DisplayDocument {
            index: DisplayIndex::Finalized(i + 1),
            document: d.clone(),
        })
        .collect()
}

/// Size of the largest index bucket; no range can usefully reach past it.
pub fn longest_population(session: &Session) -> usize {
    session
        .ledger
        .auto()
        .len()
        .max(session.ledger.direct().len())
        .max(session.finalized.len())
}

/// Maps a display index to the UUID it currently names.
pub fn resolve(session: &Session, index: DisplayIndex) -> Option<Uuid> {
    match index {
        DisplayIndex::Auto(n) => session.ledger.auto().get(n - 1).map(|e| e.id),
        DisplayIndex::Direct(n) => session.ledger.direct().get(n - 1).map(|e| e.id),
        DisplayIndex::Finalized(n) => session.finalized.get(n - 1).map(|d| d.id),
    }
}
