//! # Docket Architecture
//!
//! Docket files scanned documents into a hierarchical folder taxonomy and
//! gives every filed document a stable code such as `III.01.02.007`: the
//! folder's prefix code followed by a per-folder sequence number that never
//! repeats, even after folders are renamed, moved or deleted.
//!
//! It is a library with a CLI client, not the other way around.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Parses display indexes (a1, d2-d4, f3)                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Load session, mutate through the core, save once         │
//! │  - Return CmdResult with leveled messages                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Core: tree, codec, ledger, assign, projection, intake      │
//! │  Storage: DataStore trait, FileStore, InMemoryStore         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Document lifecycle
//!
//! 1. **Intake**: files arrive either through OCR + classification
//!    ([`intake`], auto-classified) or by being uploaded straight into a
//!    folder (directly placed). Both land in the [`ledger`] as pending
//!    entries with no code yet.
//! 2. **Review**: pending entries can be moved, have their metadata edited or
//!    be removed.
//! 3. **Finalize**: [`assign`] numbers every pending entry per folder, the
//!    session is saved in one write and the ledger is emptied.
//! 4. **Export**: [`projection`] lays finalized documents out as archive
//!    paths and manifest rows.
//!
//! Folder ids are dot-delimited positions (`3.1.2`), while the displayed code
//! is derived from folder *names* ([`codec`]), so renaming a folder changes
//! the codes of documents finalized afterwards but never the ones already
//! issued.
//!
//! ## Key principle: no I/O assumptions in core
//!
//! From `api.rs` inward, code takes Rust values and returns
//! `Result<CmdResult>`. It never prints and never exits. Operator logging
//! goes through `tracing`; the caller decides where it ends up.
//!
//! ## Testing
//!
//! 1. **Core and commands**: unit tests next to the code, against
//!    [`store::memory::InMemoryStore`].
//! 2. **API**: dispatch tests.
//! 3. **CLI**: `tests/cli.rs` runs the binary against a temporary
//!    `DOCKET_HOME`.

pub mod api;
pub mod assign;
pub mod codec;
pub mod commands;
pub mod config;
pub mod error;
pub mod index;
pub mod intake;
pub mod ledger;
pub mod model;
pub mod projection;
pub mod store;
pub mod tree;
