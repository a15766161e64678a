//! # CLI
//!
//! One UI client for docket. It is the only place that knows about stdout,
//! stderr, exit codes and files named on the command line; everything else
//! goes through [`docket::api::DocketApi`].
//!
//! - `setup`: argument parsing via clap
//! - `commands`: context setup and per-command handlers
//! - `render`: output formatting

mod commands;
mod render;
pub mod setup;

pub use commands::run;
