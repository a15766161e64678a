//! # docket CLI
//!
//! The binary is intentionally thin: argument parsing, dispatch and rendering
//! live in `cli/`, and this file only invokes `cli::run()` and turns an error
//! into a non-zero exit.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (src/docket/cli/)                                │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - Workspace + logging setup, dispatch (commands.rs)        │
//! │  - Terminal rendering with colored/unicode-width (render.rs)│
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs) → Command Layer (commands/*)            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Operator logging goes to stderr through `tracing-subscriber`; `RUST_LOG`
//! controls it and `--verbose` raises the default to `debug`.

mod cli;

use colored::Colorize;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{} {}", "Error:".red(), e);
        std::process::exit(1);
    }
}
