//! # Rendering
//!
//! Turns `CmdResult` payloads into terminal text. Layout math (indentation,
//! column widths, truncation) is done with `unicode-width` so that folder
//! names with diacritics line up; colors come from `colored`, which turns
//! itself off when stdout is not a terminal.

use colored::*;
use docket::api::{CmdMessage, MessageLevel};
use docket::commands::{SummaryLine, TreeLine};
use docket::config::{DocketConfig, KEYS};
use docket::index::{DisplayDocument, DisplayEntry, DisplayIndex};
use docket::intake::{IntakeReport, OutcomeStatus};
use unicode_width::UnicodeWidthStr;

pub const LINE_WIDTH: usize = 100;
const CODE_WIDTH: usize = 16;
const INDENT: &str = "  ";

pub fn render_tree(lines: &[TreeLine]) -> String {
    if lines.is_empty() {
        return "No folders.\n".to_string();
    }
    let mut out = String::new();
    for line in lines {
        let marker = match (line.has_children, line.node.expanded) {
            (false, _) => " ",
            (true, true) => "▾",
            (true, false) => "▸",
        };
        let left = format!(
            "{}{} {:<8} ",
            INDENT.repeat(line.node.level),
            marker,
            line.node.id
        );
        let pending = if line.pending > 0 {
            format!(" [{}]", line.pending)
        } else {
            String::new()
        };
        let available = LINE_WIDTH.saturating_sub(left.width() + pending.width());
        let name = truncate_to_width(&line.node.name, available);
        let name = if line.node.level == 0 {
            name.bold()
        } else {
            name.normal()
        };
        out.push_str(&format!("{}{}{}\n", left.dimmed(), name, pending.cyan()));
    }
    out
}

pub fn render_entries(entries: &[DisplayEntry]) -> String {
    let mut out = String::new();
    for de in entries {
        let index = format!("{:<5}", de.index.to_string());
        let index = match de.index {
            DisplayIndex::Auto(_) => index.yellow(),
            _ => index.blue(),
        };
        let flag = if de.entry.intake_failed { " !" } else { "" };
        let right = format!("→ {}{}", de.entry.target_node_id(), flag);
        let available = LINE_WIDTH.saturating_sub(5 + right.width() + 2);
        let name = truncate_to_width(&display_name(&de.entry.file_name, &de.entry.meta.title), available);
        let padding = available.saturating_sub(name.width());
        let right = if de.entry.intake_failed {
            right.red()
        } else {
            right.dimmed()
        };
        out.push_str(&format!("{}{}{}  {}\n", index, name, " ".repeat(padding), right));
    }
    out
}

pub fn render_documents(docs: &[DisplayDocument]) -> String {
    let mut out = String::new();
    for dd in docs {
        let index = format!("{:<5}", dd.index.to_string());
        let code = format!("{:<width$}", dd.document.code, width = CODE_WIDTH);
        let code = if dd.document.needs_review {
            code.red()
        } else {
            code.green()
        };
        let available = LINE_WIDTH.saturating_sub(5 + CODE_WIDTH);
        let name = truncate_to_width(
            &display_name(&dd.document.file_name, &dd.document.meta.title),
            available,
        );
        out.push_str(&format!("{}{}{}\n", index.dimmed(), code, name));
    }
    out
}

/// Pending entries first, then finalized documents.
pub fn render_listing(entries: &[DisplayEntry], docs: &[DisplayDocument]) -> String {
    if entries.is_empty() && docs.is_empty() {
        return "No documents.\n".to_string();
    }
    let mut out = String::new();
    if !entries.is_empty() {
        out.push_str(&format!("{}\n", "Pending".bold()));
        out.push_str(&render_entries(entries));
    }
    if !docs.is_empty() {
        if !entries.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("{}\n", "Finalized".bold()));
        out.push_str(&render_documents(docs));
    }
    out
}

pub fn render_summary(lines: &[SummaryLine]) -> String {
    if lines.is_empty() {
        return "No finalized documents.\n".to_string();
    }
    let mut out = String::new();
    let mut total = 0;
    for line in lines {
        total += line.documents;
        let label = if line.breadcrumb.is_empty() {
            format!("{} (missing)", line.node_id).red()
        } else {
            line.breadcrumb.normal()
        };
        out.push_str(&format!("{:>5}  {}\n", line.documents, label));
    }
    out.push_str(&format!("{:>5}  {}\n", total, "total".dimmed()));
    out
}

pub fn render_intake(report: &IntakeReport) -> String {
    let mut out = String::new();
    for outcome in &report.outcomes {
        let line = match &outcome.status {
            OutcomeStatus::Classified => {
                format!("  {} → {}", outcome.file_name, outcome.node_id).normal()
            }
            OutcomeStatus::Fallback { reason } => format!(
                "  {} → {} ({})",
                outcome.file_name, outcome.node_id, reason
            )
            .yellow(),
        };
        out.push_str(&format!("{}\n", line));
    }
    out.push_str(&format!(
        "{} classified, {} sent to the fallback folder\n",
        report.classified(),
        report.fallbacks()
    ));
    out
}

pub fn render_config(config: &DocketConfig) -> String {
    KEYS.iter()
        .filter_map(|k| config.get(k).map(|v| format!("{} = {}\n", k, v)))
        .collect()
}

pub fn render_messages(messages: &[CmdMessage]) -> String {
    messages
        .iter()
        .map(|m| {
            let content = match m.level {
                MessageLevel::Info => m.content.dimmed(),
                MessageLevel::Success => m.content.green(),
                MessageLevel::Warning => m.content.yellow(),
                MessageLevel::Error => m.content.red(),
            };
            format!("{}\n", content)
        })
        .collect()
}

pub fn print_messages(messages: &[CmdMessage]) {
    print!("{}", render_messages(messages));
}

fn display_name(file_name: &str, title: &Option<String>) -> String {
    match title {
        Some(t) if !t.is_empty() => format!("{} ({})", t, file_name),
        _ => file_name.to_string(),
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    use unicode_width::UnicodeWidthChar;

    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut current_width = 0;
    let limit = max_width.saturating_sub(1);
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > limit {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}
