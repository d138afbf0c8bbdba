// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Terminal rendering for verdicts and pruned search trees.
//!
//! Plain ANSI, no theme engine: green for branches that stay alive, red
//! for pruned ones, dim for the assertion annotations. Respects `NO_COLOR`
//! and falls back to plain text when stdout is not a TTY, so piping a
//! report into a file stays clean.

use auditree::{Assertion, CandidateVerdict, VerificationTree};
use std::sync::OnceLock;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";

static COLOR: OnceLock<bool> = OnceLock::new();

fn color_enabled() -> bool {
    *COLOR.get_or_init(|| {
        std::env::var_os("NO_COLOR").is_none() && atty::is(atty::Stream::Stdout)
    })
}

fn paint(text: &str, code: &str) -> String {
    if color_enabled() {
        format!("{}{}{}", code, text, RESET)
    } else {
        text.to_string()
    }
}

/// Candidate name from problem metadata, falling back to the bare index.
pub fn candidate_label(metadata: &serde_json::Value, candidate: u32) -> String {
    metadata
        .get("candidates")
        .and_then(|names| names.get(candidate as usize))
        .and_then(|name| name.as_str())
        .map_or_else(|| candidate.to_string(), str::to_string)
}

/// One line summarizing a candidate's verdict.
pub fn verdict_line(metadata: &serde_json::Value, verdict: &CandidateVerdict) -> String {
    let label = candidate_label(metadata, verdict.candidate.get());
    if verdict.ruled_out {
        format!(
            "  {} {} ({} nodes, depth {})",
            paint("ruled out", GREEN),
            paint(&label, BOLD),
            verdict.nodes_visited,
            verdict.max_depth
        )
    } else {
        let counterexample = verdict
            .counterexample
            .as_ref()
            .map(|suffix| format!("{:?}", suffix))
            .unwrap_or_default();
        format!(
            "  {} {} — uncontradicted completion {}",
            paint("NOT ruled out", RED),
            paint(&label, BOLD),
            paint(&counterexample, YELLOW)
        )
    }
}

/// Render a pruned search tree, one node per line.
///
/// Reads bottom-up like the suffixes do: the root is the hypothesized
/// final survivor, each level below it one elimination earlier.
pub fn render_tree(
    tree: &VerificationTree,
    assertions: &[Assertion],
    metadata: &serde_json::Value,
) -> String {
    let mut out = String::new();
    render_node(tree, assertions, metadata, VerificationTree::ROOT, "", true, &mut out);
    out
}

fn render_node(
    tree: &VerificationTree,
    assertions: &[Assertion],
    metadata: &serde_json::Value,
    index: usize,
    prefix: &str,
    last: bool,
    out: &mut String,
) {
    let node = tree.node(index);
    let label = candidate_label(metadata, node.candidate.get());
    let connector = if node.parent.is_none() {
        ""
    } else if last {
        "└─ "
    } else {
        "├─ "
    };
    let annotation = if node.pruning_assertions.is_empty() {
        if node.valid && node.children.is_empty() {
            paint("survives", GREEN)
        } else {
            String::new()
        }
    } else {
        let reasons: Vec<String> = node
            .pruning_assertions
            .iter()
            .map(|&assertion| format!("#{} {}", assertion, assertions[assertion]))
            .collect();
        paint(&format!("✗ {}", reasons.join("; ")), RED)
    };
    out.push_str(&format!(
        "{}{}{}{}{}\n",
        prefix,
        connector,
        paint(&label, BOLD),
        if annotation.is_empty() { "" } else { "  " },
        annotation
    ));
    let child_prefix = if node.parent.is_none() {
        String::new()
    } else if last {
        format!("{}   ", prefix)
    } else {
        format!("{}│  ", prefix)
    };
    let count = node.children.len();
    for (position, &child) in node.children.iter().enumerate() {
        render_node(
            tree,
            assertions,
            metadata,
            child,
            &child_prefix,
            position + 1 == count,
            out,
        );
    }
}

/// Dim helper for secondary report lines.
pub fn dim(text: &str) -> String {
    paint(text, DIM)
}
