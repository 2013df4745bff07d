//! Raw-text heuristics for common forgery tells.
//!
//! These run on the document text before any registry lookup and feed the
//! verdict policy as forgery flags. They are cheap signals, not proof:
//! each one shows up in real tampered certificates but also in bad scans.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// Runs of capitals this long usually mean pasted-over or re-typeset text.
static ALL_CAPS_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z]{10,}").expect("caps pattern is a valid regex"));

/// Misspellings that keep appearing on forged institution seals.
const MISSPELLINGS: &[&str] = &["universtiy", "colege", "instutute", "certficate"];

/// Words any genuine certificate text mentions somewhere.
const EXPECTED_WORDS: &[&str] = &["certificate", "name", "year"];

/// Scan raw document text for forgery indicators.
///
/// Returns symbolic flags in a fixed order; an empty Vec means no
/// heuristic fired, not that the document is genuine.
pub fn forgery_indicators(text: &str) -> Vec<String> {
    let mut flags = Vec::new();

    if ALL_CAPS_RUN.find_iter(text).count() > 3 {
        flags.push("SUSPICIOUS_FORMATTING".to_string());
    }

    let lower = text.to_lowercase();
    if MISSPELLINGS.iter().any(|word| lower.contains(word)) {
        flags.push("SPELLING_ERRORS".to_string());
    }

    let missing = EXPECTED_WORDS
        .iter()
        .filter(|word| !lower.contains(*word))
        .count();
    if missing > 1 {
        flags.push("MISSING_REQUIRED_FIELDS".to_string());
    }

    debug!(flags = flags.len(), "scanned text for forgery indicators");
    flags
}
