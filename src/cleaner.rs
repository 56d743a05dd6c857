//! Reply-text cleanup
//!
//! Strips model reasoning artifacts from generated replies before they are
//! persisted or sent. Pure text transformation; applying it twice yields the
//! same result as applying it once.

use once_cell::sync::Lazy;
use regex::Regex;

static THINK_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<think>.*?</think>").unwrap());

static META_OPENER_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(Let me|I'll|I will|Here's|Here is).*$").unwrap());

static THINKING_PROCESS_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?mi)^.*thinking process.*$").unwrap());

static THOUGHT_PROCESS_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?mi)^.*thought process.*$").unwrap());

static SUBJECT_METADATA_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\*\*Subject:\*\*.*$").unwrap());

static CATEGORY_METADATA_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\*\*Category:\*\*.*$").unwrap());

static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Remove model reasoning artifacts from a generated reply.
///
/// Steps, in order:
/// 1. `<think>...</think>` blocks (non-greedy per block, across lines)
/// 2. lines opening with first-person meta-narration
/// 3. lines mentioning a thinking/thought process (case-insensitive)
/// 4. bolded `**Subject:**` / `**Category:**` metadata lines
/// 5. collapse runs of blank lines to a single blank line
/// 6. trim surrounding whitespace
pub fn clean_reply(text: &str) -> String {
    let text = THINK_BLOCK.replace_all(text, "");
    let text = META_OPENER_LINE.replace_all(&text, "");
    let text = THINKING_PROCESS_LINE.replace_all(&text, "");
    let text = THOUGHT_PROCESS_LINE.replace_all(&text, "");
    let text = SUBJECT_METADATA_LINE.replace_all(&text, "");
    let text = CATEGORY_METADATA_LINE.replace_all(&text, "");
    let text = BLANK_RUN.replace_all(&text, "\n\n");
    text.trim().to_string()
}
