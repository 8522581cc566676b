//! Inline markup: `**bold**` spans, `•` bullet blocks, blank-line paragraphs.
//!
//! Parsing never fails. Unpaired markers degrade to plain text.

use serde::Serialize;

pub const BOLD_MARKER: &str = "**";
pub const BULLET: char = '•';

/// A contiguous span of text, plain or bold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyledRun {
    pub text: String,
    pub bold: bool,
}

impl StyledRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), bold: false }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self { text: text.into(), bold: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Block {
    Paragraph { runs: Vec<StyledRun> },
    BulletList { items: Vec<Vec<StyledRun>> },
}

/// Parses a page's content into paragraphs and bullet lists.
pub fn parse_blocks(content: &str) -> Vec<Block> {
    content
        .split("\n\n")
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(|block| {
            if block.starts_with(BULLET) {
                let items = block
                    .lines()
                    .map(|line| line.trim().trim_start_matches(BULLET).trim())
                    .filter(|item| !item.is_empty())
                    .map(bold_runs)
                    .collect();
                Block::BulletList { items }
            } else {
                Block::Paragraph { runs: bold_runs(block) }
            }
        })
        .collect()
}

/// Applies the bold-span rule: parts between `**` markers alternate plain,
/// bold, plain... An odd trailing marker is dropped and the rest stays plain.
pub fn bold_runs(text: &str) -> Vec<StyledRun> {
    let parts: Vec<&str> = text.split(BOLD_MARKER).collect();
    let unpaired = parts.len() % 2 == 0;
    let last = parts.len() - 1;

    let mut runs: Vec<StyledRun> = Vec::new();
    for (i, part) in parts.into_iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        let bold = i % 2 == 1 && !(unpaired && i == last);
        push_run(&mut runs, part, bold);
    }
    runs
}

/// Appends `text`, merging into the previous run when the style matches.
pub fn push_run(runs: &mut Vec<StyledRun>, text: &str, bold: bool) {
    match runs.last_mut() {
        Some(prev) if prev.bold == bold => prev.text.push_str(text),
        _ => runs.push(StyledRun { text: text.to_string(), bold }),
    }
}

/// Serializes runs back to markup, wrapping bold runs in markers.
pub fn to_markup(runs: &[StyledRun]) -> String {
    runs.iter()
        .map(|r| if r.bold { format!("{BOLD_MARKER}{}{BOLD_MARKER}", r.text) } else { r.text.clone() })
        .collect()
}

/// Removes every bold marker from `text`, keeping what they enclosed.
pub fn strip_markers(text: &str) -> String {
    text.replace(BOLD_MARKER, "")
}
