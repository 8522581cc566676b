//! Greedy word wrap over styled runs.
//!
//! Each source line (newline-separated) is wrapped on its own; an empty source
//! line yields an empty output line. Widths come from the output medium and
//! bold runs are measured in the bold face. Lines only break at whitespace,
//! except a single word wider than the whole line, which is cut at character
//! boundaries and its continuation lines are flagged.

use super::{FontWeight, TextMeasure};
use crate::markup::{bold_runs, push_run, to_markup, StyledRun};

/// One displayed line of wrapped text.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedLine {
    pub runs: Vec<StyledRun>,
    /// Measured width in points.
    pub width: f32,
    /// The line starts with the rest of a word cut on the previous line.
    pub continues_word: bool,
}

impl WrappedLine {
    /// Self-contained markup for the line: bold spans carry their own markers
    /// even when the source span was split by the wrap.
    pub fn markup(&self) -> String {
        to_markup(&self.runs)
    }

    pub fn plain(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn is_blank(&self) -> bool {
        self.runs.is_empty()
    }
}

struct Word {
    runs: Vec<StyledRun>,
    width: f32,
}

impl Word {
    fn starts_bold(&self) -> bool {
        self.runs.first().is_some_and(|r| r.bold)
    }
}

#[derive(Default)]
struct LineBuf {
    runs: Vec<StyledRun>,
    width: f32,
    continues_word: bool,
    empty: bool,
}

impl LineBuf {
    fn new() -> Self {
        Self { empty: true, ..Default::default() }
    }

    fn take(&mut self) -> WrappedLine {
        let line = WrappedLine {
            runs: std::mem::take(&mut self.runs),
            width: self.width,
            continues_word: self.continues_word,
        };
        *self = Self::new();
        line
    }
}

/// Wraps `text` so no line measures wider than `max_width` at `size`.
pub fn wrap_text(text: &str, max_width: f32, size: f32, measure: &dyn TextMeasure) -> Vec<WrappedLine> {
    let mut out = Vec::new();
    for source in text.split('\n') {
        wrap_source_line(source.trim_end_matches('\r'), max_width, size, measure, &mut out);
    }
    out
}

fn wrap_source_line(
    source: &str,
    max_width: f32,
    size: f32,
    measure: &dyn TextMeasure,
    out: &mut Vec<WrappedLine>,
) {
    let words = split_words(&bold_runs(source), size, measure);
    let mut line = LineBuf::new();

    for word in words {
        if word.width > max_width + f32::EPSILON {
            if !line.empty {
                out.push(line.take());
            }
            let mut pieces = cut_word(word, max_width, size, measure).into_iter().peekable();
            let mut first = true;
            while let Some(piece) = pieces.next() {
                line.continues_word = !first;
                line.runs = piece.runs;
                line.width = piece.width;
                line.empty = false;
                first = false;
                if pieces.peek().is_some() {
                    out.push(line.take());
                }
            }
            continue;
        }

        if line.empty {
            line.runs = word.runs;
            line.width = word.width;
            line.empty = false;
            continue;
        }

        let space_bold = line.runs.last().is_some_and(|r| r.bold) && word.starts_bold();
        let space = measure.text_width(" ", FontWeight::of(space_bold), size);
        if line.width + space + word.width <= max_width + f32::EPSILON {
            push_run(&mut line.runs, " ", space_bold);
            for run in word.runs {
                push_run(&mut line.runs, &run.text, run.bold);
            }
            line.width += space + word.width;
        } else {
            out.push(line.take());
            line.runs = word.runs;
            line.width = word.width;
            line.empty = false;
        }
    }

    out.push(line.take());
}

/// Splits runs at whitespace into words; a word may mix plain and bold.
fn split_words(runs: &[StyledRun], size: f32, measure: &dyn TextMeasure) -> Vec<Word> {
    let mut words = Vec::new();
    let mut current: Vec<StyledRun> = Vec::new();

    for run in runs {
        for ch in run.text.chars() {
            if ch.is_whitespace() {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            } else {
                let mut buf = [0u8; 4];
                push_run(&mut current, ch.encode_utf8(&mut buf), run.bold);
            }
        }
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .into_iter()
        .map(|runs| {
            let width = measure.runs_width(&runs, size);
            Word { runs, width }
        })
        .collect()
}

/// Cuts an over-long word into pieces that each fit `max_width`. Every piece
/// holds at least one character.
fn cut_word(word: Word, max_width: f32, size: f32, measure: &dyn TextMeasure) -> Vec<Word> {
    let mut pieces = Vec::new();
    let mut piece = Word { runs: Vec::new(), width: 0.0 };

    for run in &word.runs {
        for ch in run.text.chars() {
            let mut buf = [0u8; 4];
            let glyph = ch.encode_utf8(&mut buf);
            let w = measure.text_width(glyph, FontWeight::of(run.bold), size);
            if !piece.runs.is_empty() && piece.width + w > max_width + f32::EPSILON {
                pieces.push(std::mem::replace(&mut piece, Word { runs: Vec::new(), width: 0.0 }));
            }
            push_run(&mut piece.runs, glyph, run.bold);
            piece.width += w;
        }
    }
    if !piece.runs.is_empty() {
        pieces.push(piece);
    }
    pieces
}
