//! Glyph metrics and encoding for the two standard Type 1 faces the renderer
//! uses (Helvetica and Helvetica-Bold, WinAnsiEncoding). Widths are the AFM
//! advance widths in 1/1000 em.

use mj_core::export::{FontWeight, TextMeasure};

/// Advance widths for codes 0x20..=0x7E.
#[rustfmt::skip]
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // space to /
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0 to ?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @ to O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P to _
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // ` to o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,      // p to ~
];

#[rustfmt::skip]
const HELVETICA_BOLD_ASCII: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Base letter of each code in 0xC0..=0xFF, used to borrow its width.
const LATIN1_BASE: &[u8; 64] = b"AAAAAA?CEEEEIIIIDNOOOOO*OUUUUY??aaaaaa?ceeeeiiiidnooooo/ouuuuy?y";

/// Byte substituted for characters WinAnsiEncoding cannot represent.
const REPLACEMENT: u8 = b'?';

/// Maps a character to its WinAnsiEncoding byte.
pub fn win_ansi(ch: char) -> u8 {
    match ch {
        ' '..='~' | '\u{A0}'..='\u{FF}' => ch as u8,
        '\u{20AC}' => 0x80,
        '\u{2026}' => 0x85,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\t' => b' ',
        _ => REPLACEMENT,
    }
}

pub fn encode(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi).collect()
}

/// Advance width of one encoded byte.
pub fn glyph_width(code: u8, weight: FontWeight) -> u16 {
    let bold = weight == FontWeight::Bold;
    let ascii = if bold { &HELVETICA_BOLD_ASCII } else { &HELVETICA_ASCII };
    match code {
        0x20..=0x7E => ascii[(code - 0x20) as usize],
        0x80 => 556,
        0x85 | 0x97 => 1000,
        0x91 | 0x92 => if bold { 278 } else { 222 },
        0x93 | 0x94 => if bold { 500 } else { 333 },
        0x95 => 350,
        0x96 => 556,
        0xA0 => 278,
        0xC6 => 1000,
        0xE6 => 889,
        0xDF => 611,
        0xD7 | 0xF7 => 584,
        0xDE | 0xFE => 667,
        0xC0..=0xFF => match LATIN1_BASE[(code - 0xC0) as usize] {
            b @ 0x20..=0x7E => ascii[(b - 0x20) as usize],
            _ => 556,
        },
        // Latin-1 punctuation and symbols get a nominal width
        _ => 556,
    }
}

/// `TextMeasure` over the built-in Helvetica metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct HelveticaMetrics;

impl TextMeasure for HelveticaMetrics {
    fn text_width(&self, text: &str, weight: FontWeight, size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| u32::from(glyph_width(win_ansi(c), weight))).sum();
        units as f32 * size / 1000.0
    }
}
