//! # Export
//!
//! Paginated rendering of an issue into a fixed-page-size document, plus the
//! plain-text variant. Layout is independent of the output medium: the medium
//! only measures glyphs ([`TextMeasure`]) and serializes the laid-out pages
//! (see `DocumentRenderer` in the traits module).

pub mod layout;
pub mod text;
pub mod wrap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::markup::StyledRun;
use crate::models::Issue;

pub use layout::layout_document;
pub use text::export_plain_text;
pub use wrap::{wrap_text, WrappedLine};

/// Label printed in document headers and footers.
pub const APP_TITLE: &str = "MY MAGAZINE JOURNAL";
pub const APP_LABEL: &str = "My Magazine Journal";

const MM: f32 = 72.0 / 25.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FontWeight {
    Regular,
    Bold,
}

impl FontWeight {
    pub fn of(bold: bool) -> Self {
        if bold {
            FontWeight::Bold
        } else {
            FontWeight::Regular
        }
    }
}

/// Glyph metrics of the output medium.
pub trait TextMeasure {
    /// Advance width of `text` in points at `size` points.
    fn text_width(&self, text: &str, weight: FontWeight, size: f32) -> f32;

    fn runs_width(&self, runs: &[StyledRun], size: f32) -> f32 {
        runs.iter().map(|r| self.text_width(&r.text, FontWeight::of(r.bold), size)).sum()
    }
}

/// Page size and margin, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PageGeometry {
    pub const A4: PageGeometry = PageGeometry { width: 595.28, height: 841.89, margin: 20.0 * MM };

    /// Page width minus both horizontal margins.
    pub fn usable_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    /// Lowest baseline body text may be drawn at.
    pub fn bottom_limit(&self) -> f32 {
        self.height - self.margin
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

/// Font sizes and vertical rhythm of the export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Typography {
    pub app_title_size: f32,
    pub volume_size: f32,
    pub issue_title_size: f32,
    pub heading_size: f32,
    pub body_size: f32,
    pub footer_size: f32,
    pub line_height: f32,
    pub paragraph_gap: f32,
    /// Distance of the footer baseline above the page bottom.
    pub footer_offset: f32,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            app_title_size: 20.0,
            volume_size: 16.0,
            issue_title_size: 14.0,
            heading_size: 14.0,
            body_size: 11.0,
            footer_size: 8.0,
            line_height: 6.0 * MM,
            paragraph_gap: 10.0 * MM,
            footer_offset: 10.0 * MM,
        }
    }
}

/// One drawing instruction. `y` is a distance from the top edge; for text it
/// is the baseline, for images the top of the box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawOp {
    Text { x: f32, y: f32, size: f32, runs: Vec<StyledRun> },
    Rule { x1: f32, x2: f32, y: f32, thickness: f32 },
    Image { index: usize, x: f32, y: f32, width: f32, height: f32 },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PhysicalPage {
    pub ops: Vec<DrawOp>,
}

impl PhysicalPage {
    /// Concatenated text of every text op, in drawing order.
    pub fn text(&self) -> Vec<String> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { runs, .. } => Some(runs.iter().map(|r| r.text.as_str()).collect()),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaidOutDocument {
    pub geometry: PageGeometry,
    pub pages: Vec<PhysicalPage>,
}

/// Decoded RGB image ready for embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedImage {
    pub width: u32,
    pub height: u32,
    /// Packed 8-bit RGB, row-major
    pub rgb: Vec<u8>,
}

/// Where the image of a page sits among the prepared images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSlot {
    pub index: usize,
    pub width_px: u32,
    pub height_px: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Text,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Text => "txt",
        }
    }
}

/// `magazine-issue-{volume}-{issueNumber}.{ext}`
pub fn export_filename(issue: &Issue, format: ExportFormat) -> String {
    format!("magazine-issue-{}-{}.{}", issue.volume, issue.issue_number, format.extension())
}

/// "Volume 2 – Issue 5"
pub fn volume_line(issue: &Issue) -> String {
    format!("Volume {} – Issue {}", issue.volume, issue.issue_number)
}

/// Export dates print as month/day/year without padding, e.g. `10/7/2026`.
pub fn format_export_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}
