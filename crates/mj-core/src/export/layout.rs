//! Fixed-page layout of an issue.
//!
//! A running baseline cursor walks down each physical page. Every derived page
//! after the first starts on a fresh physical page; body lines spill onto new
//! physical pages whenever the cursor has passed the bottom margin. Footers
//! are stamped in a final pass once the page count is known.

use std::collections::VecDeque;

use chrono::NaiveDate;

use super::wrap::{wrap_text, WrappedLine};
use super::{
    format_export_date, volume_line, DrawOp, FontWeight, ImageSlot, LaidOutDocument, PageGeometry,
    PhysicalPage, TextMeasure, Typography, APP_LABEL, APP_TITLE, MM,
};
use crate::markup::{bold_runs, StyledRun};
use crate::models::Issue;
use crate::pages::Page;

/// Share of the usable width given to a page image.
const IMAGE_COLUMN_SHARE: f32 = 0.25;
const IMAGE_GUTTER: f32 = 4.0 * MM;

pub struct DocumentLayout<'m> {
    geometry: PageGeometry,
    typo: Typography,
    measure: &'m dyn TextMeasure,
}

/// Lays out with A4 geometry and the default typography.
pub fn layout_document(
    issue: &Issue,
    pages: &[Page],
    slots: &[Option<ImageSlot>],
    measure: &dyn TextMeasure,
    date: NaiveDate,
) -> LaidOutDocument {
    DocumentLayout::new(measure).compose(issue, pages, slots, date)
}

struct Cursor {
    pages: Vec<PhysicalPage>,
    y: f32,
    top: f32,
}

impl Cursor {
    fn ops(&mut self) -> &mut Vec<DrawOp> {
        // `pages` starts with one page and only grows
        let last = self.pages.len() - 1;
        &mut self.pages[last].ops
    }

    fn break_page(&mut self) {
        self.pages.push(PhysicalPage::default());
        self.y = self.top;
    }
}

impl<'m> DocumentLayout<'m> {
    pub fn new(measure: &'m dyn TextMeasure) -> Self {
        Self { geometry: PageGeometry::A4, typo: Typography::default(), measure }
    }

    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn with_typography(mut self, typo: Typography) -> Self {
        self.typo = typo;
        self
    }

    pub fn compose(
        &self,
        issue: &Issue,
        pages: &[Page],
        slots: &[Option<ImageSlot>],
        date: NaiveDate,
    ) -> LaidOutDocument {
        let g = &self.geometry;
        let t = &self.typo;
        let mut cur = Cursor { pages: vec![PhysicalPage::default()], y: g.margin, top: g.margin };

        self.centered(&mut cur, APP_TITLE, t.app_title_size);
        cur.y += 15.0 * MM;
        self.centered(&mut cur, &volume_line(issue), t.volume_size);
        cur.y += 10.0 * MM;
        self.centered(&mut cur, &issue.title, t.issue_title_size);
        cur.y += 20.0 * MM;
        self.rule(&mut cur, 0.5);
        cur.y += 15.0 * MM;

        for (i, page) in pages.iter().enumerate() {
            if i > 0 {
                cur.break_page();
            }
            let slot = slots.get(i).copied().flatten();
            self.section(&mut cur, page, slot);
        }

        let mut pages = cur.pages;
        self.stamp_footers(&mut pages, date);
        LaidOutDocument { geometry: self.geometry, pages }
    }

    fn section(&self, cur: &mut Cursor, page: &Page, slot: Option<ImageSlot>) {
        let g = &self.geometry;
        let t = &self.typo;

        self.centered(cur, &page.title.to_uppercase(), t.heading_size);
        cur.y += 10.0 * MM;
        self.rule(cur, 0.3);
        cur.y += 15.0 * MM;

        let (mut text_x, mut text_width) = match slot {
            Some(slot) => {
                let column = g.usable_width() * IMAGE_COLUMN_SHARE;
                let top = (cur.y - t.body_size).max(g.margin);
                let natural = column * slot.height_px as f32 / slot.width_px.max(1) as f32;
                let height = natural.min(g.bottom_limit() - top).max(0.0);
                cur.ops().push(DrawOp::Image { index: slot.index, x: g.margin, y: top, width: column, height });
                (g.margin + column + IMAGE_GUTTER, g.usable_width() - column - IMAGE_GUTTER)
            }
            None => (g.margin, g.usable_width()),
        };

        // text beside an image narrows only until the first overflow break
        let mut beside_image = slot.is_some();
        for source in page.content.split('\n') {
            let mut lines: VecDeque<WrappedLine> = wrap_text(source, text_width, t.body_size, self.measure).into();
            while let Some(line) = lines.pop_front() {
                if cur.y > g.bottom_limit() {
                    cur.break_page();
                    if beside_image {
                        beside_image = false;
                        (text_x, text_width) = (g.margin, g.usable_width());
                        let rest = rejoin(line, lines.drain(..));
                        lines = wrap_text(&rest, text_width, t.body_size, self.measure).into();
                        continue;
                    }
                }
                if !line.is_blank() {
                    let x = if page.kind.is_centered() {
                        text_x + (text_width - line.width) / 2.0
                    } else {
                        text_x
                    };
                    // each line carries its own markers, so bold is re-detected here
                    let runs = bold_runs(&line.markup());
                    let y = cur.y;
                    cur.ops().push(DrawOp::Text { x, y, size: t.body_size, runs });
                }
                cur.y += t.line_height;
            }
        }

        cur.y += t.paragraph_gap;
    }

    fn centered(&self, cur: &mut Cursor, text: &str, size: f32) {
        let width = self.measure.text_width(text, FontWeight::Bold, size);
        let x = (self.geometry.width - width) / 2.0;
        let y = cur.y;
        cur.ops().push(DrawOp::Text { x, y, size, runs: vec![StyledRun::bold(text)] });
    }

    fn rule(&self, cur: &mut Cursor, thickness: f32) {
        let g = &self.geometry;
        let y = cur.y;
        cur.ops().push(DrawOp::Rule { x1: g.margin, x2: g.width - g.margin, y, thickness });
    }

    fn stamp_footers(&self, pages: &mut [PhysicalPage], date: NaiveDate) {
        let g = &self.geometry;
        let size = self.typo.footer_size;
        let y = g.height - self.typo.footer_offset;
        let total = pages.len();
        let exported = format!("Exported on {}", format_export_date(date));
        let exported_w = self.measure.text_width(&exported, FontWeight::Regular, size);

        for (i, page) in pages.iter_mut().enumerate() {
            let label = format!("Page {} of {}", i + 1, total);
            let label_w = self.measure.text_width(&label, FontWeight::Regular, size);
            page.ops.push(DrawOp::Text {
                x: (g.width - label_w) / 2.0,
                y,
                size,
                runs: vec![StyledRun::plain(label)],
            });
            page.ops.push(DrawOp::Text {
                x: g.width - g.margin - exported_w,
                y,
                size,
                runs: vec![StyledRun::plain(exported.clone())],
            });
            page.ops.push(DrawOp::Text { x: g.margin, y, size, runs: vec![StyledRun::plain(APP_LABEL)] });
        }
    }
}

/// Markup of a partly drawn source line, ready to be wrapped again.
fn rejoin(first: WrappedLine, rest: impl Iterator<Item = WrappedLine>) -> String {
    let mut out = first.markup();
    for line in rest {
        if !line.continues_word {
            out.push(' ');
        }
        out.push_str(&line.markup());
    }
    out
}
