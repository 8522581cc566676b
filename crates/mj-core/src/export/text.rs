//! Plain-text export: one continuous stream, no physical pages, no images.

use chrono::NaiveDate;

use super::{format_export_date, volume_line, APP_TITLE};
use crate::markup::strip_markers;
use crate::models::Issue;
use crate::pages::Page;

const RULE_WIDTH: usize = 50;
const UNDERLINE_WIDTH: usize = 40;

pub fn export_plain_text(issue: &Issue, pages: &[Page], date: NaiveDate) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let underline = "-".repeat(UNDERLINE_WIDTH);

    let mut out = format!("{APP_TITLE}\n\n{}\n{}\n{rule}\n", volume_line(issue), issue.title);

    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            out.push_str(&format!("\n{rule}\n"));
        }
        out.push_str(&format!(
            "\n{}\n{underline}\n\n{}\n",
            page.title.to_uppercase(),
            strip_markers(page.content.trim_end())
        ));
    }

    out.push_str(&format!("\nExported on: {}", format_export_date(date)));
    out
}
