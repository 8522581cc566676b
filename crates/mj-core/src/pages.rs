//! Text segmentation: derives the display/export page sequence of an issue.
//!
//! The order is fixed: cover, foreword, reflections, lessons, closing. A
//! section only gets a page when its text is non-empty. An issue with no
//! sections at all collapses to a single fallback page.

use serde::Serialize;

use crate::models::Issue;

pub const FALLBACK_CONTENT: &str = "No content available.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    Cover,
    Content,
    Closing,
}

impl PageKind {
    /// Cover and closing pages centre their text.
    pub fn is_centered(&self) -> bool {
        !matches!(self, PageKind::Content)
    }
}

/// One derived unit of display or export content. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub title: String,
    pub content: String,
    pub image: Option<String>,
    pub kind: PageKind,
}

impl Page {
    fn content(title: &str, content: &str) -> Self {
        Self { title: title.to_string(), content: content.to_string(), image: None, kind: PageKind::Content }
    }
}

fn present(text: &Option<String>) -> Option<&str> {
    text.as_deref().filter(|t| !t.trim().is_empty())
}

/// Splits `issue` into its ordered page sequence. Never empty.
pub fn segment(issue: &Issue) -> Vec<Page> {
    let mut sections = Vec::with_capacity(3);
    if let Some(text) = present(&issue.foreword) {
        sections.push(Page::content("Foreword", text));
    }
    if let Some(text) = present(&issue.reflections) {
        sections.push(Page::content("Reflections", text));
    }
    if let Some(text) = present(&issue.lessons) {
        let mut page = Page::content("Lessons Learned", text);
        page.image = issue.images.first().cloned();
        sections.push(page);
    }

    if sections.is_empty() {
        return vec![Page::content(&issue.title, FALLBACK_CONTENT)];
    }

    let mut pages = Vec::with_capacity(sections.len() + 2);
    pages.push(cover(issue));
    pages.extend(sections);
    pages.push(closing(issue));
    pages
}

fn cover(issue: &Issue) -> Page {
    let mut content = format!("**{}**", issue.title);
    if let Some(subtitle) = present(&issue.subtitle) {
        content.push_str("\n\n");
        content.push_str(subtitle.trim());
    }
    content.push_str(&format!("\n\nVolume {} – Issue {}", issue.volume, issue.issue_number));
    Page { title: "Cover".into(), content, image: None, kind: PageKind::Cover }
}

fn closing(issue: &Issue) -> Page {
    Page {
        title: "Thank You".into(),
        content: format!(
            "Thank you for reading **{}**.\n\nUntil the next issue.",
            issue.title
        ),
        image: None,
        kind: PageKind::Closing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IssueInput, Layout};
    use chrono::Utc;
    use uuid::Uuid;

    fn issue(foreword: &str, reflections: &str, lessons: &str) -> Issue {
        IssueInput {
            title: "Echoes".into(),
            volume: "2".into(),
            issue_number: "5".into(),
            layout: Layout::Retro,
            foreword: Some(foreword.into()),
            reflections: Some(reflections.into()),
            lessons: Some(lessons.into()),
            images: vec!["data:image/png;base64,AAAA".into(), "https://example.com/b.png".into()],
            ..Default::default()
        }
        .into_issue(Uuid::now_v7(), Utc::now())
    }

    fn titles(pages: &[Page]) -> Vec<&str> {
        pages.iter().map(|p| p.title.as_str()).collect()
    }

    #[test]
    fn full_issue_has_cover_sections_and_closing() {
        let pages = segment(&issue("f", "r", "l"));
        assert_eq!(
            titles(&pages),
            vec!["Cover", "Foreword", "Reflections", "Lessons Learned", "Thank You"]
        );
        assert_eq!(pages[0].kind, PageKind::Cover);
        assert_eq!(pages[4].kind, PageKind::Closing);
        assert!(pages[1..4].iter().all(|p| p.kind == PageKind::Content));
    }

    #[test]
    fn empty_sections_are_skipped() {
        let pages = segment(&issue("Dear Reader,\n\nWelcome.", "", "**Lesson One**\nBe kind."));
        assert_eq!(titles(&pages), vec!["Cover", "Foreword", "Lessons Learned", "Thank You"]);
        assert_eq!(pages[1].content, "Dear Reader,\n\nWelcome.");
    }

    #[test]
    fn only_lessons_page_carries_the_first_image() {
        let pages = segment(&issue("f", "r", "l"));
        let with_image: Vec<_> = pages.iter().filter(|p| p.image.is_some()).collect();
        assert_eq!(with_image.len(), 1);
        assert_eq!(with_image[0].title, "Lessons Learned");
        assert_eq!(with_image[0].image.as_deref(), Some("data:image/png;base64,AAAA"));
    }

    #[test]
    fn no_sections_yields_single_fallback_page() {
        let mut bare = issue("", "", "");
        bare.foreword = None;
        let pages = segment(&bare);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].title, "Echoes");
        assert_eq!(pages[0].content, FALLBACK_CONTENT);
    }

    #[test]
    fn whitespace_only_section_counts_as_empty() {
        let mut raw = issue("f", "r", "l");
        raw.reflections = Some("   \n\n  ".into());
        assert_eq!(
            titles(&segment(&raw)),
            vec!["Cover", "Foreword", "Lessons Learned", "Thank You"]
        );
    }
}
