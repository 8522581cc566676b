//! Library browsing: search, layout filter and ordering over stored issues.

use serde::Deserialize;

use crate::error::AppError;
use crate::models::{Issue, Layout};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    Title,
}

/// Query string of `GET /api/issues` and the library page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LibraryQuery {
    pub q: Option<String>,
    /// A layout name, or `all`.
    pub layout: Option<String>,
    pub sort: SortOrder,
}

impl LibraryQuery {
    /// `None` means every layout; an unknown name is a validation error.
    pub fn layout_filter(&self) -> Result<Option<Layout>, AppError> {
        match self.layout.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(l) if l.eq_ignore_ascii_case("all") => Ok(None),
            Some(l) => l.parse().map(Some).map_err(AppError::ValidationError),
        }
    }

    /// Drops an unknown layout name so browsing falls back to every layout.
    pub fn lenient(mut self) -> Self {
        if let Err(e) = self.layout_filter() {
            log::debug!("Ignoring library filter: {e}");
            self.layout = None;
        }
        self
    }

    fn matches(&self, issue: &Issue, layout: Option<Layout>) -> bool {
        if layout.is_some_and(|l| l != issue.layout) {
            return false;
        }
        let needle = match self.q.as_deref().map(str::trim) {
            Some(n) if !n.is_empty() => n.to_lowercase(),
            _ => return true,
        };
        issue.title.to_lowercase().contains(&needle)
            || issue.subtitle.as_deref().is_some_and(|s| s.to_lowercase().contains(&needle))
    }

    /// Filters and orders `issues`.
    pub fn apply(&self, issues: Vec<Issue>) -> Result<Vec<Issue>, AppError> {
        let layout = self.layout_filter()?;
        let mut found: Vec<Issue> = issues.into_iter().filter(|i| self.matches(i, layout)).collect();
        match self.sort {
            SortOrder::Newest => found.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortOrder::Oldest => found.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            SortOrder::Title => found.sort_by_key(|i| i.title.to_lowercase()),
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    fn issue(title: &str, subtitle: Option<&str>, layout: Layout, day: i64) -> Issue {
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::days(day);
        Issue {
            id: Uuid::now_v7(),
            title: title.into(),
            subtitle: subtitle.map(Into::into),
            volume: "1".into(),
            issue_number: "1".into(),
            layout,
            foreword: Some("x".into()),
            reflections: None,
            lessons: None,
            images: vec![],
            music_track: None,
            created_at: at,
            updated_at: at,
        }
    }

    fn titles(list: &[Issue]) -> Vec<&str> {
        list.iter().map(|i| i.title.as_str()).collect()
    }

    fn shelf() -> Vec<Issue> {
        vec![
            issue("Summer Chronicles", None, Layout::Retro, 1),
            issue("mindful Moments", Some("A Journey Within"), Layout::Anime, 3),
            issue("Growth Stories", Some("Finding balance"), Layout::Fashion, 2),
        ]
    }

    #[test]
    fn default_query_is_newest_first() {
        let out = LibraryQuery::default().apply(shelf()).unwrap();
        assert_eq!(titles(&out), vec!["mindful Moments", "Growth Stories", "Summer Chronicles"]);
    }

    #[test]
    fn search_matches_title_or_subtitle_case_insensitively() {
        let q = LibraryQuery { q: Some("JOURNEY".into()), ..Default::default() };
        assert_eq!(titles(&q.apply(shelf()).unwrap()), vec!["mindful Moments"]);

        let q = LibraryQuery { q: Some("stories".into()), ..Default::default() };
        assert_eq!(titles(&q.apply(shelf()).unwrap()), vec!["Growth Stories"]);
    }

    #[test]
    fn layout_filter_and_title_sort() {
        let q = LibraryQuery { layout: Some("all".into()), sort: SortOrder::Title, ..Default::default() };
        assert_eq!(
            titles(&q.apply(shelf()).unwrap()),
            vec!["Growth Stories", "mindful Moments", "Summer Chronicles"]
        );

        let q = LibraryQuery { layout: Some("retro".into()), ..Default::default() };
        assert_eq!(titles(&q.apply(shelf()).unwrap()), vec!["Summer Chronicles"]);
    }

    #[test]
    fn oldest_first() {
        let q = LibraryQuery { sort: SortOrder::Oldest, ..Default::default() };
        assert_eq!(
            titles(&q.apply(shelf()).unwrap()),
            vec!["Summer Chronicles", "Growth Stories", "mindful Moments"]
        );
    }

    #[test]
    fn unknown_layout_is_rejected_unless_lenient() {
        let q = LibraryQuery { layout: Some("retr0".into()), ..Default::default() };
        let err = q.apply(shelf()).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(ref m) if m.contains("retr0")));

        let q = q.lenient();
        assert_eq!(q.layout, None);
        assert_eq!(q.apply(shelf()).unwrap().len(), 3);

        let q = LibraryQuery { layout: Some(" Anime ".into()), ..Default::default() }.lenient();
        assert_eq!(titles(&q.apply(shelf()).unwrap()), vec!["mindful Moments"]);
    }
}
