//! # mj-ui
//!
//! Server-rendered pages: dashboard, library, flip-book viewer and the
//! not-found view. Templates live in `templates/`; the structs here are the
//! view models they render.

use askama::Template;
use mj_core::flip::{Direction, Easing, FlipController, PanelFrame, Tick, Timeline, Tween};
use mj_core::library::{LibraryQuery, SortOrder};
use mj_core::markup::{parse_blocks, Block, StyledRun};
use mj_core::models::{Issue, Layout, MusicTrack};
use mj_core::pages::Page;
use uuid::Uuid;

/// Summary of an issue as shown on dashboard and library cards.
#[derive(Debug, Clone)]
pub struct IssueCard {
    pub id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    pub volume_line: String,
    pub layout: &'static str,
    pub created: String,
}

impl From<&Issue> for IssueCard {
    fn from(issue: &Issue) -> Self {
        Self {
            id: issue.id,
            title: issue.title.clone(),
            subtitle: issue.subtitle.clone(),
            volume_line: mj_core::export::volume_line(issue),
            layout: issue.layout.as_str(),
            created: issue.created_at.format("%B %-d, %Y").to_string(),
        }
    }
}

/// A paragraph (one item, possibly several lines) or a bullet list (one line per item).
#[derive(Debug, Clone, PartialEq)]
pub struct BlockView {
    pub bullet: bool,
    pub lines: Vec<Vec<StyledRun>>,
}

/// Splits runs at newlines so each displayed line keeps its styling.
fn split_lines(runs: &[StyledRun]) -> Vec<Vec<StyledRun>> {
    let mut lines = vec![Vec::new()];
    for run in runs {
        for (i, piece) in run.text.split('\n').enumerate() {
            if i > 0 {
                lines.push(Vec::new());
            }
            if !piece.is_empty() {
                if let Some(line) = lines.last_mut() {
                    line.push(StyledRun { text: piece.to_string(), bold: run.bold });
                }
            }
        }
    }
    lines
}

impl From<Block> for BlockView {
    fn from(block: Block) -> Self {
        match block {
            Block::Paragraph { runs } => BlockView { bullet: false, lines: split_lines(&runs) },
            Block::BulletList { items } => BlockView { bullet: true, lines: items },
        }
    }
}

#[derive(Debug, Clone)]
pub struct PageView {
    pub title: String,
    pub centered: bool,
    pub image: Option<String>,
    pub blocks: Vec<BlockView>,
}

impl From<&Page> for PageView {
    fn from(page: &Page) -> Self {
        Self {
            title: page.title.clone(),
            centered: page.kind.is_centered(),
            image: page.image.clone(),
            blocks: parse_blocks(&page.content).into_iter().map(BlockView::from).collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub title: String,
    pub latest: Vec<IssueCard>,
}

impl DashboardTemplate {
    pub fn new(latest: &[Issue]) -> Self {
        Self { title: "My Magazine Journal".into(), latest: latest.iter().map(IssueCard::from).collect() }
    }
}

/// One `<option>` of a library filter.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOption {
    pub value: &'static str,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "library.html")]
pub struct LibraryTemplate {
    pub title: String,
    pub issues: Vec<IssueCard>,
    pub q: String,
    pub layouts: Vec<FilterOption>,
    pub sorts: Vec<FilterOption>,
}

impl LibraryTemplate {
    /// `issues` must already be filtered and ordered by `query`.
    pub fn new(issues: &[Issue], query: &LibraryQuery) -> Self {
        let layout = query.layout_filter().ok().flatten();
        let layouts = std::iter::once(FilterOption { value: "all", selected: layout.is_none() })
            .chain(Layout::ALL.iter().map(|l| FilterOption { value: l.as_str(), selected: layout == Some(*l) }))
            .collect();
        let sorts = [(SortOrder::Newest, "newest"), (SortOrder::Oldest, "oldest"), (SortOrder::Title, "title")]
            .into_iter()
            .map(|(order, value)| FilterOption { value, selected: query.sort == order })
            .collect();

        Self {
            title: "Library".into(),
            issues: issues.iter().map(IssueCard::from).collect(),
            q: query.q.clone().unwrap_or_default(),
            layouts,
            sorts,
        }
    }
}

/// Samples taken over one page turn; one CSS keyframe each.
const TURN_SAMPLES: u32 = 20;

fn round2(v: f32) -> f32 {
    (v * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq)]
pub struct TweenView {
    pub from: f32,
    pub to: f32,
    pub duration_ms: u128,
    pub easing: String,
    pub yoyo: bool,
}

impl From<&Tween> for TweenView {
    fn from(tween: &Tween) -> Self {
        Self {
            from: round2(tween.from),
            to: round2(tween.to),
            duration_ms: tween.duration.as_millis(),
            easing: match tween.easing {
                Easing::Linear => "linear".into(),
                Easing::PowerInOut(power) => format!("power{power}.inOut"),
            },
            yoyo: tween.yoyo,
        }
    }
}

/// Panel state at `percent` of a turn.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeView {
    pub percent: u32,
    pub front: f32,
    pub back: f32,
    pub shadow: f32,
}

impl KeyframeView {
    fn at(percent: u32, frame: PanelFrame) -> Self {
        Self {
            percent,
            front: round2(frame.front_rotation),
            back: round2(frame.back_rotation),
            shadow: round2(frame.shadow_opacity),
        }
    }
}

/// A page turn rehearsed on a [`Timeline`] and baked into keyframes, so the
/// browser plays exactly the curve the controller plans.
#[derive(Debug, Clone)]
pub struct TurnView {
    pub direction: &'static str,
    pub total_ms: u128,
    pub front: TweenView,
    pub back: TweenView,
    pub shadow: TweenView,
    pub keyframes: Vec<KeyframeView>,
}

impl TurnView {
    /// Runs a turn from `flip`'s page; returns it with the page it lands on,
    /// or `None` when the controller refuses the turn.
    fn rehearse(flip: &FlipController, direction: Direction) -> Option<(Self, usize)> {
        let mut ctl = flip.clone();
        let mut timeline = Timeline::default();
        let plan = ctl.request(direction, &mut timeline)?;
        let total = plan.total();
        let step = total / TURN_SAMPLES;

        let mut keyframes = vec![KeyframeView::at(0, timeline.frame())];
        for i in 1..=TURN_SAMPLES {
            let frame = match timeline.advance(step) {
                Tick::Running(frame) => frame,
                Tick::Finished | Tick::Idle => plan.frame_at(total),
            };
            keyframes.push(KeyframeView::at(i * 100 / TURN_SAMPLES, frame));
        }
        let landed = ctl.complete(&mut timeline)?;

        let turn = Self {
            direction: match direction {
                Direction::Next => "next",
                Direction::Prev => "prev",
            },
            total_ms: total.as_millis(),
            front: TweenView::from(&plan.front),
            back: TweenView::from(&plan.back),
            shadow: TweenView::from(&plan.shadow),
            keyframes,
        };
        Some((turn, landed))
    }
}

/// One face of the book: the shown page, or the page a turn lands on.
#[derive(Debug, Clone)]
pub struct PanelView {
    pub page: PageView,
    /// One-based page number.
    pub number: usize,
    /// `None` on the front panel.
    pub turn: Option<TurnView>,
}

#[derive(Template)]
#[template(path = "viewer.html")]
pub struct ViewerTemplate {
    pub title: String,
    pub issue: IssueCard,
    /// Front panel first, then one back panel per possible turn.
    pub panels: Vec<PanelView>,
    /// Zero-based index of the shown page
    pub index: usize,
    pub page_count: usize,
    pub prev: Option<usize>,
    pub next: Option<usize>,
    pub music: Option<MusicTrack>,
}

impl ViewerTemplate {
    /// Shows page `index` (clamped) of `pages`; `pages` must not be empty.
    pub fn new(issue: &Issue, pages: &[Page], index: usize) -> Self {
        let flip = FlipController::at(pages.len(), index);
        let index = flip.page();
        let view = |i: usize| {
            pages.get(i).map(PageView::from).unwrap_or_else(|| PageView {
                title: issue.title.clone(),
                centered: false,
                image: None,
                blocks: Vec::new(),
            })
        };

        let mut panels = vec![PanelView { page: view(index), number: index + 1, turn: None }];
        for direction in [Direction::Next, Direction::Prev] {
            if let Some((turn, landed)) = TurnView::rehearse(&flip, direction) {
                panels.push(PanelView { page: view(landed), number: landed + 1, turn: Some(turn) });
            }
        }

        Self {
            title: issue.title.clone(),
            issue: IssueCard::from(issue),
            panels,
            index,
            page_count: flip.page_count(),
            prev: flip.can_flip(Direction::Prev).then(|| index - 1),
            next: flip.can_flip(Direction::Next).then(|| index + 1),
            music: issue.music_track.clone(),
        }
    }

    pub fn page_number(&self) -> usize {
        self.index + 1
    }
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub title: String,
    pub message: String,
}

impl NotFoundTemplate {
    pub fn new(message: impl Into<String>) -> Self {
        Self { title: "Not found".into(), message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mj_core::models::IssueInput;
    use mj_core::pages::segment;

    fn echoes() -> Issue {
        IssueInput {
            title: "Echoes".into(),
            subtitle: Some("Notes <from> the road".into()),
            volume: "2".into(),
            issue_number: "5".into(),
            foreword: Some("Dear Reader,\nWelcome.\n\n• one\n• **two**".into()),
            lessons: Some("**Lesson One**\nBe kind.".into()),
            ..Default::default()
        }
        .into_issue(Uuid::now_v7(), Utc::now())
    }

    #[test]
    fn paragraph_lines_keep_bold() {
        let view = BlockView::from(Block::Paragraph { runs: vec![StyledRun::bold("Lesson One"), StyledRun::plain("\nBe kind.")] });
        assert_eq!(view.lines, vec![vec![StyledRun::bold("Lesson One")], vec![StyledRun::plain("Be kind.")]]);
    }

    #[test]
    fn viewer_renders_blocks_and_navigation() {
        let issue = echoes();
        let pages = segment(&issue);
        let html = ViewerTemplate::new(&issue, &pages, 1).render().unwrap();
        assert!(html.contains("Foreword"));
        assert!(html.contains("<li><strong>two</strong></li>"));
        assert!(html.contains("Dear Reader,<br>"));
        assert!(html.contains(&format!("/view/{}?page=0", issue.id)));
        assert!(html.contains(&format!("/view/{}?page=2", issue.id)));
        assert!(html.contains("data-total-ms=\"800\""));
        assert!(html.contains("Page 2 of 4"));
    }

    #[test]
    fn viewer_clamps_and_hides_missing_neighbours() {
        let issue = echoes();
        let pages = segment(&issue);
        let view = ViewerTemplate::new(&issue, &pages, 99);
        assert_eq!(view.index, 3);
        assert_eq!(view.next, None);
        assert_eq!(view.prev, Some(2));

        let first = ViewerTemplate::new(&issue, &pages, 0);
        assert_eq!(first.prev, None);
    }

    #[test]
    fn cards_escape_user_text() {
        let html = DashboardTemplate::new(&[echoes()]).render().unwrap();
        assert!(html.contains("Notes &lt;from&gt; the road"));
        assert!(html.contains("Volume 2 – Issue 5"));
    }

    #[test]
    fn library_keeps_query_state() {
        let query = LibraryQuery { q: Some("echo".into()), layout: Some("anime".into()), sort: SortOrder::Title };
        let html = LibraryTemplate::new(&[], &query).render().unwrap();
        assert!(html.contains("value=\"echo\""));
        assert!(html.contains("<option value=\"anime\" selected>"));
        assert!(html.contains("No issues found"));
    }

    #[test]
    fn not_found_offers_the_library() {
        let html = NotFoundTemplate::new("Issue not found").render().unwrap();
        assert!(html.contains("Issue not found"));
        assert!(html.contains("href=\"/library\""));
        assert!(html.contains("Back to library"));
    }

    #[test]
    fn viewer_has_back_panels_driven_by_the_flip_plan() {
        let issue = echoes();
        let pages = segment(&issue);
        let view = ViewerTemplate::new(&issue, &pages, 1);

        assert_eq!(view.panels.len(), 3);
        assert!(view.panels[0].turn.is_none());
        assert_eq!(view.panels[0].number, 2);

        let next = view.panels[1].turn.as_ref().unwrap();
        assert_eq!((next.direction, view.panels[1].number), ("next", 3));
        assert_eq!((next.front.from, next.front.to), (0.0, -180.0));
        assert_eq!((next.back.from, next.back.to), (180.0, 0.0));
        assert_eq!(next.front.easing, "power2.inOut");
        assert_eq!((next.shadow.to, next.shadow.duration_ms, next.shadow.yoyo), (0.3, 400, true));
        assert_eq!(next.keyframes.len(), 21);
        let first = &next.keyframes[0];
        let mid = &next.keyframes[10];
        let last = &next.keyframes[20];
        assert_eq!((first.front, first.back, first.shadow), (0.0, 180.0, 0.0));
        assert_eq!((mid.percent, mid.front, mid.back, mid.shadow), (50, -90.0, 90.0, 0.3));
        assert_eq!((last.percent, last.front, last.back, last.shadow), (100, -180.0, 0.0, 0.0));
        // cubic ease-in: a quarter in, the leaf has turned far less than a quarter
        assert!(next.keyframes[5].front > -45.0);

        let prev = view.panels[2].turn.as_ref().unwrap();
        assert_eq!((prev.direction, view.panels[2].number), ("prev", 1));
        assert_eq!((prev.back.from, prev.front.to), (-180.0, 180.0));

        let html = view.render().unwrap();
        assert_eq!(html.matches("page-back back-").count(), 2);
        assert!(html.contains("Lessons Learned"));
        assert!(html.contains("data-back-from=\"180\""));
        assert!(html.contains("@keyframes front-next"));
        assert!(html.contains("@keyframes shade-prev"));
    }

    #[test]
    fn first_page_only_turns_forward() {
        let issue = echoes();
        let pages = segment(&issue);
        let view = ViewerTemplate::new(&issue, &pages, 0);
        let turns: Vec<_> = view.panels.iter().filter_map(|p| p.turn.as_ref()).map(|t| t.direction).collect();
        assert_eq!(turns, vec!["next"]);
    }
}
