//! Prompt builders for the text generation endpoints. Pure string assembly;
//! the generator itself lives behind [`crate::traits::TextGenerator`].

use std::str::FromStr;

use serde::Deserialize;

use crate::error::AppError;
use crate::models::Layout;

const DEFAULT_TITLE: &str = "Personal Journal";

/// Section an AI completion is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Foreword,
    Reflections,
    Lessons,
}

impl ContentKind {
    pub const ALL: [ContentKind; 3] = [ContentKind::Foreword, ContentKind::Reflections, ContentKind::Lessons];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Foreword => "foreword",
            ContentKind::Reflections => "reflections",
            ContentKind::Lessons => "lessons",
        }
    }
}

impl FromStr for ContentKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "foreword" => Ok(ContentKind::Foreword),
            "reflections" => Ok(ContentKind::Reflections),
            "lessons" => Ok(ContentKind::Lessons),
            other => Err(AppError::ValidationError(format!("Invalid content type: {other}"))),
        }
    }
}

/// What the caller knows about the issue being drafted. Every field optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PromptContext {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub volume: Option<String>,
    pub issue_number: Option<String>,
    pub layout: Option<Layout>,
}

impl PromptContext {
    fn title(&self) -> Option<&str> {
        non_blank(self.title.as_deref())
    }

    fn subtitle(&self) -> Option<&str> {
        non_blank(self.subtitle.as_deref())
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// ` titled "X"` or nothing.
fn titled(ctx: &PromptContext) -> String {
    ctx.title().map(|t| format!(" titled \"{t}\"")).unwrap_or_default()
}

pub fn title_prompt() -> String {
    "Suggest a title for a personal magazine journal about growth, mindfulness and \
     reflection on everyday life. Two to four words, memorable and warm. \
     Reply with the title only, without quotes."
        .to_string()
}

pub fn subtitle_prompt(ctx: &PromptContext) -> String {
    let title = ctx.title().unwrap_or(DEFAULT_TITLE);
    format!(
        "Suggest a subtitle of four to eight words for a personal magazine journal titled \"{title}\". \
         It should complement the title and hint at discovery or change. \
         Reply with the subtitle only, without quotes."
    )
}

pub fn content_prompt(kind: ContentKind, ctx: &PromptContext) -> String {
    let titled = titled(ctx);
    match kind {
        ContentKind::Foreword => {
            let subtitle = ctx.subtitle().map(|s| format!(" with subtitle \"{s}\"")).unwrap_or_default();
            let volume = non_blank(ctx.volume.as_deref()).unwrap_or("1");
            let issue = non_blank(ctx.issue_number.as_deref()).unwrap_or("1");
            format!(
                "Write the foreword of a personal magazine journal{titled}{subtitle}, \
                 Volume {volume}, Issue {issue}. Two or three paragraphs in the first person, \
                 opening with \"Dear Reader,\". Welcome the reader and introduce the themes of the issue."
            )
        }
        ContentKind::Reflections => {
            let about = ctx.subtitle().map(|s| format!(" about {}", s.to_lowercase())).unwrap_or_default();
            format!(
                "Write personal reflections for a magazine journal{titled}{about}. \
                 Three or four paragraphs with concrete moments and sensory detail, \
                 in an honest conversational voice."
            )
        }
        ContentKind::Lessons => format!(
            "List four or five life lessons for a personal journal{titled}. \
             Give each lesson a bold title wrapped in **double asterisks** on its own line, \
             followed by two or three sentences of explanation. Separate lessons with a blank line."
        ),
    }
}

fn layout_theme(layout: Layout) -> &'static str {
    match layout {
        Layout::Anime => "anime illustration, vibrant colours, playful manga aesthetic",
        Layout::Retro => "retro eighties look, neon palette, synthwave details",
        Layout::Fashion => "minimal editorial fashion photography, refined and modern",
    }
}

pub fn image_description_prompt(ctx: &PromptContext) -> String {
    let title = ctx.title().unwrap_or(DEFAULT_TITLE);
    let subtitle = ctx.subtitle().map(|s| format!("Subtitle: \"{s}\"\n")).unwrap_or_default();
    let theme = layout_theme(ctx.layout.unwrap_or_default());
    format!(
        "Describe a magazine cover illustration.\n\
         Title: \"{title}\"\n\
         {subtitle}\
         Style: {theme}\n\
         Describe colours, composition and mood in 100 to 150 words, \
         suitable as an image generation prompt."
    )
}
