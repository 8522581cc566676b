//! `GET /api/issues/{id}/export?format=pdf|txt`

use actix_web::http::header;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use mj_core::error::AppError;
use mj_core::export::{
    export_filename, export_plain_text, layout_document, ExportFormat, FontWeight, ImageSlot, PreparedImage,
    TextMeasure,
};
use mj_core::models::Issue;
use mj_core::pages::{segment, Page};
use mj_core::traits::DocumentRenderer;
use serde::Deserialize;

use super::{load_issue, AppState};
use crate::error::ApiResult;

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

impl ExportQuery {
    /// PDF unless told otherwise.
    pub fn format(&self) -> Result<ExportFormat, AppError> {
        match self.format.as_deref().map(|f| f.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("pdf") => Ok(ExportFormat::Pdf),
            Some("txt") | Some("text") => Ok(ExportFormat::Text),
            Some(other) => Err(AppError::ValidationError(format!("Unsupported export format '{other}'"))),
        }
    }
}

/// Borrows the renderer's glyph metrics for layout.
struct RendererMetrics<'a>(&'a dyn DocumentRenderer);

impl TextMeasure for RendererMetrics<'_> {
    fn text_width(&self, text: &str, weight: FontWeight, size: f32) -> f32 {
        self.0.text_width(text, weight, size)
    }
}

/// Loads the image of every page that has one. Images that fail to load are
/// left out of the document.
async fn prepare_images(renderer: &dyn DocumentRenderer, pages: &[Page]) -> (Vec<PreparedImage>, Vec<Option<ImageSlot>>) {
    let mut images = Vec::new();
    let mut slots = Vec::with_capacity(pages.len());
    for page in pages {
        let slot = match page.image.as_deref() {
            Some(reference) => match renderer.load_image(reference).await {
                Ok(image) => {
                    let slot = ImageSlot { index: images.len(), width_px: image.width, height_px: image.height };
                    images.push(image);
                    Some(slot)
                }
                Err(e) => {
                    log::warn!("⚠️ Skipping image on page '{}': {e:#}", page.title);
                    None
                }
            },
            None => None,
        };
        slots.push(slot);
    }
    (images, slots)
}

async fn render_pdf(data: &web::Data<AppState>, issue: &Issue, pages: &[Page]) -> Result<Vec<u8>, AppError> {
    let renderer = data.renderer.as_ref();
    let (images, slots) = prepare_images(renderer, pages).await;
    let doc = layout_document(issue, pages, &slots, &RendererMetrics(renderer), Utc::now().date_naive());
    log::debug!("Laid out issue {} on {} page(s)", issue.id, doc.pages.len());

    let state = data.clone();
    web::block(move || state.renderer.render(&doc, &images))
        .await
        .map_err(|e| AppError::Export(e.to_string()))?
        .map_err(|e| AppError::Export(format!("{e:#}")))
}

pub async fn export_issue(
    data: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ExportQuery>,
) -> ApiResult<HttpResponse> {
    let format = query.format()?;
    let issue = load_issue(&data, &path).await?;
    let pages = segment(&issue);

    let (content_type, body) = match format {
        ExportFormat::Text => {
            let text = export_plain_text(&issue, &pages, Utc::now().date_naive());
            ("text/plain; charset=utf-8", text.into_bytes())
        }
        ExportFormat::Pdf => (data.renderer.content_type(), render_pdf(&data, &issue, &pages).await?),
    };

    log::info!("📄 Exported issue {} as {} ({} bytes)", issue.id, format.extension(), body.len());
    Ok(HttpResponse::Ok()
        .content_type(content_type)
        .insert_header((header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", export_filename(&issue, format))))
        .body(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_defaults_to_pdf() {
        assert_eq!(ExportQuery::default().format().unwrap(), ExportFormat::Pdf);
        let txt = ExportQuery { format: Some("TXT".into()) };
        assert_eq!(txt.format().unwrap(), ExportFormat::Text);
        let bad = ExportQuery { format: Some("docx".into()) };
        assert!(matches!(bad.format(), Err(AppError::ValidationError(_))));
    }
}
