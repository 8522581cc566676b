//! # mj-export-pdf
//!
//! `DocumentRenderer` producing PDF through `lopdf`. Text uses the standard
//! Helvetica faces, so no font file is embedded; images become DeviceRGB
//! XObjects. Layout coordinates run top-down and are flipped here.

pub mod images;
pub mod metrics;

use std::time::Duration;

use anyhow::{bail, Context};
use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use mj_core::export::{DrawOp, FontWeight, LaidOutDocument, PreparedImage, TextMeasure};
use mj_core::traits::DocumentRenderer;
use reqwest::Client;

pub use metrics::HelveticaMetrics;

const FONT_REGULAR: &str = "F1";
const FONT_BOLD: &str = "F2";

pub struct PdfRenderer {
    client: Client,
    metrics: HelveticaMetrics,
}

impl PdfRenderer {
    /// `fetch_timeout` bounds each remote image download.
    pub fn new(fetch_timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(fetch_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client, metrics: HelveticaMetrics })
    }
}

fn font_name(weight: FontWeight) -> &'static str {
    match weight {
        FontWeight::Regular => FONT_REGULAR,
        FontWeight::Bold => FONT_BOLD,
    }
}

fn image_name(index: usize) -> String {
    format!("Im{index}")
}

/// Content stream operations of one physical page.
fn page_operations(ops: &[DrawOp], page_height: f32) -> Vec<Operation> {
    let mut out = Vec::new();
    for op in ops {
        match op {
            DrawOp::Text { x, y, size, runs } => {
                out.push(Operation::new("BT", vec![]));
                out.push(Operation::new("Td", vec![(*x).into(), (page_height - *y).into()]));
                let mut current: Option<FontWeight> = None;
                for run in runs.iter().filter(|r| !r.text.is_empty()) {
                    let weight = FontWeight::of(run.bold);
                    if current != Some(weight) {
                        out.push(Operation::new("Tf", vec![Object::Name(font_name(weight).into()), (*size).into()]));
                        current = Some(weight);
                    }
                    out.push(Operation::new("Tj", vec![Object::string_literal(metrics::encode(&run.text))]));
                }
                out.push(Operation::new("ET", vec![]));
            }
            DrawOp::Rule { x1, x2, y, thickness } => {
                let y = page_height - *y;
                out.push(Operation::new("w", vec![(*thickness).into()]));
                out.push(Operation::new("m", vec![(*x1).into(), y.into()]));
                out.push(Operation::new("l", vec![(*x2).into(), y.into()]));
                out.push(Operation::new("S", vec![]));
            }
            DrawOp::Image { index, x, y, width, height } => {
                out.push(Operation::new("q", vec![]));
                out.push(Operation::new(
                    "cm",
                    vec![
                        (*width).into(),
                        0.into(),
                        0.into(),
                        (*height).into(),
                        (*x).into(),
                        (page_height - *y - *height).into(),
                    ],
                ));
                out.push(Operation::new("Do", vec![Object::Name(image_name(*index).into_bytes())]));
                out.push(Operation::new("Q", vec![]));
            }
        }
    }
    out
}

fn image_stream(image: &PreparedImage) -> anyhow::Result<Stream> {
    let expected = image.width as usize * image.height as usize * 3;
    if image.rgb.len() != expected {
        bail!("image buffer holds {} bytes, expected {expected}", image.rgb.len());
    }
    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => i64::from(image.width),
        "Height" => i64::from(image.height),
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
    };
    Ok(Stream::new(dict, image.rgb.clone()))
}

/// Serializes a laid-out document to PDF bytes.
pub fn render_pdf(doc: &LaidOutDocument, images: &[PreparedImage]) -> anyhow::Result<Vec<u8>> {
    let g = doc.geometry;
    let mut pdf = Document::with_version("1.5");
    let pages_id: ObjectId = pdf.new_object_id();

    let regular_id = pdf.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = pdf.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut xobjects = Dictionary::new();
    for (index, image) in images.iter().enumerate() {
        let id = pdf.add_object(image_stream(image).with_context(|| format!("image {index}"))?);
        xobjects.set(image_name(index), id);
    }

    let resources_id = pdf.add_object(dictionary! {
        "Font" => dictionary! {
            FONT_REGULAR => regular_id,
            FONT_BOLD => bold_id,
        },
        "XObject" => xobjects,
    });

    let mut kids: Vec<Object> = Vec::with_capacity(doc.pages.len());
    for page in &doc.pages {
        if let Some(DrawOp::Image { index, .. }) =
            page.ops.iter().find(|op| matches!(op, DrawOp::Image { index, .. } if *index >= images.len()))
        {
            bail!("page references missing image {index}");
        }
        let content = Content { operations: page_operations(&page.ops, g.height) };
        let content_id = pdf.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = pdf.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), g.width.into(), g.height.into()],
    };
    pdf.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = pdf.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    pdf.trailer.set("Root", catalog_id);
    pdf.compress();

    let mut bytes = Vec::new();
    pdf.save_to(&mut bytes).context("Failed to serialize PDF")?;
    Ok(bytes)
}

impl TextMeasure for PdfRenderer {
    fn text_width(&self, text: &str, weight: FontWeight, size: f32) -> f32 {
        self.metrics.text_width(text, weight, size)
    }
}

#[async_trait]
impl DocumentRenderer for PdfRenderer {
    async fn load_image(&self, reference: &str) -> anyhow::Result<PreparedImage> {
        let reference = reference.trim();
        let bytes = if reference.starts_with("data:") {
            images::decode_data_uri(reference)?
        } else if reference.starts_with("http://") || reference.starts_with("https://") {
            log::debug!("GET {reference}");
            images::fetch(&self.client, reference).await?
        } else {
            bail!("unsupported image reference");
        };
        tokio::task::spawn_blocking(move || images::prepare(&bytes))
            .await
            .context("Image decoding task failed")?
    }

    fn render(&self, doc: &LaidOutDocument, images: &[PreparedImage]) -> anyhow::Result<Vec<u8>> {
        render_pdf(doc, images)
    }

    fn content_type(&self) -> &'static str {
        "application/pdf"
    }
}
