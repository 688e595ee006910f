//! # Document Composer
//!
//! Turns a letterhead template and an event snapshot into a finished report
//! document.
//!
//! ## Layout
//!
//! Everything the template already contains is kept as-is. After it, at the
//! end of the document body, the composer appends:
//!
//! 1.  The event title as a centred heading.
//! 2.  One paragraph per field, always in this order: `Date`, `Venue`,
//!     `Department`, `Description`. Each is a bold label, a tab, then the value.
//! 3.  An "Event Photograph" section with the event photo, if the event has
//!     one and it can be read and decoded.
//! 4.  An "Attendance" section, starting on a new page, with the attendance
//!     sheet photo under the same rule.
//!
//! Photos are rescaled so they never exceed the printable width of the page,
//! flattened over a white background and embedded as PNG parts. A photo that
//! is missing from the media store or cannot be decoded is left out and the
//! report is produced without it.
//!
//! The composer never writes anything: it returns the document bytes and
//! leaves storage to the caller.

use crate::error::{ReportError, ReportResult};
use crate::reports::docx::{self, Package, CONTENT_TYPES_PART, DOCUMENT_PART, DOCUMENT_RELS_PART};
use crate::reports::template::Template;
use crate::storage::media::MediaStore;
use common::model::event::EventSnapshot;
use image::imageops::FilterType;
use image::{load_from_memory, DynamicImage, GenericImageView};
use log::{debug, warn};
use png::{BitDepth as PngBitDepth, ColorType as PngColorType, Encoder as PngEncoder};
use quick_xml::escape::escape;
use std::error::Error;
use std::sync::Arc;

/// Widest an embedded image may be, in inches: a Letter page less one-inch margins.
pub const MAX_IMAGE_WIDTH_INCH: f64 = 6.0;
const IMAGE_DPI: f64 = 150.0;
const EMU_PER_INCH: f64 = 914_400.0;

const EVENT_PHOTO_LABEL: &str = "Event Photograph";
const ATTENDANCE_LABEL: &str = "Attendance";

const FIELD_FONT: &str =
    r#"<w:rFonts w:ascii="Times New Roman" w:hAnsi="Times New Roman" w:cs="Times New Roman"/>"#;

/// A photo ready to embed: PNG bytes plus its pixel size.
struct PreparedImage {
    png: Vec<u8>,
    width_px: u32,
    height_px: u32,
}

impl PreparedImage {
    /// Display size in EMUs at `IMAGE_DPI`.
    fn extent_emu(&self) -> (u64, u64) {
        let to_emu = |px: u32| (px as f64 / IMAGE_DPI * EMU_PER_INCH).round() as u64;
        (to_emu(self.width_px), to_emu(self.height_px))
    }
}

pub struct DocumentComposer {
    media: Arc<dyn MediaStore>,
}

impl DocumentComposer {
    pub fn new(media: Arc<dyn MediaStore>) -> Self {
        DocumentComposer { media }
    }

    /// Composes the report for `event` on top of `template`.
    ///
    /// # Errors
    /// `Composition` if the template package cannot be edited or serialized.
    /// Photo problems are never errors.
    pub fn compose(&self, template: &Template, event: &EventSnapshot) -> ReportResult<Vec<u8>> {
        let mut package: Package = template.package().clone();
        let mut document = package
            .part_str(DOCUMENT_PART)
            .ok_or_else(|| composition(format!("template has no {} part", DOCUMENT_PART)))?
            .to_string();

        let mut block = String::new();
        push_heading(&mut block, &event.title);
        for (label, value) in event_fields(event) {
            push_field(&mut block, label, value);
        }

        let photos = [
            (EVENT_PHOTO_LABEL, false, event.event_photo_path.as_deref()),
            (ATTENDANCE_LABEL, true, event.attendance_photo_path.as_deref()),
        ];
        let mut rels = package.document_relationships();
        let mut embedded = 0;
        for (label, new_page, path) in photos {
            let Some(image) = path.and_then(|p| self.load_photo(event.id, p)) else {
                continue;
            };

            let media_name = package.unused_media_name();
            let rel_id = docx::next_relationship_id(&rels);
            let target = media_name.trim_start_matches("word/");
            docx::add_image_relationship(&mut rels, &rel_id, target)
                .ok_or_else(|| composition("document relationships part is malformed"))?;
            let drawing_id = unused_drawing_id(&document, &block);

            push_section_label(&mut block, label, new_page);
            push_drawing(&mut block, &rel_id, drawing_id, label, &image);
            package.put_part(&media_name, image.png);
            embedded += 1;
        }

        if embedded > 0 {
            let mut types = package
                .part_str(CONTENT_TYPES_PART)
                .ok_or_else(|| composition("template has no content types part"))?
                .to_string();
            docx::ensure_png_content_type(&mut types)
                .ok_or_else(|| composition("content types part is malformed"))?;
            package.put_part(CONTENT_TYPES_PART, types.into_bytes());
            package.put_part(DOCUMENT_RELS_PART, rels.into_bytes());
        }

        let at = docx::body_insertion_point(&document)
            .ok_or_else(|| composition("template document has no body"))?;
        document.insert_str(at, &block);
        package.put_part(DOCUMENT_PART, document.into_bytes());

        let bytes = package.to_bytes()?;
        debug!(
            "Composed report for event {} on {} ({} images, {} bytes)",
            event.id,
            template.path().display(),
            embedded,
            bytes.len()
        );
        Ok(bytes)
    }

    /// Reads and prepares an optional photo. Any failure means "no photo".
    fn load_photo(&self, event_id: i64, path: &str) -> Option<PreparedImage> {
        if !self.media.exists(path) {
            debug!("Event {}: photo {} not found, skipping", event_id, path);
            return None;
        }
        let bytes = self.media.read(path)?;
        match prepare_image(&bytes) {
            Ok(image) => Some(image),
            Err(e) => {
                warn!("Event {}: photo {} could not be embedded: {}", event_id, path, e);
                None
            }
        }
    }
}

fn composition(message: impl Into<String>) -> ReportError {
    ReportError::Composition(message.into())
}

/// Field labels and values in report order.
fn event_fields(event: &EventSnapshot) -> [(&'static str, &str); 4] {
    [
        ("Date", event.date.as_str()),
        ("Venue", event.venue.as_str()),
        ("Department", event.department.as_str()),
        ("Description", event.description.as_str()),
    ]
}

/// Run content for `value`, keeping its line breaks.
fn text_runs(value: &str) -> String {
    value
        .split('\n')
        .map(|line| {
            format!(
                r#"<w:t xml:space="preserve">{}</w:t>"#,
                escape(line.trim_end_matches('\r'))
            )
        })
        .collect::<Vec<_>>()
        .join("<w:br/>")
}

fn push_heading(block: &mut String, title: &str) {
    block.push_str(&format!(
        concat!(
            r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/><w:spacing w:before="240" w:after="120"/><w:jc w:val="center"/></w:pPr>"#,
            r#"<w:r><w:rPr><w:b/><w:sz w:val="32"/></w:rPr>{}</w:r></w:p>"#,
        ),
        text_runs(title)
    ));
}

fn push_field(block: &mut String, label: &str, value: &str) {
    block.push_str(&format!(
        concat!(
            r#"<w:p><w:pPr><w:spacing w:before="0" w:after="40"/></w:pPr>"#,
            r#"<w:r><w:rPr>{font}<w:b/><w:sz w:val="24"/></w:rPr><w:t>{label}</w:t></w:r>"#,
            r#"<w:r><w:tab/></w:r>"#,
            r#"<w:r><w:rPr>{font}<w:sz w:val="24"/></w:rPr>{value}</w:r></w:p>"#,
        ),
        font = FIELD_FONT,
        label = escape(label),
        value = text_runs(value),
    ));
}

fn push_section_label(block: &mut String, label: &str, new_page: bool) {
    let page_break = if new_page { "<w:pageBreakBefore/>" } else { "" };
    block.push_str(&format!(
        concat!(
            r#"<w:p><w:pPr><w:keepNext/>{}<w:spacing w:before="240" w:after="120"/><w:jc w:val="center"/></w:pPr>"#,
            r#"<w:r><w:rPr><w:b/><w:sz w:val="28"/></w:rPr><w:t>{}</w:t></w:r></w:p>"#,
        ),
        page_break,
        escape(label)
    ));
}

fn push_drawing(block: &mut String, rel_id: &str, drawing_id: u32, name: &str, image: &PreparedImage) {
    let (cx, cy) = image.extent_emu();
    block.push_str(&format!(
        concat!(
            r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r>"#,
            r#"<w:drawing xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing""#,
            r#" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main""#,
            r#" xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture""#,
            r#" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
            r#"<wp:inline distT="0" distB="0" distL="0" distR="0">"#,
            r#"<wp:extent cx="{cx}" cy="{cy}"/>"#,
            r#"<wp:docPr id="{id}" name="{name}"/>"#,
            r#"<a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
            r#"<pic:pic><pic:nvPicPr><pic:cNvPr id="0" name="{name}"/><pic:cNvPicPr/></pic:nvPicPr>"#,
            r#"<pic:blipFill><a:blip r:embed="{rel}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
            r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
            r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr></pic:pic>"#,
            r#"</a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#,
        ),
        cx = cx,
        cy = cy,
        id = drawing_id,
        name = escape(name),
        rel = rel_id,
    ));
}

/// First drawing id not used in the document or in content appended so far.
fn unused_drawing_id(document: &str, block: &str) -> u32 {
    (1..)
        .find(|n| {
            let needle = format!("id=\"{}\"", n);
            !document.contains(&needle) && !block.contains(&needle)
        })
        .unwrap_or(u32::MAX)
}

/// Decodes a photo, shrinks it to the printable width and re-encodes it as
/// an 8-bit RGB PNG with any transparency flattened over white.
fn prepare_image(bytes: &[u8]) -> Result<PreparedImage, Box<dyn Error>> {
    let max_width_px = MAX_IMAGE_WIDTH_INCH * IMAGE_DPI;

    let img = load_from_memory(bytes)?;
    let (orig_w, orig_h) = img.dimensions();
    if orig_w == 0 || orig_h == 0 {
        return Err("image has no pixels".into());
    }
    let orig_w_f = orig_w as f64;
    let orig_h_f = orig_h as f64;

    let scale = (max_width_px / orig_w_f).min(1.0);
    let resized: DynamicImage = if scale >= 1.0 {
        img
    } else {
        let new_w = (orig_w_f * scale).max(1.0).floor() as u32;
        let new_h = (orig_h_f * scale).max(1.0).round() as u32;
        img.resize(new_w, new_h, FilterType::Lanczos3)
    };

    let rgba = resized.to_rgba8();
    let (w, h) = rgba.dimensions();
    let mut background = image::RgbaImage::from_pixel(w, h, image::Rgba([255, 255, 255, 255]));
    image::imageops::overlay(&mut background, &rgba, 0, 0);
    let raw = DynamicImage::ImageRgba8(background).to_rgb8().into_raw();

    let mut png = Vec::new();
    {
        let mut encoder = PngEncoder::new(&mut png, w, h);
        encoder.set_color(PngColorType::Rgb);
        encoder.set_depth(PngBitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&raw)?;
        writer.finish()?;
    }

    Ok(PreparedImage {
        png,
        width_px: w,
        height_px: h,
    })
}
