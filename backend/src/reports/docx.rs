//! Just enough WordprocessingML to clone a letterhead, append content to its
//! body and add picture parts.
//!
//! A `.docx` file is a zip package of XML parts. `Package` keeps every part
//! in memory in archive order so that a package can be edited and written
//! back out without touching the source file. Writing is deterministic: the
//! same parts always produce the same bytes.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read, Write};
use zip::result::ZipResult;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

pub const DOCUMENT_PART: &str = "word/document.xml";
pub const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

pub const IMAGE_RELATIONSHIP_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

const EMPTY_RELATIONSHIPS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"></Relationships>"#,
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    parts: Vec<(String, Vec<u8>)>,
}

impl Package {
    pub fn read(bytes: &[u8]) -> ZipResult<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut parts = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            if entry.is_dir() {
                continue;
            }
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut data)?;
            parts.push((entry.name().to_string(), data));
        }
        Ok(Package { parts })
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|(part_name, _)| part_name == name)
            .map(|(_, data)| data.as_slice())
    }

    /// The part as UTF-8 text, `None` if absent or not valid UTF-8.
    pub fn part_str(&self, name: &str) -> Option<&str> {
        self.part(name).and_then(|data| std::str::from_utf8(data).ok())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.part(name).is_some()
    }

    /// Replaces a part in place, or appends it if the package has none by that name.
    pub fn put_part(&mut self, name: &str, data: Vec<u8>) {
        match self.parts.iter_mut().find(|(part_name, _)| part_name == name) {
            Some((_, existing)) => *existing = data,
            None => self.parts.push((name.to_string(), data)),
        }
    }

    /// The relationships of the main document, or an empty relationships part.
    pub fn document_relationships(&self) -> String {
        self.part_str(DOCUMENT_RELS_PART)
            .unwrap_or(EMPTY_RELATIONSHIPS)
            .to_string()
    }

    /// First `word/media/report_imageN.png` name not already in the package.
    pub fn unused_media_name(&self) -> String {
        (1..)
            .map(|n| format!("word/media/report_image{}.png", n))
            .find(|name| !self.contains(name))
            .unwrap_or_default()
    }

    pub fn to_bytes(&self) -> ZipResult<Vec<u8>> {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in &self.parts {
            writer.start_file(name.as_str(), options)?;
            writer.write_all(data)?;
        }
        Ok(writer.finish()?.into_inner())
    }
}

/// Visible text of every paragraph in a document part, in document order.
///
/// Run-level tabs become `\t` and line breaks `\n`. Tab stops declared in
/// paragraph properties are not text and are skipped. Fails on XML that is not
/// well formed.
pub fn paragraph_texts(xml: &str) -> Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut open: Vec<String> = Vec::new();
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => open.push(String::new()),
                b"w:r" => in_run = true,
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => {
                let current = open.last_mut();
                match (e.name().as_ref(), current) {
                    (b"w:p", _) => paragraphs.push(String::new()),
                    (b"w:tab", Some(text)) if in_run => text.push('\t'),
                    (b"w:br", Some(text)) if in_run => text.push('\n'),
                    _ => {}
                }
            }
            Event::Text(t) if in_text => {
                if let Some(text) = open.last_mut() {
                    text.push_str(&t.unescape()?);
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:r" => in_run = false,
                b"w:p" => {
                    if let Some(text) = open.pop() {
                        paragraphs.push(text);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

/// Byte offset where appended body content belongs: right before the
/// body-level `<w:sectPr>` when the body ends with one, otherwise right
/// before `</w:body>`. `None` if the part has no body.
pub fn body_insertion_point(xml: &str) -> Option<usize> {
    const SECT_PR_CLOSE: &str = "</w:sectPr>";

    let body_end = xml.rfind("</w:body>")?;
    let body = &xml[..body_end];
    if let Some(sect_close) = body.rfind(SECT_PR_CLOSE) {
        if body[sect_close + SECT_PR_CLOSE.len()..].trim().is_empty() {
            return body[..sect_close].rfind("<w:sectPr").or(Some(body_end));
        }
    }
    Some(body_end)
}

/// First `rIdN` not used by any relationship in `rels`.
pub fn next_relationship_id(rels: &str) -> String {
    (1..)
        .map(|n| format!("rId{}", n))
        .find(|id| !rels.contains(&format!("Id=\"{}\"", id)))
        .unwrap_or_default()
}

/// Adds an image relationship; `target` is relative to `word/`.
pub fn add_image_relationship(rels: &mut String, id: &str, target: &str) -> Option<()> {
    let at = rels.rfind("</Relationships>")?;
    rels.insert_str(
        at,
        &format!(
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            id, IMAGE_RELATIONSHIP_TYPE, target
        ),
    );
    Some(())
}

/// Declares the `png` content type unless the package already does.
pub fn ensure_png_content_type(types: &mut String) -> Option<()> {
    if types.to_ascii_lowercase().contains(r#"extension="png""#) {
        return Some(());
    }
    let at = types.rfind("</Types>")?;
    types.insert_str(at, r#"<Default Extension="png" ContentType="image/png"/>"#);
    Some(())
}
