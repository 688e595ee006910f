//! Fixtures shared by the unit tests.

use crate::catalog::EventCatalog;
use crate::error::ReportResult;
use crate::storage::media::MediaStore;
use common::model::event::EventSnapshot;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
    r#"<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>"#,
    r#"</Types>"#,
);

const PACKAGE_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
    r#"</Relationships>"#,
);

const DOCUMENT_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
    r#"</Relationships>"#,
);

const STYLES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"/>"#,
);

/// The parts of a letterhead `.docx` whose body holds one centred paragraph
/// per entry.
pub fn letterhead_parts(paragraphs: &[&str]) -> Vec<(&'static str, String)> {
    let body: String = paragraphs
        .iter()
        .map(|text| {
            format!(
                r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:rPr><w:b/></w:rPr><w:t>{}</w:t></w:r></w:p>"#,
                text
            )
        })
        .collect();
    let document = format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#,
            r#" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
            r#"<w:body>{}<w:sectPr><w:pgSz w:w="12240" w:h="15840"/>"#,
            r#"<w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440"/></w:sectPr>"#,
            r#"</w:body></w:document>"#,
        ),
        body
    );

    vec![
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("_rels/.rels", PACKAGE_RELS.to_string()),
        ("word/document.xml", document),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS.to_string()),
        ("word/styles.xml", STYLES.to_string()),
    ]
}

/// Zips `parts` in order.
pub fn package(parts: &[(&str, String)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in parts {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

pub fn letterhead(paragraphs: &[&str]) -> Vec<u8> {
    package(&letterhead_parts(paragraphs))
}

/// Writes `letterhead(paragraphs)` to `<dir>/word_templates/college_letterhead.docx`.
pub fn write_letterhead(dir: &Path, paragraphs: &[&str]) -> PathBuf {
    let path = dir.join("word_templates/college_letterhead.docx");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, letterhead(paragraphs)).unwrap();
    path
}

/// A PNG with a semi-transparent gradient, so scaling and flattening have
/// something to work on.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, 200])
    });
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

pub fn tech_fest() -> EventSnapshot {
    EventSnapshot {
        id: 1,
        title: "Tech Fest".to_string(),
        date: "2024-03-01".to_string(),
        venue: "Auditorium".to_string(),
        department: "CS".to_string(),
        description: String::new(),
        event_photo_path: None,
        attendance_photo_path: None,
    }
}

#[derive(Default)]
pub struct MemoryCatalog {
    events: HashMap<i64, EventSnapshot>,
}

impl MemoryCatalog {
    pub fn with(mut self, event: EventSnapshot) -> Self {
        self.events.insert(event.id, event);
        self
    }
}

impl EventCatalog for MemoryCatalog {
    fn get(&self, event_id: i64) -> ReportResult<Option<EventSnapshot>> {
        Ok(self.events.get(&event_id).cloned())
    }
}

#[derive(Default)]
pub struct MemoryMedia {
    blobs: HashMap<String, Vec<u8>>,
}

impl MemoryMedia {
    pub fn with(mut self, path: &str, bytes: Vec<u8>) -> Self {
        self.blobs.insert(path.to_string(), bytes);
        self
    }
}

impl MediaStore for MemoryMedia {
    fn read(&self, path: &str) -> Option<Vec<u8>> {
        self.blobs.get(path).cloned()
    }

    fn exists(&self, path: &str) -> bool {
        self.blobs.contains_key(path)
    }
}
