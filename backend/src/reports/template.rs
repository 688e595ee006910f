//! # Report Template
//!
//! The college letterhead every report is composed on. It is read from disk on
//! each generation, so replacing the file takes effect without a restart.

use crate::error::{ReportError, ReportResult};
use crate::reports::docx::{self, Package, CONTENT_TYPES_PART, DOCUMENT_PART};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// A letterhead document that has been read and checked.
///
/// Holding a `Template` means the package opened, declares its content types,
/// and its main document part has a well-formed body to append to.
#[derive(Debug, Clone)]
pub struct Template {
    path: PathBuf,
    package: Package,
}

impl Template {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn package(&self) -> &Package {
        &self.package
    }
}

/// Loads the single configured letterhead.
pub struct TemplateProvider {
    path: PathBuf,
}

impl TemplateProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TemplateProvider { path: path.into() }
    }

    /// Reads and validates the letterhead.
    ///
    /// Any problem, from a missing file to a document without a body, is
    /// reported as `TemplateMissing`: in every case someone has to upload a
    /// usable template before reports can be generated again.
    pub fn load(&self) -> ReportResult<Template> {
        let bytes = fs::read(&self.path)
            .map_err(|e| self.missing(format!("cannot read file: {}", e)))?;
        let package = Package::read(&bytes)
            .map_err(|e| self.missing(format!("not a word document: {}", e)))?;

        let document = package
            .part_str(DOCUMENT_PART)
            .ok_or_else(|| self.missing(format!("no readable {} part", DOCUMENT_PART)))?;
        let paragraphs = docx::paragraph_texts(document)
            .map_err(|e| self.missing(format!("malformed document body: {}", e)))?;
        if docx::body_insertion_point(document).is_none() {
            return Err(self.missing("document has no body".to_string()));
        }
        let declares_types = package
            .part_str(CONTENT_TYPES_PART)
            .is_some_and(|types| types.contains("</Types>"));
        if !declares_types {
            return Err(self.missing(format!("no readable {} part", CONTENT_TYPES_PART)));
        }

        debug!(
            "Loaded template {} ({} bytes, {} paragraphs)",
            self.path.display(),
            bytes.len(),
            paragraphs.len()
        );
        Ok(Template {
            path: self.path.clone(),
            package,
        })
    }

    fn missing(&self, reason: String) -> ReportError {
        ReportError::TemplateMissing {
            path: self.path.clone(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn assert_missing(result: ReportResult<Template>) {
        match result {
            Err(ReportError::TemplateMissing { .. }) => {}
            other => panic!("expected TemplateMissing, got {:?}", other),
        }
    }

    fn zip_with(name: &str, contents: &str) -> Vec<u8> {
        let mut writer = ZipWriter::new(std::io::Cursor::new(Vec::new()));
        writer.start_file(name, SimpleFileOptions::default()).unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    fn without_part(name: &str) -> Vec<u8> {
        let mut parts = test_support::letterhead_parts(&["College of Engineering"]);
        parts.retain(|(part, _)| *part != name);
        test_support::package(&parts)
    }

    fn with_part(name: &str, contents: &str) -> Vec<u8> {
        let mut parts = test_support::letterhead_parts(&["College of Engineering"]);
        for (part, existing) in parts.iter_mut() {
            if *part == name {
                *existing = contents.to_string();
            }
        }
        test_support::package(&parts)
    }

    #[test]
    fn loads_a_valid_letterhead() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_support::write_letterhead(dir.path(), &["College of Engineering"]);

        let template = TemplateProvider::new(&path).load().unwrap();

        assert_eq!(template.path(), path.as_path());
        assert!(template.package().contains(DOCUMENT_PART));
    }

    #[test]
    fn missing_file_is_template_missing() {
        let dir = tempfile::tempdir().unwrap();
        let provider = TemplateProvider::new(dir.path().join("college_letterhead.docx"));
        assert_missing(provider.load());
    }

    #[test]
    fn non_document_files_are_template_missing() {
        let dir = tempfile::tempdir().unwrap();
        let cases: Vec<(&str, Vec<u8>)> = vec![
            ("garbage.docx", b"not a zip archive".to_vec()),
            ("no_document.docx", zip_with("word/styles.xml", "<w:styles/>")),
            (
                "broken_xml.docx",
                zip_with(DOCUMENT_PART, "<w:document><w:body><w:p></w:body></w:document>"),
            ),
            ("no_body.docx", zip_with(DOCUMENT_PART, "<w:document/>")),
            ("no_content_types.docx", without_part(CONTENT_TYPES_PART)),
            ("truncated_content_types.docx", with_part(CONTENT_TYPES_PART, "<Types>")),
        ];

        for (name, bytes) in cases {
            let path = dir.path().join(name);
            fs::write(&path, bytes).unwrap();
            assert_missing(TemplateProvider::new(&path).load());
        }
    }

    #[test]
    fn error_message_names_the_path() {
        let provider = TemplateProvider::new("word_templates/college_letterhead.docx");
        let message = provider.load().unwrap_err().to_string();
        assert!(message.contains("word_templates/college_letterhead.docx"));
        assert!(message.contains("upload a letterhead"));
    }
}
