//! # Report Composition and Registry
//!
//! Everything needed to turn an event into a stored `.docx` report and to find
//! it again later.
//!
//! ## Sub-modules:
//! - `template`: loads and validates the configured letterhead.
//! - `compose`: appends event details and photos to a copy of the letterhead.
//! - `docx`: package-level helpers for reading and writing Word documents.
//! - `registry`: the append-only table of generated reports.
//! - `service`: runs generation end to end and answers read-side queries.

pub mod compose;
pub mod docx;
pub mod registry;
pub mod service;
pub mod template;
