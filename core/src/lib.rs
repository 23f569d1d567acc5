//! Core document types for QA test-case imports.
//!
//! This crate defines the data model shared by the importer and its
//! consumers:
//!
//! - [`FormatVerdict`] / [`DocumentFormat`]: result of classifying raw text.
//! - [`ParsedDocument`]: the parsed test cases, the [`Section`] /
//!   [`Subsection`] tree and the priority and automation maps.
//! - [`TestCaseDraft`]: one parsed test case.
//! - [`TestCaseRecord`]: the flattened shape handed to persistence.
//!
//! Validation ([`validate_document`]) reports drafts that would make poor
//! records (empty ids or titles, duplicates) and nested-index drift.
//!
//! # Example
//!
//! ```
//! use qa_import_core::*;
//!
//! let mut doc = ParsedDocument::default();
//! let draft = TestCaseDraft::new("TC001", "Valid login", Some("1. AUTH"), Some("1.1 Login"));
//! doc.section_entry("1. AUTH")
//!     .subsection_entry("1.1 Login")
//!     .test_cases
//!     .push(draft.clone());
//! doc.test_cases.push(draft);
//!
//! assert_eq!(doc.find_section("1. AUTH").unwrap().title, "AUTH");
//! assert!(validate_document(&doc).is_empty());
//! ```

mod record;
mod types;
mod validate;

pub use record::TestCaseRecord;
pub use types::*;
pub use validate::{ValidationError, validate_document};
