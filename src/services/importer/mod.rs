//! Bulk question import: parse an uploaded sheet, validate its rows, then insert the
//! questions and link them into a test in fixed-size batches.

pub mod job;
pub mod parse;
pub mod template;
pub mod upload;
pub mod validate;

pub use job::{spawn_import_job, CommitMode};
pub use parse::parse_spreadsheet;
pub use template::{question_template, TemplateFormat};
pub use validate::{validate_rows, ImportPreview};

/// Valid questions shown back to the admin before uploading
pub const PREVIEW_SAMPLE_SIZE: usize = 3;
