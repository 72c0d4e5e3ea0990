//! Schema document staging
//!
//! Mirrors a directory of schema documents into a distribution layout,
//! leaving out entries whose base name matches an ignore pattern. No document
//! is parsed here; this is a file-tree copy.

pub mod stager;

pub use stager::{list_files_in_folder, StageError, StageSummary, Stager};
