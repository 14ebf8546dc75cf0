//! Automation schema migration
//!
//! This crate converts Home Assistant automation configs from the legacy
//! schema (Home Assistant 2024.9 and older) to the current one.
//!
//! # Architecture
//!
//! ```text
//! DOCUMENT → LOCATE AUTOMATIONS → PLAN → APPLY (value + source text) → REPORT
//! ```
//!
//! - **Locate**: find automations in `automations.yaml`, single-automation
//!   files and `configuration.yaml` sections
//! - **Plan**: decide which keys of one automation are renamed
//! - **Apply**: rename keys in the parsed value and, when comments are kept,
//!   in the source text through its outline
//! - **Report**: per-automation outcome and counts
//!
//! # Key Types
//!
//! - [`Converter`] - Runs the pipeline for a string, a document or a file
//! - [`AutomationPlan`] - Renames needed by one automation
//! - [`ConversionReport`] - What changed in one document

pub mod automation;
pub mod convert;
pub mod document;
pub mod report;
pub mod rewrite;

pub use automation::{AutomationPlan, Change, Conflict, KeyRename, KEY_RENAMES};
pub use convert::{Conversion, ConvertError, ConvertOptions, ConvertResult, Converter};
pub use document::{locate_automations, Location};
pub use report::{AutomationReport, ConversionReport, Outcome, Stats};
pub use rewrite::RewriteError;
