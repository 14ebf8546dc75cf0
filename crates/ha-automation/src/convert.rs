//! Document conversion
//!
//! The [`Converter`] runs the whole pipeline for one document: locate the
//! automations, plan and apply the renames on the parsed value, then either
//! edit the source text in place or serialize the converted value.

use crate::automation::AutomationPlan;
use crate::document::{locate_automations, mapping_at, node_at, Location};
use crate::report::{AutomationReport, ConversionReport};
use crate::rewrite::{plan_edits, RewriteError};
use ha_config::{apply_edits, to_yaml_string, write_atomic, ConfigError, Edit, Value, YamlDocument};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Name used in errors for documents that did not come from a file
const STRING_SOURCE: &str = "<string>";

/// Conversion errors
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("output path {} is a directory", path.display())]
    OutputIsDirectory { path: PathBuf },
}

/// Result type for conversions
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Conversion settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Edit the source text instead of re-serializing it
    pub preserve_comments: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            preserve_comments: true,
        }
    }
}

/// Result of converting one document
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Converted YAML text
    pub output: String,
    /// Converted document
    pub value: Value,
    /// What changed
    pub report: ConversionReport,
}

/// Converts automation documents from the legacy to the current schema
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ConvertOptions {
        self.options
    }

    /// Convert a YAML string
    pub fn convert_str(&self, source: &str) -> ConvertResult<Conversion> {
        let document = YamlDocument::parse(source, STRING_SOURCE)?;
        self.convert_document(&document)
    }

    /// Convert a file, writing the result to `output` unless `dry_run` is set
    pub fn convert_file(&self, input: &Path, output: &Path, dry_run: bool) -> ConvertResult<Conversion> {
        if output.is_dir() {
            return Err(ConvertError::OutputIsDirectory {
                path: output.to_path_buf(),
            });
        }

        let document = YamlDocument::load(input)?;
        let conversion = self.convert_document(&document)?;

        if dry_run {
            debug!("Dry run, not writing {:?}", output);
        } else {
            write_atomic(output, &conversion.output)?;
            info!("Converted {:?} into {:?}", input, output);
        }

        Ok(conversion)
    }

    /// Convert a parsed document
    pub fn convert_document(&self, document: &YamlDocument) -> ConvertResult<Conversion> {
        let mut value = document.value().clone();
        let mut plans = Vec::new();

        for location in locate_automations(&value) {
            let Some(automation) = mapping_at(&mut value, &location) else {
                continue;
            };
            let plan = AutomationPlan::for_automation(automation);
            plan.apply(automation);
            plans.push((location, plan));
        }

        let mut report =
            ConversionReport::new(plans.iter().map(|(_, plan)| AutomationReport::from_plan(plan)).collect());

        let output = if !report.has_changes() {
            document.source().to_string()
        } else if self.options.preserve_comments {
            match rewrite_source(document, &plans, &value) {
                Ok(text) => text,
                Err(e) => {
                    warn!(
                        "Cannot keep formatting of {:?} ({}); writing it without comments",
                        document.path(),
                        e
                    );
                    report.mark_fallback();
                    to_yaml_string(&value)?
                }
            }
        } else {
            to_yaml_string(&value)?
        };

        Ok(Conversion {
            output,
            value,
            report,
        })
    }
}

/// Edit the source text and check it parses back to `expected`
fn rewrite_source(
    document: &YamlDocument,
    plans: &[(Location, AutomationPlan)],
    expected: &Value,
) -> Result<String, RewriteError> {
    let outline = document
        .outline()
        .map_err(|e| RewriteError::Layout(e.to_string()))?;
    let mut edits: Vec<Edit> = Vec::new();

    for (location, plan) in plans.iter().filter(|(_, plan)| !plan.is_noop()) {
        let node = node_at(&outline.root, location)
            .ok_or_else(|| RewriteError::NotBlockMapping(plan.name.clone()))?;
        edits.extend(plan_edits(plan, node)?);
    }

    let text = apply_edits(document.source(), edits).map_err(|e| {
        debug!("Edit failed: {}", e);
        RewriteError::Diverged
    })?;

    match serde_yaml::from_str::<Value>(&text) {
        Ok(reparsed) if reparsed == *expected => Ok(text),
        Ok(_) => Err(RewriteError::Diverged),
        Err(e) => {
            debug!("Edited text no longer parses: {}", e);
            Err(RewriteError::Diverged)
        }
    }
}
