//! YAML document handling for Home Assistant configuration files
//!
//! This crate reads YAML files into a [`YamlDocument`] that keeps both the
//! parsed value and the original text, and provides the pieces needed to
//! change such a file without losing its comments and layout:
//!
//! - [`Outline`] - positions of keys and collections in the source
//! - [`Edit`] / [`apply_edits`] - line/column based text edits
//! - [`write_atomic`] - write through a temporary file and rename
//!
//! # Example
//!
//! ```ignore
//! use ha_config::{apply_edits, Edit, YamlDocument};
//!
//! let doc = YamlDocument::load("automations.yaml")?;
//! let outline = doc.outline()?;
//! let key = &outline.root.get("trigger").unwrap().key;
//! let text = apply_edits(
//!     doc.source(),
//!     vec![Edit::Replace { line: key.line, col: key.col, len: key.len, text: "triggers".into() }],
//! )?;
//! ```

mod edit;
mod error;
mod loader;
pub mod outline;

pub use edit::{apply_edits, Edit};
pub use error::{ConfigError, ConfigResult};
pub use loader::{
    find_yaml_files, is_output_file, output_path_for, to_yaml_string, write_atomic, YamlDocument,
};
pub use outline::{Entry, Item, Key, Node, NodeKind, Outline};

// Re-export serde_yaml types for convenience
pub use serde_yaml::{Mapping, Value};
