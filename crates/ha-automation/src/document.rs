//! Locating automations inside a YAML document
//!
//! Automations show up in three shapes:
//!
//! - `automations.yaml`: a list of automations
//! - a single automation (or blueprint) as the whole document
//! - `configuration.yaml`: automations under `automation:` or a labelled
//!   `automation <label>:` key, either as a list or a single mapping
//!
//! [`locate_automations`] returns a [`Location`] for each one, in document
//! order, which resolves against both the parsed value and the outline.

use crate::automation::is_automation;
use ha_config::{Node, Value};
use serde_yaml::Mapping;
use tracing::{debug, info};

/// Home Assistant domain key for automations in `configuration.yaml`
const AUTOMATION_DOMAIN: &str = "automation";

/// Where an automation sits in its document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// The document is the automation
    Root,
    /// Item of a root sequence
    Item(usize),
    /// The whole value of an `automation` section
    Section(String),
    /// Item of an `automation` section
    SectionItem(String, usize),
}

/// Whether a `configuration.yaml` key holds automations
///
/// Matches `automation` and labelled variants such as `automation manual`.
pub fn is_automation_section(key: &str) -> bool {
    match key.strip_prefix(AUTOMATION_DOMAIN) {
        Some("") => true,
        Some(label) => label.starts_with(' ') && !label.trim().is_empty(),
        None => false,
    }
}

/// Find every automation of a document
pub fn locate_automations(document: &Value) -> Vec<Location> {
    let locations: Vec<Location> = match document {
        Value::Sequence(items) => automation_items(items)
            .map(Location::Item)
            .collect(),
        Value::Mapping(root) if is_automation(root) => vec![Location::Root],
        Value::Mapping(root) => locate_sections(root),
        _ => Vec::new(),
    };

    debug!("Located {} automations", locations.len());
    locations
}

fn automation_items(items: &[Value]) -> impl Iterator<Item = usize> + '_ {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.as_mapping().is_some_and(is_automation))
        .map(|(index, _)| index)
}

fn locate_sections(root: &Mapping) -> Vec<Location> {
    let mut locations = Vec::new();

    for (key, value) in root {
        let Some(section) = key.as_str().filter(|k| is_automation_section(k)) else {
            continue;
        };

        match value {
            Value::Sequence(items) => locations.extend(
                automation_items(items).map(|index| Location::SectionItem(section.to_string(), index)),
            ),
            Value::Mapping(automation) if is_automation(automation) => {
                locations.push(Location::Section(section.to_string()));
            }
            Value::Tagged(tagged) => {
                info!(
                    "Section '{}' is loaded with {} {:?}; convert that file separately",
                    section, tagged.tag, tagged.value
                );
            }
            _ => {}
        }
    }

    locations
}

/// Resolve a location to the automation mapping in the parsed document
pub fn mapping_at<'a>(document: &'a mut Value, location: &Location) -> Option<&'a mut Mapping> {
    let value = match location {
        Location::Root => document,
        Location::Item(index) => document.as_sequence_mut()?.get_mut(*index)?,
        Location::Section(key) => document.as_mapping_mut()?.get_mut(key.as_str())?,
        Location::SectionItem(key, index) => document
            .as_mapping_mut()?
            .get_mut(key.as_str())?
            .as_sequence_mut()?
            .get_mut(*index)?,
    };
    value.as_mapping_mut()
}

/// Resolve a location to the automation node of the outline
pub fn node_at<'a>(root: &'a Node, location: &Location) -> Option<&'a Node> {
    match location {
        Location::Root => Some(root),
        Location::Item(index) => root.as_sequence()?.get(*index).map(|item| &item.value),
        Location::Section(key) => root.get(key).map(|entry| &entry.value),
        Location::SectionItem(key, index) => root
            .get(key)?
            .value
            .as_sequence()?
            .get(*index)
            .map(|item| &item.value),
    }
}
