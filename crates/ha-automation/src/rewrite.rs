//! Comment-preserving rewrite of automation keys
//!
//! Turns an [`AutomationPlan`] into text [`Edit`]s against the outline of the
//! source, so the converted file differs from the original only in the
//! renamed keys (and, for a wrapped trigger, its indentation).

use crate::automation::{AutomationPlan, LEGACY_TRIGGER_TYPE, TRIGGER_TYPE};
use ha_config::{Edit, Key, Node, NodeKind};
use thiserror::Error;

/// Reasons the source text cannot be edited in place
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RewriteError {
    #[error("automation '{0}' is not a block mapping")]
    NotBlockMapping(String),

    #[error("key '{key}' of automation '{automation}' not found in the source")]
    KeyNotFound { automation: String, key: String },

    #[error("triggers of automation '{0}' are not laid out as a block")]
    TriggersNotBlock(String),

    #[error("source layout could not be read: {0}")]
    Layout(String),

    #[error("edited text does not match the converted document")]
    Diverged,
}

/// Build the edits that apply `plan` to the automation at `node`
pub fn plan_edits(plan: &AutomationPlan, node: &Node) -> Result<Vec<Edit>, RewriteError> {
    if node.as_mapping().is_none() {
        return Err(RewriteError::NotBlockMapping(plan.name.clone()));
    }

    let mut edits = Vec::new();

    for rename in &plan.renames {
        let key = find_key(plan, node, rename.from)?;
        edits.push(rename_edit(key, rename.to));
    }

    let Some(trigger_key) = plan.trigger_key else {
        return Ok(edits);
    };
    if !plan.wrap_trigger && plan.platform_items.is_empty() {
        return Ok(edits);
    }

    let triggers = &node
        .get(trigger_key)
        .ok_or_else(|| key_not_found(plan, trigger_key))?
        .value;

    if plan.wrap_trigger {
        if !matches!(triggers.kind, NodeKind::Mapping(_)) {
            return Err(RewriteError::TriggersNotBlock(plan.name.clone()));
        }
        edits.push(Edit::WrapInSequence {
            first_line: triggers.first_line,
            last_line: triggers.last_line,
            col: triggers.col,
        });
        if !plan.platform_items.is_empty() {
            let key = find_key(plan, triggers, LEGACY_TRIGGER_TYPE)?;
            edits.push(rename_edit(key, TRIGGER_TYPE));
        }
        return Ok(edits);
    }

    let items = triggers
        .as_sequence()
        .ok_or_else(|| RewriteError::TriggersNotBlock(plan.name.clone()))?;
    for &index in &plan.platform_items {
        let item = items
            .get(index)
            .ok_or_else(|| RewriteError::TriggersNotBlock(plan.name.clone()))?;
        let key = find_key(plan, &item.value, LEGACY_TRIGGER_TYPE)?;
        edits.push(rename_edit(key, TRIGGER_TYPE));
    }

    Ok(edits)
}

fn find_key<'a>(plan: &AutomationPlan, node: &'a Node, name: &str) -> Result<&'a Key, RewriteError> {
    node.get(name)
        .map(|entry| &entry.key)
        .ok_or_else(|| key_not_found(plan, name))
}

fn key_not_found(plan: &AutomationPlan, key: &str) -> RewriteError {
    RewriteError::KeyNotFound {
        automation: plan.name.clone(),
        key: key.to_string(),
    }
}

/// Replace a key's text, keeping its quoting style
fn rename_edit(key: &Key, to: &str) -> Edit {
    let text = match key.quote {
        Some(quote) => format!("{quote}{to}{quote}"),
        None => to.to_string(),
    };
    Edit::Replace {
        line: key.line,
        col: key.col,
        len: key.len,
        text,
    }
}
