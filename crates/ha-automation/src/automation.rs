//! Automation schema migration
//!
//! Home Assistant 2024.10 renamed the top-level keys of an automation:
//!
//! ```text
//! trigger   → triggers
//! condition → conditions
//! action    → actions
//! ```
//!
//! and the `platform` key of every trigger to `trigger`. An
//! [`AutomationPlan`] records which of these renames one automation needs;
//! it is computed from the parsed mapping and can then be applied either to
//! that mapping or, through the outline, to the source text.

use serde_yaml::{Mapping, Value};
use std::fmt;
use tracing::{debug, warn};

/// Legacy top-level keys and their current names
pub const KEY_RENAMES: [KeyRename; 3] = [
    KeyRename {
        from: "trigger",
        to: "triggers",
    },
    KeyRename {
        from: "condition",
        to: "conditions",
    },
    KeyRename {
        from: "action",
        to: "actions",
    },
];

/// Legacy trigger type key
pub const LEGACY_TRIGGER_TYPE: &str = "platform";

/// Current trigger type key
pub const TRIGGER_TYPE: &str = "trigger";

/// Keys whose presence marks a mapping as an automation
const AUTOMATION_KEYS: [&str; 7] = [
    "trigger",
    "triggers",
    "condition",
    "conditions",
    "action",
    "actions",
    "alias",
];

/// Name shown for automations without alias or id
pub const UNNAMED_AUTOMATION: &str = "Unnamed automation";

/// A key rename
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRename {
    pub from: &'static str,
    pub to: &'static str,
}

/// A change made to one automation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// A top-level key was renamed
    Renamed { from: &'static str, to: &'static str },
    /// `platform` became `trigger` in this many triggers
    TriggerPlatform { count: usize },
    /// A single legacy trigger mapping was wrapped into a list
    WrappedTrigger,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::Renamed { from, to } => write!(f, "{} → {}", from, to),
            Change::TriggerPlatform { count } => write!(
                f,
                "{} → {} ({} trigger{})",
                LEGACY_TRIGGER_TYPE,
                TRIGGER_TYPE,
                count,
                if *count == 1 { "" } else { "s" }
            ),
            Change::WrappedTrigger => write!(f, "single trigger wrapped in a list"),
        }
    }
}

/// A rename that was skipped because both spellings are present
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    /// The automation has both the legacy and the current key
    Keys {
        legacy: &'static str,
        current: &'static str,
    },
    /// A trigger has both `platform` and `trigger`
    TriggerItem { index: usize },
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conflict::Keys { legacy, current } => write!(
                f,
                "both '{}' and '{}' are present, left unchanged",
                legacy, current
            ),
            Conflict::TriggerItem { index } => write!(
                f,
                "trigger #{} has both '{}' and '{}', left unchanged",
                index + 1,
                LEGACY_TRIGGER_TYPE,
                TRIGGER_TYPE
            ),
        }
    }
}

/// Whether a mapping looks like an automation
///
/// Script steps, conditions and trigger definitions use the same singular
/// keys with a plain value (`action: light.turn_on`, `condition: state`),
/// so a legacy key holding a scalar rules the mapping out unless it also
/// has a trigger block.
pub fn is_automation(mapping: &Mapping) -> bool {
    let has_triggers = [KEY_RENAMES[0].from, KEY_RENAMES[0].to]
        .iter()
        .any(|key| mapping.get(*key).is_some_and(is_block_value));
    if has_triggers {
        return true;
    }

    let is_step = KEY_RENAMES
        .iter()
        .any(|rename| mapping.get(rename.from).is_some_and(|value| !is_block_value(value)));
    !is_step && AUTOMATION_KEYS.iter().any(|key| mapping.contains_key(*key))
}

/// A list, a mapping, nothing, or a tagged reference such as `!input`
fn is_block_value(value: &Value) -> bool {
    matches!(
        value,
        Value::Sequence(_) | Value::Mapping(_) | Value::Null | Value::Tagged(_)
    )
}

/// Human-readable name of an automation: alias, then id
pub fn display_name(automation: &Mapping) -> String {
    ["alias", "id"]
        .iter()
        .filter_map(|key| automation.get(*key))
        .find_map(scalar_text)
        .unwrap_or_else(|| UNNAMED_AUTOMATION.to_string())
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// The renames one automation needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutomationPlan {
    /// Display name
    pub name: String,
    /// Top-level key renames, in `KEY_RENAMES` order
    pub renames: Vec<KeyRename>,
    /// Key (as currently spelled) holding the triggers
    pub trigger_key: Option<&'static str>,
    /// Wrap a single legacy trigger mapping into a list
    pub wrap_trigger: bool,
    /// Indexes of the triggers whose `platform` becomes `trigger`
    pub platform_items: Vec<usize>,
    /// Renames skipped because both spellings exist
    pub conflicts: Vec<Conflict>,
}

impl AutomationPlan {
    /// Work out the renames for an automation mapping
    pub fn for_automation(automation: &Mapping) -> Self {
        let name = display_name(automation);
        let mut renames = Vec::new();
        let mut conflicts = Vec::new();

        for rename in KEY_RENAMES {
            match (
                automation.contains_key(rename.from),
                automation.contains_key(rename.to),
            ) {
                (true, false) => renames.push(rename),
                (true, true) => conflicts.push(Conflict::Keys {
                    legacy: rename.from,
                    current: rename.to,
                }),
                _ => {}
            }
        }

        let trigger_key = if renames.iter().any(|r| r.from == KEY_RENAMES[0].from) {
            Some(KEY_RENAMES[0].from)
        } else if automation.contains_key(KEY_RENAMES[0].to) {
            Some(KEY_RENAMES[0].to)
        } else {
            None
        };

        let triggers = trigger_key.and_then(|key| automation.get(key));
        let wrap_trigger =
            trigger_key == Some(KEY_RENAMES[0].from) && matches!(triggers, Some(Value::Mapping(_)));

        let items: Vec<&Value> = match triggers {
            Some(Value::Sequence(items)) => items.iter().collect(),
            Some(single) if wrap_trigger => vec![single],
            _ => Vec::new(),
        };

        let mut platform_items = Vec::new();
        for (index, item) in items.into_iter().enumerate() {
            let Value::Mapping(trigger) = item else {
                continue;
            };
            if !trigger.contains_key(LEGACY_TRIGGER_TYPE) {
                continue;
            }
            if trigger.contains_key(TRIGGER_TYPE) {
                conflicts.push(Conflict::TriggerItem { index });
            } else {
                platform_items.push(index);
            }
        }

        for conflict in &conflicts {
            warn!("Automation '{}': {}", name, conflict);
        }

        Self {
            name,
            renames,
            trigger_key,
            wrap_trigger,
            platform_items,
            conflicts,
        }
    }

    /// Whether applying the plan changes anything
    pub fn is_noop(&self) -> bool {
        self.renames.is_empty() && !self.wrap_trigger && self.platform_items.is_empty()
    }

    /// The changes this plan makes, for reporting
    pub fn changes(&self) -> Vec<Change> {
        let mut changes: Vec<Change> = self
            .renames
            .iter()
            .map(|r| Change::Renamed {
                from: r.from,
                to: r.to,
            })
            .collect();
        if self.wrap_trigger {
            changes.push(Change::WrappedTrigger);
        }
        if !self.platform_items.is_empty() {
            changes.push(Change::TriggerPlatform {
                count: self.platform_items.len(),
            });
        }
        changes
    }

    /// Apply the plan to the automation mapping it was computed from
    pub fn apply(&self, automation: &mut Mapping) {
        if let Some(triggers) = self.trigger_key.and_then(|key| automation.get_mut(key)) {
            if self.wrap_trigger {
                let single = std::mem::replace(triggers, Value::Null);
                *triggers = Value::Sequence(vec![single]);
            }
            if let Value::Sequence(items) = triggers {
                for &index in &self.platform_items {
                    if let Some(Value::Mapping(trigger)) = items.get_mut(index) {
                        rename_key(trigger, LEGACY_TRIGGER_TYPE, TRIGGER_TYPE);
                    }
                }
            }
        }

        for rename in &self.renames {
            rename_key(automation, rename.from, rename.to);
        }

        debug!(
            "Applied {} changes to automation '{}'",
            self.changes().len(),
            self.name
        );
    }
}

/// Rename a key in place, keeping its position
fn rename_key(mapping: &mut Mapping, from: &str, to: &str) {
    let entries = std::mem::take(mapping);
    for (key, value) in entries {
        let key = match key.as_str() {
            Some(name) if name == from => Value::String(to.to_string()),
            _ => key,
        };
        mapping.insert(key, value);
    }
}
