//! Conversion reports

use crate::automation::{AutomationPlan, Change, Conflict};
use std::ops::AddAssign;

/// What happened to one automation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// At least one key was renamed
    Converted(Vec<Change>),
    /// Nothing to do
    UpToDate,
}

/// Report line for one automation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutomationReport {
    pub name: String,
    pub outcome: Outcome,
    pub conflicts: Vec<Conflict>,
}

impl AutomationReport {
    pub fn from_plan(plan: &AutomationPlan) -> Self {
        let outcome = if plan.is_noop() {
            Outcome::UpToDate
        } else {
            Outcome::Converted(plan.changes())
        };
        Self {
            name: plan.name.clone(),
            outcome,
            conflicts: plan.conflicts.clone(),
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(self.outcome, Outcome::Converted(_))
    }

    /// The changes joined for display, e.g. `trigger → triggers, action → actions`
    pub fn summary(&self) -> String {
        match &self.outcome {
            Outcome::Converted(changes) => changes
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            Outcome::UpToDate => "already up to date".to_string(),
        }
    }
}

/// Automation counts, summed across files in directory mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub converted: usize,
    pub up_to_date: usize,
    pub total: usize,
}

impl AddAssign for Stats {
    fn add_assign(&mut self, other: Self) {
        self.converted += other.converted;
        self.up_to_date += other.up_to_date;
        self.total += other.total;
    }
}

/// Per-automation results of converting one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionReport {
    automations: Vec<AutomationReport>,
    /// The comment-preserving rewrite was abandoned for plain serialization
    fell_back: bool,
}

impl ConversionReport {
    pub fn new(automations: Vec<AutomationReport>) -> Self {
        Self {
            automations,
            fell_back: false,
        }
    }

    pub(crate) fn mark_fallback(&mut self) {
        self.fell_back = true;
    }

    pub fn automations(&self) -> &[AutomationReport] {
        &self.automations
    }

    pub fn converted(&self) -> impl Iterator<Item = &AutomationReport> {
        self.automations.iter().filter(|a| a.is_converted())
    }

    pub fn up_to_date(&self) -> impl Iterator<Item = &AutomationReport> {
        self.automations.iter().filter(|a| !a.is_converted())
    }

    /// Whether any automation changed
    pub fn has_changes(&self) -> bool {
        self.automations.iter().any(AutomationReport::is_converted)
    }

    /// Whether comments and formatting were lost
    pub fn fell_back(&self) -> bool {
        self.fell_back
    }

    pub fn stats(&self) -> Stats {
        let converted = self.converted().count();
        Stats {
            converted,
            up_to_date: self.automations.len() - converted,
            total: self.automations.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Mapping;

    fn report_for(yaml: &str) -> AutomationReport {
        let mapping: Mapping = serde_yaml::from_str(yaml).unwrap();
        AutomationReport::from_plan(&AutomationPlan::for_automation(&mapping))
    }

    #[test]
    fn test_summary() {
        let converted = report_for("alias: A\ntrigger: []\naction: []\n");
        assert_eq!(converted.name, "A");
        assert_eq!(converted.summary(), "trigger → triggers, action → actions");

        let current = report_for("alias: B\ntriggers: []\n");
        assert_eq!(current.outcome, Outcome::UpToDate);
        assert_eq!(current.summary(), "already up to date");
    }

    #[test]
    fn test_stats() {
        let report = ConversionReport::new(vec![
            report_for("alias: A\ntrigger: []\n"),
            report_for("alias: B\ntriggers: []\n"),
            report_for("alias: C\ncondition: []\n"),
        ]);
        assert!(report.has_changes());
        assert_eq!(
            report.stats(),
            Stats {
                converted: 2,
                up_to_date: 1,
                total: 3
            }
        );

        let mut total = Stats::default();
        total += report.stats();
        total += report.stats();
        assert_eq!(total.total, 6);
        assert_eq!(total.converted, 4);
    }

    #[test]
    fn test_empty_report() {
        let report = ConversionReport::default();
        assert!(!report.has_changes());
        assert_eq!(report.stats(), Stats::default());
    }
}
