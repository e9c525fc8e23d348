use serde::{Deserialize, Serialize};

use crate::transformation_rule::MigrationAction;

/// Compatibility report produced by the analyzer for one migration path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub source_version: String,
    pub target_version: String,
    pub total_items: usize,
    pub compatible_items: usize,
    /// Items with at least one warning or error.
    pub incompatible_items: usize,
    pub warnings: Vec<AnalysisWarning>,
    pub errors: Vec<AnalysisError>,
    pub migration_details: Vec<MigrationDetail>,
    /// Display level for the reporter. Never affects which findings are recorded.
    pub verbosity: u8,
}

impl AnalysisReport {
    pub fn new(source_version: impl Into<String>, target_version: impl Into<String>) -> Self {
        Self {
            source_version: source_version.into(),
            target_version: target_version.into(),
            total_items: 0,
            compatible_items: 0,
            incompatible_items: 0,
            warnings: Vec::new(),
            errors: Vec::new(),
            migration_details: Vec::new(),
            verbosity: 1,
        }
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn add_error(&mut self, error: AnalysisError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: AnalysisWarning) {
        self.warnings.push(warning);
    }

    pub fn add_detail(&mut self, detail: MigrationDetail) {
        self.migration_details.push(detail);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// True only when an error marked fatal is present.
    pub fn has_fatal_errors(&self) -> bool {
        self.errors.iter().any(|e| e.fatal)
    }

    /// Findings (warnings or errors) recorded against `item_id`.
    pub fn findings_for(&self, item_id: &str) -> usize {
        let warnings = self.warnings.iter().filter(|w| w.item_id == item_id).count();
        let errors = self.errors.iter().filter(|e| e.item_id == item_id).count();
        warnings + errors
    }

    pub fn details_with_action(&self, action: MigrationAction) -> impl Iterator<Item = &MigrationDetail> {
        self.migration_details.iter().filter(move |d| d.action == action)
    }
}

/// Non-blocking issue; migration proceeds but may lose or approximate content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisWarning {
    pub item_id: String,
    pub element_path: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl AnalysisWarning {
    pub fn new(item_id: impl Into<String>, element_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            element_path: element_path.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Problem found during analysis; fatal errors block migration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisError {
    pub item_id: String,
    pub element_path: String,
    pub message: String,
    pub fatal: bool,
}

impl AnalysisError {
    pub fn new(item_id: impl Into<String>, element_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            element_path: element_path.into(),
            message: message.into(),
            fatal: false,
        }
    }

    pub fn fatal(mut self) -> Self {
        self.fatal = true;
        self
    }
}

/// One change the migration will make
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationDetail {
    pub item_id: String,
    pub element_path: String,
    pub old_value: String,
    pub new_value: String,
    pub action: MigrationAction,
    pub description: String,
}

impl MigrationDetail {
    pub fn new(
        item_id: impl Into<String>,
        element_path: impl Into<String>,
        action: MigrationAction,
        description: impl Into<String>,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            element_path: element_path.into(),
            old_value: String::new(),
            new_value: String::new(),
            action,
            description: description.into(),
        }
    }

    pub fn with_values(mut self, old_value: impl Into<String>, new_value: impl Into<String>) -> Self {
        self.old_value = old_value.into();
        self.new_value = new_value.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_report_creation() {
        let report = AnalysisReport::new("1.2", "2.1");
        assert_eq!(report.source_version, "1.2");
        assert_eq!(report.verbosity, 1);
        assert!(!report.has_errors());
        assert!(!report.has_warnings());
        assert!(!report.has_fatal_errors());
    }

    #[test]
    fn test_non_fatal_error_does_not_block() {
        let mut report = AnalysisReport::new("1.2", "2.1");
        report.add_error(AnalysisError::new("Q1", "item", "odd structure"));
        assert!(report.has_errors());
        assert!(!report.has_fatal_errors());

        report.add_error(AnalysisError::new("Q2", "item", "unreadable").fatal());
        assert!(report.has_fatal_errors());
    }

    #[test]
    fn test_findings_for_counts_both_kinds() {
        let mut report = AnalysisReport::new("2.1", "3.0");
        report.add_warning(AnalysisWarning::new("Q1", "a", "w").with_suggestion("fix it"));
        report.add_error(AnalysisError::new("Q1", "b", "e"));
        report.add_warning(AnalysisWarning::new("Q2", "c", "w"));
        assert_eq!(report.findings_for("Q1"), 2);
        assert_eq!(report.findings_for("Q2"), 1);
        assert_eq!(report.findings_for("Q3"), 0);
        assert_eq!(report.warnings[0].suggestion.as_deref(), Some("fix it"));
    }

    #[test]
    fn test_details_with_action() {
        let mut report = AnalysisReport::new("2.1", "3.0");
        report.add_detail(
            MigrationDetail::new("Q1", "item", MigrationAction::Rename, "rename item")
                .with_values("item", "qti-assessment-item"),
        );
        report.add_detail(MigrationDetail::new("Q1", "x", MigrationAction::Validate, "check"));
        assert_eq!(report.details_with_action(MigrationAction::Rename).count(), 1);
        assert_eq!(report.details_with_action(MigrationAction::Transform).count(), 0);
    }

    #[test]
    fn test_report_serializes_action_lowercase() {
        let mut report = AnalysisReport::new("2.1", "3.0");
        report.add_detail(MigrationDetail::new("Q1", "p", MigrationAction::Transform, "d"));
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains(r#""action":"transform""#));
    }
}
