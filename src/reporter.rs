use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{
    analysis_report::{AnalysisReport, MigrationDetail},
    transformation_rule::MigrationAction,
};

const RULE: &str = "================================================================================";

/// Reporter for rendering analysis reports in various formats
pub struct AnalysisReporter {
    output_format: ReportFormat,
}

/// Available output formats for analysis reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReportFormat::Text => "text",
            ReportFormat::Json => "json",
            ReportFormat::Yaml => "yaml",
        };
        f.write_str(name)
    }
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            "yaml" | "yml" => Ok(ReportFormat::Yaml),
            other => Err(ReportError::FormatError(format!(
                "unknown report format '{}' (expected text, json or yaml)",
                other
            ))),
        }
    }
}

impl AnalysisReporter {
    pub fn new() -> Self {
        Self {
            output_format: ReportFormat::Text,
        }
    }

    pub fn with_format(mut self, format: ReportFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn format(&self) -> ReportFormat {
        self.output_format
    }

    /// Format the report according to the configured output format
    pub fn format_report(&self, report: &AnalysisReport) -> Result<String, ReportError> {
        match self.output_format {
            ReportFormat::Text => Ok(self.format_text_report(report)),
            ReportFormat::Json => self.format_json_report(report),
            ReportFormat::Yaml => self.format_yaml_report(report),
        }
    }

    /// Human-readable report. The report's verbosity controls how much is shown.
    fn format_text_report(&self, report: &AnalysisReport) -> String {
        let verbosity = report.verbosity;
        let mut output = String::new();

        output.push_str(&format!(
            "\n{rule}\n{title:^80}\n{rule}\nMigration Path: QTI {} → QTI {}\n{rule}\n\n",
            report.source_version,
            report.target_version,
            rule = RULE,
            title = "QTI Migration Analysis Report",
        ));

        let status = if report.has_fatal_errors() { "BLOCKED" } else { "READY" };
        output.push_str("SUMMARY\n-------\n");
        output.push_str(&format!("Status: {}\n", status));
        output.push_str(&format!("Total Items: {}\n", report.total_items));
        output.push_str(&format!("Compatible Items: {}\n", report.compatible_items));
        output.push_str(&format!("Items Requiring Attention: {}\n", report.incompatible_items));
        output.push_str(&format!("Errors: {}\n", report.errors.len()));
        output.push_str(&format!("Warnings: {}\n\n", report.warnings.len()));

        if report.has_errors() {
            output.push_str("ERRORS (Migration Blockers)\n--------------------------\n");
            for (i, error) in report.errors.iter().enumerate() {
                output.push_str(&numbered(i, &error.item_id, &error.message));
                if verbosity >= 2 && !error.element_path.is_empty() {
                    output.push_str(&format!("   Path: {}\n", error.element_path));
                }
                if error.fatal {
                    output.push_str("   ⚠️  This error must be resolved before migration can proceed.\n");
                }
                output.push('\n');
            }
        }

        if report.has_warnings() && verbosity >= 1 {
            output.push_str("WARNINGS\n--------\n");
            for (i, warning) in report.warnings.iter().enumerate() {
                output.push_str(&numbered(i, &warning.item_id, &warning.message));
                if verbosity >= 2 && !warning.element_path.is_empty() {
                    output.push_str(&format!("   Path: {}\n", warning.element_path));
                }
                if let Some(suggestion) = &warning.suggestion {
                    output.push_str(&format!("   → {}\n", suggestion));
                }
                output.push('\n');
            }
        }

        if !report.migration_details.is_empty() && verbosity >= 2 {
            output.push_str("MIGRATION DETAILS\n-----------------\n");
            for action in MigrationAction::ALL {
                let details: Vec<&MigrationDetail> = report.details_with_action(action).collect();
                if details.is_empty() {
                    continue;
                }
                output.push_str(&format!("\n{} Actions ({}):\n", action.title(), details.len()));
                output.push_str(&"-".repeat(action.as_str().len() + 15));
                output.push('\n');
                for (i, detail) in details.iter().enumerate() {
                    output.push_str(&numbered(i, &detail.item_id, &detail.description));
                    if verbosity >= 3 {
                        output.push_str(&format!("   Path: {}\n", detail.element_path));
                        if !detail.old_value.is_empty() {
                            output.push_str(&format!("   Old: {}\n", truncate_value(&detail.old_value)));
                        }
                        if !detail.new_value.is_empty() {
                            output.push_str(&format!("   New: {}\n", truncate_value(&detail.new_value)));
                        }
                    }
                    output.push('\n');
                }
            }
        }

        output.push('\n');
        output.push_str(RULE);
        output.push('\n');
        if report.has_fatal_errors() {
            output.push_str("⚠️  MIGRATION BLOCKED: Please resolve the errors listed above before proceeding.\n");
        } else if report.has_warnings() {
            output.push_str("✓ Migration can proceed. Please review warnings for potential issues.\n");
        } else {
            output.push_str("✓ Migration can proceed without issues.\n");
        }
        if verbosity < 3 && (report.has_warnings() || !report.migration_details.is_empty()) {
            output.push_str("\nTip: Use -v 2 or -v 3 for more detailed information.\n");
        }
        output.push_str(RULE);
        output.push('\n');

        output
    }

    /// Format report as JSON
    fn format_json_report(&self, report: &AnalysisReport) -> Result<String, ReportError> {
        serde_json::to_string_pretty(report).map_err(|e| ReportError::SerializationError(e.to_string()))
    }

    /// Format report as YAML
    fn format_yaml_report(&self, report: &AnalysisReport) -> Result<String, ReportError> {
        serde_yaml::to_string(report).map_err(|e| ReportError::SerializationError(e.to_string()))
    }
}

impl Default for AnalysisReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn numbered(index: usize, item_id: &str, message: &str) -> String {
    if item_id.is_empty() {
        format!("{}. {}\n", index + 1, message)
    } else {
        format!("{}. [Item: {}] {}\n", index + 1, item_id, message)
    }
}

/// Values longer than 50 characters are cut to 47 plus an ellipsis.
fn truncate_value(value: &str) -> String {
    if value.chars().count() > 50 {
        let head: String = value.chars().take(47).collect();
        format!("{}...", head)
    } else {
        value.to_string()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Format error: {0}")]
    FormatError(String),
}
