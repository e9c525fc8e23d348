// QTI schema migration: 1.2 -> 2.1 -> 3.0
pub mod analysis_report;
pub mod analyzer;
pub mod canonicalizer;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod reporter;
pub mod schema_registry;
pub mod schema_version;
pub mod transformation_engine;
pub mod transformation_rule;
pub mod xml;

// Re-export core types for convenience
pub use analysis_report::{AnalysisError, AnalysisReport, AnalysisWarning, MigrationDetail};
pub use analyzer::Analyzer;
pub use canonicalizer::Canonicalizer;
pub use config::Config;
pub use error::{ErrorKind, MigrationError};
pub use reporter::{AnalysisReporter, ReportFormat};
pub use schema_registry::{MigrationRules, SchemaRegistry};
pub use schema_version::{SchemaFamily, SchemaVersion};
pub use transformation_engine::{
    MigrationRequest, SchemaTransformationEngine, TargetDocument, TransformationResult,
};
pub use transformation_rule::MigrationAction;
