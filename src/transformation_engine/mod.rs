use tracing::{debug, info, warn};

use crate::{
    analysis_report::AnalysisReport,
    analyzer::Analyzer,
    error::MigrationError,
    models::{canonical::Document, common::Metadata, qti21::Document21, qti30::Document30},
    schema_registry::SchemaRegistry,
    schema_version::SchemaFamily,
    transformation_rule::translate_interaction_type,
    xml::{self, writer, Element},
};

pub mod qti12_to_21;
pub mod qti21_to_30;

type Result<T> = std::result::Result<T, MigrationError>;

/// Main transformation engine that orchestrates parsing, analysis and migration
pub struct SchemaTransformationEngine {
    registry: SchemaRegistry,
    analyzer: Analyzer,
}

/// Migrated document in the target family's model
#[derive(Debug, Clone, PartialEq)]
pub enum TargetDocument {
    Qti21(Document21),
    Qti30(Document30),
}

impl TargetDocument {
    pub fn family(&self) -> SchemaFamily {
        match self {
            TargetDocument::Qti21(_) => SchemaFamily::Qti21,
            TargetDocument::Qti30(_) => SchemaFamily::Qti30,
        }
    }

    pub fn to_element(&self) -> Element {
        match self {
            TargetDocument::Qti21(doc) => writer::write_qti21(doc),
            TargetDocument::Qti30(doc) => writer::write_qti30(doc),
        }
    }

    /// Serialize with the XML declaration and two-space indentation
    pub fn to_xml(&self) -> Result<String> {
        xml::write_document(&self.to_element())
    }
}

/// Parameters of one end-to-end run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationRequest {
    pub from: String,
    pub to: String,
    /// Analyze only; never produce output.
    pub preview: bool,
    pub verbosity: u8,
}

impl MigrationRequest {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            preview: false,
            verbosity: 1,
        }
    }

    pub fn with_preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }
}

/// Result of a run: always a report, output only when migration went ahead
#[derive(Debug, Clone)]
pub struct TransformationResult {
    pub report: AnalysisReport,
    pub output: Option<String>,
}

impl TransformationResult {
    pub fn is_blocked(&self) -> bool {
        self.report.has_fatal_errors()
    }
}

impl SchemaTransformationEngine {
    pub fn new(registry: SchemaRegistry) -> Self {
        let analyzer = Analyzer::for_registry(&registry);
        Self { registry, analyzer }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Parse and canonicalize a document read as version `from`
    pub fn load(&self, xml: &str, from: &str) -> Result<Document> {
        let family = SchemaFamily::resolve(from)?;
        let canonicalizer = self.registry.get_canonicalizer(family)?;
        canonicalizer.canonicalize_xml(xml)
    }

    pub fn analyze(&self, doc: &Document, from: &str, to: &str) -> Result<AnalysisReport> {
        self.analyzer.analyze(doc, from, to)
    }

    /// Apply the rule set for an adjacent pair. Callers consult the analyzer first.
    pub fn migrate(&self, doc: &Document, from: &str, to: &str) -> Result<TargetDocument> {
        let source = SchemaFamily::resolve(from)?;
        let target = SchemaFamily::resolve(to)?;

        if doc.family != source {
            return Err(MigrationError::validation(format!(
                "document is QTI {} but migration was requested from QTI {}",
                doc.family, source
            )));
        }

        let rules = self.registry.get_rules(source, target)?;
        debug!(from = %source, to = %target, "applying transformation rules");
        rules.migrate(doc)
    }

    /// Parse, analyze and, unless previewing or blocked, migrate and serialize.
    pub fn run(&self, xml: &str, request: &MigrationRequest) -> Result<TransformationResult> {
        info!(from = %request.from, to = %request.to, preview = request.preview, "starting migration");

        let doc = self.load(xml, &request.from)?;
        let report = self
            .analyze(&doc, &request.from, &request.to)?
            .with_verbosity(request.verbosity);

        if report.has_fatal_errors() {
            warn!(errors = report.errors.len(), "migration blocked by analysis errors");
            return Ok(TransformationResult { report, output: None });
        }
        if request.preview {
            info!("preview requested; skipping migration");
            return Ok(TransformationResult { report, output: None });
        }

        let target = self.migrate(&doc, &request.from, &request.to)?;
        let output = target.to_xml()?;
        info!(
            items = report.total_items,
            warnings = report.warnings.len(),
            "migration completed"
        );
        Ok(TransformationResult {
            report,
            output: Some(output),
        })
    }
}

impl Default for SchemaTransformationEngine {
    fn default() -> Self {
        Self::new(SchemaRegistry::with_defaults())
    }
}

/// Point metadata at the target family. QTI 3.0 also renames the interaction hint.
pub(crate) fn retarget_metadata(meta: &Metadata, family: SchemaFamily) -> Metadata {
    let mut out = meta.clone();
    if out.schema_version.is_some() {
        out.schema_version = Some(family.canonical_version().to_string());
    }
    if family == SchemaFamily::Qti30 {
        if let Some(qti) = out.qti_metadata.as_mut() {
            qti.interaction_type = qti.interaction_type.as_deref().map(translate_interaction_type);
        }
    }
    out
}
