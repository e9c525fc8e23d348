//! Predicts what a migration will change before it runs.
//!
//! The analyzer only reads the canonical document. Verbosity is stamped on the
//! report by the caller and never changes which findings are recorded.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::analysis_report::{AnalysisError, AnalysisReport, AnalysisWarning, MigrationDetail};
use crate::error::MigrationError;
use crate::models::canonical::{
    BodyBlock, Document, Interaction, Item, LegacyRender, PresentationBlock,
};
use crate::models::common::{BaseType, Material, MaterialContent, RubricBlock, View};
use crate::schema_registry::SchemaRegistry;
use crate::schema_version::{SchemaFamily, SchemaVersion};
use crate::transformation_rule::{
    translate_base_type, translate_view, ElementKind, InteractionKind, MigrationAction,
};

static IMAGE_EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(png|jpe?g|gif|svg|bmp|webp)$").unwrap());

/// Compatibility analyzer for the supported migration paths
#[derive(Debug, Clone)]
pub struct Analyzer {
    paths: Vec<(SchemaFamily, SchemaFamily)>,
}

impl Analyzer {
    /// Analyzer for every adjacent pair of families.
    pub fn new() -> Self {
        Self {
            paths: SchemaFamily::ALL
                .iter()
                .filter_map(|family| family.successor().map(|next| (*family, next)))
                .collect(),
        }
    }

    /// Analyzer for the pairs that have a registered rule set.
    pub fn for_registry(registry: &SchemaRegistry) -> Self {
        Self {
            paths: registry.get_migration_paths(),
        }
    }

    pub fn supports(&self, from: SchemaFamily, to: SchemaFamily) -> bool {
        self.paths.contains(&(from, to))
    }

    /// Analyze `doc` for a migration from `from` to `to`.
    ///
    /// Unknown versions fail with `UnsupportedVersion`. A known pair without a
    /// rule set yields a report holding one fatal error.
    pub fn analyze(&self, doc: &Document, from: &str, to: &str) -> Result<AnalysisReport, MigrationError> {
        let source = SchemaFamily::resolve(from)?;
        let target = SchemaFamily::resolve(to)?;

        if doc.family != source {
            return Err(MigrationError::validation(format!(
                "document is QTI {} but analysis was requested from QTI {}",
                doc.family, source
            )));
        }

        let mut report = AnalysisReport::new(from.trim(), to.trim());
        let items = doc.all_items();
        report.total_items = items.len();

        if !self.supports(source, target) {
            report.add_error(
                AnalysisError::new(
                    "",
                    "document",
                    format!("No transformation rules available from QTI {} to QTI {}", source, target),
                )
                .fatal(),
            );
        } else {
            check_declared_release(&mut report, doc);
            match (source, target) {
                (SchemaFamily::Qti12, SchemaFamily::Qti21) => {
                    for item in &items {
                        analyze_item_12_to_21(&mut report, item);
                    }
                }
                (SchemaFamily::Qti21, SchemaFamily::Qti30) => {
                    analyze_document_21_to_30(&mut report, doc);
                    for item in &items {
                        analyze_item_21_to_30(&mut report, item);
                    }
                }
                _ => {}
            }
        }

        report.incompatible_items = items
            .iter()
            .filter(|item| report.findings_for(&item.identifier) > 0)
            .count();
        report.compatible_items = report.total_items - report.incompatible_items;

        debug!(
            items = report.total_items,
            warnings = report.warnings.len(),
            errors = report.errors.len(),
            details = report.migration_details.len(),
            "analysis finished"
        );
        Ok(report)
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Warn when the document names a release its family never published.
fn check_declared_release(report: &mut AnalysisReport, doc: &Document) {
    if doc.family.is_known_release(&doc.version) {
        return;
    }

    let latest = doc
        .family
        .releases()
        .iter()
        .filter_map(|release| release.parse::<SchemaVersion>().ok())
        .max();
    let warning = match (doc.version.parse::<SchemaVersion>(), latest) {
        (Ok(declared), Some(latest)) if declared > latest => AnalysisWarning::new(
            "",
            "document/@version",
            format!("Document declares QTI {}, newer than the latest known release {}", declared, latest),
        )
        .with_suggestion(format!("Check the document against the QTI {} schema", latest)),
        _ => AnalysisWarning::new(
            "",
            "document/@version",
            format!("Document declares unrecognized QTI release {:?}", doc.version),
        )
        .with_suggestion(format!("Treated as QTI {}", doc.family)),
    };
    report.add_warning(warning);
}

fn item_path(item: &Item) -> String {
    format!("item[@ident='{}']", item.identifier)
}

/// MIME type guessed from an image file extension.
pub fn infer_image_type(uri: &str) -> Option<&'static str> {
    let caps = IMAGE_EXTENSION.captures(uri)?;
    let ext = caps.get(1)?.as_str().to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        _ => "image/webp",
    };
    Some(mime)
}

// ---------------------------------------------------------------------------
// QTI 1.2 -> 2.1

fn analyze_item_12_to_21(report: &mut AnalysisReport, item: &Item) {
    let id = item.identifier.as_str();
    let base = item_path(item);

    if let Some(presentation) = &item.presentation {
        let presentation_path = format!("{}/presentation", base);
        for block in &presentation.blocks {
            match block {
                PresentationBlock::Material(material) => {
                    check_material(report, id, &format!("{}/material", presentation_path), material)
                }
                PresentationBlock::Response(response) => {
                    let response_path = format!(
                        "{}/{}[@ident='{}']",
                        presentation_path,
                        response.kind.element_name(),
                        response.identifier
                    );
                    match &response.render {
                        Some(LegacyRender::Choice(choice)) => {
                            let render_path = format!("{}/render_choice", response_path);
                            if choice.shuffle {
                                report.add_detail(
                                    MigrationDetail::new(
                                        id,
                                        format!("{}/@shuffle", render_path),
                                        MigrationAction::Transform,
                                        "Normalize shuffle flag to boolean",
                                    )
                                    .with_values("yes", "true"),
                                );
                            }
                            for label in &choice.labels {
                                if let Some(material) = &label.material {
                                    let label_path = format!(
                                        "{}/response_label[@ident='{}']/material",
                                        render_path, label.identifier
                                    );
                                    check_material(report, id, &label_path, material);
                                }
                            }
                        }
                        Some(LegacyRender::FillInBlank(fib)) if fib.rows > 1 => {
                            report.add_detail(
                                MigrationDetail::new(
                                    id,
                                    format!("{}/render_fib", response_path),
                                    MigrationAction::Transform,
                                    "Multi-row fill-in-blank becomes an extended text interaction",
                                )
                                .with_values("render_fib", InteractionKind::ExtendedText.mid_name()),
                            );
                        }
                        Some(LegacyRender::FillInBlank(_)) => {}
                        None => report.add_warning(
                            AnalysisWarning::new(
                                id,
                                response_path.as_str(),
                                format!(
                                    "Response '{}' has no render element; no interaction will be created",
                                    response.identifier
                                ),
                            )
                            .with_suggestion("Add a render_choice or render_fib to the response"),
                        ),
                    }
                }
            }
        }
    }

    if let Some(rp) = &item.response_processing {
        let rp_path = format!("{}/resprocessing", base);
        if rp.score_model.is_none() {
            report.add_warning(
                AnalysisWarning::new(id, rp_path.as_str(), "No score model specified")
                    .with_suggestion("Default scoring will be assumed"),
            );
        }
        if rp.score_variables.is_empty() {
            report.add_warning(
                AnalysisWarning::new(
                    id,
                    format!("{}/outcomes", rp_path),
                    "No score variables declared",
                )
                .with_suggestion("A default SCORE outcome (float, 0.0) will be created"),
            );
        }
        for (index, condition) in rp.conditions.iter().enumerate() {
            let condition_path = format!("{}/respcondition[{}]", rp_path, index + 1);
            if let Some(flag) = condition.continue_after {
                let old = if flag { "yes" } else { "no" };
                report.add_detail(
                    MigrationDetail::new(
                        id,
                        format!("{}/@continue", condition_path),
                        MigrationAction::Transform,
                        "Normalize continue flag to boolean",
                    )
                    .with_values(old, flag.to_string()),
                );
            }
            if condition.expressions.iter().any(|e| e.has_nested_equality()) {
                report.add_warning(
                    AnalysisWarning::new(
                        id,
                        format!("{}/conditionvar", condition_path),
                        "Equality tests nested in and/or/not are not used for correct responses",
                    )
                    .with_suggestion("Review the correct response of the migrated item"),
                );
            }
        }
    }

    for feedback in &item.feedback {
        let path = format!("{}/itemfeedback[@ident='{}']", base, feedback.identifier);
        for material in &feedback.materials {
            check_material(report, id, &format!("{}/material", path), material);
        }
    }

    if let Some(hint) = item.interaction_type_hint() {
        if InteractionKind::from_any_name(hint).is_none() {
            report.add_warning(
                AnalysisWarning::new(
                    id,
                    format!("{}/qtimetadata/interactiontype", base),
                    format!("Unknown interaction type '{}'", hint),
                )
                .with_suggestion("Review the interaction type after migration"),
            );
        }
    }
}

fn check_material(report: &mut AnalysisReport, id: &str, path: &str, material: &Material) {
    for content in &material.content {
        match content {
            MaterialContent::Text(text) if text.is_html() => report.add_detail(MigrationDetail::new(
                id,
                format!("{}/mattext", path),
                MigrationAction::Validate,
                "HTML text is embedded as markup; verify it is well-formed",
            )),
            MaterialContent::Text(_) => {}
            MaterialContent::Image(image) if image.image_type.is_none() => {
                let inferred = infer_image_type(&image.uri).unwrap_or("unknown");
                report.add_warning(
                    AnalysisWarning::new(
                        id,
                        format!("{}/matimage", path),
                        format!("Image '{}' has no type; inferred {}", image.uri, inferred),
                    )
                    .with_suggestion("Set imagtype on the image"),
                );
            }
            MaterialContent::Image(_) => {}
            MaterialContent::Audio(media) | MaterialContent::Video(media) => {
                let kind = if matches!(content, MaterialContent::Audio(_)) {
                    "mataudio"
                } else {
                    "matvideo"
                };
                report.add_warning(
                    AnalysisWarning::new(
                        id,
                        format!("{}/{}", path, kind),
                        format!("Media '{}' has no item body equivalent and will be dropped", media.uri),
                    )
                    .with_suggestion("Re-attach the media with an object element after migration"),
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// QTI 2.1 -> 3.0

fn rename(report: &mut AnalysisReport, id: &str, path: String, kind: ElementKind) {
    report.add_detail(
        MigrationDetail::new(
            id,
            path,
            MigrationAction::Rename,
            format!("Rename {} to {}", kind.mid_name(), kind.new_name()),
        )
        .with_values(kind.mid_name(), kind.new_name()),
    );
}

fn analyze_document_21_to_30(report: &mut AnalysisReport, doc: &Document) {
    let Some(assessment) = &doc.assessment else {
        return;
    };
    let id = assessment.identifier.as_str();
    let path = format!("assessment[@ident='{}']", assessment.identifier);

    report.add_detail(
        MigrationDetail::new(
            id,
            "questestinterop",
            MigrationAction::Rename,
            "Document root becomes qti-assessment-test",
        )
        .with_values("questestinterop", ElementKind::AssessmentTest.new_name()),
    );
    report.add_warning(
        AnalysisWarning::new(
            id,
            path.as_str(),
            "Assessment and section elements keep their QTI 2.1 names and layout",
        )
        .with_suggestion("Review the assessment structure against the QTI 3.0 schema"),
    );
    if let Some(rubric) = &assessment.rubric {
        check_rubric(report, id, &path, rubric);
    }
}

fn analyze_item_21_to_30(report: &mut AnalysisReport, item: &Item) {
    let id = item.identifier.as_str();
    let base = item_path(item);

    rename(report, id, base.clone(), ElementKind::AssessmentItem);

    let mut markup: Vec<&str> = Vec::new();

    if let Some(body) = &item.item_body {
        let body_path = format!("{}/itemBody", base);
        rename(report, id, body_path.clone(), ElementKind::ItemBody);
        for block in &body.blocks {
            match block {
                BodyBlock::Paragraph(content) => markup.push(content),
                BodyBlock::Div { content, .. } => markup.push(content),
                BodyBlock::Interaction(interaction) => {
                    let kind = interaction.kind();
                    let path = format!(
                        "{}/{}[@responseIdentifier='{}']",
                        body_path,
                        kind.mid_name(),
                        interaction.response_identifier()
                    );
                    report.add_detail(
                        MigrationDetail::new(
                            id,
                            path.as_str(),
                            MigrationAction::Rename,
                            format!("Rename {} to {}", kind.mid_name(), kind.new_name()),
                        )
                        .with_values(kind.mid_name(), kind.new_name()),
                    );
                    match interaction {
                        Interaction::Choice(choice) => {
                            if !choice.choices.is_empty() {
                                rename(report, id, format!("{}/simpleChoice", path), ElementKind::SimpleChoice);
                            }
                            markup.extend(choice.prompt.as_deref());
                            markup.extend(choice.choices.iter().map(|c| c.content.as_str()));
                        }
                        Interaction::ExtendedText(ext) => markup.extend(ext.prompt.as_deref()),
                        Interaction::TextEntry(_) => {}
                    }
                }
            }
        }
    }

    let declarations = item
        .response_declarations
        .iter()
        .map(|d| (ElementKind::ResponseDeclaration, d.identifier.as_str(), d.base_type.as_ref()))
        .chain(
            item.outcome_declarations
                .iter()
                .map(|d| (ElementKind::OutcomeDeclaration, d.identifier.as_str(), d.base_type.as_ref())),
        )
        .chain(
            item.template_declarations
                .iter()
                .map(|d| (ElementKind::TemplateDeclaration, d.identifier.as_str(), d.base_type.as_ref())),
        );
    for (kind, identifier, base_type) in declarations {
        let path = format!("{}/{}[@identifier='{}']", base, kind.mid_name(), identifier);
        rename(report, id, path.clone(), kind);
        if let Some(base_type) = base_type {
            check_base_type(report, id, &path, base_type);
        }
    }

    for feedback in &item.feedback {
        let path = format!("{}/itemfeedback[@ident='{}']", base, feedback.identifier);
        rename(report, id, path, ElementKind::ItemFeedback);
        markup.extend(feedback.markup.as_deref());
        markup.extend(
            feedback
                .materials
                .iter()
                .flat_map(|m| m.texts())
                .filter(|t| t.is_html())
                .map(|t| t.content.as_str()),
        );
    }

    if let Some(meta) = &item.metadata {
        if let Some(qti) = &meta.qti_metadata {
            let qti_path = format!("{}/metadata/qtimetadata", base);
            rename(report, id, qti_path.clone(), ElementKind::QtiMetadata);
            if let Some(hint) = qti.interaction_type.as_deref() {
                check_interaction_hint(report, id, &qti_path, hint);
            }
        }
    }

    if let Some(rubric) = &item.rubric {
        markup.push(&rubric.content);
        check_rubric(report, id, &base, rubric);
    }

    check_markup(report, id, &base, &markup);

    if item.presentation.is_some() || item.response_processing.is_some() {
        report.add_warning(
            AnalysisWarning::new(
                id,
                base.as_str(),
                "Legacy QTI 1.2 presentation or response processing will be dropped",
            )
            .with_suggestion("Move the content into the item body before migrating"),
        );
    }
}

fn check_base_type(report: &mut AnalysisReport, id: &str, path: &str, base_type: &BaseType) {
    let translated = translate_base_type(base_type);
    if &translated != base_type {
        report.add_detail(
            MigrationDetail::new(
                id,
                format!("{}/@baseType", path),
                MigrationAction::Transform,
                format!("Base type {} becomes {}", base_type, translated),
            )
            .with_values(base_type.as_str(), translated.as_str()),
        );
    }
}

fn check_interaction_hint(report: &mut AnalysisReport, id: &str, path: &str, hint: &str) {
    let hint_path = format!("{}/interactiontype", path);
    match InteractionKind::from_any_name(hint) {
        Some(kind) if kind.mid_name() == hint => report.add_detail(
            MigrationDetail::new(
                id,
                hint_path,
                MigrationAction::Transform,
                "Translate interaction type",
            )
            .with_values(hint, kind.new_name()),
        ),
        Some(_) => {}
        None => report.add_warning(
            AnalysisWarning::new(id, hint_path, format!("Unknown interaction type '{}'", hint))
                .with_suggestion("The value will be copied unchanged; review it after migration"),
        ),
    }
}

fn check_rubric(report: &mut AnalysisReport, id: &str, parent: &str, rubric: &RubricBlock) {
    let path = format!("{}/rubricBlock", parent);
    rename(report, id, path.clone(), ElementKind::RubricBlock);
    if let Some(view @ View::TestConstructor) = &rubric.view {
        report.add_detail(
            MigrationDetail::new(
                id,
                format!("{}/@view", path),
                MigrationAction::Transform,
                "Translate rubric view",
            )
            .with_values(view.mid_name(), translate_view(view)),
        );
    }
}

fn check_markup(report: &mut AnalysisReport, id: &str, base: &str, markup: &[&str]) {
    if markup.iter().any(|m| m.contains("class=")) {
        report.add_warning(
            AnalysisWarning::new(id, base, "class attributes are rewritten to data-qti-class")
                .with_suggestion("Update stylesheets that select on class"),
        );
        report.add_detail(
            MigrationDetail::new(id, base, MigrationAction::Transform, "Rewrite class attributes")
                .with_values("class=", "data-qti-class="),
        );
    }
    if markup.iter().any(|m| m.contains("<object")) {
        report.add_detail(
            MigrationDetail::new(id, base, MigrationAction::Transform, "Rewrite object elements")
                .with_values("object", "qti-object"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonicalizer::{Canonicalizer, Qti12Canonicalizer, Qti21Canonicalizer};
    use crate::error::ErrorKind;

    const ITEM_12: &str = r#"<questestinterop>
  <item ident="Q1" title="Mixed">
    <presentation>
      <material>
        <mattext texttype="text/html"><![CDATA[Look<br>]]></mattext>
        <matimage uri="chart.PNG"/>
        <mataudio uri="clip.mp3"/>
      </material>
      <response_lid ident="RESP">
        <render_choice shuffle="yes">
          <response_label ident="A"><material><mattext>A</mattext></material></response_label>
        </render_choice>
      </response_lid>
      <response_str ident="ESSAY"><render_fib rows="5"/></response_str>
    </presentation>
    <resprocessing>
      <respcondition continue="no">
        <conditionvar><or><varequal respident="RESP">A</varequal></or></conditionvar>
        <setvar action="Set">1</setvar>
      </respcondition>
    </resprocessing>
  </item>
  <item ident="Q2" title="Plain">
    <presentation><material><mattext>Just text</mattext></material></presentation>
  </item>
</questestinterop>"#;

    const ITEM_21: &str = r#"<questestinterop version="2.1">
  <item ident="Q1" title="Modern">
    <itemBody>
      <p>Pick <span class="lead">one</span></p>
      <choiceInteraction responseIdentifier="RESP" shuffle="false" maxChoices="1">
        <simpleChoice identifier="A">A</simpleChoice>
      </choiceInteraction>
    </itemBody>
    <responseDeclaration identifier="RESP" cardinality="single" baseType="pair"/>
    <outcomeDeclaration identifier="SCORE" cardinality="single" baseType="float"/>
  </item>
</questestinterop>"#;

    #[test]
    fn test_qti12_findings() {
        let doc = Qti12Canonicalizer.canonicalize_xml(ITEM_12).unwrap();
        let report = Analyzer::new().analyze(&doc, "1.2", "2.1").unwrap();

        assert_eq!(report.total_items, 2);
        assert_eq!(report.incompatible_items, 1);
        assert_eq!(report.compatible_items, 1);
        assert!(!report.has_errors());

        let messages: Vec<&str> = report.warnings.iter().map(|w| w.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.contains("inferred image/png")));
        assert!(messages.iter().any(|m| m.contains("clip.mp3")));
        assert!(messages.iter().any(|m| m.contains("No score model")));
        assert!(messages.iter().any(|m| m.contains("No score variables")));
        assert!(messages.iter().any(|m| m.contains("nested in and/or/not")));

        let shuffle = report
            .migration_details
            .iter()
            .find(|d| d.element_path.ends_with("@shuffle"))
            .unwrap();
        assert_eq!(shuffle.new_value, "true");
        assert!(report
            .migration_details
            .iter()
            .any(|d| d.element_path.ends_with("@continue") && d.new_value == "false"));
        assert!(report
            .migration_details
            .iter()
            .any(|d| d.new_value == "extendedTextInteraction"));
        assert_eq!(report.details_with_action(MigrationAction::Validate).count(), 1);
    }

    #[test]
    fn test_qti21_findings() {
        let doc = Qti21Canonicalizer.canonicalize_xml(ITEM_21).unwrap();
        let report = Analyzer::new().analyze(&doc, "2.1", "3.0").unwrap();

        assert_eq!(report.total_items, 1);
        assert!(report
            .migration_details
            .iter()
            .any(|d| d.old_value == "choiceInteraction" && d.new_value == "qti-choice-interaction"));
        assert!(report
            .migration_details
            .iter()
            .any(|d| d.old_value == "pair" && d.new_value == "directedPair"));
        assert!(report
            .migration_details
            .iter()
            .any(|d| d.new_value == "qti-outcome-declaration"));
        assert!(report.warnings.iter().any(|w| w.message.contains("data-qti-class")));
        assert_eq!(report.incompatible_items, 1);
    }

    #[test]
    fn test_unpublished_release_warns() {
        let newer = r#"<questestinterop version="2.2.9"><item ident="Q1" title="T"/></questestinterop>"#;
        let doc = Qti21Canonicalizer.canonicalize_xml(newer).unwrap();
        let report = Analyzer::new().analyze(&doc, "2.2", "3.0").unwrap();
        let warning = report
            .warnings
            .iter()
            .find(|w| w.element_path == "document/@version")
            .unwrap();
        assert!(warning.message.contains("newer than the latest known release 2.2.4"));
        assert_eq!(warning.item_id, "");

        let odd = r#"<questestinterop version="2.1beta"><item ident="Q1" title="T"/></questestinterop>"#;
        let doc = Qti21Canonicalizer.canonicalize_xml(odd).unwrap();
        let report = Analyzer::new().analyze(&doc, "2.1", "3.0").unwrap();
        assert!(report.warnings.iter().any(|w| w.message.contains("unrecognized QTI release")));

        let doc = Qti21Canonicalizer.canonicalize_xml(ITEM_21).unwrap();
        let report = Analyzer::new().analyze(&doc, "2.1", "3.0").unwrap();
        assert!(!report.warnings.iter().any(|w| w.element_path == "document/@version"));
    }

    #[test]
    fn test_unsupported_pair_is_fatal() {
        let doc = Qti12Canonicalizer.canonicalize_xml(ITEM_12).unwrap();
        let report = Analyzer::new().analyze(&doc, "1.2", "3.0").unwrap();
        assert!(report.has_fatal_errors());
        assert_eq!(report.errors.len(), 1);
        assert!(report.migration_details.is_empty());
    }

    #[test]
    fn test_unknown_version_fails() {
        let doc = Qti12Canonicalizer.canonicalize_xml(ITEM_12).unwrap();
        let err = Analyzer::new().analyze(&doc, "1.2", "9.9").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn test_family_mismatch_fails() {
        let doc = Qti12Canonicalizer.canonicalize_xml(ITEM_12).unwrap();
        let err = Analyzer::new().analyze(&doc, "2.1", "3.0").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_analysis_does_not_touch_document() {
        let doc = Qti12Canonicalizer.canonicalize_xml(ITEM_12).unwrap();
        let before = doc.clone();
        let first = Analyzer::new().analyze(&doc, "1.2", "2.1").unwrap();
        let second = Analyzer::new().analyze(&doc, "1.2", "2.1").unwrap();
        assert_eq!(doc, before);
        assert_eq!(first, second);
    }

    #[test]
    fn test_registry_paths() {
        let analyzer = Analyzer::for_registry(&SchemaRegistry::new());
        assert!(!analyzer.supports(SchemaFamily::Qti12, SchemaFamily::Qti21));
        let analyzer = Analyzer::new();
        assert!(analyzer.supports(SchemaFamily::Qti21, SchemaFamily::Qti30));
        assert!(!analyzer.supports(SchemaFamily::Qti12, SchemaFamily::Qti30));
    }

    #[test]
    fn test_infer_image_type() {
        assert_eq!(infer_image_type("a/b.JPG"), Some("image/jpeg"));
        assert_eq!(infer_image_type("x.svg"), Some("image/svg+xml"));
        assert_eq!(infer_image_type("x.webp"), Some("image/webp"));
        assert_eq!(infer_image_type("x.tiff"), None);
    }
}
