//! Rename and translation tables shared by the transformation engine, the
//! serializers and the analyzer.
//!
//! Every table is an exhaustive `match` over a closed enum, so a new entry on
//! one side without its counterpart fails to compile.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::common::{BaseType, View};

/// Kind of change predicted for a migrated element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationAction {
    /// Element or attribute renamed, content kept.
    Rename,
    /// Value or structure rewritten.
    Transform,
    /// Content carried over but should be checked by a human.
    Validate,
}

impl MigrationAction {
    pub const ALL: [MigrationAction; 3] = [
        MigrationAction::Rename,
        MigrationAction::Transform,
        MigrationAction::Validate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationAction::Rename => "rename",
            MigrationAction::Transform => "transform",
            MigrationAction::Validate => "validate",
        }
    }

    /// Capitalized label for report headings.
    pub fn title(&self) -> &'static str {
        match self {
            MigrationAction::Rename => "Rename",
            MigrationAction::Transform => "Transform",
            MigrationAction::Validate => "Validate",
        }
    }
}

impl fmt::Display for MigrationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interaction kinds known to the 2.1 and 3.0 generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    Choice,
    TextEntry,
    ExtendedText,
    Match,
    Associate,
    Order,
    Hotspot,
    SelectPoint,
    GraphicAssociate,
    GraphicOrder,
    GraphicGapMatch,
    PositionObject,
    Slider,
    Drawing,
    GapMatch,
    InlineChoice,
    Hottext,
    Upload,
}

impl InteractionKind {
    pub const ALL: [InteractionKind; 18] = [
        InteractionKind::Choice,
        InteractionKind::TextEntry,
        InteractionKind::ExtendedText,
        InteractionKind::Match,
        InteractionKind::Associate,
        InteractionKind::Order,
        InteractionKind::Hotspot,
        InteractionKind::SelectPoint,
        InteractionKind::GraphicAssociate,
        InteractionKind::GraphicOrder,
        InteractionKind::GraphicGapMatch,
        InteractionKind::PositionObject,
        InteractionKind::Slider,
        InteractionKind::Drawing,
        InteractionKind::GapMatch,
        InteractionKind::InlineChoice,
        InteractionKind::Hottext,
        InteractionKind::Upload,
    ];

    /// Look up a 2.1 element name such as `choiceInteraction`.
    pub fn from_mid_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.mid_name() == name)
    }

    /// Look up either spelling.
    pub fn from_any_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.mid_name() == name || kind.new_name() == name)
    }

    pub fn mid_name(&self) -> &'static str {
        match self {
            InteractionKind::Choice => "choiceInteraction",
            InteractionKind::TextEntry => "textEntryInteraction",
            InteractionKind::ExtendedText => "extendedTextInteraction",
            InteractionKind::Match => "matchInteraction",
            InteractionKind::Associate => "associateInteraction",
            InteractionKind::Order => "orderInteraction",
            InteractionKind::Hotspot => "hotspotInteraction",
            InteractionKind::SelectPoint => "selectPointInteraction",
            InteractionKind::GraphicAssociate => "graphicAssociateInteraction",
            InteractionKind::GraphicOrder => "graphicOrderInteraction",
            InteractionKind::GraphicGapMatch => "graphicGapMatchInteraction",
            InteractionKind::PositionObject => "positionObjectInteraction",
            InteractionKind::Slider => "sliderInteraction",
            InteractionKind::Drawing => "drawingInteraction",
            InteractionKind::GapMatch => "gapMatchInteraction",
            InteractionKind::InlineChoice => "inlineChoiceInteraction",
            InteractionKind::Hottext => "hottextInteraction",
            InteractionKind::Upload => "uploadInteraction",
        }
    }

    pub fn new_name(&self) -> &'static str {
        match self {
            InteractionKind::Choice => "qti-choice-interaction",
            InteractionKind::TextEntry => "qti-text-entry-interaction",
            InteractionKind::ExtendedText => "qti-extended-text-interaction",
            InteractionKind::Match => "qti-match-interaction",
            InteractionKind::Associate => "qti-associate-interaction",
            InteractionKind::Order => "qti-order-interaction",
            InteractionKind::Hotspot => "qti-hotspot-interaction",
            InteractionKind::SelectPoint => "qti-select-point-interaction",
            InteractionKind::GraphicAssociate => "qti-graphic-associate-interaction",
            InteractionKind::GraphicOrder => "qti-graphic-order-interaction",
            InteractionKind::GraphicGapMatch => "qti-graphic-gap-match-interaction",
            InteractionKind::PositionObject => "qti-position-object-interaction",
            InteractionKind::Slider => "qti-slider-interaction",
            InteractionKind::Drawing => "qti-drawing-interaction",
            InteractionKind::GapMatch => "qti-gap-match-interaction",
            InteractionKind::InlineChoice => "qti-inline-choice-interaction",
            InteractionKind::Hottext => "qti-hottext-interaction",
            InteractionKind::Upload => "qti-upload-interaction",
        }
    }
}

/// Translate a metadata interaction-type hint; unknown hints pass through.
pub fn translate_interaction_type(hint: &str) -> String {
    match InteractionKind::from_mid_name(hint) {
        Some(kind) => kind.new_name().to_string(),
        None => hint.to_string(),
    }
}

/// Structural elements renamed between the 2.1 and 3.0 generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    AssessmentTest,
    AssessmentItem,
    ItemBody,
    Prompt,
    SimpleChoice,
    ResponseDeclaration,
    OutcomeDeclaration,
    TemplateDeclaration,
    CorrectResponse,
    DefaultValue,
    Value,
    Mapping,
    MapEntry,
    ItemFeedback,
    RubricBlock,
    Metadata,
    QtiMetadata,
}

impl ElementKind {
    pub fn mid_name(&self) -> &'static str {
        match self {
            ElementKind::AssessmentTest => "assessment",
            ElementKind::AssessmentItem => "item",
            ElementKind::ItemBody => "itemBody",
            ElementKind::Prompt => "prompt",
            ElementKind::SimpleChoice => "simpleChoice",
            ElementKind::ResponseDeclaration => "responseDeclaration",
            ElementKind::OutcomeDeclaration => "outcomeDeclaration",
            ElementKind::TemplateDeclaration => "templateDeclaration",
            ElementKind::CorrectResponse => "correctResponse",
            ElementKind::DefaultValue => "defaultValue",
            ElementKind::Value => "value",
            ElementKind::Mapping => "mapping",
            ElementKind::MapEntry => "mapEntry",
            ElementKind::ItemFeedback => "itemfeedback",
            ElementKind::RubricBlock => "rubricBlock",
            ElementKind::Metadata => "metadata",
            ElementKind::QtiMetadata => "qtimetadata",
        }
    }

    pub fn new_name(&self) -> &'static str {
        match self {
            ElementKind::AssessmentTest => "qti-assessment-test",
            ElementKind::AssessmentItem => "qti-assessment-item",
            ElementKind::ItemBody => "qti-item-body",
            ElementKind::Prompt => "qti-prompt",
            ElementKind::SimpleChoice => "qti-simple-choice",
            ElementKind::ResponseDeclaration => "qti-response-declaration",
            ElementKind::OutcomeDeclaration => "qti-outcome-declaration",
            ElementKind::TemplateDeclaration => "qti-template-declaration",
            ElementKind::CorrectResponse => "qti-correct-response",
            ElementKind::DefaultValue => "qti-default-value",
            ElementKind::Value => "qti-value",
            ElementKind::Mapping => "qti-mapping",
            ElementKind::MapEntry => "qti-map-entry",
            ElementKind::ItemFeedback => "qti-modal-feedback",
            ElementKind::RubricBlock => "qti-rubric-block",
            ElementKind::Metadata => "qti-metadata",
            ElementKind::QtiMetadata => "qti-metadata-container",
        }
    }
}

/// Base-type changes between 2.1 and 3.0.
pub fn translate_base_type(base_type: &BaseType) -> BaseType {
    match base_type {
        BaseType::Pair => BaseType::DirectedPair,
        BaseType::File => BaseType::Uri,
        BaseType::Identifier
        | BaseType::String
        | BaseType::Integer
        | BaseType::Float
        | BaseType::Boolean
        | BaseType::Point
        | BaseType::DirectedPair
        | BaseType::Duration
        | BaseType::Uri
        | BaseType::IntOrIdentifier
        | BaseType::Other(_) => base_type.clone(),
    }
}

/// Spelling of a rubric view in the 3.0 generation.
pub fn translate_view(view: &View) -> &str {
    match view {
        View::TestConstructor => "test-constructor",
        View::Author | View::Candidate | View::Proctor | View::Scorer | View::Tutor | View::Other(_) => {
            view.mid_name()
        }
    }
}

/// Best-effort cleanup of legacy HTML so it embeds as XML.
///
/// Bare `<br>`/`<hr>` become self-closing. When an `<img` is present and no
/// `/>` appears anywhere, every `>` is rewritten to `/>`.
pub fn normalize_legacy_markup(content: &str) -> String {
    let mut out = content.replace("<br>", "<br/>").replace("<hr>", "<hr/>");
    if !out.contains("/>") && out.contains("<img") {
        out = out.replace('>', "/>");
    }
    out
}

/// Rewrite inline markup into the 3.0 vocabulary.
pub fn rewrite_markup_for_qti30(content: &str) -> String {
    content
        .replace("class=", "data-qti-class=")
        .replace("<object", "<qti-object")
        .replace("</object>", "</qti-object>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_interaction_kind_round_trips() {
        for kind in InteractionKind::ALL {
            assert_eq!(InteractionKind::from_mid_name(kind.mid_name()), Some(kind));
            assert_eq!(InteractionKind::from_any_name(kind.new_name()), Some(kind));
            assert!(kind.new_name().starts_with("qti-"));
        }
    }

    #[test]
    fn test_translate_interaction_type() {
        assert_eq!(translate_interaction_type("choiceInteraction"), "qti-choice-interaction");
        assert_eq!(
            translate_interaction_type("graphicGapMatchInteraction"),
            "qti-graphic-gap-match-interaction"
        );
        assert_eq!(translate_interaction_type("mysteryInteraction"), "mysteryInteraction");
    }

    #[test]
    fn test_custom_interaction_is_not_renamed() {
        assert_eq!(InteractionKind::ALL.len(), 18);
        assert_eq!(InteractionKind::from_any_name("customInteraction"), None);
        assert_eq!(translate_interaction_type("customInteraction"), "customInteraction");
    }

    #[test]
    fn test_translate_base_type() {
        assert_eq!(translate_base_type(&BaseType::Pair), BaseType::DirectedPair);
        assert_eq!(translate_base_type(&BaseType::File), BaseType::Uri);
        assert_eq!(translate_base_type(&BaseType::Identifier), BaseType::Identifier);
        assert_eq!(translate_base_type(&BaseType::DirectedPair), BaseType::DirectedPair);
        let odd = BaseType::Other("matrix".into());
        assert_eq!(translate_base_type(&odd), odd);
    }

    #[test]
    fn test_translate_view() {
        assert_eq!(translate_view(&View::TestConstructor), "test-constructor");
        assert_eq!(translate_view(&View::Candidate), "candidate");
        assert_eq!(translate_view(&View::Other("parent".into())), "parent");
    }

    #[test]
    fn test_element_renames() {
        assert_eq!(ElementKind::ItemFeedback.new_name(), "qti-modal-feedback");
        assert_eq!(ElementKind::QtiMetadata.new_name(), "qti-metadata-container");
        assert_eq!(ElementKind::ResponseDeclaration.mid_name(), "responseDeclaration");
    }

    #[test]
    fn test_normalize_legacy_markup() {
        assert_eq!(normalize_legacy_markup("a<br>b<hr>"), "a<br/>b<hr/>");
        assert_eq!(
            normalize_legacy_markup(r#"<img src="x.png">"#),
            r#"<img src="x.png"/>"#
        );
        // a self-closing tag anywhere disables the img heuristic
        assert_eq!(
            normalize_legacy_markup(r#"<br><img src="x.png">"#),
            r#"<br/><img src="x.png">"#
        );
        assert_eq!(normalize_legacy_markup("plain"), "plain");
    }

    #[test]
    fn test_rewrite_markup_for_qti30() {
        assert_eq!(
            rewrite_markup_for_qti30(r#"<span class="x">a</span><object data="m.mp4"></object>"#),
            r#"<span data-qti-class="x">a</span><qti-object data="m.mp4"></qti-object>"#
        );
    }

    #[test]
    fn test_action_labels() {
        assert_eq!(MigrationAction::Transform.as_str(), "transform");
        assert_eq!(MigrationAction::Validate.title(), "Validate");
        assert_eq!(
            serde_json::to_string(&MigrationAction::Rename).unwrap(),
            "\"rename\""
        );
    }
}
