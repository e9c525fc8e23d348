//! Version-agnostic document model handed from the canonicalizers to the
//! analyzer and the transformation engine.
//!
//! Every generation maps into this superset. Legacy (1.2) and 2.x item
//! structures may coexist on one [`Item`]. Values are normalized: flags are
//! `bool`, numeric bounds that the source wrote as `0` or omitted are `None`,
//! and enumerations use the closed types from [`super::common`].

use super::common::{BaseType, Cardinality, Material, Metadata, Objective, RubricBlock};
use super::qti12::ResponseKind;
use crate::schema_version::SchemaFamily;
use crate::transformation_rule::InteractionKind;

pub use super::qti12::{ConditionExpression, SetVar, VarTest};

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub version: String,
    pub family: SchemaFamily,
    pub assessment: Option<Assessment>,
    pub items: Vec<Item>,
    pub metadata: Option<Metadata>,
}

impl Document {
    pub fn new(family: SchemaFamily) -> Self {
        Self {
            version: family.canonical_version().to_string(),
            family,
            assessment: None,
            items: Vec::new(),
            metadata: None,
        }
    }

    /// Top-level items followed by the items of each assessment section.
    pub fn all_items(&self) -> Vec<&Item> {
        let mut items: Vec<&Item> = self.items.iter().collect();
        if let Some(assessment) = &self.assessment {
            items.extend(assessment.sections.iter().flat_map(|s| s.items.iter()));
        }
        items
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assessment {
    pub identifier: String,
    pub title: String,
    pub sections: Vec<Section>,
    pub metadata: Option<Metadata>,
    pub objectives: Vec<Objective>,
    pub rubric: Option<RubricBlock>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    pub identifier: String,
    pub title: String,
    pub items: Vec<Item>,
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Item {
    pub identifier: String,
    pub title: String,
    pub max_attempts: Option<u32>,
    pub adaptive: Option<bool>,
    pub time_dependent: Option<bool>,
    pub metadata: Option<Metadata>,
    pub presentation: Option<Presentation>,
    pub response_processing: Option<ResponseProcessing>,
    pub item_body: Option<ItemBody>,
    pub response_declarations: Vec<ResponseDeclaration>,
    pub outcome_declarations: Vec<OutcomeDeclaration>,
    pub template_declarations: Vec<TemplateDeclaration>,
    pub feedback: Vec<Feedback>,
    pub rubric: Option<RubricBlock>,
}

impl Item {
    pub fn interaction_type_hint(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.qti_metadata.as_ref())
            .and_then(|q| q.interaction_type.as_deref())
    }
}

/// Legacy presentation with nested flows flattened into one ordered list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Presentation {
    pub label: Option<String>,
    pub blocks: Vec<PresentationBlock>,
}

impl Presentation {
    pub fn materials(&self) -> impl Iterator<Item = &Material> {
        self.blocks.iter().filter_map(|b| match b {
            PresentationBlock::Material(material) => Some(material),
            PresentationBlock::Response(_) => None,
        })
    }

    pub fn responses(&self) -> impl Iterator<Item = &LegacyResponse> {
        self.blocks.iter().filter_map(|b| match b {
            PresentationBlock::Response(response) => Some(response),
            PresentationBlock::Material(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PresentationBlock {
    Material(Material),
    Response(LegacyResponse),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyResponse {
    pub kind: ResponseKind,
    pub identifier: String,
    pub cardinality: Option<Cardinality>,
    pub render: Option<LegacyRender>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LegacyRender {
    Choice(ChoiceRender),
    FillInBlank(FibRender),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChoiceRender {
    pub shuffle: bool,
    pub min_number: u32,
    pub max_number: u32,
    pub labels: Vec<ChoiceLabel>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChoiceLabel {
    pub identifier: String,
    pub material: Option<Material>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FibRender {
    pub fib_type: Option<String>,
    pub rows: u32,
    pub max_chars: u32,
    pub prompt: Option<String>,
    pub columns: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseProcessing {
    pub score_model: Option<String>,
    pub score_variables: Vec<ScoreVariable>,
    pub conditions: Vec<ResponseCondition>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreVariable {
    pub name: String,
    pub var_type: Option<String>,
    pub default_value: Option<String>,
    pub min_value: Option<String>,
    pub max_value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseCondition {
    pub title: Option<String>,
    /// `continue="yes"|"no"`; other spellings read as unset.
    pub continue_after: Option<bool>,
    pub expressions: Vec<ConditionExpression>,
    pub set_vars: Vec<SetVar>,
    pub feedback_refs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemBody {
    pub blocks: Vec<BodyBlock>,
}

impl ItemBody {
    pub fn interactions(&self) -> impl Iterator<Item = &Interaction> {
        self.blocks.iter().filter_map(|b| match b {
            BodyBlock::Interaction(interaction) => Some(interaction),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BodyBlock {
    /// Inner markup of a paragraph.
    Paragraph(String),
    Div { class: Option<String>, content: String },
    Interaction(Interaction),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    Choice(ChoiceInteraction),
    TextEntry(TextEntryInteraction),
    ExtendedText(ExtendedTextInteraction),
}

impl Interaction {
    pub fn response_identifier(&self) -> &str {
        match self {
            Interaction::Choice(i) => &i.response_identifier,
            Interaction::TextEntry(i) => &i.response_identifier,
            Interaction::ExtendedText(i) => &i.response_identifier,
        }
    }

    pub fn kind(&self) -> InteractionKind {
        match self {
            Interaction::Choice(_) => InteractionKind::Choice,
            Interaction::TextEntry(_) => InteractionKind::TextEntry,
            Interaction::ExtendedText(_) => InteractionKind::ExtendedText,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChoiceInteraction {
    pub response_identifier: String,
    pub shuffle: bool,
    pub max_choices: Option<u32>,
    pub min_choices: Option<u32>,
    pub prompt: Option<String>,
    pub choices: Vec<SimpleChoice>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimpleChoice {
    pub identifier: String,
    pub fixed: bool,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextEntryInteraction {
    pub response_identifier: String,
    pub expected_length: Option<u32>,
    pub pattern_mask: Option<String>,
    pub placeholder_text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtendedTextInteraction {
    pub response_identifier: String,
    pub min_strings: Option<u32>,
    pub max_strings: Option<u32>,
    pub expected_lines: Option<u32>,
    pub expected_length: Option<u32>,
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseDeclaration {
    pub identifier: String,
    pub cardinality: Cardinality,
    pub base_type: Option<BaseType>,
    pub correct_response: Vec<String>,
    pub mapping: Option<Mapping>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping {
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
    pub default_value: f64,
    pub entries: Vec<MapEntry>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapEntry {
    pub key: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeDeclaration {
    pub identifier: String,
    pub cardinality: Cardinality,
    pub base_type: Option<BaseType>,
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDeclaration {
    pub identifier: String,
    pub cardinality: Cardinality,
    pub base_type: Option<BaseType>,
    pub param_variable: bool,
    pub math_variable: bool,
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feedback {
    pub identifier: String,
    pub title: Option<String>,
    /// Legacy material blocks (`material` first, then each `flow_mat`).
    pub materials: Vec<Material>,
    /// Markup body, for feedback that was already written as markup.
    pub markup: Option<String>,
    pub outcome_identifier: Option<String>,
    pub show_hide: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_items_includes_sections() {
        let mut doc = Document::new(SchemaFamily::Qti12);
        doc.items.push(Item {
            identifier: "top".into(),
            ..Default::default()
        });
        doc.assessment = Some(Assessment {
            sections: vec![Section {
                items: vec![Item {
                    identifier: "nested".into(),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        });
        let ids: Vec<&str> = doc.all_items().iter().map(|i| i.identifier.as_str()).collect();
        assert_eq!(ids, vec!["top", "nested"]);
        assert_eq!(doc.version, "1.2");
    }

    #[test]
    fn test_interaction_accessors() {
        let interaction = Interaction::TextEntry(TextEntryInteraction {
            response_identifier: "R1".into(),
            ..Default::default()
        });
        assert_eq!(interaction.response_identifier(), "R1");
        assert_eq!(interaction.kind(), InteractionKind::TextEntry);
    }
}
