//! QTI 2.1/2.2 document model.
//!
//! Items are hybrid: they may still carry the legacy 1.2 presentation and
//! response processing next to the 2.x item body and declarations.

use super::common::{Metadata, Objective, RubricBlock};
use super::qti12::{ItemFeedback, Presentation, ResProcessing};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document21 {
    pub version: Option<String>,
    pub items: Vec<Item21>,
    pub assessment: Option<Assessment21>,
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assessment21 {
    pub ident: String,
    pub title: String,
    pub sections: Vec<Section21>,
    pub metadata: Option<Metadata>,
    pub objectives: Vec<Objective>,
    pub rubric: Option<RubricBlock>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section21 {
    pub ident: String,
    pub title: String,
    pub items: Vec<Item21>,
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Item21 {
    pub ident: String,
    pub title: String,
    pub max_attempts: u32,
    pub adaptive: Option<String>,
    pub time_dependent: Option<String>,
    pub metadata: Option<Metadata>,
    pub presentation: Option<Presentation>,
    pub resprocessing: Option<ResProcessing>,
    pub item_body: Option<ItemBody21>,
    pub response_declarations: Vec<ResponseDeclaration21>,
    pub outcome_declarations: Vec<OutcomeDeclaration21>,
    pub template_declarations: Vec<TemplateDeclaration21>,
    pub feedback: Vec<ItemFeedback>,
    pub rubric: Option<RubricBlock>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemBody21 {
    pub blocks: Vec<BodyBlock21>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BodyBlock21 {
    /// Inner markup of a `p`.
    Paragraph(String),
    Div { class: Option<String>, content: String },
    Choice(ChoiceInteraction21),
    TextEntry(TextEntryInteraction21),
    ExtendedText(ExtendedTextInteraction21),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChoiceInteraction21 {
    pub response_identifier: String,
    pub shuffle: bool,
    pub max_choices: u32,
    pub min_choices: u32,
    pub prompt: Option<String>,
    pub choices: Vec<SimpleChoice21>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimpleChoice21 {
    pub identifier: String,
    pub fixed: bool,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextEntryInteraction21 {
    pub response_identifier: String,
    pub expected_length: u32,
    pub pattern_mask: Option<String>,
    pub placeholder_text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtendedTextInteraction21 {
    pub response_identifier: String,
    pub min_strings: u32,
    pub max_strings: u32,
    pub expected_lines: u32,
    pub expected_length: u32,
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseDeclaration21 {
    pub identifier: String,
    pub cardinality: String,
    pub base_type: Option<String>,
    pub correct_response: Vec<String>,
    pub mapping: Option<Mapping21>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping21 {
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
    pub default_value: f64,
    pub entries: Vec<MapEntry21>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapEntry21 {
    pub map_key: String,
    pub mapped_value: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutcomeDeclaration21 {
    pub identifier: String,
    pub cardinality: String,
    pub base_type: Option<String>,
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateDeclaration21 {
    pub identifier: String,
    pub cardinality: String,
    pub base_type: Option<String>,
    pub param_variable: bool,
    pub math_variable: bool,
    pub default_value: Option<String>,
}
