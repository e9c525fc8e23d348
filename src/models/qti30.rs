//! QTI 3.0 document model.

use super::common::{Metadata, Objective, RubricBlock};

pub const QTI30_NAMESPACE: &str = "http://www.imsglobal.org/xsd/imsqtiasi_v3p0";

#[derive(Debug, Clone, PartialEq)]
pub enum Document30 {
    /// A lone `qti-assessment-item` root.
    Item(Item30),
    /// Several items and/or an assessment under one root.
    Package(Package30),
}

impl Document30 {
    pub fn items(&self) -> Vec<&Item30> {
        match self {
            Document30::Item(item) => vec![item],
            Document30::Package(package) => {
                let mut items: Vec<&Item30> = package.items.iter().collect();
                if let Some(assessment) = &package.assessment {
                    items.extend(assessment.sections.iter().flat_map(|s| s.items.iter()));
                }
                items
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Package30 {
    pub version: String,
    pub items: Vec<Item30>,
    pub assessment: Option<Assessment30>,
    pub metadata: Option<Metadata>,
}

/// Assessment container. Still laid out with the 2.1 `assessment`/`section` names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assessment30 {
    pub ident: String,
    pub title: String,
    pub sections: Vec<Section30>,
    pub metadata: Option<Metadata>,
    pub objectives: Vec<Objective>,
    pub rubric: Option<RubricBlock>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section30 {
    pub ident: String,
    pub title: String,
    pub items: Vec<Item30>,
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Item30 {
    pub identifier: String,
    pub title: String,
    pub adaptive: bool,
    pub time_dependent: bool,
    pub metadata: Option<Metadata>,
    pub response_declarations: Vec<ResponseDeclaration30>,
    pub outcome_declarations: Vec<OutcomeDeclaration30>,
    pub template_declarations: Vec<TemplateDeclaration30>,
    pub item_body: Option<ItemBody30>,
    pub modal_feedback: Vec<ModalFeedback30>,
    pub rubric: Option<RubricBlock>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemBody30 {
    pub blocks: Vec<BodyBlock30>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BodyBlock30 {
    Paragraph(String),
    Div { class: Option<String>, content: String },
    Choice(ChoiceInteraction30),
    TextEntry(TextEntryInteraction30),
    ExtendedText(ExtendedTextInteraction30),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChoiceInteraction30 {
    pub response_identifier: String,
    pub shuffle: bool,
    pub max_choices: Option<u32>,
    pub min_choices: Option<u32>,
    pub prompt: Option<String>,
    pub choices: Vec<SimpleChoice30>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimpleChoice30 {
    pub identifier: String,
    pub fixed: bool,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextEntryInteraction30 {
    pub response_identifier: String,
    pub expected_length: Option<u32>,
    pub pattern_mask: Option<String>,
    pub placeholder_text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtendedTextInteraction30 {
    pub response_identifier: String,
    pub min_strings: Option<u32>,
    pub max_strings: Option<u32>,
    pub expected_lines: Option<u32>,
    pub expected_length: Option<u32>,
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseDeclaration30 {
    pub identifier: String,
    pub cardinality: String,
    pub base_type: Option<String>,
    pub correct_response: Vec<String>,
    pub mapping: Option<Mapping30>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping30 {
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
    pub default_value: f64,
    pub entries: Vec<MapEntry30>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapEntry30 {
    pub map_key: String,
    pub mapped_value: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutcomeDeclaration30 {
    pub identifier: String,
    pub cardinality: String,
    pub base_type: Option<String>,
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateDeclaration30 {
    pub identifier: String,
    pub cardinality: String,
    pub base_type: Option<String>,
    pub param_variable: bool,
    pub math_variable: bool,
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModalFeedback30 {
    pub identifier: String,
    pub title: Option<String>,
    pub outcome_identifier: Option<String>,
    pub show_hide: Option<String>,
    /// Inner markup.
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_walks_package_and_sections() {
        let item = |id: &str| Item30 {
            identifier: id.into(),
            ..Default::default()
        };
        let doc = Document30::Package(Package30 {
            version: "3.0".into(),
            items: vec![item("A")],
            assessment: Some(Assessment30 {
                sections: vec![Section30 {
                    items: vec![item("B"), item("C")],
                    ..Default::default()
                }],
                ..Default::default()
            }),
            metadata: None,
        });
        let ids: Vec<&str> = doc.items().iter().map(|i| i.identifier.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);

        let single = Document30::Item(item("Z"));
        assert_eq!(single.items().len(), 1);
    }
}
