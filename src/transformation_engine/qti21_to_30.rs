//! Rules migrating canonical QTI 2.1 documents to the QTI 3.0 model.

use quick_xml::escape::escape;
use tracing::{debug, info};

use super::{retarget_metadata, TargetDocument};
use crate::error::MigrationError;
use crate::models::canonical::{
    Assessment, BodyBlock, Document, Feedback, Interaction, Item, Mapping,
};
use crate::models::common::{BaseType, MaterialContent, RubricBlock};
use crate::models::qti30::{
    Assessment30, BodyBlock30, ChoiceInteraction30, Document30, ExtendedTextInteraction30,
    Item30, ItemBody30, MapEntry30, Mapping30, ModalFeedback30, OutcomeDeclaration30, Package30,
    ResponseDeclaration30, Section30, SimpleChoice30, TemplateDeclaration30,
    TextEntryInteraction30,
};
use crate::schema_registry::MigrationRules;
use crate::schema_version::SchemaFamily;
use crate::transformation_rule::{rewrite_markup_for_qti30, translate_base_type};

#[derive(Debug, Default, Clone, Copy)]
pub struct Qti21To30Rules;

impl MigrationRules for Qti21To30Rules {
    fn source(&self) -> SchemaFamily {
        SchemaFamily::Qti21
    }

    fn target(&self) -> SchemaFamily {
        SchemaFamily::Qti30
    }

    fn migrate(&self, doc: &Document) -> Result<TargetDocument, MigrationError> {
        Ok(TargetDocument::Qti30(migrate_document(doc)))
    }
}

/// Build the 3.0 document for a canonical 2.1 document.
///
/// A lone item without an assessment becomes a bare `qti-assessment-item`;
/// anything else is wrapped in a package.
pub fn migrate_document(doc: &Document) -> Document30 {
    info!(items = doc.all_items().len(), "migrating QTI 2.1 document to QTI 3.0");

    if doc.assessment.is_none() && doc.items.len() == 1 {
        if let Some(item) = doc.items.first() {
            return Document30::Item(migrate_item(item));
        }
    }

    Document30::Package(Package30 {
        version: SchemaFamily::Qti30.canonical_version().to_string(),
        items: doc.items.iter().map(migrate_item).collect(),
        assessment: doc.assessment.as_ref().map(migrate_assessment),
        metadata: doc
            .metadata
            .as_ref()
            .map(|m| retarget_metadata(m, SchemaFamily::Qti30)),
    })
}

fn migrate_assessment(assessment: &Assessment) -> Assessment30 {
    Assessment30 {
        ident: assessment.identifier.clone(),
        title: assessment.title.clone(),
        sections: assessment
            .sections
            .iter()
            .map(|s| Section30 {
                ident: s.identifier.clone(),
                title: s.title.clone(),
                items: s.items.iter().map(migrate_item).collect(),
                metadata: s
                    .metadata
                    .as_ref()
                    .map(|m| retarget_metadata(m, SchemaFamily::Qti30)),
            })
            .collect(),
        metadata: assessment
            .metadata
            .as_ref()
            .map(|m| retarget_metadata(m, SchemaFamily::Qti30)),
        objectives: assessment.objectives.clone(),
        rubric: assessment.rubric.as_ref().map(migrate_rubric),
    }
}

pub fn migrate_item(item: &Item) -> Item30 {
    if item.presentation.is_some() || item.response_processing.is_some() {
        debug!(item = %item.identifier, "dropping legacy presentation and response processing");
    }

    Item30 {
        identifier: item.identifier.clone(),
        title: item.title.clone(),
        adaptive: item.adaptive.unwrap_or(false),
        time_dependent: item.time_dependent.unwrap_or(false),
        metadata: item
            .metadata
            .as_ref()
            .map(|m| retarget_metadata(m, SchemaFamily::Qti30)),
        response_declarations: item
            .response_declarations
            .iter()
            .map(|d| ResponseDeclaration30 {
                identifier: d.identifier.clone(),
                cardinality: d.cardinality.as_str().to_string(),
                base_type: translated(d.base_type.as_ref()),
                correct_response: d.correct_response.clone(),
                mapping: d.mapping.as_ref().map(migrate_mapping),
            })
            .collect(),
        outcome_declarations: item
            .outcome_declarations
            .iter()
            .map(|d| OutcomeDeclaration30 {
                identifier: d.identifier.clone(),
                cardinality: d.cardinality.as_str().to_string(),
                base_type: translated(d.base_type.as_ref()),
                default_value: d.default_value.clone(),
            })
            .collect(),
        template_declarations: item
            .template_declarations
            .iter()
            .map(|d| TemplateDeclaration30 {
                identifier: d.identifier.clone(),
                cardinality: d.cardinality.as_str().to_string(),
                base_type: translated(d.base_type.as_ref()),
                param_variable: d.param_variable,
                math_variable: d.math_variable,
                default_value: d.default_value.clone(),
            })
            .collect(),
        item_body: item.item_body.as_ref().map(|body| ItemBody30 {
            blocks: body.blocks.iter().map(migrate_block).collect(),
        }),
        modal_feedback: item.feedback.iter().map(migrate_feedback).collect(),
        rubric: item.rubric.as_ref().map(migrate_rubric),
    }
}

fn translated(base_type: Option<&BaseType>) -> Option<String> {
    base_type.map(|bt| translate_base_type(bt).as_str().to_string())
}

fn migrate_mapping(mapping: &Mapping) -> Mapping30 {
    Mapping30 {
        lower_bound: mapping.lower_bound,
        upper_bound: mapping.upper_bound,
        default_value: mapping.default_value,
        entries: mapping
            .entries
            .iter()
            .map(|e| MapEntry30 {
                map_key: e.key.clone(),
                mapped_value: e.value,
            })
            .collect(),
    }
}

fn migrate_block(block: &BodyBlock) -> BodyBlock30 {
    match block {
        BodyBlock::Paragraph(content) => BodyBlock30::Paragraph(rewrite_markup_for_qti30(content)),
        BodyBlock::Div { class, content } => BodyBlock30::Div {
            class: class.clone(),
            content: rewrite_markup_for_qti30(content),
        },
        BodyBlock::Interaction(Interaction::Choice(choice)) => {
            BodyBlock30::Choice(ChoiceInteraction30 {
                response_identifier: choice.response_identifier.clone(),
                shuffle: choice.shuffle,
                max_choices: choice.max_choices,
                min_choices: choice.min_choices,
                prompt: choice.prompt.as_deref().map(rewrite_markup_for_qti30),
                choices: choice
                    .choices
                    .iter()
                    .map(|c| SimpleChoice30 {
                        identifier: c.identifier.clone(),
                        fixed: c.fixed,
                        content: rewrite_markup_for_qti30(&c.content),
                    })
                    .collect(),
            })
        }
        BodyBlock::Interaction(Interaction::TextEntry(entry)) => {
            BodyBlock30::TextEntry(TextEntryInteraction30 {
                response_identifier: entry.response_identifier.clone(),
                expected_length: entry.expected_length,
                pattern_mask: entry.pattern_mask.clone(),
                placeholder_text: entry.placeholder_text.clone(),
            })
        }
        BodyBlock::Interaction(Interaction::ExtendedText(ext)) => {
            BodyBlock30::ExtendedText(ExtendedTextInteraction30 {
                response_identifier: ext.response_identifier.clone(),
                min_strings: ext.min_strings,
                max_strings: ext.max_strings,
                expected_lines: ext.expected_lines,
                expected_length: ext.expected_length,
                prompt: ext.prompt.as_deref().map(rewrite_markup_for_qti30),
            })
        }
    }
}

/// Modal feedback body: existing markup, else the item feedback's text material.
fn migrate_feedback(feedback: &Feedback) -> ModalFeedback30 {
    let content = match &feedback.markup {
        Some(markup) => rewrite_markup_for_qti30(markup),
        None => {
            let mut text = String::new();
            for content in feedback.materials.iter().flat_map(|m| m.content.iter()) {
                if let MaterialContent::Text(mattext) = content {
                    if mattext.is_html() {
                        text.push_str(&rewrite_markup_for_qti30(&mattext.content));
                    } else {
                        text.push_str(&escape(mattext.content.as_str()));
                    }
                }
            }
            text
        }
    };

    ModalFeedback30 {
        identifier: feedback.identifier.clone(),
        title: feedback.title.clone(),
        outcome_identifier: feedback.outcome_identifier.clone(),
        show_hide: feedback.show_hide.clone(),
        content,
    }
}

fn migrate_rubric(rubric: &RubricBlock) -> RubricBlock {
    RubricBlock {
        use_: rubric.use_.clone(),
        view: rubric.view.clone(),
        content: rewrite_markup_for_qti30(&rubric.content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonicalizer::{Canonicalizer, Qti21Canonicalizer};
    use crate::models::canonical::{
        ChoiceInteraction, OutcomeDeclaration, ResponseDeclaration, Section, SimpleChoice,
    };
    use crate::models::common::{Cardinality, MatText, Material, Metadata, QtiMetadata, View};

    fn item(id: &str) -> Item {
        Item {
            identifier: id.into(),
            title: format!("Item {}", id),
            ..Default::default()
        }
    }

    fn doc_with(items: Vec<Item>) -> Document {
        let mut doc = Document::new(SchemaFamily::Qti21);
        doc.items = items;
        doc
    }

    #[test]
    fn test_single_item_becomes_bare_item() {
        let out = migrate_document(&doc_with(vec![item("Q1")]));
        match out {
            Document30::Item(item) => {
                assert_eq!(item.identifier, "Q1");
                assert!(!item.adaptive);
                assert!(!item.time_dependent);
            }
            other => panic!("expected bare item, got {:?}", other),
        }
    }

    #[test]
    fn test_multiple_items_become_package() {
        let out = migrate_document(&doc_with(vec![item("Q1"), item("Q2")]));
        match out {
            Document30::Package(package) => {
                assert_eq!(package.version, "3.0");
                assert_eq!(package.items.len(), 2);
                assert!(package.assessment.is_none());
            }
            other => panic!("expected package, got {:?}", other),
        }
    }

    #[test]
    fn test_assessment_forces_package() {
        let mut doc = doc_with(vec![item("Q1")]);
        doc.assessment = Some(Assessment {
            identifier: "T1".into(),
            sections: vec![Section {
                identifier: "S1".into(),
                items: vec![item("Q2")],
                ..Default::default()
            }],
            rubric: Some(RubricBlock {
                use_: None,
                view: Some(View::TestConstructor),
                content: r#"<p class="note">x</p>"#.into(),
            }),
            ..Default::default()
        });
        match migrate_document(&doc) {
            Document30::Package(package) => {
                let assessment = package.assessment.unwrap();
                assert_eq!(assessment.sections[0].items[0].identifier, "Q2");
                let rubric = assessment.rubric.unwrap();
                assert_eq!(rubric.content, r#"<p data-qti-class="note">x</p>"#);
                assert_eq!(rubric.view, Some(View::TestConstructor));
            }
            other => panic!("expected package, got {:?}", other),
        }
    }

    #[test]
    fn test_base_types_translate() {
        let mut source = item("Q1");
        source.response_declarations = vec![
            ResponseDeclaration {
                identifier: "PAIR".into(),
                cardinality: Cardinality::Multiple,
                base_type: Some(BaseType::Pair),
                correct_response: vec!["A B".into()],
                mapping: None,
            },
            ResponseDeclaration {
                identifier: "UPLOAD".into(),
                cardinality: Cardinality::Single,
                base_type: Some(BaseType::File),
                correct_response: Vec::new(),
                mapping: None,
            },
        ];
        source.outcome_declarations = vec![OutcomeDeclaration {
            identifier: "SCORE".into(),
            cardinality: Cardinality::Single,
            base_type: Some(BaseType::Float),
            default_value: Some("0.0".into()),
        }];
        let migrated = migrate_item(&source);
        assert_eq!(migrated.response_declarations[0].base_type.as_deref(), Some("directedPair"));
        assert_eq!(migrated.response_declarations[0].cardinality, "multiple");
        assert_eq!(migrated.response_declarations[1].base_type.as_deref(), Some("uri"));
        assert_eq!(migrated.outcome_declarations[0].base_type.as_deref(), Some("float"));
    }

    #[test]
    fn test_markup_rewritten_in_body_and_choices() {
        let mut source = item("Q1");
        source.item_body = Some(crate::models::canonical::ItemBody {
            blocks: vec![
                BodyBlock::Paragraph(r#"<span class="hl">x</span>"#.into()),
                BodyBlock::Interaction(Interaction::Choice(ChoiceInteraction {
                    response_identifier: "R".into(),
                    prompt: Some(r#"<object data="a.mp3"></object>"#.into()),
                    choices: vec![SimpleChoice {
                        identifier: "A".into(),
                        fixed: true,
                        content: r#"<b class="c">A</b>"#.into(),
                    }],
                    ..Default::default()
                })),
            ],
        });
        let migrated = migrate_item(&source);
        let blocks = migrated.item_body.unwrap().blocks;
        assert_eq!(
            blocks[0],
            BodyBlock30::Paragraph(r#"<span data-qti-class="hl">x</span>"#.into())
        );
        match &blocks[1] {
            BodyBlock30::Choice(choice) => {
                assert_eq!(
                    choice.prompt.as_deref(),
                    Some(r#"<qti-object data="a.mp3"></qti-object>"#)
                );
                assert_eq!(choice.choices[0].content, r#"<b data-qti-class="c">A</b>"#);
                assert!(choice.choices[0].fixed);
            }
            other => panic!("expected choice, got {:?}", other),
        }
    }

    #[test]
    fn test_feedback_from_text_material() {
        let feedback = Feedback {
            identifier: "FB1".into(),
            materials: vec![Material {
                label: None,
                content: vec![
                    MaterialContent::Text(MatText {
                        content: "Right & ".into(),
                        ..Default::default()
                    }),
                    MaterialContent::Text(MatText {
                        text_type: Some("text/html".into()),
                        content: r#"<em class="x">well done</em>"#.into(),
                        ..Default::default()
                    }),
                ],
            }],
            ..Default::default()
        };
        let modal = migrate_feedback(&feedback);
        assert_eq!(modal.identifier, "FB1");
        assert_eq!(modal.content, r#"Right &amp; <em data-qti-class="x">well done</em>"#);
    }

    #[test]
    fn test_metadata_retargeted() {
        let mut source = item("Q1");
        source.metadata = Some(Metadata {
            schema: Some("IMS QTI".into()),
            schema_version: Some("2.1".into()),
            qti_metadata: Some(QtiMetadata {
                interaction_type: Some("choiceInteraction".into()),
                ..Default::default()
            }),
            lom: None,
        });
        let meta = migrate_item(&source).metadata.unwrap();
        assert_eq!(meta.schema_version.as_deref(), Some("3.0"));
        assert_eq!(
            meta.qti_metadata.unwrap().interaction_type.as_deref(),
            Some("qti-choice-interaction")
        );
    }

    #[test]
    fn test_legacy_presentation_dropped_from_xml() {
        let xml = r#"<questestinterop version="2.1">
  <item ident="Q1" title="Hybrid">
    <presentation><material><mattext>old</mattext></material></presentation>
    <itemBody><p>new</p></itemBody>
  </item>
</questestinterop>"#;
        let doc = Qti21Canonicalizer.canonicalize_xml(xml).unwrap();
        match migrate_document(&doc) {
            Document30::Item(item) => {
                assert_eq!(
                    item.item_body.unwrap().blocks,
                    vec![BodyBlock30::Paragraph("new".into())]
                );
            }
            other => panic!("expected bare item, got {:?}", other),
        }
    }
}
