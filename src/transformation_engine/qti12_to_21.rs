//! Rules migrating canonical QTI 1.2 documents to the QTI 2.1 model.

use quick_xml::escape::escape;
use tracing::{debug, info};

use super::{retarget_metadata, TargetDocument};
use crate::error::MigrationError;
use crate::models::canonical::{
    Assessment, ConditionExpression, Document, Feedback, Item, LegacyRender, LegacyResponse,
    PresentationBlock, ResponseProcessing,
};
use crate::models::common::{BaseType, Cardinality, MatImage, Material, MaterialContent};
use crate::models::qti12::ItemFeedback;
use crate::models::qti21::{
    Assessment21, BodyBlock21, ChoiceInteraction21, Document21, ExtendedTextInteraction21, Item21,
    ItemBody21, OutcomeDeclaration21, ResponseDeclaration21, Section21, SimpleChoice21,
    TextEntryInteraction21,
};
use crate::schema_registry::MigrationRules;
use crate::schema_version::SchemaFamily;

#[derive(Debug, Default, Clone, Copy)]
pub struct Qti12To21Rules;

impl MigrationRules for Qti12To21Rules {
    fn source(&self) -> SchemaFamily {
        SchemaFamily::Qti12
    }

    fn target(&self) -> SchemaFamily {
        SchemaFamily::Qti21
    }

    fn migrate(&self, doc: &Document) -> Result<TargetDocument, MigrationError> {
        Ok(TargetDocument::Qti21(migrate_document(doc)))
    }
}

/// Build the 2.1 document for a canonical 1.2 document.
pub fn migrate_document(doc: &Document) -> Document21 {
    info!(items = doc.all_items().len(), "migrating QTI 1.2 document to QTI 2.1");

    Document21 {
        version: Some(SchemaFamily::Qti21.canonical_version().to_string()),
        items: doc.items.iter().map(migrate_item).collect(),
        assessment: doc.assessment.as_ref().map(migrate_assessment),
        metadata: doc
            .metadata
            .as_ref()
            .map(|m| retarget_metadata(m, SchemaFamily::Qti21)),
    }
}

fn migrate_assessment(assessment: &Assessment) -> Assessment21 {
    Assessment21 {
        ident: assessment.identifier.clone(),
        title: assessment.title.clone(),
        sections: assessment
            .sections
            .iter()
            .map(|s| Section21 {
                ident: s.identifier.clone(),
                title: s.title.clone(),
                items: s.items.iter().map(migrate_item).collect(),
                metadata: s
                    .metadata
                    .as_ref()
                    .map(|m| retarget_metadata(m, SchemaFamily::Qti21)),
            })
            .collect(),
        metadata: assessment
            .metadata
            .as_ref()
            .map(|m| retarget_metadata(m, SchemaFamily::Qti21)),
        objectives: assessment.objectives.clone(),
        rubric: assessment.rubric.clone(),
    }
}

pub fn migrate_item(item: &Item) -> Item21 {
    let responses: Vec<&LegacyResponse> = item
        .presentation
        .iter()
        .flat_map(|p| p.responses())
        .collect();

    let item_body = item.presentation.as_ref().map(|presentation| ItemBody21 {
        blocks: presentation
            .blocks
            .iter()
            .flat_map(|block| match block {
                PresentationBlock::Material(material) => material_paragraphs(material)
                    .into_iter()
                    .map(BodyBlock21::Paragraph)
                    .collect::<Vec<_>>(),
                PresentationBlock::Response(response) => {
                    interaction_for(response).into_iter().collect::<Vec<_>>()
                }
            })
            .collect(),
    });

    let response_declarations = responses
        .iter()
        .map(|response| ResponseDeclaration21 {
            identifier: response.identifier.clone(),
            cardinality: infer_cardinality(response).as_str().to_string(),
            base_type: Some(infer_base_type(response).as_str().to_string()),
            correct_response: item
                .response_processing
                .as_ref()
                .map(|rp| correct_response(rp, &response.identifier))
                .unwrap_or_default(),
            mapping: None,
        })
        .collect();

    let outcome_declarations = item
        .response_processing
        .as_ref()
        .map(outcome_declarations)
        .unwrap_or_default();

    debug!(
        item = %item.identifier,
        responses = responses.len(),
        "migrated item to QTI 2.1"
    );

    Item21 {
        ident: item.identifier.clone(),
        title: item.title.clone(),
        max_attempts: item.max_attempts.unwrap_or(0),
        adaptive: item.adaptive.map(|flag| flag.to_string()),
        time_dependent: item.time_dependent.map(|flag| flag.to_string()),
        metadata: item
            .metadata
            .as_ref()
            .map(|m| retarget_metadata(m, SchemaFamily::Qti21)),
        presentation: None,
        resprocessing: None,
        item_body,
        response_declarations,
        outcome_declarations,
        template_declarations: Vec::new(),
        feedback: item.feedback.iter().map(migrate_feedback).collect(),
        rubric: item.rubric.clone(),
    }
}

/// Interaction for a legacy response widget; `None` when it has no render.
fn interaction_for(response: &LegacyResponse) -> Option<BodyBlock21> {
    match response.render.as_ref()? {
        LegacyRender::Choice(choice) => Some(BodyBlock21::Choice(ChoiceInteraction21 {
            response_identifier: response.identifier.clone(),
            shuffle: choice.shuffle,
            max_choices: choice.max_number,
            min_choices: choice.min_number,
            prompt: None,
            choices: choice
                .labels
                .iter()
                .map(|label| SimpleChoice21 {
                    identifier: label.identifier.clone(),
                    fixed: false,
                    content: label.material.as_ref().map(material_markup).unwrap_or_default(),
                })
                .collect(),
        })),
        LegacyRender::FillInBlank(fib) if fib.rows > 1 => {
            Some(BodyBlock21::ExtendedText(ExtendedTextInteraction21 {
                response_identifier: response.identifier.clone(),
                expected_lines: fib.rows,
                expected_length: fib.max_chars,
                ..Default::default()
            }))
        }
        LegacyRender::FillInBlank(fib) => Some(BodyBlock21::TextEntry(TextEntryInteraction21 {
            response_identifier: response.identifier.clone(),
            expected_length: fib.max_chars,
            ..Default::default()
        })),
    }
}

/// Explicit cardinality, else `multiple` for choices allowing several picks.
pub fn infer_cardinality(response: &LegacyResponse) -> Cardinality {
    match &response.cardinality {
        Some(explicit @ (Cardinality::Single | Cardinality::Multiple | Cardinality::Ordered)) => {
            explicit.clone()
        }
        _ => match &response.render {
            Some(LegacyRender::Choice(choice)) if choice.max_number > 1 => Cardinality::Multiple,
            _ => Cardinality::Single,
        },
    }
}

pub fn infer_base_type(response: &LegacyResponse) -> BaseType {
    match &response.render {
        Some(LegacyRender::Choice(_)) => BaseType::Identifier,
        Some(LegacyRender::FillInBlank(fib)) => {
            match fib.fib_type.as_deref().map(str::to_ascii_lowercase).as_deref() {
                Some("integer") => BaseType::Integer,
                Some("decimal") => BaseType::Float,
                _ => BaseType::String,
            }
        }
        None => BaseType::String,
    }
}

/// Values of top-level `varequal` tests on `response_id` in conditions that
/// set a variable to 1. Tests under `and`/`or`/`not` are not inspected.
pub fn correct_response(rp: &ResponseProcessing, response_id: &str) -> Vec<String> {
    rp.conditions
        .iter()
        .filter(|condition| {
            condition
                .set_vars
                .iter()
                .any(|sv| sv.action.trim().eq_ignore_ascii_case("set") && sv.value.trim() == "1")
        })
        .flat_map(|condition| {
            condition.expressions.iter().filter_map(|expr| match expr {
                ConditionExpression::VarEqual(test) if test.resp_ident == response_id => {
                    Some(test.value.clone())
                }
                _ => None,
            })
        })
        .collect()
}

/// Legacy score variable type to an outcome base type. Unknown types are floats.
pub fn score_base_type(var_type: Option<&str>) -> BaseType {
    match var_type.map(|t| t.trim().to_ascii_lowercase()).as_deref() {
        Some("integer") => BaseType::Integer,
        Some("decimal") | Some("scientific") => BaseType::Float,
        Some("boolean") => BaseType::Boolean,
        _ => BaseType::Float,
    }
}

fn outcome_declarations(rp: &ResponseProcessing) -> Vec<OutcomeDeclaration21> {
    if rp.score_variables.is_empty() {
        return vec![OutcomeDeclaration21 {
            identifier: "SCORE".to_string(),
            cardinality: Cardinality::Single.as_str().to_string(),
            base_type: Some(BaseType::Float.as_str().to_string()),
            default_value: Some("0.0".to_string()),
        }];
    }

    rp.score_variables
        .iter()
        .map(|var| OutcomeDeclaration21 {
            identifier: var.name.clone(),
            cardinality: Cardinality::Single.as_str().to_string(),
            base_type: Some(score_base_type(var.var_type.as_deref()).as_str().to_string()),
            default_value: var.default_value.clone().filter(|v| !v.trim().is_empty()),
        })
        .collect()
}

fn migrate_feedback(feedback: &Feedback) -> ItemFeedback {
    ItemFeedback {
        ident: feedback.identifier.clone(),
        title: feedback.title.clone(),
        flow_mat: feedback.materials.clone(),
        material: None,
    }
}

/// Item body paragraphs for a material: one per text or image entry, in order.
/// Audio, video and empty text produce nothing.
pub fn material_paragraphs(material: &Material) -> Vec<String> {
    material
        .content
        .iter()
        .filter_map(content_markup)
        .filter(|markup| !markup.trim().is_empty())
        .collect()
}

/// A material merged into one markup string, as used for simple-choice content.
pub fn material_markup(material: &Material) -> String {
    material.content.iter().filter_map(content_markup).collect()
}

fn content_markup(content: &MaterialContent) -> Option<String> {
    match content {
        MaterialContent::Text(text) if text.is_html() => Some(
            crate::transformation_rule::normalize_legacy_markup(&text.content),
        ),
        MaterialContent::Text(text) => Some(escape(text.content.as_str()).into_owned()),
        MaterialContent::Image(image) => Some(image_tag(image)),
        MaterialContent::Audio(_) | MaterialContent::Video(_) => None,
    }
}

pub fn image_tag(image: &MatImage) -> String {
    let mut tag = format!(r#"<img src="{}""#, escape(image.uri.as_str()));
    if image.width > 0 {
        tag.push_str(&format!(r#" width="{}""#, image.width));
    }
    if image.height > 0 {
        tag.push_str(&format!(r#" height="{}""#, image.height));
    }
    tag.push_str(" />");
    tag
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonicalizer::{Canonicalizer, Qti12Canonicalizer};
    use crate::models::canonical::{
        ChoiceLabel, ChoiceRender, FibRender, ResponseCondition, ScoreVariable, SetVar, VarTest,
    };
    use crate::models::common::MatText;

    fn choice_response(max_number: u32) -> LegacyResponse {
        LegacyResponse {
            identifier: "RESP".into(),
            render: Some(LegacyRender::Choice(ChoiceRender {
                max_number,
                ..Default::default()
            })),
            ..Default::default()
        }
    }

    fn fib_response(rows: u32, fib_type: Option<&str>) -> LegacyResponse {
        LegacyResponse {
            identifier: "FIB".into(),
            render: Some(LegacyRender::FillInBlank(FibRender {
                rows,
                max_chars: 40,
                fib_type: fib_type.map(String::from),
                ..Default::default()
            })),
            ..Default::default()
        }
    }

    fn equal(resp: &str, value: &str) -> ConditionExpression {
        ConditionExpression::VarEqual(VarTest {
            resp_ident: resp.into(),
            qualifier: None,
            value: value.into(),
        })
    }

    fn set_one() -> SetVar {
        SetVar {
            action: "Set".into(),
            var_name: Some("SCORE".into()),
            value: "1".into(),
        }
    }

    #[test]
    fn test_cardinality_precedence() {
        let mut explicit = choice_response(4);
        explicit.cardinality = Some(Cardinality::Ordered);
        assert_eq!(infer_cardinality(&explicit), Cardinality::Ordered);

        assert_eq!(infer_cardinality(&choice_response(3)), Cardinality::Multiple);
        assert_eq!(infer_cardinality(&choice_response(1)), Cardinality::Single);

        let mut odd = choice_response(2);
        odd.cardinality = Some(Cardinality::Other("bag".into()));
        assert_eq!(infer_cardinality(&odd), Cardinality::Multiple);
    }

    #[test]
    fn test_base_type_inference() {
        assert_eq!(infer_base_type(&choice_response(1)), BaseType::Identifier);
        assert_eq!(infer_base_type(&fib_response(1, Some("Integer"))), BaseType::Integer);
        assert_eq!(infer_base_type(&fib_response(1, Some("Decimal"))), BaseType::Float);
        assert_eq!(infer_base_type(&fib_response(1, Some("String"))), BaseType::String);
        assert_eq!(infer_base_type(&fib_response(1, None)), BaseType::String);
    }

    #[test]
    fn test_fib_rows_boundary() {
        assert!(matches!(
            interaction_for(&fib_response(0, None)),
            Some(BodyBlock21::TextEntry(_))
        ));
        assert!(matches!(
            interaction_for(&fib_response(1, None)),
            Some(BodyBlock21::TextEntry(_))
        ));
        match interaction_for(&fib_response(2, None)) {
            Some(BodyBlock21::ExtendedText(ext)) => {
                assert_eq!(ext.expected_lines, 2);
                assert_eq!(ext.expected_length, 40);
            }
            other => panic!("expected extended text, got {:?}", other),
        }
    }

    #[test]
    fn test_correct_response_is_top_level_only() {
        let rp = ResponseProcessing {
            conditions: vec![
                ResponseCondition {
                    expressions: vec![equal("RESP", "B")],
                    set_vars: vec![set_one()],
                    ..Default::default()
                },
                ResponseCondition {
                    expressions: vec![ConditionExpression::And(vec![equal("RESP", "C")])],
                    set_vars: vec![set_one()],
                    ..Default::default()
                },
                ResponseCondition {
                    expressions: vec![equal("RESP", "D")],
                    set_vars: vec![SetVar {
                        action: "Add".into(),
                        var_name: None,
                        value: "1".into(),
                    }],
                    ..Default::default()
                },
                ResponseCondition {
                    expressions: vec![equal("OTHER", "A")],
                    set_vars: vec![set_one()],
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        assert_eq!(correct_response(&rp, "RESP"), vec!["B".to_string()]);
    }

    #[test]
    fn test_score_types() {
        assert_eq!(score_base_type(Some("Integer")), BaseType::Integer);
        assert_eq!(score_base_type(Some("decimal")), BaseType::Float);
        assert_eq!(score_base_type(Some("Scientific")), BaseType::Float);
        assert_eq!(score_base_type(Some("Boolean")), BaseType::Boolean);
        assert_eq!(score_base_type(Some("Enumerated")), BaseType::Float);
        assert_eq!(score_base_type(None), BaseType::Float);
    }

    #[test]
    fn test_outcomes_synthesize_score() {
        let synthesized = outcome_declarations(&ResponseProcessing::default());
        assert_eq!(synthesized.len(), 1);
        assert_eq!(synthesized[0].identifier, "SCORE");
        assert_eq!(synthesized[0].base_type.as_deref(), Some("float"));
        assert_eq!(synthesized[0].default_value.as_deref(), Some("0.0"));

        let declared = outcome_declarations(&ResponseProcessing {
            score_variables: vec![ScoreVariable {
                name: "POINTS".into(),
                var_type: Some("Integer".into()),
                default_value: Some("".into()),
                ..Default::default()
            }],
            ..Default::default()
        });
        assert_eq!(declared[0].identifier, "POINTS");
        assert_eq!(declared[0].base_type.as_deref(), Some("integer"));
        assert_eq!(declared[0].default_value, None);
    }

    #[test]
    fn test_material_markup() {
        let material = Material {
            label: None,
            content: vec![
                MaterialContent::Text(MatText {
                    content: "1 < 2".into(),
                    ..Default::default()
                }),
                MaterialContent::Text(MatText {
                    text_type: Some("text/html".into()),
                    content: "a<br>b".into(),
                    ..Default::default()
                }),
                MaterialContent::Image(MatImage {
                    uri: "fig.png".into(),
                    width: 20,
                    ..Default::default()
                }),
            ],
        };
        assert_eq!(
            material_markup(&material),
            r#"1 &lt; 2a<br/>b<img src="fig.png" width="20" />"#
        );
    }

    #[test]
    fn test_body_paragraph_per_material_entry() {
        let xml = r#"<questestinterop>
  <item ident="Q1">
    <presentation>
      <material>
        <mattext>Look at this</mattext>
        <matimage uri="a.png" width="10"/>
        <mataudio uri="hint.mp3"/>
        <mattext>   </mattext>
        <mattext>then answer</mattext>
      </material>
      <response_str ident="R1"><render_fib/></response_str>
      <material><mattext>After R1</mattext></material>
    </presentation>
  </item>
</questestinterop>"#;
        let doc = Qti12Canonicalizer.canonicalize_xml(xml).unwrap();
        let item = migrate_item(&doc.items[0]);
        let blocks = item.item_body.unwrap().blocks;

        assert_eq!(blocks.len(), 5);
        assert_eq!(blocks[0], BodyBlock21::Paragraph("Look at this".into()));
        assert_eq!(blocks[1], BodyBlock21::Paragraph(r#"<img src="a.png" width="10" />"#.into()));
        assert_eq!(blocks[2], BodyBlock21::Paragraph("then answer".into()));
        assert!(matches!(&blocks[3], BodyBlock21::TextEntry(entry) if entry.response_identifier == "R1"));
        assert_eq!(blocks[4], BodyBlock21::Paragraph("After R1".into()));
    }

    #[test]
    fn test_migrate_choice_item_from_xml() {
        let xml = r#"<questestinterop>
  <item ident="Q1" title="Capital">
    <presentation>
      <material><mattext>Capital of France?</mattext></material>
      <response_lid ident="RESP" rcardinality="Single">
        <render_choice shuffle="yes">
          <response_label ident="A"><material><mattext>Lyon</mattext></material></response_label>
          <response_label ident="B"><material><mattext>Paris</mattext></material></response_label>
        </render_choice>
      </response_lid>
    </presentation>
    <resprocessing>
      <outcomes><decvar varname="SCORE" vartype="Integer" defaultval="0"/></outcomes>
      <respcondition>
        <conditionvar><varequal respident="RESP">B</varequal></conditionvar>
        <setvar action="Set">1</setvar>
      </respcondition>
    </resprocessing>
  </item>
</questestinterop>"#;
        let doc = Qti12Canonicalizer.canonicalize_xml(xml).unwrap();
        let out = migrate_document(&doc);

        assert_eq!(out.version.as_deref(), Some("2.1"));
        let item = &out.items[0];
        let body = item.item_body.as_ref().unwrap();
        assert_eq!(body.blocks[0], BodyBlock21::Paragraph("Capital of France?".into()));
        match &body.blocks[1] {
            BodyBlock21::Choice(choice) => {
                assert!(choice.shuffle);
                assert_eq!(choice.choices[1].content, "Paris");
            }
            other => panic!("expected choice, got {:?}", other),
        }
        let decl = &item.response_declarations[0];
        assert_eq!(decl.cardinality, "single");
        assert_eq!(decl.base_type.as_deref(), Some("identifier"));
        assert_eq!(decl.correct_response, vec!["B".to_string()]);
        assert_eq!(item.outcome_declarations[0].base_type.as_deref(), Some("integer"));
        assert_eq!(item.outcome_declarations[0].default_value.as_deref(), Some("0"));
    }

    #[test]
    fn test_no_outcomes_without_resprocessing() {
        let item = Item {
            identifier: "Q".into(),
            presentation: Some(crate::models::canonical::Presentation {
                label: None,
                blocks: vec![PresentationBlock::Response(LegacyResponse {
                    identifier: "R".into(),
                    ..Default::default()
                })],
            }),
            ..Default::default()
        };
        let migrated = migrate_item(&item);
        assert!(migrated.outcome_declarations.is_empty());
        assert!(migrated.item_body.unwrap().blocks.is_empty());
        assert_eq!(migrated.response_declarations[0].base_type.as_deref(), Some("string"));
    }

    #[test]
    fn test_labels_become_simple_choices() {
        let response = LegacyResponse {
            identifier: "R".into(),
            render: Some(LegacyRender::Choice(ChoiceRender {
                labels: vec![ChoiceLabel {
                    identifier: "A".into(),
                    material: Some(Material {
                        label: None,
                        content: vec![MaterialContent::Image(MatImage {
                            uri: "a.gif".into(),
                            ..Default::default()
                        })],
                    }),
                }],
                ..Default::default()
            })),
            ..Default::default()
        };
        match interaction_for(&response) {
            Some(BodyBlock21::Choice(choice)) => {
                assert_eq!(choice.choices[0].content, r#"<img src="a.gif" />"#);
                assert!(!choice.shuffle);
            }
            other => panic!("expected choice, got {:?}", other),
        }
    }
}
