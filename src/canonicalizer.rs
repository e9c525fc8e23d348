//! Per-generation mapping from the version models to the canonical model.
//!
//! Each canonicalizer is a pure function of its input: it flattens legacy
//! `flow` nesting, turns `yes`/`no` spellings into `bool`, and checks that the
//! declared version belongs to the family it was read as.

use tracing::debug;

use crate::error::MigrationError;
use crate::models::canonical::{
    Assessment, BodyBlock, ChoiceInteraction, ChoiceLabel, ChoiceRender, Document,
    ExtendedTextInteraction, Feedback, FibRender, Interaction, Item, ItemBody, LegacyRender,
    LegacyResponse, MapEntry, Mapping, OutcomeDeclaration, Presentation, PresentationBlock,
    ResponseCondition, ResponseDeclaration, ResponseProcessing, ScoreVariable, Section,
    SimpleChoice, TemplateDeclaration, TextEntryInteraction,
};
use crate::models::common::{parse_flag, BaseType, Cardinality};
use crate::models::qti12::{
    Document12, Item12, ItemFeedback, Presentation as Presentation12, PresentationChild, Render,
    ResProcessing, Response,
};
use crate::models::qti21::{BodyBlock21, Document21, Item21, Mapping21, ResponseDeclaration21};
use crate::models::qti30::{BodyBlock30, Document30, Item30, Mapping30, ResponseDeclaration30};
use crate::schema_version::SchemaFamily;
use crate::xml::{self, reader};

type Result<T> = std::result::Result<T, MigrationError>;

/// Turns a serialized document of one schema family into the canonical model.
pub trait Canonicalizer: Send + Sync {
    fn family(&self) -> SchemaFamily;

    fn canonicalize_xml(&self, xml: &str) -> Result<Document>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Qti12Canonicalizer;

#[derive(Debug, Default, Clone, Copy)]
pub struct Qti21Canonicalizer;

#[derive(Debug, Default, Clone, Copy)]
pub struct Qti30Canonicalizer;

impl Canonicalizer for Qti12Canonicalizer {
    fn family(&self) -> SchemaFamily {
        SchemaFamily::Qti12
    }

    fn canonicalize_xml(&self, xml: &str) -> Result<Document> {
        let root = xml::parse(xml)?;
        canonicalize_qti12(&reader::read_qti12(&root)?)
    }
}

impl Canonicalizer for Qti21Canonicalizer {
    fn family(&self) -> SchemaFamily {
        SchemaFamily::Qti21
    }

    fn canonicalize_xml(&self, xml: &str) -> Result<Document> {
        let root = xml::parse(xml)?;
        canonicalize_qti21(&reader::read_qti21(&root)?)
    }
}

impl Canonicalizer for Qti30Canonicalizer {
    fn family(&self) -> SchemaFamily {
        SchemaFamily::Qti30
    }

    fn canonicalize_xml(&self, xml: &str) -> Result<Document> {
        let root = xml::parse(xml)?;
        canonicalize_qti30(&reader::read_qti30(&root)?)
    }
}

/// Default an absent version to the family's canonical one and reject
/// versions that belong to another family.
fn resolve_declared_version(declared: Option<&str>, family: SchemaFamily) -> Result<String> {
    let declared = match declared.map(str::trim) {
        None | Some("") => return Ok(family.canonical_version().to_string()),
        Some(v) => v,
    };

    match SchemaFamily::resolve(declared) {
        Ok(found) if found == family => Ok(declared.to_string()),
        Ok(found) => Err(MigrationError::validation(format!(
            "document declares QTI {} ({} family) but was read as QTI {}",
            declared, found, family
        ))),
        Err(_) => Err(MigrationError::validation(format!(
            "document declares unsupported QTI version {:?}; expected QTI {}",
            declared, family
        ))),
    }
}

fn nonzero(value: u32) -> Option<u32> {
    (value > 0).then_some(value)
}

/// Legacy `rcardinality` is capitalized (`Single`, `Multiple`, `Ordered`).
fn legacy_cardinality(raw: &str) -> Cardinality {
    match Cardinality::parse(&raw.trim().to_ascii_lowercase()) {
        Cardinality::Other(_) => Cardinality::Other(raw.to_string()),
        known => known,
    }
}

fn optional_flag(value: Option<&str>) -> Option<bool> {
    value.and_then(parse_flag)
}

// ---------------------------------------------------------------------------
// QTI 1.2

pub fn canonicalize_qti12(doc: &Document12) -> Result<Document> {
    let version = resolve_declared_version(doc.version.as_deref(), SchemaFamily::Qti12)?;

    let assessment = doc.assessment.as_ref().map(|a| Assessment {
        identifier: a.ident.clone(),
        title: a.title.clone(),
        sections: a
            .sections
            .iter()
            .map(|s| Section {
                identifier: s.ident.clone(),
                title: s.title.clone(),
                items: s.items.iter().map(canonical_item12).collect(),
                metadata: s.metadata.clone(),
            })
            .collect(),
        metadata: a.metadata.clone(),
        objectives: a.objectives.clone(),
        rubric: a.rubric.clone(),
    });

    let out = Document {
        version,
        family: SchemaFamily::Qti12,
        assessment,
        items: doc.items.iter().map(canonical_item12).collect(),
        metadata: doc.metadata.clone(),
    };
    debug!(items = out.all_items().len(), "canonicalized QTI 1.2 document");
    Ok(out)
}

fn canonical_item12(item: &Item12) -> Item {
    Item {
        identifier: item.ident.clone(),
        title: item.title.clone(),
        max_attempts: nonzero(item.max_attempts),
        metadata: item.metadata.clone(),
        presentation: item.presentation.as_ref().map(flatten_presentation),
        response_processing: item.resprocessing.as_ref().map(canonical_resprocessing),
        feedback: item.feedback.iter().map(canonical_item_feedback).collect(),
        rubric: item.rubric.clone(),
        ..Default::default()
    }
}

/// Materials and responses in document order, flows expanded in place.
pub fn flatten_presentation(presentation: &Presentation12) -> Presentation {
    let mut blocks = Vec::new();
    push_blocks(&mut blocks, &presentation.children);
    Presentation {
        label: presentation.label.clone(),
        blocks,
    }
}

fn push_blocks(blocks: &mut Vec<PresentationBlock>, children: &[PresentationChild]) {
    for child in children {
        match child {
            PresentationChild::Material(material) => {
                blocks.push(PresentationBlock::Material(material.clone()))
            }
            PresentationChild::Response(response) => {
                blocks.push(PresentationBlock::Response(canonical_response(response)))
            }
            PresentationChild::Flow(flow) => push_blocks(blocks, &flow.children),
        }
    }
}

fn canonical_response(response: &Response) -> LegacyResponse {
    let render = response.render.as_ref().map(|render| match render {
        Render::Choice(choice) => LegacyRender::Choice(ChoiceRender {
            // only the exact legacy spelling enables shuffling
            shuffle: choice.shuffle.as_deref() == Some("yes"),
            min_number: choice.min_number,
            max_number: choice.max_number,
            labels: choice
                .labels
                .iter()
                .map(|label| ChoiceLabel {
                    identifier: label.ident.clone(),
                    material: label.material.clone(),
                })
                .collect(),
        }),
        Render::Fib(fib) => LegacyRender::FillInBlank(FibRender {
            fib_type: fib.fib_type.clone(),
            rows: fib.rows,
            max_chars: fib.max_chars,
            prompt: fib.prompt.clone(),
            columns: fib.columns,
        }),
    });

    LegacyResponse {
        kind: response.kind,
        identifier: response.ident.clone(),
        cardinality: response.rcardinality.as_deref().map(legacy_cardinality),
        render,
    }
}

fn canonical_resprocessing(rp: &ResProcessing) -> ResponseProcessing {
    ResponseProcessing {
        score_model: rp.score_model.clone(),
        score_variables: rp
            .outcomes
            .iter()
            .map(|d| ScoreVariable {
                name: d.var_name.clone(),
                var_type: d.var_type.clone(),
                default_value: d.default_val.clone(),
                min_value: d.min_value.clone(),
                max_value: d.max_value.clone(),
            })
            .collect(),
        conditions: rp
            .conditions
            .iter()
            .map(|c| ResponseCondition {
                title: c.title.clone(),
                continue_after: optional_flag(c.continue_.as_deref()),
                expressions: c.condition.clone(),
                set_vars: c.set_vars.clone(),
                feedback_refs: c
                    .display_feedback
                    .iter()
                    .map(|d| d.link_ref_id.clone())
                    .collect(),
            })
            .collect(),
    }
}

fn canonical_item_feedback(feedback: &ItemFeedback) -> Feedback {
    Feedback {
        identifier: feedback.ident.clone(),
        title: feedback.title.clone(),
        materials: feedback
            .material
            .iter()
            .chain(feedback.flow_mat.iter())
            .cloned()
            .collect(),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// QTI 2.1

pub fn canonicalize_qti21(doc: &Document21) -> Result<Document> {
    let version = resolve_declared_version(doc.version.as_deref(), SchemaFamily::Qti21)?;

    let assessment = doc.assessment.as_ref().map(|a| Assessment {
        identifier: a.ident.clone(),
        title: a.title.clone(),
        sections: a
            .sections
            .iter()
            .map(|s| Section {
                identifier: s.ident.clone(),
                title: s.title.clone(),
                items: s.items.iter().map(canonical_item21).collect(),
                metadata: s.metadata.clone(),
            })
            .collect(),
        metadata: a.metadata.clone(),
        objectives: a.objectives.clone(),
        rubric: a.rubric.clone(),
    });

    let out = Document {
        version,
        family: SchemaFamily::Qti21,
        assessment,
        items: doc.items.iter().map(canonical_item21).collect(),
        metadata: doc.metadata.clone(),
    };
    debug!(items = out.all_items().len(), "canonicalized QTI 2.1 document");
    Ok(out)
}

fn canonical_item21(item: &Item21) -> Item {
    let item_body = item.item_body.as_ref().map(|body| ItemBody {
        blocks: body.blocks.iter().map(canonical_block21).collect(),
    });

    Item {
        identifier: item.ident.clone(),
        title: item.title.clone(),
        max_attempts: nonzero(item.max_attempts),
        adaptive: optional_flag(item.adaptive.as_deref()),
        time_dependent: optional_flag(item.time_dependent.as_deref()),
        metadata: item.metadata.clone(),
        presentation: item.presentation.as_ref().map(flatten_presentation),
        response_processing: item.resprocessing.as_ref().map(canonical_resprocessing),
        item_body,
        response_declarations: item
            .response_declarations
            .iter()
            .map(canonical_response_declaration21)
            .collect(),
        outcome_declarations: item
            .outcome_declarations
            .iter()
            .map(|d| OutcomeDeclaration {
                identifier: d.identifier.clone(),
                cardinality: Cardinality::parse(&d.cardinality),
                base_type: d.base_type.as_deref().map(BaseType::parse),
                default_value: d.default_value.clone(),
            })
            .collect(),
        template_declarations: item
            .template_declarations
            .iter()
            .map(|d| TemplateDeclaration {
                identifier: d.identifier.clone(),
                cardinality: Cardinality::parse(&d.cardinality),
                base_type: d.base_type.as_deref().map(BaseType::parse),
                param_variable: d.param_variable,
                math_variable: d.math_variable,
                default_value: d.default_value.clone(),
            })
            .collect(),
        feedback: item.feedback.iter().map(canonical_item_feedback).collect(),
        rubric: item.rubric.clone(),
    }
}

fn canonical_block21(block: &BodyBlock21) -> BodyBlock {
    match block {
        BodyBlock21::Paragraph(content) => BodyBlock::Paragraph(content.clone()),
        BodyBlock21::Div { class, content } => BodyBlock::Div {
            class: class.clone(),
            content: content.clone(),
        },
        BodyBlock21::Choice(c) => BodyBlock::Interaction(Interaction::Choice(ChoiceInteraction {
            response_identifier: c.response_identifier.clone(),
            shuffle: c.shuffle,
            max_choices: nonzero(c.max_choices),
            min_choices: nonzero(c.min_choices),
            prompt: c.prompt.clone(),
            choices: c
                .choices
                .iter()
                .map(|s| SimpleChoice {
                    identifier: s.identifier.clone(),
                    fixed: s.fixed,
                    content: s.content.clone(),
                })
                .collect(),
        })),
        BodyBlock21::TextEntry(t) => {
            BodyBlock::Interaction(Interaction::TextEntry(TextEntryInteraction {
                response_identifier: t.response_identifier.clone(),
                expected_length: nonzero(t.expected_length),
                pattern_mask: t.pattern_mask.clone(),
                placeholder_text: t.placeholder_text.clone(),
            }))
        }
        BodyBlock21::ExtendedText(e) => {
            BodyBlock::Interaction(Interaction::ExtendedText(ExtendedTextInteraction {
                response_identifier: e.response_identifier.clone(),
                min_strings: nonzero(e.min_strings),
                max_strings: nonzero(e.max_strings),
                expected_lines: nonzero(e.expected_lines),
                expected_length: nonzero(e.expected_length),
                prompt: e.prompt.clone(),
            }))
        }
    }
}

fn canonical_mapping21(mapping: &Mapping21) -> Mapping {
    Mapping {
        lower_bound: mapping.lower_bound,
        upper_bound: mapping.upper_bound,
        default_value: mapping.default_value,
        entries: mapping
            .entries
            .iter()
            .map(|e| MapEntry {
                key: e.map_key.clone(),
                value: e.mapped_value,
            })
            .collect(),
    }
}

fn canonical_response_declaration21(decl: &ResponseDeclaration21) -> ResponseDeclaration {
    ResponseDeclaration {
        identifier: decl.identifier.clone(),
        cardinality: Cardinality::parse(&decl.cardinality),
        base_type: decl.base_type.as_deref().map(BaseType::parse),
        correct_response: decl.correct_response.clone(),
        mapping: decl.mapping.as_ref().map(canonical_mapping21),
    }
}

// ---------------------------------------------------------------------------
// QTI 3.0

pub fn canonicalize_qti30(doc: &Document30) -> Result<Document> {
    let out = match doc {
        Document30::Item(item) => Document {
            version: SchemaFamily::Qti30.canonical_version().to_string(),
            family: SchemaFamily::Qti30,
            assessment: None,
            items: vec![canonical_item30(item)],
            metadata: None,
        },
        Document30::Package(package) => Document {
            version: resolve_declared_version(Some(&package.version), SchemaFamily::Qti30)?,
            family: SchemaFamily::Qti30,
            assessment: package.assessment.as_ref().map(|a| Assessment {
                identifier: a.ident.clone(),
                title: a.title.clone(),
                sections: a
                    .sections
                    .iter()
                    .map(|s| Section {
                        identifier: s.ident.clone(),
                        title: s.title.clone(),
                        items: s.items.iter().map(canonical_item30).collect(),
                        metadata: s.metadata.clone(),
                    })
                    .collect(),
                metadata: a.metadata.clone(),
                objectives: a.objectives.clone(),
                rubric: a.rubric.clone(),
            }),
            items: package.items.iter().map(canonical_item30).collect(),
            metadata: package.metadata.clone(),
        },
    };
    debug!(items = out.all_items().len(), "canonicalized QTI 3.0 document");
    Ok(out)
}

fn canonical_item30(item: &Item30) -> Item {
    let item_body = item.item_body.as_ref().map(|body| ItemBody {
        blocks: body.blocks.iter().map(canonical_block30).collect(),
    });

    Item {
        identifier: item.identifier.clone(),
        title: item.title.clone(),
        max_attempts: None,
        adaptive: Some(item.adaptive),
        time_dependent: Some(item.time_dependent),
        metadata: item.metadata.clone(),
        presentation: None,
        response_processing: None,
        item_body,
        response_declarations: item
            .response_declarations
            .iter()
            .map(canonical_response_declaration30)
            .collect(),
        outcome_declarations: item
            .outcome_declarations
            .iter()
            .map(|d| OutcomeDeclaration {
                identifier: d.identifier.clone(),
                cardinality: Cardinality::parse(&d.cardinality),
                base_type: d.base_type.as_deref().map(BaseType::parse),
                default_value: d.default_value.clone(),
            })
            .collect(),
        template_declarations: item
            .template_declarations
            .iter()
            .map(|d| TemplateDeclaration {
                identifier: d.identifier.clone(),
                cardinality: Cardinality::parse(&d.cardinality),
                base_type: d.base_type.as_deref().map(BaseType::parse),
                param_variable: d.param_variable,
                math_variable: d.math_variable,
                default_value: d.default_value.clone(),
            })
            .collect(),
        feedback: item
            .modal_feedback
            .iter()
            .map(|f| Feedback {
                identifier: f.identifier.clone(),
                title: f.title.clone(),
                materials: Vec::new(),
                markup: Some(f.content.clone()),
                outcome_identifier: f.outcome_identifier.clone(),
                show_hide: f.show_hide.clone(),
            })
            .collect(),
        rubric: item.rubric.clone(),
    }
}

fn canonical_block30(block: &BodyBlock30) -> BodyBlock {
    match block {
        BodyBlock30::Paragraph(content) => BodyBlock::Paragraph(content.clone()),
        BodyBlock30::Div { class, content } => BodyBlock::Div {
            class: class.clone(),
            content: content.clone(),
        },
        BodyBlock30::Choice(c) => BodyBlock::Interaction(Interaction::Choice(ChoiceInteraction {
            response_identifier: c.response_identifier.clone(),
            shuffle: c.shuffle,
            max_choices: c.max_choices,
            min_choices: c.min_choices,
            prompt: c.prompt.clone(),
            choices: c
                .choices
                .iter()
                .map(|s| SimpleChoice {
                    identifier: s.identifier.clone(),
                    fixed: s.fixed,
                    content: s.content.clone(),
                })
                .collect(),
        })),
        BodyBlock30::TextEntry(t) => {
            BodyBlock::Interaction(Interaction::TextEntry(TextEntryInteraction {
                response_identifier: t.response_identifier.clone(),
                expected_length: t.expected_length,
                pattern_mask: t.pattern_mask.clone(),
                placeholder_text: t.placeholder_text.clone(),
            }))
        }
        BodyBlock30::ExtendedText(e) => {
            BodyBlock::Interaction(Interaction::ExtendedText(ExtendedTextInteraction {
                response_identifier: e.response_identifier.clone(),
                min_strings: e.min_strings,
                max_strings: e.max_strings,
                expected_lines: e.expected_lines,
                expected_length: e.expected_length,
                prompt: e.prompt.clone(),
            }))
        }
    }
}

fn canonical_mapping30(mapping: &Mapping30) -> Mapping {
    Mapping {
        lower_bound: mapping.lower_bound,
        upper_bound: mapping.upper_bound,
        default_value: mapping.default_value,
        entries: mapping
            .entries
            .iter()
            .map(|e| MapEntry {
                key: e.map_key.clone(),
                value: e.mapped_value,
            })
            .collect(),
    }
}

fn canonical_response_declaration30(decl: &ResponseDeclaration30) -> ResponseDeclaration {
    ResponseDeclaration {
        identifier: decl.identifier.clone(),
        cardinality: Cardinality::parse(&decl.cardinality),
        base_type: decl.base_type.as_deref().map(BaseType::parse),
        correct_response: decl.correct_response.clone(),
        mapping: decl.mapping.as_ref().map(canonical_mapping30),
    }
}
