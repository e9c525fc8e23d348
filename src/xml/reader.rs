//! Builds the version-specific document models from parsed element trees.

use tracing::warn;

use super::Element;
use crate::error::MigrationError;
use crate::models::common::{
    parse_flag, MatImage, MatMedia, MatText, Material, MaterialContent, Metadata, Objective,
    QtiMetadata, RubricBlock, View,
};
use crate::models::qti12::{
    Assessment12, ConditionExpression, DecVar, DisplayFeedback, Document12, Flow, Item12,
    ItemFeedback, Presentation, PresentationChild, Render, RenderChoice, RenderFib, ResProcessing, RespCondition,
    Response, ResponseKind, ResponseLabel, Section12, SetVar, VarTest,
};
use crate::models::qti21::{
    Assessment21, BodyBlock21, ChoiceInteraction21, Document21, ExtendedTextInteraction21, Item21,
    ItemBody21, MapEntry21, Mapping21, OutcomeDeclaration21, ResponseDeclaration21, Section21,
    SimpleChoice21, TemplateDeclaration21, TextEntryInteraction21,
};
use crate::models::qti30::{
    Assessment30, BodyBlock30, ChoiceInteraction30, Document30, ExtendedTextInteraction30, Item30,
    ItemBody30, MapEntry30, Mapping30, ModalFeedback30, OutcomeDeclaration30, Package30,
    ResponseDeclaration30, Section30, SimpleChoice30, TemplateDeclaration30,
    TextEntryInteraction30,
};

type Result<T> = std::result::Result<T, MigrationError>;

// ---------------------------------------------------------------------------
// attribute helpers

fn attr_string(el: &Element, name: &str) -> String {
    el.attr(name).unwrap_or_default().to_string()
}

fn attr_opt(el: &Element, name: &str) -> Option<String> {
    el.attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn attr_u32(el: &Element, name: &str, path: &str) -> Result<u32> {
    match el.attr(name).map(str::trim) {
        None | Some("") => Ok(0),
        Some(raw) => raw.parse().map_err(|_| {
            MigrationError::parsing_at(
                format!("attribute {}=\"{}\" on <{}> is not a non-negative integer", name, raw, el.name),
                path,
            )
        }),
    }
}

fn attr_f64(el: &Element, name: &str, path: &str) -> Result<Option<f64>> {
    match el.attr(name).map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|_| {
            MigrationError::parsing_at(
                format!("attribute {}=\"{}\" on <{}> is not a number", name, raw, el.name),
                path,
            )
        }),
    }
}

fn attr_true(el: &Element, name: &str) -> bool {
    el.attr(name).and_then(parse_flag).unwrap_or(false)
}

fn child_text(el: &Element, name: &str) -> Option<String> {
    el.child(name)
        .map(|c| c.text().trim().to_string())
        .filter(|t| !t.is_empty())
}

fn ident_of(el: &Element) -> String {
    el.attr("ident")
        .or_else(|| el.attr("identifier"))
        .unwrap_or_default()
        .to_string()
}

fn expect_root(root: &Element, accepted: &[&str]) -> Result<()> {
    if accepted.contains(&root.local_name()) {
        Ok(())
    } else {
        Err(MigrationError::parsing_at(
            format!(
                "unexpected root element <{}>; expected one of: {}",
                root.name,
                accepted.join(", ")
            ),
            root.name.clone(),
        ))
    }
}

// ---------------------------------------------------------------------------
// shared structures

/// The metadata child of `el`, under either generation's name.
fn metadata_of(el: &Element) -> Option<Metadata> {
    el.child("metadata")
        .or_else(|| el.child("qti-metadata"))
        .map(read_metadata)
}

fn read_metadata(el: &Element) -> Metadata {
    let container = el
        .child("qtimetadata")
        .or_else(|| el.child("qti-metadata-container"));

    Metadata {
        schema: child_text(el, "schema"),
        schema_version: child_text(el, "schemaversion"),
        qti_metadata: container.map(read_qti_metadata),
        lom: el.child("lom").cloned(),
    }
}

fn read_qti_metadata(el: &Element) -> QtiMetadata {
    let flag = |name: &str| {
        child_text(el, name)
            .and_then(|v| parse_flag(&v))
            .unwrap_or(false)
    };

    QtiMetadata {
        time_dependent: flag("timedependent"),
        composite: flag("composite"),
        interaction_type: child_text(el, "interactiontype"),
        feedback_type: child_text(el, "feedbacktype"),
        solution_available: flag("solutionavailable"),
        scoring_mode: child_text(el, "scoringmode"),
        tool_name: child_text(el, "toolname"),
        tool_version: child_text(el, "toolversion"),
        tool_vendor: child_text(el, "toolvendor"),
    }
}

fn read_material(el: &Element, path: &str) -> Result<Material> {
    let path = format!("{}/material", path);
    let mut content = Vec::new();

    for child in el.elements() {
        match child.local_name() {
            "mattext" | "matemtext" => content.push(MaterialContent::Text(MatText {
                text_type: attr_opt(child, "texttype"),
                charset: attr_opt(child, "charset"),
                content: child.text(),
            })),
            "matimage" => content.push(MaterialContent::Image(MatImage {
                image_type: attr_opt(child, "imagetype"),
                uri: attr_string(child, "uri"),
                width: attr_u32(child, "width", &path)?,
                height: attr_u32(child, "height", &path)?,
            })),
            "mataudio" => content.push(MaterialContent::Audio(MatMedia {
                media_type: attr_opt(child, "audiotype"),
                uri: attr_string(child, "uri"),
                width: 0,
                height: 0,
            })),
            "matvideo" => content.push(MaterialContent::Video(MatMedia {
                media_type: attr_opt(child, "videotype"),
                uri: attr_string(child, "uri"),
                width: attr_u32(child, "width", &path)?,
                height: attr_u32(child, "height", &path)?,
            })),
            _ => {}
        }
    }

    Ok(Material {
        label: attr_opt(el, "label"),
        content,
    })
}

fn read_rubric(el: &Element) -> RubricBlock {
    RubricBlock {
        use_: attr_opt(el, "use"),
        view: attr_opt(el, "view").map(|v| View::parse(&v)),
        content: el.inner_xml(),
    }
}

fn read_objectives(el: &Element, path: &str) -> Result<Vec<Objective>> {
    let Some(objectives) = el.child("objectives") else {
        return Ok(Vec::new());
    };
    objectives
        .children_named("objective")
        .map(|obj| {
            Ok(Objective {
                title: attr_opt(obj, "title"),
                material: obj.child("material").map(|m| read_material(m, path)).transpose()?,
            })
        })
        .collect()
}

fn read_item_feedback(el: &Element, path: &str) -> Result<ItemFeedback> {
    let path = format!("{}/itemfeedback[@ident='{}']", path, ident_of(el));
    let mut flow_mat = Vec::new();
    for flow in el.children_named("flow_mat") {
        for material in flow.children_named("material") {
            flow_mat.push(read_material(material, &path)?);
        }
    }

    Ok(ItemFeedback {
        ident: ident_of(el),
        title: attr_opt(el, "title"),
        flow_mat,
        material: el.child("material").map(|m| read_material(m, &path)).transpose()?,
    })
}

/// 2.x `modalFeedback` carried as a single html text material.
fn read_modal_feedback21(el: &Element) -> ItemFeedback {
    ItemFeedback {
        ident: ident_of(el),
        title: attr_opt(el, "title"),
        flow_mat: Vec::new(),
        material: Some(Material {
            label: None,
            content: vec![MaterialContent::Text(MatText {
                text_type: Some("text/html".to_string()),
                charset: None,
                content: el.inner_xml(),
            })],
        }),
    }
}

// ---------------------------------------------------------------------------
// QTI 1.2

pub fn read_qti12(root: &Element) -> Result<Document12> {
    expect_root(root, &["questestinterop"])?;

    Ok(Document12 {
        version: attr_opt(root, "version"),
        items: root
            .children_named("item")
            .map(|item| read_item12(item, "questestinterop"))
            .collect::<Result<_>>()?,
        assessment: root
            .child("assessment")
            .map(read_assessment12)
            .transpose()?,
        metadata: metadata_of(root),
    })
}

fn read_assessment12(el: &Element) -> Result<Assessment12> {
    let path = format!("assessment[@ident='{}']", ident_of(el));
    let sections = el
        .children_named("section")
        .map(|section| {
            let section_path = format!("{}/section[@ident='{}']", path, ident_of(section));
            Ok(Section12 {
                ident: ident_of(section),
                title: attr_string(section, "title"),
                items: section
                    .children_named("item")
                    .map(|item| read_item12(item, &section_path))
                    .collect::<Result<_>>()?,
                metadata: metadata_of(section),
            })
        })
        .collect::<Result<_>>()?;

    Ok(Assessment12 {
        ident: ident_of(el),
        title: attr_string(el, "title"),
        sections,
        metadata: metadata_of(el),
        objectives: read_objectives(el, &path)?,
        rubric: el.child("rubricBlock").map(read_rubric),
    })
}

fn read_item12(el: &Element, parent: &str) -> Result<Item12> {
    let path = format!("{}/item[@ident='{}']", parent, ident_of(el));

    Ok(Item12 {
        ident: ident_of(el),
        title: attr_string(el, "title"),
        max_attempts: attr_u32(el, "maxattempts", &path)?,
        metadata: metadata_of(el),
        presentation: el
            .child("presentation")
            .map(|p| read_presentation(p, &path))
            .transpose()?,
        resprocessing: el.child("resprocessing").map(read_resprocessing),
        feedback: el
            .children_named("itemfeedback")
            .map(|fb| read_item_feedback(fb, &path))
            .collect::<Result<_>>()?,
        rubric: el.child("rubricBlock").map(read_rubric),
    })
}

fn response_kind(name: &str) -> Option<ResponseKind> {
    match name {
        "response_lid" => Some(ResponseKind::Lid),
        "response_str" => Some(ResponseKind::Str),
        "response_num" => Some(ResponseKind::Num),
        _ => None,
    }
}

fn read_presentation(el: &Element, path: &str) -> Result<Presentation> {
    let path = format!("{}/presentation", path);
    let mut presentation = Presentation {
        label: attr_opt(el, "label"),
        ..Default::default()
    };

    presentation.children = read_presentation_children(el, &path)?;
    Ok(presentation)
}

fn read_flow(el: &Element, path: &str) -> Result<Flow> {
    let path = format!("{}/flow", path);
    let mut flow = Flow {
        class: attr_opt(el, "class"),
        ..Default::default()
    };

    flow.children = read_presentation_children(el, &path)?;
    Ok(flow)
}

/// Materials, responses and flows in document order; anything else is skipped.
fn read_presentation_children(el: &Element, path: &str) -> Result<Vec<PresentationChild>> {
    let mut children = Vec::new();
    for child in el.elements() {
        let entry = match child.local_name() {
            "material" => PresentationChild::Material(read_material(child, path)?),
            "flow" => PresentationChild::Flow(read_flow(child, path)?),
            name => match response_kind(name) {
                Some(kind) => PresentationChild::Response(read_response(child, kind, path)?),
                None => continue,
            },
        };
        children.push(entry);
    }
    Ok(children)
}

fn read_response(el: &Element, kind: ResponseKind, path: &str) -> Result<Response> {
    let path = format!("{}/{}[@ident='{}']", path, kind.element_name(), ident_of(el));

    let render = if let Some(choice) = el.child("render_choice") {
        Some(Render::Choice(read_render_choice(choice, &path)?))
    } else if let Some(fib) = el.child("render_fib") {
        Some(Render::Fib(RenderFib {
            encoding: attr_opt(fib, "encoding"),
            fib_type: attr_opt(fib, "fibtype"),
            rows: attr_u32(fib, "rows", &path)?,
            max_chars: attr_u32(fib, "maxchars", &path)?,
            prompt: attr_opt(fib, "prompt"),
            columns: attr_u32(fib, "columns", &path)?,
        }))
    } else {
        None
    };

    Ok(Response {
        kind,
        ident: ident_of(el),
        rcardinality: attr_opt(el, "rcardinality"),
        rtiming: attr_opt(el, "rtiming"),
        render,
    })
}

fn read_render_choice(el: &Element, path: &str) -> Result<RenderChoice> {
    let path = format!("{}/render_choice", path);
    let mut labels = Vec::new();
    // labels may sit directly under render_choice or inside flow_label wrappers
    for child in el.elements() {
        match child.local_name() {
            "response_label" => labels.push(read_response_label(child, &path)?),
            "flow_label" => {
                for label in child.children_named("response_label") {
                    labels.push(read_response_label(label, &path)?);
                }
            }
            _ => {}
        }
    }

    Ok(RenderChoice {
        // kept verbatim; only an exact "yes" enables shuffling
        shuffle: el.attr("shuffle").map(str::to_string),
        min_number: attr_u32(el, "minnumber", &path)?,
        max_number: attr_u32(el, "maxnumber", &path)?,
        labels,
    })
}

fn read_response_label(el: &Element, path: &str) -> Result<ResponseLabel> {
    let path = format!("{}/response_label[@ident='{}']", path, ident_of(el));
    Ok(ResponseLabel {
        ident: ident_of(el),
        rarea: attr_opt(el, "rarea"),
        rrange: attr_opt(el, "rrange"),
        material: el.child("material").map(|m| read_material(m, &path)).transpose()?,
    })
}

fn read_resprocessing(el: &Element) -> ResProcessing {
    let outcomes = el
        .child("outcomes")
        .map(|o| {
            o.children_named("decvar")
                .map(|d| DecVar {
                    var_name: attr_opt(d, "varname").unwrap_or_else(|| "SCORE".to_string()),
                    var_type: attr_opt(d, "vartype"),
                    default_val: attr_opt(d, "defaultval"),
                    min_value: attr_opt(d, "minvalue"),
                    max_value: attr_opt(d, "maxvalue"),
                })
                .collect()
        })
        .unwrap_or_default();

    let conditions = el
        .children_named("respcondition")
        .map(read_respcondition)
        .collect();

    ResProcessing {
        score_model: attr_opt(el, "scoremodel"),
        outcomes,
        conditions,
    }
}

fn read_respcondition(el: &Element) -> RespCondition {
    RespCondition {
        title: attr_opt(el, "title"),
        continue_: attr_opt(el, "continue"),
        condition: el
            .child("conditionvar")
            .map(read_condition_list)
            .unwrap_or_default(),
        set_vars: el
            .children_named("setvar")
            .map(|s| SetVar {
                action: attr_string(s, "action"),
                var_name: attr_opt(s, "varname"),
                value: s.text().trim().to_string(),
            })
            .collect(),
        display_feedback: el
            .children_named("displayfeedback")
            .map(|d| DisplayFeedback {
                feedback_type: attr_opt(d, "feedbacktype"),
                link_ref_id: attr_string(d, "linkrefid"),
            })
            .collect(),
    }
}

fn read_condition_list(el: &Element) -> Vec<ConditionExpression> {
    el.elements().filter_map(read_condition).collect()
}

fn read_condition(el: &Element) -> Option<ConditionExpression> {
    let test = |qualifier: &str| VarTest {
        resp_ident: attr_string(el, "respident"),
        qualifier: attr_opt(el, qualifier),
        value: el.text().trim().to_string(),
    };

    let expr = match el.local_name() {
        "varequal" => ConditionExpression::VarEqual(test("case")),
        "varlt" => ConditionExpression::VarLt(test("case")),
        "varlte" => ConditionExpression::VarLte(test("case")),
        "vargt" => ConditionExpression::VarGt(test("case")),
        "vargte" => ConditionExpression::VarGte(test("case")),
        "varsubset" => ConditionExpression::VarSubset(test("setmatch")),
        "varinside" => ConditionExpression::VarInside(test("areamatch")),
        "varsubstring" => ConditionExpression::VarSubstring(test("case")),
        "not" => ConditionExpression::Not(read_condition_list(el)),
        "and" => ConditionExpression::And(read_condition_list(el)),
        "or" => ConditionExpression::Or(read_condition_list(el)),
        _ => return None,
    };
    Some(expr)
}

// ---------------------------------------------------------------------------
// QTI 2.1 / 2.2

pub fn read_qti21(root: &Element) -> Result<Document21> {
    expect_root(root, &["questestinterop", "assessmentItem"])?;

    if root.local_name() == "assessmentItem" {
        return Ok(Document21 {
            version: attr_opt(root, "version"),
            items: vec![read_item21(root, "")?],
            assessment: None,
            metadata: None,
        });
    }

    Ok(Document21 {
        version: attr_opt(root, "version"),
        items: root
            .children_named("item")
            .map(|item| read_item21(item, "questestinterop"))
            .collect::<Result<_>>()?,
        assessment: root
            .child("assessment")
            .map(read_assessment21)
            .transpose()?,
        metadata: metadata_of(root),
    })
}

fn read_assessment21(el: &Element) -> Result<Assessment21> {
    let path = format!("assessment[@ident='{}']", ident_of(el));
    let sections = el
        .children_named("section")
        .map(|section| {
            let section_path = format!("{}/section[@ident='{}']", path, ident_of(section));
            Ok(Section21 {
                ident: ident_of(section),
                title: attr_string(section, "title"),
                items: section
                    .children_named("item")
                    .map(|item| read_item21(item, &section_path))
                    .collect::<Result<_>>()?,
                metadata: metadata_of(section),
            })
        })
        .collect::<Result<_>>()?;

    Ok(Assessment21 {
        ident: ident_of(el),
        title: attr_string(el, "title"),
        sections,
        metadata: metadata_of(el),
        objectives: read_objectives(el, &path)?,
        rubric: el.child("rubricBlock").map(read_rubric),
    })
}

fn read_item21(el: &Element, parent: &str) -> Result<Item21> {
    let path = if parent.is_empty() {
        format!("{}[@identifier='{}']", el.local_name(), ident_of(el))
    } else {
        format!("{}/item[@ident='{}']", parent, ident_of(el))
    };

    let mut feedback: Vec<ItemFeedback> = el
        .children_named("itemfeedback")
        .map(|fb| read_item_feedback(fb, &path))
        .collect::<Result<_>>()?;
    feedback.extend(el.children_named("modalFeedback").map(read_modal_feedback21));

    Ok(Item21 {
        ident: ident_of(el),
        title: attr_string(el, "title"),
        max_attempts: attr_u32(el, "maxattempts", &path)?,
        adaptive: attr_opt(el, "adaptive"),
        time_dependent: attr_opt(el, "timeDependent"),
        metadata: metadata_of(el),
        presentation: el
            .child("presentation")
            .map(|p| read_presentation(p, &path))
            .transpose()?,
        resprocessing: el.child("resprocessing").map(read_resprocessing),
        item_body: el
            .child("itemBody")
            .map(|b| read_item_body21(b, &path))
            .transpose()?,
        response_declarations: el
            .children_named("responseDeclaration")
            .map(|d| read_response_declaration21(d, &path))
            .collect::<Result<_>>()?,
        outcome_declarations: el
            .children_named("outcomeDeclaration")
            .map(|d| OutcomeDeclaration21 {
                identifier: attr_string(d, "identifier"),
                cardinality: attr_string(d, "cardinality"),
                base_type: attr_opt(d, "baseType"),
                default_value: d.child("defaultValue").and_then(|v| child_text(v, "value")),
            })
            .collect(),
        template_declarations: el
            .children_named("templateDeclaration")
            .map(|d| TemplateDeclaration21 {
                identifier: attr_string(d, "identifier"),
                cardinality: attr_string(d, "cardinality"),
                base_type: attr_opt(d, "baseType"),
                param_variable: attr_true(d, "paramVariable"),
                math_variable: attr_true(d, "mathVariable"),
                default_value: d.child("defaultValue").and_then(|v| child_text(v, "value")),
            })
            .collect(),
        feedback,
        rubric: el.child("rubricBlock").map(read_rubric),
    })
}

fn read_item_body21(el: &Element, path: &str) -> Result<ItemBody21> {
    let path = format!("{}/itemBody", path);
    let mut blocks = Vec::new();

    for child in el.elements() {
        let block = match child.local_name() {
            "p" => BodyBlock21::Paragraph(child.inner_xml()),
            "div" => BodyBlock21::Div {
                class: attr_opt(child, "class"),
                content: child.inner_xml(),
            },
            "choiceInteraction" => BodyBlock21::Choice(ChoiceInteraction21 {
                response_identifier: attr_string(child, "responseIdentifier"),
                shuffle: attr_true(child, "shuffle"),
                max_choices: attr_u32(child, "maxChoices", &path)?,
                min_choices: attr_u32(child, "minChoices", &path)?,
                prompt: child.child("prompt").map(Element::inner_xml),
                choices: child
                    .children_named("simpleChoice")
                    .map(|c| SimpleChoice21 {
                        identifier: attr_string(c, "identifier"),
                        fixed: attr_true(c, "fixed"),
                        content: c.inner_xml(),
                    })
                    .collect(),
            }),
            "textEntryInteraction" => BodyBlock21::TextEntry(TextEntryInteraction21 {
                response_identifier: attr_string(child, "responseIdentifier"),
                expected_length: attr_u32(child, "expectedLength", &path)?,
                pattern_mask: attr_opt(child, "patternMask"),
                placeholder_text: attr_opt(child, "placeholderText"),
            }),
            "extendedTextInteraction" => BodyBlock21::ExtendedText(ExtendedTextInteraction21 {
                response_identifier: attr_string(child, "responseIdentifier"),
                min_strings: attr_u32(child, "minStrings", &path)?,
                max_strings: attr_u32(child, "maxStrings", &path)?,
                expected_lines: attr_u32(child, "expectedLines", &path)?,
                expected_length: attr_u32(child, "expectedLength", &path)?,
                prompt: child.child("prompt").map(Element::inner_xml),
            }),
            other => {
                warn!(element = other, path = %path, "skipping unsupported item body element");
                continue;
            }
        };
        blocks.push(block);
    }
    Ok(ItemBody21 { blocks })
}

fn read_response_declaration21(el: &Element, path: &str) -> Result<ResponseDeclaration21> {
    let path = format!("{}/responseDeclaration[@identifier='{}']", path, attr_string(el, "identifier"));
    let mapping = match el.child("mapping") {
        Some(m) => Some(Mapping21 {
            lower_bound: attr_f64(m, "lowerBound", &path)?,
            upper_bound: attr_f64(m, "upperBound", &path)?,
            default_value: attr_f64(m, "defaultValue", &path)?.unwrap_or(0.0),
            entries: m
                .children_named("mapEntry")
                .map(|e| {
                    Ok(MapEntry21 {
                        map_key: attr_string(e, "mapKey"),
                        mapped_value: attr_f64(e, "mappedValue", &path)?.unwrap_or(0.0),
                    })
                })
                .collect::<Result<_>>()?,
        }),
        None => None,
    };

    Ok(ResponseDeclaration21 {
        identifier: attr_string(el, "identifier"),
        cardinality: attr_string(el, "cardinality"),
        base_type: attr_opt(el, "baseType"),
        correct_response: el
            .child("correctResponse")
            .map(|c| c.children_named("value").map(|v| v.text().trim().to_string()).collect())
            .unwrap_or_default(),
        mapping,
    })
}

// ---------------------------------------------------------------------------
// QTI 3.0

pub fn read_qti30(root: &Element) -> Result<Document30> {
    expect_root(
        root,
        &["qti-assessment-item", "qti-assessment-test", "questestinterop"],
    )?;

    if root.local_name() == "qti-assessment-item" {
        return Ok(Document30::Item(read_item30(root, "")?));
    }

    let assessment = match root.child("assessment") {
        Some(el) => {
            let path = format!("assessment[@ident='{}']", ident_of(el));
            let sections = el
                .children_named("section")
                .map(|section| {
                    let section_path = format!("{}/section[@ident='{}']", path, ident_of(section));
                    Ok(Section30 {
                        ident: ident_of(section),
                        title: attr_string(section, "title"),
                        items: section
                            .children_named("qti-assessment-item")
                            .map(|item| read_item30(item, &section_path))
                            .collect::<Result<_>>()?,
                        metadata: metadata_of(section),
                    })
                })
                .collect::<Result<_>>()?;
            Some(Assessment30 {
                ident: ident_of(el),
                title: attr_string(el, "title"),
                sections,
                metadata: metadata_of(el),
                objectives: read_objectives(el, &path)?,
                rubric: el
                    .child("qti-rubric-block")
                    .or_else(|| el.child("rubricBlock"))
                    .map(read_rubric),
            })
        }
        None => None,
    };

    Ok(Document30::Package(Package30 {
        version: attr_opt(root, "version").unwrap_or_else(|| "3.0".to_string()),
        items: root
            .children_named("qti-assessment-item")
            .map(|item| read_item30(item, &root.name))
            .collect::<Result<_>>()?,
        assessment,
        metadata: metadata_of(root),
    }))
}

fn nonzero(value: u32) -> Option<u32> {
    (value > 0).then_some(value)
}

fn read_item30(el: &Element, parent: &str) -> Result<Item30> {
    let path = if parent.is_empty() {
        format!("qti-assessment-item[@identifier='{}']", ident_of(el))
    } else {
        format!("{}/qti-assessment-item[@identifier='{}']", parent, ident_of(el))
    };

    Ok(Item30 {
        identifier: ident_of(el),
        title: attr_string(el, "title"),
        adaptive: attr_true(el, "adaptive"),
        time_dependent: attr_true(el, "time-dependent"),
        metadata: metadata_of(el),
        response_declarations: el
            .children_named("qti-response-declaration")
            .map(|d| read_response_declaration30(d, &path))
            .collect::<Result<_>>()?,
        outcome_declarations: el
            .children_named("qti-outcome-declaration")
            .map(|d| OutcomeDeclaration30 {
                identifier: attr_string(d, "identifier"),
                cardinality: attr_string(d, "cardinality"),
                base_type: attr_opt(d, "base-type"),
                default_value: d
                    .child("qti-default-value")
                    .and_then(|v| child_text(v, "qti-value")),
            })
            .collect(),
        template_declarations: el
            .children_named("qti-template-declaration")
            .map(|d| TemplateDeclaration30 {
                identifier: attr_string(d, "identifier"),
                cardinality: attr_string(d, "cardinality"),
                base_type: attr_opt(d, "base-type"),
                param_variable: attr_true(d, "param-variable"),
                math_variable: attr_true(d, "math-variable"),
                default_value: d
                    .child("qti-default-value")
                    .and_then(|v| child_text(v, "qti-value")),
            })
            .collect(),
        item_body: el
            .child("qti-item-body")
            .map(|b| read_item_body30(b, &path))
            .transpose()?,
        modal_feedback: el
            .children_named("qti-modal-feedback")
            .map(|f| ModalFeedback30 {
                identifier: attr_string(f, "identifier"),
                title: attr_opt(f, "title"),
                outcome_identifier: attr_opt(f, "outcome-identifier"),
                show_hide: attr_opt(f, "show-hide"),
                content: f.inner_xml(),
            })
            .collect(),
        rubric: el.child("qti-rubric-block").map(read_rubric),
    })
}

fn read_item_body30(el: &Element, path: &str) -> Result<ItemBody30> {
    let path = format!("{}/qti-item-body", path);
    let mut blocks = Vec::new();

    for child in el.elements() {
        let block = match child.local_name() {
            "p" => BodyBlock30::Paragraph(child.inner_xml()),
            "div" => BodyBlock30::Div {
                class: attr_opt(child, "data-qti-class").or_else(|| attr_opt(child, "class")),
                content: child.inner_xml(),
            },
            "qti-choice-interaction" => BodyBlock30::Choice(ChoiceInteraction30 {
                response_identifier: attr_string(child, "response-identifier"),
                shuffle: attr_true(child, "shuffle"),
                max_choices: nonzero(attr_u32(child, "max-choices", &path)?),
                min_choices: nonzero(attr_u32(child, "min-choices", &path)?),
                prompt: child.child("qti-prompt").map(Element::inner_xml),
                choices: child
                    .children_named("qti-simple-choice")
                    .map(|c| SimpleChoice30 {
                        identifier: attr_string(c, "identifier"),
                        fixed: attr_true(c, "fixed"),
                        content: c.inner_xml(),
                    })
                    .collect(),
            }),
            "qti-text-entry-interaction" => BodyBlock30::TextEntry(TextEntryInteraction30 {
                response_identifier: attr_string(child, "response-identifier"),
                expected_length: nonzero(attr_u32(child, "expected-length", &path)?),
                pattern_mask: attr_opt(child, "pattern-mask"),
                placeholder_text: attr_opt(child, "placeholder-text"),
            }),
            "qti-extended-text-interaction" => {
                BodyBlock30::ExtendedText(ExtendedTextInteraction30 {
                    response_identifier: attr_string(child, "response-identifier"),
                    min_strings: nonzero(attr_u32(child, "min-strings", &path)?),
                    max_strings: nonzero(attr_u32(child, "max-strings", &path)?),
                    expected_lines: nonzero(attr_u32(child, "expected-lines", &path)?),
                    expected_length: nonzero(attr_u32(child, "expected-length", &path)?),
                    prompt: child.child("qti-prompt").map(Element::inner_xml),
                })
            }
            other => {
                warn!(element = other, path = %path, "skipping unsupported item body element");
                continue;
            }
        };
        blocks.push(block);
    }
    Ok(ItemBody30 { blocks })
}

fn read_response_declaration30(el: &Element, path: &str) -> Result<ResponseDeclaration30> {
    let path = format!(
        "{}/qti-response-declaration[@identifier='{}']",
        path,
        attr_string(el, "identifier")
    );
    let mapping = match el.child("qti-mapping") {
        Some(m) => Some(Mapping30 {
            lower_bound: attr_f64(m, "lower-bound", &path)?,
            upper_bound: attr_f64(m, "upper-bound", &path)?,
            default_value: attr_f64(m, "default-value", &path)?.unwrap_or(0.0),
            entries: m
                .children_named("qti-map-entry")
                .map(|e| {
                    Ok(MapEntry30 {
                        map_key: attr_string(e, "map-key"),
                        mapped_value: attr_f64(e, "mapped-value", &path)?.unwrap_or(0.0),
                    })
                })
                .collect::<Result<_>>()?,
        }),
        None => None,
    };

    Ok(ResponseDeclaration30 {
        identifier: attr_string(el, "identifier"),
        cardinality: attr_string(el, "cardinality"),
        base_type: attr_opt(el, "base-type"),
        correct_response: el
            .child("qti-correct-response")
            .map(|c| {
                c.children_named("qti-value")
                    .map(|v| v.text().trim().to_string())
                    .collect()
            })
            .unwrap_or_default(),
        mapping,
    })
}
