//! Serializes the 2.1 and 3.0 document models into element trees.

use super::Element;
use crate::models::common::{
    MatImage, MatMedia, MatText, Material, MaterialContent, Metadata, Objective, QtiMetadata,
    RubricBlock,
};
use crate::models::qti12::ItemFeedback;
use crate::models::qti21::{
    Assessment21, BodyBlock21, Document21, Item21, OutcomeDeclaration21, ResponseDeclaration21,
    TemplateDeclaration21,
};
use crate::models::qti30::{
    Assessment30, BodyBlock30, Document30, Item30, ModalFeedback30, OutcomeDeclaration30,
    Package30, ResponseDeclaration30, TemplateDeclaration30, QTI30_NAMESPACE,
};
use crate::transformation_rule::{translate_view, ElementKind, InteractionKind};

/// Which generation's element names to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Vocabulary {
    Mid,
    New,
}

impl Vocabulary {
    fn name(self, kind: ElementKind) -> &'static str {
        match self {
            Vocabulary::Mid => kind.mid_name(),
            Vocabulary::New => kind.new_name(),
        }
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn nonzero(value: u32) -> Option<u32> {
    (value > 0).then_some(value)
}

fn nonzero_f64(value: f64) -> Option<f64> {
    (value != 0.0).then_some(value)
}

fn text_element(name: &str, value: &str) -> Element {
    Element::new(name).with_text(value)
}

// ---------------------------------------------------------------------------
// shared structures

fn write_metadata(meta: &Metadata, vocab: Vocabulary) -> Element {
    let mut el = Element::new(vocab.name(ElementKind::Metadata));
    if let Some(schema) = &meta.schema {
        el.push_child(text_element("schema", schema));
    }
    if let Some(version) = &meta.schema_version {
        el.push_child(text_element("schemaversion", version));
    }
    if let Some(lom) = &meta.lom {
        el.push_child(lom.clone());
    }
    if let Some(qti) = &meta.qti_metadata {
        el.push_child(write_qti_metadata(qti, vocab));
    }
    el
}

fn write_qti_metadata(meta: &QtiMetadata, vocab: Vocabulary) -> Element {
    let mut el = Element::new(vocab.name(ElementKind::QtiMetadata));
    let flags = [
        ("timedependent", meta.time_dependent),
        ("composite", meta.composite),
    ];
    for (name, value) in flags {
        if value {
            el.push_child(text_element(name, "true"));
        }
    }
    let fields = [
        ("interactiontype", &meta.interaction_type),
        ("feedbacktype", &meta.feedback_type),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            el.push_child(text_element(name, value));
        }
    }
    if meta.solution_available {
        el.push_child(text_element("solutionavailable", "true"));
    }
    let fields = [
        ("scoringmode", &meta.scoring_mode),
        ("toolname", &meta.tool_name),
        ("toolversion", &meta.tool_version),
        ("toolvendor", &meta.tool_vendor),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            el.push_child(text_element(name, value));
        }
    }
    el
}

fn write_material(material: &Material) -> Element {
    let mut el = Element::new("material").with_opt_attr("label", material.label.as_deref());
    for content in &material.content {
        el.push_child(match content {
            MaterialContent::Text(text) => write_mattext(text),
            MaterialContent::Image(image) => write_matimage(image),
            MaterialContent::Audio(audio) => write_media("mataudio", "audiotype", audio),
            MaterialContent::Video(video) => write_media("matvideo", "videotype", video),
        });
    }
    el
}

fn write_mattext(text: &MatText) -> Element {
    Element::new("mattext")
        .with_opt_attr("texttype", text.text_type.as_deref())
        .with_opt_attr("charset", text.charset.as_deref())
        .with_text(text.content.as_str())
}

fn write_matimage(image: &MatImage) -> Element {
    Element::new("matimage")
        .with_opt_attr("imagetype", image.image_type.as_deref())
        .with_attr("uri", image.uri.as_str())
        .with_opt_attr("width", nonzero(image.width))
        .with_opt_attr("height", nonzero(image.height))
}

fn write_media(name: &str, type_attr: &str, media: &MatMedia) -> Element {
    Element::new(name)
        .with_opt_attr(type_attr, media.media_type.as_deref())
        .with_attr("uri", media.uri.as_str())
        .with_opt_attr("width", nonzero(media.width))
        .with_opt_attr("height", nonzero(media.height))
}

fn write_objectives(objectives: &[Objective]) -> Option<Element> {
    if objectives.is_empty() {
        return None;
    }
    let mut el = Element::new("objectives");
    for objective in objectives {
        let mut obj = Element::new("objective").with_opt_attr("title", objective.title.as_deref());
        if let Some(material) = &objective.material {
            obj.push_child(write_material(material));
        }
        el.push_child(obj);
    }
    Some(el)
}

fn write_rubric(rubric: &RubricBlock, name: &str, vocab: Vocabulary) -> Element {
    let view = rubric.view.as_ref().map(|view| match vocab {
        Vocabulary::Mid => view.mid_name(),
        Vocabulary::New => translate_view(view),
    });
    Element::new(name)
        .with_opt_attr("use", rubric.use_.as_deref())
        .with_opt_attr("view", view)
        .with_raw(rubric.content.as_str())
}

// ---------------------------------------------------------------------------
// QTI 2.1

/// Root `questestinterop` element for a 2.1 document.
pub fn write_qti21(doc: &Document21) -> Element {
    let mut root = Element::new("questestinterop")
        .with_attr("version", doc.version.as_deref().unwrap_or("2.1"));

    if let Some(meta) = &doc.metadata {
        root.push_child(write_metadata(meta, Vocabulary::Mid));
    }
    for item in &doc.items {
        root.push_child(write_item21(item));
    }
    if let Some(assessment) = &doc.assessment {
        root.push_child(write_assessment21(assessment));
    }
    root
}

fn write_assessment21(assessment: &Assessment21) -> Element {
    let mut el = Element::new(ElementKind::AssessmentTest.mid_name())
        .with_attr("ident", assessment.ident.as_str())
        .with_attr("title", assessment.title.as_str());

    if let Some(meta) = &assessment.metadata {
        el.push_child(write_metadata(meta, Vocabulary::Mid));
    }
    if let Some(objectives) = write_objectives(&assessment.objectives) {
        el.push_child(objectives);
    }
    if let Some(rubric) = &assessment.rubric {
        el.push_child(write_rubric(rubric, ElementKind::RubricBlock.mid_name(), Vocabulary::Mid));
    }
    for section in &assessment.sections {
        let mut sec = Element::new("section")
            .with_attr("ident", section.ident.as_str())
            .with_attr("title", section.title.as_str());
        if let Some(meta) = &section.metadata {
            sec.push_child(write_metadata(meta, Vocabulary::Mid));
        }
        for item in &section.items {
            sec.push_child(write_item21(item));
        }
        el.push_child(sec);
    }
    el
}

fn write_item21(item: &Item21) -> Element {
    let mut el = Element::new(ElementKind::AssessmentItem.mid_name())
        .with_attr("ident", item.ident.as_str())
        .with_attr("title", item.title.as_str())
        .with_opt_attr("maxattempts", nonzero(item.max_attempts))
        .with_opt_attr("adaptive", item.adaptive.as_deref())
        .with_opt_attr("timeDependent", item.time_dependent.as_deref());

    if let Some(meta) = &item.metadata {
        el.push_child(write_metadata(meta, Vocabulary::Mid));
    }
    if let Some(body) = &item.item_body {
        let mut body_el = Element::new(ElementKind::ItemBody.mid_name());
        for block in &body.blocks {
            body_el.push_child(write_block21(block));
        }
        el.push_child(body_el);
    }
    for decl in &item.response_declarations {
        el.push_child(write_response_declaration21(decl));
    }
    for decl in &item.outcome_declarations {
        el.push_child(write_outcome_declaration21(decl));
    }
    for decl in &item.template_declarations {
        el.push_child(write_template_declaration21(decl));
    }
    for feedback in &item.feedback {
        el.push_child(write_item_feedback(feedback));
    }
    if let Some(rubric) = &item.rubric {
        el.push_child(write_rubric(rubric, ElementKind::RubricBlock.mid_name(), Vocabulary::Mid));
    }
    el
}

fn write_block21(block: &BodyBlock21) -> Element {
    match block {
        BodyBlock21::Paragraph(content) => Element::new("p").with_raw(content.as_str()),
        BodyBlock21::Div { class, content } => Element::new("div")
            .with_opt_attr("class", class.as_deref())
            .with_raw(content.as_str()),
        BodyBlock21::Choice(choice) => {
            let mut el = Element::new(InteractionKind::Choice.mid_name())
                .with_attr("responseIdentifier", choice.response_identifier.as_str())
                .with_attr("shuffle", flag(choice.shuffle))
                .with_opt_attr("maxChoices", nonzero(choice.max_choices))
                .with_opt_attr("minChoices", nonzero(choice.min_choices));
            if let Some(prompt) = &choice.prompt {
                el.push_child(Element::new(ElementKind::Prompt.mid_name()).with_raw(prompt.as_str()));
            }
            for simple in &choice.choices {
                let mut choice_el = Element::new(ElementKind::SimpleChoice.mid_name())
                    .with_attr("identifier", simple.identifier.as_str());
                if simple.fixed {
                    choice_el.set_attr("fixed", "true");
                }
                el.push_child(choice_el.with_raw(simple.content.as_str()));
            }
            el
        }
        BodyBlock21::TextEntry(entry) => Element::new(InteractionKind::TextEntry.mid_name())
            .with_attr("responseIdentifier", entry.response_identifier.as_str())
            .with_opt_attr("expectedLength", nonzero(entry.expected_length))
            .with_opt_attr("patternMask", entry.pattern_mask.as_deref())
            .with_opt_attr("placeholderText", entry.placeholder_text.as_deref()),
        BodyBlock21::ExtendedText(text) => {
            let mut el = Element::new(InteractionKind::ExtendedText.mid_name())
                .with_attr("responseIdentifier", text.response_identifier.as_str())
                .with_opt_attr("minStrings", nonzero(text.min_strings))
                .with_opt_attr("maxStrings", nonzero(text.max_strings))
                .with_opt_attr("expectedLines", nonzero(text.expected_lines))
                .with_opt_attr("expectedLength", nonzero(text.expected_length));
            if let Some(prompt) = &text.prompt {
                el.push_child(Element::new(ElementKind::Prompt.mid_name()).with_raw(prompt.as_str()));
            }
            el
        }
    }
}

fn values(container: ElementKind, values: &[String], vocab: Vocabulary) -> Element {
    let mut el = Element::new(vocab.name(container));
    for value in values {
        el.push_child(text_element(vocab.name(ElementKind::Value), value));
    }
    el
}

fn write_response_declaration21(decl: &ResponseDeclaration21) -> Element {
    let mut el = Element::new(ElementKind::ResponseDeclaration.mid_name())
        .with_attr("identifier", decl.identifier.as_str())
        .with_attr("cardinality", decl.cardinality.as_str())
        .with_opt_attr("baseType", decl.base_type.as_deref());

    if !decl.correct_response.is_empty() {
        el.push_child(values(ElementKind::CorrectResponse, &decl.correct_response, Vocabulary::Mid));
    }
    if let Some(mapping) = &decl.mapping {
        let mut map_el = Element::new(ElementKind::Mapping.mid_name())
            .with_opt_attr("lowerBound", mapping.lower_bound)
            .with_opt_attr("upperBound", mapping.upper_bound)
            .with_opt_attr("defaultValue", nonzero_f64(mapping.default_value));
        for entry in &mapping.entries {
            map_el.push_child(
                Element::new(ElementKind::MapEntry.mid_name())
                    .with_attr("mapKey", entry.map_key.as_str())
                    .with_attr("mappedValue", entry.mapped_value.to_string()),
            );
        }
        el.push_child(map_el);
    }
    el
}

fn default_value(value: &Option<String>, vocab: Vocabulary) -> Option<Element> {
    value
        .as_ref()
        .map(|v| values(ElementKind::DefaultValue, std::slice::from_ref(v), vocab))
}

fn write_outcome_declaration21(decl: &OutcomeDeclaration21) -> Element {
    let mut el = Element::new(ElementKind::OutcomeDeclaration.mid_name())
        .with_attr("identifier", decl.identifier.as_str())
        .with_attr("cardinality", decl.cardinality.as_str())
        .with_opt_attr("baseType", decl.base_type.as_deref());
    if let Some(default) = default_value(&decl.default_value, Vocabulary::Mid) {
        el.push_child(default);
    }
    el
}

fn write_template_declaration21(decl: &TemplateDeclaration21) -> Element {
    let mut el = Element::new(ElementKind::TemplateDeclaration.mid_name())
        .with_attr("identifier", decl.identifier.as_str())
        .with_attr("cardinality", decl.cardinality.as_str())
        .with_opt_attr("baseType", decl.base_type.as_deref());
    if decl.param_variable {
        el.set_attr("paramVariable", "true");
    }
    if decl.math_variable {
        el.set_attr("mathVariable", "true");
    }
    if let Some(default) = default_value(&decl.default_value, Vocabulary::Mid) {
        el.push_child(default);
    }
    el
}

fn write_item_feedback(feedback: &ItemFeedback) -> Element {
    let mut el = Element::new(ElementKind::ItemFeedback.mid_name())
        .with_attr("ident", feedback.ident.as_str())
        .with_opt_attr("title", feedback.title.as_deref());
    if !feedback.flow_mat.is_empty() {
        let mut flow = Element::new("flow_mat");
        for material in &feedback.flow_mat {
            flow.push_child(write_material(material));
        }
        el.push_child(flow);
    }
    if let Some(material) = &feedback.material {
        el.push_child(write_material(material));
    }
    el
}

// ---------------------------------------------------------------------------
// QTI 3.0

/// Root element for a 3.0 document: a lone item or a package container.
pub fn write_qti30(doc: &Document30) -> Element {
    match doc {
        Document30::Item(item) => write_item30(item).with_attr("xmlns", QTI30_NAMESPACE),
        Document30::Package(package) => write_package30(package),
    }
}

fn write_package30(package: &Package30) -> Element {
    let root_name = if package.assessment.is_some() {
        ElementKind::AssessmentTest.new_name()
    } else {
        "questestinterop"
    };
    let mut root = Element::new(root_name)
        .with_attr("version", package.version.as_str())
        .with_attr("xmlns", QTI30_NAMESPACE);

    if let Some(meta) = &package.metadata {
        root.push_child(write_metadata(meta, Vocabulary::New));
    }
    for item in &package.items {
        root.push_child(write_item30(item));
    }
    if let Some(assessment) = &package.assessment {
        root.push_child(write_assessment30(assessment));
    }
    root
}

// Assessment and section keep the 2.1 layout and names.
fn write_assessment30(assessment: &Assessment30) -> Element {
    let mut el = Element::new(ElementKind::AssessmentTest.mid_name())
        .with_attr("ident", assessment.ident.as_str())
        .with_attr("title", assessment.title.as_str());

    if let Some(meta) = &assessment.metadata {
        el.push_child(write_metadata(meta, Vocabulary::New));
    }
    if let Some(objectives) = write_objectives(&assessment.objectives) {
        el.push_child(objectives);
    }
    if let Some(rubric) = &assessment.rubric {
        el.push_child(write_rubric(rubric, ElementKind::RubricBlock.new_name(), Vocabulary::New));
    }
    for section in &assessment.sections {
        let mut sec = Element::new("section")
            .with_attr("ident", section.ident.as_str())
            .with_attr("title", section.title.as_str());
        if let Some(meta) = &section.metadata {
            sec.push_child(write_metadata(meta, Vocabulary::New));
        }
        for item in &section.items {
            sec.push_child(write_item30(item));
        }
        el.push_child(sec);
    }
    el
}

fn write_item30(item: &Item30) -> Element {
    let mut el = Element::new(ElementKind::AssessmentItem.new_name())
        .with_attr("identifier", item.identifier.as_str())
        .with_attr("title", item.title.as_str())
        .with_attr("adaptive", flag(item.adaptive))
        .with_attr("time-dependent", flag(item.time_dependent));

    if let Some(meta) = &item.metadata {
        el.push_child(write_metadata(meta, Vocabulary::New));
    }
    for decl in &item.response_declarations {
        el.push_child(write_response_declaration30(decl));
    }
    for decl in &item.outcome_declarations {
        el.push_child(write_outcome_declaration30(decl));
    }
    for decl in &item.template_declarations {
        el.push_child(write_template_declaration30(decl));
    }
    if let Some(body) = &item.item_body {
        let mut body_el = Element::new(ElementKind::ItemBody.new_name());
        for block in &body.blocks {
            body_el.push_child(write_block30(block));
        }
        el.push_child(body_el);
    }
    for feedback in &item.modal_feedback {
        el.push_child(write_modal_feedback(feedback));
    }
    if let Some(rubric) = &item.rubric {
        el.push_child(write_rubric(rubric, ElementKind::RubricBlock.new_name(), Vocabulary::New));
    }
    el
}

fn write_block30(block: &BodyBlock30) -> Element {
    match block {
        BodyBlock30::Paragraph(content) => Element::new("p").with_raw(content.as_str()),
        BodyBlock30::Div { class, content } => Element::new("div")
            .with_opt_attr("data-qti-class", class.as_deref())
            .with_raw(content.as_str()),
        BodyBlock30::Choice(choice) => {
            let mut el = Element::new(InteractionKind::Choice.new_name())
                .with_attr("response-identifier", choice.response_identifier.as_str())
                .with_attr("shuffle", flag(choice.shuffle))
                .with_opt_attr("max-choices", choice.max_choices)
                .with_opt_attr("min-choices", choice.min_choices);
            if let Some(prompt) = &choice.prompt {
                el.push_child(Element::new(ElementKind::Prompt.new_name()).with_raw(prompt.as_str()));
            }
            for simple in &choice.choices {
                let mut choice_el = Element::new(ElementKind::SimpleChoice.new_name())
                    .with_attr("identifier", simple.identifier.as_str());
                if simple.fixed {
                    choice_el.set_attr("fixed", "true");
                }
                el.push_child(choice_el.with_raw(simple.content.as_str()));
            }
            el
        }
        BodyBlock30::TextEntry(entry) => Element::new(InteractionKind::TextEntry.new_name())
            .with_attr("response-identifier", entry.response_identifier.as_str())
            .with_opt_attr("expected-length", entry.expected_length)
            .with_opt_attr("pattern-mask", entry.pattern_mask.as_deref())
            .with_opt_attr("placeholder-text", entry.placeholder_text.as_deref()),
        BodyBlock30::ExtendedText(text) => {
            let mut el = Element::new(InteractionKind::ExtendedText.new_name())
                .with_attr("response-identifier", text.response_identifier.as_str())
                .with_opt_attr("min-strings", text.min_strings)
                .with_opt_attr("max-strings", text.max_strings)
                .with_opt_attr("expected-lines", text.expected_lines)
                .with_opt_attr("expected-length", text.expected_length);
            if let Some(prompt) = &text.prompt {
                el.push_child(Element::new(ElementKind::Prompt.new_name()).with_raw(prompt.as_str()));
            }
            el
        }
    }
}

fn write_response_declaration30(decl: &ResponseDeclaration30) -> Element {
    let mut el = Element::new(ElementKind::ResponseDeclaration.new_name())
        .with_attr("identifier", decl.identifier.as_str())
        .with_attr("cardinality", decl.cardinality.as_str())
        .with_opt_attr("base-type", decl.base_type.as_deref());

    if !decl.correct_response.is_empty() {
        el.push_child(values(ElementKind::CorrectResponse, &decl.correct_response, Vocabulary::New));
    }
    if let Some(mapping) = &decl.mapping {
        let mut map_el = Element::new(ElementKind::Mapping.new_name())
            .with_opt_attr("lower-bound", mapping.lower_bound)
            .with_opt_attr("upper-bound", mapping.upper_bound)
            .with_opt_attr("default-value", nonzero_f64(mapping.default_value));
        for entry in &mapping.entries {
            map_el.push_child(
                Element::new(ElementKind::MapEntry.new_name())
                    .with_attr("map-key", entry.map_key.as_str())
                    .with_attr("mapped-value", entry.mapped_value.to_string()),
            );
        }
        el.push_child(map_el);
    }
    el
}

fn write_outcome_declaration30(decl: &OutcomeDeclaration30) -> Element {
    let mut el = Element::new(ElementKind::OutcomeDeclaration.new_name())
        .with_attr("identifier", decl.identifier.as_str())
        .with_attr("cardinality", decl.cardinality.as_str())
        .with_opt_attr("base-type", decl.base_type.as_deref());
    if let Some(default) = default_value(&decl.default_value, Vocabulary::New) {
        el.push_child(default);
    }
    el
}

fn write_template_declaration30(decl: &TemplateDeclaration30) -> Element {
    let mut el = Element::new(ElementKind::TemplateDeclaration.new_name())
        .with_attr("identifier", decl.identifier.as_str())
        .with_attr("cardinality", decl.cardinality.as_str())
        .with_opt_attr("base-type", decl.base_type.as_deref());
    if decl.param_variable {
        el.set_attr("param-variable", "true");
    }
    if decl.math_variable {
        el.set_attr("math-variable", "true");
    }
    if let Some(default) = default_value(&decl.default_value, Vocabulary::New) {
        el.push_child(default);
    }
    el
}

fn write_modal_feedback(feedback: &ModalFeedback30) -> Element {
    Element::new(ElementKind::ItemFeedback.new_name())
        .with_attr("identifier", feedback.identifier.as_str())
        .with_opt_attr("title", feedback.title.as_deref())
        .with_opt_attr("outcome-identifier", feedback.outcome_identifier.as_deref())
        .with_opt_attr("show-hide", feedback.show_hide.as_deref())
        .with_raw(feedback.content.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::View;
    use crate::models::qti21::{ChoiceInteraction21, ItemBody21, SimpleChoice21};
    use crate::models::qti30::{ChoiceInteraction30, ItemBody30, Mapping30, MapEntry30};
    use crate::xml::{parse, reader, write_document};

    #[test]
    fn test_qti21_choice_item_round_trips_through_reader() {
        let doc = Document21 {
            version: Some("2.1".into()),
            items: vec![Item21 {
                ident: "Q1".into(),
                title: "Capital".into(),
                item_body: Some(ItemBody21 {
                    blocks: vec![
                        BodyBlock21::Paragraph("Pick <b>one</b>".into()),
                        BodyBlock21::Choice(ChoiceInteraction21 {
                            response_identifier: "RESP".into(),
                            shuffle: false,
                            max_choices: 1,
                            min_choices: 0,
                            prompt: None,
                            choices: vec![SimpleChoice21 {
                                identifier: "A".into(),
                                fixed: false,
                                content: "Paris".into(),
                            }],
                        }),
                    ],
                }),
                response_declarations: vec![ResponseDeclaration21 {
                    identifier: "RESP".into(),
                    cardinality: "single".into(),
                    base_type: Some("identifier".into()),
                    correct_response: vec!["A".into()],
                    mapping: None,
                }],
                ..Default::default()
            }],
            ..Default::default()
        };

        let xml = write_document(&write_qti21(&doc)).unwrap();
        assert!(xml.contains(r#"<choiceInteraction responseIdentifier="RESP" shuffle="false" maxChoices="1">"#));
        assert!(!xml.contains("minChoices"));

        let back = reader::read_qti21(&parse(&xml).unwrap()).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_qti30_single_item_root() {
        let item = Item30 {
            identifier: "X".into(),
            title: "T".into(),
            item_body: Some(ItemBody30 {
                blocks: vec![
                    BodyBlock30::Div {
                        class: Some("note".into()),
                        content: "n".into(),
                    },
                    BodyBlock30::Choice(ChoiceInteraction30 {
                        response_identifier: "R".into(),
                        shuffle: true,
                        max_choices: Some(2),
                        ..Default::default()
                    }),
                ],
            }),
            response_declarations: vec![ResponseDeclaration30 {
                identifier: "R".into(),
                cardinality: "multiple".into(),
                base_type: Some("directedPair".into()),
                correct_response: vec![],
                mapping: Some(Mapping30 {
                    lower_bound: Some(0.0),
                    upper_bound: None,
                    default_value: 0.0,
                    entries: vec![MapEntry30 {
                        map_key: "A B".into(),
                        mapped_value: 1.5,
                    }],
                }),
            }],
            rubric: Some(RubricBlock {
                use_: None,
                view: Some(View::TestConstructor),
                content: "notes".into(),
            }),
            ..Default::default()
        };

        let root = write_qti30(&Document30::Item(item.clone()));
        assert_eq!(root.name, "qti-assessment-item");
        assert_eq!(root.attr("xmlns"), Some(QTI30_NAMESPACE));
        assert_eq!(root.attr("adaptive"), Some("false"));
        assert_eq!(root.attr("time-dependent"), Some("false"));

        let xml = write_document(&root).unwrap();
        assert!(xml.contains(r#"<div data-qti-class="note">n</div>"#));
        assert!(xml.contains(r#"<qti-choice-interaction response-identifier="R" shuffle="true" max-choices="2"/>"#));
        assert!(xml.contains(r#"<qti-mapping lower-bound="0">"#));
        assert!(xml.contains(r#"<qti-map-entry map-key="A B" mapped-value="1.5"/>"#));
        assert!(xml.contains(r#"<qti-rubric-block view="test-constructor">notes</qti-rubric-block>"#));

        match reader::read_qti30(&parse(&xml).unwrap()).unwrap() {
            Document30::Item(back) => assert_eq!(back.item_body, item.item_body),
            other => panic!("expected single item, got {:?}", other),
        }
    }

    #[test]
    fn test_qti30_package_keeps_assessment_layout() {
        let doc = Document30::Package(Package30 {
            version: "3.0".into(),
            items: vec![],
            assessment: Some(Assessment30 {
                ident: "A1".into(),
                title: "Exam".into(),
                sections: vec![crate::models::qti30::Section30 {
                    ident: "S1".into(),
                    title: "Part".into(),
                    items: vec![Item30 {
                        identifier: "I1".into(),
                        ..Default::default()
                    }],
                    metadata: None,
                }],
                ..Default::default()
            }),
            metadata: None,
        });

        let root = write_qti30(&doc);
        assert_eq!(root.name, "qti-assessment-test");
        assert_eq!(root.attr("version"), Some("3.0"));
        let assessment = root.child("assessment").unwrap();
        assert_eq!(assessment.attr("ident"), Some("A1"));
        let section = assessment.child("section").unwrap();
        assert!(section.child("qti-assessment-item").is_some());
    }

    #[test]
    fn test_metadata_flags_written_only_when_set() {
        let meta = Metadata {
            schema: Some("IMS QTI".into()),
            schema_version: Some("3.0".into()),
            qti_metadata: Some(QtiMetadata {
                time_dependent: true,
                interaction_type: Some("qti-choice-interaction".into()),
                ..Default::default()
            }),
            lom: None,
        };
        let el = write_metadata(&meta, Vocabulary::New);
        assert_eq!(el.name, "qti-metadata");
        let container = el.child("qti-metadata-container").unwrap();
        assert_eq!(container.child("timedependent").unwrap().text(), "true");
        assert!(container.child("composite").is_none());
        assert_eq!(
            container.child("interactiontype").unwrap().text(),
            "qti-choice-interaction"
        );
    }

    #[test]
    fn test_item_feedback_materials() {
        let feedback = ItemFeedback {
            ident: "FB".into(),
            title: Some("Right".into()),
            flow_mat: vec![Material {
                label: None,
                content: vec![MaterialContent::Image(MatImage {
                    image_type: Some("image/png".into()),
                    uri: "ok.png".into(),
                    width: 10,
                    height: 0,
                })],
            }],
            material: None,
        };
        let el = write_item_feedback(&feedback);
        let image = el
            .child("flow_mat")
            .and_then(|f| f.child("material"))
            .and_then(|m| m.child("matimage"))
            .unwrap();
        assert_eq!(image.attr("width"), Some("10"));
        assert_eq!(image.attr("height"), None);
    }
}
