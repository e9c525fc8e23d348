//! QTI 1.2 document model, shaped to the legacy `questestinterop` vocabulary.
//!
//! Attribute values are kept as written (`"yes"`, `"no"`, raw type names);
//! normalization happens during canonicalization.

use super::common::{Material, Metadata, Objective, RubricBlock};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document12 {
    pub version: Option<String>,
    pub items: Vec<Item12>,
    pub assessment: Option<Assessment12>,
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assessment12 {
    pub ident: String,
    pub title: String,
    pub sections: Vec<Section12>,
    pub metadata: Option<Metadata>,
    pub objectives: Vec<Objective>,
    pub rubric: Option<RubricBlock>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section12 {
    pub ident: String,
    pub title: String,
    pub items: Vec<Item12>,
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Item12 {
    pub ident: String,
    pub title: String,
    pub max_attempts: u32,
    pub metadata: Option<Metadata>,
    pub presentation: Option<Presentation>,
    pub resprocessing: Option<ResProcessing>,
    pub feedback: Vec<ItemFeedback>,
    pub rubric: Option<RubricBlock>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Presentation {
    pub label: Option<String>,
    /// Materials, response widgets and flows as they appear in the document.
    pub children: Vec<PresentationChild>,
}

/// Nested layout container; may hold further flows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Flow {
    pub class: Option<String>,
    pub children: Vec<PresentationChild>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PresentationChild {
    Material(Material),
    Response(Response),
    Flow(Flow),
}

/// Which legacy response element declared the widget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseKind {
    #[default]
    Lid,
    Str,
    Num,
}

impl ResponseKind {
    pub fn element_name(&self) -> &'static str {
        match self {
            ResponseKind::Lid => "response_lid",
            ResponseKind::Str => "response_str",
            ResponseKind::Num => "response_num",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    pub kind: ResponseKind,
    pub ident: String,
    pub rcardinality: Option<String>,
    pub rtiming: Option<String>,
    pub render: Option<Render>,
}

/// Rendering widget; a `render_choice` takes precedence over `render_fib`.
#[derive(Debug, Clone, PartialEq)]
pub enum Render {
    Choice(RenderChoice),
    Fib(RenderFib),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderChoice {
    pub shuffle: Option<String>,
    pub min_number: u32,
    pub max_number: u32,
    pub labels: Vec<ResponseLabel>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseLabel {
    pub ident: String,
    pub rarea: Option<String>,
    pub rrange: Option<String>,
    pub material: Option<Material>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderFib {
    pub encoding: Option<String>,
    pub fib_type: Option<String>,
    pub rows: u32,
    pub max_chars: u32,
    pub prompt: Option<String>,
    pub columns: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResProcessing {
    pub score_model: Option<String>,
    pub outcomes: Vec<DecVar>,
    pub conditions: Vec<RespCondition>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecVar {
    pub var_name: String,
    pub var_type: Option<String>,
    pub default_val: Option<String>,
    pub min_value: Option<String>,
    pub max_value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RespCondition {
    pub title: Option<String>,
    pub continue_: Option<String>,
    /// Direct children of `conditionvar`, in document order.
    pub condition: Vec<ConditionExpression>,
    pub set_vars: Vec<SetVar>,
    pub display_feedback: Vec<DisplayFeedback>,
}

/// One test inside a `conditionvar`.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionExpression {
    VarEqual(VarTest),
    VarLt(VarTest),
    VarLte(VarTest),
    VarGt(VarTest),
    VarGte(VarTest),
    VarSubset(VarTest),
    VarInside(VarTest),
    VarSubstring(VarTest),
    Not(Vec<ConditionExpression>),
    And(Vec<ConditionExpression>),
    Or(Vec<ConditionExpression>),
}

impl ConditionExpression {
    /// True when an equality test appears anywhere below a combinator.
    pub fn has_nested_equality(&self) -> bool {
        match self {
            ConditionExpression::Not(inner)
            | ConditionExpression::And(inner)
            | ConditionExpression::Or(inner) => inner.iter().any(|expr| {
                matches!(expr, ConditionExpression::VarEqual(_)) || expr.has_nested_equality()
            }),
            _ => false,
        }
    }
}

/// Comparison of a response variable against a literal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VarTest {
    pub resp_ident: String,
    /// `case`, `setmatch` or `areamatch` qualifier, depending on the test.
    pub qualifier: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetVar {
    pub action: String,
    pub var_name: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayFeedback {
    pub feedback_type: Option<String>,
    pub link_ref_id: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemFeedback {
    pub ident: String,
    pub title: Option<String>,
    pub flow_mat: Vec<Material>,
    pub material: Option<Material>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn equal(resp: &str, value: &str) -> ConditionExpression {
        ConditionExpression::VarEqual(VarTest {
            resp_ident: resp.into(),
            qualifier: None,
            value: value.into(),
        })
    }

    #[test]
    fn test_nested_equality_detection() {
        assert!(!equal("R", "A").has_nested_equality());

        let nested = ConditionExpression::And(vec![equal("R", "A"), equal("R", "B")]);
        assert!(nested.has_nested_equality());

        let deep = ConditionExpression::Not(vec![ConditionExpression::Or(vec![equal("R", "C")])]);
        assert!(deep.has_nested_equality());

        let relational = ConditionExpression::And(vec![ConditionExpression::VarGt(VarTest {
            resp_ident: "R".into(),
            qualifier: None,
            value: "3".into(),
        })]);
        assert!(!relational.has_nested_equality());
    }

    #[test]
    fn test_response_kind_names() {
        assert_eq!(ResponseKind::Lid.element_name(), "response_lid");
        assert_eq!(ResponseKind::Str.element_name(), "response_str");
        assert_eq!(ResponseKind::Num.element_name(), "response_num");
    }
}
