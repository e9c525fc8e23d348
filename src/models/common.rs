//! Value vocabularies and structures shared by every schema generation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::xml::Element;

/// How many values a variable holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cardinality {
    Single,
    Multiple,
    Ordered,
    Record,
    /// Unrecognized value, preserved verbatim.
    Other(String),
}

impl Cardinality {
    pub fn parse(value: &str) -> Self {
        match value {
            "single" => Cardinality::Single,
            "multiple" => Cardinality::Multiple,
            "ordered" => Cardinality::Ordered,
            "record" => Cardinality::Record,
            other => Cardinality::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Cardinality::Single => "single",
            Cardinality::Multiple => "multiple",
            Cardinality::Ordered => "ordered",
            Cardinality::Record => "record",
            Cardinality::Other(value) => value,
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primitive value type of a declared variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseType {
    Identifier,
    String,
    Integer,
    Float,
    Boolean,
    Point,
    Pair,
    DirectedPair,
    Duration,
    File,
    Uri,
    IntOrIdentifier,
    /// Unrecognized value, preserved verbatim.
    Other(String),
}

impl BaseType {
    pub fn parse(value: &str) -> Self {
        match value {
            "identifier" => BaseType::Identifier,
            "string" => BaseType::String,
            "integer" => BaseType::Integer,
            "float" => BaseType::Float,
            "boolean" => BaseType::Boolean,
            "point" => BaseType::Point,
            "pair" => BaseType::Pair,
            "directedPair" => BaseType::DirectedPair,
            "duration" => BaseType::Duration,
            "file" => BaseType::File,
            "uri" => BaseType::Uri,
            "intOrIdentifier" => BaseType::IntOrIdentifier,
            other => BaseType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BaseType::Identifier => "identifier",
            BaseType::String => "string",
            BaseType::Integer => "integer",
            BaseType::Float => "float",
            BaseType::Boolean => "boolean",
            BaseType::Point => "point",
            BaseType::Pair => "pair",
            BaseType::DirectedPair => "directedPair",
            BaseType::Duration => "duration",
            BaseType::File => "file",
            BaseType::Uri => "uri",
            BaseType::IntOrIdentifier => "intOrIdentifier",
            BaseType::Other(value) => value,
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audience of a rubric block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum View {
    Author,
    Candidate,
    Proctor,
    Scorer,
    TestConstructor,
    Tutor,
    /// Unrecognized value, preserved verbatim.
    Other(String),
}

impl View {
    /// Accepts both the camel-case and hyphenated spellings.
    pub fn parse(value: &str) -> Self {
        match value {
            "author" => View::Author,
            "candidate" => View::Candidate,
            "proctor" => View::Proctor,
            "scorer" => View::Scorer,
            "testConstructor" | "test-constructor" => View::TestConstructor,
            "tutor" => View::Tutor,
            other => View::Other(other.to_string()),
        }
    }

    pub fn mid_name(&self) -> &str {
        match self {
            View::Author => "author",
            View::Candidate => "candidate",
            View::Proctor => "proctor",
            View::Scorer => "scorer",
            View::TestConstructor => "testConstructor",
            View::Tutor => "tutor",
            View::Other(value) => value,
        }
    }
}

/// Read a boolean-like attribute. Accepts `yes`/`no` and `true`/`false`.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim() {
        "yes" | "Yes" | "true" => Some(true),
        "no" | "No" | "false" => Some(false),
        _ => None,
    }
}

/// Document or item level metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub schema: Option<String>,
    pub schema_version: Option<String>,
    pub qti_metadata: Option<QtiMetadata>,
    /// Learning Object Metadata, carried through untouched.
    pub lom: Option<Element>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QtiMetadata {
    pub time_dependent: bool,
    pub composite: bool,
    pub interaction_type: Option<String>,
    pub feedback_type: Option<String>,
    pub solution_available: bool,
    pub scoring_mode: Option<String>,
    pub tool_name: Option<String>,
    pub tool_version: Option<String>,
    pub tool_vendor: Option<String>,
}

/// A block of presentational content in the 1.2 vocabulary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
    pub label: Option<String>,
    pub content: Vec<MaterialContent>,
}

impl Material {
    pub fn texts(&self) -> impl Iterator<Item = &MatText> {
        self.content.iter().filter_map(|c| match c {
            MaterialContent::Text(text) => Some(text),
            _ => None,
        })
    }

    pub fn images(&self) -> impl Iterator<Item = &MatImage> {
        self.content.iter().filter_map(|c| match c {
            MaterialContent::Image(image) => Some(image),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MaterialContent {
    Text(MatText),
    Image(MatImage),
    Audio(MatMedia),
    Video(MatMedia),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatText {
    pub text_type: Option<String>,
    pub charset: Option<String>,
    pub content: String,
}

impl MatText {
    pub fn is_html(&self) -> bool {
        self.text_type.as_deref() == Some("text/html")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatImage {
    pub image_type: Option<String>,
    pub uri: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatMedia {
    pub media_type: Option<String>,
    pub uri: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Objective {
    pub title: Option<String>,
    pub material: Option<Material>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RubricBlock {
    pub use_: Option<String>,
    pub view: Option<View>,
    /// Inner markup.
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cardinality_round_trips_known_and_unknown() {
        assert_eq!(Cardinality::parse("ordered"), Cardinality::Ordered);
        let odd = Cardinality::parse("bag");
        assert_eq!(odd, Cardinality::Other("bag".to_string()));
        assert_eq!(odd.as_str(), "bag");
    }

    #[test]
    fn test_base_type_preserves_unknown_values() {
        assert_eq!(BaseType::parse("pair"), BaseType::Pair);
        assert_eq!(BaseType::parse("directedPair").as_str(), "directedPair");
        assert_eq!(BaseType::parse("matrix").as_str(), "matrix");
    }

    #[test]
    fn test_view_spellings() {
        let view = View::parse("testConstructor");
        assert_eq!(view.mid_name(), "testConstructor");
        assert_eq!(View::parse("test-constructor"), View::TestConstructor);
        assert_eq!(View::parse("parent").mid_name(), "parent");
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("yes"), Some(true));
        assert_eq!(parse_flag(" false "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_material_filters() {
        let material = Material {
            label: None,
            content: vec![
                MaterialContent::Text(MatText {
                    content: "hi".into(),
                    ..Default::default()
                }),
                MaterialContent::Image(MatImage {
                    uri: "a.png".into(),
                    ..Default::default()
                }),
            ],
        };
        assert_eq!(material.texts().count(), 1);
        assert_eq!(material.images().next().unwrap().uri, "a.png");
    }
}
