//! Element data and the vocabulary used to classify and link elements.
//!
//! An [`Element`] is one documented program entity. Elements live inside a
//! [`Documenter`](crate::Documenter) arena and are addressed through copyable
//! [`ElementRef`] handles, which lets the same element be referenced from
//! several slots and relations without shared ownership.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Handle to an element owned by a [`Documenter`](crate::Documenter).
///
/// Handles remember which documenter issued them, so passing one to another
/// documenter is caught even when the index is in range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementRef {
    pub(crate) documenter: u32,
    pub(crate) index: usize,
}

/// Kind of program entity an element documents.
///
/// The set is closed: drivers map their own source kinds onto one of these
/// variants when they create an element, and the model never re-derives it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementType {
    Module,
    Class,
    Function,
    Method,
    ClassMethod,
    Constructor,
    ClassAttribute,
    Attribute,
    Value,
    Parent,
    Document,
    Section,
}

impl ElementType {
    /// All variants, in display group order.
    pub const ALL: [Self; 12] = [
        Self::Parent,
        Self::Module,
        Self::Class,
        Self::Constructor,
        Self::ClassAttribute,
        Self::ClassMethod,
        Self::Attribute,
        Self::Method,
        Self::Function,
        Self::Value,
        Self::Document,
        Self::Section,
    ];

    /// Serialized name (kebab-case).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Class => "class",
            Self::Function => "function",
            Self::Method => "method",
            Self::ClassMethod => "class-method",
            Self::Constructor => "constructor",
            Self::ClassAttribute => "class-attribute",
            Self::Attribute => "attribute",
            Self::Value => "value",
            Self::Parent => "parent",
            Self::Document => "document",
            Self::Section => "section",
        }
    }

    /// Human-readable group title.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Module => "Modules",
            Self::Class => "Classes",
            Self::Function => "Functions",
            Self::Method => "Methods",
            Self::ClassMethod => "Class Methods",
            Self::Constructor => "Constructor",
            Self::ClassAttribute => "Class Attributes",
            Self::Attribute => "Attributes",
            Self::Value => "Values",
            Self::Parent => "Bases",
            Self::Document => "Documents",
            Self::Section => "Sections",
        }
    }

    /// Whether elements of this type take arguments.
    #[must_use]
    pub fn is_callable(self) -> bool {
        matches!(
            self,
            Self::Function | Self::Method | Self::ClassMethod | Self::Constructor
        )
    }

    /// Rank of the type in the display grouping (lower comes first).
    #[must_use]
    pub fn group_rank(self) -> usize {
        Self::ALL
            .iter()
            .position(|t| *t == self)
            .unwrap_or(Self::ALL.len())
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown element type name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown element type: {0}")]
pub struct ParseElementTypeError(pub String);

impl FromStr for ElementType {
    type Err = ParseElementTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseElementTypeError(s.to_owned()))
    }
}

/// Conventional relation verbs.
///
/// The verb set is open: any string is accepted by
/// [`ElementMut::add_relation`](crate::ElementMut::add_relation).
pub mod verbs {
    /// Parent-class link.
    pub const EXTENDS: &str = "extends";
    /// Implemented interface (trait) link.
    pub const IMPLEMENTS: &str = "implements";
    /// Ordered parameter descriptors of a callable.
    pub const ARGUMENTS: &str = "arguments";
    /// Back-link from a slot value to the element owning the slot.
    pub const DEFINED: &str = "defined";
    /// Name of the slot a value is attached under.
    pub const SLOT: &str = "slot";
    /// Provenance: source path and `[start, end]` range.
    pub const SOURCE: &str = "source";
    /// Following sibling in document order.
    pub const NEXT: &str = "next";
    /// Preceding sibling in document order.
    pub const PREVIOUS: &str = "previous";

    /// Verbs recorded by `set_slot`; the `children` nesting already carries them.
    pub(crate) const STRUCTURAL: [&str; 2] = [DEFINED, SLOT];
}

/// Byte range into an element's source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceRange {
    pub start: usize,
    pub end: usize,
}

impl SourceRange {
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// The range as a `[start, end]` JSON array.
    #[must_use]
    pub fn to_value(self) -> Value {
        Value::from(vec![self.start, self.end])
    }
}

impl Serialize for SourceRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq([self.start, self.end])
    }
}

/// Object of a relation: another element or a plain value.
#[derive(Clone, Debug, PartialEq)]
pub enum RelationObject {
    Element(ElementRef),
    Value(Value),
}

impl From<ElementRef> for RelationObject {
    fn from(handle: ElementRef) -> Self {
        Self::Element(handle)
    }
}

impl From<Value> for RelationObject {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for RelationObject {
    fn from(value: &str) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<String> for RelationObject {
    fn from(value: String) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<Vec<String>> for RelationObject {
    fn from(values: Vec<String>) -> Self {
        Self::Value(Value::from(values))
    }
}

impl From<SourceRange> for RelationObject {
    fn from(range: SourceRange) -> Self {
        Self::Value(range.to_value())
    }
}

/// Typed, possibly multi-object edge from an element.
#[derive(Clone, Debug, PartialEq)]
pub struct Relation {
    verb: String,
    objects: Vec<RelationObject>,
}

impl Relation {
    pub fn new<I>(verb: impl Into<String>, objects: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<RelationObject>,
    {
        Self {
            verb: verb.into(),
            objects: objects.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn verb(&self) -> &str {
        &self.verb
    }

    #[must_use]
    pub fn objects(&self) -> &[RelationObject] {
        &self.objects
    }

    /// Element objects of this relation, in order.
    pub fn elements(&self) -> impl Iterator<Item = ElementRef> + '_ {
        self.objects.iter().filter_map(|o| match o {
            RelationObject::Element(handle) => Some(*handle),
            RelationObject::Value(_) => None,
        })
    }

    /// Whether this relation is a slot back-link recorded by `set_slot`.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        verbs::STRUCTURAL.contains(&self.verb.as_str())
    }
}

/// Attributes accepted by the [`Documenter`](crate::Documenter) factories.
#[derive(Clone, Debug, Default)]
pub struct ElementAttrs {
    pub id: Option<String>,
    pub name: Option<String>,
    pub element_type: Option<ElementType>,
    pub tags: Vec<String>,
    pub parent: Option<ElementRef>,
    pub documentation: Option<String>,
    pub representation: Option<String>,
    pub source: Option<String>,
    pub range: Option<SourceRange>,
}

impl ElementAttrs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn element_type(mut self, element_type: ElementType) -> Self {
        self.element_type = Some(element_type);
        self
    }

    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    #[must_use]
    pub fn parent(mut self, parent: ElementRef) -> Self {
        self.parent = Some(parent);
        self
    }

    #[must_use]
    pub fn documentation(mut self, documentation: Option<String>) -> Self {
        self.documentation = documentation;
        self
    }

    #[must_use]
    pub fn representation(mut self, representation: impl Into<String>) -> Self {
        self.representation = Some(representation.into());
        self
    }

    #[must_use]
    pub fn source(mut self, path: impl Into<String>, range: Option<SourceRange>) -> Self {
        self.source = Some(path.into());
        self.range = range;
        self
    }
}

/// One documented program entity.
///
/// Identity (`id`) is fixed by the driver that creates the element; the
/// content only grows (children and relations are append-only).
#[derive(Clone, Debug, Default)]
pub struct Element {
    pub(crate) id: Option<String>,
    pub(crate) name: Option<String>,
    pub(crate) element_type: Option<ElementType>,
    pub(crate) tags: Vec<String>,
    pub(crate) parent: Option<ElementRef>,
    pub(crate) documentation: Option<String>,
    pub(crate) representation: Option<String>,
    pub(crate) source: Option<String>,
    pub(crate) range: Option<SourceRange>,
    pub(crate) children: Vec<(String, ElementRef)>,
    pub(crate) relations: Vec<Relation>,
}

impl From<ElementAttrs> for Element {
    fn from(attrs: ElementAttrs) -> Self {
        Self {
            id: attrs.id,
            name: attrs.name,
            element_type: attrs.element_type,
            tags: attrs.tags,
            parent: attrs.parent,
            documentation: attrs.documentation,
            representation: attrs.representation,
            source: attrs.source,
            range: attrs.range,
            children: Vec::new(),
            relations: Vec::new(),
        }
    }
}

impl Element {
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn element_type(&self) -> Option<ElementType> {
        self.element_type
    }

    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    #[must_use]
    pub fn parent(&self) -> Option<ElementRef> {
        self.parent
    }

    #[must_use]
    pub fn documentation(&self) -> Option<&str> {
        self.documentation.as_deref()
    }

    #[must_use]
    pub fn representation(&self) -> Option<&str> {
        self.representation.as_deref()
    }

    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    #[must_use]
    pub fn range(&self) -> Option<SourceRange> {
        self.range
    }

    /// Slots in insertion order.
    #[must_use]
    pub fn children(&self) -> &[(String, ElementRef)] {
        &self.children
    }

    /// Element held by the first slot named `name`.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<ElementRef> {
        self.children
            .iter()
            .find(|(slot, _)| slot == name)
            .map(|(_, handle)| *handle)
    }

    #[must_use]
    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// Relations with the given verb, in insertion order.
    pub fn relations_with<'a>(&'a self, verb: &'a str) -> impl Iterator<Item = &'a Relation> {
        self.relations.iter().filter(move |r| r.verb == verb)
    }

    /// Display label: the name, falling back to the id.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.name().or_else(|| self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_type_round_trips_through_str() {
        for element_type in ElementType::ALL {
            assert_eq!(element_type.as_str().parse(), Ok(element_type));
        }
    }

    #[test]
    fn test_element_type_rejects_unknown_name() {
        let err = "interface".parse::<ElementType>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown element type: interface");
    }

    #[test]
    fn test_element_type_serializes_kebab_case() {
        let value = serde_json::to_value(ElementType::ClassMethod).unwrap();
        assert_eq!(value, Value::from("class-method"));
    }

    #[test]
    fn test_group_rank_puts_parents_first() {
        assert!(ElementType::Parent.group_rank() < ElementType::Class.group_rank());
        assert!(ElementType::Constructor.group_rank() < ElementType::Method.group_rank());
        assert!(ElementType::Function.group_rank() < ElementType::Value.group_rank());
    }

    #[test]
    fn test_attrs_tag_deduplicates() {
        let attrs = ElementAttrs::new().tag("number").tag("number").tag("list");
        assert_eq!(attrs.tags, vec!["number", "list"]);
    }

    #[test]
    fn test_label_falls_back_to_id() {
        let element = Element::from(ElementAttrs::new().id("pkg.mod"));
        assert_eq!(element.label(), Some("pkg.mod"));

        let named = Element::from(ElementAttrs::new().id("pkg.mod").name("mod"));
        assert_eq!(named.label(), Some("mod"));
    }

    #[test]
    fn test_source_range_serializes_as_pair() {
        let value = serde_json::to_value(SourceRange::new(3, 14)).unwrap();
        assert_eq!(value, serde_json::json!([3, 14]));
    }

    #[test]
    fn test_structural_relations() {
        assert!(Relation::new(verbs::DEFINED, [ElementRef { documenter: 0, index: 0 }]).is_structural());
        assert!(Relation::new(verbs::SLOT, ["f"]).is_structural());
        assert!(!Relation::new(verbs::EXTENDS, ["Base"]).is_structural());
    }
}
