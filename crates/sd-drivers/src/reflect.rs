//! Reflection driver over object-graph snapshots.
//!
//! A snapshot is a JSON dump of a live runtime's object graph: one node per
//! module, class, callable or value, with the members it exposes. The driver
//! walks the tree, drops members imported from other modules, and maps each
//! node kind onto an [`ElementType`].

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use sd_markup::Markup;
use sd_model::{Documenter, ElementAttrs, ElementRef, ElementType, SourceRange, verbs};

use crate::driver::{Driver, DriverContext, record_source};
use crate::error::DriverError;
use crate::params::{Parameter, format_parameters};
use crate::resolve::{read_source, resolve};
use crate::scope::ScopeStack;

/// Driver name.
pub const NAME: &str = "reflect";

/// File extension of object-graph snapshots.
pub const SNAPSHOT_EXTENSION: &str = "objgraph";

/// Tag added to members that are inherited rather than defined locally.
pub const TAG_INHERITED: &str = "inherited";

/// Double-underscore names that are documented, with their display labels.
const SPECIAL_ATTRIBUTES: &[(&str, &str)] = &[
    ("__init__", "constructor"),
    ("__cmp__", "compare to"),
    ("__eq__", "equals"),
    ("__del__", "delete"),
    ("__getitem__", "get item"),
    ("__setitem__", "set item"),
    ("__len__", "length"),
    ("__iter__", "iterator"),
    ("__call__", "when invoked"),
    ("__str__", "string conversion"),
    ("__repr__", "string repr"),
];

fn special_label(name: &str) -> Option<&'static str> {
    SPECIAL_ATTRIBUTES
        .iter()
        .find(|(raw, _)| *raw == name)
        .map(|(_, label)| *label)
}

/// One node of a snapshot.
#[derive(Debug, Deserialize)]
struct Node {
    name: String,
    kind: String,
    /// Module the object was defined in.
    #[serde(default)]
    module: Option<String>,
    #[serde(default)]
    doc: Option<String>,
    #[serde(default)]
    parameters: Vec<Parameter>,
    #[serde(default)]
    bases: Vec<String>,
    #[serde(default)]
    value: Option<Value>,
    #[serde(default)]
    repr: Option<String>,
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    span: Option<[usize; 2]>,
    #[serde(default)]
    inherited: bool,
    #[serde(default)]
    members: Vec<Node>,
}

/// Driver for `*.objgraph` snapshots and bare dotted module names.
pub struct ReflectDriver {
    search_paths: Vec<PathBuf>,
    markup: Markup,
}

impl ReflectDriver {
    #[must_use]
    pub fn new(context: &DriverContext) -> Self {
        Self {
            search_paths: context.search_paths.clone(),
            markup: context.markup,
        }
    }

    fn locate(&self, identifier: &str) -> Result<PathBuf, DriverError> {
        let path = Path::new(identifier);
        let candidates = if path.extension().is_some_and(|e| e == SNAPSHOT_EXTENSION)
            || identifier.contains(std::path::MAIN_SEPARATOR)
            || identifier.contains('/')
        {
            vec![path.to_path_buf()]
        } else {
            vec![
                PathBuf::from(format!(
                    "{}.{SNAPSHOT_EXTENSION}",
                    identifier.replace('.', "/")
                )),
                PathBuf::from(format!("{identifier}.{SNAPSHOT_EXTENSION}")),
            ]
        };
        resolve(identifier, &candidates, &self.search_paths)
    }
}

impl Driver for ReflectDriver {
    fn name(&self) -> &'static str {
        NAME
    }

    fn parse(&mut self, documenter: &mut Documenter, identifier: &str) -> Result<(), DriverError> {
        let path = self.locate(identifier)?;
        let text = read_source(&path)?;
        let root: Node =
            serde_json::from_str(&text).map_err(|e| DriverError::parse(identifier, e))?;
        tracing::debug!(identifier = %identifier, path = %path.display(), "Reflecting snapshot");

        let mut walker = Walker {
            documenter,
            markup: self.markup,
            current_module: root.module.clone().unwrap_or_else(|| root.name.clone()),
        };
        let handle = walker.document(&root, &ScopeStack::new(), None)?;
        walker.documenter.add_element(handle);
        Ok(())
    }
}

struct Walker<'a> {
    documenter: &'a mut Documenter,
    markup: Markup,
    current_module: String,
}

impl Walker<'_> {
    fn document(
        &mut self,
        node: &Node,
        scope: &ScopeStack,
        owner: Option<ElementType>,
    ) -> Result<ElementRef, DriverError> {
        let element_type = classify(node, owner)?;
        let id = scope.claim_id(self.documenter, &node.name);
        let label = special_label(&node.name).unwrap_or(node.name.as_str());
        let handle = self.documenter.create_element(
            ElementAttrs::new()
                .id(id.clone())
                .name(label)
                .element_type(element_type)
                .documentation(self.markup.render_doc(node.doc.as_deref())),
        );

        if node.inherited {
            self.documenter.element_mut(handle).add_tag(TAG_INHERITED);
        }
        if element_type.is_callable() {
            let arguments = format_parameters(&node.parameters);
            self.documenter
                .element_mut(handle)
                .add_relation(verbs::ARGUMENTS, [arguments]);
        }
        for base in &node.bases {
            self.documenter
                .element_mut(handle)
                .add_relation(verbs::EXTENDS, [base.as_str()]);
        }
        self.describe_value(handle, node);
        if let Some(file) = &node.file {
            match node.span {
                Some([start, end]) => {
                    record_source(self.documenter, handle, file, SourceRange::new(start, end));
                }
                None => {
                    self.documenter.element_mut(handle).set_source(file, None);
                }
            }
        }

        let entered_module = (element_type == ElementType::Module).then(|| {
            let name = match (&node.module, owner) {
                (Some(module), _) => module.clone(),
                (None, Some(_)) => format!("{}.{}", self.current_module, node.name),
                (None, None) => node.name.clone(),
            };
            std::mem::replace(&mut self.current_module, name)
        });
        let child_scope = ScopeStack::rooted(&id);
        for member in &node.members {
            if self.is_skipped(member, element_type) {
                tracing::debug!(owner = %id, member = %member.name, "Skipping member");
                continue;
            }
            let child = self.document(member, &child_scope, Some(element_type))?;
            self.documenter
                .element_mut(handle)
                .set_slot(member.name.as_str(), child);
        }
        if let Some(previous) = entered_module {
            self.current_module = previous;
        }
        Ok(handle)
    }

    /// Type tag and literal representation of value-like nodes.
    fn describe_value(&mut self, handle: ElementRef, node: &Node) {
        let representation = match (&node.value, &node.repr) {
            (_, Some(repr)) => Some(repr.clone()),
            (Some(value), None) => Some(value.to_string()),
            (None, None) => None,
        };
        let tag = match &node.value {
            Some(Value::Number(_)) => Some("number"),
            Some(Value::String(_)) => Some("string"),
            Some(Value::Array(_)) => Some("list"),
            Some(Value::Object(_)) => Some("map"),
            Some(Value::Bool(_)) => Some("boolean"),
            Some(Value::Null) => Some("null"),
            None if node.repr.is_some() => Some("reference"),
            None => None,
        };
        let mut element = self.documenter.element_mut(handle);
        if let Some(tag) = tag {
            element.add_tag(tag);
        }
        if let Some(representation) = representation {
            element.set_representation(representation);
        }
    }

    /// Private names and members defined in another module are not documented.
    fn is_skipped(&self, member: &Node, owner: ElementType) -> bool {
        if member.name.starts_with("__") && special_label(&member.name).is_none() {
            return true;
        }
        if owner == ElementType::Class {
            return false;
        }
        match (member.kind.as_str(), member.module.as_deref()) {
            ("module", Some(module)) => !module.starts_with(&format!("{}.", self.current_module)),
            (_, Some(module)) => module != self.current_module,
            (_, None) => false,
        }
    }
}

/// Map a node kind onto the element type enumeration.
fn classify(node: &Node, owner: Option<ElementType>) -> Result<ElementType, DriverError> {
    let element_type = match node.kind.as_str() {
        "module" => ElementType::Module,
        "class" => ElementType::Class,
        "function" if owner == Some(ElementType::Class) => ElementType::Method,
        "function" => ElementType::Function,
        "method" => ElementType::Method,
        "classmethod" | "staticmethod" | "class-method" => ElementType::ClassMethod,
        "constructor" => ElementType::Constructor,
        "attribute" => ElementType::Attribute,
        "class-attribute" | "property" => ElementType::ClassAttribute,
        "value" => ElementType::Value,
        "parent" => ElementType::Parent,
        other => {
            return Err(DriverError::Contract {
                driver: NAME,
                message: format!("node '{}' has unmapped kind '{other}'", node.name),
            });
        }
    };
    if node.name == "__init__" && element_type.is_callable() {
        return Ok(ElementType::Constructor);
    }
    Ok(element_type)
}
